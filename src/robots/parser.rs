//! Robots.txt rule matching on top of the robotstxt crate

use robotstxt::DefaultMatcher;

/// Rules from one site's robots.txt
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Raw robots.txt body; empty means everything is allowed
    content: String,
}

impl RobotsRules {
    /// Wraps a fetched robots.txt body
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Rules that allow every URL, used when robots.txt is missing or unreachable
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks whether `url` may be fetched by the crawler identified by `agent`
    ///
    /// `agent` is the product token (e.g. "Mozilla"), not the full User-Agent header.
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }
}

/// The product token robots.txt groups are matched against
///
/// "Mozilla/5.0 (X11; ...)" becomes "Mozilla".
pub fn product_token(user_agent: &str) -> String {
    user_agent
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '-' || *c == '_')
        .collect()
}
