// Browser classification from raw user-agent strings
// Rules are evaluated in order and the first hit wins: user agents routinely
// name several engines ("... Chrome/119 Safari/537.36").

use crate::BrowserCategory;
use regex::Regex;

struct BrowserRule {
    category: BrowserCategory,
    pattern: Regex,
    // rule is void when the user agent contains this token
    unless: Option<&'static str>,
}

impl BrowserRule {
    fn new(category: BrowserCategory, pattern: &str, unless: Option<&'static str>) -> Self {
        Self {
            category,
            pattern: Regex::new(pattern).expect("browser rule pattern is valid"),
            unless,
        }
    }

    fn matches(&self, user_agent: &str) -> bool {
        self.pattern.is_match(user_agent)
            && self.unless.map_or(true, |token| !user_agent.contains(token))
    }
}

pub struct BrowserClassifier {
    rules: Vec<BrowserRule>,
}

impl BrowserClassifier {
    pub fn new() -> Self {
        use BrowserCategory::*;

        Self {
            rules: vec![
                BrowserRule::new(Firefox, r"Firefox/[\d.]+", None),
                BrowserRule::new(Chrome, r"Chrome/[\d.]+", Some("Edge")),
                BrowserRule::new(Safari, r"Safari/[\d.]+", Some("Chrome")),
                BrowserRule::new(Edge, r"Edge/[\d.]+", None),
                BrowserRule::new(InternetExplorer, r"MSIE|Trident", None),
                BrowserRule::new(BotCrawler, r"(?i)bot|crawler|spider|scraper", None),
            ],
        }
    }

    pub fn classify(&self, user_agent: &str) -> BrowserCategory {
        if user_agent.is_empty() {
            return BrowserCategory::Unknown;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(user_agent))
            .map(|rule| rule.category)
            .unwrap_or(BrowserCategory::Other)
    }
}

impl Default for BrowserClassifier {
    fn default() -> Self {
        Self::new()
    }
}
