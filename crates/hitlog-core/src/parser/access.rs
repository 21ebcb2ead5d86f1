// Access log parser (combined log format)
// 192.168.1.1 - - [10/Oct/2023:13:55:36 -0700] "GET /index.html HTTP/1.1" 200 512 "-" "Mozilla/5.0 ..."

use super::LineParser;
use crate::browser::BrowserClassifier;
use crate::timestamp::TimestampNormalizer;
use crate::AccessEvent;
use regex::Regex;

pub struct AccessLogParser {
    // anchored at both ends: partial lines are rejected, never half-parsed
    access_pattern: Regex,
    normalizer: TimestampNormalizer,
    classifier: BrowserClassifier,
}

impl AccessLogParser {
    pub fn new(normalizer: TimestampNormalizer) -> Self {
        Self {
            access_pattern: Regex::new(
                r#"^(\S+)\s+\S+\s+\S+\s+\[([^\]]+)\]\s+"(\S+)\s+([^\s"]+)\s+([^"]+)"\s+(\d{3})\s+(\d+|-)\s+"([^"]*)"\s+"([^"]*)"$"#
            ).unwrap(),
            normalizer,
            classifier: BrowserClassifier::new(),
        }
    }

    fn parse_size(raw: &str) -> u64 {
        if raw == "-" {
            return 0;
        }
        // only overflow can fail here, the pattern guarantees digits
        raw.parse().unwrap_or(u64::MAX)
    }
}

impl LineParser for AccessLogParser {
    type Event = AccessEvent;

    fn name(&self) -> &'static str {
        "access"
    }

    fn parse(&self, line: &str) -> Option<AccessEvent> {
        let caps = self.access_pattern.captures(line)?;
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        let user_agent = field(9);

        Some(AccessEvent {
            client_address: field(1).to_string(),
            timestamp: self.normalizer.access(field(2)),
            http_method: field(3).to_string(),
            request_path: field(4).to_string(),
            protocol: field(5).to_string(),
            status_code: field(6).to_string(),
            response_size: Self::parse_size(field(7)),
            referer: field(8).to_string(),
            raw_user_agent: user_agent.to_string(),
            browser_category: self.classifier.classify(user_agent),
        })
    }
}
