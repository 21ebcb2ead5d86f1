// Error log parser (apache 2.x)
// [Tue Oct 10 13:55:36.123456 2023] [php:error] [pid 1234] [client 10.0.0.5:51234] message

use super::LineParser;
use crate::timestamp::TimestampNormalizer;
use crate::{ErrorEvent, UNKNOWN_CLIENT};
use regex::Regex;

pub struct ErrorLogParser {
    error_pattern: Regex,
    // leading dotted-decimal part of the client segment; IPv6 and hostnames do not match
    address_pattern: Regex,
    normalizer: TimestampNormalizer,
}

impl ErrorLogParser {
    pub fn new(normalizer: TimestampNormalizer) -> Self {
        Self {
            error_pattern: Regex::new(
                r"^\[([^\]]+)\]\s+\[([^\]]+)\]\s+(?:\[pid\s+\d+\]\s+)?(?:\[client\s+([^\]]+)\]\s+)?(.+)$"
            ).unwrap(),
            address_pattern: Regex::new(r"^([\d.]+)").unwrap(),
            normalizer,
        }
    }

    fn client_address(&self, client: Option<&str>) -> String {
        client
            .and_then(|c| self.address_pattern.captures(c))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

impl LineParser for ErrorLogParser {
    type Event = ErrorEvent;

    fn name(&self) -> &'static str {
        "error"
    }

    fn parse(&self, line: &str) -> Option<ErrorEvent> {
        let caps = self.error_pattern.captures(line)?;

        let timestamp_str = caps.get(1).map_or("", |m| m.as_str());
        let level_str = caps.get(2).map_or("", |m| m.as_str());
        let client = caps.get(3).map(|m| m.as_str());
        let message = caps.get(4).map_or("", |m| m.as_str());

        Some(ErrorEvent {
            timestamp: self.normalizer.error(timestamp_str),
            severity_level: level_str.to_string(),
            client_address: self.client_address(client),
            message: message.to_string(),
        })
    }
}
