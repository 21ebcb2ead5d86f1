//! Core types for web-server log analysis
//! this crate parses access/error logs, aggregates them and renders the report artifacts.
pub mod aggregate;
pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod parser;
pub mod report;
pub mod runner;
pub mod store;
pub mod timeline;
pub mod timestamp;

pub use aggregate::{AccessAggregates, PageStat, SeverityAggregates, SeverityStat};
pub use browser::BrowserClassifier;
pub use config::{load_config, AnalyzerConfig};
pub use error::AnalyzerError;
pub use runner::{Analysis, Analyzer, RunSummary};
pub use store::EventStore;
pub use timeline::TimelinePoint;
pub use timestamp::TimestampNormalizer;

use std::fmt;

/// Sentinel used when an error line carries no usable client address
pub const UNKNOWN_CLIENT: &str = "unknown";

// BROWSER CATEGORY //

/// Browser family inferred from a raw user-agent string

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserCategory {
    Firefox,
    Chrome,
    Safari,
    Edge,
    InternetExplorer,
    BotCrawler,
    Other,
    Unknown,
}

impl BrowserCategory {
    /// Display label used in the report and the exported tables
    pub fn label(&self) -> &'static str {
        match self {
            Self::Firefox => "Firefox",
            Self::Chrome => "Chrome",
            Self::Safari => "Safari",
            Self::Edge => "Edge",
            Self::InternetExplorer => "Internet Explorer",
            Self::BotCrawler => "Bot/Crawler",
            Self::Other => "Other",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BrowserCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ACCESS EVENT (one request line)

/// One successfully parsed line of the access log

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub client_address: String,

    pub timestamp: i64, // epoch seconds

    pub http_method: String,

    pub request_path: String,

    pub protocol: String,

    pub status_code: String, // always 3 digits

    pub response_size: u64, // 0 when the log shows "-"

    pub referer: String,

    pub raw_user_agent: String,

    pub browser_category: BrowserCategory,
}

// ERROR EVENT (one diagnostic line)

/// One successfully parsed line of the error log

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub timestamp: i64, // epoch seconds

    pub severity_level: String, // tag as captured, e.g. "php:error"

    pub client_address: String, // UNKNOWN_CLIENT if absent or not dotted-decimal

    pub message: String,
}
