//! Configuration for an analysis run

use crate::error::AnalyzerError;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

// Main config structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    // access log to analyze (required to exist at run time)
    pub access_log: PathBuf,

    // error log to analyze (skipped when missing)
    pub error_log: PathBuf,

    // directory receiving report.html and the csv tables
    pub output_dir: PathBuf,

    // offset used for zone-less error timestamps and every displayed time
    #[serde(deserialize_with = "deserialize_offset")]
    pub utc_offset: FixedOffset,

    // max rows per ranked table in the report
    pub report_rows: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            access_log: PathBuf::from("/var/log/apache2/access.log"),
            error_log: PathBuf::from("/var/log/apache2/error.log"),
            output_dir: PathBuf::from("reports"),
            utc_offset: Utc.fix(),
            report_rows: 25,
        }
    }
}

/// Parse "UTC", "Z", "+HH:MM", "-HHMM" or "+HH" into a fixed offset
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, AnalyzerError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }

    let invalid = || AnalyzerError::InvalidOffset(raw.to_string());

    let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = trimmed.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !matches!(digits.len(), 2 | 4) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = if digits.len() == 4 {
        digits[2..].parse().map_err(|_| invalid())?
    } else {
        0
    };
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn deserialize_offset<'de, D>(deserializer: D) -> Result<FixedOffset, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_utc_offset(&raw).map_err(serde::de::Error::custom)
}

// Load configuration from a TOML file

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalyzerConfig, AnalyzerError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| AnalyzerError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AnalyzerConfig = toml::from_str(&content)?;
    Ok(config)
}
