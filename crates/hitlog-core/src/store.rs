// Event store: the parsed access and error events of one run, in file order

use crate::error::AnalyzerError;
use crate::parser::{parse_lines, AccessLogParser, ErrorLogParser, LineParser, ParseStats};
use crate::timestamp::TimestampNormalizer;
use crate::{AccessEvent, ErrorEvent};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::thread;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct EventStore {
    access: Vec<AccessEvent>,
    errors: Vec<ErrorEvent>,
    access_stats: ParseStats,
    error_stats: ParseStats,
}

impl EventStore {
    #[cfg(test)]
    pub(crate) fn from_events(access: Vec<AccessEvent>, errors: Vec<ErrorEvent>) -> Self {
        let access_stats = ParseStats { attempted: access.len(), parsed: access.len() };
        let error_stats = ParseStats { attempted: errors.len(), parsed: errors.len() };
        Self { access, errors, access_stats, error_stats }
    }

    /// Read both log files, the two in parallel.
    ///
    /// The access log must be readable; an unreadable error log leaves the
    /// error side empty.
    pub fn load(
        access_path: &Path,
        error_path: &Path,
        normalizer: &TimestampNormalizer,
    ) -> Result<Self, AnalyzerError> {
        let access_parser = AccessLogParser::new(normalizer.clone());
        let error_parser = ErrorLogParser::new(normalizer.clone());

        let (access, errors) = thread::scope(|scope| {
            let errors = scope.spawn(|| read_error_log(error_path, &error_parser));
            let access = read_log(access_path, &access_parser);
            let errors = errors
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (access, errors)
        });

        let (access, access_stats) = access.map_err(|source| AnalyzerError::AccessLog {
            path: access_path.to_path_buf(),
            source,
        })?;
        let (errors, error_stats) = errors;

        Ok(Self { access, errors, access_stats, error_stats })
    }

    pub fn access_events(&self) -> &[AccessEvent] {
        &self.access
    }

    pub fn error_events(&self) -> &[ErrorEvent] {
        &self.errors
    }

    pub fn access_stats(&self) -> ParseStats {
        self.access_stats
    }

    pub fn error_stats(&self) -> ParseStats {
        self.error_stats
    }
}

fn read_log<P: LineParser>(path: &Path, parser: &P) -> io::Result<(Vec<P::Event>, ParseStats)> {
    let file = File::open(path)?;
    let (events, stats) = parse_lines(parser, BufReader::new(file))?;

    info!(
        log = parser.name(),
        path = %path.display(),
        attempted = stats.attempted,
        parsed = stats.parsed,
        skipped = stats.skipped(),
        "Parsed log file"
    );
    Ok((events, stats))
}

fn read_error_log(path: &Path, parser: &ErrorLogParser) -> (Vec<ErrorEvent>, ParseStats) {
    match read_log(path, parser) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Error log unavailable, continuing without it");
            (Vec::new(), ParseStats::default())
        }
    }
}
