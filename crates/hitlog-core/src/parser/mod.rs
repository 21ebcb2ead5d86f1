//! line parsers - turn raw log lines into typed events

pub mod access;
pub mod error;

pub use access::AccessLogParser;
pub use error::ErrorLogParser;

use std::io::{self, BufRead};

// Parser trait - one implementation per log grammar

pub trait LineParser: Send + Sync {
    type Event;

    fn name(&self) -> &'static str;

    /// `None` when the line does not match the grammar
    fn parse(&self, line: &str) -> Option<Self::Event>;
}

/// Attempted vs parsed line counts for one log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub attempted: usize,
    pub parsed: usize,
}

impl ParseStats {
    pub fn skipped(&self) -> usize {
        self.attempted - self.parsed
    }
}

/// Parse every line of `reader`, dropping the ones the grammar rejects.
///
/// Lines are decoded lossily so a stray non-UTF-8 byte costs one line, not the file.
pub fn parse_lines<P, R>(parser: &P, reader: R) -> io::Result<(Vec<P::Event>, ParseStats)>
where
    P: LineParser + ?Sized,
    R: BufRead,
{
    let mut events = Vec::new();
    let mut stats = ParseStats::default();

    for chunk in reader.split(b'\n') {
        let bytes = chunk?;
        let decoded = String::from_utf8_lossy(&bytes);
        let line = decoded.strip_suffix('\r').unwrap_or(&decoded);

        stats.attempted += 1;
        if let Some(event) = parser.parse(line) {
            stats.parsed += 1;
            events.push(event);
        }
    }

    Ok((events, stats))
}
