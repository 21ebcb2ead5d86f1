use crate::aggregate::{AccessAggregates, SeverityAggregates};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::export::{export_access, export_errors};
use crate::report::{render_report, write_report, ReportInput};
use crate::store::EventStore;
use crate::timeline::{build_timeline, TimelinePoint};
use crate::timestamp::{format_timestamp, TimestampNormalizer};
use chrono::{DateTime, FixedOffset, Utc};
use std::fs;
use std::panic;
use std::path::{Path, PathBuf};
use std::thread::{self, ScopedJoinHandle};
use tracing::info;

// aggregates and timelines derived from one event store

#[derive(Debug, Clone)]
pub struct Analysis {
    pub access: AccessAggregates,
    pub severities: SeverityAggregates,
    pub access_timeline: Vec<TimelinePoint>,
    pub error_timeline: Vec<TimelinePoint>,
}

impl Analysis {
    // the four views only read the store and each owns its output, so they run side by side
    pub fn compute(store: &EventStore, offset: &FixedOffset) -> Self {
        thread::scope(|scope| {
            let access = scope.spawn(|| AccessAggregates::from_events(store.access_events()));
            let severities = scope.spawn(|| SeverityAggregates::from_events(store.error_events()));
            let access_timeline = scope.spawn(|| {
                build_timeline(store.access_events().iter().map(|e| e.timestamp), offset)
            });
            let error_timeline =
                build_timeline(store.error_events().iter().map(|e| e.timestamp), offset);

            Self {
                access: join(access),
                severities: join(severities),
                access_timeline: join(access_timeline),
                error_timeline,
            }
        })
    }

    pub fn report_input(&self, generated_at: String) -> ReportInput<'_> {
        ReportInput {
            pages: self.access.ranked_pages(),
            clients: self.access.ranked_clients(),
            browsers: self.access.ranked_browsers(),
            severities: self.severities.ranked(),
            access_timeline: &self.access_timeline,
            error_timeline: &self.error_timeline,
            generated_at,
        }
    }
}

fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}

// what a finished run produced

#[derive(Debug)]
pub struct RunSummary {
    pub store: EventStore,
    pub analysis: Analysis,
    pub report: PathBuf,
    pub access_table: PathBuf,
    pub error_table: Option<PathBuf>,
}

// main runner that orchestrates one analysis run

pub struct Analyzer {
    config: AnalyzerConfig,
    normalizer: TimestampNormalizer,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_run_start(config, Utc::now())
    }

    /// Pin the run-start clock, which is both the timestamp fallback and the report time
    pub fn with_run_start(config: AnalyzerConfig, run_started: DateTime<Utc>) -> Self {
        let normalizer = TimestampNormalizer::new(run_started, config.utc_offset);
        Self { config, normalizer }
    }

    pub fn run(&self) -> Result<RunSummary, AnalyzerError> {
        let config = &self.config;
        let offset = config.utc_offset;

        prepare_output_dir(&config.output_dir)?;

        let store = EventStore::load(&config.access_log, &config.error_log, &self.normalizer)?;
        let analysis = Analysis::compute(&store, &offset);

        let generated_at = format_timestamp(self.normalizer.run_started(), &offset);
        let html = render_report(&analysis.report_input(generated_at), config.report_rows);
        let report = write_report(&config.output_dir, &html)?;

        let access_table = export_access(&config.output_dir, store.access_events(), &offset)?;
        let error_table = export_errors(&config.output_dir, store.error_events(), &offset)?;

        info!(
            access_events = store.access_events().len(),
            error_events = store.error_events().len(),
            pages = analysis.access.pages.len(),
            report = %report.display(),
            "Analysis complete"
        );

        Ok(RunSummary {
            store,
            analysis,
            report,
            access_table,
            error_table,
        })
    }
}

/// Create the output directory and its parents (0755 on unix)
pub fn prepare_output_dir(path: &Path) -> Result<(), AnalyzerError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder
        .create(path)
        .map_err(|source| AnalyzerError::CreateOutputDir {
            path: path.to_path_buf(),
            source,
        })
}
