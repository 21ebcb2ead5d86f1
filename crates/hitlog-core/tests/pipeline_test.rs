use chrono::{DateTime, Offset, Utc};
use hitlog_core::export::{ACCESS_TABLE, ERROR_TABLE};
use hitlog_core::report::REPORT_FILE;
use hitlog_core::{Analyzer, AnalyzerConfig, AnalyzerError, BrowserCategory};
use std::fs;
use std::path::Path;

const SINGLE_LINE: &str = r#"192.168.1.1 - - [10/Oct/2023:13:55:36 -0700] "GET /index.html HTTP/1.1" 200 512 "-" "Mozilla/5.0 Firefox/119.0""#;

const ACCESS_LOG: &str = r#"10.0.0.1 - - [10/Oct/2023:10:05:00 +0000] "GET /b HTTP/1.1" 200 100 "-" "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
this line is noise
10.0.0.2 - - [10/Oct/2023:10:15:00 +0000] "GET /a HTTP/1.1" 200 100 "-" "Mozilla/5.0 Firefox/119.0"
10.0.0.1 - - [10/Oct/2023:12:01:00 +0000] "POST /a HTTP/1.1" 302 - "-" "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"
10.0.0.3 - - [10/Oct/2023:09:59:59 +0000] "GET /b HTTP/1.1" 404 12 "-" "Mozilla/5.0 Firefox/119.0"
10.0.0.3 - - [10/Oct/2023:09:59:59 +0000] "GET /c HTTP/1.1" 200 12 "-"
"#;

const ERROR_LOG: &str = "[Tue Oct 10 10:30:00.123 2023] [php:error] [pid 1] [client 10.0.0.1:5000] PHP Fatal error: boom
[Tue Oct 10 11:30:00 2023] [php:warning] [client ::1:6000] PHP Warning: careful
not an error line
[Tue Oct 10 10:45:00 2023] [php:error] Class not found
";

fn config_for(dir: &Path, access: &str, error: Option<&str>) -> AnalyzerConfig {
    let access_path = dir.join("access.log");
    fs::write(&access_path, access).unwrap();

    let error_path = dir.join("error.log");
    if let Some(content) = error {
        fs::write(&error_path, content).unwrap();
    }

    AnalyzerConfig {
        access_log: access_path,
        error_log: error_path,
        output_dir: dir.join("out/nested"),
        utc_offset: Utc.fix(),
        report_rows: 25,
    }
}

fn run_start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn test_single_line_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &format!("{}\n", SINGLE_LINE), Some(""));
    let output_dir = config.output_dir.clone();

    let summary = Analyzer::with_run_start(config, run_start()).run().unwrap();
    let access = &summary.analysis.access;

    assert_eq!(access.pages.len(), 1);
    assert_eq!(access.pages.get(&"/index.html".to_string()).unwrap().hit_count, 1);
    assert_eq!(access.clients.len(), 1);
    assert_eq!(access.clients.get(&"192.168.1.1".to_string()), Some(&1));
    assert_eq!(access.browsers.len(), 1);
    assert_eq!(access.browsers.get(&BrowserCategory::Firefox), Some(&1));

    assert_eq!(summary.analysis.access_timeline.len(), 1);
    assert_eq!(summary.analysis.access_timeline[0].count, 1);
    assert_eq!(summary.analysis.access_timeline[0].label, "2023-10-10 20:00:00");
    assert!(summary.analysis.error_timeline.is_empty());

    assert!(summary.error_table.is_none());
    assert!(!output_dir.join(ERROR_TABLE).exists());
    assert!(output_dir.join(REPORT_FILE).exists());

    let mut reader = csv::Reader::from_path(output_dir.join(ACCESS_TABLE)).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    let row: Vec<&str> = rows[0].iter().collect();
    assert_eq!(row, vec!["/index.html", "192.168.1.1", "2023-10-10 20:55:36", "Firefox", "200", "GET"]);
}

#[test]
fn test_full_run_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), ACCESS_LOG, Some(ERROR_LOG));
    let output_dir = config.output_dir.clone();

    let summary = Analyzer::with_run_start(config, run_start()).run().unwrap();
    let store = &summary.store;
    let analysis = &summary.analysis;

    // noise and the line without a user agent are skipped
    assert_eq!(store.access_stats().attempted, 6);
    assert_eq!(store.access_stats().parsed, 4);
    assert_eq!(store.access_stats().skipped(), 2);
    assert_eq!(store.error_stats().parsed, 3);
    assert_eq!(store.error_stats().skipped(), 1);

    // counters add up to the parsed events
    assert_eq!(analysis.access.total_hits(), 4);
    assert_eq!(analysis.access.clients.iter().map(|(_, c)| c).sum::<usize>(), 4);
    assert_eq!(analysis.access.browsers.iter().map(|(_, c)| c).sum::<usize>(), 4);
    assert_eq!(analysis.severities.total_hits(), 3);
    assert_eq!(analysis.access_timeline.iter().map(|p| p.count).sum::<usize>(), 4);
    assert_eq!(analysis.error_timeline.iter().map(|p| p.count).sum::<usize>(), 3);

    // strictly increasing buckets, even though the input is not sorted
    for timeline in [&analysis.access_timeline, &analysis.error_timeline] {
        assert!(timeline.windows(2).all(|w| w[0].bucket_start < w[1].bucket_start));
    }
    let labels: Vec<_> = analysis.access_timeline.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["2023-10-10 09:00:00", "2023-10-10 10:00:00", "2023-10-10 12:00:00"]);

    // /b was seen first and ties /a at two hits
    let pages: Vec<_> = analysis.access.ranked_pages().into_iter().map(|(p, s)| (p.as_str(), s.hit_count)).collect();
    assert_eq!(pages, vec![("/b", 2), ("/a", 2)]);

    let browsers: Vec<_> = analysis.access.ranked_browsers().into_iter().map(|(b, c)| (*b, *c)).collect();
    assert_eq!(
        browsers,
        vec![
            (BrowserCategory::Firefox, 2),
            (BrowserCategory::Chrome, 1),
            (BrowserCategory::BotCrawler, 1),
        ]
    );

    let severities: Vec<_> = analysis.severities.ranked().into_iter().map(|(l, s)| (l.as_str(), s.hit_count)).collect();
    assert_eq!(severities, vec![("php:error", 2), ("php:warning", 1)]);
    let warning = analysis.severities.severities.get(&"php:warning".to_string()).unwrap();
    assert_eq!(warning.clients, vec!["unknown"]);

    // round trip: the access table holds every parsed event in encounter order
    let mut reader = csv::Reader::from_path(output_dir.join(ACCESS_TABLE)).unwrap();
    let pages_in_table: Vec<String> = reader.records().map(|r| r.unwrap()[0].to_string()).collect();
    let pages_in_store: Vec<String> = store.access_events().iter().map(|e| e.request_path.clone()).collect();
    assert_eq!(pages_in_table, pages_in_store);

    let mut reader = csv::Reader::from_path(summary.error_table.as_ref().unwrap()).unwrap();
    assert_eq!(reader.records().count(), 3);

    let html = fs::read_to_string(&summary.report).unwrap();
    assert!(html.contains(r#"{"x":"2023-10-10 09:00:00","y":1}"#));
    assert!(html.contains(r#""labels":["Firefox","Chrome","Bot/Crawler"]"#));
    assert!(html.contains("Generated on: 2023-11-14 22:13:20"));
}

#[test]
fn test_missing_error_log_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), ACCESS_LOG, None);

    let summary = Analyzer::with_run_start(config, run_start()).run().unwrap();
    assert!(summary.store.error_events().is_empty());
    assert!(summary.analysis.error_timeline.is_empty());
    assert!(summary.error_table.is_none());
    assert_eq!(summary.analysis.access.total_hits(), 4);
}

#[test]
fn test_missing_access_log_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), "", Some(ERROR_LOG));
    config.access_log = dir.path().join("gone.log");

    let err = Analyzer::new(config).run().unwrap_err();
    assert!(matches!(err, AnalyzerError::AccessLog { .. }));
    assert!(err.to_string().contains("gone.log"));
}

#[test]
fn test_unwritable_output_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), ACCESS_LOG, None);
    // a regular file where the output directory should be
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    config.output_dir = blocker.join("reports");

    let err = Analyzer::new(config).run().unwrap_err();
    assert!(matches!(err, AnalyzerError::CreateOutputDir { .. }));
    assert!(err.to_string().contains("blocker"));
}

#[test]
fn test_error_timestamps_use_offset() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), ACCESS_LOG, Some(ERROR_LOG));
    config.utc_offset = chrono::FixedOffset::east_opt(2 * 3600).unwrap();

    let summary = Analyzer::with_run_start(config, run_start()).run().unwrap();
    // 10:30 local at +02:00 is 08:30 UTC
    let first = &summary.store.error_events()[0];
    assert_eq!(first.timestamp, 1_696_926_600);
    // and the label is shown back in local time
    assert_eq!(summary.analysis.error_timeline[0].label, "2023-10-10 10:00:00");
}
