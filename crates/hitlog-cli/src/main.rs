// hitlog CLI - Apache access/error log analyzer

use chrono::FixedOffset;
use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use hitlog_core::config::parse_utc_offset;
use hitlog_core::{load_config, Analyzer, AnalyzerConfig, RunSummary};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SUMMARY_ROWS: usize = 10;

#[derive(Parser)]
#[command(name = "hitlog")]
#[command(version = "0.1.0")]
#[command(about = "Apache log analysis: HTML report plus CSV tables", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Access log to analyze
    #[arg(short, long)]
    access: Option<PathBuf>,

    /// Error log to analyze (skipped when missing)
    #[arg(short, long)]
    error: Option<PathBuf>,

    /// Output directory for report.html and the csv tables
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file; flags override its values
    #[arg(short, long, env = "HITLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Offset for displayed times and zone-less error timestamps (UTC, +02:00, -0700)
    #[arg(long, value_parser = offset_arg, allow_hyphen_values = true)]
    utc_offset: Option<FixedOffset>,

    /// Accepted for compatibility, ignored
    #[arg(short, long)]
    generate: Option<String>,

    /// Accepted for compatibility, ignored
    #[arg(short, long)]
    url: Option<String>,
}

// flags whose next argument is their value, so a literal "-h" there is not a help request
const VALUE_FLAGS: [&str; 13] = [
    "-a", "--access", "-e", "--error", "-o", "--output", "-c", "--config",
    "-g", "--generate", "-u", "--url", "--utc-offset",
];

/// `-h`/`--help` anywhere before `--` wins, whatever else is on the command line
fn help_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_ref() {
            "-h" | "--help" => return true,
            "--" => return false,
            flag if VALUE_FLAGS.contains(&flag) => {
                args.next();
            }
            _ => {}
        }
    }
    false
}

fn offset_arg(raw: &str) -> Result<FixedOffset, String> {
    parse_utc_offset(raw).map_err(|e| e.to_string())
}

fn main() {
    if help_requested(env::args().skip(1)) {
        return;
    }
    let cli = Cli::parse();

    init_logging();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: Cli) -> Result<AnalyzerConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AnalyzerConfig::default(),
    };

    if let Some(access) = cli.access {
        config.access_log = access;
    }
    if let Some(error) = cli.error {
        config.error_log = error;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(offset) = cli.utc_offset {
        config.utc_offset = offset;
    }
    if cli.generate.is_some() || cli.url.is_some() {
        debug!(generate = ?cli.generate, url = ?cli.url, "Ignoring --generate/--url");
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(cli)?;

    let summary = Analyzer::new(config).run()?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let access = summary.store.access_stats();
    let errors = summary.store.error_stats();

    println!("\n{}", "📊 Log Analysis".cyan().bold());
    println!("{}", "─".repeat(50).dimmed());
    println!(
        "  {} {} parsed, {} skipped",
        "Access log:".dimmed(),
        access.parsed.to_string().green(),
        access.skipped().to_string().yellow()
    );
    println!(
        "  {} {} parsed, {} skipped",
        "Error log:".dimmed(),
        errors.parsed.to_string().red(),
        errors.skipped().to_string().yellow()
    );
    println!("  {} {}", "Report:".dimmed(), summary.report.display());
    println!("  {} {}", "Access table:".dimmed(), summary.access_table.display());
    match &summary.error_table {
        Some(path) => println!("  {} {}", "Error table:".dimmed(), path.display()),
        None => println!("  {} {}", "Error table:".dimmed(), "not written (no error events)".dimmed()),
    }

    let analysis = &summary.analysis;
    if analysis.access.pages.is_empty() {
        println!("\n{}", "No access events parsed.".yellow());
        return;
    }

    let mut pages = Table::new();
    pages.load_preset(UTF8_FULL);
    pages.set_header(vec!["Page", "Hits", "Clients"]);
    for (path, stat) in analysis.access.ranked_pages().into_iter().take(SUMMARY_ROWS) {
        pages.add_row(vec![
            truncate(path, 60),
            stat.hit_count.to_string(),
            stat.distinct_clients().to_string(),
        ]);
    }
    println!("\n{}", "Top Pages".cyan().bold());
    println!("{pages}");

    let total = analysis.access.total_hits().max(1) as f64;
    let mut browsers = Table::new();
    browsers.load_preset(UTF8_FULL);
    browsers.set_header(vec!["Browser", "Requests", "Share"]);
    for (browser, count) in analysis.access.ranked_browsers() {
        browsers.add_row(vec![
            browser.label().to_string(),
            count.to_string(),
            format!("{:.1}%", *count as f64 * 100.0 / total),
        ]);
    }
    println!("\n{}", "Browsers".cyan().bold());
    println!("{browsers}");

    if !analysis.severities.severities.is_empty() {
        let mut severities = Table::new();
        severities.load_preset(UTF8_FULL);
        severities.set_header(vec!["Severity", "Count", "Clients"]);
        for (level, stat) in analysis.severities.ranked() {
            severities.add_row(vec![
                level.clone(),
                stat.hit_count.to_string(),
                stat.distinct_clients().to_string(),
            ]);
        }
        println!("\n{}", "Error Severities".cyan().bold());
        println!("{severities}");
    }

    println!();
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "hitlog", "-a", "a.log", "--error", "e.log", "-o", "out", "-g", "yes", "-u", "http://x",
        ])
        .unwrap();

        let config = build_config(cli).unwrap();
        assert_eq!(config.access_log, PathBuf::from("a.log"));
        assert_eq!(config.error_log, PathBuf::from("e.log"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_help_requested() {
        assert!(help_requested(["-h"]));
        assert!(help_requested(["--help"]));
        // unknown options do not get in the way
        assert!(help_requested(["--bogus", "-h"]));
        assert!(help_requested(["-h", "--bogus", "-x"]));
        assert!(help_requested(["-a", "access.log", "-h"]));

        assert!(!help_requested(Vec::<String>::new()));
        assert!(!help_requested(["-a", "access.log"]));
        // a value that happens to be "-h" is not a request
        assert!(!help_requested(["-g", "-h"]));
        assert!(!help_requested(["--", "-h"]));
    }

    #[test]
    fn test_offset_flag() {
        let cli = Cli::try_parse_from(["hitlog", "--utc-offset", "-07:00"]).unwrap();
        let config = build_config(cli).unwrap();
        assert_eq!(config.utc_offset.local_minus_utc(), -7 * 3600);

        let cli = Cli::try_parse_from(["hitlog", "--utc-offset", "-0530", "-a", "a.log"]).unwrap();
        let config = build_config(cli).unwrap();
        assert_eq!(config.utc_offset.local_minus_utc(), -(5 * 3600 + 1800));
        assert_eq!(config.access_log, PathBuf::from("a.log"));

        let cli = Cli::try_parse_from(["hitlog", "--utc-offset=+02:00"]).unwrap();
        assert_eq!(build_config(cli).unwrap().utc_offset.local_minus_utc(), 7200);

        assert!(Cli::try_parse_from(["hitlog", "--utc-offset", "Mars/Olympus"]).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hitlog.toml");
        std::fs::write(&path, "access_log = \"from-file.log\"\noutput_dir = \"file-out\"\n").unwrap();

        let cli = Cli::try_parse_from(["hitlog", "-c", path.to_str().unwrap(), "-o", "flag-out"]).unwrap();
        let config = build_config(cli).unwrap();
        assert_eq!(config.access_log, PathBuf::from("from-file.log"));
        assert_eq!(config.output_dir, PathBuf::from("flag-out"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("/a/very/long/path", 10), "/a/very...");
    }
}
