// hitlog Log Simulator - Generates realistic Apache logs for testing
// Writes a combined-format access log and an error log in the shapes hitlog parses

use chrono::{DateTime, Timelike, Utc};
use clap::Parser;
use colored::Colorize;
use rand::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

// Site map with relative request weights
const PAGES: [(&str, u32); 28] = [
    ("/index.php", 80),
    ("/products_input.html", 60),
    ("/scanner.html", 55),
    ("/login.php", 50),
    ("/api_endpoints.php", 45),
    ("/add_product.php", 40),
    ("/nutrition_input.html", 35),
    ("/brands_input.html", 30),
    ("/categories_input.html", 25),
    ("/lookup_product.php", 25),
    ("/logout.php", 20),
    ("/user_type_select.html", 20),
    ("/users_input.html", 15),
    ("/tags_input.html", 15),
    ("/products_tags_input.html", 10),
    ("/scans_input.html", 10),
    ("/alternatives_input.html", 10),
    ("/casual_user_input.html", 8),
    ("/fitness_user_input.html", 8),
    ("/health_user_input.html", 8),
    ("/feedback.html", 5),
    ("/imprint.html", 3),
    ("/maintenance.php", 2),
    ("/style.css", 100),
    ("/nutrition_extractor.js", 50),
    ("/img/logo.png", 30),
    ("/img/product1.jpg", 20),
    ("/favicon.ico", 40),
];

const CLIENTS: [&str; 22] = [
    "192.168.1.100", "192.168.1.101", "192.168.1.102", "192.168.1.103",
    "10.0.0.5", "10.0.0.6", "10.0.0.7", "10.0.0.8",
    "172.16.0.10", "172.16.0.11", "172.16.0.12",
    "127.0.0.1", "::1",
    "203.0.113.0", "198.51.100.0", "192.0.2.1",
    "93.184.216.34", "151.101.1.140", "104.244.42.65",
    "134.94.1.10", "134.94.1.11", "134.94.1.12",
];

const USER_AGENTS: [&str; 10] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/119.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Android 13; Mobile; rv:109.0) Gecko/117.0 Firefox/119.0",
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
    "Mozilla/5.0 (compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm)",
];

// 20x 200, 5x 304, 3x 404, then one each of the rarer codes
const STATUS_MIX: [(u16, u32); 7] = [(200, 20), (304, 5), (404, 3), (301, 1), (302, 1), (500, 1), (403, 1)];

const REFERERS: [&str; 10] = [
    "-", "-", "-", "-",
    "http://localhost:8080/",
    "http://localhost:8080/index.php",
    "http://localhost:8080/products_input.html",
    "https://www.google.com/",
    "https://www.bing.com/",
    "http://localhost:8080/scanner.html",
];

const ERROR_KINDS: [(&str, &[&str]); 6] = [
    ("php:error", &[
        "PHP Fatal error: Uncaught Error: Call to undefined function",
        "PHP Fatal error: Cannot access private property",
        "PHP Fatal error: Class not found",
        "PHP Fatal error: Maximum execution time exceeded",
    ]),
    ("php:warning", &[
        "PHP Warning: Invalid argument supplied for foreach()",
        "PHP Warning: mysqli_connect(): Connection refused",
        "PHP Warning: Undefined variable",
        "PHP Warning: Division by zero",
    ]),
    ("php:notice", &[
        "PHP Notice: Undefined index",
        "PHP Notice: Trying to access array offset on value of type null",
    ]),
    ("core:error", &[
        "AH00124: Request exceeded the limit of 10 internal redirects",
        "AH00126: Invalid URI in request",
    ]),
    ("ssl:warn", &[
        "AH01909: server certificate does NOT include an ID which matches the server name",
    ]),
    ("authz_core:error", &[
        "AH01630: client denied by server configuration",
    ]),
];

const SCANNER_ADDRESS: &str = "203.0.113.99";
const SCANNER_REQUESTS: i64 = 20;
const SESSION_ADDRESS: &str = "192.168.1.105";
const SESSION_PAGES: [&str; 5] = ["/login.php", "/index.php", "/products_input.html", "/add_product.php", "/logout.php"];

const ACCESS_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";
const ERROR_TIME_FORMAT: &str = "%a %b %d %H:%M:%S%.6f %Y";

// spacing between generated requests, in seconds
const REQUEST_STEP: i64 = 350;
const HISTORY_SECONDS: i64 = 48 * 3600;

#[derive(Parser)]
#[command(name = "hitlog-simulate")]
#[command(about = "Generate realistic Apache access and error logs for hitlog testing")]
struct Args {
    /// Access log output path
    #[arg(long, default_value = "test_access.log")]
    access: PathBuf,

    /// Error log output path
    #[arg(long, default_value = "test_error.log")]
    error: PathBuf,

    /// Request slots to simulate (quiet hours drop some of them)
    #[arg(long, default_value = "500")]
    requests: usize,

    /// Error lines to write
    #[arg(long, default_value = "50")]
    errors: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let now = Utc::now();

    println!();
    println!("{}", "╔══════════════════════════════════════════════════╗".cyan());
    println!("{}", "║         🚀 hitlog Log Simulator                  ║".cyan().bold());
    println!("{}", "╚══════════════════════════════════════════════════╝".cyan());
    println!();

    let traffic = traffic_lines(&mut rng, now, args.requests);
    write_lines(&args.access, &traffic, false)?;

    let errors = error_lines(&mut rng, now, args.errors);
    write_lines(&args.error, &errors, false)?;

    // scripted traffic goes after the background requests
    let mut scripted = scanner_lines(now);
    scripted.extend(session_lines(&mut rng, now));
    write_lines(&args.access, &scripted, true)?;

    println!(
        "{} {} access lines → {}",
        "✓".green(),
        (traffic.len() + scripted.len()).to_string().green(),
        args.access.display()
    );
    println!(
        "{} {} error lines → {}",
        "✓".green(),
        errors.len().to_string().red(),
        args.error.display()
    );
    println!(
        "  {} {} scanner hits from {}, {}-page session from {}",
        "Scripted:".dimmed(),
        SCANNER_REQUESTS,
        SCANNER_ADDRESS.yellow(),
        SESSION_PAGES.len(),
        SESSION_ADDRESS.cyan()
    );
    println!();

    Ok(())
}

fn write_lines(path: &Path, lines: &[String], append: bool) -> io::Result<()> {
    let file = if append {
        OpenOptions::new().append(true).create(true).open(path)?
    } else {
        File::create(path)?
    };

    let mut out = BufWriter::new(file);
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

// ============ LINE GENERATORS ============

/// Background traffic over the last 48 hours, denser during the working day
fn traffic_lines(rng: &mut impl Rng, now: DateTime<Utc>, requests: usize) -> Vec<String> {
    let base = now.timestamp() - HISTORY_SECONDS;
    let mut lines = Vec::with_capacity(requests);

    for slot in 0..requests as i64 {
        let slot_time = base + slot * REQUEST_STEP;
        let multiplier = traffic_multiplier(hour_of(slot_time));
        if rng.random_range(1..=10) > multiplier * 3 {
            continue;
        }

        let timestamp = slot_time + rng.random_range(-300..=300);
        let page = weighted(rng, &PAGES);
        let method = if page.contains(".php") && rng.random_range(1..=5) == 1 {
            "POST"
        } else {
            "GET"
        };
        let status = weighted(rng, &STATUS_MIX);
        let size = match status {
            200 => rng.random_range(1000..=50000),
            304 => 0,
            _ => rng.random_range(100..=500),
        };

        lines.push(access_line(
            *pick(rng, &CLIENTS),
            timestamp,
            method,
            page,
            status,
            size,
            *pick(rng, &REFERERS),
            *pick(rng, &USER_AGENTS),
        ));
    }

    lines
}

/// Roughly one error per hour across the same window
fn error_lines(rng: &mut impl Rng, now: DateTime<Utc>, count: usize) -> Vec<String> {
    let base = now.timestamp() - HISTORY_SECONDS;

    (0..count as i64)
        .map(|i| {
            let timestamp = base + i * 3600 + rng.random_range(-1800..=1800);
            let micros = rng.random_range(0..1_000_000u32);
            let (tag, messages) = *pick(rng, &ERROR_KINDS);

            let mut line = format!(
                "[{}] [{}] [pid {}] [client {}:{}] {}",
                format_time(timestamp, micros, ERROR_TIME_FORMAT),
                tag,
                rng.random_range(1000..=9999),
                *pick(rng, &CLIENTS),
                rng.random_range(10000..=65535),
                pick(rng, messages)
            );

            if tag.starts_with("php") {
                let (file, _) = *pick(rng, &PAGES);
                if file.contains(".php") || file.contains(".html") {
                    line.push_str(&format!(
                        " in /var/www/html/src{} on line {}",
                        file,
                        rng.random_range(1..=200)
                    ));
                }
            }

            line
        })
        .collect()
}

/// A burst of probes for an admin page, two seconds apart, an hour ago
fn scanner_lines(now: DateTime<Utc>) -> Vec<String> {
    let start = now.timestamp() - 3600;

    (0..SCANNER_REQUESTS)
        .map(|i| {
            access_line(
                SCANNER_ADDRESS,
                start + i * 2,
                "GET",
                "/admin/config.php",
                404,
                289,
                "-",
                "Bot/Scanner",
            )
        })
        .collect()
}

/// One user logging in, adding a product and logging out, two hours ago
fn session_lines(rng: &mut impl Rng, now: DateTime<Utc>) -> Vec<String> {
    let mut timestamp = now.timestamp() - 7200;
    let mut lines = Vec::with_capacity(SESSION_PAGES.len());

    for page in SESSION_PAGES {
        let method = match page {
            "/login.php" | "/add_product.php" => "POST",
            _ => "GET",
        };
        lines.push(access_line(
            SESSION_ADDRESS,
            timestamp,
            method,
            page,
            200,
            rng.random_range(1000..=5000),
            "http://localhost:8080/",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/119.0",
        ));
        timestamp += rng.random_range(30..=300);
    }

    lines
}

#[allow(clippy::too_many_arguments)]
fn access_line(
    client: &str,
    timestamp: i64,
    method: &str,
    page: &str,
    status: u16,
    size: u32,
    referer: &str,
    agent: &str,
) -> String {
    format!(
        r#"{} - - [{}] "{} {} HTTP/1.1" {} {} "{}" "{}""#,
        client,
        format_time(timestamp, 0, ACCESS_TIME_FORMAT),
        method,
        page,
        status,
        size,
        referer,
        agent
    )
}

// ============ HELPERS ============

fn traffic_multiplier(hour: u32) -> u32 {
    match hour {
        9..=17 => 3,
        18..=22 => 2,
        _ => 1,
    }
}

fn hour_of(timestamp: i64) -> u32 {
    DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.hour())
        .unwrap_or(0)
}

fn format_time(timestamp: i64, micros: u32, format: &str) -> String {
    DateTime::from_timestamp(timestamp, micros * 1000)
        .unwrap_or_default()
        .format(format)
        .to_string()
}

fn pick<'a, T>(rng: &mut impl Rng, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

fn weighted<T: Copy>(rng: &mut impl Rng, items: &[(T, u32)]) -> T {
    let total: u32 = items.iter().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    for (item, weight) in items {
        if roll < *weight {
            return *item;
        }
        roll -= weight;
    }
    items[0].0
}
