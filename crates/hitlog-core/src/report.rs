//! HTML report rendering.
//!
//! [`render_report`] is pure: it only reads the ranked aggregates and the two
//! timelines. [`write_report`] puts the document at `<output_dir>/report.html`,
//! replacing any previous report.

use crate::aggregate::{PageStat, SeverityStat};
use crate::error::AnalyzerError;
use crate::timeline::TimelinePoint;
use crate::BrowserCategory;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_FILE: &str = "report.html";

const CHART_SCRIPTS: &str = r#"<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<script src="https://cdn.jsdelivr.net/npm/date-fns@2.29.3/index.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns@3.0.0/dist/chartjs-adapter-date-fns.bundle.min.js"></script>"#;

const STYLE: &str = r#"<style>
body{font-family:Arial,sans-serif;margin:20px;background:#f5f5f5;}
.container{max-width:1400px;margin:0 auto;background:white;padding:30px;border-radius:10px;}
h1{color:#333;border-bottom:3px solid #007bff;padding-bottom:10px;}
h2{color:#555;margin-top:30px;border-bottom:1px solid #ddd;padding-bottom:5px;}
table{width:100%;border-collapse:collapse;margin:20px 0;}
th,td{padding:10px;text-align:left;border-bottom:1px solid #ddd;}
th{background:#007bff;color:white;}
tr:hover{background:#f5f5f5;}
.chart-container{height:400px;margin:30px 0;}
.browser-chart{max-width:500px;margin:30px auto;}
</style>"#;

/// Ranked views and timelines, borrowed from a finished analysis
pub struct ReportInput<'a> {
    pub pages: Vec<(&'a String, &'a PageStat)>,
    pub clients: Vec<(&'a String, &'a usize)>,
    pub browsers: Vec<(&'a BrowserCategory, &'a usize)>,
    pub severities: Vec<(&'a String, &'a SeverityStat)>,
    pub access_timeline: &'a [TimelinePoint],
    pub error_timeline: &'a [TimelinePoint],
    pub generated_at: String,
}

/// Render the complete report document; each ranked table shows at most `max_rows` rows
pub fn render_report(input: &ReportInput<'_>, max_rows: usize) -> String {
    let access_json = script_json(&input.access_timeline);
    let error_json = script_json(&input.error_timeline);
    let browser_json = script_json(&browser_chart_data(&input.browsers));

    let pages = table(
        &["Page", "Hits", "Distinct Clients"],
        input.pages.iter().take(max_rows).map(|(path, stat)| {
            vec![path.to_string(), stat.hit_count.to_string(), stat.distinct_clients().to_string()]
        }),
    );
    let clients = table(
        &["Client", "Requests"],
        input
            .clients
            .iter()
            .take(max_rows)
            .map(|(ip, count)| vec![ip.to_string(), count.to_string()]),
    );
    let browsers = table(
        &["Browser", "Requests"],
        input
            .browsers
            .iter()
            .take(max_rows)
            .map(|(browser, count)| vec![browser.label().to_string(), count.to_string()]),
    );
    let severities = if input.severities.is_empty() {
        "<p>No error log entries.</p>".to_string()
    } else {
        table(
            &["Severity", "Count", "Distinct Clients"],
            input.severities.iter().take(max_rows).map(|(level, stat)| {
                vec![level.to_string(), stat.hit_count.to_string(), stat.distinct_clients().to_string()]
            }),
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Apache Log Analysis Report</title>
{scripts}
{style}
</head>
<body>
<div class="container">
<h1>Apache Log Analysis Report</h1>
<p>Generated on: {generated_at}</p>
<h2>Access Timeline</h2>
<div class="chart-container"><canvas id="accessTimeline"></canvas></div>
<h2>Error Timeline</h2>
<div class="chart-container"><canvas id="errorTimeline"></canvas></div>
<h2>Browser Distribution</h2>
<div class="browser-chart"><canvas id="browserChart"></canvas></div>
{browsers}
<h2>Top Pages</h2>
{pages}
<h2>Top Clients</h2>
{clients}
<h2>Error Severities</h2>
{severities}
</div>
<script>
const accessData = {access_json};
const errorData = {error_json};
const browserData = {browser_json};
new Chart(document.getElementById('accessTimeline'),{{type:'line',data:{{datasets:[{{label:'Access',data:accessData,borderColor:'rgb(75,192,192)'}}]}},options:{{responsive:true,maintainAspectRatio:false,scales:{{x:{{type:'time'}},y:{{beginAtZero:true}}}}}}}});
new Chart(document.getElementById('errorTimeline'),{{type:'line',data:{{datasets:[{{label:'Errors',data:errorData,borderColor:'rgb(255,99,132)'}}]}},options:{{responsive:true,maintainAspectRatio:false,scales:{{x:{{type:'time'}},y:{{beginAtZero:true}}}}}}}});
new Chart(document.getElementById('browserChart'),{{type:'doughnut',data:browserData,options:{{responsive:true}}}});
</script>
</body>
</html>
"#,
        scripts = CHART_SCRIPTS,
        style = STYLE,
        generated_at = escape_html(&input.generated_at),
    )
}

/// Write the report into `output_dir`, overwriting an existing one
pub fn write_report(output_dir: &Path, html: &str) -> Result<PathBuf, AnalyzerError> {
    let path = output_dir.join(REPORT_FILE);
    fs::write(&path, html).map_err(|source| AnalyzerError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn browser_chart_data(browsers: &[(&BrowserCategory, &usize)]) -> serde_json::Value {
    let labels: Vec<&str> = browsers.iter().map(|(b, _)| b.label()).collect();
    let data: Vec<usize> = browsers.iter().map(|(_, count)| **count).collect();
    json!({ "labels": labels, "datasets": [{ "data": data }] })
}

// JSON that can sit inside <script> without closing it early
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
}

fn table<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut html = String::from("<table>\n<tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n");

    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>");
    html
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
