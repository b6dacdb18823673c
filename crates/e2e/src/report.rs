//! Test results and the report sink
//!
//! Results are written as `test-results.json` plus a self-contained
//! `report.html` that embeds screenshots as base64 images. Each screenshot
//! is also saved under `screenshots/`, named by the hash of its bytes.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::E2eResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
        }
    }
}

/// Image captured from the live session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub mime_type: String,

    /// SHA-256 of the decoded image bytes
    pub sha256: String,

    /// Where the image was written, once the report is saved
    pub path: Option<PathBuf>,

    #[serde(skip)]
    pub data_base64: String,
}

impl Attachment {
    /// Wrap a base64 PNG, validating the encoding.
    pub fn png(data_base64: String) -> E2eResult<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(&data_base64)?;
        Ok(Self {
            mime_type: "image/png".to_string(),
            sha256: hex::encode(Sha256::digest(&bytes)),
            path: None,
            data_base64,
        })
    }

    fn file_name(&self) -> String {
        format!("{}.png", self.sha256.get(..16).unwrap_or(&self.sha256))
    }
}

/// Result of running a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub module: String,
    pub name: String,
    pub status: Status,
    pub duration_ms: u64,
    pub error: Option<String>,

    /// Page location when the case ended, captured on failure
    pub location: Option<String>,

    pub screenshot: Option<Attachment>,
}

impl TestResult {
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }
}

/// Result of running all selected cases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl SuiteResult {
    pub fn from_results(started_at: DateTime<Utc>, duration_ms: u64, results: Vec<TestResult>) -> Self {
        let count = |status: Status| results.iter().filter(|r| r.status == status).count();
        Self {
            started_at,
            total: results.len(),
            passed: count(Status::Passed),
            failed: count(Status::Failed),
            skipped: count(Status::Skipped),
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Files produced by [`ReportWriter::write`]
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Writes results into an output directory
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save screenshots, then the JSON and HTML reports.
    pub fn write(&self, suite: &mut SuiteResult) -> E2eResult<ReportPaths> {
        let screenshot_dir = self.output_dir.join("screenshots");
        std::fs::create_dir_all(&screenshot_dir)?;

        for result in &mut suite.results {
            if let Some(attachment) = result.screenshot.as_mut() {
                let path = screenshot_dir.join(attachment.file_name());
                let bytes = base64::engine::general_purpose::STANDARD.decode(&attachment.data_base64)?;
                std::fs::write(&path, bytes)?;
                attachment.path = Some(path);
            }
        }

        let json = self.output_dir.join("test-results.json");
        std::fs::write(&json, serde_json::to_string_pretty(suite)?)?;

        let html = self.output_dir.join("report.html");
        std::fs::write(&html, render_html(suite))?;

        info!("Results written to: {}", self.output_dir.display());
        Ok(ReportPaths { json, html })
    }
}

/// Self-contained HTML report
pub fn render_html(suite: &SuiteResult) -> String {
    let mut html = String::new();

    html.push_str(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>parkcheck report</title>
<style>
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; width: 100%; }
td, th { border: 1px solid #ccc; padding: 6px; vertical-align: top; text-align: left; }
.passed { color: #1a7f37; } .failed { color: #cf222e; } .skipped { color: #9a6700; }
pre { white-space: pre-wrap; margin: 0; }
img { max-width: 480px; border: 1px solid #ccc; }
</style>
</head>
<body>
"#,
    );

    let _ = writeln!(
        html,
        "<h1>parkcheck report</h1>\n<p>Started {} &middot; {} total, {} passed, {} failed, {} skipped in {} ms</p>",
        suite.started_at.to_rfc3339(),
        suite.total,
        suite.passed,
        suite.failed,
        suite.skipped,
        suite.duration_ms
    );

    html.push_str("<table>\n<tr><th>Test</th><th>Result</th><th>Duration</th><th>Details</th></tr>\n");
    for result in &suite.results {
        let status = result.status.as_str();
        let _ = write!(
            html,
            "<tr><td>{}</td><td class=\"{}\">{}</td><td>{} ms</td><td>",
            escape_html(&result.qualified_name()),
            status,
            status,
            result.duration_ms
        );
        if let Some(error) = &result.error {
            let _ = write!(html, "<pre>{}</pre>", escape_html(error));
        }
        if let Some(location) = &result.location {
            let _ = write!(html, "<p>Location: {}</p>", escape_html(location));
        }
        if let Some(shot) = &result.screenshot {
            let _ = write!(
                html,
                "<img alt=\"screenshot\" src=\"data:{};base64,{}\">",
                shot.mime_type, shot.data_base64
            );
        }
        html.push_str("</td></tr>\n");
    }
    html.push_str("</table>\n</body>\n</html>\n");

    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
