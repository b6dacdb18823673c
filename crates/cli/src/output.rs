//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use parkcheck_e2e::report::{Status, SuiteResult, TestResult};
use parkcheck_e2e::runner::CaseInfo;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for CaseInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Module", "Case", "Tags"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.module.clone(), self.name.clone(), self.tags.join(", ")]
    }
}

impl TableDisplay for TestResult {
    fn headers() -> Vec<&'static str> {
        vec!["Case", "Status", "Duration", "Details"]
    }

    fn row(&self) -> Vec<String> {
        let mut details = self.error.clone().unwrap_or_default();
        if let Some(location) = &self.location {
            details.push_str(&format!("\nat {}", location));
        }
        vec![
            self.qualified_name(),
            self.status.as_str().to_string(),
            format!("{} ms", self.duration_ms),
            details,
        ]
    }
}

fn new_table(headers: Vec<&'static str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers);
    table
}

fn print_plain(headers: &[&str], row: &[String]) {
    for (header, value) in headers.iter().zip(row.iter()) {
        println!("{}: {}", header, value);
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        return;
    }

    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = new_table(T::headers());
            for item in items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        _ => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                print_plain(&T::headers(), &item.row());
            }
        }
    }
}

/// Print per-case results followed by the totals line
pub fn print_suite(suite: &SuiteResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(suite).unwrap_or_default());
            return;
        }
        OutputFormat::Table => {
            let mut table = new_table(TestResult::headers());
            for result in &suite.results {
                let mut row = result.row().into_iter().map(Cell::new).collect::<Vec<_>>();
                row[1] = Cell::new(result.status.as_str()).fg(status_color(result.status));
                table.add_row(row);
            }
            println!("{table}");
        }
        OutputFormat::Plain => {
            for result in &suite.results {
                print_plain(&TestResult::headers(), &result.row());
                println!("---");
            }
        }
    }

    let summary = format!(
        "{} total, {} passed, {} failed, {} skipped in {} ms",
        suite.total, suite.passed, suite.failed, suite.skipped, suite.duration_ms
    );
    if suite.success() {
        print_success(&summary);
    } else {
        print_error(&summary);
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Passed => Color::Green,
        Status::Failed => Color::Red,
        Status::Skipped => Color::Yellow,
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message.green());
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}
