// Terminal rendering for scopes, publishers and published batches
use colored::Colorize;
use std::fmt::Display;
use std::time::Duration;
use tally_core::{PublishRequest, HIGH_STORAGE_RESOLUTION};
use tally_scopes::ScopeConfig;

const LABEL_WIDTH: usize = 20;

pub fn section(title: &str) {
    println!("{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count()).cyan());
}

pub fn field(label: &str, value: impl Display) {
    println!("{}", field_line(label, value));
}

fn field_line(label: &str, value: impl Display) -> String {
    let label = format!("{:<width$}", format!("{}:", label), width = LABEL_WIDTH);
    format!("  {} {}", label.dimmed(), value)
}

pub fn outcome(ok: bool, text: &str) {
    println!("{}", outcome_line(ok, text));
}

fn outcome_line(ok: bool, text: &str) -> String {
    if ok {
        format!("{} {}", "✓".green().bold(), text.green())
    } else {
        format!("{} {}", "✗".red().bold(), text.red())
    }
}

pub fn hint(text: &str) {
    println!("{} {}", "›".blue().bold(), text);
}

/// Everything a scope file resolves to, one field per line.
pub fn scope_details(scope: &ScopeConfig) {
    field("Namespace", &scope.namespace);
    field("App", &scope.app_name);
    if let Some(component) = &scope.component {
        field("Component", component);
    }
    field("Flush interval", interval(scope.flush_interval));
    field("Storage resolution", resolution(scope.storage_resolution));
    field("Publisher", scope.publisher.kind());
}

pub fn publisher_kind(kind: &str, description: &str) {
    println!("  {} {:<12} {}", "•".green(), kind, description);
}

pub fn batch_heading(index: usize, request: &PublishRequest) {
    println!("\n{}", batch_heading_line(index, request));
}

fn batch_heading_line(index: usize, request: &PublishRequest) -> String {
    format!(
        "{} {} ({} metrics)",
        format!("Batch {}:", index + 1).bold(),
        request.namespace.cyan(),
        request.len()
    )
}

fn interval(value: Duration) -> String {
    humantime::format_duration(value).to_string()
}

fn resolution(seconds: u32) -> String {
    if seconds == HIGH_STORAGE_RESOLUTION {
        format!("{}s (high)", seconds)
    } else {
        format!("{}s (standard)", seconds)
    }
}
