use crate::ui;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tally_core::PublishRequest;

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Sum")]
    sum: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Avg")]
    avg: String,
    #[tabled(rename = "Dimensions")]
    dimensions: String,
}

pub async fn execute(published_file: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let contents = tokio::fs::read_to_string(&published_file)
        .await
        .with_context(|| format!("Cannot read {}", published_file.display()))?;
    let requests = parse_requests(&contents)?;

    let rendered = match format.as_str() {
        "cli" => {
            print_cli_report(&published_file, &requests);
            return Ok(());
        }
        "json" => serde_json::to_string_pretty(&requests)?,
        "markdown" => generate_markdown_report(&requests),
        _ => {
            anyhow::bail!("Unknown format: {}", format);
        }
    };

    if let Some(output_path) = output {
        tokio::fs::write(&output_path, rendered).await?;
        ui::outcome(true, &format!("Report written to {}", output_path.display()));
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn parse_requests(contents: &str) -> Result<Vec<PublishRequest>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid batch on line {}", index + 1))
        })
        .collect()
}

fn rows(request: &PublishRequest) -> Vec<MetricRow> {
    request
        .metric_data
        .iter()
        .map(|datum| {
            let stats = &datum.statistic_values;
            MetricRow {
                name: datum.metric_name.clone(),
                unit: datum.unit.to_string(),
                count: stats.sample_count,
                sum: format!("{:.2}", stats.sum),
                min: format!("{:.2}", stats.minimum),
                max: format!("{:.2}", stats.maximum),
                avg: format!("{:.2}", stats.average()),
                dimensions: datum.dimensions.to_string(),
            }
        })
        .collect()
}

fn print_cli_report(published_file: &Path, requests: &[PublishRequest]) {
    ui::section("Published Batches");
    ui::field("File", published_file.display());
    ui::field("Batches", requests.len());

    for (i, request) in requests.iter().enumerate() {
        ui::batch_heading(i, request);
        let mut table = Table::new(rows(request));
        table.with(Style::rounded());
        println!("{}", table);
    }
}

fn generate_markdown_report(requests: &[PublishRequest]) -> String {
    let mut report = String::from("# Published Metrics\n");

    for (i, request) in requests.iter().enumerate() {
        let mut table = Table::new(rows(request));
        table.with(Style::markdown());
        report.push_str(&format!(
            "\n## Batch {}: {}\n\n{}\n",
            i + 1,
            request.namespace,
            table
        ));
    }

    report
}
