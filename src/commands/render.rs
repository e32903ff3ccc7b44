use crate::migration_tracking::{Revision, RevisionRecord};
use anyhow::Result;
use console::{Alignment, pad_str, style};
use std::time::Duration;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for terminals
    #[default]
    Human,
    /// JSON for scripts and CI
    Json,
}

const HEADERS: [&str; 8] = [
    "Version",
    "Description",
    "Type",
    "Script",
    "Installed On",
    "Rank",
    "Time",
    "Status",
];

pub fn print_revision(revision: &Revision, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => print!("{}", format_revision_table(revision)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(revision)?),
    }
    Ok(())
}

/// Render the current revision as a bordered table followed by failure reasons
pub fn format_revision_table(revision: &Revision) -> String {
    let mut out = format!(
        "Current version: {}\n",
        style(revision.version_label()).bold()
    );

    if revision.migrations.is_empty() {
        out.push_str("No migrations recorded\n");
        return out;
    }

    let rows: Vec<[String; 8]> = revision.migrations.iter().map(table_row).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    out.push_str(&separator);
    out.push_str(&format_line(&HEADERS.map(String::from), &widths));
    out.push_str(&separator);
    for (row, record) in rows.iter().zip(&revision.migrations) {
        let line = format_line(row, &widths);
        if record.succeeded() {
            out.push_str(&line);
        } else {
            out.push_str(&style(line).red().to_string());
        }
    }
    out.push_str(&separator);

    for record in revision.failures() {
        if let Some(reason) = &record.reason {
            out.push_str(&format!(
                "{} {} (version {}): {}\n",
                style("✗").red(),
                record.script,
                record.version,
                reason
            ));
        }
    }

    out
}

fn table_row(record: &RevisionRecord) -> [String; 8] {
    [
        record.version.to_string(),
        record.description.clone(),
        record.kind.to_string(),
        record.script.clone(),
        record
            .installation_time
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        record.installed_rank.to_string(),
        format_duration(Duration::from_millis(
            record.execution_time.max(0) as u64,
        )),
        if record.succeeded() {
            "Success".to_string()
        } else {
            "Failed".to_string()
        },
    ]
}

fn format_line(cells: &[String; 8], widths: &[usize; 8]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!(" {} ", pad_str(cell, *width, Alignment::Left, None)))
        .collect();
    format!("|{}|\n", cells.join("|"))
}

pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let millis = d.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{}s", total_secs, millis / 100)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m{}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}
