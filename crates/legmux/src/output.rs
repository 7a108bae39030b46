use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use legmux_pipeline::MergeReport;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One decoded leg record.
#[derive(Serialize)]
pub struct RecordRow {
    pub index: u64,
    pub payload: String,
    pub repeat: u8,
}

/// One decoded composite frame.
#[derive(Serialize)]
pub struct FrameRow {
    pub index: u64,
    pub sections: Vec<String>,
    pub delay: u8,
}

pub fn print_report(report: &MergeReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = new_table(vec!["CHANNEL", "SOURCE", "RECORDS", "PAYLOADS"]);
            for channel in &report.channels {
                table.add_row(vec![
                    channel.index.to_string(),
                    channel.label.clone(),
                    channel.records.to_string(),
                    channel.payloads.to_string(),
                ]);
            }
            println!("{table}");
            println!(
                "frames={} frame_len={} delay={} repeat={} on_done={}",
                report.frames,
                report.frame_len,
                report.delay,
                report.repeat.as_str(),
                report.on_done.as_str()
            );
        }
        OutputFormat::Pretty => {
            println!(
                "frames={} frame_len={} delay={} repeat={} on_done={}",
                report.frames,
                report.frame_len,
                report.delay,
                report.repeat.as_str(),
                report.on_done.as_str()
            );
            for channel in &report.channels {
                println!(
                    "  chan{} {} records={} payloads={}",
                    channel.index, channel.label, channel.records, channel.payloads
                );
            }
        }
    }
}

pub fn print_records(rows: &[RecordRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => rows.iter().for_each(print_json),
        OutputFormat::Table => {
            let mut table = new_table(vec!["#", "PAYLOAD", "REPEAT"]);
            for row in rows {
                table.add_row(vec![
                    row.index.to_string(),
                    row.payload.clone(),
                    row.repeat.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!("#{} payload={} repeat={}", row.index, row.payload, row.repeat);
            }
        }
    }
}

pub fn print_frames(rows: &[FrameRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => rows.iter().for_each(print_json),
        OutputFormat::Table => {
            let channels = rows.first().map_or(0, |row| row.sections.len());
            let mut header = vec!["#".to_string()];
            header.extend((0..channels).map(|i| format!("CHAN{i}")));
            header.push("DELAY".to_string());

            let mut table = new_table(header);
            for row in rows {
                let mut cells = vec![row.index.to_string()];
                cells.extend(row.sections.iter().cloned());
                cells.push(row.delay.to_string());
                table.add_row(cells);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "#{} {} delay={}",
                    row.index,
                    row.sections.join(" | "),
                    row.delay
                );
            }
        }
    }
}

fn new_table<T: Into<comfy_table::Cell>>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
