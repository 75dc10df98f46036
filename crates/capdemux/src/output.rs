use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
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

#[derive(Serialize, Debug)]
pub struct ChannelSummary {
    /// 1-based, matching output file numbering.
    pub channel: usize,
    pub samples: usize,
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct RunSummary {
    pub input: String,
    pub mode: &'static str,
    pub input_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    pub filler_pairs: usize,
    pub dropped_samples: usize,
    pub warnings: Vec<String>,
    pub channels: Vec<ChannelSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_frame: Option<Vec<String>>,
}

pub fn print_summary(summary: &RunSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            print_header(summary);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "SAMPLES", "BYTES", "OUTPUT"]);
            for ch in &summary.channels {
                table.add_row(vec![
                    ch.channel.to_string(),
                    ch.samples.to_string(),
                    ch.bytes.to_string(),
                    ch.path.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            print_header(summary);
            for ch in &summary.channels {
                match &ch.path {
                    Some(path) => println!(
                        "  ch{:<2} samples={} bytes={} -> {}",
                        ch.channel, ch.samples, ch.bytes, path
                    ),
                    None => println!(
                        "  ch{:<2} samples={} bytes={}",
                        ch.channel, ch.samples, ch.bytes
                    ),
                }
            }
        }
    }
}

fn print_header(summary: &RunSummary) {
    println!("Capture:      {} ({} bytes)", summary.input, summary.input_bytes);
    println!("Mode:         {}", summary.mode);
    match summary.sync_index {
        Some(index) => println!("Sync:         word {index}"),
        None if summary.mode == "ring" => println!("Sync:         not found"),
        None => {}
    }
    if let Some(frames) = summary.frames {
        println!("Frames:       {frames}");
    }
    if let Some(records) = summary.records {
        println!("Records:      {records}");
    }
    println!("Filler pairs: {}", summary.filler_pairs);
    println!("Dropped:      {} samples", summary.dropped_samples);
    for warning in &summary.warnings {
        println!("Warning:      {warning}");
    }
    if let Some(frame) = &summary.latest_frame {
        println!("Latest frame: {}", frame.join(" "));
    }
}

pub fn hex_word(word: u32) -> String {
    format!("{word:08x}")
}
