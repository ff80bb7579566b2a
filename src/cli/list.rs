//! `flowstate list` - show every tracked channel

use crate::state::{Clock, TimestampStore};
use crate::utils::time::format_timestamp;
use crate::Result;
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ListEntry {
    pub channel: String,
    pub last_adjustment: f64,
    pub hours_since: Option<f64>,
}

pub fn collect<C: Clock>(store: &TimestampStore<C>) -> Vec<ListEntry> {
    store
        .entries()
        .map(|(channel, last)| ListEntry {
            channel: channel.to_string(),
            last_adjustment: last,
            hours_since: store.hours_since_adjustment(channel),
        })
        .collect()
}

pub fn run<C: Clock>(store: &TimestampStore<C>, json: bool) -> Result<()> {
    let entries = collect(store);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No channels tracked yet".yellow());
        return Ok(());
    }

    println!("{}", format!("📋 {} channel(s) in {}", entries.len(), store.path().display()).cyan());
    for entry in &entries {
        println!(
            "  {:<24} {}",
            entry.channel.bold(),
            format_timestamp(entry.last_adjustment)
        );
    }
    Ok(())
}
