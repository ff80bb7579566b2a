//! `flowstate set` - record an adjustment

use crate::models::ChannelId;
use crate::state::{Clock, TimestampStore};
use crate::utils::time::format_timestamp;
use crate::Result;
use colored::Colorize;

pub fn run<C: Clock>(store: &mut TimestampStore<C>, chan_id: &ChannelId, at: Option<f64>) -> Result<()> {
    if let Some(at) = at {
        anyhow::ensure!(at.is_finite() && at >= 0.0, "Invalid timestamp: {}", at);
    }

    store.set_last_adjustment_time(chan_id, at);

    let recorded = store.get_last_adjustment_time(chan_id);
    println!(
        "{}",
        format!("✓ {}: adjusted at {}", chan_id, format_timestamp(recorded)).green()
    );
    Ok(())
}
