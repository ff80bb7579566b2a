//! `flowstate get` - show a channel's last adjustment

use crate::models::ChannelId;
use crate::state::{Clock, TimestampStore};
use crate::utils::time::{format_hours, format_timestamp};
use crate::Result;
use serde_json::json;

pub fn render<C: Clock>(store: &TimestampStore<C>, chan_id: &ChannelId, json: bool) -> Result<String> {
    let last = store.get_last_adjustment_time(chan_id);
    let hours = store.hours_since_adjustment(chan_id);

    if json {
        let value = json!({
            "channel": chan_id.as_str(),
            "last_adjustment": last,
            "hours_since": hours,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    Ok(match hours {
        Some(hours) => format!(
            "{}: {} ({}) {} ago",
            chan_id,
            last,
            format_timestamp(last),
            format_hours(hours)
        ),
        None => format!("{}: never adjusted", chan_id),
    })
}

pub fn run<C: Clock>(store: &TimestampStore<C>, chan_id: &ChannelId, json: bool) -> Result<()> {
    println!("{}", render(store, chan_id, json)?);
    Ok(())
}
