//! `flowstate forget` - drop a channel's record

use crate::models::ChannelId;
use crate::state::{Clock, TimestampStore};
use crate::Result;
use colored::Colorize;

pub fn run<C: Clock>(store: &mut TimestampStore<C>, chan_id: &ChannelId) -> Result<()> {
    if store.forget(chan_id) {
        println!("{}", format!("✓ Forgot {}", chan_id).green());
    } else {
        println!("{}", format!("{} has no recorded adjustment", chan_id).yellow());
    }
    Ok(())
}
