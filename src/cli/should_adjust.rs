//! `flowstate should-adjust` - check whether a channel is due

use crate::models::ChannelId;
use crate::state::{Clock, TimestampStore};
use crate::Result;
use colored::Colorize;

/// Print the verdict (unless quiet) and return whether the channel is due
pub fn run<C: Clock>(
    store: &TimestampStore<C>,
    chan_id: &ChannelId,
    every_hours: f64,
    quiet: bool,
) -> Result<bool> {
    anyhow::ensure!(!every_hours.is_nan(), "Frequency must be a number of hours");

    let due = store.should_adjust(chan_id, every_hours);

    if !quiet {
        if due {
            println!("{}", "yes".green());
        } else {
            println!("{}", "no".yellow());
        }
    }

    Ok(due)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ManualClock;
    use tempfile::TempDir;

    #[test]
    fn test_due_after_frequency() {
        let temp = TempDir::new().unwrap();
        let mut store = TimestampStore::with_clock(temp.path().join("s.json"), ManualClock::new(1000.0));
        let chan = ChannelId::from(1u64);

        assert!(run(&store, &chan, 6.0, true).unwrap());

        store.mark_adjusted(&chan);
        assert!(!run(&store, &chan, 6.0, true).unwrap());

        store.clock().advance_hours(6.0);
        assert!(run(&store, &chan, 6.0, true).unwrap());
    }

    #[test]
    fn test_nan_frequency_rejected() {
        let temp = TempDir::new().unwrap();
        let store = TimestampStore::with_clock(temp.path().join("s.json"), ManualClock::new(1000.0));

        assert!(run(&store, &ChannelId::from(1u64), f64::NAN, true).is_err());
    }
}
