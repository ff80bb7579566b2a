//! TimestampStore - last-adjustment bookkeeping per channel
//!
//! The whole state file is loaded once on construction and rewritten after
//! every mutation. Load and save failures never reach the caller: a broken
//! file only costs the adjustment history, it must not stop fee updates.

use super::clock::{Clock, SystemClock, SECS_PER_HOUR};
use super::error::{StateError, StateResult};
use super::location::{resolve_state_path, StateLocation};
use crate::models::{ChannelId, StateDocument};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Persistent map of channel id → last adjustment time
#[derive(Debug)]
pub struct TimestampStore<C: Clock = SystemClock> {
    path: PathBuf,
    state: StateDocument,
    clock: C,
}

impl TimestampStore<SystemClock> {
    /// Open the store at `path`, or at ~/.charge-lnd/flow_state.json
    ///
    /// Only fails when the default location cannot be resolved or created.
    /// A missing or corrupt file yields an empty store.
    pub fn open(path: Option<PathBuf>) -> StateResult<Self> {
        let path = resolve_state_path(path)?;
        Ok(Self::at(path))
    }

    /// Open the store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, SystemClock)
    }
}

impl<C: Clock> TimestampStore<C> {
    /// Open the store at an explicit path with a custom clock
    pub fn with_clock(path: impl Into<PathBuf>, clock: C) -> Self {
        let path = path.into();
        let state = load_or_empty(&path);

        Self { path, state, clock }
    }

    /// Open the store wherever `location` points
    pub fn from_location<L>(location: &L, clock: C) -> StateResult<Self>
    where
        L: StateLocation + ?Sized,
    {
        Ok(Self::with_clock(location.resolve()?, clock))
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Number of channels with a record
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// All channels and their last adjustment, in key order
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.state
            .iter()
            .map(|(id, record)| (id.as_str(), record.last_adjustment_or_zero()))
    }

    // =========================================================================
    // Adjustment Times
    // =========================================================================

    /// Last adjustment in epoch seconds, 0 if the channel was never adjusted
    pub fn get_last_adjustment_time(&self, chan_id: impl Into<ChannelId>) -> f64 {
        let chan_id = chan_id.into();
        self.state
            .get(chan_id.as_str())
            .map_or(0.0, |record| record.last_adjustment_or_zero())
    }

    /// Record an adjustment at `timestamp` (defaults to now) and persist
    pub fn set_last_adjustment_time(&mut self, chan_id: impl Into<ChannelId>, timestamp: Option<f64>) {
        let timestamp = timestamp.unwrap_or_else(|| self.clock.now());
        let chan_id = chan_id.into();

        self.state
            .entry(chan_id.into_string())
            .or_default()
            .set_last_adjustment(timestamp);

        self.persist();
    }

    /// Record an adjustment now
    pub fn mark_adjusted(&mut self, chan_id: impl Into<ChannelId>) {
        self.set_last_adjustment_time(chan_id, None);
    }

    /// Drop a channel's record and persist. Returns whether it existed.
    pub fn forget(&mut self, chan_id: impl Into<ChannelId>) -> bool {
        let chan_id = chan_id.into();
        let removed = self.state.remove(chan_id.as_str()).is_some();

        if removed {
            self.persist();
        }

        removed
    }

    // =========================================================================
    // Policy
    // =========================================================================

    /// Hours since the last adjustment, None if never adjusted
    pub fn hours_since_adjustment(&self, chan_id: impl Into<ChannelId>) -> Option<f64> {
        let last = self.get_last_adjustment_time(chan_id);
        if last == 0.0 {
            return None;
        }

        Some((self.clock.now() - last) / SECS_PER_HOUR)
    }

    /// Whether at least `frequency_hours` have passed since the last adjustment
    ///
    /// A non-positive frequency disables throttling. Channels without history
    /// are always due.
    pub fn should_adjust(&self, chan_id: impl Into<ChannelId>, frequency_hours: f64) -> bool {
        if frequency_hours <= 0.0 {
            return true;
        }

        let chan_id = chan_id.into();
        let Some(hours_elapsed) = self.hours_since_adjustment(&chan_id) else {
            trace!(chan_id = %chan_id, "never adjusted, due");
            return true;
        };

        let due = hours_elapsed >= frequency_hours;
        trace!(chan_id = %chan_id, hours_elapsed, frequency_hours, due, "adjustment check");
        due
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn persist(&self) {
        match save_document(&self.path, &self.state) {
            Ok(()) => debug!(path = %self.path.display(), channels = self.state.len(), "state saved"),
            Err(e) => warn!(error = %e, "adjustment state not persisted, keeping it in memory"),
        }
    }
}

fn load_or_empty(path: &Path) -> StateDocument {
    match load_document(path) {
        Ok(state) => {
            debug!(path = %path.display(), channels = state.len(), "state loaded");
            state
        }
        Err(e) => {
            warn!(error = %e, "ignoring unreadable adjustment state, starting empty");
            StateDocument::new()
        }
    }
}

/// Read a state file. A missing file is an empty document.
pub fn load_document(path: &Path) -> StateResult<StateDocument> {
    if !path.exists() {
        return Ok(StateDocument::new());
    }

    let content = fs::read_to_string(path).map_err(|source| StateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrite a state file with `state`, indented four spaces
pub fn save_document(path: &Path, state: &StateDocument) -> StateResult<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    state.serialize(&mut ser).map_err(StateError::Serialize)?;
    buf.push(b'\n');

    fs::write(path, buf).map_err(|source| StateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::clock::ManualClock;
    use tempfile::TempDir;

    const NOW: f64 = 1_700_000_000.0;

    fn setup_store() -> (TempDir, TimestampStore<ManualClock>) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flow_state.json");
        let store = TimestampStore::with_clock(path, ManualClock::new(NOW));
        (temp_dir, store)
    }

    #[test]
    fn test_unknown_channel_is_zero() {
        let (_temp, store) = setup_store();

        assert!(store.is_empty());
        assert_eq!(store.get_last_adjustment_time(12345u64), 0.0);
        assert_eq!(store.hours_since_adjustment("abc"), None);
    }

    #[test]
    fn test_set_then_get() {
        let (_temp, mut store) = setup_store();

        store.set_last_adjustment_time(12345u64, Some(1_600_000_000.5));
        assert_eq!(store.get_last_adjustment_time(12345u64), 1_600_000_000.5);
        assert_eq!(store.get_last_adjustment_time("12345"), 1_600_000_000.5);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_defaults_to_clock_now() {
        let (_temp, mut store) = setup_store();

        store.set_last_adjustment_time("chan", None);
        assert_eq!(store.get_last_adjustment_time("chan"), NOW);

        store.clock().advance_secs(60.0);
        store.mark_adjusted("chan");
        assert_eq!(store.get_last_adjustment_time("chan"), NOW + 60.0);
    }

    #[test]
    fn test_set_is_idempotent() {
        let (_temp, mut store) = setup_store();

        store.set_last_adjustment_time(1u64, Some(42.0));
        store.set_last_adjustment_time(1u64, Some(42.0));

        assert_eq!(store.get_last_adjustment_time(1u64), 42.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reload_sees_update() {
        let (_temp, mut store) = setup_store();
        store.set_last_adjustment_time(777u64, Some(NOW - 10.0));

        let reloaded = TimestampStore::at(store.path());
        assert_eq!(reloaded.get_last_adjustment_time(777u64), NOW - 10.0);
    }

    #[test]
    fn test_saved_file_layout() {
        let (_temp, mut store) = setup_store();
        store.set_last_adjustment_time(12345u64, Some(1_700_000_000.123));

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("    \"12345\": {"));
        assert!(content.contains("        \"last_adjustment\": 1700000000.123"));

        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["12345"]["last_adjustment"], 1_700_000_000.123);
    }

    #[test]
    fn test_should_adjust_zero_frequency_always_due() {
        let (_temp, mut store) = setup_store();
        store.mark_adjusted(5u64);

        assert!(store.should_adjust(5u64, 0.0));
        assert!(store.should_adjust(5u64, -3.0));
        assert!(store.should_adjust(6u64, 0.0));
    }

    #[test]
    fn test_should_adjust_unseen_channel() {
        let (_temp, store) = setup_store();
        assert!(store.should_adjust(99u64, 24.0));
    }

    #[test]
    fn test_should_adjust_after_elapsed_hours() {
        let (_temp, mut store) = setup_store();
        store.mark_adjusted(5u64);

        assert!(!store.should_adjust(5u64, 2.0));

        store.clock().advance_hours(1.5);
        assert!(!store.should_adjust(5u64, 2.0));

        store.clock().advance_hours(0.5);
        assert!(store.should_adjust(5u64, 2.0));
        assert_eq!(store.hours_since_adjustment(5u64), Some(2.0));
    }

    #[test]
    fn test_should_adjust_clock_moved_backwards() {
        let (_temp, mut store) = setup_store();
        store.mark_adjusted(5u64);

        store.clock().advance_hours(-1.0);
        assert!(!store.should_adjust(5u64, 0.5));
    }

    #[test]
    fn test_should_adjust_nan_frequency_not_due_with_history() {
        let (_temp, mut store) = setup_store();
        store.mark_adjusted(5u64);
        store.clock().advance_hours(100.0);

        assert!(!store.should_adjust(5u64, f64::NAN));
        assert!(store.should_adjust(6u64, f64::NAN));
    }

    #[test]
    fn test_forget() {
        let (_temp, mut store) = setup_store();
        store.set_last_adjustment_time(1u64, Some(10.0));
        store.set_last_adjustment_time(2u64, Some(20.0));

        assert!(store.forget(1u64));
        assert!(!store.forget(1u64));

        let reloaded = TimestampStore::at(store.path());
        assert_eq!(reloaded.get_last_adjustment_time(1u64), 0.0);
        assert_eq!(reloaded.get_last_adjustment_time(2u64), 20.0);
    }

    #[test]
    fn test_entries_in_key_order() {
        let (_temp, mut store) = setup_store();
        store.set_last_adjustment_time("b", Some(2.0));
        store.set_last_adjustment_time("a", Some(1.0));

        let entries: Vec<_> = store.entries().collect();
        assert_eq!(entries, vec![("a", 1.0), ("b", 2.0)]);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flow_state.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_document(&path), Err(StateError::Parse { .. })));

        let store = TimestampStore::with_clock(&path, ManualClock::new(NOW));
        assert!(store.is_empty());
        assert!(store.should_adjust(1u64, 24.0));
    }

    #[test]
    fn test_bad_record_keeps_other_channels() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flow_state.json");
        fs::write(&path, r#"{"1": {"last_adjustment": 1700000000}, "2": 5}"#).unwrap();

        let mut store = TimestampStore::at(&path);
        assert_eq!(store.get_last_adjustment_time(1), 1_700_000_000.0);
        assert_eq!(store.get_last_adjustment_time(2), 0.0);
        assert!(store.should_adjust(2, 1.0));

        store.set_last_adjustment_time(3, Some(1.0));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["1"]["last_adjustment"], 1_700_000_000.0);
        assert_eq!(value["2"], 5);
        assert_eq!(value["3"]["last_adjustment"], 1.0);
    }

    #[test]
    fn test_non_object_document_starts_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flow_state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = TimestampStore::at(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_arbitrary_timestamps_survive_reload() {
        let (_temp, mut store) = setup_store();

        // xorshift over the bit patterns of timestamps in [1e9, 2e9)
        let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut written = Vec::new();
        for chan in 0..500u64 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let fraction = (seed >> 11) as f64 / (1u64 << 53) as f64;
            let t = 1e9 + fraction * 1e9;
            store.set_last_adjustment_time(chan, Some(t));
            written.push(t);
        }
        store.set_last_adjustment_time("python", Some(1_700_011_238.380_562_5));

        let reloaded = TimestampStore::at(store.path());
        for (chan, t) in written.into_iter().enumerate() {
            assert_eq!(reloaded.get_last_adjustment_time(chan), t);
        }
        assert_eq!(reloaded.get_last_adjustment_time("python"), 1_700_011_238.380_562_5);
    }

    #[test]
    fn test_unreadable_location_starts_empty() {
        let temp = TempDir::new().unwrap();

        // A directory exists at the path but cannot be read as a file
        assert!(matches!(load_document(temp.path()), Err(StateError::Read { .. })));

        let store = TimestampStore::at(temp.path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let path = blocker.join("flow_state.json");

        let mut store = TimestampStore::with_clock(&path, ManualClock::new(NOW));
        store.set_last_adjustment_time(1u64, Some(123.0));

        assert_eq!(store.get_last_adjustment_time(1u64), 123.0);
        assert!(matches!(
            save_document(&path, &StateDocument::new()),
            Err(StateError::Write { .. })
        ));
    }

    #[test]
    fn test_unknown_fields_survive_rewrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flow_state.json");
        fs::write(
            &path,
            r#"{"1": {"last_adjustment": 5, "fee_ppm": 100}, "2": {"last_adjustment": 6}}"#,
        )
        .unwrap();

        let mut store = TimestampStore::at(&path);
        assert_eq!(store.get_last_adjustment_time(1u64), 5.0);
        store.set_last_adjustment_time(1u64, Some(50.0));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["1"]["fee_ppm"], 100);
        assert_eq!(value["1"]["last_adjustment"], 50.0);
        assert_eq!(value["2"]["last_adjustment"], 6.0);
    }
}
