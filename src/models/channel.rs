//! Channel bookkeeping types
//!
//! Defines the on-disk shape of the state file:
//!
//! ```json
//! {
//!     "12345": {
//!         "last_adjustment": 1700000000.123
//!     }
//! }
//! ```

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const LAST_ADJUSTMENT: &str = "last_adjustment";

/// Whole state file: channel id → record, kept sorted for stable rewrites
pub type StateDocument = BTreeMap<String, ChannelRecord>;

// =============================================================================
// Channel ID
// =============================================================================

/// Canonical channel identifier
///
/// Lightning channel ids arrive either as integers (LND `chan_id`) or as
/// strings. Both are normalised to the string key written to the state file:
/// integers as plain decimal, strings verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(String);

impl ChannelId {
    /// Key used in the state file
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ChannelId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for ChannelId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for ChannelId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for ChannelId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<usize> for ChannelId {
    fn from(id: usize) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ChannelId> for ChannelId {
    fn from(id: &ChannelId) -> Self {
        id.clone()
    }
}

impl FromStr for ChannelId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

// =============================================================================
// Channel Record
// =============================================================================

/// Per-channel entry in the state file
///
/// Deserialization never fails for a single entry: a record that is not a
/// JSON object reads as never adjusted and is written back as it was found,
/// so one damaged entry cannot cost the other channels their history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelRecord {
    /// Epoch seconds of the last fee adjustment
    pub last_adjustment: Option<f64>,

    /// Fields written by other tools, carried through rewrites untouched
    pub extra: Map<String, Value>,

    /// Non-object entry, kept verbatim until the channel is adjusted
    raw: Option<Value>,
}

impl ChannelRecord {
    /// Last adjustment in epoch seconds, 0 when never adjusted
    pub fn last_adjustment_or_zero(&self) -> f64 {
        self.last_adjustment.unwrap_or(0.0)
    }

    /// Record an adjustment, replacing any unreadable entry
    pub fn set_last_adjustment(&mut self, timestamp: f64) {
        self.raw = None;
        self.last_adjustment = Some(timestamp);
    }
}

impl From<Value> for ChannelRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut extra) => {
                // Anything but a number reads as "never adjusted"
                let last_adjustment = extra.remove(LAST_ADJUSTMENT).and_then(|v| v.as_f64());
                Self {
                    last_adjustment,
                    extra,
                    raw: None,
                }
            }
            other => Self {
                raw: Some(other),
                ..Self::default()
            },
        }
    }
}

impl<'de> Deserialize<'de> for ChannelRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for ChannelRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let Some(raw) = &self.raw {
            return raw.serialize(serializer);
        }

        let len = self.extra.len() + usize::from(self.last_adjustment.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(timestamp) = self.last_adjustment {
            map.serialize_entry(LAST_ADJUSTMENT, &timestamp)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
