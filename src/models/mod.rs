pub mod channel;

pub use channel::{ChannelId, ChannelRecord, StateDocument};
