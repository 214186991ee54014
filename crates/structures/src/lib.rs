//! Small, general purpose data structures used across the workspace.

mod event_source;

pub use event_source::{EventSource, SubscriptionId};
