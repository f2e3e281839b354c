//! Shared value types used across the cottage viewer crates.

mod types;

pub use types::{Axis, Color, NodeId, Transform};
