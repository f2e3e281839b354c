//! Input handling: key identities mapped to fixed-increment actions.
//!
//! # Invariants
//! - Mapping is pure and case-insensitive; unknown keys map to nothing.
//! - Each action touches exactly one field of the transform state or the
//!   camera distance.

pub mod action;
pub mod state;

pub use action::{Action, Speeds, action_for_key};
pub use state::TransformState;
