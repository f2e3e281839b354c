//! Showcase kernel: the single owner of the running viewer's state.
//!
//! # Invariants
//! - All state mutations flow through explicit operations on [`Showcase`].
//! - The house transform, camera z and readout are refreshed after every key.
//! - Light helpers exist in the scene if and only if `show_helpers` is set.

pub mod showcase;

pub use showcase::{KernelError, Showcase, ShowcaseConfig};
