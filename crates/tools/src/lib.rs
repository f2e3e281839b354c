//! Developer Tooling: the live control panel and a read-only scene inspector.
//!
//! # Invariants
//! - Widgets never touch the scene. They report [`ControlChange`]s and the
//!   owner of the scene applies them.
//! - The inspector is read-only.

pub mod inspector;
pub mod panel;

pub use inspector::{SceneInspector, SceneSummary, TextureCounts};
pub use panel::{ControlChange, ControlPanel, ControlParams, PanelView};
