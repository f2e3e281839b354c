//! Rendering Adapter: camera rig and renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - The camera's projection kind changes only through `toggle_projection`;
//!   resizing keeps the kind and only updates aspect and viewport.

mod camera;
mod renderer;

pub use camera::{CameraRig, Projection};
pub use renderer::{DebugTextRenderer, Renderer};
