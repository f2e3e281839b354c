//! wgpu render backend for the cottage viewer.
//!
//! Draws textured, lit meshes with a directional shadow map, blended
//! surfaces back to front, and light helper lines.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Pending or failed color maps sample white; displacement maps sample black.

mod gpu;
mod shaders;
mod textures;
mod uniforms;

pub use gpu::SceneRenderer;
