//! Texture assets: handles, decoded images, and the background loader.
//!
//! The scene refers to textures by [`TextureId`], never by raw file paths.
//! A handle exists as soon as a load is requested and stays in
//! [`TextureState::Pending`] until the decode finishes, so scene construction
//! never waits on disk.
//!
//! # Invariants
//! - Only the thread owning the [`TextureStore`] changes texture state.
//! - A failed load is terminal and never panics; renderers fall back to a
//!   neutral default for the texture's usage.

mod loader;
mod texture;

pub use loader::TextureLoader;
pub use texture::{
    ColorSpace, Sampling, TextureEntry, TextureId, TextureImage, TextureState, TextureStore,
    WrapMode,
};

use std::path::PathBuf;

/// Errors from texture operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture not found: {0:?}")]
    NotFound(TextureId),
    #[error("pixel buffer of {len} bytes does not match {width}x{height} RGBA")]
    Malformed { width: u32, height: u32, len: usize },
    #[error("could not start loader thread: {0}")]
    Spawn(#[from] std::io::Error),
}
