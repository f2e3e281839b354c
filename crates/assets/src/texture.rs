use crate::AssetError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handle to a texture registered in a [`TextureStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// How UVs outside `0..1` are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMode {
    Clamp,
    Repeat,
}

/// Whether texel values are colors (sRGB encoded) or raw data such as heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

/// Sampling parameters attached to a texture handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    pub wrap: WrapMode,
    pub repeat: [f32; 2],
    pub color_space: ColorSpace,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Clamp,
            repeat: [1.0, 1.0],
            color_space: ColorSpace::Srgb,
        }
    }
}

impl Sampling {
    /// Linear data texture (displacement, roughness, ...).
    pub fn data() -> Self {
        Self {
            color_space: ColorSpace::Linear,
            ..Self::default()
        }
    }

    /// Tile the texture `x` by `y` times with repeat wrapping.
    pub fn tiled(x: f32, y: f32) -> Self {
        Self {
            wrap: WrapMode::Repeat,
            repeat: [x, y],
            ..Self::default()
        }
    }
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::debug!("decoded {}x{} texture from {}", width, height, path.display());
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// A single texel of the given color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    /// This image shrunk so neither side exceeds `max_dim`, keeping the
    /// aspect ratio. Borrowed unchanged when it already fits.
    pub fn fit_within(&self, max_dim: u32) -> Result<Cow<'_, Self>, AssetError> {
        let malformed = || AssetError::Malformed {
            width: self.width,
            height: self.height,
            len: self.pixels.len(),
        };
        if self.pixels.len() != self.width as usize * self.height as usize * 4 {
            return Err(malformed());
        }
        let max_dim = max_dim.max(1);
        if self.width <= max_dim && self.height <= max_dim {
            return Ok(Cow::Borrowed(self));
        }

        let rgba = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(malformed)?;
        let scale = max_dim as f64 / self.width.max(self.height) as f64;
        let width = ((self.width as f64 * scale).round() as u32).clamp(1, max_dim);
        let height = ((self.height as f64 * scale).round() as u32).clamp(1, max_dim);
        let resized =
            image::imageops::resize(&rgba, width, height, image::imageops::FilterType::Triangle);
        tracing::warn!(
            "texture {}x{} exceeds {max_dim}, downscaled to {width}x{height}",
            self.width,
            self.height
        );
        Ok(Cow::Owned(Self {
            width,
            height,
            pixels: resized.into_raw(),
        }))
    }
}

/// Lifecycle of a texture handle.
#[derive(Debug, Clone)]
pub enum TextureState {
    /// Requested, decode not finished. Rendered with the usage's default.
    Pending,
    Ready(Arc<TextureImage>),
    /// Decode failed; the message is kept for diagnostics.
    Failed(String),
}

impl TextureState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TextureState::Pending)
    }

    pub fn image(&self) -> Option<&Arc<TextureImage>> {
        match self {
            TextureState::Ready(img) => Some(img),
            _ => None,
        }
    }
}

/// A registered texture.
#[derive(Debug, Clone)]
pub struct TextureEntry {
    pub path: PathBuf,
    pub sampling: Sampling,
    pub state: TextureState,
}

/// Registry of texture handles owned by the main thread.
#[derive(Debug, Default)]
pub struct TextureStore {
    entries: BTreeMap<TextureId, TextureEntry>,
    next_id: u64,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle for `path` in the pending state.
    pub fn insert_pending(&mut self, path: impl Into<PathBuf>, sampling: Sampling) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            TextureEntry {
                path: path.into(),
                sampling,
                state: TextureState::Pending,
            },
        );
        id
    }

    /// Settle a pending handle with the outcome of its decode.
    ///
    /// Failures are logged and stored; they never propagate further.
    pub fn resolve(
        &mut self,
        id: TextureId,
        result: Result<TextureImage, AssetError>,
    ) -> Result<(), AssetError> {
        let entry = self.entries.get_mut(&id).ok_or(AssetError::NotFound(id))?;
        entry.state = match result {
            Ok(img) => {
                tracing::info!(
                    "texture {} ready ({}x{})",
                    entry.path.display(),
                    img.width,
                    img.height
                );
                TextureState::Ready(Arc::new(img))
            }
            Err(e) => {
                tracing::error!("texture {} failed to load: {e}", entry.path.display());
                TextureState::Failed(e.to_string())
            }
        };
        Ok(())
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureEntry> {
        self.entries.get(&id)
    }

    pub fn state(&self, id: TextureId) -> Option<&TextureState> {
        self.entries.get(&id).map(|e| &e.state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TextureId, &TextureEntry)> {
        self.entries.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.state.is_pending())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_handle_is_pending() {
        let mut store = TextureStore::new();
        let id = store.insert_pending("textures/texture1.jpg", Sampling::tiled(2.0, 1.0));
        assert!(store.state(id).unwrap().is_pending());
        assert_eq!(store.pending_count(), 1);
        assert_eq!(store.get(id).unwrap().sampling.repeat, [2.0, 1.0]);
    }

    #[test]
    fn resolve_ready() {
        let mut store = TextureStore::new();
        let id = store.insert_pending("a.png", Sampling::default());
        store
            .resolve(id, Ok(TextureImage::solid([10, 20, 30, 255])))
            .unwrap();
        let img = store.state(id).unwrap().image().unwrap();
        assert_eq!(img.pixels, vec![10, 20, 30, 255]);
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn resolve_failure_is_recorded() {
        let mut store = TextureStore::new();
        let id = store.insert_pending("missing.jpg", Sampling::default());
        let err = TextureImage::from_file("definitely/not/here.jpg").unwrap_err();
        store.resolve(id, Err(err)).unwrap();
        assert!(matches!(store.state(id), Some(TextureState::Failed(_))));
    }

    #[test]
    fn resolve_unknown_id() {
        let mut store = TextureStore::new();
        let result = store.resolve(TextureId(99), Ok(TextureImage::solid([0; 4])));
        assert!(matches!(result, Err(AssetError::NotFound(TextureId(99)))));
    }

    #[test]
    fn ids_are_distinct() {
        let mut store = TextureStore::new();
        let a = store.insert_pending("a.png", Sampling::default());
        let b = store.insert_pending("a.png", Sampling::default());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn image_within_limit_is_borrowed() {
        let img = TextureImage::solid([1, 2, 3, 4]);
        assert!(matches!(img.fit_within(8).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn oversized_image_is_downscaled_keeping_aspect() {
        let img = TextureImage {
            width: 64,
            height: 16,
            pixels: vec![200; 64 * 16 * 4],
        };
        let fitted = img.fit_within(32).unwrap();
        assert_eq!((fitted.width, fitted.height), (32, 8));
        assert_eq!(fitted.pixels.len(), 32 * 8 * 4);
        assert_eq!(&fitted.pixels[0..4], &[200, 200, 200, 200]);
    }

    #[test]
    fn short_pixel_buffer_is_rejected() {
        let img = TextureImage {
            width: 4,
            height: 4,
            pixels: vec![0; 12],
        };
        assert!(matches!(
            img.fit_within(2),
            Err(AssetError::Malformed { width: 4, height: 4, len: 12 })
        ));
    }

    #[test]
    fn decode_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let img = image::RgbaImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        });
        img.save(&path).unwrap();

        let decoded = TextureImage::from_file(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(&decoded.pixels[0..4], &[255, 255, 255, 255]);
        assert_eq!(&decoded.pixels[4..8], &[0, 0, 0, 255]);
    }
}
