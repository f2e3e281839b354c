use crate::texture::{Sampling, TextureId, TextureImage, TextureStore};
use crate::AssetError;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

struct Decoded {
    id: TextureId,
    result: Result<TextureImage, AssetError>,
}

/// Decodes image files off the main thread.
///
/// `load` returns a pending handle immediately; decodes report back over a
/// channel that `poll` drains once per frame.
pub struct TextureLoader {
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
    in_flight: usize,
}

impl std::fmt::Debug for TextureLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureLoader")
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Request a texture. The returned handle is pending until polled.
    pub fn load(
        &mut self,
        store: &mut TextureStore,
        path: impl Into<PathBuf>,
        sampling: Sampling,
    ) -> TextureId {
        let path = path.into();
        let id = store.insert_pending(path.clone(), sampling);
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("texture-load-{}", id.0))
            .spawn(move || {
                let result = TextureImage::from_file(&path);
                // Receiver gone means the app is shutting down.
                let _ = tx.send(Decoded { id, result });
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => mark_spawn_failed(store, id, e),
        }
        id
    }

    /// Apply every finished decode to the store. Returns the settled handles.
    pub fn poll(&mut self, store: &mut TextureStore) -> Vec<TextureId> {
        let mut settled = Vec::new();
        while let Ok(decoded) = self.rx.try_recv() {
            self.settle(store, decoded, &mut settled);
        }
        settled
    }

    /// Block until every requested texture has settled.
    pub fn wait(&mut self, store: &mut TextureStore) -> Vec<TextureId> {
        let mut settled = Vec::new();
        while self.in_flight > 0 {
            match self.rx.recv() {
                Ok(decoded) => self.settle(store, decoded, &mut settled),
                Err(_) => break,
            }
        }
        settled
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn settle(&mut self, store: &mut TextureStore, decoded: Decoded, settled: &mut Vec<TextureId>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Err(e) = store.resolve(decoded.id, decoded.result) {
            tracing::warn!("dropping decoded texture: {e}");
            return;
        }
        settled.push(decoded.id);
    }
}

fn mark_spawn_failed(store: &mut TextureStore, id: TextureId, err: std::io::Error) {
    if let Err(e) = store.resolve(id, Err(AssetError::Spawn(err))) {
        tracing::warn!("could not mark texture {} failed: {e}", id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextureState;

    #[test]
    fn missing_file_settles_as_failed() {
        let mut store = TextureStore::new();
        let mut loader = TextureLoader::new();
        let id = loader.load(&mut store, "no/such/texture.jpg", Sampling::default());
        assert!(store.state(id).unwrap().is_pending());

        let settled = loader.wait(&mut store);
        assert_eq!(settled, vec![id]);
        assert!(matches!(store.state(id), Some(TextureState::Failed(_))));
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn loads_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roof.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([200, 100, 50, 255]))
            .save(&path)
            .unwrap();

        let mut store = TextureStore::new();
        let mut loader = TextureLoader::new();
        let id = loader.load(&mut store, &path, Sampling::default());
        loader.wait(&mut store);

        let img = store.state(id).unwrap().image().unwrap();
        assert_eq!((img.width, img.height), (4, 2));
    }

    #[test]
    fn spawn_failure_marks_handle_failed() {
        let mut store = TextureStore::new();
        let id = store.insert_pending("walls.jpg", Sampling::default());
        mark_spawn_failed(&mut store, id, std::io::Error::other("no threads"));
        match store.state(id) {
            Some(TextureState::Failed(msg)) => assert!(msg.contains("no threads")),
            other => panic!("unexpected state {other:?}"),
        }

        mark_spawn_failed(&mut store, TextureId(404), std::io::Error::other("gone"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn poll_without_loads_is_empty() {
        let mut store = TextureStore::new();
        let mut loader = TextureLoader::new();
        assert!(loader.poll(&mut store).is_empty());
        assert!(loader.wait(&mut store).is_empty());
    }
}
