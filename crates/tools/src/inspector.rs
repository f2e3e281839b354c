use cottage_assets::{TextureState, TextureStore};
use cottage_input::TransformState;
use cottage_render::{CameraRig, Projection};
use cottage_scene::{LightKind, NodeKind, Scene};
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Read-only queries over the scene, camera and texture store for the CLI
/// and debug logging.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(
        scene: &Scene,
        camera: &CameraRig,
        textures: &TextureStore,
        transform: &TransformState,
    ) -> SceneSummary {
        let mut meshes = 0;
        let mut helpers = 0;
        let mut lights = Vec::new();
        for (id, _) in scene.walk() {
            let Some(node) = scene.get(id) else { continue };
            match &node.kind {
                NodeKind::Mesh(_) => meshes += 1,
                NodeKind::Helper(_) => helpers += 1,
                NodeKind::Light(light) => lights.push(LightInfo {
                    name: node.name.clone(),
                    kind: match light.kind {
                        LightKind::Ambient => "ambient",
                        LightKind::Directional { .. } => "directional",
                        LightKind::Point { .. } => "point",
                    },
                    intensity: light.intensity,
                    visible: node.visible,
                }),
                NodeKind::Group => {}
            }
        }

        SceneSummary {
            nodes: scene.node_count(),
            meshes,
            helpers,
            lights,
            projection: camera.projection(),
            camera_distance: camera.distance(),
            aspect: camera.aspect(),
            transform: *transform,
            textures: Self::texture_counts(textures),
        }
    }

    pub fn texture_counts(textures: &TextureStore) -> TextureCounts {
        let mut counts = TextureCounts::default();
        for (_, entry) in textures.iter() {
            match entry.state {
                TextureState::Pending => counts.pending += 1,
                TextureState::Ready(_) => counts.ready += 1,
                TextureState::Failed(_) => counts.failed += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextureCounts {
    pub pending: usize,
    pub ready: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LightInfo {
    pub name: String,
    pub kind: &'static str,
    pub intensity: f32,
    pub visible: bool,
}

/// Snapshot of the viewer state.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub helpers: usize,
    pub lights: Vec<LightInfo>,
    pub projection: Projection,
    pub camera_distance: f32,
    pub aspect: f32,
    pub transform: TransformState,
    pub textures: TextureCounts,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} meshes={} helpers={} camera={:?} z={} textures(ready={} pending={} failed={})",
            self.nodes,
            self.meshes,
            self.helpers,
            self.projection,
            self.camera_distance,
            self.textures.ready,
            self.textures.pending,
            self.textures.failed
        )
    }
}
