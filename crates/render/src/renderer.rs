use crate::camera::CameraRig;
use cottage_scene::{HelperKind, LightKind, NodeKind, Scene};
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and the camera, then produces output. It
/// never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen by `camera`.
    fn render(&self, scene: &Scene, camera: &CameraRig) -> Self::Output;
}

/// Human-readable dump of the scene tree and camera.
///
/// Used by the headless CLI and for testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &CameraRig) -> String {
        let mut out = String::new();
        let eye = camera.eye();
        let _ = writeln!(
            out,
            "=== Scene (nodes={}, background=#{:06x}) ===",
            scene.node_count(),
            scene.background.to_hex()
        );
        let _ = writeln!(
            out,
            "Camera: {} eye=({:.1}, {:.1}, {:.1}) aspect={:.3}",
            camera.projection().name(),
            eye.x,
            eye.y,
            eye.z,
            camera.aspect()
        );

        for (id, depth) in scene.walk() {
            let Some(node) = scene.get(id) else { continue };
            let p = node.transform.position;
            let kind = match &node.kind {
                NodeKind::Group => "group".to_string(),
                NodeKind::Mesh(mesh) => format!("mesh {:?}", mesh.geometry),
                NodeKind::Light(light) => match light.kind {
                    LightKind::Ambient => format!("ambient light i={:.2}", light.intensity),
                    LightKind::Directional { .. } => {
                        format!("directional light i={:.2}", light.intensity)
                    }
                    LightKind::Point { distance, .. } => {
                        format!("point light i={:.2} d={distance}", light.intensity)
                    }
                },
                NodeKind::Helper(helper) => match helper.kind {
                    HelperKind::Directional { .. } => "directional helper".to_string(),
                    HelperKind::Point { .. } => "point helper".to_string(),
                },
            };
            let hidden = if node.visible { "" } else { " (hidden)" };
            let _ = writeln!(
                out,
                "{}- {} [{}] {} pos=({:.2}, {:.2}, {:.2}){}",
                "  ".repeat(depth),
                node.name,
                id.short(),
                kind,
                p.x,
                p.y,
                p.z,
                hidden
            );
        }

        out
    }
}
