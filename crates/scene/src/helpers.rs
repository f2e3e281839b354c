use crate::graph::{Node, NodeKind, Scene};
use crate::light::{LightKind, LightRig};
use cottage_common::{Color, NodeId};
use glam::Vec3;
use std::f32::consts::TAU;

const CIRCLE_SEGMENTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HelperKind {
    /// Square of side `size` at the light, plus a line to its target.
    Directional { size: f32 },
    /// Three orthogonal circles of radius `sphere_size` around the light.
    Point { sphere_size: f32 },
}

/// Debug visual for a light. Refers to the light by id without owning it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightHelper {
    pub light: NodeId,
    pub kind: HelperKind,
}

/// A colored line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

/// Tracks the helper nodes currently in the scene.
///
/// Showing twice never adds a second set; hiding removes exactly what was
/// added.
#[derive(Debug, Default, Clone)]
pub struct LightHelpers {
    directional: Option<NodeId>,
    point: Option<NodeId>,
}

impl LightHelpers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_visible(&mut self, scene: &mut Scene, rig: &LightRig, show: bool) {
        if show {
            if self.directional.is_none() {
                self.directional = Some(scene.add(helper_node(
                    "directional_light_helper",
                    rig.directional,
                    HelperKind::Directional { size: 1.0 },
                )));
            }
            if self.point.is_none() {
                self.point = Some(scene.add(helper_node(
                    "point_light_helper",
                    rig.point,
                    HelperKind::Point { sphere_size: 1.0 },
                )));
            }
            tracing::debug!("light helpers shown");
        } else {
            for id in [self.directional.take(), self.point.take()].into_iter().flatten() {
                scene.remove(id);
            }
            tracing::debug!("light helpers hidden");
        }
    }

    pub fn is_shown(&self) -> bool {
        self.directional.is_some() || self.point.is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.directional.iter().chain(self.point.iter()).copied()
    }
}

fn helper_node(name: &str, light: NodeId, kind: HelperKind) -> Node {
    Node::new(name, NodeKind::Helper(LightHelper { light, kind }))
}

/// Line geometry for every visible helper whose light still exists.
pub fn helper_lines(scene: &Scene) -> Vec<LineSegment> {
    let mut lines = Vec::new();
    for (id, _) in scene.walk() {
        let Some(node) = scene.get(id) else { continue };
        let NodeKind::Helper(helper) = &node.kind else {
            continue;
        };
        if !node.visible {
            continue;
        }
        let (Some(light_node), Some(world)) = (scene.get(helper.light), scene.world_matrix(helper.light))
        else {
            continue;
        };
        let Some(light) = light_node.as_light() else {
            continue;
        };
        let origin = world.transform_point3(Vec3::ZERO);
        let color = light.color;

        match (helper.kind, light.kind) {
            (HelperKind::Directional { size }, LightKind::Directional { target, .. }) => {
                let dir = (target - origin).normalize_or(Vec3::NEG_Y);
                let (u, v) = dir.any_orthonormal_pair();
                let h = size * 0.5;
                let corners = [
                    origin + (-u - v) * h,
                    origin + (u - v) * h,
                    origin + (u + v) * h,
                    origin + (-u + v) * h,
                ];
                for i in 0..4 {
                    lines.push(LineSegment {
                        start: corners[i],
                        end: corners[(i + 1) % 4],
                        color,
                    });
                }
                lines.push(LineSegment {
                    start: origin,
                    end: target,
                    color,
                });
            }
            (HelperKind::Point { sphere_size }, LightKind::Point { .. }) => {
                for (a, b) in [(Vec3::X, Vec3::Y), (Vec3::Y, Vec3::Z), (Vec3::Z, Vec3::X)] {
                    let ring: Vec<Vec3> = (0..=CIRCLE_SEGMENTS)
                        .map(|i| {
                            let t = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
                            origin + (a * t.cos() + b * t.sin()) * sphere_size
                        })
                        .collect();
                    lines.extend(ring.windows(2).map(|w| LineSegment {
                        start: w[0],
                        end: w[1],
                        color,
                    }));
                }
            }
            _ => {
                tracing::warn!("helper {} does not match its light kind", id.short());
            }
        }
    }
    lines
}
