use bytemuck::{Pod, Zeroable};
use cottage_render::CameraRig;
use cottage_scene::{LightKind, LineSegment, Material, MeshData, Node, NodeKind, Scene};
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Per-frame camera and lighting block, bound at group 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    /// xyz: direction the light travels, w: 1 when shadows are sampled.
    pub dir_light_dir: [f32; 4],
    /// rgb: radiance, w: depth bias.
    pub dir_light_color: [f32; 4],
    /// xyz: position, w: cutoff distance.
    pub point_pos: [f32; 4],
    /// rgb: radiance, w: decay exponent.
    pub point_color: [f32; 4],
}

/// Per-mesh block, bound at group 1.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// roughness, metalness, displacement scale, receives shadow.
    pub params: [f32; 4],
    /// xy: color map repeat, zw: displacement map repeat.
    pub uv_repeat: [f32; 4],
}

pub(crate) fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.uvs)
        .map(|((position, normal), uv)| Vertex {
            position: *position,
            normal: *normal,
            uv: *uv,
        })
        .collect()
}

pub(crate) fn line_vertices(lines: &[LineSegment]) -> Vec<LineVertex> {
    lines
        .iter()
        .flat_map(|l| {
            let color = l.color.to_linear();
            [
                LineVertex {
                    position: l.start.to_array(),
                    color,
                },
                LineVertex {
                    position: l.end.to_array(),
                    color,
                },
            ]
        })
        .collect()
}

/// View-projection of the shadow-casting directional light, if one is lit.
pub(crate) fn shadow_view_proj(scene: &Scene) -> Option<(Mat4, f32)> {
    scene.walk().into_iter().find_map(|(id, _)| {
        let node = scene.get(id)?;
        let light = node.as_light()?;
        let LightKind::Directional { target, shadow } = light.kind else {
            return None;
        };
        let settings = shadow?;
        if !scene.is_visible(id) || !node.cast_shadow {
            return None;
        }
        let eye = scene.world_matrix(id)?.w_axis.truncate();
        let up = if (target - eye).normalize_or_zero().abs().y > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(eye, target, up);
        let e = settings.extent;
        let proj = Mat4::orthographic_rh(-e, e, -e, e, settings.near, settings.far);
        Some((proj * view, settings.bias))
    })
}

pub(crate) fn frame_uniforms(scene: &Scene, camera: &CameraRig) -> FrameUniforms {
    let mut ambient = Vec3::ZERO;
    let mut dir_light_dir = [0.0, -1.0, 0.0, 0.0];
    let mut dir_light_color = [0.0; 4];
    let mut point_pos = [0.0; 4];
    let mut point_color = [0.0; 4];

    for (id, _) in scene.walk() {
        let Some(light) = scene.get(id).and_then(Node::as_light) else {
            continue;
        };
        if !scene.is_visible(id) {
            continue;
        }
        let Some(world) = scene.world_matrix(id) else {
            continue;
        };
        let position = world.w_axis.truncate();
        let radiance = light.radiance();
        match light.kind {
            LightKind::Ambient => ambient += radiance,
            LightKind::Directional { target, .. } => {
                let dir = (target - position).try_normalize().unwrap_or(Vec3::NEG_Y);
                dir_light_dir = dir.extend(0.0).to_array();
                dir_light_color = radiance.extend(0.0).to_array();
            }
            LightKind::Point { distance, decay } => {
                point_pos = position.extend(distance).to_array();
                point_color = radiance.extend(decay).to_array();
            }
        }
    }

    let shadow = shadow_view_proj(scene);
    if let Some((_, bias)) = shadow {
        dir_light_dir[3] = 1.0;
        dir_light_color[3] = bias;
    }

    FrameUniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        light_view_proj: shadow
            .map_or(Mat4::IDENTITY, |(m, _)| m)
            .to_cols_array_2d(),
        camera_pos: camera.eye().extend(1.0).to_array(),
        ambient: ambient.extend(0.0).to_array(),
        dir_light_dir,
        dir_light_color,
        point_pos,
        point_color,
    }
}

pub(crate) fn object_uniforms(
    model: Mat4,
    material: &Material,
    receive_shadow: bool,
    map_repeat: [f32; 2],
    displacement_repeat: [f32; 2],
) -> ObjectUniforms {
    let [r, g, b] = material.color.to_linear();
    let alpha = if material.transparent {
        material.opacity
    } else {
        1.0
    };
    let displacement_scale = if material.displacement_map.is_some() {
        material.displacement_scale
    } else {
        0.0
    };
    ObjectUniforms {
        model: model.to_cols_array_2d(),
        normal_matrix: model.inverse().transpose().to_cols_array_2d(),
        base_color: [r, g, b, alpha],
        params: [
            material.roughness,
            material.metalness,
            displacement_scale,
            if receive_shadow { 1.0 } else { 0.0 },
        ],
        uv_repeat: [
            map_repeat[0],
            map_repeat[1],
            displacement_repeat[0],
            displacement_repeat[1],
        ],
    }
}

/// Draw order for blended meshes: farthest from the eye first.
pub(crate) fn back_to_front<T>(eye: Vec3, mut items: Vec<(Vec3, T)>) -> Vec<T> {
    items.sort_by(|(a, _), (b, _)| b.distance_squared(eye).total_cmp(&a.distance_squared(eye)));
    items.into_iter().map(|(_, i)| i).collect()
}

pub(crate) fn mesh_nodes(scene: &Scene) -> impl Iterator<Item = (cottage_common::NodeId, &Node)> {
    scene.walk().into_iter().filter_map(move |(id, _)| {
        let node = scene.get(id)?;
        matches!(node.kind, NodeKind::Mesh(_)).then_some((id, node))
    })
}
