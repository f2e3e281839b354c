use glam::Vec3;
use std::f32::consts::TAU;

/// Parametric geometry. Tessellated once when uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Axis-aligned box centred on the origin.
    Box { width: f32, height: f32, depth: f32 },
    /// Capped cylinder along Y. With few segments this is a prism or frustum.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    /// Subdivided plane in XY facing +Z.
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

/// Triangle mesh with per-vertex normals and UVs (v = 0 at the image top).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| {
                let p = Vec3::from_array(*p);
                (lo.min(p), hi.max(p))
            },
        )
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv);
        index
    }
}

impl Geometry {
    pub fn tessellate(&self) -> MeshData {
        match *self {
            Geometry::Box {
                width,
                height,
                depth,
            } => box_mesh(Vec3::new(width, height, depth) * 0.5),
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => cylinder_mesh(radius_top, radius_bottom, height, radial_segments.max(3)),
            Geometry::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => plane_mesh(width, height, width_segments.max(1), height_segments.max(1)),
        }
    }
}

fn box_mesh(half: Vec3) -> MeshData {
    // (normal, u axis, v axis) with u x v = normal so faces wind counter-clockwise.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = MeshData::default();
    for (n, u, v) in faces {
        let center = n * n.abs().dot(half);
        let hu = u * u.abs().dot(half);
        let hv = v * v.abs().dot(half);
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let uv = [(su + 1.0) * 0.5, (1.0 - sv) * 0.5];
            mesh.push(center + hu * su + hv * sv, n, uv);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;

    // Side: two rings, top (v = 0) then bottom (v = 1).
    let mut rings = [Vec::new(), Vec::new()];
    for (row, ring) in rings.iter_mut().enumerate() {
        let v = row as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        let y = half - v * height;
        for x in 0..=segments {
            let u = x as f32 / segments as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();
            ring.push(mesh.push(Vec3::new(radius * sin, y, radius * cos), normal, [u, v]));
        }
    }
    for x in 0..segments as usize {
        let a = rings[0][x];
        let b = rings[1][x];
        let c = rings[1][x + 1];
        let d = rings[0][x + 1];
        mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    // Caps.
    for (top, radius, y) in [(true, radius_top, half), (false, radius_bottom, -half)] {
        let normal = if top { Vec3::Y } else { Vec3::NEG_Y };
        let sign = if top { 1.0 } else { -1.0 };
        let center = mesh.push(Vec3::new(0.0, y, 0.0), normal, [0.5, 0.5]);
        let ring: Vec<u32> = (0..=segments)
            .map(|x| {
                let theta = x as f32 / segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                let uv = [sin * 0.5 + 0.5, 0.5 - cos * 0.5 * sign];
                mesh.push(Vec3::new(radius * sin, y, radius * cos), normal, uv)
            })
            .collect();
        for x in 0..segments as usize {
            if top {
                mesh.indices
                    .extend_from_slice(&[center, ring[x], ring[x + 1]]);
            } else {
                mesh.indices
                    .extend_from_slice(&[center, ring[x + 1], ring[x]]);
            }
        }
    }
    mesh
}

fn plane_mesh(width: f32, height: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let cols = width_segments + 1;
    let seg_w = width / width_segments as f32;
    let seg_h = height / height_segments as f32;

    for iy in 0..=height_segments {
        let y = height * 0.5 - iy as f32 * seg_h;
        for ix in 0..=width_segments {
            let x = ix as f32 * seg_w - width * 0.5;
            let uv = [
                ix as f32 / width_segments as f32,
                iy as f32 / height_segments as f32,
            ];
            mesh.push(Vec3::new(x, y, 0.0), Vec3::Z, uv);
        }
    }
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = ix + cols * iy;
            let b = ix + cols * (iy + 1);
            let c = ix + 1 + cols * (iy + 1);
            let d = ix + 1 + cols * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}
