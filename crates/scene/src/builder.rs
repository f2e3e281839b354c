use crate::geometry::Geometry;
use crate::graph::{Node, NodeKind, Scene, SceneError};
use crate::light::{Light, LightRig, ShadowSettings};
use crate::material::Material;
use cottage_assets::{Sampling, TextureId, TextureLoader, TextureStore};
use cottage_common::{Color, NodeId, Transform};
use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::path::Path;

/// Texture files the scene expects, relative to the texture directory.
pub const TEXTURE_FILES: [&str; 4] = [
    "texture1.jpg",
    "texture2.jpg",
    "roof_tiles.jpg",
    "floor_displacement.jpg",
];

const SKY_BLUE: u32 = 0x87CEEB;

/// Handles for every texture the scene samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTextures {
    pub walls: TextureId,
    pub floor: TextureId,
    pub roof: TextureId,
    pub floor_displacement: TextureId,
}

impl SceneTextures {
    /// Start loading all scene textures from `dir`. Handles return pending.
    pub fn load(loader: &mut TextureLoader, store: &mut TextureStore, dir: &Path) -> Self {
        let [walls, floor, roof, displacement] = TEXTURE_FILES;
        Self {
            walls: loader.load(store, dir.join(walls), Sampling::tiled(2.0, 1.0)),
            floor: loader.load(store, dir.join(floor), Sampling::default()),
            roof: loader.load(store, dir.join(roof), Sampling::default()),
            floor_displacement: loader.load(store, dir.join(displacement), Sampling::data()),
        }
    }

    /// Register pending handles without starting any decode.
    pub fn pending(store: &mut TextureStore, dir: &Path) -> Self {
        let [walls, floor, roof, displacement] = TEXTURE_FILES;
        Self {
            walls: store.insert_pending(dir.join(walls), Sampling::tiled(2.0, 1.0)),
            floor: store.insert_pending(dir.join(floor), Sampling::default()),
            roof: store.insert_pending(dir.join(roof), Sampling::default()),
            floor_displacement: store.insert_pending(dir.join(displacement), Sampling::data()),
        }
    }
}

/// Node ids of the house and its attached parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HouseParts {
    pub house: NodeId,
    pub roof: NodeId,
    pub windows: [NodeId; 2],
    pub door: NodeId,
    pub chimney: NodeId,
}

/// The constructed scene plus ids of the nodes the controller drives.
#[derive(Debug, Clone)]
pub struct BuiltScene {
    pub scene: Scene,
    pub house: HouseParts,
    pub floor: NodeId,
    pub lights: LightRig,
}

/// Build the fixed cottage scene.
///
/// Textures may still be pending; materials hold handles only.
pub fn build_scene(
    textures: &SceneTextures,
    ambient_intensity: f32,
    light_intensity: f32,
) -> Result<BuiltScene, SceneError> {
    let mut scene = Scene::new();
    scene.background = Color::from_hex(SKY_BLUE);

    let lights = setup_lighting(&mut scene, ambient_intensity, light_intensity);
    let house = build_house(&mut scene, textures)?;
    let floor = build_floor(&mut scene, textures);

    tracing::info!(
        "scene built: {} nodes, house {}",
        scene.node_count(),
        house.house.short()
    );
    Ok(BuiltScene {
        scene,
        house,
        floor,
        lights,
    })
}

fn setup_lighting(scene: &mut Scene, ambient_intensity: f32, light_intensity: f32) -> LightRig {
    let ambient = scene.add(Node::light(
        "ambient_light",
        Light::ambient(Color::WHITE, ambient_intensity),
    ));

    let directional = scene.add(
        Node::light(
            "directional_light",
            Light::directional(Color::WHITE, light_intensity, Vec3::ZERO)
                .with_shadow(ShadowSettings::default()),
        )
        .with_transform(Transform::from_position(Vec3::new(5.0, 10.0, 5.0)))
        .casting_shadow(),
    );

    let point = scene.add(Node::light(
        "house_light",
        Light::point(Color::from_hex(0xffeedd), 1.0, 10.0),
    ));

    LightRig {
        ambient,
        directional,
        point,
    }
}

fn build_house(scene: &mut Scene, textures: &SceneTextures) -> Result<HouseParts, SceneError> {
    let house = scene.add(
        Node::mesh(
            "house",
            Geometry::Box {
                width: 4.0,
                height: 3.0,
                depth: 3.0,
            },
            Material {
                map: Some(textures.walls),
                roughness: 0.8,
                metalness: 0.2,
                ..Material::default()
            },
        )
        .casting_shadow()
        .receiving_shadow(),
    );

    let roof = scene.add_child(
        house,
        Node::mesh(
            "roof",
            Geometry::Cylinder {
                radius_top: 2.5,
                radius_bottom: 3.0,
                height: 2.0,
                radial_segments: 4,
            },
            Material {
                map: Some(textures.roof),
                roughness: 0.7,
                ..Material::default()
            },
        )
        .with_transform(Transform {
            position: Vec3::new(0.0, 2.2, 0.0),
            rotation: Quat::from_rotation_y(FRAC_PI_4),
            ..Transform::default()
        })
        .casting_shadow(),
    )?;

    let windows = [
        add_window(scene, house, Vec3::new(1.5, 0.5, 1.51))?,
        add_window(scene, house, Vec3::new(-1.5, 0.5, 1.51))?,
    ];

    let door = scene.add_child(
        house,
        Node::mesh(
            "door",
            Geometry::Box {
                width: 1.0,
                height: 2.0,
                depth: 0.1,
            },
            Material {
                roughness: 0.8,
                ..Material::colored(0x3d2b1f)
            },
        )
        .with_transform(Transform::from_position(Vec3::new(0.0, -0.5, 1.51))),
    )?;

    let chimney = scene.add_child(
        house,
        Node::mesh(
            "chimney",
            Geometry::Box {
                width: 0.5,
                height: 2.0,
                depth: 0.5,
            },
            Material::colored(0x444444),
        )
        .with_transform(Transform::from_position(Vec3::new(1.2, 2.5, 0.0))),
    )?;

    Ok(HouseParts {
        house,
        roof,
        windows,
        door,
        chimney,
    })
}

fn add_window(scene: &mut Scene, house: NodeId, position: Vec3) -> Result<NodeId, SceneError> {
    scene.add_child(
        house,
        Node::mesh(
            "window",
            Geometry::Box {
                width: 1.0,
                height: 0.8,
                depth: 0.1,
            },
            Material {
                transparent: true,
                opacity: 0.7,
                ..Material::colored(0x1a64c8)
            },
        )
        .with_transform(Transform::from_position(position)),
    )
}

fn build_floor(scene: &mut Scene, textures: &SceneTextures) -> NodeId {
    scene.add(
        Node::mesh(
            "floor",
            Geometry::Plane {
                width: 40.0,
                height: 40.0,
                width_segments: 100,
                height_segments: 100,
            },
            Material {
                map: Some(textures.floor),
                roughness: 0.9,
                metalness: 0.1,
                displacement_map: Some(textures.floor_displacement),
                displacement_scale: 0.1,
                ..Material::default()
            },
        )
        .with_transform(Transform {
            position: Vec3::new(0.0, -1.5, 0.0),
            rotation: Quat::from_rotation_x(-FRAC_PI_2),
            ..Transform::default()
        })
        .receiving_shadow(),
    )
}

/// Names of all mesh nodes in traversal order.
pub fn mesh_names(scene: &Scene) -> Vec<String> {
    scene
        .walk()
        .into_iter()
        .filter_map(|(id, _)| scene.get(id))
        .filter(|n| matches!(n.kind, NodeKind::Mesh(_)))
        .map(|n| n.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cottage_assets::TextureState;
    use std::path::PathBuf;

    fn built_with_pending() -> (BuiltScene, SceneTextures) {
        let mut store = TextureStore::new();
        let textures = SceneTextures::pending(&mut store, &PathBuf::from("textures"));
        (build_scene(&textures, 0.4, 1.0).unwrap(), textures)
    }

    #[test]
    fn house_owns_its_parts() {
        let (built, _) = built_with_pending();
        let house = built.scene.get(built.house.house).unwrap();
        assert_eq!(house.children().len(), 5);
        for part in [
            built.house.roof,
            built.house.windows[0],
            built.house.windows[1],
            built.house.door,
            built.house.chimney,
        ] {
            assert_eq!(built.scene.get(part).unwrap().parent(), Some(built.house.house));
        }
    }

    #[test]
    fn floor_and_lights_are_root_siblings() {
        let (built, _) = built_with_pending();
        let roots = built.scene.roots();
        for id in [
            built.floor,
            built.house.house,
            built.lights.ambient,
            built.lights.directional,
            built.lights.point,
        ] {
            assert!(roots.contains(&id));
        }
        assert_eq!(built.scene.node_count(), 10);
    }

    #[test]
    fn mesh_order_matches_construction() {
        let (built, _) = built_with_pending();
        assert_eq!(
            mesh_names(&built.scene),
            vec!["house", "roof", "window", "window", "door", "chimney", "floor"]
        );
    }

    #[test]
    fn materials_reference_texture_handles() {
        let (built, textures) = built_with_pending();
        let floor = built.scene.get(built.floor).unwrap().as_mesh().unwrap();
        assert_eq!(floor.material.map, Some(textures.floor));
        assert_eq!(floor.material.displacement_map, Some(textures.floor_displacement));
        assert_eq!(floor.material.displacement_scale, 0.1);

        let roof = built.scene.get(built.house.roof).unwrap().as_mesh().unwrap();
        assert_eq!(roof.material.map, Some(textures.roof));
    }

    #[test]
    fn floor_faces_up_below_house() {
        let (built, _) = built_with_pending();
        let m = built.scene.world_matrix(built.floor).unwrap();
        let up = m.transform_vector3(Vec3::Z);
        assert!(up.abs_diff_eq(Vec3::Y, 1e-6));
        assert_eq!(m.transform_point3(Vec3::ZERO).y, -1.5);
    }

    #[test]
    fn lights_use_initial_intensities() {
        let (built, _) = built_with_pending();
        let scene = &built.scene;
        let ambient = scene.get(built.lights.ambient).unwrap().as_light().unwrap();
        let sun = scene.get(built.lights.directional).unwrap().as_light().unwrap();
        assert_eq!(ambient.intensity, 0.4);
        assert_eq!(sun.intensity, 1.0);
        assert_eq!(sun.shadow().unwrap().map_size, 2048);
        assert_eq!(scene.background, Color::from_hex(SKY_BLUE));
    }

    #[test]
    fn failed_textures_still_build_complete_scene() {
        let mut store = TextureStore::new();
        let mut loader = TextureLoader::new();
        let dir = PathBuf::from("no/such/texture/dir");
        let textures = SceneTextures::load(&mut loader, &mut store, &dir);
        loader.wait(&mut store);
        assert!(store
            .iter()
            .all(|(_, e)| matches!(e.state, TextureState::Failed(_))));

        let built = build_scene(&textures, 0.4, 1.0).unwrap();
        assert!(built.scene.contains(built.house.house));
        assert!(built.scene.contains(built.house.roof));
        assert!(built.scene.contains(built.floor));
    }
}
