use cottage_assets::{TextureId, TextureLoader, TextureStore};
use cottage_input::{Action, TransformState, action_for_key};
use cottage_render::CameraRig;
use cottage_scene::{
    BuiltScene, HouseParts, LightHelpers, LightRig, Scene, SceneError, SceneTextures, build_scene,
};
use cottage_tools::{ControlChange, ControlParams, SceneInspector, SceneSummary};
use glam::Vec3;
use std::path::PathBuf;

const INITIAL_CAMERA_DISTANCE: f32 = 20.0;

#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("scene construction failed: {0}")]
    Scene(#[from] SceneError),
}

/// Startup configuration for the viewer.
#[derive(Debug, Clone)]
pub struct ShowcaseConfig {
    pub texture_dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("textures"),
            width: 1280,
            height: 720,
        }
    }
}

/// The running viewer.
///
/// Owns the scene, camera, control parameters, house transform, light
/// helpers and textures. Input and panel edits go through its operations;
/// renderers only read from it.
#[derive(Debug)]
pub struct Showcase {
    scene: Scene,
    house: HouseParts,
    floor: cottage_common::NodeId,
    lights: LightRig,
    helpers: LightHelpers,
    camera: CameraRig,
    params: ControlParams,
    transform: TransformState,
    camera_distance: f32,
    camera_readout: String,
    store: TextureStore,
    loader: TextureLoader,
    textures: SceneTextures,
}

impl Showcase {
    /// Build the scene and start loading textures from `config.texture_dir`.
    pub fn new(config: &ShowcaseConfig) -> Result<Self, KernelError> {
        let mut store = TextureStore::new();
        let mut loader = TextureLoader::new();
        let textures = SceneTextures::load(&mut loader, &mut store, &config.texture_dir);
        tracing::info!(
            "loading {} textures from {}",
            store.len(),
            config.texture_dir.display()
        );
        Self::assemble(config, store, loader, textures)
    }

    /// Build the scene with every texture left pending. No files are read.
    pub fn offline(width: u32, height: u32) -> Result<Self, KernelError> {
        let config = ShowcaseConfig {
            width,
            height,
            ..ShowcaseConfig::default()
        };
        let mut store = TextureStore::new();
        let textures = SceneTextures::pending(&mut store, &config.texture_dir);
        Self::assemble(&config, store, TextureLoader::new(), textures)
    }

    fn assemble(
        config: &ShowcaseConfig,
        store: TextureStore,
        loader: TextureLoader,
        textures: SceneTextures,
    ) -> Result<Self, KernelError> {
        let params = ControlParams::default();
        let BuiltScene {
            scene,
            house,
            floor,
            lights,
        } = build_scene(&textures, params.ambient_intensity, params.light_intensity)?;

        let target = house_position(&scene, house);
        let camera = CameraRig::new(config.width, config.height, INITIAL_CAMERA_DISTANCE, target);

        let mut showcase = Self {
            scene,
            house,
            floor,
            lights,
            helpers: LightHelpers::new(),
            camera,
            params,
            transform: TransformState::default(),
            camera_distance: INITIAL_CAMERA_DISTANCE,
            camera_readout: String::new(),
            store,
            loader,
            textures,
        };
        showcase.refresh_after_input();
        Ok(showcase)
    }

    /// Handle a key press by its character identity. Unknown keys only
    /// refresh derived state.
    pub fn handle_key(&mut self, key: &str) -> Option<Action> {
        let action = action_for_key(key).map(|a| a.scaled(self.params.speeds()));
        match action {
            Some(Action::Dolly(units)) => self.camera_distance += units,
            Some(a) => {
                self.transform.apply(a);
            }
            None => tracing::trace!("unmapped key {key:?}"),
        }
        self.refresh_after_input();
        action
    }

    fn refresh_after_input(&mut self) {
        self.camera_readout = format!("{}", self.camera_distance);
        if let Err(e) = self
            .scene
            .set_transform(self.house.house, self.transform.to_transform())
        {
            tracing::warn!("house transform not applied: {e}");
        }
        self.camera.set_distance(self.camera_distance);
    }

    /// Apply one control panel edit.
    pub fn apply_control(&mut self, change: ControlChange) {
        self.params.apply(change);
        match change {
            ControlChange::AmbientIntensity(v) => self.set_light_intensity(self.lights.ambient, v),
            ControlChange::LightIntensity(v) => {
                self.set_light_intensity(self.lights.directional, v)
            }
            ControlChange::ShowHelpers(show) => {
                self.helpers.set_visible(&mut self.scene, &self.lights, show)
            }
            ControlChange::CameraDistance(z) => self.set_camera_distance(z),
            ControlChange::ToggleProjection => self.toggle_projection(),
            ControlChange::ToggleLights => self.toggle_lights(),
            ControlChange::RotationSpeed(_) | ControlChange::MoveSpeed(_) => {}
        }
    }

    fn set_light_intensity(&mut self, id: cottage_common::NodeId, value: f32) {
        match self.scene.light_mut(id) {
            Some(light) => light.intensity = value,
            None => tracing::warn!("light {} missing from scene", id.short()),
        }
    }

    /// Flip between perspective and orthographic, re-aiming at the house.
    pub fn toggle_projection(&mut self) {
        let target = house_position(&self.scene, self.house);
        self.camera.toggle_projection(target);
    }

    /// Flip visibility of the directional and point lights together.
    pub fn toggle_lights(&mut self) {
        let on = !self.lights_on();
        for id in [self.lights.directional, self.lights.point] {
            if let Some(node) = self.scene.get_mut(id) {
                node.visible = on;
            }
        }
        tracing::info!("lights {}", if on { "on" } else { "off" });
    }

    pub fn lights_on(&self) -> bool {
        self.scene
            .get(self.lights.directional)
            .is_some_and(|n| n.visible)
    }

    /// Set the camera z offset. Fractional values are truncated.
    pub fn set_camera_distance(&mut self, z: f32) {
        self.camera_distance = z.trunc();
        self.camera_readout = format!("{}", self.camera_distance);
        self.camera.set_distance(self.camera_distance);
    }

    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        self.camera.on_window_resize(width, height);
    }

    /// Per-frame housekeeping: resolve finished texture decodes and apply a
    /// scheduled camera refresh. Returns the textures that resolved.
    pub fn begin_frame(&mut self) -> Vec<TextureId> {
        let resolved = self.loader.poll(&mut self.store);
        self.camera.begin_frame();
        resolved
    }

    /// Block until every texture load has resolved.
    pub fn wait_for_textures(&mut self) -> Vec<TextureId> {
        self.loader.wait(&mut self.store)
    }

    pub fn summary(&self) -> SceneSummary {
        SceneInspector::summary(&self.scene, &self.camera, &self.store, &self.transform)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Drain scene mutation events for logging.
    pub fn drain_scene_events(&mut self) -> Vec<cottage_scene::SceneEvent> {
        self.scene.drain_events()
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn params(&self) -> &ControlParams {
        &self.params
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn camera_distance(&self) -> f32 {
        self.camera_distance
    }

    pub fn camera_readout(&self) -> &str {
        &self.camera_readout
    }

    pub fn house(&self) -> HouseParts {
        self.house
    }

    pub fn floor(&self) -> cottage_common::NodeId {
        self.floor
    }

    pub fn lights(&self) -> LightRig {
        self.lights
    }

    pub fn helpers(&self) -> &LightHelpers {
        &self.helpers
    }

    pub fn textures(&self) -> &TextureStore {
        &self.store
    }

    pub fn scene_textures(&self) -> SceneTextures {
        self.textures
    }
}

fn house_position(scene: &Scene, house: HouseParts) -> Option<Vec3> {
    scene
        .world_matrix(house.house)
        .map(|m| m.w_axis.truncate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cottage_assets::TextureState;
    use cottage_render::Projection;
    use cottage_scene::{NodeKind, TEXTURE_FILES};

    fn showcase() -> Showcase {
        Showcase::offline(1280, 720).unwrap()
    }

    fn helper_count(s: &Showcase) -> usize {
        s.scene()
            .walk()
            .into_iter()
            .filter(|(id, _)| {
                matches!(
                    s.scene().get(*id).map(|n| &n.kind),
                    Some(NodeKind::Helper(_))
                )
            })
            .count()
    }

    fn intensity(s: &Showcase, id: cottage_common::NodeId) -> f32 {
        s.scene().get(id).and_then(|n| n.as_light()).unwrap().intensity
    }

    #[test]
    fn starts_with_initial_state() {
        let s = showcase();
        assert_eq!(s.camera_distance(), 20.0);
        assert_eq!(s.camera_readout(), "20");
        assert_eq!(*s.transform(), TransformState::default());
        assert_eq!(s.camera().projection(), Projection::Perspective);
        assert_eq!(s.camera().eye(), Vec3::new(0.0, 5.0, 20.0));
        assert!(s.lights_on());
        assert!(!s.helpers().is_shown());
    }

    #[test]
    fn toggle_twice_restores_camera() {
        let mut s = showcase();
        let orientation = s.camera().orientation();
        let projection = s.camera().projection_matrix();

        s.toggle_projection();
        s.begin_frame();
        assert_eq!(s.camera().projection(), Projection::Orthographic);
        s.toggle_projection();
        s.begin_frame();

        assert_eq!(s.camera().projection(), Projection::Perspective);
        assert!(s.camera().orientation().abs_diff_eq(orientation, 1e-5));
        assert_eq!(s.camera().projection_matrix(), projection);
    }

    #[test]
    fn initial_view_looks_straight_at_the_house() {
        let mut s = showcase();
        assert_eq!(s.camera().eye(), Vec3::new(0.0, 5.0, 20.0));
        assert!(s.camera().forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));

        s.toggle_projection();
        assert_eq!(s.camera().eye(), Vec3::new(0.0, 0.0, 20.0));
        assert!(s.camera().forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn toggle_aims_at_moved_house() {
        let mut s = showcase();
        s.handle_key("o");
        s.handle_key("i");
        let house = Vec3::new(2.0, 2.0, 0.0);
        assert_eq!(s.scene().get(s.house().house).unwrap().transform.position, house);

        s.toggle_projection();
        s.begin_frame();
        let eye = s.camera().eye();
        assert_eq!(eye, Vec3::new(0.0, 0.0, 20.0));
        let expected = (house - eye).normalize();
        assert!(s.camera().forward().abs_diff_eq(expected, 1e-5));
        let post_move = s.camera().orientation();

        s.toggle_projection();
        s.begin_frame();
        assert_eq!(s.camera().projection(), Projection::Perspective);
        assert!(s.camera().orientation().abs_diff_eq(post_move, 1e-5));
        assert!(s.camera().forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn each_key_changes_one_field() {
        let cases: [(&str, fn(&TransformState) -> f32, f32); 12] = [
            ("a", |t| t.qq1, 6.0),
            ("d", |t| t.qq1, -6.0),
            ("w", |t| t.qq2, 6.0),
            ("s", |t| t.qq2, -6.0),
            ("q", |t| t.qq3, 10.0),
            ("e", |t| t.qq3, -10.0),
            ("z", |t| t.z, 2.0),
            ("x", |t| t.z, -2.0),
            ("o", |t| t.x, 2.0),
            ("p", |t| t.x, -2.0),
            ("i", |t| t.y, 2.0),
            ("u", |t| t.y, -2.0),
        ];
        for (key, field, delta) in cases {
            let mut s = showcase();
            s.handle_key(key);
            assert_eq!(field(s.transform()), delta, "key {key}");
            let sum = {
                let t = s.transform();
                t.qq1 + t.qq2 + t.qq3 + t.x + t.y + t.z
            };
            assert_eq!(sum, delta, "key {key} touched another field");
            assert_eq!(s.camera_distance(), 20.0);
        }
    }

    #[test]
    fn camera_keys_move_eye_and_readout() {
        let mut s = showcase();
        s.handle_key("K");
        assert_eq!(s.camera_distance(), 21.0);
        assert_eq!(s.camera_readout(), "21");
        assert_eq!(s.camera().eye().z, 21.0);
        s.handle_key("l");
        s.handle_key("l");
        assert_eq!(s.camera_distance(), 19.0);
        assert_eq!(*s.transform(), TransformState::default());
    }

    #[test]
    fn keys_apply_house_transform() {
        let mut s = showcase();
        s.handle_key("o");
        s.handle_key("A");
        let house = s.scene().get(s.house().house).unwrap();
        assert_eq!(house.transform.position, Vec3::new(2.0, 0.0, 0.0));
        assert!(house
            .transform
            .rotation
            .abs_diff_eq(glam::Quat::from_rotation_x(6f32.to_radians()), 1e-6));
    }

    #[test]
    fn long_key_replay_keeps_event_log_bounded() {
        let mut s = showcase();
        for _ in 0..cottage_scene::EVENT_LOG_CAPACITY * 2 {
            s.handle_key("a");
        }
        assert_eq!(s.scene().events().len(), cottage_scene::EVENT_LOG_CAPACITY);
        assert_eq!(s.drain_scene_events().len(), cottage_scene::EVENT_LOG_CAPACITY);
        assert!(s.scene().events().is_empty());
    }

    #[test]
    fn unknown_key_changes_nothing() {
        let mut s = showcase();
        assert_eq!(s.handle_key("m"), None);
        assert_eq!(s.handle_key("ArrowUp"), None);
        assert_eq!(*s.transform(), TransformState::default());
        assert_eq!(s.camera_distance(), 20.0);
        assert_eq!(s.camera_readout(), "20");
    }

    #[test]
    fn speeds_scale_increments() {
        let mut s = showcase();
        s.apply_control(ControlChange::RotationSpeed(6.0));
        s.apply_control(ControlChange::MoveSpeed(1.0));
        s.handle_key("q");
        s.handle_key("o");
        assert_eq!(s.transform().qq3, 20.0);
        assert_eq!(s.transform().x, 1.0);
    }

    #[test]
    fn resize_updates_aspect_exactly() {
        let mut s = showcase();
        s.on_window_resize(1000, 400);
        assert_eq!(s.camera().aspect(), 2.5);
        assert_eq!(
            s.camera().projection_matrix(),
            glam::Mat4::perspective_rh(75f32.to_radians(), 2.5, 0.1, 1000.0)
        );
    }

    #[test]
    fn helpers_on_off_restores_membership() {
        let mut s = showcase();
        let before = s.scene().node_count();

        s.apply_control(ControlChange::ShowHelpers(true));
        assert_eq!(helper_count(&s), 2);
        s.apply_control(ControlChange::ShowHelpers(true));
        assert_eq!(helper_count(&s), 2);
        assert_eq!(s.scene().node_count(), before + 2);

        s.apply_control(ControlChange::ShowHelpers(false));
        assert_eq!(helper_count(&s), 0);
        assert_eq!(s.scene().node_count(), before);
        assert!(!s.params().show_helpers);
    }

    #[test]
    fn intensity_controls_touch_one_light() {
        let mut s = showcase();
        let rig = s.lights();

        s.apply_control(ControlChange::AmbientIntensity(0.73));
        assert_eq!(intensity(&s, rig.ambient), 0.73);
        assert_eq!(intensity(&s, rig.directional), 1.0);
        assert_eq!(intensity(&s, rig.point), 1.0);

        s.apply_control(ControlChange::LightIntensity(1.6));
        assert_eq!(intensity(&s, rig.directional), 1.6);
        assert_eq!(intensity(&s, rig.ambient), 0.73);
        assert_eq!(intensity(&s, rig.point), 1.0);
    }

    #[test]
    fn camera_distance_control_truncates() {
        let mut s = showcase();
        s.apply_control(ControlChange::CameraDistance(-12.7));
        assert_eq!(s.camera_distance(), -12.0);
        assert_eq!(s.camera_readout(), "-12");
        assert_eq!(s.camera().eye().z, -12.0);
    }

    #[test]
    fn toggle_lights_flips_directional_and_point() {
        let mut s = showcase();
        let rig = s.lights();
        s.apply_control(ControlChange::ToggleLights);
        assert!(!s.lights_on());
        assert!(!s.scene().get(rig.point).unwrap().visible);
        assert!(s.scene().get(rig.ambient).unwrap().visible);
        s.toggle_lights();
        assert!(s.lights_on());
        assert!(s.scene().get(rig.point).unwrap().visible);
    }

    #[test]
    fn missing_textures_still_build_full_scene() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShowcaseConfig {
            texture_dir: dir.path().join("nowhere"),
            ..ShowcaseConfig::default()
        };
        let mut s = Showcase::new(&config).unwrap();
        let resolved = s.wait_for_textures();
        assert_eq!(resolved.len(), TEXTURE_FILES.len());
        assert!(s
            .textures()
            .iter()
            .all(|(_, e)| matches!(e.state, TextureState::Failed(_))));
        assert_eq!(s.summary().meshes, 7);
        assert_eq!(s.summary().textures.failed, 4);
    }

    #[test]
    fn present_textures_become_ready() {
        let dir = tempfile::tempdir().unwrap();
        for name in TEXTURE_FILES {
            image::RgbImage::from_pixel(2, 2, image::Rgb([200, 100, 50]))
                .save_with_format(dir.path().join(name), image::ImageFormat::Jpeg)
                .unwrap();
        }
        let config = ShowcaseConfig {
            texture_dir: dir.path().to_path_buf(),
            ..ShowcaseConfig::default()
        };
        let mut s = Showcase::new(&config).unwrap();
        s.wait_for_textures();
        assert_eq!(s.summary().textures.ready, 4);
        let walls = s.textures().get(s.scene_textures().walls).unwrap();
        assert_eq!(walls.state.image().unwrap().width, 2);
    }
}
