use glam::{Mat4, Quat, Vec3};
use serde::Serialize;

const FOV_DEGREES: f32 = 75.0;
const PERSPECTIVE_NEAR: f32 = 0.1;
const ORTHOGRAPHIC_NEAR: f32 = 1.0;
const FAR: f32 = 1000.0;
/// Half height of the orthographic view volume.
const VIEW_SIZE: f32 = 15.0;
const EYE_HEIGHT: f32 = 5.0;

/// Projection model of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Projection {
    Perspective,
    Orthographic,
}

impl Projection {
    pub fn toggled(self) -> Self {
        match self {
            Projection::Perspective => Projection::Orthographic,
            Projection::Orthographic => Projection::Perspective,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Projection::Perspective => "perspective",
            Projection::Orthographic => "orthographic",
        }
    }
}

/// Camera with two switchable projections.
///
/// Aiming always happens from `(0, 0, distance)`. At construction the eye is
/// then raised to `y = 5` keeping that orientation; a toggle rebuilds the
/// camera at `(0, 0, distance)`. Changing the distance slides the eye along z
/// without re-aiming.
#[derive(Debug, Clone)]
pub struct CameraRig {
    projection: Projection,
    eye: Vec3,
    orientation: Quat,
    viewport: (u32, u32),
    aspect: f32,
    projection_matrix: Mat4,
    refresh_scheduled: bool,
}

impl CameraRig {
    /// Perspective camera for a `width` x `height` viewport aimed at `target`
    /// (the origin when there is nothing to aim at yet).
    pub fn new(width: u32, height: u32, distance: f32, target: Option<Vec3>) -> Self {
        let mut rig = Self {
            projection: Projection::Perspective,
            eye: Vec3::new(0.0, 0.0, distance),
            orientation: Quat::IDENTITY,
            viewport: (width, height),
            aspect: aspect_ratio(width, height),
            projection_matrix: Mat4::IDENTITY,
            refresh_scheduled: false,
        };
        rig.rebuild(target);
        rig.eye.y = EYE_HEIGHT;
        rig
    }

    /// Switch projection model, rebuild and re-aim. The projection matrix is
    /// refreshed again at the next frame boundary.
    pub fn toggle_projection(&mut self, target: Option<Vec3>) {
        self.projection = self.projection.toggled();
        self.rebuild(target);
        self.refresh_scheduled = true;
        tracing::info!("camera switched to {}", self.projection.name());
    }

    /// Apply work scheduled for the frame boundary. Returns true if a
    /// projection refresh ran.
    pub fn begin_frame(&mut self) -> bool {
        if !self.refresh_scheduled {
            return false;
        }
        self.refresh_scheduled = false;
        self.update_projection();
        true
    }

    pub fn refresh_scheduled(&self) -> bool {
        self.refresh_scheduled
    }

    /// Track a new viewport size. The projection kind is unchanged.
    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.aspect = aspect_ratio(width, height);
        self.update_projection();
        tracing::debug!("camera resized to {width}x{height} (aspect {:.3})", self.aspect);
    }

    /// Slide the eye to `z` without re-aiming.
    pub fn set_distance(&mut self, z: f32) {
        self.eye.z = z;
    }

    pub fn distance(&self) -> f32 {
        self.eye.z
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Orthographic extents `(left, right, bottom, top)` for the current aspect.
    pub fn orthographic_extents(&self) -> (f32, f32, f32, f32) {
        (
            -VIEW_SIZE * self.aspect,
            VIEW_SIZE * self.aspect,
            -VIEW_SIZE,
            VIEW_SIZE,
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.eye).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    fn rebuild(&mut self, target: Option<Vec3>) {
        self.eye = Vec3::new(0.0, 0.0, self.eye.z);
        self.orientation = aim(self.eye, target.unwrap_or(Vec3::ZERO));
        self.update_projection();
    }

    fn update_projection(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective => Mat4::perspective_rh(
                FOV_DEGREES.to_radians(),
                self.aspect,
                PERSPECTIVE_NEAR,
                FAR,
            ),
            Projection::Orthographic => {
                let (left, right, bottom, top) = self.orthographic_extents();
                Mat4::orthographic_rh(left, right, bottom, top, ORTHOGRAPHIC_NEAR, FAR)
            }
        };
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

/// Orientation looking from `eye` to `target` with +Y up.
fn aim(eye: Vec3, target: Vec3) -> Quat {
    let dir = target - eye;
    if dir.length_squared() < 1e-8 {
        return Quat::IDENTITY;
    }
    // Looking straight up or down: pick an up vector that is not parallel.
    let up = if dir.normalize().cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::NEG_Z
    } else {
        Vec3::Y
    };
    Quat::from_mat4(&Mat4::look_at_rh(eye, target, up).inverse()).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_raised_but_looking_straight_ahead() {
        let cam = CameraRig::new(1280, 720, 20.0, Some(Vec3::ZERO));
        assert_eq!(cam.projection(), Projection::Perspective);
        assert_eq!(cam.eye(), Vec3::new(0.0, 5.0, 20.0));
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(!cam.refresh_scheduled());
    }

    #[test]
    fn aim_is_taken_from_ground_level_eye() {
        let target = Vec3::new(4.0, 2.0, 0.0);
        let cam = CameraRig::new(1280, 720, 20.0, Some(target));
        let from_ground = (target - Vec3::new(0.0, 0.0, 20.0)).normalize();
        assert!(cam.forward().abs_diff_eq(from_ground, 1e-5));
        assert_eq!(cam.eye().y, 5.0);
    }

    #[test]
    fn toggle_rebuilds_at_ground_level() {
        let mut cam = CameraRig::new(1280, 720, 20.0, None);
        cam.toggle_projection(None);
        assert_eq!(cam.eye(), Vec3::new(0.0, 0.0, 20.0));
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-5));

        let target = Vec3::new(-2.0, 0.0, 0.0);
        cam.set_distance(30.0);
        cam.toggle_projection(Some(target));
        assert_eq!(cam.eye(), Vec3::new(0.0, 0.0, 30.0));
        let to_target = (target - cam.eye()).normalize();
        assert!(cam.forward().abs_diff_eq(to_target, 1e-5));
    }

    #[test]
    fn missing_target_aims_at_origin() {
        let a = CameraRig::new(800, 600, 20.0, None);
        let b = CameraRig::new(800, 600, 20.0, Some(Vec3::ZERO));
        assert!(a.orientation().abs_diff_eq(b.orientation(), 1e-6));
    }

    #[test]
    fn toggle_twice_restores_kind_and_aim() {
        let mut cam = CameraRig::new(1280, 720, 20.0, Some(Vec3::ZERO));
        let before = cam.orientation();
        let proj_before = cam.projection_matrix();

        cam.toggle_projection(Some(Vec3::ZERO));
        assert_eq!(cam.projection(), Projection::Orthographic);
        cam.toggle_projection(Some(Vec3::ZERO));

        assert_eq!(cam.projection(), Projection::Perspective);
        assert!(cam.orientation().abs_diff_eq(before, 1e-6));
        assert_eq!(cam.projection_matrix(), proj_before);
    }

    #[test]
    fn toggle_schedules_refresh_for_next_frame() {
        let mut cam = CameraRig::new(1280, 720, 20.0, None);
        assert!(!cam.begin_frame());
        cam.toggle_projection(None);
        assert!(cam.refresh_scheduled());
        assert!(cam.begin_frame());
        assert!(!cam.refresh_scheduled());
        assert!(!cam.begin_frame());
    }

    #[test]
    fn orthographic_extents_follow_aspect() {
        let mut cam = CameraRig::new(1600, 800, 20.0, None);
        cam.toggle_projection(None);
        assert_eq!(cam.orthographic_extents(), (-30.0, 30.0, -15.0, 15.0));
        assert_eq!(
            cam.projection_matrix(),
            Mat4::orthographic_rh(-30.0, 30.0, -15.0, 15.0, 1.0, 1000.0)
        );
    }

    #[test]
    fn resize_uses_exact_ratio_and_keeps_kind() {
        let mut cam = CameraRig::new(1280, 720, 20.0, None);
        cam.on_window_resize(1920, 1200);
        let aspect = 1920.0_f32 / 1200.0;
        assert_eq!(cam.aspect(), aspect);
        assert_eq!(cam.viewport(), (1920, 1200));
        assert_eq!(cam.projection(), Projection::Perspective);
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh(75.0_f32.to_radians(), aspect, 0.1, 1000.0)
        );

        cam.toggle_projection(None);
        cam.on_window_resize(1000, 500);
        assert_eq!(cam.projection(), Projection::Orthographic);
        assert_eq!(cam.orthographic_extents().1, 30.0);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let mut cam = CameraRig::new(1280, 720, 20.0, None);
        cam.on_window_resize(640, 0);
        assert_eq!(cam.aspect(), 640.0);
        assert!(!cam.view_projection().is_nan());
    }

    #[test]
    fn distance_slides_without_reaim() {
        let mut cam = CameraRig::new(1280, 720, 20.0, Some(Vec3::ZERO));
        let aim_before = cam.orientation();
        cam.set_distance(25.0);
        assert_eq!(cam.distance(), 25.0);
        assert_eq!(cam.orientation(), aim_before);
        let eye_in_view = cam.view_matrix().transform_point3(cam.eye());
        assert!(eye_in_view.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn degenerate_aim_stays_finite() {
        let cam = CameraRig::new(100, 100, 0.0, Some(Vec3::ZERO));
        assert_eq!(cam.orientation(), Quat::IDENTITY);
        let straight_up = CameraRig::new(100, 100, 0.0, Some(Vec3::new(0.0, 5.0, 0.0)));
        assert!(!straight_up.view_matrix().is_nan());
        assert!(straight_up.forward().abs_diff_eq(Vec3::Y, 1e-5));
    }
}
