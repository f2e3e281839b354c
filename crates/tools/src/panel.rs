use cottage_input::Speeds;
use std::ops::RangeInclusive;

pub const ROTATION_SPEED_RANGE: RangeInclusive<f32> = 1.0..=10.0;
pub const MOVE_SPEED_RANGE: RangeInclusive<f32> = 1.0..=5.0;
pub const AMBIENT_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const LIGHT_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const CAMERA_DISTANCE_RANGE: RangeInclusive<f32> = -50.0..=100.0;

/// Live-tunable parameters bound to the panel widgets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    pub rotation_speed: f32,
    pub move_speed: f32,
    pub ambient_intensity: f32,
    pub light_intensity: f32,
    pub show_helpers: bool,
}

impl Default for ControlParams {
    fn default() -> Self {
        let speeds = Speeds::default();
        Self {
            rotation_speed: speeds.rotation,
            move_speed: speeds.movement,
            ambient_intensity: 0.4,
            light_intensity: 1.0,
            show_helpers: false,
        }
    }
}

impl ControlParams {
    /// Record a change in the bound parameter. Propagation to the scene is the
    /// caller's job.
    pub fn apply(&mut self, change: ControlChange) {
        match change {
            ControlChange::RotationSpeed(v) => self.rotation_speed = v,
            ControlChange::MoveSpeed(v) => self.move_speed = v,
            ControlChange::AmbientIntensity(v) => self.ambient_intensity = v,
            ControlChange::LightIntensity(v) => self.light_intensity = v,
            ControlChange::ShowHelpers(v) => self.show_helpers = v,
            ControlChange::CameraDistance(_)
            | ControlChange::ToggleProjection
            | ControlChange::ToggleLights => {}
        }
    }

    pub fn speeds(&self) -> Speeds {
        Speeds {
            rotation: self.rotation_speed,
            movement: self.move_speed,
        }
    }
}

/// A single widget edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlChange {
    RotationSpeed(f32),
    MoveSpeed(f32),
    AmbientIntensity(f32),
    LightIntensity(f32),
    ShowHelpers(bool),
    CameraDistance(f32),
    ToggleProjection,
    ToggleLights,
}

/// Read-only state the panel displays this frame.
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    pub params: &'a ControlParams,
    pub camera_distance: f32,
    pub camera_readout: &'a str,
    pub projection: &'a str,
    pub lights_on: bool,
}

/// egui side panel for the lighting and camera parameters.
#[derive(Debug)]
pub struct ControlPanel {
    pub open: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self { open: true }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the panel and collect this frame's edits.
    pub fn show(&self, ctx: &egui::Context, view: PanelView<'_>) -> Vec<ControlChange> {
        let mut changes = Vec::new();
        if !self.open {
            return changes;
        }

        let mut params = *view.params;
        let mut distance = view.camera_distance;

        egui::SidePanel::right("controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Controls");
                ui.separator();

                if ui
                    .add(egui::Slider::new(&mut params.rotation_speed, ROTATION_SPEED_RANGE).text("Rotation Speed"))
                    .changed()
                {
                    changes.push(ControlChange::RotationSpeed(params.rotation_speed));
                }
                if ui
                    .add(egui::Slider::new(&mut params.move_speed, MOVE_SPEED_RANGE).text("Move Speed"))
                    .changed()
                {
                    changes.push(ControlChange::MoveSpeed(params.move_speed));
                }
                if ui
                    .add(egui::Slider::new(&mut params.ambient_intensity, AMBIENT_RANGE).text("Ambient Intensity"))
                    .changed()
                {
                    changes.push(ControlChange::AmbientIntensity(params.ambient_intensity));
                }
                if ui
                    .add(egui::Slider::new(&mut params.light_intensity, LIGHT_RANGE).text("Light Intensity"))
                    .changed()
                {
                    changes.push(ControlChange::LightIntensity(params.light_intensity));
                }
                if ui.checkbox(&mut params.show_helpers, "Show Helpers").changed() {
                    changes.push(ControlChange::ShowHelpers(params.show_helpers));
                }

                ui.separator();
                ui.heading("Camera");
                ui.label(format!("Projection: {}", view.projection));
                ui.label(format!("Lights: {}", if view.lights_on { "on" } else { "off" }));
                if ui
                    .add(
                        egui::Slider::new(&mut distance, CAMERA_DISTANCE_RANGE)
                            .step_by(1.0)
                            .text("Camera Z"),
                    )
                    .changed()
                {
                    changes.push(ControlChange::CameraDistance(distance));
                }
                ui.label(format!("Camera Z: {}", view.camera_readout));
                ui.horizontal(|ui| {
                    if ui.button("Toggle Projection").clicked() {
                        changes.push(ControlChange::ToggleProjection);
                    }
                    if ui.button("Toggle Lights").clicked() {
                        changes.push(ControlChange::ToggleLights);
                    }
                });

                ui.separator();
                ui.small("A/D W/S Q/E: rotate | O/P I/U Z/X: move | K/L: camera");
            });

        if !changes.is_empty() {
            tracing::debug!("control panel changes: {changes:?}");
        }
        changes
    }
}
