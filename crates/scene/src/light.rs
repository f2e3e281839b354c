use cottage_common::{Color, NodeId};
use glam::Vec3;

/// Shadow map configuration for a shadow-casting light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub map_size: u32,
    /// Half extent of the orthographic shadow frustum.
    pub extent: f32,
    pub near: f32,
    pub far: f32,
    pub bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 2048,
            extent: 12.0,
            near: 0.5,
            far: 50.0,
            bias: 0.0015,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Parallel light shining from the node position towards `target`.
    Directional {
        target: Vec3,
        shadow: Option<ShadowSettings>,
    },
    /// Omni light. `distance` is the cutoff range, 0 means unlimited.
    Point { distance: f32, decay: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Color,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Ambient,
        }
    }

    pub fn directional(color: Color, intensity: f32, target: Vec3) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional {
                target,
                shadow: None,
            },
        }
    }

    pub fn point(color: Color, intensity: f32, distance: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point {
                distance,
                decay: 2.0,
            },
        }
    }

    pub fn with_shadow(mut self, settings: ShadowSettings) -> Self {
        if let LightKind::Directional { shadow, .. } = &mut self.kind {
            *shadow = Some(settings);
        }
        self
    }

    pub fn shadow(&self) -> Option<&ShadowSettings> {
        match &self.kind {
            LightKind::Directional { shadow, .. } => shadow.as_ref(),
            _ => None,
        }
    }

    /// Linear color pre-multiplied by intensity.
    pub fn radiance(&self) -> Vec3 {
        Vec3::from_array(self.color.to_linear()) * self.intensity
    }
}

/// Node ids of the three scene lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightRig {
    pub ambient: NodeId,
    pub directional: NodeId,
    pub point: NodeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_only_on_directional() {
        let sun = Light::directional(Color::WHITE, 1.0, Vec3::ZERO).with_shadow(ShadowSettings::default());
        assert_eq!(sun.shadow().unwrap().map_size, 2048);

        let bulb = Light::point(Color::WHITE, 1.0, 10.0).with_shadow(ShadowSettings::default());
        assert!(bulb.shadow().is_none());
    }

    #[test]
    fn radiance_scales_with_intensity() {
        let l = Light::ambient(Color::WHITE, 0.4);
        assert!(l.radiance().abs_diff_eq(Vec3::splat(0.4), 1e-6));
    }
}
