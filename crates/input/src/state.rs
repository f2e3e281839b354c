use crate::action::Action;
use cottage_common::{Axis, Transform};
use glam::Vec3;
use serde::Serialize;

/// House placement driven by the keyboard.
///
/// Rotation is kept as three angles in degrees (`qq1` about X, `qq2` about Y,
/// `qq3` about Z) so repeated presses accumulate without drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TransformState {
    pub qq1: f32,
    pub qq2: f32,
    pub qq3: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl TransformState {
    /// Apply a house action. Returns false for actions that do not move the house.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Rotate { axis, degrees } => {
                *self.angle_mut(axis) += degrees;
                true
            }
            Action::Translate { axis, units } => {
                *self.position_mut(axis) += units;
                true
            }
            Action::Dolly(_) => false,
        }
    }

    fn angle_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.qq1,
            Axis::Y => &mut self.qq2,
            Axis::Z => &mut self.qq3,
        }
    }

    fn position_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn to_transform(&self) -> Transform {
        Transform {
            position: self.position(),
            rotation: Transform::euler_degrees(self.qq1, self.qq2, self.qq3),
            ..Transform::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::action_for_key;

    #[test]
    fn starts_at_origin_unrotated() {
        let s = TransformState::default();
        assert_eq!(s.to_transform(), Transform::default());
    }

    #[test]
    fn each_key_moves_one_field() {
        let cases: [(&str, fn(&TransformState) -> f32, f32); 12] = [
            ("a", |s| s.qq1, 6.0),
            ("d", |s| s.qq1, -6.0),
            ("w", |s| s.qq2, 6.0),
            ("s", |s| s.qq2, -6.0),
            ("q", |s| s.qq3, 10.0),
            ("e", |s| s.qq3, -10.0),
            ("z", |s| s.z, 2.0),
            ("x", |s| s.z, -2.0),
            ("o", |s| s.x, 2.0),
            ("p", |s| s.x, -2.0),
            ("i", |s| s.y, 2.0),
            ("u", |s| s.y, -2.0),
        ];
        for (key, field, expected) in cases {
            let mut s = TransformState::default();
            assert!(s.apply(action_for_key(key).unwrap()));
            assert_eq!(field(&s), expected, "key {key}");
            let all = [s.qq1, s.qq2, s.qq3, s.x, s.y, s.z];
            assert_eq!(all.iter().filter(|v| **v != 0.0).count(), 1, "key {key}");
        }
    }

    #[test]
    fn dolly_leaves_house_alone() {
        let mut s = TransformState::default();
        assert!(!s.apply(Action::Dolly(1.0)));
        assert_eq!(s, TransformState::default());
    }

    #[test]
    fn transform_uses_degrees() {
        let s = TransformState {
            qq2: 90.0,
            x: 2.0,
            ..TransformState::default()
        };
        let t = s.to_transform();
        assert_eq!(t.position, Vec3::new(2.0, 0.0, 0.0));
        assert!((t.rotation * Vec3::X).abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }
}
