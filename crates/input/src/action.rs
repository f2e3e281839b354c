use cottage_common::Axis;

/// Default rotation speed; rotation increments are scaled relative to it.
pub const DEFAULT_ROTATION_SPEED: f32 = 3.0;
/// Default move speed; translation increments are scaled relative to it.
pub const DEFAULT_MOVE_SPEED: f32 = 2.0;

/// A discrete change requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Add `degrees` to the house rotation angle about `axis`.
    Rotate { axis: Axis, degrees: f32 },
    /// Add `units` to the house position along `axis`.
    Translate { axis: Axis, units: f32 },
    /// Add `units` to the camera distance.
    Dolly(f32),
}

/// Speed multipliers from the control panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speeds {
    pub rotation: f32,
    pub movement: f32,
}

impl Default for Speeds {
    fn default() -> Self {
        Self {
            rotation: DEFAULT_ROTATION_SPEED,
            movement: DEFAULT_MOVE_SPEED,
        }
    }
}

impl Action {
    /// Scale house increments by the current speeds. Default speeds are the identity.
    pub fn scaled(self, speeds: Speeds) -> Self {
        match self {
            Action::Rotate { axis, degrees } => Action::Rotate {
                axis,
                degrees: degrees * speeds.rotation / DEFAULT_ROTATION_SPEED,
            },
            Action::Translate { axis, units } => Action::Translate {
                axis,
                units: units * speeds.movement / DEFAULT_MOVE_SPEED,
            },
            Action::Dolly(units) => Action::Dolly(units),
        }
    }
}

/// Map a key identity (the character the key produces) to its action.
pub fn action_for_key(key: &str) -> Option<Action> {
    let rotate = |axis, degrees| Some(Action::Rotate { axis, degrees });
    let translate = |axis, units| Some(Action::Translate { axis, units });

    match key.to_lowercase().as_str() {
        "a" => rotate(Axis::X, 6.0),
        "d" => rotate(Axis::X, -6.0),
        "w" => rotate(Axis::Y, 6.0),
        "s" => rotate(Axis::Y, -6.0),
        "q" => rotate(Axis::Z, 10.0),
        "e" => rotate(Axis::Z, -10.0),
        "z" => translate(Axis::Z, 2.0),
        "x" => translate(Axis::Z, -2.0),
        "o" => translate(Axis::X, 2.0),
        "p" => translate(Axis::X, -2.0),
        "i" => translate(Axis::Y, 2.0),
        "u" => translate(Axis::Y, -2.0),
        "k" => Some(Action::Dolly(1.0)),
        "l" => Some(Action::Dolly(-1.0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bound_key_maps() {
        for key in "adwsqezxopiukl".chars() {
            assert!(action_for_key(&key.to_string()).is_some(), "{key} unbound");
        }
    }

    #[test]
    fn mapping_is_case_insensitive() {
        assert_eq!(action_for_key("A"), action_for_key("a"));
        assert_eq!(action_for_key("L"), Some(Action::Dolly(-1.0)));
    }

    #[test]
    fn unknown_keys_map_to_nothing() {
        for key in ["b", "1", " ", "Enter", "", "ArrowUp"] {
            assert_eq!(action_for_key(key), None);
        }
    }

    #[test]
    fn roll_uses_larger_step() {
        assert_eq!(
            action_for_key("q"),
            Some(Action::Rotate {
                axis: Axis::Z,
                degrees: 10.0
            })
        );
    }

    #[test]
    fn default_speeds_keep_increments() {
        for key in "adwsqezxopiukl".chars() {
            let action = action_for_key(&key.to_string()).unwrap();
            assert_eq!(action.scaled(Speeds::default()), action);
        }
    }

    #[test]
    fn speeds_scale_house_steps_only() {
        let fast = Speeds {
            rotation: 6.0,
            movement: 4.0,
        };
        assert_eq!(
            action_for_key("a").unwrap().scaled(fast),
            Action::Rotate {
                axis: Axis::X,
                degrees: 12.0
            }
        );
        assert_eq!(
            action_for_key("o").unwrap().scaled(fast),
            Action::Translate {
                axis: Axis::X,
                units: 4.0
            }
        );
        assert_eq!(action_for_key("k").unwrap().scaled(fast), Action::Dolly(1.0));
    }
}
