use bevy::input::gamepad::Gamepad;
use bevy::input::keyboard::KeyCode;
use bevy::input::ButtonInput;
use bevy::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::core::path_error::PathError;

/// Anything that can report a lateral steering intent in `[-1, 1]`.
pub trait LateralIntentSource {
    fn lateral_intent(&self) -> f32;
}

impl LateralIntentSource for f32 {
    fn lateral_intent(&self) -> f32 {
        self.clamp(-1.0, 1.0)
    }
}

/// Arrow keys / A-D plus the left stick of every connected pad, summed and clamped.
pub struct DeviceIntent<'a> {
    pub keys: Option<&'a ButtonInput<KeyCode>>,
    pub gamepads: &'a [&'a Gamepad],
}

impl LateralIntentSource for DeviceIntent<'_> {
    fn lateral_intent(&self) -> f32 {
        let mut intent = 0.0;
        if let Some(keys) = self.keys {
            if keys.any_pressed([KeyCode::ArrowLeft, KeyCode::KeyA]) {
                intent -= 1.0;
            }
            if keys.any_pressed([KeyCode::ArrowRight, KeyCode::KeyD]) {
                intent += 1.0;
            }
        }
        for gamepad in self.gamepads {
            intent += gamepad.left_stick().x;
        }
        intent.clamp(-1.0, 1.0)
    }
}

/// Turns a continuous intent into discrete lane steps. A step fires when
/// |intent| crosses `press_threshold`; the gate re-arms only once |intent|
/// falls back under `release_threshold`.
#[derive(Component, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LaneInputGate {
    pub press_threshold: f32,
    pub release_threshold: f32,
    #[serde(skip)]
    armed: bool,
}

impl Default for LaneInputGate {
    fn default() -> Self {
        LaneInputGate { press_threshold: 0.5, release_threshold: 0.2, armed: true }
    }
}

impl LaneInputGate {
    pub fn new(press_threshold: f32, release_threshold: f32) -> Result<Self, PathError> {
        let gate = LaneInputGate { press_threshold, release_threshold, armed: true };
        gate.validate()?;
        Ok(gate)
    }

    /// `0 <= release < press <= 1`, so neutral input never fires and the band has width.
    pub fn validate(&self) -> Result<(), PathError> {
        let (press, release) = (self.press_threshold, self.release_threshold);
        if !(press > 0.0 && press <= 1.0) {
            return Err(PathError::InvalidInput(format!("press_threshold must be in (0, 1], got {}", press)));
        }
        if !(release >= 0.0 && release < press) {
            return Err(PathError::InvalidInput(format!(
                "release_threshold must be in [0, {}), got {}",
                press, release
            )));
        }
        Ok(())
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns -1, 0 or +1.
    pub fn register(&mut self, intent: f32) -> i8 {
        if !intent.is_finite() {
            return 0;
        }
        let magnitude = intent.abs();
        if self.armed {
            // Neutral never fires, even if the thresholds were edited after validation.
            if magnitude > 0.0 && magnitude >= self.press_threshold {
                self.armed = false;
                return if intent > 0.0 { 1 } else { -1 };
            }
        } else if magnitude < self.release_threshold {
            self.armed = true;
        }
        0
    }

    pub fn poll(&mut self, source: &impl LateralIntentSource) -> i8 {
        self.register(source.lateral_intent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_the_stick_steps_once() {
        let mut gate = LaneInputGate::default();
        let steps: Vec<i8> = [0.0, 0.6, 0.9, 1.0, 0.7].iter().map(|i| gate.register(*i)).collect();
        assert_eq!(steps, vec![0, 1, 0, 0, 0]);
    }

    #[test]
    fn dead_band_does_not_rearm() {
        let mut gate = LaneInputGate::default();
        assert_eq!(gate.register(-0.8), -1);
        // Between release and press: still latched.
        assert_eq!(gate.register(0.3), 0);
        assert_eq!(gate.register(-0.6), 0);
        assert!(!gate.is_armed());

        assert_eq!(gate.register(0.1), 0);
        assert!(gate.is_armed());
        assert_eq!(gate.register(-0.55), -1);
    }

    #[test]
    fn keyboard_intent_reads_both_directions() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyD);
        let intent = DeviceIntent { keys: Some(&keys), gamepads: &[] };
        assert_eq!(intent.lateral_intent(), 1.0);

        keys.press(KeyCode::ArrowLeft);
        let intent = DeviceIntent { keys: Some(&keys), gamepads: &[] };
        assert_eq!(intent.lateral_intent(), 0.0);

        let mut gate = LaneInputGate::default();
        assert_eq!(gate.poll(&-0.7_f32), -1);
    }

    #[test]
    fn thresholds_without_a_band_are_rejected() {
        assert!(matches!(LaneInputGate::new(0.0, 0.0), Err(PathError::InvalidInput(_))));
        assert!(matches!(LaneInputGate::new(-0.5, 0.0), Err(PathError::InvalidInput(_))));
        assert!(matches!(LaneInputGate::new(1.5, 0.2), Err(PathError::InvalidInput(_))));
        assert!(matches!(LaneInputGate::new(0.3, 0.9), Err(PathError::InvalidInput(_))));
        assert!(matches!(LaneInputGate::new(0.5, 0.5), Err(PathError::InvalidInput(_))));
        assert!(matches!(LaneInputGate::new(f32::NAN, 0.1), Err(PathError::InvalidInput(_))));
    }

    #[test]
    fn noise_around_the_press_threshold_fires_once() {
        let mut gate = LaneInputGate::new(0.3, 0.1).unwrap();
        let steps: Vec<i8> = [0.0, 0.35, 0.28, 0.35, 0.28, 0.35].iter().map(|i| gate.register(*i)).collect();
        assert_eq!(steps, vec![0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn unvalidated_zero_threshold_ignores_neutral() {
        let mut gate: LaneInputGate = ron::de::from_str("(press_threshold: 0.0, release_threshold: 0.0)").unwrap();
        assert!(gate.validate().is_err());
        assert_eq!(gate.register(0.0), 0);
        assert_eq!(gate.register(0.0), 0);
        assert!(gate.is_armed());
    }
}
