use bevy::log::{debug, info};
use bevy::math::{Quat, Vec3};
use bevy::prelude::{Component, Transform};
use serde::{Deserialize, Serialize};

use crate::core::curve::CurveAdapter;
use crate::core::path_error::PathError;
use crate::traversal::arc_length_table::ArcLengthTable;

// Squared tangent length below which the curve direction is unusable.
const TANGENT_EPSILON: f32 = 1e-10;
// Tracks shorter than this are treated as not built.
const MIN_TRACK_LENGTH: f32 = 1e-5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FollowerSettings {
    // World units per second.
    pub speed: f32,
    pub looping: bool,
    pub stop_at_end: bool,
    pub height_offset: f32,
    pub sample_count: usize,
    pub up: Vec3,
    pub default_right: Vec3,
}

impl Default for FollowerSettings {
    fn default() -> Self {
        FollowerSettings {
            speed: 10.0,
            looping: true,
            stop_at_end: true,
            height_offset: 0.0,
            sample_count: 512,
            up: Vec3::Y,
            default_right: Vec3::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowerPhase {
    #[default]
    Advancing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TraversalState {
    pub distance_along_path: f32,
    pub phase: FollowerPhase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerPose {
    pub position: Vec3,
    pub rotation: Quat,
    // Zero when the curve direction was degenerate at this point.
    pub tangent: Vec3,
    pub right: Vec3,
    pub parameter: f32,
    pub distance: f32,
}

impl FollowerPose {
    /// Keeps `scale`, replaces translation and rotation.
    pub fn to_transform(&self, scale: Vec3) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation).with_scale(scale)
    }
}

/// Receives the one-time notification raised when a non-looping traversal ends.
pub trait FinishListener {
    fn on_finished(&mut self);
}

impl<F: FnMut()> FinishListener for F {
    fn on_finished(&mut self) {
        self()
    }
}

/// Moves along a curve at constant speed using an arc length table.
#[derive(Component, Debug, Clone)]
pub struct PathFollower {
    pub settings: FollowerSettings,
    state: TraversalState,
    table: Option<ArcLengthTable>,
    finish_notified: bool,
    last_rotation: Quat,
}

impl Default for PathFollower {
    fn default() -> Self {
        PathFollower::new(FollowerSettings::default())
    }
}

impl PathFollower {
    pub fn new(settings: FollowerSettings) -> Self {
        PathFollower {
            settings,
            state: TraversalState::default(),
            table: None,
            finish_notified: false,
            last_rotation: Quat::IDENTITY,
        }
    }

    pub fn state(&self) -> TraversalState {
        self.state
    }

    pub fn phase(&self) -> FollowerPhase {
        self.state.phase
    }

    pub fn distance(&self) -> f32 {
        self.state.distance_along_path
    }

    pub fn total_length(&self) -> f32 {
        self.table.as_ref().map_or(0.0, ArcLengthTable::total_length)
    }

    pub fn is_ready(&self) -> bool {
        self.total_length() > MIN_TRACK_LENGTH
    }

    /// Regenerates the arc length table. On failure the previous table stays.
    pub fn rebuild(&mut self, curve: &(impl CurveAdapter + ?Sized)) -> Result<(), PathError> {
        let table = ArcLengthTable::build(curve, self.settings.sample_count)?;
        let total = table.total_length();
        self.table = Some(table);

        self.state.distance_along_path = if self.settings.looping && total > MIN_TRACK_LENGTH {
            wrap_distance(self.state.distance_along_path, total)
        } else {
            self.state.distance_along_path.clamp(0.0, total)
        };
        debug!("[PathFollower] table rebuilt, length {:.3}", total);
        Ok(())
    }

    pub fn clear_table(&mut self) {
        self.table = None;
    }

    pub fn reset_to_start(&mut self) {
        self.state = TraversalState::default();
        self.finish_notified = false;
    }

    pub fn teleport_to_fraction(
        &mut self,
        fraction: f32,
        curve: &(impl CurveAdapter + ?Sized),
        lateral_offset: f32,
    ) -> Option<FollowerPose> {
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        self.state.distance_along_path = fraction * self.total_length();
        self.pose(curve, lateral_offset)
    }

    /// Advances by `speed * dt` and returns the new pose. No-op without a usable table.
    pub fn tick(
        &mut self,
        dt: f32,
        curve: &(impl CurveAdapter + ?Sized),
        lateral_offset: f32,
        listener: &mut impl FinishListener,
    ) -> Option<FollowerPose> {
        if !self.is_ready() {
            return None;
        }
        let total = self.total_length();
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let halted = self.state.phase == FollowerPhase::Finished && self.settings.stop_at_end;
        if !halted {
            self.state.distance_along_path += self.settings.speed * dt;
        }

        if self.settings.looping {
            self.state.distance_along_path = wrap_distance(self.state.distance_along_path, total);
        } else if self.state.distance_along_path >= total {
            self.state.distance_along_path = total;
            self.state.phase = FollowerPhase::Finished;
            if !self.finish_notified {
                self.finish_notified = true;
                info!("[PathFollower] reached the end of the track ({:.3})", total);
                listener.on_finished();
            }
        } else if self.state.distance_along_path < 0.0 {
            self.state.distance_along_path = 0.0;
        }

        self.pose(curve, lateral_offset)
    }

    /// World pose at the current distance, offset sideways and upward.
    pub fn pose(&mut self, curve: &(impl CurveAdapter + ?Sized), lateral_offset: f32) -> Option<FollowerPose> {
        let table = self.table.as_ref()?;
        let distance = self.state.distance_along_path;
        let parameter = table.distance_to_parameter(distance);
        let sample = curve.evaluate(parameter);

        let up = self.settings.up.try_normalize().unwrap_or(Vec3::Y);
        let default_right = self.settings.default_right.try_normalize().unwrap_or(Vec3::X);

        let (tangent, right, rotation) = if sample.tangent.length_squared() > TANGENT_EPSILON {
            let tangent = sample.tangent.normalize();
            let right = up.cross(tangent).try_normalize().unwrap_or(default_right);
            let rotation = Transform::IDENTITY.looking_to(tangent, up).rotation;
            self.last_rotation = rotation;
            (tangent, right, rotation)
        } else {
            (Vec3::ZERO, default_right, self.last_rotation)
        };

        Some(FollowerPose {
            position: sample.position + right * lateral_offset + up * self.settings.height_offset,
            rotation,
            tangent,
            right,
            parameter,
            distance,
        })
    }
}

// Floored modulo into [0, total).
fn wrap_distance(distance: f32, total: f32) -> f32 {
    let wrapped = distance.rem_euclid(total);
    if wrapped >= total { 0.0 } else { wrapped }
}
