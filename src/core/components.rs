use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::building::bezier_track::BezierTrack;
use crate::building::curve_fitter::FittingSettings;
use crate::building::diagnostics::BuildDiagnostics;
use crate::building::ground_projection::ProjectionSettings;
use crate::building::waypoint_orderer::OrderingSettings;
use crate::core::ordered_path::OrderedPath;
use crate::management::track_config::GuardViolationPolicy;
use crate::traversal::path_follower::PathFollower;

// Build configuration for a track entity. Changing it triggers a rebuild.
#[derive(Component, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[require(TrackCurve)]
#[serde(default)]
pub struct TrackSettings {
    pub ordering: OrderingSettings,
    pub fitting: FittingSettings,
    pub projection: ProjectionSettings,
    pub guard_policy: GuardViolationPolicy,
    pub up: Vec3,
}

impl Default for TrackSettings {
    fn default() -> Self {
        TrackSettings {
            ordering: OrderingSettings::default(),
            fitting: FittingSettings::default(),
            projection: ProjectionSettings::default(),
            guard_policy: GuardViolationPolicy::default(),
            up: Vec3::Y,
        }
    }
}

// The last successful build of a track. `generation` bumps on every replacement
// so followers know to resample.
#[derive(Component, Debug, Clone, Default)]
pub struct TrackCurve {
    pub curve: BezierTrack,
    pub path: Option<OrderedPath>,
    pub diagnostics: BuildDiagnostics,
    pub generation: u32,
}

// Marks an entity whose world-space translation is one waypoint of `track`.
// Markers may be children of the track or of anything else.
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct WaypointMarker {
    pub track: Entity,
}

// Binds a follower entity to the track it drives along.
#[derive(Component, Clone, Copy, Debug)]
#[require(PathFollower, Transform)]
pub struct FollowsTrack {
    pub track: Entity,
    pub synced_generation: Option<u32>,
}

impl FollowsTrack {
    pub fn new(track: Entity) -> Self {
        FollowsTrack { track, synced_generation: None }
    }
}
