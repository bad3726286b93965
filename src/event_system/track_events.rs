use bevy::prelude::*;

use crate::building::diagnostics::BuildWarning;
use crate::core::path_error::PathError;

#[derive(Debug, Clone, Event)]
pub struct RebuildTrackEvent {
    pub track: Entity,
}

#[derive(Debug, Clone, Event)]
pub struct TrackBuiltEvent {
    pub track: Entity,
    pub generation: u32,
    pub warnings: Vec<BuildWarning>,
}

#[derive(Debug, Clone, Event)]
pub struct TrackBuildFailedEvent {
    pub track: Entity,
    pub error: PathError,
}

// Raised once when a non-looping follower reaches the end of its track.
#[derive(Debug, Clone, Copy, Event)]
pub struct PathFinishedEvent {
    pub follower: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneRequest {
    Step(i8),
    Lane(usize),
    Snap(usize),
}

#[derive(Debug, Clone, Copy, Event)]
pub struct LaneChangeEvent {
    pub follower: Entity,
    pub request: LaneRequest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowerCommand {
    ResetToStart,
    TeleportToFraction(f32),
    Rebuild,
}

#[derive(Debug, Clone, Copy, Event)]
pub struct FollowerCommandEvent {
    pub follower: Entity,
    pub command: FollowerCommand,
}
