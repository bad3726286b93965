pub mod building;
pub mod core;
pub mod event_system;
pub mod management;
pub mod traversal;

pub mod prelude {
    pub use crate::building::bezier_track::BezierTrack;
    pub use crate::building::diagnostics::{BuildDiagnostics, BuildWarning};
    pub use crate::building::ground_projection::{GroundProjector, ProjectionSettings};
    pub use crate::building::waypoint_orderer::{order_waypoints, FallbackAxis, OrderingSettings};
    pub use crate::core::components::{FollowsTrack, TrackCurve, TrackSettings, WaypointMarker};
    pub use crate::core::curve::{CurveAdapter, CurveKnot, EditableCurve};
    pub use crate::core::ordered_path::{OrderedPath, Point};
    pub use crate::core::path_error::PathError;
    pub use crate::core::track_plugin::TrackPlugin;
    pub use crate::event_system::track_events::*;
    pub use crate::management::track_builder::{build_track, TrackBuild};
    pub use crate::management::track_config::{load_track_config, GuardViolationPolicy, TrackConfig};
    pub use crate::traversal::lane_input::{LaneInputGate, LateralIntentSource};
    pub use crate::traversal::lane_offset::{LaneOffsetController, LaneSettings};
    pub use crate::traversal::path_follower::{FollowerPhase, FollowerSettings, PathFollower};
}
