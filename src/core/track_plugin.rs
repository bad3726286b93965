use bevy::app::{App, Plugin};

use crate::core::components::WaypointMarker;
use crate::event_system::event_system_plugin::TrackEventPlugin;

/// Waypoints are read from `GlobalTransform`, so the app needs `TransformPlugin`
/// (part of `DefaultPlugins`).
pub struct TrackPlugin;

impl Plugin for TrackPlugin {
    fn build(&self, app: &mut App) {
        app
            .add_plugins(TrackEventPlugin)
            .register_type::<WaypointMarker>();
    }
}
