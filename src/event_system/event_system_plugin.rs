use bevy::prelude::*;
use bevy::transform::TransformSystem;
use crate::event_system::track_events::*;
use crate::event_system::event_listeners::*;

pub struct TrackEventPlugin;

impl Plugin for TrackEventPlugin {
    fn build(&self, app: &mut App) {
        // Registering all events
        app.add_event::<RebuildTrackEvent>()
            .add_event::<TrackBuiltEvent>()
            .add_event::<TrackBuildFailedEvent>()
            .add_event::<PathFinishedEvent>()
            .add_event::<LaneChangeEvent>()
            .add_event::<FollowerCommandEvent>();

        // Markers are read in world space, so builds wait for propagation.
        // Followers pick a new generation up on the next frame.
        app.add_systems(PostUpdate, (
            request_track_rebuilds,
            rebuild_track_listener,
        ).chain().after(TransformSystem::TransformPropagate));

        // Lanes first, then move followers with this frame's offset
        app.add_systems(Update, (
            lane_input_system,
            lane_change_listener,
            tick_lane_offsets,
            follower_command_listener,
            tick_path_followers,
        ).chain());

        #[cfg(feature = "debug")]
        {
            app.add_systems(Update, draw_track_gizmos.after(tick_path_followers));
        }
    }
}
