use bevy::input::gamepad::Gamepad;
use bevy::prelude::*;
#[cfg(feature = "ground_projection")]
use bevy_rapier3d::prelude::{DefaultRapierContext, RapierContext};

use crate::building::ground_projection::GroundProjector;
#[cfg(feature = "ground_projection")]
use crate::building::ground_projection::RapierGroundProjector;
use crate::core::components::{FollowsTrack, TrackCurve, TrackSettings, WaypointMarker};
use crate::event_system::track_events::*;
use crate::management::track_builder::build_track;
use crate::traversal::lane_input::{DeviceIntent, LaneInputGate};
use crate::traversal::lane_offset::LaneOffsetController;
use crate::traversal::path_follower::PathFollower;

// Queues a rebuild for every track whose settings changed or whose markers moved.
// Runs after transform propagation, so a moved parent counts as a moved marker.
pub fn request_track_rebuilds(
    changed_tracks: Query<Entity, Changed<TrackSettings>>,
    all_tracks: Query<Entity, With<TrackSettings>>,
    moved_markers: Query<&WaypointMarker, Changed<GlobalTransform>>,
    mut removed_markers: RemovedComponents<WaypointMarker>,
    mut writer: EventWriter<RebuildTrackEvent>,
) {
    let mut pending: Vec<Entity> = changed_tracks.iter().collect();
    pending.extend(moved_markers.iter().map(|marker| marker.track));

    // Removed markers no longer say which track they belonged to.
    if removed_markers.read().count() > 0 {
        pending.extend(all_tracks.iter());
    }

    pending.sort();
    pending.dedup();
    for track in pending {
        if all_tracks.contains(track) {
            writer.send(RebuildTrackEvent { track });
        }
    }
}

pub fn rebuild_track_listener(
    mut reader: EventReader<RebuildTrackEvent>,
    mut tracks: Query<(&TrackSettings, &mut TrackCurve)>,
    markers: Query<(&WaypointMarker, &GlobalTransform)>,
    #[cfg(feature = "ground_projection")] rapier_contexts: Query<&RapierContext, With<DefaultRapierContext>>,
    mut built: EventWriter<TrackBuiltEvent>,
    mut failed: EventWriter<TrackBuildFailedEvent>,
) {
    let mut requested: Vec<Entity> = reader.read().map(|event| event.track).collect();
    requested.sort();
    requested.dedup();

    #[cfg(feature = "ground_projection")]
    let rapier = rapier_contexts.get_single().ok().map(|context| RapierGroundProjector { context });
    #[cfg(feature = "ground_projection")]
    let projector: Option<&dyn GroundProjector> = rapier.as_ref().map(|p| p as &dyn GroundProjector);
    #[cfg(not(feature = "ground_projection"))]
    let projector: Option<&dyn GroundProjector> = None;

    for track in requested {
        let Ok((settings, mut track_curve)) = tracks.get_mut(track) else {
            continue;
        };
        let points: Vec<Vec3> = markers
            .iter()
            .filter(|(marker, _)| marker.track == track)
            .map(|(_, transform)| transform.translation())
            .collect();

        match build_track(&points, settings, projector) {
            Ok(build) => {
                build.diagnostics.log(&format!("track {}", track));
                let warnings = build.diagnostics.warnings.clone();
                let (curve, path, diagnostics) = build.into_curve(settings.up);

                track_curve.curve = curve;
                track_curve.path = Some(path);
                track_curve.diagnostics = diagnostics;
                track_curve.generation = track_curve.generation.wrapping_add(1);

                info!(
                    "[TrackBuild] track {} is now generation {} ({} warning(s))",
                    track,
                    track_curve.generation,
                    track_curve.diagnostics.count()
                );
                built.send(TrackBuiltEvent { track, generation: track_curve.generation, warnings });
            }
            Err(error) => {
                warn!(
                    "[TrackBuild] track {} rebuild failed, keeping generation {}: {}",
                    track, track_curve.generation, error
                );
                failed.send(TrackBuildFailedEvent { track, error });
            }
        }
    }
}

pub fn lane_input_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    gamepads: Query<&Gamepad>,
    mut gates: Query<(Entity, &mut LaneInputGate)>,
    mut writer: EventWriter<LaneChangeEvent>,
) {
    let pads: Vec<&Gamepad> = gamepads.iter().collect();
    let source = DeviceIntent { keys: keys.as_deref(), gamepads: &pads };

    for (follower, mut gate) in &mut gates {
        let step = gate.poll(&source);
        if step != 0 {
            writer.send(LaneChangeEvent { follower, request: LaneRequest::Step(step) });
        }
    }
}

pub fn lane_change_listener(
    mut reader: EventReader<LaneChangeEvent>,
    mut lanes: Query<&mut LaneOffsetController>,
) {
    for event in reader.read() {
        let Ok(mut controller) = lanes.get_mut(event.follower) else {
            continue;
        };
        match event.request {
            LaneRequest::Step(step) => controller.request_step(step),
            LaneRequest::Lane(index) => controller.request_lane(index),
            LaneRequest::Snap(index) => controller.snap_to_lane(index),
        }
    }
}

pub fn tick_lane_offsets(time: Res<Time>, mut lanes: Query<&mut LaneOffsetController>) {
    let dt = time.delta_secs();
    for mut controller in &mut lanes {
        if controller.is_transitioning() {
            controller.tick(dt);
        }
    }
}

pub fn follower_command_listener(
    mut reader: EventReader<FollowerCommandEvent>,
    mut followers: Query<(&mut PathFollower, &mut FollowsTrack, Option<&LaneOffsetController>, &mut Transform)>,
    tracks: Query<&TrackCurve>,
) {
    for event in reader.read() {
        let Ok((mut follower, mut link, lanes, mut transform)) = followers.get_mut(event.follower) else {
            continue;
        };
        let Ok(track) = tracks.get(link.track) else {
            warn!("[PathFollower] {} follows {}, which is not a track", event.follower, link.track);
            continue;
        };
        let lateral = lanes.map_or(0.0, |l| l.current_offset());

        let pose = match event.command {
            FollowerCommand::ResetToStart => {
                follower.reset_to_start();
                follower.pose(&track.curve, lateral)
            }
            FollowerCommand::TeleportToFraction(fraction) => {
                follower.teleport_to_fraction(fraction, &track.curve, lateral)
            }
            FollowerCommand::Rebuild => {
                if let Err(error) = follower.rebuild(&track.curve) {
                    warn!("[PathFollower] {} could not resample its track: {}", event.follower, error);
                }
                link.synced_generation = Some(track.generation);
                follower.pose(&track.curve, lateral)
            }
        };

        if let Some(pose) = pose {
            *transform = pose.to_transform(transform.scale);
        }
    }
}

pub fn tick_path_followers(
    time: Res<Time>,
    mut followers: Query<(Entity, &mut PathFollower, &mut FollowsTrack, Option<&LaneOffsetController>, &mut Transform)>,
    tracks: Query<&TrackCurve>,
    mut finished: EventWriter<PathFinishedEvent>,
) {
    let dt = time.delta_secs();
    for (entity, mut follower, mut link, lanes, mut transform) in &mut followers {
        let Ok(track) = tracks.get(link.track) else {
            continue;
        };

        if link.synced_generation != Some(track.generation) {
            if track.curve.is_empty() {
                follower.clear_table();
            } else if let Err(error) = follower.rebuild(&track.curve) {
                warn!("[PathFollower] {} could not resample track {}: {}", entity, link.track, error);
            }
            link.synced_generation = Some(track.generation);
        }

        let lateral = lanes.map_or(0.0, |l| l.current_offset());
        let mut notify = || {
            finished.send(PathFinishedEvent { follower: entity });
        };
        if let Some(pose) = follower.tick(dt, &track.curve, lateral, &mut notify) {
            *transform = pose.to_transform(transform.scale);
        }
    }
}

#[cfg(feature = "debug")]
pub fn draw_track_gizmos(mut gizmos: Gizmos, tracks: Query<&TrackCurve>) {
    use crate::building::diagnostics::BuildWarning;
    use crate::core::curve::EditableCurve;

    for track in &tracks {
        gizmos.linestrip(track.curve.sample_positions(16), Color::srgb(1.0, 0.8, 0.1));
        for knot in track.curve.knots() {
            if knot.has_handles() {
                gizmos.line(knot.position + knot.tangent_in, knot.position + knot.tangent_out, Color::srgb(0.2, 0.6, 1.0));
            }
        }
        for warning in &track.diagnostics.warnings {
            if let BuildWarning::GuardViolation { from, to, .. } = warning {
                gizmos.line(*from, *to, Color::srgb(1.0, 0.1, 0.1));
            }
        }
    }
}
