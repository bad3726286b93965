use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::curve::CurveKnot;

/// Downward ray query against whatever surface the host provides.
pub trait GroundProjector {
    fn cast_down(&self, origin: Vec3, max_distance: f32, mask: u32) -> Option<Vec3>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProjectionSettings {
    pub enabled: bool,
    // Rays start this far above each knot.
    pub cast_height: f32,
    pub max_distance: f32,
    pub mask: u32,
    // Added along `up` after a hit so the track floats just above the surface.
    pub surface_offset: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        ProjectionSettings {
            enabled: false,
            cast_height: 10.0,
            max_distance: 50.0,
            mask: u32::MAX,
            surface_offset: 0.0,
        }
    }
}

/// Moves each knot onto the surface below it. Returns the indices that missed,
/// which keep their fitted position.
pub fn project_knots(
    knots: &mut [CurveKnot],
    projector: &dyn GroundProjector,
    settings: &ProjectionSettings,
    up: Vec3,
) -> Vec<usize> {
    let up = up.try_normalize().unwrap_or(Vec3::Y);
    let mut misses = Vec::new();
    for (index, knot) in knots.iter_mut().enumerate() {
        let origin = knot.position + up * settings.cast_height;
        match projector.cast_down(origin, settings.max_distance, settings.mask) {
            Some(hit) => knot.position = hit + up * settings.surface_offset,
            None => misses.push(index),
        }
    }
    misses
}

#[cfg(feature = "ground_projection")]
mod rapier {
    use bevy::math::Vec3;
    use bevy_rapier3d::prelude::{CollisionGroups, Group, QueryFilter, RapierContext};

    use super::GroundProjector;

    /// Ground projection backed by the rapier query pipeline.
    pub struct RapierGroundProjector<'a> {
        pub context: &'a RapierContext,
    }

    impl GroundProjector for RapierGroundProjector<'_> {
        fn cast_down(&self, origin: Vec3, max_distance: f32, mask: u32) -> Option<Vec3> {
            let groups = CollisionGroups::new(Group::ALL, Group::from_bits_truncate(mask));
            let filter = QueryFilter::new().groups(groups);
            self.context
                .cast_ray(origin, Vec3::NEG_Y, max_distance, true, filter)
                .map(|(_, toi)| origin + Vec3::NEG_Y * toi)
        }
    }
}

#[cfg(feature = "ground_projection")]
pub use rapier::RapierGroundProjector;
