use bevy::log::debug;
use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::building::two_opt::{refine_closed_tour, RefinementReport};
use crate::core::ordered_path::{LongEdge, OrderedPath, Point};
use crate::core::path_error::PathError;

// Distance under which a requested start position is considered one of the inputs.
const START_MATCH_DISTANCE: f32 = 1e-4;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackAxis {
    #[default]
    X,
    Y,
    Z,
}

impl FallbackAxis {
    fn component(&self, point: Point) -> f32 {
        match self {
            FallbackAxis::X => point.x,
            FallbackAxis::Y => point.y,
            FallbackAxis::Z => point.z,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OrderingSettings {
    pub closed: bool,
    pub start: Option<Point>,
    pub max_link_distance: f32,
    // 0 = pure proximity, 1 = pure forward continuation.
    pub direction_bias: f32,
    pub refinement_passes: usize,
    pub fallback_axis: FallbackAxis,
}

impl Default for OrderingSettings {
    fn default() -> Self {
        OrderingSettings {
            closed: true,
            start: None,
            max_link_distance: 50.0,
            direction_bias: 0.5,
            refinement_passes: 2,
            fallback_axis: FallbackAxis::X,
        }
    }
}

/// A link the greedy chain had to make past the distance guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcedLink {
    pub from: Point,
    pub to: Point,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct OrderingOutcome {
    pub path: OrderedPath,
    pub forced_links: Vec<ForcedLink>,
    // Edges of the final path (wrap edge included) that exceed the guard.
    pub long_edges: Vec<LongEdge>,
    pub refinement: RefinementReport,
}

impl OrderingOutcome {
    pub fn has_guard_violation(&self) -> bool {
        !self.forced_links.is_empty() || !self.long_edges.is_empty()
    }
}

/// Guarded nearest-chain ordering followed by optional 2-opt refinement.
pub fn order_waypoints(points: &[Point], settings: &OrderingSettings) -> Result<OrderingOutcome, PathError> {
    validate(points, settings)?;

    let bias = settings.direction_bias.clamp(0.0, 1.0);
    let max_link = settings.max_link_distance;

    let mut remaining: Vec<Point> = points.to_vec();
    let start_index = pick_start(&remaining, settings.start, settings.fallback_axis);
    let mut current = remaining.remove(start_index);

    let mut ordered = Vec::with_capacity(points.len());
    ordered.push(current);

    let mut forward = nearest_index(&remaining, current)
        .map(|i| (remaining[i] - current).normalize_or_zero())
        .unwrap_or(Vec3::ZERO);
    let mut forced_links = Vec::new();

    while !remaining.is_empty() {
        let next_index = match best_guarded_candidate(&remaining, current, forward, max_link, bias) {
            Some(index) => index,
            None => {
                // Nothing inside the guard: take the nearest point anyway and flag it.
                let index = nearest_index(&remaining, current).unwrap_or(0);
                let distance = current.distance(remaining[index]);
                debug!("[TrackBuild] forced link of {:.3} past guard {:.3}", distance, max_link);
                forced_links.push(ForcedLink { from: current, to: remaining[index], distance });
                index
            }
        };

        let next = remaining.swap_remove(next_index);
        let step = next - current;
        if step.length_squared() > f32::EPSILON {
            forward = step.normalize();
        }
        ordered.push(next);
        current = next;
    }

    let refinement = if settings.closed && settings.refinement_passes > 0 {
        refine_closed_tour(&mut ordered, settings.refinement_passes)
    } else {
        RefinementReport::default()
    };

    let path = OrderedPath::new(ordered, settings.closed)?;
    let long_edges = path.long_edges(max_link);

    Ok(OrderingOutcome { path, forced_links, long_edges, refinement })
}

fn validate(points: &[Point], settings: &OrderingSettings) -> Result<(), PathError> {
    if points.len() < 2 {
        return Err(PathError::InvalidInput(format!(
            "at least 2 waypoints are required, got {}",
            points.len()
        )));
    }
    if let Some(bad) = points.iter().position(|p| !p.is_finite()) {
        return Err(PathError::InvalidInput(format!("waypoint {} has a non-finite coordinate", bad)));
    }
    if !(settings.max_link_distance.is_finite() && settings.max_link_distance > 0.0) {
        return Err(PathError::InvalidInput(format!(
            "max_link_distance must be positive, got {}",
            settings.max_link_distance
        )));
    }
    Ok(())
}

fn pick_start(points: &[Point], start: Option<Point>, axis: FallbackAxis) -> usize {
    if let Some(start) = start {
        let matched = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.distance(start) <= START_MATCH_DISTANCE)
            .min_by(|(_, a), (_, b)| a.distance(start).total_cmp(&b.distance(start)))
            .map(|(i, _)| i);
        if let Some(index) = matched {
            return index;
        }
        debug!("[TrackBuild] requested start {:?} is not a waypoint, using fallback axis", start);
    }

    // min_by keeps the first of equal elements, so ties resolve to the lowest index.
    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| axis.component(**a).total_cmp(&axis.component(**b)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn nearest_index(points: &[Point], from: Point) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
        .map(|(i, _)| i)
}

fn best_guarded_candidate(
    remaining: &[Point],
    current: Point,
    forward: Vec3,
    max_link: f32,
    bias: f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, candidate) in remaining.iter().enumerate() {
        let offset = *candidate - current;
        let distance = offset.length();
        if distance > max_link {
            continue;
        }
        let proximity = 1.0 - distance / max_link;
        let direction = forward.dot(offset.normalize_or_zero());
        let score = proximity + (direction - proximity) * bias;

        // Strict comparison keeps the earliest candidate on ties.
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}
