use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::curve::CurveKnot;
use crate::core::ordered_path::OrderedPath;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FittingSettings {
    // 1 = short, angular handles; 0 = long, round handles.
    pub handle_tightness: f32,
}

impl Default for FittingSettings {
    fn default() -> Self {
        FittingSettings { handle_tightness: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    pub knots: Vec<CurveKnot>,
    // Knots whose neighbours coincide, left without handles.
    pub degenerate: Vec<usize>,
}

/// Derives mirrored tangent handles for every knot that has two neighbours.
/// Knot positions are the path points, untouched.
pub fn fit_curve(path: &OrderedPath, handle_tightness: f32) -> FittedCurve {
    let points = path.points();
    let n = points.len();
    let closed = path.is_closed();
    let scale = handle_scale(handle_tightness);

    let mut knots: Vec<CurveKnot> = points.iter().map(|p| CurveKnot::new(*p)).collect();
    let mut degenerate = Vec::new();

    for i in 0..n {
        let (prev, next) = if closed {
            ((i + n - 1) % n, (i + 1) % n)
        } else if i == 0 || i == n - 1 {
            // Open endpoints keep the curve's default continuation.
            continue;
        } else {
            (i - 1, i + 1)
        };

        let here = points[i];
        let direction = (points[next] - points[prev]).normalize_or_zero();
        if direction == Vec3::ZERO {
            degenerate.push(i);
            continue;
        }

        let reach = here.distance(points[prev]).min(here.distance(points[next]));
        let handle = direction * reach * 0.5 * scale;
        knots[i].tangent_out = handle;
        knots[i].tangent_in = -handle;
    }

    FittedCurve { knots, degenerate }
}

fn handle_scale(handle_tightness: f32) -> f32 {
    let looseness = 1.0 - handle_tightness.clamp(0.0, 1.0);
    0.25 + (0.75 - 0.25) * looseness
}
