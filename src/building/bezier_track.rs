use bevy::log::warn;
use bevy::math::Vec3;
use bevy_math::cubic_splines::{CubicBezier, CubicCurve, CubicGenerator};
use itertools::Itertools;

use crate::core::curve::{CurveAdapter, CurveKnot, CurveSample, EditableCurve};

const LENGTH_SUBDIVISIONS_PER_SEGMENT: usize = 32;

/// Piecewise cubic Bezier through a knot sequence, one segment per edge.
#[derive(Debug, Clone)]
pub struct BezierTrack {
    knots: Vec<CurveKnot>,
    closed: bool,
    up: Vec3,
    curve: Option<CubicCurve<Vec3>>,
    segment_count: usize,
    length: f32,
}

impl Default for BezierTrack {
    fn default() -> Self {
        BezierTrack::with_up(Vec3::Y)
    }
}

impl BezierTrack {
    pub fn with_up(up: Vec3) -> Self {
        BezierTrack {
            knots: Vec::new(),
            closed: false,
            up: up.try_normalize().unwrap_or(Vec3::Y),
            curve: None,
            segment_count: 0,
            length: 0.0,
        }
    }

    pub fn from_knots(knots: Vec<CurveKnot>, closed: bool) -> Self {
        let mut track = BezierTrack::default();
        track.set_knots(knots, closed);
        track
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn is_empty(&self) -> bool {
        self.curve.is_none()
    }

    // Polyline through the curve, for debug drawing.
    pub fn sample_positions(&self, per_segment: usize) -> Vec<Vec3> {
        match &self.curve {
            Some(curve) => curve.iter_positions(self.segment_count * per_segment.max(1)).collect(),
            None => Vec::new(),
        }
    }

    fn rebuild_curve(&mut self) {
        self.curve = None;
        self.segment_count = 0;
        self.length = 0.0;

        if self.knots.len() < 2 {
            return;
        }

        let segments: Vec<[Vec3; 4]> = if self.closed {
            self.knots.iter().circular_tuple_windows().map(|(a, b)| segment_controls(a, b)).collect()
        } else {
            self.knots.iter().tuple_windows().map(|(a, b)| segment_controls(a, b)).collect()
        };
        let segment_count = segments.len();

        match CubicBezier::new(segments).to_curve() {
            Ok(curve) => {
                self.length = curve
                    .iter_positions(segment_count * LENGTH_SUBDIVISIONS_PER_SEGMENT)
                    .tuple_windows()
                    .map(|(a, b)| a.distance(b))
                    .sum();
                self.curve = Some(curve);
                self.segment_count = segment_count;
            }
            Err(error) => {
                warn!("[TrackBuild] could not build bezier curve: {}", error);
            }
        }
    }
}

// A zero handle falls back to a flat continuation a third of the way to the neighbour.
fn segment_controls(a: &CurveKnot, b: &CurveKnot) -> [Vec3; 4] {
    let ctrl1 = if a.tangent_out == Vec3::ZERO {
        a.position + (b.position - a.position) / 3.0
    } else {
        a.position + a.tangent_out
    };
    let ctrl2 = if b.tangent_in == Vec3::ZERO {
        b.position + (a.position - b.position) / 3.0
    } else {
        b.position + b.tangent_in
    };
    [a.position, ctrl1, ctrl2, b.position]
}

impl CurveAdapter for BezierTrack {
    fn evaluate(&self, parameter: f32) -> CurveSample {
        let Some(curve) = &self.curve else {
            return CurveSample { position: Vec3::ZERO, tangent: Vec3::ZERO, up: self.up };
        };
        let t = parameter.clamp(0.0, 1.0) * self.segment_count as f32;
        CurveSample {
            position: curve.position(t),
            tangent: curve.velocity(t).normalize_or_zero(),
            up: self.up,
        }
    }

    fn length(&self) -> f32 {
        self.length
    }
}

impl EditableCurve for BezierTrack {
    fn set_knots(&mut self, knots: Vec<CurveKnot>, closed: bool) {
        self.knots = knots;
        self.closed = closed;
        self.rebuild_curve();
    }

    fn clear(&mut self) {
        self.knots.clear();
        self.closed = false;
        self.rebuild_curve();
    }

    fn knots(&self) -> &[CurveKnot] {
        &self.knots
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
