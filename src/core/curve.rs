use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::ordered_path::Point;

/// Curve control point. Handles are offsets from `position`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveKnot {
    pub position: Point,
    pub tangent_in: Vec3,
    pub tangent_out: Vec3,
}

impl CurveKnot {
    pub fn new(position: Point) -> Self {
        CurveKnot { position, tangent_in: Vec3::ZERO, tangent_out: Vec3::ZERO }
    }

    pub fn has_handles(&self) -> bool {
        self.tangent_in != Vec3::ZERO || self.tangent_out != Vec3::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub position: Point,
    // Unit length, or zero where the curve is degenerate.
    pub tangent: Vec3,
    pub up: Vec3,
}

/// Read side of a parametric curve: position and direction for a normalized
/// parameter in `[0, 1]`, plus the curve's own length estimate.
pub trait CurveAdapter {
    fn evaluate(&self, parameter: f32) -> CurveSample;

    fn length(&self) -> f32;
}

/// Curves whose knot sequence can be replaced after a rebuild.
pub trait EditableCurve: CurveAdapter {
    fn set_knots(&mut self, knots: Vec<CurveKnot>, closed: bool);

    fn clear(&mut self);

    fn knots(&self) -> &[CurveKnot];

    fn is_closed(&self) -> bool;
}
