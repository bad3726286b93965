use bevy::log::warn;
use bevy::math::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub enum BuildWarning {
    // The greedy chain had to link past the guard.
    GuardViolation { from: Vec3, to: Vec3, distance: f32, limit: f32 },
    // An edge of the finished path is still longer than the guard.
    ResidualLongEdge { from: usize, to: usize, length: f32, limit: f32 },
    InsufficientPoints { count: usize },
    DegenerateTangent { knot: usize },
    ProjectionMiss { knot: usize },
}

impl BuildWarning {
    pub fn is_guard_related(&self) -> bool {
        matches!(self, BuildWarning::GuardViolation { .. } | BuildWarning::ResidualLongEdge { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildDiagnostics {
    pub warnings: Vec<BuildWarning>,
}

impl BuildDiagnostics {
    pub fn push(&mut self, warning: BuildWarning) {
        self.warnings.push(warning);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn has_guard_violation(&self) -> bool {
        self.warnings.iter().any(BuildWarning::is_guard_related)
    }

    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    pub fn log(&self, label: &str) {
        for warning in &self.warnings {
            match warning {
                BuildWarning::GuardViolation { from, to, distance, limit } => warn!(
                    "[TrackBuild] {}: forced link {:?} -> {:?} is {:.2} long (guard {:.2})",
                    label, from, to, distance, limit
                ),
                BuildWarning::ResidualLongEdge { from, to, length, limit } => warn!(
                    "[TrackBuild] {}: edge {} -> {} is {:.2} long after refinement (guard {:.2})",
                    label, from, to, length, limit
                ),
                BuildWarning::InsufficientPoints { count } => {
                    warn!("[TrackBuild] {}: only {} waypoint(s), need at least 2", label, count)
                }
                BuildWarning::DegenerateTangent { knot } => {
                    warn!("[TrackBuild] {}: knot {} has coincident neighbours, no handles", label, knot)
                }
                BuildWarning::ProjectionMiss { knot } => {
                    warn!("[TrackBuild] {}: knot {} found no ground below it", label, knot)
                }
            }
        }
    }
}
