use bevy::log::{info, warn};
use bevy::math::Vec3;

use crate::building::bezier_track::BezierTrack;
use crate::building::curve_fitter::fit_curve;
use crate::building::diagnostics::{BuildDiagnostics, BuildWarning};
use crate::building::ground_projection::{project_knots, GroundProjector};
use crate::building::two_opt::RefinementReport;
use crate::building::waypoint_orderer::{order_waypoints, ForcedLink, OrderingOutcome};
use crate::core::components::TrackSettings;
use crate::core::curve::{CurveKnot, EditableCurve};
use crate::core::ordered_path::{LongEdge, OrderedPath, Point};
use crate::core::path_error::PathError;
use crate::management::track_config::GuardViolationPolicy;

/// Result of one successful order, fit and project pass.
#[derive(Debug, Clone)]
pub struct TrackBuild {
    pub path: OrderedPath,
    pub knots: Vec<CurveKnot>,
    pub diagnostics: BuildDiagnostics,
    pub refinement: RefinementReport,
}

impl TrackBuild {
    pub fn into_curve(self, up: Vec3) -> (BezierTrack, OrderedPath, BuildDiagnostics) {
        let mut curve = BezierTrack::with_up(up);
        curve.set_knots(self.knots, self.path.is_closed());
        (curve, self.path, self.diagnostics)
    }
}

/// Orders, fits and optionally projects a waypoint set. Nothing is returned on
/// error, so whatever the caller built before stays valid.
pub fn build_track(
    points: &[Point],
    settings: &TrackSettings,
    projector: Option<&dyn GroundProjector>,
) -> Result<TrackBuild, PathError> {
    let mut diagnostics = BuildDiagnostics::default();

    if points.len() < 2 {
        diagnostics.push(BuildWarning::InsufficientPoints { count: points.len() });
        diagnostics.log("build");
        return Err(PathError::InvalidInput(format!("need at least 2 waypoints, got {}", points.len())));
    }

    let outcome = order_waypoints(points, &settings.ordering)?;
    let limit = settings.ordering.max_link_distance;

    if outcome.has_guard_violation() && settings.guard_policy == GuardViolationPolicy::Abort {
        return Err(PathError::GuardViolation(violating_edges(&outcome, limit)));
    }

    for link in &outcome.forced_links {
        diagnostics.push(BuildWarning::GuardViolation {
            from: link.from,
            to: link.to,
            distance: link.distance,
            limit,
        });
    }
    for edge in &outcome.long_edges {
        diagnostics.push(BuildWarning::ResidualLongEdge {
            from: edge.from,
            to: edge.to,
            length: edge.length,
            limit,
        });
    }

    let fitted = fit_curve(&outcome.path, settings.fitting.handle_tightness);
    let mut knots = fitted.knots;
    for knot in fitted.degenerate {
        diagnostics.push(BuildWarning::DegenerateTangent { knot });
    }

    if settings.projection.enabled {
        match projector {
            Some(projector) => {
                for knot in project_knots(&mut knots, projector, &settings.projection, settings.up) {
                    diagnostics.push(BuildWarning::ProjectionMiss { knot });
                }
            }
            None => warn!("[TrackBuild] ground projection enabled but no projector is available"),
        }
    }

    info!(
        "[TrackBuild] {} waypoints, {} (2-opt: {} swap(s) in {} pass(es), length {:.2} -> {:.2})",
        outcome.path.len(),
        if outcome.path.is_closed() { "closed" } else { "open" },
        outcome.refinement.swaps,
        outcome.refinement.passes_run,
        outcome.refinement.length_before,
        outcome.refinement.length_after,
    );

    Ok(TrackBuild { path: outcome.path, knots, diagnostics, refinement: outcome.refinement })
}

fn violating_edges(outcome: &OrderingOutcome, limit: f32) -> Vec<LongEdge> {
    let mut edges = outcome.long_edges.clone();
    for link in &outcome.forced_links {
        if let Some(edge) = forced_link_edge(&outcome.path, link, limit) {
            if !edges.iter().any(|e| e.from == edge.from && e.to == edge.to) {
                edges.push(edge);
            }
        }
    }
    edges
}

// 2-opt may have split a forced link apart; only links that are still an edge count.
fn forced_link_edge(path: &OrderedPath, link: &ForcedLink, limit: f32) -> Option<LongEdge> {
    let points = path.points();
    let a = points.iter().position(|p| *p == link.from)?;
    let b = points.iter().position(|p| *p == link.to)?;
    let (from, to) = path
        .edge_indices()
        .into_iter()
        .find(|&(i, j)| (i, j) == (a, b) || (i, j) == (b, a))?;
    Some(LongEdge { from, to, start: points[from], end: points[to], length: link.distance, limit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::ground_projection::ProjectionSettings;
    use crate::building::waypoint_orderer::OrderingSettings;
    use crate::core::curve::CurveAdapter;

    fn square() -> Vec<Point> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
        ]
    }

    fn with_outlier() -> Vec<Point> {
        let mut points = square();
        points.push(Vec3::new(100.0, 0.0, 5.0));
        points
    }

    #[test]
    fn clean_square_builds_without_warnings() {
        let settings = TrackSettings::default();
        let build = build_track(&square(), &settings, None).unwrap();
        assert!(build.diagnostics.is_clean());
        assert_eq!(build.knots.len(), 4);
        assert!(build.knots.iter().all(|k| k.has_handles()));
        for point in square() {
            assert!(build.knots.iter().any(|k| k.position == point));
        }
    }

    #[test]
    fn single_point_is_invalid() {
        let result = build_track(&[Vec3::ZERO], &TrackSettings::default(), None);
        assert!(matches!(result, Err(PathError::InvalidInput(_))));
    }

    #[test]
    fn accept_policy_keeps_the_build_and_reports() {
        let mut settings = TrackSettings::default();
        settings.ordering.max_link_distance = 20.0;
        let build = build_track(&with_outlier(), &settings, None).unwrap();
        assert!(build.diagnostics.has_guard_violation());
        assert_eq!(build.path.len(), 5);
    }

    #[test]
    fn abort_policy_returns_the_offending_edges() {
        let settings = TrackSettings {
            ordering: OrderingSettings { max_link_distance: 20.0, ..Default::default() },
            guard_policy: GuardViolationPolicy::Abort,
            ..Default::default()
        };
        match build_track(&with_outlier(), &settings, None) {
            Err(PathError::GuardViolation(edges)) => {
                assert!(!edges.is_empty());
                assert!(edges.iter().all(|e| e.length > 20.0));
            }
            other => panic!("expected a guard violation, got {:?}", other.map(|b| b.path)),
        }
    }

    #[test]
    fn forced_links_only_report_surviving_edges() {
        let path = OrderedPath::new(square(), false).unwrap();
        let adjacent = ForcedLink { from: square()[1], to: square()[0], distance: 14.1 };
        let split = ForcedLink { from: square()[0], to: square()[3], distance: 10.0 };

        let edge = forced_link_edge(&path, &adjacent, 5.0).unwrap();
        assert_eq!((edge.from, edge.to), (0, 1));
        assert_eq!((edge.start, edge.end), (square()[0], square()[1]));
        assert!(path.edge_indices().contains(&(edge.from, edge.to)));

        // Open path: 0 and 3 are not linked.
        assert!(forced_link_edge(&path, &split, 5.0).is_none());
    }

    #[test]
    fn abort_edges_are_all_path_edges() {
        let settings = TrackSettings {
            ordering: OrderingSettings { max_link_distance: 20.0, ..Default::default() },
            guard_policy: GuardViolationPolicy::Abort,
            ..Default::default()
        };
        let accepted = build_track(
            &with_outlier(),
            &TrackSettings { guard_policy: GuardViolationPolicy::Accept, ..settings.clone() },
            None,
        )
        .unwrap();
        let edges = accepted.path.edge_indices();

        if let Err(PathError::GuardViolation(long)) = build_track(&with_outlier(), &settings, None) {
            assert!(long.iter().all(|e| edges.contains(&(e.from, e.to))));
        } else {
            panic!("expected a guard violation");
        }
    }

    struct Floor;

    impl GroundProjector for Floor {
        fn cast_down(&self, origin: Vec3, _max_distance: f32, _mask: u32) -> Option<Vec3> {
            (origin.z < 5.0).then(|| Vec3::new(origin.x, -2.0, origin.z))
        }
    }

    #[test]
    fn projection_moves_knots_and_reports_misses() {
        let settings = TrackSettings {
            projection: ProjectionSettings { enabled: true, ..Default::default() },
            ..Default::default()
        };
        let build = build_track(&square(), &settings, Some(&Floor)).unwrap();
        let misses = build
            .diagnostics
            .warnings
            .iter()
            .filter(|w| matches!(w, BuildWarning::ProjectionMiss { .. }))
            .count();
        assert_eq!(misses, 2);
        assert_eq!(build.knots.iter().filter(|k| k.position.y == -2.0).count(), 2);
    }

    #[test]
    fn build_converts_into_a_sampled_curve() {
        let build = build_track(&square(), &TrackSettings::default(), None).unwrap();
        let (curve, path, _) = build.into_curve(Vec3::Y);
        assert!(path.is_closed());
        assert_eq!(curve.segment_count(), 4);
        assert!(curve.length() > 40.0);
    }
}
