use bevy::math::Vec3;

// Minimum gain for a swap to count, keeps near-equal swaps from oscillating.
pub const SWAP_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RefinementReport {
    pub passes_run: usize,
    pub swaps: usize,
    pub length_before: f32,
    pub length_after: f32,
}

pub fn closed_tour_length(points: &[Vec3]) -> f32 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| points[i].distance(points[(i + 1) % n])).sum()
}

/// 2-opt local search over a closed tour. Reverses `points[i+1..=j]` whenever
/// that strictly shortens the tour, stopping early after a pass with no swap.
pub fn refine_closed_tour(points: &mut [Vec3], max_passes: usize) -> RefinementReport {
    let n = points.len();
    let length_before = closed_tour_length(points);
    let mut report = RefinementReport { length_before, length_after: length_before, ..Default::default() };

    // Fewer than four points have no pair of non-adjacent edges.
    if n < 4 {
        return report;
    }

    for _ in 0..max_passes {
        report.passes_run += 1;
        let mut improved = false;

        for i in 0..n - 1 {
            for j in (i + 2)..n {
                // Edges (i, i+1) and (n-1, 0) share point 0.
                if i == 0 && j == n - 1 {
                    continue;
                }
                let a = points[i];
                let b = points[i + 1];
                let c = points[j];
                let d = points[(j + 1) % n];

                let current = a.distance(b) + c.distance(d);
                let swapped = a.distance(c) + b.distance(d);
                if swapped < current - SWAP_EPSILON {
                    points[i + 1..=j].reverse();
                    report.swaps += 1;
                    improved = true;
                }
            }
        }

        if !improved {
            break;
        }
    }

    report.length_after = closed_tour_length(points);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untangles_a_crossed_square() {
        // 0 -> 2 -> 1 -> 3 crosses itself.
        let mut points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let report = refine_closed_tour(&mut points, 4);

        assert!(report.swaps >= 1);
        assert!((report.length_after - 4.0).abs() < 1e-4);
        assert!(report.length_after < report.length_before);
    }

    #[test]
    fn optimal_tour_is_left_alone() {
        let square = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let mut points = square.clone();
        let report = refine_closed_tour(&mut points, 2);

        assert_eq!(report.swaps, 0);
        assert_eq!(report.passes_run, 1);
        assert_eq!(points, square);
    }

    #[test]
    fn length_never_increases_across_passes() {
        let mut points: Vec<Vec3> = (0..12)
            .map(|i| {
                let angle = (i * 5 % 12) as f32 / 12.0 * std::f32::consts::TAU;
                Vec3::new(angle.cos() * 10.0, 0.0, angle.sin() * 10.0)
            })
            .collect();

        let mut previous = closed_tour_length(&points);
        for _ in 0..6 {
            let report = refine_closed_tour(&mut points, 1);
            assert!(report.length_after <= previous + 1e-4);
            previous = report.length_after;
        }
    }

    #[test]
    fn zero_passes_is_a_no_op() {
        let mut points = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), Vec3::X, Vec3::Z];
        let before = points.clone();
        let report = refine_closed_tour(&mut points, 0);
        assert_eq!(report.passes_run, 0);
        assert_eq!(points, before);
    }
}
