use crate::core::curve::CurveAdapter;
use crate::core::path_error::PathError;

// Segments shorter than this are treated as zero-length when inverting.
const MIN_SEGMENT_SPAN: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcLengthSample {
    pub parameter: f32,
    pub distance: f32,
}

/// Cumulative polyline distance against curve parameter, sampled at even
/// parameter steps. The polyline length is the authoritative total length.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLengthTable {
    samples: Vec<ArcLengthSample>,
}

impl ArcLengthTable {
    pub fn build(curve: &(impl CurveAdapter + ?Sized), sample_count: usize) -> Result<Self, PathError> {
        if sample_count < 2 {
            return Err(PathError::InvalidInput(format!(
                "arc length table needs at least 2 samples, got {}",
                sample_count
            )));
        }

        let last = sample_count - 1;
        let mut samples = Vec::with_capacity(sample_count);
        let mut previous = curve.evaluate(0.0).position;
        let mut distance = 0.0;
        samples.push(ArcLengthSample { parameter: 0.0, distance });

        for i in 1..sample_count {
            let parameter = if i == last { 1.0 } else { i as f32 / last as f32 };
            let position = curve.evaluate(parameter).position;
            distance += position.distance(previous);
            previous = position;
            samples.push(ArcLengthSample { parameter, distance });
        }

        Ok(ArcLengthTable { samples })
    }

    pub fn samples(&self) -> &[ArcLengthSample] {
        &self.samples
    }

    pub fn total_length(&self) -> f32 {
        self.samples.last().map_or(0.0, |s| s.distance)
    }

    pub fn distance_to_parameter(&self, distance: f32) -> f32 {
        let total = self.total_length();
        if !(distance > 0.0) || total <= 0.0 {
            return self.samples[0].parameter;
        }
        let distance = distance.min(total);

        let index = self.samples.partition_point(|s| s.distance < distance);
        let upper = self.samples[index.min(self.samples.len() - 1)];
        if index == 0 || upper.distance == distance {
            return upper.parameter;
        }

        let lower = self.samples[index - 1];
        let span = upper.distance - lower.distance;
        if span < MIN_SEGMENT_SPAN {
            return upper.parameter;
        }
        let fraction = (distance - lower.distance) / span;
        lower.parameter + (upper.parameter - lower.parameter) * fraction
    }

    pub fn parameter_to_distance(&self, parameter: f32) -> f32 {
        let parameter = parameter.clamp(0.0, 1.0);
        let index = self.samples.partition_point(|s| s.parameter < parameter);
        let upper = self.samples[index.min(self.samples.len() - 1)];
        if index == 0 || upper.parameter == parameter {
            return upper.distance;
        }

        let lower = self.samples[index - 1];
        let fraction = (parameter - lower.parameter) / (upper.parameter - lower.parameter);
        lower.distance + (upper.distance - lower.distance) * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::curve::CurveSample;
    use bevy::math::Vec3;

    // A straight line traversed with quadratic speed: x = 10 * t^2.
    struct Accelerating;

    impl CurveAdapter for Accelerating {
        fn evaluate(&self, parameter: f32) -> CurveSample {
            CurveSample {
                position: Vec3::X * 10.0 * parameter * parameter,
                tangent: Vec3::X,
                up: Vec3::Y,
            }
        }

        fn length(&self) -> f32 {
            10.0
        }
    }

    // Stalls for the middle third of its parameter range.
    struct Stalling;

    impl CurveAdapter for Stalling {
        fn evaluate(&self, parameter: f32) -> CurveSample {
            let x = if parameter < 1.0 / 3.0 {
                parameter * 3.0
            } else if parameter < 2.0 / 3.0 {
                1.0
            } else {
                1.0 + (parameter - 2.0 / 3.0) * 3.0
            };
            CurveSample { position: Vec3::X * x, tangent: Vec3::X, up: Vec3::Y }
        }

        fn length(&self) -> f32 {
            2.0
        }
    }

    #[test]
    fn too_few_samples_is_invalid() {
        assert!(ArcLengthTable::build(&Accelerating, 1).is_err());
        assert!(ArcLengthTable::build(&Accelerating, 2).is_ok());
    }

    #[test]
    fn table_invariants_hold() {
        let table = ArcLengthTable::build(&Accelerating, 64).unwrap();
        let samples = table.samples();
        assert_eq!(samples.len(), 64);
        assert_eq!(samples[0].distance, 0.0);
        assert_eq!(samples[63].parameter, 1.0);
        assert_eq!(samples[63].distance, table.total_length());
        assert!(samples.windows(2).all(|w| w[0].parameter < w[1].parameter));
        assert!(samples.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!((table.total_length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn endpoints_map_to_parameter_bounds() {
        let table = ArcLengthTable::build(&Accelerating, 32).unwrap();
        assert_eq!(table.distance_to_parameter(0.0), 0.0);
        assert_eq!(table.distance_to_parameter(table.total_length()), 1.0);
        assert_eq!(table.distance_to_parameter(-3.0), 0.0);
        assert_eq!(table.distance_to_parameter(1e6), 1.0);
    }

    #[test]
    fn recorded_distances_round_trip_exactly() {
        let table = ArcLengthTable::build(&Accelerating, 50).unwrap();
        for sample in table.samples() {
            assert_eq!(table.distance_to_parameter(sample.distance), sample.parameter);
        }
    }

    #[test]
    fn inversion_is_monotonic() {
        let table = ArcLengthTable::build(&Stalling, 40).unwrap();
        let mut previous = 0.0;
        for step in 0..=400 {
            let parameter = table.distance_to_parameter(step as f32 * 0.005);
            assert!(parameter >= previous);
            previous = parameter;
        }
    }

    #[test]
    fn uniform_distance_recovers_uniform_positions() {
        let table = ArcLengthTable::build(&Accelerating, 512).unwrap();
        for step in 0..=10 {
            let distance = step as f32;
            let position = Accelerating.evaluate(table.distance_to_parameter(distance)).position;
            assert!((position.x - distance).abs() < 0.02, "{} vs {}", position.x, distance);
        }
    }

    #[test]
    fn parameter_to_distance_inverts_the_table() {
        let table = ArcLengthTable::build(&Accelerating, 128).unwrap();
        for step in 0..=20 {
            let distance = step as f32 * 0.5;
            let parameter = table.distance_to_parameter(distance);
            assert!((table.parameter_to_distance(parameter) - distance).abs() < 1e-3);
        }
    }
}
