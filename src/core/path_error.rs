use std::fmt;

use crate::core::ordered_path::LongEdge;

#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    // Fatal for the build call that raised it; the previous build stays in place.
    InvalidInput(String),
    // Only surfaced as an error when the guard policy is `Abort`.
    GuardViolation(Vec<LongEdge>),
    Config(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidInput(reason) => write!(f, "invalid input: {}", reason),
            PathError::GuardViolation(edges) => {
                write!(f, "{} edge(s) exceed the link distance guard", edges.len())?;
                if let Some(worst) = edges.iter().max_by(|a, b| a.length.total_cmp(&b.length)) {
                    write!(f, " (longest {:.3} > {:.3})", worst.length, worst.limit)?;
                }
                Ok(())
            }
            PathError::Config(reason) => write!(f, "track config error: {}", reason),
        }
    }
}

impl std::error::Error for PathError {}

impl From<&str> for PathError {
    fn from(error: &str) -> Self {
        PathError::InvalidInput(error.to_string())
    }
}

impl From<std::io::Error> for PathError {
    fn from(error: std::io::Error) -> Self {
        PathError::Config(error.to_string())
    }
}

impl From<ron::de::SpannedError> for PathError {
    fn from(error: ron::de::SpannedError) -> Self {
        PathError::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    #[test]
    fn guard_violation_message_names_longest_edge() {
        let error = PathError::GuardViolation(vec![
            LongEdge { from: 0, to: 1, start: Vec3::ZERO, end: Vec3::X * 12.0, length: 12.0, limit: 10.0 },
            LongEdge { from: 1, to: 2, start: Vec3::ZERO, end: Vec3::X * 15.0, length: 15.0, limit: 10.0 },
        ]);
        let message = error.to_string();
        assert!(message.starts_with("2 edge(s)"));
        assert!(message.contains("15.000"));
    }
}
