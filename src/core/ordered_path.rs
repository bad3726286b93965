use bevy::math::Vec3;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::core::path_error::PathError;

pub type Point = Vec3;

/// Ordered waypoint sequence. When `closed`, the last point links back to the first.
///
/// Built once per rebuild and replaced wholesale afterwards, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedPath {
    points: Vec<Point>,
    closed: bool,
}

/// An edge of an ordered path that is longer than the link distance guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongEdge {
    pub from: usize,
    pub to: usize,
    pub start: Point,
    pub end: Point,
    pub length: f32,
    pub limit: f32,
}

impl OrderedPath {
    pub fn new(points: Vec<Point>, closed: bool) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::InvalidInput(format!(
                "an ordered path needs at least 2 points, got {}",
                points.len()
            )));
        }
        Ok(OrderedPath { points, closed })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    // Index pairs for every edge, including the wrap edge of a closed path.
    pub fn edge_indices(&self) -> Vec<(usize, usize)> {
        let n = self.points.len();
        if self.closed {
            (0..n).circular_tuple_windows().collect()
        } else {
            (0..n).tuple_windows().collect()
        }
    }

    pub fn edge_count(&self) -> usize {
        if self.closed { self.points.len() } else { self.points.len() - 1 }
    }

    pub fn total_length(&self) -> f32 {
        self.edge_indices()
            .into_iter()
            .map(|(a, b)| self.points[a].distance(self.points[b]))
            .sum()
    }

    pub fn long_edges(&self, limit: f32) -> Vec<LongEdge> {
        self.edge_indices()
            .into_iter()
            .filter_map(|(from, to)| {
                let (start, end) = (self.points[from], self.points[to]);
                let length = start.distance(end);
                (length > limit).then_some(LongEdge { from, to, start, end, length, limit })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fewer_than_two_points() {
        assert!(OrderedPath::new(vec![], false).is_err());
        assert!(OrderedPath::new(vec![Vec3::ZERO], true).is_err());
        assert!(OrderedPath::new(vec![Vec3::ZERO, Vec3::X], false).is_ok());
    }

    #[test]
    fn closed_path_counts_the_wrap_edge() {
        let square = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 0.0, 1.0), Vec3::Z];
        let open = OrderedPath::new(square.clone(), false).unwrap();
        let closed = OrderedPath::new(square, true).unwrap();

        assert_eq!(open.edge_count(), 3);
        assert_eq!(closed.edge_count(), 4);
        assert!((open.total_length() - 3.0).abs() < 1e-5);
        assert!((closed.total_length() - 4.0).abs() < 1e-5);
        assert_eq!(closed.edge_indices().last(), Some(&(3, 0)));
    }

    #[test]
    fn long_edges_respect_the_limit() {
        let path = OrderedPath::new(vec![Vec3::ZERO, Vec3::X, Vec3::X * 5.0], true).unwrap();
        let long = path.long_edges(3.5);
        assert_eq!(long.len(), 2);
        assert_eq!((long[0].from, long[0].to), (1, 2));
        assert_eq!((long[1].from, long[1].to), (2, 0));
    }
}
