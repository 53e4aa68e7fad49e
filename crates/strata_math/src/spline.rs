//! Catmull-Rom paths
//!
//! Characters in path-following mode derive their position from a
//! parametric `t` along one of these instead of free integration.

use serde::{Serialize, Deserialize};
use crate::Vec3;

/// Position and unit tangent at a parametric point on a path
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplineSample {
    pub position: Vec3,
    pub tangent: Vec3,
    /// Parametric t in [0, 1] (wrapped for closed paths)
    pub t: f32,
}

/// A Catmull-Rom spline through its control points
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplinePath {
    pub points: Vec<Vec3>,
    /// Closed paths loop back from the last point to the first
    #[serde(default)]
    pub closed: bool,
}

/// Catmull-Rom interpolation between `p1` and `p2`
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    (p1 * 2.0
        + (p2 - p0) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

impl SplinePath {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points, closed: false }
    }

    pub fn closed(points: Vec<Vec3>) -> Self {
        Self { points, closed: true }
    }

    /// A path needs at least two points to be followed
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }

    fn segment_count(&self) -> usize {
        match (self.points.len(), self.closed) {
            (0 | 1, _) => 0,
            (n, true) => n,
            (n, false) => n - 1,
        }
    }

    fn point(&self, index: isize) -> Vec3 {
        let n = self.points.len() as isize;
        let i = if self.closed {
            index.rem_euclid(n)
        } else {
            index.clamp(0, n - 1)
        };
        self.points[i as usize]
    }

    fn position_at(&self, t: f32) -> Vec3 {
        let segments = self.segment_count();
        let scaled = t * segments as f32;
        let seg = (scaled.floor() as usize).min(segments - 1);
        let local = scaled - seg as f32;
        let i = seg as isize;
        catmull_rom(
            self.point(i - 1),
            self.point(i),
            self.point(i + 1),
            self.point(i + 2),
            local,
        )
    }

    /// Sample the path at `t`; `None` when the path has fewer than two points
    pub fn sample(&self, t: f32) -> Option<SplineSample> {
        if !self.is_valid() {
            return None;
        }
        let t = if self.closed { t.rem_euclid(1.0) } else { t.clamp(0.0, 1.0) };
        let position = self.position_at(t);

        let eps = 1e-3;
        let (a, b) = if self.closed {
            (self.position_at((t - eps).rem_euclid(1.0)), self.position_at((t + eps).rem_euclid(1.0)))
        } else {
            (self.position_at((t - eps).max(0.0)), self.position_at((t + eps).min(1.0)))
        };
        Some(SplineSample {
            position,
            tangent: (b - a).normalized(),
            t,
        })
    }

    /// Sum of straight-line distances between control points
    pub fn approximate_length(&self) -> f32 {
        let segments = self.segment_count();
        (0..segments as isize)
            .map(|i| self.point(i).distance(self.point(i + 1)))
            .sum()
    }
}
