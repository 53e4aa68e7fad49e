//! Infinite planes
//!
//! The plane equation is `normal · point = distance`. Points with
//! `normal · point > distance` are on the positive side.

use serde::{Serialize, Deserialize};
use crate::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal pointing to the positive side
    pub normal: Vec3,
    /// Signed distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a normal and distance; the normal is normalized
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.normalized(),
            distance,
        }
    }

    /// Create a plane through `point` facing `normal`
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalized();
        Self {
            normal: n,
            distance: n.dot(point),
        }
    }

    /// Horizontal floor at height `y`, facing up
    pub fn floor(y: f32) -> Self {
        Self::from_point_normal(Vec3::new(0.0, y, 0.0), Vec3::UP)
    }

    /// Positive above the plane, negative below, zero on it
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// Project a point onto the plane
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.signed_distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_signed_distance() {
        let floor = Plane::floor(-2.0);
        assert_eq!(floor.signed_distance(Vec3::new(4.0, 1.0, 9.0)), 3.0);
        assert_eq!(floor.signed_distance(Vec3::new(0.0, -3.0, 0.0)), -1.0);
    }

    #[test]
    fn test_new_normalizes() {
        let p = Plane::new(Vec3::new(0.0, 0.0, 4.0), 1.0);
        assert_eq!(p.normal, Vec3::Z);
    }

    #[test]
    fn test_project_lands_on_plane() {
        let p = Plane::from_point_normal(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 1.0, 1.0));
        let projected = p.project(Vec3::new(3.0, 7.0, -2.0));
        assert!(p.signed_distance(projected).abs() < 0.0001);
    }
}
