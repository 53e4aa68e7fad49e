//! Collision primitives
//!
//! A [`CollisionPrimitive`] is the local-space shape a physics actor owns.
//! The solver never stores primitives; it asks for a world-space
//! [`Collider`] placed at the owner's position each pass.

use serde::{Serialize, Deserialize};
use strata_math::{Aabb, Plane, Vec3};

use crate::collision::CollisionFilter;
use crate::material::PhysicsMaterial;

/// A sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if a point is inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }
}

/// A world-space shape handed to the narrow phase
#[derive(Clone, Copy, Debug)]
pub enum Collider {
    Sphere(Sphere),
    Aabb(Aabb),
    Plane(Plane),
}

impl Collider {
    /// World bounds; planes are unbounded and return `None`
    pub fn bounds(&self) -> Option<Aabb> {
        match self {
            Collider::Sphere(s) => Some(s.bounds()),
            Collider::Aabb(b) => Some(*b),
            Collider::Plane(_) => None,
        }
    }

    /// Translate the collider by a delta
    ///
    /// For planes, this adjusts the distance from origin.
    pub fn translated(&self, delta: Vec3) -> Self {
        match self {
            Collider::Sphere(s) => Collider::Sphere(Sphere::new(s.center + delta, s.radius)),
            Collider::Aabb(b) => Collider::Aabb(b.translated(delta)),
            Collider::Plane(p) => Collider::Plane(Plane::new(p.normal, p.distance + p.normal.dot(delta))),
        }
    }
}

/// Local-space shape of a primitive
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveShape {
    Sphere { radius: f32 },
    /// Axis-aligned box; the owner's rotation is not applied
    Box { half_extents: Vec3 },
}

/// The shape a physics actor exposes to the solver
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionPrimitive {
    pub shape: PrimitiveShape,
    /// Offset of the shape center from the owner's origin
    pub offset: Vec3,
    pub filter: CollisionFilter,
    pub material: PhysicsMaterial,
}

impl CollisionPrimitive {
    pub fn sphere(radius: f32) -> Self {
        Self::from_shape(PrimitiveShape::Sphere { radius })
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::from_shape(PrimitiveShape::Box { half_extents })
    }

    fn from_shape(shape: PrimitiveShape) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            filter: CollisionFilter::default(),
            material: PhysicsMaterial::default(),
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Place the primitive at an owner position
    pub fn world_collider(&self, position: Vec3) -> Collider {
        let center = position + self.offset;
        match self.shape {
            PrimitiveShape::Sphere { radius } => Collider::Sphere(Sphere::new(center, radius)),
            PrimitiveShape::Box { half_extents } => {
                Collider::Aabb(Aabb::from_center_half_extents(center, half_extents))
            }
        }
    }

    /// World bounds at an owner position
    pub fn bounds(&self, position: Vec3) -> Aabb {
        match self.shape {
            PrimitiveShape::Sphere { radius } => {
                Aabb::from_center_half_extents(position + self.offset, Vec3::splat(radius))
            }
            PrimitiveShape::Box { half_extents } => {
                Aabb::from_center_half_extents(position + self.offset, half_extents)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_contains() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        assert!(sphere.contains(Vec3::new(1.0, 0.0, 0.0)));
        assert!(!sphere.contains(Vec3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn test_world_collider_applies_offset() {
        let prim = CollisionPrimitive::sphere(0.5).with_offset(Vec3::new(0.0, 1.0, 0.0));
        match prim.world_collider(Vec3::new(2.0, 0.0, 0.0)) {
            Collider::Sphere(s) => assert_eq!(s.center, Vec3::new(2.0, 1.0, 0.0)),
            other => panic!("Expected sphere, got {:?}", other),
        }
    }

    #[test]
    fn test_box_bounds() {
        let prim = CollisionPrimitive::cuboid(Vec3::new(1.0, 2.0, 1.0));
        let b = prim.bounds(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(b.max, Vec3::new(1.0, 4.0, 1.0));
    }

    #[test]
    fn test_plane_has_no_bounds() {
        assert!(Collider::Plane(Plane::floor(0.0)).bounds().is_none());
    }

    #[test]
    fn test_translated_plane_moves_along_normal() {
        let moved = Collider::Plane(Plane::floor(0.0)).translated(Vec3::new(5.0, 2.0, 0.0));
        match moved {
            Collider::Plane(p) => assert!((p.distance - 2.0).abs() < 0.0001),
            other => panic!("Expected plane, got {:?}", other),
        }
    }
}
