//! Narrow-phase collision tests and layer filtering
//!
//! Every test returns a [`Contact`] whose normal points from the second
//! shape toward the first, i.e. the direction that pushes the first shape
//! out of the second.

use bitflags::bitflags;

use crate::primitive::{Collider, Sphere};
use strata_math::{Aabb, Plane, Vec3};

bitflags! {
    /// Collision layers for filtering which actors can collide
    ///
    /// Actors can belong to multiple layers and choose which layers they
    /// collide with through a mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for props and generic actors
        const DEFAULT = 1 << 0;
        /// The player character
        const PLAYER = 1 << 1;
        /// AI-driven characters
        const CHARACTER = 1 << 2;
        /// Static world geometry (floors, walls)
        const STATIC = 1 << 3;
        /// Trigger volumes (detect but don't push)
        const TRIGGER = 1 << 4;
        /// Thrown objects and projectiles
        const PROJECTILE = 1 << 5;
        /// Pickups
        const PICKUP = 1 << 6;
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what an actor collides with
///
/// Two actors A and B collide if `A.layer & B.mask != 0` and
/// `B.layer & A.mask != 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this actor belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this actor can collide with
    pub mask: CollisionLayer,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

impl CollisionFilter {
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask }
    }

    /// Both sides must accept each other
    pub fn collides_with(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// The player collides with everything except its own projectiles
    pub fn player() -> Self {
        Self {
            layer: CollisionLayer::PLAYER,
            mask: CollisionLayer::ALL & !CollisionLayer::PLAYER & !CollisionLayer::PROJECTILE,
        }
    }

    /// AI characters don't collide with each other
    pub fn character() -> Self {
        Self {
            layer: CollisionLayer::CHARACTER,
            mask: CollisionLayer::ALL & !CollisionLayer::CHARACTER,
        }
    }

    pub fn static_world() -> Self {
        Self {
            layer: CollisionLayer::STATIC,
            mask: CollisionLayer::ALL,
        }
    }

    pub fn trigger(detects: CollisionLayer) -> Self {
        Self {
            layer: CollisionLayer::TRIGGER,
            mask: detects,
        }
    }

    /// Thrown objects hit the player, characters and the world
    pub fn projectile() -> Self {
        Self {
            layer: CollisionLayer::PROJECTILE,
            mask: CollisionLayer::PLAYER | CollisionLayer::CHARACTER | CollisionLayer::STATIC,
        }
    }
}

/// Contact information from a collision
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Point of contact
    pub point: Vec3,
    /// Normal pointing from the second shape toward the first
    pub normal: Vec3,
    /// Penetration depth (positive means overlapping)
    pub penetration: f32,
}

impl Contact {
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    pub fn is_colliding(&self) -> bool {
        self.penetration > 0.0
    }

    /// The same contact seen from the other shape
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Sphere vs sphere; the normal points from `b` toward `a`
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> Option<Contact> {
    let delta = a.center - b.center;
    let dist_sq = delta.length_squared();
    let min_dist = a.radius + b.radius;

    if dist_sq >= min_dist * min_dist {
        return None;
    }
    let dist = dist_sq.sqrt();
    // Coincident centers have no preferred direction; push up
    let normal = if dist > 0.0001 { delta / dist } else { Vec3::UP };
    let point = b.center + normal * b.radius;
    Some(Contact::new(point, normal, min_dist - dist))
}

/// Sphere vs plane; the normal is the plane normal
pub fn sphere_vs_plane(sphere: &Sphere, plane: &Plane) -> Option<Contact> {
    let penetration = sphere.radius - plane.signed_distance(sphere.center);

    if penetration > 0.0 {
        let normal = plane.normal;
        let point = sphere.center - normal * sphere.radius;
        Some(Contact::new(point, normal, penetration))
    } else {
        None
    }
}

/// Box vs plane, tested at the corner deepest along the plane normal
pub fn aabb_vs_plane(aabb: &Aabb, plane: &Plane) -> Option<Contact> {
    let deepest = aabb.center() - aabb.half_extents().component_mul(plane.normal.sign());
    let signed_dist = plane.signed_distance(deepest);

    if signed_dist < 0.0 {
        Some(Contact::new(deepest, plane.normal, -signed_dist))
    } else {
        None
    }
}

/// Sphere vs box; the normal points from the box toward the sphere
pub fn sphere_vs_aabb(sphere: &Sphere, aabb: &Aabb) -> Option<Contact> {
    let closest = aabb.closest_point(sphere.center);
    let delta = sphere.center - closest;
    let dist_squared = delta.length_squared();

    if dist_squared >= sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_squared.sqrt();
    if dist > 0.0001 {
        return Some(Contact::new(closest, delta / dist, sphere.radius - dist));
    }

    // Center inside the box: escape through the nearest face
    let to_min = sphere.center - aabb.min;
    let to_max = aabb.max - sphere.center;
    let candidates = [
        (to_min.x, -Vec3::X),
        (to_max.x, Vec3::X),
        (to_min.y, -Vec3::Y),
        (to_max.y, Vec3::Y),
        (to_min.z, -Vec3::Z),
        (to_max.z, Vec3::Z),
    ];
    let (depth, normal) = candidates
        .iter()
        .copied()
        .fold((f32::MAX, Vec3::UP), |best, c| if c.0 < best.0 { c } else { best });

    Some(Contact::new(closest, normal, depth + sphere.radius))
}

/// Box vs box along the axis of least overlap; the normal points from `b` toward `a`
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if !a.intersects(b) {
        return None;
    }

    let overlap = a.max.min_components(b.max) - a.min.max_components(b.min);
    let (ca, cb) = (a.center(), b.center());

    let axes = [
        (overlap.x, if ca.x < cb.x { -Vec3::X } else { Vec3::X }),
        (overlap.y, if ca.y < cb.y { -Vec3::Y } else { Vec3::Y }),
        (overlap.z, if ca.z < cb.z { -Vec3::Z } else { Vec3::Z }),
    ];
    let (penetration, normal) = axes
        .iter()
        .copied()
        .fold((f32::MAX, Vec3::X), |best, c| if c.0 < best.0 { c } else { best });

    let point = (a.min.max_components(b.min) + a.max.min_components(b.max)) * 0.5;
    Some(Contact::new(point, normal, penetration.max(0.0)))
}

/// Dispatch to the matching narrow-phase test; the normal points from `b` toward `a`
pub fn collide(a: &Collider, b: &Collider) -> Option<Contact> {
    match (a, b) {
        (Collider::Sphere(sa), Collider::Sphere(sb)) => sphere_vs_sphere(sa, sb),
        (Collider::Sphere(s), Collider::Aabb(bx)) => sphere_vs_aabb(s, bx),
        (Collider::Aabb(bx), Collider::Sphere(s)) => sphere_vs_aabb(s, bx).map(Contact::flipped),
        (Collider::Aabb(ba), Collider::Aabb(bb)) => aabb_vs_aabb(ba, bb),
        (Collider::Sphere(s), Collider::Plane(p)) => sphere_vs_plane(s, p),
        (Collider::Aabb(bx), Collider::Plane(p)) => aabb_vs_plane(bx, p),
        (Collider::Plane(p), Collider::Sphere(s)) => sphere_vs_plane(s, p).map(Contact::flipped),
        (Collider::Plane(p), Collider::Aabb(bx)) => aabb_vs_plane(bx, p).map(Contact::flipped),
        (Collider::Plane(_), Collider::Plane(_)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vs_sphere_normal_points_toward_first() {
        let a = Sphere::new(Vec3::new(0.8, 0.0, 0.0), 0.5);
        let b = Sphere::new(Vec3::ZERO, 0.5);
        let contact = sphere_vs_sphere(&a, &b).unwrap();
        assert_eq!(contact.normal, Vec3::X);
        assert!((contact.penetration - 0.2).abs() < 0.0001);
        assert!(sphere_vs_sphere(&Sphere::new(Vec3::new(2.0, 0.0, 0.0), 0.5), &b).is_none());
    }

    #[test]
    fn test_sphere_vs_plane() {
        let floor = Plane::floor(0.0);
        assert!(sphere_vs_plane(&Sphere::new(Vec3::new(0.0, 2.0, 0.0), 0.5), &floor).is_none());
        let contact = sphere_vs_plane(&Sphere::new(Vec3::new(0.0, 0.3, 0.0), 0.5), &floor).unwrap();
        assert_eq!(contact.normal, Vec3::UP);
        assert!((contact.penetration - 0.2).abs() < 0.0001);
    }

    #[test]
    fn test_aabb_vs_plane() {
        let floor = Plane::floor(0.0);
        let resting = Aabb::from_center_half_extents(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(0.5));
        assert!(aabb_vs_plane(&resting, &floor).is_none());
        let sunk = Aabb::from_center_half_extents(Vec3::new(0.0, 0.25, 0.0), Vec3::splat(0.5));
        let contact = aabb_vs_plane(&sunk, &floor).unwrap();
        assert!((contact.penetration - 0.25).abs() < 0.0001);
    }

    #[test]
    fn test_sphere_vs_aabb_outside_face() {
        let bx = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let sphere = Sphere::new(Vec3::new(1.3, 0.0, 0.0), 0.5);
        let contact = sphere_vs_aabb(&sphere, &bx).unwrap();
        assert_eq!(contact.normal, Vec3::X);
        assert!((contact.penetration - 0.2).abs() < 0.0001);
    }

    #[test]
    fn test_sphere_vs_aabb_center_inside_escapes_nearest_face() {
        let bx = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let sphere = Sphere::new(Vec3::new(0.0, 0.9, 0.0), 0.25);
        let contact = sphere_vs_aabb(&sphere, &bx).unwrap();
        assert_eq!(contact.normal, Vec3::Y);
        assert!((contact.penetration - 0.35).abs() < 0.0001);
    }

    #[test]
    fn test_aabb_vs_aabb_least_overlap_axis() {
        let a = Aabb::from_center_half_extents(Vec3::new(1.8, 0.0, 0.0), Vec3::ONE);
        let b = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        let contact = aabb_vs_aabb(&a, &b).unwrap();
        assert_eq!(contact.normal, Vec3::X);
        assert!((contact.penetration - 0.2).abs() < 0.0001);
    }

    #[test]
    fn test_collide_flips_for_swapped_order() {
        let s = Collider::Sphere(Sphere::new(Vec3::new(1.3, 0.0, 0.0), 0.5));
        let b = Collider::Aabb(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE));
        let ab = collide(&s, &b).unwrap();
        let ba = collide(&b, &s).unwrap();
        assert_eq!(ab.normal, -ba.normal);
        assert!(collide(&Collider::Plane(Plane::floor(0.0)), &Collider::Plane(Plane::floor(1.0))).is_none());
    }

    #[test]
    fn test_filter_character_vs_character() {
        let c = CollisionFilter::character();
        assert!(!c.collides_with(&c));
        assert!(c.collides_with(&CollisionFilter::player()));
        assert!(c.collides_with(&CollisionFilter::static_world()));
    }

    #[test]
    fn test_filter_projectile_skips_pickups() {
        let projectile = CollisionFilter::projectile();
        let pickup = CollisionFilter::new(CollisionLayer::PICKUP, CollisionLayer::ALL);
        assert!(!projectile.collides_with(&pickup));
        assert!(projectile.collides_with(&CollisionFilter::character()));
    }

    #[test]
    fn test_trigger_detects_only_requested_layers() {
        let trigger = CollisionFilter::trigger(CollisionLayer::PLAYER);
        assert!(trigger.collides_with(&CollisionFilter::player()));
        assert!(!trigger.collides_with(&CollisionFilter::character()));
    }
}
