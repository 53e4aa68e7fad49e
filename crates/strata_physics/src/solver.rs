//! Contact detection and separation
//!
//! The solver owns the static world geometry. Actor bodies are handed in
//! fresh every pass as [`SolverBody`] snapshots; the solver reports
//! contacts and separations but never mutates an actor itself.

use log::trace;
use strata_math::{Plane, Vec3};

use crate::collision::{collide, CollisionFilter, Contact};
use crate::material::PhysicsMaterial;
use crate::primitive::Collider;
use crate::response::CollisionResponse;

/// Configuration for the collision solver
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Gravity acceleration along Y (negative = down)
    pub gravity: f32,
    /// Penetration below this depth is left unresolved to avoid jitter
    pub skin_width: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gravity: -20.0,
            skin_width: 0.001,
        }
    }
}

impl SolverConfig {
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }
}

/// Immovable world geometry (floors, walls)
#[derive(Clone, Copy, Debug)]
pub struct StaticCollider {
    pub collider: Collider,
    pub material: PhysicsMaterial,
    pub filter: CollisionFilter,
}

impl StaticCollider {
    pub fn new(collider: Collider, material: PhysicsMaterial) -> Self {
        Self {
            collider,
            material,
            filter: CollisionFilter::static_world(),
        }
    }

    /// Horizontal floor plane at height `y`
    pub fn floor(y: f32, material: PhysicsMaterial) -> Self {
        Self::new(Collider::Plane(Plane::floor(y)), material)
    }

    /// Infinite wall plane
    pub fn plane(normal: Vec3, distance: f32, material: PhysicsMaterial) -> Self {
        Self::new(Collider::Plane(Plane::new(normal, distance)), material)
    }
}

/// One actor's collision state for a single solver pass
#[derive(Clone, Copy, Debug)]
pub struct SolverBody<K> {
    pub key: K,
    pub collider: Collider,
    pub filter: CollisionFilter,
    pub material: PhysicsMaterial,
    /// Whether the body may be moved by separation
    pub movable: bool,
    pub mass: f32,
}

/// The other side of a contact
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partner<K> {
    Body(K),
    /// Index into the solver's static colliders
    World(usize),
}

/// A detected contact; the normal points from the partner toward `body`
#[derive(Clone, Copy, Debug)]
pub struct ContactPair<K> {
    pub body: K,
    pub partner: Partner<K>,
    pub contact: Contact,
    /// `body`'s material combined with the partner's
    pub material: PhysicsMaterial,
}

/// Position corrections for both sides of a contact
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Separation {
    pub body: Vec3,
    pub partner: Vec3,
}

impl Separation {
    pub const NONE: Self = Self {
        body: Vec3::ZERO,
        partner: Vec3::ZERO,
    };
}

/// Finds contacts between actor bodies and the static world
pub struct CollisionSolver {
    static_colliders: Vec<StaticCollider>,
    pub config: SolverConfig,
}

impl Default for CollisionSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionSolver {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            static_colliders: Vec::new(),
            config,
        }
    }

    pub fn add_static_collider(&mut self, collider: StaticCollider) {
        self.static_colliders.push(collider);
    }

    pub fn static_colliders(&self) -> &[StaticCollider] {
        &self.static_colliders
    }

    /// Find every colliding pair this pass
    ///
    /// Body pairs are reported once, oriented with the earlier body in
    /// `bodies` as `body`. Static contacts are only reported for movable
    /// bodies. Pairs rejected by their filters are never tested.
    pub fn detect<K: Copy>(&self, bodies: &[SolverBody<K>]) -> Vec<ContactPair<K>> {
        let mut pairs = Vec::new();

        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                if !a.movable && !b.movable {
                    continue;
                }
                if !a.filter.collides_with(&b.filter) {
                    continue;
                }
                // Broad phase on bounds before the exact test
                if let (Some(ba), Some(bb)) = (a.collider.bounds(), b.collider.bounds()) {
                    if !ba.intersects(&bb) {
                        continue;
                    }
                }
                if let Some(contact) = collide(&a.collider, &b.collider) {
                    if contact.penetration > self.config.skin_width {
                        pairs.push(ContactPair {
                            body: a.key,
                            partner: Partner::Body(b.key),
                            contact,
                            material: a.material.combine(&b.material),
                        });
                    }
                }
            }

            if !a.movable {
                continue;
            }
            for (index, world) in self.static_colliders.iter().enumerate() {
                if !a.filter.collides_with(&world.filter) {
                    continue;
                }
                if let Some(contact) = collide(&a.collider, &world.collider) {
                    if contact.penetration > self.config.skin_width {
                        pairs.push(ContactPair {
                            body: a.key,
                            partner: Partner::World(index),
                            contact,
                            material: a.material.combine(&world.material),
                        });
                    }
                }
            }
        }

        trace!("collision solver: {} bodies, {} contacts", bodies.len(), pairs.len());
        pairs
    }

    /// Split the penetration between the two sides
    ///
    /// If either side ignores the other, nothing moves. Immovable sides
    /// never move; two movable sides split by inverse mass ratio.
    pub fn resolve(
        &self,
        contact: &Contact,
        body: (CollisionResponse, bool, f32),
        partner: (CollisionResponse, bool, f32),
    ) -> Separation {
        let (body_response, body_movable, body_mass) = body;
        let (partner_response, partner_movable, partner_mass) = partner;

        if !body_response.separates() || !partner_response.separates() {
            return Separation::NONE;
        }

        let push = contact.normal * contact.penetration;
        match (body_movable, partner_movable) {
            (false, false) => Separation::NONE,
            (true, false) => Separation { body: push, partner: Vec3::ZERO },
            (false, true) => Separation { body: Vec3::ZERO, partner: -push },
            (true, true) => {
                let total = body_mass + partner_mass;
                let (body_share, partner_share) = if total > 0.0 {
                    (partner_mass / total, body_mass / total)
                } else {
                    (0.5, 0.5)
                };
                Separation {
                    body: push * body_share,
                    partner: -push * partner_share,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionLayer;
    use crate::primitive::Sphere;

    fn sphere_body(key: u32, center: Vec3, radius: f32) -> SolverBody<u32> {
        SolverBody {
            key,
            collider: Collider::Sphere(Sphere::new(center, radius)),
            filter: CollisionFilter::default(),
            material: PhysicsMaterial::STONE,
            movable: true,
            mass: 1.0,
        }
    }

    #[test]
    fn test_detects_overlapping_pair_once() {
        let solver = CollisionSolver::new();
        let bodies = [
            sphere_body(1, Vec3::ZERO, 0.5),
            sphere_body(2, Vec3::new(0.8, 0.0, 0.0), 0.5),
            sphere_body(3, Vec3::new(10.0, 0.0, 0.0), 0.5),
        ];
        let pairs = solver.detect(&bodies);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].body, 1);
        assert_eq!(pairs[0].partner, Partner::Body(2));
        // Normal pushes body 1 away from body 2
        assert_eq!(pairs[0].contact.normal, -Vec3::X);
    }

    #[test]
    fn test_filtered_pair_is_skipped() {
        let solver = CollisionSolver::new();
        let mut a = sphere_body(1, Vec3::ZERO, 0.5);
        let mut b = sphere_body(2, Vec3::new(0.5, 0.0, 0.0), 0.5);
        a.filter = CollisionFilter::character();
        b.filter = CollisionFilter::character();
        assert!(solver.detect(&[a, b]).is_empty());

        b.filter = CollisionFilter::new(CollisionLayer::DEFAULT, CollisionLayer::ALL);
        assert_eq!(solver.detect(&[a, b]).len(), 1);
    }

    #[test]
    fn test_static_floor_contact() {
        let mut solver = CollisionSolver::new();
        solver.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::ICE));
        let pairs = solver.detect(&[sphere_body(7, Vec3::new(0.0, 0.4, 0.0), 0.5)]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].partner, Partner::World(0));
        assert_eq!(pairs[0].material.surface, crate::SurfaceKind::Ice);
    }

    #[test]
    fn test_immovable_bodies_skip_static_and_each_other() {
        let mut solver = CollisionSolver::new();
        solver.add_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::STONE));
        let mut a = sphere_body(1, Vec3::ZERO, 0.5);
        let mut b = sphere_body(2, Vec3::new(0.5, 0.0, 0.0), 0.5);
        a.movable = false;
        b.movable = false;
        assert!(solver.detect(&[a, b]).is_empty());
    }

    #[test]
    fn test_separation_split_by_mass() {
        let solver = CollisionSolver::new();
        let contact = Contact::new(Vec3::ZERO, Vec3::X, 0.3);
        let sep = solver.resolve(
            &contact,
            (CollisionResponse::Stop, true, 1.0),
            (CollisionResponse::Stop, true, 2.0),
        );
        assert!((sep.body.x - 0.2).abs() < 0.0001);
        assert!((sep.partner.x + 0.1).abs() < 0.0001);
    }

    #[test]
    fn test_ignore_on_either_side_prevents_separation() {
        let solver = CollisionSolver::new();
        let contact = Contact::new(Vec3::ZERO, Vec3::X, 0.3);
        let sep = solver.resolve(
            &contact,
            (CollisionResponse::Slide, true, 1.0),
            (CollisionResponse::Ignore, false, 1.0),
        );
        assert_eq!(sep, Separation::NONE);
    }

    #[test]
    fn test_only_movable_side_moves() {
        let solver = CollisionSolver::new();
        let contact = Contact::new(Vec3::ZERO, Vec3::UP, 0.5);
        let sep = solver.resolve(
            &contact,
            (CollisionResponse::Stop, false, 1.0),
            (CollisionResponse::Slide, true, 1.0),
        );
        assert_eq!(sep.body, Vec3::ZERO);
        assert_eq!(sep.partner, Vec3::new(0.0, -0.5, 0.0));
    }
}
