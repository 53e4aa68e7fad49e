//! Per-actor collision resolution policy

use serde::{Serialize, Deserialize};
use strata_math::Vec3;

use crate::material::PhysicsMaterial;

/// How an actor wants the solver to resolve an overlap with a partner
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionResponse {
    /// Report the contact but do not separate
    Ignore,
    /// Separate and cancel all velocity into the partner
    #[default]
    Stop,
    /// Separate, cancel normal velocity and keep friction-reduced tangential velocity
    Slide,
    /// Separate and reflect normal velocity scaled by restitution
    Bounce,
}

impl CollisionResponse {
    /// Whether this response moves the actor out of the partner
    pub fn separates(self) -> bool {
        !matches!(self, CollisionResponse::Ignore)
    }

    /// New velocity after a contact whose normal points away from the partner
    pub fn apply_to_velocity(self, velocity: Vec3, normal: Vec3, material: &PhysicsMaterial) -> Vec3 {
        let into_partner = velocity.dot(normal);
        if into_partner >= 0.0 {
            return velocity;
        }
        let normal_velocity = normal * into_partner;
        let tangent_velocity = velocity - normal_velocity;

        match self {
            CollisionResponse::Ignore => velocity,
            CollisionResponse::Stop => Vec3::ZERO,
            CollisionResponse::Slide => tangent_velocity * (1.0 - material.friction),
            CollisionResponse::Bounce => {
                tangent_velocity * (1.0 - material.friction) - normal_velocity * material.restitution
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLING_FORWARD: Vec3 = Vec3::new(4.0, -10.0, 0.0);

    #[test]
    fn test_stop_cancels_everything() {
        let v = CollisionResponse::Stop.apply_to_velocity(FALLING_FORWARD, Vec3::UP, &PhysicsMaterial::STONE);
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn test_slide_keeps_tangent() {
        let ice = PhysicsMaterial::ICE;
        let v = CollisionResponse::Slide.apply_to_velocity(FALLING_FORWARD, Vec3::UP, &ice);
        assert_eq!(v.y, 0.0);
        assert!((v.x - 4.0 * 0.95).abs() < 0.0001);
    }

    #[test]
    fn test_bounce_reflects_normal() {
        let bouncy = PhysicsMaterial::new(0.0, 0.5, crate::SurfaceKind::Metal);
        let v = CollisionResponse::Bounce.apply_to_velocity(FALLING_FORWARD, Vec3::UP, &bouncy);
        assert!((v.y - 5.0).abs() < 0.0001);
        assert_eq!(v.x, 4.0);
    }

    #[test]
    fn test_separating_velocity_untouched() {
        let rising = Vec3::new(0.0, 3.0, 0.0);
        for response in [CollisionResponse::Stop, CollisionResponse::Slide, CollisionResponse::Ignore] {
            assert_eq!(response.apply_to_velocity(rising, Vec3::UP, &PhysicsMaterial::STONE), rising);
        }
    }

    #[test]
    fn test_ignore_does_not_separate() {
        assert!(!CollisionResponse::Ignore.separates());
        assert!(CollisionResponse::Slide.separates());
    }
}
