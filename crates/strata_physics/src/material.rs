//! Surface materials for collision response and contact effects

use serde::{Serialize, Deserialize};

/// What a surface is made of; drives footstep and impact effects
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    #[default]
    Stone,
    Metal,
    Wood,
    Ice,
    Organic,
}

/// Physical properties of a collision surface
///
/// Friction is how much a sliding contact loses tangential speed;
/// restitution is how much normal speed a bouncing contact keeps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient (0.0 = ice, 1.0 = rubber)
    pub friction: f32,
    /// Restitution (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
    pub surface: SurfaceKind,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::STONE
    }
}

impl PhysicsMaterial {
    pub const STONE: Self = Self {
        friction: 0.7,
        restitution: 0.1,
        surface: SurfaceKind::Stone,
    };

    pub const METAL: Self = Self {
        friction: 0.3,
        restitution: 0.3,
        surface: SurfaceKind::Metal,
    };

    pub const WOOD: Self = Self {
        friction: 0.5,
        restitution: 0.2,
        surface: SurfaceKind::Wood,
    };

    pub const ICE: Self = Self {
        friction: 0.05,
        restitution: 0.1,
        surface: SurfaceKind::Ice,
    };

    /// Flesh and plants: grippy and dead
    pub const ORGANIC: Self = Self {
        friction: 0.8,
        restitution: 0.0,
        surface: SurfaceKind::Organic,
    };

    /// Values are clamped to the range [0.0, 1.0]
    pub fn new(friction: f32, restitution: f32, surface: SurfaceKind) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
            surface,
        }
    }

    /// Combine two materials for one contact
    ///
    /// Geometric mean for friction, maximum for restitution. The surface
    /// kind is the one being stood on or hit (`other`).
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.max(other.restitution),
            surface: other.surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let m = PhysicsMaterial::new(1.5, -0.2, SurfaceKind::Wood);
        assert_eq!(m.friction, 1.0);
        assert_eq!(m.restitution, 0.0);
    }

    #[test]
    fn test_combine_takes_other_surface() {
        let boot = PhysicsMaterial::ORGANIC;
        let floor = PhysicsMaterial::ICE;
        let combined = boot.combine(&floor);
        assert_eq!(combined.surface, SurfaceKind::Ice);
        assert!((combined.friction - (0.8f32 * 0.05).sqrt()).abs() < 0.0001);
        assert_eq!(combined.restitution, 0.1);
    }
}
