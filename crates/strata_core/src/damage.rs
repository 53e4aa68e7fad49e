//! Damage model
//!
//! [`compute_damage`] is the only place damage numbers are produced. It is a
//! pure function of the receiver's health, its vulnerability and the
//! incoming [`DamageInfo`], so identical inputs always give identical results.

use serde::{Deserialize, Serialize};
use strata_math::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    #[default]
    Physical,
    Fire,
    Ice,
    Electric,
    Poison,
    Crush,
}

impl DamageKind {
    pub const COUNT: usize = 6;

    fn index(self) -> usize {
        self as usize
    }
}

/// One hit, owned by whoever deals it
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    pub kind: DamageKind,
    pub amount: f32,
    /// Direction the hit travels in; zero for undirected damage
    pub direction: Vec3,
    /// Speed imparted along `direction` before resistance
    pub knockback: f32,
}

impl DamageInfo {
    pub fn new(kind: DamageKind, amount: f32) -> Self {
        Self {
            kind,
            amount,
            direction: Vec3::ZERO,
            knockback: 0.0,
        }
    }

    pub fn physical(amount: f32) -> Self {
        Self::new(DamageKind::Physical, amount)
    }

    pub fn with_knockback(mut self, direction: Vec3, knockback: f32) -> Self {
        self.direction = direction;
        self.knockback = knockback;
        self
    }
}

/// Per-kind damage multipliers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageVulnerability {
    multipliers: [f32; DamageKind::COUNT],
}

impl Default for DamageVulnerability {
    fn default() -> Self {
        Self::normal()
    }
}

impl DamageVulnerability {
    /// Every kind at full strength
    pub fn normal() -> Self {
        Self {
            multipliers: [1.0; DamageKind::COUNT],
        }
    }

    pub fn immune() -> Self {
        Self {
            multipliers: [0.0; DamageKind::COUNT],
        }
    }

    /// Negative multipliers are treated as immunity
    pub fn with(mut self, kind: DamageKind, multiplier: f32) -> Self {
        self.multipliers[kind.index()] = multiplier.max(0.0);
        self
    }

    pub fn multiplier(&self, kind: DamageKind) -> f32 {
        self.multipliers[kind.index()]
    }

    pub fn is_immune_to(&self, kind: DamageKind) -> bool {
        self.multiplier(kind) == 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub health: f32,
    pub max_health: f32,
    /// Fraction of knockback ignored, 0.0 to 1.0
    pub knockback_resistance: f32,
}

impl HealthInfo {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            knockback_resistance: 0.0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }
}

/// What a hit did
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageResult {
    pub applied: f32,
    pub remaining_health: f32,
    /// True only for the hit that took health from above zero to zero
    pub died: bool,
    /// Velocity change to apply to the receiver
    pub knockback: Vec3,
}

/// Who a damage source is, for reaction policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageOriginator {
    Player,
    Enemy,
    Environment,
}

/// Compute the result of `info` landing on a receiver
///
/// A receiver without health takes no damage and cannot die, but still
/// receives knockback unless it is immune to the damage kind.
pub fn compute_damage(
    health: Option<&HealthInfo>,
    vulnerability: &DamageVulnerability,
    info: &DamageInfo,
) -> DamageResult {
    let multiplier = vulnerability.multiplier(info.kind);
    let resistance = health.map_or(0.0, |h| h.knockback_resistance.clamp(0.0, 1.0));
    let knockback = if multiplier > 0.0 {
        info.direction.normalized() * info.knockback * (1.0 - resistance)
    } else {
        Vec3::ZERO
    };

    let Some(health) = health else {
        return DamageResult {
            applied: 0.0,
            remaining_health: 0.0,
            died: false,
            knockback,
        };
    };

    // A corpse takes no further hits or knockback
    if health.health <= 0.0 {
        return DamageResult {
            applied: 0.0,
            remaining_health: 0.0,
            died: false,
            knockback: Vec3::ZERO,
        };
    }

    let applied = (info.amount * multiplier).max(0.0);
    let remaining_health = (health.health - applied).max(0.0);
    DamageResult {
        applied,
        remaining_health,
        died: remaining_health == 0.0,
        knockback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_damage() {
        let health = HealthInfo::new(100.0);
        let result = compute_damage(Some(&health), &DamageVulnerability::normal(), &DamageInfo::physical(30.0));
        assert_eq!(result.applied, 30.0);
        assert_eq!(result.remaining_health, 70.0);
        assert!(!result.died);
    }

    #[test]
    fn test_lethal_damage_clamps_to_zero() {
        let mut health = HealthInfo::new(100.0);
        health.health = 10.0;
        let result = compute_damage(Some(&health), &DamageVulnerability::normal(), &DamageInfo::physical(30.0));
        assert_eq!(result.remaining_health, 0.0);
        assert!(result.died);
    }

    #[test]
    fn test_already_dead_does_not_die_again() {
        let mut health = HealthInfo::new(100.0);
        health.health = 0.0;
        let info = DamageInfo::physical(5.0).with_knockback(Vec3::X, 3.0);
        let result = compute_damage(Some(&health), &DamageVulnerability::normal(), &info);
        assert_eq!(result.remaining_health, 0.0);
        assert!(!result.died);
        assert_eq!(result.applied, 0.0);
        assert_eq!(result.knockback, Vec3::ZERO);
    }

    #[test]
    fn test_vulnerability_scales_and_immunity_blocks() {
        let health = HealthInfo::new(100.0);
        let vuln = DamageVulnerability::normal()
            .with(DamageKind::Fire, 2.0)
            .with(DamageKind::Ice, -1.0);
        let fire = compute_damage(Some(&health), &vuln, &DamageInfo::new(DamageKind::Fire, 10.0));
        assert_eq!(fire.applied, 20.0);

        let ice = DamageInfo::new(DamageKind::Ice, 10.0).with_knockback(Vec3::X, 5.0);
        let ice = compute_damage(Some(&health), &vuln, &ice);
        assert_eq!(ice.applied, 0.0);
        assert_eq!(ice.knockback, Vec3::ZERO);
        assert!(vuln.is_immune_to(DamageKind::Ice));
    }

    #[test]
    fn test_no_health_takes_no_damage() {
        let info = DamageInfo::physical(50.0).with_knockback(Vec3::new(0.0, 0.0, 2.0), 4.0);
        let result = compute_damage(None, &DamageVulnerability::normal(), &info);
        assert_eq!(result.applied, 0.0);
        assert_eq!(result.remaining_health, 0.0);
        assert!(!result.died);
        assert_eq!(result.knockback, Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_knockback_resistance() {
        let mut health = HealthInfo::new(100.0);
        health.knockback_resistance = 0.75;
        let info = DamageInfo::physical(1.0).with_knockback(Vec3::X, 8.0);
        let result = compute_damage(Some(&health), &DamageVulnerability::normal(), &info);
        assert_eq!(result.knockback, Vec3::new(2.0, 0.0, 0.0));
    }
}
