//! Contact lists handed to actors after resolution

use strata_math::Vec3;

use crate::collision::Contact;
use crate::material::PhysicsMaterial;

/// One contact seen from the receiving actor
#[derive(Clone, Copy, Debug)]
pub struct CollisionInfo {
    pub point: Vec3,
    /// Points away from the partner, toward the receiver
    pub normal: Vec3,
    pub penetration: f32,
    /// Combined material of receiver and partner
    pub material: PhysicsMaterial,
}

impl CollisionInfo {
    pub fn from_contact(contact: &Contact, material: PhysicsMaterial) -> Self {
        Self {
            point: contact.point,
            normal: contact.normal,
            penetration: contact.penetration,
            material,
        }
    }

    /// The partner's view of the same contact
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            ..*self
        }
    }

    /// Contact normal is mostly up: the receiver is standing on the partner
    pub fn is_ground(&self) -> bool {
        self.normal.y > 0.7
    }
}

/// All contacts between one receiver and one partner for this pass
#[derive(Clone, Debug, Default)]
pub struct CollisionInfoList {
    infos: Vec<CollisionInfo>,
}

impl CollisionInfoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, info: CollisionInfo) {
        self.infos.push(info);
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionInfo> {
        self.infos.iter()
    }

    /// The contact with the largest penetration
    pub fn deepest(&self) -> Option<&CollisionInfo> {
        self.infos
            .iter()
            .max_by(|a, b| a.penetration.total_cmp(&b.penetration))
    }

    pub fn touches_ground(&self) -> bool {
        self.infos.iter().any(CollisionInfo::is_ground)
    }
}

impl FromIterator<CollisionInfo> for CollisionInfoList {
    fn from_iter<I: IntoIterator<Item = CollisionInfo>>(iter: I) -> Self {
        Self {
            infos: iter.into_iter().collect(),
        }
    }
}
