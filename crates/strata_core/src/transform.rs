//! Transforms and the version token that invalidates cached bounds
//!
//! A [`Transform`] is the plain position/rotation/scale value. Actors keep it
//! inside a [`TransformState`], which bumps a version number whenever the
//! transform is marked dirty. Caches remember the version they were built
//! at and recompute lazily on the next read.

use std::cell::RefCell;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strata_math::{Aabb, Quat, Vec3};

/// Position, rotation and uniform scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    /// Local to world: scale, then rotate, then translate
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p * self.scale) + self.position
    }

    /// Like `transform_point` without the translation
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation.rotate(d * self.scale)
    }

    /// The transform that undoes this one
    pub fn inverse(&self) -> Self {
        let inv_scale = if self.scale.abs() > 1e-10 {
            1.0 / self.scale
        } else {
            1.0
        };
        let inv_rotation = self.rotation.conjugate();
        Self {
            position: inv_rotation.rotate(-self.position) * inv_scale,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }

    /// `self.compose(&other)` applies `other` first, then `self`
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            position: self.transform_point(other.position),
            rotation: self.rotation.compose(&other.rotation),
            scale: self.scale * other.scale,
        }
    }

    /// Local -Z in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation.rotate(-Vec3::Z)
    }

    /// World bounds of a local-space box
    pub fn transform_aabb(&self, local: &Aabb) -> Aabb {
        Aabb::from_points(local.corners().iter().map(|c| self.transform_point(*c)))
            .unwrap_or(*local)
    }
}

bitflags! {
    /// Which derived render state needs rebuilding
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        const NONE = 0;
        /// Position, rotation or scale changed
        const TRANSFORM = 1 << 0;
        /// Model or model parts changed
        const MODEL = 1 << 1;
        /// Surface materials changed
        const MATERIAL = 1 << 2;
        const ALL = Self::TRANSFORM.bits() | Self::MODEL.bits() | Self::MATERIAL.bits();
    }
}

/// A transform plus the version token caches compare against
#[derive(Clone, Debug, Default)]
pub struct TransformState {
    transform: Transform,
    version: u64,
}

impl TransformState {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            version: 0,
        }
    }

    pub fn get(&self) -> &Transform {
        &self.transform
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the value without invalidating; callers follow with `mark_dirty`
    pub(crate) fn put(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn mark_dirty(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// A value derived from a transform, rebuilt when the version moves on
#[derive(Debug)]
pub struct VersionedCache<T> {
    slot: RefCell<Option<(u64, T)>>,
}

impl<T> Default for VersionedCache<T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }
}

impl<T: Clone> VersionedCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value for `version`, computing it if stale
    pub fn get_or_update(&self, version: u64, compute: impl FnOnce() -> T) -> T {
        let mut slot = self.slot.borrow_mut();
        match slot.as_ref() {
            Some((v, value)) if *v == version => value.clone(),
            _ => {
                let value = compute();
                *slot = Some((version, value.clone()));
                value
            }
        }
    }

    pub fn invalidate(&self) {
        self.slot.borrow_mut().take();
    }

    pub fn is_valid_for(&self, version: u64) -> bool {
        matches!(self.slot.borrow().as_ref(), Some((v, _)) if *v == version)
    }
}

impl<T: Clone> Clone for VersionedCache<T> {
    fn clone(&self) -> Self {
        Self {
            slot: RefCell::new(self.slot.borrow().clone()),
        }
    }
}
