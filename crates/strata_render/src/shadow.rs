//! Shadow policy queried by the shadow pass

use serde::{Deserialize, Serialize};

/// How a shadow ray treats hitting an actor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowHitResponse {
    /// Blocks light fully
    #[default]
    Opaque,
    /// Tints the shadow by the actor's translucency
    Translucent,
    /// Rays pass through
    PassThrough,
}

/// Whether and how an actor casts shadows
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowPolicy {
    pub casts: bool,
    pub hit_response: ShadowHitResponse,
    /// Beyond this camera distance the actor stops casting
    pub max_distance: f32,
}

impl Default for ShadowPolicy {
    fn default() -> Self {
        Self {
            casts: true,
            hit_response: ShadowHitResponse::Opaque,
            max_distance: 50.0,
        }
    }
}

impl ShadowPolicy {
    pub const NONE: Self = Self {
        casts: false,
        hit_response: ShadowHitResponse::PassThrough,
        max_distance: 0.0,
    };

    pub fn allows(&self, camera_distance: f32) -> bool {
        self.casts && camera_distance <= self.max_distance
    }
}
