//! Camera view volumes
//!
//! A frustum is six inward-facing planes. Visibility queries classify
//! bounding boxes as outside, straddling, or fully inside.

use crate::{Aabb, Plane, Vec3};

/// Result of classifying a volume against a frustum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
    /// Entirely outside at least one plane
    Outside,
    /// Crosses at least one plane
    Intersecting,
    /// On the inner side of every plane
    Inside,
}

impl Containment {
    /// True for anything not `Outside`
    pub fn is_visible(self) -> bool {
        !matches!(self, Containment::Outside)
    }
}

/// Six inward-facing planes: near, far, left, right, top, bottom
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Build a perspective frustum
    ///
    /// `forward` and `up` must be orthonormal. `fov_y` is the full vertical
    /// field of view in radians; `aspect` is width / height.
    pub fn perspective(
        position: Vec3,
        forward: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let right = forward.cross(up);
        let tan_v = (fov_y * 0.5).tan();
        let tan_h = tan_v * aspect;

        let right_edge = forward + right * tan_h;
        let left_edge = forward - right * tan_h;
        let top_edge = forward + up * tan_v;
        let bottom_edge = forward - up * tan_v;

        Self {
            planes: [
                Plane::from_point_normal(position + forward * near, forward),
                Plane::from_point_normal(position + forward * far, -forward),
                Plane::from_point_normal(position, left_edge.cross(up)),
                Plane::from_point_normal(position, up.cross(right_edge)),
                Plane::from_point_normal(position, top_edge.cross(right)),
                Plane::from_point_normal(position, right.cross(bottom_edge)),
            ],
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }

    /// Classify a box using the positive/negative vertex test per plane
    pub fn classify_aabb(&self, aabb: &Aabb) -> Containment {
        let center = aabb.center();
        let half = aabb.half_extents();
        let mut result = Containment::Inside;

        for plane in &self.planes {
            let reach = half.component_mul(plane.normal.sign());
            if plane.signed_distance(center + reach) < 0.0 {
                return Containment::Outside;
            }
            if plane.signed_distance(center - reach) < 0.0 {
                result = Containment::Intersecting;
            }
        }
        result
    }
}
