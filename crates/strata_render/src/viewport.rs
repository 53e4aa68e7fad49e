//! Viewports: one camera rendered into a region of the target

use crate::camera::Camera;
use strata_math::Frustum;

/// A camera and the pixel size of the region it renders into
#[derive(Clone, Debug)]
pub struct Viewport {
    pub index: usize,
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(index: usize, camera: Camera, width: u32, height: u32) -> Self {
        Self {
            index,
            camera,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn frustum(&self) -> Frustum {
        self.camera.frustum(self.aspect())
    }
}
