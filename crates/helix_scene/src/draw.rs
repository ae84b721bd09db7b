//! Draw hooks.
//!
//! The scene graph doesn't render anything itself. [`World::draw`] walks a
//! scene and hands each object that has a [`Drawable`] its accumulated
//! transformation and a snapshot of the active camera.
//!
//! [`World::draw`]: crate::World::draw

use glam::{Mat4, UVec2};

use crate::ObjectKey;

/// Camera state passed to draw hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub camera: ObjectKey,
    pub projection_matrix: Mat4,
    /// View matrix, inverse of the camera's absolute transformation.
    pub camera_matrix: Mat4,
    pub viewport: UVec2,
}

impl CameraView {
    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.camera_matrix
    }
}

/// Per-object draw hook.
pub trait Drawable {
    /// `transformation` is the object's transformation relative to the camera.
    fn draw(&mut self, transformation: &Mat4, camera: &CameraView);
}

/// Whatever a scene draws into. Cleared once before each draw.
pub trait RenderTarget {
    fn clear(&mut self);
}

/// Drawing without a target to clear.
impl RenderTarget for () {
    fn clear(&mut self) {}
}
