//! Helix
//!
//! Rigid-motion algebra and a lazily cached transform scene graph.
//!
//! - [`math`]: dual numbers and dual quaternions with screw interpolation
//! - [`scene`]: object hierarchy, cameras, lights and draw hooks
//!
//! ```rust
//! use helix::prelude::*;
//!
//! let mut world = World::new();
//! let scene = world.add_scene();
//! let arm = world.add_object(Some(scene));
//! let camera = world.add_camera(Some(arm));
//! world.activate_camera(camera, scene).unwrap();
//!
//! world.translate(arm, Vec3::new(1.0, 0.0, 0.0), TransformationType::Global);
//! let view = world.camera_matrix(camera).unwrap();
//! assert!(view.w_axis.truncate().abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-6));
//! ```

pub mod errors;

pub use helix_math as math;
pub use helix_scene as scene;

pub use errors::{HelixError, Result};
pub use helix_math::{DDualQuat, Dual, DualQuat, MathError};
pub use helix_scene::{
    AspectRatioPolicy, Camera, CameraSettings, CameraView, Drawable, Light, Object, ObjectKey,
    ObjectKind, ProjectionSettings, RenderTarget, SceneError, SceneRoot, TransformationType, World,
};

pub mod prelude {
    pub use crate::errors::HelixError;
    pub use glam::{Mat4, Quat, UVec2, Vec2, Vec3};
    pub use helix_math::{DDualQuat, Dual, DualQuat};
    pub use helix_scene::{
        AspectRatioPolicy, CameraSettings, CameraView, Drawable, ObjectKey, ProjectionSettings,
        RenderTarget, TransformationType, World,
    };
}
