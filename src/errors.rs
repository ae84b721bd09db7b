//! Error Types
//!
//! [`HelixError`] wraps the errors of the member crates so applications can
//! use a single `?`-friendly type.
//!
//! ```rust
//! use helix::prelude::*;
//!
//! fn setup() -> helix::Result<Vec3> {
//!     let mut world = World::new();
//!     let scene = world.add_scene();
//!     let camera = world.add_camera(Some(scene));
//!     let light = world.add_light(Some(scene));
//!     world.activate_camera(camera, scene)?;
//!     Ok(world.light_position(light, camera)?)
//! }
//!
//! assert!(setup().is_ok());
//! ```

use thiserror::Error;

use helix_math::MathError;
use helix_scene::SceneError;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelixError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub type Result<T> = std::result::Result<T, HelixError>;
