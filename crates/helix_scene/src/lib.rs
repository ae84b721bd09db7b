//! Helix Scene
//!
//! A transform tree with lazily cached absolute transformations.
//!
//! Objects live in a [`World`] arena and are addressed by [`ObjectKey`].
//! Every object carries a transformation relative to its parent. A tree whose
//! root is a scene object forms a scene; objects outside any scene are
//! detached.
//!
//! Writes mark the changed object and its subtree dirty. Reads of derived
//! data (the camera view matrix, the light position) walk up to the nearest
//! clean ancestor, recompose the absolute transformation once and mark the
//! chain clean again.
//!
//! # Object kinds
//!
//! - [`ObjectKind::Plain`]: transformation only
//! - [`ObjectKind::Scene`]: scene root, holds the active camera
//! - [`ObjectKind::Camera`]: projection, viewport and cached view matrix
//! - [`ObjectKind::Light`]: cached position relative to a camera

pub mod camera;
pub mod draw;
pub mod errors;
pub mod light;
pub mod object;
pub mod scene;
pub mod settings;
pub mod world;

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of an object in a [`World`].
    pub struct ObjectKey;
}

pub use camera::{AspectRatioPolicy, Camera};
pub use draw::{CameraView, Drawable, RenderTarget};
pub use errors::{Result, SceneError};
pub use light::Light;
pub use object::{Object, ObjectKind, TransformationType};
pub use scene::SceneRoot;
pub use settings::{CameraSettings, ProjectionSettings};
pub use world::World;
