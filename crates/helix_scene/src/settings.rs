//! Serializable camera configuration.
//!
//! ```json
//! {
//!   "projection": { "type": "orthographic", "size": [8.0, 6.0], "near": 0.1, "far": 50.0 },
//!   "aspect_ratio_policy": "clip",
//!   "viewport": [800, 600]
//! }
//! ```
//!
//! Missing fields fall back to [`CameraSettings::default`].

use serde::{Deserialize, Serialize};

use crate::camera::AspectRatioPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectionSettings {
    Perspective { fov_degrees: f32, near: f32, far: f32 },
    Orthographic { size: [f32; 2], near: f32, far: f32 },
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self::Perspective {
            fov_degrees: 35.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub projection: ProjectionSettings,
    pub aspect_ratio_policy: AspectRatioPolicy,
    pub viewport: [u32; 2],
}
