use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ObjectKey;
use crate::errors::{Result, SceneError};
use crate::object::{Object, ObjectKind};
use crate::settings::{CameraSettings, ProjectionSettings};
use crate::world::World;

/// How the projection reacts to a non-square viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatioPolicy {
    /// Projection is used as-is and gets stretched.
    NotPreserved,
    /// The longer viewport side shows more of the scene.
    #[default]
    Extend,
    /// The longer viewport side shows less of the scene.
    Clip,
}

/// Camera data attached to a camera object.
///
/// The projection set by [`Camera::set_orthographic`] or
/// [`Camera::set_perspective`] is kept as the raw projection. The effective
/// projection is the raw one with the aspect ratio fix for the current
/// viewport applied in front of it.
///
/// The view matrix (inverse of the absolute transformation) is cached on the
/// camera object and read through [`World::camera_matrix`].
#[derive(Debug, Clone)]
pub struct Camera {
    raw_projection_matrix: Mat4,
    projection_matrix: Mat4,
    pub(crate) camera_matrix: Mat4,
    near: f32,
    far: f32,
    viewport: UVec2,
    aspect_ratio_policy: AspectRatioPolicy,

    /// Scene this camera is the active camera of.
    pub(crate) active: Option<ObjectKey>,
    /// Lights whose cached position is relative to this camera.
    pub(crate) watchers: SmallVec<[ObjectKey; 4]>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw_projection_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            camera_matrix: Mat4::IDENTITY,
            near: 0.0,
            far: 0.0,
            viewport: UVec2::ZERO,
            aspect_ratio_policy: AspectRatioPolicy::default(),
            active: None,
            watchers: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let mut camera = Self::new();
        camera.apply_settings(settings);
        camera
    }

    pub fn apply_settings(&mut self, settings: &CameraSettings) -> &mut Self {
        self.aspect_ratio_policy = settings.aspect_ratio_policy;
        self.viewport = UVec2::from(settings.viewport);
        match settings.projection {
            ProjectionSettings::Perspective { fov_degrees, near, far } => {
                self.set_perspective(fov_degrees.to_radians(), near, far)
            }
            ProjectionSettings::Orthographic { size, near, far } => {
                self.set_orthographic(Vec2::from(size), near, far)
            }
        }
    }

    /// Orthographic projection of a `size` wide box centered on the view axis.
    ///
    /// Maps `-near` and `-far` on the view axis to `-1` and `1`.
    pub fn set_orthographic(&mut self, size: Vec2, near: f32, far: f32) -> &mut Self {
        self.near = near;
        self.far = far;

        let z_scale = 2.0 / (near - far);
        self.raw_projection_matrix = Mat4::from_cols(
            Vec4::new(2.0 / size.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / size.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, z_scale, 0.0),
            Vec4::new(0.0, 0.0, near * z_scale - 1.0, 1.0),
        );
        self.fix_aspect_ratio();
        self
    }

    /// Perspective projection with a square aspect and `fov` in radians.
    pub fn set_perspective(&mut self, fov: f32, near: f32, far: f32) -> &mut Self {
        self.near = near;
        self.far = far;

        let xy_scale = 1.0 / (fov * 0.5).tan();
        let z_scale = 1.0 / (near - far);
        self.raw_projection_matrix = Mat4::from_cols(
            Vec4::new(xy_scale, 0.0, 0.0, 0.0),
            Vec4::new(0.0, xy_scale, 0.0, 0.0),
            Vec4::new(0.0, 0.0, (far + near) * z_scale, -1.0),
            Vec4::new(0.0, 0.0, 2.0 * far * near * z_scale, 0.0),
        );
        self.fix_aspect_ratio();
        self
    }

    pub fn set_viewport(&mut self, size: UVec2) -> &mut Self {
        self.viewport = size;
        self.fix_aspect_ratio();
        self
    }

    pub fn set_aspect_ratio_policy(&mut self, policy: AspectRatioPolicy) -> &mut Self {
        self.aspect_ratio_policy = policy;
        self.fix_aspect_ratio();
        self
    }

    fn fix_aspect_ratio(&mut self) {
        let (x, y) = (self.viewport.x, self.viewport.y);
        if self.aspect_ratio_policy == AspectRatioPolicy::NotPreserved || x == 0 || y == 0 {
            self.projection_matrix = self.raw_projection_matrix;
            return;
        }

        let (x, y) = (x as f32, y as f32);
        let extend = self.aspect_ratio_policy == AspectRatioPolicy::Extend;
        let scale = if (x > y) == extend {
            Vec3::new(y / x, 1.0, 1.0)
        } else {
            Vec3::new(1.0, x / y, 1.0)
        };
        self.projection_matrix = Mat4::from_scale(scale) * self.raw_projection_matrix;
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Projection without the aspect ratio fix.
    #[inline]
    #[must_use]
    pub fn raw_projection_matrix(&self) -> Mat4 {
        self.raw_projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn near(&self) -> f32 {
        self.near
    }

    #[inline]
    #[must_use]
    pub fn far(&self) -> f32 {
        self.far
    }

    #[inline]
    #[must_use]
    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    #[inline]
    #[must_use]
    pub fn aspect_ratio_policy(&self) -> AspectRatioPolicy {
        self.aspect_ratio_policy
    }

    /// Scene this camera is recorded as active for. May be stale; use
    /// [`World::active_camera`] for the validated view.
    #[inline]
    #[must_use]
    pub fn active_scene(&self) -> Option<ObjectKey> {
        self.active
    }
}

impl World {
    pub fn add_camera(&mut self, parent: Option<ObjectKey>) -> ObjectKey {
        self.insert(parent, ObjectKind::Camera(Camera::new()))
    }

    pub fn add_camera_with_settings(
        &mut self,
        parent: Option<ObjectKey>,
        settings: &CameraSettings,
    ) -> ObjectKey {
        self.insert(parent, ObjectKind::Camera(Camera::from_settings(settings)))
    }

    #[must_use]
    pub fn camera(&self, key: ObjectKey) -> Option<&Camera> {
        self.objects.get(key).and_then(Object::as_camera)
    }

    /// Mutable camera data. Projection and viewport changes don't touch the
    /// dirty state.
    pub fn camera_mut(&mut self, key: ObjectKey) -> Option<&mut Camera> {
        self.objects.get_mut(key).and_then(Object::as_camera_mut)
    }

    /// View matrix of a camera, recomputed first if the camera is dirty.
    pub fn camera_matrix(&mut self, key: ObjectKey) -> Option<Mat4> {
        self.camera(key)?;
        self.set_clean(key);
        self.camera(key).map(|camera| camera.camera_matrix)
    }

    /// Makes `camera` the active camera of `scene`.
    ///
    /// Returns `Ok(false)` without changes if it already is, or if the camera
    /// isn't part of that scene. A camera active in another scene is released
    /// from it first.
    pub fn activate_camera(&mut self, camera: ObjectKey, scene: ObjectKey) -> Result<bool> {
        let Some(object) = self.objects.get(camera) else {
            return Err(SceneError::ObjectNotFound(camera));
        };
        let Some(data) = object.as_camera() else {
            return Err(SceneError::NotACamera(camera));
        };
        let current = data.active;
        match self.objects.get(scene) {
            None => return Err(SceneError::ObjectNotFound(scene)),
            Some(object) if !object.is_scene() => return Err(SceneError::NotAScene(scene)),
            Some(_) => {}
        }

        if current == Some(scene) && self.active_camera(scene) == Some(camera) {
            return Ok(false);
        }
        if self.scene(camera) != Some(scene) {
            log::warn!("Camera {camera:?} is not part of scene {scene:?}, not activating");
            return Ok(false);
        }

        Ok(self.set_camera(scene, Some(camera)))
    }

    /// Clears the link between `camera` and `scene` on whichever side still
    /// holds it.
    pub(crate) fn release_camera(&mut self, camera: ObjectKey, scene: ObjectKey) {
        if let Some(data) = self.camera_mut(camera)
            && data.active == Some(scene)
        {
            data.active = None;
        }
        if let Some(root) = self.objects.get_mut(scene).and_then(Object::as_scene_mut)
            && root.camera == Some(camera)
        {
            root.camera = None;
            log::debug!("Camera {camera:?} released from scene {scene:?}");
        }
    }

    /// Releases active cameras in the subtree of `key` that are no longer in
    /// their scene.
    pub(crate) fn release_departed_cameras(&mut self, key: ObjectKey) {
        for object in self.subtree(key) {
            let Some(scene) = self.camera(object).and_then(|camera| camera.active) else {
                continue;
            };
            if self.scene(object) != Some(scene) {
                self.release_camera(object, scene);
            }
        }
    }

    /// Follow-up for a camera that just became dirty.
    pub(crate) fn camera_dirtied(&mut self, camera: ObjectKey) {
        let Some(data) = self.camera(camera) else {
            return;
        };
        let active = data.active;
        let watchers = data.watchers.clone();

        if let Some(scene) = active {
            if self.contains(scene) && self.scene(camera) == Some(scene) {
                self.set_dirty(scene);
            } else {
                self.release_camera(camera, scene);
            }
        }

        let mut stale: SmallVec<[ObjectKey; 4]> = SmallVec::new();
        for light in watchers {
            let watching = self
                .light(light)
                .is_some_and(|data| data.camera == Some(camera));
            if watching {
                self.set_dirty(light);
            } else {
                stale.push(light);
            }
        }
        if !stale.is_empty()
            && let Some(data) = self.camera_mut(camera)
        {
            data.watchers.retain(|light| !stale.contains(light));
        }

        self.set_clean(camera);
    }
}
