use glam::{Mat4, Vec3};

use crate::ObjectKey;
use crate::errors::{Result, SceneError};
use crate::object::{Object, ObjectKind};
use crate::world::World;

/// Light data attached to a light object.
///
/// The position is cached relative to the camera the light was last queried
/// with, and recomputed on clean.
#[derive(Debug, Clone, Default)]
pub struct Light {
    pub(crate) camera: Option<ObjectKey>,
    pub(crate) position: Vec3,
}

impl Light {
    /// Camera the cached position is relative to.
    #[inline]
    #[must_use]
    pub fn camera(&self) -> Option<ObjectKey> {
        self.camera
    }

    /// Last computed position, possibly stale.
    #[inline]
    #[must_use]
    pub fn cached_position(&self) -> Vec3 {
        self.position
    }
}

impl World {
    pub fn add_light(&mut self, parent: Option<ObjectKey>) -> ObjectKey {
        self.insert(parent, ObjectKind::Light(Light::default()))
    }

    #[must_use]
    pub fn light(&self, key: ObjectKey) -> Option<&Light> {
        self.objects.get(key).and_then(Object::as_light)
    }

    /// Position of `light` relative to `camera`.
    ///
    /// Both must be part of the same scene. Switching to another camera
    /// re-registers the light with it and marks the light dirty.
    pub fn light_position(&mut self, light: ObjectKey, camera: ObjectKey) -> Result<Vec3> {
        let Some(object) = self.objects.get(light) else {
            return Err(SceneError::ObjectNotFound(light));
        };
        let Some(current) = object.as_light().map(Light::camera) else {
            return Err(SceneError::NotALight(light));
        };
        match self.objects.get(camera) {
            None => return Err(SceneError::ObjectNotFound(camera)),
            Some(object) if object.as_camera().is_none() => {
                return Err(SceneError::NotACamera(camera));
            }
            Some(_) => {}
        }

        let Some(scene) = self.scene(light) else {
            return Err(SceneError::NotInScene(light));
        };
        if self.scene(camera) != Some(scene) {
            return Err(SceneError::SceneMismatch(light, camera));
        }

        if current != Some(camera) {
            if let Some(previous) = current
                && let Some(data) = self.camera_mut(previous)
            {
                data.watchers.retain(|watcher| *watcher != light);
            }
            if let Some(data) = self.camera_mut(camera)
                && !data.watchers.contains(&light)
            {
                data.watchers.push(light);
            }
            if let Some(data) = self.objects.get_mut(light).and_then(Object::as_light_mut) {
                data.camera = Some(camera);
            }
            log::trace!("Light {light:?} now follows camera {camera:?}");
            self.set_dirty(light);
        }

        self.set_clean(light);
        self.light(light)
            .map(Light::cached_position)
            .ok_or(SceneError::ObjectNotFound(light))
    }

    /// Clean step of a light: its translation in the view space of `camera`,
    /// or in world space if the camera is gone or in another scene.
    ///
    /// The view space position is the translation column of
    /// `camera_matrix · absolute`, with the camera matrix applied last.
    pub(crate) fn light_position_for(
        &mut self,
        light: ObjectKey,
        camera: Option<ObjectKey>,
        absolute: Mat4,
    ) -> Vec3 {
        let view = camera
            .filter(|&camera| {
                let scene = self.scene(light);
                scene.is_some() && self.scene(camera) == scene
            })
            .and_then(|camera| self.camera_matrix(camera));

        match view {
            Some(view) => (view * absolute).w_axis.truncate(),
            None => absolute.w_axis.truncate(),
        }
    }
}
