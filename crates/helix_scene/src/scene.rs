use glam::Mat4;

use crate::ObjectKey;
use crate::camera::Camera;
use crate::draw::{CameraView, RenderTarget};
use crate::object::{Object, ObjectKind};
use crate::world::World;

/// Scene root data.
#[derive(Debug, Clone, Default)]
pub struct SceneRoot {
    pub(crate) camera: Option<ObjectKey>,
}

impl SceneRoot {
    /// Recorded active camera. May be stale; use [`World::active_camera`].
    #[inline]
    #[must_use]
    pub fn camera(&self) -> Option<ObjectKey> {
        self.camera
    }
}

impl World {
    /// Adds a scene root. It is its own parent and keeps an identity
    /// transformation.
    pub fn add_scene(&mut self) -> ObjectKey {
        self.objects.insert_with_key(|key| {
            let mut object = Object::new(ObjectKind::Scene(SceneRoot::default()));
            object.parent = Some(key);
            object
        })
    }

    /// Active camera of `scene`, if the link is still valid on both sides.
    #[must_use]
    pub fn active_camera(&self, scene: ObjectKey) -> Option<ObjectKey> {
        let camera = self.objects.get(scene)?.as_scene()?.camera?;
        self.camera(camera)
            .is_some_and(|data| data.active == Some(scene))
            .then_some(camera)
    }

    /// Sets or clears the active camera of `scene`.
    ///
    /// A no-op if the camera is unchanged or isn't part of the scene. The new
    /// camera takes over the viewport of the previous one, and the scene is
    /// marked dirty.
    pub fn set_camera(&mut self, scene: ObjectKey, camera: Option<ObjectKey>) -> bool {
        let Some(current) = self.objects.get(scene).and_then(Object::as_scene).map(SceneRoot::camera) else {
            log::warn!("set_camera: {scene:?} is not a scene");
            return false;
        };
        if current == camera {
            return false;
        }
        if let Some(camera) = camera {
            if self.camera(camera).is_none() {
                log::warn!("set_camera: {camera:?} is not a camera");
                return false;
            }
            if self.scene(camera) != Some(scene) {
                log::debug!("set_camera: camera {camera:?} is not part of scene {scene:?}");
                return false;
            }
        }

        let previous = current.filter(|&previous| self.camera(previous).is_some());
        let viewport = previous.and_then(|previous| self.camera(previous)).map(Camera::viewport);

        // 1. Take the new camera over from wherever it was active
        if let Some(camera) = camera {
            if let Some(other) = self.camera(camera).and_then(|data| data.active)
                && other != scene
            {
                self.release_camera(camera, other);
            }
            if let Some(data) = self.camera_mut(camera) {
                data.active = Some(scene);
                if let Some(viewport) = viewport {
                    data.set_viewport(viewport);
                }
            }
        }

        // 2. Deactivate the old one
        if let Some(previous) = previous
            && let Some(data) = self.camera_mut(previous)
            && data.active == Some(scene)
        {
            data.active = None;
        }

        if let Some(root) = self.objects.get_mut(scene).and_then(Object::as_scene_mut) {
            root.camera = camera;
        }
        log::debug!("Scene {scene:?} active camera {current:?} -> {camera:?}");

        self.set_dirty(scene);
        if let Some(camera) = camera {
            self.set_clean(camera);
        }
        true
    }

    /// Draws `scene` through its active camera.
    ///
    /// Clears `target`, then visits the scene depth-first in child order and
    /// calls every draw hook with the object's transformation relative to the
    /// camera. Does nothing without an active camera.
    pub fn draw(&mut self, scene: ObjectKey, target: &mut dyn RenderTarget) {
        let Some(camera) = self.active_camera(scene) else {
            log::trace!("Scene {scene:?} has no active camera, skipping draw");
            return;
        };
        let Some(camera_matrix) = self.camera_matrix(camera) else {
            return;
        };
        let Some(data) = self.camera(camera) else {
            return;
        };
        let view = CameraView {
            camera,
            projection_matrix: data.projection_matrix(),
            camera_matrix,
            viewport: data.viewport(),
        };

        target.clear();

        let mut stack: Vec<(ObjectKey, Mat4)> = self
            .children(scene)
            .iter()
            .rev()
            .map(|&child| (child, camera_matrix))
            .collect();
        while let Some((key, parent_matrix)) = stack.pop() {
            let Some(object) = self.objects.get_mut(key) else {
                continue;
            };
            let matrix = parent_matrix * object.transformation;
            if let Some(drawable) = object.drawable.as_mut() {
                drawable.draw(&matrix, &view);
            }
            stack.extend(object.children.iter().rev().map(|&child| (child, matrix)));
        }
    }
}
