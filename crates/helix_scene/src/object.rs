use std::borrow::Cow;
use std::fmt;

use glam::Mat4;

use crate::ObjectKey;
use crate::camera::Camera;
use crate::draw::Drawable;
use crate::light::Light;
use crate::scene::SceneRoot;

/// Where a multiplied transformation is applied relative to the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformationType {
    /// Applied after the existing transformation, `M * T`.
    #[default]
    Global,
    /// Applied before the existing transformation, `T * M`.
    Local,
}

/// Per-kind data and clean behavior of an object.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Plain,
    Scene(SceneRoot),
    Camera(Camera),
    Light(Light),
}

/// A node of the transform tree.
///
/// # Hierarchy
///
/// - `parent`: `None` for detached roots, `Some(self)` for a scene root
/// - `children`: owned, in insertion order; removing the object removes them
///
/// # Dirty state
///
/// `dirty` marks the cached absolute-transformation-derived data (view
/// matrix, light position) as stale. Dirtiness spreads down to children on
/// write and cleanliness spreads up to parents on read, so a dirty object
/// never has a clean descendant that depends on it.
pub struct Object {
    pub(crate) name: Cow<'static, str>,
    pub(crate) parent: Option<ObjectKey>,
    pub(crate) children: Vec<ObjectKey>,
    pub(crate) transformation: Mat4,
    pub(crate) dirty: bool,
    pub(crate) kind: ObjectKind,
    pub(crate) drawable: Option<Box<dyn Drawable>>,
}

impl Object {
    pub(crate) fn new(kind: ObjectKind) -> Self {
        let name = match kind {
            ObjectKind::Plain => "Object",
            ObjectKind::Scene(_) => "Scene",
            ObjectKind::Camera(_) => "Camera",
            ObjectKind::Light(_) => "Light",
        };
        Self {
            name: Cow::Borrowed(name),
            parent: None,
            children: Vec::new(),
            transformation: Mat4::IDENTITY,
            dirty: true,
            kind,
            drawable: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent handle. A scene root returns its own handle.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<ObjectKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ObjectKey] {
        &self.children
    }

    /// Transformation relative to the parent.
    #[inline]
    #[must_use]
    pub fn transformation(&self) -> Mat4 {
        self.transformation
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn is_scene(&self) -> bool {
        matches!(self.kind, ObjectKind::Scene(_))
    }

    #[inline]
    #[must_use]
    pub fn has_drawable(&self) -> bool {
        self.drawable.is_some()
    }

    #[must_use]
    pub fn as_scene(&self) -> Option<&SceneRoot> {
        match &self.kind {
            ObjectKind::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            ObjectKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub(crate) fn as_scene_mut(&mut self) -> Option<&mut SceneRoot> {
        match &mut self.kind {
            ObjectKind::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub(crate) fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            ObjectKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub(crate) fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("transformation", &self.transformation)
            .field("dirty", &self.dirty)
            .field("kind", &self.kind)
            .field("drawable", &self.drawable.is_some())
            .finish()
    }
}
