//! Object arena and the transform tree.
//!
//! All objects of all scenes live in one [`World`]. Parent links and child
//! lists are plain keys into the arena, so reparenting and removal never move
//! object data.
//!
//! # Dirty/clean protocol
//!
//! - [`World::set_dirty`] marks an object and its whole subtree dirty. It
//!   stops descending at objects that are already dirty.
//! - [`World::set_clean`] collects the dirty chain up to the first clean
//!   ancestor, recomposes absolute transformations top-down and runs the
//!   per-kind clean step on each object.
//!
//! Both are iterative, so deep hierarchies do not grow the call stack.

use std::borrow::Cow;

use glam::{Mat4, Quat, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::ObjectKey;
use crate::draw::Drawable;
use crate::errors::{Result, SceneError};
use crate::object::{Object, ObjectKind, TransformationType};

/// Arena owning every object of every scene.
#[derive(Debug, Default)]
pub struct World {
    pub(crate) objects: SlotMap<ObjectKey, Object>,
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: SlotMap::with_capacity_and_key(capacity),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: ObjectKey) -> Option<&Object> {
        self.objects.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &Object)> {
        self.objects.iter()
    }

    // ========================================================================
    // Creation
    // ========================================================================

    pub(crate) fn insert(&mut self, parent: Option<ObjectKey>, kind: ObjectKind) -> ObjectKey {
        let key = self.objects.insert(Object::new(kind));
        if parent.is_some() && !self.set_parent(key, parent) {
            log::warn!("Object {key:?} created detached, parent {parent:?} was rejected");
        }
        key
    }

    /// Adds a plain object under `parent`, or detached if `parent` is `None`.
    pub fn add_object(&mut self, parent: Option<ObjectKey>) -> ObjectKey {
        self.insert(parent, ObjectKind::Plain)
    }

    /// Adds a plain object with a draw hook attached.
    pub fn add_drawable<D>(&mut self, parent: Option<ObjectKey>, drawable: D) -> ObjectKey
    where
        D: Drawable + 'static,
    {
        let key = self.insert(parent, ObjectKind::Plain);
        self.objects[key].drawable = Some(Box::new(drawable));
        key
    }

    /// Replaces the draw hook of an object. Returns `false` if it doesn't exist.
    pub fn set_drawable(&mut self, key: ObjectKey, drawable: Option<Box<dyn Drawable>>) -> bool {
        match self.objects.get_mut(key) {
            Some(object) => {
                object.drawable = drawable;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn name(&self, key: ObjectKey) -> Option<&str> {
        self.objects.get(key).map(Object::name)
    }

    pub fn set_name(&mut self, key: ObjectKey, name: impl Into<Cow<'static, str>>) {
        if let Some(object) = self.objects.get_mut(key) {
            object.name = name.into();
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Raw parent link. A scene root returns its own key.
    #[must_use]
    pub fn parent(&self, key: ObjectKey) -> Option<ObjectKey> {
        self.objects.get(key)?.parent
    }

    /// Parent in the tree, `None` for roots of either kind.
    pub(crate) fn up(&self, key: ObjectKey) -> Option<ObjectKey> {
        let parent = self.objects.get(key)?.parent?;
        (parent != key && self.objects.contains_key(parent)).then_some(parent)
    }

    #[must_use]
    pub fn children(&self, key: ObjectKey) -> &[ObjectKey] {
        match self.objects.get(key) {
            Some(object) => &object.children,
            None => &[],
        }
    }

    #[must_use]
    pub fn has_children(&self, key: ObjectKey) -> bool {
        !self.children(key).is_empty()
    }

    #[must_use]
    pub fn first_child(&self, key: ObjectKey) -> Option<ObjectKey> {
        self.children(key).first().copied()
    }

    #[must_use]
    pub fn last_child(&self, key: ObjectKey) -> Option<ObjectKey> {
        self.children(key).last().copied()
    }

    #[must_use]
    pub fn previous_sibling(&self, key: ObjectKey) -> Option<ObjectKey> {
        let siblings = self.children(self.up(key)?);
        let index = siblings.iter().position(|&sibling| sibling == key)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    #[must_use]
    pub fn next_sibling(&self, key: ObjectKey) -> Option<ObjectKey> {
        let siblings = self.children(self.up(key)?);
        let index = siblings.iter().position(|&sibling| sibling == key)?;
        siblings.get(index + 1).copied()
    }

    #[must_use]
    pub fn is_scene(&self, key: ObjectKey) -> bool {
        self.objects.get(key).is_some_and(Object::is_scene)
    }

    /// Scene the object belongs to, `None` if it is part of a detached tree.
    #[must_use]
    pub fn scene(&self, key: ObjectKey) -> Option<ObjectKey> {
        let mut current = key;
        loop {
            let object = self.objects.get(current)?;
            match object.parent {
                Some(parent) if parent == current => {
                    return object.is_scene().then_some(current);
                }
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Every object of the subtree rooted at `key`, root first.
    pub(crate) fn subtree(&self, key: ObjectKey) -> Vec<ObjectKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(object) = self.objects.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(object.children.iter().rev().copied());
        }
        out
    }

    /// Moves `key` under `parent`, or detaches it if `parent` is `None`.
    ///
    /// Rejected (returns `false`) when the parent is unchanged, when `key` is
    /// a scene root, when either object doesn't exist, or when `parent` is
    /// `key` itself or one of its descendants. On success the subtree is
    /// marked dirty and active cameras that left their scene are released.
    pub fn set_parent(&mut self, key: ObjectKey, parent: Option<ObjectKey>) -> bool {
        let Some(object) = self.objects.get(key) else {
            log::warn!("set_parent: object {key:?} not found");
            return false;
        };
        if object.parent == parent {
            return false;
        }
        if object.is_scene() {
            log::debug!("set_parent: scene root {key:?} cannot be reparented");
            return false;
        }

        // 1. Reject cycles by walking up from the new parent
        let mut current = parent;
        while let Some(ancestor) = current {
            if ancestor == key {
                log::debug!("set_parent: {parent:?} is {key:?} or one of its descendants");
                return false;
            }
            let Some(node) = self.objects.get(ancestor) else {
                log::warn!("set_parent: broken ancestor chain at {ancestor:?}");
                return false;
            };
            current = match node.parent {
                Some(next) if next == ancestor => None,
                next => next,
            };
        }

        // 2. Detach from the old parent
        let old_parent = object.parent;
        if let Some(old) = old_parent
            && let Some(node) = self.objects.get_mut(old)
        {
            node.children.retain(|&child| child != key);
        }

        // 3. Attach to the new one
        if let Some(new) = parent {
            self.objects[new].children.push(key);
        }
        self.objects[key].parent = parent;

        self.set_dirty(key);
        self.release_departed_cameras(key);
        true
    }

    /// Reparents `key` while keeping its absolute transformation.
    ///
    /// Both objects must be part of the same scene (or both detached).
    pub fn set_parent_keep_transformation(&mut self, key: ObjectKey, parent: ObjectKey) -> Result<bool> {
        if !self.contains(key) {
            return Err(SceneError::ObjectNotFound(key));
        }
        if !self.contains(parent) {
            return Err(SceneError::ObjectNotFound(parent));
        }
        if self.scene(key) != self.scene(parent) {
            return Err(SceneError::SceneMismatch(key, parent));
        }

        let transformation =
            self.world_transformation(parent).inverse() * self.world_transformation(key);
        if !self.set_parent(key, Some(parent)) {
            return Ok(false);
        }
        self.set_transformation(key, transformation);
        Ok(true)
    }

    /// Removes an object together with its subtree.
    pub fn remove(&mut self, key: ObjectKey) -> bool {
        if !self.contains(key) {
            return false;
        }
        if let Some(parent) = self.up(key) {
            self.objects[parent].children.retain(|&child| child != key);
        }

        let subtree = self.subtree(key);
        let removed: FxHashSet<ObjectKey> = subtree.iter().copied().collect();
        for &object in &subtree {
            let active = self
                .objects
                .get(object)
                .and_then(Object::as_camera)
                .and_then(|camera| camera.active);
            if let Some(scene) = active
                && !removed.contains(&scene)
            {
                self.release_camera(object, scene);
            }

            let watched = self.light(object).and_then(|light| light.camera);
            if let Some(camera) = watched
                && !removed.contains(&camera)
                && let Some(data) = self.camera_mut(camera)
            {
                data.watchers.retain(|watcher| *watcher != object);
            }
        }

        for object in subtree {
            self.objects.remove(object);
        }
        log::debug!("Removed {} object(s) rooted at {key:?}", removed.len());
        true
    }

    // ========================================================================
    // Transformation
    // ========================================================================

    #[must_use]
    pub fn transformation(&self, key: ObjectKey) -> Option<Mat4> {
        self.objects.get(key).map(Object::transformation)
    }

    /// Replaces the transformation relative to the parent and marks the
    /// subtree dirty. Ignored for scene roots, which stay at identity.
    pub fn set_transformation(&mut self, key: ObjectKey, transformation: Mat4) {
        let Some(object) = self.objects.get_mut(key) else {
            log::warn!("set_transformation: object {key:?} not found");
            return;
        };
        if object.is_scene() {
            log::debug!("Transformation of scene root {key:?} is fixed");
            return;
        }
        object.transformation = transformation;
        self.set_dirty(key);
    }

    pub fn multiply_transformation(&mut self, key: ObjectKey, matrix: Mat4, ty: TransformationType) {
        let Some(current) = self.transformation(key) else {
            return;
        };
        let transformation = match ty {
            TransformationType::Global => matrix * current,
            TransformationType::Local => current * matrix,
        };
        self.set_transformation(key, transformation);
    }

    pub fn translate(&mut self, key: ObjectKey, translation: Vec3, ty: TransformationType) {
        self.multiply_transformation(key, Mat4::from_translation(translation), ty);
    }

    /// Rotates by `angle` radians around a unit `axis`.
    pub fn rotate(&mut self, key: ObjectKey, axis: Vec3, angle: f32, ty: TransformationType) {
        self.multiply_transformation(key, Mat4::from_quat(Quat::from_axis_angle(axis, angle)), ty);
    }

    pub fn scale(&mut self, key: ObjectKey, scale: Vec3, ty: TransformationType) {
        self.multiply_transformation(key, Mat4::from_scale(scale), ty);
    }

    /// Product of transformations from the root down to `key`, uncached.
    pub(crate) fn world_transformation(&self, key: ObjectKey) -> Mat4 {
        let mut result = Mat4::IDENTITY;
        let mut current = Some(key);
        while let Some(object_key) = current {
            let Some(object) = self.objects.get(object_key) else {
                break;
            };
            result = object.transformation * result;
            current = self.up(object_key);
        }
        result
    }

    /// Absolute transformation of `key`.
    ///
    /// With a camera in the same scene the result is relative to that camera
    /// (premultiplied by its view matrix). A camera from another scene is
    /// ignored with a warning. Asking for the camera relative to itself gives
    /// identity.
    pub fn absolute_transformation(&mut self, key: ObjectKey, camera: Option<ObjectKey>) -> Option<Mat4> {
        if !self.contains(key) {
            return None;
        }
        if camera == Some(key) {
            return Some(Mat4::IDENTITY);
        }

        let world = self.world_transformation(key);
        let Some(camera) = camera else {
            return Some(world);
        };

        let scene = self.scene(key);
        if scene.is_none() || scene != self.scene(camera) {
            log::warn!("Camera {camera:?} is not part of the same scene as {key:?}, ignoring");
            return Some(world);
        }
        match self.camera_matrix(camera) {
            Some(view) => Some(view * world),
            None => {
                log::warn!("Object {camera:?} is not a camera, ignoring");
                Some(world)
            }
        }
    }

    /// Absolute transformations of many objects at once.
    ///
    /// Shared ancestors are composed only once. Entries for objects that
    /// don't exist are `None`.
    pub fn transformation_matrices(
        &mut self,
        objects: &[ObjectKey],
        camera: Option<ObjectKey>,
    ) -> Vec<Option<Mat4>> {
        let view = camera.and_then(|camera| self.camera_matrix(camera).map(|view| (camera, view)));
        let camera_scene = view.and_then(|(camera, _)| self.scene(camera));

        let mut memo: FxHashMap<ObjectKey, Mat4> = FxHashMap::default();
        objects
            .iter()
            .map(|&key| {
                if !self.contains(key) {
                    return None;
                }
                if let Some((camera, _)) = view
                    && camera == key
                {
                    return Some(Mat4::IDENTITY);
                }
                let world = self.memoized_world_transformation(key, &mut memo);
                match view {
                    Some((_, view)) if camera_scene.is_some() && self.scene(key) == camera_scene => {
                        Some(view * world)
                    }
                    _ => Some(world),
                }
            })
            .collect()
    }

    fn memoized_world_transformation(
        &self,
        key: ObjectKey,
        memo: &mut FxHashMap<ObjectKey, Mat4>,
    ) -> Mat4 {
        let mut chain: SmallVec<[ObjectKey; 16]> = SmallVec::new();
        let mut base = Mat4::IDENTITY;
        let mut current = Some(key);
        while let Some(object) = current {
            if let Some(&cached) = memo.get(&object) {
                base = cached;
                break;
            }
            chain.push(object);
            current = self.up(object);
        }
        for &object in chain.iter().rev() {
            base *= self.objects[object].transformation;
            memo.insert(object, base);
        }
        base
    }

    // ========================================================================
    // Dirty / clean
    // ========================================================================

    #[must_use]
    pub fn is_dirty(&self, key: ObjectKey) -> bool {
        self.objects.get(key).is_some_and(Object::is_dirty)
    }

    /// Marks `key` and its subtree dirty.
    ///
    /// Descent stops at already dirty objects. Cameras that became dirty
    /// propagate to their active scene (or let go of it if they left), dirty
    /// the lights that watch them and recompute their view matrix right away.
    pub fn set_dirty(&mut self, key: ObjectKey) {
        let mut cameras: SmallVec<[ObjectKey; 4]> = SmallVec::new();
        let mut stack: SmallVec<[ObjectKey; 16]> = SmallVec::new();
        let mut marked = 0usize;
        stack.push(key);

        while let Some(current) = stack.pop() {
            let Some(object) = self.objects.get_mut(current) else {
                continue;
            };
            if object.dirty {
                continue;
            }
            object.dirty = true;
            marked += 1;
            if matches!(object.kind, ObjectKind::Camera(_)) {
                cameras.push(current);
            }
            stack.extend(object.children.iter().copied());
        }
        if marked > 0 {
            log::trace!("Marked {marked} object(s) dirty from {key:?}");
        }

        for camera in cameras {
            self.camera_dirtied(camera);
        }
    }

    /// Recomputes cached data of `key` and its dirty ancestors.
    pub fn set_clean(&mut self, key: ObjectKey) {
        if !self.is_dirty(key) {
            return;
        }

        // 1. Collect the dirty chain, bottom-up
        let mut chain: SmallVec<[ObjectKey; 16]> = SmallVec::new();
        let mut base = Mat4::IDENTITY;
        let mut current = key;
        loop {
            chain.push(current);
            let Some(parent) = self.up(current) else {
                break;
            };
            if !self.objects[parent].dirty {
                base = self.world_transformation(parent);
                break;
            }
            current = parent;
        }

        log::trace!("Cleaning {} object(s) up to {key:?}", chain.len());

        // 2. Compose top-down and clean each object
        for &object in chain.iter().rev() {
            let Some(node) = self.objects.get(object) else {
                continue;
            };
            base *= node.transformation;
            self.clean_object(object, base);
        }
    }

    /// Per-kind clean step. The object is marked clean before its derived data
    /// is recomputed, so a light whose camera sits below it doesn't recurse.
    fn clean_object(&mut self, key: ObjectKey, absolute: Mat4) {
        let Some(object) = self.objects.get_mut(key) else {
            return;
        };
        if !object.dirty {
            return;
        }
        object.dirty = false;

        let watched = match &mut object.kind {
            ObjectKind::Camera(camera) => {
                camera.camera_matrix = absolute.inverse();
                return;
            }
            ObjectKind::Light(light) => light.camera,
            ObjectKind::Plain | ObjectKind::Scene(_) => return,
        };

        let position = self.light_position_for(key, watched, absolute);
        if let Some(light) = self.objects.get_mut(key).and_then(Object::as_light_mut) {
            light.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, y, z))
    }

    #[test]
    fn scene_root_is_its_own_parent() {
        let mut world = World::new();
        let scene = world.add_scene();
        assert_eq!(world.parent(scene), Some(scene));
        assert_eq!(world.scene(scene), Some(scene));
        assert!(world.is_scene(scene));
    }

    #[test]
    fn detached_objects_have_no_scene() {
        let mut world = World::new();
        let a = world.add_object(None);
        let b = world.add_object(Some(a));
        assert_eq!(world.parent(a), None);
        assert_eq!(world.scene(b), None);
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut world = World::new();
        let scene = world.add_scene();
        let a = world.add_object(Some(scene));
        let b = world.add_object(Some(scene));
        let c = world.add_object(Some(scene));

        assert_eq!(world.children(scene), &[a, b, c]);
        assert_eq!(world.first_child(scene), Some(a));
        assert_eq!(world.last_child(scene), Some(c));
        assert_eq!(world.next_sibling(a), Some(b));
        assert_eq!(world.previous_sibling(b), Some(a));
        assert_eq!(world.previous_sibling(a), None);
        assert_eq!(world.next_sibling(c), None);
        assert!(!world.has_children(a));
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut world = World::new();
        let a = world.add_object(None);
        let b = world.add_object(Some(a));
        let c = world.add_object(Some(b));

        assert!(!world.set_parent(a, Some(c)));
        assert!(!world.set_parent(a, Some(a)));
        assert_eq!(world.parent(a), None);
        assert_eq!(world.children(b), &[c]);
    }

    #[test]
    fn set_parent_rejects_same_parent_and_scene_roots() {
        let mut world = World::new();
        let scene = world.add_scene();
        let other = world.add_scene();
        let a = world.add_object(Some(scene));

        assert!(!world.set_parent(a, Some(scene)));
        assert!(!world.set_parent(scene, Some(other)));
        assert!(!world.set_parent(scene, None));
        assert_eq!(world.parent(scene), Some(scene));
    }

    #[test]
    fn set_parent_moves_between_child_lists() {
        let mut world = World::new();
        let a = world.add_object(None);
        let b = world.add_object(None);
        let c = world.add_object(Some(a));

        assert!(world.set_parent(c, Some(b)));
        assert!(world.children(a).is_empty());
        assert_eq!(world.children(b), &[c]);
        assert_eq!(world.parent(c), Some(b));

        assert!(world.set_parent(c, None));
        assert!(world.children(b).is_empty());
        assert_eq!(world.parent(c), None);
    }

    #[test]
    fn scene_root_transformation_is_fixed() {
        let mut world = World::new();
        let scene = world.add_scene();
        world.set_transformation(scene, translation(1.0, 2.0, 3.0));
        assert_eq!(world.transformation(scene), Some(Mat4::IDENTITY));
    }

    #[test]
    fn multiply_transformation_order() {
        let mut world = World::new();
        let a = world.add_object(None);
        let t = translation(1.0, 0.0, 0.0);
        let s = Mat4::from_scale(Vec3::splat(2.0));

        world.set_transformation(a, t);
        world.multiply_transformation(a, s, TransformationType::Global);
        assert_eq!(world.transformation(a), Some(s * t));

        world.set_transformation(a, t);
        world.multiply_transformation(a, s, TransformationType::Local);
        assert_eq!(world.transformation(a), Some(t * s));
    }

    #[test]
    fn absolute_transformation_composes_chain() {
        let mut world = World::new();
        let scene = world.add_scene();
        let a = world.add_object(Some(scene));
        let b = world.add_object(Some(a));
        world.set_transformation(a, translation(1.0, 0.0, 0.0));
        world.set_transformation(b, translation(0.0, 2.0, 0.0));

        assert_eq!(
            world.absolute_transformation(b, None),
            Some(translation(1.0, 2.0, 0.0))
        );
    }

    #[test]
    fn set_dirty_and_set_clean_cover_the_chain() {
        let mut world = World::new();
        let scene = world.add_scene();
        let a = world.add_object(Some(scene));
        let b = world.add_object(Some(a));
        let c = world.add_object(Some(a));

        world.set_clean(b);
        assert!(!world.is_dirty(scene));
        assert!(!world.is_dirty(a));
        assert!(!world.is_dirty(b));
        assert!(world.is_dirty(c));

        world.set_clean(c);
        world.set_dirty(a);
        assert!(world.is_dirty(a));
        assert!(world.is_dirty(b));
        assert!(world.is_dirty(c));
        assert!(!world.is_dirty(scene));
    }

    #[test]
    fn remove_drops_whole_subtree() {
        let mut world = World::new();
        let scene = world.add_scene();
        let a = world.add_object(Some(scene));
        let b = world.add_object(Some(a));
        let keep = world.add_object(Some(scene));

        assert!(world.remove(a));
        assert!(!world.contains(a));
        assert!(!world.contains(b));
        assert_eq!(world.children(scene), &[keep]);
        assert!(!world.remove(a));
    }

    #[test]
    fn keep_transformation_reparent() {
        let mut world = World::new();
        let scene = world.add_scene();
        let a = world.add_object(Some(scene));
        let b = world.add_object(Some(scene));
        world.set_transformation(a, translation(5.0, 0.0, 0.0));
        world.set_transformation(b, translation(0.0, 3.0, 0.0));

        assert_eq!(world.set_parent_keep_transformation(b, a), Ok(true));
        let absolute = world.absolute_transformation(b, None).unwrap_or_default();
        assert!(absolute.abs_diff_eq(translation(0.0, 3.0, 0.0), 1e-6));
        assert!(world.transformation(b).unwrap_or_default().abs_diff_eq(translation(-5.0, 3.0, 0.0), 1e-6));
    }

    #[test]
    fn keep_transformation_requires_same_scene() {
        let mut world = World::new();
        let scene = world.add_scene();
        let a = world.add_object(Some(scene));
        let detached = world.add_object(None);

        assert_eq!(
            world.set_parent_keep_transformation(detached, a),
            Err(SceneError::SceneMismatch(detached, a))
        );
    }

    #[test]
    fn batch_matrices_match_single_queries() {
        let mut world = World::new();
        let scene = world.add_scene();
        let a = world.add_object(Some(scene));
        let b = world.add_object(Some(a));
        let c = world.add_object(Some(a));
        world.set_transformation(a, translation(1.0, 0.0, 0.0));
        world.set_transformation(b, Mat4::from_rotation_z(0.5));
        world.set_transformation(c, translation(0.0, 0.0, -2.0));

        let batch = world.transformation_matrices(&[b, c, a], None);
        assert_eq!(batch[0], world.absolute_transformation(b, None));
        assert_eq!(batch[1], world.absolute_transformation(c, None));
        assert_eq!(batch[2], world.absolute_transformation(a, None));
    }
}
