use thiserror::Error;

use crate::ObjectKey;

/// Errors raised by scene-graph operations that need a particular object
/// kind or a particular placement in the tree.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    #[error("Object {0:?} not found")]
    ObjectNotFound(ObjectKey),

    #[error("Object {0:?} is not a camera")]
    NotACamera(ObjectKey),

    #[error("Object {0:?} is not a light")]
    NotALight(ObjectKey),

    #[error("Object {0:?} is not a scene")]
    NotAScene(ObjectKey),

    #[error("Object {0:?} is not part of any scene")]
    NotInScene(ObjectKey),

    #[error("Objects {0:?} and {1:?} are not part of the same scene")]
    SceneMismatch(ObjectKey, ObjectKey),
}

pub type Result<T> = std::result::Result<T, SceneError>;
