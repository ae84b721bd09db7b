//! Rigid-motion algebra for the Helix scene graph.
//!
//! - [`Dual`]: dual numbers `a + εb`, generic over scalars, vectors and quaternions
//! - [`DualQuat`] / [`DDualQuat`]: rigid transformations as dual quaternions,
//!   with screw linear interpolation ([`DualQuat::sclerp`])

pub mod dual;
pub mod dual_quaternion;
pub mod errors;

pub use dual::Dual;
pub use dual_quaternion::{DDualQuat, DualQuat};
pub use errors::MathError;
