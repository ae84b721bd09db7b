//! Dual Quaternions
//!
//! A dual quaternion `q = q₀ + ε·qₑ` encodes a rigid motion: the real part
//! `q₀` is a unit quaternion holding the rotation, the dual part
//! `qₑ = ½·t·q₀` holds the translation `t` applied after it.
//!
//! # Conventions
//!
//! - Products compose right to left like matrices: `a * b` applies `b` first.
//! - A dual quaternion is *normalized* when `|q₀| = 1` and `q₀·qₑ = 0`.
//!   Operations with a `_normalized` suffix assert that and take the cheap
//!   path; their general counterparts work on any input.
//! - [`DualQuat::sclerp`] interpolates along the screw axis between two
//!   transforms, [`DualQuat::sclerp_shortest_path`] additionally keeps the
//!   rotation at or below 180°.
//!
//! Both [`DualQuat`] (`f32`, over [`glam::Quat`]) and [`DDualQuat`] (`f64`,
//! over [`glam::DQuat`]) are generated from the same definition.

use std::ops::{Add, Div, Mul, MulAssign, Neg, Sub};

use bytemuck::{Pod, Zeroable};
use glam::{DMat3, DMat4, DQuat, DVec3, Mat3, Mat4, Quat, Vec3};

use crate::dual::Dual;
use crate::errors::{MathError, Result};

macro_rules! impl_dual_quaternion {
    ($dq:ident, $t:ty, $quat:ty, $vec3:ty, $mat3:ty, $mat4:ty, $epsilon:expr) => {
        /// Rigid transformation stored as a dual quaternion.
        #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
        #[repr(C)]
        pub struct $dq {
            /// Rotation part.
            pub real: $quat,
            /// Translation-encoding part, `½·t·real`.
            pub dual: $quat,
        }

        impl $dq {
            /// Fuzzy comparison tolerance used by the normalization and rigidity checks.
            pub const EPSILON: $t = $epsilon;

            /// The identity transformation.
            pub const IDENTITY: Self = Self {
                real: <$quat>::IDENTITY,
                dual: <$quat>::from_xyzw(0.0, 0.0, 0.0, 0.0),
            };

            /// All components zero. Not a valid transformation.
            pub const ZERO: Self = Self {
                real: <$quat>::from_xyzw(0.0, 0.0, 0.0, 0.0),
                dual: <$quat>::from_xyzw(0.0, 0.0, 0.0, 0.0),
            };

            #[inline]
            #[must_use]
            pub const fn from_real_dual(real: $quat, dual: $quat) -> Self {
                Self { real, dual }
            }

            /// Dual quaternion with a zero dual part.
            #[inline]
            #[must_use]
            pub const fn from_real(real: $quat) -> Self {
                Self {
                    real,
                    dual: <$quat>::from_xyzw(0.0, 0.0, 0.0, 0.0),
                }
            }

            /// Embeds a point as `[0, 1] + ε[v, 0]` for the sandwich product.
            #[inline]
            #[must_use]
            pub const fn from_vector(v: $vec3) -> Self {
                Self {
                    real: <$quat>::IDENTITY,
                    dual: <$quat>::from_xyzw(v.x, v.y, v.z, 0.0),
                }
            }

            /// Pure rotation of `angle` radians around `normalized_axis`.
            ///
            /// # Panics
            ///
            /// If the axis is not of unit length.
            #[must_use]
            pub fn from_axis_angle(normalized_axis: $vec3, angle: $t) -> Self {
                assert!(
                    (normalized_axis.length_squared() - 1.0).abs() < 2.0 * Self::EPSILON,
                    "DualQuat::from_axis_angle(): axis {normalized_axis:?} is not normalized"
                );
                Self::from_real(<$quat>::from_axis_angle(normalized_axis, angle))
            }

            /// Pure translation: identity real part, dual part `[v/2, 0]`.
            #[inline]
            #[must_use]
            pub fn from_translation(v: $vec3) -> Self {
                let half = v * 0.5;
                Self {
                    real: <$quat>::IDENTITY,
                    dual: <$quat>::from_xyzw(half.x, half.y, half.z, 0.0),
                }
            }

            /// Rotation followed by translation, `dual = [t/2, 0]·rotation`.
            #[inline]
            #[must_use]
            pub fn from_rotation_translation(rotation: $quat, translation: $vec3) -> Self {
                let half = translation * 0.5;
                Self {
                    real: rotation,
                    dual: <$quat>::from_xyzw(half.x, half.y, half.z, 0.0) * rotation,
                }
            }

            /// Converts a rigid transformation matrix.
            ///
            /// # Panics
            ///
            /// If the matrix is not a rigid transformation, see
            /// [`Self::is_rigid_transformation`].
            #[must_use]
            pub fn from_mat4(matrix: &$mat4) -> Self {
                assert!(
                    Self::is_rigid_transformation(matrix),
                    "DualQuat::from_mat4(): the matrix doesn't represent a rigid transformation"
                );
                Self::from_rigid_mat4(matrix)
            }

            /// Fallible variant of [`Self::from_mat4`].
            pub fn try_from_mat4(matrix: &$mat4) -> Result<Self> {
                if Self::is_rigid_transformation(matrix) {
                    Ok(Self::from_rigid_mat4(matrix))
                } else {
                    Err(MathError::NotRigidTransformation)
                }
            }

            /// Whether the matrix has an orthonormal, non-reflecting rotation
            /// block and a `(0, 0, 0, 1)` bottom row.
            #[must_use]
            pub fn is_rigid_transformation(matrix: &$mat4) -> bool {
                let bottom = matrix.row(3);
                if bottom.x.abs() >= Self::EPSILON
                    || bottom.y.abs() >= Self::EPSILON
                    || bottom.z.abs() >= Self::EPSILON
                    || (bottom.w - 1.0).abs() >= Self::EPSILON
                {
                    return false;
                }

                let rotation = <$mat3>::from_mat4(*matrix);
                let (x, y, z) = (rotation.x_axis, rotation.y_axis, rotation.z_axis);
                let unit = |v: $vec3| (v.length_squared() - 1.0).abs() < 2.0 * Self::EPSILON;
                unit(x)
                    && unit(y)
                    && unit(z)
                    && x.dot(y).abs() < Self::EPSILON
                    && y.dot(z).abs() < Self::EPSILON
                    && z.dot(x).abs() < Self::EPSILON
                    && rotation.determinant() > 0.0
            }

            fn from_rigid_mat4(matrix: &$mat4) -> Self {
                let rotation = <$quat>::from_mat3(&<$mat3>::from_mat4(*matrix));
                Self::from_rotation_translation(rotation, matrix.w_axis.truncate())
            }

            /// Rotation-translation matrix equivalent of this transformation.
            #[must_use]
            pub fn to_mat4(&self) -> $mat4 {
                <$mat4>::from_rotation_translation(self.real, self.translation())
            }

            /// The rotation part.
            #[inline]
            #[must_use]
            pub fn rotation(&self) -> $quat {
                self.real
            }

            /// The translation part, `2·(dual·real*)`.
            #[inline]
            #[must_use]
            pub fn translation(&self) -> $vec3 {
                (self.dual * self.real.conjugate()).xyz() * 2.0
            }

            /// `|q|² = q₀·q₀ + ε·2(q₀·qₑ)`
            #[inline]
            #[must_use]
            pub fn length_squared(&self) -> Dual<$t> {
                Dual::new(self.real.dot(self.real), 2.0 * self.real.dot(self.dual))
            }

            /// `|q| = |q₀| + ε·(q₀·qₑ)/|q₀|`
            #[inline]
            #[must_use]
            pub fn length(&self) -> Dual<$t> {
                let real = self.real.length();
                Dual::new(real, self.real.dot(self.dual) / real)
            }

            /// Whether the real part has unit length and the dual part is
            /// orthogonal to it.
            ///
            /// The dual tolerance is `EPSILON · max(|qₑ.v|, |qₑ.s|)`. It grows with
            /// large translations and shrinks with small ones, so a pure
            /// rotation must have an exactly orthogonal dual part.
            #[must_use]
            pub fn is_normalized(&self) -> bool {
                let length_squared = self.length_squared();
                let scale = self.dual.xyz().length().max(self.dual.w.abs());
                (length_squared.real - 1.0).abs() < 2.0 * Self::EPSILON
                    && length_squared.dual.abs() <= Self::EPSILON * scale
            }

            #[must_use]
            pub fn normalize(&self) -> Self {
                *self / self.length()
            }

            /// Conjugates both quaternions, `q₀* + ε·qₑ*`.
            #[inline]
            #[must_use]
            pub fn quaternion_conjugate(&self) -> Self {
                Self::from_real_dual(self.real.conjugate(), self.dual.conjugate())
            }

            /// Dual conjugation, `q₀ - ε·qₑ`.
            #[inline]
            #[must_use]
            pub fn dual_conjugate(&self) -> Self {
                Self::from_real_dual(self.real, -self.dual)
            }

            /// Both conjugations combined, `q₀* - ε·qₑ*`.
            #[inline]
            #[must_use]
            pub fn conjugate(&self) -> Self {
                Self::from_real_dual(self.real.conjugate(), -self.dual.conjugate())
            }

            /// `q⁻¹ = q* / |q|²`
            #[must_use]
            pub fn inverse(&self) -> Self {
                self.quaternion_conjugate() / self.length_squared()
            }

            /// Inverse of a normalized dual quaternion, which is just its
            /// quaternion conjugate.
            ///
            /// # Panics
            ///
            /// If the dual quaternion is not normalized.
            #[must_use]
            pub fn inverse_normalized(&self) -> Self {
                assert!(
                    self.is_normalized(),
                    "DualQuat::inverse_normalized(): dual quaternion must be normalized"
                );
                self.quaternion_conjugate()
            }

            /// Transforms a point with the full sandwich product
            /// `q·v·conj(q⁻¹)`. Works for non-normalized input.
            #[must_use]
            pub fn transform_point3(&self, point: $vec3) -> $vec3 {
                (*self * Self::from_vector(point) * self.inverse().dual_conjugate())
                    .dual
                    .xyz()
            }

            /// Transforms a point with `q·v·q̄`.
            ///
            /// # Panics
            ///
            /// If the dual quaternion is not normalized.
            #[must_use]
            pub fn transform_point3_normalized(&self, point: $vec3) -> $vec3 {
                assert!(
                    self.is_normalized(),
                    "DualQuat::transform_point3_normalized(): dual quaternion must be normalized"
                );
                (*self * Self::from_vector(point) * self.conjugate()).dual.xyz()
            }

            /// Screw linear interpolation from `self` (`t = 0`) to `end`
            /// (`t = 1`).
            ///
            /// When both rotations are identical or opposite the screw axis is
            /// undefined; the translation is then interpolated linearly and the
            /// rotation of `self` is kept.
            ///
            /// # Panics
            ///
            /// If either input is not normalized.
            #[must_use]
            pub fn sclerp(self, end: Self, t: $t) -> Self {
                self.screw_interpolate(end, t, false)
            }

            /// Like [`Self::sclerp`] but negates `end` when the rotations are
            /// more than 180° apart, so the rotation takes the shorter arc.
            ///
            /// The rotation axis of the result is then the negation of what
            /// [`Self::sclerp`] produces, and the translation follows the
            /// matching screw, so both the intermediate transforms and the
            /// `t = 1` value (`-end`) differ observably from the plain variant.
            ///
            /// # Panics
            ///
            /// If either input is not normalized.
            #[must_use]
            pub fn sclerp_shortest_path(self, end: Self, t: $t) -> Self {
                self.screw_interpolate(end, t, true)
            }

            fn screw_interpolate(self, end: Self, t: $t, shortest_path: bool) -> Self {
                assert!(
                    self.is_normalized() && end.is_normalized(),
                    "DualQuat::sclerp(): dual quaternions must be normalized"
                );

                let cos_half_angle = self.real.dot(end.real);
                if cos_half_angle.abs() >= 1.0 - Self::EPSILON {
                    let translation = self.translation().lerp(end.translation(), t);
                    return Self::from_translation(translation) * Self::from_real(self.real);
                }

                // l + εm = q_A*·q_B
                let end = if shortest_path && cos_half_angle < 0.0 { -end } else { end };
                let diff = self.quaternion_conjugate() * end;
                let (l, m) = (diff.real, diff.dual);

                // a/2 = acos(l_S) - ε·m_S/|l_V|
                let inv_r = 1.0 / l.xyz().length();
                let half_angle = Dual::new(l.w.clamp(-1.0, 1.0).acos(), -m.w * inv_r);

                // n = direction + ε·moment
                let direction = l.xyz() * inv_r;
                let moment = (m.xyz() - direction * (half_angle.dual * l.w)) * inv_r;

                let (sin, cos) = (half_angle * t).sin_cos();
                let real = direction * sin.real;
                let dual = direction * sin.dual + moment * sin.real;
                self * Self::from_real_dual(
                    <$quat>::from_xyzw(real.x, real.y, real.z, cos.real),
                    <$quat>::from_xyzw(dual.x, dual.y, dual.z, cos.dual),
                )
            }

            /// Component-wise comparison of both parts within `max_abs_diff`.
            #[must_use]
            pub fn abs_diff_eq(&self, rhs: Self, max_abs_diff: $t) -> bool {
                self.real.abs_diff_eq(rhs.real, max_abs_diff)
                    && self.dual.abs_diff_eq(rhs.dual, max_abs_diff)
            }
        }

        impl Default for $dq {
            fn default() -> Self {
                Self::IDENTITY
            }
        }

        impl From<$dq> for Dual<$quat> {
            fn from(dq: $dq) -> Self {
                Dual::new(dq.real, dq.dual)
            }
        }

        impl From<Dual<$quat>> for $dq {
            fn from(d: Dual<$quat>) -> Self {
                Self::from_real_dual(d.real, d.dual)
            }
        }

        /// Composition, `self` applied after `rhs`.
        impl Mul for $dq {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: Self) -> Self {
                Self {
                    real: self.real * rhs.real,
                    dual: self.real * rhs.dual + self.dual * rhs.real,
                }
            }
        }

        impl MulAssign for $dq {
            #[inline]
            fn mul_assign(&mut self, rhs: Self) {
                *self = *self * rhs;
            }
        }

        impl Mul<$t> for $dq {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: $t) -> Self {
                Self::from_real_dual(self.real * rhs, self.dual * rhs)
            }
        }

        impl Div<Dual<$t>> for $dq {
            type Output = Self;

            #[inline]
            fn div(self, rhs: Dual<$t>) -> Self {
                (Dual::<$quat>::from(self) / rhs).into()
            }
        }

        impl Add for $dq {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self::from_real_dual(self.real + rhs.real, self.dual + rhs.dual)
            }
        }

        impl Sub for $dq {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self::from_real_dual(self.real - rhs.real, self.dual - rhs.dual)
            }
        }

        impl Neg for $dq {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self::from_real_dual(-self.real, -self.dual)
            }
        }
    };
}

impl_dual_quaternion!(DualQuat, f32, Quat, Vec3, Mat3, Mat4, 1.0e-5);
impl_dual_quaternion!(DDualQuat, f64, DQuat, DVec3, DMat3, DMat4, 1.0e-14);
