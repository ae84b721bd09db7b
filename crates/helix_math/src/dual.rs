//! Dual Numbers
//!
//! A dual number is a pair `a + εb` with `ε² = 0`. Evaluating a function on a
//! dual number yields the value in the real part and the first derivative
//! (scaled by `b`) in the dual part, which is exactly what screw interpolation
//! needs to carry the translation along a rotation.
//!
//! [`Dual`] is generic so the same type serves scalars (`Dual<f32>`), vectors
//! (`Dual<Vec3>`) and quaternions (`Dual<Quat>`). Multiplication keeps operand
//! order, so non-commutative element types stay correct.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Dual number `real + ε·dual`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dual<T> {
    pub real: T,
    pub dual: T,
}

impl<T> Dual<T> {
    #[inline]
    #[must_use]
    pub const fn new(real: T, dual: T) -> Self {
        Self { real, dual }
    }
}

impl<T: Neg<Output = T>> Dual<T> {
    /// Dual conjugation, `a - εb`.
    #[inline]
    #[must_use]
    pub fn conjugate(self) -> Self {
        Self::new(self.real, -self.dual)
    }
}

impl<T: Add<Output = T>> Add for Dual<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.real + rhs.real, self.dual + rhs.dual)
    }
}

impl<T: Add<Output = T> + Copy> AddAssign for Dual<T> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Sub<Output = T>> Sub for Dual<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.real - rhs.real, self.dual - rhs.dual)
    }
}

impl<T: Sub<Output = T> + Copy> SubAssign for Dual<T> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Neg<Output = T>> Neg for Dual<T> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.real, -self.dual)
    }
}

/// `(a + εb)(c + εd) = ac + ε(ad + bc)`
impl<T, U> Mul<Dual<U>> for Dual<T>
where
    T: Mul<U, Output = T> + Add<Output = T> + Copy,
    U: Copy,
{
    type Output = Dual<T>;

    #[inline]
    fn mul(self, rhs: Dual<U>) -> Dual<T> {
        Dual::new(
            self.real * rhs.real,
            self.real * rhs.dual + self.dual * rhs.real,
        )
    }
}

/// `(a + εb)/(c + εd) = a/c + ε(bc - ad)/c²`
impl<T, U> Div<Dual<U>> for Dual<T>
where
    T: Div<U, Output = T> + Mul<U, Output = T> + Sub<Output = T> + Copy,
    U: Mul<Output = U> + Copy,
{
    type Output = Dual<T>;

    #[inline]
    fn div(self, rhs: Dual<U>) -> Dual<T> {
        Dual::new(
            self.real / rhs.real,
            (self.dual * rhs.real - self.real * rhs.dual) / (rhs.real * rhs.real),
        )
    }
}

macro_rules! impl_dual_float {
    ($t:ty) => {
        impl Dual<$t> {
            /// Square root, `√a + ε·b/(2√a)`.
            #[inline]
            #[must_use]
            pub fn sqrt(self) -> Self {
                let root = self.real.sqrt();
                Self::new(root, self.dual / (2.0 * root))
            }

            /// Sine and cosine of a dual angle in radians.
            ///
            /// `sin(a + εb) = sin a + ε·b·cos a`, `cos(a + εb) = cos a - ε·b·sin a`
            #[inline]
            #[must_use]
            pub fn sin_cos(self) -> (Self, Self) {
                let (sin, cos) = self.real.sin_cos();
                (
                    Self::new(sin, self.dual * cos),
                    Self::new(cos, -self.dual * sin),
                )
            }
        }

        impl Mul<$t> for Dual<$t> {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: $t) -> Self {
                Self::new(self.real * rhs, self.dual * rhs)
            }
        }

        impl Mul<Dual<$t>> for $t {
            type Output = Dual<$t>;

            #[inline]
            fn mul(self, rhs: Dual<$t>) -> Dual<$t> {
                Dual::new(self * rhs.real, self * rhs.dual)
            }
        }
    };
}

impl_dual_float!(f32);
impl_dual_float!(f64);
