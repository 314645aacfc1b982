//! Pixel units used by the calendar geometry.
//!
//! Row heights, scroll offsets and selection bounds are expressed in
//! physical pixels ([`Px`]). Configured distances such as the list's top
//! offset are given in density-independent pixels ([`Dp`]) and converted
//! through the process-wide [`SCALE_FACTOR`].
//!
//! ```
//! use tessera_calendar::metrics::{Dp, Px};
//!
//! let offset = Px::from(Dp(2.0));
//! assert_eq!(offset, Px(2));
//! assert_eq!(Px(70) - Px(20), Px(50));
//! ```

use std::{
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
    sync::OnceLock,
};

use parking_lot::RwLock;

/// Display scale factor used to convert [`Dp`] into [`Px`].
///
/// Left unset, conversions use a factor of `1.0`.
pub static SCALE_FACTOR: OnceLock<RwLock<f64>> = OnceLock::new();

/// Sets the process-wide scale factor.
pub fn set_scale_factor(scale_factor: f64) {
    let lock = SCALE_FACTOR.get_or_init(|| RwLock::new(1.0));
    *lock.write() = scale_factor;
}

fn scale_factor() -> f64 {
    SCALE_FACTOR.get().map(|lock| *lock.read()).unwrap_or(1.0)
}

/// A physical pixel value. Negative values are allowed for scroll offsets.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// Creates a pixel value.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Returns the raw value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Returns the value widened to `i64`, for scroll-position arithmetic.
    pub fn to_i64(self) -> i64 {
        i64::from(self.0)
    }

    /// Returns the value as `f32`.
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }

    /// Converts from an `f32`, saturating at the `i32` bounds.
    pub fn saturating_from_f32(value: f32) -> Self {
        let clamped = value.clamp(i32::MIN as f32, i32::MAX as f32);
        Px(clamped as i32)
    }
}

impl Add for Px {
    type Output = Px;

    fn add(self, rhs: Px) -> Px {
        Px(self.0 + rhs.0)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Px) {
        self.0 += rhs.0;
    }
}

impl Sub for Px {
    type Output = Px;

    fn sub(self, rhs: Px) -> Px {
        Px(self.0 - rhs.0)
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Px) {
        self.0 -= rhs.0;
    }
}

impl Mul<i32> for Px {
    type Output = Px;

    fn mul(self, rhs: i32) -> Px {
        Px(self.0 * rhs)
    }
}

impl Div<i32> for Px {
    type Output = Px;

    fn div(self, rhs: i32) -> Px {
        Px(self.0 / rhs)
    }
}

impl Neg for Px {
    type Output = Px;

    fn neg(self) -> Px {
        Px(-self.0)
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Px(value)
    }
}

impl From<Dp> for Px {
    fn from(dp: Dp) -> Self {
        Px((dp.0 * scale_factor()) as i32)
    }
}

/// A density-independent pixel value.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Dp(pub f64);

impl Dp {
    /// Creates a dp value.
    pub const fn new(value: f64) -> Self {
        Dp(value)
    }

    /// Converts to physical pixels with the current scale factor.
    pub fn to_px(self) -> Px {
        Px::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_arithmetic() {
        let a = Px(10);
        let b = Px(4);

        assert_eq!(a + b, Px(14));
        assert_eq!(a - b, Px(6));
        assert_eq!(a * 3, Px(30));
        assert_eq!(a / 3, Px(3));
        assert_eq!(-a, Px(-10));
    }

    #[test]
    fn test_saturating_from_f32() {
        assert_eq!(Px::saturating_from_f32(f32::MAX), Px(i32::MAX));
        assert_eq!(Px::saturating_from_f32(-12.7), Px(-12));
    }

    #[test]
    fn test_dp_without_scale_factor_is_identity() {
        // Tests never install a scale factor.
        assert_eq!(Dp(12.0).to_px(), Px(12));
    }
}
