//! Fixed-point math for legacy-accurate rendering
//!
//! The legacy renderer did all of its object math in 16.16 scaled integers:
//! - 1 sign bit, 15 integer bits (range -32768 to +32767.99998)
//! - 16 fractional bits (precision: 1/65536 ≈ 0.0000153)
//! - products are formed in 64-bit and shifted back down (truncating)
//!
//! Every operation here is plain integer arithmetic, so results are
//! reproducible bit-for-bit on every platform.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use super::constants::{FIXED_ONE, FRAC_BITS};

/// Fixed-point number in 16.16 format stored in an i32
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed32(pub i32);

impl Fixed32 {
    pub const ZERO: Fixed32 = Fixed32(0);
    pub const ONE: Fixed32 = Fixed32(FIXED_ONE);

    /// Create from integer
    #[inline]
    pub fn from_int(n: i32) -> Self {
        Fixed32(n << FRAC_BITS)
    }

    /// Create from f32 (rounds to the nearest step, saturates out of range)
    #[inline]
    pub fn from_f32(f: f32) -> Self {
        Fixed32((f * FIXED_ONE as f32).round() as i32)
    }

    /// Convert to f32
    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / FIXED_ONE as f32
    }

    /// Floor to integer
    #[inline]
    pub fn floor(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    #[inline]
    pub fn abs(self) -> Self {
        Fixed32(self.0.wrapping_abs())
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Fixed32(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Fixed32(self.0.max(other.0))
    }

    /// Fixed-point multiplication (16.16 * 16.16 -> 16.16)
    #[inline]
    pub fn mul_fixed(self, other: Self) -> Self {
        let result = (self.0 as i64 * other.0 as i64) >> FRAC_BITS;
        Fixed32(result as i32)
    }

    /// Fixed-point division. A zero divisor yields zero instead of faulting.
    #[inline]
    pub fn div_fixed(self, divisor: Self) -> Self {
        if divisor.0 == 0 {
            return Fixed32::ZERO;
        }
        let dividend = (self.0 as i64) << FRAC_BITS;
        let result = dividend / divisor.0 as i64;
        Fixed32(result.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }
}

impl fmt::Debug for Fixed32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed32({:#x} = {})", self.0, self.to_f32())
    }
}

impl fmt::Display for Fixed32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f32())
    }
}

impl Add for Fixed32 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Fixed32(self.0.wrapping_add(other.0))
    }
}

impl Sub for Fixed32 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Fixed32(self.0.wrapping_sub(other.0))
    }
}

impl Mul for Fixed32 {
    type Output = Self;
    #[inline]
    fn mul(self, other: Self) -> Self {
        self.mul_fixed(other)
    }
}

impl Div for Fixed32 {
    type Output = Self;
    #[inline]
    fn div(self, other: Self) -> Self {
        self.div_fixed(other)
    }
}

impl Neg for Fixed32 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Fixed32(self.0.wrapping_neg())
    }
}
