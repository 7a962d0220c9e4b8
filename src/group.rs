//! Group operations on the secp256k1 curve.
//!
//! The curve is the short Weierstraß curve `y^2 = x^3 + 7` over the
//! field of integers modulo p = 2^256 - 2^32 - 977. It has prime order n
//! and no point of order 2.
//!
//! Points are handled in two representations:
//!
//!  - `Affine`: coordinates (x, y), both normalized, plus an infinity
//!    flag. This is the form used for decoding and encoding, and for the
//!    entries of precomputed tables (as `AffineStorage`, which packs the
//!    two coordinates into 64 bytes).
//!
//!  - `Jacobian`: coordinates (X:Y:Z) with x = X/Z^2 and y = Y/Z^3, plus
//!    an infinity flag. All coordinates of a `Jacobian` value returned by
//!    this module have magnitude 1.
//!
//! Infinity flags are `u32` masks (0xFFFFFFFF for the point-at-infinity)
//! so that constant-time code can combine them. Functions that are not
//! constant-time have `vartime` in their name; they shall be used only
//! on public points.

// Projective/fractional coordinates traditionally use uppercase letters,
// using lowercase only for affine coordinates.
#![allow(non_snake_case)]

use zeroize::Zeroize;

use crate::field::{FieldElement, FieldStorage};

/// A point in affine coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Affine {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) infinity: u32,
}

/// A point in Jacobian coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Jacobian {
    pub(crate) X: FieldElement,
    pub(crate) Y: FieldElement,
    pub(crate) Z: FieldElement,
    pub(crate) infinity: u32,
}

/// Packed affine point (never the point-at-infinity).
#[derive(Clone, Copy, Debug)]
pub struct AffineStorage {
    x: FieldStorage,
    y: FieldStorage,
}

// Cube root of unity in the field; (x, y) -> (EPSILON*x, y) is the
// endomorphism that multiplies points by Scalar::LAMBDA.
pub(crate) const EPSILON: FieldElement = FieldElement::w64be(
    0x7AE96A2B657C0710, 0x6E64479EAC3434E9,
    0x9CF0497512F58995, 0xC1396C28719501EE);

impl Affine {

    pub const INFINITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: 0xFFFFFFFF,
    };

    /// The conventional generator point G.
    pub const GENERATOR: Self = Self {
        x: FieldElement::w64be(
            0x79BE667EF9DCBBAC, 0x55A06295CE870B07,
            0x029BFCDB2DCE28D9, 0x59F2815B16F81798),
        y: FieldElement::w64be(
            0x483ADA7726A3C465, 0x5DA4FBFC0E1108A8,
            0xFD17B448A6855419, 0x9C47D08FFB10D4B8),
        infinity: 0,
    };

    /// Builds a point from its (normalized) coordinates. The point is
    /// not checked to be on the curve.
    pub fn from_xy(x: &FieldElement, y: &FieldElement) -> Self {
        x.check_normalized();
        y.check_normalized();
        Self { x: *x, y: *y, infinity: 0 }
    }

    // Compile-time variant of from_xy(), for hardcoded points.
    #[cfg(feature = "alloc")]
    pub(crate) const fn from_xy_const(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y, infinity: 0 }
    }

    /// Returns 0xFFFFFFFF for the point-at-infinity, 0 otherwise.
    #[inline(always)]
    pub fn is_infinity(&self) -> u32 {
        self.infinity
    }

    /// Recovers a point from its x coordinate and the parity of y.
    ///
    /// `None` is returned if there is no point with that x coordinate.
    /// The input must have magnitude at most 8.
    pub fn decompress_vartime(x: &FieldElement, odd: bool) -> Option<Self> {
        let mut xx = *x;
        xx.normalize_vartime();
        let c = xx.square() * xx + FieldElement::B;
        let (mut y, r) = c.sqrt();
        if r == 0 {
            return None;
        }
        y.normalize_vartime();
        if (y.is_odd() != 0) != odd {
            y.set_neg(1);
            y.normalize_vartime();
        }
        Some(Self { x: xx, y, infinity: 0 })
    }

    /// Checks that this point is on the curve (the point-at-infinity is
    /// not considered valid).
    pub fn is_valid_vartime(&self) -> bool {
        if self.infinity != 0 {
            return false;
        }
        let c = self.x.square() * self.x + FieldElement::B;
        self.y.square().equals_vartime(&c)
    }

    /// Negates this point (in place).
    pub fn set_neg(&mut self) {
        self.y.set_neg(1);
        self.y.normalize();
    }

    pub fn neg(&self) -> Self {
        let mut r = *self;
        r.set_neg();
        r
    }

    /// Applies the endomorphism (x, y) -> (EPSILON*x, y).
    pub fn zeta(&self) -> Self {
        let mut x = self.x * EPSILON;
        x.normalize();
        Self { x, y: self.y, infinity: self.infinity }
    }

    fn set_jacobian_with_zinv(&mut self, P: &Jacobian, zi: &FieldElement) {
        let z2 = zi.square();
        let z3 = z2 * zi;
        self.x = P.X * z2;
        self.y = P.Y * z3;
        self.x.normalize();
        self.y.normalize();
        self.x.set_cond(&FieldElement::ZERO, P.infinity);
        self.y.set_cond(&FieldElement::ZERO, P.infinity);
        self.infinity = P.infinity;
    }

    /// Converts from Jacobian coordinates (constant-time). For the
    /// point-at-infinity, coordinates are set to zero.
    pub fn from_jacobian(P: &Jacobian) -> Self {
        let mut r = Self::INFINITY;
        r.set_jacobian_with_zinv(P, &P.Z.invert());
        r
    }

    /// Converts from Jacobian coordinates (variable-time).
    pub fn from_jacobian_vartime(P: &Jacobian) -> Self {
        if P.infinity != 0 {
            return Self::INFINITY;
        }
        let mut r = Self::INFINITY;
        r.set_jacobian_with_zinv(P, &P.Z.invert_vartime());
        r
    }

    /// Converts many points from Jacobian coordinates, mutualizing the
    /// inversions (variable-time). Slices `out` and `inp` must have the
    /// same length.
    pub fn batch_from_jacobian_vartime(out: &mut [Self], inp: &[Jacobian]) {
        assert!(out.len() == inp.len());
        const CHUNK: usize = 64;
        let mut zz = [FieldElement::ZERO; CHUNK];
        let mut start = 0;
        while start < inp.len() {
            let end = core::cmp::min(inp.len(), start + CHUNK);
            for i in start..end {
                zz[i - start] = if inp[i].infinity != 0 {
                    FieldElement::ZERO
                } else {
                    inp[i].Z
                };
            }
            FieldElement::batch_invert_vartime(&mut zz[..(end - start)]);
            for i in start..end {
                if inp[i].infinity != 0 {
                    out[i] = Self::INFINITY;
                } else {
                    out[i].set_jacobian_with_zinv(&inp[i], &zz[i - start]);
                }
            }
            start = end;
        }
    }

    /// Packs this point (which must not be the point-at-infinity).
    pub fn to_storage(&self) -> AffineStorage {
        AffineStorage { x: self.x.to_storage(), y: self.y.to_storage() }
    }

    pub fn from_storage(s: &AffineStorage) -> Self {
        Self {
            x: FieldElement::from_storage(&s.x),
            y: FieldElement::from_storage(&s.y),
            infinity: 0,
        }
    }
}

impl AffineStorage {

    pub const ZERO: Self = Self { x: FieldStorage::ZERO, y: FieldStorage::ZERO };

    /// Conditional move: set this value to `a` if `ctl` is 0xFFFFFFFF,
    /// leave it unchanged if `ctl` is 0. Constant-time.
    #[inline]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        self.x.set_cond(&a.x, ctl);
        self.y.set_cond(&a.y, ctl);
    }
}

impl Jacobian {

    pub const INFINITY: Self = Self {
        X: FieldElement::ZERO,
        Y: FieldElement::ONE,
        Z: FieldElement::ZERO,
        infinity: 0xFFFFFFFF,
    };

    pub fn from_affine(P: &Affine) -> Self {
        Self { X: P.x, Y: P.y, Z: FieldElement::ONE, infinity: P.infinity }
    }

    /// Returns 0xFFFFFFFF for the point-at-infinity, 0 otherwise.
    #[inline(always)]
    pub fn is_infinity(&self) -> u32 {
        self.infinity
    }

    /// Negates this point (in place).
    pub fn set_neg(&mut self) {
        self.Y.set_neg(1);
        self.Y.normalize_weak();
    }

    pub fn neg(&self) -> Self {
        let mut r = *self;
        r.set_neg();
        r
    }

    /// Conditional move (constant-time).
    #[inline]
    pub fn set_cond(&mut self, P: &Self, ctl: u32) {
        self.X.set_cond(&P.X, ctl);
        self.Y.set_cond(&P.Y, ctl);
        self.Z.set_cond(&P.Z, ctl);
        self.infinity ^= ctl & (self.infinity ^ P.infinity);
    }

    /// Doubles this point (in place). This is constant-time; the
    /// point-at-infinity stays the point-at-infinity.
    pub fn set_double(&mut self) {
        // Cost: 3M+4S. Figures in parentheses are the magnitudes.
        let mut Z = self.Z * self.Y;
        Z.set_mul_small(2);                 // Z' = 2*Y*Z (2)
        let mut t1 = self.X.square();
        t1.set_mul_small(3);                // t1 = 3*X^2 (3)
        let t2 = t1.square();               // t2 = 9*X^4 (1)
        let mut t3 = self.Y.square();
        t3.set_mul_small(2);                // t3 = 2*Y^2 (2)
        let mut t4 = t3.square();
        t4.set_mul_small(2);                // t4 = 8*Y^4 (2)
        let mut t3 = t3 * self.X;           // t3 = 2*X*Y^2 (1)
        let mut X = t3.mul_small(4);        // X' = 8*X*Y^2 (4)
        X.set_neg(4);                       // X' = -8*X*Y^2 (5)
        X += t2;                            // X' = 9*X^4 - 8*X*Y^2 (6)
        t3.set_mul_small(6);                // t3 = 12*X*Y^2 (6)
        t3 += t2.neg(1);                    // t3 = 12*X*Y^2 - 9*X^4 (8)
        let mut Y = t1 * t3;                // Y' = 36*X^3*Y^2 - 27*X^6 (1)
        Y += t4.neg(2);                     // Y' -= 8*Y^4 (4)

        X.normalize_weak();
        Y.normalize_weak();
        Z.normalize_weak();
        self.X = X;
        self.Y = Y;
        self.Z = Z;
    }

    pub fn double(&self) -> Self {
        let mut r = *self;
        r.set_double();
        r
    }

    // Double this point n times.
    pub fn set_xdouble(&mut self, n: u32) {
        for _ in 0..n {
            self.set_double();
        }
    }

    // Final steps of the addition formulas, shared by all variants.
    // Inputs: u1 = x1 (Jacobian-scaled), s1 = y1 (scaled), h = u2 - u1
    // (magnitude 3), i = s2 - s1 (magnitude 3), and the output Z.
    #[inline(always)]
    fn add_finish(u1: &FieldElement, s1: &FieldElement,
        h: &FieldElement, i: &FieldElement, Z: FieldElement) -> Self
    {
        let i2 = i.square();
        let h2 = h.square();
        let h3 = h * h2;
        let t = u1 * h2;
        let mut X = t.mul_small(2);
        X += h3;
        X.set_neg(3);
        X += i2;                            // X3 = i^2 - h^3 - 2*u1*h^2 (5)
        let mut Y = X.neg(5);
        Y += t;
        let mut Y = Y * i;
        let mut h3s = h3 * s1;
        h3s.set_neg(1);
        Y += h3s;                           // Y3 = i*(u1*h^2 - X3) - s1*h^3 (3)
        let mut Z = Z;
        X.normalize_weak();
        Y.normalize_weak();
        Z.normalize_weak();
        Self { X, Y, Z, infinity: 0 }
    }

    /// Adds two points (variable-time).
    pub fn add_vartime(&self, rhs: &Self) -> Self {
        if self.infinity != 0 {
            return *rhs;
        }
        if rhs.infinity != 0 {
            return *self;
        }
        let z22 = rhs.Z.square();
        let z12 = self.Z.square();
        let u1 = self.X * z22;
        let u2 = rhs.X * z12;
        let s1 = self.Y * z22 * rhs.Z;
        let s2 = rhs.Y * z12 * self.Z;
        let mut h = u1.neg(1);
        h += u2;
        let mut i = s1.neg(1);
        i += s2;
        if h.normalizes_to_zero_vartime() {
            if i.normalizes_to_zero_vartime() {
                return self.double();
            } else {
                return Self::INFINITY;
            }
        }
        let Z = self.Z * rhs.Z * h;
        Self::add_finish(&u1, &s1, &h, &i, Z)
    }

    /// Adds an affine point (variable-time).
    pub fn add_affine_vartime(&self, rhs: &Affine) -> Self {
        if self.infinity != 0 {
            return Self::from_affine(rhs);
        }
        if rhs.infinity != 0 {
            return *self;
        }
        let z12 = self.Z.square();
        let u1 = self.X;
        let u2 = rhs.x * z12;
        let s1 = self.Y;
        let s2 = rhs.y * z12 * self.Z;
        let mut h = u1.neg(1);
        h += u2;
        let mut i = s1.neg(1);
        i += s2;
        if h.normalizes_to_zero_vartime() {
            if i.normalizes_to_zero_vartime() {
                return self.double();
            } else {
                return Self::INFINITY;
            }
        }
        let Z = self.Z * h;
        Self::add_finish(&u1, &s1, &h, &i, Z)
    }

    /// Adds an affine point (constant-time).
    ///
    /// All special cases (either operand is the point-at-infinity, the
    /// two points are equal, the two points are opposite) are handled
    /// with constant-time selection over the generic result.
    pub fn add_affine(&self, rhs: &Affine) -> Self {
        let z12 = self.Z.square();
        let u1 = self.X;
        let u2 = rhs.x * z12;
        let s1 = self.Y;
        let s2 = rhs.y * z12 * self.Z;
        let mut h = u1.neg(1);
        h += u2;
        let mut i = s1.neg(1);
        i += s2;
        let hz = h.normalizes_to_zero();
        let iz = i.normalizes_to_zero();

        let mut r = Self::add_finish(&u1, &s1, &h, &i, self.Z * h);

        // Same point: the generic formulas yield garbage, use a doubling.
        r.set_cond(&self.double(), hz & iz);

        // Opposite points: the sum is the point-at-infinity.
        r.infinity = hz & !iz;

        r.set_cond(&Self::from_affine(rhs), self.infinity);
        r.set_cond(self, rhs.infinity & !self.infinity);
        r
    }

    /// Multiplies the projective coordinates by a nonzero field element
    /// s (X*s^2, Y*s^3, Z*s); the represented point is unchanged.
    pub fn rescale(&mut self, s: &FieldElement) {
        let zz = s.square();
        self.X *= zz;
        self.Y *= zz * s;
        self.Z *= s;
    }

    /// Applies the endomorphism (x, y) -> (EPSILON*x, y), which
    /// multiplies the point by `Scalar::LAMBDA`.
    pub fn zeta(&self) -> Self {
        Self { X: self.X * EPSILON, Y: self.Y, Z: self.Z, infinity: self.infinity }
    }

    /// Checks whether the affine x coordinate of this point (which must
    /// not be the point-at-infinity) is equal to the provided (normalized)
    /// value.
    pub fn eq_x_vartime(&self, x: &FieldElement) -> bool {
        let r = self.Z.square() * x;
        r.equals_vartime(&self.X)
    }
}

impl Zeroize for Affine {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
        self.infinity = 0;
    }
}

impl Zeroize for Jacobian {
    fn zeroize(&mut self) {
        self.X.zeroize();
        self.Y.zeroize();
        self.Z.zeroize();
        self.infinity = 0;
    }
}

impl Zeroize for AffineStorage {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
    }
}

// ========================================================================
