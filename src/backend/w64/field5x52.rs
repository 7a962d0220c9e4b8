use core::cmp::Ordering;
use core::ops::{Add, AddAssign, Mul, MulAssign};
use zeroize::Zeroize;

use super::inv_vartime;

// Field element modulo p = 2^256 - 2^32 - 977.
//
// The value is sum(n[i]*2^(52*i)) for i = 0..4. Limbs may exceed 52 bits
// (48 bits for the top limb): the "magnitude" m of an element says that
// each limb is at most 2*m times its normalized maximum, which allows
// chaining several additions before any carry propagation. A "normalized"
// element has all limbs within range and a value lower than p. In debug
// builds, both properties are tracked and asserted at every operation;
// release builds carry only the five limbs.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement {
    n: [u64; 5],
    #[cfg(debug_assertions)]
    magnitude: u32,
    #[cfg(debug_assertions)]
    normalized: bool,
}

// Packed form of a normalized field element: four 64-bit words, in
// low-to-high order. This is what is kept in precomputed tables.
#[derive(Clone, Copy, Debug)]
pub struct FieldStorage {
    n: [u64; 4],
}

const M52: u64 = 0xFFFFFFFFFFFFF;
const M48: u64 = 0x0FFFFFFFFFFFF;

// 2^256 mod p = 0x1000003D1; R52 is that value shifted by 4 bits, used
// when folding a carry out of 52-bit limb 5 into limb 0.
const R48: u64 = 0x1000003D1;
const R52: u64 = 0x1000003D10;

// Low limb of p.
const P0: u64 = 0xFFFFEFFFFFC2F;

// Return 1 if x == 0, 0 otherwise; x must be lower than 2^63.
#[inline(always)]
const fn eq0(x: u64) -> u64 {
    x.wrapping_sub(1) >> 63
}

// Return 1 if x >= y, 0 otherwise; x and y must be lower than 2^63.
#[inline(always)]
const fn geq(x: u64, y: u64) -> u64 {
    (x.wrapping_sub(y) >> 63) ^ 1
}

impl FieldElement {

    pub const ZERO: Self = Self::from_limbs([0, 0, 0, 0, 0], 0, true);
    pub const ONE: Self = Self::from_limbs([1, 0, 0, 0, 0], 1, true);

    // Curve equation constant (y^2 = x^3 + 7).
    pub const B: Self = Self::from_limbs([7, 0, 0, 0, 0], 1, true);

    #[inline(always)]
    const fn from_limbs(n: [u64; 5], magnitude: u32, normalized: bool)
        -> Self
    {
        #[cfg(not(debug_assertions))]
        let _ = (magnitude, normalized);
        Self {
            n,
            #[cfg(debug_assertions)]
            magnitude,
            #[cfg(debug_assertions)]
            normalized,
        }
    }

    // Create an element from a 256-bit value lower than p, provided as
    // four 64-bit limbs (in high-to-low order).
    pub const fn w64be(x3: u64, x2: u64, x1: u64, x0: u64) -> Self {
        Self::from_limbs([
            x0 & M52,
            (x0 >> 52) | ((x1 << 12) & M52),
            (x1 >> 40) | ((x2 << 24) & M52),
            (x2 >> 28) | ((x3 << 36) & M52),
            x3 >> 16,
        ], 1, true)
    }

    // Create an element from a small integer.
    pub fn from_u32(x: u32) -> Self {
        Self::from_limbs([x as u64, 0, 0, 0, 0], 1, true)
    }

    #[cfg(debug_assertions)]
    fn verify(&self) {
        let m = if self.normalized { 1 } else { 2 * (self.magnitude as u64) };
        assert!(self.magnitude <= 32);
        for i in 0..4 {
            assert!(self.n[i] <= M52 * m);
        }
        assert!(self.n[4] <= M48 * m);
        if self.normalized {
            assert!(self.magnitude <= 1);
            if self.n[4] == M48 && (self.n[3] & self.n[2] & self.n[1]) == M52 {
                assert!(self.n[0] < P0);
            }
        }
    }

    #[inline(always)]
    fn set_meta(&mut self, magnitude: u32, normalized: bool) {
        #[cfg(debug_assertions)]
        {
            self.magnitude = magnitude;
            self.normalized = normalized;
            self.verify();
        }
        #[cfg(not(debug_assertions))]
        let _ = (magnitude, normalized);
    }

    // Assert (debug builds only) that the magnitude is at most `max`.
    #[inline(always)]
    pub(crate) fn check_magnitude(&self, max: u32) {
        #[cfg(debug_assertions)]
        {
            self.verify();
            assert!(self.magnitude <= max);
        }
        #[cfg(not(debug_assertions))]
        let _ = max;
    }

    // Assert (debug builds only) that the value is normalized.
    #[inline(always)]
    pub(crate) fn check_normalized(&self) {
        #[cfg(debug_assertions)]
        {
            self.verify();
            assert!(self.normalized);
        }
    }

    // Weak normalization: propagate carries so that the magnitude is 1,
    // without guaranteeing that the value is lower than p.
    pub fn normalize_weak(&mut self) {
        let [mut t0, mut t1, mut t2, mut t3, mut t4] = self.n;

        // Reduce t4 at the start so there will be at most a single
        // carry from the first pass.
        let x = t4 >> 48;
        t4 &= M48;

        t0 += x * R48;
        t1 += t0 >> 52; t0 &= M52;
        t2 += t1 >> 52; t1 &= M52;
        t3 += t2 >> 52; t2 &= M52;
        t4 += t3 >> 52; t3 &= M52;

        self.n = [t0, t1, t2, t3, t4];
        #[cfg(debug_assertions)]
        {
            self.magnitude = 1;
            self.verify();
        }
    }

    // Full normalization to the unique representative in [0, p)
    // (constant-time).
    pub fn normalize(&mut self) {
        let [mut t0, mut t1, mut t2, mut t3, mut t4] = self.n;

        let x = t4 >> 48;
        t4 &= M48;

        // The first pass ensures the magnitude is 1; m tracks whether
        // limbs 1 to 3 are all at their maximum.
        t0 += x * R48;
        t1 += t0 >> 52; t0 &= M52;
        t2 += t1 >> 52; t1 &= M52; let mut m = t1;
        t3 += t2 >> 52; t2 &= M52; m &= t2;
        t4 += t3 >> 52; t3 &= M52; m &= t3;

        // At most a single bit of overflow remains in t4; the value may
        // also be in [p, 2^256).
        let x = (t4 >> 48)
            | (eq0(t4 ^ M48) & eq0(m ^ M52) & geq(t0, P0));

        // Apply the final reduction (for constant-time behaviour, we do
        // it always).
        t0 += x * R48;
        t1 += t0 >> 52; t0 &= M52;
        t2 += t1 >> 52; t1 &= M52;
        t3 += t2 >> 52; t2 &= M52;
        t4 += t3 >> 52; t3 &= M52;

        // The bit at position 48 of t4 is set iff a reduction happened
        // from a value >= 2^256; it must be discarded.
        t4 &= M48;

        self.n = [t0, t1, t2, t3, t4];
        self.set_meta(1, true);
    }

    // Full normalization, variable-time version.
    pub fn normalize_vartime(&mut self) {
        let [mut t0, mut t1, mut t2, mut t3, mut t4] = self.n;

        let x = t4 >> 48;
        t4 &= M48;

        t0 += x * R48;
        t1 += t0 >> 52; t0 &= M52;
        t2 += t1 >> 52; t1 &= M52; let mut m = t1;
        t3 += t2 >> 52; t2 &= M52; m &= t2;
        t4 += t3 >> 52; t3 &= M52; m &= t3;

        let x = (t4 >> 48) != 0
            || (t4 == M48 && m == M52 && t0 >= P0);

        if x {
            t0 += R48;
            t1 += t0 >> 52; t0 &= M52;
            t2 += t1 >> 52; t1 &= M52;
            t3 += t2 >> 52; t2 &= M52;
            t4 += t3 >> 52; t3 &= M52;
            t4 &= M48;
        }

        self.n = [t0, t1, t2, t3, t4];
        self.set_meta(1, true);
    }

    // Check whether this value would be zero after full normalization
    // (constant-time). Returned value is 0xFFFFFFFF for zero, 0 otherwise.
    // The two candidate representations are 0 and p.
    pub fn normalizes_to_zero(&self) -> u32 {
        let [mut t0, mut t1, mut t2, mut t3, mut t4] = self.n;

        let x = t4 >> 48;
        t4 &= M48;

        // z0 tracks a possible raw value of 0, z1 tracks a possible raw
        // value of p.
        t0 += x * R48;
        t1 += t0 >> 52; t0 &= M52;
        let mut z0 = t0;
        let mut z1 = t0 ^ 0x1000003D0;
        t2 += t1 >> 52; t1 &= M52; z0 |= t1; z1 &= t1;
        t3 += t2 >> 52; t2 &= M52; z0 |= t2; z1 &= t2;
        t4 += t3 >> 52; t3 &= M52; z0 |= t3; z1 &= t3;
        z0 |= t4; z1 &= t4 ^ 0xF000000000000;

        ((eq0(z0) | eq0(z1 ^ M52)) as u32).wrapping_neg()
    }

    // Variable-time variant of normalizes_to_zero(), which returns
    // early in the common case of a nonzero value.
    pub fn normalizes_to_zero_vartime(&self) -> bool {
        let [mut t0, mut t1, mut t2, mut t3, mut t4] = self.n;

        let x = t4 >> 48;

        // The first limb alone is enough to rule out most values.
        t0 += x * R48;
        let mut z0 = t0 & M52;
        let mut z1 = z0 ^ 0x1000003D0;
        if z0 != 0 && z1 != M52 {
            return false;
        }

        t4 &= M48;
        t1 += t0 >> 52;
        t2 += t1 >> 52; t1 &= M52; z0 |= t1; z1 &= t1;
        t3 += t2 >> 52; t2 &= M52; z0 |= t2; z1 &= t2;
        t4 += t3 >> 52; t3 &= M52; z0 |= t3; z1 &= t3;
        z0 |= t4; z1 &= t4 ^ 0xF000000000000;

        z0 == 0 || z1 == M52
    }

    // Test whether this (normalized) value is zero.
    #[inline]
    pub fn is_zero(&self) -> u32 {
        self.check_normalized();
        let t = self.n[0] | self.n[1] | self.n[2] | self.n[3] | self.n[4];
        (eq0(t) as u32).wrapping_neg()
    }

    // Test whether this (normalized) value is odd.
    #[inline]
    pub fn is_odd(&self) -> u32 {
        self.check_normalized();
        ((self.n[0] & 1) as u32).wrapping_neg()
    }

    // Compare two normalized values as integers (variable-time).
    pub fn cmp_vartime(&self, rhs: &Self) -> Ordering {
        self.check_normalized();
        rhs.check_normalized();
        for i in (0..5).rev() {
            if self.n[i] != rhs.n[i] {
                return self.n[i].cmp(&rhs.n[i]);
            }
        }
        Ordering::Equal
    }

    // Equality check (constant-time); self must have magnitude at most 1,
    // rhs at most 31. Returned value is 0xFFFFFFFF on equality, 0
    // otherwise.
    #[inline]
    pub fn equals(&self, rhs: &Self) -> u32 {
        let mut t = self.neg(1);
        t.set_add(rhs);
        t.normalizes_to_zero()
    }

    // Equality check, variable-time.
    #[inline]
    pub fn equals_vartime(&self, rhs: &Self) -> bool {
        let mut t = self.neg(1);
        t.set_add(rhs);
        t.normalizes_to_zero_vartime()
    }

    // Set this value to its opposite. The source magnitude must be at
    // most m; the result has magnitude m + 1.
    pub fn set_neg(&mut self, m: u32) {
        self.check_magnitude(m);
        let k = 2 * ((m as u64) + 1);
        self.n[0] = P0 * k - self.n[0];
        self.n[1] = M52 * k - self.n[1];
        self.n[2] = M52 * k - self.n[2];
        self.n[3] = M52 * k - self.n[3];
        self.n[4] = M48 * k - self.n[4];
        self.set_meta(m + 1, false);
    }

    #[inline(always)]
    pub fn neg(&self, m: u32) -> Self {
        let mut r = *self;
        r.set_neg(m);
        r
    }

    // Multiply by a small integer; the magnitude is multiplied by the
    // same factor.
    pub fn set_mul_small(&mut self, k: u32) {
        let kk = k as u64;
        for i in 0..5 {
            self.n[i] *= kk;
        }
        #[cfg(debug_assertions)]
        {
            self.magnitude *= k;
            self.normalized = false;
            self.verify();
        }
    }

    #[inline(always)]
    pub fn mul_small(&self, k: u32) -> Self {
        let mut r = *self;
        r.set_mul_small(k);
        r
    }

    // Add another value; the magnitudes add up.
    pub fn set_add(&mut self, rhs: &Self) {
        for i in 0..5 {
            self.n[i] += rhs.n[i];
        }
        #[cfg(debug_assertions)]
        {
            self.magnitude += rhs.magnitude;
            self.normalized = false;
            self.verify();
        }
    }

    // Multiplication; both operands must have magnitude at most 8, and
    // the result has magnitude 1.
    fn set_mul(&mut self, rhs: &Self) {
        self.check_magnitude(8);
        rhs.check_magnitude(8);
        let a = &self.n;
        let b = &rhs.n;
        let m = |x: u64, y: u64| (x as u128) * (y as u128);

        let mut c = m(a[0], b[0]);
        let t0 = (c as u64) & M52; c >>= 52;
        c += m(a[0], b[1]) + m(a[1], b[0]);
        let t1 = (c as u64) & M52; c >>= 52;
        c += m(a[0], b[2]) + m(a[1], b[1]) + m(a[2], b[0]);
        let t2 = (c as u64) & M52; c >>= 52;
        c += m(a[0], b[3]) + m(a[1], b[2]) + m(a[2], b[1]) + m(a[3], b[0]);
        let t3 = (c as u64) & M52; c >>= 52;
        c += m(a[0], b[4]) + m(a[1], b[3]) + m(a[2], b[2])
            + m(a[3], b[1]) + m(a[4], b[0]);
        let t4 = (c as u64) & M52; c >>= 52;
        c += m(a[1], b[4]) + m(a[2], b[3]) + m(a[3], b[2]) + m(a[4], b[1]);
        let t5 = (c as u64) & M52; c >>= 52;
        c += m(a[2], b[4]) + m(a[3], b[3]) + m(a[4], b[2]);
        let t6 = (c as u64) & M52; c >>= 52;
        c += m(a[3], b[4]) + m(a[4], b[3]);
        let t7 = (c as u64) & M52; c >>= 52;
        c += m(a[4], b[4]);
        let t8 = (c as u64) & M52; c >>= 52;
        let t9 = c as u64;

        self.n = Self::reduce_wide([t0, t1, t2, t3, t4, t5, t6, t7, t8, t9]);
        self.set_meta(1, false);
    }

    #[inline(always)]
    pub fn mul(&self, rhs: &Self) -> Self {
        let mut r = *self;
        r.set_mul(rhs);
        r
    }

    // Squaring; same magnitude rules as multiplication.
    pub fn set_square(&mut self) {
        self.check_magnitude(8);
        let a = &self.n;
        let m = |x: u64, y: u64| (x as u128) * (y as u128);

        let mut c = m(a[0], a[0]);
        let t0 = (c as u64) & M52; c >>= 52;
        c += m(a[0] * 2, a[1]);
        let t1 = (c as u64) & M52; c >>= 52;
        c += m(a[0] * 2, a[2]) + m(a[1], a[1]);
        let t2 = (c as u64) & M52; c >>= 52;
        c += m(a[0] * 2, a[3]) + m(a[1] * 2, a[2]);
        let t3 = (c as u64) & M52; c >>= 52;
        c += m(a[0] * 2, a[4]) + m(a[1] * 2, a[3]) + m(a[2], a[2]);
        let t4 = (c as u64) & M52; c >>= 52;
        c += m(a[1] * 2, a[4]) + m(a[2] * 2, a[3]);
        let t5 = (c as u64) & M52; c >>= 52;
        c += m(a[2] * 2, a[4]) + m(a[3], a[3]);
        let t6 = (c as u64) & M52; c >>= 52;
        c += m(a[3] * 2, a[4]);
        let t7 = (c as u64) & M52; c >>= 52;
        c += m(a[4], a[4]);
        let t8 = (c as u64) & M52; c >>= 52;
        let t9 = c as u64;

        self.n = Self::reduce_wide([t0, t1, t2, t3, t4, t5, t6, t7, t8, t9]);
        self.set_meta(1, false);
    }

    #[inline(always)]
    pub fn square(&self) -> Self {
        let mut r = *self;
        r.set_square();
        r
    }

    // Square this value n times.
    pub fn set_xsquare(&mut self, n: u32) {
        for _ in 0..n {
            self.set_square();
        }
    }

    #[inline(always)]
    pub fn xsquare(&self, n: u32) -> Self {
        let mut r = *self;
        r.set_xsquare(n);
        r
    }

    // Fold a 520-bit product (ten 52-bit limbs) into five limbs of
    // magnitude 1: limbs 5..9 are multiplied by 2^260 mod p = R52 and
    // added into limbs 0..4, then the carry out of the top 48 bits is
    // folded again with R48.
    #[inline(always)]
    fn reduce_wide(t: [u64; 10]) -> [u64; 5] {
        let m = |x: u64, y: u64| (x as u128) * (y as u128);
        let mut c = (t[0] as u128) + m(t[5], R52);
        let t0 = (c as u64) & M52; c >>= 52;
        c += (t[1] as u128) + m(t[6], R52);
        let t1 = (c as u64) & M52; c >>= 52;
        c += (t[2] as u128) + m(t[7], R52);
        let r2 = (c as u64) & M52; c >>= 52;
        c += (t[3] as u128) + m(t[8], R52);
        let r3 = (c as u64) & M52; c >>= 52;
        c += (t[4] as u128) + m(t[9], R52);
        let r4 = (c as u64) & M48; c >>= 48;
        c = (t0 as u128) + c * (R48 as u128);
        let r0 = (c as u64) & M52; c >>= 52;
        let r1 = t1 + (c as u64);
        [r0, r1, r2, r3, r4]
    }

    // Conditional move: set this value to a if ctl is 0xFFFFFFFF, leave
    // it unchanged if ctl is 0. Constant-time.
    #[inline]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..5 {
            self.n[i] ^= cw & (self.n[i] ^ a.n[i]);
        }
        #[cfg(debug_assertions)]
        {
            if ctl != 0 {
                self.magnitude = a.magnitude;
                self.normalized = a.normalized;
            }
        }
    }

    // Return a0 if ctl is 0, a1 if ctl is 0xFFFFFFFF.
    #[inline(always)]
    pub fn select(a0: &Self, a1: &Self, ctl: u32) -> Self {
        let mut r = *a0;
        r.set_cond(a1, ctl);
        r
    }

    // Compute x^(2^k - 1) for the exponents shared by the inversion and
    // square root addition chains. Returned values are (x2, x3, x22, x223)
    // where xk = x^(2^k - 1).
    fn pow_chain(&self) -> (Self, Self, Self, Self) {
        let x = *self;
        let x2 = x.square() * x;
        let x3 = x2.square() * x;
        let x6 = x3.xsquare(3) * x3;
        let x9 = x6.xsquare(3) * x3;
        let x11 = x9.xsquare(2) * x2;
        let x22 = x11.xsquare(11) * x11;
        let x44 = x22.xsquare(22) * x22;
        let x88 = x44.xsquare(44) * x44;
        let x176 = x88.xsquare(88) * x88;
        let x220 = x176.xsquare(44) * x44;
        let x223 = x220.xsquare(3) * x3;
        (x2, x3, x22, x223)
    }

    // Invert this value (constant-time), by raising it to p - 2. Zero
    // is mapped to zero. The input magnitude must be at most 8.
    pub fn set_invert(&mut self) {
        // p - 2 has five blocks of 1s: 223, 22, 1, 2, 1 (with gaps of
        // 1, 4, 1 and 1 zeros).
        let a = *self;
        let (x2, _, x22, x223) = a.pow_chain();
        let mut t = x223.xsquare(23) * x22;
        t = t.xsquare(5) * a;
        t = t.xsquare(3) * x2;
        t = t.xsquare(2) * a;
        *self = t;
    }

    #[inline(always)]
    pub fn invert(&self) -> Self {
        let mut r = *self;
        r.set_invert();
        r
    }

    // Invert this value (variable-time). Zero is mapped to zero.
    pub fn invert_vartime(&self) -> Self {
        let mut a = *self;
        a.normalize_vartime();
        let r = inv_vartime(&a.to_u64x4(), &Self::MODULUS);
        Self::from_u64x4(&r)
    }

    // Modulus p in base 2^64 (low-to-high order).
    const MODULUS: [u64; 4] = [
        0xFFFFFFFEFFFFFC2F,
        0xFFFFFFFFFFFFFFFF,
        0xFFFFFFFFFFFFFFFF,
        0xFFFFFFFFFFFFFFFF,
    ];

    // Invert several elements at once with a single inversion
    // (Montgomery's trick). Zero elements are left as zero. This is
    // variable-time only with respect to which inputs are zero.
    pub fn batch_invert_vartime(xx: &mut [Self]) {
        let n = xx.len();
        if n == 0 {
            return;
        }
        let mut prods = [Self::ONE; 64];
        let mut start = 0;
        // Process by chunks so that no allocation is needed.
        while start < n {
            let end = core::cmp::min(n, start + prods.len());
            let mut acc = Self::ONE;
            for i in start..end {
                prods[i - start] = acc;
                if !xx[i].normalizes_to_zero_vartime() {
                    acc = acc * xx[i];
                }
            }
            let mut inv = acc.invert_vartime();
            for i in (start..end).rev() {
                if xx[i].normalizes_to_zero_vartime() {
                    xx[i] = Self::ZERO;
                    continue;
                }
                let xi = xx[i];
                xx[i] = inv * prods[i - start];
                inv = inv * xi;
            }
            start = end;
        }
    }

    // Square root (constant-time). Returned values are (y, r): if this
    // value is a quadratic residue, then y is one of its square roots
    // (magnitude 1, parity unspecified) and r is 0xFFFFFFFF; otherwise,
    // r is 0 and y is the square root of -x. The input magnitude must
    // be at most 8.
    pub fn sqrt(&self) -> (Self, u32) {
        // Since p = 3 mod 4, a candidate is x^((p+1)/4); the exponent
        // has blocks of 1s of lengths 223, 22 and 2.
        let a = *self;
        let (x2, _, x22, x223) = a.pow_chain();
        let mut t = x223.xsquare(23) * x22;
        t = t.xsquare(6) * x2;
        let y = t.xsquare(2);
        let r = y.square().equals(&a);
        (y, r)
    }

    // Convert a normalized value to four 64-bit words (low-to-high).
    #[inline]
    fn to_u64x4(&self) -> [u64; 4] {
        self.check_normalized();
        let n = &self.n;
        [
            n[0] | (n[1] << 52),
            (n[1] >> 12) | (n[2] << 40),
            (n[2] >> 24) | (n[3] << 28),
            (n[3] >> 36) | (n[4] << 16),
        ]
    }

    // Convert four 64-bit words (low-to-high) into an element; the value
    // must be lower than p.
    #[inline]
    fn from_u64x4(d: &[u64; 4]) -> Self {
        Self::w64be(d[3], d[2], d[1], d[0])
    }

    // Decode 32 bytes (big-endian). Returned values are (x, r): r is
    // 0xFFFFFFFF if the value was lower than p (and x is then
    // normalized), 0 otherwise (x then holds the unreduced value, with
    // magnitude 1).
    pub fn decode(buf: &[u8; 32]) -> (Self, u32) {
        let mut d = [0u64; 4];
        for i in 0..4 {
            let mut w = [0u8; 8];
            w.copy_from_slice(&buf[(24 - 8 * i)..(32 - 8 * i)]);
            d[i] = u64::from_be_bytes(w);
        }
        let mut r = Self::from_u64x4(&d);
        let n = &r.n;
        let ovf = eq0(n[4] ^ M48)
            & eq0((n[3] & n[2] & n[1]) ^ M52)
            & geq(n[0], P0);
        let ok = ((ovf ^ 1) as u32).wrapping_neg();
        r.set_meta(1, ok != 0);
        (r, ok)
    }

    // Encode a normalized value over 32 bytes (big-endian).
    pub fn encode(&self) -> [u8; 32] {
        let d = self.to_u64x4();
        let mut buf = [0u8; 32];
        for i in 0..4 {
            buf[(24 - 8 * i)..(32 - 8 * i)].copy_from_slice(&d[i].to_be_bytes());
        }
        buf
    }

    // Pack a normalized value for table storage.
    #[inline]
    pub fn to_storage(&self) -> FieldStorage {
        FieldStorage { n: self.to_u64x4() }
    }

    // Unpack a stored value (the result is normalized).
    #[inline]
    pub fn from_storage(s: &FieldStorage) -> Self {
        Self::from_u64x4(&s.n)
    }
}

impl FieldStorage {

    pub const ZERO: Self = Self { n: [0; 4] };

    // Conditional move (constant-time).
    #[inline]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..4 {
            self.n[i] ^= cw & (self.n[i] ^ a.n[i]);
        }
    }
}

impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.n.zeroize();
        self.set_meta(0, true);
    }
}

impl Zeroize for FieldStorage {
    fn zeroize(&mut self) {
        self.n.zeroize();
    }
}

impl Add<FieldElement> for FieldElement {
    type Output = FieldElement;

    #[inline(always)]
    fn add(self, other: FieldElement) -> FieldElement {
        let mut r = self;
        r.set_add(&other);
        r
    }
}

impl Add<&FieldElement> for FieldElement {
    type Output = FieldElement;

    #[inline(always)]
    fn add(self, other: &FieldElement) -> FieldElement {
        let mut r = self;
        r.set_add(other);
        r
    }
}

impl AddAssign<FieldElement> for FieldElement {
    #[inline(always)]
    fn add_assign(&mut self, other: FieldElement) {
        self.set_add(&other);
    }
}

impl AddAssign<&FieldElement> for FieldElement {
    #[inline(always)]
    fn add_assign(&mut self, other: &FieldElement) {
        self.set_add(other);
    }
}

impl Mul<FieldElement> for FieldElement {
    type Output = FieldElement;

    #[inline(always)]
    fn mul(self, other: FieldElement) -> FieldElement {
        let mut r = self;
        r.set_mul(&other);
        r
    }
}

impl Mul<&FieldElement> for FieldElement {
    type Output = FieldElement;

    #[inline(always)]
    fn mul(self, other: &FieldElement) -> FieldElement {
        let mut r = self;
        r.set_mul(other);
        r
    }
}

impl Mul<FieldElement> for &FieldElement {
    type Output = FieldElement;

    #[inline(always)]
    fn mul(self, other: FieldElement) -> FieldElement {
        let mut r = *self;
        r.set_mul(&other);
        r
    }
}

impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    #[inline(always)]
    fn mul(self, other: &FieldElement) -> FieldElement {
        let mut r = *self;
        r.set_mul(other);
        r
    }
}

impl MulAssign<FieldElement> for FieldElement {
    #[inline(always)]
    fn mul_assign(&mut self, other: FieldElement) {
        self.set_mul(&other);
    }
}

impl MulAssign<&FieldElement> for FieldElement {
    #[inline(always)]
    fn mul_assign(&mut self, other: &FieldElement) {
        self.set_mul(other);
    }
}

// ========================================================================
