use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use zeroize::Zeroize;

use super::{addcarry_u64, subborrow_u64, umull_add, umull_add2, sgnw, inv_vartime};

// Integer modulo n (the secp256k1 group order), over four 64-bit limbs
// in low-to-high order. The value is always fully reduced.
#[derive(Clone, Copy, Debug)]
pub struct Scalar([u64; 4]);

// n = 2^256 - 432420386565659656852420866390673177327
const N: [u64; 4] = [
    0xBFD25E8CD0364141, 0xBAAEDCE6AF48A03B,
    0xFFFFFFFFFFFFFFFE, 0xFFFFFFFFFFFFFFFF,
];

// 2^256 - n (a 129-bit value).
const N_C: [u64; 3] = [ 0x402DA1732FC9BEBF, 0x4551231950B75FC4, 1 ];

// floor(n/2)
const HALF_N: [u64; 4] = [
    0xDFE92F46681B20A0, 0x5D576E7357A4501D,
    0xFFFFFFFFFFFFFFFF, 0x7FFFFFFFFFFFFFFF,
];

impl Scalar {

    pub const ZERO: Self = Self([ 0, 0, 0, 0 ]);
    pub const ONE: Self = Self([ 1, 0, 0, 0 ]);

    // Cube root of unity modulo n that matches the field endomorphism
    // (x, y) -> (epsilon*x, y) (see group::EPSILON).
    pub const LAMBDA: Self = Self::w64be(
        0x5363AD4CC05C30E0, 0xA5261C028812645A,
        0x122E22EA20816678, 0xDF02967C1B23BD72);

    // Create a scalar from a 256-bit value lower than n, provided as four
    // 64-bit limbs (in high-to-low order).
    pub const fn w64be(x3: u64, x2: u64, x1: u64, x0: u64) -> Self {
        Self([ x0, x1, x2, x3 ])
    }

    pub fn from_u32(x: u32) -> Self {
        Self([ x as u64, 0, 0, 0 ])
    }

    // Subtract n if the value (with an extra carry bit cc) is not lower
    // than n. The input must be lower than 2*n.
    #[inline(always)]
    fn reduce_once(d: [u64; 4], cc: u8) -> [u64; 4] {
        let mut t = [0u64; 4];
        let mut bb = 0u8;
        for i in 0..4 {
            let (x, b) = subborrow_u64(d[i], N[i], bb);
            t[i] = x;
            bb = b;
        }
        // Keep t if there was a carry or no borrow.
        let keep = ((cc | (bb ^ 1)) as u64).wrapping_neg();
        let mut r = [0u64; 4];
        for i in 0..4 {
            r[i] = d[i] ^ (keep & (d[i] ^ t[i]));
        }
        r
    }

    fn set_add(&mut self, rhs: &Self) {
        let mut d = [0u64; 4];
        let mut cc = 0u8;
        for i in 0..4 {
            let (x, c) = addcarry_u64(self.0[i], rhs.0[i], cc);
            d[i] = x;
            cc = c;
        }
        self.0 = Self::reduce_once(d, cc);
    }

    fn set_sub(&mut self, rhs: &Self) {
        self.set_add(&rhs.neg());
    }

    // Negate this value (constant-time).
    pub fn set_neg(&mut self) {
        // n - x, then forced to zero when x = 0.
        let t = self.0[0] | self.0[1] | self.0[2] | self.0[3];
        let z = sgnw(!t & t.wrapping_sub(1));
        let mut bb = 0u8;
        for i in 0..4 {
            let (x, b) = subborrow_u64(N[i], self.0[i], bb);
            self.0[i] = x & !z;
            bb = b;
        }
    }

    #[inline(always)]
    pub fn neg(&self) -> Self {
        let mut r = *self;
        r.set_neg();
        r
    }

    // Negate this value if ctl is 0xFFFFFFFF; leave it unchanged if ctl
    // is 0.
    #[inline]
    pub fn set_condneg(&mut self, ctl: u32) {
        let y = self.neg();
        self.set_cond(&y, ctl);
    }

    // Fold the high part of a 512-bit value (eight limbs) into a value
    // modulo n, using 2^256 = N_C mod n.
    fn reduce512(l: &[u64; 8]) -> [u64; 4] {
        // lo + hi*N_C, with fixed-length carry propagation.
        fn fold(lo: &[u64], hi: &[u64]) -> [u64; 8] {
            let mut r = [0u64; 8];
            r[..lo.len()].copy_from_slice(lo);
            for i in 0..hi.len() {
                let mut cc = 0u64;
                for j in 0..3 {
                    let (d, h) = umull_add2(hi[i], N_C[j], r[i + j], cc);
                    r[i + j] = d;
                    cc = h;
                }
                let (d, mut c) = addcarry_u64(r[i + 3], cc, 0);
                r[i + 3] = d;
                for k in (i + 4)..8 {
                    let (d, c2) = addcarry_u64(r[k], 0, c);
                    r[k] = d;
                    c = c2;
                }
            }
            r
        }

        // 512 -> 386 bits.
        let m = fold(&l[0..4], &l[4..8]);
        // 386 -> 260 bits.
        let p = fold(&m[0..4], &m[4..7]);
        // 260 -> 256 bits plus a single carry bit.
        let r = fold(&p[0..4], &p[4..5]);
        Self::reduce_once([r[0], r[1], r[2], r[3]], r[4] as u8)
    }

    // Multiplication (constant-time).
    fn set_mul(&mut self, rhs: &Self) {
        let a = &self.0;
        let b = &rhs.0;
        let mut l = [0u64; 8];
        for i in 0..4 {
            let mut cc = 0u64;
            for j in 0..4 {
                let (d, h) = umull_add2(a[i], b[j], l[i + j], cc);
                l[i + j] = d;
                cc = h;
            }
            l[i + 4] = cc;
        }
        self.0 = Self::reduce512(&l);
    }

    #[inline(always)]
    pub fn square(&self) -> Self {
        let mut r = *self;
        r.set_mul(self);
        r
    }

    // Test whether this value is zero (0xFFFFFFFF) or not (0).
    #[inline]
    pub fn is_zero(&self) -> u32 {
        let t = self.0[0] | self.0[1] | self.0[2] | self.0[3];
        (sgnw(!t & t.wrapping_sub(1))) as u32
    }

    #[inline]
    pub fn is_one(&self) -> u32 {
        let t = (self.0[0] ^ 1) | self.0[1] | self.0[2] | self.0[3];
        (sgnw(!t & t.wrapping_sub(1))) as u32
    }

    #[inline]
    pub fn is_even(&self) -> u32 {
        ((self.0[0] & 1) as u32).wrapping_sub(1)
    }

    // Test whether this value is greater than floor(n/2) (0xFFFFFFFF) or
    // not (0).
    pub fn is_high(&self) -> u32 {
        let mut bb = 0u8;
        for i in 0..4 {
            let (_, b) = subborrow_u64(HALF_N[i], self.0[i], bb);
            bb = b;
        }
        (bb as u32).wrapping_neg()
    }

    // Equality check (constant-time).
    #[inline]
    pub fn equals(&self, rhs: &Self) -> u32 {
        let t = (self.0[0] ^ rhs.0[0]) | (self.0[1] ^ rhs.0[1])
            | (self.0[2] ^ rhs.0[2]) | (self.0[3] ^ rhs.0[3]);
        (sgnw(!t & t.wrapping_sub(1))) as u32
    }

    // Conditional move: set this value to a if ctl is 0xFFFFFFFF, leave
    // it unchanged if ctl is 0. Constant-time.
    #[inline]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..4 {
            self.0[i] ^= cw & (self.0[i] ^ a.0[i]);
        }
    }

    // Return a0 if ctl is 0, a1 if ctl is 0xFFFFFFFF.
    #[inline(always)]
    pub fn select(a0: &Self, a1: &Self, ctl: u32) -> Self {
        let mut r = *a0;
        r.set_cond(a1, ctl);
        r
    }

    // Invert this value (constant-time), by raising it to n - 2 with
    // fixed 4-bit windows. Zero is mapped to zero.
    pub fn set_invert(&mut self) {
        const E: [u64; 4] = [
            0xBFD25E8CD036413F, 0xBAAEDCE6AF48A03B,
            0xFFFFFFFFFFFFFFFE, 0xFFFFFFFFFFFFFFFF,
        ];

        // win[i] = x^i
        let x = *self;
        let mut win = [Self::ONE; 16];
        win[1] = x;
        for i in 2..16 {
            win[i] = win[i - 1] * x;
        }

        // The exponent is public, hence direct indexing is fine.
        let mut r = Self::ONE;
        for i in (0..64).rev() {
            let nib = ((E[i >> 4] >> ((i & 15) << 2)) & 15) as usize;
            for _ in 0..4 {
                r = r.square();
            }
            r *= win[nib];
        }
        *self = r;
    }

    #[inline(always)]
    pub fn invert(&self) -> Self {
        let mut r = *self;
        r.set_invert();
        r
    }

    // Invert this value (variable-time). Zero is mapped to zero.
    pub fn invert_vartime(&self) -> Self {
        Self(inv_vartime(&self.0, &N))
    }

    // Get `count` bits starting at bit `offset`; the bits must all lie
    // in the same 64-bit limb, and count must be lower than 32. The
    // offset is not secret, but the value is; this is constant-time.
    #[inline]
    pub fn get_bits(&self, offset: usize, count: usize) -> u32 {
        debug_assert!((offset >> 6) == ((offset + count - 1) >> 6));
        ((self.0[offset >> 6] >> (offset & 63)) & ((1u64 << count) - 1)) as u32
    }

    // Get `count` bits starting at bit `offset`, with no alignment
    // constraint (count must be lower than 32). Bits beyond the top are
    // zero.
    pub fn get_bits_vartime(&self, offset: usize, count: usize) -> u32 {
        debug_assert!(count < 32 && offset + count <= 256);
        if (offset >> 6) == ((offset + count - 1) >> 6) {
            self.get_bits(offset, count)
        } else {
            let lo = self.0[offset >> 6] >> (offset & 63);
            let hi = self.0[(offset >> 6) + 1] << (64 - (offset & 63));
            ((lo | hi) & ((1u64 << count) - 1)) as u32
        }
    }

    // Low and high 128-bit halves of the value.
    #[inline]
    pub fn to_u128_halves(&self) -> (u128, u128) {
        let lo = (self.0[0] as u128) | ((self.0[1] as u128) << 64);
        let hi = (self.0[2] as u128) | ((self.0[3] as u128) << 64);
        (lo, hi)
    }

    // Decode 32 bytes (big-endian). Returned values are (s, r): if the
    // source value was lower than n, then s is that value and r is
    // 0xFFFFFFFF; otherwise, s is the value reduced modulo n and r is 0.
    pub fn decode(buf: &[u8; 32]) -> (Self, u32) {
        let mut d = [0u64; 4];
        for i in 0..4 {
            let mut w = [0u8; 8];
            w.copy_from_slice(&buf[(24 - 8 * i)..(32 - 8 * i)]);
            d[i] = u64::from_be_bytes(w);
        }
        let mut bb = 0u8;
        for i in 0..4 {
            let (_, b) = subborrow_u64(d[i], N[i], bb);
            bb = b;
        }
        // bb = 1 if and only if the value is lower than n.
        let r = Self(Self::reduce_once(d, 0));
        (r, (bb as u32).wrapping_neg())
    }

    // Decode up to 64 bytes (big-endian) with reduction modulo n.
    pub fn decode_reduce(buf: &[u8]) -> Self {
        assert!(buf.len() <= 64);
        let mut tmp = [0u8; 64];
        tmp[(64 - buf.len())..].copy_from_slice(buf);
        let mut l = [0u64; 8];
        for i in 0..8 {
            let mut w = [0u8; 8];
            w.copy_from_slice(&tmp[(56 - 8 * i)..(64 - 8 * i)]);
            l[i] = u64::from_be_bytes(w);
        }
        tmp.zeroize();
        let r = Self(Self::reduce512(&l));
        l.zeroize();
        r
    }

    // Encode this scalar over 32 bytes (big-endian).
    pub fn encode(&self) -> [u8; 32] {
        let mut buf = [0u8; 32];
        for i in 0..4 {
            buf[(24 - 8 * i)..(32 - 8 * i)].copy_from_slice(&self.0[i].to_be_bytes());
        }
        buf
    }

    // Computes round(e*k/n), for k < n and e < 2^128.
    //
    // We use round(e*k/n) = floor((e*k + (n-1)/2)/n), and the numerator
    // is lower than 2^384. The division by n is done with the
    // Granlund-Montgomery method ("Division by Invariant Integers using
    // Multiplication"): for a 384-bit dividend, the multiplier is the
    // 382-bit value M below and the quotient is floor((M*z)/2^637).
    fn mul_divr_rounded(k: &[u64; 4], e: u128) -> u128 {
        const M: [u64; 6] = [
            0xBCD2FEBC8B79A0F9, 0x13ACE39AB038D378,
            0x8805B42E65F937D8, 0x28AA24632A16EBF8,
            0x0000000000000000, 0x2000000000000000,
        ];

        // (n-1)/2
        const HN: [u64; 6] = [
            0xDFE92F46681B20A0, 0x5D576E7357A4501D,
            0xFFFFFFFFFFFFFFFF, 0x7FFFFFFFFFFFFFFF,
            0, 0,
        ];

        // z <- k*e + (n-1)/2
        let ee = [e as u64, (e >> 64) as u64];
        let mut z = [0u64; 6];
        for i in 0..4 {
            let (d, h) = umull_add(k[i], ee[0], z[i]);
            z[i] = d;
            let (d, h) = umull_add2(k[i], ee[1], z[i + 1], h);
            z[i + 1] = d;
            z[i + 2] = h;
        }
        let mut cc = 0u8;
        for i in 0..6 {
            let (d, c) = addcarry_u64(z[i], HN[i], cc);
            z[i] = d;
            cc = c;
        }

        // t <- M*z
        let mut t = [0u64; 12];
        for i in 0..6 {
            let mut cc = 0u64;
            for j in 0..6 {
                let (d, h) = umull_add2(M[i], z[j], t[i + j], cc);
                t[i + j] = d;
                cc = h;
            }
            t[i + 6] = cc;
        }

        // q = floor(t / 2^637)
        let q0 = (t[9] >> 61) | (t[10] << 3);
        let q1 = (t[10] >> 61) | (t[11] << 3);
        (q0 as u128) | ((q1 as u128) << 64)
    }

    // Split this scalar k into k0 and k1 (signed) such that
    // k = k0 + k1*LAMBDA mod n, with |k0| < 2^128 and |k1| < 2^128.
    //
    // Returned values are |k0|, sgn(k0), |k1| and sgn(k1), with sgn(x) =
    // 0xFFFFFFFF for x < 0, 0 for x >= 0. This is constant-time.
    //
    // The lattice of pairs (x, y) such that x + y*LAMBDA = 0 mod n has the
    // reduced basis v1 = (s, -t), v2 = (s + t, s) for the two 128-bit
    // constants s and t below. With c = round(s*k/n) and d = round(t*k/n),
    // (k0, k1) = (k, 0) - c*v1 - d*v2 is within the fundamental domain
    // of the basis, which bounds both halves.
    pub fn split_lambda(&self) -> (u128, u32, u128, u32) {
        const S: u128 = 0x3086D221A7D46BCDE86C90E49284EB15;
        const T: u128 = 0xE4437ED6010E88286F547FA90ABFE4C3;
        // s + t is a 129-bit value.
        const ST: [u64; 3] = [ 0x57C1108D9D44CFD8, 0x14CA50F7A8E2F3F6, 1 ];

        let c = Self::mul_divr_rounded(&self.0, S);
        let d = Self::mul_divr_rounded(&self.0, T);

        // Since |k0| and |k1| are lower than 2^128, computations can be
        // done modulo 2^192.
        let k = [ self.0[0], self.0[1], self.0[2] ];
        let cw = w192(c);
        let dw = w192(d);
        let sw = w192(S);
        let tw = w192(T);

        // k0 = k - c*s - d*(s + t)
        let k0 = sub192(&sub192(&k, &mul192(&cw, &sw)), &mul192(&dw, &ST));

        // k1 = c*t - d*s
        let k1 = sub192(&mul192(&cw, &tw), &mul192(&dw, &sw));

        let (a0, s0) = abs192(&k0);
        let (a1, s1) = abs192(&k1);
        return (a0, s0, a1, s1);

        fn w192(x: u128) -> [u64; 3] {
            [ x as u64, (x >> 64) as u64, 0 ]
        }

        // a - b mod 2^192
        fn sub192(a: &[u64; 3], b: &[u64; 3]) -> [u64; 3] {
            let (d0, c) = subborrow_u64(a[0], b[0], 0);
            let (d1, c) = subborrow_u64(a[1], b[1], c);
            let (d2, _) = subborrow_u64(a[2], b[2], c);
            [ d0, d1, d2 ]
        }

        // a*b mod 2^192
        fn mul192(a: &[u64; 3], b: &[u64; 3]) -> [u64; 3] {
            let (d0, h) = umull_add(a[0], b[0], 0);
            let (d1, h) = umull_add(a[0], b[1], h);
            let d2 = h.wrapping_add(a[0].wrapping_mul(b[2]));
            let (d1, h) = umull_add(a[1], b[0], d1);
            let d2 = d2.wrapping_add(h).wrapping_add(a[1].wrapping_mul(b[1]));
            let d2 = d2.wrapping_add(a[2].wrapping_mul(b[0]));
            [ d0, d1, d2 ]
        }

        // Given g with |g| < 2^128, return |g| and sgn(g).
        fn abs192(g: &[u64; 3]) -> (u128, u32) {
            let s = sgnw(g[2]);
            let (d0, c) = subborrow_u64(g[0] ^ s, s, 0);
            let (d1, _) = subborrow_u64(g[1] ^ s, s, c);
            ((d0 as u128) | ((d1 as u128) << 64), s as u32)
        }
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

macro_rules! scalar_binop {
    ($tr:ident, $f:ident, $atr:ident, $af:ident, $set:ident) => {
        impl $tr<Scalar> for Scalar {
            type Output = Scalar;

            #[inline(always)]
            fn $f(self, other: Scalar) -> Scalar {
                let mut r = self;
                r.$set(&other);
                r
            }
        }

        impl $tr<&Scalar> for Scalar {
            type Output = Scalar;

            #[inline(always)]
            fn $f(self, other: &Scalar) -> Scalar {
                let mut r = self;
                r.$set(other);
                r
            }
        }

        impl $tr<Scalar> for &Scalar {
            type Output = Scalar;

            #[inline(always)]
            fn $f(self, other: Scalar) -> Scalar {
                let mut r = *self;
                r.$set(&other);
                r
            }
        }

        impl $tr<&Scalar> for &Scalar {
            type Output = Scalar;

            #[inline(always)]
            fn $f(self, other: &Scalar) -> Scalar {
                let mut r = *self;
                r.$set(other);
                r
            }
        }

        impl $atr<Scalar> for Scalar {
            #[inline(always)]
            fn $af(&mut self, other: Scalar) {
                self.$set(&other);
            }
        }

        impl $atr<&Scalar> for Scalar {
            #[inline(always)]
            fn $af(&mut self, other: &Scalar) {
                self.$set(other);
            }
        }
    };
}

scalar_binop!(Add, add, AddAssign, add_assign, set_add);
scalar_binop!(Sub, sub, SubAssign, sub_assign, set_sub);
scalar_binop!(Mul, mul, MulAssign, mul_assign, set_mul);

impl Neg for Scalar {
    type Output = Scalar;

    #[inline(always)]
    fn neg(self) -> Scalar {
        Scalar::neg(&self)
    }
}

impl Neg for &Scalar {
    type Output = Scalar;

    #[inline(always)]
    fn neg(self) -> Scalar {
        Scalar::neg(self)
    }
}

// ========================================================================

#[cfg(test)]
mod tests {

    use super::Scalar;
    use core::convert::TryInto;
    use num_bigint::{BigInt, Sign};
    use sha2::{Sha256, Sha512, Digest};

    fn order() -> BigInt {
        BigInt::from_bytes_be(Sign::Plus, &hex::decode(
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141")
            .unwrap())
    }

    fn to_int(x: &Scalar) -> BigInt {
        BigInt::from_bytes_be(Sign::Plus, &x.encode())
    }

    fn check_ops(va: &[u8; 32], vb: &[u8; 32]) {
        let zn = order();
        let zva = BigInt::from_bytes_be(Sign::Plus, va);
        let (a, ra) = Scalar::decode(va);
        assert!((ra == 0xFFFFFFFF) == (zva < zn));
        let za = &zva % &zn;
        assert!(to_int(&a) == za);
        let (b, _) = Scalar::decode(vb);
        let zb = BigInt::from_bytes_be(Sign::Plus, vb) % &zn;

        assert!(to_int(&(a + b)) == (&za + &zb) % &zn);
        assert!(to_int(&(a - b)) == ((&za - &zb) % &zn + &zn) % &zn);
        assert!(to_int(&(a * b)) == (&za * &zb) % &zn);
        assert!(to_int(&a.square()) == (&za * &za) % &zn);
        assert!(to_int(&-a) == (&zn - &za) % &zn);
        assert!((a + (-a)).is_zero() == 0xFFFFFFFF);

        let hn = &zn >> 1;
        assert!((a.is_high() == 0xFFFFFFFF) == (za > hn));

        let mut c = a;
        c.set_condneg(0);
        assert!(c.equals(&a) == 0xFFFFFFFF);
        c.set_condneg(0xFFFFFFFF);
        assert!(c.equals(&-a) == 0xFFFFFFFF);

        if a.is_zero() == 0 {
            let ai = a.invert();
            assert!((a * ai).is_one() == 0xFFFFFFFF);
            assert!(ai.equals(&a.invert_vartime()) == 0xFFFFFFFF);
        } else {
            assert!(a.invert().is_zero() == 0xFFFFFFFF);
            assert!(a.invert_vartime().is_zero() == 0xFFFFFFFF);
        }

        // k = k0 + k1*lambda
        let (k0, s0, k1, s1) = a.split_lambda();
        let mut x0 = Scalar([ k0 as u64, (k0 >> 64) as u64, 0, 0 ]);
        x0.set_condneg(s0);
        let mut x1 = Scalar([ k1 as u64, (k1 >> 64) as u64, 0, 0 ]);
        x1.set_condneg(s1);
        assert!((x0 + x1 * Scalar::LAMBDA).equals(&a) == 0xFFFFFFFF);
    }

    #[test]
    fn scalar_ops() {
        let mut va = [0u8; 32];
        let mut vb = [0u8; 32];
        check_ops(&va, &vb);
        va[31] = 1;
        check_ops(&va, &vb);
        for i in 0..32 {
            va[i] = 0xFF;
            vb[i] = 0xFF;
        }
        check_ops(&va, &vb);
        let mut sh = Sha256::new();
        for i in 0..300 {
            sh.update(((2 * i + 0) as u64).to_le_bytes());
            let va: [u8; 32] = sh.finalize_reset().into();
            sh.update(((2 * i + 1) as u64).to_le_bytes());
            let vb: [u8; 32] = sh.finalize_reset().into();
            check_ops(&va, &vb);
        }
    }

    #[test]
    fn scalar_bounds() {
        let vn: [u8; 32] = order().to_bytes_be().1.try_into().unwrap();
        let (s, r) = Scalar::decode(&vn);
        assert!(r == 0);
        assert!(s.is_zero() == 0xFFFFFFFF);

        let mut vm = vn;
        vm[31] -= 1;
        let (s, r) = Scalar::decode(&vm);
        assert!(r == 0xFFFFFFFF);
        assert!(s.encode() == vm);
        assert!(s.is_high() == 0xFFFFFFFF);
        assert!((s + Scalar::ONE).is_zero() == 0xFFFFFFFF);
        assert!(s.neg().is_one() == 0xFFFFFFFF);

        // n/2 is not high, n/2 + 1 is.
        let h = Scalar(super::HALF_N);
        assert!(h.is_high() == 0);
        assert!((h + Scalar::ONE).is_high() == 0xFFFFFFFF);
        assert!(Scalar::ZERO.neg().is_zero() == 0xFFFFFFFF);
        assert!(Scalar::ONE.is_even() == 0);
        assert!(Scalar::ZERO.is_even() == 0xFFFFFFFF);
    }

    #[test]
    fn scalar_decode_reduce() {
        let zn = order();
        let mut sh = Sha512::new();
        for i in 0..100 {
            sh.update((i as u64).to_le_bytes());
            let v = sh.finalize_reset();
            let s = Scalar::decode_reduce(&v[..]);
            assert!(to_int(&s) == BigInt::from_bytes_be(Sign::Plus, &v[..]) % &zn);
        }
        let s = Scalar::decode_reduce(&[0xFFu8; 64]);
        let z = (BigInt::from(1u8) << 512) - 1u8;
        assert!(to_int(&s) == z % &zn);
    }

    #[test]
    fn scalar_bits() {
        let s = Scalar::w64be(
            0x0123456789ABCDEF, 0xFEDCBA9876543210,
            0x0F1E2D3C4B5A6978, 0x8796A5B4C3D2E1F0);
        assert!(s.get_bits(0, 4) == 0x0);
        assert!(s.get_bits(4, 4) == 0xF);
        assert!(s.get_bits(252, 4) == 0x0);
        assert!(s.get_bits(248, 4) == 0x1);
        assert!(s.get_bits_vartime(60, 8) == 0x88);
        assert!(s.get_bits_vartime(188, 8) == 0xFF);
        let (lo, hi) = s.to_u128_halves();
        assert!(lo == 0x0F1E2D3C4B5A69788796A5B4C3D2E1F0);
        assert!(hi == 0x0123456789ABCDEFFEDCBA9876543210);
    }
}
