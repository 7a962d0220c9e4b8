//! Variable-time double multiplication `u*P + v*G`.
//!
//! This is the engine behind signature verification and public key
//! tweaking. The scalar u is split with the curve endomorphism into two
//! halves of about 128 bits, applied to P and to zeta(P) = LAMBDA*P; the
//! scalar v is split into its low and high 128-bit halves, applied to G
//! and to (2^128)*G. The four half-width scalars are recoded in wNAF
//! (width 5 for the per-call windows on P, width 8 for the precomputed
//! windows on G), and the four sequences are processed in a single
//! double-and-add loop of about 129 doublings.
//!
//! THESE FUNCTIONS ARE NOT CONSTANT-TIME; they shall be used only with
//! public data.

#![allow(non_snake_case)]

use crate::group::{Affine, AffineStorage, Jacobian};
use crate::scalar::Scalar;
use crate::Vec;

// Window width for the per-call tables.
const WINDOW_A: u32 = 5;

// Window width for the precomputed tables on G.
const WINDOW_G: u32 = 8;

// Number of odd multiples in a table for window width w.
const fn table_size(w: u32) -> usize {
    1usize << (w - 2)
}

/// Precomputed tables for `u*P + v*G`.
///
/// The tables contain the odd multiples `(2*i+1)*G` and
/// `(2*i+1)*(2^128)*G` for i = 0 to 63.
#[derive(Clone)]
pub struct Ecmult {
    pre_g: Vec<AffineStorage>,
    pre_g128: Vec<AffineStorage>,
}

impl Ecmult {

    /// Build the tables.
    pub fn new() -> Self {
        let G = Jacobian::from_affine(&Affine::GENERATOR);
        let mut G128 = G;
        G128.set_xdouble(128);
        Self {
            pre_g: Self::odd_multiples_storage(&G),
            pre_g128: Self::odd_multiples_storage(&G128),
        }
    }

    fn odd_multiples_storage(P: &Jacobian) -> Vec<AffineStorage> {
        let n = table_size(WINDOW_G);
        let mut aff = Vec::with_capacity(n);
        aff.resize(n, Affine::INFINITY);
        odd_multiples(P, &mut aff[..]);
        aff.iter().map(|A| A.to_storage()).collect()
    }

    /// Compute `u*P + v*G`.
    pub fn mul_add_mulgen_vartime(&self,
        P: &Jacobian, u: &Scalar, v: &Scalar) -> Jacobian
    {
        // Windows over P (only if the P part contributes).
        let mut win0 = [Affine::INFINITY; table_size(WINDOW_A)];
        let mut win1 = [Affine::INFINITY; table_size(WINDOW_A)];
        let mut sd0 = [0i8; 130];
        let mut sd1 = [0i8; 130];
        if P.is_infinity() == 0 && u.is_zero() == 0 {
            // Split the first scalar with the endomorphism:
            //   win0[i] = (2*i+1)*sgn(u0)*P
            //   win1[i] = (2*i+1)*sgn(u1)*zeta(P)
            let (u0, s0, u1, s1) = u.split_lambda();
            odd_multiples(P, &mut win0[..]);
            for i in 0..win0.len() {
                win1[i] = win0[i].zeta();
                if s0 != 0 {
                    win0[i].set_neg();
                }
                if s1 != 0 {
                    win1[i].set_neg();
                }
            }
            sd0 = recode_u128_wnaf(u0, WINDOW_A);
            sd1 = recode_u128_wnaf(u1, WINDOW_A);
        }

        // Low and high halves of the second scalar.
        let (v0, v1) = v.to_u128_halves();
        let sd2 = recode_u128_wnaf(v0, WINDOW_G);
        let sd3 = recode_u128_wnaf(v1, WINDOW_G);

        let mut R = Jacobian::INFINITY;
        let mut zz = true;
        let mut ndbl = 0u32;
        for i in (0..130).rev() {
            // We have one more doubling to perform.
            ndbl += 1;

            // Get next digits. If they are all zeros, then we can loop
            // immediately.
            let e0 = sd0[i];
            let e1 = sd1[i];
            let e2 = sd2[i];
            let e3 = sd3[i];
            if ((e0 as u32) | (e1 as u32) | (e2 as u32) | (e3 as u32)) == 0 {
                continue;
            }

            // Apply accumulated doubles.
            if zz {
                zz = false;
            } else {
                R.set_xdouble(ndbl);
            }
            ndbl = 0u32;

            // Process digits.
            if e0 != 0 {
                R = add_digit(&R, &win0[(e0.unsigned_abs() >> 1) as usize], e0 < 0);
            }
            if e1 != 0 {
                R = add_digit(&R, &win1[(e1.unsigned_abs() >> 1) as usize], e1 < 0);
            }
            if e2 != 0 {
                let A = Affine::from_storage(&self.pre_g[(e2.unsigned_abs() >> 1) as usize]);
                R = add_digit(&R, &A, e2 < 0);
            }
            if e3 != 0 {
                let A = Affine::from_storage(&self.pre_g128[(e3.unsigned_abs() >> 1) as usize]);
                R = add_digit(&R, &A, e3 < 0);
            }
        }

        if !zz && ndbl > 0 {
            R.set_xdouble(ndbl);
        }
        R
    }
}

#[inline]
fn add_digit(R: &Jacobian, A: &Affine, neg: bool) -> Jacobian {
    if neg {
        R.add_affine_vartime(&A.neg())
    } else {
        R.add_affine_vartime(A)
    }
}

// Fill `out` with the odd multiples (2*i+1)*P, in affine coordinates
// (P must not be the point-at-infinity).
fn odd_multiples(P: &Jacobian, out: &mut [Affine]) {
    let n = out.len();
    let mut tmp = Vec::with_capacity(n);
    let Q = P.double();
    tmp.push(*P);
    for i in 1..n {
        let T = tmp[i - 1].add_vartime(&Q);
        tmp.push(T);
    }
    Affine::batch_from_jacobian_vartime(out, &tmp[..]);
}

// wNAF recoding of a 128-bit integer with window width w (2 <= w <= 8).
//
// 129 digits are produced (the array has size 130, the extra value is
// 0). Non-zero digits are odd and lie between -(2^(w-1) - 1) and
// +(2^(w-1) - 1); after each non-zero digit, at least w - 1 zeros follow.
// The recoding itself is branchless.
//
// Let y be the current integer:
//  - If y is even, then the next digit is 0.
//  - Otherwise, we produce a digit d from the low w bits v of y: if
//    v < 2^(w-1), then d = v, otherwise d = v - 2^w. Then y is replaced
//    with y - d, which is a multiple of 2^w.
// Once the digit has been produced, we divide y by 2 and loop.
fn recode_u128_wnaf(n: u128, w: u32) -> [i8; 130] {
    let mask = (1u32 << w) - 1;
    let half = 1u32 << (w - 1);
    let mut sd = [0i8; 130];
    let mut y = n;
    for i in 0..129 {
        let x = y as u32;
        let m = (x & 1).wrapping_neg();  // -1 if y is odd, 0 otherwise
        let v = x & m & mask;            // low w bits if y odd, or 0
        let c = (v & half) << 1;         // carry (0 or 2^w)
        sd[i] = v.wrapping_sub(c) as i8;

        // (y - d)/2 without overflow when y is close to 2^128.
        y = ((y - (v as u128)) >> 1) + ((c >> 1) as u128);
    }
    sd
}

// ========================================================================

#[cfg(test)]
mod tests {

    use super::{Ecmult, recode_u128_wnaf};
    use crate::ecmult_gen::EcmultGen;
    use crate::field::FieldElement;
    use crate::hash::Sha256;
    use crate::group::{Affine, Jacobian};
    use crate::scalar::Scalar;

    fn mul_ref(P: &Jacobian, k: &Scalar) -> Jacobian {
        let mut r = Jacobian::INFINITY;
        for i in (0..256).rev() {
            r.set_double();
            if k.get_bits_vartime(i, 1) != 0 {
                r = r.add_vartime(P);
            }
        }
        r
    }

    fn same(a: &Jacobian, b: &Jacobian) -> bool {
        if a.is_infinity() != 0 || b.is_infinity() != 0 {
            return a.is_infinity() == b.is_infinity();
        }
        let pa = Affine::from_jacobian_vartime(a);
        let pb = Affine::from_jacobian_vartime(b);
        pa.x.equals_vartime(&pb.x) && pa.y.equals_vartime(&pb.y)
    }

    fn point(hexcomp: &str) -> Jacobian {
        let mut buf = [0u8; 33];
        hex::decode_to_slice(hexcomp, &mut buf).unwrap();
        let mut xb = [0u8; 32];
        xb.copy_from_slice(&buf[1..]);
        let (x, _) = FieldElement::decode(&xb);
        Jacobian::from_affine(&Affine::decompress_vartime(&x, buf[0] == 0x03).unwrap())
    }

    #[test]
    fn wnaf() {
        for &w in [5u32, 8].iter() {
            for &n in [0u128, 1, 0xFF, 0x1234_5678_9ABC_DEF0_0FED_CBA9_8765_4321,
                u128::MAX, u128::MAX - 0x80, 1u128 << 127].iter()
            {
                let sd = recode_u128_wnaf(n, w);
                // The digits rebuild the value (modulo 2^128).
                let mut acc = 0u128;
                for i in (0..130).rev() {
                    let d = sd[i] as i32;
                    if d != 0 {
                        assert!((d & 1) == 1);
                        assert!(d.abs() < (1i32 << (w - 1)));
                    }
                    acc = acc.wrapping_mul(2).wrapping_add(d as i128 as u128);
                }
                assert!(acc == n);

                // Non-zero digits are separated by at least w - 1 zeros.
                let mut last: Option<usize> = None;
                for i in 0..130 {
                    if sd[i] != 0 {
                        if let Some(j) = last {
                            assert!(i - j >= w as usize);
                        }
                        last = Some(i);
                    }
                }
            }
        }
    }

    #[test]
    fn mul_add() {
        let ctx = Ecmult::new();
        let G = Jacobian::from_affine(&Affine::GENERATOR);

        // P = 0x1234567*G
        let P = point("02d47644539acec3da5e3ecf5fe8863c628a9c97e8b71e9ea9167a6f4f83c03c32");
        assert!(same(&P, &mul_ref(&G, &Scalar::from_u32(0x1234567))));
        let u = Scalar::w64be(0xC0FFEE0123456789, 0xABCDEF0011223344,
                              0x556677889900AABB, 0xCCDDEEFF00112233);
        let v = Scalar::w64be(0x0FEDCBA987654321, 0xDEADBEEFCAFEBABE,
                              0x0102030405060708, 0x090A0B0C0D0E0F10);
        let R = ctx.mul_add_mulgen_vartime(&P, &u, &v);
        assert!(same(&R, &point("021c23f8f7570f8960fd6383bc50e44ffcf9341a9729a4c1efad2bc38f482a530b")));

        // Edge scalars, compared with double-and-add.
        let ks = [Scalar::ZERO, Scalar::ONE, -Scalar::ONE, Scalar::LAMBDA,
            Scalar::from_u32(0xFFFFFFFF), u, v];
        for a in ks.iter() {
            for b in ks.iter() {
                let R = ctx.mul_add_mulgen_vartime(&P, a, b);
                let E = mul_ref(&P, a).add_vartime(&mul_ref(&G, b));
                assert!(same(&R, &E));
            }
        }

        // u*P + v*G with P = -(v/u)*G gives the point-at-infinity.
        let k = v * u.invert();
        let Q = mul_ref(&G, &k).neg();
        assert!(ctx.mul_add_mulgen_vartime(&Q, &u, &v).is_infinity() != 0);

        // The point-at-infinity as P.
        let R = ctx.mul_add_mulgen_vartime(&Jacobian::INFINITY, &u, &v);
        assert!(same(&R, &mul_ref(&G, &v)));
    }

    #[test]
    fn engines_agree() {
        let mult = Ecmult::new();
        let mut gen = EcmultGen::new();
        gen.blind(Some(&[0x5Au8; 32]));
        let G = Jacobian::from_affine(&Affine::GENERATOR);
        for i in 0..300u32 {
            let k = Scalar::decode_reduce(&Sha256::hash(i.to_le_bytes()));
            let R = gen.gen(&k);
            assert!(same(&R, &mult.mul_add_mulgen_vartime(&G, &k, &Scalar::ZERO)));
            assert!(same(&R, &mult.mul_add_mulgen_vartime(
                &Jacobian::INFINITY, &Scalar::ZERO, &k)));
        }
    }
}
