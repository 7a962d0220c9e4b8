//! Constant-time multiplication of the generator.
//!
//! The scalar is processed in 64 windows of 4 bits. Row j of the table
//! holds the 16 points `i*(16^j)*G + U_j` (for i = 0 to 15), where the
//! offsets U_j are multiples of a point with no known discrete logarithm
//! and sum to zero; this way, no table entry is the point-at-infinity and
//! the 64 additions never hit a special case in practice. Each lookup
//! reads all 16 entries of the row.
//!
//! Blinding: the engine keeps a scalar b and the point `-b*G` (held in
//! `blind` and `initial` as `-b` and `b*G`, respectively), and computes
//! `k*G` as `initial + (k + blind)*G`, so that the table lookups are
//! driven by a value unrelated to k. The projective coordinates of the
//! initial point are also randomized.

#![allow(non_snake_case)]

use zeroize::Zeroize;

use crate::field::FieldElement;
use crate::group::{Affine, AffineStorage, Jacobian};
use crate::hash::Rfc6979HmacSha256;
use crate::scalar::Scalar;
use crate::Vec;

// U = N + G, where N is the point with even y whose x coordinate is
// the ASCII string "The scalar for this x is unknown" (interpreted as a
// big-endian integer); nobody knows the discrete logarithm of N.
const NUMS: Affine = Affine::from_xy_const(
    FieldElement::w64be(
        0x3A9ED3736EED3EEC, 0x9AEB5AC021B54652,
        0x56817B1F08DE6CD0, 0xFBCEE548BA044BB5),
    FieldElement::w64be(
        0x7BCC5928BDC9C023, 0xDFC663B89E4F6969,
        0xAB7517988E600EC1, 0xD242010C45C7974A));

/// Precomputed table and blinding state for `k*G`.
#[derive(Clone)]
pub struct EcmultGen {
    prec: Vec<[AffineStorage; 16]>,
    blind: Scalar,
    initial: Jacobian,
}

impl EcmultGen {

    /// Build the table and set the default blinding.
    pub fn new() -> Self {
        let mut r = Self {
            prec: Self::build_table(),
            blind: Scalar::ZERO,
            initial: Jacobian::INFINITY,
        };
        r.blind(None);
        r
    }

    fn build_table() -> Vec<[AffineStorage; 16]> {
        // U_j = 2^j*U for j < 63, and U_63 = (1 - 2^63)*U.
        let nums = Jacobian::from_affine(&NUMS);

        let mut pts = Vec::with_capacity(64 * 16);
        let mut gbase = Jacobian::from_affine(&Affine::GENERATOR);
        let mut numsbase = nums;
        for j in 0..64 {
            let mut P = numsbase;
            pts.push(P);
            for _ in 1..16 {
                P = P.add_vartime(&gbase);
                pts.push(P);
            }
            gbase.set_xdouble(4);
            numsbase.set_double();
            if j == 62 {
                numsbase = numsbase.neg().add_vartime(&nums);
            }
        }

        let mut aff = Vec::with_capacity(pts.len());
        aff.resize(pts.len(), Affine::INFINITY);
        Affine::batch_from_jacobian_vartime(&mut aff[..], &pts[..]);

        let mut prec = Vec::with_capacity(64);
        for j in 0..64 {
            let mut row = [AffineStorage::ZERO; 16];
            for i in 0..16 {
                row[i] = aff[j * 16 + i].to_storage();
            }
            prec.push(row);
        }
        prec
    }

    /// Compute `k*G` (constant-time).
    pub fn gen(&self, k: &Scalar) -> Jacobian {
        let mut r = self.initial;
        let mut gnb = k + &self.blind;
        let mut add = AffineStorage::ZERO;
        for j in 0..64 {
            let bits = gnb.get_bits(j * 4, 4);
            for i in 0..16 {
                // All entries are read; the mask selects the right one.
                let w = (i as u32) ^ bits;
                let ctl = ((w | w.wrapping_neg()) >> 31).wrapping_sub(1);
                add.set_cond(&self.prec[j][i], ctl);
            }
            r = r.add_affine(&Affine::from_storage(&add));
        }
        gnb.zeroize();
        add.zeroize();
        r
    }

    /// Re-derive the blinding from the previous blinding value and an
    /// optional 32-byte seed. Without a seed, the blinding is first reset
    /// to its default state, so that the outcome is deterministic.
    pub fn blind(&mut self, seed32: Option<&[u8; 32]>) {
        if seed32.is_none() {
            self.initial = Jacobian::from_affine(&Affine::GENERATOR).neg();
            self.blind = Scalar::ONE;
        }

        // The previous blinding value is chained into the new one.
        let mut keydata = [0u8; 64];
        keydata[..32].copy_from_slice(&self.blind.encode());
        let klen = match seed32 {
            Some(s) => {
                keydata[32..].copy_from_slice(s);
                64
            }
            None => 32,
        };
        let mut rng = Rfc6979HmacSha256::new(&keydata[..klen]);
        keydata.zeroize();

        // Out-of-range outputs are retried so that values are uniform;
        // this happens with negligible probability.
        let mut buf = [0u8; 32];
        let mut s = loop {
            rng.generate(&mut buf);
            let (s, ok) = FieldElement::decode(&buf);
            if (ok & !s.is_zero()) != 0 {
                break s;
            }
        };
        self.initial.rescale(&s);
        s.zeroize();

        let mut b = loop {
            rng.generate(&mut buf);
            let (b, ok) = Scalar::decode(&buf);
            if (ok & !b.is_zero()) != 0 {
                break b;
            }
        };
        rng.finalize();
        buf.zeroize();

        let mut gb = self.gen(&b);
        b.set_neg();
        self.blind = b;
        self.initial = gb;
        b.zeroize();
        gb.zeroize();
    }
}

impl Drop for EcmultGen {
    fn drop(&mut self) {
        for row in self.prec.iter_mut() {
            for e in row.iter_mut() {
                e.zeroize();
            }
        }
        self.blind.zeroize();
        self.initial.zeroize();
    }
}

// ========================================================================

#[cfg(test)]
mod tests {

    use super::{EcmultGen, NUMS};
    use crate::field::FieldElement;
    use crate::group::{Affine, Jacobian};
    use crate::scalar::Scalar;

    // Plain double-and-add over the group law.
    fn mul_ref(k: &Scalar) -> Jacobian {
        let mut r = Jacobian::INFINITY;
        let G = Affine::GENERATOR;
        for i in (0..256).rev() {
            r.set_double();
            if k.get_bits_vartime(i, 1) != 0 {
                r = r.add_affine_vartime(&G);
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

    #[test]
    fn gen_vector() {
        let ctx = EcmultGen::new();
        let s = Scalar::w64be(0xF0FCA55C06488D1C, 0x6CA454ED29573B6C,
                              0x89D4F76592F96F10, 0x98BD4A5F08DF863E);
        let R = Affine::from_jacobian(&ctx.gen(&s));
        assert!(R.y.is_odd() == 0);
        assert!(hex::encode_upper(R.x.encode())
            == "08289C906282497194389EA32BD63518ADEAE84C179FEA6FD2531A71144C94FA");
    }

    #[test]
    fn nums_point() {
        let nx = FieldElement::decode(b"The scalar for this x is unknown").0;
        let N = Affine::decompress_vartime(&nx, false).unwrap();
        let U = Affine::from_jacobian(
            &Jacobian::from_affine(&N).add_affine(&Affine::GENERATOR));
        assert!(U.x.equals_vartime(&NUMS.x) && U.y.equals_vartime(&NUMS.y));
    }

    #[test]
    fn gen_blinding() {
        let mut ctx = EcmultGen::new();
        let one = Scalar::ONE;
        let ks = [
            Scalar::ZERO,
            one,
            Scalar::from_u32(7),
            -one,
            Scalar::w64be(0x0123456789ABCDEF, 0xFEDCBA9876543210,
                          0xA5A5A5A55A5A5A5A, 0x0F0F0F0FF0F0F0F0),
        ];
        for seed in [None, Some([0x42u8; 32]), Some([0x17u8; 32])] {
            ctx.blind(seed.as_ref());
            for k in ks.iter() {
                assert!(same(&ctx.gen(k), &mul_ref(k)));
            }
        }
        assert!(ctx.gen(&Scalar::ZERO).is_infinity() == 0xFFFFFFFF);

        // Cloning keeps the same tables and blinding state.
        let ctx2 = ctx.clone();
        let k = ks[4];
        assert!(same(&ctx2.gen(&k), &ctx.gen(&k)));
    }
}
