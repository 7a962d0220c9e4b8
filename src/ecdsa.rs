//! ECDSA signatures over secp256k1.
//!
//! A signature is a pair of scalars (r, s). Two encodings are supported:
//! strict DER (at most 72 bytes) and the 64-byte compact format (r and s
//! as 32-byte big-endian values). Signatures produced by this module
//! always have a "low" s (at most (n-1)/2), and verification rejects
//! signatures with a high s; `Signature::normalize()` converts the
//! other form.
//!
//! Nonces are obtained from a `NonceFunction` (RFC 6979 by default),
//! queried with an increasing counter until a usable nonce is found.

#![allow(non_snake_case)]

use core::cmp::Ordering;
use zeroize::Zeroize;

use crate::context::Context;
use crate::ecmult::Ecmult;
use crate::eckey::{seckey_load, PublicKey};
use crate::error::Error;
use crate::field::FieldElement;
use crate::group::{Affine, Jacobian};
use crate::nonce::{NonceFunction, NONCE_FUNCTION_DEFAULT};
use crate::scalar::Scalar;
use crate::Vec;

// The group order n, as a field element.
const ORDER_AS_FE: FieldElement = FieldElement::w64be(
    0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFE,
    0xBAAEDCE6AF48A03B, 0xBFD25E8CD0364141);

// p - n
const P_MINUS_ORDER: FieldElement = FieldElement::w64be(
    0, 1, 0x4551231950B75FC4, 0x402DA1722FC9BAEE);

/// An ECDSA signature.
#[derive(Clone, Copy, Debug)]
pub struct Signature {
    r: Scalar,
    s: Scalar,
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        (self.r.equals(&other.r) & self.s.equals(&other.s)) != 0
    }
}

impl Eq for Signature {}

// Read a DER length. Only the shortest encoding is accepted.
fn der_read_len(buf: &[u8], pos: &mut usize) -> Option<usize> {
    let b1 = *buf.get(*pos)?;
    *pos += 1;
    if b1 == 0xFF {
        return None;
    }
    if (b1 & 0x80) == 0 {
        return Some(b1 as usize);
    }
    if b1 == 0x80 {
        // indefinite length
        return None;
    }
    let mut lenleft = (b1 & 0x7F) as usize;
    if lenleft > buf.len() - *pos {
        return None;
    }
    if buf[*pos] == 0 {
        return None;
    }
    if lenleft > core::mem::size_of::<usize>() {
        return None;
    }
    let mut ret = 0usize;
    while lenleft > 0 {
        ret = (ret << 8) | (buf[*pos] as usize);
        if ret + lenleft > buf.len() - *pos {
            return None;
        }
        *pos += 1;
        lenleft -= 1;
    }
    if ret < 128 {
        return None;
    }
    Some(ret)
}

// Read a DER INTEGER. Negative values, and values that are not lower
// than n, are returned as zero.
fn der_parse_integer(buf: &[u8], pos: &mut usize) -> Option<Scalar> {
    if buf.get(*pos) != Some(&0x02) {
        return None;
    }
    *pos += 1;
    let mut rlen = der_read_len(buf, pos)?;
    if rlen == 0 || rlen > buf.len() - *pos {
        return None;
    }
    let v = &buf[*pos..];
    if rlen > 1 {
        // Excessive padding with 0x00 or 0xFF.
        if v[0] == 0x00 && (v[1] & 0x80) == 0 {
            return None;
        }
        if v[0] == 0xFF && (v[1] & 0x80) != 0 {
            return None;
        }
    }
    let mut overflow = (v[0] & 0x80) != 0;
    while rlen > 0 && buf[*pos] == 0 {
        rlen -= 1;
        *pos += 1;
    }
    if rlen > 32 {
        overflow = true;
    }
    let mut r = Scalar::ZERO;
    if !overflow {
        let mut ra = [0u8; 32];
        ra[(32 - rlen)..].copy_from_slice(&buf[*pos..(*pos + rlen)]);
        let (x, ok) = Scalar::decode(&ra);
        r.set_cond(&x, ok);
    }
    *pos += rlen;
    Some(r)
}

impl Signature {

    /// Decodes a DER-encoded signature.
    ///
    /// The encoding must be strict DER (a SEQUENCE of two INTEGERs, with
    /// minimal lengths and no trailing garbage). An integer that is
    /// negative or not lower than n is decoded as zero, so that the
    /// resulting signature never verifies.
    pub fn parse_der(buf: &[u8]) -> Result<Self, Error> {
        Self::der_decode(buf).ok_or(Error::InvalidSignature)
    }

    fn der_decode(buf: &[u8]) -> Option<Self> {
        if buf.first() != Some(&0x30) {
            return None;
        }
        let mut pos = 1;
        let len = der_read_len(buf, &mut pos)?;
        if len != buf.len() - pos {
            return None;
        }
        let r = der_parse_integer(buf, &mut pos)?;
        let s = der_parse_integer(buf, &mut pos)?;
        if pos != buf.len() {
            return None;
        }
        Some(Self { r, s })
    }

    /// Decodes a 64-byte compact signature (r and s in big-endian).
    /// Values not lower than n are rejected.
    pub fn parse_compact(buf: &[u8; 64]) -> Result<Self, Error> {
        let mut tmp = [0u8; 32];
        tmp.copy_from_slice(&buf[..32]);
        let (r, okr) = Scalar::decode(&tmp);
        tmp.copy_from_slice(&buf[32..]);
        let (s, oks) = Scalar::decode(&tmp);
        if (okr & oks) == 0 {
            return Err(Error::InvalidSignature);
        }
        Ok(Self { r, s })
    }

    /// Encodes this signature in DER (between 8 and 72 bytes).
    pub fn serialize_der(&self) -> Vec<u8> {
        let mut rb = [0u8; 33];
        let mut sb = [0u8; 33];
        rb[1..].copy_from_slice(&self.r.encode());
        sb[1..].copy_from_slice(&self.s.encode());

        // Minimal INTEGER: strip leading zeros, but keep one if the next
        // byte has its high bit set.
        fn strip(v: &[u8; 33]) -> &[u8] {
            let mut i = 0;
            while i < 32 && v[i] == 0 && v[i + 1] < 0x80 {
                i += 1;
            }
            &v[i..]
        }
        let (r, s) = (strip(&rb), strip(&sb));

        let mut out = Vec::with_capacity(6 + r.len() + s.len());
        out.push(0x30);
        out.push((4 + r.len() + s.len()) as u8);
        out.push(0x02);
        out.push(r.len() as u8);
        out.extend_from_slice(r);
        out.push(0x02);
        out.push(s.len() as u8);
        out.extend_from_slice(s);
        out
    }

    /// Encodes this signature in the 64-byte compact format.
    pub fn serialize_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.encode());
        out[32..].copy_from_slice(&self.s.encode());
        out
    }

    /// Converts this signature to the low-s form. Returned values are
    /// whether s was high, and the normalized signature (which is equal
    /// to the source if s was not high).
    pub fn normalize(&self) -> (bool, Self) {
        let high = self.s.is_high();
        let mut s = self.s;
        s.set_condneg(high);
        (high != 0, Self { r: self.r, s })
    }

    // Core verification (variable-time).
    fn verify_inner(&self, mult: &Ecmult, m: &Scalar, Q: &Affine) -> bool {
        if (self.r.is_zero() | self.s.is_zero()) != 0 {
            return false;
        }
        let sn = self.s.invert_vartime();
        let u1 = &sn * m;
        let u2 = &sn * &self.r;
        let R = mult.mul_add_mulgen_vartime(&Jacobian::from_affine(Q), &u2, &u1);
        if R.is_infinity() != 0 {
            return false;
        }

        // x(R) mod n == r: x(R) is either r or (when r + n < p) r + n.
        let (mut xr, _) = FieldElement::decode(&self.r.encode());
        if R.eq_x_vartime(&xr) {
            return true;
        }
        if xr.cmp_vartime(&P_MINUS_ORDER) != Ordering::Less {
            return false;
        }
        xr += &ORDER_AS_FE;
        xr.normalize_vartime();
        R.eq_x_vartime(&xr)
    }
}

impl Context {

    /// Decodes a DER-encoded signature (see `Signature::parse_der()`).
    pub fn ecdsa_signature_parse_der(&self, input: &[u8]) -> Result<Signature, Error> {
        Signature::parse_der(input)
    }

    /// Decodes a compact signature (see `Signature::parse_compact()`).
    pub fn ecdsa_signature_parse_compact(&self, input64: &[u8; 64])
        -> Result<Signature, Error>
    {
        Signature::parse_compact(input64)
    }

    /// Encodes a signature in DER.
    pub fn ecdsa_signature_serialize_der(&self, sig: &Signature) -> Vec<u8> {
        sig.serialize_der()
    }

    /// Encodes a signature in compact format.
    pub fn ecdsa_signature_serialize_compact(&self, sig: &Signature) -> [u8; 64] {
        sig.serialize_compact()
    }

    /// Converts a signature to the low-s form (see
    /// `Signature::normalize()`).
    pub fn ecdsa_signature_normalize(&self, sig: &Signature) -> (bool, Signature) {
        sig.normalize()
    }

    /// Signs a 32-byte message hash.
    ///
    /// `noncefp` is the nonce function (`None` selects RFC 6979), which
    /// receives `ndata` as extra data. The nonce function is called with
    /// counter values 0, 1, 2... until a nonce yields a valid signature;
    /// if it refuses to provide a nonce, signing fails. This requires the
    /// signing table.
    pub fn ecdsa_sign(&self, msg32: &[u8; 32], seckey: &[u8; 32],
        noncefp: Option<&dyn NonceFunction>, ndata: Option<&[u8; 32]>)
        -> Result<Signature, Error>
    {
        let gen = self.gen()?;
        let noncefp = noncefp.unwrap_or(&NONCE_FUNCTION_DEFAULT);
        let mut sec = seckey_load(seckey)?;
        let m = Scalar::decode(msg32).0;
        let mut counter = 0u32;
        let res = loop {
            let mut nonce32 = match noncefp.nonce(msg32, seckey, None, ndata, counter) {
                Some(n) => n,
                None => break Err(Error::NonceGeneration),
            };
            let (mut k, ok) = Scalar::decode(&nonce32);
            nonce32.zeroize();
            if (ok & !k.is_zero()) != 0 {
                // r = x(k*G) mod n
                let mut R = Affine::from_jacobian(&gen.gen(&k));
                let r = Scalar::decode(&R.x.encode()).0;
                R.zeroize();

                // s = (m + r*x)/k, in low form
                let mut s = k.invert() * (r * &sec + &m);
                k.zeroize();
                if (r.is_zero() | s.is_zero()) == 0 {
                    s.set_condneg(s.is_high());
                    break Ok(Signature { r, s });
                }
                s.zeroize();
            }
            k.zeroize();
            counter = counter.wrapping_add(1);
        };
        sec.zeroize();
        res
    }

    /// Verifies a signature on a 32-byte message hash.
    ///
    /// Signatures with a high s are rejected. This requires the
    /// verification tables (without them, the illegal-argument callback
    /// is invoked and `false` is returned).
    pub fn ecdsa_verify(&self, sig: &Signature, msg32: &[u8; 32], pubkey: &PublicKey) -> bool {
        let mult = match self.mult() {
            Ok(mult) => mult,
            Err(_) => return false,
        };
        if sig.s.is_high() != 0 {
            return false;
        }
        let m = Scalar::decode(msg32).0;
        sig.verify_inner(mult, &m, &pubkey.to_affine())
    }
}

// ========================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use crate::context::{CONTEXT_SIGN, CONTEXT_VERIFY};
    use crate::eckey::seckey_from_seed;
    use crate::hash::Sha256;
    use crate::nonce::BipSchnorrNonce;
    use crate::Arc;

    fn ctx() -> Context {
        Context::new(CONTEXT_SIGN | CONTEXT_VERIFY).unwrap()
    }

    fn compact(r: &str, s: &str) -> [u8; 64] {
        let mut b = [0u8; 64];
        hex::decode_to_slice(r, &mut b[..32]).unwrap();
        hex::decode_to_slice(s, &mut b[32..]).unwrap();
        b
    }

    #[test]
    fn sign_vectors() {
        let ctx = ctx();

        // RFC 6979 with key 1, message "Satoshi Nakamoto".
        let mut one = [0u8; 32];
        one[31] = 1;
        let m = Sha256::hash(b"Satoshi Nakamoto");
        let sig = ctx.ecdsa_sign(&m, &one, None, None).unwrap();
        assert!(sig.serialize_compact() == compact(
            "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8",
            "2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5"));
        let pk = ctx.pubkey_create(&one).unwrap();
        assert!(ctx.ecdsa_verify(&sig, &m, &pk));

        // Key 0x01 * 32, message SHA-256("hello").
        let sk = [0x01u8; 32];
        let m = Sha256::hash(b"hello");
        let sig = ctx.ecdsa_sign(&m, &sk, None, None).unwrap();
        assert!(sig.serialize_compact() == compact(
            "d13b19c8baa53851839efe1fe790b6f6d51028400902bb79d2fa50c65295e0ed",
            "697d0a44907237350d71ab31d6adbc973749cf2c2d1f4096b765c65be58cfca9"));
        let pk = ctx.pubkey_create(&sk).unwrap();
        assert!(hex::encode(pk.serialize_compressed())
            == "031b84c5567b126440995d3ed5aaba0565d71e1834604819ff9c17f5e9d5dd078f");
        assert!(ctx.ecdsa_verify(&sig, &m, &pk));

        // Same, with extra data.
        let sig2 = ctx.ecdsa_sign(&m, &sk, None, Some(&[0x02u8; 32])).unwrap();
        assert!(sig2.serialize_compact() == compact(
            "cd4153c84c806904854081047b87fe039c51150b4f8d8622ea7a587975167487",
            "052caccea62f4aa09982dcfa5028414edcd9b11301c6fa9c52ab063db8dfd44d"));
        assert!(ctx.ecdsa_verify(&sig2, &m, &pk));
        assert!(!ctx.ecdsa_verify(&sig2, &Sha256::hash(b"hellO"), &pk));
    }

    #[test]
    fn sign_verify() {
        let ctx = ctx();
        for i in 0..20u8 {
            let sk = seckey_from_seed(&[i; 32]);
            let pk = ctx.pubkey_create(&sk).unwrap();
            let m = Sha256::hash(&[i, 0x55]);
            let sig = ctx.ecdsa_sign(&m, &sk, None, None).unwrap();
            assert!(!sig.normalize().0);
            assert!(ctx.ecdsa_verify(&sig, &m, &pk));

            // Wrong key, wrong message.
            let pk2 = ctx.pubkey_negate(&pk);
            assert!(!ctx.ecdsa_verify(&sig, &m, &pk2));
            let mut m2 = m;
            m2[5] ^= 0x20;
            assert!(!ctx.ecdsa_verify(&sig, &m2, &pk));

            // High-s form is rejected, normalization restores it.
            let hs = Signature { r: sig.r, s: -sig.s };
            assert!(!ctx.ecdsa_verify(&hs, &m, &pk));
            let (was_high, ns) = ctx.ecdsa_signature_normalize(&hs);
            assert!(was_high && ns == sig);
            let (was_high, ns2) = ns.normalize();
            assert!(!was_high && ns2 == ns);

            // Encodings.
            let der = ctx.ecdsa_signature_serialize_der(&sig);
            assert!(der.len() <= 72);
            assert!(ctx.ecdsa_signature_parse_der(&der).unwrap() == sig);
            let c = ctx.ecdsa_signature_serialize_compact(&sig);
            assert!(ctx.ecdsa_signature_parse_compact(&c).unwrap() == sig);
        }
    }

    #[test]
    fn sign_failures() {
        let ctx = ctx();
        let m = [0x42u8; 32];
        assert!(ctx.ecdsa_sign(&m, &[0u8; 32], None, None) == Err(Error::InvalidSecretKey));
        assert!(ctx.ecdsa_sign(&m, &[0xFFu8; 32], None, None) == Err(Error::InvalidSecretKey));

        // A nonce function that refuses.
        let refuse = |_: &[u8; 32], _: &[u8; 32], _: Option<&[u8; 16]>,
            _: Option<&[u8; 32]>, _: u32| -> Option<[u8; 32]> { None };
        let sk = [0x01u8; 32];
        assert!(ctx.ecdsa_sign(&m, &sk, Some(&refuse), None) == Err(Error::NonceGeneration));

        // A nonce function that returns zero, then an overflowing value,
        // then a valid nonce: the signature uses the third one.
        let picky = |_: &[u8; 32], _: &[u8; 32], _: Option<&[u8; 16]>,
            _: Option<&[u8; 32]>, counter: u32| -> Option<[u8; 32]>
        {
            match counter {
                0 => Some([0u8; 32]),
                1 => Some([0xFFu8; 32]),
                _ => Some([0x07u8; 32]),
            }
        };
        let fixed = |_: &[u8; 32], _: &[u8; 32], _: Option<&[u8; 16]>,
            _: Option<&[u8; 32]>, _: u32| -> Option<[u8; 32]> { Some([0x07u8; 32]) };
        let s1 = ctx.ecdsa_sign(&m, &sk, Some(&picky), None).unwrap();
        let s2 = ctx.ecdsa_sign(&m, &sk, Some(&fixed), None).unwrap();
        assert!(s1 == s2);
        let pk = ctx.pubkey_create(&sk).unwrap();
        assert!(ctx.ecdsa_verify(&s1, &m, &pk));

        // Another built-in nonce function.
        let s3 = ctx.ecdsa_sign(&m, &sk, Some(&BipSchnorrNonce), None).unwrap();
        assert!(ctx.ecdsa_verify(&s3, &m, &pk));

        // Missing tables.
        let mut q = Context::new(CONTEXT_VERIFY).unwrap();
        q.set_illegal_callback(Some(Arc::new(|_: &str| {})));
        match q.ecdsa_sign(&m, &sk, None, None) {
            Err(Error::IllegalArgument(_)) => (),
            _ => panic!("missing table not detected"),
        }
        let mut q = Context::new(CONTEXT_SIGN).unwrap();
        q.set_illegal_callback(Some(Arc::new(|_: &str| {})));
        assert!(!q.ecdsa_verify(&s1, &m, &pk));
    }

    #[test]
    fn verify_r_plus_n() {
        // R has an x coordinate in [n, p), so r = x(R) - n. With a chosen
        // (r, s, m), the public key Q = (s*R - m*G)/r makes the signature
        // valid; verification must then try r + n.
        let ctx = ctx();
        let mut xb = [0u8; 32];
        hex::decode_to_slice(
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364142",
            &mut xb).unwrap();
        let R = loop {
            let (x, ok) = FieldElement::decode(&xb);
            assert!(ok != 0);
            if let Some(R) = Affine::decompress_vartime(&x, false) {
                break R;
            }
            xb[31] += 1;
        };
        let r = Scalar::from_u32((xb[31] - 0x41) as u32);
        let m = [0x33u8; 32];
        let ms = Scalar::decode(&m).0;
        let s = Scalar::from_u32(12345);
        let ri = r.invert();
        let mult = ctx.mult().unwrap();
        let Qj = mult.mul_add_mulgen_vartime(&Jacobian::from_affine(&R), &(s * ri), &-(ms * ri));
        let Q = PublicKey::from_jacobian_vartime(&Qj).unwrap();
        let sig = Signature { r, s };
        assert!(ctx.ecdsa_verify(&sig, &m, &Q));
        assert!(!ctx.ecdsa_verify(&Signature { r, s: s + Scalar::ONE }, &m, &Q));
    }

    #[test]
    fn der() {
        // r = 1, s = 0x80 (needs a leading zero)
        let sig = Signature { r: Scalar::ONE, s: Scalar::from_u32(0x80) };
        let der = sig.serialize_der();
        assert!(der == [0x30, 0x07, 0x02, 0x01, 0x01, 0x02, 0x02, 0x00, 0x80]);
        assert!(Signature::parse_der(&der).unwrap() == sig);

        // zero values encode as a single zero byte
        let z = Signature { r: Scalar::ZERO, s: Scalar::ZERO };
        assert!(z.serialize_der() == [0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]);

        // maximal size
        let big = Signature { r: -Scalar::ONE, s: -Scalar::ONE };
        let der = big.serialize_der();
        assert!(der.len() == 72);
        assert!(Signature::parse_der(&der).unwrap() == big);

        // malformed encodings
        let bad: [&[u8]; 11] = [
            &[],
            &[0x31, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01],
            &[0x30, 0x07, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01],
            &[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01, 0x00],
            &[0x30, 0x08, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01, 0x05, 0x00],
            &[0x30, 0x07, 0x02, 0x02, 0x00, 0x01, 0x02, 0x01, 0x01],
            &[0x30, 0x07, 0x02, 0x02, 0xFF, 0x80, 0x02, 0x01, 0x01],
            &[0x30, 0x06, 0x02, 0x00, 0x02, 0x01, 0x01, 0x00],
            &[0x30, 0x81, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01],
            &[0x30, 0x80, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01, 0x00, 0x00],
            &[0x30, 0x06, 0x03, 0x01, 0x01, 0x02, 0x01, 0x01],
        ];
        for b in bad.iter() {
            assert!(Signature::parse_der(b) == Err(Error::InvalidSignature));
        }

        // Negative and overflowing integers decode as zero.
        let neg = Signature::parse_der(&[0x30, 0x06, 0x02, 0x01, 0x81, 0x02, 0x01, 0x01]).unwrap();
        assert!(neg.r.is_zero() != 0 && neg.s.is_one() != 0);
        let mut ovf = vec![0x30, 0x26, 0x02, 0x21, 0x00];
        ovf.extend_from_slice(&[0xFFu8; 32]);
        ovf.extend_from_slice(&[0x02, 0x01, 0x01]);
        let sig = Signature::parse_der(&ovf).unwrap();
        assert!(sig.r.is_zero() != 0);

        // Compact parsing rejects overflowing values.
        let mut c = [0u8; 64];
        c[..32].copy_from_slice(&[0xFFu8; 32]);
        assert!(Signature::parse_compact(&c) == Err(Error::InvalidSignature));
    }
}
