//! Schnorr signatures and multisignatures over secp256k1.
//!
//! This is a specific Schnorr variant, with its own byte layout and hash
//! inputs (it is not compatible with BIP-340). A signature is 64 bytes:
//! the x coordinate of the nonce point R (which always has an even y)
//! followed by the scalar s. With `h = SHA256(x(R) || msg32)` and the
//! public key Q, a signature is valid if `h*Q + s*G` is R (signing
//! computes `s = k - h*x`). Since R is determined by the signature, the
//! public key can also be recovered from a signature and a message.
//!
//! Multisignatures use three steps:
//!
//!  1. Each signer publishes a stage-1 value (96 bytes): x(R_i) for its
//!     own nonce point, and a signature with its key over
//!     `SHA256(x(R_i) || msg32)`, which proves the signer knows its key.
//!
//!  2. Each signer checks the stage-1 values of all others, adds their
//!     nonce points to its own, and produces a partial signature (64
//!     bytes) relative to the combined nonce.
//!
//!  3. The partial signatures are combined (their s values are added)
//!     into a signature that is valid for the sum of the public keys.
//!
//! The nonce function receives the 16-byte algorithm tag
//! `"Schnorr+SHA256  "`, so nonces never collide with ECDSA nonces for
//! the same key and message.

#![allow(non_snake_case)]

use zeroize::Zeroize;

use crate::context::Context;
use crate::ecmult::Ecmult;
use crate::ecmult_gen::EcmultGen;
use crate::eckey::{seckey_load, PublicKey};
use crate::error::Error;
use crate::field::FieldElement;
use crate::group::{Affine, Jacobian};
use crate::hash::Sha256;
use crate::nonce::{NonceFunction, NONCE_FUNCTION_DEFAULT};
use crate::scalar::Scalar;

/// Algorithm tag provided to nonce functions.
pub const SCHNORR_ALGO16: [u8; 16] = *b"Schnorr+SHA256  ";

// h = SHA256(r32 || msg32)
fn msghash(r32: &[u8], msg32: &[u8; 32]) -> [u8; 32] {
    let mut sh = Sha256::new();
    sh.update(r32);
    sh.update(msg32);
    sh.finalize()
}

// Decode the hash as a scalar; overflowing and zero values are refused.
fn msghash_scalar(r32: &[u8], msg32: &[u8; 32]) -> Option<Scalar> {
    let (h, ok) = Scalar::decode(&msghash(r32, msg32));
    if (ok & !h.is_zero()) == 0 {
        return None;
    }
    Some(h)
}

// Decode an x coordinate and get the matching point with even y.
fn lift_x_even(x32: &[u8]) -> Option<Affine> {
    let mut xb = [0u8; 32];
    xb.copy_from_slice(x32);
    let (x, ok) = FieldElement::decode(&xb);
    if ok == 0 {
        return None;
    }
    Affine::decompress_vartime(&x, false)
}

// From a nonce candidate, get the nonce k and the combined nonce point.
// The own nonce point k*G is made to have an even y (by negating k if
// necessary), then the sum of the other parties' nonce points (if any)
// is added.
fn nonces_set(gen: &EcmultGen, nonce32: &[u8; 32], others: Option<&Affine>)
    -> Option<(Scalar, Affine)>
{
    let (mut k, ok) = Scalar::decode(nonce32);
    if (ok & !k.is_zero()) == 0 {
        k.zeroize();
        return None;
    }
    let mut R = Affine::from_jacobian(&gen.gen(&k));
    let odd = R.y.is_odd();
    k.set_condneg(odd);
    if odd != 0 {
        R.set_neg();
    }
    if let Some(O) = others {
        let Rj = Jacobian::from_affine(&R).add_affine(O);
        if Rj.is_infinity() != 0 {
            k.zeroize();
            return None;
        }
        R = Affine::from_jacobian(&Rj);
    }
    Some((k, R))
}

// Sign with secret key x, nonce k and combined nonce point R. If R has an
// odd y, then the nonce is negated; when several parties sign, they all
// see the same R and negate their nonces together.
fn sig_sign(x: &Scalar, k: &Scalar, R: &Affine, msg32: &[u8; 32]) -> Option<[u8; 64]> {
    if (x.is_zero() | k.is_zero()) != 0 {
        return None;
    }
    let mut n = *k;
    n.set_condneg(R.y.is_odd());
    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&R.x.encode());
    let h = match msghash_scalar(&sig[..32], msg32) {
        Some(h) => h,
        None => {
            n.zeroize();
            return None;
        }
    };
    let mut s = n - h * x;
    sig[32..].copy_from_slice(&s.encode());
    n.zeroize();
    s.zeroize();
    Some(sig)
}

// Verification against a (public) point Q.
fn sig_verify(mult: &Ecmult, sig64: &[u8; 64], Q: &Affine, msg32: &[u8; 32]) -> bool {
    if Q.is_infinity() != 0 {
        return false;
    }
    let h = match msghash_scalar(&sig64[..32], msg32) {
        Some(h) => h,
        None => return false,
    };
    let mut tmp = [0u8; 32];
    tmp.copy_from_slice(&sig64[32..]);
    let (s, oks) = Scalar::decode(&tmp);
    if oks == 0 {
        return false;
    }
    tmp.copy_from_slice(&sig64[..32]);
    let (rx, okr) = FieldElement::decode(&tmp);
    if okr == 0 {
        return false;
    }

    // R = h*Q + s*G must have an even y, and x(R) = r.
    let Rj = mult.mul_add_mulgen_vartime(&Jacobian::from_affine(Q), &h, &s);
    if Rj.is_infinity() != 0 {
        return false;
    }
    let R = Affine::from_jacobian_vartime(&Rj);
    if R.y.is_odd() != 0 {
        return false;
    }
    R.x.equals_vartime(&rx)
}

// Public key recovery: Q = (R - s*G)/h.
fn sig_recover(mult: &Ecmult, sig64: &[u8; 64], msg32: &[u8; 32]) -> Option<Affine> {
    let h = msghash_scalar(&sig64[..32], msg32)?;
    let mut tmp = [0u8; 32];
    tmp.copy_from_slice(&sig64[32..]);
    let (s, oks) = Scalar::decode(&tmp);
    if oks == 0 {
        return None;
    }
    let R = lift_x_even(&sig64[..32])?;
    let hi = h.invert_vartime();
    let u = -(s * hi);
    let Qj = mult.mul_add_mulgen_vartime(&Jacobian::from_affine(&R), &hi, &u);
    if Qj.is_infinity() != 0 {
        return None;
    }
    Some(Affine::from_jacobian_vartime(&Qj))
}

impl Context {

    // Query the nonce function until a usable nonce is found.
    fn schnorr_generate_nonces(&self, gen: &EcmultGen, others: Option<&Affine>,
        msg32: &[u8; 32], sec32: &[u8; 32],
        noncefp: &dyn NonceFunction, ndata: Option<&[u8; 32]>)
        -> Result<(Scalar, Affine), Error>
    {
        let mut counter = 0u32;
        loop {
            let mut nonce32 = noncefp
                .nonce(msg32, sec32, Some(&SCHNORR_ALGO16), ndata, counter)
                .ok_or(Error::NonceGeneration)?;
            let r = nonces_set(gen, &nonce32, others);
            nonce32.zeroize();
            if let Some(r) = r {
                return Ok(r);
            }
            counter = counter.wrapping_add(1);
        }
    }

    /// Signs a 32-byte message hash.
    ///
    /// `noncefp` is the nonce function (`None` selects RFC 6979), which
    /// receives `ndata` as extra data. This requires the signing table.
    pub fn schnorr_sign(&self, msg32: &[u8; 32], seckey: &[u8; 32],
        noncefp: Option<&dyn NonceFunction>, ndata: Option<&[u8; 32]>)
        -> Result<[u8; 64], Error>
    {
        let gen = self.gen()?;
        let noncefp = noncefp.unwrap_or(&NONCE_FUNCTION_DEFAULT);
        let mut x = seckey_load(seckey)?;
        let mut counter = 0u32;
        let res = loop {
            let mut nonce32 = match noncefp.nonce(msg32, seckey,
                Some(&SCHNORR_ALGO16), ndata, counter)
            {
                Some(n) => n,
                None => break Err(Error::NonceGeneration),
            };
            let sig = nonces_set(gen, &nonce32, None).and_then(|(mut k, R)| {
                let sig = sig_sign(&x, &k, &R, msg32);
                k.zeroize();
                sig
            });
            nonce32.zeroize();
            if let Some(sig) = sig {
                break Ok(sig);
            }
            counter = counter.wrapping_add(1);
        };
        x.zeroize();
        res
    }

    /// Verifies a signature on a 32-byte message hash.
    ///
    /// This requires the verification tables (without them, the
    /// illegal-argument callback is invoked and `false` is returned).
    pub fn schnorr_verify(&self, sig64: &[u8; 64], msg32: &[u8; 32], pubkey: &PublicKey) -> bool {
        match self.mult() {
            Ok(mult) => sig_verify(mult, sig64, &pubkey.to_affine(), msg32),
            Err(_) => false,
        }
    }

    /// Recovers the public key for which a signature on a given message
    /// is valid.
    ///
    /// This requires the verification tables.
    pub fn schnorr_recover(&self, sig64: &[u8; 64], msg32: &[u8; 32])
        -> Result<PublicKey, Error>
    {
        let mult = self.mult()?;
        let Q = sig_recover(mult, sig64, msg32).ok_or(Error::InvalidSignature)?;
        Ok(PublicKey::from_affine(&Q))
    }

    /// Produces the stage-1 value of a multisignature (96 bytes): the x
    /// coordinate of the own nonce point, and a signature over the hash
    /// of that coordinate with the message.
    ///
    /// This requires the signing table.
    pub fn schnorr_multisign_stage1(&self, msg32: &[u8; 32], sec32: &[u8; 32],
        noncefp: Option<&dyn NonceFunction>, ndata: Option<&[u8; 32]>)
        -> Result<[u8; 96], Error>
    {
        let gen = self.gen()?;
        let mut x = seckey_load(sec32)?;
        x.zeroize();
        let nfp = noncefp.unwrap_or(&NONCE_FUNCTION_DEFAULT);
        let (mut k, R) = self.schnorr_generate_nonces(gen, None, msg32, sec32, nfp, ndata)?;
        k.zeroize();

        let mut stage1 = [0u8; 96];
        stage1[..32].copy_from_slice(&R.x.encode());
        let h = msghash(&stage1[..32], msg32);
        let sub = self.schnorr_sign(&h, sec32, noncefp, ndata)?;
        stage1[32..].copy_from_slice(&sub);
        Ok(stage1)
    }

    /// Produces the partial signature of a multisignature (64 bytes).
    ///
    /// The stage-1 values of all other signers, and their public keys
    /// (in the same order), are provided; if any stage-1 value fails to
    /// verify, the whole operation fails. The nonce function and extra
    /// data must be the same as in stage 1. This requires both the
    /// signing and verification tables.
    pub fn schnorr_multisign_stage2(&self, other_stage1s: &[[u8; 96]],
        other_pubkeys: &[PublicKey], msg32: &[u8; 32], sec32: &[u8; 32],
        noncefp: Option<&dyn NonceFunction>, ndata: Option<&[u8; 32]>)
        -> Result<[u8; 64], Error>
    {
        let gen = self.gen()?;
        let mult = self.mult()?;
        if other_stage1s.len() != other_pubkeys.len() {
            return Err(self.illegal_argument("mismatched stage-1 and public key lists"));
        }
        let mut x = seckey_load(sec32)?;

        // Sum of the other parties' nonce points.
        let mut others = None;
        if !other_stage1s.is_empty() {
            let mut Sj = Jacobian::INFINITY;
            for (st, pk) in other_stage1s.iter().zip(other_pubkeys.iter()) {
                let mut sub = [0u8; 64];
                sub.copy_from_slice(&st[32..]);
                let h = msghash(&st[..32], msg32);
                let R = lift_x_even(&st[..32]);
                match R {
                    Some(R) if sig_verify(mult, &sub, &pk.to_affine(), &h) => {
                        Sj = Sj.add_affine_vartime(&R);
                    }
                    _ => {
                        x.zeroize();
                        return Err(Error::InvalidSignature);
                    }
                }
            }
            others = Some(Affine::from_jacobian_vartime(&Sj));
        }

        let nfp = noncefp.unwrap_or(&NONCE_FUNCTION_DEFAULT);
        let res = self
            .schnorr_generate_nonces(gen, others.as_ref(), msg32, sec32, nfp, ndata)
            .and_then(|(mut k, R)| {
                let sig = sig_sign(&x, &k, &R, msg32);
                k.zeroize();
                sig.ok_or(Error::InvalidSignature)
            });
        x.zeroize();
        res
    }

    /// Combines partial signatures into a complete signature.
    ///
    /// All partial signatures must share the same nonce; the sum of the
    /// s values must not be zero. The order of the inputs does not
    /// matter. An empty list is an illegal argument.
    pub fn schnorr_multisign_combine(&self, stage2s: &[[u8; 64]]) -> Result<[u8; 64], Error> {
        if stage2s.is_empty() {
            return Err(self.illegal_argument("no partial signature to combine"));
        }
        let mut s = Scalar::ZERO;
        let mut tmp = [0u8; 32];
        for (i, st) in stage2s.iter().enumerate() {
            tmp.copy_from_slice(&st[32..]);
            let (si, ok) = Scalar::decode(&tmp);
            if ok == 0 {
                return Err(Error::InvalidSignature);
            }
            if i > 0 && stage2s[i - 1][..32] != st[..32] {
                return Err(Error::InvalidSignature);
            }
            s += si;
        }
        if s.is_zero() != 0 {
            return Err(Error::InvalidSignature);
        }
        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(&stage2s[0][..32]);
        sig[32..].copy_from_slice(&s.encode());
        Ok(sig)
    }
}

// ========================================================================
