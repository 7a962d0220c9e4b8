//! Nonce generation functions.
//!
//! A nonce function receives the 32-byte message hash, the 32-byte
//! secret key, an optional 16-byte algorithm tag (which keeps nonces
//! distinct across signature schemes), optional 32 bytes of extra data,
//! and an attempt counter. It returns 32 bytes to be interpreted as a
//! big-endian scalar, or `None` to make the calling operation fail. When
//! the returned value is not a usable nonce, the caller invokes the
//! function again with the counter incremented.
//!
//! Closures with the matching signature implement `NonceFunction`, so
//! callers can plug their own derivation.

use zeroize::Zeroize;

use crate::hash::{Sha256, Rfc6979HmacSha256};

/// Source of signature nonces.
pub trait NonceFunction {

    /// Produce the nonce candidate number `counter` (starting at 0).
    fn nonce(&self, msg32: &[u8; 32], key32: &[u8; 32],
        algo16: Option<&[u8; 16]>, data: Option<&[u8; 32]>, counter: u32)
        -> Option<[u8; 32]>;
}

impl<F> NonceFunction for F
    where F: Fn(&[u8; 32], &[u8; 32], Option<&[u8; 16]>, Option<&[u8; 32]>, u32)
        -> Option<[u8; 32]>
{
    fn nonce(&self, msg32: &[u8; 32], key32: &[u8; 32],
        algo16: Option<&[u8; 16]>, data: Option<&[u8; 32]>, counter: u32)
        -> Option<[u8; 32]>
    {
        self(msg32, key32, algo16, data, counter)
    }
}

/// Deterministic nonces as per RFC 6979 (with HMAC-SHA256).
///
/// The generator is seeded with `key32 || msg32`, followed by the extra
/// data (if any, as in RFC 6979 section 3.6) and the algorithm tag (if
/// any). Since all parts have distinct fixed lengths, no two different
/// combinations of inputs map to the same seed. Candidate number
/// `counter` is the output of the `counter + 1`-th call to the generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rfc6979Nonce;

impl NonceFunction for Rfc6979Nonce {

    fn nonce(&self, msg32: &[u8; 32], key32: &[u8; 32],
        algo16: Option<&[u8; 16]>, data: Option<&[u8; 32]>, counter: u32)
        -> Option<[u8; 32]>
    {
        let mut seed = [0u8; 112];
        let mut len = 0;
        seed[0..32].copy_from_slice(key32);
        seed[32..64].copy_from_slice(msg32);
        len += 64;
        if let Some(d) = data {
            seed[len..(len + 32)].copy_from_slice(d);
            len += 32;
        }
        if let Some(a) = algo16 {
            seed[len..(len + 16)].copy_from_slice(a);
            len += 16;
        }
        let mut rng = Rfc6979HmacSha256::new(&seed[..len]);
        seed.zeroize();
        let mut out = [0u8; 32];
        for _ in 0..=counter {
            rng.generate(&mut out);
        }
        rng.finalize();
        Some(out)
    }
}

/// Nonces from the early BIP-Schnorr draft:
/// `SHA256(key32 || msg32 || algo16 || data32)` (the last two only if
/// provided).
///
/// This function yields a single candidate: any counter other than 0
/// makes it fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct BipSchnorrNonce;

impl NonceFunction for BipSchnorrNonce {

    fn nonce(&self, msg32: &[u8; 32], key32: &[u8; 32],
        algo16: Option<&[u8; 16]>, data: Option<&[u8; 32]>, counter: u32)
        -> Option<[u8; 32]>
    {
        if counter != 0 {
            return None;
        }
        let mut sh = Sha256::new();
        sh.update(key32);
        sh.update(msg32);
        if let Some(a) = algo16 {
            sh.update(a);
        }
        if let Some(d) = data {
            sh.update(d);
        }
        Some(sh.finalize())
    }
}

/// The default nonce function (RFC 6979).
pub const NONCE_FUNCTION_DEFAULT: Rfc6979Nonce = Rfc6979Nonce;

// ========================================================================
