//! Secret and public keys: validation, encoding, tweaking, combination,
//! and pay-to-contract style commitments.
//!
//! Secret keys are handled as 32-byte arrays (unsigned big-endian
//! encoding of a scalar in the 1 to n-1 range). Public keys are opaque
//! `PublicKey` values, always valid curve points distinct from the
//! point-at-infinity; they are obtained by parsing (33-byte compressed,
//! 65-byte uncompressed or hybrid encodings) or from the operations of a
//! `Context`.

#![allow(non_snake_case)]

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

use crate::context::{Context, FLAGS_BIT_COMPRESSION, FLAGS_TYPE_COMPRESSION, FLAGS_TYPE_MASK};
use crate::error::Error;
use crate::field::FieldElement;
use crate::group::{Affine, AffineStorage, Jacobian};
use crate::hash::Sha256;
use crate::scalar::Scalar;
use crate::Vec;

/// A public key: a curve point other than the point-at-infinity.
#[derive(Clone, Copy, Debug)]
pub struct PublicKey(AffineStorage);

impl PublicKey {

    // The point must not be the point-at-infinity.
    pub(crate) fn from_affine(P: &Affine) -> Self {
        Self(P.to_storage())
    }

    // Convert a (non-infinity) Jacobian point; this is variable-time and
    // shall be used only for public values.
    pub(crate) fn from_jacobian_vartime(P: &Jacobian) -> Result<Self, Error> {
        if P.is_infinity() != 0 {
            return Err(Error::PointAtInfinity);
        }
        Ok(Self::from_affine(&Affine::from_jacobian_vartime(P)))
    }

    pub(crate) fn to_affine(&self) -> Affine {
        Affine::from_storage(&self.0)
    }

    pub(crate) fn to_jacobian(&self) -> Jacobian {
        Jacobian::from_affine(&self.to_affine())
    }

    /// Decodes a public key.
    ///
    /// Accepted formats are compressed (33 bytes, first byte 0x02 or
    /// 0x03), uncompressed (65 bytes, first byte 0x04) and hybrid (65
    /// bytes, first byte 0x06 or 0x07, with the low bit matching the
    /// parity of y). Coordinates must be lower than the field modulus,
    /// and the point must be on the curve.
    pub fn parse(buf: &[u8]) -> Result<Self, Error> {
        let mut xb = [0u8; 32];
        match (buf.len(), buf.first()) {
            (33, Some(&h)) if h == 0x02 || h == 0x03 => {
                xb.copy_from_slice(&buf[1..33]);
                let (x, ok) = FieldElement::decode(&xb);
                if ok == 0 {
                    return Err(Error::InvalidPublicKey);
                }
                let P = Affine::decompress_vartime(&x, h == 0x03)
                    .ok_or(Error::InvalidPublicKey)?;
                Ok(Self::from_affine(&P))
            }
            (65, Some(&h)) if h == 0x04 || h == 0x06 || h == 0x07 => {
                let mut yb = [0u8; 32];
                xb.copy_from_slice(&buf[1..33]);
                yb.copy_from_slice(&buf[33..65]);
                let (x, okx) = FieldElement::decode(&xb);
                let (y, oky) = FieldElement::decode(&yb);
                if (okx & oky) == 0 {
                    return Err(Error::InvalidPublicKey);
                }
                if h != 0x04 && (y.is_odd() != 0) != (h == 0x07) {
                    return Err(Error::InvalidPublicKey);
                }
                let P = Affine::from_xy(&x, &y);
                if !P.is_valid_vartime() {
                    return Err(Error::InvalidPublicKey);
                }
                Ok(Self::from_affine(&P))
            }
            _ => Err(Error::InvalidPublicKey),
        }
    }

    /// Encodes this key in compressed format (33 bytes, first byte 0x02
    /// or 0x03 depending on the parity of y).
    pub fn serialize_compressed(&self) -> [u8; 33] {
        let P = self.to_affine();
        let mut out = [0u8; 33];
        out[0] = 0x02 | (P.y.is_odd() as u8 & 1);
        out[1..].copy_from_slice(&P.x.encode());
        out
    }

    /// Encodes this key in uncompressed format (65 bytes, first byte
    /// 0x04).
    pub fn serialize_uncompressed(&self) -> [u8; 65] {
        let P = self.to_affine();
        let mut out = [0u8; 65];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&P.x.encode());
        out[33..].copy_from_slice(&P.y.encode());
        out
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        let (P, Q) = (self.to_affine(), other.to_affine());
        P.x.equals_vartime(&Q.x) && P.y.equals_vartime(&Q.y)
    }
}

impl Eq for PublicKey {}

/// Sign-to-contract opening: the original public nonce, before a
/// commitment was added to it, and whether the signing nonce was
/// negated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct S2cOpening {
    pub original_pubnonce: PublicKey,
    pub nonce_is_negated: bool,
}

impl S2cOpening {

    /// Decodes an opening from 33 bytes: the compressed encoding of the
    /// original nonce, with bit 2 of the first byte set when the nonce
    /// was negated. Any other bit of the first byte beyond the two low
    /// ones makes decoding fail.
    pub fn parse(input33: &[u8; 33]) -> Result<Self, Error> {
        if (input33[0] & !0x07) != 0 {
            return Err(Error::InvalidOpening);
        }
        let mut pk = *input33;
        pk[0] &= !0x04;
        let original_pubnonce = PublicKey::parse(&pk)
            .map_err(|_| Error::InvalidOpening)?;
        Ok(Self {
            original_pubnonce,
            nonce_is_negated: (input33[0] & 0x04) != 0,
        })
    }

    /// Encodes this opening over 33 bytes.
    pub fn serialize(&self) -> [u8; 33] {
        let mut out = self.original_pubnonce.serialize_compressed();
        if self.nonce_is_negated {
            out[0] |= 0x04;
        }
        out
    }
}

/// Generates a new secret key from a cryptographically secure RNG.
pub fn seckey_generate<T: CryptoRng + RngCore>(rng: &mut T) -> [u8; 32] {
    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    let r = seckey_from_seed(&seed);
    seed.zeroize();
    r
}

/// Derives a secret key from a random seed.
///
/// The seed MUST come from a cryptographically secure source with at
/// least 128 bits of entropy. The derivation is specific to this crate;
/// the secret key itself, not the seed, should be stored. The output is
/// always a valid secret key.
pub fn seckey_from_seed(seed: &[u8]) -> [u8; 32] {
    // SHA-512 of a domain prefix ("secp256k1 keygen" in ASCII) and the
    // seed, reduced modulo n.
    let mut sh = Sha512::new();
    sh.update(b"secp256k1 keygen");
    sh.update(seed);
    let mut h = sh.finalize();
    let mut x = Scalar::decode_reduce(&h[..]);
    h.as_mut_slice().zeroize();

    // Zero is replaced with 1 (this has negligible probability).
    x.set_cond(&Scalar::ONE, x.is_zero());
    let r = x.encode();
    x.zeroize();
    r
}

// Decode a secret key; it must be in the 1 to n-1 range.
pub(crate) fn seckey_load(seckey: &[u8; 32]) -> Result<Scalar, Error> {
    let (x, ok) = Scalar::decode(seckey);
    if (ok & !x.is_zero()) == 0 {
        return Err(Error::InvalidSecretKey);
    }
    Ok(x)
}

// Decode a tweak; values not lower than n are rejected.
fn tweak_load(tweak: &[u8; 32]) -> Result<Scalar, Error> {
    let (t, ok) = Scalar::decode(tweak);
    if ok == 0 {
        return Err(Error::InvalidTweak);
    }
    Ok(t)
}

impl Context {

    /// Decodes a public key (see `PublicKey::parse()`).
    pub fn pubkey_parse(&self, input: &[u8]) -> Result<PublicKey, Error> {
        PublicKey::parse(input)
    }

    /// Encodes a public key. `flags` is `EC_COMPRESSED` (33 bytes) or
    /// `EC_UNCOMPRESSED` (65 bytes); other values are an illegal
    /// argument.
    pub fn pubkey_serialize(&self, pubkey: &PublicKey, flags: u32)
        -> Result<Vec<u8>, Error>
    {
        if (flags & FLAGS_TYPE_MASK) != FLAGS_TYPE_COMPRESSION {
            return Err(self.illegal_argument("invalid serialization flags"));
        }
        if (flags & FLAGS_BIT_COMPRESSION) != 0 {
            Ok(pubkey.serialize_compressed().to_vec())
        } else {
            Ok(pubkey.serialize_uncompressed().to_vec())
        }
    }

    /// Checks that a secret key is in the valid range (1 to n-1).
    pub fn seckey_verify(&self, seckey: &[u8; 32]) -> bool {
        match seckey_load(seckey) {
            Ok(mut x) => {
                x.zeroize();
                true
            }
            Err(_) => false,
        }
    }

    /// Computes the public key for a secret key.
    ///
    /// This requires the signing table.
    pub fn pubkey_create(&self, seckey: &[u8; 32]) -> Result<PublicKey, Error> {
        let gen = self.gen()?;
        let mut x = seckey_load(seckey)?;
        let mut P = gen.gen(&x);
        x.zeroize();
        // x is in [1, n-1], so x*G cannot be the point-at-infinity.
        let res = self.check_finite(&P, "public key is the point-at-infinity")
            .map(|_| {
                let mut A = Affine::from_jacobian(&P);
                let pk = PublicKey::from_affine(&A);
                A.zeroize();
                pk
            });
        P.zeroize();
        res
    }

    /// Negates a secret key (modulo n).
    pub fn privkey_negate(&self, seckey: &[u8; 32]) -> [u8; 32] {
        let (mut x, _) = Scalar::decode(seckey);
        x.set_neg();
        let r = x.encode();
        x.zeroize();
        r
    }

    /// Negates a public key.
    pub fn pubkey_negate(&self, pubkey: &PublicKey) -> PublicKey {
        PublicKey::from_affine(&pubkey.to_affine().neg())
    }

    /// Adds a tweak to a secret key (modulo n).
    ///
    /// The tweak must be lower than n, and the result must not be zero.
    pub fn privkey_tweak_add(&self, seckey: &[u8; 32], tweak: &[u8; 32])
        -> Result<[u8; 32], Error>
    {
        let mut t = tweak_load(tweak)?;
        let (mut x, _) = Scalar::decode(seckey);
        x += &t;
        t.zeroize();
        let zero = x.is_zero();
        let r = x.encode();
        x.zeroize();
        if zero != 0 {
            return Err(Error::InvalidTweak);
        }
        Ok(r)
    }

    /// Adds `tweak*G` to a public key.
    ///
    /// This requires the verification tables. The tweak must be lower
    /// than n, and the result must not be the point-at-infinity.
    pub fn pubkey_tweak_add(&self, pubkey: &PublicKey, tweak: &[u8; 32])
        -> Result<PublicKey, Error>
    {
        let mult = self.mult()?;
        let t = tweak_load(tweak)?;
        let P = mult.mul_add_mulgen_vartime(&pubkey.to_jacobian(), &Scalar::ONE, &t);
        PublicKey::from_jacobian_vartime(&P).map_err(|_| Error::InvalidTweak)
    }

    /// Multiplies a secret key by a tweak (modulo n).
    ///
    /// The tweak must be non-zero and lower than n.
    pub fn privkey_tweak_mul(&self, seckey: &[u8; 32], tweak: &[u8; 32])
        -> Result<[u8; 32], Error>
    {
        let mut t = tweak_load(tweak)?;
        if t.is_zero() != 0 {
            return Err(Error::InvalidTweak);
        }
        let (mut x, _) = Scalar::decode(seckey);
        x *= &t;
        let r = x.encode();
        x.zeroize();
        t.zeroize();
        Ok(r)
    }

    /// Multiplies a public key by a tweak.
    ///
    /// This requires the verification tables. The tweak must be non-zero
    /// and lower than n.
    pub fn pubkey_tweak_mul(&self, pubkey: &PublicKey, tweak: &[u8; 32])
        -> Result<PublicKey, Error>
    {
        let mult = self.mult()?;
        let t = tweak_load(tweak)?;
        if t.is_zero() != 0 {
            return Err(Error::InvalidTweak);
        }
        let P = mult.mul_add_mulgen_vartime(&pubkey.to_jacobian(), &t, &Scalar::ZERO);
        PublicKey::from_jacobian_vartime(&P).map_err(|_| Error::InvalidTweak)
    }

    /// Adds public keys together.
    ///
    /// An empty list is an illegal argument; a sum equal to the
    /// point-at-infinity makes the operation fail.
    pub fn pubkey_combine(&self, pubkeys: &[PublicKey]) -> Result<PublicKey, Error> {
        if pubkeys.is_empty() {
            return Err(self.illegal_argument("no public key to combine"));
        }
        let mut Q = Jacobian::INFINITY;
        for pk in pubkeys.iter() {
            Q = Q.add_affine_vartime(&pk.to_affine());
        }
        PublicKey::from_jacobian_vartime(&Q)
    }

    /// Computes the commitment tweak `SHA256(P || data)` where P is the
    /// public key in compressed format. `data` must not be empty.
    pub fn ec_commit_tweak(&self, pubkey: &PublicKey, data: &[u8])
        -> Result<[u8; 32], Error>
    {
        if data.is_empty() {
            return Err(Error::InvalidCommitment);
        }
        let mut sh = Sha256::new();
        sh.update(&pubkey.serialize_compressed());
        sh.update(data);
        Ok(sh.finalize())
    }

    /// Computes the commitment `P + SHA256(P || data)*G` to `data` with
    /// public key P.
    ///
    /// This requires the verification tables.
    pub fn ec_commit(&self, pubkey: &PublicKey, data: &[u8]) -> Result<PublicKey, Error> {
        let tweak = self.ec_commit_tweak(pubkey, data)?;
        self.pubkey_tweak_add(pubkey, &tweak)
    }

    /// Computes the secret key of a commitment to `data`, from the
    /// secret key of the original public key.
    ///
    /// If the public key is not provided, it is recomputed from the
    /// secret key (this requires the signing table).
    pub fn ec_commit_seckey(&self, seckey: &[u8; 32], pubkey: Option<&PublicKey>,
        data: &[u8]) -> Result<[u8; 32], Error>
    {
        let tweak = match pubkey {
            Some(pk) => self.ec_commit_tweak(pk, data)?,
            None => {
                let gen = self.gen()?;
                let (mut x, ok) = Scalar::decode(seckey);
                if ok == 0 {
                    return Err(Error::InvalidSecretKey);
                }
                let P = Affine::from_jacobian(&gen.gen(&x));
                x.zeroize();
                if P.is_infinity() != 0 {
                    return Err(Error::InvalidSecretKey);
                }
                self.ec_commit_tweak(&PublicKey::from_affine(&P), data)?
            }
        };
        self.privkey_tweak_add(seckey, &tweak)
    }

    /// Verifies that `commitment` is the commitment to `data` with
    /// public key `pubkey`.
    ///
    /// This requires the verification tables.
    pub fn ec_commit_verify(&self, commitment: &PublicKey, pubkey: &PublicKey,
        data: &[u8]) -> bool
    {
        match self.ec_commit(pubkey, data) {
            Ok(C) => {
                let D = C.to_jacobian().add_affine_vartime(&commitment.to_affine().neg());
                D.is_infinity() != 0
            }
            Err(_) => false,
        }
    }

    /// Decodes a sign-to-contract opening (see `S2cOpening::parse()`).
    pub fn s2c_opening_parse(&self, input33: &[u8; 33]) -> Result<S2cOpening, Error> {
        S2cOpening::parse(input33)
    }

    /// Encodes a sign-to-contract opening over 33 bytes.
    pub fn s2c_opening_serialize(&self, opening: &S2cOpening) -> [u8; 33] {
        opening.serialize()
    }
}

// ========================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use crate::context::{CONTEXT_NONE, CONTEXT_SIGN, CONTEXT_VERIFY,
        EC_COMPRESSED, EC_UNCOMPRESSED, NO_PRECOMP};
    use crate::Arc;

    fn ctx() -> Context {
        Context::new(CONTEXT_SIGN | CONTEXT_VERIFY).unwrap()
    }

    fn quiet(flags: u32) -> Context {
        let mut c = Context::new(flags).unwrap();
        c.set_illegal_callback(Some(Arc::new(|_: &str| {})));
        c
    }

    fn key(v: &str) -> [u8; 32] {
        let mut k = [0u8; 32];
        hex::decode_to_slice(v, &mut k).unwrap();
        k
    }

    const N_HEX: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141";
    const N1_HEX: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364140";
    const G_HEX: &str = "0279BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798";

    #[test]
    fn seckey() {
        let ctx = &NO_PRECOMP;
        assert!(!ctx.seckey_verify(&[0u8; 32]));
        assert!(!ctx.seckey_verify(&key(N_HEX)));
        assert!(!ctx.seckey_verify(&[0xFFu8; 32]));
        assert!(ctx.seckey_verify(&key(N1_HEX)));
        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(ctx.seckey_verify(&one));

        // -1 = n - 1
        assert!(ctx.privkey_negate(&one) == key(N1_HEX));
        assert!(ctx.privkey_negate(&ctx.privkey_negate(&one)) == one);

        for i in 0..10u8 {
            let sk = seckey_from_seed(&[i; 20]);
            assert!(ctx.seckey_verify(&sk));
            assert!(sk == seckey_from_seed(&[i; 20]));
        }
    }

    #[test]
    fn create_parse_serialize() {
        let ctx = ctx();
        let mut one = [0u8; 32];
        one[31] = 1;
        let G = ctx.pubkey_create(&one).unwrap();
        assert!(hex::encode_upper(G.serialize_compressed()) == G_HEX);
        assert!(hex::encode_upper(G.serialize_uncompressed())
            == "0479BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798\
                483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8");
        assert!(ctx.pubkey_create(&[0u8; 32]) == Err(Error::InvalidSecretKey));
        assert!(ctx.pubkey_create(&key(N_HEX)) == Err(Error::InvalidSecretKey));

        // (n-1)*G = -G
        let mG = ctx.pubkey_create(&key(N1_HEX)).unwrap();
        assert!(mG == ctx.pubkey_negate(&G));
        assert!(mG.serialize_compressed()[0] == 0x03);

        for i in 0..20u8 {
            let sk = seckey_from_seed(&[i; 32]);
            let pk = ctx.pubkey_create(&sk).unwrap();
            let c = ctx.pubkey_serialize(&pk, EC_COMPRESSED).unwrap();
            let u = ctx.pubkey_serialize(&pk, EC_UNCOMPRESSED).unwrap();
            assert!(c.len() == 33 && u.len() == 65);
            assert!(ctx.pubkey_parse(&c).unwrap() == pk);
            assert!(ctx.pubkey_parse(&u).unwrap() == pk);

            // Hybrid encoding.
            let mut h = u.clone();
            h[0] = 0x06 | (c[0] & 1);
            assert!(ctx.pubkey_parse(&h).unwrap() == pk);
            h[0] ^= 1;
            assert!(ctx.pubkey_parse(&h).is_err());

            // Corrupted y coordinate.
            let mut bad = u.clone();
            bad[64] ^= 1;
            assert!(ctx.pubkey_parse(&bad).is_err());

            // Wrong lengths and headers.
            assert!(ctx.pubkey_parse(&c[..32]).is_err());
            assert!(ctx.pubkey_parse(&u[..64]).is_err());
            let mut bad = c.clone();
            bad[0] = 0x04;
            assert!(ctx.pubkey_parse(&bad).is_err());
        }
        assert!(ctx.pubkey_parse(&[]).is_err());

        // x = 5 is not the x coordinate of a curve point; x = p is out
        // of range.
        let mut buf = [0u8; 33];
        buf[0] = 0x02;
        buf[32] = 5;
        assert!(ctx.pubkey_parse(&buf) == Err(Error::InvalidPublicKey));
        hex::decode_to_slice(
            "02FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F",
            &mut buf).unwrap();
        assert!(ctx.pubkey_parse(&buf) == Err(Error::InvalidPublicKey));

        let q = quiet(CONTEXT_NONE);
        match q.pubkey_serialize(&G, CONTEXT_SIGN) {
            Err(Error::IllegalArgument(_)) => (),
            _ => panic!("flags accepted"),
        }
        match q.pubkey_create(&one) {
            Err(Error::IllegalArgument(_)) => (),
            _ => panic!("missing table not detected"),
        }
    }

    #[test]
    fn tweaks() {
        let ctx = ctx();
        let sk = seckey_from_seed(b"tweak test key seed 0123456789ab");
        let pk = ctx.pubkey_create(&sk).unwrap();
        let tw = seckey_from_seed(b"tweak test tweak seed 0123456789");

        let sk2 = ctx.privkey_tweak_add(&sk, &tw).unwrap();
        let pk2 = ctx.pubkey_tweak_add(&pk, &tw).unwrap();
        assert!(ctx.pubkey_create(&sk2).unwrap() == pk2);

        let sk3 = ctx.privkey_tweak_mul(&sk, &tw).unwrap();
        let pk3 = ctx.pubkey_tweak_mul(&pk, &tw).unwrap();
        assert!(ctx.pubkey_create(&sk3).unwrap() == pk3);

        // Overflowing and zero tweaks.
        assert!(ctx.privkey_tweak_add(&sk, &key(N_HEX)) == Err(Error::InvalidTweak));
        assert!(ctx.pubkey_tweak_add(&pk, &key(N_HEX)) == Err(Error::InvalidTweak));
        assert!(ctx.privkey_tweak_mul(&sk, &[0u8; 32]) == Err(Error::InvalidTweak));
        assert!(ctx.pubkey_tweak_mul(&pk, &[0u8; 32]) == Err(Error::InvalidTweak));
        assert!(ctx.privkey_tweak_add(&sk, &[0u8; 32]).unwrap() == sk);
        assert!(ctx.pubkey_tweak_add(&pk, &[0u8; 32]).unwrap() == pk);

        // Adding the negated key yields zero / the point-at-infinity.
        let nsk = ctx.privkey_negate(&sk);
        assert!(ctx.privkey_tweak_add(&sk, &nsk) == Err(Error::InvalidTweak));
        assert!(ctx.pubkey_tweak_add(&ctx.pubkey_negate(&pk), &sk) == Err(Error::InvalidTweak));

        // Public key tweaks need the verification tables.
        let q = quiet(CONTEXT_SIGN);
        match q.pubkey_tweak_add(&pk, &tw) {
            Err(Error::IllegalArgument(_)) => (),
            _ => panic!("missing table not detected"),
        }
        match q.pubkey_tweak_mul(&pk, &tw) {
            Err(Error::IllegalArgument(_)) => (),
            _ => panic!("missing table not detected"),
        }
    }

    #[test]
    fn combine() {
        let ctx = ctx();
        let mut pks = Vec::new();
        let mut sum = [0u8; 32];
        for i in 0..5u8 {
            let sk = seckey_from_seed(&[i + 1; 16]);
            pks.push(ctx.pubkey_create(&sk).unwrap());
            sum = ctx.privkey_tweak_add(&sum, &sk).unwrap();
        }
        let pk = ctx.pubkey_combine(&pks).unwrap();
        assert!(pk == ctx.pubkey_create(&sum).unwrap());
        pks.reverse();
        assert!(ctx.pubkey_combine(&pks).unwrap() == pk);
        assert!(ctx.pubkey_combine(&pks[..1]).unwrap() == pks[0]);

        let neg = ctx.pubkey_negate(&pks[0]);
        assert!(ctx.pubkey_combine(&[pks[0], neg]) == Err(Error::PointAtInfinity));

        let q = quiet(CONTEXT_NONE);
        match q.pubkey_combine(&[]) {
            Err(Error::IllegalArgument(_)) => (),
            _ => panic!("empty list accepted"),
        }
    }

    #[test]
    fn commitments() {
        let ctx = ctx();
        let sk = seckey_from_seed(b"commitment test seed");
        let pk = ctx.pubkey_create(&sk).unwrap();
        let data = b"some contract data";

        let tweak = ctx.ec_commit_tweak(&pk, data).unwrap();
        let mut sh = Sha256::new();
        sh.update(&pk.serialize_compressed());
        sh.update(&data[..]);
        assert!(tweak == sh.finalize());
        assert!(ctx.ec_commit_tweak(&pk, &[]) == Err(Error::InvalidCommitment));

        let C = ctx.ec_commit(&pk, data).unwrap();
        assert!(C == ctx.pubkey_tweak_add(&pk, &tweak).unwrap());
        let csk = ctx.ec_commit_seckey(&sk, Some(&pk), data).unwrap();
        assert!(ctx.pubkey_create(&csk).unwrap() == C);
        assert!(ctx.ec_commit_seckey(&sk, None, data).unwrap() == csk);
        assert!(ctx.ec_commit_seckey(&key(N_HEX), None, data) == Err(Error::InvalidSecretKey));

        assert!(ctx.ec_commit_verify(&C, &pk, data));
        assert!(!ctx.ec_commit_verify(&C, &pk, b"other data"));
        assert!(!ctx.ec_commit_verify(&pk, &pk, data));
        assert!(!ctx.ec_commit_verify(&C, &pk, &[]));
    }

    #[test]
    fn s2c_opening() {
        let ctx = &NO_PRECOMP;
        let mut buf = [0u8; 33];
        hex::decode_to_slice(G_HEX, &mut buf).unwrap();
        let op = ctx.s2c_opening_parse(&buf).unwrap();
        assert!(!op.nonce_is_negated);
        assert!(ctx.s2c_opening_serialize(&op) == buf);

        buf[0] = 0x06;
        let op = ctx.s2c_opening_parse(&buf).unwrap();
        assert!(op.nonce_is_negated);
        assert!(op.original_pubnonce.serialize_compressed()[0] == 0x02);
        assert!(ctx.s2c_opening_serialize(&op) == buf);

        // odd y, negated
        let mG = op.original_pubnonce.to_affine().neg();
        let op2 = S2cOpening {
            original_pubnonce: PublicKey::from_affine(&mG),
            nonce_is_negated: true,
        };
        let ser = op2.serialize();
        assert!(ser[0] == 0x07);
        assert!(S2cOpening::parse(&ser).unwrap() == op2);

        for &b in [0x08u8, 0x0A, 0x12, 0x82, 0x00, 0x01, 0x04, 0x05].iter() {
            buf[0] = b;
            assert!(ctx.s2c_opening_parse(&buf) == Err(Error::InvalidOpening));
        }
    }

    #[test]
    fn keygen_rng() {
        struct Counter(u64);
        impl RngCore for Counter {
            fn next_u32(&mut self) -> u32 { self.next_u64() as u32 }
            fn next_u64(&mut self) -> u64 {
                self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
                self.0
            }
            fn fill_bytes(&mut self, dest: &mut [u8]) {
                for b in dest.iter_mut() {
                    *b = (self.next_u64() >> 56) as u8;
                }
            }
            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
                self.fill_bytes(dest);
                Ok(())
            }
        }
        impl CryptoRng for Counter {}

        let ctx = Context::new(CONTEXT_VERIFY).unwrap();
        let mut rng = Counter(1);
        let a = seckey_generate(&mut rng);
        let b = seckey_generate(&mut rng);
        assert!(a != b);
        assert!(ctx.seckey_verify(&a) && ctx.seckey_verify(&b));
    }
}
