//! SHA-256, HMAC-SHA256 and the RFC 6979 deterministic generator.
//!
//! `Sha256` supports starting from an arbitrary midstate, so that a
//! common prefix (one or more full 64-byte blocks) can be hashed once
//! and reused. `HmacSha256` is the usual HMAC construction (RFC 2104)
//! over it. `Rfc6979HmacSha256` is the HMAC_DRBG-like generator of
//! RFC 6979 (section 3.2, steps b to h), used to derive nonces and
//! blinding values.
//!
//! All state holding key material is wiped on `finalize()` and on drop.

#![allow(non_snake_case)]

use zeroize::Zeroize;

/// SHA-256 implementation.
///
/// Cloning captures the current object state.
#[derive(Clone, Copy, Debug)]
pub struct Sha256 {
    h: [u32; 8],
    buf: [u8; 64],
    ctr: u64,
}

const IV: [u32; 8] = [
    0x6A09E667, 0xBB67AE85, 0x3C6EF372, 0xA54FF53A,
    0x510E527F, 0x9B05688C, 0x1F83D9AB, 0x5BE0CD19,
];

const K: [u32; 64] = [
    0x428A2F98, 0x71374491, 0xB5C0FBCF, 0xE9B5DBA5,
    0x3956C25B, 0x59F111F1, 0x923F82A4, 0xAB1C5ED5,
    0xD807AA98, 0x12835B01, 0x243185BE, 0x550C7DC3,
    0x72BE5D74, 0x80DEB1FE, 0x9BDC06A7, 0xC19BF174,
    0xE49B69C1, 0xEFBE4786, 0x0FC19DC6, 0x240CA1CC,
    0x2DE92C6F, 0x4A7484AA, 0x5CB0A9DC, 0x76F988DA,
    0x983E5152, 0xA831C66D, 0xB00327C8, 0xBF597FC7,
    0xC6E00BF3, 0xD5A79147, 0x06CA6351, 0x14292967,
    0x27B70A85, 0x2E1B2138, 0x4D2C6DFC, 0x53380D13,
    0x650A7354, 0x766A0ABB, 0x81C2C92E, 0x92722C85,
    0xA2BFE8A1, 0xA81A664B, 0xC24B8B70, 0xC76C51A3,
    0xD192E819, 0xD6990624, 0xF40E3585, 0x106AA070,
    0x19A4C116, 0x1E376C08, 0x2748774C, 0x34B0BCB5,
    0x391C0CB3, 0x4ED8AA4A, 0x5B9CCA4F, 0x682E6FF3,
    0x748F82EE, 0x78A5636F, 0x84C87814, 0x8CC70208,
    0x90BEFFFA, 0xA4506CEB, 0xBEF9A3F7, 0xC67178F2,
];

impl Sha256 {

    /// Create a new instance.
    pub fn new() -> Self {
        Self { h: IV, buf: [0u8; 64], ctr: 0 }
    }

    /// Create an instance that resumes from a given midstate; `len` is
    /// the number of bytes already processed into that state, and must
    /// be a multiple of 64.
    pub fn from_midstate(state: &[u32; 8], len: u64) -> Self {
        assert!((len & 63) == 0);
        Self { h: *state, buf: [0u8; 64], ctr: len }
    }

    /// Get the current midstate and the number of bytes processed so
    /// far. This is available only when the number of injected bytes
    /// is a multiple of the block size (64 bytes); `None` is returned
    /// otherwise.
    pub fn midstate(&self) -> Option<([u32; 8], u64)> {
        if (self.ctr & 63) != 0 {
            None
        } else {
            Some((self.h, self.ctr))
        }
    }

    /// Process some input bytes; this function can be called
    /// repeatedly.
    pub fn update(&mut self, src: impl AsRef<[u8]>) {
        let src = src.as_ref();
        let mut j = 0;
        let mut ptr = (self.ctr as usize) & 63;
        while j < src.len() {
            let clen = core::cmp::min(src.len() - j, 64 - ptr);
            self.buf[ptr..(ptr + clen)].copy_from_slice(&src[j..(j + clen)]);
            ptr += clen;
            if ptr == 64 {
                self.process();
                ptr = 0;
            }
            j += clen;
        }
        self.ctr += src.len() as u64;
    }

    /// Compute the hash of all bytes injected so far. The instance is
    /// consumed (and its buffered data wiped).
    pub fn finalize(mut self) -> [u8; 32] {
        let mut ptr = (self.ctr as usize) & 63;
        self.buf[ptr] = 0x80;
        ptr += 1;
        if ptr > 56 {
            self.buf[ptr..].fill(0);
            self.process();
            ptr = 0;
        }
        self.buf[ptr..56].fill(0);
        self.buf[56..].copy_from_slice(&(self.ctr << 3).to_be_bytes());
        self.process();
        let mut r = [0u8; 32];
        for i in 0..8 {
            r[(i << 2)..((i << 2) + 4)].copy_from_slice(&self.h[i].to_be_bytes());
        }
        self.zeroize();
        r
    }

    /// One-call hash of a given input.
    pub fn hash(src: impl AsRef<[u8]>) -> [u8; 32] {
        let mut s = Self::new();
        s.update(src);
        s.finalize()
    }

    fn process(&mut self) {

        #[inline(always)]
        fn ch(x: u32, y: u32, z: u32) -> u32 {
            z ^ (x & (y ^ z))
        }

        #[inline(always)]
        fn maj(x: u32, y: u32, z: u32) -> u32 {
            (x & y) | (z & (x | y))
        }

        #[inline(always)]
        fn bsig0(x: u32) -> u32 {
            x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
        }

        #[inline(always)]
        fn bsig1(x: u32) -> u32 {
            x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
        }

        #[inline(always)]
        fn ssig0(x: u32) -> u32 {
            x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
        }

        #[inline(always)]
        fn ssig1(x: u32) -> u32 {
            x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
        }

        let mut w = [0u32; 64];
        for i in 0..16 {
            let mut d = [0u8; 4];
            d.copy_from_slice(&self.buf[(i << 2)..((i << 2) + 4)]);
            w[i] = u32::from_be_bytes(d);
        }
        for i in 16..64 {
            w[i] = ssig1(w[i - 2]).wrapping_add(w[i - 7])
                .wrapping_add(ssig0(w[i - 15])).wrapping_add(w[i - 16]);
        }

        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = self.h;
        for i in 0..8 {
            macro_rules! rf {
                ($a:ident, $b:ident, $c:ident, $d:ident,
                 $e:ident, $f:ident, $g:ident, $h:ident, $idx:expr) => {

                    let t1 = $h.wrapping_add(bsig1($e))
                        .wrapping_add(ch($e, $f, $g))
                        .wrapping_add(K[$idx])
                        .wrapping_add(w[$idx]);
                    let t2 = bsig0($a).wrapping_add(maj($a, $b, $c));
                    $d = $d.wrapping_add(t1);
                    $h = t1.wrapping_add(t2);
                }
            }

            let j = i << 3;
            rf!(a, b, c, d, e, f, g, h, j + 0);
            rf!(h, a, b, c, d, e, f, g, j + 1);
            rf!(g, h, a, b, c, d, e, f, j + 2);
            rf!(f, g, h, a, b, c, d, e, j + 3);
            rf!(e, f, g, h, a, b, c, d, j + 4);
            rf!(d, e, f, g, h, a, b, c, j + 5);
            rf!(c, d, e, f, g, h, a, b, j + 6);
            rf!(b, c, d, e, f, g, h, a, j + 7);
        }
        let st = [a, b, c, d, e, f, g, h];
        for i in 0..8 {
            self.h[i] = self.h[i].wrapping_add(st[i]);
        }
        w.zeroize();
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Zeroize for Sha256 {
    fn zeroize(&mut self) {
        self.h.zeroize();
        self.buf.zeroize();
        self.ctr.zeroize();
    }
}

/// HMAC-SHA256.
#[derive(Clone, Debug)]
pub struct HmacSha256 {
    inner: Sha256,
    outer: Sha256,
}

impl HmacSha256 {

    /// Start a new HMAC computation with the provided key (of any
    /// length).
    pub fn new(key: &[u8]) -> Self {
        let mut rkey = [0u8; 64];
        if key.len() <= 64 {
            rkey[..key.len()].copy_from_slice(key);
        } else {
            rkey[..32].copy_from_slice(&Sha256::hash(key));
        }

        let mut outer = Sha256::new();
        for b in rkey.iter_mut() {
            *b ^= 0x5C;
        }
        outer.update(&rkey);

        let mut inner = Sha256::new();
        for b in rkey.iter_mut() {
            *b ^= 0x5C ^ 0x36;
        }
        inner.update(&rkey);
        rkey.zeroize();

        Self { inner, outer }
    }

    /// Inject some data; this function can be called repeatedly.
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        self.inner.update(data);
    }

    /// Compute the MAC value. The instance is consumed.
    pub fn finalize(mut self) -> [u8; 32] {
        let mut t = self.inner.finalize();
        self.outer.update(&t);
        t.zeroize();
        let r = self.outer.finalize();
        self.inner.zeroize();
        r
    }

    /// One-call MAC of some data under a key.
    pub fn mac(key: &[u8], data: &[u8]) -> [u8; 32] {
        let mut hm = Self::new(key);
        hm.update(data);
        hm.finalize()
    }
}

impl Drop for HmacSha256 {
    fn drop(&mut self) {
        self.inner.zeroize();
        self.outer.zeroize();
    }
}

/// Deterministic generator of RFC 6979 (HMAC_DRBG with SHA-256).
///
/// The generator is seeded once with a key buffer (typically the
/// private key, the message hash, and optional extra data), then
/// produces any number of pseudorandom bytes. Each call to `generate()`
/// after the first one first updates the internal state (step h.3 of
/// RFC 6979 section 3.2), so that successive calls yield the successive
/// candidate nonces.
#[derive(Clone, Debug)]
pub struct Rfc6979HmacSha256 {
    v: [u8; 32],
    k: [u8; 32],
    retry: bool,
}

impl Rfc6979HmacSha256 {

    /// Initialize from the given key buffer.
    pub fn new(key: &[u8]) -> Self {
        let mut r = Self { v: [0x01; 32], k: [0x00; 32], retry: false };
        for sep in [0x00u8, 0x01u8] {
            let mut hm = HmacSha256::new(&r.k);
            hm.update(&r.v);
            hm.update(&[sep]);
            hm.update(key);
            r.k = hm.finalize();
            r.v = HmacSha256::mac(&r.k, &r.v);
        }
        r
    }

    /// Fill `out` with the next pseudorandom bytes.
    pub fn generate(&mut self, out: &mut [u8]) {
        if self.retry {
            let mut hm = HmacSha256::new(&self.k);
            hm.update(&self.v);
            hm.update(&[0x00]);
            self.k = hm.finalize();
            self.v = HmacSha256::mac(&self.k, &self.v);
        }
        for chunk in out.chunks_mut(32) {
            self.v = HmacSha256::mac(&self.k, &self.v);
            chunk.copy_from_slice(&self.v[..chunk.len()]);
        }
        self.retry = true;
    }

    /// Wipe the generator state.
    pub fn finalize(&mut self) {
        self.zeroize();
    }
}

impl Zeroize for Rfc6979HmacSha256 {
    fn zeroize(&mut self) {
        self.v.zeroize();
        self.k.zeroize();
        self.retry = false;
    }
}

impl Drop for Rfc6979HmacSha256 {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ========================================================================
