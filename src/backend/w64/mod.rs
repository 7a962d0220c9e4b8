// Field elements modulo p = 2^256 - 2^32 - 977, with five 52-bit limbs
// and lazy reduction (magnitude tracking).
pub mod field5x52;

pub use field5x52::{FieldElement, FieldStorage};

// Scalars modulo the curve order n, with four 64-bit limbs.
pub mod scalar4x64;

pub use scalar4x64::Scalar;

// Carrying addition and subtraction should use u64::carrying_add()
// and u64::borrowing_sub(), but these functions are currently only
// experimental.

// Add with carry; carry is 0 or 1.
// (x, y, c_in) -> x + y + c_in mod 2^64, c_out

#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_addcarry_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _addcarry_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub(crate) const fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_add(y as u128).wrapping_add(c as u128);
    (z as u64, (z >> 64) as u8)
}

// Subtract with borrow; borrow is 0 or 1.
// (x, y, c_in) -> x - y - c_in mod 2^64, c_out

#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_subborrow_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _subborrow_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub(crate) const fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_sub(y as u128).wrapping_sub(c as u128);
    (z as u64, (z >> 127) as u8)
}

// Compute x*y+z over 128 bits, returned as two 64-bit words (lo, hi)
#[inline(always)]
pub(crate) const fn umull_add(x: u64, y: u64, z: u64) -> (u64, u64) {
    let t = ((x as u128) * (y as u128)).wrapping_add(z as u128);
    (t as u64, (t >> 64) as u64)
}

// Compute x*y+z1+z2 over 128 bits, returned as two 64-bit words (lo, hi)
#[inline(always)]
pub(crate) const fn umull_add2(x: u64, y: u64, z1: u64, z2: u64) -> (u64, u64) {
    let t = ((x as u128) * (y as u128))
        .wrapping_add(z1 as u128).wrapping_add(z2 as u128);
    (t as u64, (t >> 64) as u64)
}

// Return 0xFFFFFFFFFFFFFFFF if x >= 0x8000000000000000, 0 otherwise
// (i.e. take the sign bit of the signed interpretation, and expand it
// to 64 bits).
#[inline(always)]
pub(crate) const fn sgnw(x: u64) -> u64 {
    ((x as i64) >> 63) as u64
}

// 256-bit helpers for the variable-time binary inversion below. Values
// are four 64-bit limbs in little-endian order.

#[inline(always)]
fn is_even4(a: &[u64; 4]) -> bool {
    (a[0] & 1) == 0
}

#[inline(always)]
fn is_one4(a: &[u64; 4]) -> bool {
    a[0] == 1 && (a[1] | a[2] | a[3]) == 0
}

#[inline(always)]
fn is_zero4(a: &[u64; 4]) -> bool {
    (a[0] | a[1] | a[2] | a[3]) == 0
}

// a >= b (vartime)
fn geq4(a: &[u64; 4], b: &[u64; 4]) -> bool {
    for i in (0..4).rev() {
        if a[i] != b[i] {
            return a[i] > b[i];
        }
    }
    true
}

// a <- a - b; returns the output borrow.
fn sub4(a: &mut [u64; 4], b: &[u64; 4]) -> u8 {
    let mut cc = 0;
    for i in 0..4 {
        let (d, ee) = subborrow_u64(a[i], b[i], cc);
        a[i] = d;
        cc = ee;
    }
    cc
}

// a <- a + b; returns the output carry.
fn add4(a: &mut [u64; 4], b: &[u64; 4]) -> u8 {
    let mut cc = 0;
    for i in 0..4 {
        let (d, ee) = addcarry_u64(a[i], b[i], cc);
        a[i] = d;
        cc = ee;
    }
    cc
}

// a <- a/2, with `hi` injected as the new top bit.
#[inline(always)]
fn half4(a: &mut [u64; 4], hi: u64) {
    a[0] = (a[0] >> 1) | (a[1] << 63);
    a[1] = (a[1] >> 1) | (a[2] << 63);
    a[2] = (a[2] >> 1) | (a[3] << 63);
    a[3] = (a[3] >> 1) | (hi << 63);
}

// x <- x/2 mod m (m odd, x < m).
fn half_mod4(x: &mut [u64; 4], m: &[u64; 4]) {
    if is_even4(x) {
        half4(x, 0);
    } else {
        let cc = add4(x, m);
        half4(x, cc as u64);
    }
}

// x <- x - y mod m (x, y < m).
fn sub_mod4(x: &mut [u64; 4], y: &[u64; 4], m: &[u64; 4]) {
    if sub4(x, y) != 0 {
        add4(x, m);
    }
}

/// Inverse of `a` modulo the odd prime `m`, with a binary extended GCD.
///
/// The input must be lower than `m`. Zero yields zero. THIS FUNCTION IS
/// NOT CONSTANT-TIME; it shall be used only on public values.
pub(crate) fn inv_vartime(a: &[u64; 4], m: &[u64; 4]) -> [u64; 4] {
    if is_zero4(a) {
        return [0u64; 4];
    }
    let mut u = *a;
    let mut v = *m;
    let mut x1 = [1u64, 0, 0, 0];
    let mut x2 = [0u64; 4];

    // Invariants: x1*a = u mod m, x2*a = v mod m.
    while !is_one4(&u) && !is_one4(&v) {
        while is_even4(&u) {
            half4(&mut u, 0);
            half_mod4(&mut x1, m);
        }
        while is_even4(&v) {
            half4(&mut v, 0);
            half_mod4(&mut x2, m);
        }
        if geq4(&u, &v) {
            sub4(&mut u, &v);
            sub_mod4(&mut x1, &x2, m);
        } else {
            sub4(&mut v, &u);
            sub_mod4(&mut x2, &x1, m);
        }
    }
    if is_one4(&u) { x1 } else { x2 }
}
