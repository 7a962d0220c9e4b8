//! Limb-level implementations of the secp256k1 base field and scalars.
//!
//! Two types are provided:
//!
//!  - `FieldElement`: integers modulo p = 2^256 - 2^32 - 977, with five
//!    52-bit limbs. The representation is redundant: additions do not
//!    propagate carries, and each value has a _magnitude_ that bounds
//!    how far its limbs may exceed their normalized size. Callers are
//!    responsible for keeping magnitudes within the documented limits
//!    of each function (in particular, multiplications and squarings
//!    accept operands of magnitude at most 8, and return a value of
//!    magnitude 1). In debug builds, the magnitude and a "normalized"
//!    flag are stored alongside the limbs and checked at every
//!    operation; release builds do not carry them.
//!
//!  - `Scalar`: integers modulo the curve order n, with four 64-bit
//!    limbs. Scalars are always fully reduced.
//!
//! In general, the following properties apply to both types:
//!
//!  - Constant values can be defined with the const-qualified `w64be()`
//!    function, which takes the value as four 64-bit limbs in big-endian
//!    order. The value MUST already be reduced.
//!
//!  - In-place mutators have a name in `set_*()` (e.g. `set_square()`,
//!    `set_neg()`, `set_invert()`), with a corresponding function that
//!    returns the result as a new instance (`square()`, `neg()`,
//!    `invert()`).
//!
//!  - Function `set_cond(&mut self, a: &Self, ctl: u32)` sets
//!    the instance to the value of the other instance `a` if `ctl` is
//!    equal to 0xFFFFFFFF, or leaves the instance value unmodified if
//!    `ctl` is equal to 0x00000000. Function `select(a0, a1, ctl)`
//!    returns a copy of `a0` or `a1` along the same rule.
//!
//!  - Function `decode(buf: &[u8; 32]) -> (Self, u32)` decodes 32 bytes
//!    with unsigned big-endian convention. The returned `u32` is
//!    0xFFFFFFFF if the value was in the canonical range, 0x00000000
//!    otherwise. Function `encode()` returns the 32-byte big-endian
//!    encoding (field elements must be normalized first).
//!
//!  - Inversion of zero yields zero. Constant-time inversion uses a
//!    fixed exponentiation; variable-time inversion (`invert_vartime()`)
//!    uses a binary extended GCD and MUST NOT be applied to secret
//!    values.
//!
//! All functions are constant-time unless their name ends with
//! `_vartime`.

pub mod w64;

pub use w64::{FieldElement, FieldStorage, Scalar};
