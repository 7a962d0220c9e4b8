//! Secp256k1-engine is a Rust library for elliptic curve cryptography
//! over the secp256k1 curve.
//!
//! The library implements the arithmetic layers (base field, scalars,
//! curve points, fast multiplication by the generator and fast
//! double-scalar multiplication) and the protocols built on top of them:
//! ECDSA signatures (with DER and compact encodings, low-S
//! normalization and RFC 6979 deterministic nonces), a Schnorr signature
//! scheme with a multi-signature mode, secret and public key
//! manipulation (creation, negation, tweaks, combination), pay-to-contract
//! commitments and sign-to-contract openings.
//!
//! All protocol operations are methods on a `Context`, which holds the
//! precomputed tables, the blinding state of the generator
//! multiplication, and the callbacks used to report illegal arguments
//! and internal failures. A context is created with flags that say which
//! tables to build (`CONTEXT_SIGN`, `CONTEXT_VERIFY`, or both). The
//! static `NO_PRECOMP` context has no table and is enough for parsing
//! and serialization.
//!
//! # Usage
//!
//! The library is "mostly `no_std`". By default, it compiles against the
//! standard library. Without the `alloc` feature, only the arithmetic
//! modules (`field`, `scalar`, `group`), the hash functions and the nonce
//! functions are available; the precomputed tables and the protocols
//! need heap allocation.
//!
//! # Conventions
//!
//! All implemented functions should be strictly constant-time, unless
//! explicitly documented otherwise (non-constant-time functions normally
//! have "vartime" in their name). In order to avoid unwanted side-channel
//! leaks, the arithmetic layers avoid Booleans: functions that return or
//! use a potentially secret Boolean value use the `u32` type; the
//! convention is that 0xFFFFFFFF means "true", and 0x00000000 means
//! "false". No other value shall be used, for they would lead to
//! unpredictable results.
//!
//! Throughout the code, functions that modify the object on which they
//! are called tend to have a name in `set_*()` (e.g. for a point `P`,
//! `P.set_double()` modifies the point in place, while `P.double()`
//! leaves `P` unmodified and returns the double as a new instance).
//!
//! Protocol operations return `Result<_, Error>`; verification functions
//! return a plain `bool`. Secret values held in temporary buffers are
//! cleared (with `zeroize`) before the functions return.

#![no_std]

#[cfg(all(feature = "alloc", not(feature = "std")))]
#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

#[cfg(all(feature = "alloc", not(feature = "std")))]
pub(crate) use alloc::vec::Vec;

#[cfg(feature = "std")]
pub(crate) use std::vec::Vec;

#[cfg(all(feature = "alloc", not(feature = "std")))]
pub(crate) use alloc::sync::Arc;

#[cfg(feature = "std")]
pub(crate) use std::sync::Arc;

pub use rand_core::{CryptoRng, RngCore, Error as RngError};

pub mod backend;
pub mod field;
pub mod scalar;
pub mod group;
pub mod hash;
pub mod nonce;
pub mod error;

#[cfg(feature = "alloc")]
pub mod ecmult_gen;
#[cfg(feature = "alloc")]
pub mod ecmult;
#[cfg(feature = "alloc")]
pub mod context;
#[cfg(feature = "alloc")]
pub mod eckey;
#[cfg(feature = "alloc")]
pub mod ecdsa;
#[cfg(feature = "alloc")]
pub mod schnorr;

pub use error::Error;
pub use nonce::{NonceFunction, Rfc6979Nonce, BipSchnorrNonce, NONCE_FUNCTION_DEFAULT};

#[cfg(feature = "alloc")]
pub use context::{Context, Callback, NO_PRECOMP,
    CONTEXT_NONE, CONTEXT_SIGN, CONTEXT_VERIFY, EC_COMPRESSED, EC_UNCOMPRESSED};
#[cfg(feature = "alloc")]
pub use eckey::{PublicKey, S2cOpening, seckey_generate, seckey_from_seed};
#[cfg(feature = "alloc")]
pub use ecdsa::Signature;
#[cfg(feature = "alloc")]
pub use schnorr::SCHNORR_ALGO16;
