//! Error type for the fallible operations of this crate.

use thiserror::Error;

/// Reasons an operation may fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller supplied an invalid argument (e.g. a context without the
    /// required table, invalid flags, or an empty list). The context's
    /// illegal-argument callback has been invoked before this value is
    /// returned.
    #[error("illegal argument: {0}")]
    IllegalArgument(&'static str),

    /// A secret key is zero or not lower than the curve order.
    #[error("invalid secret key")]
    InvalidSecretKey,

    /// A public key encoding is malformed or not a curve point.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// A signature encoding is malformed, or a signature (or
    /// sub-signature) did not verify.
    #[error("invalid signature")]
    InvalidSignature,

    /// A tweak value overflows the curve order, or the tweaked key is
    /// invalid.
    #[error("invalid tweak")]
    InvalidTweak,

    /// The nonce function refused to produce a nonce.
    #[error("nonce generation failed")]
    NonceGeneration,

    /// A computation yielded the point-at-infinity.
    #[error("point at infinity")]
    PointAtInfinity,

    /// A sign-to-contract opening is malformed.
    #[error("invalid sign-to-contract opening")]
    InvalidOpening,

    /// A commitment could not be computed (e.g. empty data).
    #[error("invalid commitment")]
    InvalidCommitment,
}
