//! Context: precomputed tables, blinding state and callbacks.
//!
//! Every public operation takes a `Context`. A context is created with a
//! set of flags that select which tables are built: the table for `k*G`
//! (signing, key generation, tweaks by multiplication of the generator)
//! and the tables for `u*P + v*G` (verification, public key tweaks).
//! Building the tables is the only expensive step; a built context is
//! immutable during normal operations and can be shared between threads.
//! Cloning copies the tables without recomputing them.
//!
//! The context also holds two callbacks. The illegal-argument callback
//! is invoked when the caller violates an API contract (e.g. requests a
//! signature from a context without the signing table); the error
//! callback reports internal consistency failures. By default, both
//! print a message on standard error and abort the process.

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::ecmult::Ecmult;
use crate::ecmult_gen::EcmultGen;
use crate::error::Error;
use crate::group::Jacobian;
use crate::Arc;

// The low byte of a flags value says what the flags are for.
pub(crate) const FLAGS_TYPE_MASK: u32 = 0xFF;
pub(crate) const FLAGS_TYPE_CONTEXT: u32 = 1 << 0;
pub(crate) const FLAGS_TYPE_COMPRESSION: u32 = 1 << 1;
pub(crate) const FLAGS_BIT_CONTEXT_VERIFY: u32 = 1 << 8;
pub(crate) const FLAGS_BIT_CONTEXT_SIGN: u32 = 1 << 9;
pub(crate) const FLAGS_BIT_COMPRESSION: u32 = 1 << 8;

/// Context with no precomputed table.
pub const CONTEXT_NONE: u32 = FLAGS_TYPE_CONTEXT;

/// Context that can verify signatures and tweak public keys.
pub const CONTEXT_VERIFY: u32 = FLAGS_TYPE_CONTEXT | FLAGS_BIT_CONTEXT_VERIFY;

/// Context that can sign and create public keys.
pub const CONTEXT_SIGN: u32 = FLAGS_TYPE_CONTEXT | FLAGS_BIT_CONTEXT_SIGN;

/// Public key serialization flag: compressed (33 bytes).
pub const EC_COMPRESSED: u32 = FLAGS_TYPE_COMPRESSION | FLAGS_BIT_COMPRESSION;

/// Public key serialization flag: uncompressed (65 bytes).
pub const EC_UNCOMPRESSED: u32 = FLAGS_TYPE_COMPRESSION;

/// Receiver of error reports.
///
/// Closures `Fn(&str)` implement this trait.
pub trait Callback: Send + Sync {

    /// Report a problem, described by `msg`.
    fn call(&self, msg: &str);
}

impl<F> Callback for F where F: Fn(&str) + Send + Sync {
    fn call(&self, msg: &str) {
        self(msg)
    }
}

/// Default illegal-argument callback: print and abort.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultIllegalCallback;

impl Callback for DefaultIllegalCallback {
    fn call(&self, msg: &str) {
        fatal("illegal argument", msg);
    }
}

/// Default internal-error callback: print and abort.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultErrorCallback;

impl Callback for DefaultErrorCallback {
    fn call(&self, msg: &str) {
        fatal("internal consistency check failed", msg);
    }
}

#[cfg(feature = "std")]
fn fatal(what: &str, msg: &str) {
    eprintln!("[secp256k1] {}: {}", what, msg);
    std::process::abort();
}

#[cfg(not(feature = "std"))]
fn fatal(what: &str, msg: &str) {
    panic!("[secp256k1] {}: {}", what, msg);
}

/// Library context.
#[derive(Clone)]
pub struct Context {
    gen: Option<EcmultGen>,
    mult: Option<Ecmult>,
    illegal: Option<Arc<dyn Callback>>,
    error: Option<Arc<dyn Callback>>,
}

/// A context without any table, usable for parsing and serialization.
/// Operations that need a table fail their build check with it.
pub static NO_PRECOMP: Context = Context::none();

impl Context {

    const fn none() -> Self {
        Self { gen: None, mult: None, illegal: None, error: None }
    }

    /// Create a new context.
    ///
    /// `flags` is `CONTEXT_NONE`, `CONTEXT_SIGN`, `CONTEXT_VERIFY` or
    /// `CONTEXT_SIGN | CONTEXT_VERIFY`. A value without the context
    /// type bits (e.g. `EC_COMPRESSED`) is an illegal argument, reported
    /// through the default callback.
    pub fn new(flags: u32) -> Result<Self, Error> {
        let mut ctx = Self::none();
        if (flags & FLAGS_TYPE_MASK) != FLAGS_TYPE_CONTEXT {
            return Err(ctx.illegal_argument("invalid context flags"));
        }
        if (flags & FLAGS_BIT_CONTEXT_SIGN) != 0 {
            ctx.gen = Some(EcmultGen::new());
        }
        if (flags & FLAGS_BIT_CONTEXT_VERIFY) != 0 {
            ctx.mult = Some(Ecmult::new());
        }
        Ok(ctx)
    }

    /// Returns true if the signing table is built.
    pub fn is_sign_capable(&self) -> bool {
        self.gen.is_some()
    }

    /// Returns true if the verification tables are built.
    pub fn is_verify_capable(&self) -> bool {
        self.mult.is_some()
    }

    /// Set the illegal-argument callback (`None` restores the default).
    pub fn set_illegal_callback(&mut self, cb: Option<Arc<dyn Callback>>) {
        self.illegal = cb;
    }

    /// Set the internal-error callback (`None` restores the default).
    pub fn set_error_callback(&mut self, cb: Option<Arc<dyn Callback>>) {
        self.error = cb;
    }

    /// Re-blind the signing table with the provided seed (32 bytes,
    /// which should come from a secure random source). With `None`,
    /// the blinding is reset to its initial state. This does nothing
    /// if the context has no signing table.
    pub fn randomize(&mut self, seed32: Option<&[u8; 32]>) {
        if let Some(g) = self.gen.as_mut() {
            g.blind(seed32);
        }
    }

    /// Re-blind the signing table with a seed obtained from the
    /// provided random source.
    pub fn randomize_with_rng<T: CryptoRng + RngCore>(&mut self, rng: &mut T) {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        self.randomize(Some(&seed));
        seed.zeroize();
    }

    // Report an illegal argument through the callback and return the
    // matching error value (for when the callback returns).
    pub(crate) fn illegal_argument(&self, msg: &'static str) -> Error {
        match &self.illegal {
            Some(cb) => cb.call(msg),
            None => DefaultIllegalCallback.call(msg),
        }
        Error::IllegalArgument(msg)
    }

    // Report an internal consistency failure through the callback.
    pub(crate) fn internal_error(&self, msg: &str) {
        match &self.error {
            Some(cb) => cb.call(msg),
            None => DefaultErrorCallback.call(msg),
        }
    }

    // Check that a point computed from validated inputs is not the
    // point-at-infinity; if it is, the tables or the arithmetic are
    // broken, which is reported through the error callback.
    pub(crate) fn check_finite(&self, P: &Jacobian, msg: &str)
        -> Result<(), Error>
    {
        if P.is_infinity() != 0 {
            self.internal_error(msg);
            return Err(Error::PointAtInfinity);
        }
        Ok(())
    }

    // Get the signing table, or report an illegal argument.
    pub(crate) fn gen(&self) -> Result<&EcmultGen, Error> {
        match &self.gen {
            Some(g) => Ok(g),
            None => Err(self.illegal_argument("signing table not built")),
        }
    }

    // Get the verification tables, or report an illegal argument.
    pub(crate) fn mult(&self) -> Result<&Ecmult, Error> {
        match &self.mult {
            Some(m) => Ok(m),
            None => Err(self.illegal_argument("verification table not built")),
        }
    }
}

// ========================================================================
