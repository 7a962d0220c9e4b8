//! Base field of secp256k1 (integers modulo p = 2^256 - 2^32 - 977).
//!
//! See the `backend` module for the conventions that apply to
//! `FieldElement`, in particular the magnitude rules.

pub use crate::backend::{FieldElement, FieldStorage};
