//! Scalars: integers modulo the secp256k1 group order n.

pub use crate::backend::Scalar;
