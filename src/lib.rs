//! Cryptographic core of a verifiable re-encryption mixnet.
//!
//! The crate provides the algebra over the prime-order subgroup Gq of Z/pZ
//! and its exponent group Zq, multi-recipient ElGamal encryption, Pedersen
//! commitments, a re-encrypting shuffle, the Bayer-Groth shuffle argument
//! with its product, Hadamard, zero, single value product and
//! multi-exponentiation sub-arguments, and the zero-knowledge proofs used
//! alongside it (decryption, exponentiation and Schnorr proofs).
//!
//! All value types are immutable and the engine holds no shared mutable
//! state: randomness enters through the [`random::RandomSource`] capability
//! and hashing through [`hashing::HashService`], so outputs are bit-exactly
//! reproducible from a seeded source and a fixed hash configuration.

pub mod elgamal;
pub mod error;
pub mod hashing;
pub mod math;
pub mod mixnet;
pub mod random;
pub mod verification;
pub mod zkp;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::CryptoError;
pub use verification::VerificationResult;
