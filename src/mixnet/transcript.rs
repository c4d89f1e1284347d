//! Fiat-Shamir challenge derivation.
//!
//! Every verifier challenge of the argument engine is derived here and
//! nowhere else, so prover and verifier agree on the transcript byte for
//! byte. A transcript is the hashable list (ck, pk, statement fields...,
//! preceding commitments...) in the order documented by each argument; when
//! one transcript yields several challenges, each further challenge prepends
//! the digest of the previous one as its first element.

use num_bigint::BigUint;

use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable};
use crate::math::conversions::byte_array_to_integer;
use crate::math::zq_group::{ZqElement, ZqGroup};

/// Fails with [`CryptoError::BitLengthTooLarge`] when the digest of the hash
/// service is not strictly shorter than q. A longer digest would have to be
/// reduced modulo q and would bias the challenge.
pub(crate) fn check_challenge_length(hash: &HashService, q: &BigUint) -> Result<()> {
    if 8 * hash.hash_length() as u64 >= q.bits() {
        return Err(CryptoError::BitLengthTooLarge(
            "The hash service's bit length must be smaller than the bit length of q.".into(),
        ));
    }
    Ok(())
}

/// Derives a challenge from a transcript, returning the Zq element together
/// with the raw digest for chaining.
pub(crate) fn derive_challenge(
    hash: &HashService,
    group: &ZqGroup,
    transcript: &[Hashable],
) -> Result<(ZqElement, Vec<u8>)> {
    let digest = hash.recursive_hash(transcript)?;
    let element = ZqElement::new(byte_array_to_integer(&digest), group)?;
    Ok((element, digest))
}

/// Derives a further challenge from the same transcript by prepending the
/// digest of the previous challenge.
pub(crate) fn derive_chained_challenge(
    hash: &HashService,
    group: &ZqGroup,
    previous_digest: &[u8],
    transcript: &[Hashable],
) -> Result<(ZqElement, Vec<u8>)> {
    let mut chained = Vec::with_capacity(transcript.len() + 1);
    chained.push(Hashable::ByteArray(previous_digest.to_vec()));
    chained.extend_from_slice(transcript);
    derive_challenge(hash, group, &chained)
}
