//! Key derivation (HKDF-Expand) and derivation of Zq elements without
//! modulo bias.

use hkdf::Hkdf;
use num_bigint::BigUint;
use sha2::Sha256;

use crate::error::{CryptoError, Result};
use crate::math::conversions::{
    byte_array_to_integer, byte_length, cut_to_bit_length, string_to_byte_array,
};
use crate::math::zq_group::{ZqElement, ZqGroup};

const HASH_LENGTH: usize = 32;

/// HKDF-Expand (RFC 5869, section 2.3) over HMAC-SHA-256.
///
/// The context information segments are concatenated with a single
/// length-prefix byte each; every segment must therefore fit in 255 bytes.
/// The pseudo-random key must be at least one hash length long, and the
/// output at most 255 hash lengths.
pub fn kdf(
    pseudo_random_key: &[u8],
    context_information: &[&str],
    required_byte_length: usize,
) -> Result<Vec<u8>> {
    if required_byte_length == 0 {
        return Err(CryptoError::InvalidInput(
            "Requested byte length must be greater than 0.".into(),
        ));
    }
    if pseudo_random_key.len() < HASH_LENGTH {
        return Err(CryptoError::InvalidInput(
            "The pseudo random key length must be greater than the hash function output length."
                .into(),
        ));
    }
    if required_byte_length > 255 * HASH_LENGTH {
        return Err(CryptoError::InvalidInput(
            "The required byte length must be smaller than 255 times the hash function output length."
                .into(),
        ));
    }

    let mut info = Vec::new();
    for segment in context_information {
        let bytes = string_to_byte_array(segment);
        if bytes.len() > 255 {
            return Err(CryptoError::InvalidInput(
                "Each context information segment must be at most 255 bytes long.".into(),
            ));
        }
        info.push(bytes.len() as u8);
        info.extend(bytes);
    }

    let hkdf = Hkdf::<Sha256>::from_prk(pseudo_random_key).map_err(|_| {
        CryptoError::InvalidInput("The pseudo random key is too short for HKDF.".into())
    })?;
    let mut okm = vec![0u8; required_byte_length];
    hkdf.expand(&info, &mut okm).map_err(|_| {
        CryptoError::InvalidInput("The requested KDF output length is invalid.".into())
    })?;
    Ok(okm)
}

/// Derives an element of Zq by rejection sampling over the KDF output,
/// eliminating modulo bias: the output is cut to the bit length of q and the
/// derivation is re-keyed until the value falls below q.
pub fn kdf_to_zq(
    pseudo_random_key: &[u8],
    context_information: &[&str],
    exclusive_upper_bound: &BigUint,
) -> Result<ZqElement> {
    let q = exclusive_upper_bound;
    let length = byte_length(q);
    if length < HASH_LENGTH {
        return Err(CryptoError::InvalidInput(
            "The upper bound must be at least one hash length long.".into(),
        ));
    }

    let group = ZqGroup::new(q.clone())?;
    let mut h = kdf(pseudo_random_key, context_information, length)?;
    let mut u = byte_array_to_integer(&cut_to_bit_length(&h, q.bits() as usize));
    while &u >= q {
        h = kdf(&h, context_information, length)?;
        u = byte_array_to_integer(&cut_to_bit_length(&h, q.bits() as usize));
    }
    ZqElement::new(u, &group)
}
