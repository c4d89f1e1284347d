//! Recursive, domain-separating hashing of structured values.
//!
//! The Fiat-Shamir transcripts of every argument flow through
//! [`HashService::recursive_hash`], so its byte-level behaviour fixes the
//! interoperability format: integers hash as their minimum-length big-endian
//! encoding, strings as UTF-8, and lists as the hash of the concatenation of
//! their children's hashes (a singleton list hashes as its only element).

pub mod kdf;

use std::marker::PhantomData;

use digest::Digest;
use num_bigint::BigUint;

use crate::error::{CryptoError, Result};
use crate::math::conversions::{integer_to_byte_array, string_to_byte_array};

/// A value that can be fed to the recursive hasher: a byte string, a text
/// string, a non-negative integer, or a list of such values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hashable {
    ByteArray(Vec<u8>),
    String(String),
    Integer(BigUint),
    List(Vec<Hashable>),
}

impl From<&[u8]> for Hashable {
    fn from(bytes: &[u8]) -> Self {
        Hashable::ByteArray(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Hashable {
    fn from(bytes: Vec<u8>) -> Self {
        Hashable::ByteArray(bytes)
    }
}

impl From<&str> for Hashable {
    fn from(s: &str) -> Self {
        Hashable::String(s.to_string())
    }
}

impl From<BigUint> for Hashable {
    fn from(n: BigUint) -> Self {
        Hashable::Integer(n)
    }
}

impl From<&BigUint> for Hashable {
    fn from(n: &BigUint) -> Self {
        Hashable::Integer(n.clone())
    }
}

impl From<Vec<Hashable>> for Hashable {
    fn from(values: Vec<Hashable>) -> Self {
        Hashable::List(values)
    }
}

/// A value with a canonical hashable form. The form determines the
/// Fiat-Shamir transcript, so implementations must be stable across versions.
pub trait ToHashable {
    fn to_hashable(&self) -> Hashable;
}

impl ToHashable for crate::math::GqElement {
    fn to_hashable(&self) -> Hashable {
        Hashable::Integer(self.value().clone())
    }
}

impl ToHashable for crate::math::ZqElement {
    fn to_hashable(&self) -> Hashable {
        Hashable::Integer(self.value().clone())
    }
}

impl<E> ToHashable for crate::math::GroupVector<E>
where
    E: crate::math::GroupVectorElement + ToHashable,
{
    fn to_hashable(&self) -> Hashable {
        Hashable::List(self.iter().map(ToHashable::to_hashable).collect())
    }
}

impl<E> ToHashable for crate::math::GroupMatrix<E>
where
    E: crate::math::GroupVectorElement + ToHashable,
{
    fn to_hashable(&self) -> Hashable {
        Hashable::List(self.rows().iter().map(ToHashable::to_hashable).collect())
    }
}

/// The underlying fixed-output-length hash primitive. The recursive hasher,
/// the Fiat-Shamir challenges and the commitment-key derivation are generic
/// over this capability.
pub trait HashFunction: Send + Sync {
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// The digest length in bytes.
    fn digest_byte_length(&self) -> usize;
}

/// Adapts any [`digest::Digest`] implementation (SHA3-256, SHA-256, ...) to
/// the [`HashFunction`] capability.
pub struct DigestHashFunction<D> {
    _marker: PhantomData<D>,
}

impl<D> DigestHashFunction<D> {
    pub fn new() -> Self {
        DigestHashFunction {
            _marker: PhantomData,
        }
    }
}

impl<D> Default for DigestHashFunction<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest + Send + Sync> HashFunction for DigestHashFunction<D> {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        D::digest(data).to_vec()
    }

    fn digest_byte_length(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// Domain-separating recursive hasher over [`Hashable`] values.
pub struct HashService {
    function: Box<dyn HashFunction>,
}

impl HashService {
    pub fn new(function: impl HashFunction + 'static) -> Self {
        HashService {
            function: Box::new(function),
        }
    }

    /// The default service, backed by SHA3-256.
    pub fn sha3_256() -> Self {
        HashService::new(DigestHashFunction::<sha3::Sha3_256>::new())
    }

    /// The digest length of the underlying hash, in bytes.
    pub fn hash_length(&self) -> usize {
        self.function.digest_byte_length()
    }

    /// Computes the recursive hash of one or more values. Several top-level
    /// values are hashed as the list of those values.
    ///
    /// Callers are responsible for keeping inputs finite and for separating
    /// domains whose byte representations could collide.
    pub fn recursive_hash(&self, values: &[Hashable]) -> Result<Vec<u8>> {
        match values {
            [] => Err(CryptoError::InvalidInput("Cannot hash no values.".into())),
            [single] => self.hash_value(single),
            several => self.hash_list(several),
        }
    }

    fn hash_value(&self, value: &Hashable) -> Result<Vec<u8>> {
        match value {
            Hashable::ByteArray(bytes) => Ok(self.function.hash(bytes)),
            Hashable::String(s) => Ok(self.function.hash(&string_to_byte_array(s))),
            Hashable::Integer(n) => Ok(self.function.hash(&integer_to_byte_array(n))),
            Hashable::List(items) => match items.as_slice() {
                [] => Err(CryptoError::InvalidInput(
                    "Cannot hash an empty list.".into(),
                )),
                [single] => self.hash_value(single),
                several => self.hash_list(several),
            },
        }
    }

    fn hash_list(&self, items: &[Hashable]) -> Result<Vec<u8>> {
        let mut concatenated = Vec::new();
        for item in items {
            concatenated.extend(self.hash_value(item)?);
        }
        Ok(self.function.hash(&concatenated))
    }
}
