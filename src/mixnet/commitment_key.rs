//! Pedersen commitment keys and their verifiable derivation.

use num_bigint::BigUint;

use crate::error::{CryptoError, Result};
use crate::hashing::kdf::kdf;
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::conversions::{byte_array_to_integer, byte_length, cut_to_bit_length};
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::{GqElement, GqGroup};

const LOG_TARGET: &str = "zk_mixnet::mixnet::commitment_key";

/// A Pedersen commitment key (h, g_1..g_nu) with nu >= 1. None of the
/// elements may be the identity or the group generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentKey {
    h: GqElement,
    g_elements: GroupVector<GqElement>,
}

impl CommitmentKey {
    pub fn new(h: GqElement, g_elements: GroupVector<GqElement>) -> Result<Self> {
        if g_elements.is_empty() {
            return Err(CryptoError::InvalidInput(
                "A commitment key must have at least one g element.".into(),
            ));
        }
        if g_elements.group() != Some(h.group()) {
            return Err(CryptoError::GroupMismatch(
                "All commitment key elements must belong to the same group.".into(),
            ));
        }
        let group = h.group();
        let identity = group.identity();
        let generator = group.generator();
        for element in std::iter::once(&h).chain(g_elements.iter()) {
            if element == &identity {
                return Err(CryptoError::InvalidInput(
                    "A commitment key element must not be the identity.".into(),
                ));
            }
            if element == &generator {
                return Err(CryptoError::InvalidInput(
                    "A commitment key element must not be the group generator.".into(),
                ));
            }
        }
        Ok(CommitmentKey { h, g_elements })
    }

    pub fn h(&self) -> &GqElement {
        &self.h
    }

    pub fn g_elements(&self) -> &GroupVector<GqElement> {
        &self.g_elements
    }

    /// The number of g elements, nu.
    pub fn size(&self) -> usize {
        self.g_elements.len()
    }

    pub fn group(&self) -> &GqGroup {
        self.h.group()
    }
}

impl ToHashable for CommitmentKey {
    fn to_hashable(&self) -> Hashable {
        let mut values = vec![self.h.to_hashable()];
        values.extend(self.g_elements.iter().map(ToHashable::to_hashable));
        Hashable::List(values)
    }
}

/// Derives a commitment key of `number_of_elements` g elements from the
/// group parameters, reproducibly for all parties.
///
/// The derivation seeds a KDF with the recursive hash of
/// ("commitmentKey", p, q, g) and walks an indexed candidate stream,
/// rejecting candidates that are not group members, equal the identity or
/// the generator, or repeat an accepted value, until k + 1 elements
/// (h followed by g_1..g_k) are collected.
pub fn get_verifiable_commitment_key(
    number_of_elements: usize,
    group: &GqGroup,
    hash: &HashService,
) -> Result<CommitmentKey> {
    let k = number_of_elements;
    if k == 0 {
        return Err(CryptoError::InvalidInput(
            "The number of commitment key elements must be strictly positive.".into(),
        ));
    }
    if BigUint::from(k) > group.q() - BigUint::from(3u8) {
        return Err(CryptoError::InvalidInput(
            "The number of commitment key elements must be at most q - 3.".into(),
        ));
    }

    let prk = hash.recursive_hash(&[
        Hashable::from("commitmentKey"),
        Hashable::from(group.p()),
        Hashable::from(group.q()),
        Hashable::from(group.generator().value()),
    ])?;

    let p_bit_length = group.p().bits() as usize;
    let p_byte_length = byte_length(group.p());
    let generator = group.generator();
    let identity = group.identity();

    let mut elements: Vec<GqElement> = Vec::with_capacity(k + 1);
    let mut index: u64 = 0;
    while elements.len() < k + 1 {
        let info = index.to_string();
        let candidate_bytes = kdf(&prk, &["commitmentKeyElement", &info], p_byte_length)?;
        let w = byte_array_to_integer(&cut_to_bit_length(&candidate_bytes, p_bit_length));
        index += 1;

        if !group.is_group_member(&w) {
            continue;
        }
        let candidate = GqElement::new(w, group)?;
        if candidate == identity || candidate == generator {
            continue;
        }
        if elements.contains(&candidate) {
            continue;
        }
        elements.push(candidate);
    }
    tracing::debug!(
        target: LOG_TARGET,
        candidates = index,
        accepted = elements.len(),
        "derived verifiable commitment key"
    );

    let mut iter = elements.into_iter();
    let h = iter
        .next()
        .ok_or_else(|| CryptoError::InvalidInput("Commitment key derivation failed.".into()))?;
    CommitmentKey::new(h, GroupVector::from_elements(iter.collect())?)
}
