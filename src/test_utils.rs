//! Shared fixtures for the crate's tests: replayable randomness, hash
//! doubles for small test groups, and generators of random group values.

use std::collections::VecDeque;

use num_bigint::BigUint;
use sha3::{Digest, Sha3_256};

use crate::elgamal::{ElGamalMultiRecipientCiphertext, ElGamalMultiRecipientMessage};
use crate::hashing::HashFunction;
use crate::math::conversions::integer_to_byte_array;
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::{GqElement, GqGroup};
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::random::RandomSource;

/// Replays a fixed queue of integer draws, one per call, mirroring the
/// one-draw-per-sample contract of the protocols. Panics when the queue is
/// exhausted or a queued value does not fit the requested bound, both of
/// which indicate a test authoring error.
pub struct FixedRandomSource {
    values: VecDeque<BigUint>,
}

impl FixedRandomSource {
    pub fn of(values: &[u64]) -> Self {
        FixedRandomSource {
            values: values.iter().map(|&v| BigUint::from(v)).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for FixedRandomSource {
    fn gen_random_integer(&mut self, upper_bound: &BigUint) -> BigUint {
        let value = self
            .values
            .pop_front()
            .expect("the fixed random source ran out of queued draws");
        assert!(
            &value < upper_bound,
            "queued draw {value} does not fit below the requested bound {upper_bound}"
        );
        value
    }

    fn gen_random_bytes(&mut self, _length: usize) -> Vec<u8> {
        panic!("the fixed random source only replays integer draws");
    }
}

/// A hash primitive returning the same digest for every input, standing in
/// for the mocked hash of the reference test vectors. The digest length is
/// reported as zero so the challenge bit-length precondition passes for the
/// small test groups.
pub struct ConstantHash {
    digest: Vec<u8>,
}

impl ConstantHash {
    pub fn of(digest: &[u8]) -> Self {
        ConstantHash {
            digest: digest.to_vec(),
        }
    }
}

impl HashFunction for ConstantHash {
    fn hash(&self, _data: &[u8]) -> Vec<u8> {
        self.digest.clone()
    }

    fn digest_byte_length(&self) -> usize {
        0
    }
}

/// SHA3-256 reduced into [0, q): lets the Fiat-Shamir challenges of the
/// small test groups stay below q while remaining input-sensitive. The
/// digest length is reported as zero so the bit-length precondition passes.
pub struct BoundedHash {
    q: BigUint,
}

impl BoundedHash {
    pub fn below(q: &BigUint) -> Self {
        BoundedHash { q: q.clone() }
    }
}

impl HashFunction for BoundedHash {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        let digest = Sha3_256::digest(data);
        let value = BigUint::from_bytes_be(&digest) % &self.q;
        integer_to_byte_array(&value)
    }

    fn digest_byte_length(&self) -> usize {
        0
    }
}

pub fn gq_element(value: u8, group: &GqGroup) -> GqElement {
    GqElement::new(BigUint::from(value), group).unwrap()
}

pub fn zq_element(value: u8, group: &ZqGroup) -> ZqElement {
    ZqElement::new(BigUint::from(value), group).unwrap()
}

pub fn gq_vector(values: &[u8], group: &GqGroup) -> GroupVector<GqElement> {
    GroupVector::from_elements(values.iter().map(|&v| gq_element(v, group)).collect()).unwrap()
}

pub fn zq_vector(values: &[u8], group: &ZqGroup) -> GroupVector<ZqElement> {
    GroupVector::from_elements(values.iter().map(|&v| zq_element(v, group)).collect()).unwrap()
}

/// A uniform non-identity group member, obtained by squaring a uniform
/// integer of [1, q); one draw.
pub fn gen_gq_member(group: &GqGroup, random: &mut impl RandomSource) -> GqElement {
    let one = BigUint::from(1u8);
    let x = &one + random.gen_random_integer(&(group.q() - &one));
    GqElement::from_square_root(&x, group).unwrap()
}

pub fn gen_gq_vector(
    group: &GqGroup,
    n: usize,
    random: &mut impl RandomSource,
) -> GroupVector<GqElement> {
    GroupVector::from_elements((0..n).map(|_| gen_gq_member(group, random)).collect()).unwrap()
}

pub fn gen_random_message(
    group: &GqGroup,
    l: usize,
    random: &mut impl RandomSource,
) -> ElGamalMultiRecipientMessage {
    ElGamalMultiRecipientMessage::new(gen_gq_vector(group, l, random)).unwrap()
}

pub fn gen_random_ciphertext(
    group: &GqGroup,
    l: usize,
    random: &mut impl RandomSource,
) -> ElGamalMultiRecipientCiphertext {
    ElGamalMultiRecipientCiphertext::create(
        gen_gq_member(group, random),
        gen_gq_vector(group, l, random),
    )
    .unwrap()
}

/// The p = 11 test group with generator 3.
pub fn gq_group_p11() -> GqGroup {
    GqGroup::new(BigUint::from(11u8), BigUint::from(5u8), BigUint::from(3u8)).unwrap()
}

/// The p = 23 test group with generator 2.
pub fn gq_group_p23() -> GqGroup {
    GqGroup::new(BigUint::from(23u8), BigUint::from(11u8), BigUint::from(2u8)).unwrap()
}

/// The p = 59 test group with generator 3.
pub fn gq_group_p59() -> GqGroup {
    GqGroup::new(BigUint::from(59u8), BigUint::from(29u8), BigUint::from(3u8)).unwrap()
}

/// A moderately sized safe-prime group for round-trip tests.
pub fn gq_group_p2039() -> GqGroup {
    GqGroup::new(
        BigUint::from(2039u16),
        BigUint::from(1019u16),
        BigUint::from(4u8),
    )
    .unwrap()
}
