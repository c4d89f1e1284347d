//! The quadratic-residue subgroup of Z/pZ of prime order q, with p = 2q + 1.

use std::fmt;

use num_bigint::BigUint;
use num_traits::One;

use crate::error::{CryptoError, Result};
use crate::math::group_vector::{GroupVector, GroupVectorElement};
use crate::math::primes::is_small_prime;
use crate::math::zq_group::{ZqElement, ZqGroup};

/// Carrier of the subgroup parameters (p, q, g). Two groups are equal when
/// all three parameters are equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GqGroup {
    p: BigUint,
    q: BigUint,
    generator: BigUint,
}

impl GqGroup {
    /// Creates the group defined by the safe prime `p = 2q + 1` and a
    /// generator `g` of the order-q subgroup.
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self> {
        if p != BigUint::from(2u8) * &q + BigUint::one() {
            return Err(CryptoError::InvalidInput(
                "p must equal 2q + 1.".into(),
            ));
        }
        if q < BigUint::from(2u8) {
            return Err(CryptoError::InvalidInput(
                "The group order q must be at least 2.".into(),
            ));
        }
        if g <= BigUint::one() || g >= p {
            return Err(CryptoError::InvalidInput(
                "The generator must be within ]1, p[.".into(),
            ));
        }
        let group = GqGroup { p, q, generator: g };
        if !group.is_group_member(&group.generator) {
            return Err(CryptoError::InvalidInput(
                "The generator must be a member of the group.".into(),
            ));
        }
        Ok(group)
    }

    /// Tests membership: `1 <= v < p` and `v^q = 1 (mod p)`.
    pub fn is_group_member(&self, value: &BigUint) -> bool {
        value >= &BigUint::one()
            && value < &self.p
            && value.modpow(&self.q, &self.p).is_one()
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The multiplicative identity, 1.
    pub fn identity(&self) -> GqElement {
        GqElement {
            value: BigUint::one(),
            group: self.clone(),
        }
    }

    pub fn generator(&self) -> GqElement {
        GqElement {
            value: self.generator.clone(),
            group: self.clone(),
        }
    }

    pub fn has_same_order_as(&self, other: &ZqGroup) -> bool {
        &self.q == other.q()
    }
}

impl fmt::Debug for GqGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GqGroup(p={}, q={}, g={})",
            self.p, self.q, self.generator
        )
    }
}

/// An element of the quadratic-residue subgroup. Instances are immutable and
/// always members of their group: the constructor validates membership and
/// the operations preserve it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GqElement {
    value: BigUint,
    group: GqGroup,
}

impl GqElement {
    /// Creates the element with the given value, which must be a member of
    /// the group.
    pub fn new(value: BigUint, group: &GqGroup) -> Result<Self> {
        if !group.is_group_member(&value) {
            return Err(CryptoError::InvalidInput(format!(
                "The value {value} is not a member of the group {group:?}."
            )));
        }
        Ok(GqElement {
            value,
            group: group.clone(),
        })
    }

    /// Creates the member `x^2 mod p` from an integer `0 < x < q`. Squaring
    /// maps any such integer into the quadratic-residue subgroup.
    pub fn from_square_root(x: &BigUint, group: &GqGroup) -> Result<Self> {
        if x <= &BigUint::from(0u8) {
            return Err(CryptoError::InvalidInput(
                "The element must be strictly greater than 0.".into(),
            ));
        }
        if x >= group.q() {
            return Err(CryptoError::InvalidInput(
                "The element must be smaller than the group's order.".into(),
            ));
        }
        Ok(GqElement {
            value: x.modpow(&BigUint::from(2u8), &group.p),
            group: group.clone(),
        })
    }

    // Used by operations that guarantee membership mathematically.
    fn unchecked(value: BigUint, group: &GqGroup) -> Self {
        GqElement {
            value,
            group: group.clone(),
        }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn group(&self) -> &GqGroup {
        &self.group
    }

    /// `(self * other) mod p`.
    pub fn multiply(&self, other: &GqElement) -> Result<GqElement> {
        if self.group != other.group {
            return Err(CryptoError::GroupMismatch(
                "Both operands must belong to the same GqGroup.".into(),
            ));
        }
        Ok(GqElement::unchecked(
            (&self.value * &other.value) % &self.group.p,
            &self.group,
        ))
    }

    /// `self^exponent mod p`, where the exponent lives in the Zq group of the
    /// same order.
    pub fn exponentiate(&self, exponent: &ZqElement) -> Result<GqElement> {
        if !self.group.has_same_order_as(exponent.group()) {
            return Err(CryptoError::GroupMismatch(
                "The exponent must belong to a group of the same order.".into(),
            ));
        }
        Ok(GqElement::unchecked(
            self.value.modpow(exponent.value(), &self.group.p),
            &self.group,
        ))
    }

    /// The multiplicative inverse `self^(p-2) mod p`.
    pub fn invert(&self) -> GqElement {
        let exponent = &self.group.p - BigUint::from(2u8);
        GqElement::unchecked(self.value.modpow(&exponent, &self.group.p), &self.group)
    }
}

impl GroupVectorElement for GqElement {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        &self.group
    }

    fn element_size(&self) -> usize {
        1
    }
}

impl fmt::Debug for GqElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GqElement({} in {:?})", self.value, self.group)
    }
}

/// Collects the first `r` small primes that are members of the group,
/// iterating odd candidates from 5 upwards.
///
/// Requires a generator in {2, 3, 4}, `0 < r < 10000` and `r <= q - 4`.
pub fn get_small_prime_group_members(
    group: &GqGroup,
    desired_number_of_primes: usize,
) -> Result<GroupVector<GqElement>> {
    let r = desired_number_of_primes;
    let g = &group.generator;

    if r == 0 {
        return Err(CryptoError::InvalidInput(
            "The desired number of primes must be strictly positive.".into(),
        ));
    }
    if g < &BigUint::from(2u8) || g > &BigUint::from(4u8) {
        return Err(CryptoError::PreconditionViolated(
            "The generator must be 2, 3 or 4.".into(),
        ));
    }
    if BigUint::from(r) + BigUint::from(4u8) > *group.q() {
        return Err(CryptoError::InvalidInput(
            "The number of desired primes must be smaller than the number of elements in the group by at least 4.".into(),
        ));
    }
    if r >= 10000 {
        return Err(CryptoError::InvalidInput(
            "The number of desired primes must be smaller than 10000.".into(),
        ));
    }

    let mut current = BigUint::from(5u8);
    let two = BigUint::from(2u8);
    let mut primes = Vec::with_capacity(r);
    while primes.len() < r && current < group.p {
        if group.is_group_member(&current) {
            // Candidates stay below 10000 + small offsets, so u64 is enough.
            let candidate = current.to_u64_digits().first().copied().unwrap_or(0);
            if is_small_prime(candidate) {
                primes.push(GqElement::unchecked(current.clone(), group));
            }
        }
        current += &two;
    }
    if primes.len() != r {
        return Err(CryptoError::InvalidInput(
            "The number of primes found does not correspond to the number of desired primes.".into(),
        ));
    }
    GroupVector::from_elements(primes)
}
