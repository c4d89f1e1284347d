//! The group of integers modulo q, used as the exponent group of Gq.

use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{CryptoError, Result};
use crate::math::group_vector::GroupVectorElement;
use crate::math::gq_group::GqGroup;

/// The additive/multiplicative group of integers modulo q, where q is the
/// order of the paired [`GqGroup`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ZqGroup {
    q: BigUint,
}

impl ZqGroup {
    /// Creates the group of integers modulo `q`. `q` must be at least 2.
    pub fn new(q: BigUint) -> Result<Self> {
        if q < BigUint::from(2u8) {
            return Err(CryptoError::InvalidInput(
                "The order q must be at least 2.".into(),
            ));
        }
        Ok(ZqGroup { q })
    }

    /// The exponent group paired with a [`GqGroup`], i.e. the integers modulo
    /// the Gq group's order.
    pub fn same_order_as(group: &GqGroup) -> ZqGroup {
        ZqGroup {
            q: group.q().clone(),
        }
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The additive identity, 0.
    pub fn identity(&self) -> ZqElement {
        ZqElement {
            value: BigUint::zero(),
            group: self.clone(),
        }
    }

    /// The multiplicative unit, 1.
    pub fn one(&self) -> ZqElement {
        ZqElement {
            value: BigUint::one(),
            group: self.clone(),
        }
    }

    pub fn is_group_member(&self, value: &BigUint) -> bool {
        value < &self.q
    }
}

impl fmt::Debug for ZqGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZqGroup(q={})", self.q)
    }
}

/// An integer in [0, q). Instances are immutable; all operations return new
/// values normalised to [0, q).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ZqElement {
    value: BigUint,
    group: ZqGroup,
}

impl ZqElement {
    /// Creates the element with the given value, which must already lie in
    /// [0, q).
    pub fn new(value: BigUint, group: &ZqGroup) -> Result<Self> {
        if !group.is_group_member(&value) {
            return Err(CryptoError::InvalidInput(format!(
                "The value {value} must be smaller than the group order {}.",
                group.q
            )));
        }
        Ok(ZqElement {
            value,
            group: group.clone(),
        })
    }

    /// Creates the element of value `value mod q`.
    pub fn reduced(value: BigUint, group: &ZqGroup) -> Self {
        ZqElement {
            value: value % &group.q,
            group: group.clone(),
        }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn group(&self) -> &ZqGroup {
        &self.group
    }

    /// `(self + other) mod q`.
    pub fn add(&self, other: &ZqElement) -> Result<ZqElement> {
        self.check_same_group(other)?;
        Ok(ZqElement {
            value: (&self.value + &other.value) % &self.group.q,
            group: self.group.clone(),
        })
    }

    /// `(self - other) mod q`, normalised to [0, q).
    pub fn subtract(&self, other: &ZqElement) -> Result<ZqElement> {
        self.check_same_group(other)?;
        let value = (&self.value + &self.group.q - &other.value) % &self.group.q;
        Ok(ZqElement {
            value,
            group: self.group.clone(),
        })
    }

    /// `(self * other) mod q`.
    pub fn multiply(&self, other: &ZqElement) -> Result<ZqElement> {
        self.check_same_group(other)?;
        Ok(ZqElement {
            value: (&self.value * &other.value) % &self.group.q,
            group: self.group.clone(),
        })
    }

    /// `(-self) mod q`, normalised to [0, q).
    pub fn negate(&self) -> ZqElement {
        ZqElement {
            value: (&self.group.q - &self.value) % &self.group.q,
            group: self.group.clone(),
        }
    }

    /// `self^exponent mod q` for a non-negative integer exponent.
    pub fn exponentiate(&self, exponent: &BigUint) -> ZqElement {
        ZqElement {
            value: self.value.modpow(exponent, &self.group.q),
            group: self.group.clone(),
        }
    }

    fn check_same_group(&self, other: &ZqElement) -> Result<()> {
        if self.group != other.group {
            return Err(CryptoError::GroupMismatch(
                "Both operands must belong to the same ZqGroup.".into(),
            ));
        }
        Ok(())
    }
}

impl GroupVectorElement for ZqElement {
    type Group = ZqGroup;

    fn group(&self) -> &ZqGroup {
        &self.group
    }

    fn element_size(&self) -> usize {
        1
    }
}

impl fmt::Debug for ZqElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZqElement({} mod {})", self.value, self.group.q)
    }
}
