//! Small algebraic helpers shared by the argument services.

use num_bigint::BigUint;

use crate::error::{CryptoError, Result};
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::{GqElement, GqGroup};
use crate::math::zq_group::{ZqElement, ZqGroup};

/// The powers x^0, x^1, ..., x^{count-1}.
pub(crate) fn powers_of(x: &ZqElement, count: usize) -> Result<GroupVector<ZqElement>> {
    let mut powers = Vec::with_capacity(count);
    let mut current = x.group().one();
    for _ in 0..count {
        powers.push(current.clone());
        current = current.multiply(x)?;
    }
    Ok(GroupVector::from_elements(powers)?)
}

/// x^exponent for a machine-sized exponent.
pub(crate) fn power(x: &ZqElement, exponent: usize) -> ZqElement {
    x.exponentiate(&BigUint::from(exponent))
}

/// Component-wise sum of two equally long Zq vectors.
pub(crate) fn vector_add(
    a: &GroupVector<ZqElement>,
    b: &GroupVector<ZqElement>,
) -> Result<GroupVector<ZqElement>> {
    if a.len() != b.len() {
        return Err(CryptoError::ShapeError(
            "Cannot add vectors of different size.".into(),
        ));
    }
    GroupVector::from_elements(
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.add(y))
            .collect::<Result<Vec<_>>>()?,
    )
}

/// Multiplies every component of a Zq vector by a scalar.
pub(crate) fn vector_scalar_multiply(
    scalar: &ZqElement,
    v: &GroupVector<ZqElement>,
) -> Result<GroupVector<ZqElement>> {
    GroupVector::from_elements(
        v.iter()
            .map(|x| x.multiply(scalar))
            .collect::<Result<Vec<_>>>()?,
    )
}

/// The sum of the component-wise products of two equally long Zq vectors.
pub(crate) fn dot_product(
    a: &GroupVector<ZqElement>,
    b: &GroupVector<ZqElement>,
) -> Result<ZqElement> {
    if a.len() != b.len() {
        return Err(CryptoError::ShapeError(
            "Cannot compute the dot product of vectors of different size.".into(),
        ));
    }
    let group = a
        .group()
        .or_else(|| b.group())
        .cloned()
        .ok_or_else(|| CryptoError::InvalidInput("Cannot take the dot product of empty vectors.".into()))?;
    let mut sum = group.identity();
    for (x, y) in a.iter().zip(b.iter()) {
        sum = sum.add(&x.multiply(y)?)?;
    }
    Ok(sum)
}

/// The product of a sequence of Gq elements, starting from the identity.
pub(crate) fn multiply_all<'a>(
    elements: impl IntoIterator<Item = &'a GqElement>,
    group: &GqGroup,
) -> Result<GqElement> {
    let mut product = group.identity();
    for element in elements {
        product = product.multiply(element)?;
    }
    Ok(product)
}

/// The vector (c, c, ..., c) of the given length.
pub(crate) fn constant_vector(c: &ZqElement, length: usize) -> GroupVector<ZqElement> {
    GroupVector::from_elements_unchecked(vec![c.clone(); length])
}

/// The vector of all minus ones of the given length.
pub(crate) fn minus_one_vector(group: &ZqGroup, length: usize) -> GroupVector<ZqElement> {
    constant_vector(&group.one().negate(), length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{zq_element, zq_vector};

    fn zq() -> ZqGroup {
        ZqGroup::new(BigUint::from(11u8)).unwrap()
    }

    #[test]
    fn powers_start_at_one() {
        let group = zq();
        let x = zq_element(3, &group);
        let powers = powers_of(&x, 4).unwrap();
        assert_eq!(powers, zq_vector(&[1, 3, 9, 5], &group));
        assert_eq!(power(&x, 3), zq_element(5, &group));
    }

    #[test]
    fn vector_arithmetic_is_component_wise() {
        let group = zq();
        let a = zq_vector(&[1, 2, 3], &group);
        let b = zq_vector(&[10, 1, 9], &group);
        assert_eq!(vector_add(&a, &b).unwrap(), zq_vector(&[0, 3, 1], &group));
        assert_eq!(
            vector_scalar_multiply(&zq_element(4, &group), &a).unwrap(),
            zq_vector(&[4, 8, 1], &group)
        );
        assert_eq!(
            dot_product(&a, &b).unwrap(),
            // 10 + 2 + 27 = 39 = 6 (mod 11)
            zq_element(6, &group)
        );
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let group = zq();
        let a = zq_vector(&[1, 2], &group);
        let b = zq_vector(&[1], &group);
        assert!(vector_add(&a, &b).is_err());
        assert!(dot_product(&a, &b).is_err());
    }
}
