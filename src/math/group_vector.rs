//! Homogeneous vectors of group elements.

use std::fmt;

use crate::error::{CryptoError, Result};
use crate::math::group_matrix::GroupMatrix;

/// Capability of types that can populate a [`GroupVector`] or a
/// [`GroupMatrix`]: they belong to a mathematical group and expose an element
/// size, so containers can enforce uniformity at construction.
pub trait GroupVectorElement: Clone + PartialEq + fmt::Debug {
    type Group: Clone + PartialEq + fmt::Debug;

    fn group(&self) -> &Self::Group;

    /// The size of this element: 1 for plain group elements, the phi count
    /// for ciphertexts and messages.
    fn element_size(&self) -> usize;
}

/// A finite sequence of elements of the same group and the same element
/// size. Instances are immutable; `append` and `prepend` return new vectors.
#[derive(Clone, PartialEq, Eq)]
pub struct GroupVector<E: GroupVectorElement> {
    elements: Vec<E>,
}

impl<E: GroupVectorElement> GroupVector<E> {
    /// Builds a vector after checking that all elements share one group and
    /// one element size. The vector may be empty.
    pub fn from_elements(elements: Vec<E>) -> Result<Self> {
        if let Some(first) = elements.first() {
            if !elements.iter().all(|e| e.group() == first.group()) {
                return Err(CryptoError::GroupMismatch(
                    "All elements must belong to the same group.".into(),
                ));
            }
            if !elements
                .iter()
                .all(|e| e.element_size() == first.element_size())
            {
                return Err(CryptoError::ShapeError(
                    "All vector elements must be the same size.".into(),
                ));
            }
        }
        Ok(GroupVector { elements })
    }

    // Construction without validation, for operations that guarantee
    // uniformity (e.g. sampling from a single group).
    pub(crate) fn from_elements_unchecked(elements: Vec<E>) -> Self {
        GroupVector { elements }
    }

    pub fn empty() -> Self {
        GroupVector {
            elements: Vec::new(),
        }
    }

    pub fn single(element: E) -> Self {
        GroupVector {
            elements: vec![element],
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&E> {
        self.elements.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    pub fn first(&self) -> Option<&E> {
        self.elements.first()
    }

    pub fn last(&self) -> Option<&E> {
        self.elements.last()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.elements
    }

    /// The group of the elements; `None` for an empty vector.
    pub fn group(&self) -> Option<&E::Group> {
        self.elements.first().map(GroupVectorElement::group)
    }

    /// The element size; 0 for an empty vector.
    pub fn element_size(&self) -> usize {
        self.elements
            .first()
            .map(GroupVectorElement::element_size)
            .unwrap_or(0)
    }

    /// Returns a new vector with `element` appended. The element must match
    /// the vector's group and element size.
    pub fn append(&self, element: E) -> Result<Self> {
        self.check_compatible(&element, "append")?;
        let mut elements = self.elements.clone();
        elements.push(element);
        Ok(GroupVector { elements })
    }

    /// Returns a new vector with `element` prepended. The element must match
    /// the vector's group and element size.
    pub fn prepend(&self, element: E) -> Result<Self> {
        self.check_compatible(&element, "prepend")?;
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.push(element);
        elements.extend(self.elements.iter().cloned());
        Ok(GroupVector { elements })
    }

    /// Rearranges the vector into a `rows x cols` matrix with
    /// `M[i][j] = v[i + rows * j]`.
    pub fn to_matrix(&self, rows: usize, cols: usize) -> Result<GroupMatrix<E>> {
        if rows == 0 {
            return Err(CryptoError::InvalidInput(
                "The number of rows must be positive.".into(),
            ));
        }
        if cols == 0 {
            return Err(CryptoError::InvalidInput(
                "The number of columns must be positive.".into(),
            ));
        }
        if self.len() != rows * cols {
            return Err(CryptoError::ShapeError(format!(
                "The vector must be decomposable into {rows} rows and {cols} columns, but has {} elements.",
                self.len()
            )));
        }
        let matrix_rows = (0..rows)
            .map(|i| {
                GroupVector::from_elements(
                    (0..cols).map(|j| self.elements[i + rows * j].clone()).collect(),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        GroupMatrix::from_rows(matrix_rows)
    }

    fn check_compatible(&self, element: &E, operation: &str) -> Result<()> {
        if let Some(first) = self.elements.first() {
            if element.group() != first.group() {
                return Err(CryptoError::GroupMismatch(format!(
                    "The element to {operation} must be in the same group."
                )));
            }
            if element.element_size() != first.element_size() {
                return Err(CryptoError::ShapeError(format!(
                    "The element to {operation} must be the same size."
                )));
            }
        }
        Ok(())
    }
}

impl<'a, E: GroupVectorElement> IntoIterator for &'a GroupVector<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<E: GroupVectorElement> fmt::Debug for GroupVector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.elements).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::zq_group::{ZqElement, ZqGroup};
    use num_bigint::BigUint;

    fn group_11() -> ZqGroup {
        ZqGroup::new(BigUint::from(11u8)).unwrap()
    }

    fn vector(values: &[u8], group: &ZqGroup) -> GroupVector<ZqElement> {
        GroupVector::from_elements(
            values
                .iter()
                .map(|&v| ZqElement::new(BigUint::from(v), group).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn mixed_groups_are_rejected() {
        let group = group_11();
        let other = ZqGroup::new(BigUint::from(13u8)).unwrap();
        let elements = vec![
            ZqElement::new(BigUint::from(1u8), &group).unwrap(),
            ZqElement::new(BigUint::from(1u8), &other).unwrap(),
        ];
        assert!(matches!(
            GroupVector::from_elements(elements),
            Err(CryptoError::GroupMismatch(_))
        ));
    }

    #[test]
    fn append_and_prepend_return_new_vectors() {
        let group = group_11();
        let v = vector(&[1, 2], &group);
        let appended = v
            .append(ZqElement::new(BigUint::from(3u8), &group).unwrap())
            .unwrap();
        let prepended = v
            .prepend(ZqElement::new(BigUint::from(0u8), &group).unwrap())
            .unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(appended, vector(&[1, 2, 3], &group));
        assert_eq!(prepended, vector(&[0, 1, 2], &group));
    }

    #[test]
    fn append_rejects_other_groups() {
        let group = group_11();
        let other = ZqGroup::new(BigUint::from(13u8)).unwrap();
        let v = vector(&[1, 2], &group);
        assert!(v
            .append(ZqElement::new(BigUint::from(3u8), &other).unwrap())
            .is_err());
    }

    #[test]
    fn to_matrix_fills_column_wise() {
        let group = group_11();
        // v = (0, 1, 2, 3, 4, 5) as a 2 x 3 matrix: M[i][j] = v[i + 2j]
        let v = vector(&[0, 1, 2, 3, 4, 5], &group);
        let matrix = v.to_matrix(2, 3).unwrap();
        assert_eq!(matrix.row(0).unwrap(), &vector(&[0, 2, 4], &group));
        assert_eq!(matrix.row(1).unwrap(), &vector(&[1, 3, 5], &group));
    }

    #[test]
    fn to_matrix_rejects_non_decomposable_sizes() {
        let group = group_11();
        let v = vector(&[0, 1, 2, 3, 4], &group);
        assert!(matches!(
            v.to_matrix(2, 3),
            Err(CryptoError::ShapeError(_))
        ));
        assert!(v.to_matrix(0, 3).is_err());
    }
}
