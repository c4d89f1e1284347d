//! Rectangular tables of group elements.

use std::fmt;

use crate::error::{CryptoError, Result};
use crate::math::group_vector::{GroupVector, GroupVectorElement};

/// A non-empty rectangular table of elements of the same group and element
/// size. Instances are immutable; column edits return new matrices.
#[derive(Clone, PartialEq, Eq)]
pub struct GroupMatrix<E: GroupVectorElement> {
    rows: Vec<GroupVector<E>>,
    num_rows: usize,
    num_columns: usize,
}

impl<E: GroupVectorElement> GroupMatrix<E> {
    /// Builds a matrix from its rows. The rows must be non-empty, of equal
    /// width, and all elements must share one group and one element size.
    pub fn from_rows(rows: Vec<GroupVector<E>>) -> Result<Self> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(CryptoError::InvalidInput(
                "Empty matrices are not supported.".into(),
            ));
        }
        let num_columns = rows[0].len();
        if !rows.iter().all(|row| row.len() == num_columns) {
            return Err(CryptoError::ShapeError(
                "All rows of the matrix must have the same number of columns.".into(),
            ));
        }
        let first = rows[0]
            .first()
            .ok_or_else(|| CryptoError::InvalidInput("Empty matrices are not supported.".into()))?;
        for row in &rows {
            for element in row.iter() {
                if element.group() != first.group() {
                    return Err(CryptoError::GroupMismatch(
                        "All elements of the matrix must be in the same group.".into(),
                    ));
                }
                if element.element_size() != first.element_size() {
                    return Err(CryptoError::ShapeError(
                        "All matrix elements must be the same size.".into(),
                    ));
                }
            }
        }
        let num_rows = rows.len();
        Ok(GroupMatrix {
            rows,
            num_rows,
            num_columns,
        })
    }

    /// Builds a matrix from its columns.
    pub fn from_columns(columns: Vec<GroupVector<E>>) -> Result<Self> {
        GroupMatrix::from_rows(columns)?.transpose()
    }

    /// The transpose, with `M^t[i][j] = M[j][i]`.
    pub fn transpose(&self) -> Result<Self> {
        let rows = (0..self.num_columns)
            .map(|j| self.column(j))
            .collect::<Result<Vec<_>>>()?;
        GroupMatrix::from_rows(rows)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&E> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn row(&self, i: usize) -> Result<&GroupVector<E>> {
        self.rows.get(i).ok_or_else(|| {
            CryptoError::InvalidInput("Trying to access a row out of bounds.".into())
        })
    }

    pub fn column(&self, j: usize) -> Result<GroupVector<E>> {
        if j >= self.num_columns {
            return Err(CryptoError::InvalidInput(
                "Trying to access a column out of bounds.".into(),
            ));
        }
        GroupVector::from_elements(
            self.rows
                .iter()
                .map(|row| row.as_slice()[j].clone())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[GroupVector<E>] {
        &self.rows
    }

    pub fn columns(&self) -> Result<Vec<GroupVector<E>>> {
        (0..self.num_columns).map(|j| self.column(j)).collect()
    }

    /// Iterates over all elements, row after row.
    pub fn flat_iter(&self) -> impl Iterator<Item = &E> {
        self.rows.iter().flat_map(|row| row.iter())
    }

    pub fn group(&self) -> &E::Group {
        // Matrices are never empty.
        self.rows[0].as_slice()[0].group()
    }

    pub fn element_size(&self) -> usize {
        self.rows[0].as_slice()[0].element_size()
    }

    /// Returns a new matrix with `column` appended on the right.
    pub fn append_column(&self, column: &GroupVector<E>) -> Result<Self> {
        self.check_column(column)?;
        let rows = self
            .rows
            .iter()
            .zip(column.iter())
            .map(|(row, element)| row.append(element.clone()))
            .collect::<Result<Vec<_>>>()?;
        GroupMatrix::from_rows(rows)
    }

    /// Returns a new matrix with `column` prepended on the left.
    pub fn prepend_column(&self, column: &GroupVector<E>) -> Result<Self> {
        self.check_column(column)?;
        let rows = self
            .rows
            .iter()
            .zip(column.iter())
            .map(|(row, element)| row.prepend(element.clone()))
            .collect::<Result<Vec<_>>>()?;
        GroupMatrix::from_rows(rows)
    }

    /// The sub-matrix made of columns `from..to`.
    pub fn sub_columns(&self, from: usize, to: usize) -> Result<Self> {
        if from > to || to > self.num_columns || from == to {
            return Err(CryptoError::InvalidInput(
                "The requested column range is out of bounds.".into(),
            ));
        }
        let columns = (from..to).map(|j| self.column(j)).collect::<Result<Vec<_>>>()?;
        GroupMatrix::from_columns(columns)
    }

    fn check_column(&self, column: &GroupVector<E>) -> Result<()> {
        if column.len() != self.num_rows {
            return Err(CryptoError::ShapeError(format!(
                "The new column size does not match the matrix: size {}, numRows {}.",
                column.len(),
                self.num_rows
            )));
        }
        if column.element_size() != self.element_size() {
            return Err(CryptoError::ShapeError(
                "The elements' size does not match this matrix's elements' size.".into(),
            ));
        }
        if column.group() != Some(self.group()) {
            return Err(CryptoError::GroupMismatch(
                "The group of the new column must be equal to the matrix' group.".into(),
            ));
        }
        Ok(())
    }
}

impl<E: GroupVectorElement> fmt::Debug for GroupMatrix<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.rows).finish()
    }
}
