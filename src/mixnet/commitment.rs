//! Pedersen commitments to vectors and matrices of Zq elements.

use crate::error::{CryptoError, Result};
use crate::math::group_matrix::GroupMatrix;
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::GqElement;
use crate::math::zq_group::ZqElement;
use crate::mixnet::commitment_key::CommitmentKey;

/// Commits to a vector of at most nu elements:
///
///     com(a, r) = h^r * g_1^{a_1} * ... * g_n^{a_n}
///
/// An empty vector commits to h^r alone.
pub fn get_commitment(
    elements: &GroupVector<ZqElement>,
    randomness: &ZqElement,
    commitment_key: &CommitmentKey,
) -> Result<GqElement> {
    if elements.len() > commitment_key.size() {
        return Err(CryptoError::ShapeError(
            "The commitment key must be at least as long as the committed vector.".into(),
        ));
    }
    if !commitment_key.group().has_same_order_as(randomness.group()) {
        return Err(CryptoError::GroupMismatch(
            "The randomness must have the order of the commitment key group.".into(),
        ));
    }
    if let Some(group) = elements.group() {
        if group != randomness.group() {
            return Err(CryptoError::GroupMismatch(
                "The committed elements and the randomness must belong to the same group.".into(),
            ));
        }
    }

    let mut commitment = commitment_key.h().exponentiate(randomness)?;
    for (g_i, a_i) in commitment_key.g_elements().iter().zip(elements.iter()) {
        commitment = commitment.multiply(&g_i.exponentiate(a_i)?)?;
    }
    Ok(commitment)
}

/// Commits to each column of an n x m matrix with its own randomness,
/// producing m commitments. Requires n <= nu and |r| = m.
pub fn get_commitment_matrix(
    matrix: &GroupMatrix<ZqElement>,
    randomness: &GroupVector<ZqElement>,
    commitment_key: &CommitmentKey,
) -> Result<GroupVector<GqElement>> {
    if randomness.len() != matrix.num_columns() {
        return Err(CryptoError::ShapeError(
            "There must be as many randomness elements as matrix columns.".into(),
        ));
    }
    if matrix.num_rows() > commitment_key.size() {
        return Err(CryptoError::ShapeError(
            "The number of rows in the matrix must be smaller or equal to the commitment key size."
                .into(),
        ));
    }
    let commitments = (0..matrix.num_columns())
        .map(|j| {
            let column = matrix.column(j)?;
            let r_j = randomness.get(j).ok_or_else(|| {
                CryptoError::ShapeError("Missing randomness for a matrix column.".into())
            })?;
            get_commitment(&column, r_j, commitment_key)
        })
        .collect::<Result<Vec<_>>>()?;
    GroupVector::from_elements(commitments)
}

/// Commits to each element of a vector individually: com((b_k), s_k).
pub fn get_commitment_vector(
    elements: &GroupVector<ZqElement>,
    randomness: &GroupVector<ZqElement>,
    commitment_key: &CommitmentKey,
) -> Result<GroupVector<GqElement>> {
    if elements.len() != randomness.len() {
        return Err(CryptoError::ShapeError(
            "There must be as many randomness elements as committed elements.".into(),
        ));
    }
    let commitments = elements
        .iter()
        .zip(randomness.iter())
        .map(|(b_k, s_k)| get_commitment(&GroupVector::single(b_k.clone()), s_k, commitment_key))
        .collect::<Result<Vec<_>>>()?;
    GroupVector::from_elements(commitments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::group_matrix::GroupMatrix;
    use crate::math::zq_group::ZqGroup;
    use crate::test_utils::{gq_element, gq_group_p11, gq_vector, zq_element, zq_vector};

    fn commitment_key_p11() -> CommitmentKey {
        let group = gq_group_p11();
        CommitmentKey::new(gq_element(9, &group), gq_vector(&[4, 9], &group)).unwrap()
    }

    #[test]
    fn commitment_matches_hand_computation() {
        // com((1, 3), 4) with ck = (h=9, g=(4, 9)) in the p = 11 group:
        // 9^4 * 4^1 * 9^3 = 5 * 4 * 3 = 60 = 5 (mod 11)
        let group = gq_group_p11();
        let zq = ZqGroup::same_order_as(&group);
        let ck = commitment_key_p11();
        let commitment =
            get_commitment(&zq_vector(&[1, 3], &zq), &zq_element(4, &zq), &ck).unwrap();
        assert_eq!(commitment, gq_element(5, &group));
    }

    #[test]
    fn empty_vector_commits_to_h_power_r() {
        let group = gq_group_p11();
        let zq = ZqGroup::same_order_as(&group);
        let ck = commitment_key_p11();
        let commitment =
            get_commitment(&GroupVector::empty(), &zq_element(2, &zq), &ck).unwrap();
        // 9^2 = 81 = 4 (mod 11)
        assert_eq!(commitment, gq_element(4, &group));
    }

    #[test]
    fn commitment_is_homomorphic() {
        let zq = ZqGroup::same_order_as(&gq_group_p11());
        let ck = commitment_key_p11();
        let a = zq_vector(&[1, 3], &zq);
        let b = zq_vector(&[2, 4], &zq);
        let r_a = zq_element(4, &zq);
        let r_b = zq_element(1, &zq);

        let sum = zq_vector(&[3, 2], &zq); // (1+2, 3+4) mod 5
        let r_sum = r_a.add(&r_b).unwrap();

        let product = get_commitment(&a, &r_a, &ck)
            .unwrap()
            .multiply(&get_commitment(&b, &r_b, &ck).unwrap())
            .unwrap();
        assert_eq!(product, get_commitment(&sum, &r_sum, &ck).unwrap());
    }

    #[test]
    fn vectors_longer_than_the_key_are_rejected() {
        let zq = ZqGroup::same_order_as(&gq_group_p11());
        let ck = commitment_key_p11();
        assert!(matches!(
            get_commitment(&zq_vector(&[1, 2, 3], &zq), &zq_element(0, &zq), &ck),
            Err(CryptoError::ShapeError(_))
        ));
    }

    #[test]
    fn matrix_commitments_are_per_column() {
        // The 2 x 3 matrix with columns (4,0), (2,2), (0,4), exponents
        // (3,3,4) under ck = (9, (4,9)) commits to (9, 5, 3) in Gq(p=11).
        let group = gq_group_p11();
        let zq = ZqGroup::same_order_as(&group);
        let ck = commitment_key_p11();
        let matrix = GroupMatrix::from_columns(vec![
            zq_vector(&[4, 0], &zq),
            zq_vector(&[2, 2], &zq),
            zq_vector(&[0, 4], &zq),
        ])
        .unwrap();
        let randomness = zq_vector(&[3, 3, 4], &zq);

        let commitments = get_commitment_matrix(&matrix, &randomness, &ck).unwrap();
        assert_eq!(commitments, gq_vector(&[9, 5, 3], &group));
    }

    #[test]
    fn matrix_commitments_validate_shapes() {
        let zq = ZqGroup::same_order_as(&gq_group_p11());
        let ck = commitment_key_p11();
        let matrix = GroupMatrix::from_columns(vec![
            zq_vector(&[4, 0, 1], &zq),
            zq_vector(&[2, 2, 1], &zq),
        ])
        .unwrap();
        // Three rows exceed the key size of two.
        assert!(get_commitment_matrix(&matrix, &zq_vector(&[3, 3], &zq), &ck).is_err());

        let square = GroupMatrix::from_columns(vec![
            zq_vector(&[4, 0], &zq),
            zq_vector(&[2, 2], &zq),
        ])
        .unwrap();
        // Randomness size differs from the column count.
        assert!(get_commitment_matrix(&square, &zq_vector(&[3], &zq), &ck).is_err());
    }

    #[test]
    fn vector_commitments_are_element_wise() {
        let zq = ZqGroup::same_order_as(&gq_group_p11());
        let ck = commitment_key_p11();
        let elements = zq_vector(&[1, 2], &zq);
        let randomness = zq_vector(&[3, 4], &zq);
        let commitments = get_commitment_vector(&elements, &randomness, &ck).unwrap();
        assert_eq!(
            commitments.get(0).unwrap(),
            &get_commitment(
                &GroupVector::single(zq_element(1, &zq)),
                &zq_element(3, &zq),
                &ck
            )
            .unwrap()
        );
        assert_eq!(commitments.len(), 2);
    }
}
