//! Hadamard argument.
//!
//! Proves that a committed vector b is the component-wise product of the
//! columns of a committed matrix A:
//!
//!     b = A_0 o A_1 o ... o A_{m-1}        (m >= 2)
//!
//! The prover commits to the cumulative column products B_0 = A_0,
//! B_i = B_{i-1} o A_i, reuses c_A_0 and c_b for the boundary columns, and
//! reduces the m - 1 product relations to a single zero argument by blending
//! them with powers of a challenge x under the star map of a challenge y.

use crate::elgamal::ElGamalMultiRecipientPublicKey;
use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::group_matrix::GroupMatrix;
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::{GqElement, GqGroup};
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::mixnet::commitment::{get_commitment, get_commitment_matrix};
use crate::mixnet::commitment_key::CommitmentKey;
use crate::mixnet::transcript::{check_challenge_length, derive_chained_challenge, derive_challenge};
use crate::mixnet::utils::{minus_one_vector, power, vector_add, vector_scalar_multiply};
use crate::mixnet::zero_argument::{ZeroArgument, ZeroArgumentService, ZeroStatement, ZeroWitness};
use crate::random::RandomSource;
use crate::verification::VerificationResult;

const LOG_TARGET: &str = "zk_mixnet::mixnet::hadamard_argument";

/// Statement (c_A, c_b): the column commitments of A and the commitment to
/// the claimed Hadamard product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HadamardStatement {
    commitments_a: GroupVector<GqElement>,
    commitment_b: GqElement,
}

impl HadamardStatement {
    pub fn new(commitments_a: GroupVector<GqElement>, commitment_b: GqElement) -> Result<Self> {
        if commitments_a.is_empty() {
            return Err(CryptoError::InvalidInput(
                "The commitments to A must not be empty.".into(),
            ));
        }
        if commitments_a.group() != Some(commitment_b.group()) {
            return Err(CryptoError::GroupMismatch(
                "The commitments to A and the commitment to b must belong to the same group."
                    .into(),
            ));
        }
        Ok(HadamardStatement {
            commitments_a,
            commitment_b,
        })
    }

    pub fn m(&self) -> usize {
        self.commitments_a.len()
    }

    pub fn group(&self) -> &GqGroup {
        self.commitment_b.group()
    }
}

/// Witness (A, b, r, s): the matrix, the product vector and the commitment
/// randomness of both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HadamardWitness {
    matrix_a: GroupMatrix<ZqElement>,
    vector_b: GroupVector<ZqElement>,
    exponents_r: GroupVector<ZqElement>,
    exponent_s: ZqElement,
}

impl HadamardWitness {
    pub fn new(
        matrix_a: GroupMatrix<ZqElement>,
        vector_b: GroupVector<ZqElement>,
        exponents_r: GroupVector<ZqElement>,
        exponent_s: ZqElement,
    ) -> Result<Self> {
        if exponents_r.len() != matrix_a.num_columns() {
            return Err(CryptoError::ShapeError(
                "The exponents r must have as many elements as matrix A has columns.".into(),
            ));
        }
        if vector_b.len() != matrix_a.num_rows() {
            return Err(CryptoError::ShapeError(
                "The vector b must have as many elements as matrix A has rows.".into(),
            ));
        }
        if Some(matrix_a.group()) != vector_b.group()
            || vector_b.group() != exponents_r.group()
            || exponents_r.group() != Some(exponent_s.group())
        {
            return Err(CryptoError::GroupMismatch(
                "The witness parts must belong to the same group.".into(),
            ));
        }
        Ok(HadamardWitness {
            matrix_a,
            vector_b,
            exponents_r,
            exponent_s,
        })
    }
}

/// The Hadamard argument (c_B, zero argument).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HadamardArgument {
    commitments_b: GroupVector<GqElement>,
    zero_argument: ZeroArgument,
}

impl HadamardArgument {
    pub fn new(
        commitments_b: GroupVector<GqElement>,
        zero_argument: ZeroArgument,
    ) -> Result<Self> {
        let m = commitments_b.len();
        if m < 2 {
            return Err(CryptoError::InvalidInput(
                "The commitments b must have at least 2 elements.".into(),
            ));
        }
        if zero_argument.m() != m {
            return Err(CryptoError::ShapeError(
                "The commitments b and the zero argument must have the same dimension m.".into(),
            ));
        }
        if commitments_b.group() != Some(zero_argument.group()) {
            return Err(CryptoError::GroupMismatch(
                "The commitments b and the zero argument must belong to the same group.".into(),
            ));
        }
        Ok(HadamardArgument {
            commitments_b,
            zero_argument,
        })
    }

    pub fn m(&self) -> usize {
        self.commitments_b.len()
    }

    pub fn group(&self) -> &GqGroup {
        self.zero_argument.group()
    }
}

impl ToHashable for HadamardArgument {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            self.commitments_b.to_hashable(),
            self.zero_argument.to_hashable(),
        ])
    }
}

/// Prover and verifier of Hadamard arguments.
pub struct HadamardArgumentService<'a> {
    public_key: ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    hash: &'a HashService,
    zero_argument_service: ZeroArgumentService<'a>,
}

impl<'a> HadamardArgumentService<'a> {
    pub fn new(
        public_key: ElGamalMultiRecipientPublicKey,
        commitment_key: CommitmentKey,
        hash: &'a HashService,
    ) -> Result<Self> {
        check_challenge_length(hash, commitment_key.group().q())?;
        let zero_argument_service =
            ZeroArgumentService::new(public_key.clone(), commitment_key.clone(), hash)?;
        Ok(HadamardArgumentService {
            public_key,
            commitment_key,
            hash,
            zero_argument_service,
        })
    }

    /// Produces a Hadamard argument.
    ///
    /// Draws, in order: the m - 2 interior randomness values of c_B, then
    /// the draws of the inner zero argument.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn get_hadamard_argument<R: RandomSource + ?Sized>(
        &self,
        statement: &HadamardStatement,
        witness: &HadamardWitness,
        random: &mut R,
    ) -> Result<HadamardArgument> {
        let m = witness.matrix_a.num_columns();
        let n = witness.matrix_a.num_rows();
        if m < 2 {
            return Err(CryptoError::InvalidInput(
                "The matrix A must have at least 2 columns.".into(),
            ));
        }
        if statement.m() != m {
            return Err(CryptoError::ShapeError(
                "The commitments for A must have as many elements as matrix A has columns.".into(),
            ));
        }
        if n > self.commitment_key.size() {
            return Err(CryptoError::ShapeError(
                "The number of rows in the matrix must be smaller or equal to the commitment key size."
                    .into(),
            ));
        }
        let zq_group = witness.matrix_a.group().clone();
        if !statement.group().has_same_order_as(&zq_group) {
            return Err(CryptoError::GroupMismatch(
                "The matrix A and its commitments must have the same group order q.".into(),
            ));
        }

        // Statement-witness consistency.
        let commitments_a = get_commitment_matrix(
            &witness.matrix_a,
            &witness.exponents_r,
            &self.commitment_key,
        )?;
        if commitments_a != statement.commitments_a {
            return Err(CryptoError::WitnessInconsistent(
                "The commitments A must correspond to the commitment to matrix A with exponents r and the given commitment key."
                    .into(),
            ));
        }
        let commitment_b =
            get_commitment(&witness.vector_b, &witness.exponent_s, &self.commitment_key)?;
        if commitment_b != statement.commitment_b {
            return Err(CryptoError::WitnessInconsistent(
                "The commitment b must correspond to the commitment to vector b with exponent s and the given commitment key."
                    .into(),
            ));
        }
        let column_product = hadamard_product_of_columns(&witness.matrix_a)?;
        if column_product != witness.vector_b {
            return Err(CryptoError::WitnessInconsistent(
                "The vector b must correspond to the product of the column vectors of the matrix A."
                    .into(),
            ));
        }

        // Cumulative products B_0 = A_0, B_i = B_{i-1} o A_i; B_{m-1} = b.
        let mut b_columns: Vec<GroupVector<ZqElement>> = Vec::with_capacity(m);
        b_columns.push(witness.matrix_a.column(0)?);
        for i in 1..m {
            let previous = b_columns[i - 1].clone();
            b_columns.push(component_wise_product(&previous, &witness.matrix_a.column(i)?)?);
        }

        // Randomness s_0 = r_0, interior values fresh, s_{m-1} = s.
        let mut s_values: Vec<ZqElement> = Vec::with_capacity(m);
        s_values.push(witness.exponents_r.as_slice()[0].clone());
        for _ in 1..m - 1 {
            s_values.push(random.gen_random_zq_element(&zq_group));
        }
        s_values.push(witness.exponent_s.clone());

        // c_B reuses the boundary commitments of the statement.
        let mut c_b_values: Vec<GqElement> = Vec::with_capacity(m);
        c_b_values.push(statement.commitments_a.as_slice()[0].clone());
        for i in 1..m - 1 {
            c_b_values.push(get_commitment(
                &b_columns[i],
                &s_values[i],
                &self.commitment_key,
            )?);
        }
        c_b_values.push(statement.commitment_b.clone());
        let commitments_b = GroupVector::from_elements(c_b_values)?;

        let transcript = self.transcript(statement, &commitments_b);
        let (x, x_digest) = derive_challenge(self.hash, &zq_group, &transcript)?;
        let (y, _) = derive_chained_challenge(self.hash, &zq_group, &x_digest, &transcript)?;
        tracing::debug!(
            target: LOG_TARGET,
            x = %x.value(),
            y = %y.value(),
            "derived challenges"
        );

        let zero_statement =
            build_zero_statement(statement, &commitments_b, &x, &y, n, &self.commitment_key)?;
        let zero_witness = build_zero_witness(witness, &b_columns, &s_values, &x)?;
        let zero_argument =
            self.zero_argument_service
                .get_zero_argument(&zero_statement, &zero_witness, random)?;

        HadamardArgument::new(commitments_b, zero_argument)
    }

    /// Verifies a Hadamard argument: the boundary commitments of c_B and the
    /// inner zero argument.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn verify_hadamard_argument(
        &self,
        statement: &HadamardStatement,
        argument: &HadamardArgument,
    ) -> Result<VerificationResult> {
        if statement.group() != argument.group() {
            return Err(CryptoError::GroupMismatch(
                "The statement's and the argument's groups must have the same order.".into(),
            ));
        }
        if statement.m() != argument.m() {
            return Err(CryptoError::ShapeError(
                "The statement and the argument must have the same size m.".into(),
            ));
        }

        let m = statement.m();
        let zq_group = ZqGroup::same_order_as(statement.group());
        let transcript = self.transcript(statement, &argument.commitments_b);
        let (x, x_digest) = derive_challenge(self.hash, &zq_group, &transcript)?;
        let (y, _) = derive_chained_challenge(self.hash, &zq_group, &x_digest, &transcript)?;

        let mut result = VerificationResult::verified();
        result.check(
            argument.commitments_b.as_slice()[0] == statement.commitments_a.as_slice()[0],
            "c_B_0 must equal c_A_0.",
        );
        result.check(
            argument.commitments_b.as_slice()[m - 1] == statement.commitment_b,
            "c_B_m must equal c_b.",
        );

        let zero_statement = build_zero_statement(
            statement,
            &argument.commitments_b,
            &x,
            &y,
            argument.zero_argument.n(),
            &self.commitment_key,
        )?;
        let zero_result = self
            .zero_argument_service
            .verify_zero_argument(&zero_statement, &argument.zero_argument)?
            .with_context("Zero argument");

        Ok(result.and(zero_result))
    }

    fn transcript(
        &self,
        statement: &HadamardStatement,
        commitments_b: &GroupVector<GqElement>,
    ) -> Vec<Hashable> {
        vec![
            self.commitment_key.to_hashable(),
            self.public_key.to_hashable(),
            statement.commitments_a.to_hashable(),
            statement.commitment_b.to_hashable(),
            commitments_b.to_hashable(),
        ]
    }
}

/// The component-wise product of all columns of a matrix.
fn hadamard_product_of_columns(matrix: &GroupMatrix<ZqElement>) -> Result<GroupVector<ZqElement>> {
    let mut product = matrix.column(0)?;
    for j in 1..matrix.num_columns() {
        product = component_wise_product(&product, &matrix.column(j)?)?;
    }
    Ok(product)
}

fn component_wise_product(
    a: &GroupVector<ZqElement>,
    b: &GroupVector<ZqElement>,
) -> Result<GroupVector<ZqElement>> {
    if a.len() != b.len() {
        return Err(CryptoError::ShapeError(
            "Cannot multiply vectors of different size.".into(),
        ));
    }
    GroupVector::from_elements(
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.multiply(y))
            .collect::<Result<Vec<_>>>()?,
    )
}

/// The derived zero statement: side A holds (c_A_1..c_A_{m-1}, com(-1, 0)),
/// side B the x-scaled cumulative commitments
/// (c_B_i^{x^{i+1}})_{i=0..m-2} with their blended tail.
fn build_zero_statement(
    statement: &HadamardStatement,
    commitments_b: &GroupVector<GqElement>,
    x: &ZqElement,
    y: &ZqElement,
    n: usize,
    commitment_key: &CommitmentKey,
) -> Result<ZeroStatement> {
    let m = statement.m();
    let group = statement.group();
    let zq_group = x.group().clone();

    let mut side_a: Vec<GqElement> = Vec::with_capacity(m);
    for i in 1..m {
        side_a.push(statement.commitments_a.as_slice()[i].clone());
    }
    side_a.push(get_commitment(
        &minus_one_vector(&zq_group, n),
        &zq_group.identity(),
        commitment_key,
    )?);

    let mut side_b: Vec<GqElement> = Vec::with_capacity(m);
    let mut tail = group.identity();
    for i in 0..m - 1 {
        let x_power = power(x, i + 1);
        side_b.push(commitments_b.as_slice()[i].exponentiate(&x_power)?);
        tail = tail.multiply(&commitments_b.as_slice()[i + 1].exponentiate(&x_power)?)?;
    }
    side_b.push(tail);

    ZeroStatement::new(
        GroupVector::from_elements(side_a)?,
        GroupVector::from_elements(side_b)?,
        y.clone(),
    )
}

/// The derived zero witness: columns (A_1..A_{m-1}, -1) against
/// (x^{i+1} B_i)_{i=0..m-2} plus the blended tail, with matching randomness.
fn build_zero_witness(
    witness: &HadamardWitness,
    b_columns: &[GroupVector<ZqElement>],
    s_values: &[ZqElement],
    x: &ZqElement,
) -> Result<ZeroWitness> {
    let m = witness.matrix_a.num_columns();
    let n = witness.matrix_a.num_rows();
    let zq_group = witness.matrix_a.group().clone();

    let mut a_side_columns: Vec<GroupVector<ZqElement>> = Vec::with_capacity(m);
    let mut a_side_exponents: Vec<ZqElement> = Vec::with_capacity(m);
    for i in 1..m {
        a_side_columns.push(witness.matrix_a.column(i)?);
        a_side_exponents.push(witness.exponents_r.as_slice()[i].clone());
    }
    a_side_columns.push(minus_one_vector(&zq_group, n));
    a_side_exponents.push(zq_group.identity());

    let mut b_side_columns: Vec<GroupVector<ZqElement>> = Vec::with_capacity(m);
    let mut b_side_exponents: Vec<ZqElement> = Vec::with_capacity(m);
    let mut tail_column = vector_scalar_multiply(&zq_group.identity(), &b_columns[0])?;
    let mut tail_exponent = zq_group.identity();
    for i in 0..m - 1 {
        let x_power = power(x, i + 1);
        b_side_columns.push(vector_scalar_multiply(&x_power, &b_columns[i])?);
        b_side_exponents.push(x_power.multiply(&s_values[i])?);
        tail_column = vector_add(
            &tail_column,
            &vector_scalar_multiply(&x_power, &b_columns[i + 1])?,
        )?;
        tail_exponent = tail_exponent.add(&x_power.multiply(&s_values[i + 1])?)?;
    }
    b_side_columns.push(tail_column);
    b_side_exponents.push(tail_exponent);

    ZeroWitness::new(
        GroupMatrix::from_columns(a_side_columns)?,
        GroupMatrix::from_columns(b_side_columns)?,
        GroupVector::from_elements(a_side_exponents)?,
        GroupVector::from_elements(b_side_exponents)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomService;
    use crate::test_utils::{
        gq_element, gq_group_p11, gq_vector, zq_element, zq_vector, BoundedHash, ConstantHash,
        FixedRandomSource,
    };
    use crate::verification::VerificationResult;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn zq_p11() -> ZqGroup {
        ZqGroup::same_order_as(&gq_group_p11())
    }

    fn commitment_key_p11() -> CommitmentKey {
        let group = gq_group_p11();
        CommitmentKey::new(gq_element(9, &group), gq_vector(&[4, 9], &group)).unwrap()
    }

    fn public_key_p11() -> ElGamalMultiRecipientPublicKey {
        ElGamalMultiRecipientPublicKey::new(gq_vector(&[9, 4], &gq_group_p11())).unwrap()
    }

    fn witness_p11() -> HadamardWitness {
        let zq = zq_p11();
        let matrix = GroupMatrix::from_columns(vec![
            zq_vector(&[4, 0], &zq),
            zq_vector(&[2, 2], &zq),
            zq_vector(&[0, 4], &zq),
        ])
        .unwrap();
        let vector_b = zq_vector(&[0, 0], &zq);
        let exponents = zq_vector(&[3, 3, 4], &zq);
        HadamardWitness::new(matrix, vector_b, exponents, zq_element(2, &zq)).unwrap()
    }

    fn statement_for(witness: &HadamardWitness, ck: &CommitmentKey) -> HadamardStatement {
        let commitments_a =
            get_commitment_matrix(&witness.matrix_a, &witness.exponents_r, ck).unwrap();
        let commitment_b = get_commitment(&witness.vector_b, &witness.exponent_s, ck).unwrap();
        HadamardStatement::new(commitments_a, commitment_b).unwrap()
    }

    #[test]
    fn prover_reproduces_the_reference_argument() {
        // Ported fixed-value vector: p = 11, q = 5, g = 3, m = 3, n = 2,
        // constant challenge 2, draws s_1 = 3 followed by the inner zero
        // argument draws a0=(1,3) bm=(2,1) r0=4 sm=0 t=(0,1,3,4,2,1,2).
        let group = gq_group_p11();
        let zq = zq_p11();
        let ck = commitment_key_p11();
        let witness = witness_p11();
        let statement = statement_for(&witness, &ck);

        let hash = HashService::new(ConstantHash::of(&[0b10]));
        let service = HadamardArgumentService::new(public_key_p11(), ck, &hash).unwrap();
        let mut random = FixedRandomSource::of(&[3, 1, 3, 2, 1, 4, 0, 0, 1, 3, 4, 2, 1, 2]);

        let argument = service
            .get_hadamard_argument(&statement, &witness, &mut random)
            .unwrap();
        assert_eq!(random.remaining(), 0, "14 draws expected");

        assert_eq!(argument.commitments_b, gq_vector(&[9, 5, 4], &group));
        let expected_zero = ZeroArgument::builder()
            .with_c_a_0(gq_element(5, &group))
            .with_c_b_m(gq_element(1, &group))
            .with_c_d(gq_vector(&[4, 4, 9, 9, 1, 3, 1], &group))
            .with_a_prime(zq_vector(&[2, 0], &zq))
            .with_b_prime(zq_vector(&[1, 1], &zq))
            .with_r_prime(zq_element(1, &zq))
            .with_s_prime(zq_element(4, &zq))
            .with_t_prime(zq_element(1, &zq))
            .build()
            .unwrap();
        assert_eq!(argument.zero_argument, expected_zero);

        let result = service.verify_hadamard_argument(&statement, &argument).unwrap();
        assert!(result.is_verified(), "errors: {:?}", result.error_messages());
    }

    #[test]
    fn round_trip_with_input_sensitive_hash() {
        let ck = commitment_key_p11();
        let witness = witness_p11();
        let statement = statement_for(&witness, &ck);

        let hash = HashService::new(BoundedHash::below(gq_group_p11().q()));
        let service = HadamardArgumentService::new(public_key_p11(), ck, &hash).unwrap();
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(31));

        let argument = service
            .get_hadamard_argument(&statement, &witness, &mut random)
            .unwrap();
        let result = service.verify_hadamard_argument(&statement, &argument).unwrap();
        assert!(result.is_verified(), "errors: {:?}", result.error_messages());
    }

    #[test]
    fn tampered_c_b_0_names_the_failed_check_first() {
        let ck = commitment_key_p11();
        let witness = witness_p11();
        let statement = statement_for(&witness, &ck);
        let group = gq_group_p11();

        let hash = HashService::new(BoundedHash::below(group.q()));
        let service = HadamardArgumentService::new(public_key_p11(), ck, &hash).unwrap();
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(37));
        let argument = service
            .get_hadamard_argument(&statement, &witness, &mut random)
            .unwrap();

        let mut bad_values: Vec<GqElement> =
            argument.commitments_b.iter().cloned().collect();
        bad_values[0] = bad_values[0].multiply(&group.generator()).unwrap();
        let bad_argument = HadamardArgument {
            commitments_b: GroupVector::from_elements(bad_values).unwrap(),
            zero_argument: argument.zero_argument.clone(),
        };

        let result: VerificationResult = service
            .verify_hadamard_argument(&statement, &bad_argument)
            .unwrap();
        assert!(!result.is_verified());
        assert_eq!(result.error_messages()[0], "c_B_0 must equal c_A_0.");
    }

    #[test]
    fn single_column_matrices_are_rejected() {
        let zq = zq_p11();
        let ck = commitment_key_p11();
        let matrix = GroupMatrix::from_columns(vec![zq_vector(&[4, 0], &zq)]).unwrap();
        let witness = HadamardWitness::new(
            matrix.clone(),
            matrix.column(0).unwrap(),
            zq_vector(&[3], &zq),
            zq_element(3, &zq),
        )
        .unwrap();
        let statement = statement_for(&witness, &ck);

        let hash = HashService::new(BoundedHash::below(gq_group_p11().q()));
        let service = HadamardArgumentService::new(public_key_p11(), ck, &hash).unwrap();
        assert!(matches!(
            service.get_hadamard_argument(&statement, &witness, &mut FixedRandomSource::of(&[])),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn wrong_product_vector_is_rejected_before_proving() {
        let zq = zq_p11();
        let ck = commitment_key_p11();
        let reference = witness_p11();
        let wrong_b = zq_vector(&[1, 0], &zq);
        let commitment_b = get_commitment(&wrong_b, &zq_element(2, &zq), &ck).unwrap();
        let witness = HadamardWitness::new(
            reference.matrix_a.clone(),
            wrong_b,
            reference.exponents_r.clone(),
            zq_element(2, &zq),
        )
        .unwrap();
        let statement = HadamardStatement::new(
            get_commitment_matrix(&witness.matrix_a, &witness.exponents_r, &ck).unwrap(),
            commitment_b,
        )
        .unwrap();

        let hash = HashService::new(BoundedHash::below(gq_group_p11().q()));
        let service = HadamardArgumentService::new(public_key_p11(), ck, &hash).unwrap();
        assert!(matches!(
            service.get_hadamard_argument(&statement, &witness, &mut FixedRandomSource::of(&[])),
            Err(CryptoError::WitnessInconsistent(_))
        ));
    }
}
