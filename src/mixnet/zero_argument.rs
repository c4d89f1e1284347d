//! Zero argument.
//!
//! Proves that the bilinear star map of the columns of two committed
//! matrices sums to zero:
//!
//!     sum_i <a_i, b_i>_y = 0    with    <a, b>_y = sum_j a_j * b_j * y^{j+1}
//!
//! The prover extends A with a fresh leading column a_0 and B with a fresh
//! trailing column b_m, commits to the coefficients d_k of the polynomial
//! a(x) star b(x), and answers the challenge x with the blended column
//! openings. The statement's relation makes the coefficient d_{m+1} vanish,
//! which the verifier checks through c_{d,m+1}.

use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::group_matrix::GroupMatrix;
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::{GqElement, GqGroup};
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::mixnet::commitment::{get_commitment, get_commitment_matrix, get_commitment_vector};
use crate::mixnet::commitment_key::CommitmentKey;
use crate::mixnet::transcript::{check_challenge_length, derive_challenge};
use crate::mixnet::utils::{powers_of, vector_add, vector_scalar_multiply};
use crate::random::RandomSource;
use crate::verification::VerificationResult;

const LOG_TARGET: &str = "zk_mixnet::mixnet::zero_argument";

/// The bilinear star map `sum_j a_j * b_j * y^{j+1}` over two equally long
/// vectors. Empty vectors map to zero.
pub(crate) fn star_map(
    a: &GroupVector<ZqElement>,
    b: &GroupVector<ZqElement>,
    y: &ZqElement,
) -> Result<ZqElement> {
    if a.len() != b.len() {
        return Err(CryptoError::ShapeError(
            "The provided vectors must have the same size.".into(),
        ));
    }
    if !a.is_empty() && a.group() != b.group() {
        return Err(CryptoError::GroupMismatch(
            "The elements of both vectors must be in the same group.".into(),
        ));
    }
    if !a.is_empty() && a.group() != Some(y.group()) {
        return Err(CryptoError::GroupMismatch(
            "The value y must be in the same group as the vectors elements.".into(),
        ));
    }

    let mut sum = y.group().identity();
    let mut y_power = y.clone();
    for (a_j, b_j) in a.iter().zip(b.iter()) {
        sum = sum.add(&a_j.multiply(b_j)?.multiply(&y_power)?)?;
        y_power = y_power.multiply(y)?;
    }
    Ok(sum)
}

/// The coefficients d_0..d_{2m} of the polynomial
/// `(sum_i x^i a_i) star (sum_j x^{m-j} b_j)` over two matrices of m + 1
/// columns each: d_k sums the star maps of the column pairs with
/// j = (m - k) + i.
pub(crate) fn compute_d_vector(
    augmented_a: &GroupMatrix<ZqElement>,
    augmented_b: &GroupMatrix<ZqElement>,
    y: &ZqElement,
) -> Result<GroupVector<ZqElement>> {
    if augmented_a.num_rows() != augmented_b.num_rows() {
        return Err(CryptoError::ShapeError(
            "The two matrices must have the same number of rows.".into(),
        ));
    }
    if augmented_a.num_columns() != augmented_b.num_columns() {
        return Err(CryptoError::ShapeError(
            "The two matrices must have the same number of columns.".into(),
        ));
    }
    if augmented_a.group() != augmented_b.group() {
        return Err(CryptoError::GroupMismatch(
            "The elements of both matrices must be in the same group.".into(),
        ));
    }

    let m = augmented_a.num_columns() - 1;
    let mut d = Vec::with_capacity(2 * m + 1);
    for k in 0..=2 * m {
        let mut d_k = y.group().identity();
        for i in 0..=m {
            let j = (m + i).checked_sub(k);
            if let Some(j) = j {
                if j <= m {
                    d_k = d_k.add(&star_map(
                        &augmented_a.column(i)?,
                        &augmented_b.column(j)?,
                        y,
                    )?)?;
                }
            }
        }
        d.push(d_k);
    }
    GroupVector::from_elements(d)
}

/// Statement (c_A, c_B, y) of a zero argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeroStatement {
    commitments_a: GroupVector<GqElement>,
    commitments_b: GroupVector<GqElement>,
    y: ZqElement,
}

impl ZeroStatement {
    pub fn new(
        commitments_a: GroupVector<GqElement>,
        commitments_b: GroupVector<GqElement>,
        y: ZqElement,
    ) -> Result<Self> {
        if commitments_a.len() != commitments_b.len() {
            return Err(CryptoError::ShapeError(
                "The two commitments vectors must have the same size.".into(),
            ));
        }
        if commitments_a.is_empty() {
            return Err(CryptoError::InvalidInput(
                "The commitments vectors must not be empty.".into(),
            ));
        }
        if commitments_a.group() != commitments_b.group() {
            return Err(CryptoError::GroupMismatch(
                "The two commitments must be part of the same group.".into(),
            ));
        }
        let group = commitments_a.as_slice()[0].group();
        if !group.has_same_order_as(y.group()) {
            return Err(CryptoError::GroupMismatch(
                "The y value group must be of the same order as the group of the commitments."
                    .into(),
            ));
        }
        Ok(ZeroStatement {
            commitments_a,
            commitments_b,
            y,
        })
    }

    pub fn m(&self) -> usize {
        self.commitments_a.len()
    }

    pub fn group(&self) -> &GqGroup {
        self.commitments_a.as_slice()[0].group()
    }

    pub fn y(&self) -> &ZqElement {
        &self.y
    }
}

/// Witness (A, B, r, s) of a zero argument: two n x m matrices and the
/// randomness of their column commitments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeroWitness {
    matrix_a: GroupMatrix<ZqElement>,
    matrix_b: GroupMatrix<ZqElement>,
    exponents_r: GroupVector<ZqElement>,
    exponents_s: GroupVector<ZqElement>,
}

impl ZeroWitness {
    pub fn new(
        matrix_a: GroupMatrix<ZqElement>,
        matrix_b: GroupMatrix<ZqElement>,
        exponents_r: GroupVector<ZqElement>,
        exponents_s: GroupVector<ZqElement>,
    ) -> Result<Self> {
        if matrix_a.num_rows() != matrix_b.num_rows()
            || matrix_a.num_columns() != matrix_b.num_columns()
        {
            return Err(CryptoError::ShapeError(
                "The matrices A and B must have the same dimensions.".into(),
            ));
        }
        if exponents_r.len() != matrix_a.num_columns() || exponents_s.len() != matrix_a.num_columns()
        {
            return Err(CryptoError::ShapeError(
                "There must be one exponent per matrix column.".into(),
            ));
        }
        if matrix_a.group() != matrix_b.group()
            || Some(matrix_a.group()) != exponents_r.group()
            || exponents_r.group() != exponents_s.group()
        {
            return Err(CryptoError::GroupMismatch(
                "The witness matrices and exponents must belong to the same group.".into(),
            ));
        }
        Ok(ZeroWitness {
            matrix_a,
            matrix_b,
            exponents_r,
            exponents_s,
        })
    }

    pub fn matrix_a(&self) -> &GroupMatrix<ZqElement> {
        &self.matrix_a
    }

    pub fn matrix_b(&self) -> &GroupMatrix<ZqElement> {
        &self.matrix_b
    }
}

/// The zero argument (c_A_0, c_B_m, c_d, a', b', r', s', t').
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeroArgument {
    c_a_0: GqElement,
    c_b_m: GqElement,
    c_d: GroupVector<GqElement>,
    a_prime: GroupVector<ZqElement>,
    b_prime: GroupVector<ZqElement>,
    r_prime: ZqElement,
    s_prime: ZqElement,
    t_prime: ZqElement,
}

impl ZeroArgument {
    pub fn builder() -> ZeroArgumentBuilder {
        ZeroArgumentBuilder::default()
    }

    /// The dimension m, recovered from the 2m + 1 coefficient commitments.
    pub fn m(&self) -> usize {
        (self.c_d.len() - 1) / 2
    }

    /// The dimension n of the blended column openings.
    pub fn n(&self) -> usize {
        self.a_prime.len()
    }

    pub fn group(&self) -> &GqGroup {
        self.c_a_0.group()
    }
}

impl ToHashable for ZeroArgument {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            self.c_a_0.to_hashable(),
            self.c_b_m.to_hashable(),
            self.c_d.to_hashable(),
            self.a_prime.to_hashable(),
            self.b_prime.to_hashable(),
            self.r_prime.to_hashable(),
            self.s_prime.to_hashable(),
            self.t_prime.to_hashable(),
        ])
    }
}

/// Builder validating all cross-field invariants once, at build time.
#[derive(Default)]
pub struct ZeroArgumentBuilder {
    c_a_0: Option<GqElement>,
    c_b_m: Option<GqElement>,
    c_d: Option<GroupVector<GqElement>>,
    a_prime: Option<GroupVector<ZqElement>>,
    b_prime: Option<GroupVector<ZqElement>>,
    r_prime: Option<ZqElement>,
    s_prime: Option<ZqElement>,
    t_prime: Option<ZqElement>,
}

impl ZeroArgumentBuilder {
    pub fn with_c_a_0(mut self, c_a_0: GqElement) -> Self {
        self.c_a_0 = Some(c_a_0);
        self
    }

    pub fn with_c_b_m(mut self, c_b_m: GqElement) -> Self {
        self.c_b_m = Some(c_b_m);
        self
    }

    pub fn with_c_d(mut self, c_d: GroupVector<GqElement>) -> Self {
        self.c_d = Some(c_d);
        self
    }

    pub fn with_a_prime(mut self, a_prime: GroupVector<ZqElement>) -> Self {
        self.a_prime = Some(a_prime);
        self
    }

    pub fn with_b_prime(mut self, b_prime: GroupVector<ZqElement>) -> Self {
        self.b_prime = Some(b_prime);
        self
    }

    pub fn with_r_prime(mut self, r_prime: ZqElement) -> Self {
        self.r_prime = Some(r_prime);
        self
    }

    pub fn with_s_prime(mut self, s_prime: ZqElement) -> Self {
        self.s_prime = Some(s_prime);
        self
    }

    pub fn with_t_prime(mut self, t_prime: ZqElement) -> Self {
        self.t_prime = Some(t_prime);
        self
    }

    pub fn build(self) -> Result<ZeroArgument> {
        let c_a_0 = require(self.c_a_0, "c_a_0")?;
        let c_b_m = require(self.c_b_m, "c_b_m")?;
        let c_d = require(self.c_d, "c_d")?;
        let a_prime = require(self.a_prime, "a_prime")?;
        let b_prime = require(self.b_prime, "b_prime")?;
        let r_prime = require(self.r_prime, "r_prime")?;
        let s_prime = require(self.s_prime, "s_prime")?;
        let t_prime = require(self.t_prime, "t_prime")?;

        if c_d.len() % 2 == 0 {
            return Err(CryptoError::ShapeError(
                "The vector c_d must have 2m + 1 elements.".into(),
            ));
        }
        if a_prime.len() != b_prime.len() {
            return Err(CryptoError::ShapeError(
                "The vectors a' and b' must have the same size.".into(),
            ));
        }
        if c_b_m.group() != c_a_0.group() || c_d.group() != Some(c_a_0.group()) {
            return Err(CryptoError::GroupMismatch(
                "The commitments of the argument must belong to the same group.".into(),
            ));
        }
        let zq_consistent = a_prime.group() == b_prime.group()
            && a_prime.group() == Some(r_prime.group())
            && r_prime.group() == s_prime.group()
            && s_prime.group() == t_prime.group();
        if !zq_consistent {
            return Err(CryptoError::GroupMismatch(
                "The responses of the argument must belong to the same group.".into(),
            ));
        }
        if !c_a_0.group().has_same_order_as(r_prime.group()) {
            return Err(CryptoError::GroupMismatch(
                "The commitments and the responses must have the same group order.".into(),
            ));
        }
        Ok(ZeroArgument {
            c_a_0,
            c_b_m,
            c_d,
            a_prime,
            b_prime,
            r_prime,
            s_prime,
            t_prime,
        })
    }
}

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| CryptoError::InvalidInput(format!("The field {name} must be set.")))
}

/// Prover and verifier of zero arguments.
pub struct ZeroArgumentService<'a> {
    public_key: crate::elgamal::ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    hash: &'a HashService,
}

impl<'a> ZeroArgumentService<'a> {
    pub fn new(
        public_key: crate::elgamal::ElGamalMultiRecipientPublicKey,
        commitment_key: CommitmentKey,
        hash: &'a HashService,
    ) -> Result<Self> {
        if public_key.group() != commitment_key.group() {
            return Err(CryptoError::GroupMismatch(
                "The public and commitment keys are not from the same group.".into(),
            ));
        }
        check_challenge_length(hash, commitment_key.group().q())?;
        Ok(ZeroArgumentService {
            public_key,
            commitment_key,
            hash,
        })
    }

    /// Produces a zero argument.
    ///
    /// Draws, in order: a_0 (n), b_m (n), r_0, s_m, then 2m + 1 values of t;
    /// t_{m+1} is subsequently pinned to zero.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn get_zero_argument<R: RandomSource + ?Sized>(
        &self,
        statement: &ZeroStatement,
        witness: &ZeroWitness,
        random: &mut R,
    ) -> Result<ZeroArgument> {
        let m = witness.matrix_a.num_columns();
        let n = witness.matrix_a.num_rows();
        if statement.m() != m {
            return Err(CryptoError::ShapeError(
                "The statement commitments must have the same size as the witness exponents."
                    .into(),
            ));
        }
        if Some(statement.y.group()) != witness.exponents_r.group() {
            return Err(CryptoError::GroupMismatch(
                "The statement y and witness exponents must be part of the same group.".into(),
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
                "The statement's Ca commitments must be equal to the witness' commitment matrix A."
                    .into(),
            ));
        }
        let commitments_b = get_commitment_matrix(
            &witness.matrix_b,
            &witness.exponents_s,
            &self.commitment_key,
        )?;
        if commitments_b != statement.commitments_b {
            return Err(CryptoError::WitnessInconsistent(
                "The statement's Cb commitments must be equal to the witness' commitment matrix B."
                    .into(),
            ));
        }
        let y = &statement.y;
        let mut star_sum = y.group().identity();
        for i in 0..m {
            star_sum = star_sum.add(&star_map(
                &witness.matrix_a.column(i)?,
                &witness.matrix_b.column(i)?,
                y,
            )?)?;
        }
        if star_sum != y.group().identity() {
            return Err(CryptoError::WitnessInconsistent(
                "The sum of the starMap operations between the witness's matrices columns is not equal to 0."
                    .into(),
            ));
        }

        let zq_group = y.group().clone();

        // Fresh boundary columns and the polynomial coefficients.
        let a_0 = random.gen_random_zq_vector(&zq_group, n);
        let b_m = random.gen_random_zq_vector(&zq_group, n);
        let r_0 = random.gen_random_zq_element(&zq_group);
        let s_m = random.gen_random_zq_element(&zq_group);
        let mut t: Vec<ZqElement> = (0..=2 * m)
            .map(|_| random.gen_random_zq_element(&zq_group))
            .collect();
        t[m + 1] = zq_group.identity();
        let t = GroupVector::from_elements(t)?;

        let augmented_a = witness.matrix_a.prepend_column(&a_0)?;
        let augmented_b = witness.matrix_b.append_column(&b_m)?;
        let augmented_r = witness.exponents_r.prepend(r_0.clone())?;
        let augmented_s = witness.exponents_s.append(s_m.clone())?;

        let d = compute_d_vector(&augmented_a, &augmented_b, y)?;

        let c_a_0 = get_commitment(&a_0, &r_0, &self.commitment_key)?;
        let c_b_m = get_commitment(&b_m, &s_m, &self.commitment_key)?;
        let c_d = get_commitment_vector(&d, &t, &self.commitment_key)?;

        let (x, _) = derive_challenge(
            self.hash,
            &zq_group,
            &self.transcript(statement, &c_a_0, &c_b_m, &c_d),
        )?;
        tracing::debug!(target: LOG_TARGET, challenge = %x.value(), "derived challenge x");

        let x_powers = powers_of(&x, 2 * m + 1)?;

        // a' = sum_i x^i a_i and b' = sum_j x^{m-j} b_j over the augmented
        // columns, with the matching blended randomness.
        let mut a_prime = vector_scalar_multiply(&zq_group.identity(), &augmented_a.column(0)?)?;
        let mut b_prime = a_prime.clone();
        let mut r_prime = zq_group.identity();
        let mut s_prime = zq_group.identity();
        for i in 0..=m {
            let x_i = &x_powers.as_slice()[i];
            let x_m_minus_i = &x_powers.as_slice()[m - i];
            a_prime = vector_add(
                &a_prime,
                &vector_scalar_multiply(x_i, &augmented_a.column(i)?)?,
            )?;
            b_prime = vector_add(
                &b_prime,
                &vector_scalar_multiply(x_m_minus_i, &augmented_b.column(i)?)?,
            )?;
            r_prime = r_prime.add(&x_i.multiply(&augmented_r.as_slice()[i])?)?;
            s_prime = s_prime.add(&x_m_minus_i.multiply(&augmented_s.as_slice()[i])?)?;
        }
        let mut t_prime = zq_group.identity();
        for k in 0..=2 * m {
            t_prime = t_prime.add(&x_powers.as_slice()[k].multiply(&t.as_slice()[k])?)?;
        }

        ZeroArgument::builder()
            .with_c_a_0(c_a_0)
            .with_c_b_m(c_b_m)
            .with_c_d(c_d)
            .with_a_prime(a_prime)
            .with_b_prime(b_prime)
            .with_r_prime(r_prime)
            .with_s_prime(s_prime)
            .with_t_prime(t_prime)
            .build()
    }

    /// Verifies a zero argument; all four checks run to completion.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn verify_zero_argument(
        &self,
        statement: &ZeroStatement,
        argument: &ZeroArgument,
    ) -> Result<VerificationResult> {
        if statement.group() != argument.group() {
            return Err(CryptoError::GroupMismatch(
                "Statement and argument do not share the same group.".into(),
            ));
        }
        if 2 * statement.m() + 1 != argument.c_d.len() {
            return Err(CryptoError::ShapeError(
                "The m of the statement should be equal to the m of the argument (2m+1).".into(),
            ));
        }

        let m = statement.m();
        let zq_group = statement.y.group().clone();
        let (x, _) = derive_challenge(
            self.hash,
            &zq_group,
            &self.transcript(statement, &argument.c_a_0, &argument.c_b_m, &argument.c_d),
        )?;
        let x_powers = powers_of(&x, 2 * m + 1)?;

        let mut result = VerificationResult::verified();

        // The coefficient of x^{m+1} vanishes for a true statement.
        result.check(
            argument.c_d.as_slice()[m + 1] == statement.group().identity(),
            "c_d_{m+1} must equal com(0, 0).",
        );

        // prod c_A_i^{x^i} = com(a', r'), with c_A_0 from the argument.
        let mut product_a = argument.c_a_0.clone();
        for i in 1..=m {
            product_a = product_a.multiply(
                &statement.commitments_a.as_slice()[i - 1].exponentiate(&x_powers.as_slice()[i])?,
            )?;
        }
        let commitment_a =
            get_commitment(&argument.a_prime, &argument.r_prime, &self.commitment_key)?;
        result.check(
            product_a == commitment_a,
            "prod c_A_i^{x^i} must equal com(a', r').",
        );

        // prod c_B_j^{x^{m-j}} = com(b', s'), with c_B_m from the argument.
        let mut product_b = argument.c_b_m.clone();
        for j in 0..m {
            product_b = product_b.multiply(
                &statement.commitments_b.as_slice()[j].exponentiate(&x_powers.as_slice()[m - j])?,
            )?;
        }
        let commitment_b =
            get_commitment(&argument.b_prime, &argument.s_prime, &self.commitment_key)?;
        result.check(
            product_b == commitment_b,
            "prod c_B_j^{x^{m-j}} must equal com(b', s').",
        );

        // prod c_d_k^{x^k} = com(a' star b', t').
        let mut product_d = statement.group().identity();
        for k in 0..=2 * m {
            product_d = product_d
                .multiply(&argument.c_d.as_slice()[k].exponentiate(&x_powers.as_slice()[k])?)?;
        }
        let star = star_map(&argument.a_prime, &argument.b_prime, &statement.y)?;
        let commitment_d = get_commitment(
            &GroupVector::single(star),
            &argument.t_prime,
            &self.commitment_key,
        )?;
        result.check(
            product_d == commitment_d,
            "prod c_d_k^{x^k} must equal com(a' star b', t').",
        );

        if !result.is_verified() {
            tracing::debug!(
                target: LOG_TARGET,
                errors = ?result.error_messages(),
                "zero argument verification failed"
            );
        }
        Ok(result)
    }

    fn transcript(
        &self,
        statement: &ZeroStatement,
        c_a_0: &GqElement,
        c_b_m: &GqElement,
        c_d: &GroupVector<GqElement>,
    ) -> Vec<Hashable> {
        vec![
            self.commitment_key.to_hashable(),
            self.public_key.to_hashable(),
            statement.commitments_a.to_hashable(),
            statement.commitments_b.to_hashable(),
            statement.y.to_hashable(),
            c_a_0.to_hashable(),
            c_b_m.to_hashable(),
            c_d.to_hashable(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::ElGamalMultiRecipientPublicKey;
    use crate::random::RandomService;
    use crate::test_utils::{
        gq_element, gq_group_p11, gq_vector, zq_element, zq_vector, BoundedHash, ConstantHash,
        FixedRandomSource,
    };
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
        ElGamalMultiRecipientPublicKey::new(gq_vector(&[4, 4], &gq_group_p11())).unwrap()
    }

    #[test]
    fn star_map_with_simple_values() {
        let group = ZqGroup::new(num_bigint::BigUint::from(11u8)).unwrap();
        let first = zq_vector(&[2, 6], &group);
        let second = zq_vector(&[3, 7], &group);
        let y = zq_element(8, &group);
        // 2*3*8 + 6*7*8^2 = 2736 = 8 (mod 11)
        assert_eq!(star_map(&first, &second, &y).unwrap(), zq_element(8, &group));
    }

    #[test]
    fn star_map_of_empty_vectors_is_zero() {
        let group = zq_p11();
        let y = zq_element(2, &group);
        assert_eq!(
            star_map(&GroupVector::empty(), &GroupVector::empty(), &y).unwrap(),
            group.identity()
        );
    }

    #[test]
    fn star_map_rejects_mismatched_sizes() {
        let group = zq_p11();
        let y = zq_element(2, &group);
        assert!(star_map(&zq_vector(&[1], &group), &zq_vector(&[1, 2], &group), &y).is_err());
    }

    #[test]
    fn star_map_json_test_vectors() {
        // The cross-implementation JSON test-vector format: context, input
        // and expected output.
        let vectors = serde_json::json!([
            {
                "description": "bilinear map with q = 11",
                "context": { "q": "11" },
                "input": { "a": ["2", "6"], "b": ["3", "7"], "y": "8" },
                "output": { "value": "8" }
            },
            {
                "description": "bilinear map with q = 29",
                "context": { "q": "29" },
                "input": { "a": ["9", "15", "8"], "b": ["4", "0", "22"], "y": "3" },
                "output": { "value": "17" }
            }
        ]);

        for case in vectors.as_array().unwrap() {
            let q: num_bigint::BigUint =
                case["context"]["q"].as_str().unwrap().parse().unwrap();
            let group = ZqGroup::new(q).unwrap();
            let parse_vector = |key: &str| {
                GroupVector::from_elements(
                    case["input"][key]
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|v| {
                            ZqElement::new(v.as_str().unwrap().parse().unwrap(), &group).unwrap()
                        })
                        .collect(),
                )
                .unwrap()
            };
            let a = parse_vector("a");
            let b = parse_vector("b");
            let y =
                ZqElement::new(case["input"]["y"].as_str().unwrap().parse().unwrap(), &group)
                    .unwrap();
            let expected = ZqElement::new(
                case["output"]["value"].as_str().unwrap().parse().unwrap(),
                &group,
            )
            .unwrap();

            assert_eq!(
                star_map(&a, &b, &y).unwrap(),
                expected,
                "assertion failed for: {}",
                case["description"]
            );
        }
    }

    #[test]
    fn d_vector_with_simple_values() {
        let group = ZqGroup::new(num_bigint::BigUint::from(11u8)).unwrap();
        // Rows (0, 2), (4, 6) and (1, 3), (5, 7); m = 1, y = 8.
        let first = GroupMatrix::from_rows(vec![
            zq_vector(&[0, 2], &group),
            zq_vector(&[4, 6], &group),
        ])
        .unwrap();
        let second = GroupMatrix::from_rows(vec![
            zq_vector(&[1, 3], &group),
            zq_vector(&[5, 7], &group),
        ])
        .unwrap();
        let y = zq_element(8, &group);

        let d = compute_d_vector(&first, &second, &y).unwrap();
        assert_eq!(d, zq_vector(&[10, 1, 0], &group));
    }

    #[test]
    fn prover_reproduces_the_reference_argument() {
        // Ported fixed-value vector: p = 11, q = 5, g = 3, m = 3, n = 2,
        // constant challenge 2, recorded draws
        // a0=(1,3) bm=(2,1) r0=4 sm=0 t=(0,1,3,4,2,1,2).
        let group = gq_group_p11();
        let zq = zq_p11();

        let statement = ZeroStatement::new(
            gq_vector(&[5, 3, 4], &group),
            gq_vector(&[4, 9, 9], &group),
            zq_element(2, &zq),
        )
        .unwrap();
        let witness = ZeroWitness::new(
            GroupMatrix::from_rows(vec![
                zq_vector(&[2, 0, 4], &zq),
                zq_vector(&[2, 4, 4], &zq),
            ])
            .unwrap(),
            GroupMatrix::from_rows(vec![
                zq_vector(&[3, 2, 1], &zq),
                zq_vector(&[0, 0, 0], &zq),
            ])
            .unwrap(),
            zq_vector(&[3, 4, 0], &zq),
            zq_vector(&[1, 2, 4], &zq),
        )
        .unwrap();

        let hash = HashService::new(ConstantHash::of(&[0b10]));
        let service =
            ZeroArgumentService::new(public_key_p11(), commitment_key_p11(), &hash).unwrap();
        let mut random = FixedRandomSource::of(&[1, 3, 2, 1, 4, 0, 0, 1, 3, 4, 2, 1, 2]);

        let argument = service
            .get_zero_argument(&statement, &witness, &mut random)
            .unwrap();
        assert_eq!(random.remaining(), 0, "13 draws expected");

        let expected = ZeroArgument::builder()
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
        assert_eq!(argument, expected);

        let result = service.verify_zero_argument(&statement, &argument).unwrap();
        assert!(result.is_verified(), "errors: {:?}", result.error_messages());
    }

    #[test]
    fn round_trip_with_input_sensitive_hash() {
        let group = gq_group_p11();
        let zq = zq_p11();
        let ck = commitment_key_p11();

        // A witness whose star-map sum vanishes for y = 2: built from the
        // reference matrices above.
        let matrix_a = GroupMatrix::from_rows(vec![
            zq_vector(&[2, 0, 4], &zq),
            zq_vector(&[2, 4, 4], &zq),
        ])
        .unwrap();
        let matrix_b = GroupMatrix::from_rows(vec![
            zq_vector(&[3, 2, 1], &zq),
            zq_vector(&[0, 0, 0], &zq),
        ])
        .unwrap();
        let r = zq_vector(&[3, 4, 0], &zq);
        let s = zq_vector(&[1, 2, 4], &zq);
        let witness = ZeroWitness::new(matrix_a.clone(), matrix_b.clone(), r.clone(), s.clone())
            .unwrap();
        let statement = ZeroStatement::new(
            get_commitment_matrix(&matrix_a, &r, &ck).unwrap(),
            get_commitment_matrix(&matrix_b, &s, &ck).unwrap(),
            zq_element(2, &zq),
        )
        .unwrap();

        let hash = HashService::new(BoundedHash::below(group.q()));
        let service = ZeroArgumentService::new(public_key_p11(), ck, &hash).unwrap();
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(23));

        let argument = service
            .get_zero_argument(&statement, &witness, &mut random)
            .unwrap();
        let result = service.verify_zero_argument(&statement, &argument).unwrap();
        assert!(result.is_verified(), "errors: {:?}", result.error_messages());

        // Tampering with c_B_m breaks at least one aggregation check.
        let mut tampered = argument.clone();
        tampered.c_b_m = tampered.c_b_m.multiply(&group.generator()).unwrap();
        let failed = service.verify_zero_argument(&statement, &tampered).unwrap();
        assert!(!failed.is_verified());
    }

    #[test]
    fn false_statements_are_rejected_before_proving() {
        let zq = zq_p11();
        let ck = commitment_key_p11();
        let matrix = GroupMatrix::from_rows(vec![zq_vector(&[1], &zq), zq_vector(&[1], &zq)])
            .unwrap();
        let exponents = zq_vector(&[1], &zq);
        let witness =
            ZeroWitness::new(matrix.clone(), matrix.clone(), exponents.clone(), exponents.clone())
                .unwrap();
        let statement = ZeroStatement::new(
            get_commitment_matrix(&matrix, &exponents, &ck).unwrap(),
            get_commitment_matrix(&matrix, &exponents, &ck).unwrap(),
            // y = 1 makes the star map sum to a non-zero value.
            zq_element(1, &zq),
        )
        .unwrap();

        let hash = HashService::new(BoundedHash::below(gq_group_p11().q()));
        let service = ZeroArgumentService::new(public_key_p11(), ck, &hash).unwrap();
        assert!(matches!(
            service.get_zero_argument(&statement, &witness, &mut FixedRandomSource::of(&[])),
            Err(CryptoError::WitnessInconsistent(_))
        ));
    }
}
