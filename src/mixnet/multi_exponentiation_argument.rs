//! Multi-exponentiation argument.
//!
//! Proves that a ciphertext C is the a-weighted product of the rows of a
//! ciphertext matrix, re-encrypted with randomness rho:
//!
//!     C = Enc_pk(ones, rho) * prod_i C_i^{a_i}
//!
//! where the exponent columns a_1..a_m are committed in c_A. The prover
//! publishes the diagonal ciphertexts E_k of the polynomial
//! prod_i C_i^{a(x)} together with commitments to masking exponents b_k,
//! and answers the challenge x with blended openings. The middle elements
//! are pinned: b_m = 0, s_m = 0, tau_m = rho, so E_m = C and c_B_m = 1.

use crate::elgamal::{
    ElGamalMultiRecipientCiphertext, ElGamalMultiRecipientMessage, ElGamalMultiRecipientPublicKey,
};
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

const LOG_TARGET: &str = "zk_mixnet::mixnet::multi_exponentiation_argument";

/// Statement (C-matrix, C, c_A).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiExponentiationStatement {
    ciphertext_matrix: GroupMatrix<ElGamalMultiRecipientCiphertext>,
    ciphertext_c: ElGamalMultiRecipientCiphertext,
    commitments_a: GroupVector<GqElement>,
}

impl MultiExponentiationStatement {
    pub fn new(
        ciphertext_matrix: GroupMatrix<ElGamalMultiRecipientCiphertext>,
        ciphertext_c: ElGamalMultiRecipientCiphertext,
        commitments_a: GroupVector<GqElement>,
    ) -> Result<Self> {
        if commitments_a.len() != ciphertext_matrix.num_rows() {
            return Err(CryptoError::ShapeError(
                "There must be one commitment per ciphertext matrix row.".into(),
            ));
        }
        if ciphertext_matrix.group() != ciphertext_c.group()
            || commitments_a.group() != Some(ciphertext_c.group())
        {
            return Err(CryptoError::GroupMismatch(
                "The statement parts must belong to the same group.".into(),
            ));
        }
        if ciphertext_matrix.element_size() != ciphertext_c.size() {
            return Err(CryptoError::ShapeError(
                "The ciphertext C must have the element size of the matrix.".into(),
            ));
        }
        Ok(MultiExponentiationStatement {
            ciphertext_matrix,
            ciphertext_c,
            commitments_a,
        })
    }

    pub fn m(&self) -> usize {
        self.ciphertext_matrix.num_rows()
    }

    pub fn n(&self) -> usize {
        self.ciphertext_matrix.num_columns()
    }

    pub fn l(&self) -> usize {
        self.ciphertext_c.size()
    }

    pub fn group(&self) -> &GqGroup {
        self.ciphertext_c.group()
    }
}

/// Witness (A, r, rho).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiExponentiationWitness {
    matrix_a: GroupMatrix<ZqElement>,
    exponents_r: GroupVector<ZqElement>,
    rho: ZqElement,
}

impl MultiExponentiationWitness {
    pub fn new(
        matrix_a: GroupMatrix<ZqElement>,
        exponents_r: GroupVector<ZqElement>,
        rho: ZqElement,
    ) -> Result<Self> {
        if exponents_r.len() != matrix_a.num_columns() {
            return Err(CryptoError::ShapeError(
                "There must be one exponent per matrix column.".into(),
            ));
        }
        if Some(matrix_a.group()) != exponents_r.group()
            || exponents_r.group() != Some(rho.group())
        {
            return Err(CryptoError::GroupMismatch(
                "The witness parts must belong to the same group.".into(),
            ));
        }
        Ok(MultiExponentiationWitness {
            matrix_a,
            exponents_r,
            rho,
        })
    }
}

/// The multi-exponentiation argument
/// (c_A_0, c_B, E, a, r, b, s, tau).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiExponentiationArgument {
    c_a_0: GqElement,
    c_b: GroupVector<GqElement>,
    e: GroupVector<ElGamalMultiRecipientCiphertext>,
    a: GroupVector<ZqElement>,
    r: ZqElement,
    b: ZqElement,
    s: ZqElement,
    tau: ZqElement,
}

impl MultiExponentiationArgument {
    pub fn builder() -> MultiExponentiationArgumentBuilder {
        MultiExponentiationArgumentBuilder::default()
    }

    pub fn m(&self) -> usize {
        self.c_b.len() / 2
    }

    pub fn n(&self) -> usize {
        self.a.len()
    }

    pub fn l(&self) -> usize {
        self.e.element_size()
    }

    pub fn group(&self) -> &GqGroup {
        self.c_a_0.group()
    }
}

impl ToHashable for MultiExponentiationArgument {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            self.c_a_0.to_hashable(),
            self.c_b.to_hashable(),
            self.e.to_hashable(),
            self.a.to_hashable(),
            self.r.to_hashable(),
            self.b.to_hashable(),
            self.s.to_hashable(),
            self.tau.to_hashable(),
        ])
    }
}

/// Builder validating all cross-field invariants once, at build time.
#[derive(Default)]
pub struct MultiExponentiationArgumentBuilder {
    c_a_0: Option<GqElement>,
    c_b: Option<GroupVector<GqElement>>,
    e: Option<GroupVector<ElGamalMultiRecipientCiphertext>>,
    a: Option<GroupVector<ZqElement>>,
    r: Option<ZqElement>,
    b: Option<ZqElement>,
    s: Option<ZqElement>,
    tau: Option<ZqElement>,
}

impl MultiExponentiationArgumentBuilder {
    pub fn with_c_a_0(mut self, c_a_0: GqElement) -> Self {
        self.c_a_0 = Some(c_a_0);
        self
    }

    pub fn with_c_b(mut self, c_b: GroupVector<GqElement>) -> Self {
        self.c_b = Some(c_b);
        self
    }

    pub fn with_e(mut self, e: GroupVector<ElGamalMultiRecipientCiphertext>) -> Self {
        self.e = Some(e);
        self
    }

    pub fn with_a(mut self, a: GroupVector<ZqElement>) -> Self {
        self.a = Some(a);
        self
    }

    pub fn with_r(mut self, r: ZqElement) -> Self {
        self.r = Some(r);
        self
    }

    pub fn with_b(mut self, b: ZqElement) -> Self {
        self.b = Some(b);
        self
    }

    pub fn with_s(mut self, s: ZqElement) -> Self {
        self.s = Some(s);
        self
    }

    pub fn with_tau(mut self, tau: ZqElement) -> Self {
        self.tau = Some(tau);
        self
    }

    pub fn build(self) -> Result<MultiExponentiationArgument> {
        let c_a_0 = require(self.c_a_0, "c_a_0")?;
        let c_b = require(self.c_b, "c_b")?;
        let e = require(self.e, "e")?;
        let a = require(self.a, "a")?;
        let r = require(self.r, "r")?;
        let b = require(self.b, "b")?;
        let s = require(self.s, "s")?;
        let tau = require(self.tau, "tau")?;

        if c_b.len() != e.len() || c_b.len() % 2 != 0 || c_b.is_empty() {
            return Err(CryptoError::ShapeError(
                "The vectors c_B and E must both have 2m elements.".into(),
            ));
        }
        if a.is_empty() {
            return Err(CryptoError::InvalidInput(
                "The exponent vector a must not be empty.".into(),
            ));
        }
        if c_b.group() != Some(c_a_0.group()) || e.group() != Some(c_a_0.group()) {
            return Err(CryptoError::GroupMismatch(
                "The commitments and ciphertexts of the argument must belong to the same group."
                    .into(),
            ));
        }
        let zq_consistent = a.group() == Some(r.group())
            && r.group() == b.group()
            && b.group() == s.group()
            && s.group() == tau.group();
        if !zq_consistent {
            return Err(CryptoError::GroupMismatch(
                "The responses of the argument must belong to the same group.".into(),
            ));
        }
        if !c_a_0.group().has_same_order_as(r.group()) {
            return Err(CryptoError::GroupMismatch(
                "The commitments and the responses must have the same group order.".into(),
            ));
        }
        Ok(MultiExponentiationArgument {
            c_a_0,
            c_b,
            e,
            a,
            r,
            b,
            s,
            tau,
        })
    }
}

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| CryptoError::InvalidInput(format!("The field {name} must be set.")))
}

/// Prover and verifier of multi-exponentiation arguments.
pub struct MultiExponentiationArgumentService<'a> {
    public_key: ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    hash: &'a HashService,
}

impl<'a> MultiExponentiationArgumentService<'a> {
    pub fn new(
        public_key: ElGamalMultiRecipientPublicKey,
        commitment_key: CommitmentKey,
        hash: &'a HashService,
    ) -> Result<Self> {
        if public_key.group() != commitment_key.group() {
            return Err(CryptoError::GroupMismatch(
                "The public and commitment keys are not from the same group.".into(),
            ));
        }
        check_challenge_length(hash, commitment_key.group().q())?;
        Ok(MultiExponentiationArgumentService {
            public_key,
            commitment_key,
            hash,
        })
    }

    /// Produces a multi-exponentiation argument.
    ///
    /// Draws, in order: a_0 (n), r_0, b (2m), s (2m), tau (2m); b_m, s_m and
    /// tau_m are subsequently pinned to 0, 0 and rho.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn get_multi_exponentiation_argument<R: RandomSource + ?Sized>(
        &self,
        statement: &MultiExponentiationStatement,
        witness: &MultiExponentiationWitness,
        random: &mut R,
    ) -> Result<MultiExponentiationArgument> {
        let m = statement.m();
        let n = statement.n();
        let l = statement.l();
        if witness.matrix_a.num_columns() != m || witness.matrix_a.num_rows() != n {
            return Err(CryptoError::ShapeError(
                "The witness matrix must have the dimensions of the ciphertext matrix, transposed."
                    .into(),
            ));
        }
        if n > self.commitment_key.size() {
            return Err(CryptoError::ShapeError(
                "The number of rows in the matrix must be smaller or equal to the commitment key size."
                    .into(),
            ));
        }
        if l > self.public_key.size() {
            return Err(CryptoError::ShapeError(
                "The ciphertexts must be smaller than the public key.".into(),
            ));
        }
        if statement.group() != self.public_key.group() {
            return Err(CryptoError::GroupMismatch(
                "The statement must belong to the public key's group.".into(),
            ));
        }
        let zq_group = witness.matrix_a.group().clone();
        if !statement.group().has_same_order_as(&zq_group) {
            return Err(CryptoError::GroupMismatch(
                "The statement and the witness must have the same group order.".into(),
            ));
        }

        // Statement-witness consistency:
        // C = Enc(ones, rho) * prod_i C_i^{a_i}.
        let computed_c = self.encrypt_and_combine(
            &ElGamalMultiRecipientMessage::ones(statement.group(), l)?,
            &witness.rho,
            &statement.ciphertext_matrix,
            &witness.matrix_a.columns()?,
        )?;
        if computed_c != statement.ciphertext_c {
            return Err(CryptoError::WitnessInconsistent(
                "The computed multi exponentiation ciphertext does not correspond to the provided one."
                    .into(),
            ));
        }
        let commitments_a = get_commitment_matrix(
            &witness.matrix_a,
            &witness.exponents_r,
            &self.commitment_key,
        )?;
        if commitments_a != statement.commitments_a {
            return Err(CryptoError::WitnessInconsistent(
                "The commitments A must correspond to the witness matrix and randomness.".into(),
            ));
        }

        // Fresh leading column and masking exponents.
        let a_0 = random.gen_random_zq_vector(&zq_group, n);
        let r_0 = random.gen_random_zq_element(&zq_group);
        let mut b_values: Vec<ZqElement> = (0..2 * m)
            .map(|_| random.gen_random_zq_element(&zq_group))
            .collect();
        let mut s_values: Vec<ZqElement> = (0..2 * m)
            .map(|_| random.gen_random_zq_element(&zq_group))
            .collect();
        let mut tau_values: Vec<ZqElement> = (0..2 * m)
            .map(|_| random.gen_random_zq_element(&zq_group))
            .collect();
        b_values[m] = zq_group.identity();
        s_values[m] = zq_group.identity();
        tau_values[m] = witness.rho.clone();
        let b_vector = GroupVector::from_elements(b_values)?;
        let s_vector = GroupVector::from_elements(s_values)?;
        let tau_vector = GroupVector::from_elements(tau_values)?;

        let c_a_0 = get_commitment(&a_0, &r_0, &self.commitment_key)?;
        let c_b = get_commitment_vector(&b_vector, &s_vector, &self.commitment_key)?;

        // Diagonal ciphertexts E_k.
        let augmented_columns = augment_columns(&a_0, &witness.matrix_a)?;
        let generator = statement.group().generator();
        let mut e_values = Vec::with_capacity(2 * m);
        for k in 0..2 * m {
            let g_b_k = generator.exponentiate(&b_vector.as_slice()[k])?;
            let message = ElGamalMultiRecipientMessage::new(GroupVector::from_elements(vec![
                g_b_k;
                l
            ])?)?;
            let mut e_k = ElGamalMultiRecipientCiphertext::get_ciphertext(
                &message,
                &tau_vector.as_slice()[k],
                &self.public_key,
            )?;
            for i in 1..=m {
                if let Some(j) = (k + i).checked_sub(m) {
                    if j <= m {
                        let row = statement.ciphertext_matrix.row(i - 1)?;
                        let term =
                            ElGamalMultiRecipientCiphertext::get_ciphertext_vector_exponentiation(
                                row,
                                &augmented_columns[j],
                            )?;
                        e_k = e_k.multiply(&term)?;
                    }
                }
            }
            e_values.push(e_k);
        }
        let e = GroupVector::from_elements(e_values)?;

        let (x, _) = derive_challenge(
            self.hash,
            &zq_group,
            &self.transcript(statement, &c_a_0, &c_b, &e),
        )?;
        tracing::debug!(target: LOG_TARGET, challenge = %x.value(), "derived challenge x");
        let x_powers = powers_of(&x, 2 * m)?;

        // Blended openings.
        let mut a = a_0;
        let mut r = r_0;
        for j in 1..=m {
            let x_j = x.exponentiate(&num_bigint::BigUint::from(j));
            a = vector_add(&a, &vector_scalar_multiply(&x_j, &witness.matrix_a.column(j - 1)?)?)?;
            r = r.add(&x_j.multiply(&witness.exponents_r.as_slice()[j - 1])?)?;
        }
        let mut b = zq_group.identity();
        let mut s = zq_group.identity();
        let mut tau = zq_group.identity();
        for k in 0..2 * m {
            let x_k = &x_powers.as_slice()[k];
            b = b.add(&x_k.multiply(&b_vector.as_slice()[k])?)?;
            s = s.add(&x_k.multiply(&s_vector.as_slice()[k])?)?;
            tau = tau.add(&x_k.multiply(&tau_vector.as_slice()[k])?)?;
        }

        MultiExponentiationArgument::builder()
            .with_c_a_0(c_a_0)
            .with_c_b(c_b)
            .with_e(e)
            .with_a(a)
            .with_r(r)
            .with_b(b)
            .with_s(s)
            .with_tau(tau)
            .build()
    }

    /// Verifies a multi-exponentiation argument; all five checks run to
    /// completion.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn verify_multi_exponentiation_argument(
        &self,
        statement: &MultiExponentiationStatement,
        argument: &MultiExponentiationArgument,
    ) -> Result<VerificationResult> {
        if statement.group() != argument.group() {
            return Err(CryptoError::GroupMismatch(
                "The statement and the argument must belong to the same group.".into(),
            ));
        }
        if statement.m() != argument.m() || statement.n() != argument.n() {
            return Err(CryptoError::ShapeError(
                "The statement and the argument must have the same dimensions m and n.".into(),
            ));
        }
        if statement.l() != argument.l() {
            return Err(CryptoError::ShapeError(
                "The statement and the argument must have the same element size l.".into(),
            ));
        }

        let m = statement.m();
        let l = statement.l();
        let zq_group = ZqGroup::same_order_as(statement.group());
        let (x, _) = derive_challenge(
            self.hash,
            &zq_group,
            &self.transcript(statement, &argument.c_a_0, &argument.c_b, &argument.e),
        )?;
        let x_powers = powers_of(&x, 2 * m)?;

        let mut result = VerificationResult::verified();

        result.check(
            argument.c_b.as_slice()[m] == statement.group().identity(),
            "c_B_m must equal com(0, 0).",
        );
        result.check(
            argument.e.as_slice()[m] == statement.ciphertext_c,
            "E_m must equal C.",
        );

        // c_A_0 * prod c_A_j^{x^j} = com(a, r)
        let mut product_a = argument.c_a_0.clone();
        for j in 1..=m {
            let x_j = x.exponentiate(&num_bigint::BigUint::from(j));
            product_a =
                product_a.multiply(&statement.commitments_a.as_slice()[j - 1].exponentiate(&x_j)?)?;
        }
        let commitment_a = get_commitment(&argument.a, &argument.r, &self.commitment_key)?;
        result.check(
            product_a == commitment_a,
            "c_A_0 * prod c_A_j^{x^j} must equal com(a, r).",
        );

        // prod c_B_k^{x^k} = com(b, s)
        let mut product_b = statement.group().identity();
        for k in 0..2 * m {
            product_b = product_b
                .multiply(&argument.c_b.as_slice()[k].exponentiate(&x_powers.as_slice()[k])?)?;
        }
        let commitment_b = get_commitment(
            &GroupVector::single(argument.b.clone()),
            &argument.s,
            &self.commitment_key,
        )?;
        result.check(
            product_b == commitment_b,
            "prod c_B_k^{x^k} must equal com(b, s).",
        );

        // prod E_k^{x^k} = Enc(g^b, tau) * prod C_i^{x^{m-i} a}
        let mut product_e: Option<ElGamalMultiRecipientCiphertext> = None;
        for k in 0..2 * m {
            let term = argument.e.as_slice()[k].exponentiate(&x_powers.as_slice()[k])?;
            product_e = Some(match product_e {
                None => term,
                Some(acc) => acc.multiply(&term)?,
            });
        }
        let product_e = product_e.ok_or_else(|| {
            CryptoError::ShapeError("The argument must contain at least one E_k.".into())
        })?;

        let g_b = statement.group().generator().exponentiate(&argument.b)?;
        let message =
            ElGamalMultiRecipientMessage::new(GroupVector::from_elements(vec![g_b; l])?)?;
        let mut aggregated = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message,
            &argument.tau,
            &self.public_key,
        )?;
        for i in 1..=m {
            let x_m_minus_i = x.exponentiate(&num_bigint::BigUint::from(m - i));
            let exponents = vector_scalar_multiply(&x_m_minus_i, &argument.a)?;
            let row = statement.ciphertext_matrix.row(i - 1)?;
            let term = ElGamalMultiRecipientCiphertext::get_ciphertext_vector_exponentiation(
                row, &exponents,
            )?;
            aggregated = aggregated.multiply(&term)?;
        }
        result.check(
            product_e == aggregated,
            "prod E_k^{x^k} must equal the aggregated ciphertext.",
        );

        if !result.is_verified() {
            tracing::debug!(
                target: LOG_TARGET,
                errors = ?result.error_messages(),
                "multi-exponentiation argument verification failed"
            );
        }
        Ok(result)
    }

    /// Enc_pk(message, exponent) * prod_i C_i^{a_i} over the matrix rows and
    /// exponent columns.
    fn encrypt_and_combine(
        &self,
        message: &ElGamalMultiRecipientMessage,
        exponent: &ZqElement,
        ciphertext_matrix: &GroupMatrix<ElGamalMultiRecipientCiphertext>,
        exponent_columns: &[GroupVector<ZqElement>],
    ) -> Result<ElGamalMultiRecipientCiphertext> {
        let mut combined = ElGamalMultiRecipientCiphertext::get_ciphertext(
            message,
            exponent,
            &self.public_key,
        )?;
        for (i, column) in exponent_columns.iter().enumerate() {
            let row = ciphertext_matrix.row(i)?;
            let term = ElGamalMultiRecipientCiphertext::get_ciphertext_vector_exponentiation(
                row, column,
            )?;
            combined = combined.multiply(&term)?;
        }
        Ok(combined)
    }

    fn transcript(
        &self,
        statement: &MultiExponentiationStatement,
        c_a_0: &GqElement,
        c_b: &GroupVector<GqElement>,
        e: &GroupVector<ElGamalMultiRecipientCiphertext>,
    ) -> Vec<Hashable> {
        vec![
            self.commitment_key.to_hashable(),
            self.public_key.to_hashable(),
            statement.ciphertext_matrix.to_hashable(),
            statement.ciphertext_c.to_hashable(),
            statement.commitments_a.to_hashable(),
            c_a_0.to_hashable(),
            c_b.to_hashable(),
            e.to_hashable(),
        ]
    }
}

/// The augmented exponent columns (a_0, A_0, ..., A_{m-1}).
fn augment_columns(
    a_0: &GroupVector<ZqElement>,
    matrix_a: &GroupMatrix<ZqElement>,
) -> Result<Vec<GroupVector<ZqElement>>> {
    let mut columns = Vec::with_capacity(matrix_a.num_columns() + 1);
    columns.push(a_0.clone());
    columns.extend(matrix_a.columns()?);
    Ok(columns)
}
