//! Shuffle argument.
//!
//! Proves that a batch of ciphertexts C' is a re-encryption and permutation
//! of a batch C under a known public key:
//!
//!     C'_i = Enc_pk(ones, rho_i) * C_{pi(i)}
//!
//! The prover commits to the permutation values pi(i) + 1 (c_A), receives a
//! challenge x, commits to the powers x^{pi(i)+1} (c_B), and receives two
//! further challenges y and z. A product argument over the blended
//! commitments c_A^y o c_B, shifted by com(-z, 0), proves that the committed
//! exponents are a permutation of 1..N; a multi-exponentiation argument
//! over the shuffled ciphertexts proves that prod C_k^{x^{k+1}} is a
//! re-encryption of prod (C'_i)^{x^{pi(i)+1}}. Together these yield the
//! shuffle relation without revealing pi or rho.

use num_bigint::BigUint;

use crate::elgamal::{
    ElGamalMultiRecipientCiphertext, ElGamalMultiRecipientMessage, ElGamalMultiRecipientPublicKey,
};
use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::group_matrix::GroupMatrix;
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::{GqElement, GqGroup};
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::mixnet::commitment::{get_commitment, get_commitment_matrix};
use crate::mixnet::commitment_key::CommitmentKey;
use crate::mixnet::multi_exponentiation_argument::{
    MultiExponentiationArgument, MultiExponentiationArgumentService,
    MultiExponentiationStatement, MultiExponentiationWitness,
};
use crate::mixnet::permutation::Permutation;
use crate::mixnet::product_argument::{
    ProductArgument, ProductArgumentService, ProductStatement, ProductWitness,
};
use crate::mixnet::transcript::{check_challenge_length, derive_chained_challenge, derive_challenge};
use crate::mixnet::utils::{constant_vector, dot_product, powers_of};
use crate::random::RandomSource;
use crate::verification::VerificationResult;

const LOG_TARGET: &str = "zk_mixnet::mixnet::shuffle_argument";

/// Statement (C, C'): the input and the shuffled ciphertext batches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleStatement {
    ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
    shuffled_ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
}

impl ShuffleStatement {
    pub fn new(
        ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
        shuffled_ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
    ) -> Result<Self> {
        if ciphertexts.is_empty() {
            return Err(CryptoError::InvalidInput(
                "The ciphertext vectors must not be empty.".into(),
            ));
        }
        if ciphertexts.len() != shuffled_ciphertexts.len() {
            return Err(CryptoError::ShapeError(
                "The ciphertexts and shuffled ciphertexts vectors must have the same size.".into(),
            ));
        }
        if ciphertexts.element_size() != shuffled_ciphertexts.element_size() {
            return Err(CryptoError::ShapeError(
                "The ciphertexts and shuffled ciphertexts must have the same element size.".into(),
            ));
        }
        if ciphertexts.group() != shuffled_ciphertexts.group() {
            return Err(CryptoError::GroupMismatch(
                "The ciphertexts and shuffled ciphertexts must belong to the same group.".into(),
            ));
        }
        Ok(ShuffleStatement {
            ciphertexts,
            shuffled_ciphertexts,
        })
    }

    pub fn n(&self) -> usize {
        self.ciphertexts.len()
    }

    pub fn l(&self) -> usize {
        self.ciphertexts.element_size()
    }

    pub fn ciphertexts(&self) -> &GroupVector<ElGamalMultiRecipientCiphertext> {
        &self.ciphertexts
    }

    pub fn shuffled_ciphertexts(&self) -> &GroupVector<ElGamalMultiRecipientCiphertext> {
        &self.shuffled_ciphertexts
    }
}

/// Witness (pi, rho): the permutation and the re-encryption exponents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleWitness {
    permutation: Permutation,
    randomness: GroupVector<ZqElement>,
}

impl ShuffleWitness {
    pub fn new(permutation: Permutation, randomness: GroupVector<ZqElement>) -> Result<Self> {
        if permutation.size() != randomness.len() {
            return Err(CryptoError::ShapeError(
                "The permutation and the randomness must have the same size.".into(),
            ));
        }
        Ok(ShuffleWitness {
            permutation,
            randomness,
        })
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn randomness(&self) -> &GroupVector<ZqElement> {
        &self.randomness
    }
}

/// The shuffle argument (c_A, c_B, product argument, multi-exponentiation
/// argument).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleArgument {
    commitments_a: GroupVector<GqElement>,
    commitments_b: GroupVector<GqElement>,
    product_argument: ProductArgument,
    multi_exponentiation_argument: MultiExponentiationArgument,
}

impl ShuffleArgument {
    pub fn builder() -> ShuffleArgumentBuilder {
        ShuffleArgumentBuilder::default()
    }

    pub fn m(&self) -> usize {
        self.commitments_a.len()
    }

    pub fn n(&self) -> usize {
        self.multi_exponentiation_argument.n()
    }

    pub fn l(&self) -> usize {
        self.multi_exponentiation_argument.l()
    }

    pub fn group(&self) -> &GqGroup {
        self.multi_exponentiation_argument.group()
    }
}

impl ToHashable for ShuffleArgument {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            self.commitments_a.to_hashable(),
            self.commitments_b.to_hashable(),
            self.product_argument.to_hashable(),
            self.multi_exponentiation_argument.to_hashable(),
        ])
    }
}

/// Builder validating the cross-argument dimension and group invariants
/// once, at build time.
#[derive(Default)]
pub struct ShuffleArgumentBuilder {
    commitments_a: Option<GroupVector<GqElement>>,
    commitments_b: Option<GroupVector<GqElement>>,
    product_argument: Option<ProductArgument>,
    multi_exponentiation_argument: Option<MultiExponentiationArgument>,
}

impl ShuffleArgumentBuilder {
    pub fn with_commitments_a(mut self, commitments_a: GroupVector<GqElement>) -> Self {
        self.commitments_a = Some(commitments_a);
        self
    }

    pub fn with_commitments_b(mut self, commitments_b: GroupVector<GqElement>) -> Self {
        self.commitments_b = Some(commitments_b);
        self
    }

    pub fn with_product_argument(mut self, product_argument: ProductArgument) -> Self {
        self.product_argument = Some(product_argument);
        self
    }

    pub fn with_multi_exponentiation_argument(
        mut self,
        multi_exponentiation_argument: MultiExponentiationArgument,
    ) -> Self {
        self.multi_exponentiation_argument = Some(multi_exponentiation_argument);
        self
    }

    pub fn build(self) -> Result<ShuffleArgument> {
        let commitments_a = self.commitments_a.ok_or_else(|| {
            CryptoError::InvalidInput("The field commitments_a must be set.".into())
        })?;
        let commitments_b = self.commitments_b.ok_or_else(|| {
            CryptoError::InvalidInput("The field commitments_b must be set.".into())
        })?;
        let product_argument = self.product_argument.ok_or_else(|| {
            CryptoError::InvalidInput("The field product_argument must be set.".into())
        })?;
        let multi_exponentiation_argument =
            self.multi_exponentiation_argument.ok_or_else(|| {
                CryptoError::InvalidInput(
                    "The field multi_exponentiation_argument must be set.".into(),
                )
            })?;

        let group = multi_exponentiation_argument.group();
        if commitments_a.group() != Some(group)
            || commitments_b.group() != Some(group)
            || product_argument.group() != group
        {
            return Err(CryptoError::GroupMismatch(
                "The commitments c_A, c_B, the product and the multi exponentiation arguments must belong to the same group."
                    .into(),
            ));
        }
        let m = commitments_a.len();
        if commitments_b.len() != m
            || product_argument.m() != m
            || multi_exponentiation_argument.m() != m
        {
            return Err(CryptoError::ShapeError(
                "The commitments c_A, c_B and the product and multi exponentiation arguments must have the same dimension m."
                    .into(),
            ));
        }
        if product_argument.n() != multi_exponentiation_argument.n() {
            return Err(CryptoError::ShapeError(
                "The product and multi exponentiation arguments must have the same dimension n."
                    .into(),
            ));
        }
        Ok(ShuffleArgument {
            commitments_a,
            commitments_b,
            product_argument,
            multi_exponentiation_argument,
        })
    }
}

/// Prover and verifier of shuffle arguments, bound to a public key, a
/// commitment key of the same size and a hash service.
pub struct ShuffleArgumentService<'a> {
    public_key: ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    hash: &'a HashService,
    product_argument_service: ProductArgumentService<'a>,
    multi_exponentiation_argument_service: MultiExponentiationArgumentService<'a>,
}

impl<'a> ShuffleArgumentService<'a> {
    pub fn new(
        public_key: ElGamalMultiRecipientPublicKey,
        commitment_key: CommitmentKey,
        hash: &'a HashService,
    ) -> Result<Self> {
        if public_key.group() != commitment_key.group() {
            return Err(CryptoError::GroupMismatch(
                "The public key and commitment key must belong to the same group.".into(),
            ));
        }
        if public_key.size() != commitment_key.size() {
            return Err(CryptoError::ShapeError(
                "The commitment key and public key must be of the same size.".into(),
            ));
        }
        check_challenge_length(hash, commitment_key.group().q())?;
        Ok(ShuffleArgumentService {
            public_key: public_key.clone(),
            commitment_key: commitment_key.clone(),
            hash,
            product_argument_service: ProductArgumentService::new(
                public_key.clone(),
                commitment_key.clone(),
                hash,
            )?,
            multi_exponentiation_argument_service: MultiExponentiationArgumentService::new(
                public_key,
                commitment_key,
                hash,
            )?,
        })
    }

    /// Produces a shuffle argument for N = m * n ciphertexts.
    ///
    /// Draws, in order: the m commitment randomness values r for c_A, the m
    /// values s for c_B, then the draws of the product and
    /// multi-exponentiation arguments.
    #[tracing::instrument(target = LOG_TARGET, skip_all, fields(m, n))]
    pub fn get_shuffle_argument<R: RandomSource + ?Sized>(
        &self,
        statement: &ShuffleStatement,
        witness: &ShuffleWitness,
        m: usize,
        n: usize,
        random: &mut R,
    ) -> Result<ShuffleArgument> {
        if m == 0 {
            return Err(CryptoError::InvalidInput(
                "The number of rows for the ciphertext matrices must be strictly positive.".into(),
            ));
        }
        if n == 0 {
            return Err(CryptoError::InvalidInput(
                "The number of columns for the ciphertext matrices must be strictly positive."
                    .into(),
            ));
        }
        let big_n = statement.n();
        if big_n != m * n {
            return Err(CryptoError::ShapeError(format!(
                "The ciphertexts vectors must be decomposable into m * n matrices: {big_n} != {m} * {n}."
            )));
        }
        if big_n != witness.permutation.size() {
            return Err(CryptoError::ShapeError(
                "The statement ciphertexts must have the same size as the permutation.".into(),
            ));
        }
        let group = self.public_key.group().clone();
        let zq_group = ZqGroup::same_order_as(&group);
        if witness.randomness.group() != Some(&zq_group) {
            return Err(CryptoError::GroupMismatch(
                "The randomness group must have the order of the ciphertexts group.".into(),
            ));
        }
        if statement.ciphertexts.group() != Some(&group) {
            return Err(CryptoError::GroupMismatch(
                "The ciphertexts must belong to the public key's group.".into(),
            ));
        }
        if statement.l() > self.public_key.size() {
            return Err(CryptoError::ShapeError(
                "The ciphertexts must be smaller than the public key.".into(),
            ));
        }
        if big_n < 2 || BigUint::from(big_n) > group.q() - BigUint::from(3u8) {
            return Err(CryptoError::InvalidInput(
                "The number of ciphertexts must be in [2, q - 3].".into(),
            ));
        }

        // The witness must reproduce the shuffled batch.
        let ones = ElGamalMultiRecipientMessage::ones(&group, statement.l())?;
        for i in 0..big_n {
            let rho_i = &witness.randomness.as_slice()[i];
            let re_encrypted =
                ElGamalMultiRecipientCiphertext::get_ciphertext(&ones, rho_i, &self.public_key)?
                    .multiply(&statement.ciphertexts.as_slice()[witness.permutation.get(i)?])?;
            if re_encrypted != statement.shuffled_ciphertexts.as_slice()[i] {
                return Err(CryptoError::WitnessInconsistent(
                    "The shuffled ciphertexts provided in the statement do not correspond to the re-encryption and shuffle of C under pi and rho."
                        .into(),
                ));
            }
        }

        // Commit to the permutation values pi(i) + 1.
        let a_vector = GroupVector::from_elements(
            witness
                .permutation
                .iter()
                .map(|value| ZqElement::reduced(BigUint::from(value + 1), &zq_group))
                .collect(),
        )?;
        let matrix_a = a_vector.to_matrix(n, m)?;
        let exponents_r = random.gen_random_zq_vector(&zq_group, m);
        let commitments_a = get_commitment_matrix(&matrix_a, &exponents_r, &self.commitment_key)?;

        let (x, _) = derive_challenge(
            self.hash,
            &zq_group,
            &self.transcript_x(statement, &commitments_a),
        )?;

        // Commit to the challenge powers x^{pi(i)+1}.
        let b_vector = GroupVector::from_elements(
            witness
                .permutation
                .iter()
                .map(|value| x.exponentiate(&BigUint::from(value + 1)))
                .collect(),
        )?;
        let matrix_b = b_vector.to_matrix(n, m)?;
        let exponents_s = random.gen_random_zq_vector(&zq_group, m);
        let commitments_b = get_commitment_matrix(&matrix_b, &exponents_s, &self.commitment_key)?;

        let transcript_yz = self.transcript_yz(statement, &commitments_a, &commitments_b);
        let (y, y_digest) = derive_challenge(self.hash, &zq_group, &transcript_yz)?;
        let (z, _) = derive_chained_challenge(self.hash, &zq_group, &y_digest, &transcript_yz)?;
        tracing::debug!(
            target: LOG_TARGET,
            x = %x.value(),
            y = %y.value(),
            z = %z.value(),
            "derived challenges"
        );

        // Product argument over D - z with D = yA + B, t = yr + s.
        let product_statement = build_product_statement(
            &commitments_a,
            &commitments_b,
            &x,
            &y,
            &z,
            big_n,
            n,
            &self.commitment_key,
        )?;
        let matrix_d_minus_z = blend_matrices(&matrix_a, &matrix_b, &y, &z)?;
        let mut exponents_t = Vec::with_capacity(m);
        for i in 0..m {
            exponents_t.push(
                y.multiply(&exponents_r.as_slice()[i])?
                    .add(&exponents_s.as_slice()[i])?,
            );
        }
        let product_witness = ProductWitness::new(
            matrix_d_minus_z,
            GroupVector::from_elements(exponents_t)?,
        )?;
        let product_argument = self.product_argument_service.get_product_argument(
            &product_statement,
            &product_witness,
            random,
        )?;

        // Multi-exponentiation argument over the shuffled ciphertexts.
        let multi_exp_statement = build_multi_exponentiation_statement(
            statement,
            &commitments_b,
            &x,
            m,
            n,
        )?;
        let rho = dot_product(&witness.randomness, &b_vector)?.negate();
        let multi_exp_witness =
            MultiExponentiationWitness::new(matrix_b, exponents_s, rho)?;
        let multi_exponentiation_argument = self
            .multi_exponentiation_argument_service
            .get_multi_exponentiation_argument(&multi_exp_statement, &multi_exp_witness, random)?;

        ShuffleArgument::builder()
            .with_commitments_a(commitments_a)
            .with_commitments_b(commitments_b)
            .with_product_argument(product_argument)
            .with_multi_exponentiation_argument(multi_exponentiation_argument)
            .build()
    }

    /// Verifies a shuffle argument. Dimension inconsistencies abort before
    /// the sub-verifications; the algebraic outcomes accumulate.
    #[tracing::instrument(target = LOG_TARGET, skip_all, fields(m, n))]
    pub fn verify_shuffle_argument(
        &self,
        statement: &ShuffleStatement,
        argument: &ShuffleArgument,
        m: usize,
        n: usize,
    ) -> Result<VerificationResult> {
        if m == 0 || n == 0 {
            return Err(CryptoError::InvalidInput(
                "The dimensions m and n must be strictly positive.".into(),
            ));
        }
        if statement.n() != m * n {
            return Err(CryptoError::ShapeError(
                "The ciphertexts vectors must be decomposable into m * n matrices.".into(),
            ));
        }
        if argument.m() != m || argument.n() != n {
            return Err(CryptoError::ShapeError(
                "The statement and the argument must have the same dimensions m and n.".into(),
            ));
        }
        if argument.l() != statement.l() {
            return Err(CryptoError::ShapeError(
                "The statement and the argument must have the same element size l.".into(),
            ));
        }
        if statement.ciphertexts.group() != Some(argument.group()) {
            return Err(CryptoError::GroupMismatch(
                "The statement and the argument must belong to the same group.".into(),
            ));
        }
        if argument.group() != self.public_key.group() {
            return Err(CryptoError::GroupMismatch(
                "The argument must belong to the public key's group.".into(),
            ));
        }

        let group = self.public_key.group().clone();
        let zq_group = ZqGroup::same_order_as(&group);
        let big_n = statement.n();

        let (x, _) = derive_challenge(
            self.hash,
            &zq_group,
            &self.transcript_x(statement, &argument.commitments_a),
        )?;
        let transcript_yz =
            self.transcript_yz(statement, &argument.commitments_a, &argument.commitments_b);
        let (y, y_digest) = derive_challenge(self.hash, &zq_group, &transcript_yz)?;
        let (z, _) = derive_chained_challenge(self.hash, &zq_group, &y_digest, &transcript_yz)?;

        let product_statement = build_product_statement(
            &argument.commitments_a,
            &argument.commitments_b,
            &x,
            &y,
            &z,
            big_n,
            n,
            &self.commitment_key,
        )?;
        let product_result = self
            .product_argument_service
            .verify_product_argument(&product_statement, &argument.product_argument)?
            .with_context("Product argument");

        let multi_exp_statement = build_multi_exponentiation_statement(
            statement,
            &argument.commitments_b,
            &x,
            m,
            n,
        )?;
        let multi_exp_result = self
            .multi_exponentiation_argument_service
            .verify_multi_exponentiation_argument(
                &multi_exp_statement,
                &argument.multi_exponentiation_argument,
            )?
            .with_context("Multi-exponentiation argument");

        Ok(product_result.and(multi_exp_result))
    }

    fn transcript_x(
        &self,
        statement: &ShuffleStatement,
        commitments_a: &GroupVector<GqElement>,
    ) -> Vec<Hashable> {
        vec![
            self.commitment_key.to_hashable(),
            self.public_key.to_hashable(),
            statement.ciphertexts.to_hashable(),
            statement.shuffled_ciphertexts.to_hashable(),
            commitments_a.to_hashable(),
        ]
    }

    fn transcript_yz(
        &self,
        statement: &ShuffleStatement,
        commitments_a: &GroupVector<GqElement>,
        commitments_b: &GroupVector<GqElement>,
    ) -> Vec<Hashable> {
        vec![
            self.commitment_key.to_hashable(),
            self.public_key.to_hashable(),
            statement.ciphertexts.to_hashable(),
            statement.shuffled_ciphertexts.to_hashable(),
            commitments_a.to_hashable(),
            commitments_b.to_hashable(),
        ]
    }
}

/// The derived product statement: commitments c_A_i^y * c_B_i * com(-z, 0)
/// and the public product prod_{k=1}^{N} (y k + x^k - z).
#[allow(clippy::too_many_arguments)]
fn build_product_statement(
    commitments_a: &GroupVector<GqElement>,
    commitments_b: &GroupVector<GqElement>,
    x: &ZqElement,
    y: &ZqElement,
    z: &ZqElement,
    big_n: usize,
    n: usize,
    commitment_key: &CommitmentKey,
) -> Result<ProductStatement> {
    let zq_group = y.group().clone();
    let minus_z = constant_vector(&z.negate(), n);
    let commitment_minus_z =
        get_commitment(&minus_z, &zq_group.identity(), commitment_key)?;

    let commitments = commitments_a
        .iter()
        .zip(commitments_b.iter())
        .map(|(c_a, c_b)| {
            c_a.exponentiate(y)?
                .multiply(c_b)?
                .multiply(&commitment_minus_z)
        })
        .collect::<Result<Vec<_>>>()?;

    let x_powers = powers_of(x, big_n + 1)?;
    let mut product = zq_group.one();
    for k in 1..=big_n {
        let term = y
            .multiply(&ZqElement::reduced(BigUint::from(k), &zq_group))?
            .add(&x_powers.as_slice()[k])?
            .subtract(z)?;
        product = product.multiply(&term)?;
    }

    ProductStatement::new(GroupVector::from_elements(commitments)?, product)
}

/// The matrix yA + B - z, the opening of the derived product statement.
fn blend_matrices(
    matrix_a: &GroupMatrix<ZqElement>,
    matrix_b: &GroupMatrix<ZqElement>,
    y: &ZqElement,
    z: &ZqElement,
) -> Result<GroupMatrix<ZqElement>> {
    let rows = (0..matrix_a.num_rows())
        .map(|i| {
            let row_a = matrix_a.row(i)?;
            let row_b = matrix_b.row(i)?;
            GroupVector::from_elements(
                row_a
                    .iter()
                    .zip(row_b.iter())
                    .map(|(a, b)| y.multiply(a)?.add(b)?.subtract(z))
                    .collect::<Result<Vec<_>>>()?,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    GroupMatrix::from_rows(rows)
}

/// The derived multi-exponentiation statement: the shuffled ciphertexts
/// arranged in m rows of n, the x-weighted product of the input batch and
/// the commitments c_B.
fn build_multi_exponentiation_statement(
    statement: &ShuffleStatement,
    commitments_b: &GroupVector<GqElement>,
    x: &ZqElement,
    m: usize,
    n: usize,
) -> Result<MultiExponentiationStatement> {
    let ciphertext_matrix = statement
        .shuffled_ciphertexts
        .to_matrix(n, m)?
        .transpose()?;

    let x_powers_from_one = GroupVector::from_elements(
        (0..statement.n())
            .map(|k| x.exponentiate(&BigUint::from(k + 1)))
            .collect(),
    )?;
    let ciphertext_c = ElGamalMultiRecipientCiphertext::get_ciphertext_vector_exponentiation(
        &statement.ciphertexts,
        &x_powers_from_one,
    )?;

    MultiExponentiationStatement::new(ciphertext_matrix, ciphertext_c, commitments_b.clone())
}
