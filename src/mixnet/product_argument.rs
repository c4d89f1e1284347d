//! Product argument.
//!
//! Proves that the product of all elements of a committed matrix A equals a
//! public value b. For m >= 2 columns the prover commits to the vector of
//! row products, ties it to A with a Hadamard argument and to b with a
//! single value product argument; for m = 1 the single value product
//! argument alone carries the claim.

use crate::elgamal::ElGamalMultiRecipientPublicKey;
use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::group_matrix::GroupMatrix;
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::{GqElement, GqGroup};
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::mixnet::commitment::{get_commitment, get_commitment_matrix};
use crate::mixnet::commitment_key::CommitmentKey;
use crate::mixnet::hadamard_argument::{
    HadamardArgument, HadamardArgumentService, HadamardStatement, HadamardWitness,
};
use crate::mixnet::single_value_product_argument::{
    SingleValueProductArgument, SingleValueProductArgumentService, SingleValueProductStatement,
    SingleValueProductWitness,
};
use crate::mixnet::transcript::check_challenge_length;
use crate::random::RandomSource;
use crate::verification::VerificationResult;

const LOG_TARGET: &str = "zk_mixnet::mixnet::product_argument";

/// Statement (c_A, b): the column commitments of A and the claimed product
/// of all matrix elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductStatement {
    commitments_a: GroupVector<GqElement>,
    product: ZqElement,
}

impl ProductStatement {
    pub fn new(commitments_a: GroupVector<GqElement>, product: ZqElement) -> Result<Self> {
        if commitments_a.is_empty() {
            return Err(CryptoError::InvalidInput(
                "The commitments to A must not be empty.".into(),
            ));
        }
        let group = commitments_a.as_slice()[0].group();
        if !group.has_same_order_as(product.group()) {
            return Err(CryptoError::GroupMismatch(
                "The commitments and the product must have the same group order.".into(),
            ));
        }
        Ok(ProductStatement {
            commitments_a,
            product,
        })
    }

    pub fn m(&self) -> usize {
        self.commitments_a.len()
    }

    pub fn group(&self) -> &GqGroup {
        self.commitments_a.as_slice()[0].group()
    }
}

/// Witness (A, r): the matrix and the randomness of its column commitments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductWitness {
    matrix_a: GroupMatrix<ZqElement>,
    exponents_r: GroupVector<ZqElement>,
}

impl ProductWitness {
    pub fn new(
        matrix_a: GroupMatrix<ZqElement>,
        exponents_r: GroupVector<ZqElement>,
    ) -> Result<Self> {
        if exponents_r.len() != matrix_a.num_columns() {
            return Err(CryptoError::ShapeError(
                "There must be one exponent per matrix column.".into(),
            ));
        }
        if Some(matrix_a.group()) != exponents_r.group() {
            return Err(CryptoError::GroupMismatch(
                "The witness matrix and exponents must belong to the same group.".into(),
            ));
        }
        Ok(ProductWitness {
            matrix_a,
            exponents_r,
        })
    }
}

/// The product argument: for m >= 2 the triple
/// (c_b, Hadamard argument, single value product argument), for m = 1 the
/// single value product argument alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductArgument {
    commitment_b: Option<GqElement>,
    hadamard_argument: Option<HadamardArgument>,
    single_value_product_argument: SingleValueProductArgument,
}

impl ProductArgument {
    /// The composed form used for matrices of at least two columns.
    pub fn new(
        commitment_b: GqElement,
        hadamard_argument: HadamardArgument,
        single_value_product_argument: SingleValueProductArgument,
    ) -> Result<Self> {
        if hadamard_argument.group() != commitment_b.group()
            || single_value_product_argument.group() != commitment_b.group()
        {
            return Err(CryptoError::GroupMismatch(
                "The commitment b and the sub-arguments must belong to the same group.".into(),
            ));
        }
        Ok(ProductArgument {
            commitment_b: Some(commitment_b),
            hadamard_argument: Some(hadamard_argument),
            single_value_product_argument,
        })
    }

    /// The degenerate single-column form.
    pub fn from_single_value_product_argument(
        single_value_product_argument: SingleValueProductArgument,
    ) -> Self {
        ProductArgument {
            commitment_b: None,
            hadamard_argument: None,
            single_value_product_argument,
        }
    }

    pub fn m(&self) -> usize {
        self.hadamard_argument
            .as_ref()
            .map(HadamardArgument::m)
            .unwrap_or(1)
    }

    pub fn n(&self) -> usize {
        self.single_value_product_argument.n()
    }

    pub fn group(&self) -> &GqGroup {
        self.single_value_product_argument.group()
    }
}

impl ToHashable for ProductArgument {
    fn to_hashable(&self) -> Hashable {
        match (&self.commitment_b, &self.hadamard_argument) {
            (Some(commitment_b), Some(hadamard_argument)) => Hashable::List(vec![
                commitment_b.to_hashable(),
                hadamard_argument.to_hashable(),
                self.single_value_product_argument.to_hashable(),
            ]),
            _ => Hashable::List(vec![self.single_value_product_argument.to_hashable()]),
        }
    }
}

/// Prover and verifier of product arguments.
pub struct ProductArgumentService<'a> {
    commitment_key: CommitmentKey,
    hadamard_argument_service: HadamardArgumentService<'a>,
    single_value_product_argument_service: SingleValueProductArgumentService<'a>,
}

impl<'a> ProductArgumentService<'a> {
    pub fn new(
        public_key: ElGamalMultiRecipientPublicKey,
        commitment_key: CommitmentKey,
        hash: &'a HashService,
    ) -> Result<Self> {
        check_challenge_length(hash, commitment_key.group().q())?;
        Ok(ProductArgumentService {
            commitment_key: commitment_key.clone(),
            hadamard_argument_service: HadamardArgumentService::new(
                public_key,
                commitment_key.clone(),
                hash,
            )?,
            single_value_product_argument_service: SingleValueProductArgumentService::new(
                commitment_key,
                hash,
            )?,
        })
    }

    /// Produces a product argument. For m >= 2 a single randomness value for
    /// c_b is drawn first, followed by the Hadamard and single value product
    /// draws; for m = 1 only the single value product draws occur.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn get_product_argument<R: RandomSource + ?Sized>(
        &self,
        statement: &ProductStatement,
        witness: &ProductWitness,
        random: &mut R,
    ) -> Result<ProductArgument> {
        let m = witness.matrix_a.num_columns();
        let n = witness.matrix_a.num_rows();
        if statement.m() != m {
            return Err(CryptoError::ShapeError(
                "The statement and the witness must have the same dimension m.".into(),
            ));
        }
        if n < 2 {
            return Err(CryptoError::InvalidInput(
                "The matrix must have at least 2 rows.".into(),
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
                "The statement and the witness must have the same group order.".into(),
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
                "The commitments A must correspond to the witness matrix and randomness.".into(),
            ));
        }
        let mut product = zq_group.one();
        for element in witness.matrix_a.flat_iter() {
            product = product.multiply(element)?;
        }
        if product != statement.product {
            return Err(CryptoError::WitnessInconsistent(
                "The product of all elements of the matrix A must be equal to b.".into(),
            ));
        }

        if m >= 2 {
            // Row products b_i = prod_j A_{i,j}, committed with fresh s.
            let s = random.gen_random_zq_element(&zq_group);
            let mut row_products = Vec::with_capacity(n);
            for i in 0..n {
                let row = witness.matrix_a.row(i)?;
                let mut value = zq_group.one();
                for a_ij in row.iter() {
                    value = value.multiply(a_ij)?;
                }
                row_products.push(value);
            }
            let vector_b = GroupVector::from_elements(row_products)?;
            let commitment_b = get_commitment(&vector_b, &s, &self.commitment_key)?;

            let hadamard_statement =
                HadamardStatement::new(statement.commitments_a.clone(), commitment_b.clone())?;
            let hadamard_witness = HadamardWitness::new(
                witness.matrix_a.clone(),
                vector_b.clone(),
                witness.exponents_r.clone(),
                s.clone(),
            )?;
            let hadamard_argument = self.hadamard_argument_service.get_hadamard_argument(
                &hadamard_statement,
                &hadamard_witness,
                random,
            )?;

            let svp_statement =
                SingleValueProductStatement::new(commitment_b.clone(), statement.product.clone())?;
            let svp_witness = SingleValueProductWitness::new(vector_b, s)?;
            let svp_argument = self
                .single_value_product_argument_service
                .get_single_value_product_argument(&svp_statement, &svp_witness, random)?;

            ProductArgument::new(commitment_b, hadamard_argument, svp_argument)
        } else {
            let svp_statement = SingleValueProductStatement::new(
                statement.commitments_a.as_slice()[0].clone(),
                statement.product.clone(),
            )?;
            let svp_witness = SingleValueProductWitness::new(
                witness.matrix_a.column(0)?,
                witness.exponents_r.as_slice()[0].clone(),
            )?;
            let svp_argument = self
                .single_value_product_argument_service
                .get_single_value_product_argument(&svp_statement, &svp_witness, random)?;
            Ok(ProductArgument::from_single_value_product_argument(
                svp_argument,
            ))
        }
    }

    /// Verifies a product argument by verifying its sub-arguments.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn verify_product_argument(
        &self,
        statement: &ProductStatement,
        argument: &ProductArgument,
    ) -> Result<VerificationResult> {
        if statement.group() != argument.group() {
            return Err(CryptoError::GroupMismatch(
                "The statement and the argument must belong to the same group.".into(),
            ));
        }
        if statement.m() != argument.m() {
            return Err(CryptoError::ShapeError(
                "The statement and the argument must have the same dimension m.".into(),
            ));
        }

        match (&argument.commitment_b, &argument.hadamard_argument) {
            (Some(commitment_b), Some(hadamard_argument)) => {
                let hadamard_statement = HadamardStatement::new(
                    statement.commitments_a.clone(),
                    commitment_b.clone(),
                )?;
                let hadamard_result = self
                    .hadamard_argument_service
                    .verify_hadamard_argument(&hadamard_statement, hadamard_argument)?
                    .with_context("Hadamard argument");

                let svp_statement = SingleValueProductStatement::new(
                    commitment_b.clone(),
                    statement.product.clone(),
                )?;
                let svp_result = self
                    .single_value_product_argument_service
                    .verify_single_value_product_argument(
                        &svp_statement,
                        &argument.single_value_product_argument,
                    )?
                    .with_context("Single value product argument");

                Ok(hadamard_result.and(svp_result))
            }
            _ => {
                if statement.m() != 1 {
                    return Err(CryptoError::ShapeError(
                        "A product argument without a Hadamard argument requires m = 1.".into(),
                    ));
                }
                let svp_statement = SingleValueProductStatement::new(
                    statement.commitments_a.as_slice()[0].clone(),
                    statement.product.clone(),
                )?;
                let result = self
                    .single_value_product_argument_service
                    .verify_single_value_product_argument(
                        &svp_statement,
                        &argument.single_value_product_argument,
                    )?
                    .with_context("Single value product argument");
                Ok(result)
            }
        }
    }
}
