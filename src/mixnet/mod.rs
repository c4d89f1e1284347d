//! The verifiable re-encryption mixnet: Pedersen commitments, permutations,
//! shuffling, and the Bayer-Groth argument system proving shuffle
//! correctness.

pub mod commitment;
pub mod commitment_key;
pub mod hadamard_argument;
pub mod multi_exponentiation_argument;
pub mod permutation;
pub mod product_argument;
pub mod shuffle;
pub mod shuffle_argument;
pub mod single_value_product_argument;
pub mod zero_argument;

mod transcript;
mod utils;

pub use commitment::{get_commitment, get_commitment_matrix, get_commitment_vector};
pub use commitment_key::{get_verifiable_commitment_key, CommitmentKey};
pub use hadamard_argument::{
    HadamardArgument, HadamardArgumentService, HadamardStatement, HadamardWitness,
};
pub use multi_exponentiation_argument::{
    MultiExponentiationArgument, MultiExponentiationArgumentService,
    MultiExponentiationStatement, MultiExponentiationWitness,
};
pub use permutation::{gen_permutation, Permutation};
pub use product_argument::{
    ProductArgument, ProductArgumentService, ProductStatement, ProductWitness,
};
pub use shuffle::{gen_shuffle, Shuffle};
pub use shuffle_argument::{
    ShuffleArgument, ShuffleArgumentService, ShuffleStatement, ShuffleWitness,
};
pub use single_value_product_argument::{
    SingleValueProductArgument, SingleValueProductArgumentService, SingleValueProductStatement,
    SingleValueProductWitness,
};
pub use zero_argument::{ZeroArgument, ZeroArgumentService, ZeroStatement, ZeroWitness};

use num_integer::Roots;

use crate::elgamal::{ElGamalMultiRecipientCiphertext, ElGamalMultiRecipientPublicKey};
use crate::error::{CryptoError, Result};
use crate::hashing::HashService;
use crate::math::group_vector::GroupVector;
use crate::random::RandomSource;
use crate::verification::VerificationResult;

/// A shuffled ciphertext batch together with the argument of its
/// correctness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiableShuffle {
    shuffled_ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
    shuffle_argument: ShuffleArgument,
}

impl VerifiableShuffle {
    pub fn new(
        shuffled_ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
        shuffle_argument: ShuffleArgument,
    ) -> Result<Self> {
        if shuffled_ciphertexts.len() != shuffle_argument.m() * shuffle_argument.n() {
            return Err(CryptoError::ShapeError(
                "The shuffled ciphertext vector's size must be N = m * n.".into(),
            ));
        }
        if shuffled_ciphertexts.element_size() != shuffle_argument.l() {
            return Err(CryptoError::ShapeError(
                "The shuffled ciphertexts' element size must be the dimension l of the shuffle argument."
                    .into(),
            ));
        }
        if shuffled_ciphertexts.group() != Some(shuffle_argument.group()) {
            return Err(CryptoError::GroupMismatch(
                "The shuffled ciphertext vector and the shuffle argument must have the same group."
                    .into(),
            ));
        }
        Ok(VerifiableShuffle {
            shuffled_ciphertexts,
            shuffle_argument,
        })
    }

    pub fn shuffled_ciphertexts(&self) -> &GroupVector<ElGamalMultiRecipientCiphertext> {
        &self.shuffled_ciphertexts
    }

    pub fn shuffle_argument(&self) -> &ShuffleArgument {
        &self.shuffle_argument
    }
}

/// Decomposes N into matrix dimensions (m, n) with N = m * n, where m is
/// the largest divisor of N not exceeding its square root. A prime N
/// degrades to (1, N).
pub fn get_matrix_dimensions(n: usize) -> (usize, usize) {
    let root = n.sqrt();
    let mut m = 1;
    for candidate in (1..=root).rev() {
        if n % candidate == 0 {
            m = candidate;
            break;
        }
    }
    (m, n / m)
}

/// Shuffles, re-encrypts and proves a ciphertext batch under the given
/// public key, deriving the commitment key verifiably from the group.
///
/// The commitment key derivation always uses the default SHA3-256 recursive
/// hasher, so every party reproduces the same key independently of the
/// challenge hash configuration.
pub fn gen_verifiable_shuffle<R: RandomSource + ?Sized>(
    ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
    public_key: &ElGamalMultiRecipientPublicKey,
    hash: &HashService,
    random: &mut R,
) -> Result<VerifiableShuffle> {
    let big_n = ciphertexts.len();
    if big_n < 2 {
        return Err(CryptoError::InvalidInput(
            "At least two ciphertexts are needed for a verifiable shuffle.".into(),
        ));
    }
    let (m, n) = get_matrix_dimensions(big_n);
    if n > public_key.size() {
        return Err(CryptoError::ShapeError(
            "The public key must be at least as large as the number of matrix columns n.".into(),
        ));
    }

    let commitment_key = get_verifiable_commitment_key(
        public_key.size(),
        public_key.group(),
        &HashService::sha3_256(),
    )?;
    let service = ShuffleArgumentService::new(public_key.clone(), commitment_key, hash)?;

    let shuffle = gen_shuffle(ciphertexts, public_key, random)?;
    let statement = ShuffleStatement::new(ciphertexts.clone(), shuffle.ciphertexts().clone())?;
    let witness = ShuffleWitness::new(
        shuffle.permutation().clone(),
        shuffle.re_encryption_exponents().clone(),
    )?;
    let shuffle_argument = service.get_shuffle_argument(&statement, &witness, m, n, random)?;

    VerifiableShuffle::new(shuffle.ciphertexts().clone(), shuffle_argument)
}

/// Verifies that a shuffled batch is a re-encrypting shuffle of the input
/// batch, re-deriving the commitment key.
pub fn verify_shuffle(
    ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
    shuffled_ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
    shuffle_argument: &ShuffleArgument,
    public_key: &ElGamalMultiRecipientPublicKey,
    hash: &HashService,
) -> Result<VerificationResult> {
    let (m, n) = get_matrix_dimensions(ciphertexts.len());
    let commitment_key = get_verifiable_commitment_key(
        public_key.size(),
        public_key.group(),
        &HashService::sha3_256(),
    )?;
    let service = ShuffleArgumentService::new(public_key.clone(), commitment_key, hash)?;
    let statement = ShuffleStatement::new(ciphertexts.clone(), shuffled_ciphertexts.clone())?;
    service.verify_shuffle_argument(&statement, shuffle_argument, m, n)
}
