//! Single value product argument.
//!
//! Proves knowledge of an opening (a, r) of a committed vector c_a such that
//! the product of the committed elements equals a public value b:
//!
//!     c_a = com(a, r)    and    a_1 * a_2 * ... * a_n = b
//!
//! One round: the prover commits to a blinding vector d and to two vectors
//! tying the partial products of a to those of d, receives the Fiat-Shamir
//! challenge x, and answers with the x-blended openings.

use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::{GqElement, GqGroup};
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::mixnet::commitment::get_commitment;
use crate::mixnet::commitment_key::CommitmentKey;
use crate::mixnet::transcript::{check_challenge_length, derive_challenge};
use crate::random::RandomSource;
use crate::verification::VerificationResult;

const LOG_TARGET: &str = "zk_mixnet::mixnet::single_value_product_argument";

/// Statement (c_a, b): a commitment and the claimed product of its opening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleValueProductStatement {
    commitment: GqElement,
    product: ZqElement,
}

impl SingleValueProductStatement {
    pub fn new(commitment: GqElement, product: ZqElement) -> Result<Self> {
        if !commitment.group().has_same_order_as(product.group()) {
            return Err(CryptoError::GroupMismatch(
                "The group of the commitment and the group of the product must have the same order."
                    .into(),
            ));
        }
        Ok(SingleValueProductStatement {
            commitment,
            product,
        })
    }

    pub fn commitment(&self) -> &GqElement {
        &self.commitment
    }

    pub fn product(&self) -> &ZqElement {
        &self.product
    }
}

/// Witness (a, r): the committed elements and the commitment randomness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleValueProductWitness {
    elements: GroupVector<ZqElement>,
    randomness: ZqElement,
}

impl SingleValueProductWitness {
    pub fn new(elements: GroupVector<ZqElement>, randomness: ZqElement) -> Result<Self> {
        if elements.len() < 2 {
            return Err(CryptoError::InvalidInput(
                "The size n of the witness must be at least 2.".into(),
            ));
        }
        if elements.group() != Some(randomness.group()) {
            return Err(CryptoError::GroupMismatch(
                "The witness elements and randomness must belong to the same group.".into(),
            ));
        }
        Ok(SingleValueProductWitness {
            elements,
            randomness,
        })
    }

    pub fn elements(&self) -> &GroupVector<ZqElement> {
        &self.elements
    }

    pub fn randomness(&self) -> &ZqElement {
        &self.randomness
    }
}

/// The single value product argument
/// (c_d, c_delta, c_Delta, a~, b~, r~, s~).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleValueProductArgument {
    c_d: GqElement,
    c_lower_delta: GqElement,
    c_upper_delta: GqElement,
    a_tilde: GroupVector<ZqElement>,
    b_tilde: GroupVector<ZqElement>,
    r_tilde: ZqElement,
    s_tilde: ZqElement,
}

impl SingleValueProductArgument {
    pub fn builder() -> SingleValueProductArgumentBuilder {
        SingleValueProductArgumentBuilder::default()
    }

    /// The dimension n of the response vectors.
    pub fn n(&self) -> usize {
        self.a_tilde.len()
    }

    pub fn group(&self) -> &GqGroup {
        self.c_d.group()
    }
}

impl ToHashable for SingleValueProductArgument {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            self.c_d.to_hashable(),
            self.c_lower_delta.to_hashable(),
            self.c_upper_delta.to_hashable(),
            self.a_tilde.to_hashable(),
            self.b_tilde.to_hashable(),
            self.r_tilde.to_hashable(),
            self.s_tilde.to_hashable(),
        ])
    }
}

/// Builder validating all cross-field invariants once, at build time.
#[derive(Default)]
pub struct SingleValueProductArgumentBuilder {
    c_d: Option<GqElement>,
    c_lower_delta: Option<GqElement>,
    c_upper_delta: Option<GqElement>,
    a_tilde: Option<GroupVector<ZqElement>>,
    b_tilde: Option<GroupVector<ZqElement>>,
    r_tilde: Option<ZqElement>,
    s_tilde: Option<ZqElement>,
}

impl SingleValueProductArgumentBuilder {
    pub fn with_c_d(mut self, c_d: GqElement) -> Self {
        self.c_d = Some(c_d);
        self
    }

    pub fn with_c_lower_delta(mut self, c_lower_delta: GqElement) -> Self {
        self.c_lower_delta = Some(c_lower_delta);
        self
    }

    pub fn with_c_upper_delta(mut self, c_upper_delta: GqElement) -> Self {
        self.c_upper_delta = Some(c_upper_delta);
        self
    }

    pub fn with_a_tilde(mut self, a_tilde: GroupVector<ZqElement>) -> Self {
        self.a_tilde = Some(a_tilde);
        self
    }

    pub fn with_b_tilde(mut self, b_tilde: GroupVector<ZqElement>) -> Self {
        self.b_tilde = Some(b_tilde);
        self
    }

    pub fn with_r_tilde(mut self, r_tilde: ZqElement) -> Self {
        self.r_tilde = Some(r_tilde);
        self
    }

    pub fn with_s_tilde(mut self, s_tilde: ZqElement) -> Self {
        self.s_tilde = Some(s_tilde);
        self
    }

    pub fn build(self) -> Result<SingleValueProductArgument> {
        let c_d = require(self.c_d, "c_d")?;
        let c_lower_delta = require(self.c_lower_delta, "c_lower_delta")?;
        let c_upper_delta = require(self.c_upper_delta, "c_upper_delta")?;
        let a_tilde = require(self.a_tilde, "a_tilde")?;
        let b_tilde = require(self.b_tilde, "b_tilde")?;
        let r_tilde = require(self.r_tilde, "r_tilde")?;
        let s_tilde = require(self.s_tilde, "s_tilde")?;

        if c_lower_delta.group() != c_d.group() || c_upper_delta.group() != c_d.group() {
            return Err(CryptoError::GroupMismatch(
                "The commitments of the argument must belong to the same group.".into(),
            ));
        }
        if a_tilde.len() != b_tilde.len() {
            return Err(CryptoError::ShapeError(
                "The vectors a~ and b~ must have the same size.".into(),
            ));
        }
        if a_tilde.len() < 2 {
            return Err(CryptoError::InvalidInput(
                "The vectors a~ and b~ must have at least 2 elements.".into(),
            ));
        }
        let zq_groups_consistent = a_tilde.group() == b_tilde.group()
            && a_tilde.group() == Some(r_tilde.group())
            && r_tilde.group() == s_tilde.group();
        if !zq_groups_consistent {
            return Err(CryptoError::GroupMismatch(
                "The responses of the argument must belong to the same group.".into(),
            ));
        }
        if !c_d.group().has_same_order_as(r_tilde.group()) {
            return Err(CryptoError::GroupMismatch(
                "The commitments and the responses must have the same group order.".into(),
            ));
        }
        Ok(SingleValueProductArgument {
            c_d,
            c_lower_delta,
            c_upper_delta,
            a_tilde,
            b_tilde,
            r_tilde,
            s_tilde,
        })
    }
}

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| CryptoError::InvalidInput(format!("The field {name} must be set.")))
}

/// Prover and verifier of single value product arguments, bound to one
/// commitment key and one hash service.
pub struct SingleValueProductArgumentService<'a> {
    commitment_key: CommitmentKey,
    hash: &'a HashService,
}

impl<'a> SingleValueProductArgumentService<'a> {
    pub fn new(commitment_key: CommitmentKey, hash: &'a HashService) -> Result<Self> {
        check_challenge_length(hash, commitment_key.group().q())?;
        Ok(SingleValueProductArgumentService {
            commitment_key,
            hash,
        })
    }

    /// Produces an argument for the given statement. Fails fast when the
    /// witness does not open the statement.
    ///
    /// Draws, in order: d (n), r_d, s_0, s_x, then the n - 2 interior delta
    /// values.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn get_single_value_product_argument<R: RandomSource + ?Sized>(
        &self,
        statement: &SingleValueProductStatement,
        witness: &SingleValueProductWitness,
        random: &mut R,
    ) -> Result<SingleValueProductArgument> {
        let a = witness.elements();
        let n = a.len();
        let group = statement.commitment.group();
        let zq_group = ZqGroup::same_order_as(group);

        if Some(&zq_group) != a.group() {
            return Err(CryptoError::GroupMismatch(
                "The statement and the witness must have the same group order.".into(),
            ));
        }
        if group != self.commitment_key.group() {
            return Err(CryptoError::GroupMismatch(
                "The statement must belong to the commitment key's group.".into(),
            ));
        }
        if n > self.commitment_key.size() {
            return Err(CryptoError::ShapeError(
                "The witness must not be longer than the commitment key.".into(),
            ));
        }

        // Statement-witness consistency.
        let mut product = zq_group.one();
        for a_i in a.iter() {
            product = product.multiply(a_i)?;
        }
        if &product != statement.product() {
            return Err(CryptoError::WitnessInconsistent(
                "The product of the provided elements does not give the provided product.".into(),
            ));
        }
        let expected_commitment =
            get_commitment(a, witness.randomness(), &self.commitment_key)?;
        if &expected_commitment != statement.commitment() {
            return Err(CryptoError::WitnessInconsistent(
                "The commitment does not correspond to the provided elements and randomness."
                    .into(),
            ));
        }

        // Partial products b_k = a_0 * ... * a_k.
        let mut b = Vec::with_capacity(n);
        let mut partial = zq_group.one();
        for a_i in a.iter() {
            partial = partial.multiply(a_i)?;
            b.push(partial.clone());
        }

        let d = random.gen_random_zq_vector(&zq_group, n);
        let r_d = random.gen_random_zq_element(&zq_group);
        let s_0 = random.gen_random_zq_element(&zq_group);
        let s_x = random.gen_random_zq_element(&zq_group);

        // delta_0 = d_0, delta_{n-1} = 0, interior values fresh.
        let mut delta = Vec::with_capacity(n);
        delta.push(d.as_slice()[0].clone());
        for _ in 0..n.saturating_sub(2) {
            delta.push(random.gen_random_zq_element(&zq_group));
        }
        delta.push(zq_group.identity());

        let c_d = get_commitment(&d, &r_d, &self.commitment_key)?;

        // c_delta commits (-delta_k * d_{k+1}) for k = 0..n-2.
        let lower_entries = (0..n - 1)
            .map(|k| delta[k].negate().multiply(&d.as_slice()[k + 1]))
            .collect::<Result<Vec<_>>>()?;
        let c_lower_delta = get_commitment(
            &GroupVector::from_elements(lower_entries)?,
            &s_0,
            &self.commitment_key,
        )?;

        // c_Delta commits (delta_{k+1} - a_{k+1} delta_k - b_k d_{k+1}).
        let upper_entries = (0..n - 1)
            .map(|k| {
                delta[k + 1]
                    .subtract(&a.as_slice()[k + 1].multiply(&delta[k])?)?
                    .subtract(&b[k].multiply(&d.as_slice()[k + 1])?)
            })
            .collect::<Result<Vec<_>>>()?;
        let c_upper_delta = get_commitment(
            &GroupVector::from_elements(upper_entries)?,
            &s_x,
            &self.commitment_key,
        )?;

        let (x, _) = derive_challenge(
            self.hash,
            &zq_group,
            &self.transcript(statement, &c_d, &c_lower_delta, &c_upper_delta),
        )?;
        tracing::debug!(target: LOG_TARGET, challenge = %x.value(), "derived challenge x");

        let a_tilde = (0..n)
            .map(|i| x.multiply(&a.as_slice()[i])?.add(&d.as_slice()[i]))
            .collect::<Result<Vec<_>>>()?;
        let b_tilde = (0..n)
            .map(|i| x.multiply(&b[i])?.add(&delta[i]))
            .collect::<Result<Vec<_>>>()?;
        let r_tilde = x.multiply(witness.randomness())?.add(&r_d)?;
        let s_tilde = x.multiply(&s_x)?.add(&s_0)?;

        SingleValueProductArgument::builder()
            .with_c_d(c_d)
            .with_c_lower_delta(c_lower_delta)
            .with_c_upper_delta(c_upper_delta)
            .with_a_tilde(GroupVector::from_elements(a_tilde)?)
            .with_b_tilde(GroupVector::from_elements(b_tilde)?)
            .with_r_tilde(r_tilde)
            .with_s_tilde(s_tilde)
            .build()
    }

    /// Verifies an argument. Every algebraic check runs to completion; the
    /// result accumulates the failures.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn verify_single_value_product_argument(
        &self,
        statement: &SingleValueProductStatement,
        argument: &SingleValueProductArgument,
    ) -> Result<VerificationResult> {
        if statement.commitment.group() != argument.group() {
            return Err(CryptoError::GroupMismatch(
                "The statement and the argument must belong to the same group.".into(),
            ));
        }
        let n = argument.n();
        if n > self.commitment_key.size() {
            return Err(CryptoError::ShapeError(
                "The argument must not be longer than the commitment key.".into(),
            ));
        }
        let zq_group = ZqGroup::same_order_as(argument.group());

        let (x, _) = derive_challenge(
            self.hash,
            &zq_group,
            &self.transcript(
                statement,
                &argument.c_d,
                &argument.c_lower_delta,
                &argument.c_upper_delta,
            ),
        )?;

        let mut result = VerificationResult::verified();

        // c_d * c_a^x = com(a~, r~)
        let left_commit = argument
            .c_d
            .multiply(&statement.commitment.exponentiate(&x)?)?;
        let right_commit =
            get_commitment(&argument.a_tilde, &argument.r_tilde, &self.commitment_key)?;
        result.check(
            left_commit == right_commit,
            "c_d * c_a^x must equal com(a_tilde, r_tilde).",
        );

        // c_Delta * c_delta^x = com((x b~_{k+1} - b~_k a~_{k+1}), s~)
        let left_delta = argument
            .c_upper_delta
            .multiply(&argument.c_lower_delta.exponentiate(&x)?)?;
        let blended = (0..n - 1)
            .map(|k| {
                x.multiply(&argument.b_tilde.as_slice()[k + 1])?
                    .subtract(
                        &argument.b_tilde.as_slice()[k]
                            .multiply(&argument.a_tilde.as_slice()[k + 1])?,
                    )
            })
            .collect::<Result<Vec<_>>>()?;
        let right_delta = get_commitment(
            &GroupVector::from_elements(blended)?,
            &argument.s_tilde,
            &self.commitment_key,
        )?;
        result.check(
            left_delta == right_delta,
            "c_Delta * c_delta^x must equal com(x * b_tilde - b_tilde * a_tilde, s_tilde).",
        );

        // Boundary conditions on the blended partial products.
        result.check(
            argument.b_tilde.as_slice()[0] == argument.a_tilde.as_slice()[0],
            "b_tilde_0 must equal a_tilde_0.",
        );
        result.check(
            argument.b_tilde.as_slice()[n - 1] == x.multiply(statement.product())?,
            "b_tilde_n must equal x * b.",
        );

        if !result.is_verified() {
            tracing::debug!(
                target: LOG_TARGET,
                errors = ?result.error_messages(),
                "single value product argument verification failed"
            );
        }
        Ok(result)
    }

    fn transcript(
        &self,
        statement: &SingleValueProductStatement,
        c_d: &GqElement,
        c_lower_delta: &GqElement,
        c_upper_delta: &GqElement,
    ) -> Vec<Hashable> {
        vec![
            self.commitment_key.to_hashable(),
            statement.commitment.to_hashable(),
            statement.product.to_hashable(),
            c_d.to_hashable(),
            c_lower_delta.to_hashable(),
            c_upper_delta.to_hashable(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomService;
    use crate::test_utils::{
        gq_element, gq_group_p23, gq_vector, zq_element, zq_vector, BoundedHash,
        FixedRandomSource,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn commitment_key() -> CommitmentKey {
        let group = gq_group_p23();
        CommitmentKey::new(gq_element(3, &group), gq_vector(&[6, 13, 12], &group)).unwrap()
    }

    fn hash_service() -> HashService {
        HashService::new(BoundedHash::below(gq_group_p23().q()))
    }

    fn statement_and_witness(
        elements: &[u8],
        randomness: u8,
    ) -> (SingleValueProductStatement, SingleValueProductWitness) {
        let group = gq_group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let a = zq_vector(elements, &zq);
        let r = zq_element(randomness, &zq);
        let ck = commitment_key();

        let mut b = zq.one();
        for a_i in a.iter() {
            b = b.multiply(a_i).unwrap();
        }
        let commitment = get_commitment(&a, &r, &ck).unwrap();
        (
            SingleValueProductStatement::new(commitment, b).unwrap(),
            SingleValueProductWitness::new(a, r).unwrap(),
        )
    }

    #[test]
    fn argument_round_trips() {
        let hash = hash_service();
        let service = SingleValueProductArgumentService::new(commitment_key(), &hash).unwrap();
        let (statement, witness) = statement_and_witness(&[2, 5, 7], 4);
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(17));

        let argument = service
            .get_single_value_product_argument(&statement, &witness, &mut random)
            .unwrap();
        let result = service
            .verify_single_value_product_argument(&statement, &argument)
            .unwrap();
        assert!(result.is_verified(), "errors: {:?}", result.error_messages());
    }

    #[test]
    fn prover_draws_follow_the_documented_order() {
        // For n = 3: d (3 draws), r_d, s_0, s_x, one interior delta.
        let hash = hash_service();
        let service = SingleValueProductArgumentService::new(commitment_key(), &hash).unwrap();
        let (statement, witness) = statement_and_witness(&[2, 5, 7], 4);
        let mut random = FixedRandomSource::of(&[4, 9, 1, 0, 1, 7, 5]);

        service
            .get_single_value_product_argument(&statement, &witness, &mut random)
            .unwrap();
        assert_eq!(random.remaining(), 0);
    }

    #[test]
    fn wrong_product_is_rejected_before_proving() {
        let hash = hash_service();
        let service = SingleValueProductArgumentService::new(commitment_key(), &hash).unwrap();
        let (statement, _) = statement_and_witness(&[2, 5, 7], 4);
        let zq = ZqGroup::same_order_as(&gq_group_p23());
        let bad_witness =
            SingleValueProductWitness::new(zq_vector(&[2, 5, 8], &zq), zq_element(4, &zq))
                .unwrap();

        assert!(matches!(
            service.get_single_value_product_argument(&statement, &bad_witness, &mut FixedRandomSource::of(&[])),
            Err(CryptoError::WitnessInconsistent(_))
        ));
    }

    #[test]
    fn tampered_responses_fail_verification() {
        let hash = hash_service();
        let service = SingleValueProductArgumentService::new(commitment_key(), &hash).unwrap();
        let (statement, witness) = statement_and_witness(&[2, 5, 7], 4);
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(17));
        let argument = service
            .get_single_value_product_argument(&statement, &witness, &mut random)
            .unwrap();

        let zq = ZqGroup::same_order_as(&gq_group_p23());
        let mut tampered = argument.clone();
        tampered.r_tilde = tampered.r_tilde.add(&zq.one()).unwrap();

        let result = service
            .verify_single_value_product_argument(&statement, &tampered)
            .unwrap();
        assert!(!result.is_verified());
        assert_eq!(
            result.error_messages()[0],
            "c_d * c_a^x must equal com(a_tilde, r_tilde)."
        );
    }

    #[test]
    fn tampered_statement_product_fails_verification() {
        let hash = hash_service();
        let service = SingleValueProductArgumentService::new(commitment_key(), &hash).unwrap();
        let (statement, witness) = statement_and_witness(&[2, 5, 7], 4);
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(17));
        let argument = service
            .get_single_value_product_argument(&statement, &witness, &mut random)
            .unwrap();

        let zq = ZqGroup::same_order_as(&gq_group_p23());
        let other_statement = SingleValueProductStatement::new(
            statement.commitment().clone(),
            statement.product().add(&zq.one()).unwrap(),
        )
        .unwrap();

        let result = service
            .verify_single_value_product_argument(&other_statement, &argument)
            .unwrap();
        assert!(!result.is_verified());
    }

    #[test]
    fn witnesses_of_size_one_are_rejected() {
        let zq = ZqGroup::same_order_as(&gq_group_p23());
        assert!(matches!(
            SingleValueProductWitness::new(zq_vector(&[2], &zq), zq_element(4, &zq)),
            Err(CryptoError::InvalidInput(_))
        ));
    }
}
