//! Exponentiation proofs.
//!
//! A Sigma-protocol proving that a vector of exponentiations shares one
//! discrete logarithm across a vector of bases:
//!
//!     y_i = g_i^x    for all i
//!
//! Mix nodes use it to show that a re-keyed value was derived with the same
//! secret as their published key.

use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::conversions::byte_array_to_integer;
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::GqElement;
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::random::RandomSource;
use crate::verification::VerificationResult;

const LOG_TARGET: &str = "zk_mixnet::zkp::exponentiation_proof";

/// An exponentiation proof (e, z).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExponentiationProof {
    e: ZqElement,
    z: ZqElement,
}

impl ExponentiationProof {
    pub fn new(e: ZqElement, z: ZqElement) -> Result<Self> {
        if e.group() != z.group() {
            return Err(CryptoError::GroupMismatch(
                "The challenge e and the response z must belong to the same group.".into(),
            ));
        }
        Ok(ExponentiationProof { e, z })
    }

    pub fn e(&self) -> &ZqElement {
        &self.e
    }

    pub fn z(&self) -> &ZqElement {
        &self.z
    }
}

impl ToHashable for ExponentiationProof {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![self.e.to_hashable(), self.z.to_hashable()])
    }
}

/// Prover and verifier of exponentiation proofs.
pub struct ExponentiationProofService<'a> {
    hash: &'a HashService,
}

impl<'a> ExponentiationProofService<'a> {
    pub fn new(hash: &'a HashService) -> Self {
        ExponentiationProofService { hash }
    }

    /// Proves that `exponentiations[i] = bases[i]^exponent`; one draw.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn gen_exponentiation_proof<R: RandomSource + ?Sized>(
        &self,
        bases: &GroupVector<GqElement>,
        exponent: &ZqElement,
        exponentiations: &GroupVector<GqElement>,
        auxiliary_information: &[String],
        random: &mut R,
    ) -> Result<ExponentiationProof> {
        self.validate_statement(bases, exponentiations)?;
        let zq_group = exponent.group().clone();
        let group = bases.as_slice()[0].group();
        if !group.has_same_order_as(&zq_group) {
            return Err(CryptoError::GroupMismatch(
                "The bases and the exponent must have the same group order.".into(),
            ));
        }
        self.check_hash_length(&zq_group)?;

        let computed = compute_phi_exponentiation(exponent, bases)?;
        if &computed != exponentiations {
            return Err(CryptoError::WitnessInconsistent(
                "The exponentiations must correspond to the bases raised to the exponent.".into(),
            ));
        }

        let b = random.gen_random_zq_element(&zq_group);
        let c = compute_phi_exponentiation(&b, bases)?;
        let e = self.derive_challenge(bases, exponentiations, auxiliary_information, &c)?;
        tracing::debug!(target: LOG_TARGET, challenge = %e.value(), "derived challenge e");
        let z = b.add(&e.multiply(exponent)?)?;

        ExponentiationProof::new(e, z)
    }

    /// Verifies an exponentiation proof.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn verify_exponentiation(
        &self,
        bases: &GroupVector<GqElement>,
        exponentiations: &GroupVector<GqElement>,
        proof: &ExponentiationProof,
        auxiliary_information: &[String],
    ) -> Result<VerificationResult> {
        self.validate_statement(bases, exponentiations)?;
        let zq_group = proof.e.group().clone();
        self.check_hash_length(&zq_group)?;

        // c' = phi(z) / y^e, component-wise.
        let phi_z = compute_phi_exponentiation(&proof.z, bases)?;
        let c_prime = GroupVector::from_elements(
            phi_z
                .iter()
                .zip(exponentiations.iter())
                .map(|(phi_z_i, y_i)| phi_z_i.multiply(&y_i.exponentiate(&proof.e)?.invert()))
                .collect::<Result<Vec<_>>>()?,
        )?;

        let e_prime =
            self.derive_challenge(bases, exponentiations, auxiliary_information, &c_prime)?;

        let mut result = VerificationResult::verified();
        result.check(
            e_prime == proof.e,
            "The recomputed challenge does not correspond to the proof challenge.",
        );
        Ok(result)
    }

    fn validate_statement(
        &self,
        bases: &GroupVector<GqElement>,
        exponentiations: &GroupVector<GqElement>,
    ) -> Result<()> {
        if bases.is_empty() {
            return Err(CryptoError::InvalidInput(
                "The bases must not be empty.".into(),
            ));
        }
        if bases.len() != exponentiations.len() {
            return Err(CryptoError::ShapeError(
                "There must be one exponentiation per base.".into(),
            ));
        }
        if bases.group() != exponentiations.group() {
            return Err(CryptoError::GroupMismatch(
                "The bases and the exponentiations must belong to the same group.".into(),
            ));
        }
        Ok(())
    }

    fn derive_challenge(
        &self,
        bases: &GroupVector<GqElement>,
        exponentiations: &GroupVector<GqElement>,
        auxiliary_information: &[String],
        commitment: &GroupVector<GqElement>,
    ) -> Result<ZqElement> {
        let zq_group = ZqGroup::same_order_as(bases.as_slice()[0].group());
        let mut aux = vec![Hashable::from("ExponentiationProof")];
        aux.extend(
            auxiliary_information
                .iter()
                .map(|info| Hashable::from(info.as_str())),
        );
        let digest = self.hash.recursive_hash(&[
            bases.to_hashable(),
            exponentiations.to_hashable(),
            Hashable::List(aux),
            commitment.to_hashable(),
        ])?;
        ZqElement::new(byte_array_to_integer(&digest), &zq_group)
    }

    fn check_hash_length(&self, zq_group: &ZqGroup) -> Result<()> {
        if 8 * self.hash.hash_length() as u64 >= zq_group.q().bits() {
            return Err(CryptoError::BitLengthTooLarge(
                "The hash service's bit length must be smaller than the bit length of q.".into(),
            ));
        }
        Ok(())
    }
}

/// phi(x) = (g_1^x, ..., g_k^x).
fn compute_phi_exponentiation(
    exponent: &ZqElement,
    bases: &GroupVector<GqElement>,
) -> Result<GroupVector<GqElement>> {
    GroupVector::from_elements(
        bases
            .iter()
            .map(|base| base.exponentiate(exponent))
            .collect::<Result<Vec<_>>>()?,
    )
}
