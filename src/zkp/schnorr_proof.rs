//! Schnorr proofs of knowledge of a discrete logarithm.
//!
//! Proves knowledge of x with y = g^x for the group generator g. The proof
//! is the (e, z) pair of the Fiat-Shamir transformed Schnorr protocol.

use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::conversions::byte_array_to_integer;
use crate::math::gq_group::GqElement;
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::random::RandomSource;
use crate::verification::VerificationResult;

const LOG_TARGET: &str = "zk_mixnet::zkp::schnorr_proof";

/// A Schnorr proof (e, z).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchnorrProof {
    e: ZqElement,
    z: ZqElement,
}

impl SchnorrProof {
    pub fn new(e: ZqElement, z: ZqElement) -> Result<Self> {
        if e.group() != z.group() {
            return Err(CryptoError::GroupMismatch(
                "The challenge e and the response z must belong to the same group.".into(),
            ));
        }
        Ok(SchnorrProof { e, z })
    }

    pub fn e(&self) -> &ZqElement {
        &self.e
    }

    pub fn z(&self) -> &ZqElement {
        &self.z
    }
}

impl ToHashable for SchnorrProof {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![self.e.to_hashable(), self.z.to_hashable()])
    }
}

/// Prover and verifier of Schnorr proofs.
pub struct SchnorrProofService<'a> {
    hash: &'a HashService,
}

impl<'a> SchnorrProofService<'a> {
    pub fn new(hash: &'a HashService) -> Self {
        SchnorrProofService { hash }
    }

    /// Proves knowledge of the discrete logarithm of `element`; one draw.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn gen_schnorr_proof<R: RandomSource + ?Sized>(
        &self,
        witness: &ZqElement,
        element: &GqElement,
        auxiliary_information: &[String],
        random: &mut R,
    ) -> Result<SchnorrProof> {
        let group = element.group();
        if !group.has_same_order_as(witness.group()) {
            return Err(CryptoError::GroupMismatch(
                "The witness must have the order of the element's group.".into(),
            ));
        }
        let zq_group = witness.group().clone();
        self.check_hash_length(&zq_group)?;

        if &group.generator().exponentiate(witness)? != element {
            return Err(CryptoError::WitnessInconsistent(
                "The element must be the generator raised to the witness.".into(),
            ));
        }

        let b = random.gen_random_zq_element(&zq_group);
        let c = group.generator().exponentiate(&b)?;
        let e = self.derive_challenge(element, auxiliary_information, &c)?;
        tracing::debug!(target: LOG_TARGET, challenge = %e.value(), "derived challenge e");
        let z = b.add(&e.multiply(witness)?)?;

        SchnorrProof::new(e, z)
    }

    /// Verifies a Schnorr proof.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn verify_schnorr_proof(
        &self,
        element: &GqElement,
        proof: &SchnorrProof,
        auxiliary_information: &[String],
    ) -> Result<VerificationResult> {
        let group = element.group();
        if !group.has_same_order_as(proof.e.group()) {
            return Err(CryptoError::GroupMismatch(
                "The proof must have the order of the element's group.".into(),
            ));
        }
        self.check_hash_length(proof.e.group())?;

        // c' = g^z / y^e.
        let c_prime = group
            .generator()
            .exponentiate(&proof.z)?
            .multiply(&element.exponentiate(&proof.e)?.invert())?;
        let e_prime = self.derive_challenge(element, auxiliary_information, &c_prime)?;

        let mut result = VerificationResult::verified();
        result.check(
            e_prime == proof.e,
            "The recomputed challenge does not correspond to the proof challenge.",
        );
        Ok(result)
    }

    fn derive_challenge(
        &self,
        element: &GqElement,
        auxiliary_information: &[String],
        commitment: &GqElement,
    ) -> Result<ZqElement> {
        let zq_group = ZqGroup::same_order_as(element.group());
        let mut aux = vec![Hashable::from("SchnorrProof")];
        aux.extend(
            auxiliary_information
                .iter()
                .map(|info| Hashable::from(info.as_str())),
        );
        let digest = self.hash.recursive_hash(&[
            element.to_hashable(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RandomService, RandomSource};
    use crate::test_utils::{gq_group_p23, BoundedHash};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn hash_service() -> HashService {
        HashService::new(BoundedHash::below(gq_group_p23().q()))
    }

    #[test]
    fn honest_proof_verifies() {
        let group = gq_group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(151));
        let witness = random.gen_random_zq_element(&zq);
        let element = group.generator().exponentiate(&witness).unwrap();

        let hash = hash_service();
        let service = SchnorrProofService::new(&hash);
        let aux = vec!["ballot-box".to_string()];
        let proof = service
            .gen_schnorr_proof(&witness, &element, &aux, &mut random)
            .unwrap();

        let result = service.verify_schnorr_proof(&element, &proof, &aux).unwrap();
        assert!(result.is_verified(), "errors: {:?}", result.error_messages());
    }

    #[test]
    fn wrong_witness_is_rejected_before_proving() {
        let group = gq_group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(157));
        let witness = random.gen_random_zq_element(&zq);
        let element = group
            .generator()
            .exponentiate(&witness.add(&zq.one()).unwrap())
            .unwrap();

        let hash = hash_service();
        let service = SchnorrProofService::new(&hash);
        assert!(matches!(
            service.gen_schnorr_proof(&witness, &element, &[], &mut random),
            Err(CryptoError::WitnessInconsistent(_))
        ));
    }

    #[test]
    fn proofs_do_not_transfer_between_elements() {
        let group = gq_group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(163));
        let witness = random.gen_random_zq_element(&zq);
        let element = group.generator().exponentiate(&witness).unwrap();

        let hash = hash_service();
        let service = SchnorrProofService::new(&hash);
        let proof = service
            .gen_schnorr_proof(&witness, &element, &[], &mut random)
            .unwrap();

        let other_element = element.multiply(&group.generator()).unwrap();
        let result = service
            .verify_schnorr_proof(&other_element, &proof, &[])
            .unwrap();
        assert!(!result.is_verified());
    }
}
