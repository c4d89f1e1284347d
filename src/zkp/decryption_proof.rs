//! Decryption proofs.
//!
//! A Sigma-protocol proving that a claimed message is the decryption of a
//! ciphertext under the secret key matching a public key. The proved
//! relation, for each component i:
//!
//!     pk_i = g^{sk_i}    and    m_i = phi_i * gamma^{-sk_i}
//!
//! The prover evaluates the homomorphism
//! phi(b, gamma) = (g^{b_1}..g^{b_l}, gamma^{b_1}..gamma^{b_l}) at a fresh
//! pre-image b, hashes it with the statement and auxiliary information into
//! the challenge e, and answers z = b + e * sk.

use crate::elgamal::{
    ElGamalMultiRecipientCiphertext, ElGamalMultiRecipientKeyPair, ElGamalMultiRecipientMessage,
    ElGamalMultiRecipientPublicKey,
};
use crate::error::{CryptoError, Result};
use crate::hashing::{HashService, Hashable, ToHashable};
use crate::math::conversions::byte_array_to_integer;
use crate::math::group_vector::GroupVector;
use crate::math::gq_group::GqElement;
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::random::RandomSource;
use crate::verification::VerificationResult;

const LOG_TARGET: &str = "zk_mixnet::zkp::decryption_proof";

/// A decryption proof (e, z) with one response per ciphertext component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptionProof {
    e: ZqElement,
    z: GroupVector<ZqElement>,
}

impl DecryptionProof {
    pub fn new(e: ZqElement, z: GroupVector<ZqElement>) -> Result<Self> {
        if z.is_empty() {
            return Err(CryptoError::InvalidInput(
                "The response vector z must not be empty.".into(),
            ));
        }
        if z.group() != Some(e.group()) {
            return Err(CryptoError::GroupMismatch(
                "The challenge e and the responses z must belong to the same group.".into(),
            ));
        }
        Ok(DecryptionProof { e, z })
    }

    pub fn e(&self) -> &ZqElement {
        &self.e
    }

    pub fn z(&self) -> &GroupVector<ZqElement> {
        &self.z
    }

    /// The number of components the proof covers.
    pub fn size(&self) -> usize {
        self.z.len()
    }
}

impl ToHashable for DecryptionProof {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![self.e.to_hashable(), self.z.to_hashable()])
    }
}

/// The batch result of decrypting a ciphertext vector verifiably: the
/// plaintext messages and one proof per ciphertext, in parallel order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiableDecryptions {
    messages: Vec<ElGamalMultiRecipientMessage>,
    decryption_proofs: Vec<DecryptionProof>,
}

impl VerifiableDecryptions {
    pub fn messages(&self) -> &[ElGamalMultiRecipientMessage] {
        &self.messages
    }

    pub fn decryption_proofs(&self) -> &[DecryptionProof] {
        &self.decryption_proofs
    }
}

/// Prover and verifier of decryption proofs.
pub struct DecryptionProofService<'a> {
    hash: &'a HashService,
}

impl<'a> DecryptionProofService<'a> {
    pub fn new(hash: &'a HashService) -> Self {
        DecryptionProofService { hash }
    }

    /// Generates a proof that `message` is the decryption of `ciphertext`
    /// under the key pair's secret key. Draws one pre-image element per
    /// ciphertext component.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn gen_decryption_proof<R: RandomSource + ?Sized>(
        &self,
        ciphertext: &ElGamalMultiRecipientCiphertext,
        key_pair: &ElGamalMultiRecipientKeyPair,
        message: &ElGamalMultiRecipientMessage,
        auxiliary_information: &[String],
        random: &mut R,
    ) -> Result<DecryptionProof> {
        let l = ciphertext.size();
        let secret_key = key_pair.private_key();
        if l > secret_key.size() {
            return Err(CryptoError::ShapeError(
                "The ciphertext length cannot be greater than the secret key length.".into(),
            ));
        }
        if !ciphertext.group().has_same_order_as(secret_key.group()) {
            return Err(CryptoError::GroupMismatch(
                "The ciphertext and the secret key group must have the same order.".into(),
            ));
        }
        if message.size() != l {
            return Err(CryptoError::ShapeError(
                "The message must have the size of the ciphertext.".into(),
            ));
        }
        let zq_group = secret_key.group().clone();
        self.check_hash_length(&zq_group)?;

        if &ElGamalMultiRecipientMessage::get_message(ciphertext, secret_key)? != message {
            return Err(CryptoError::WitnessInconsistent(
                "The message must be equal to the decrypted ciphertext.".into(),
            ));
        }

        let b = random.gen_random_zq_vector(&zq_group, l);
        let c = compute_phi_decryption(&b, ciphertext.gamma())?;

        let e = self.derive_challenge(
            key_pair.public_key(),
            ciphertext,
            message,
            auxiliary_information,
            &c,
        )?;
        tracing::debug!(target: LOG_TARGET, challenge = %e.value(), "derived challenge e");

        let z = GroupVector::from_elements(
            b.iter()
                .zip(secret_key.elements().iter().take(l))
                .map(|(b_i, sk_i)| b_i.add(&e.multiply(sk_i)?))
                .collect::<Result<Vec<_>>>()?,
        )?;

        DecryptionProof::new(e, z)
    }

    /// Verifies a decryption proof by recomputing the commitment from the
    /// responses and re-deriving the challenge.
    #[tracing::instrument(target = LOG_TARGET, skip_all)]
    pub fn verify_decryption(
        &self,
        ciphertext: &ElGamalMultiRecipientCiphertext,
        public_key: &ElGamalMultiRecipientPublicKey,
        message: &ElGamalMultiRecipientMessage,
        proof: &DecryptionProof,
        auxiliary_information: &[String],
    ) -> Result<VerificationResult> {
        let l = ciphertext.size();
        if ciphertext.group() != public_key.group() || message.group() != public_key.group() {
            return Err(CryptoError::GroupMismatch(
                "The ciphertext, the public key and the message must have the same group.".into(),
            ));
        }
        if l > public_key.size() {
            return Err(CryptoError::ShapeError(
                "The ciphertext length cannot be greater than the public key length.".into(),
            ));
        }
        if message.size() != l || proof.size() != l {
            return Err(CryptoError::ShapeError(
                "The message and the proof must have the size of the ciphertext.".into(),
            ));
        }
        let zq_group = ZqGroup::same_order_as(public_key.group());
        self.check_hash_length(&zq_group)?;

        // c' = phi(z, gamma) / ((pk, phi/m))^e, component-wise.
        let phi_z = compute_phi_decryption(proof.z(), ciphertext.gamma())?;
        let mut bases = Vec::with_capacity(2 * l);
        for pk_i in public_key.elements().iter().take(l) {
            bases.push(pk_i.clone());
        }
        for (phi_i, m_i) in ciphertext.phis().iter().zip(message.elements().iter()) {
            bases.push(phi_i.multiply(&m_i.invert())?);
        }
        let c_prime = phi_z
            .iter()
            .zip(bases.iter())
            .map(|(phi_z_i, base)| phi_z_i.multiply(&base.exponentiate(proof.e())?.invert()))
            .collect::<Result<Vec<_>>>()?;

        let e_prime = self.derive_challenge(
            public_key,
            ciphertext,
            message,
            auxiliary_information,
            &c_prime,
        )?;

        let mut result = VerificationResult::verified();
        result.check(
            &e_prime == proof.e(),
            "The recomputed challenge does not correspond to the proof challenge.",
        );
        Ok(result)
    }

    /// Decrypts every ciphertext of a batch and proves each decryption.
    pub fn gen_verifiable_decryptions<R: RandomSource + ?Sized>(
        &self,
        ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
        key_pair: &ElGamalMultiRecipientKeyPair,
        auxiliary_information: &[String],
        random: &mut R,
    ) -> Result<VerifiableDecryptions> {
        if ciphertexts.is_empty() {
            return Err(CryptoError::InvalidInput(
                "Cannot decrypt an empty ciphertext vector.".into(),
            ));
        }
        let mut messages = Vec::with_capacity(ciphertexts.len());
        let mut decryption_proofs = Vec::with_capacity(ciphertexts.len());
        for ciphertext in ciphertexts.iter() {
            let message =
                ElGamalMultiRecipientMessage::get_message(ciphertext, key_pair.private_key())?;
            let proof = self.gen_decryption_proof(
                ciphertext,
                key_pair,
                &message,
                auxiliary_information,
                random,
            )?;
            messages.push(message);
            decryption_proofs.push(proof);
        }
        Ok(VerifiableDecryptions {
            messages,
            decryption_proofs,
        })
    }

    /// Verifies a batch of decryptions, accumulating per-ciphertext
    /// outcomes into a single result.
    pub fn verify_decryptions(
        &self,
        ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
        public_key: &ElGamalMultiRecipientPublicKey,
        verifiable_decryptions: &VerifiableDecryptions,
        auxiliary_information: &[String],
    ) -> Result<VerificationResult> {
        if ciphertexts.len() != verifiable_decryptions.messages.len()
            || ciphertexts.len() != verifiable_decryptions.decryption_proofs.len()
        {
            return Err(CryptoError::ShapeError(
                "There must be one message and one proof per ciphertext.".into(),
            ));
        }

        let mut result = VerificationResult::verified();
        for (i, ciphertext) in ciphertexts.iter().enumerate() {
            let outcome = self.verify_decryption(
                ciphertext,
                public_key,
                &verifiable_decryptions.messages[i],
                &verifiable_decryptions.decryption_proofs[i],
                auxiliary_information,
            )?;
            if !outcome.is_verified() {
                result.check(
                    false,
                    format!("Could not verify decryption proof of ciphertext {i}."),
                );
                result = result.and(outcome);
            }
        }
        Ok(result)
    }

    fn derive_challenge(
        &self,
        public_key: &ElGamalMultiRecipientPublicKey,
        ciphertext: &ElGamalMultiRecipientCiphertext,
        message: &ElGamalMultiRecipientMessage,
        auxiliary_information: &[String],
        commitment: &[GqElement],
    ) -> Result<ZqElement> {
        let l = ciphertext.size();
        let zq_group = ZqGroup::same_order_as(public_key.group());

        let truncated_public_key = Hashable::List(
            public_key
                .elements()
                .iter()
                .take(l)
                .map(ToHashable::to_hashable)
                .collect(),
        );
        let mut aux = vec![Hashable::from("DecryptionProof")];
        aux.extend(
            auxiliary_information
                .iter()
                .map(|info| Hashable::from(info.as_str())),
        );
        let commitment_values =
            Hashable::List(commitment.iter().map(ToHashable::to_hashable).collect());

        let digest = self.hash.recursive_hash(&[
            truncated_public_key,
            ciphertext.to_hashable(),
            message.to_hashable(),
            Hashable::List(aux),
            commitment_values,
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

/// The homomorphism underlying the proof:
/// phi(b, gamma) = (g^{b_1}, ..., g^{b_l}, gamma^{b_1}, ..., gamma^{b_l}).
pub fn compute_phi_decryption(
    pre_image: &GroupVector<ZqElement>,
    gamma: &GqElement,
) -> Result<Vec<GqElement>> {
    if let Some(group) = pre_image.group() {
        if !gamma.group().has_same_order_as(group) {
            return Err(CryptoError::GroupMismatch(
                "The preImage and base should have the same group order.".into(),
            ));
        }
    }
    let generator = gamma.group().generator();
    let mut image = Vec::with_capacity(2 * pre_image.len());
    for b_i in pre_image.iter() {
        image.push(generator.exponentiate(b_i)?);
    }
    for b_i in pre_image.iter() {
        image.push(gamma.exponentiate(b_i)?);
    }
    Ok(image)
}
