//! Multi-recipient ElGamal over Gq.
//!
//! A single ciphertext carries one gamma component and up to k phi
//! components, encrypting a vector message under a vector public key:
//!
//!     (gamma, phi_1..phi_l) = (g^r, m_1 * pk_1^r, ..., m_l * pk_l^r)
//!
//! Ciphertexts are homomorphic under component-wise multiplication and can
//! be exponentiated component-wise, which is what the mixnet's
//! re-encryption and the multi-exponentiation argument build on.

use crate::error::{CryptoError, Result};
use crate::hashing::{Hashable, ToHashable};
use crate::math::group_vector::{GroupVector, GroupVectorElement};
use crate::math::gq_group::{GqElement, GqGroup};
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::random::RandomSource;

/// Vector of k >= 1 public key elements in one Gq group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientPublicKey {
    elements: GroupVector<GqElement>,
}

impl ElGamalMultiRecipientPublicKey {
    pub fn new(elements: GroupVector<GqElement>) -> Result<Self> {
        if elements.is_empty() {
            return Err(CryptoError::InvalidInput(
                "An ElGamal public key must not be empty.".into(),
            ));
        }
        Ok(ElGamalMultiRecipientPublicKey { elements })
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, i: usize) -> Option<&GqElement> {
        self.elements.get(i)
    }

    pub fn elements(&self) -> &GroupVector<GqElement> {
        &self.elements
    }

    pub fn group(&self) -> &GqGroup {
        // Non-emptiness is a construction invariant.
        self.elements.as_slice()[0].group()
    }
}

impl ToHashable for ElGamalMultiRecipientPublicKey {
    fn to_hashable(&self) -> Hashable {
        self.elements.to_hashable()
    }
}

/// Vector of k >= 1 secret exponents in one Zq group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientPrivateKey {
    elements: GroupVector<ZqElement>,
}

impl ElGamalMultiRecipientPrivateKey {
    pub fn new(elements: GroupVector<ZqElement>) -> Result<Self> {
        if elements.is_empty() {
            return Err(CryptoError::InvalidInput(
                "An ElGamal private key must not be empty.".into(),
            ));
        }
        Ok(ElGamalMultiRecipientPrivateKey { elements })
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, i: usize) -> Option<&ZqElement> {
        self.elements.get(i)
    }

    pub fn elements(&self) -> &GroupVector<ZqElement> {
        &self.elements
    }

    pub fn group(&self) -> &ZqGroup {
        self.elements.as_slice()[0].group()
    }
}

/// A matching (secret, public) key pair with pk_i = g^{sk_i}.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientKeyPair {
    private_key: ElGamalMultiRecipientPrivateKey,
    public_key: ElGamalMultiRecipientPublicKey,
}

impl ElGamalMultiRecipientKeyPair {
    /// Generates a key pair of `num_elements` recipients. Secret exponents
    /// are drawn uniformly from [2, q), one draw each.
    pub fn gen_key_pair(
        group: &GqGroup,
        num_elements: usize,
        random: &mut (impl RandomSource + ?Sized),
    ) -> Result<Self> {
        if num_elements == 0 {
            return Err(CryptoError::InvalidInput(
                "Cannot generate a key pair with 0 elements.".into(),
            ));
        }
        let zq_group = ZqGroup::same_order_as(group);
        let private_elements: Vec<ZqElement> = (0..num_elements)
            .map(|_| random.gen_random_exponent(&zq_group))
            .collect();
        let private_key =
            ElGamalMultiRecipientPrivateKey::new(GroupVector::from_elements(private_elements)?)?;
        Self::from_private_key(private_key, group)
    }

    /// Rebuilds the key pair of a known secret key.
    pub fn from_private_key(
        private_key: ElGamalMultiRecipientPrivateKey,
        group: &GqGroup,
    ) -> Result<Self> {
        if !group.has_same_order_as(private_key.group()) {
            return Err(CryptoError::GroupMismatch(
                "The private key must have the order of the group.".into(),
            ));
        }
        let generator = group.generator();
        let public_elements = private_key
            .elements()
            .iter()
            .map(|sk| generator.exponentiate(sk))
            .collect::<Result<Vec<_>>>()?;
        let public_key =
            ElGamalMultiRecipientPublicKey::new(GroupVector::from_elements(public_elements)?)?;
        Ok(ElGamalMultiRecipientKeyPair {
            private_key,
            public_key,
        })
    }

    pub fn public_key(&self) -> &ElGamalMultiRecipientPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &ElGamalMultiRecipientPrivateKey {
        &self.private_key
    }
}

/// Vector of l >= 1 plaintext group elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientMessage {
    elements: GroupVector<GqElement>,
}

impl ElGamalMultiRecipientMessage {
    pub fn new(elements: GroupVector<GqElement>) -> Result<Self> {
        if elements.is_empty() {
            return Err(CryptoError::InvalidInput(
                "An ElGamal message must not be empty.".into(),
            ));
        }
        Ok(ElGamalMultiRecipientMessage { elements })
    }

    /// The all-identity message of length `l`. Encrypting it under pk with
    /// exponent r yields the re-encryption delta (g^r, pk_i^r).
    pub fn ones(group: &GqGroup, l: usize) -> Result<Self> {
        if l == 0 {
            return Err(CryptoError::InvalidInput(
                "Cannot generate a message of length 0.".into(),
            ));
        }
        let elements = vec![group.identity(); l];
        ElGamalMultiRecipientMessage::new(GroupVector::from_elements(elements)?)
    }

    /// Decrypts a ciphertext: m_i = phi_i * gamma^{-sk_i}.
    pub fn get_message(
        ciphertext: &ElGamalMultiRecipientCiphertext,
        secret_key: &ElGamalMultiRecipientPrivateKey,
    ) -> Result<Self> {
        let l = ciphertext.size();
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
        let elements = ciphertext
            .phis()
            .iter()
            .zip(secret_key.elements().iter())
            .map(|(phi, sk)| {
                let gamma_to_sk = ciphertext.gamma().exponentiate(sk)?;
                phi.multiply(&gamma_to_sk.invert())
            })
            .collect::<Result<Vec<_>>>()?;
        ElGamalMultiRecipientMessage::new(GroupVector::from_elements(elements)?)
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, i: usize) -> Option<&GqElement> {
        self.elements.get(i)
    }

    pub fn elements(&self) -> &GroupVector<GqElement> {
        &self.elements
    }

    pub fn group(&self) -> &GqGroup {
        self.elements.as_slice()[0].group()
    }
}

impl GroupVectorElement for ElGamalMultiRecipientMessage {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        ElGamalMultiRecipientMessage::group(self)
    }

    fn element_size(&self) -> usize {
        self.size()
    }
}

impl ToHashable for ElGamalMultiRecipientMessage {
    fn to_hashable(&self) -> Hashable {
        self.elements.to_hashable()
    }
}

/// An ElGamal ciphertext (gamma, phi_1..phi_l), l >= 1, all components in
/// one Gq group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientCiphertext {
    gamma: GqElement,
    phis: GroupVector<GqElement>,
}

impl ElGamalMultiRecipientCiphertext {
    /// Builds a ciphertext from existing components.
    pub fn create(gamma: GqElement, phis: GroupVector<GqElement>) -> Result<Self> {
        if phis.is_empty() {
            return Err(CryptoError::InvalidInput(
                "A ciphertext must have at least one phi component.".into(),
            ));
        }
        if phis.group() != Some(gamma.group()) {
            return Err(CryptoError::GroupMismatch(
                "The gamma and phi components must belong to the same group.".into(),
            ));
        }
        Ok(ElGamalMultiRecipientCiphertext { gamma, phis })
    }

    /// Encrypts a message of length l under the first l public key elements:
    /// (g^r, m_i * pk_i^r).
    pub fn get_ciphertext(
        message: &ElGamalMultiRecipientMessage,
        exponent: &ZqElement,
        public_key: &ElGamalMultiRecipientPublicKey,
    ) -> Result<Self> {
        let l = message.size();
        if l > public_key.size() {
            return Err(CryptoError::ShapeError(
                "The message must be at most as long as the public key.".into(),
            ));
        }
        if message.group() != public_key.group() {
            return Err(CryptoError::GroupMismatch(
                "The message and the public key must belong to the same group.".into(),
            ));
        }
        if !message.group().has_same_order_as(exponent.group()) {
            return Err(CryptoError::GroupMismatch(
                "The exponent must have the order of the message group.".into(),
            ));
        }

        let group = message.group();
        let gamma = group.generator().exponentiate(exponent)?;
        let phis = message
            .elements()
            .iter()
            .zip(public_key.elements().iter().take(l))
            .map(|(m, pk)| m.multiply(&pk.exponentiate(exponent)?))
            .collect::<Result<Vec<_>>>()?;
        ElGamalMultiRecipientCiphertext::create(gamma, GroupVector::from_elements(phis)?)
    }

    /// The identity ciphertext (1, 1..1) of length `l`, neutral for
    /// [`multiply`](Self::multiply).
    pub fn neutral(l: usize, group: &GqGroup) -> Result<Self> {
        if l == 0 {
            return Err(CryptoError::InvalidInput(
                "The neutral ciphertext must have at least one phi.".into(),
            ));
        }
        ElGamalMultiRecipientCiphertext::create(
            group.identity(),
            GroupVector::from_elements(vec![group.identity(); l])?,
        )
    }

    /// Component-wise product of two ciphertexts of equal length:
    /// Enc(m1, r1) * Enc(m2, r2) = Enc(m1*m2, r1+r2).
    pub fn multiply(&self, other: &ElGamalMultiRecipientCiphertext) -> Result<Self> {
        if self.size() != other.size() {
            return Err(CryptoError::ShapeError(
                "Cannot multiply ciphertexts of different size.".into(),
            ));
        }
        let gamma = self.gamma.multiply(&other.gamma)?;
        let phis = self
            .phis
            .iter()
            .zip(other.phis.iter())
            .map(|(a, b)| a.multiply(b))
            .collect::<Result<Vec<_>>>()?;
        ElGamalMultiRecipientCiphertext::create(gamma, GroupVector::from_elements(phis)?)
    }

    /// Component-wise exponentiation: Enc(m, r)^a = Enc(m^a, r*a).
    pub fn exponentiate(&self, exponent: &ZqElement) -> Result<Self> {
        let gamma = self.gamma.exponentiate(exponent)?;
        let phis = self
            .phis
            .iter()
            .map(|phi| phi.exponentiate(exponent))
            .collect::<Result<Vec<_>>>()?;
        ElGamalMultiRecipientCiphertext::create(gamma, GroupVector::from_elements(phis)?)
    }

    /// The product of `ciphertexts[i]^{exponents[i]}` over a non-empty pair
    /// of equally long vectors.
    pub fn get_ciphertext_vector_exponentiation(
        ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
        exponents: &GroupVector<ZqElement>,
    ) -> Result<Self> {
        if ciphertexts.is_empty() {
            return Err(CryptoError::InvalidInput(
                "Cannot exponentiate an empty ciphertext vector.".into(),
            ));
        }
        if ciphertexts.len() != exponents.len() {
            return Err(CryptoError::ShapeError(
                "The ciphertext and exponent vectors must have the same size.".into(),
            ));
        }
        let mut product: Option<ElGamalMultiRecipientCiphertext> = None;
        for (ciphertext, exponent) in ciphertexts.iter().zip(exponents.iter()) {
            let term = ciphertext.exponentiate(exponent)?;
            product = Some(match product {
                None => term,
                Some(acc) => acc.multiply(&term)?,
            });
        }
        product.ok_or_else(|| {
            CryptoError::InvalidInput("Cannot exponentiate an empty ciphertext vector.".into())
        })
    }

    pub fn gamma(&self) -> &GqElement {
        &self.gamma
    }

    pub fn phis(&self) -> &GroupVector<GqElement> {
        &self.phis
    }

    /// The number of phi components.
    pub fn size(&self) -> usize {
        self.phis.len()
    }

    pub fn group(&self) -> &GqGroup {
        self.gamma.group()
    }
}

impl GroupVectorElement for ElGamalMultiRecipientCiphertext {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.gamma.group()
    }

    fn element_size(&self) -> usize {
        self.size()
    }
}

impl ToHashable for ElGamalMultiRecipientCiphertext {
    fn to_hashable(&self) -> Hashable {
        let mut values = vec![self.gamma.to_hashable()];
        values.extend(self.phis.iter().map(ToHashable::to_hashable));
        Hashable::List(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{gq_element, zq_element, FixedRandomSource};
    use num_bigint::BigUint;

    fn group_p11() -> GqGroup {
        GqGroup::new(
            BigUint::from(11u8),
            BigUint::from(5u8),
            BigUint::from(3u8),
        )
        .unwrap()
    }

    fn group_p23() -> GqGroup {
        GqGroup::new(
            BigUint::from(23u8),
            BigUint::from(11u8),
            BigUint::from(2u8),
        )
        .unwrap()
    }

    fn public_key(values: &[u8], group: &GqGroup) -> ElGamalMultiRecipientPublicKey {
        ElGamalMultiRecipientPublicKey::new(
            GroupVector::from_elements(values.iter().map(|&v| gq_element(v, group)).collect())
                .unwrap(),
        )
        .unwrap()
    }

    fn message(values: &[u8], group: &GqGroup) -> ElGamalMultiRecipientMessage {
        ElGamalMultiRecipientMessage::new(
            GroupVector::from_elements(values.iter().map(|&v| gq_element(v, group)).collect())
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn small_group_ciphertext_has_expected_components() {
        // p = 11, q = 5, g = 3; m = (4, 5), r = 2, pk = (5, 9).
        let group = group_p11();
        let zq = ZqGroup::same_order_as(&group);
        let m = message(&[4, 5], &group);
        let r = zq_element(2, &zq);
        let pk = public_key(&[5, 9], &group);

        let ciphertext =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m, &r, &pk).unwrap();

        assert_eq!(ciphertext.gamma(), &gq_element(9, &group));
        assert_eq!(ciphertext.phis().get(0).unwrap(), &gq_element(1, &group));
        assert_eq!(ciphertext.phis().get(1).unwrap(), &gq_element(9, &group));
    }

    #[test]
    fn encrypting_ones_yields_the_re_encryption_delta() {
        let group = group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let pk = public_key(&[8, 13, 4], &group);
        let ones = ElGamalMultiRecipientMessage::ones(&group, 3).unwrap();

        // Exponent 0 gives the fully neutral ciphertext.
        let neutral =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&ones, &zq.identity(), &pk).unwrap();
        assert_eq!(neutral.gamma(), &group.identity());
        assert!(neutral.phis().iter().all(|phi| phi == &group.identity()));

        // Exponent r gives the re-encryption delta (g^r, pk_i^r); with r = 1
        // that is (g, pk_1, ..., pk_k).
        let delta =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&ones, &zq.one(), &pk).unwrap();
        assert_eq!(delta.gamma(), &group.generator());
        assert_eq!(delta.phis(), pk.elements());
    }

    #[test]
    fn messages_longer_than_the_key_are_rejected() {
        let group = group_p11();
        let zq = ZqGroup::same_order_as(&group);
        let m = message(&[4, 5, 9], &group);
        let pk = public_key(&[5, 9], &group);
        assert!(matches!(
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m, &zq_element(2, &zq), &pk),
            Err(CryptoError::ShapeError(_))
        ));
    }

    #[test]
    fn shorter_messages_truncate_the_key() {
        let group = group_p11();
        let zq = ZqGroup::same_order_as(&group);
        let m = message(&[4], &group);
        let pk = public_key(&[5, 9], &group);
        let ciphertext =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m, &zq_element(2, &zq), &pk)
                .unwrap();
        assert_eq!(ciphertext.size(), 1);
    }

    #[test]
    fn decryption_inverts_encryption() {
        let group = group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let mut random = FixedRandomSource::of(&[5, 7, 3]);
        let key_pair = ElGamalMultiRecipientKeyPair::gen_key_pair(&group, 3, &mut random).unwrap();
        let m = message(&[4, 8, 3], &group);

        let ciphertext = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &m,
            &zq_element(7, &zq),
            key_pair.public_key(),
        )
        .unwrap();
        let decrypted =
            ElGamalMultiRecipientMessage::get_message(&ciphertext, key_pair.private_key())
                .unwrap();

        assert_eq!(decrypted, m);
    }

    #[test]
    fn generated_key_pairs_satisfy_the_key_relation() {
        let group = group_p23();
        let mut random = FixedRandomSource::of(&[3, 6, 1, 8]);
        let key_pair = ElGamalMultiRecipientKeyPair::gen_key_pair(&group, 4, &mut random).unwrap();

        let generator = group.generator();
        for i in 0..4 {
            let sk = key_pair.private_key().get(i).unwrap();
            let pk = key_pair.public_key().get(i).unwrap();
            assert_eq!(&generator.exponentiate(sk).unwrap(), pk);
        }
    }

    #[test]
    fn ciphertexts_are_homomorphic() {
        let group = group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let pk = public_key(&[8, 13, 4], &group);
        let m1 = message(&[4, 8, 3], &group);
        let m2 = message(&[3, 6, 4], &group);
        let r1 = zq_element(5, &zq);
        let r2 = zq_element(7, &zq);

        let c1 = ElGamalMultiRecipientCiphertext::get_ciphertext(&m1, &r1, &pk).unwrap();
        let c2 = ElGamalMultiRecipientCiphertext::get_ciphertext(&m2, &r2, &pk).unwrap();
        let product = c1.multiply(&c2).unwrap();

        let m_product = ElGamalMultiRecipientMessage::new(
            GroupVector::from_elements(
                m1.elements()
                    .iter()
                    .zip(m2.elements().iter())
                    .map(|(a, b)| a.multiply(b).unwrap())
                    .collect(),
            )
            .unwrap(),
        )
        .unwrap();
        let r_sum = r1.add(&r2).unwrap();
        let expected =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m_product, &r_sum, &pk).unwrap();

        assert_eq!(product, expected);
    }

    #[test]
    fn neutral_ciphertext_is_the_multiplicative_identity() {
        let group = group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let pk = public_key(&[8, 13, 4], &group);
        let m = message(&[16, 2, 9], &group);
        let c = ElGamalMultiRecipientCiphertext::get_ciphertext(&m, &zq_element(10, &zq), &pk)
            .unwrap();
        let neutral = ElGamalMultiRecipientCiphertext::neutral(3, &group).unwrap();
        assert_eq!(c.multiply(&neutral).unwrap(), c);
    }

    #[test]
    fn vector_exponentiation_folds_the_products() {
        let group = group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let pk = public_key(&[8, 13, 4], &group);
        let c0 = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message(&[4, 8, 3], &group),
            &zq_element(5, &zq),
            &pk,
        )
        .unwrap();
        let c1 = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message(&[3, 6, 4], &group),
            &zq_element(7, &zq),
            &pk,
        )
        .unwrap();
        let ciphertexts = GroupVector::from_elements(vec![c0.clone(), c1.clone()]).unwrap();
        let exponents = GroupVector::from_elements(vec![zq_element(2, &zq), zq_element(3, &zq)])
            .unwrap();

        let result = ElGamalMultiRecipientCiphertext::get_ciphertext_vector_exponentiation(
            &ciphertexts,
            &exponents,
        )
        .unwrap();
        let expected = c0
            .exponentiate(&zq_element(2, &zq))
            .unwrap()
            .multiply(&c1.exponentiate(&zq_element(3, &zq)).unwrap())
            .unwrap();
        assert_eq!(result, expected);
    }
}
