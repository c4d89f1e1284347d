//! Re-encrypting shuffle of a ciphertext batch.

use crate::elgamal::{
    ElGamalMultiRecipientCiphertext, ElGamalMultiRecipientMessage, ElGamalMultiRecipientPublicKey,
};
use crate::error::{CryptoError, Result};
use crate::math::group_vector::GroupVector;
use crate::math::zq_group::{ZqElement, ZqGroup};
use crate::mixnet::permutation::{gen_permutation, Permutation};
use crate::random::RandomSource;

/// The result of a re-encrypting shuffle: the shuffled, re-encrypted
/// ciphertexts together with the permutation and the re-encryption exponents
/// that produced them. The latter two form the shuffle witness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shuffle {
    ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
    permutation: Permutation,
    re_encryption_exponents: GroupVector<ZqElement>,
}

impl Shuffle {
    pub fn ciphertexts(&self) -> &GroupVector<ElGamalMultiRecipientCiphertext> {
        &self.ciphertexts
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn re_encryption_exponents(&self) -> &GroupVector<ZqElement> {
        &self.re_encryption_exponents
    }
}

/// Shuffles and re-encrypts a batch of ciphertexts:
///
///     C'_i = Enc_pk(ones, rho_i) * C_{pi(i)}
///
/// with a fresh uniform permutation pi and fresh exponents rho. Draws N
/// permutation offsets followed by N exponents.
pub fn gen_shuffle(
    ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
    public_key: &ElGamalMultiRecipientPublicKey,
    random: &mut (impl RandomSource + ?Sized),
) -> Result<Shuffle> {
    if ciphertexts.is_empty() {
        return Err(CryptoError::InvalidInput(
            "Cannot shuffle an empty ciphertext vector.".into(),
        ));
    }
    let l = ciphertexts.element_size();
    if l > public_key.size() {
        return Err(CryptoError::ShapeError(
            "The ciphertexts must not be longer than the public key.".into(),
        ));
    }
    if ciphertexts.group() != Some(public_key.group()) {
        return Err(CryptoError::GroupMismatch(
            "The ciphertexts and the public key must belong to the same group.".into(),
        ));
    }

    let n = ciphertexts.len();
    let group = public_key.group();
    let zq_group = ZqGroup::same_order_as(group);

    let permutation = gen_permutation(n, random)?;
    let exponents = random.gen_random_zq_vector(&zq_group, n);
    let ones = ElGamalMultiRecipientMessage::ones(group, l)?;

    let mut shuffled = Vec::with_capacity(n);
    for i in 0..n {
        let rho_i = exponents.get(i).ok_or_else(|| {
            CryptoError::ShapeError("Missing re-encryption exponent.".into())
        })?;
        let delta = ElGamalMultiRecipientCiphertext::get_ciphertext(&ones, rho_i, public_key)?;
        let source = ciphertexts.get(permutation.get(i)?).ok_or_else(|| {
            CryptoError::InvalidInput("The permutation points outside the batch.".into())
        })?;
        shuffled.push(delta.multiply(source)?);
    }

    Ok(Shuffle {
        ciphertexts: GroupVector::from_elements(shuffled)?,
        permutation,
        re_encryption_exponents: exponents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::ElGamalMultiRecipientKeyPair;
    use crate::random::RandomService;
    use crate::test_utils::{gen_random_message, gq_group_p23};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn shuffled_batches_decrypt_to_the_permuted_messages() {
        let group = gq_group_p23();
        let zq = ZqGroup::same_order_as(&group);
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(5));
        let key_pair = ElGamalMultiRecipientKeyPair::gen_key_pair(&group, 3, &mut random).unwrap();

        let messages: Vec<_> = (0..4)
            .map(|_| gen_random_message(&group, 3, &mut random))
            .collect();
        let ciphertexts = GroupVector::from_elements(
            messages
                .iter()
                .map(|m| {
                    ElGamalMultiRecipientCiphertext::get_ciphertext(
                        m,
                        &random.gen_random_zq_element(&zq),
                        key_pair.public_key(),
                    )
                    .unwrap()
                })
                .collect(),
        )
        .unwrap();

        let shuffle = gen_shuffle(&ciphertexts, key_pair.public_key(), &mut random).unwrap();

        for i in 0..4 {
            let decrypted = ElGamalMultiRecipientMessage::get_message(
                shuffle.ciphertexts().get(i).unwrap(),
                key_pair.private_key(),
            )
            .unwrap();
            let expected = &messages[shuffle.permutation().get(i).unwrap()];
            assert_eq!(&decrypted, expected);
        }
    }

    #[test]
    fn shuffling_nothing_is_rejected() {
        let group = gq_group_p23();
        let mut random = RandomService::with_rng(ChaCha20Rng::seed_from_u64(5));
        let key_pair = ElGamalMultiRecipientKeyPair::gen_key_pair(&group, 2, &mut random).unwrap();
        let empty = GroupVector::empty();
        assert!(gen_shuffle(&empty, key_pair.public_key(), &mut random).is_err());
    }
}
