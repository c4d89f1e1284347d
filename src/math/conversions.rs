//! Byte-level codecs shared by the recursive hasher, the KDF and the
//! commitment-key derivation.

use num_bigint::BigUint;
use num_traits::Zero;

/// Converts a non-negative integer to its minimum-length big-endian byte
/// representation. Zero encodes as a single `0x00` byte; no other value
/// carries a leading zero byte.
pub fn integer_to_byte_array(x: &BigUint) -> Vec<u8> {
    // BigUint::to_bytes_be is already minimal for positive values and yields
    // [0] for zero, which is exactly the required encoding.
    x.to_bytes_be()
}

/// Converts a big-endian byte array to the non-negative integer it
/// represents. Leading zero bytes are allowed and do not change the value.
pub fn byte_array_to_integer(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Converts a string to its UTF-8 byte representation.
pub fn string_to_byte_array(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

/// Keeps the `bit_length` least significant bits of a big-endian byte array,
/// returned as the shortest big-endian array holding that many bits.
///
/// `bit_length` must be strictly positive and at most `8 * bytes.len()`.
pub fn cut_to_bit_length(bytes: &[u8], bit_length: usize) -> Vec<u8> {
    debug_assert!(bit_length > 0 && bit_length <= 8 * bytes.len());

    let num_bytes = bit_length.div_ceil(8);
    let mut cut = bytes[bytes.len() - num_bytes..].to_vec();
    let remainder = bit_length % 8;
    if remainder != 0 {
        cut[0] &= 0xFF >> (8 - remainder);
    }
    cut
}

/// Number of bytes needed to represent `x`, at least one.
pub fn byte_length(x: &BigUint) -> usize {
    if x.is_zero() {
        1
    } else {
        (x.bits() as usize).div_ceil(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::RandBigInt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// The pseudo-code shift-loop encoding; kept only to demonstrate that the
    /// production codec produces identical output.
    fn integer_to_byte_array_reference(x: &BigUint) -> Vec<u8> {
        if x.is_zero() {
            return vec![0u8];
        }
        let n = (x.bits() as usize).div_ceil(8);
        let mut output = vec![0u8; n];
        let mut current = x.clone();
        for i in 1..=n {
            output[n - i] = (current.clone() & BigUint::from(0xFFu8))
                .to_bytes_be()
                .pop()
                .unwrap_or(0);
            current >>= 8;
        }
        output
    }

    #[test]
    fn zero_encodes_as_a_single_zero_byte() {
        assert_eq!(integer_to_byte_array(&BigUint::zero()), vec![0u8]);
    }

    #[test]
    fn encoding_has_no_leading_zero_byte() {
        let x = BigUint::from(256u32);
        assert_eq!(integer_to_byte_array(&x), vec![1, 0]);
        let y = BigUint::from(255u32);
        assert_eq!(integer_to_byte_array(&y), vec![255]);
    }

    #[test]
    fn fast_encoding_matches_reference_encoding() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        for bits in [1, 7, 8, 9, 63, 64, 65, 255, 2048] {
            for _ in 0..20 {
                let x = rng.gen_biguint(bits);
                assert_eq!(
                    integer_to_byte_array(&x),
                    integer_to_byte_array_reference(&x),
                    "encodings diverge for {x}"
                );
            }
        }
    }

    #[test]
    fn encoding_round_trips() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..100 {
            let x = rng.gen_biguint(300);
            assert_eq!(byte_array_to_integer(&integer_to_byte_array(&x)), x);
        }
    }

    #[test]
    fn decoding_ignores_leading_zero_bytes() {
        assert_eq!(
            byte_array_to_integer(&[0, 0, 1, 2]),
            byte_array_to_integer(&[1, 2])
        );
    }

    #[test]
    fn cut_to_bit_length_keeps_low_bits() {
        // 0x0ABC = 0b101010111100
        let bytes = vec![0x0A, 0xBC];
        assert_eq!(cut_to_bit_length(&bytes, 16), vec![0x0A, 0xBC]);
        assert_eq!(cut_to_bit_length(&bytes, 12), vec![0x0A, 0xBC]);
        assert_eq!(cut_to_bit_length(&bytes, 10), vec![0x02, 0xBC]);
        assert_eq!(cut_to_bit_length(&bytes, 8), vec![0xBC]);
        assert_eq!(cut_to_bit_length(&bytes, 3), vec![0x04]);
    }

    #[test]
    fn byte_length_counts_minimal_bytes() {
        assert_eq!(byte_length(&BigUint::zero()), 1);
        assert_eq!(byte_length(&BigUint::from(255u32)), 1);
        assert_eq!(byte_length(&BigUint::from(256u32)), 2);
    }
}
