//! Algebra over the prime-order subgroup Gq of Z/pZ and its exponent group
//! Zq, plus the homogeneous containers the argument engine is built on.

pub mod conversions;
pub mod group_matrix;
pub mod group_vector;
pub mod gq_group;
pub mod primes;
pub mod zq_group;

pub use conversions::{byte_array_to_integer, integer_to_byte_array};
pub use group_matrix::GroupMatrix;
pub use group_vector::{GroupVector, GroupVectorElement};
pub use gq_group::{get_small_prime_group_members, GqElement, GqGroup};
pub use primes::is_small_prime;
pub use zq_group::{ZqElement, ZqGroup};
