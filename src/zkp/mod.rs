//! Non-interactive zero-knowledge proofs accompanying the mixnet:
//! decryption proofs with their batch API, exponentiation proofs and
//! Schnorr proofs.

pub mod decryption_proof;
pub mod exponentiation_proof;
pub mod schnorr_proof;

pub use decryption_proof::{
    compute_phi_decryption, DecryptionProof, DecryptionProofService, VerifiableDecryptions,
};
pub use exponentiation_proof::{ExponentiationProof, ExponentiationProofService};
pub use schnorr_proof::{SchnorrProof, SchnorrProofService};
