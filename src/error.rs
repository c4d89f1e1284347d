use thiserror::Error;

/// Error taxonomy of the cryptographic core. At most one error kind is
/// reported per call; the message names the violated requirement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// An argument is empty, out of range or outside its domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two operands belong to incompatible groups.
    #[error("group mismatch: {0}")]
    GroupMismatch(String),

    /// Vector or matrix dimensions are inconsistent across related inputs.
    #[error("shape error: {0}")]
    ShapeError(String),

    /// A prover was given a statement/witness pair that does not satisfy the
    /// relation.
    #[error("inconsistent witness: {0}")]
    WitnessInconsistent(String),

    /// The configured hash is too long for the group order and would bias a
    /// Fiat-Shamir challenge.
    #[error("hash bit length too large: {0}")]
    BitLengthTooLarge(String),

    /// A global precondition does not hold.
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
