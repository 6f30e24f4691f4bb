//! Error types for the nzcore crates.
//!
//! Every failure mode surfaces as one [`Error`] with a closed set of codes.
//! Validation is the exception: it reports through
//! [`ValidationResult`](crate::validation::ValidationResult) and never errors.

use thiserror::Error;

/// Core error type. The variant set is frozen; collaborators match on
/// [`Error::code`] rather than on display text.
#[derive(Debug, Error)]
pub enum Error {
    /// BIP-39 validation or decoding failure.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Seed derivation from an otherwise valid mnemonic failed.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// Hex parsing, key length, or KDF backend failure.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signing or verification produced an unexpected result.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Canonical form assertion failed. Raised before any signature
    /// verification on non-canonical input.
    #[error("non-canonical JSON: {0}")]
    NonCanonicalJson(String),

    /// A merge helper's preconditions on conflicting hashes were not met.
    #[error("fork detected: {0}")]
    ForkDetected(String),

    /// Non-positive, non-strictly-increasing, overflowing, or frozen-clock
    /// logical time.
    #[error("logical time violation: {0}")]
    LogicalTimeViolation(String),

    /// A document declared a crypto suite other than the pinned one.
    #[error("crypto suite mismatch: expected {expected}, got {got}")]
    CryptoSuiteMismatch { expected: String, got: String },

    /// Generic validator-level failure (chain id mismatch on import,
    /// destroyed facade, duplicate append).
    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

impl Error {
    /// The stable code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidMnemonic(_) => "InvalidMnemonic",
            Error::InvalidSeed(_) => "InvalidSeed",
            Error::InvalidKey(_) => "InvalidKey",
            Error::InvalidSignature(_) => "InvalidSignature",
            Error::NonCanonicalJson(_) => "NonCanonicalJson",
            Error::ForkDetected(_) => "ForkDetected",
            Error::LogicalTimeViolation(_) => "LogicalTimeViolation",
            Error::CryptoSuiteMismatch { .. } => "CryptoSuiteMismatch",
            Error::ValidationFailed(_) => "ValidationFailed",
        }
    }
}

/// Result type for nzcore operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let cases: Vec<(Error, &str)> = vec![
            (Error::InvalidMnemonic("x".into()), "InvalidMnemonic"),
            (Error::InvalidSeed("x".into()), "InvalidSeed"),
            (Error::InvalidKey("x".into()), "InvalidKey"),
            (Error::InvalidSignature("x".into()), "InvalidSignature"),
            (Error::NonCanonicalJson("x".into()), "NonCanonicalJson"),
            (Error::ForkDetected("x".into()), "ForkDetected"),
            (Error::LogicalTimeViolation("x".into()), "LogicalTimeViolation"),
            (
                Error::CryptoSuiteMismatch {
                    expected: "a".into(),
                    got: "b".into(),
                },
                "CryptoSuiteMismatch",
            ),
            (Error::ValidationFailed("x".into()), "ValidationFailed"),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_display_carries_context() {
        let err = Error::CryptoSuiteMismatch {
            expected: "nzcore-crypto-01".into(),
            got: "other-02".into(),
        };
        let text = err.to_string();
        assert!(text.contains("nzcore-crypto-01"));
        assert!(text.contains("other-02"));
    }
}
