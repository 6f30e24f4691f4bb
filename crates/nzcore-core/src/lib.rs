//! # nzcore-core
//!
//! Pure primitives for nzcore: the pinned crypto suite, canonical JSON,
//! deterministic identity derivation, the logical clock, the document model,
//! and the three-layer validator.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Document`] - The atomic unit of the chain, canonicalized per RFC 8785
//! - [`DocumentId`] / [`ChainId`] - Derived, domain-separated identifiers
//! - [`RootIdentity`] - Key material derived deterministically from a mnemonic
//! - [`LogicalClock`] - The only notion of time the chain trusts
//!
//! ## Core Invariants
//!
//! 1. **Deterministic identity**: one mnemonic, one keypair, one chain id
//! 2. **Deterministic ids**: `id = H(chain_id ‖ parent ‖ time)`, domain-separated
//! 3. **Canonical bytes**: semantically equal documents are byte-equal
//! 4. **Signature coverage**: everything except the `signature` field itself
//! 5. **Monotonic time**: the clock only moves forward

pub mod bytes;
pub mod canonical;
pub mod clock;
pub mod crypto;
pub mod document;
pub mod error;
pub mod identity;
pub mod mnemonic;
pub mod types;
pub mod validation;

pub use canonical::{assert_canonical, canonical_equal, prepare_for_signing, to_canonical_json};
pub use clock::{ClockState, LogicalClock, CLOCK_STATE_VERSION, MAX_LOGICAL_TIME};
pub use crypto::{
    Blake2bHash, Ed25519PublicKey, Ed25519Signature, Keypair, CHAIN_DOMAIN, CRYPTO_SUITE,
    DOCUMENT_DOMAIN, SIGNATURE_LEN,
};
pub use document::{Document, DocumentBuilder, DOCUMENT_VERSION, SIGNATURE_FIELD};
pub use error::{Error, Result};
pub use identity::RootIdentity;
pub use types::{ChainId, DocumentId};
pub use validation::{
    quick_validate, validate, validate_chain, validate_str, DocumentPolicy, ValidationContext,
    ValidationResult,
};
