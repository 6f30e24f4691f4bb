//! # nzcore
//!
//! A personal autonomous root of trust: one mnemonic deterministically
//! becomes an Ed25519 identity, and that identity maintains a signed,
//! hash-linked, append-only document chain that verifies offline.
//!
//! The [`Root`] facade does ONE thing: own an identity and its chain.
//!
//! ## Core Types
//!
//! - [`Root`] - The owning handle over identity, clock, and chain
//! - [`ChainStore`] - The append-only document log with its logical clock
//! - [`ForkInfo`] - A detected set of competing branches
//!
//! ## Core Invariants
//!
//! 1. **Deterministic identity**: the same mnemonic always yields the same
//!    public key and chain id
//! 2. **Hash linkage**: every document's `parent_hash` is its predecessor's id
//! 3. **Monotonic time**: `logical_time` strictly increases along the chain
//! 4. **Signature coverage**: canonical bytes minus the signature field
//! 5. **Manual forks**: the core detects forks, it never resolves them
//!
//! ## Example
//!
//! ```
//! use nzcore::{Root, RootOptions};
//! use serde_json::json;
//!
//! let mnemonic = "abandon abandon abandon abandon abandon abandon \
//!                 abandon abandon abandon abandon abandon about";
//! let mut root = Root::create(mnemonic, RootOptions::default()).unwrap();
//!
//! let doc = root
//!     .create_document("note", Some(json!({"message": "hello"})))
//!     .unwrap();
//!
//! assert!(root.verify_document(&doc).passed);
//! assert!(root.verify_integrity().unwrap());
//! # root.destroy();
//! ```

pub mod chain;
pub mod fork;
pub mod root;

pub use chain::{ChainStore, Page, PageQuery, SortOrder};
pub use fork::{
    create_merge_document, is_fork_active, resolve_fork, scan, ForkInfo, MERGE_DOC_TYPE,
};
pub use root::{ChainSnapshot, IdentityExport, Root, RootOptions};

pub use nzcore_core::{
    self as core, ChainId, Document, DocumentBuilder, DocumentId, DocumentPolicy,
    Ed25519PublicKey, Ed25519Signature, Error, LogicalClock, Result, ValidationContext,
    ValidationResult, CRYPTO_SUITE, DOCUMENT_VERSION, MAX_LOGICAL_TIME,
};
