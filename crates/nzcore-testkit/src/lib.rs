//! # nzcore-testkit
//!
//! Testing utilities for nzcore.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a ready-made root from the well-known test mnemonic,
//!   with helpers to grow and fork chains
//! - **Generators**: proptest strategies for document parameters
//!
//! ## Fixtures
//!
//! ```rust
//! use nzcore_testkit::fixtures::TestFixture;
//!
//! let mut fixture = TestFixture::new();
//! let doc = fixture.append("note", Some(serde_json::json!({"k": 1})));
//! assert!(fixture.root.verify_document(&doc).passed);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use nzcore_testkit::generators::doc_params;
//!
//! proptest! {
//!     #[test]
//!     fn created_documents_verify(params in doc_params()) {
//!         let mut fixture = nzcore_testkit::fixtures::TestFixture::new();
//!         let doc = fixture.append(&params.doc_type, params.payload.clone());
//!         prop_assert!(fixture.root.verify_document(&doc).passed);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{TestFixture, TEST_MNEMONIC};
pub use generators::{doc_params, DocParams};
