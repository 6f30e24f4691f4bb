//! Document: the atomic unit of the chain.
//!
//! A document is an immutable, signed record. Once appended it is never
//! edited; corrections are new documents. Unknown top-level fields are
//! preserved verbatim and covered by the signature.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bytes::is_lower_hex;
use crate::canonical;
use crate::crypto::CRYPTO_SUITE;
use crate::error::{Error, Result};
use crate::types::{ChainId, DocumentId};

/// The current document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Name of the signature field stripped before signing.
pub const SIGNATURE_FIELD: &str = "signature";

/// The schema field names, in wire vocabulary.
pub const SCHEMA_FIELDS: &[&str] = &[
    "type",
    "version",
    "id",
    "chain_id",
    "parent_hash",
    "logical_time",
    "crypto_suite",
    "created_at",
    "payload",
    SIGNATURE_FIELD,
];

/// A complete document. Hex-valued fields are 64 (ids) or 128 (signature)
/// lowercase characters on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Application-defined record type.
    #[serde(rename = "type")]
    pub doc_type: String,

    /// Schema version (currently "1.0").
    pub version: String,

    /// Derived identifier: a pure function of chain id, parent hash, and
    /// logical time.
    pub id: String,

    /// The chain this document belongs to.
    pub chain_id: String,

    /// Id of the preceding document, or 64 zeros for the first one.
    pub parent_hash: String,

    /// Position in the chain's logical time (≥ 1).
    pub logical_time: u64,

    /// The pinned crypto suite identifier.
    pub crypto_suite: String,

    /// Author-claimed RFC 3339 timestamp. Informational only; no check
    /// reads it.
    pub created_at: String,

    /// Opaque application payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Ed25519 signature over the canonical form minus this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Unknown top-level fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Start building a document.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Full canonical serialization, signature included.
    pub fn canonical_json(&self) -> Result<String> {
        let value = serde_json::to_value(self)
            .map_err(|e| Error::NonCanonicalJson(format!("serialize: {e}")))?;
        canonical::to_canonical_json(&value)
    }

    /// The canonical bytes the signature covers.
    pub fn signing_json(&self) -> Result<String> {
        canonical::prepare_for_signing(self)
    }

    /// Look up an unknown top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Whether the document carries a signature.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Parse a document from canonical wire text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::ValidationFailed(format!("parse: {e}")))
    }
}

/// Builder for documents: record fields fluently, consume once with
/// [`DocumentBuilder::build`]. The builder never touches private key
/// material; signing happens at the facade.
#[derive(Debug, Default, Clone)]
pub struct DocumentBuilder {
    doc_type: Option<String>,
    version: Option<String>,
    id: Option<String>,
    chain_id: Option<String>,
    parent_hash: Option<String>,
    logical_time: Option<u64>,
    crypto_suite: Option<String>,
    created_at: Option<String>,
    payload: Option<Value>,
    extra: Map<String, Value>,
}

impl DocumentBuilder {
    /// Start with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record type.
    pub fn doc_type(mut self, value: impl Into<String>) -> Self {
        self.doc_type = Some(value.into());
        self
    }

    /// Set the schema version.
    pub fn version(mut self, value: impl Into<String>) -> Self {
        self.version = Some(value.into());
        self
    }

    /// Set an explicit id instead of deriving one.
    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    /// Set the chain id.
    pub fn chain_id(mut self, value: impl Into<String>) -> Self {
        self.chain_id = Some(value.into());
        self
    }

    /// Set the parent hash.
    pub fn parent_hash(mut self, value: impl Into<String>) -> Self {
        self.parent_hash = Some(value.into());
        self
    }

    /// Set the logical time.
    pub fn logical_time(mut self, value: u64) -> Self {
        self.logical_time = Some(value);
        self
    }

    /// Set the crypto suite. Anything but the pinned suite fails at build.
    pub fn crypto_suite(mut self, value: impl Into<String>) -> Self {
        self.crypto_suite = Some(value.into());
        self
    }

    /// Set the informational creation timestamp.
    pub fn created_at(mut self, value: impl Into<String>) -> Self {
        self.created_at = Some(value.into());
        self
    }

    /// Set the payload.
    pub fn payload(mut self, value: Value) -> Self {
        self.payload = Some(value);
        self
    }

    /// Add an unknown top-level field. Refuses to shadow a schema field or
    /// overwrite a field that is already set.
    pub fn add_field(mut self, key: impl Into<String>, value: Value) -> Result<Self> {
        let key = key.into();
        if SCHEMA_FIELDS.contains(&key.as_str()) {
            return Err(Error::ValidationFailed(format!(
                "field {key:?} is a schema field; use its setter"
            )));
        }
        if self.extra.contains_key(&key) {
            return Err(Error::ValidationFailed(format!(
                "field {key:?} is already set"
            )));
        }
        self.extra.insert(key, value);
        Ok(self)
    }

    /// Assemble the document.
    ///
    /// Requires `type`, `chain_id`, `parent_hash`, and `logical_time`.
    /// Defaults `version` and `crypto_suite` to the pinned values and
    /// `created_at` to now; derives `id` when unset.
    pub fn build(self) -> Result<Document> {
        let doc_type = self
            .doc_type
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::ValidationFailed("document type is required".into()))?;
        let chain_id_hex = self
            .chain_id
            .ok_or_else(|| Error::ValidationFailed("chain_id is required".into()))?;
        let parent_hash = self
            .parent_hash
            .ok_or_else(|| Error::ValidationFailed("parent_hash is required".into()))?;
        let logical_time = self
            .logical_time
            .ok_or_else(|| Error::ValidationFailed("logical_time is required".into()))?;

        if logical_time == 0 {
            return Err(Error::LogicalTimeViolation(
                "logical_time must be at least 1".into(),
            ));
        }

        let crypto_suite = self.crypto_suite.unwrap_or_else(|| CRYPTO_SUITE.to_string());
        if crypto_suite != CRYPTO_SUITE {
            return Err(Error::CryptoSuiteMismatch {
                expected: CRYPTO_SUITE.to_string(),
                got: crypto_suite,
            });
        }

        if !is_lower_hex(&chain_id_hex, 64) {
            return Err(Error::ValidationFailed(
                "chain_id must be 64 lowercase hex characters".into(),
            ));
        }
        if !is_lower_hex(&parent_hash, 64) {
            return Err(Error::ValidationFailed(
                "parent_hash must be 64 lowercase hex characters".into(),
            ));
        }

        let id = match self.id {
            Some(id) => id,
            None => {
                let chain = ChainId::from_hex(&chain_id_hex)?;
                let parent = DocumentId::from_hex(&parent_hash)?;
                DocumentId::derive(&chain, &parent, logical_time)?.to_hex()
            }
        };

        let doc = Document {
            doc_type,
            version: self.version.unwrap_or_else(|| DOCUMENT_VERSION.to_string()),
            id,
            chain_id: chain_id_hex,
            parent_hash,
            logical_time,
            crypto_suite,
            created_at: self
                .created_at
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            payload: self.payload,
            signature: None,
            extra: self.extra,
        };

        // A document that cannot canonicalize must not leave the builder.
        doc.canonical_json()?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_builder() -> DocumentBuilder {
        Document::builder()
            .doc_type("test")
            .chain_id("11".repeat(32))
            .parent_hash("0".repeat(64))
            .logical_time(2)
    }

    #[test]
    fn test_build_applies_defaults() {
        let doc = base_builder().build().unwrap();
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert_eq!(doc.crypto_suite, CRYPTO_SUITE);
        assert!(!doc.created_at.is_empty());
        assert!(doc.payload.is_none());
        assert!(!doc.is_signed());
    }

    #[test]
    fn test_build_derives_id() {
        let doc = base_builder().build().unwrap();
        let chain = ChainId::from_hex(&doc.chain_id).unwrap();
        let parent = DocumentId::from_hex(&doc.parent_hash).unwrap();
        let expected = DocumentId::derive(&chain, &parent, doc.logical_time).unwrap();
        assert_eq!(doc.id, expected.to_hex());
    }

    #[test]
    fn test_build_keeps_explicit_id() {
        let doc = base_builder().id("ab".repeat(32)).build().unwrap();
        assert_eq!(doc.id, "ab".repeat(32));
    }

    #[test]
    fn test_missing_required_fields() {
        let missing_type = Document::builder()
            .chain_id("11".repeat(32))
            .parent_hash("0".repeat(64))
            .logical_time(2)
            .build();
        assert!(matches!(missing_type, Err(Error::ValidationFailed(_))));

        let missing_time = Document::builder()
            .doc_type("test")
            .chain_id("11".repeat(32))
            .parent_hash("0".repeat(64))
            .build();
        assert!(missing_time.is_err());
    }

    #[test]
    fn test_rejects_zero_logical_time() {
        let result = base_builder().logical_time(0).build();
        assert!(matches!(result, Err(Error::LogicalTimeViolation(_))));
    }

    #[test]
    fn test_rejects_foreign_suite() {
        let result = base_builder().crypto_suite("other-suite-99").build();
        match result {
            Err(Error::CryptoSuiteMismatch { expected, got }) => {
                assert_eq!(expected, CRYPTO_SUITE);
                assert_eq!(got, "other-suite-99");
            }
            other => panic!("expected CryptoSuiteMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_malformed_hex_fields() {
        assert!(base_builder().parent_hash("xyz").build().is_err());
        let bad_chain = Document::builder()
            .doc_type("test")
            .chain_id("UPPER".repeat(13))
            .parent_hash("0".repeat(64))
            .logical_time(2)
            .build();
        assert!(bad_chain.is_err());
    }

    #[test]
    fn test_add_field_preserved_and_protected() {
        let doc = base_builder()
            .add_field("annotation", json!({"note": "kept"}))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(doc.get("annotation"), Some(&json!({"note": "kept"})));

        let clash = base_builder().add_field("type", json!("x"));
        assert!(clash.is_err());

        let dup = base_builder()
            .add_field("k", json!(1))
            .unwrap()
            .add_field("k", json!(2));
        assert!(dup.is_err());
    }

    #[test]
    fn test_unknown_fields_survive_serde_roundtrip() {
        let doc = base_builder()
            .add_field("custom_tag", json!("v"))
            .unwrap()
            .build()
            .unwrap();
        let text = doc.canonical_json().unwrap();
        let back = Document::from_json(&text).unwrap();
        assert_eq!(back.get("custom_tag"), Some(&json!("v")));
        assert_eq!(back, doc);
    }

    #[test]
    fn test_canonical_json_is_sorted_and_tight() {
        let doc = base_builder().payload(json!({"b": 1, "a": 2})).build().unwrap();
        let text = doc.canonical_json().unwrap();
        assert!(!text.contains(' '));
        let chain_pos = text.find("\"chain_id\"").unwrap();
        let created_pos = text.find("\"created_at\"").unwrap();
        let type_pos = text.find("\"type\"").unwrap();
        assert!(chain_pos < created_pos && created_pos < type_pos);
        // Payload keys are sorted too.
        assert!(text.contains(r#""payload":{"a":2,"b":1}"#));
    }

    #[test]
    fn test_signing_json_omits_signature() {
        let mut doc = base_builder().build().unwrap();
        doc.signature = Some("ff".repeat(64));
        let signing = doc.signing_json().unwrap();
        assert!(!signing.contains("signature"));
        let full = doc.canonical_json().unwrap();
        assert!(full.contains("signature"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Document::from_json("{").is_err());
        assert!(Document::from_json(r#"{"type":"x"}"#).is_err());
    }
}
