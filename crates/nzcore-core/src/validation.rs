//! Document validation: structural, cryptographic, and policy layers.
//!
//! Layers run strictly in order and later layers run only when every prior
//! layer passed. Validation never returns an error; every failure is encoded
//! in the returned [`ValidationResult`].

use serde::{Deserialize, Serialize};

use crate::bytes::is_lower_hex;
use crate::canonical;
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, CRYPTO_SUITE};
use crate::document::{Document, DOCUMENT_VERSION};
use crate::error::{Error, Result};

/// Application-defined predicate over a document, evaluated last.
pub trait DocumentPolicy {
    /// Return `Err` with a reason to veto the document.
    fn evaluate(&self, doc: &Document) -> std::result::Result<(), String>;
}

impl<F> DocumentPolicy for F
where
    F: Fn(&Document) -> std::result::Result<(), String>,
{
    fn evaluate(&self, doc: &Document) -> std::result::Result<(), String> {
        self(doc)
    }
}

/// Inputs to validation beyond the document itself.
#[derive(Default)]
pub struct ValidationContext<'a> {
    /// Keys the signature may verify against. At least one is required for
    /// the cryptographic layer to pass.
    pub trusted_keys: Vec<Ed25519PublicKey>,
    /// The verifier's logical time; a document from the future draws a
    /// warning, not a failure.
    pub current_time: Option<u64>,
    /// Optional policy layer.
    pub policy: Option<&'a dyn DocumentPolicy>,
}

/// Outcome of the three layers. A layer that never ran reports `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub structural_valid: bool,
    pub cryptographic_valid: bool,
    pub policy_valid: bool,
    /// Conjunction of the three layers.
    #[serde(rename = "final")]
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn failed(errors: Vec<String>) -> Self {
        Self {
            structural_valid: false,
            cryptographic_valid: false,
            policy_valid: false,
            passed: false,
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Validate a document against a context.
pub fn validate(doc: &Document, ctx: &ValidationContext<'_>) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let structural_valid = structural_layer(doc, &mut errors);
    let cryptographic_valid =
        structural_valid && cryptographic_layer(doc, ctx, &mut errors, &mut warnings);
    let policy_valid = cryptographic_valid && policy_layer(doc, ctx, &mut errors);

    ValidationResult {
        structural_valid,
        cryptographic_valid,
        policy_valid,
        passed: structural_valid && cryptographic_valid && policy_valid,
        errors,
        warnings,
    }
}

/// Validate raw wire text. Non-canonical input fails the cryptographic
/// layer before any signature work.
pub fn validate_str(text: &str, ctx: &ValidationContext<'_>) -> ValidationResult {
    let doc = match Document::from_json(text) {
        Ok(doc) => doc,
        Err(e) => return ValidationResult::failed(vec![e.to_string()]),
    };

    if let Err(e) = canonical::assert_canonical(text) {
        let mut errors = Vec::new();
        let structural_valid = structural_layer(&doc, &mut errors);
        errors.push(e.to_string());
        return ValidationResult {
            structural_valid,
            cryptographic_valid: false,
            policy_valid: false,
            passed: false,
            errors,
            warnings: Vec::new(),
        };
    }

    validate(&doc, ctx)
}

/// Cryptographic layer alone, against a single key.
pub fn quick_validate(doc: &Document, public_key: &Ed25519PublicKey) -> bool {
    let ctx = ValidationContext {
        trusted_keys: vec![*public_key],
        ..Default::default()
    };
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    cryptographic_layer(doc, &ctx, &mut errors, &mut warnings)
}

/// Verify the hash linkage and time ordering of a set of documents.
pub fn validate_chain(documents: &[Document]) -> Result<()> {
    let mut sorted: Vec<&Document> = documents.iter().collect();
    sorted.sort_by_key(|d| d.logical_time);

    for pair in sorted.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if curr.logical_time <= prev.logical_time {
            return Err(Error::LogicalTimeViolation(format!(
                "logical time {} does not increase past {}",
                curr.logical_time, prev.logical_time
            )));
        }
        if curr.parent_hash != prev.id {
            return Err(Error::ValidationFailed(format!(
                "document {} does not link to {}",
                curr.id, prev.id
            )));
        }
    }
    Ok(())
}

fn structural_layer(doc: &Document, errors: &mut Vec<String>) -> bool {
    let before = errors.len();

    // 1. Required string fields present and non-empty
    for (name, value) in [
        ("type", &doc.doc_type),
        ("version", &doc.version),
        ("id", &doc.id),
        ("chain_id", &doc.chain_id),
        ("parent_hash", &doc.parent_hash),
        ("crypto_suite", &doc.crypto_suite),
        ("created_at", &doc.created_at),
    ] {
        if value.is_empty() {
            errors.push(format!("required field {name} is empty"));
        }
    }

    // 2. Logical time lower bound
    if doc.logical_time < 1 {
        errors.push("logical_time must be at least 1".into());
    }

    // 3. Pinned suite and version
    if doc.crypto_suite != CRYPTO_SUITE {
        errors.push(format!(
            "crypto_suite must be {CRYPTO_SUITE}, got {:?}",
            doc.crypto_suite
        ));
    }
    if doc.version != DOCUMENT_VERSION {
        errors.push(format!(
            "version must be {DOCUMENT_VERSION}, got {:?}",
            doc.version
        ));
    }

    // 4. Signature present
    match &doc.signature {
        Some(sig) if !sig.is_empty() => {}
        _ => errors.push("signature is missing".into()),
    }

    // 5. Parent hash shape
    if !is_lower_hex(&doc.parent_hash, 64) {
        errors.push("parent_hash must be 64 lowercase hex characters".into());
    }

    errors.len() == before
}

fn cryptographic_layer(
    doc: &Document,
    ctx: &ValidationContext<'_>,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> bool {
    // 1. Canonical bytes with the signature stripped. Re-serialization also
    //    re-checks canonicality of the value tree.
    let signing = match doc.signing_json() {
        Ok(text) => text,
        Err(e) => {
            errors.push(e.to_string());
            return false;
        }
    };
    if let Err(e) = canonical::assert_canonical(&signing) {
        errors.push(e.to_string());
        return false;
    }

    // 2. Decode the signature
    let signature = match &doc.signature {
        Some(hex_sig) => match Ed25519Signature::from_hex(hex_sig) {
            Ok(sig) => sig,
            Err(e) => {
                errors.push(e.to_string());
                return false;
            }
        },
        None => {
            errors.push("signature is missing".into());
            return false;
        }
    };

    // 3. Verify against the trusted set
    if ctx.trusted_keys.is_empty() {
        errors.push("no trusted keys provided".into());
        return false;
    }
    let verified = ctx
        .trusted_keys
        .iter()
        .any(|key| key.verify(signing.as_bytes(), &signature).is_ok());
    if !verified {
        errors.push("signature does not verify against any trusted key".into());
        return false;
    }

    // 4. Future documents are suspicious but not invalid
    if let Some(current) = ctx.current_time {
        if doc.logical_time > current {
            warnings.push(format!(
                "document logical_time {} is ahead of current time {current}",
                doc.logical_time
            ));
        }
    }

    true
}

fn policy_layer(doc: &Document, ctx: &ValidationContext<'_>, errors: &mut Vec<String>) -> bool {
    match ctx.policy {
        Some(policy) => match policy.evaluate(doc) {
            Ok(()) => true,
            Err(reason) => {
                errors.push(format!("policy rejected document: {reason}"));
                false
            }
        },
        None => true,
    }
}
