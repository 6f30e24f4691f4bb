//! The Root: unified API for an identity and its chain.
//!
//! A `Root` is the single owning handle over key material, clock, and chain
//! state. It is the only component that touches the private key. Destruction
//! is explicit: call [`Root::destroy`] on every exit path; afterwards every
//! operation fails until a fresh `Root` is created.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroize;

use nzcore_core::{
    validation, ChainId, Document, DocumentPolicy, Ed25519PublicKey, Error, Result, RootIdentity,
    ValidationContext, ValidationResult,
};

use crate::chain::{ChainStore, Page, PageQuery};
use crate::fork::{self, ForkInfo};

/// Construction options for a [`Root`].
#[derive(Default)]
pub struct RootOptions {
    /// Override the chain id instead of deriving it from the identity.
    pub chain_id: Option<ChainId>,
    /// Initial logical time (default 1).
    pub initial_time: Option<u64>,
    /// Policy evaluated as the last validation layer.
    pub policy: Option<Box<dyn DocumentPolicy + Send>>,
}

/// Identity export: everything needed to recreate the root elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityExport {
    pub mnemonic: String,
    pub chain_id: String,
}

/// Point-in-time summary of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain_id: String,
    pub last_hash: String,
    pub logical_clock: u64,
    pub document_count: usize,
    pub fork_count: usize,
}

/// The main facade.
pub struct Root {
    identity: RootIdentity,
    mnemonic: String,
    chain: ChainStore,
    policy: Option<Box<dyn DocumentPolicy + Send>>,
    destroyed: bool,
}

impl Root {
    /// Create a root from a mnemonic.
    ///
    /// Runs the full derivation pipeline (scrypt included, so this blocks
    /// for a noticeable moment). A failure after key derivation wipes the
    /// partial identity before the error is returned.
    pub fn create(mnemonic: &str, options: RootOptions) -> Result<Self> {
        let mut identity = RootIdentity::derive(mnemonic)?;

        let chain_id = options.chain_id.unwrap_or(*identity.chain_id());
        let chain = match ChainStore::new(chain_id, options.initial_time.unwrap_or(1)) {
            Ok(chain) => chain,
            Err(e) => {
                identity.wipe();
                return Err(e);
            }
        };

        Ok(Self {
            identity,
            mnemonic: mnemonic.to_string(),
            chain,
            policy: options.policy,
            destroyed: false,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Create, sign, and append the next document in the chain.
    ///
    /// Any failure before the final append leaves the chain, its head, and
    /// its clock exactly as they were.
    pub fn create_document(&mut self, doc_type: &str, payload: Option<Value>) -> Result<Document> {
        self.ensure_alive()?;

        let logical_time = self.chain.next_time()?;
        let parent = *self.chain.last_hash();

        let mut builder = Document::builder()
            .doc_type(doc_type)
            .chain_id(self.chain.chain_id().to_hex())
            .parent_hash(parent.to_hex())
            .logical_time(logical_time);
        if let Some(payload) = payload {
            builder = builder.payload(payload);
        }
        let mut document = builder.build()?;

        let signing = document.signing_json()?;
        let signature = self.identity.sign(signing.as_bytes())?;
        document.signature = Some(signature.to_hex());

        self.chain.append(document.clone())?;
        Ok(document)
    }

    /// Validate a document against this root's key and clock.
    ///
    /// Never returns an error; a destroyed root reports through the result.
    pub fn verify_document(&self, document: &Document) -> ValidationResult {
        if self.destroyed {
            return validation::ValidationResult {
                structural_valid: false,
                cryptographic_valid: false,
                policy_valid: false,
                passed: false,
                errors: vec!["root has been destroyed".into()],
                warnings: Vec::new(),
            };
        }

        let ctx = ValidationContext {
            trusted_keys: vec![*self.identity.public_key()],
            current_time: Some(self.chain.current_time()),
            policy: self.policy.as_deref().map(|p| p as &dyn DocumentPolicy),
        };
        validation::validate(document, &ctx)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chain Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Summary of the chain right now.
    pub fn get_chain_state(&self) -> Result<ChainSnapshot> {
        self.ensure_alive()?;
        Ok(ChainSnapshot {
            chain_id: self.chain.chain_id().to_hex(),
            last_hash: self.chain.last_hash().to_hex(),
            logical_clock: self.chain.current_time(),
            document_count: self.chain.len(),
            fork_count: self.chain.recorded_forks().len(),
        })
    }

    /// The stored documents, in append order.
    pub fn documents(&self) -> Result<&[Document]> {
        self.ensure_alive()?;
        Ok(self.chain.documents())
    }

    /// A page of documents ordered by logical time.
    pub fn page(&self, query: &PageQuery) -> Result<Page> {
        self.ensure_alive()?;
        Ok(self.chain.page(query))
    }

    /// Re-derive every id and link in the chain.
    pub fn verify_integrity(&self) -> Result<bool> {
        self.ensure_alive()?;
        Ok(self.chain.verify_integrity())
    }

    /// Run the authoritative global fork scan. Every returned entry is
    /// stamped with the current logical time and unresolved.
    pub fn detect_fork(&mut self) -> Result<Vec<ForkInfo>> {
        self.ensure_alive()?;
        let now = self.chain.current_time();
        Ok(self
            .chain
            .scan_forks()
            .into_iter()
            .map(|mut entry| {
                entry.detected_at = now;
                entry.resolved = false;
                entry
            })
            .collect())
    }

    /// Draft a manual merge payload for conflicting documents.
    pub fn create_merge_document(
        &self,
        conflict_hashes: &[String],
        resolution: &str,
    ) -> Result<Value> {
        self.ensure_alive()?;
        fork::create_merge_document(conflict_hashes, resolution)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Export / Import
    // ─────────────────────────────────────────────────────────────────────

    /// The mnemonic and chain id: enough to recreate this identity.
    pub fn export_identity(&self) -> Result<IdentityExport> {
        self.ensure_alive()?;
        Ok(IdentityExport {
            mnemonic: self.mnemonic.clone(),
            chain_id: self.chain.chain_id().to_hex(),
        })
    }

    /// Serialize the chain state, clock included.
    pub fn export_state(&self) -> Result<Vec<u8>> {
        self.ensure_alive()?;
        self.chain.export()
    }

    /// Replace the chain with a previously exported one.
    ///
    /// The imported chain id must match this root's; on any failure the
    /// current state stays in place.
    pub fn import_state(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_alive()?;
        let imported = ChainStore::import(bytes, self.chain.chain_id())?;
        self.chain = imported;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// The identity's public key.
    pub fn get_public_key(&self) -> Result<Ed25519PublicKey> {
        self.ensure_alive()?;
        Ok(*self.identity.public_key())
    }

    /// The identity's public key as 64 lowercase hex characters.
    pub fn get_public_key_hex(&self) -> Result<String> {
        self.ensure_alive()?;
        Ok(self.identity.public_key().to_hex())
    }

    /// The chain id as 64 lowercase hex characters.
    pub fn get_chain_id(&self) -> Result<String> {
        self.ensure_alive()?;
        Ok(self.chain.chain_id().to_hex())
    }

    /// Whether [`Root::destroy`] has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Wipe the private key and mnemonic and drop the chain. Idempotent;
    /// every later operation fails.
    pub fn destroy(&mut self) {
        self.identity.wipe();
        self.mnemonic.zeroize();
        if let Ok(empty) = ChainStore::new(*self.chain.chain_id(), 1) {
            self.chain = empty;
        }
        self.policy = None;
        self.destroyed = true;
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(Error::ValidationFailed("root has been destroyed".into()));
        }
        Ok(())
    }
}

impl Drop for Root {
    fn drop(&mut self) {
        self.identity.wipe();
        self.mnemonic.zeroize();
    }
}
