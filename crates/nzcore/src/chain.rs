//! Chain state: the authoritative, append-only document log.
//!
//! The store owns the chain's single logical clock and ticks it exactly once
//! per successful append. Nothing here persists to disk; callers round-trip
//! state through [`ChainStore::export`] / [`ChainStore::import`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use nzcore_core::{
    ChainId, ClockState, Document, DocumentId, Error, LogicalClock, Result,
};

use crate::fork::{self, ForkInfo};

/// Sort direction for [`PageQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Query for a slice of the chain, ordered by logical time.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    /// Maximum documents to return. `None` means all.
    pub limit: Option<usize>,
    /// Documents to skip from the start of the ordering.
    pub offset: usize,
    /// Sort direction over logical time.
    pub order: SortOrder,
    /// Restrict to one document type.
    pub doc_type: Option<String>,
}

/// One page of documents.
#[derive(Debug, Clone)]
pub struct Page {
    pub documents: Vec<Document>,
    /// Total matching documents before limit/offset.
    pub total: usize,
    /// Whether documents remain past this page.
    pub has_more: bool,
}

/// The in-memory chain store.
pub struct ChainStore {
    chain_id: ChainId,
    documents: Vec<Document>,
    index: HashMap<String, usize>,
    last_hash: DocumentId,
    clock: LogicalClock,
    forks: Vec<ForkInfo>,
    scan_cache: Option<Vec<ForkInfo>>,
}

/// Wire form of an exported chain.
#[derive(Serialize, Deserialize)]
struct StateBlob {
    #[serde(rename = "chainId")]
    chain_id: String,
    #[serde(rename = "lastHash")]
    last_hash: String,
    clock: ClockState,
    documents: Vec<(String, Document)>,
    forks: Vec<(String, ForkInfo)>,
}

impl ChainStore {
    /// Create an empty chain at the given initial logical time.
    pub fn new(chain_id: ChainId, initial_time: u64) -> Result<Self> {
        Ok(Self {
            chain_id,
            documents: Vec::new(),
            index: HashMap::new(),
            last_hash: DocumentId::GENESIS,
            clock: LogicalClock::new(initial_time)?,
            forks: Vec::new(),
            scan_cache: None,
        })
    }

    /// The chain's id.
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// The id of the most recently appended document, or the genesis
    /// sentinel when empty.
    pub fn last_hash(&self) -> &DocumentId {
        &self.last_hash
    }

    /// Current logical time.
    pub fn current_time(&self) -> u64 {
        self.clock.current()
    }

    /// The logical time the next appended document will carry. Errors when
    /// the clock cannot advance.
    pub fn next_time(&self) -> Result<u64> {
        if !self.clock.can_tick() {
            return Err(Error::LogicalTimeViolation(
                "clock cannot advance".into(),
            ));
        }
        Ok(self.clock.current() + 1)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents in append order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Look up a document by id.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.index.get(id).map(|&pos| &self.documents[pos])
    }

    /// Forks recorded by per-append detection.
    pub fn recorded_forks(&self) -> &[ForkInfo] {
        &self.forks
    }

    /// Append a document.
    ///
    /// The document must carry this chain's id and a fresh id of its own.
    /// A parent other than the current head triggers sibling detection and,
    /// when siblings exist, a recorded fork. On success the head moves, the
    /// scan cache is dropped, and the clock ticks. On any error the store
    /// is untouched.
    pub fn append(&mut self, document: Document) -> Result<()> {
        if document.chain_id != self.chain_id.to_hex() {
            return Err(Error::ValidationFailed(format!(
                "document chain id {} does not match chain {}",
                document.chain_id,
                self.chain_id.to_hex()
            )));
        }
        if self.index.contains_key(&document.id) {
            return Err(Error::ValidationFailed(format!(
                "document {} is already in the chain",
                document.id
            )));
        }
        if !self.clock.can_tick() {
            return Err(Error::LogicalTimeViolation("clock cannot advance".into()));
        }
        let new_head = DocumentId::from_hex(&document.id)?;

        if !self.last_hash.matches_hex(&document.parent_hash) {
            let siblings: Vec<String> = self
                .documents
                .iter()
                .filter(|d| d.parent_hash == document.parent_hash)
                .map(|d| d.id.clone())
                .collect();
            if !siblings.is_empty() {
                self.record_fork(&document, siblings);
            }
        }

        self.index.insert(document.id.clone(), self.documents.len());
        self.last_hash = new_head;
        self.documents.push(document);
        self.scan_cache = None;
        self.clock.tick().expect("tick checked above");
        Ok(())
    }

    fn record_fork(&mut self, incoming: &Document, mut sibling_ids: Vec<String>) {
        sibling_ids.push(incoming.id.clone());
        let detected_at = self.clock.current();

        match self
            .forks
            .iter_mut()
            .find(|f| f.parent_hash == incoming.parent_hash && !f.resolved)
        {
            Some(existing) => {
                for id in sibling_ids {
                    if !existing.document_ids.contains(&id) {
                        existing.document_ids.push(id);
                    }
                }
                existing.detected_at = detected_at;
            }
            None => self.forks.push(ForkInfo {
                parent_hash: incoming.parent_hash.clone(),
                document_ids: sibling_ids,
                detected_at,
                resolved: false,
                resolution: None,
            }),
        }
    }

    /// Global fork scan, cached until the next append. This scan, not the
    /// per-append record, is the authority on which forks exist.
    pub fn scan_forks(&mut self) -> Vec<ForkInfo> {
        if self.scan_cache.is_none() {
            self.scan_cache = Some(fork::scan(&self.documents));
        }
        self.scan_cache.clone().unwrap_or_default()
    }

    /// Walk the chain oldest-first and re-derive every id.
    ///
    /// True iff every document links to its predecessor and carries the id
    /// its position dictates.
    pub fn verify_integrity(&self) -> bool {
        let mut ordered: Vec<&Document> = self.documents.iter().collect();
        ordered.sort_by_key(|d| d.logical_time);

        let mut prev = DocumentId::GENESIS;
        for doc in ordered {
            if !prev.matches_hex(&doc.parent_hash) {
                return false;
            }
            let derived = match DocumentId::derive(&self.chain_id, &prev, doc.logical_time) {
                Ok(id) => id,
                Err(_) => return false,
            };
            if !derived.matches_hex(&doc.id) {
                return false;
            }
            prev = derived;
        }
        true
    }

    /// A slice of the chain ordered by logical time.
    pub fn page(&self, query: &PageQuery) -> Page {
        let mut matching: Vec<&Document> = self
            .documents
            .iter()
            .filter(|d| {
                query
                    .doc_type
                    .as_ref()
                    .map_or(true, |t| &d.doc_type == t)
            })
            .collect();
        matching.sort_by_key(|d| d.logical_time);
        if query.order == SortOrder::Descending {
            matching.reverse();
        }

        let total = matching.len();
        let documents: Vec<Document> = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        let has_more = query.offset + documents.len() < total;

        Page {
            documents,
            total,
            has_more,
        }
    }

    /// Serialize the full chain state to a self-describing JSON blob.
    pub fn export(&self) -> Result<Vec<u8>> {
        let blob = StateBlob {
            chain_id: self.chain_id.to_hex(),
            last_hash: self.last_hash.to_hex(),
            clock: self.clock.to_state(),
            documents: self
                .documents
                .iter()
                .map(|d| (d.id.clone(), d.clone()))
                .collect(),
            forks: self
                .forks
                .iter()
                .map(|f| (f.parent_hash.clone(), f.clone()))
                .collect(),
        };
        serde_json::to_vec(&blob).map_err(|e| Error::ValidationFailed(format!("export: {e}")))
    }

    /// Rebuild a chain from an exported blob.
    ///
    /// The blob's chain id must match `expected`; a mismatch rejects the
    /// whole import and nothing is built.
    pub fn import(bytes: &[u8], expected: &ChainId) -> Result<Self> {
        let blob: StateBlob = serde_json::from_slice(bytes)
            .map_err(|e| Error::ValidationFailed(format!("import parse: {e}")))?;

        if blob.chain_id != expected.to_hex() {
            return Err(Error::ValidationFailed(format!(
                "imported chain id {} does not match expected {}",
                blob.chain_id,
                expected.to_hex()
            )));
        }

        let mut index = HashMap::new();
        let mut documents = Vec::with_capacity(blob.documents.len());
        for (id, doc) in blob.documents {
            if id != doc.id {
                return Err(Error::ValidationFailed(format!(
                    "blob entry key {id} does not match document id {}",
                    doc.id
                )));
            }
            index.insert(id, documents.len());
            documents.push(doc);
        }

        Ok(Self {
            chain_id: *expected,
            documents,
            index,
            last_hash: DocumentId::from_hex(&blob.last_hash)?,
            clock: LogicalClock::from_state(&blob.clock)?,
            forks: blob.forks.into_iter().map(|(_, f)| f).collect(),
            scan_cache: None,
        })
    }
}
