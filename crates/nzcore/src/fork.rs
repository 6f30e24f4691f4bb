//! Fork detection: finding and describing competing branches.
//!
//! A fork is two or more documents claiming the same parent. The detector is
//! stateless and only ever *describes* forks; resolution is an explicit,
//! manual act. No code path here or anywhere in the core flips a fork to
//! resolved on its own.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use nzcore_core::bytes::is_lower_hex;
use nzcore_core::{Document, Error, Result};

/// Document type used for manual merge records.
pub const MERGE_DOC_TYPE: &str = "merge";

/// A detected fork: competing documents under one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkInfo {
    /// The contested parent hash.
    pub parent_hash: String,
    /// Ids of the competing documents (at least two).
    pub document_ids: Vec<String>,
    /// Logical time at which the fork was noticed.
    pub detected_at: u64,
    /// Whether a resolution has been recorded.
    pub resolved: bool,
    /// Id of the resolving document, once resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// Scan a document set for forks.
///
/// Groups by `parent_hash`; every group of two or more competing documents
/// yields one entry with `detected_at` set to the group's highest logical
/// time. Entries come back sorted by detection time, oldest first.
pub fn scan(documents: &[Document]) -> Vec<ForkInfo> {
    let mut by_parent: HashMap<&str, Vec<&Document>> = HashMap::new();
    for doc in documents {
        by_parent.entry(doc.parent_hash.as_str()).or_default().push(doc);
    }

    let mut forks: Vec<ForkInfo> = by_parent
        .into_iter()
        .filter(|(_, group)| group.len() >= 2)
        .map(|(parent, group)| ForkInfo {
            parent_hash: parent.to_string(),
            document_ids: group.iter().map(|d| d.id.clone()).collect(),
            detected_at: group.iter().map(|d| d.logical_time).max().unwrap_or(0),
            resolved: false,
            resolution: None,
        })
        .collect();

    forks.sort_by(|a, b| {
        a.detected_at
            .cmp(&b.detected_at)
            .then_with(|| a.parent_hash.cmp(&b.parent_hash))
    });
    forks
}

/// Draft the payload of a manual merge document.
///
/// The draft references every conflicting id and carries the caller's
/// resolution note. It is a partial document: the caller feeds it through
/// the normal build-and-sign path, which is what actually settles the fork.
pub fn create_merge_document(
    conflict_hashes: &[String],
    resolution: &str,
) -> Result<serde_json::Value> {
    if conflict_hashes.len() < 2 {
        return Err(Error::ForkDetected(format!(
            "a merge needs at least two conflicting documents, got {}",
            conflict_hashes.len()
        )));
    }
    for hash in conflict_hashes {
        if !is_lower_hex(hash, 64) {
            return Err(Error::ForkDetected(format!(
                "conflicting hash {hash:?} is not a document id"
            )));
        }
    }
    Ok(json!({
        "type": MERGE_DOC_TYPE,
        "conflicting_documents": conflict_hashes,
        "resolution": resolution,
    }))
}

/// Whether a fork still matters: more than one of its branches is present
/// in, or referenced by, the given document set.
pub fn is_fork_active(fork: &ForkInfo, documents: &[Document]) -> bool {
    let live_branches = fork
        .document_ids
        .iter()
        .filter(|branch| {
            documents
                .iter()
                .any(|d| &d.id == *branch || &d.parent_hash == *branch)
        })
        .count();
    live_branches > 1
}

/// Mark a fork resolved by the given document. Pure: returns a copy.
pub fn resolve_fork(fork: &ForkInfo, resolution_doc_id: &str) -> ForkInfo {
    let mut resolved = fork.clone();
    resolved.resolved = true;
    resolved.resolution = Some(resolution_doc_id.to_string());
    resolved
}
