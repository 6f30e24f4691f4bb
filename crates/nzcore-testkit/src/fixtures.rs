//! Test fixtures: pre-built roots and chains.

use serde_json::Value;

use nzcore::{Document, Root, RootOptions};

/// The well-known all-zero-entropy test mnemonic.
pub const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// A root built from [`TEST_MNEMONIC`], plus append helpers.
pub struct TestFixture {
    pub root: Root,
}

impl TestFixture {
    /// Build a fixture at logical time 1.
    pub fn new() -> Self {
        Self::with_options(RootOptions::default())
    }

    /// Build a fixture with explicit options.
    pub fn with_options(options: RootOptions) -> Self {
        let root = Root::create(TEST_MNEMONIC, options).expect("test mnemonic must derive");
        Self { root }
    }

    /// Append one document and return it.
    pub fn append(&mut self, doc_type: &str, payload: Option<Value>) -> Document {
        self.root
            .create_document(doc_type, payload)
            .expect("fixture append must succeed")
    }

    /// Append `count` documents of one type with empty payloads.
    pub fn grow(&mut self, doc_type: &str, count: usize) -> Vec<Document> {
        (0..count).map(|_| self.append(doc_type, None)).collect()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Two fixtures for the same identity, for divergence scenarios: the second
/// starts from the first's exported state.
pub fn forked_pair() -> (TestFixture, TestFixture) {
    let mut first = TestFixture::new();
    first.append("base", None);

    let state = first.root.export_state().expect("export");
    let mut second = TestFixture::new();
    second.root.import_state(&state).expect("import");

    (first, second)
}
