//! End-to-end scenarios over the public surface.
//!
//! Every implementation of this protocol must agree on these behaviors:
//! identical identities from identical mnemonics, linked and signed chains,
//! canonical bytes, fork detection without auto-resolution, and state
//! round-trips.

use nzcore::core::{assert_canonical, clock::LogicalClock, to_canonical_json};
use nzcore::{Document, Error, Root, RootOptions};
use serde_json::json;

const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn make_root() -> Root {
    Root::create(TEST_MNEMONIC, RootOptions::default()).unwrap()
}

#[test]
fn identity_is_deterministic_across_facades() {
    let a = make_root();
    let b = make_root();

    assert_eq!(
        a.get_public_key_hex().unwrap(),
        b.get_public_key_hex().unwrap()
    );
    assert_eq!(a.get_chain_id().unwrap(), b.get_chain_id().unwrap());
    assert_eq!(a.get_public_key_hex().unwrap().len(), 64);
    assert_eq!(a.get_chain_id().unwrap().len(), 64);
}

#[test]
fn first_document_has_expected_shape() {
    let mut root = make_root();
    let doc = root
        .create_document("test", Some(json!({"message": "Hello"})))
        .unwrap();

    assert_eq!(doc.logical_time, 2);
    assert_eq!(doc.parent_hash, "0".repeat(64));
    assert_eq!(doc.signature.as_ref().unwrap().len(), 128);
    assert_eq!(doc.version, "1.0");
    assert_eq!(doc.crypto_suite, "nzcore-crypto-01");

    let result = root.verify_document(&doc);
    assert!(result.passed, "verification errors: {:?}", result.errors);
}

#[test]
fn three_documents_link_into_a_verifiable_chain() {
    let mut root = make_root();
    let d1 = root.create_document("d1", None).unwrap();
    let d2 = root.create_document("d2", None).unwrap();
    let d3 = root.create_document("d3", None).unwrap();

    assert_eq!(
        (d1.logical_time, d2.logical_time, d3.logical_time),
        (2, 3, 4)
    );
    assert_eq!(d2.parent_hash, d1.id);
    assert_eq!(d3.parent_hash, d2.id);
    assert!(root.verify_integrity().unwrap());
}

#[test]
fn canonicalization_matches_pinned_forms() {
    let value = json!({"b": [3, 2, 1], "a": {"c": 1, "d": 2}, "z": null});
    assert_eq!(
        to_canonical_json(&value).unwrap(),
        r#"{"a":{"c":1,"d":2},"b":[3,2,1],"z":null}"#
    );

    assert!(matches!(
        assert_canonical(r#"{"b":2,"a":1}"#),
        Err(Error::NonCanonicalJson(_))
    ));
}

#[test]
fn logical_clock_scenario() {
    let mut clock = LogicalClock::new(1).unwrap();
    assert_eq!(clock.tick().unwrap(), 2);
    assert_eq!(clock.tick().unwrap(), 3);
    assert_eq!(clock.tick().unwrap(), 4);

    assert!(matches!(
        clock.sync(1),
        Err(Error::LogicalTimeViolation(_))
    ));

    clock.sync(5).unwrap();
    assert_eq!(clock.current(), 5);
}

#[test]
fn exported_state_continues_on_a_second_facade() {
    let mut first = make_root();
    let d1 = first.create_document("d1", None).unwrap();
    let identity = first.export_identity().unwrap();
    let state = first.export_state().unwrap();

    let mut second = Root::create(&identity.mnemonic, RootOptions::default()).unwrap();
    second.import_state(&state).unwrap();
    let d2 = second.create_document("d2", None).unwrap();

    assert_eq!(d2.parent_hash, d1.id);
    assert_eq!(d2.logical_time, d1.logical_time + 1);
    assert!(second.verify_integrity().unwrap());
}

#[test]
fn every_signed_field_is_tamper_evident() {
    let mut root = make_root();
    let doc = root
        .create_document("test", Some(json!({"message": "original"})))
        .unwrap();

    let tampered: Vec<Document> = vec![
        {
            let mut d = doc.clone();
            d.payload = Some(json!({"message": "changed"}));
            d
        },
        {
            let mut d = doc.clone();
            d.doc_type = "forged".into();
            d
        },
        {
            let mut d = doc.clone();
            d.parent_hash = "11".repeat(32);
            d
        },
        {
            let mut d = doc.clone();
            d.logical_time += 1;
            d
        },
        {
            let mut d = doc.clone();
            d.id = "22".repeat(32);
            d
        },
        {
            let mut d = doc.clone();
            d.chain_id = "33".repeat(32);
            d
        },
    ];

    for bad in tampered {
        let result = root.verify_document(&bad);
        assert!(
            !result.cryptographic_valid,
            "tampering went unnoticed: {bad:?}"
        );
        assert!(!result.passed);
    }
}

#[test]
fn canonical_output_is_stable_under_reserialization() {
    let mut root = make_root();
    let doc = root
        .create_document("test", Some(json!({"n": 42, "s": "text"})))
        .unwrap();

    let canonical = doc.canonical_json().unwrap();
    assert_canonical(&canonical).unwrap();

    let reparsed = Document::from_json(&canonical).unwrap();
    assert_eq!(reparsed.canonical_json().unwrap(), canonical);
}

#[test]
fn unknown_fields_survive_and_are_signed() {
    let mut root = make_root();
    let base = root.create_document("test", None).unwrap();

    // A peer adds an extension field, re-signs... except it can't sign with
    // our key, so any extra field breaks the existing signature.
    let mut extended = base.clone();
    extended
        .extra
        .insert("extension".into(), json!({"v": 1}));
    assert!(!root.verify_document(&extended).cryptographic_valid);

    // Parsed wire text keeps unknown fields byte-for-byte.
    let text = extended.canonical_json().unwrap();
    let reparsed = Document::from_json(&text).unwrap();
    assert_eq!(reparsed.get("extension"), Some(&json!({"v": 1})));
    assert_eq!(reparsed, extended);
}

#[test]
fn forks_are_detected_and_never_auto_resolved() {
    let mut root = make_root();
    let d1 = root.create_document("a", None).unwrap();
    root.create_document("b", None).unwrap();
    assert!(root.detect_fork().unwrap().is_empty());

    // A replica of the same identity that took a different second step
    // produces a competing child of d1.
    let rival = {
        let mut chain_root = make_root();
        chain_root.create_document("a", None).unwrap();
        chain_root.create_document("rival", None).unwrap();
        chain_root.documents().unwrap()[1].clone()
    };
    assert_eq!(rival.parent_hash, d1.id);

    // Feeding the rival into the original chain forks it.
    let mut documents: Vec<Document> = root.documents().unwrap().to_vec();
    documents.push(rival.clone());
    let forks = nzcore::scan(&documents);
    assert_eq!(forks.len(), 1);
    assert_eq!(forks[0].parent_hash, d1.id);
    assert_eq!(forks[0].document_ids.len(), 2);
    assert!(forks[0].document_ids.contains(&rival.id));
    assert!(!forks[0].resolved);

    // Resolution is explicit and pure.
    let resolved = nzcore::resolve_fork(&forks[0], &rival.id);
    assert!(resolved.resolved);
    assert!(!forks[0].resolved);

    // A merge draft requires real conflicts.
    assert!(root
        .create_merge_document(&[rival.id.clone()], "pick one")
        .is_err());
    let draft = root
        .create_merge_document(
            &[forks[0].document_ids[0].clone(), forks[0].document_ids[1].clone()],
            "keep rival",
        )
        .unwrap();
    assert_eq!(draft["type"], "merge");
}

#[test]
fn destroyed_root_refuses_everything() {
    let mut root = make_root();
    let doc = root.create_document("a", None).unwrap();
    root.destroy();

    assert!(matches!(
        root.create_document("b", None),
        Err(Error::ValidationFailed(_))
    ));
    assert!(root.export_state().is_err());
    assert!(!root.verify_document(&doc).passed);

    // A fresh facade from the same mnemonic works again.
    let mut fresh = make_root();
    assert!(fresh.create_document("c", None).is_ok());
}

#[test]
fn documents_of_same_position_share_an_id_across_facades() {
    let mut a = make_root();
    let mut b = make_root();

    let doc_a = a.create_document("x", None).unwrap();
    let doc_b = b.create_document("y", None).unwrap();

    // Same chain, same parent, same time: the id is positional.
    assert_eq!(doc_a.id, doc_b.id);
    // But the records themselves differ.
    assert_ne!(doc_a.doc_type, doc_b.doc_type);
}
