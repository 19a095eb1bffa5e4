//! End-to-end airdrop flow: build a tree from the recipient list, publish the
//! root and the dump, reload the dump later and hand a recipient their proof.

use airdrop_merkle_tree::{
    verify_hex, verify_record, HashAlgorithm, LeafSchema, MerkleTreeError, Record,
    StandardMerkleTree, TreeDump,
};
use assert_matches::assert_matches;

const RECIPIENTS: [[&str; 3]; 4] = [
    ["0x1234567890123456789012345678901234567890", "0", "1000000000000"],
    ["0x2345678901234567890123456789012345678901", "1", "1000000000000"],
    ["0x3456789012345678901234567890123456789012", "2", "1000000000000"],
    ["0x4567890123456789012345678901234567890123", "3", "1000000000000"],
];

/// Root of the input-order build of `RECIPIENTS`. A sorted-leaf
/// OpenZeppelin tree over the same records has a different root.
const INPUT_ORDER_ROOT: &str =
    "0x8c398fd6bdf73b6f6999e487411eab4abe3a79eea36cc2ec3a33487ae1d0ec9e";

fn build_airdrop() -> StandardMerkleTree {
    let schema = LeafSchema::airdrop();
    let records: Vec<Record> = RECIPIENTS
        .iter()
        .map(|row| schema.parse_record(row).expect("recipient row"))
        .collect();
    StandardMerkleTree::of(records, schema)
        .unwrap()
        .expect("build airdrop tree")
}

#[test]
fn build_publish_reload_and_claim() {
    let tree = build_airdrop();
    assert_eq!(tree.root_hex(), INPUT_ORDER_ROOT);
    let published = tree.dump().to_json().expect("dump json");

    // Later, from the published file only.
    let dump = TreeDump::from_json(&published).expect("read dump");
    let loaded = StandardMerkleTree::load(dump).unwrap().expect("load");
    assert_eq!(loaded.root_hex(), INPUT_ORDER_ROOT);

    let claimant = "0x1234567890123456789012345678901234567890";
    let (index, record) = loaded
        .entries()
        .find(|(_, record)| record.to_strings()[0] == claimant)
        .expect("claimant is in the airdrop");
    assert_eq!(index, 0);
    assert_eq!(record.to_strings()[2], "1000000000000");

    let proof = loaded.prove_index(index).expect("proof");
    assert_eq!(proof.len(), 2);
    let siblings = proof.to_hex_strings();

    // The claimant checks the proof against the published root only.
    let leaf = loaded.leaf_hash(record).expect("leaf");
    assert!(
        verify_hex(
            HashAlgorithm::Keccak256,
            &airdrop_merkle_tree::to_hex(&leaf),
            &siblings,
            INPUT_ORDER_ROOT,
        )
        .unwrap()
        .expect("verify")
    );
    assert!(
        verify_record(
            HashAlgorithm::Keccak256,
            &LeafSchema::airdrop(),
            &tree.root(),
            record,
            &proof,
        )
        .unwrap()
        .expect("verify record")
    );
}

#[test]
fn every_recipient_can_claim_after_reload() {
    let tree = build_airdrop();
    let bytes = tree.dump().encode_to_vec().expect("encode");
    let loaded = StandardMerkleTree::load(TreeDump::decode_from_slice(&bytes).expect("decode"))
        .unwrap()
        .expect("load");

    let records: Vec<Record> = loaded.entries().map(|(_, r)| r.clone()).collect();
    for (index, result) in loaded.prove_records(&records).into_iter().enumerate() {
        let proof = result.expect("every recipient has a proof");
        assert_eq!(proof, tree.prove_index(index).expect("original proof"));
        assert!(loaded.verify_index(index, &proof).unwrap().expect("verify"));
    }
}

#[test]
fn unknown_recipient_gets_no_proof() {
    let tree = build_airdrop();
    let stranger = LeafSchema::airdrop()
        .parse_record(&[
            "0x1234567890123456789012345678901234567890",
            "0",
            "2000000000000",
        ])
        .expect("record");
    assert_matches!(
        tree.prove_record(&stranger),
        Err(MerkleTreeError::RecordNotFound)
    );
}

#[test]
fn edited_dump_is_refused() {
    let tree = build_airdrop();
    let mut dump = tree.dump();
    dump.values[2].value[2] = "9000000000000".to_string();
    assert_matches!(
        StandardMerkleTree::load(dump).value,
        Err(MerkleTreeError::CorruptTree(_))
    );
}
