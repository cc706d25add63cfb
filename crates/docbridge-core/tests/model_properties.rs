//! Property tests for the result model.

use docbridge_core::{
    CompositeDoc, Document, DocumentFields, ErrorDoc, ParseDocumentResult, RecordOffsets,
    SingleDoc,
};
use proptest::prelude::*;
use serde_json::Map;
use std::collections::{BTreeMap, BTreeSet};

/// Builds an offset map with the given file types.
fn offsets_for(keys: &BTreeSet<String>, base: u64) -> BTreeMap<String, String> {
    keys.iter()
        .enumerate()
        .map(|(i, key)| (key.clone(), (base + i as u64).to_string()))
        .collect()
}

fn file_types() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[A-Z]{2,8}", 0..4)
}

proptest! {
    #[test]
    fn offsets_accept_iff_key_sets_equal(start_keys in file_types(), end_keys in file_types()) {
        let result = RecordOffsets::new(offsets_for(&start_keys, 0), offsets_for(&end_keys, 100));
        prop_assert_eq!(result.is_ok(), start_keys == end_keys);
    }

    #[test]
    fn marshaling_is_idempotent(
        id in "[a-z0-9]{1,12}",
        value in any::<i64>(),
        errors in 0usize..4,
    ) {
        let single = SingleDoc::new(DocumentFields::new(&id, "Record", "pk").with_value("v", value));
        let error_docs: Vec<ErrorDoc> = (0..errors)
            .map(|i| {
                let start = i as u64 * 10;
                ErrorDoc::new(
                    DocumentFields::default(),
                    RecordOffsets::single("DATALOG", start, start + 10),
                    format!("error {i}"),
                )
            })
            .collect();
        let doc = Document::from(CompositeDoc::new(&id, "Joined", "pk", Map::new(), single, error_docs));
        let result = ParseDocumentResult::success(doc);

        let first = serde_json::to_string(&result).unwrap();
        let second = serde_json::to_string(&result).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn composite_document_list_preserves_order(count in 0usize..6) {
        let error_docs: Vec<ErrorDoc> = (0..count)
            .map(|i| {
                ErrorDoc::new(
                    DocumentFields::new(format!("e{i}"), "Record", "pk"),
                    RecordOffsets::single("DATALOG", i as u64, i as u64 + 1),
                    format!("error {i}"),
                )
            })
            .collect();
        let single = SingleDoc::new(DocumentFields::new("d", "Record", "pk"));
        let composite =
            CompositeDoc::new("c", "Joined", "pk", Map::new(), single.clone(), error_docs.clone());

        let (doc, errors) = composite.document_list();
        prop_assert_eq!(doc, &single);
        prop_assert_eq!(errors, error_docs.as_slice());

        let value = serde_json::to_value(Document::from(composite.clone())).unwrap();
        let ids: Vec<&str> = value["errorDocList"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["documentId"].as_str().unwrap())
            .collect();
        let expected: Vec<String> = (0..count).map(|i| format!("e{i}")).collect();
        prop_assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
