//! Properties that hold for every `(interface, function)` pair in the catalog.

use docbridge_core::ErrorCategory;
use docbridge_schema::{catalog, validate, FieldSpec, FieldType, FunctionSchema, Presence};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn sample(field_type: &FieldType) -> Value {
    match field_type {
        FieldType::String => json!("value"),
        FieldType::Integer => json!(7),
        FieldType::Mapping => json!({"k": "v"}),
        FieldType::Sequence(element) => json!([sample(element), sample(element)]),
        FieldType::Object(fields) => Value::Object(sample_object(fields, true)),
    }
}

fn sample_object(fields: &[FieldSpec], with_optional: bool) -> Map<String, Value> {
    fields
        .iter()
        .filter(|field| with_optional || field.presence != Presence::Optional)
        .map(|field| (field.key.to_string(), sample(&field.field_type)))
        .collect()
}

fn schema_strategy() -> impl Strategy<Value = FunctionSchema> {
    prop::sample::select(catalog::SCHEMAS)
}

proptest! {
    #[test]
    fn complete_payload_is_accepted(schema in schema_strategy(), with_optional in any::<bool>()) {
        let data = Value::Object(sample_object(schema.fields, with_optional));
        prop_assert!(validate(&schema, Some(&data), None).is_ok());
    }

    #[test]
    fn missing_mandatory_key_is_rejected(schema in schema_strategy(), pick in any::<prop::sample::Index>()) {
        let mandatory: Vec<&str> = schema.mandatory_keys().collect();
        prop_assume!(!mandatory.is_empty());
        let removed = mandatory[pick.index(mandatory.len())];

        let mut data = sample_object(schema.fields, true);
        data.remove(removed);
        let err = validate(&schema, Some(&Value::Object(data)), None).unwrap_err();
        prop_assert_eq!(err.category(), ErrorCategory::Validation);
        let removed_path = format!("data.{removed}");
        prop_assert!(err.field_errors().is_some_and(|f| f.contains(&removed_path)));
    }

    #[test]
    fn extra_key_is_rejected(schema in schema_strategy(), extra in "[a-z]{1,6}Extra") {
        let mut data = sample_object(schema.fields, true);
        data.insert(extra.clone(), json!("surprise"));
        let err = validate(&schema, Some(&Value::Object(data)), None).unwrap_err();
        let extra_path = format!("data.{extra}");
        prop_assert!(err.field_errors().is_some_and(|f| f.contains(&extra_path)));
    }

    #[test]
    fn wrongly_typed_key_is_rejected(schema in schema_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!schema.fields.is_empty());
        let field = &schema.fields[pick.index(schema.fields.len())];
        let wrong = match field.field_type {
            FieldType::String => json!(1),
            _ => json!("not the right type"),
        };

        let mut data = sample_object(schema.fields, true);
        data.insert(field.key.to_string(), wrong);
        prop_assert!(validate(&schema, Some(&Value::Object(data)), None).is_err());
    }

    #[test]
    fn batched_data_is_rejected(schema in schema_strategy(), count in 1usize..4) {
        let data = Value::Object(sample_object(schema.fields, false));
        let batched = Value::Array(vec![json!({}); count]);
        let err = validate(&schema, Some(&data), Some(&batched)).unwrap_err();
        prop_assert!(err.field_errors().is_some_and(|f| f.contains("batchedData")));
    }
}

#[test]
fn every_interface_routes_to_its_schemas() {
    for schema in catalog::SCHEMAS {
        let found = catalog::lookup(schema.interface, schema.function).unwrap();
        assert_eq!(found, schema);
        assert!(catalog::functions(schema.interface).contains(&schema.function));
    }
}

#[test]
fn validation_message_describes_expected_shape() {
    let schema = catalog::lookup(docbridge_core::InterfaceName::SingleFileParser, "parseDocument")
        .unwrap();
    let err = validate(schema, Some(&json!({"s3FileType": "DATALOG"})), None).unwrap_err();
    assert!(err.to_string().starts_with(
        "invalid data - SingleFileParser.parseDocument requires data keys \
         [s3FileType, fileName, offsetBytes, content, startIndex, endIndex]"
    ));
}
