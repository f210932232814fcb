
use std::sync::Arc;

use jsonpb_core::{DecodeError, DecodeOptions, UnknownPropertyPolicy};
use jsonpb_protobuf::{Decoder, ExtensionRegistry, FieldTable, load_descriptor_pool};
use prost_reflect::{DescriptorPool, DynamicMessage, Value};
use prost_types::{
    DescriptorProto,
    field_descriptor_proto::{Label, Type},
};
use test_helpers::*;

/// ```text
/// message Base { optional int32 id = 1; extensions 100 to 199; }
/// message Note { optional string text = 1; }
/// message Plain { optional int32 id = 1; }
/// extend Base {
///   optional string tag = 100;
///   optional Note note = 101;
///   repeated int32 scores = 102;
///   optional string id = 103;
/// }
/// ```
fn extension_pool() -> DescriptorPool {
    let base = with_extension_range(
        DescriptorProto {
            name: Some("Base".to_string()),
            field: vec![scalar_field("id", 1, Type::Int32)],
            ..Default::default()
        },
        100,
        200,
    );
    let note = DescriptorProto {
        name: Some("Note".to_string()),
        field: vec![scalar_field("text", 1, Type::String)],
        ..Default::default()
    };
    let plain = DescriptorProto {
        name: Some("Plain".to_string()),
        field: vec![scalar_field("id", 1, Type::Int32)],
        ..Default::default()
    };
    let extensions = vec![
        extension("tag", 100, Type::String, Label::Optional, ".Base", None),
        extension("note", 101, Type::Message, Label::Optional, ".Base", Some(".Note")),
        extension("scores", 102, Type::Int32, Label::Repeated, ".Base", None),
        extension("id", 103, Type::String, Label::Optional, ".Base", None),
    ];
    let bytes = build_proto2_fds("ext.proto", vec![base, note, plain], extensions);
    load_descriptor_pool("ext.proto", &bytes).unwrap()
}

fn base_decoder(pool: &DescriptorPool) -> Decoder {
    let base = pool.get_message_by_name("Base").unwrap();
    Decoder::with_registry(base, Arc::new(ExtensionRegistry::from_pool(pool)))
}

fn extension_value(pool: &DescriptorPool, msg: &DynamicMessage, name: &str) -> Value {
    let ext = pool.get_extension_by_name(name).unwrap();
    msg.get_extension(&ext).into_owned()
}

#[test]
fn registry_indexes_extensions_by_extendee() {
    let pool = extension_pool();
    let registry = ExtensionRegistry::from_pool(&pool);
    assert_eq!(registry.len(), 4);

    let base = pool.get_message_by_name("Base").unwrap();
    let plain = pool.get_message_by_name("Plain").unwrap();
    assert_eq!(registry.extensions_for(&base).len(), 4);
    assert!(registry.extensions_for(&plain).is_empty());
}

#[test]
fn reregistering_an_extension_replaces_it() {
    let pool = extension_pool();
    let mut registry = ExtensionRegistry::from_pool(&pool);
    let tag = pool.get_extension_by_name("tag").unwrap();
    registry.register(tag);
    assert_eq!(registry.len(), 4);
}

#[test]
fn extension_properties_decode_onto_extendee() {
    let pool = extension_pool();
    let msg = base_decoder(&pool)
        .decode_str(
            r#"{"id": 7, "tag": "t", "note": {"text": "hi"}, "scores": [1, 2]}"#,
            &DecodeOptions::default(),
        )
        .unwrap();

    assert_eq!(
        msg.get_field_by_name("id").unwrap().into_owned(),
        Value::I32(7)
    );
    assert_eq!(
        extension_value(&pool, &msg, "tag"),
        Value::String("t".to_string())
    );
    assert_eq!(
        extension_value(&pool, &msg, "scores"),
        Value::List(vec![Value::I32(1), Value::I32(2)])
    );

    let Value::Message(note) = extension_value(&pool, &msg, "note") else {
        panic!("expected Message");
    };
    assert_eq!(
        note.get_field_by_name("text").unwrap().into_owned(),
        Value::String("hi".to_string())
    );
}

#[test]
fn schema_fields_shadow_extensions_with_the_same_name() {
    let pool = extension_pool();
    let base = pool.get_message_by_name("Base").unwrap();
    let registry = ExtensionRegistry::from_pool(&pool);
    let table = FieldTable::build(&base, &registry, &Default::default());

    let id = table.resolve("id").unwrap();
    assert!(!id.is_extension());
    assert_eq!(id.full_name(), "Base.id");
    assert!(table.resolve("tag").unwrap().is_extension());

    // A string for the int32 schema field, not the string extension.
    let err = base_decoder(&pool)
        .decode_str(r#"{"id": "abc"}"#, &DecodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, DecodeError::InvalidScalar { .. }), "{err}");
}

#[test]
fn extensions_are_unknown_without_a_registry() {
    let pool = extension_pool();
    let base = pool.get_message_by_name("Base").unwrap();
    let decoder = Decoder::new(base);

    let err = decoder
        .decode_str(r#"{"tag": "t"}"#, &DecodeOptions::default())
        .unwrap_err();
    assert!(
        matches!(&err, DecodeError::UnknownProperty { name, .. } if name == "tag"),
        "{err}"
    );

    let options = DecodeOptions::default().with_unknown_property(UnknownPropertyPolicy::Skip);
    let msg = decoder.decode_str(r#"{"tag": "t", "id": 1}"#, &options).unwrap();
    let tag = pool.get_extension_by_name("tag").unwrap();
    assert!(!msg.has_extension(&tag));
}

#[test]
fn non_extendable_messages_ignore_the_registry() {
    let pool = extension_pool();
    let plain = pool.get_message_by_name("Plain").unwrap();
    let decoder: Decoder = Decoder::with_registry(plain, Arc::new(ExtensionRegistry::from_pool(&pool)));

    let err = decoder
        .decode_str(r#"{"tag": "t"}"#, &DecodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, DecodeError::UnknownProperty { .. }), "{err}");
}

#[test]
fn message_extension_uses_registered_default_instance() {
    let pool = extension_pool();
    let note_desc = pool.get_message_by_name("Note").unwrap();
    let note_ext = pool.get_extension_by_name("note").unwrap();

    let mut registry = ExtensionRegistry::empty();
    registry.register_with_default(note_ext.clone(), DynamicMessage::new(note_desc));
    assert_eq!(registry.len(), 1);

    let base = pool.get_message_by_name("Base").unwrap();
    let decoder: Decoder = Decoder::with_registry(base, Arc::new(registry));
    let msg = decoder
        .decode_str(r#"{"note": {"text": "x"}}"#, &DecodeOptions::default())
        .unwrap();

    assert!(msg.has_extension(&note_ext));
    assert_eq!(decoder.cached_sub_decoders(), 1);
}
