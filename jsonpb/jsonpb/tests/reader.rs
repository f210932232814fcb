use std::io::Cursor;

use jsonpb::{
    JsonPbReader, ReaderError,
    core::{DecodeError, DecodeOptions, UnknownPropertyPolicy},
};
use prost::Message;
use prost_reflect::Value;
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    descriptor_proto::ExtensionRange,
    field_descriptor_proto::{Label, Type},
};

fn field(name: &str, number: i32, typ: Type, label: Label) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        r#type: Some(typ.into()),
        label: Some(label.into()),
        ..Default::default()
    }
}

/// ```text
/// package demo;
/// message Point { optional int32 x = 1; optional int32 y = 2; }
/// message Track { optional string name = 1; repeated Point points = 2; extensions 100 to 199; }
/// extend Track { optional string note = 100; }
/// ```
fn descriptor_set() -> Vec<u8> {
    let point = DescriptorProto {
        name: Some("Point".to_string()),
        field: vec![
            field("x", 1, Type::Int32, Label::Optional),
            field("y", 2, Type::Int32, Label::Optional),
        ],
        ..Default::default()
    };
    let track = DescriptorProto {
        name: Some("Track".to_string()),
        field: vec![
            field("name", 1, Type::String, Label::Optional),
            FieldDescriptorProto {
                type_name: Some(".demo.Point".to_string()),
                ..field("points", 2, Type::Message, Label::Repeated)
            },
        ],
        extension_range: vec![ExtensionRange {
            start: Some(100),
            end: Some(200),
            ..Default::default()
        }],
        ..Default::default()
    };
    let note = FieldDescriptorProto {
        extendee: Some(".demo.Track".to_string()),
        ..field("note", 100, Type::String, Label::Optional)
    };
    FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some("demo.proto".to_string()),
            package: Some("demo".to_string()),
            message_type: vec![point, track],
            extension: vec![note],
            syntax: Some("proto2".to_string()),
            ..Default::default()
        }],
    }
    .encode_to_vec()
}

fn reader() -> JsonPbReader {
    JsonPbReader::from_descriptor_set(&descriptor_set()).unwrap()
}

#[test]
fn decode_str_resolves_extensions_from_the_pool() {
    let reader = reader();
    let msg = reader
        .decode_str(
            "demo.Track",
            r#"{"name": "a", "points": [{"x": 1, "y": 2}], "note": "n"}"#,
        )
        .unwrap();

    assert_eq!(
        msg.get_field_by_name("name").unwrap().into_owned(),
        Value::String("a".to_string())
    );
    let note = reader.pool().get_extension_by_name("demo.note").unwrap();
    assert_eq!(
        msg.get_extension(&note).into_owned(),
        Value::String("n".to_string())
    );
}

#[test]
fn without_extensions_rejects_extension_properties() {
    let pool = jsonpb::protobuf::load_descriptor_pool("demo", &descriptor_set()).unwrap();
    let reader = JsonPbReader::builder(pool).without_extensions().build();
    assert!(reader.registry().is_empty());

    let err = reader
        .decode_str("demo.Track", r#"{"note": "n"}"#)
        .unwrap_err();
    assert!(
        matches!(err, ReaderError::Decode(DecodeError::UnknownProperty { .. })),
        "{err}"
    );
}

#[test]
fn decoders_are_cached_per_message_type() {
    let reader = reader();
    reader.decode_str("demo.Point", "{}").unwrap();
    reader.decode_str("demo.Point", r#"{"x": 3}"#).unwrap();
    reader.decode_str("demo.Track", "{}").unwrap();
    assert_eq!(reader.cached_decoders(), 2);

    let err = reader.decode_str("demo.Missing", "{}").unwrap_err();
    assert!(
        matches!(&err, ReaderError::MessageNotFound { message_name } if message_name == "demo.Missing"),
        "{err}"
    );
}

#[test]
fn for_each_message_reads_json_lines() {
    let reader = reader();
    let input = "{\"x\": 1}\n\n  \n{\"x\": 2, \"y\": 5}\n";

    let mut seen = Vec::new();
    let count = reader
        .for_each_message(Cursor::new(input), "demo.Point", |line, msg| {
            let x = msg.get_field_by_name("x").unwrap().into_owned();
            seen.push((line, x));
            Ok(())
        })
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(seen, vec![(1, Value::I32(1)), (4, Value::I32(2))]);
}

#[test]
fn for_each_message_reports_failing_line() {
    let reader = reader();
    let input = "{\"x\": 1}\n{\"x\": \"oops\"}\n{\"x\": 3}\n";

    let mut count = 0;
    let err = reader
        .for_each_message(Cursor::new(input), "demo.Point", |_, _| {
            count += 1;
            Ok(())
        })
        .unwrap_err();

    assert_eq!(count, 1);
    match err {
        ReaderError::Line { line, source } => {
            assert_eq!(line, 2);
            assert!(matches!(source, DecodeError::InvalidScalar { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = reader
        .for_each_message(Cursor::new("{\"x\": \n"), "demo.Point", |_, _| Ok(()))
        .unwrap_err();
    assert!(
        matches!(err, ReaderError::Line { line: 1, source: DecodeError::Token(_) }),
        "{err}"
    );
}

#[test]
fn callback_errors_stop_iteration() {
    let reader = reader();
    let err = reader
        .for_each_message(Cursor::new("{}\n{}\n"), "demo.Point", |_, _| {
            Err("stop".into())
        })
        .unwrap_err();
    assert!(matches!(err, ReaderError::Callback(_)));
    assert_eq!(err.to_string(), "stop");
}

#[test]
fn decode_batch_preserves_order() {
    let reader = reader();
    let documents: Vec<String> = (0..200).map(|i| format!(r#"{{"x": {i}}}"#)).collect();

    let messages = reader.decode_batch("demo.Point", &documents).unwrap();
    assert_eq!(messages.len(), 200);
    for (i, msg) in messages.iter().enumerate() {
        assert_eq!(
            msg.get_field_by_name("x").unwrap().into_owned(),
            Value::I32(i as i32)
        );
    }
}

#[test]
fn decode_batch_reports_first_failing_document() {
    let reader = reader();
    let documents = [r#"{"x": 1}"#, r#"{"z": 1}"#, r#"{"x": 2}"#, r#"{"w": 1}"#];

    let err = reader.decode_batch("demo.Point", &documents).unwrap_err();
    assert!(
        matches!(err, ReaderError::Document { index: 1, source: DecodeError::UnknownProperty { .. } }),
        "{err}"
    );

    let pool = jsonpb::protobuf::load_descriptor_pool("demo", &descriptor_set()).unwrap();
    let lenient = JsonPbReader::builder(pool)
        .with_options(DecodeOptions::default().with_unknown_property(UnknownPropertyPolicy::Skip))
        .build();
    assert_eq!(lenient.decode_batch("demo.Point", &documents).unwrap().len(), 4);
}

#[test]
fn describe_lists_fields_and_extensions() {
    let reader = reader();
    let defs = reader.describe("demo.Track").unwrap();
    let names: Vec<_> = defs.iter().map(|d| d.property.as_str()).collect();
    assert_eq!(names, ["name", "points", "note"]);
    assert!(defs[2].extension);
    assert_eq!(defs[1].nested.len(), 2);
}

#[test]
fn json_lines_keep_repeated_keys() {
    let reader = reader();
    let input = "{\"points\": [{\"x\": 1}], \"name\": \"a\", \"points\": [{\"x\": 2}]}\n";

    let mut lengths = Vec::new();
    reader
        .for_each_message(Cursor::new(input), "demo.Track", |_, msg| {
            match msg.get_field_by_name("points").unwrap().into_owned() {
                Value::List(points) => lengths.push(points.len()),
                other => panic!("expected List, got {other:?}"),
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(lengths, vec![2]);
}
