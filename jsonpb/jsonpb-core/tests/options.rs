use jsonpb_core::{
    DecodeError, DecodeOptions, NamingPolicy, Position, SemanticType, TokenBuffer, TokenCursor,
    TokenKind, UnknownPropertyPolicy,
};
use serde_json::json;

#[test]
fn defaults_are_strict() {
    let options = DecodeOptions::default();
    assert!(!options.accept_single_value_as_array);
    assert!(!options.fail_on_null_for_primitives);
    assert!(!options.accept_empty_string_as_null_for_enum);
    assert!(!options.fail_on_numbers_for_enums);
    assert!(!options.ignore_unknown_enum_values);
    assert_eq!(options.unknown_property, UnknownPropertyPolicy::Fail);
    assert!(matches!(options.naming, NamingPolicy::LowerCamelCase));
}

#[test]
fn builder_methods_chain() {
    let options = DecodeOptions::new()
        .with_accept_single_value_as_array(true)
        .with_ignore_unknown_enum_values(true)
        .with_unknown_property(UnknownPropertyPolicy::Skip)
        .with_naming(NamingPolicy::SnakeCase);

    assert!(options.accept_single_value_as_array);
    assert!(options.ignore_unknown_enum_values);
    assert!(!options.fail_on_numbers_for_enums);
    assert_eq!(options.unknown_property, UnknownPropertyPolicy::Skip);
    assert_eq!(options.naming.translate("fieldName", None), "field_name");
}

#[test]
fn unknown_property_policy_from_str() {
    assert_eq!("skip".parse::<UnknownPropertyPolicy>(), Ok(UnknownPropertyPolicy::Skip));
    assert_eq!("fail".parse::<UnknownPropertyPolicy>(), Ok(UnknownPropertyPolicy::Fail));
    assert!("ignore".parse::<UnknownPropertyPolicy>().is_err());
}

#[test]
fn error_messages_name_field_and_position() {
    let err = DecodeError::TypeMismatch {
        field: "demo.Sample.count".to_string(),
        semantic_type: SemanticType::Int32,
        found: TokenKind::ObjectStart,
        position: Position::new(3, "$.count"),
    };
    let text = err.to_string();
    assert!(text.contains("demo.Sample.count"), "{text}");
    assert!(text.contains("INT32"), "{text}");
    assert!(text.contains("START_OBJECT"), "{text}");
    assert!(text.contains("token 3 ($.count)"), "{text}");
}

#[test]
fn token_buffer_drives_a_manual_walk() {
    let mut tokens = TokenBuffer::from_value(&json!({"name": "a", "tags": ["x", "y"]}));
    let mut kinds = Vec::new();
    while let Some(kind) = tokens.advance().unwrap() {
        kinds.push(kind);
    }
    assert_eq!(
        kinds,
        [
            TokenKind::ObjectStart,
            TokenKind::FieldName,
            TokenKind::String,
            TokenKind::FieldName,
            TokenKind::ArrayStart,
            TokenKind::String,
            TokenKind::String,
            TokenKind::ArrayEnd,
            TokenKind::ObjectEnd,
        ]
    );

    tokens.rewind();
    assert_eq!(tokens.current_token(), None);
    assert_eq!(tokens.len(), 9);
}
