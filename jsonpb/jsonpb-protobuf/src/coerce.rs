//! Coercion of the token at the cursor into a field's declared type.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use jsonpb_core::{
    DecodeError, DecodeOptions, ScalarError, SemanticType, TokenCursor, TokenKind, parse_bool,
    parse_float, parse_integral,
};
use prost_reflect::{EnumDescriptor, Kind, Value};

use crate::{
    builder::MessageBuilder,
    decoder::{DecoderCore, current_token, next_token},
    field::FieldRef,
    value::DecodedValue,
};

/// Read the value at the cursor for `field`.
///
/// Returns `None` when the value is null (or an ignorable enum) and nothing
/// should be assigned. Arrays are only accepted for repeated fields.
pub(crate) fn read_value<C: TokenCursor + ?Sized>(
    decoder: &DecoderCore,
    builder: &MessageBuilder,
    field: &FieldRef,
    cursor: &mut C,
    options: &DecodeOptions,
) -> Result<Option<DecodedValue>, DecodeError> {
    if current_token(cursor)? == TokenKind::ArrayStart {
        if !field.is_repeated() {
            return Err(unexpected_array(field, cursor));
        }
        return read_array(decoder, builder, field, cursor, options)
            .map(|values| Some(DecodedValue::Sequence(values)));
    }

    read_element(decoder, builder, field, cursor, options)
        .map(|value| value.map(DecodedValue::Single))
}

/// Read the elements of the array at the cursor, dropping nulls.
///
/// An array nested directly inside the field's array is rejected.
fn read_array<C: TokenCursor + ?Sized>(
    decoder: &DecoderCore,
    builder: &MessageBuilder,
    field: &FieldRef,
    cursor: &mut C,
    options: &DecodeOptions,
) -> Result<Vec<Value>, DecodeError> {
    let mut values = Vec::new();
    loop {
        match next_token(cursor)? {
            TokenKind::ArrayEnd => return Ok(values),
            TokenKind::ArrayStart => return Err(unexpected_array(field, cursor)),
            _ => {
                if let Some(value) = read_element(decoder, builder, field, cursor, options)? {
                    values.push(value);
                }
            }
        }
    }
}

fn read_element<C: TokenCursor + ?Sized>(
    decoder: &DecoderCore,
    builder: &MessageBuilder,
    field: &FieldRef,
    cursor: &mut C,
    options: &DecodeOptions,
) -> Result<Option<Value>, DecodeError> {
    let token = current_token(cursor)?;
    match field.kind() {
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
            read_primitive::<i32, C>(field, token, cursor, options)
        }
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
            read_primitive::<i64, C>(field, token, cursor, options)
        }
        Kind::Uint32 | Kind::Fixed32 => read_primitive::<u32, C>(field, token, cursor, options),
        Kind::Uint64 | Kind::Fixed64 => read_primitive::<u64, C>(field, token, cursor, options),
        Kind::Float => read_primitive::<f32, C>(field, token, cursor, options),
        Kind::Double => read_primitive::<f64, C>(field, token, cursor, options),
        Kind::Bool => read_primitive::<bool, C>(field, token, cursor, options),
        Kind::String => read_string(field, token, cursor),
        Kind::Bytes => read_bytes(field, token, cursor),
        Kind::Enum(descriptor) => read_enum(field, &descriptor, token, cursor, options),
        Kind::Message(_) => match token {
            TokenKind::ObjectStart => {
                let nested = decoder
                    .sub_decoder(field, builder)
                    .ok_or_else(|| type_mismatch(field, token, cursor))?;
                let message = nested.populate(cursor, options)?.finish();
                Ok(Some(Value::Message(message)))
            }
            TokenKind::Null => Ok(None),
            _ => Err(type_mismatch(field, token, cursor)),
        },
    }
}

/// Numeric and boolean field types.
trait Primitive: Sized {
    const TYPE: SemanticType;

    fn from_number<C: TokenCursor + ?Sized>(cursor: &C) -> Result<Self, ScalarError>;

    fn from_text(text: &str) -> Result<Self, ScalarError>;

    fn from_bool(_value: bool) -> Option<Self> {
        None
    }

    fn into_value(self) -> Value;
}

impl Primitive for i32 {
    const TYPE: SemanticType = SemanticType::Int32;

    fn from_number<C: TokenCursor + ?Sized>(cursor: &C) -> Result<Self, ScalarError> {
        cursor.i32_value()
    }

    fn from_text(text: &str) -> Result<Self, ScalarError> {
        parse_integral(text)
    }

    fn into_value(self) -> Value {
        Value::I32(self)
    }
}

impl Primitive for i64 {
    const TYPE: SemanticType = SemanticType::Int64;

    fn from_number<C: TokenCursor + ?Sized>(cursor: &C) -> Result<Self, ScalarError> {
        cursor.i64_value()
    }

    fn from_text(text: &str) -> Result<Self, ScalarError> {
        parse_integral(text)
    }

    fn into_value(self) -> Value {
        Value::I64(self)
    }
}

impl Primitive for u32 {
    const TYPE: SemanticType = SemanticType::UInt32;

    fn from_number<C: TokenCursor + ?Sized>(cursor: &C) -> Result<Self, ScalarError> {
        cursor.u32_value()
    }

    fn from_text(text: &str) -> Result<Self, ScalarError> {
        parse_integral(text)
    }

    fn into_value(self) -> Value {
        Value::U32(self)
    }
}

impl Primitive for u64 {
    const TYPE: SemanticType = SemanticType::UInt64;

    fn from_number<C: TokenCursor + ?Sized>(cursor: &C) -> Result<Self, ScalarError> {
        cursor.u64_value()
    }

    fn from_text(text: &str) -> Result<Self, ScalarError> {
        parse_integral(text)
    }

    fn into_value(self) -> Value {
        Value::U64(self)
    }
}

impl Primitive for f32 {
    const TYPE: SemanticType = SemanticType::Float32;

    fn from_number<C: TokenCursor + ?Sized>(cursor: &C) -> Result<Self, ScalarError> {
        cursor.f32_value()
    }

    fn from_text(text: &str) -> Result<Self, ScalarError> {
        parse_float(text)
    }

    fn into_value(self) -> Value {
        Value::F32(self)
    }
}

impl Primitive for f64 {
    const TYPE: SemanticType = SemanticType::Float64;

    fn from_number<C: TokenCursor + ?Sized>(cursor: &C) -> Result<Self, ScalarError> {
        cursor.f64_value()
    }

    fn from_text(text: &str) -> Result<Self, ScalarError> {
        parse_float(text)
    }

    fn into_value(self) -> Value {
        Value::F64(self)
    }
}

impl Primitive for bool {
    const TYPE: SemanticType = SemanticType::Bool;

    // Integral numbers read as `value != 0`.
    fn from_number<C: TokenCursor + ?Sized>(cursor: &C) -> Result<Self, ScalarError> {
        if !cursor.is_integral() {
            return Err(ScalarError::Invalid);
        }
        cursor.i64_value().map(|v| v != 0)
    }

    fn from_text(text: &str) -> Result<Self, ScalarError> {
        parse_bool(text)
    }

    fn from_bool(value: bool) -> Option<Self> {
        Some(value)
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

fn read_primitive<T: Primitive, C: TokenCursor + ?Sized>(
    field: &FieldRef,
    token: TokenKind,
    cursor: &C,
    options: &DecodeOptions,
) -> Result<Option<Value>, DecodeError> {
    let parsed = match token {
        TokenKind::Number => T::from_number(cursor),
        TokenKind::String => {
            let text = cursor.text_value().unwrap_or_default();
            if text.trim().is_empty() {
                return read_null_primitive(field, T::TYPE, cursor, options);
            }
            T::from_text(text)
        }
        TokenKind::Bool => {
            let value = cursor.bool_value().and_then(T::from_bool);
            return match value {
                Some(v) => Ok(Some(v.into_value())),
                None => Err(type_mismatch(field, token, cursor)),
            };
        }
        TokenKind::Null => return read_null_primitive(field, T::TYPE, cursor, options),
        _ => return Err(type_mismatch(field, token, cursor)),
    };

    parsed.map(|v| Some(v.into_value())).map_err(|err| {
        DecodeError::scalar(
            err,
            field.full_name(),
            T::TYPE,
            cursor.text_value().unwrap_or_default(),
            cursor.position(),
        )
    })
}

fn read_null_primitive<C: TokenCursor + ?Sized>(
    field: &FieldRef,
    semantic_type: SemanticType,
    cursor: &C,
    options: &DecodeOptions,
) -> Result<Option<Value>, DecodeError> {
    if options.fail_on_null_for_primitives {
        return Err(DecodeError::NullPrimitive {
            field: field.full_name().to_string(),
            semantic_type,
            position: cursor.position(),
        });
    }
    Ok(None)
}

fn read_string<C: TokenCursor + ?Sized>(
    field: &FieldRef,
    token: TokenKind,
    cursor: &C,
) -> Result<Option<Value>, DecodeError> {
    match token {
        TokenKind::String | TokenKind::Number | TokenKind::Bool => match cursor.text_value() {
            Some(text) => Ok(Some(Value::String(text.to_string()))),
            None => Err(type_mismatch(field, token, cursor)),
        },
        TokenKind::Null => Ok(None),
        _ => Err(type_mismatch(field, token, cursor)),
    }
}

fn read_bytes<C: TokenCursor + ?Sized>(
    field: &FieldRef,
    token: TokenKind,
    cursor: &C,
) -> Result<Option<Value>, DecodeError> {
    match token {
        TokenKind::String => {
            let text = cursor.text_value().unwrap_or_default();
            let bytes = STANDARD
                .decode(text)
                .map_err(|err| DecodeError::InvalidBase64 {
                    field: field.full_name().to_string(),
                    detail: err.to_string(),
                    position: cursor.position(),
                })?;
            Ok(Some(Value::Bytes(bytes.into())))
        }
        TokenKind::Null => Ok(None),
        _ => Err(type_mismatch(field, token, cursor)),
    }
}

fn read_enum<C: TokenCursor + ?Sized>(
    field: &FieldRef,
    descriptor: &EnumDescriptor,
    token: TokenKind,
    cursor: &C,
    options: &DecodeOptions,
) -> Result<Option<Value>, DecodeError> {
    match token {
        TokenKind::String => {
            let text = cursor.text_value().unwrap_or_default();
            if let Some(value) = descriptor.get_value_by_name(text) {
                return Ok(Some(Value::EnumNumber(value.number())));
            }
            let empty_as_null =
                options.accept_empty_string_as_null_for_enum && text.trim().is_empty();
            if empty_as_null || options.ignore_unknown_enum_values {
                return Ok(None);
            }
            Err(DecodeError::UnknownEnumName {
                field: field.full_name().to_string(),
                enum_name: descriptor.full_name().to_string(),
                value: text.to_string(),
                position: cursor.position(),
            })
        }
        TokenKind::Number if cursor.is_integral() => {
            if options.fail_on_numbers_for_enums {
                return Err(DecodeError::EnumNumberNotAllowed {
                    field: field.full_name().to_string(),
                    position: cursor.position(),
                });
            }
            let number = cursor.i32_value().map_err(|err| {
                DecodeError::scalar(
                    err,
                    field.full_name(),
                    SemanticType::Enum,
                    cursor.text_value().unwrap_or_default(),
                    cursor.position(),
                )
            })?;
            if descriptor.get_value(number).is_some() {
                return Ok(Some(Value::EnumNumber(number)));
            }
            if options.ignore_unknown_enum_values {
                return Ok(None);
            }
            Err(DecodeError::UnknownEnumIndex {
                field: field.full_name().to_string(),
                enum_name: descriptor.full_name().to_string(),
                value: number,
                valid: valid_numbers(descriptor),
                position: cursor.position(),
            })
        }
        TokenKind::Null => Ok(None),
        _ => Err(type_mismatch(field, token, cursor)),
    }
}

fn valid_numbers(descriptor: &EnumDescriptor) -> Vec<i32> {
    let mut numbers: Vec<i32> = descriptor.values().map(|v| v.number()).collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

fn type_mismatch<C: TokenCursor + ?Sized>(
    field: &FieldRef,
    found: TokenKind,
    cursor: &C,
) -> DecodeError {
    DecodeError::TypeMismatch {
        field: field.full_name().to_string(),
        semantic_type: field.semantic_type(),
        found,
        position: cursor.position(),
    }
}

fn unexpected_array<C: TokenCursor + ?Sized>(field: &FieldRef, cursor: &C) -> DecodeError {
    DecodeError::UnexpectedArray {
        field: field.full_name().to_string(),
        position: cursor.position(),
    }
}
