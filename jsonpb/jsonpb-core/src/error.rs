//! Error types for the token and decoder layers.

use crate::{
    semantic::SemanticType,
    token::{Position, TokenKind},
};

/// Failure to coerce scalar text into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScalarError {
    #[error("not a valid value")]
    Invalid,
    #[error("value out of range")]
    OutOfRange,
}

/// Error raised by a [`TokenCursor`](crate::TokenCursor) implementation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The stream ended while a structure was still open.
    #[error("unexpected end of input after {position}")]
    UnexpectedEof { position: Position },

    /// JSON text could not be parsed into tokens.
    #[error("failed to parse JSON text: {source}")]
    Syntax {
        #[source]
        source: serde_json::Error,
    },

    /// The underlying token source failed.
    #[error("token source failed at {position}: {source}")]
    Source {
        position: Position,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Error returned when a token stream cannot be decoded into a message.
///
/// Every variant is terminal for the decode call that raised it.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stream is malformed at an object-field boundary.
    #[error("expected FIELD_NAME in message '{message}' but found {found} at {position}")]
    ExpectedFieldName {
        message: String,
        found: TokenKind,
        position: Position,
    },

    /// A property did not resolve to any field or extension.
    #[error("unrecognized field '{name}' for message '{message}' at {position}")]
    UnknownProperty {
        message: String,
        name: String,
        position: Position,
    },

    /// The token kind cannot be coerced into the field's semantic type.
    #[error(
        "cannot deserialize {semantic_type} field '{field}' out of {found} token at {position}"
    )]
    TypeMismatch {
        field: String,
        semantic_type: SemanticType,
        found: TokenKind,
        position: Position,
    },

    /// An array was given for a singular field.
    #[error("unexpected START_ARRAY for singular field '{field}' at {position}")]
    UnexpectedArray { field: String, position: Position },

    /// A single value was given for a repeated field.
    #[error(
        "expected START_ARRAY for repeated field '{field}' but found {found} at {position} \
         (enable accept_single_value_as_array to allow)"
    )]
    ExpectedArray {
        field: String,
        found: TokenKind,
        position: Position,
    },

    /// `null` for a primitive field while the strict null policy is active.
    #[error(
        "cannot map null into {semantic_type} field '{field}' at {position} \
         (disable fail_on_null_for_primitives to allow)"
    )]
    NullPrimitive {
        field: String,
        semantic_type: SemanticType,
        position: Position,
    },

    /// Enum text that names no declared value.
    #[error(
        "value '{value}' for field '{field}' is not one of the declared names of enum '{enum_name}' at {position}"
    )]
    UnknownEnumName {
        field: String,
        enum_name: String,
        value: String,
        position: Position,
    },

    /// Enum number that identifies no declared value.
    #[error(
        "index value {value} for field '{field}' outside legal index range [{}] of enum '{enum_name}' at {position}",
        join_indices(.valid)
    )]
    UnknownEnumIndex {
        field: String,
        enum_name: String,
        value: i32,
        valid: Vec<i32>,
        position: Position,
    },

    /// Numeric enum input while numbers for enums are disallowed.
    #[error(
        "not allowed to deserialize enum field '{field}' out of a number at {position} \
         (disable fail_on_numbers_for_enums to allow)"
    )]
    EnumNumberNotAllowed { field: String, position: Position },

    /// Scalar text that does not parse as the field's semantic type.
    #[error("cannot parse '{text}' as {semantic_type} for field '{field}' at {position}")]
    InvalidScalar {
        field: String,
        semantic_type: SemanticType,
        text: String,
        position: Position,
    },

    /// Numeric value that does not fit the field's semantic type.
    #[error("numeric value '{text}' out of range of {semantic_type} for field '{field}' at {position}")]
    NumberOutOfRange {
        field: String,
        semantic_type: SemanticType,
        text: String,
        position: Position,
    },

    /// A bytes field whose text is not valid base64.
    #[error("invalid base64 for field '{field}' at {position}: {detail}")]
    InvalidBase64 {
        field: String,
        detail: String,
        position: Position,
    },

    /// Structural token other than the one required at this point.
    #[error("expected {expected} but found {found} at {position}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        position: Position,
    },

    /// The message builder rejected a decoded value.
    #[error("failed to assign field '{field}': {detail}")]
    Builder { field: String, detail: String },

    /// The token source failed or ended early.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DecodeError {
    /// Build the error for a scalar coercion failure.
    pub fn scalar(
        err: ScalarError,
        field: impl Into<String>,
        semantic_type: SemanticType,
        text: impl Into<String>,
        position: Position,
    ) -> Self {
        let field = field.into();
        let text = text.into();
        match err {
            ScalarError::Invalid => Self::InvalidScalar {
                field,
                semantic_type,
                text,
                position,
            },
            ScalarError::OutOfRange => Self::NumberOutOfRange {
                field,
                semantic_type,
                text,
                position,
            },
        }
    }
}

fn join_indices(valid: &[i32]) -> String {
    valid
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
