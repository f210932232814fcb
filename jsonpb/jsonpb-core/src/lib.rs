//! Format-agnostic building blocks for decoding JSON token streams into
//! schema-described messages.
//!
//! This crate provides the token model ([`TokenKind`] / [`TokenCursor`]),
//! an in-memory cursor over `serde_json` values ([`TokenBuffer`]), the
//! per-call [`DecodeOptions`], property [`NamingPolicy`] and the error types
//! shared by decoder backends.

mod buffer;
mod cursor;
mod error;
mod naming;
mod number;
mod options;
mod semantic;
mod token;

pub use buffer::TokenBuffer;
pub use cursor::TokenCursor;
pub use error::{DecodeError, ScalarError, TokenError};
pub use naming::NamingPolicy;
pub use number::{parse_bool, parse_float, parse_integral};
pub use options::{DecodeOptions, UnknownPropertyPolicy};
pub use semantic::SemanticType;
pub use token::{Position, TokenKind};
