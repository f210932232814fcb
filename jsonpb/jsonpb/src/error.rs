//! Error types for the JSON reader.

use jsonpb_core::DecodeError;
use jsonpb_protobuf::SchemaError;

/// Errors produced by [`JsonPbReader`](crate::JsonPbReader).
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error while reading input.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The descriptor set could not be loaded.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The requested message type is not in the descriptor pool.
    #[error("message type '{message_name}' not found in descriptor pool")]
    MessageNotFound { message_name: String },

    /// A JSON Lines record failed to decode.
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: DecodeError,
    },

    /// A document of a batch failed to decode.
    #[error("document {index}: {source}")]
    Document {
        index: usize,
        #[source]
        source: DecodeError,
    },

    /// A single document failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An error returned by the user-supplied callback in
    /// [`JsonPbReader::for_each_message`](crate::JsonPbReader::for_each_message).
    #[error(transparent)]
    Callback(Box<dyn std::error::Error + Send + Sync>),
}
