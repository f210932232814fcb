//! Errors raised while loading schemas.

/// Error returned when a descriptor set cannot provide the requested schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The bytes are not a valid serialized `FileDescriptorSet`.
    #[error("failed to parse descriptor set for '{schema_name}': {source}")]
    Parse {
        schema_name: String,
        #[source]
        source: prost_reflect::DescriptorError,
    },

    /// The descriptor set has no message with the requested name.
    #[error("message descriptor not found: '{schema_name}'")]
    MessageNotFound { schema_name: String },
}
