//! Schema-driven decoder from JSON token streams into protobuf messages.
//!
//! [`Decoder`] walks a [`TokenCursor`](jsonpb_core::TokenCursor), resolves
//! each property against a `prost-reflect` [`MessageDescriptor`] (plus any
//! registered extensions), coerces every value into the field's declared
//! type and accumulates the result into a [`MessageBuilder`].
//!
//! One decoder is meant to be built per message type and reused for many
//! documents, including from several threads at once.
//!
//! [`MessageDescriptor`]: prost_reflect::MessageDescriptor

mod builder;
mod cache;
mod coerce;
mod decoder;
mod error;
mod extension;
mod field;
mod schema;
mod value;

pub use builder::MessageBuilder;
pub use decoder::{Decoder, Finished, OutputMode, Unfinished};
pub use error::SchemaError;
pub use extension::{ExtensionInfo, ExtensionRegistry};
pub use field::{FieldRef, FieldTable};
pub use schema::{
    PropertyDef, describe_message, format_property_defs, load_descriptor_pool,
    load_message_descriptor, semantic_type,
};
pub use value::DecodedValue;
