//! Schema loading and the property view of a message descriptor.

use std::{
    collections::HashSet,
    fmt::{Result as FmtResult, Write as _},
};

use jsonpb_core::{NamingPolicy, SemanticType};
use prost_reflect::{DescriptorPool, Kind, MessageDescriptor};

use crate::{
    error::SchemaError,
    extension::ExtensionRegistry,
    field::{FieldRef, is_extendable},
};

/// Parse a serialized `google.protobuf.FileDescriptorSet`.
///
/// `schema_name` only labels errors.
pub fn load_descriptor_pool(
    schema_name: &str,
    schema_data: &[u8],
) -> Result<DescriptorPool, SchemaError> {
    DescriptorPool::decode(schema_data).map_err(|source| SchemaError::Parse {
        schema_name: schema_name.to_string(),
        source,
    })
}

/// Resolve the fully-qualified message `schema_name` from descriptor set bytes.
pub fn load_message_descriptor(
    schema_name: &str,
    schema_data: &[u8],
) -> Result<MessageDescriptor, SchemaError> {
    let pool = load_descriptor_pool(schema_name, schema_data)?;
    pool.get_message_by_name(schema_name)
        .ok_or_else(|| SchemaError::MessageNotFound {
            schema_name: schema_name.to_string(),
        })
}

/// Semantic type of a protobuf field kind.
pub fn semantic_type(kind: &Kind) -> SemanticType {
    match kind {
        Kind::Double => SemanticType::Float64,
        Kind::Float => SemanticType::Float32,
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => SemanticType::Int32,
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => SemanticType::Int64,
        Kind::Uint32 | Kind::Fixed32 => SemanticType::UInt32,
        Kind::Uint64 | Kind::Fixed64 => SemanticType::UInt64,
        Kind::Bool => SemanticType::Bool,
        Kind::String => SemanticType::String,
        Kind::Bytes => SemanticType::Bytes,
        Kind::Enum(_) => SemanticType::Enum,
        Kind::Message(_) => SemanticType::Message,
    }
}

/// One property accepted by a decoder for a message type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Property name after naming translation.
    pub property: String,
    /// Fully-qualified field or extension name.
    pub field: String,
    pub semantic_type: SemanticType,
    /// Fully-qualified enum or message type name, if any.
    pub type_name: Option<String>,
    pub repeated: bool,
    pub extension: bool,
    /// Properties of the nested message type; empty for scalars and for
    /// types already being described higher up (recursive schemas).
    pub nested: Vec<PropertyDef>,
}

/// Describe the properties a decoder accepts for `descriptor`, in schema
/// order followed by extensions in registration order.
pub fn describe_message(
    descriptor: &MessageDescriptor,
    registry: &ExtensionRegistry,
    naming: &NamingPolicy,
) -> Vec<PropertyDef> {
    let mut visiting = HashSet::new();
    describe_inner(descriptor, registry, naming, &mut visiting)
}

fn describe_inner(
    descriptor: &MessageDescriptor,
    registry: &ExtensionRegistry,
    naming: &NamingPolicy,
    visiting: &mut HashSet<String>,
) -> Vec<PropertyDef> {
    visiting.insert(descriptor.full_name().to_string());

    let mut fields: Vec<FieldRef> = descriptor.fields().map(FieldRef::Field).collect();
    if is_extendable(descriptor) {
        fields.extend(
            registry
                .extensions_for(descriptor)
                .iter()
                .cloned()
                .map(FieldRef::Extension),
        );
    }

    let defs = fields
        .iter()
        .map(|field| {
            let kind = field.kind();
            let type_name = match &kind {
                Kind::Enum(e) => Some(e.full_name().to_string()),
                Kind::Message(m) => Some(m.full_name().to_string()),
                _ => None,
            };
            let nested = match &kind {
                Kind::Message(m) if !visiting.contains(m.full_name()) => {
                    describe_inner(m, registry, naming, visiting)
                }
                _ => Vec::new(),
            };
            PropertyDef {
                property: naming.translate(field.name(), Some(field.json_name())),
                field: field.full_name().to_string(),
                semantic_type: semantic_type(&kind),
                type_name,
                repeated: field.is_repeated(),
                extension: field.is_extension(),
                nested,
            }
        })
        .collect();

    visiting.remove(descriptor.full_name());
    defs
}

/// Format property definitions: scalar properties on one line, message
/// properties as indented blocks.
pub fn format_property_defs(defs: &[PropertyDef]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    for def in defs {
        format_property(def, 0, &mut out)?;
    }
    Ok(out)
}

fn format_property(def: &PropertyDef, indent: usize, out: &mut String) -> FmtResult {
    let pad = " ".repeat(indent);
    let extension = if def.extension { ", extension: true" } else { "" };

    if def.semantic_type != SemanticType::Message {
        let type_label = match &def.type_name {
            Some(name) => format!("{} ({name})", def.semantic_type),
            None => def.semantic_type.to_string(),
        };
        return writeln!(
            out,
            "{pad}{}: {{ type: {type_label}, repeated: {}{extension} }}",
            def.property, def.repeated
        );
    }

    writeln!(out, "{pad}{}:", def.property)?;
    let inner = " ".repeat(indent + 4);
    writeln!(
        out,
        "{inner}type: {} ({})",
        def.semantic_type,
        def.type_name.as_deref().unwrap_or_default()
    )?;
    writeln!(out, "{inner}repeated: {}", def.repeated)?;
    if def.extension {
        writeln!(out, "{inner}extension: true")?;
    }
    if !def.nested.is_empty() {
        writeln!(out, "{inner}fields:")?;
        for child in &def.nested {
            format_property(child, indent + 8, out)?;
        }
    }
    Ok(())
}
