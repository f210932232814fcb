//! Property-name resolution against schema fields and extensions.

use std::collections::HashMap;

use jsonpb_core::{NamingPolicy, SemanticType};
use prost_reflect::{DynamicMessage, FieldDescriptor, Kind, MessageDescriptor};

use crate::{
    extension::{ExtensionInfo, ExtensionRegistry},
    schema::semantic_type,
};

/// A resolved property: either a regular schema field or a registered extension.
#[derive(Debug, Clone)]
pub enum FieldRef {
    Field(FieldDescriptor),
    Extension(ExtensionInfo),
}

impl FieldRef {
    /// Declared (unqualified) name.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(f) => f.name(),
            Self::Extension(e) => e.descriptor.name(),
        }
    }

    /// Fully-qualified name; identifies the field within its descriptor pool.
    pub fn full_name(&self) -> &str {
        match self {
            Self::Field(f) => f.full_name(),
            Self::Extension(e) => e.descriptor.full_name(),
        }
    }

    pub fn json_name(&self) -> &str {
        match self {
            Self::Field(f) => f.json_name(),
            Self::Extension(e) => e.descriptor.json_name(),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Field(f) => f.kind(),
            Self::Extension(e) => e.descriptor.kind(),
        }
    }

    pub fn semantic_type(&self) -> SemanticType {
        semantic_type(&self.kind())
    }

    pub fn is_map(&self) -> bool {
        match self {
            Self::Field(f) => f.is_map(),
            Self::Extension(e) => e.descriptor.is_map(),
        }
    }

    /// Repeated fields, including map fields (read as repeated entry messages).
    pub fn is_repeated(&self) -> bool {
        match self {
            Self::Field(f) => f.is_list() || f.is_map(),
            Self::Extension(e) => e.descriptor.is_list() || e.descriptor.is_map(),
        }
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, Self::Extension(_))
    }

    /// Default instance registered with an extension, if any.
    pub fn extension_default(&self) -> Option<&DynamicMessage> {
        match self {
            Self::Field(_) => None,
            Self::Extension(e) => e.default_instance.as_ref(),
        }
    }
}

/// Lookup table from property name to field, built once per decoded object.
///
/// Schema fields shadow extensions that translate to the same name.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: HashMap<String, FieldDescriptor>,
    extensions: HashMap<String, ExtensionInfo>,
}

impl FieldTable {
    pub fn build(
        descriptor: &MessageDescriptor,
        registry: &ExtensionRegistry,
        naming: &NamingPolicy,
    ) -> Self {
        let fields = descriptor
            .fields()
            .map(|f| (naming.translate(f.name(), Some(f.json_name())), f))
            .collect();

        let extensions = if is_extendable(descriptor) {
            registry
                .extensions_for(descriptor)
                .iter()
                .map(|e| {
                    let key = naming.translate(e.descriptor.name(), Some(e.descriptor.json_name()));
                    (key, e.clone())
                })
                .collect()
        } else {
            HashMap::new()
        };

        Self { fields, extensions }
    }

    pub fn resolve(&self, property: &str) -> Option<FieldRef> {
        if let Some(field) = self.fields.get(property) {
            return Some(FieldRef::Field(field.clone()));
        }
        self.extensions
            .get(property)
            .map(|e| FieldRef::Extension(e.clone()))
    }
}

/// Whether the message declares any extension range.
pub(crate) fn is_extendable(descriptor: &MessageDescriptor) -> bool {
    descriptor.extension_ranges().next().is_some()
}
