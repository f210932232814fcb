//! Registry of extension fields, scoped by the message type they extend.

use std::collections::HashMap;

use prost_reflect::{DescriptorPool, DynamicMessage, ExtensionDescriptor, MessageDescriptor};

/// One registered extension.
///
/// `default_instance`, when present, fixes the message type decoded for a
/// message-typed extension instead of the type declared by the descriptor.
#[derive(Debug, Clone)]
pub struct ExtensionInfo {
    pub descriptor: ExtensionDescriptor,
    pub default_instance: Option<DynamicMessage>,
}

impl ExtensionInfo {
    pub fn new(descriptor: ExtensionDescriptor) -> Self {
        Self {
            descriptor,
            default_instance: None,
        }
    }
}

/// Extensions available to decoders, keyed by the full name of the extendee.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    by_extendee: HashMap<String, Vec<ExtensionInfo>>,
}

impl ExtensionRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register every extension declared anywhere in `pool`.
    pub fn from_pool(pool: &DescriptorPool) -> Self {
        let mut registry = Self::empty();
        for extension in pool.all_extensions() {
            registry.register(extension);
        }
        registry
    }

    pub fn register(&mut self, descriptor: ExtensionDescriptor) {
        self.insert(ExtensionInfo::new(descriptor));
    }

    /// Register a message-typed extension together with the instance whose
    /// type nested values are decoded into.
    pub fn register_with_default(
        &mut self,
        descriptor: ExtensionDescriptor,
        default_instance: DynamicMessage,
    ) {
        self.insert(ExtensionInfo {
            descriptor,
            default_instance: Some(default_instance),
        });
    }

    fn insert(&mut self, info: ExtensionInfo) {
        let extendee = info.descriptor.containing_message().full_name().to_string();
        let entries = self.by_extendee.entry(extendee).or_default();
        // Re-registering replaces the previous entry for the same extension.
        entries.retain(|e| e.descriptor.full_name() != info.descriptor.full_name());
        entries.push(info);
    }

    /// Extensions registered for `descriptor`, in registration order.
    pub fn extensions_for(&self, descriptor: &MessageDescriptor) -> &[ExtensionInfo] {
        self.by_extendee
            .get(descriptor.full_name())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of registered extensions.
    pub fn len(&self) -> usize {
        self.by_extendee.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
