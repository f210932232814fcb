//! Lazily-populated map from message-typed fields to nested decoders.

use std::sync::Arc;

use dashmap::DashMap;

use crate::decoder::DecoderCore;

/// Per-decoder cache of nested decoders, keyed by field full name.
///
/// Entries are inserted once and never removed. Construction happens outside
/// the map's shard locks, so racing callers may build redundant decoders;
/// the first inserted entry wins and every caller receives it.
#[derive(Debug, Default)]
pub(crate) struct SubDecoderCache {
    entries: DashMap<String, Arc<DecoderCore>>,
}

impl SubDecoderCache {
    pub(crate) fn get_or_try_insert_with(
        &self,
        field: &str,
        make: impl FnOnce() -> Option<DecoderCore>,
    ) -> Option<Arc<DecoderCore>> {
        if let Some(existing) = self.entries.get(field) {
            return Some(Arc::clone(existing.value()));
        }

        let created = Arc::new(make()?);
        let entry = self.entries.entry(field.to_string()).or_insert(created);
        Some(Arc::clone(entry.value()))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
