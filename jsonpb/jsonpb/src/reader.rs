//! Descriptor-pool backed reader for JSON documents and JSON Lines streams.

use std::{
    collections::HashMap,
    io::BufRead,
    sync::{Arc, PoisonError, RwLock},
};

use jsonpb_core::{DecodeError, DecodeOptions, TokenBuffer};
use jsonpb_protobuf::{
    Decoder, ExtensionRegistry, PropertyDef, describe_message, load_descriptor_pool,
};
use prost_reflect::{DescriptorPool, DynamicMessage};
use rayon::prelude::*;
use tracing::debug;

use crate::error::ReaderError;

type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Decodes JSON into messages of a [`DescriptorPool`], keeping one
/// [`Decoder`] per message type so nested decoders are resolved only once.
pub struct JsonPbReader {
    pool: DescriptorPool,
    registry: Arc<ExtensionRegistry>,
    options: DecodeOptions,
    decoders: RwLock<HashMap<String, Decoder>>,
}

/// Builder for configuring [`JsonPbReader`].
pub struct JsonPbReaderBuilder {
    pool: DescriptorPool,
    registry: Option<ExtensionRegistry>,
    options: DecodeOptions,
}

impl JsonPbReader {
    /// Create a builder over `pool`.
    pub fn builder(pool: DescriptorPool) -> JsonPbReaderBuilder {
        JsonPbReaderBuilder {
            pool,
            registry: None,
            options: DecodeOptions::default(),
        }
    }

    /// Reader over a serialized `FileDescriptorSet`, with every extension it
    /// declares registered and default options.
    pub fn from_descriptor_set(schema_data: &[u8]) -> Result<Self, ReaderError> {
        let pool = load_descriptor_pool("descriptor set", schema_data)?;
        Ok(Self::builder(pool).build())
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Decoder for `message_name`, created on first use.
    pub fn decoder(&self, message_name: &str) -> Result<Decoder, ReaderError> {
        if let Some(decoder) = self
            .decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(message_name)
        {
            return Ok(decoder.clone());
        }

        let descriptor = self.pool.get_message_by_name(message_name).ok_or_else(|| {
            ReaderError::MessageNotFound {
                message_name: message_name.to_string(),
            }
        })?;

        let mut decoders = self.decoders.write().unwrap_or_else(PoisonError::into_inner);
        let decoder = decoders
            .entry(message_name.to_string())
            .or_insert_with(|| {
                debug!(message_type = message_name, "creating decoder");
                Decoder::with_registry(descriptor, Arc::clone(&self.registry))
            });
        Ok(decoder.clone())
    }

    /// Decode one JSON document.
    pub fn decode_str(&self, message_name: &str, json: &str) -> Result<DynamicMessage, ReaderError> {
        let decoder = self.decoder(message_name)?;
        Ok(decoder.decode_str(json, &self.options)?)
    }

    /// Decode every non-blank line of a JSON Lines stream and pass each
    /// message to `callback` with its 1-based line number.
    ///
    /// Returns the number of decoded messages.
    pub fn for_each_message(
        &self,
        input: impl BufRead,
        message_name: &str,
        mut callback: impl FnMut(usize, DynamicMessage) -> Result<(), CallbackError>,
    ) -> Result<usize, ReaderError> {
        let decoder = self.decoder(message_name)?;
        let mut count = 0;

        for (i, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let number = i + 1;
            let message = TokenBuffer::parse(&line)
                .map_err(DecodeError::from)
                .and_then(|mut tokens| decoder.decode(&mut tokens, &self.options))
                .map_err(|source| ReaderError::Line {
                    line: number,
                    source,
                })?;

            callback(number, message).map_err(ReaderError::Callback)?;
            count += 1;
        }

        Ok(count)
    }

    /// Decode `documents` in parallel, preserving their order.
    ///
    /// All workers share one decoder. The first failing document (by index)
    /// is reported.
    pub fn decode_batch<S>(
        &self,
        message_name: &str,
        documents: &[S],
    ) -> Result<Vec<DynamicMessage>, ReaderError>
    where
        S: AsRef<str> + Sync,
    {
        let decoder = self.decoder(message_name)?;
        let results: Vec<_> = documents
            .par_iter()
            .map(|json| decoder.decode_str(json.as_ref(), &self.options))
            .collect();

        results
            .into_iter()
            .enumerate()
            .map(|(index, result)| result.map_err(|source| ReaderError::Document { index, source }))
            .collect()
    }

    /// Property table of `message_name` under the reader's naming policy.
    pub fn describe(&self, message_name: &str) -> Result<Vec<PropertyDef>, ReaderError> {
        let descriptor = self.pool.get_message_by_name(message_name).ok_or_else(|| {
            ReaderError::MessageNotFound {
                message_name: message_name.to_string(),
            }
        })?;
        Ok(describe_message(
            &descriptor,
            &self.registry,
            &self.options.naming,
        ))
    }

    /// Number of message types with a cached decoder.
    pub fn cached_decoders(&self) -> usize {
        self.decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl JsonPbReaderBuilder {
    /// Set the options used for every decode call.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `registry` instead of every extension declared in the pool.
    pub fn with_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Disable extension resolution.
    pub fn without_extensions(self) -> Self {
        self.with_registry(ExtensionRegistry::empty())
    }

    /// Build the reader.
    pub fn build(self) -> JsonPbReader {
        let registry = self
            .registry
            .unwrap_or_else(|| ExtensionRegistry::from_pool(&self.pool));
        JsonPbReader {
            pool: self.pool,
            registry: Arc::new(registry),
            options: self.options,
            decoders: RwLock::new(HashMap::new()),
        }
    }
}
