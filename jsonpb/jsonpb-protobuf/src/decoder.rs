//! Decoder entry point and the per-object decoding loop.

use std::{fmt, marker::PhantomData, sync::Arc};

use jsonpb_core::{
    DecodeError, DecodeOptions, TokenBuffer, TokenCursor, TokenError, TokenKind,
    UnknownPropertyPolicy,
};
use prost_reflect::{DynamicMessage, MessageDescriptor, ReflectMessage};
use tracing::{debug, trace};

use crate::{
    builder::MessageBuilder,
    cache::SubDecoderCache,
    coerce,
    extension::ExtensionRegistry,
    field::{FieldRef, FieldTable},
    value::DecodedValue,
};

/// Selects what a [`Decoder`] returns: the finished message or the live builder.
pub trait OutputMode: Send + Sync + 'static {
    type Output;

    fn finish(builder: MessageBuilder) -> Self::Output;
}

/// Decode into an immutable [`DynamicMessage`].
#[derive(Debug, Clone, Copy)]
pub struct Finished;

/// Decode into a [`MessageBuilder`] that the caller may keep mutating.
#[derive(Debug, Clone, Copy)]
pub struct Unfinished;

impl OutputMode for Finished {
    type Output = DynamicMessage;

    fn finish(builder: MessageBuilder) -> DynamicMessage {
        builder.finish()
    }
}

impl OutputMode for Unfinished {
    type Output = MessageBuilder;

    fn finish(builder: MessageBuilder) -> MessageBuilder {
        builder
    }
}

/// Decoder for one message type.
///
/// Building a decoder is cheap, but nested decoders are resolved lazily and
/// cached inside it, so a decoder should be reused across documents. It is
/// `Send + Sync` and may be shared between threads; each call owns its own
/// builder and field table.
pub struct Decoder<M: OutputMode = Finished> {
    core: Arc<DecoderCore>,
    _mode: PhantomData<fn() -> M>,
}

impl Decoder<Finished> {
    /// Decoder producing finished messages, without extensions.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self::with_registry(descriptor, Arc::new(ExtensionRegistry::empty()))
    }
}

impl Decoder<Unfinished> {
    /// Decoder producing live builders, without extensions.
    pub fn new_unfinished(descriptor: MessageDescriptor) -> Self {
        Self::with_registry(descriptor, Arc::new(ExtensionRegistry::empty()))
    }
}

impl<M: OutputMode> Decoder<M> {
    pub fn with_registry(descriptor: MessageDescriptor, registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            core: Arc::new(DecoderCore::new(descriptor, registry)),
            _mode: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.core.descriptor
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.core.registry
    }

    /// Number of nested decoders resolved so far by this decoder (not
    /// counting those cached inside nested decoders).
    pub fn cached_sub_decoders(&self) -> usize {
        self.core.sub_decoders.len()
    }

    /// Decode one message from `cursor`.
    ///
    /// An unstarted cursor is advanced to its first token. A single-element
    /// array around the object is accepted. On success the cursor sits on the
    /// last token of the message.
    pub fn decode<C: TokenCursor + ?Sized>(
        &self,
        cursor: &mut C,
        options: &DecodeOptions,
    ) -> Result<M::Output, DecodeError> {
        if cursor.current_token().is_none() {
            cursor.advance()?;
        }

        let wrapped = cursor.current_token() == Some(TokenKind::ArrayStart);
        if wrapped {
            cursor.advance()?;
        }

        let builder = self.core.populate(cursor, options)?;

        if wrapped {
            let found = next_token(cursor)?;
            if found != TokenKind::ArrayEnd {
                return Err(DecodeError::UnexpectedToken {
                    expected: TokenKind::ArrayEnd,
                    found,
                    position: cursor.position(),
                });
            }
        }

        Ok(M::finish(builder))
    }

    /// Parse `json` and decode it.
    pub fn decode_str(&self, json: &str, options: &DecodeOptions) -> Result<M::Output, DecodeError> {
        let mut tokens = TokenBuffer::parse(json)?;
        self.decode(&mut tokens, options)
    }
}

impl<M: OutputMode> Clone for Decoder<M> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            _mode: PhantomData,
        }
    }
}

impl<M: OutputMode> fmt::Debug for Decoder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("message", &self.core.descriptor.full_name())
            .field("cached_sub_decoders", &self.core.sub_decoders.len())
            .finish()
    }
}

/// Shared state behind a [`Decoder`]; nested decoders are plain cores.
#[derive(Debug)]
pub(crate) struct DecoderCore {
    descriptor: MessageDescriptor,
    registry: Arc<ExtensionRegistry>,
    sub_decoders: SubDecoderCache,
}

impl DecoderCore {
    fn new(descriptor: MessageDescriptor, registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            descriptor,
            registry,
            sub_decoders: SubDecoderCache::default(),
        }
    }

    /// Decode the object at the cursor into a fresh builder.
    pub(crate) fn populate<C: TokenCursor + ?Sized>(
        &self,
        cursor: &mut C,
        options: &DecodeOptions,
    ) -> Result<MessageBuilder, DecodeError> {
        let mut builder = MessageBuilder::new(self.descriptor.clone());

        let mut token = current_token(cursor)?;
        match token {
            TokenKind::ObjectEnd => return Ok(builder),
            TokenKind::ObjectStart => {
                token = next_token(cursor)?;
                if token == TokenKind::ObjectEnd {
                    return Ok(builder);
                }
            }
            _ => {}
        }

        trace!(message_type = self.descriptor.full_name(), "decoding object");
        let table = FieldTable::build(&self.descriptor, &self.registry, &options.naming);

        loop {
            if token != TokenKind::FieldName {
                return Err(DecodeError::ExpectedFieldName {
                    message: self.descriptor.full_name().to_string(),
                    found: token,
                    position: cursor.position(),
                });
            }

            let name = cursor.text_value().unwrap_or_default().to_string();
            match table.resolve(&name) {
                Some(field) => {
                    next_token(cursor)?;
                    self.set_field(&mut builder, &field, cursor, options)?;
                }
                None => match options.unknown_property {
                    UnknownPropertyPolicy::Fail => {
                        return Err(DecodeError::UnknownProperty {
                            message: self.descriptor.full_name().to_string(),
                            name,
                            position: cursor.position(),
                        });
                    }
                    UnknownPropertyPolicy::Skip => {
                        debug!(
                            message_type = self.descriptor.full_name(),
                            property = %name,
                            "skipping unknown property"
                        );
                        next_token(cursor)?;
                        cursor.skip_children()?;
                    }
                },
            }

            token = next_token(cursor)?;
            if token == TokenKind::ObjectEnd {
                return Ok(builder);
            }
        }
    }

    fn set_field<C: TokenCursor + ?Sized>(
        &self,
        builder: &mut MessageBuilder,
        field: &FieldRef,
        cursor: &mut C,
        options: &DecodeOptions,
    ) -> Result<(), DecodeError> {
        let found = current_token(cursor)?;
        let position = cursor.position();

        match coerce::read_value(self, builder, field, cursor, options)? {
            None => Ok(()),
            Some(DecodedValue::Sequence(values)) => {
                for value in values {
                    builder.add_repeated(field, value)?;
                }
                Ok(())
            }
            Some(DecodedValue::Single(value)) if field.is_repeated() => {
                if options.accept_single_value_as_array {
                    builder.add_repeated(field, value)
                } else {
                    Err(DecodeError::ExpectedArray {
                        field: field.full_name().to_string(),
                        found,
                        position,
                    })
                }
            }
            Some(DecodedValue::Single(value)) => builder.set_field(field, value),
        }
    }

    /// Nested decoder for a message-typed field, resolved once per field.
    pub(crate) fn sub_decoder(
        &self,
        field: &FieldRef,
        builder: &MessageBuilder,
    ) -> Option<Arc<DecoderCore>> {
        self.sub_decoders
            .get_or_try_insert_with(field.full_name(), || {
                let target = match field.extension_default() {
                    Some(default_instance) => default_instance.descriptor(),
                    None => builder.new_sub_builder(field)?.descriptor(),
                };
                debug!(
                    field = field.full_name(),
                    message_type = target.full_name(),
                    "caching nested decoder"
                );
                Some(DecoderCore::new(target, Arc::clone(&self.registry)))
            })
    }
}

/// Current token, failing at end of input.
pub(crate) fn current_token<C: TokenCursor + ?Sized>(cursor: &C) -> Result<TokenKind, DecodeError> {
    cursor.current_token().ok_or_else(|| {
        DecodeError::Token(TokenError::UnexpectedEof {
            position: cursor.position(),
        })
    })
}

/// Advance and return the new token, failing at end of input.
pub(crate) fn next_token<C: TokenCursor + ?Sized>(
    cursor: &mut C,
) -> Result<TokenKind, DecodeError> {
    cursor.advance()?;
    current_token(cursor)
}
