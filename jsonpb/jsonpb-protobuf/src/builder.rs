//! Mutable accumulator for decoded field values.

use jsonpb_core::DecodeError;
use prost_reflect::{DynamicMessage, Kind, MapKey, MessageDescriptor, ReflectMessage, Value};

use crate::field::FieldRef;

/// Accumulates decoded values into a [`DynamicMessage`].
///
/// A builder is owned by exactly one decode call. [`set_field`](Self::set_field)
/// overwrites, [`add_repeated`](Self::add_repeated) appends.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBuilder {
    message: DynamicMessage,
}

impl MessageBuilder {
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            message: DynamicMessage::new(descriptor),
        }
    }

    pub fn descriptor(&self) -> MessageDescriptor {
        self.message.descriptor()
    }

    /// Assign a singular field, replacing any previous value.
    pub fn set_field(&mut self, field: &FieldRef, value: Value) -> Result<(), DecodeError> {
        match field {
            FieldRef::Field(f) => {
                if !value.is_valid_for_field(f) {
                    return Err(invalid_value(field, &value));
                }
                self.message.set_field(f, value);
            }
            FieldRef::Extension(e) => {
                if !value.is_valid_for_extension(&e.descriptor) {
                    return Err(invalid_value(field, &value));
                }
                self.message.set_extension(&e.descriptor, value);
            }
        }
        Ok(())
    }

    /// Append one element to a repeated field.
    ///
    /// For map fields `value` must be an entry message; its key and value are
    /// inserted into the map.
    pub fn add_repeated(&mut self, field: &FieldRef, value: Value) -> Result<(), DecodeError> {
        if field.is_map() {
            let (key, entry_value) = split_map_entry(field, value)?;
            let slot = self.slot_mut(field);
            return match slot.as_map_mut() {
                Some(map) => {
                    map.insert(key, entry_value);
                    Ok(())
                }
                None => Err(not_repeated(field)),
            };
        }

        let slot = self.slot_mut(field);
        match slot.as_list_mut() {
            Some(list) => {
                list.push(value);
                Ok(())
            }
            None => Err(not_repeated(field)),
        }
    }

    /// Fresh, empty builder for the message type of `field`.
    pub fn new_sub_builder(&self, field: &FieldRef) -> Option<MessageBuilder> {
        match field.kind() {
            Kind::Message(descriptor) => Some(MessageBuilder::new(descriptor)),
            _ => None,
        }
    }

    pub fn finish(self) -> DynamicMessage {
        self.message
    }

    fn slot_mut(&mut self, field: &FieldRef) -> &mut Value {
        match field {
            FieldRef::Field(f) => self.message.get_field_mut(f),
            FieldRef::Extension(e) => self.message.get_extension_mut(&e.descriptor),
        }
    }
}

impl From<MessageBuilder> for DynamicMessage {
    fn from(builder: MessageBuilder) -> Self {
        builder.finish()
    }
}

fn split_map_entry(field: &FieldRef, value: Value) -> Result<(MapKey, Value), DecodeError> {
    let entry = match value {
        Value::Message(entry) => entry,
        other => return Err(invalid_value(field, &other)),
    };
    let descriptor = entry.descriptor();
    let key = entry.get_field(&descriptor.map_entry_key_field());
    let key = match key.as_ref() {
        Value::Bool(v) => MapKey::Bool(*v),
        Value::I32(v) => MapKey::I32(*v),
        Value::I64(v) => MapKey::I64(*v),
        Value::U32(v) => MapKey::U32(*v),
        Value::U64(v) => MapKey::U64(*v),
        Value::String(v) => MapKey::String(v.clone()),
        other => {
            return Err(DecodeError::Builder {
                field: field.full_name().to_string(),
                detail: format!("unsupported map key {other:?}"),
            });
        }
    };
    let value = entry
        .get_field(&descriptor.map_entry_value_field())
        .into_owned();
    Ok((key, value))
}

fn invalid_value(field: &FieldRef, value: &Value) -> DecodeError {
    DecodeError::Builder {
        field: field.full_name().to_string(),
        detail: format!("value {value:?} is not valid for {:?}", field.kind()),
    }
}

fn not_repeated(field: &FieldRef) -> DecodeError {
    DecodeError::Builder {
        field: field.full_name().to_string(),
        detail: "field is not repeated".to_string(),
    }
}
