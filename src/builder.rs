//! Mutable staging form of a message.
//!
//! Setters check each value against the field's declared type and cardinality, so a
//! built [`Message`] always conforms to its descriptor.

use std::sync::Arc;

use crate::message::{FieldMap, FieldSlot, Message, MessageError};
use crate::schema::{ExtensionDescriptor, FieldDescriptor, MessageDescriptor};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct MessageBuilder {
    descriptor: Arc<MessageDescriptor>,
    fields: FieldMap,
}

impl MessageBuilder {
    pub fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        Self::from_parts(descriptor, FieldMap::new())
    }

    pub(crate) fn from_parts(descriptor: Arc<MessageDescriptor>, fields: FieldMap) -> Self {
        MessageBuilder { descriptor, fields }
    }

    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Produce an immutable message from the current state. The builder stays usable.
    pub fn build(&self) -> Message {
        Message::from_parts(Arc::clone(&self.descriptor), self.fields.clone())
    }

    /// Set a base field. Repeated fields take a `Value::List`; an empty list unsets the field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, MessageError> {
        let field = Arc::clone(self.base_field(name)?);
        self.set_checked(field, value.into())
    }

    /// Append one element to a repeated base field.
    pub fn add(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, MessageError> {
        let field = Arc::clone(self.base_field(name)?);
        self.add_checked(field, value.into())
    }

    pub fn clear(&mut self, name: &str) -> Result<&mut Self, MessageError> {
        let number = self.base_field(name)?.number;
        self.fields.remove(&number);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let number = self.descriptor.field_by_name(name)?.number;
        self.fields.get(&number).map(|s| &s.value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set_extension(
        &mut self,
        extension: &ExtensionDescriptor,
        value: impl Into<Value>,
    ) -> Result<&mut Self, MessageError> {
        self.check_extendee(extension)?;
        self.set_checked(Arc::clone(extension.field()), value.into())
    }

    pub fn add_extension(
        &mut self,
        extension: &ExtensionDescriptor,
        value: impl Into<Value>,
    ) -> Result<&mut Self, MessageError> {
        self.check_extendee(extension)?;
        self.add_checked(Arc::clone(extension.field()), value.into())
    }

    pub fn clear_extension(&mut self, extension: &ExtensionDescriptor) -> Result<&mut Self, MessageError> {
        self.check_extendee(extension)?;
        self.fields.remove(&extension.number);
        Ok(self)
    }

    pub fn get_extension(&self, extension: &ExtensionDescriptor) -> Option<&Value> {
        self.fields
            .get(&extension.number)
            .filter(|s| s.descriptor.extendee.as_deref() == Some(extension.extendee()))
            .map(|s| &s.value)
    }

    pub fn has_extension(&self, extension: &ExtensionDescriptor) -> bool {
        self.get_extension(extension).is_some()
    }

    /// Present fields (base and extension) in field-number order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.fields.values().map(|s| (s.descriptor.as_ref(), &s.value))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Insert a slot taken from a conforming message, skipping type checks.
    pub(crate) fn put(&mut self, slot: FieldSlot) {
        self.fields.insert(slot.descriptor.number, slot);
    }

    fn base_field(&self, name: &str) -> Result<&Arc<FieldDescriptor>, MessageError> {
        self.descriptor
            .field_by_name(name)
            .ok_or_else(|| MessageError::UnknownField {
                message: self.descriptor.name().to_string(),
                field: name.to_string(),
            })
    }

    fn check_extendee(&self, extension: &ExtensionDescriptor) -> Result<(), MessageError> {
        if extension.extendee() != self.descriptor.name() {
            return Err(MessageError::ForeignExtension {
                message: self.descriptor.name().to_string(),
                extension: extension.name.clone(),
                extendee: extension.extendee().to_string(),
            });
        }
        Ok(())
    }

    fn set_checked(&mut self, field: Arc<FieldDescriptor>, value: Value) -> Result<&mut Self, MessageError> {
        if !value.matches(&field) {
            return Err(self.mismatch(&field));
        }
        // A repeated field with no elements is unset.
        if matches!(&value, Value::List(items) if items.is_empty()) {
            self.fields.remove(&field.number);
            return Ok(self);
        }
        self.put(FieldSlot {
            descriptor: field,
            value,
        });
        Ok(self)
    }

    fn add_checked(&mut self, field: Arc<FieldDescriptor>, value: Value) -> Result<&mut Self, MessageError> {
        if !field.is_repeated() {
            return Err(MessageError::NotRepeated {
                message: self.descriptor.name().to_string(),
                field: field.name.clone(),
            });
        }
        if !value.matches_element(&field.field_type) {
            return Err(self.mismatch(&field));
        }
        let slot = self.fields.entry(field.number).or_insert_with(|| FieldSlot {
            descriptor: Arc::clone(&field),
            value: Value::List(Vec::new()),
        });
        if let Value::List(items) = &mut slot.value {
            items.push(value);
        }
        Ok(self)
    }

    fn mismatch(&self, field: &FieldDescriptor) -> MessageError {
        let expected = if field.is_repeated() {
            format!("list of {}", field.field_type)
        } else {
            field.field_type.to_string()
        };
        MessageError::TypeMismatch {
            message: self.descriptor.name().to_string(),
            field: field.name.clone(),
            expected,
        }
    }
}
