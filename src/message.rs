//! Immutable messages.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::builder::MessageBuilder;
use crate::schema::{ExtensionDescriptor, FieldDescriptor, MessageDescriptor};
use crate::value::Value;

/// A present field: its descriptor and value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldSlot {
    pub(crate) descriptor: Arc<FieldDescriptor>,
    pub(crate) value: Value,
}

/// Present fields keyed by field number. Base and extension numbers never collide
/// within one type, so one map holds both.
pub(crate) type FieldMap = BTreeMap<u32, FieldSlot>;

#[derive(Debug)]
struct MessageData {
    descriptor: Arc<MessageDescriptor>,
    fields: FieldMap,
}

/// Immutable message. Clones share the same underlying data.
#[derive(Clone)]
pub struct Message {
    inner: Arc<MessageData>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error("Unknown field {field} in {message}")]
    UnknownField { message: String, field: String },
    #[error("Type mismatch for {message}.{field}: expected {expected}")]
    TypeMismatch {
        message: String,
        field: String,
        expected: String,
    },
    #[error("Field {message}.{field} is not repeated")]
    NotRepeated { message: String, field: String },
    #[error("Extension {extension} extends {extendee}, not {message}")]
    ForeignExtension {
        message: String,
        extension: String,
        extendee: String,
    },
}

impl Message {
    pub(crate) fn from_parts(descriptor: Arc<MessageDescriptor>, fields: FieldMap) -> Self {
        Message {
            inner: Arc::new(MessageData { descriptor, fields }),
        }
    }

    /// Message of the given type with no fields set.
    pub fn empty(descriptor: Arc<MessageDescriptor>) -> Self {
        Self::from_parts(descriptor, FieldMap::new())
    }

    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.inner.descriptor
    }

    /// Present fields (base and extension) in field-number order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.inner
            .fields
            .values()
            .map(|s| (s.descriptor.as_ref(), &s.value))
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = &FieldSlot> {
        self.inner.fields.values()
    }

    /// Value of the base field `name`, if set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let number = self.descriptor().field_by_name(name)?.number;
        self.inner.fields.get(&number).map(|s| &s.value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get_extension(&self, extension: &ExtensionDescriptor) -> Option<&Value> {
        self.inner
            .fields
            .get(&extension.number)
            .filter(|s| s.descriptor.extendee.as_deref() == Some(extension.extendee()))
            .map(|s| &s.value)
    }

    pub fn has_extension(&self, extension: &ExtensionDescriptor) -> bool {
        self.get_extension(extension).is_some()
    }

    /// Number of extension fields present anywhere in the tree, this level included.
    pub fn extension_count(&self) -> usize {
        self.slots()
            .map(|s| usize::from(s.descriptor.is_extension()) + nested_extension_count(&s.value))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// New builder seeded with every field of this message.
    pub fn to_builder(&self) -> MessageBuilder {
        MessageBuilder::from_parts(Arc::clone(self.descriptor()), self.inner.fields.clone())
    }

    /// True if both handles point at the same message (identity, not value equality).
    pub fn ptr_eq(a: &Message, b: &Message) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

fn nested_extension_count(value: &Value) -> usize {
    match value {
        Value::Message(m) => m.extension_count(),
        Value::List(items) => items.iter().map(nested_extension_count).sum(),
        _ => 0,
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        Message::ptr_eq(self, other)
            || (self.descriptor().name() == other.descriptor().name()
                && self.inner.fields == other.inner.fields)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.descriptor().name());
        for (fd, v) in self.fields() {
            s.field(&fd.name, v);
        }
        s.finish()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::dump::message_to_dump(self, 0))
    }
}
