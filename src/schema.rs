//! Schema model: message types, their base fields, extension ranges and the extensions
//! declared against them.
//!
//! Schemas are assembled programmatically with [`SchemaBuilder`] and validated once in
//! [`SchemaBuilder::build`]; every [`crate::Message`] carries the descriptor of its type.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, RangeInclusive};
use std::sync::Arc;

/// Leaf value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Bytes,
    Enum,
}

/// Declared type of a field: a scalar, or a nested message referenced by type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Message(String),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{:?}", s),
            FieldType::Message(name) => write!(f, "message {}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
}

/// A field slot of a message type. Extension fields carry the name of the type they extend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    pub field_type: FieldType,
    pub cardinality: Cardinality,
    pub extendee: Option<String>,
}

impl FieldDescriptor {
    /// Singular base field.
    pub fn new(name: impl Into<String>, number: u32, field_type: FieldType) -> Self {
        FieldDescriptor {
            name: name.into(),
            number,
            field_type,
            cardinality: Cardinality::Singular,
            extendee: None,
        }
    }

    pub fn scalar(name: impl Into<String>, number: u32, scalar: ScalarType) -> Self {
        Self::new(name, number, FieldType::Scalar(scalar))
    }

    pub fn message(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self::new(name, number, FieldType::Message(type_name.into()))
    }

    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    pub fn is_extension(&self) -> bool {
        self.extendee.is_some()
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    pub fn is_message(&self) -> bool {
        matches!(self.field_type, FieldType::Message(_))
    }

    /// Type name of the nested message, for message-typed fields.
    pub fn message_type(&self) -> Option<&str> {
        match &self.field_type {
            FieldType::Message(name) => Some(name),
            FieldType::Scalar(_) => None,
        }
    }

    pub fn extension_key(&self) -> Option<ExtensionKey> {
        self.extendee.as_ref().map(|extendee| ExtensionKey {
            extendee: extendee.clone(),
            number: self.number,
        })
    }
}

/// Globally unique identity of an extension: the type it extends plus its field number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionKey {
    pub extendee: String,
    pub number: u32,
}

impl fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.extendee, self.number)
    }
}

/// Handle to a resolved extension field. Dereferences to its [`FieldDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    field: Arc<FieldDescriptor>,
}

impl ExtensionDescriptor {
    pub fn field(&self) -> &Arc<FieldDescriptor> {
        &self.field
    }

    pub fn extendee(&self) -> &str {
        self.field.extendee.as_deref().unwrap_or_default()
    }

    pub fn key(&self) -> ExtensionKey {
        ExtensionKey {
            extendee: self.extendee().to_string(),
            number: self.field.number,
        }
    }
}

impl Deref for ExtensionDescriptor {
    type Target = FieldDescriptor;

    fn deref(&self) -> &FieldDescriptor {
        &self.field
    }
}

/// A message type: name, base fields in declaration order, and extension ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    name: String,
    fields: Vec<Arc<FieldDescriptor>>,
    extension_ranges: Vec<RangeInclusive<u32>>,
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        MessageDescriptor {
            name: name.into(),
            fields: Vec::new(),
            extension_ranges: Vec::new(),
        }
    }

    /// Add a base field. Declaring an extension here is not possible: the extendee is cleared.
    pub fn field(mut self, mut field: FieldDescriptor) -> Self {
        field.extendee = None;
        self.fields.push(Arc::new(field));
        self
    }

    pub fn extension_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.extension_ranges.push(range);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Arc<FieldDescriptor>] {
        &self.fields
    }

    pub fn extension_ranges(&self) -> &[RangeInclusive<u32>] {
        &self.extension_ranges
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Arc<FieldDescriptor>> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_number(&self, number: u32) -> Option<&Arc<FieldDescriptor>> {
        self.fields.iter().find(|f| f.number == number)
    }

    /// True if `number` falls in one of the declared extension ranges.
    pub fn accepts_extension(&self, number: u32) -> bool {
        self.extension_ranges.iter().any(|r| r.contains(&number))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Duplicate message name: {0}")]
    DuplicateMessage(String),
    #[error("Duplicate field name {field} in {message}")]
    DuplicateField { message: String, field: String },
    #[error("Duplicate field number {number} in {message}")]
    DuplicateFieldNumber { message: String, number: u32 },
    #[error("Field {field} in {message} has invalid number 0")]
    InvalidFieldNumber { message: String, field: String },
    #[error("Field {field} in {message} uses number {number} reserved for extensions")]
    FieldInExtensionRange {
        message: String,
        field: String,
        number: u32,
    },
    #[error("Field {field} in {message} references unknown message type {type_name}")]
    UnknownMessageType {
        message: String,
        field: String,
        type_name: String,
    },
    #[error("Extension {extension} targets unknown message {extendee}")]
    UnknownExtendee { extension: String, extendee: String },
    #[error("Extension {extension} number {number} is outside the extension ranges of {extendee}")]
    ExtensionOutOfRange {
        extension: String,
        extendee: String,
        number: u32,
    },
    #[error("Extension {extension} number {number} is already used in {extendee}")]
    ExtensionNumberTaken {
        extension: String,
        extendee: String,
        number: u32,
    },
    #[error("Duplicate extension name: {0}")]
    DuplicateExtension(String),
    #[error("Unknown message: {0}")]
    UnknownMessage(String),
}

/// Collects message types and extensions, then validates them into a [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    messages: Vec<MessageDescriptor>,
    extensions: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: MessageDescriptor) -> Self {
        self.messages.push(message);
        self
    }

    /// Declare `field` as an extension of the message type `extendee`.
    pub fn extension(mut self, extendee: impl Into<String>, mut field: FieldDescriptor) -> Self {
        field.extendee = Some(extendee.into());
        self.extensions.push(field);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut messages: HashMap<String, Arc<MessageDescriptor>> = HashMap::new();
        for m in self.messages {
            if messages.contains_key(&m.name) {
                return Err(SchemaError::DuplicateMessage(m.name));
            }
            messages.insert(m.name.clone(), Arc::new(m));
        }
        for m in messages.values() {
            check_base_fields(m, &messages)?;
        }

        let mut extensions: HashMap<ExtensionKey, ExtensionDescriptor> = HashMap::new();
        let mut extensions_by_name: HashMap<String, ExtensionKey> = HashMap::new();
        for field in self.extensions {
            let extendee = field.extendee.clone().unwrap_or_default();
            let target = messages
                .get(&extendee)
                .ok_or_else(|| SchemaError::UnknownExtendee {
                    extension: field.name.clone(),
                    extendee: extendee.clone(),
                })?;
            if field.number == 0 || !target.accepts_extension(field.number) {
                return Err(SchemaError::ExtensionOutOfRange {
                    extension: field.name,
                    extendee,
                    number: field.number,
                });
            }
            let key = ExtensionKey {
                extendee: extendee.clone(),
                number: field.number,
            };
            if target.field_by_number(field.number).is_some() || extensions.contains_key(&key) {
                return Err(SchemaError::ExtensionNumberTaken {
                    extension: field.name,
                    extendee,
                    number: field.number,
                });
            }
            if let Some(type_name) = field.message_type() {
                if !messages.contains_key(type_name) {
                    return Err(SchemaError::UnknownMessageType {
                        message: extendee,
                        field: field.name.clone(),
                        type_name: type_name.to_string(),
                    });
                }
            }
            if extensions_by_name.contains_key(&field.name) {
                return Err(SchemaError::DuplicateExtension(field.name));
            }
            extensions_by_name.insert(field.name.clone(), key.clone());
            extensions.insert(
                key,
                ExtensionDescriptor {
                    field: Arc::new(field),
                },
            );
        }

        Ok(Schema {
            messages,
            extensions,
            extensions_by_name,
        })
    }
}

fn check_base_fields(
    m: &MessageDescriptor,
    messages: &HashMap<String, Arc<MessageDescriptor>>,
) -> Result<(), SchemaError> {
    for (i, f) in m.fields.iter().enumerate() {
        if f.number == 0 {
            return Err(SchemaError::InvalidFieldNumber {
                message: m.name.clone(),
                field: f.name.clone(),
            });
        }
        let earlier = &m.fields[..i];
        if earlier.iter().any(|e| e.name == f.name) {
            return Err(SchemaError::DuplicateField {
                message: m.name.clone(),
                field: f.name.clone(),
            });
        }
        if earlier.iter().any(|e| e.number == f.number) {
            return Err(SchemaError::DuplicateFieldNumber {
                message: m.name.clone(),
                number: f.number,
            });
        }
        if m.accepts_extension(f.number) {
            return Err(SchemaError::FieldInExtensionRange {
                message: m.name.clone(),
                field: f.name.clone(),
                number: f.number,
            });
        }
        if let Some(type_name) = f.message_type() {
            if !messages.contains_key(type_name) {
                return Err(SchemaError::UnknownMessageType {
                    message: m.name.clone(),
                    field: f.name.clone(),
                    type_name: type_name.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Resolved schema: message types by name and extensions by key and by name.
#[derive(Debug, Clone)]
pub struct Schema {
    messages: HashMap<String, Arc<MessageDescriptor>>,
    extensions: HashMap<ExtensionKey, ExtensionDescriptor>,
    extensions_by_name: HashMap<String, ExtensionKey>,
}

impl Schema {
    pub fn message(&self, name: &str) -> Option<&Arc<MessageDescriptor>> {
        self.messages.get(name)
    }

    /// Fresh builder for the message type `name`.
    pub fn new_builder(&self, name: &str) -> Result<crate::MessageBuilder, SchemaError> {
        self.message(name)
            .map(|d| crate::MessageBuilder::new(Arc::clone(d)))
            .ok_or_else(|| SchemaError::UnknownMessage(name.to_string()))
    }

    pub fn extension(&self, extendee: &str, number: u32) -> Option<&ExtensionDescriptor> {
        self.extensions.get(&ExtensionKey {
            extendee: extendee.to_string(),
            number,
        })
    }

    pub fn extension_named(&self, name: &str) -> Option<&ExtensionDescriptor> {
        self.extensions_by_name
            .get(name)
            .and_then(|key| self.extensions.get(key))
    }

    /// Extensions declared against `extendee`, ordered by field number.
    pub fn extensions_of(&self, extendee: &str) -> Vec<&ExtensionDescriptor> {
        let mut out: Vec<_> = self
            .extensions
            .values()
            .filter(|e| e.extendee() == extendee)
            .collect();
        out.sort_by_key(|e| e.number);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_descriptor_flags() {
        let f = FieldDescriptor::message("imp", 2, "Impression").repeated();
        assert!(f.is_message());
        assert!(f.is_repeated());
        assert!(!f.is_extension());
        assert_eq!(f.message_type(), Some("Impression"));
        assert_eq!(f.extension_key(), None);
    }

    #[test]
    fn message_descriptor_strips_extendee_from_base_fields() {
        let mut f = FieldDescriptor::scalar("id", 1, ScalarType::String);
        f.extendee = Some("Other".to_string());
        let m = MessageDescriptor::new("M").field(f);
        assert!(!m.fields()[0].is_extension());
    }

    #[test]
    fn extension_ranges_are_inclusive() {
        let m = MessageDescriptor::new("M").extension_range(100..=199);
        assert!(m.accepts_extension(100));
        assert!(m.accepts_extension(199));
        assert!(!m.accepts_extension(200));
        assert!(!m.accepts_extension(99));
    }
}
