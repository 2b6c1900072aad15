//! Field values held by messages and builders.

use crate::builder::MessageBuilder;
use crate::message::Message;
use crate::schema::{Cardinality, FieldDescriptor, FieldType, ScalarType};

/// A single field value (scalar, nested message, or the elements of a repeated field).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Enum(i32),
    Message(Message),
    /// Elements of a repeated field.
    List(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(x) => Some(*x as i64),
            Value::I64(x) => Some(*x),
            Value::U32(x) => Some(*x as i64),
            Value::Enum(x) => Some(*x as i64),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U32(x) => Some(*x as u64),
            Value::U64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x as f64),
            Value::Double(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Check this value against a field's declared type and cardinality.
    /// Repeated fields take a `List` whose every element matches the element type.
    pub fn matches(&self, field: &FieldDescriptor) -> bool {
        match (field.cardinality, self) {
            (Cardinality::Repeated, Value::List(items)) => {
                items.iter().all(|v| v.matches_element(&field.field_type))
            }
            (Cardinality::Repeated, _) => false,
            (Cardinality::Singular, v) => v.matches_element(&field.field_type),
        }
    }

    /// Check a single (non-list) value against an element type.
    pub fn matches_element(&self, field_type: &FieldType) -> bool {
        match (field_type, self) {
            (FieldType::Message(name), Value::Message(m)) => m.descriptor().name() == name,
            (FieldType::Scalar(s), v) => matches!(
                (s, v),
                (ScalarType::Bool, Value::Bool(_))
                    | (ScalarType::Int32, Value::I32(_))
                    | (ScalarType::Int64, Value::I64(_))
                    | (ScalarType::UInt32, Value::U32(_))
                    | (ScalarType::UInt64, Value::U64(_))
                    | (ScalarType::Float, Value::Float(_))
                    | (ScalarType::Double, Value::Double(_))
                    | (ScalarType::String, Value::String(_))
                    | (ScalarType::Bytes, Value::Bytes(_))
                    | (ScalarType::Enum, Value::Enum(_))
            ),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Value::Message(v)
    }
}

/// Builds the staged message.
impl From<MessageBuilder> for Value {
    fn from(v: MessageBuilder) -> Self {
        Value::Message(v.build())
    }
}

impl From<&MessageBuilder> for Value {
    fn from(v: &MessageBuilder) -> Self {
        Value::Message(v.build())
    }
}
