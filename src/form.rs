//! Normalization between the built and builder forms of a message.
//!
//! Both forms implement [`MessageOrBuilder`]; conversions that are already in the
//! requested form hand the value back untouched, and absence passes through as `None`.

use std::sync::Arc;

use crate::builder::MessageBuilder;
use crate::message::Message;
use crate::schema::MessageDescriptor;

/// Either view of one logical message.
pub trait MessageOrBuilder {
    fn is_built(&self) -> bool;

    fn descriptor(&self) -> &Arc<MessageDescriptor>;

    fn into_built(self) -> Message;

    fn into_builder(self) -> MessageBuilder;
}

impl MessageOrBuilder for Message {
    fn is_built(&self) -> bool {
        true
    }

    fn descriptor(&self) -> &Arc<MessageDescriptor> {
        Message::descriptor(self)
    }

    fn into_built(self) -> Message {
        self
    }

    fn into_builder(self) -> MessageBuilder {
        self.to_builder()
    }
}

impl MessageOrBuilder for MessageBuilder {
    fn is_built(&self) -> bool {
        false
    }

    fn descriptor(&self) -> &Arc<MessageDescriptor> {
        MessageBuilder::descriptor(self)
    }

    fn into_built(self) -> Message {
        self.build()
    }

    fn into_builder(self) -> MessageBuilder {
        self
    }
}

/// Tagged union of the two forms, for collections that mix them.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageForm {
    Built(Message),
    Builder(MessageBuilder),
}

impl MessageOrBuilder for MessageForm {
    fn is_built(&self) -> bool {
        matches!(self, MessageForm::Built(_))
    }

    fn descriptor(&self) -> &Arc<MessageDescriptor> {
        match self {
            MessageForm::Built(m) => Message::descriptor(m),
            MessageForm::Builder(b) => MessageBuilder::descriptor(b),
        }
    }

    fn into_built(self) -> Message {
        match self {
            MessageForm::Built(m) => m,
            MessageForm::Builder(b) => b.build(),
        }
    }

    fn into_builder(self) -> MessageBuilder {
        match self {
            MessageForm::Built(m) => m.to_builder(),
            MessageForm::Builder(b) => b,
        }
    }
}

impl From<Message> for MessageForm {
    fn from(m: Message) -> Self {
        MessageForm::Built(m)
    }
}

impl From<MessageBuilder> for MessageForm {
    fn from(b: MessageBuilder) -> Self {
        MessageForm::Builder(b)
    }
}

/// Built form: builds a builder, returns a message as is, keeps `None`.
pub fn to_built<T: MessageOrBuilder>(value: Option<T>) -> Option<Message> {
    value.map(T::into_built)
}

/// Builder form: seeds a new builder from a message, returns a builder as is, keeps `None`.
pub fn to_builder<T: MessageOrBuilder>(value: Option<T>) -> Option<MessageBuilder> {
    value.map(T::into_builder)
}
