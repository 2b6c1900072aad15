//! # prototree — generic transformations over schema-defined message trees
//!
//! Messages are trees of nested records and repeated fields described by a [`Schema`].
//! Any message type that declares an extension range can also carry extension fields:
//! named, typed side-channels keyed by an [`ExtensionKey`] and not part of its base fields.
//!
//! ## Primitives
//!
//! - **Filtering** ([`filter`]): rebuild a message without the fields matched by a rule
//!   such as [`IS_EXTENSION`], either through the whole tree or at the top level only;
//!   select whole messages from a list with a predicate ([`filter_by`]).
//! - **Mutation** ([`update`]): run a mutation over builders in order, stopping at the
//!   first one that signals stop.
//! - **Normalization** ([`to_built`], [`to_builder`]): convert between the immutable
//!   [`Message`] and the mutable [`MessageBuilder`], accepting either form or `None`.
//!
//! ## Example
//!
//! ```
//! use prototree::{filter, FieldDescriptor, MessageDescriptor, ScalarType, SchemaBuilder, IS_EXTENSION};
//!
//! let schema = SchemaBuilder::new()
//!     .message(
//!         MessageDescriptor::new("Request")
//!             .field(FieldDescriptor::scalar("id", 1, ScalarType::String))
//!             .extension_range(100..=199),
//!     )
//!     .extension("Request", FieldDescriptor::scalar("trace", 100, ScalarType::String))
//!     .build()
//!     .unwrap();
//! let trace = schema.extension_named("trace").unwrap();
//!
//! let mut req = schema.new_builder("Request").unwrap();
//! req.set("id", "0").unwrap();
//! req.set_extension(trace, "abc").unwrap();
//!
//! let plain = filter(&req.build(), true, IS_EXTENSION);
//! assert_eq!(plain.extension_count(), 0);
//! assert_eq!(plain.get("id").and_then(|v| v.as_str()), Some("0"));
//! ```

pub mod builder;
pub mod dump;
pub mod filter;
pub mod form;
pub mod message;
pub mod schema;
pub mod update;
pub mod value;

pub use builder::MessageBuilder;
#[cfg(feature = "filter_stats")]
pub use filter::{filter_with_stats, FilterStats};
pub use filter::{
    filter, filter_all, filter_by, filter_with, try_filter_by, FieldRule, FilterDepth, FilterOptions,
    IS_EXTENSION, NOT_EXTENSION,
};
pub use form::{to_built, to_builder, MessageForm, MessageOrBuilder};
pub use message::{Message, MessageError};
pub use schema::{
    Cardinality, ExtensionDescriptor, ExtensionKey, FieldDescriptor, FieldType, MessageDescriptor,
    ScalarType, Schema, SchemaBuilder, SchemaError,
};
pub use update::{try_update, update, update_all};
pub use value::Value;
