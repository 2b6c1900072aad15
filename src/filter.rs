//! Extension filtering over message trees, and top-level selection of messages.
//!
//! The rebuild is lazy: a message is only copied once a field actually changes, so an
//! input without matching fields comes back as the very same message and untouched
//! sub-trees stay shared with the input.
//!
//! ## Depth
//!
//! - [`FilterDepth::Deep`] removes matched fields at every level of the tree.
//! - [`FilterDepth::Shallow`] removes them from the top-level message only; nested
//!   sub-messages are kept as they are, extensions included.
//!
//! ## Nesting limit
//!
//! Deep filtering recurses once per nested message level on the calling thread's stack.
//! Trees a few hundred levels deep are fine on a default 2 MiB thread stack; chains in the
//! thousands need a larger stack (e.g. `std::thread::Builder::stack_size`).

use tracing::{debug, trace};

use crate::builder::MessageBuilder;
use crate::message::{FieldSlot, Message};
use crate::schema::FieldDescriptor;
use crate::value::Value;

/// Field-classification rule: true for fields to treat as extensions (and drop).
pub type FieldRule = fn(&FieldDescriptor) -> bool;

/// Matches exactly the extension fields of any message type.
pub const IS_EXTENSION: FieldRule = FieldDescriptor::is_extension;

/// Matches exactly the base fields of any message type.
pub const NOT_EXTENSION: FieldRule = is_base_field;

fn is_base_field(field: &FieldDescriptor) -> bool {
    !field.is_extension()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterDepth {
    #[default]
    Deep,
    Shallow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub depth: FilterDepth,
    /// Drop nested sub-messages that filtering leaves with no fields. Sub-messages that
    /// were already empty and untouched by the filter are kept.
    pub prune_emptied: bool,
}

impl FilterOptions {
    /// Options equivalent to the `clear_extensions` flag of [`filter`].
    pub fn from_clear_flag(clear_extensions: bool) -> Self {
        FilterOptions {
            depth: if clear_extensions {
                FilterDepth::Deep
            } else {
                FilterDepth::Shallow
            },
            prune_emptied: false,
        }
    }

    pub fn prune_emptied(mut self, prune: bool) -> Self {
        self.prune_emptied = prune;
        self
    }
}

/// What a filter pass removed. Returned by `filter_with_stats` (`filter_stats` feature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterStats {
    /// Fields omitted because the rule matched them.
    pub dropped_fields: usize,
    /// Sub-messages removed by `prune_emptied`.
    pub pruned_messages: usize,
}

/// Rebuild `message` without the fields matched by `rule`.
///
/// With `clear_extensions` the removal is recursive through every nested message
/// (singular and repeated). Without it only the top-level message is filtered and
/// nested sub-messages keep their matched fields.
///
/// A panic raised by `rule` propagates to the caller and aborts the traversal; see the
/// module docs for the nesting limit of deep filtering.
pub fn filter<R>(message: &Message, clear_extensions: bool, rule: R) -> Message
where
    R: Fn(&FieldDescriptor) -> bool,
{
    filter_with(message, &FilterOptions::from_clear_flag(clear_extensions), rule)
}

/// [`filter`] applied to each message of a list, in order.
pub fn filter_all<R>(messages: &[Message], clear_extensions: bool, rule: R) -> Vec<Message>
where
    R: Fn(&FieldDescriptor) -> bool,
{
    messages
        .iter()
        .map(|m| filter(m, clear_extensions, &rule))
        .collect()
}

pub fn filter_with<R>(message: &Message, options: &FilterOptions, rule: R) -> Message
where
    R: Fn(&FieldDescriptor) -> bool,
{
    run(message, options, &rule).0
}

/// [`filter_with`], also reporting what was removed.
#[cfg(feature = "filter_stats")]
pub fn filter_with_stats<R>(message: &Message, options: &FilterOptions, rule: R) -> (Message, FilterStats)
where
    R: Fn(&FieldDescriptor) -> bool,
{
    run(message, options, &rule)
}

fn run<R>(message: &Message, options: &FilterOptions, rule: &R) -> (Message, FilterStats)
where
    R: Fn(&FieldDescriptor) -> bool,
{
    let mut stats = FilterStats::default();
    let out = match rebuild(message, options, rule, 0, &mut stats) {
        Some(filtered) => filtered,
        None => message.clone(),
    };
    debug!(
        message_type = message.descriptor().name(),
        depth = ?options.depth,
        dropped = stats.dropped_fields,
        pruned = stats.pruned_messages,
        "filtered message tree"
    );
    (out, stats)
}

enum Rewrite {
    Keep,
    Drop,
    Replace(Value),
}

/// Returns `None` when nothing in `message` changed.
fn rebuild<R>(
    message: &Message,
    options: &FilterOptions,
    rule: &R,
    level: usize,
    stats: &mut FilterStats,
) -> Option<Message>
where
    R: Fn(&FieldDescriptor) -> bool,
{
    let mut staged: Option<MessageBuilder> = None;
    for (index, slot) in message.slots().enumerate() {
        let rewrite = if rule(slot.descriptor.as_ref()) {
            trace!(field = %slot.descriptor.name, level, "dropping matched field");
            stats.dropped_fields += 1;
            Rewrite::Drop
        } else if slot.descriptor.is_message() && options.depth == FilterDepth::Deep {
            rewrite_value(&slot.value, options, rule, level + 1, stats)
        } else {
            Rewrite::Keep
        };
        match rewrite {
            Rewrite::Keep => {
                if let Some(b) = staged.as_mut() {
                    b.put(slot.clone());
                }
            }
            Rewrite::Drop => {
                staged.get_or_insert_with(|| seed(message, index));
            }
            Rewrite::Replace(value) => {
                staged.get_or_insert_with(|| seed(message, index)).put(FieldSlot {
                    descriptor: slot.descriptor.clone(),
                    value,
                });
            }
        }
    }
    staged.map(|b| b.build())
}

/// Builder holding the first `count` fields of `message`.
fn seed(message: &Message, count: usize) -> MessageBuilder {
    let mut b = MessageBuilder::new(message.descriptor().clone());
    for slot in message.slots().take(count) {
        b.put(slot.clone());
    }
    b
}

fn rewrite_value<R>(
    value: &Value,
    options: &FilterOptions,
    rule: &R,
    level: usize,
    stats: &mut FilterStats,
) -> Rewrite
where
    R: Fn(&FieldDescriptor) -> bool,
{
    match value {
        Value::Message(child) => match rebuild(child, options, rule, level, stats) {
            None => Rewrite::Keep,
            Some(filtered) if options.prune_emptied && filtered.is_empty() => {
                trace!(message_type = child.descriptor().name(), level, "pruning emptied sub-message");
                stats.pruned_messages += 1;
                Rewrite::Drop
            }
            Some(filtered) => Rewrite::Replace(Value::Message(filtered)),
        },
        Value::List(items) => {
            let mut out: Option<Vec<Value>> = None;
            for (i, item) in items.iter().enumerate() {
                match rewrite_value(item, options, rule, level, stats) {
                    Rewrite::Keep => {
                        if let Some(o) = out.as_mut() {
                            o.push(item.clone());
                        }
                    }
                    Rewrite::Drop => {
                        out.get_or_insert_with(|| items[..i].to_vec());
                    }
                    Rewrite::Replace(v) => out.get_or_insert_with(|| items[..i].to_vec()).push(v),
                }
            }
            match out {
                None => Rewrite::Keep,
                // Every element pruned: the repeated field becomes unset.
                Some(list) if list.is_empty() => Rewrite::Drop,
                Some(list) => Rewrite::Replace(Value::List(list)),
            }
        }
        _ => Rewrite::Keep,
    }
}

/// Messages for which `predicate` holds, in their original order. Top-level only.
pub fn filter_by<M, P>(messages: &[M], mut predicate: P) -> Vec<M>
where
    M: Clone,
    P: FnMut(&M) -> bool,
{
    messages.iter().filter(|m| predicate(*m)).cloned().collect()
}

/// [`filter_by`] with a fallible predicate; the first error aborts the selection.
pub fn try_filter_by<M, P, E>(messages: &[M], mut predicate: P) -> Result<Vec<M>, E>
where
    M: Clone,
    P: FnMut(&M) -> Result<bool, E>,
{
    let mut out = Vec::new();
    for m in messages {
        if predicate(m)? {
            out.push(m.clone());
        }
    }
    Ok(out)
}
