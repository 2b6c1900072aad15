//! Format messages for display (indented tree dump). Extension fields are shown as `[name]`.

use crate::message::Message;
use crate::value::Value;

fn hex_string(b: &[u8]) -> String {
    b.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

/// Raw scalar string.
pub fn format_scalar(v: &Value) -> String {
    match v {
        Value::Bool(x) => format!("{}", x),
        Value::I32(x) => format!("{}", x),
        Value::I64(x) => format!("{}", x),
        Value::U32(x) => format!("{}", x),
        Value::U64(x) => format!("{}", x),
        Value::Float(x) => format!("{}", x),
        Value::Double(x) => format!("{}", x),
        Value::Enum(x) => format!("#{}", x),
        Value::String(s) => format!("{:?}", s),
        Value::Bytes(b) => format!("hex({})", hex_string(b)),
        _ => format!("{:?}", v),
    }
}

/// Multi-line dump of a message; nested messages are indented one level per depth.
pub fn message_to_dump(msg: &Message, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    if msg.is_empty() {
        return format!("{}{} {{}}", pad, msg.descriptor().name());
    }
    let mut lines: Vec<String> = vec![format!("{}{} {{", pad, msg.descriptor().name())];
    for (fd, v) in msg.fields() {
        let label = if fd.is_extension() {
            format!("[{}]", fd.name)
        } else {
            fd.name.clone()
        };
        match v {
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    let sub = value_to_dump(item, indent + 1);
                    lines.push(format!("{}  {}[{}]: {}", pad, label, i, sub.trim_start()));
                }
            }
            _ => {
                let sub = value_to_dump(v, indent + 1);
                lines.push(format!("{}  {}: {}", pad, label, sub.trim_start()));
            }
        }
    }
    lines.push(format!("{}}}", pad));
    lines.join("\n")
}

fn value_to_dump(v: &Value, indent: usize) -> String {
    match v {
        Value::Message(m) => message_to_dump(m, indent),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(format_scalar).collect();
            format!("[{}]", parts.join(", "))
        }
        _ => format_scalar(v),
    }
}
