//! Schema validation and typed builder access.

use prototree::{
    FieldDescriptor, MessageDescriptor, MessageError, ScalarType, SchemaBuilder, SchemaError, Value,
};

fn item() -> MessageDescriptor {
    MessageDescriptor::new("Item")
        .field(FieldDescriptor::scalar("name", 1, ScalarType::String))
        .field(FieldDescriptor::scalar("tags", 2, ScalarType::String).repeated())
        .extension_range(1000..=1999)
}

// ==================== Schema: valid ====================

#[test]
fn schema_resolves_messages_and_extensions() {
    let schema = SchemaBuilder::new()
        .message(item())
        .extension("Item", FieldDescriptor::scalar("note", 1000, ScalarType::String))
        .extension("Item", FieldDescriptor::scalar("score", 1001, ScalarType::Int64))
        .build()
        .expect("schema");
    assert!(schema.message("Item").is_some());
    assert!(schema.message("Nope").is_none());
    let note = schema.extension("Item", 1000).expect("note");
    assert_eq!(note.name, "note");
    assert_eq!(note.extendee(), "Item");
    assert_eq!(note.key().to_string(), "Item#1000");
    assert!(note.is_extension());
    let names: Vec<_> = schema.extensions_of("Item").iter().map(|e| e.name.clone()).collect();
    assert_eq!(names, vec!["note", "score"]);
    assert!(schema.new_builder("Item").is_ok());
    assert_eq!(
        schema.new_builder("Nope").err(),
        Some(SchemaError::UnknownMessage("Nope".to_string()))
    );
}

// ==================== Schema: rejected ====================

#[test]
fn schema_rejects_duplicate_message() {
    let err = SchemaBuilder::new().message(item()).message(item()).build().unwrap_err();
    assert_eq!(err, SchemaError::DuplicateMessage("Item".to_string()));
}

#[test]
fn schema_rejects_duplicate_field_name_and_number() {
    let m = MessageDescriptor::new("M")
        .field(FieldDescriptor::scalar("a", 1, ScalarType::Bool))
        .field(FieldDescriptor::scalar("a", 2, ScalarType::Bool));
    assert!(matches!(
        SchemaBuilder::new().message(m).build(),
        Err(SchemaError::DuplicateField { .. })
    ));
    let m = MessageDescriptor::new("M")
        .field(FieldDescriptor::scalar("a", 1, ScalarType::Bool))
        .field(FieldDescriptor::scalar("b", 1, ScalarType::Bool));
    assert!(matches!(
        SchemaBuilder::new().message(m).build(),
        Err(SchemaError::DuplicateFieldNumber { number: 1, .. })
    ));
}

#[test]
fn schema_rejects_field_number_zero() {
    let m = MessageDescriptor::new("M").field(FieldDescriptor::scalar("a", 0, ScalarType::Bool));
    assert!(matches!(
        SchemaBuilder::new().message(m).build(),
        Err(SchemaError::InvalidFieldNumber { .. })
    ));
}

#[test]
fn schema_rejects_base_field_in_extension_range() {
    let m = item().field(FieldDescriptor::scalar("late", 1500, ScalarType::Bool));
    assert!(matches!(
        SchemaBuilder::new().message(m).build(),
        Err(SchemaError::FieldInExtensionRange { number: 1500, .. })
    ));
}

#[test]
fn schema_rejects_unknown_nested_type() {
    let m = MessageDescriptor::new("M").field(FieldDescriptor::message("child", 1, "Missing"));
    let err = SchemaBuilder::new().message(m).build().unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnknownMessageType {
            message: "M".to_string(),
            field: "child".to_string(),
            type_name: "Missing".to_string(),
        }
    );
}

#[test]
fn schema_rejects_bad_extensions() {
    let unknown = SchemaBuilder::new()
        .message(item())
        .extension("Other", FieldDescriptor::scalar("x", 1000, ScalarType::Bool))
        .build();
    assert!(matches!(unknown, Err(SchemaError::UnknownExtendee { .. })));

    let out_of_range = SchemaBuilder::new()
        .message(item())
        .extension("Item", FieldDescriptor::scalar("x", 5, ScalarType::Bool))
        .build();
    assert!(matches!(out_of_range, Err(SchemaError::ExtensionOutOfRange { number: 5, .. })));

    let taken = SchemaBuilder::new()
        .message(item())
        .extension("Item", FieldDescriptor::scalar("x", 1000, ScalarType::Bool))
        .extension("Item", FieldDescriptor::scalar("y", 1000, ScalarType::Bool))
        .build();
    assert!(matches!(taken, Err(SchemaError::ExtensionNumberTaken { number: 1000, .. })));

    let dup_name = SchemaBuilder::new()
        .message(item())
        .extension("Item", FieldDescriptor::scalar("x", 1000, ScalarType::Bool))
        .extension("Item", FieldDescriptor::scalar("x", 1001, ScalarType::Bool))
        .build();
    assert_eq!(dup_name.unwrap_err(), SchemaError::DuplicateExtension("x".to_string()));

    let bad_type = SchemaBuilder::new()
        .message(item())
        .extension("Item", FieldDescriptor::message("x", 1000, "Missing"))
        .build();
    assert!(matches!(bad_type, Err(SchemaError::UnknownMessageType { .. })));
}

// ==================== Builder typing ====================

#[test]
fn builder_rejects_unknown_and_mistyped_fields() {
    let schema = SchemaBuilder::new().message(item()).build().expect("schema");
    let mut b = schema.new_builder("Item").expect("builder");
    assert!(matches!(b.set("missing", "x"), Err(MessageError::UnknownField { .. })));
    assert!(matches!(b.set("name", 3i32), Err(MessageError::TypeMismatch { .. })));
    assert!(matches!(b.set("tags", "one"), Err(MessageError::TypeMismatch { .. })));
    assert!(matches!(b.add("name", "x"), Err(MessageError::NotRepeated { .. })));
    assert!(matches!(b.add("tags", 1i32), Err(MessageError::TypeMismatch { .. })));
    assert!(b.is_empty());
}

#[test]
fn builder_repeated_add_and_clear() {
    let schema = SchemaBuilder::new().message(item()).build().expect("schema");
    let mut b = schema.new_builder("Item").expect("builder");
    b.add("tags", "a").expect("add a");
    b.add("tags", "b").expect("add b");
    assert_eq!(
        b.get("tags"),
        Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
    );
    b.clear("tags").expect("clear");
    assert!(!b.has("tags"));
}

#[test]
fn builder_empty_list_unsets_repeated_field() {
    let schema = SchemaBuilder::new().message(item()).build().expect("schema");
    let unset = schema.new_builder("Item").expect("builder").build();

    let mut b = schema.new_builder("Item").expect("builder");
    b.set("tags", Value::List(vec![])).expect("set empty");
    assert!(!b.has("tags"));
    assert_eq!(b.build(), unset);

    b.add("tags", "a").expect("add a");
    b.set("tags", Value::List(vec![])).expect("reset to empty");
    assert!(!b.has("tags"));
    assert_eq!(b.build(), unset);
}

#[test]
fn builder_rejects_foreign_extension() {
    let schema = SchemaBuilder::new()
        .message(item())
        .message(MessageDescriptor::new("Other").extension_range(1..=10))
        .extension("Other", FieldDescriptor::scalar("flag", 1, ScalarType::Bool))
        .build()
        .expect("schema");
    let flag = schema.extension_named("flag").expect("flag");
    let mut b = schema.new_builder("Item").expect("builder");
    let err = b.set_extension(flag, true).unwrap_err();
    assert_eq!(
        err,
        MessageError::ForeignExtension {
            message: "Item".to_string(),
            extension: "flag".to_string(),
            extendee: "Other".to_string(),
        }
    );
    assert!(b.clear_extension(flag).is_err());
}

#[test]
fn builder_nested_message_type_is_checked() {
    let schema = SchemaBuilder::new()
        .message(item())
        .message(MessageDescriptor::new("Box").field(FieldDescriptor::message("item", 1, "Item")))
        .build()
        .expect("schema");
    let wrong = schema.new_builder("Box").expect("box").build();
    let mut b = schema.new_builder("Box").expect("box");
    assert!(matches!(b.set("item", wrong), Err(MessageError::TypeMismatch { .. })));
    let right = schema.new_builder("Item").expect("item");
    b.set("item", right).expect("set item");
    assert!(b.has("item"));
}

#[test]
fn repeated_extension_add() {
    let schema = SchemaBuilder::new()
        .message(item())
        .extension("Item", FieldDescriptor::scalar("labels", 1000, ScalarType::String).repeated())
        .build()
        .expect("schema");
    let labels = schema.extension_named("labels").expect("labels");
    let mut b = schema.new_builder("Item").expect("builder");
    b.add_extension(labels, "x").expect("add x");
    b.add_extension(labels, "y").expect("add y");
    let m = b.build();
    assert_eq!(m.get_extension(labels).and_then(Value::as_list).map(|l| l.len()), Some(2));
    assert_eq!(m.extension_count(), 1);
}
