use super::*;
use serde_json::json;

#[test]
fn text_and_list_serialize_as_plain_json() {
    let mut snapshot = Snapshot::new();
    snapshot.insert("title".to_owned(), FieldValue::text("Hello"));
    snapshot.insert("tags".to_owned(), FieldValue::list(["Rental", "EzyRent"]));

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value, json!({"tags": ["Rental", "EzyRent"], "title": "Hello"}));
}

#[test]
fn file_values_serialize_as_null() {
    let mut snapshot = Snapshot::new();
    snapshot.insert("image".to_owned(), FieldValue::File(FileRef::new("cover.png", "image/png", 10)));
    snapshot.insert("video".to_owned(), FieldValue::Null);

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value, json!({"image": null, "video": null}));
}

#[test]
fn from_json_accepts_strings_arrays_and_null() {
    assert_eq!(FieldValue::from_json(&json!("x")), Some(FieldValue::text("x")));
    assert_eq!(FieldValue::from_json(&json!(["a", "b"])), Some(FieldValue::list(["a", "b"])));
    assert_eq!(FieldValue::from_json(&json!(null)), Some(FieldValue::Null));
}

#[test]
fn from_json_rejects_unrepresentable_shapes() {
    assert_eq!(FieldValue::from_json(&json!(42)), None);
    assert_eq!(FieldValue::from_json(&json!(true)), None);
    assert_eq!(FieldValue::from_json(&json!({})), None);
    assert_eq!(FieldValue::from_json(&json!(["a", 1])), None);
}

#[test]
fn only_null_is_absent() {
    assert!(FieldValue::Null.is_absent());
    assert!(!FieldValue::text("").is_absent());
    assert!(!FieldValue::List(Vec::new()).is_absent());
}

#[test]
fn same_file_compares_name_size_and_mtime() {
    let a = FileRef::new("a.png", "image/png", 5).with_last_modified(1);
    let same = FileRef::new("a.png", "image/jpeg", 5).with_last_modified(1);
    let touched = FileRef::new("a.png", "image/png", 5).with_last_modified(2);
    assert!(a.is_same_file(&same));
    assert!(!a.is_same_file(&touched));
}
