//! Dotted-path access into JSON objects.
//!
//! Paths like `chat_template_kwargs.reasoning_effort` walk nested objects
//! key by key. A path that does not resolve is an ordinary "not present"
//! outcome; none of these helpers fail.

use serde_json::{Map, Value};

/// Value at `path`, or `None` if any segment is missing or an
/// intermediate value is not an object.
pub fn get_path<'a>(record: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let (parents, last) = split_path(path);
    let mut current = record;
    for key in parents {
        current = current.get(key)?.as_object()?;
    }
    current.get(last)
}

/// Set `path` to `value`, creating missing intermediate objects.
///
/// If an intermediate key holds something other than an object the set is
/// abandoned and the existing value is left alone. Returns whether the
/// value was written.
pub fn set_path(record: &mut Map<String, Value>, path: &str, value: Value) -> bool {
    let (parents, last) = split_path(path);
    let mut current = record;
    for key in parents {
        let next = current
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match next.as_object_mut() {
            Some(object) => current = object,
            None => return false,
        }
    }
    current.insert(last.to_string(), value);
    true
}

/// Remove the value at `path` if the whole path resolves.
pub fn delete_path(record: &mut Map<String, Value>, path: &str) -> Option<Value> {
    let (parents, last) = split_path(path);
    let mut current = record;
    for key in parents {
        current = current.get_mut(key)?.as_object_mut()?;
    }
    current.remove(last)
}

/// Move a top-level string field from `from` to `to`.
///
/// Only string values are moved. Identical names are a no-op so a
/// provider whose field already matches is left untouched.
pub fn rename_field(record: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    if from == to || !record.get(from).is_some_and(Value::is_string) {
        return false;
    }
    if let Some(value) = record.remove(from) {
        record.insert(to.to_string(), value);
        return true;
    }
    false
}

/// Move the value at `from` to `to`, then delete `from`.
///
/// A missing or null source is a no-op, as are identical paths.
pub fn relocate_path(record: &mut Map<String, Value>, from: &str, to: &str) -> bool {
    if from == to {
        return false;
    }
    let value = match get_path(record, from) {
        Some(Value::Null) | None => return false,
        Some(value) => value.clone(),
    };
    if !set_path(record, to, value) {
        return false;
    }
    delete_path(record, from);
    true
}

fn split_path(path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or(path);
    (segments, last)
}
