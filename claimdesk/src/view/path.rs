//! Dotted-path field lookup.

use serde_json::{Map, Value};

/// Resolve `"a.b.c"` against a record's fields.
///
/// Returns `None` when any segment is missing or an intermediate value is
/// not an object. A plain field name is a one-segment path.
pub fn resolve_path<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;

    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_plain_field() {
        let f = fields(json!({ "name": "Bumper" }));
        assert_eq!(resolve_path(&f, "name"), Some(&json!("Bumper")));
    }

    #[test]
    fn test_nested_field() {
        let f = fields(json!({ "labourRR": { "estAmt": 450 } }));
        assert_eq!(resolve_path(&f, "labourRR.estAmt"), Some(&json!(450)));
    }

    #[test]
    fn test_missing_intermediate() {
        let f = fields(json!({ "labourRR": 12 }));
        assert_eq!(resolve_path(&f, "labourRR.estAmt"), None);
        assert_eq!(resolve_path(&f, "paint.estAmt"), None);
    }

    #[test]
    fn test_empty_path() {
        let f = fields(json!({ "a": 1 }));
        assert_eq!(resolve_path(&f, ""), None);
    }
}
