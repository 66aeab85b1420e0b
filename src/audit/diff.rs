//! Diff generation for audit logging

use serde_json::Value;

/// Describe the top-level field changes between two JSON values
///
/// Returns `None` when nothing changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut changes = Vec::new();

            for (key, before_val) in before_obj {
                match after_obj.get(key) {
                    Some(after_val) if after_val != before_val => changes.push(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(before_val),
                        format_value(after_val)
                    )),
                    Some(_) => {}
                    None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) {
                    changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
                }
            }

            if changes.is_empty() {
                None
            } else {
                Some(changes.join(", "))
            }
        }
        _ if before != after => Some(format!(
            "{} -> {}",
            format_value(before),
            format_value(after)
        )),
        _ => None,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_columns_only() {
        let before = json!({"id": 3, "name": "Card", "balance": 50000, "type": "debit"});
        let after = json!({"id": 3, "name": "Main Card", "balance": 50000, "type": "credit"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("name: \"Card\" -> \"Main Card\""));
        assert!(diff.contains("type: \"debit\" -> \"credit\""));
        assert!(!diff.contains("balance"));
    }

    #[test]
    fn test_no_changes() {
        let row = json!({"completed": false});
        assert_eq!(generate_diff(&row, &row), None);
    }

    #[test]
    fn test_added_and_removed() {
        let before = json!({"last_processed": null, "old": 1});
        let after = json!({"last_processed": "2025-03-05", "new": true});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("last_processed: null -> \"2025-03-05\""));
        assert!(diff.contains("old: 1 -> (removed)"));
        assert!(diff.contains("new: (added) -> true"));
    }

    #[test]
    fn test_long_multibyte_strings_truncate_on_char_boundary() {
        let long = "Продукты ".repeat(10);
        let diff = generate_diff(&json!({"d": ""}), &json!({"d": long})).unwrap();
        assert!(diff.ends_with("...\""));
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(generate_diff(&json!(1), &json!(2)), Some("1 -> 2".into()));
        assert_eq!(generate_diff(&json!("a"), &json!("a")), None);
    }
}
