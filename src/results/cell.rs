use serde_json::Value;

/// Text shown for a payload value in the result grid.
///
/// Strings are shown as-is (no quotes), numbers and booleans in their usual
/// form, `null` as blank, and arrays/objects as compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Shortens `text` to at most `max_chars` characters for display, marking the
/// cut with an ellipsis.
pub fn truncate_for_display(text: &str, max_chars: usize) -> (String, bool) {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((cut, _)) => (format!("{}…", &text[..cut]), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_use_natural_text() {
        assert_eq!(cell_text(&json!("ok")), "ok");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn compound_values_render_as_json() {
        assert_eq!(
            cell_text(&json!({"pages": 3, "title": "Widget"})),
            r#"{"pages":3,"title":"Widget"}"#
        );
        assert_eq!(cell_text(&json!([1, "two", null])), r#"[1,"two",null]"#);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_display("short", 10), ("short".to_string(), false));
        assert_eq!(
            truncate_for_display("Файл патента", 4),
            ("Файл…".to_string(), true)
        );
    }
}
