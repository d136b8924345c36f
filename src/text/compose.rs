//! Field text composition: decoration of single values and concatenation of
//! combined fields.

use crate::template::model::{Field, FieldKind, Wrapper};
use crate::template::values::ValueSnapshot;

/// Decorate a single value with the field's wrapper, prefix and suffix.
///
/// An empty value is returned unchanged: decoration only ever attaches to
/// real content, so a field with a literal prefix but no value still renders
/// nothing.
pub fn decorate(value: &str, field: &Field) -> String {
    if value.is_empty() {
        return String::new();
    }

    let wrapped = match field.wrapper {
        Wrapper::None => value.to_string(),
        Wrapper::Parentheses => format!("({value})"),
        Wrapper::Quotes => format!("\"{value}\""),
    };

    let mut out = String::new();
    if let Some(prefix) = &field.prefix {
        out.push_str(prefix);
    }
    out.push_str(&wrapped);
    if let Some(suffix) = &field.suffix {
        out.push_str(suffix);
    }
    out
}

/// Resolve a combined field's text: each referenced input value, decorated
/// with its own input field's decoration, joined in `combineFields` order.
///
/// The join order is exactly the listed order, not alphabetical and not the
/// value map's insertion order. Returns the empty string when every part is
/// empty; the caller must not draw that.
pub fn compose(combined: &Field, all_fields: &[Field], values: &ValueSnapshot) -> String {
    let FieldKind::Combined { keys, separator } = combined.kind() else {
        return String::new();
    };

    let mut parts = Vec::new();
    for key in keys {
        let Some(value) = values.non_empty(key) else {
            continue;
        };
        let part = match all_fields.iter().find(|f| &f.key == key && f.is_input) {
            Some(input_def) => decorate(value, input_def),
            None => value.to_string(),
        };
        parts.push(part);
    }
    parts.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::values::ValueStore;

    fn field(json: &str) -> Field {
        serde_json::from_str(json).unwrap()
    }

    fn snapshot(pairs: &[(&str, &str)]) -> ValueSnapshot {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<ValueStore>()
            .snapshot()
    }

    #[test]
    fn decorate_applies_wrapper_then_prefix_then_suffix() {
        let f = field(r#"{"key": "k", "wrapper": "parentheses", "prefix": "-", "suffix": "!"}"#);
        assert_eq!(decorate("Dana", &f), "-(Dana)!");
    }

    #[test]
    fn decorate_quotes_wrapper() {
        let f = field(r#"{"key": "k", "wrapper": "quotes"}"#);
        assert_eq!(decorate("אהבה", &f), "\"אהבה\"");
    }

    #[test]
    fn decorate_returns_empty_value_unchanged() {
        let f = field(r#"{"key": "k", "wrapper": "quotes", "prefix": "-", "suffix": "!"}"#);
        assert_eq!(decorate("", &f), "");
    }

    #[test]
    fn decorate_preserves_multiline_values() {
        let f = field(r#"{"key": "k", "prefix": "> "}"#);
        assert_eq!(decorate("line one\nline two", &f), "> line one\nline two");
    }

    fn combined_fixture() -> Vec<Field> {
        vec![
            field(r#"{"key": "a", "isInput": true, "suffix": "!"}"#),
            field(r#"{"key": "b", "isInput": true, "wrapper": "parentheses"}"#),
            field(r#"{"key": "both", "isCombined": true, "combineFields": ["a", "b"]}"#),
        ]
    }

    #[test]
    fn compose_joins_in_listed_order() {
        let fields = combined_fixture();
        let values = snapshot(&[("a", "X"), ("b", "Y")]);
        assert_eq!(compose(&fields[2], &fields, &values), "X! (Y)");

        let mut reversed = fields[2].clone();
        reversed.combine_fields = vec!["b".to_string(), "a".to_string()];
        assert_eq!(compose(&reversed, &fields, &values), "(Y) X!");
    }

    #[test]
    fn compose_order_follows_the_listed_keys_not_the_value_map() {
        let fields = vec![
            field(r#"{"key": "a", "isInput": true}"#),
            field(r#"{"key": "b", "isInput": true}"#),
            field(r#"{"key": "ab", "isCombined": true, "combineFields": ["a", "b"]}"#),
            field(r#"{"key": "ba", "isCombined": true, "combineFields": ["b", "a"]}"#),
        ];
        // The value map sorts alphabetically; the join must not.
        let values = snapshot(&[("b", "Y"), ("a", "X")]);
        assert_eq!(compose(&fields[2], &fields, &values), "X Y");
        assert_eq!(compose(&fields[3], &fields, &values), "Y X");
    }

    #[test]
    fn compose_uses_declared_separator() {
        let mut fields = combined_fixture();
        fields[2].combine_separator = Some(" & ".to_string());
        let values = snapshot(&[("a", "X"), ("b", "Y")]);
        assert_eq!(compose(&fields[2], &fields, &values), "X! & (Y)");
    }

    #[test]
    fn compose_skips_empty_parts() {
        let fields = combined_fixture();
        assert_eq!(compose(&fields[2], &fields, &snapshot(&[("a", "X")])), "X!");
        assert_eq!(compose(&fields[2], &fields, &snapshot(&[("a", ""), ("b", "")])), "");
        assert_eq!(compose(&fields[2], &fields, &snapshot(&[])), "");
    }

    #[test]
    fn compose_leaves_non_input_references_undecorated() {
        let mut fields = combined_fixture();
        fields[0].is_input = false;
        let values = snapshot(&[("a", "X"), ("b", "Y")]);
        assert_eq!(compose(&fields[2], &fields, &values), "X (Y)");
    }

    #[test]
    fn compose_on_non_combined_field_is_empty() {
        let fields = combined_fixture();
        let values = snapshot(&[("a", "X")]);
        assert_eq!(compose(&fields[0], &fields, &values), "");
    }
}
