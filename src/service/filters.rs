//! Search filter normalization applied before every list request.

use crate::config::{Filters, SearchField, SearchKind};
use serde_json::Value;

/// Drop filters that mean "no constraint": null, blank strings, empty or all-blank
/// arrays, and a select field's "all" sentinel. Strings are trimmed.
pub fn normalize_filters(filters: &Filters, fields: &[SearchField]) -> Filters {
    filters
        .iter()
        .filter_map(|(name, value)| {
            let field = fields.iter().find(|f| &f.name == name);
            normalize_value(value, field).map(|v| (name.clone(), v))
        })
        .collect()
}

fn normalize_value(value: &Value, field: Option<&SearchField>) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || is_sentinel(s, field) {
                None
            } else {
                Some(Value::String(s.to_string()))
            }
        }
        Value::Array(items) => {
            if items.iter().all(|v| normalize_value(v, None).is_none()) {
                None
            } else {
                Some(value.clone())
            }
        }
        other => Some(other.clone()),
    }
}

fn is_sentinel(s: &str, field: Option<&SearchField>) -> bool {
    match field.map(|f| &f.kind) {
        Some(SearchKind::Select { all_value, .. }) => all_value.as_deref() == Some(s),
        Some(SearchKind::Input | SearchKind::Number { .. } | SearchKind::DateRange) | None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectOption;
    use serde_json::json;

    fn fields() -> Vec<SearchField> {
        vec![
            SearchField {
                name: "dictName".into(),
                label: "Name".into(),
                placeholder: None,
                default_value: None,
                kind: SearchKind::Input,
            },
            SearchField {
                name: "status".into(),
                label: "Status".into(),
                placeholder: None,
                default_value: Some(json!("all")),
                kind: SearchKind::Select {
                    options: vec![
                        SelectOption { label: "All".into(), value: json!("all") },
                        SelectOption { label: "On".into(), value: json!("1") },
                    ],
                    all_value: Some("all".into()),
                },
            },
            SearchField {
                name: "createTime".into(),
                label: "Created".into(),
                placeholder: None,
                default_value: None,
                kind: SearchKind::DateRange,
            },
        ]
    }

    fn filters(v: Value) -> Filters {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn status_all_and_blanks_are_omitted() {
        let out = normalize_filters(
            &filters(json!({ "status": "all", "dictName": "x", "dictType": "", "serviceName": null })),
            &fields(),
        );
        assert_eq!(out, filters(json!({ "dictName": "x" })));
    }

    #[test]
    fn whitespace_is_blank_and_values_are_trimmed() {
        let out = normalize_filters(&filters(json!({ "dictName": "  ", "dictType": " sys " })), &fields());
        assert_eq!(out, filters(json!({ "dictType": "sys" })));
    }

    #[test]
    fn all_is_only_a_sentinel_on_select_fields() {
        let out = normalize_filters(&filters(json!({ "dictName": "all", "status": "1" })), &fields());
        assert_eq!(out, filters(json!({ "dictName": "all", "status": "1" })));
    }

    #[test]
    fn empty_date_ranges_are_omitted() {
        let out = normalize_filters(
            &filters(json!({ "createTime": [null, ""], "dataType": 0, "enabled": false })),
            &fields(),
        );
        assert_eq!(out, filters(json!({ "dataType": 0, "enabled": false })));
        let out = normalize_filters(&filters(json!({ "createTime": ["2024-01-01", null] })), &fields());
        assert_eq!(out.len(), 1);
    }
}
