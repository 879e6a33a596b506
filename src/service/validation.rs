//! Client-side form validation from edit field rules. Runs before any network call.

use crate::adapter::Record;
use crate::config::{loosely_equal, EditField, EditKind, Format, ValidationRule};
use crate::error::ValidationErrors;
use regex::Regex;
use serde_json::Value;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^1[3-9]\d{9}$";
const USERNAME_PATTERN: &str = r"^[a-zA-Z0-9_]+$";
const PASSWORD_CHARSET: &str = r"^[a-zA-Z\d@$!%*?&]+$";

pub struct FormValidator;

impl FormValidator {
    /// Check every field; all failures are reported, at most one per field.
    pub fn validate(fields: &[EditField], data: &Record) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for field in fields {
            if let Err(message) = validate_field(field, data.get(&field.name)) {
                errors.push(&field.name, message);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn is_blank(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn validate_field(field: &EditField, value: Option<&Value>) -> Result<(), String> {
    let label = &field.label;
    let required_rule = field.rules.iter().find(|r| r.required);
    if (field.required || required_rule.is_some()) && is_blank(value) {
        return Err(required_rule
            .and_then(|r| r.message.clone())
            .unwrap_or_else(|| format!("{} is required", label)));
    }
    let value = match value {
        Some(v) if !is_blank(Some(v)) => v,
        _ => return Ok(()),
    };

    match &field.kind {
        EditKind::Number { .. } => {
            if as_number(value).is_none() {
                return Err(format!("{} must be a number", label));
            }
        }
        EditKind::Switch => {
            if !value.is_boolean() {
                return Err(format!("{} must be on or off", label));
            }
        }
        EditKind::Select { options } | EditKind::Radio { options } => {
            if !options.iter().any(|o| loosely_equal(&o.value, value)) {
                return Err(format!("{} has an invalid option", label));
            }
        }
        EditKind::Input | EditKind::Textarea { .. } => {
            if !value.is_string() {
                return Err(format!("{} must be text", label));
            }
        }
    }

    for rule in &field.rules {
        check_rule(field, rule, value).map_err(|generated| rule.message.clone().unwrap_or(generated))?;
    }
    Ok(())
}

fn check_rule(field: &EditField, rule: &ValidationRule, value: &Value) -> Result<(), String> {
    let label = &field.label;
    if field.kind.is_text() {
        let s = value.as_str().unwrap_or_default();
        let len = s.chars().count() as f64;
        if let Some(min) = rule.min {
            if len < min {
                return Err(format!("{} needs at least {} characters", label, min));
            }
        }
        if let Some(max) = rule.max {
            if len > max {
                return Err(format!("{} allows at most {} characters", label, max));
            }
        }
        if let Some(pattern) = &rule.pattern {
            let re = Regex::new(pattern).map_err(|_| format!("invalid pattern for {}", label))?;
            if !re.is_match(s) {
                return Err(format!("{} has an invalid format", label));
            }
        }
        if let Some(format) = rule.format {
            if !matches_format(format, s) {
                return Err(format!("{} has an invalid format", label));
            }
        }
    } else if let EditKind::Number { .. } = field.kind {
        let n = as_number(value).unwrap_or_default();
        if let Some(min) = rule.min {
            if n < min {
                return Err(format!("{} must not be less than {}", label, min));
            }
        }
        if let Some(max) = rule.max {
            if n > max {
                return Err(format!("{} must not be greater than {}", label, max));
            }
        }
    }
    Ok(())
}

fn is_match(pattern: &str, s: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(s)).unwrap_or(false)
}

pub fn matches_format(format: Format, s: &str) -> bool {
    match format {
        Format::Email => is_match(EMAIL_PATTERN, s),
        Format::Phone => is_match(PHONE_PATTERN, s),
        Format::Username => is_match(USERNAME_PATTERN, s),
        // The regex crate has no lookahead; character classes are checked directly.
        Format::Password => {
            is_match(PASSWORD_CHARSET, s)
                && s.chars().any(|c| c.is_ascii_lowercase())
                && s.chars().any(|c| c.is_ascii_uppercase())
                && s.chars().any(|c| c.is_ascii_digit())
        }
        Format::Uuid => uuid::Uuid::parse_str(s).is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectOption;
    use serde_json::json;

    fn field(name: &str, kind: EditKind, rules: Vec<ValidationRule>) -> EditField {
        EditField {
            name: name.into(),
            label: name.into(),
            placeholder: None,
            required: false,
            rules,
            default_value: None,
            disabled: false,
            span: None,
            kind,
        }
    }

    fn data(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn required_uses_rule_message() {
        let fields = vec![field("dictName", EditKind::Input, vec![ValidationRule::required("Name cannot be empty")])];
        let err = FormValidator::validate(&fields, &data(json!({ "dictName": "  " }))).unwrap_err();
        assert_eq!(err.for_field("dictName").unwrap().message, "Name cannot be empty");
    }

    #[test]
    fn required_flag_without_rule_generates_message() {
        let mut f = field("serviceName", EditKind::Input, vec![]);
        f.required = true;
        let err = FormValidator::validate(&[f], &data(json!({}))).unwrap_err();
        assert_eq!(err.0[0].message, "serviceName is required");
    }

    #[test]
    fn optional_missing_fields_pass() {
        let fields = vec![field("remark", EditKind::Textarea { rows: None }, vec![ValidationRule::email()])];
        assert!(FormValidator::validate(&fields, &data(json!({ "remark": null }))).is_ok());
    }

    #[test]
    fn text_length_and_pattern() {
        let rule = ValidationRule {
            min: Some(2.0),
            max: Some(4.0),
            pattern: Some("^[a-z_]+$".into()),
            ..Default::default()
        };
        let fields = vec![field("dictType", EditKind::Input, vec![rule])];
        assert!(FormValidator::validate(&fields, &data(json!({ "dictType": "ab" }))).is_ok());
        let err = FormValidator::validate(&fields, &data(json!({ "dictType": "a" }))).unwrap_err();
        assert!(err.0[0].message.contains("at least 2"));
        let err = FormValidator::validate(&fields, &data(json!({ "dictType": "abcde" }))).unwrap_err();
        assert!(err.0[0].message.contains("at most 4"));
        let err = FormValidator::validate(&fields, &data(json!({ "dictType": "AB" }))).unwrap_err();
        assert!(err.0[0].message.contains("invalid format"));
    }

    #[test]
    fn number_bounds_and_type() {
        let rule = ValidationRule {
            min: Some(0.0),
            max: Some(1.0),
            ..Default::default()
        };
        let fields = vec![field("dataType", EditKind::Number { step: None }, vec![rule])];
        assert!(FormValidator::validate(&fields, &data(json!({ "dataType": 1 }))).is_ok());
        assert!(FormValidator::validate(&fields, &data(json!({ "dataType": "0" }))).is_ok());
        assert!(FormValidator::validate(&fields, &data(json!({ "dataType": 2 }))).is_err());
        let err = FormValidator::validate(&fields, &data(json!({ "dataType": "two" }))).unwrap_err();
        assert!(err.0[0].message.contains("must be a number"));
    }

    #[test]
    fn select_value_must_be_an_option() {
        let options = vec![
            SelectOption { label: "System".into(), value: json!(0) },
            SelectOption { label: "Business".into(), value: json!(1) },
        ];
        let fields = vec![field("dataType", EditKind::Select { options }, vec![])];
        assert!(FormValidator::validate(&fields, &data(json!({ "dataType": "1" }))).is_ok());
        assert!(FormValidator::validate(&fields, &data(json!({ "dataType": 3 }))).is_err());
    }

    #[test]
    fn collects_one_error_per_field() {
        let mut a = field("a", EditKind::Input, vec![]);
        a.required = true;
        let mut b = field("b", EditKind::Switch, vec![]);
        b.required = true;
        let err = FormValidator::validate(&[a, b], &data(json!({ "b": "yes" }))).unwrap_err();
        assert_eq!(err.0.len(), 2);
    }

    #[test]
    fn preset_formats() {
        assert!(matches_format(Format::Email, "ops@example.com"));
        assert!(!matches_format(Format::Email, "ops@example"));
        assert!(matches_format(Format::Phone, "13812345678"));
        assert!(!matches_format(Format::Phone, "12812345678"));
        assert!(matches_format(Format::Username, "admin_01"));
        assert!(!matches_format(Format::Username, "admin-01"));
        assert!(matches_format(Format::Password, "Secret1"));
        assert!(!matches_format(Format::Password, "secret1"));
        assert!(!matches_format(Format::Password, "Secret 1"));
        assert!(matches_format(Format::Uuid, "67e55044-10b1-426f-9247-bb680e5fe0c8"));
    }

    #[test]
    fn username_preset_checks_length_too() {
        let fields = vec![field("username", EditKind::Input, vec![ValidationRule::username()])];
        assert!(FormValidator::validate(&fields, &data(json!({ "username": "ab" }))).is_err());
        assert!(FormValidator::validate(&fields, &data(json!({ "username": "abc" }))).is_ok());
    }
}
