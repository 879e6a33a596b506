//! Config validation: row key, field uniqueness, paging defaults and binding consistency.

use crate::config::{CrudConfig, ResourceBinding, SearchKind, SelectOption};
use crate::error::ConfigError;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

pub fn validate(config: &CrudConfig) -> Result<(), ConfigError> {
    if config.table.row_key.trim().is_empty() {
        return Err(ConfigError::EmptyRowKey);
    }

    let mut columns = HashSet::new();
    for c in &config.table.columns {
        if !columns.insert(c.key.as_str()) {
            return Err(ConfigError::DuplicateField {
                kind: "column",
                name: c.key.clone(),
            });
        }
    }

    let mut search_names = HashSet::new();
    for f in &config.search.fields {
        if !search_names.insert(f.name.as_str()) {
            return Err(ConfigError::DuplicateField {
                kind: "search",
                name: f.name.clone(),
            });
        }
        if let SearchKind::Select { options, all_value } = &f.kind {
            if let Some(default) = &f.default_value {
                let is_sentinel = all_value.as_deref().is_some_and(|a| default.as_str() == Some(a));
                if !is_sentinel && !offers(options, default) {
                    return Err(ConfigError::DefaultNotInOptions(f.name.clone()));
                }
            }
        }
    }

    let mut edit_names = HashSet::new();
    for f in &config.edit.fields {
        if !edit_names.insert(f.name.as_str()) {
            return Err(ConfigError::DuplicateField {
                kind: "edit",
                name: f.name.clone(),
            });
        }
        if let (Some(options), Some(default)) = (f.kind.options(), &f.default_value) {
            if !offers(options, default) {
                return Err(ConfigError::DefaultNotInOptions(f.name.clone()));
            }
        }
        for rule in &f.rules {
            if let Some(pattern) = &rule.pattern {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    field: f.name.clone(),
                    reason: e.to_string(),
                })?;
            }
        }
        if !f.kind.is_text() && f.rules.iter().any(|r| r.pattern.is_some()) {
            tracing::warn!(field = %f.name, "pattern rule on a non-text field is ignored");
        }
    }

    let paging = &config.pagination;
    if paging.default_page_size == 0 || paging.page_size_options.contains(&0) {
        return Err(ConfigError::ZeroPageSize);
    }
    if !paging.page_size_options.is_empty() && !paging.page_size_options.contains(&paging.default_page_size) {
        return Err(ConfigError::PageSizeNotOffered {
            size: paging.default_page_size,
            options: paging.page_size_options.clone(),
        });
    }

    if let Some(binding) = &config.api {
        validate_binding(binding)?;
    }

    Ok(())
}

fn validate_binding(binding: &ResourceBinding) -> Result<(), ConfigError> {
    for endpoint in [&binding.update, &binding.delete].into_iter().flatten() {
        if !endpoint.path.contains("{id}") {
            return Err(ConfigError::MissingIdPlaceholder(endpoint.path.clone()));
        }
    }
    Ok(())
}

fn offers(options: &[SelectOption], value: &Value) -> bool {
    options.iter().any(|o| loosely_equal(&o.value, value))
}

/// Select values arrive as strings from forms and as numbers from JSON; "0" and 0 are the same option.
pub(crate) fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}
