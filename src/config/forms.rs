//! Derived views of a page config: form defaults, prefill and permission checks.

use crate::adapter::{Record, RowId};
use crate::config::{CrudConfig, Filters};
use serde_json::Value;

/// User-triggered page actions gated by permission and feature flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    Edit,
    Delete,
    BatchDelete,
    Export,
    Import,
    Search,
    Refresh,
}

impl CrudConfig {
    /// Initial values for the create form.
    pub fn edit_defaults(&self) -> Record {
        self.edit
            .fields
            .iter()
            .filter_map(|f| f.default_value.clone().map(|v| (f.name.clone(), v)))
            .collect()
    }

    /// Edit form prefill: the record's value when present and non-null, else the field default.
    pub fn form_values(&self, record: &Record) -> Record {
        self.edit
            .fields
            .iter()
            .filter_map(|f| {
                let v = record
                    .get(&f.name)
                    .filter(|v| !v.is_null())
                    .cloned()
                    .or_else(|| f.default_value.clone())?;
                Some((f.name.clone(), v))
            })
            .collect()
    }

    /// Filters restored by reset. Declared `defaultParams` win over per-field defaults.
    pub fn search_defaults(&self) -> Filters {
        let mut out: Filters = self
            .search
            .fields
            .iter()
            .filter_map(|f| f.default_value.clone().map(|v| (f.name.clone(), v)))
            .collect();
        out.extend(self.search.default_params.clone());
        out
    }

    pub fn allows(&self, action: Action) -> bool {
        let p = &self.permissions;
        let f = &self.features;
        match action {
            Action::Create => p.create,
            Action::Edit => p.edit,
            Action::Delete => p.delete,
            Action::BatchDelete => p.delete && f.enable_batch_delete,
            Action::Export => p.export && f.enable_export,
            Action::Import => p.import && f.enable_import,
            Action::Search => f.enable_search,
            Action::Refresh => f.enable_refresh,
        }
    }

    pub fn row_id(&self, record: &Record) -> Option<RowId> {
        record.get(&self.table.row_key).and_then(RowId::from_value)
    }

    /// Human label for a record in confirmation prompts.
    pub fn display_name(&self, record: &Record) -> String {
        let configured = self.table.display_field.as_deref();
        configured
            .into_iter()
            .chain(["name", "title"])
            .find_map(|field| match record.get(field) {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_else(|| match self.row_id(record) {
                Some(id) => format!("record with ID {}", id),
                None => "this record".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use serde_json::json;

    fn config() -> CrudConfig {
        load_config_from_str(
            &json!({
                "title": "Dictionaries",
                "table": { "rowKey": "dictId", "displayField": "dictName", "columns": [] },
                "search": {
                    "fields": [
                        { "name": "status", "label": "Status", "type": "select", "defaultValue": "all",
                          "options": [{ "label": "All", "value": "all" }] },
                        { "name": "dataType", "label": "Data type", "type": "select", "defaultValue": "1",
                          "options": [{ "label": "System", "value": "0" }, { "label": "Business", "value": "1" }] }
                    ],
                    "defaultParams": { "dataType": "0" }
                },
                "edit": {
                    "fields": [
                        { "name": "dictName", "label": "Name", "type": "input", "required": true },
                        { "name": "status", "label": "Status", "type": "select", "defaultValue": "1",
                          "options": [{ "label": "On", "value": "1" }, { "label": "Off", "value": "0" }] },
                        { "name": "remark", "label": "Remark", "type": "textarea" }
                    ]
                },
                "permissions": { "export": true },
                "features": { "enableBatchDelete": true }
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn create_defaults_only_include_declared_defaults() {
        let defaults = config().edit_defaults();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults["status"], json!("1"));
    }

    #[test]
    fn prefill_prefers_record_values() {
        let record = json!({ "dictId": "d1", "dictName": "gender", "status": null, "remark": "r" });
        let values = config().form_values(record.as_object().unwrap());
        assert_eq!(values["dictName"], json!("gender"));
        assert_eq!(values["status"], json!("1"));
        assert_eq!(values["remark"], json!("r"));
        assert!(!values.contains_key("dictId"));
    }

    #[test]
    fn declared_default_params_override_field_defaults() {
        let defaults = config().search_defaults();
        assert_eq!(defaults["dataType"], json!("0"));
        assert_eq!(defaults["status"], json!("all"));
    }

    #[test]
    fn export_needs_both_permission_and_feature() {
        let c = config();
        assert!(c.allows(Action::Create));
        assert!(c.allows(Action::BatchDelete));
        assert!(!c.allows(Action::Export));
        assert!(!c.allows(Action::Import));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let c = config();
        let named = json!({ "dictId": "d1", "dictName": "gender" });
        assert_eq!(c.display_name(named.as_object().unwrap()), "gender");
        let anonymous = json!({ "dictId": 42 });
        assert_eq!(c.display_name(anonymous.as_object().unwrap()), "record with ID 42");
    }
}
