//! Configuration-bound REST adapter.

use crate::adapter::{ListPage, ListQuery, Operation, Record, ResourceAdapter, RowId};
use crate::config::{CrudConfig, Endpoint, ListStyle, ResourceBinding};
use crate::envelope::normalize_list;
use crate::error::{AdminError, ConfigError};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value};

/// Everything but RFC 3986 unreserved characters is escaped in an id segment.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

pub struct RestAdapter {
    transport: HttpTransport,
    binding: ResourceBinding,
    row_key: String,
}

impl RestAdapter {
    pub fn new(transport: HttpTransport, binding: ResourceBinding, row_key: impl Into<String>) -> Self {
        RestAdapter {
            transport,
            binding,
            row_key: row_key.into(),
        }
    }

    /// Build from a page config's `api` binding and row key.
    pub fn from_config(transport: HttpTransport, config: &CrudConfig) -> Result<Self, AdminError> {
        let binding = config
            .api
            .clone()
            .ok_or_else(|| ConfigError::Load(format!("'{}' has no api binding", config.title)))?;
        Ok(Self::new(transport, binding, config.table.row_key.clone()))
    }

    fn endpoint(&self, op: Operation) -> Result<&Endpoint, AdminError> {
        let endpoint = match op {
            Operation::List => Some(&self.binding.list),
            Operation::Create => self.binding.create.as_ref(),
            Operation::Update => self.binding.update.as_ref(),
            Operation::Delete => self.binding.delete.as_ref(),
        };
        endpoint.ok_or(AdminError::Unsupported(op.as_str()))
    }

    /// Record as submitted, with the row key set. Used when the backend echoes only an id or nothing.
    fn synthesize(&self, mut data: Record, id: Value) -> Record {
        data.insert(self.row_key.clone(), id);
        data
    }
}

fn id_path(template: &str, id: &RowId) -> String {
    let encoded = utf8_percent_encode(&id.to_string(), ID_SEGMENT).to_string();
    template.replace("{id}", &encoded)
}

fn param_value(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(items.iter().filter_map(param_value).collect::<Vec<_>>().join(",")),
        Value::Object(_) => Some(v.to_string()),
    }
}

fn query_pairs(query: &ListQuery) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("current".to_string(), query.page.to_string()),
        ("size".to_string(), query.page_size.to_string()),
    ];
    pairs.extend(
        query
            .filters
            .iter()
            .filter_map(|(k, v)| param_value(v).map(|v| (k.clone(), v))),
    );
    pairs
}

#[async_trait]
impl ResourceAdapter for RestAdapter {
    async fn list(&self, query: &ListQuery) -> Result<ListPage, AdminError> {
        let endpoint = self.endpoint(Operation::List)?;
        let envelope = match self.binding.list_style {
            ListStyle::Query => {
                self.transport
                    .request(endpoint.method, &endpoint.path, &query_pairs(query), None)
                    .await?
            }
            ListStyle::Body => {
                let body = json!({
                    "params": query.filters,
                    "current": query.page,
                    "size": query.page_size,
                });
                self.transport
                    .request(endpoint.method, &endpoint.path, &[], Some(&body))
                    .await?
            }
        };
        normalize_list(envelope.into_data(self.binding.success_code)?)
    }

    async fn create(&self, data: Record) -> Result<Record, AdminError> {
        let endpoint = self.endpoint(Operation::Create)?;
        let body = Value::Object(data.clone());
        let envelope = self
            .transport
            .request(endpoint.method, &endpoint.path, &[], Some(&body))
            .await?;
        Ok(match envelope.into_data(self.binding.success_code)? {
            Value::Object(created) => created,
            id @ (Value::String(_) | Value::Number(_)) => self.synthesize(data, id),
            _ => data,
        })
    }

    async fn update(&self, id: &RowId, data: Record) -> Result<Record, AdminError> {
        let endpoint = self.endpoint(Operation::Update)?;
        let body = Value::Object(data.clone());
        let envelope = self
            .transport
            .request(endpoint.method, &id_path(&endpoint.path, id), &[], Some(&body))
            .await?;
        Ok(match envelope.into_data(self.binding.success_code)? {
            Value::Object(updated) => updated,
            _ => self.synthesize(data, id.to_value()),
        })
    }

    async fn delete(&self, id: &RowId) -> Result<bool, AdminError> {
        let endpoint = self.endpoint(Operation::Delete)?;
        let envelope = self
            .transport
            .request(endpoint.method, &id_path(&endpoint.path, id), &[], None)
            .await?;
        Ok(match envelope.into_data(self.binding.success_code)? {
            Value::Bool(deleted) => deleted,
            _ => true,
        })
    }

    fn supports(&self, op: Operation) -> bool {
        self.endpoint(op).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn id_placeholder_is_encoded() {
        assert_eq!(id_path("/dict/{id}", &RowId::Text("a/b c".into())), "/dict/a%2Fb%20c");
        assert_eq!(id_path("/dict/{id}/status", &RowId::Int(5)), "/dict/5/status");
    }

    #[test]
    fn query_pairs_carry_cursor_and_filters() {
        let mut filters = BTreeMap::new();
        filters.insert("dictName".to_string(), json!("x"));
        filters.insert("dataType".to_string(), json!(0));
        filters.insert("createTime".to_string(), json!(["2024-01-01", "2024-01-31"]));
        let pairs = query_pairs(&ListQuery {
            page: 3,
            page_size: 10,
            filters,
        });
        assert_eq!(
            pairs,
            vec![
                ("current".to_string(), "3".to_string()),
                ("size".to_string(), "10".to_string()),
                ("createTime".to_string(), "2024-01-01,2024-01-31".to_string()),
                ("dataType".to_string(), "0".to_string()),
                ("dictName".to_string(), "x".to_string()),
            ]
        );
    }
}
