//! Resource adapters: CRUD verbs mapped onto a backend, with responses normalized.

pub mod rest;

pub use rest::RestAdapter;

use crate::config::Filters;
use crate::error::AdminError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One row of a managed resource.
pub type Record = serde_json::Map<String, Value>;

/// Row key value extracted from a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl RowId {
    /// Integers and non-empty strings are usable keys; anything else is not.
    pub fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_i64().map(RowId::Int),
            Value::String(s) if !s.is_empty() => Some(RowId::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RowId::Int(n) => Value::Number((*n).into()),
            RowId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(n) => write!(f, "{}", n),
            RowId::Text(s) => f.write_str(s),
        }
    }
}

/// Paging cursor plus already-normalized filters for one list request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub filters: Filters,
}

/// Uniform list result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListPage {
    pub items: Vec<Record>,
    pub total: u64,
    /// Page echoed by the backend, when it reports one.
    pub current: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// CRUD verbs for one resource. Every method returns normalized shapes; envelope
/// handling stays inside the implementation.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<ListPage, AdminError>;

    async fn create(&self, _data: Record) -> Result<Record, AdminError> {
        Err(AdminError::Unsupported(Operation::Create.as_str()))
    }

    async fn update(&self, _id: &RowId, _data: Record) -> Result<Record, AdminError> {
        Err(AdminError::Unsupported(Operation::Update.as_str()))
    }

    async fn delete(&self, _id: &RowId) -> Result<bool, AdminError> {
        Err(AdminError::Unsupported(Operation::Delete.as_str()))
    }

    /// Whether a verb is bound. Unbound verbs fail with `Unsupported`.
    fn supports(&self, op: Operation) -> bool {
        matches!(op, Operation::List)
    }
}
