//! Raw CRUD page configuration types matching the JSON documents (camelCase keys).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Search filter values keyed by field name, in stable key order.
pub type Filters = BTreeMap<String, Value>;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrudConfig {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub table: TableConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub edit: EditConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub features: Features,
    /// Binding used to build a `RestAdapter`. Pages backed by a hand-written adapter omit it.
    #[serde(default)]
    pub api: Option<ResourceBinding>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(default = "default_row_key")]
    pub row_key: String,
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub show_selection: bool,
    #[serde(default)]
    pub show_index: bool,
    /// Field used to name a record in delete prompts; falls back to name/title.
    #[serde(default)]
    pub display_field: Option<String>,
}

fn default_row_key() -> String {
    "id".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnWidth {
    Pixels(u32),
    Css(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub data_index: Option<String>,
    #[serde(default)]
    pub width: Option<ColumnWidth>,
    #[serde(default)]
    pub align: Option<Align>,
    /// Named cell renderer the presentation layer resolves (e.g. "statusBadge").
    #[serde(default)]
    pub render: Option<String>,
}

impl ColumnConfig {
    /// Field read from each record; defaults to the column key.
    pub fn field(&self) -> &str {
        self.data_index.as_deref().unwrap_or(&self.key)
    }

    pub fn cell<'a>(&self, record: &'a serde_json::Map<String, Value>) -> Option<&'a Value> {
        record.get(self.field())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    #[serde(default)]
    pub fields: Vec<SearchField>,
    #[serde(default)]
    pub default_params: Filters,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchField {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(flatten)]
    pub kind: SearchKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchKind {
    Input,
    #[serde(rename_all = "camelCase")]
    Select {
        options: Vec<SelectOption>,
        /// Option value meaning "no filter"; never transmitted.
        #[serde(default = "default_all_value")]
        all_value: Option<String>,
    },
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    DateRange,
}

pub const ALL_SENTINEL: &str = "all";

fn default_all_value() -> Option<String> {
    Some(ALL_SENTINEL.to_string())
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditConfig {
    #[serde(default)]
    pub fields: Vec<EditField>,
    #[serde(default)]
    pub layout: FormLayout,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormLayout {
    Horizontal,
    #[default]
    Vertical,
    Inline,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditField {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub span: Option<u8>,
    #[serde(flatten)]
    pub kind: EditKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EditKind {
    Input,
    Textarea {
        #[serde(default)]
        rows: Option<u16>,
    },
    Select {
        options: Vec<SelectOption>,
    },
    Number {
        #[serde(default)]
        step: Option<f64>,
    },
    Switch,
    Radio {
        options: Vec<SelectOption>,
    },
}

impl EditKind {
    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            EditKind::Select { options } | EditKind::Radio { options } => Some(options),
            EditKind::Input | EditKind::Textarea { .. } | EditKind::Number { .. } | EditKind::Switch => None,
        }
    }

    /// Text-like kinds get length and pattern checks.
    pub fn is_text(&self) -> bool {
        matches!(self, EditKind::Input | EditKind::Textarea { .. })
    }
}

/// Named format checks carried over from the console's shared rule presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Email,
    Phone,
    Username,
    Password,
    Uuid,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(default)]
    pub required: bool,
    /// Overrides the generated message for any failure of this rule.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Minimum length for text fields, minimum value for number fields.
    #[serde(default)]
    pub min: Option<f64>,
    /// Maximum length for text fields, maximum value for number fields.
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub format: Option<Format>,
}

impl ValidationRule {
    pub fn required(message: impl Into<String>) -> Self {
        ValidationRule {
            required: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn email() -> Self {
        ValidationRule {
            format: Some(Format::Email),
            message: Some("Please enter a valid email address".into()),
            ..Default::default()
        }
    }

    pub fn phone() -> Self {
        ValidationRule {
            format: Some(Format::Phone),
            message: Some("Please enter a valid mobile number".into()),
            ..Default::default()
        }
    }

    pub fn username() -> Self {
        ValidationRule {
            format: Some(Format::Username),
            min: Some(3.0),
            max: Some(20.0),
            message: Some("Username may only contain letters, digits and underscores, 3-20 characters".into()),
            ..Default::default()
        }
    }

    pub fn password() -> Self {
        ValidationRule {
            format: Some(Format::Password),
            min: Some(6.0),
            message: Some("Password needs at least 6 characters with upper and lower case letters and a digit".into()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,
    #[serde(default = "default_true")]
    pub show_size_changer: bool,
    #[serde(default = "default_true")]
    pub show_quick_jumper: bool,
    #[serde(default = "default_true")]
    pub show_total: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            show_size_changer: true,
            show_quick_jumper: true,
            show_total: true,
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_page_size_options() -> Vec<u32> {
    vec![10, 20, 50, 100]
}

fn default_true() -> bool {
    true
}

/// Per-action switches. Absent flags allow the action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default = "default_true")]
    pub create: bool,
    #[serde(default = "default_true")]
    pub edit: bool,
    #[serde(default = "default_true")]
    pub delete: bool,
    #[serde(default)]
    pub export: bool,
    #[serde(default)]
    pub import: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions {
            create: true,
            edit: true,
            delete: true,
            export: false,
            import: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default = "default_true")]
    pub enable_search: bool,
    #[serde(default = "default_true")]
    pub enable_refresh: bool,
    #[serde(default)]
    pub enable_export: bool,
    #[serde(default)]
    pub enable_import: bool,
    #[serde(default)]
    pub enable_batch_delete: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            enable_search: true,
            enable_refresh: true,
            enable_export: false,
            enable_import: false,
            enable_batch_delete: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// How the list request carries paging and filters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListStyle {
    /// `?current=&size=&<filter>=...`
    #[default]
    Query,
    /// JSON body `{ "params": {...}, "current": n, "size": n }`
    Body,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    /// Path relative to the transport base URL; `{id}` is replaced by the row key.
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBinding {
    pub list: Endpoint,
    #[serde(default)]
    pub list_style: ListStyle,
    #[serde(default)]
    pub create: Option<Endpoint>,
    #[serde(default)]
    pub update: Option<Endpoint>,
    #[serde(default)]
    pub delete: Option<Endpoint>,
    /// Business code this backend family uses for success (e.g. 1 or 200).
    pub success_code: i64,
}
