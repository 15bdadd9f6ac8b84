//! Records as the remote API returns them.

use serde::Deserialize;
use serde_json::{Map, Value};
use ustr::Ustr;

use crate::pager::Pager;

/// Record level access flags. A flag the server left out is `None`, not `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Access {
    pub read: Option<bool>,
    pub write: Option<bool>,
    pub update: Option<bool>,
    pub delete: Option<bool>,
    pub manage: Option<bool>,
    pub externalize: Option<bool>,
}

impl Access {
    /// The flag named exactly like `name`, if the access block carries it.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match name {
            "read" => self.read,
            "write" => self.write,
            "update" => self.update,
            "delete" => self.delete,
            "manage" => self.manage,
            "externalize" => self.externalize,
            _ => None,
        }
    }

    pub fn can_read(&self) -> bool {
        self.read.unwrap_or(false)
    }

    pub fn can_write(&self) -> bool {
        self.write.unwrap_or(false)
    }
}

/// One record of some model type, kept as the raw JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub model_type: Ustr,
    pub attributes: Map<String, Value>,
}

impl Model {
    pub fn new(model_type: impl AsRef<str>, attributes: Map<String, Value>) -> Self {
        Self {
            model_type: Ustr::from(model_type.as_ref()),
            attributes,
        }
    }

    /// Builds a model from a JSON value; non-objects give an empty record.
    pub fn from_value(model_type: impl AsRef<str>, value: Value) -> Self {
        let attributes = match value {
            Value::Object(map) => map,
            other => {
                log::warn!("expected a JSON object for a {} record, got {other}", model_type.as_ref());
                Map::new()
            }
        };
        Self::new(model_type, attributes)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn display_name(&self) -> &str {
        self.str_field("displayName")
            .or_else(|| self.str_field("name"))
            .unwrap_or("")
    }

    /// `None` when the record carries no access block.
    pub fn access(&self) -> Option<Access> {
        let access = self.get("access")?;
        match serde_json::from_value(access.clone()) {
            Ok(access) => Some(access),
            Err(err) => {
                log::warn!("unreadable access block on {}: {err}", self.model_type);
                None
            }
        }
    }

    /// Paths of the assigned organisation units.
    pub fn org_unit_paths(&self) -> Vec<String> {
        self.get("organisationUnits")
            .and_then(Value::as_array)
            .map(|units| {
                units
                    .iter()
                    .filter_map(|unit| unit.get("path").and_then(Value::as_str))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Column value as shown in the table.
    pub fn column_text(&self, column: &str) -> String {
        match self.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// `user` -> `users`, `category` -> `categories`.
pub fn plural(model_type: &str) -> String {
    let mut chars = model_type.chars().rev();
    match (chars.next(), chars.next()) {
        (Some('y'), Some(before)) if !"aeiou".contains(before) => {
            format!("{}ies", &model_type[..model_type.len() - 1])
        }
        _ => format!("{model_type}s"),
    }
}

/// Table columns shown for a model type when the list store does not say otherwise.
pub fn default_columns(model_type: &str) -> Vec<String> {
    let columns: &[&str] = match model_type {
        "user" => &["displayName", "username", "lastUpdated"],
        _ => &["displayName", "lastUpdated"],
    };
    columns.iter().map(|c| (*c).to_owned()).collect()
}

/// What the list store pushes.
///
/// `list == None` is the placeholder pushed before the first response arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListStoreValue {
    pub list: Option<Vec<Model>>,
    pub pager: Pager,
    pub table_columns: Vec<String>,
}

impl ListStoreValue {
    pub fn loaded(list: Vec<Model>, pager: Pager, table_columns: Vec<String>) -> Self {
        Self {
            list: Some(list),
            pager,
            table_columns,
        }
    }
}
