//! Field schemas and validated request data
//!
//! Each registered path declares the fields it accepts. Incoming data is
//! checked against that declaration and converted into a typed request
//! struct before a handler runs, so handlers never inspect raw JSON.

use serde_json::{Map, Value};
use std::collections::HashMap;

use vaultmock_core::BackendError;

/// Raw client-supplied fields (query parameters or JSON body)
pub type RequestData = Map<String, Value>;

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Bool,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
        }
    }
}

/// Declaration of a single field accepted by a path
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSchema {
    pub const fn new(name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        Self {
            name,
            field_type,
            required: false,
            description,
        }
    }

    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::String, description)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A field value after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Bool(bool),
}

/// Validated fields for one request
#[derive(Debug, Clone, Default)]
pub struct FieldData {
    values: HashMap<&'static str, FieldValue>,
}

impl FieldData {
    /// Validate `raw` and the pattern `captures` against `schemas`.
    ///
    /// Captures take precedence over body fields of the same name. Fields
    /// not declared in the schema are ignored; `null` counts as absent.
    pub fn validate(
        schemas: &[FieldSchema],
        raw: &RequestData,
        captures: &HashMap<String, String>,
    ) -> Result<Self, BackendError> {
        let mut values = HashMap::with_capacity(schemas.len());

        for schema in schemas {
            let value = match captures.get(schema.name) {
                Some(captured) => Some(coerce(schema, &Value::String(captured.clone()))?),
                None => match raw.get(schema.name) {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(coerce(schema, value)?),
                },
            };

            match value {
                Some(value) => {
                    values.insert(schema.name, value);
                }
                None if schema.required => {
                    return Err(BackendError::invalid_argument(format!(
                        "missing required field '{}'",
                        schema.name
                    )));
                }
                None => {}
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(FieldValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    fn require_str(&self, name: &str) -> Result<String, BackendError> {
        self.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| BackendError::invalid_argument(format!("missing required field '{name}'")))
    }
}

fn coerce(schema: &FieldSchema, value: &Value) -> Result<FieldValue, BackendError> {
    let coerced = match (schema.field_type, value) {
        (FieldType::String, Value::String(s)) => Some(FieldValue::String(s.clone())),
        (FieldType::String, Value::Number(n)) => Some(FieldValue::String(n.to_string())),
        (FieldType::String, Value::Bool(b)) => Some(FieldValue::String(b.to_string())),
        (FieldType::Int, Value::Number(n)) => n.as_i64().map(FieldValue::Int),
        (FieldType::Int, Value::String(s)) => s.trim().parse().ok().map(FieldValue::Int),
        (FieldType::Bool, Value::Bool(b)) => Some(FieldValue::Bool(*b)),
        (FieldType::Bool, Value::String(s)) => s.trim().parse().ok().map(FieldValue::Bool),
        _ => None,
    };

    coerced.ok_or_else(|| {
        BackendError::invalid_argument(format!(
            "field '{}' must be of type {}",
            schema.name,
            schema.field_type.name()
        ))
    })
}

// === Typed requests ===

/// `account` read and create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRequest {
    pub account_id: String,
}

impl TryFrom<&FieldData> for AccountRequest {
    type Error = BackendError;

    fn try_from(data: &FieldData) -> Result<Self, Self::Error> {
        Ok(Self {
            account_id: data.require_str("accountId")?,
        })
    }
}

/// `sign` read; `message` defaults to empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    pub message: String,
    pub account_id: String,
}

impl TryFrom<&FieldData> for SignRequest {
    type Error = BackendError;

    fn try_from(data: &FieldData) -> Result<Self, Self::Error> {
        Ok(Self {
            message: data.get_str("message").unwrap_or_default().to_string(),
            account_id: data.require_str("accountId")?,
        })
    }
}

/// Wildcard read and delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    pub path: String,
}

impl TryFrom<&FieldData> for PathRequest {
    type Error = BackendError;

    fn try_from(data: &FieldData) -> Result<Self, Self::Error> {
        Ok(Self {
            path: data.require_str("path")?,
        })
    }
}

/// Wildcard create and update; `accountId` defaults to empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathWriteRequest {
    pub path: String,
    pub account_id: String,
}

impl TryFrom<&FieldData> for PathWriteRequest {
    type Error = BackendError;

    fn try_from(data: &FieldData) -> Result<Self, Self::Error> {
        Ok(Self {
            path: data.require_str("path")?,
            account_id: data.get_str("accountId").unwrap_or_default().to_string(),
        })
    }
}

/// Listing the caller's entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListRequest {
    pub limit: Option<usize>,
}

impl TryFrom<&FieldData> for ListRequest {
    type Error = BackendError;

    fn try_from(data: &FieldData) -> Result<Self, Self::Error> {
        let limit = match data.get_int("limit") {
            Some(limit) => Some(usize::try_from(limit).map_err(|_| {
                BackendError::invalid_argument("field 'limit' must not be negative")
            })?),
            None => None,
        };
        Ok(Self { limit })
    }
}
