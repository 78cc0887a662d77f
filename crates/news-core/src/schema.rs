use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::AppError;

/// Field name used for violations that apply to the whole document.
pub const ROOT_FIELD: &str = "(root)";

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every violation reported for one document, in validator order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Collapse the violations into a `field -> message` map.
    ///
    /// Several violations on the same field are joined with `"; "`.
    pub fn by_field(&self) -> BTreeMap<String, String> {
        let mut details: BTreeMap<String, String> = BTreeMap::new();
        for violation in &self.0 {
            details
                .entry(violation.field.clone())
                .and_modify(|existing| {
                    existing.push_str("; ");
                    existing.push_str(&violation.message);
                })
                .or_insert_with(|| violation.message.clone());
        }
        details
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Named JSON schemas, compiled once and shared by every request.
///
/// Names are free-form; the server registers its documents under their asset
/// path (e.g. `request/create_category.json`).
#[derive(Default)]
pub struct SchemaRegistry {
    validators: HashMap<String, jsonschema::Validator>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `schema` and store it under `name`, replacing any previous entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        schema: &serde_json::Value,
    ) -> Result<(), AppError> {
        let name = name.into();
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| AppError::SchemaError(format!("Invalid JSON schema {name}: {e}")))?;
        self.validators.insert(name, validator);
        Ok(())
    }

    /// Parse a raw schema document and register it.
    pub fn register_str(&mut self, name: impl Into<String>, raw: &str) -> Result<(), AppError> {
        let name = name.into();
        let schema: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| AppError::SchemaError(format!("Invalid JSON in schema {name}: {e}")))?;
        self.register(name, &schema)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Names of every registered schema, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate `instance` against the schema registered as `name`.
    ///
    /// Returns [`AppError::SchemaError`] when no such schema exists and
    /// [`AppError::SchemaValidation`] listing every violation otherwise.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), AppError> {
        let validator = self
            .validators
            .get(name)
            .ok_or_else(|| AppError::SchemaError(format!("Schema not registered: {name}")))?;

        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|error| {
                let field = field_name(&error.instance_path().to_string());
                Violation::new(field, error.to_string())
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::SchemaValidation {
                schema: name.to_string(),
                violations: violations.into(),
            })
        }
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.names())
            .finish()
    }
}

/// Turn a JSON pointer (`/tags/0`) into a dotted field name (`tags.0`).
fn field_name(pointer: &str) -> String {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        ROOT_FIELD.to_string()
    } else {
        trimmed.replace('/', ".")
    }
}
