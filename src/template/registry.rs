//! Variable registry mapping placeholder names to field keys

use std::collections::HashMap;

use thiserror::Error;

use crate::model::TemplateVariable;

/// Errors that can occur while registering variables
#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    /// Two definitions share a placeholder name
    #[error("duplicate variable definition: {name}")]
    Duplicate { name: String },

    /// A variable has an empty placeholder name
    #[error("variable with field '{value}' has an empty name")]
    EmptyName { value: String },

    /// A name with braces can never appear inside `{{...}}`
    #[error("variable name '{name}' cannot contain braces")]
    BraceInName { name: String },
}

/// Placeholder name to field key mapping, built once before substitution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableRegistry {
    fields: HashMap<String, String>,
}

impl VariableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a variable list; a later definition of a name replaces an earlier one
    pub fn from_definitions(variables: &[TemplateVariable]) -> Self {
        let mut registry = Self::new();
        for var in variables {
            registry.define(&var.name, &var.value);
        }
        registry
    }

    /// Build from the active variables only
    pub fn from_active(variables: &[TemplateVariable]) -> Self {
        let mut registry = Self::new();
        for var in variables.iter().filter(|v| v.status.is_active()) {
            registry.define(&var.name, &var.value);
        }
        registry
    }

    /// Build from a variable list, rejecting duplicate, empty and unmatchable names
    pub fn strict(variables: &[TemplateVariable]) -> Result<Self, TemplateError> {
        let mut registry = Self::new();
        for var in variables {
            if var.name.is_empty() {
                return Err(TemplateError::EmptyName {
                    value: var.value.clone(),
                });
            }
            if var.name.contains(['{', '}']) {
                return Err(TemplateError::BraceInName {
                    name: var.name.clone(),
                });
            }
            if registry.contains(&var.name) {
                return Err(TemplateError::Duplicate {
                    name: var.name.clone(),
                });
            }
            registry.define(&var.name, &var.value);
        }
        Ok(registry)
    }

    /// Define or redefine a placeholder name
    pub fn define(&mut self, name: &str, field: &str) {
        if let Some(previous) = self.fields.insert(name.to_string(), field.to_string()) {
            if previous != field {
                tracing::debug!(
                    variable = name,
                    replaced = %previous,
                    field,
                    "variable redefined, later definition wins"
                );
            }
        }
    }

    /// Field key bound to a placeholder name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
