//! Document templates and the variables their placeholders refer to

use serde::{Deserialize, Serialize};

/// Whether a template or variable is offered to users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn is_active(self) -> bool {
        self == Status::Active
    }
}

/// A stored document template (offer letters, salary slips, notices)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentTemplate {
    pub id: Option<u64>,
    pub title: String,
    pub subject: String,
    /// HTML with `{{Name}}` placeholders
    pub body: String,
    pub status: Status,
    pub updated_at: Option<String>,
}

/// Maps a placeholder name to a field key of the employee record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariable {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub status: Status,
}

impl TemplateVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            value: value.into(),
            status: Status::Active,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}
