//! hrdesk - the logic behind an HR administration console
//!
//! This library renders document and salary-slip templates for employees,
//! previews attendance CSV uploads, tracks attendance corrections, computes
//! PF/ESIC contributions and talks to the HR backend.
//!
//! # Example
//!
//! ```rust
//! use hrdesk::{render_document, DocumentTemplate, Employee, TemplateVariable, VariablePolicy};
//!
//! let template = DocumentTemplate {
//!     subject: "Welcome {{EmpName}}".to_string(),
//!     body: "<p>Dear {{EmpName}}</p>".to_string(),
//!     ..Default::default()
//! };
//! let employee = Employee {
//!     first_name: Some("Amit".to_string()),
//!     last_name: Some("Kumar".to_string()),
//!     ..Default::default()
//! };
//! let vars = [TemplateVariable::new("EmpName", "name")];
//!
//! let doc = render_document(&template, &vars, Some(&employee), VariablePolicy::LastWins).unwrap();
//! assert_eq!(doc.subject, "Welcome Amit Kumar");
//! ```

pub mod api;
pub mod attendance;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod payroll;
pub mod session;
pub mod template;

pub use attendance::{parse_upload, AttendancePreview, CsvMode, RowStatus, UploadOptions};
pub use config::{AppConfig, ConfigError};
pub use error::CsvError;
pub use model::{DocumentTemplate, Employee, TemplateVariable};
pub use session::{LogoutEvent, LogoutReason, Session, SessionManager};
pub use template::{render, RenderedDocument, TemplateError, VariableRegistry};

/// How a variable list becomes a registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariablePolicy {
    /// Every variable counts; a repeated name takes the later definition
    #[default]
    LastWins,
    /// Like `LastWins`, ignoring inactive variables
    ActiveOnly,
    /// Repeated or empty names are an error
    Strict,
}

impl VariablePolicy {
    pub fn registry(self, variables: &[TemplateVariable]) -> Result<VariableRegistry, TemplateError> {
        match self {
            VariablePolicy::LastWins => Ok(VariableRegistry::from_definitions(variables)),
            VariablePolicy::ActiveOnly => Ok(VariableRegistry::from_active(variables)),
            VariablePolicy::Strict => VariableRegistry::strict(variables),
        }
    }
}

/// Render a template's subject and body for an employee
///
/// Without an employee both parts come back unchanged.
pub fn render_document(
    template: &DocumentTemplate,
    variables: &[TemplateVariable],
    employee: Option<&Employee>,
    policy: VariablePolicy,
) -> Result<RenderedDocument, TemplateError> {
    let registry = policy.registry(variables)?;
    Ok(match employee {
        Some(employee) => template.render(&registry, employee),
        None => RenderedDocument {
            subject: template.subject.clone(),
            body: template.body.clone(),
        },
    })
}
