//! Template variable substitution for documents and salary slips
//!
//! Template bodies are HTML containing `{{Name}}` placeholders. Each stored
//! variable maps a placeholder name to a field key, and rendering resolves
//! those keys against one employee record.
//!
//! # Example
//!
//! ```rust
//! use hrdesk::model::{Employee, TemplateVariable};
//! use hrdesk::template::render;
//!
//! let employee = Employee {
//!     first_name: Some("Amit".to_string()),
//!     last_name: Some("Kumar".to_string()),
//!     ..Default::default()
//! };
//! let vars = [TemplateVariable::new("EmpName", "name")];
//!
//! let html = render(Some("<p>Dear {{EmpName}}</p>"), &vars, Some(&employee));
//! assert_eq!(html, "<p>Dear Amit Kumar</p>");
//! ```

mod engine;
pub mod lexer;
mod registry;
mod resolver;

pub use engine::{
    placeholder, placeholders, render, render_with, unresolved_placeholders, RenderedDocument,
};
pub use registry::{TemplateError, VariableRegistry};
pub use resolver::{resolve_field, FieldKey, FieldValue};
