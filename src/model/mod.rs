//! Records exchanged with the HR backend
//!
//! These mirror the JSON shapes the REST endpoints return. They are held as
//! read-only copies: fetched on demand and replaced wholesale on refetch.

pub mod attendance;
pub mod employee;
pub mod template;

pub use attendance::{AttendanceRecord, AttendanceStatus, Correction, CorrectionEntry, Punch};
pub use employee::{filter_employees, Employee, NamedRef, Relation, SalaryStructure, UserProfile};
pub use template::{DocumentTemplate, Status, TemplateVariable};
