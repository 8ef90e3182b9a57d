//! Payroll computation shown on salary screens
//!
//! Contributions follow fixed percentage and threshold rules that can be
//! overridden from the configuration file.

mod calc;
mod rules;

pub use calc::{compute, SalaryBreakdown};
pub use rules::{PayrollRules, ProvidentFund, RulesError, SalarySplit, StateInsurance};
