//! Salary auto-calculation

use serde::Serialize;

use crate::model::SalaryStructure;

use super::rules::PayrollRules;

/// Contributions and net pay for one salary structure
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalaryBreakdown {
    pub gross: f64,
    pub basic: f64,
    /// Basic pay the PF rates were applied to
    pub pf_wage: f64,
    pub pf_employee: f64,
    pub pf_employer: f64,
    pub esic_applicable: bool,
    pub esic_employee: f64,
    pub esic_employer: f64,
    pub total_deductions: f64,
    pub net_pay: f64,
}

fn percent(amount: f64, rate: f64) -> f64 {
    (amount * rate / 100.0).round()
}

fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Compute PF and ESIC contributions for a salary structure
///
/// Contributions are rounded to whole rupees.
pub fn compute(salary: &SalaryStructure, rules: &PayrollRules) -> SalaryBreakdown {
    let gross = round2(salary.gross());
    let basic = salary.basic_salary.unwrap_or(0.0);

    let pf_wage = if rules.pf.cap_at_ceiling {
        basic.min(rules.pf.wage_ceiling)
    } else {
        basic
    };
    let pf_employee = percent(pf_wage, rules.pf.employee_rate);
    let pf_employer = percent(pf_wage, rules.pf.employer_rate);

    let esic_applicable = gross > 0.0 && gross <= rules.esic.gross_threshold;
    let (esic_employee, esic_employer) = if esic_applicable {
        (
            percent(gross, rules.esic.employee_rate),
            percent(gross, rules.esic.employer_rate),
        )
    } else {
        (0.0, 0.0)
    };

    let total_deductions = pf_employee + esic_employee;

    SalaryBreakdown {
        gross,
        basic,
        pf_wage,
        pf_employee,
        pf_employer,
        esic_applicable,
        esic_employee,
        esic_employer,
        total_deductions,
        net_pay: round2(gross - total_deductions),
    }
}

impl SalaryStructure {
    /// Split a gross monthly amount into basic, HRA and special allowance
    pub fn auto_split(gross: f64, rules: &PayrollRules) -> Self {
        let basic = round2(gross * rules.split.basic_percent / 100.0);
        let hra = round2(basic * rules.split.hra_percent_of_basic / 100.0);
        let special = round2((gross - basic - hra).max(0.0));

        Self {
            basic_salary: Some(basic),
            hra: Some(hra),
            special_allowance: Some(special),
            ..Default::default()
        }
    }
}
