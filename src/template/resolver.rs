//! Field resolution - turns a field key into a value from an employee record

use std::fmt;

use serde_json::Value;

use crate::model::{Employee, SalaryStructure};

/// Field keys with a dedicated extraction rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Name,
    Department,
    Designation,
    Shift,
    BasicSalary,
    Hra,
    SpecialAllowance,
    ConveyanceAllowance,
    MedicalAllowance,
    EmployeeCode,
    FirstName,
    LastName,
    Email,
    Phone,
    Gender,
    FatherName,
    DateOfBirth,
    DateOfJoining,
    EmploymentType,
    BloodGroup,
    Address,
    AadhaarNumber,
    PanNumber,
    UanNumber,
    EsicNumber,
}

impl FieldKey {
    /// Every recognized key, in the order a variable picker lists them
    pub const ALL: &'static [FieldKey] = &[
        FieldKey::Name,
        FieldKey::EmployeeCode,
        FieldKey::FirstName,
        FieldKey::LastName,
        FieldKey::Email,
        FieldKey::Phone,
        FieldKey::Gender,
        FieldKey::FatherName,
        FieldKey::DateOfBirth,
        FieldKey::DateOfJoining,
        FieldKey::EmploymentType,
        FieldKey::BloodGroup,
        FieldKey::Address,
        FieldKey::AadhaarNumber,
        FieldKey::PanNumber,
        FieldKey::UanNumber,
        FieldKey::EsicNumber,
        FieldKey::Department,
        FieldKey::Designation,
        FieldKey::Shift,
        FieldKey::BasicSalary,
        FieldKey::Hra,
        FieldKey::SpecialAllowance,
        FieldKey::ConveyanceAllowance,
        FieldKey::MedicalAllowance,
    ];

    /// Parse a recognized key; `None` for anything else
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Department => "department",
            FieldKey::Designation => "designation",
            FieldKey::Shift => "shift",
            FieldKey::BasicSalary => "basic_salary",
            FieldKey::Hra => "hra",
            FieldKey::SpecialAllowance => "special_allowance",
            FieldKey::ConveyanceAllowance => "conveyance_allowance",
            FieldKey::MedicalAllowance => "medical_allowance",
            FieldKey::EmployeeCode => "employee_code",
            FieldKey::FirstName => "first_name",
            FieldKey::LastName => "last_name",
            FieldKey::Email => "email",
            FieldKey::Phone => "phone",
            FieldKey::Gender => "gender",
            FieldKey::FatherName => "father_name",
            FieldKey::DateOfBirth => "date_of_birth",
            FieldKey::DateOfJoining => "date_of_joining",
            FieldKey::EmploymentType => "employment_type",
            FieldKey::BloodGroup => "blood_group",
            FieldKey::Address => "address",
            FieldKey::AadhaarNumber => "aadhaar_number",
            FieldKey::PanNumber => "pan_number",
            FieldKey::UanNumber => "uan_number",
            FieldKey::EsicNumber => "esic_number",
        }
    }

    /// Whether the key reads from the employee's current salary structure
    pub fn is_salary(self) -> bool {
        matches!(
            self,
            FieldKey::BasicSalary
                | FieldKey::Hra
                | FieldKey::SpecialAllowance
                | FieldKey::ConveyanceAllowance
                | FieldKey::MedicalAllowance
        )
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved field, before it is turned into template text
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Empty,
    Text(String),
    Amount(f64),
    Json(Value),
}

impl FieldValue {
    fn text(value: Option<&str>) -> Self {
        match value {
            Some(s) => FieldValue::Text(s.to_string()),
            None => FieldValue::Empty,
        }
    }

    fn amount(value: Option<f64>) -> Self {
        match value {
            Some(n) => FieldValue::Amount(n),
            None => FieldValue::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Amount(_) => false,
            FieldValue::Json(v) => v.is_null(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Amount(n) => write_number(f, *n),
            FieldValue::Json(Value::Null) => Ok(()),
            FieldValue::Json(Value::String(s)) => f.write_str(s),
            FieldValue::Json(Value::Number(n)) => match n.as_f64() {
                Some(x) if n.is_f64() => write_number(f, x),
                _ => write!(f, "{}", n),
            },
            FieldValue::Json(other) => write!(f, "{}", other),
        }
    }
}

/// Whole amounts print without a fractional part
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

/// Resolve a field key against an employee record
///
/// Unknown keys are looked up directly on the record by name, extra fields
/// included. Missing data yields [`FieldValue::Empty`].
pub fn resolve_field(key: &str, employee: &Employee) -> FieldValue {
    match FieldKey::parse(key) {
        Some(known) => resolve_known(known, employee),
        None => employee
            .field(key)
            .map(FieldValue::Json)
            .unwrap_or(FieldValue::Empty),
    }
}

fn resolve_known(key: FieldKey, e: &Employee) -> FieldValue {
    if key.is_salary() {
        return match e.current_salary() {
            Some(salary) => match salary.written(key.as_str()) {
                Some(text) => FieldValue::Text(text.to_string()),
                None => FieldValue::amount(salary_component(key, salary)),
            },
            None => FieldValue::Empty,
        };
    }

    match key {
        FieldKey::Name => FieldValue::Text(e.full_name()),
        FieldKey::Department => FieldValue::text(e.department_name()),
        FieldKey::Designation => FieldValue::text(e.designation_name()),
        FieldKey::Shift => FieldValue::text(e.shift_name()),
        FieldKey::EmployeeCode => FieldValue::text(e.employee_code.as_deref()),
        FieldKey::FirstName => FieldValue::text(e.first_name.as_deref()),
        FieldKey::LastName => FieldValue::text(e.last_name.as_deref()),
        FieldKey::Email => FieldValue::text(e.email.as_deref()),
        FieldKey::Phone => FieldValue::text(e.phone.as_deref()),
        FieldKey::Gender => FieldValue::text(e.gender.as_deref()),
        FieldKey::FatherName => FieldValue::text(e.father_name.as_deref()),
        FieldKey::DateOfBirth => FieldValue::text(e.date_of_birth.as_deref()),
        FieldKey::DateOfJoining => FieldValue::text(e.date_of_joining.as_deref()),
        FieldKey::EmploymentType => FieldValue::text(e.employment_type.as_deref()),
        FieldKey::BloodGroup => FieldValue::text(e.blood_group.as_deref()),
        FieldKey::Address => FieldValue::text(e.address.as_deref()),
        FieldKey::AadhaarNumber => FieldValue::text(e.aadhaar_number.as_deref()),
        FieldKey::PanNumber => FieldValue::text(e.pan_number.as_deref()),
        FieldKey::UanNumber => FieldValue::text(e.uan_number.as_deref()),
        FieldKey::EsicNumber => FieldValue::text(e.esic_number.as_deref()),
        // salary keys returned above
        _ => FieldValue::Empty,
    }
}

fn salary_component(key: FieldKey, salary: &SalaryStructure) -> Option<f64> {
    match key {
        FieldKey::BasicSalary => salary.basic_salary,
        FieldKey::Hra => salary.hra,
        FieldKey::SpecialAllowance => salary.special_allowance,
        FieldKey::ConveyanceAllowance => salary.conveyance_allowance,
        FieldKey::MedicalAllowance => salary.medical_allowance,
        _ => None,
    }
}
