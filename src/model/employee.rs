//! Employee records and their nested relations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A department, designation or shift as embedded in an employee record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl NamedRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

/// A relation field as the backend sends it: expanded, a bare id or a bare name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    Expanded(NamedRef),
    Id(u64),
    Name(String),
}

impl Relation {
    /// Display name of the related object, if the backend sent one
    pub fn name(&self) -> Option<&str> {
        match self {
            Relation::Expanded(r) => r.name.as_deref(),
            Relation::Id(_) => None,
            Relation::Name(name) => Some(name),
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            Relation::Expanded(r) => r.id,
            Relation::Id(id) => Some(*id),
            Relation::Name(_) => None,
        }
    }
}

impl From<NamedRef> for Relation {
    fn from(r: NamedRef) -> Self {
        Relation::Expanded(r)
    }
}

/// Salary amounts arrive as JSON numbers or as decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

/// Wire shape of a salary structure, before amounts are parsed
#[derive(Deserialize)]
struct RawSalary {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    basic_salary: Option<RawAmount>,
    #[serde(default)]
    hra: Option<RawAmount>,
    #[serde(default)]
    special_allowance: Option<RawAmount>,
    #[serde(default)]
    conveyance_allowance: Option<RawAmount>,
    #[serde(default)]
    medical_allowance: Option<RawAmount>,
    #[serde(default)]
    effective_from: Option<String>,
}

/// Lenient decoding of loosely typed backend fields
///
/// A field of an unexpected type is treated as absent rather than failing
/// the whole record.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::Relation;

    /// Strings as is; numbers and booleans as their text
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn relation<'de, D>(deserializer: D) -> Result<Option<Relation>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Value>::deserialize(deserializer)?
            .and_then(|v| serde_json::from_value(v).ok()))
    }
}

/// One salary structure row attached to an employee
///
/// Amounts sent as text keep that text, so templates print them the way the
/// backend wrote them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSalary")]
pub struct SalaryStructure {
    pub id: Option<u64>,
    pub basic_salary: Option<f64>,
    pub hra: Option<f64>,
    pub special_allowance: Option<f64>,
    pub conveyance_allowance: Option<f64>,
    pub medical_allowance: Option<f64>,
    pub effective_from: Option<String>,
    /// Amounts that arrived as text, keyed by component name
    #[serde(skip)]
    pub written: BTreeMap<String, String>,
}

impl From<RawSalary> for SalaryStructure {
    fn from(raw: RawSalary) -> Self {
        let mut written = BTreeMap::new();
        let mut amount = |component: &str, value: Option<RawAmount>| match value? {
            RawAmount::Number(n) => Some(n),
            RawAmount::Text(s) => {
                let text = s.trim();
                let n: f64 = text.parse().ok()?;
                written.insert(component.to_string(), text.to_string());
                Some(n)
            }
        };

        let basic_salary = amount("basic_salary", raw.basic_salary);
        let hra = amount("hra", raw.hra);
        let special_allowance = amount("special_allowance", raw.special_allowance);
        let conveyance_allowance = amount("conveyance_allowance", raw.conveyance_allowance);
        let medical_allowance = amount("medical_allowance", raw.medical_allowance);

        Self {
            id: raw.id,
            basic_salary,
            hra,
            special_allowance,
            conveyance_allowance,
            medical_allowance,
            effective_from: raw.effective_from,
            written,
        }
    }
}

impl SalaryStructure {
    /// Sum of every component that is present
    pub fn gross(&self) -> f64 {
        [
            self.basic_salary,
            self.hra,
            self.special_allowance,
            self.conveyance_allowance,
            self.medical_allowance,
        ]
        .iter()
        .flatten()
        .sum()
    }

    /// A component's amount as the backend wrote it, when it arrived as text
    pub fn written(&self, component: &str) -> Option<&str> {
        self.written.get(component).map(String::as_str)
    }
}

/// An employee as returned by the employees endpoint
///
/// Fields the backend sends that are not modelled here are kept in `extra`,
/// so lookups by arbitrary key still find them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Employee {
    pub id: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub employee_code: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub father_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub date_of_joining: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub employment_type: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub blood_group: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub aadhaar_number: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub pan_number: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub uan_number: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub esic_number: Option<String>,
    #[serde(deserialize_with = "lenient::relation")]
    pub department: Option<Relation>,
    #[serde(deserialize_with = "lenient::relation")]
    pub designation: Option<Relation>,
    #[serde(deserialize_with = "lenient::relation")]
    pub shift: Option<Relation>,
    pub salaries: Option<Vec<SalaryStructure>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Employee {
    /// First and last name joined by a single space, trimmed
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// The salary structure currently in effect (the first one listed)
    pub fn current_salary(&self) -> Option<&SalaryStructure> {
        self.salaries.as_ref().and_then(|s| s.first())
    }

    pub fn department_name(&self) -> Option<&str> {
        self.department.as_ref().and_then(Relation::name)
    }

    pub fn designation_name(&self) -> Option<&str> {
        self.designation.as_ref().and_then(Relation::name)
    }

    pub fn shift_name(&self) -> Option<&str> {
        self.shift.as_ref().and_then(Relation::name)
    }

    /// Look up a field the backend sent that has no dedicated member
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Look up any field of the record by its backend name
    ///
    /// Covers modelled members (`id`, `salaries`, ...) as well as the extra
    /// fields.
    pub fn field(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.extra.get(key) {
            return Some(value.clone());
        }
        match serde_json::to_value(self) {
            Ok(Value::Object(mut record)) => record.remove(key),
            _ => None,
        }
    }

    /// Case-insensitive match over the fields shown in the employee list
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let name = self.full_name();
        let fields = [
            Some(name.as_str()),
            self.employee_code.as_deref(),
            self.email.as_deref(),
            self.department_name(),
            self.designation_name(),
        ];
        let hit = fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle));
        hit
    }
}

/// Filter a fetched employee list by a search query
pub fn filter_employees<'a>(employees: &'a [Employee], query: &str) -> Vec<&'a Employee> {
    employees.iter().filter(|e| e.matches(query)).collect()
}

/// Profile of the signed-in user, cached alongside the session token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: Option<u64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_employee() {
        let employee: Employee = serde_json::from_value(json!({
            "id": 7,
            "employee_code": "EMP-007",
            "first_name": "Amit",
            "last_name": "Kumar",
            "department": {"id": 2, "name": "Finance"},
            "designation": 4,
            "shift": null,
            "salaries": [{"basic_salary": "15000.00", "hra": 6000}],
            "marital_status": "single"
        }))
        .expect("Should deserialize");

        assert_eq!(employee.full_name(), "Amit Kumar");
        assert_eq!(employee.department_name(), Some("Finance"));
        assert_eq!(employee.designation_name(), None);
        assert_eq!(employee.designation.as_ref().and_then(Relation::id), Some(4));
        assert!(employee.shift.is_none());

        let salary = employee.current_salary().expect("Should have salary");
        assert_eq!(salary.basic_salary, Some(15000.0));
        assert_eq!(salary.hra, Some(6000.0));
        assert_eq!(
            employee.extra_field("marital_status"),
            Some(&json!("single"))
        );
    }

    #[test]
    fn test_loosely_typed_fields_decode() {
        let employee: Employee = serde_json::from_value(json!({
            "employee_code": 1042,
            "phone": 9876543210u64,
            "aadhaar_number": 123456789012u64,
            "blood_group": true,
            "address": {"line1": "MG Road"},
            "department": "Finance",
            "designation": [1, 2]
        }))
        .expect("Should deserialize");

        assert_eq!(employee.employee_code.as_deref(), Some("1042"));
        assert_eq!(employee.phone.as_deref(), Some("9876543210"));
        assert_eq!(employee.aadhaar_number.as_deref(), Some("123456789012"));
        assert_eq!(employee.blood_group.as_deref(), Some("true"));
        assert_eq!(employee.address, None);
        assert_eq!(employee.department_name(), Some("Finance"));
        assert!(employee.designation.is_none());
    }

    #[test]
    fn test_text_amounts_keep_written_form() {
        let salary: SalaryStructure = serde_json::from_value(json!({
            "basic_salary": " 15000.00 ",
            "hra": 6000,
            "special_allowance": "n/a"
        }))
        .unwrap();
        assert_eq!(salary.basic_salary, Some(15000.0));
        assert_eq!(salary.written("basic_salary"), Some("15000.00"));
        assert_eq!(salary.written("hra"), None);
        assert_eq!(salary.special_allowance, None);
        assert_eq!(salary.written("special_allowance"), None);
    }

    #[test]
    fn test_field_covers_modelled_members() {
        let employee: Employee = serde_json::from_value(json!({
            "id": 7,
            "first_name": "Amit",
            "marital_status": "single"
        }))
        .unwrap();
        assert_eq!(employee.field("id"), Some(json!(7)));
        assert_eq!(employee.field("first_name"), Some(json!("Amit")));
        assert_eq!(employee.field("marital_status"), Some(json!("single")));
        assert_eq!(employee.field("last_name"), Some(Value::Null));
        assert_eq!(employee.field("no_such_field"), None);
    }

    #[test]
    fn test_null_salaries() {
        let employee: Employee =
            serde_json::from_value(json!({"first_name": "Amit", "salaries": null})).unwrap();
        assert!(employee.current_salary().is_none());
    }

    #[test]
    fn test_blank_amount_is_absent() {
        let salary: SalaryStructure =
            serde_json::from_value(json!({"basic_salary": "", "hra": null})).unwrap();
        assert_eq!(salary.basic_salary, None);
        assert_eq!(salary.hra, None);
    }

    #[test]
    fn test_full_name_with_missing_parts() {
        let only_last = Employee {
            last_name: Some("Kumar".to_string()),
            ..Default::default()
        };
        assert_eq!(only_last.full_name(), "Kumar");
        assert_eq!(Employee::default().full_name(), "");
    }

    #[test]
    fn test_gross_sums_present_components() {
        let salary = SalaryStructure {
            basic_salary: Some(15000.0),
            hra: Some(6000.0),
            special_allowance: Some(4000.0),
            ..Default::default()
        };
        assert_eq!(salary.gross(), 25000.0);
    }

    #[test]
    fn test_filter_employees() {
        let employees = vec![
            Employee {
                first_name: Some("Amit".to_string()),
                last_name: Some("Kumar".to_string()),
                employee_code: Some("EMP-001".to_string()),
                ..Default::default()
            },
            Employee {
                first_name: Some("Priya".to_string()),
                department: Some(NamedRef::new("Sales").into()),
                ..Default::default()
            },
        ];

        assert_eq!(filter_employees(&employees, "").len(), 2);
        assert_eq!(filter_employees(&employees, "emp-001").len(), 1);
        assert_eq!(filter_employees(&employees, "SALES")[0].full_name(), "Priya");
        assert!(filter_employees(&employees, "nobody").is_empty());
    }
}
