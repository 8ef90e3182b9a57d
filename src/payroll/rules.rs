//! Statutory contribution rules (PF and ESIC) and the salary split

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("{field} must be a percentage between 0 and 100, got {value}")]
    Percentage { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

/// Provident Fund, charged on basic pay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidentFund {
    pub employee_rate: f64,
    pub employer_rate: f64,
    pub wage_ceiling: f64,
    /// Charge on at most `wage_ceiling` of basic pay
    pub cap_at_ceiling: bool,
}

impl Default for ProvidentFund {
    fn default() -> Self {
        Self {
            employee_rate: 12.0,
            employer_rate: 12.0,
            wage_ceiling: 15000.0,
            cap_at_ceiling: true,
        }
    }
}

/// Employee State Insurance, charged on gross pay up to a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateInsurance {
    pub employee_rate: f64,
    pub employer_rate: f64,
    pub gross_threshold: f64,
}

impl Default for StateInsurance {
    fn default() -> Self {
        Self {
            employee_rate: 0.75,
            employer_rate: 3.25,
            gross_threshold: 21000.0,
        }
    }
}

/// How a gross amount is split into components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalarySplit {
    pub basic_percent: f64,
    pub hra_percent_of_basic: f64,
}

impl Default for SalarySplit {
    fn default() -> Self {
        Self {
            basic_percent: 50.0,
            hra_percent_of_basic: 40.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollRules {
    pub pf: ProvidentFund,
    pub esic: StateInsurance,
    pub split: SalarySplit,
}

impl PayrollRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        let percentages = [
            ("pf.employee_rate", self.pf.employee_rate),
            ("pf.employer_rate", self.pf.employer_rate),
            ("esic.employee_rate", self.esic.employee_rate),
            ("esic.employer_rate", self.esic.employer_rate),
            ("split.basic_percent", self.split.basic_percent),
            ("split.hra_percent_of_basic", self.split.hra_percent_of_basic),
        ];
        for (field, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(RulesError::Percentage { field, value });
            }
        }

        for (field, value) in [
            ("pf.wage_ceiling", self.pf.wage_ceiling),
            ("esic.gross_threshold", self.esic.gross_threshold),
        ] {
            if value < 0.0 {
                return Err(RulesError::Negative { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_valid() {
        assert_eq!(PayrollRules::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let rules: PayrollRules = toml::from_str(
            r#"
[esic]
gross_threshold = 25000
"#,
        )
        .expect("Should parse");
        assert_eq!(rules.esic.gross_threshold, 25000.0);
        assert_eq!(rules.esic.employee_rate, 0.75);
        assert_eq!(rules.pf, ProvidentFund::default());
    }

    #[test]
    fn test_out_of_range_rate() {
        let mut rules = PayrollRules::default();
        rules.pf.employee_rate = 120.0;
        assert!(matches!(
            rules.validate(),
            Err(RulesError::Percentage {
                field: "pf.employee_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_threshold() {
        let mut rules = PayrollRules::default();
        rules.esic.gross_threshold = -1.0;
        assert!(matches!(rules.validate(), Err(RulesError::Negative { .. })));
    }
}
