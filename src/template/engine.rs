//! Variable substitution - renders template bodies for one employee

use crate::model::{DocumentTemplate, Employee, TemplateVariable};

use super::lexer::{segments, Segment};
use super::registry::VariableRegistry;
use super::resolver::resolve_field;

/// A template rendered for one employee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub subject: String,
    pub body: String,
}

/// Render a template body for an employee
///
/// Without a body the result is empty; without an employee the body is
/// returned unchanged. Each `{{name}}` with a matching variable is replaced by
/// the resolved field, every other placeholder is kept as written. When two
/// variables share a name the later one wins.
pub fn render(
    body: Option<&str>,
    variables: &[TemplateVariable],
    employee: Option<&Employee>,
) -> String {
    let Some(body) = body else {
        return String::new();
    };
    match employee {
        Some(employee) => {
            render_with(body, &VariableRegistry::from_definitions(variables), employee)
        }
        None => body.to_string(),
    }
}

/// Render a body against a prepared registry
///
/// Substituted values are written out as-is and never scanned for further
/// placeholders.
pub fn render_with(body: &str, registry: &VariableRegistry, employee: &Employee) -> String {
    let mut out = String::with_capacity(body.len());
    for segment in segments(body) {
        match segment {
            Segment::Placeholder { name, raw } => match registry.field(name) {
                Some(field) => out.push_str(&resolve_field(field, employee).to_string()),
                None => out.push_str(raw),
            },
            Segment::Text(text) => out.push_str(text),
        }
    }
    out
}

/// Placeholder names in order of appearance, repeats included
pub fn placeholders(body: &str) -> Vec<&str> {
    segments(body)
        .filter_map(|s| match s {
            Segment::Placeholder { name, .. } => Some(name),
            Segment::Text(_) => None,
        })
        .collect()
}

/// Placeholder names with no variable definition, first occurrence only
pub fn unresolved_placeholders<'a>(body: &'a str, registry: &VariableRegistry) -> Vec<&'a str> {
    let mut missing: Vec<&str> = Vec::new();
    for name in placeholders(body) {
        if !registry.contains(name) && !missing.contains(&name) {
            missing.push(name);
        }
    }
    missing
}

/// The token an editor inserts for a variable
pub fn placeholder(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

impl DocumentTemplate {
    /// Render subject and body for an employee
    pub fn render(&self, registry: &VariableRegistry, employee: &Employee) -> RenderedDocument {
        for name in unresolved_placeholders(&self.body, registry) {
            tracing::debug!(template = %self.title, placeholder = name, "no variable for placeholder");
        }

        RenderedDocument {
            subject: render_with(&self.subject, registry, employee),
            body: render_with(&self.body, registry, employee),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SalaryStructure;

    fn amit() -> Employee {
        Employee {
            first_name: Some("Amit".to_string()),
            last_name: Some("Kumar".to_string()),
            salaries: Some(vec![SalaryStructure {
                basic_salary: Some(15000.0),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_body_renders_empty() {
        assert_eq!(render(None, &[], Some(&amit())), "");
    }

    #[test]
    fn test_absent_employee_is_identity() {
        let vars = [TemplateVariable::new("EmpName", "name")];
        assert_eq!(render(Some("Hi {{EmpName}}"), &vars, None), "Hi {{EmpName}}");
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let vars = [TemplateVariable::new("N", "first_name")];
        let out = render(Some("{{N}}/{{N}}/{{N}}"), &vars, Some(&amit()));
        assert_eq!(out, "Amit/Amit/Amit");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let vars = [TemplateVariable::new("N", "first_name")];
        let out = render(Some("{{N}} {{n}}"), &vars, Some(&amit()));
        assert_eq!(out, "Amit {{n}}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut employee = amit();
        employee.first_name = Some("{{Last}}".to_string());
        let vars = [
            TemplateVariable::new("First", "first_name"),
            TemplateVariable::new("Last", "last_name"),
        ];
        let out = render(Some("{{First}} {{Last}}"), &vars, Some(&employee));
        assert_eq!(out, "{{Last}} Kumar");
    }

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(placeholders("{{B}} {{A}} {{B}}"), vec!["B", "A", "B"]);
        assert!(placeholders("no tokens").is_empty());
    }

    #[test]
    fn test_unresolved_placeholders_deduplicated() {
        let registry =
            VariableRegistry::from_definitions(&[TemplateVariable::new("A", "name")]);
        assert_eq!(
            unresolved_placeholders("{{A}} {{X}} {{Y}} {{X}}", &registry),
            vec!["X", "Y"]
        );
    }

    #[test]
    fn test_placeholder_token() {
        assert_eq!(placeholder("EmpName"), "{{EmpName}}");
    }

    #[test]
    fn test_document_renders_subject_and_body() {
        let template = DocumentTemplate {
            title: "Slip".to_string(),
            subject: "Salary slip for {{EmpName}}".to_string(),
            body: "<p>Basic: {{Basic}}</p>".to_string(),
            ..Default::default()
        };
        let registry = VariableRegistry::from_definitions(&[
            TemplateVariable::new("EmpName", "name"),
            TemplateVariable::new("Basic", "basic_salary"),
        ]);

        let doc = template.render(&registry, &amit());
        assert_eq!(doc.subject, "Salary slip for Amit Kumar");
        assert_eq!(doc.body, "<p>Basic: 15000</p>");
    }
}
