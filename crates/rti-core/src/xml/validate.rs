//! Shallow structural checks on generated documents.
//!
//! This is not schema validation: it only catches documents that are
//! obviously incomplete before they are sent.

use serde::{Deserialize, Serialize};

use super::FPS_NAMESPACE;

pub const MISSING_DECLARATION: &str = "Missing XML declaration";
pub const MISSING_EMPLOYEE: &str = "FPS must contain at least one Employee element";

/// Outcome of [`validate_xml`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check for the XML declaration and, in FPS documents, at least one
/// `Employee` element.
pub fn validate_xml(xml: &str) -> ValidationResult {
    let mut errors = Vec::new();

    if !xml.trim_start().starts_with("<?xml") {
        errors.push(MISSING_DECLARATION.to_string());
    }

    let is_fps = xml.contains(FPS_NAMESPACE) || xml.contains("<FullPaymentSubmission");
    if is_fps && !has_element(xml, "Employee") {
        errors.push(MISSING_EMPLOYEE.to_string());
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

/// `<tag>`, `<tag ...>` or `<tag/>`, not a longer tag sharing the prefix.
fn has_element(xml: &str, tag: &str) -> bool {
    let open = format!("<{}", tag);
    xml.match_indices(&open).any(|(i, _)| {
        matches!(
            xml[i + open.len()..].chars().next(),
            Some('>') | Some('/') | Some(' ') | Some('\t') | Some('\n') | Some('\r')
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_declaration() {
        let result = validate_xml("<IRenvelope></IRenvelope>");
        assert!(!result.valid);
        assert_eq!(result.errors, vec![MISSING_DECLARATION.to_string()]);
    }

    #[test]
    fn test_non_fps_needs_no_employee() {
        let result = validate_xml(
            "<?xml version=\"1.0\"?>\n<IRenvelope><EmployerPaymentSummary/></IRenvelope>",
        );
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_employee_prefix_tags_do_not_count() {
        let xml = "<?xml version=\"1.0\"?><FullPaymentSubmission><EmployeeDetails/></FullPaymentSubmission>";
        let result = validate_xml(xml);
        assert!(!result.valid);
        assert!(result.errors[0].contains("Employee"));
    }

    #[test]
    fn test_has_element_variants() {
        assert!(has_element("<Employee>", "Employee"));
        assert!(has_element("<Employee id=\"1\">", "Employee"));
        assert!(has_element("<Employee/>", "Employee"));
        assert!(!has_element("<Employees>", "Employee"));
        assert!(!has_element("<Employee", "Employee"));
    }
}
