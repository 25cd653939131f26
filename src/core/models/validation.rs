//! Validation results
//!
//! Results are transient: recomputed on demand, never persisted.
//!
//! Report-level sentences follow a fixed prefix convention so the UI can
//! group them without parsing free text: every sentence starts with
//! `O campo`, `A foto`, `O módulo` or `Por favor` and contains `obrigatório`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static CLASSIFIED_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(O campo|A foto|O módulo|Por favor)").expect("message prefix pattern is valid")
});

/// Whether a report sentence follows the prefix convention
#[must_use]
pub fn is_classified_message(message: &str) -> bool {
    CLASSIFIED_MESSAGE.is_match(message) && message.contains("obrigatório")
}

/// What kind of requirement an issue is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Required field absent or blank
    Field,
    /// "Outro" selected with a blank companion text
    OtherText,
    /// Required photo slot empty
    Photo,
    /// Required measurement absent or not a number
    Measurement,
}

/// One unmet requirement inside a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Requirement kind
    pub kind: IssueKind,
    /// Field, slot or measurement name
    pub name: String,
    /// Label as declared in the schema
    pub label: String,
}

impl ValidationIssue {
    /// Create an issue
    #[must_use]
    pub fn new(kind: IssueKind, name: &str, label: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            label: label.to_string(),
        }
    }

    /// Report-level sentence for this issue
    #[must_use]
    pub fn sentence(&self, module_display: &str) -> String {
        match self.kind {
            IssueKind::Field | IssueKind::OtherText => {
                format!("O campo \"{self}\" do módulo \"{module_display}\" é obrigatório.")
            },
            IssueKind::Photo => {
                format!(
                    "A foto \"{}\" do módulo \"{module_display}\" é um registro obrigatório.",
                    self.label
                )
            },
            IssueKind::Measurement => {
                format!(
                    "Por favor, informe \"{}\" no módulo \"{module_display}\": preenchimento obrigatório.",
                    self.label
                )
            },
        }
    }
}

/// Module-level message: the label itself, or `<label> (Outro)`
impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::OtherText => write!(f, "{} (Outro)", self.label),
            _ => f.write_str(&self.label),
        }
    }
}

/// Result of validating one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleValidation {
    /// Whether every requirement is met
    pub is_valid: bool,
    /// Unmet requirements in declaration order
    pub issues: Vec<ValidationIssue>,
}

impl ModuleValidation {
    /// Build from collected issues
    #[must_use]
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }

    /// Error strings, one per issue
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

/// Message added to `missing_fields` for an absent module
#[must_use]
pub fn missing_module_entry(module_display: &str) -> String {
    format!("Módulo \"{module_display}\"")
}

/// Sentence added to `errors_sample` for an absent module
#[must_use]
pub fn missing_module_sentence(module_display: &str) -> String {
    format!("O módulo \"{module_display}\" é obrigatório e não foi preenchido.")
}

/// Sentence for a failed critical check
#[must_use]
pub fn critical_sentence(label: &str) -> String {
    format!("O campo \"{label}\" é obrigatório para gerar o relatório.")
}

/// Result of validating a whole inspection for report generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportValidation {
    /// No critical errors and no missing items
    pub is_valid: bool,
    /// Short identifiers of every missing item
    pub missing_fields: Vec<String>,
    /// User-facing sentences for advisory gaps
    pub errors_sample: Vec<String>,
    /// Gaps that block report generation outright
    pub critical_errors: Vec<String>,
}

impl ReportValidation {
    /// Build and compute validity
    #[must_use]
    pub fn new(
        missing_fields: Vec<String>,
        errors_sample: Vec<String>,
        critical_errors: Vec<String>,
    ) -> Self {
        Self {
            is_valid: critical_errors.is_empty() && missing_fields.is_empty(),
            missing_fields,
            errors_sample,
            critical_errors,
        }
    }

    /// Whether a report may be generated (advisory gaps do not block)
    #[must_use]
    pub fn can_generate(&self) -> bool {
        self.critical_errors.is_empty()
    }
}
