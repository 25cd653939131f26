//! Final report validation
//!
//! Aggregates every module of an inspection and decides whether a final
//! report can be generated.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::models::{
    InspectionSnapshot, ReportValidation, Schema, SchemaError, critical_sentence,
    missing_module_entry, missing_module_sentence,
};
use crate::core::ports::InspectionDataSource;

use super::module_validator::ModuleValidator;
use super::rules::ConditionalRuleResolver;

/// Values accepted as "yes" for a flag check
const TRUTHY: [&str; 4] = ["true", "sim", "yes", "1"];

/// How a critical check inspects its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalKind {
    /// Must hold a truthy value
    Flag,
    /// Must be non-blank
    Text,
}

/// A field whose absence blocks report generation outright
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalCheck {
    /// Module holding the field
    pub module: String,
    /// Field name
    pub field: String,
    /// Check kind
    pub kind: CriticalKind,
    /// Label used in the error sentence
    pub label: String,
}

impl CriticalCheck {
    /// Create a critical check
    #[must_use]
    pub fn new(module: &str, field: &str, kind: CriticalKind, label: &str) -> Self {
        Self {
            module: module.to_string(),
            field: field.to_string(),
            kind,
            label: label.to_string(),
        }
    }

    fn passes(&self, snapshot: &InspectionSnapshot) -> bool {
        let value = snapshot.field(&self.module, &self.field).map(str::trim).unwrap_or_default();
        match self.kind {
            CriticalKind::Flag => TRUTHY.contains(&value.to_lowercase().as_str()),
            CriticalKind::Text => !value.is_empty(),
        }
    }
}

/// Which modules are mandatory and which checks are critical
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Modules every inspection must contain
    #[serde(default = "default_required_modules")]
    pub required_modules: Vec<String>,
    /// Checks that block report generation
    #[serde(default = "default_critical_checks")]
    pub critical_checks: Vec<CriticalCheck>,
}

fn default_required_modules() -> Vec<String> {
    ["client", "transformers", "cabin_type", "bt", "general_state"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_critical_checks() -> Vec<CriticalCheck> {
    vec![
        CriticalCheck::new("client", "autorizacao", CriticalKind::Flag, "Autorização do Cliente"),
        CriticalCheck::new("general_state", "conclusao", CriticalKind::Text, "Conclusão"),
    ]
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            required_modules: default_required_modules(),
            critical_checks: default_critical_checks(),
        }
    }
}

impl ValidationPolicy {
    /// Reject references to modules the schema does not declare
    pub fn check_against(&self, schema: &Schema) -> Result<(), SchemaError> {
        let required = self.required_modules.iter().map(|m| ("required_modules", m));
        let critical = self.critical_checks.iter().map(|c| ("critical_checks", &c.module));
        for (context, module) in required.chain(critical) {
            if schema.module(module).is_none() {
                return Err(SchemaError::UnknownModule {
                    context: context.to_string(),
                    module: module.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Validates inspections for final report generation
pub struct ReportValidator<'a> {
    schema: &'a Schema,
    policy: &'a ValidationPolicy,
    source: &'a dyn InspectionDataSource,
}

impl std::fmt::Debug for ReportValidator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportValidator")
            .field("modules", &self.schema.modules().len())
            .field("policy", self.policy)
            .finish_non_exhaustive()
    }
}

impl<'a> ReportValidator<'a> {
    /// Create a validator reading from a data source
    #[must_use]
    pub fn new(
        schema: &'a Schema,
        policy: &'a ValidationPolicy,
        source: &'a dyn InspectionDataSource,
    ) -> Self {
        Self {
            schema,
            policy,
            source,
        }
    }

    /// Load an inspection and validate it
    ///
    /// Only storage failures are errors; missing data is reported in the result.
    pub fn validate_final_report(&self, inspection_id: &str) -> anyhow::Result<ReportValidation> {
        let snapshot = self.source.snapshot(inspection_id)?;
        let result = evaluate(self.schema, self.policy, &snapshot);
        debug!(
            "Validated inspection {inspection_id}: {} missing, {} critical",
            result.missing_fields.len(),
            result.critical_errors.len()
        );
        Ok(result)
    }
}

/// Validate an already-loaded inspection
#[must_use]
pub fn evaluate(
    schema: &Schema,
    policy: &ValidationPolicy,
    snapshot: &InspectionSnapshot,
) -> ReportValidation {
    let cabin = schema.cabin_field();
    let cabin_type = snapshot.field(&cabin.module, &cabin.field);
    let conditional = ConditionalRuleResolver::new(schema.cabin_rules()).resolve(cabin_type);

    let mut missing_fields = Vec::new();
    let mut errors_sample = Vec::new();

    // Base list first, then cabin-activated modules, without duplicates.
    let mut required: Vec<&str> = Vec::new();
    let extra = conditional.modules.iter().map(String::as_str);
    for module in policy.required_modules.iter().map(String::as_str).chain(extra) {
        if !required.contains(&module) {
            required.push(module);
        }
    }

    for module in &required {
        if !snapshot.has_module(module) {
            let display = schema.display_name(module);
            missing_fields.push(missing_module_entry(display));
            errors_sample.push(missing_module_sentence(display));
        }
    }

    let validator = ModuleValidator::new(schema);
    for config in schema.modules() {
        let Some(data) = snapshot.module(config.module_type()) else {
            continue;
        };
        let result = validator.validate_with_cabin_type(config, data, cabin_type);
        for issue in &result.issues {
            missing_fields.push(format!("{}: {issue}", config.display_name()));
            errors_sample.push(issue.sentence(config.display_name()));
        }
    }

    for module in snapshot.module_types() {
        if schema.module(module).is_none() {
            debug!("Ignoring data for unknown module '{module}'");
        }
    }

    let critical_errors = policy
        .critical_checks
        .iter()
        .filter(|check| !check.passes(snapshot))
        .map(|check| critical_sentence(&check.label))
        .collect();

    ReportValidation::new(missing_fields, errors_sample, critical_errors)
}
