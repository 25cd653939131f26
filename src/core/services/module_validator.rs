//! Module validation
//!
//! Checks one module's fields, measurements and photo slots against its
//! static requirements plus whatever the cabin type activates.

use crate::core::models::{
    ConditionalItems, IssueKind, ModuleConfig, ModuleData, ModuleValidation, Schema,
    ValidationIssue,
};

use super::rules::ConditionalRuleResolver;

/// Select values that mean "Outro" (compared case-insensitively)
pub const OTHER_VALUES: [&str; 3] = ["outro", "outros", "other"];

/// Validates modules against a schema's cabin-type rules
#[derive(Debug, Clone, Copy)]
pub struct ModuleValidator<'a> {
    resolver: ConditionalRuleResolver<'a>,
    cabin_field: &'a str,
}

impl<'a> ModuleValidator<'a> {
    /// Create a validator for a schema
    #[must_use]
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            resolver: ConditionalRuleResolver::new(schema.cabin_rules()),
            cabin_field: &schema.cabin_field().field,
        }
    }

    /// Validate a module, reading the cabin type from its own data
    #[must_use]
    pub fn validate(&self, config: &ModuleConfig, data: &ModuleData) -> ModuleValidation {
        self.validate_with_cabin_type(config, data, data.field(self.cabin_field))
    }

    /// Validate a module under an inspection-wide cabin type
    #[must_use]
    pub fn validate_with_cabin_type(
        &self,
        config: &ModuleConfig,
        data: &ModuleData,
        cabin_type: Option<&str>,
    ) -> ModuleValidation {
        let conditional = self.resolver.resolve(cabin_type);
        validate_module(config, data, &conditional)
    }
}

/// Validate a module against explicit conditional requirements
///
/// Issues come out in schema declaration order: fields, then measurements,
/// then photo slots.
#[must_use]
pub fn validate_module(
    config: &ModuleConfig,
    data: &ModuleData,
    conditional: &ConditionalItems,
) -> ModuleValidation {
    let mut issues = Vec::new();

    for field in config.fields() {
        let required = field.required || conditional.fields.contains(&field.name);
        let value = data.filled(&field.name);

        if required && value.is_none() {
            issues.push(ValidationIssue::new(IssueKind::Field, &field.name, &field.label));
            continue;
        }

        // An "Outro" selection needs its free-text companion even on optional fields.
        if field.other_option
            && value.is_some_and(is_other_value)
            && data.filled(&field.other_key()).is_none()
        {
            issues.push(ValidationIssue::new(IssueKind::OtherText, &field.name, &field.label));
        }
    }

    for measurement in config.measurements() {
        let required = measurement.required || conditional.fields.contains(&measurement.name);
        if required && data.filled(&measurement.name).and_then(parse_measurement).is_none() {
            issues.push(ValidationIssue::new(
                IssueKind::Measurement,
                &measurement.name,
                &measurement.label,
            ));
        }
    }

    for photo in config.photos() {
        let required = photo.required || conditional.photos.contains(&photo.name);
        if required && data.photos(&photo.name).is_empty() {
            issues.push(ValidationIssue::new(IssueKind::Photo, &photo.name, &photo.label));
        }
    }

    ModuleValidation::from_issues(issues)
}

fn is_other_value(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    OTHER_VALUES.contains(&value.as_str())
}

/// Parse a measurement, accepting a comma decimal separator
#[must_use]
pub fn parse_measurement(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}
