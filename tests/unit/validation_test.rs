//! Module and report validation against the built-in schema

use vistoria::core::models::{ConditionalItems, InspectionSnapshot, Schema, is_classified_message};
use vistoria::core::services::{ReportValidator, ValidationPolicy, evaluate, validate_module};

use crate::common::{complete_module, complete_rows, complete_source};

fn schema() -> Schema {
    Schema::builtin().unwrap()
}

fn snapshot(cabin_type: &str) -> InspectionSnapshot {
    let (fields, media) = complete_rows(&schema(), cabin_type);
    InspectionSnapshot::from_rows(&fields, &media)
}

// =============================================================================
// MODULE LEVEL
// =============================================================================

#[test]
fn complete_module_is_valid_for_every_config() {
    let schema = schema();
    for config in schema.modules() {
        let result = validate_module(config, &complete_module(config), &ConditionalItems::none());
        assert!(result.is_valid, "{} should be valid", config.module_type());
        assert!(result.errors().is_empty());
    }
}

#[test]
fn removing_one_required_field_yields_its_label() {
    let schema = schema();
    for config in schema.modules() {
        let complete = complete_module(config);
        for field in config.fields().iter().filter(|f| f.required) {
            let mut data = complete.clone();
            data.remove_field(&field.name);
            let result = validate_module(config, &data, &ConditionalItems::none());
            assert!(!result.is_valid);
            assert_eq!(result.errors(), vec![field.label.clone()], "{}", field.name);
        }
    }
}

#[test]
fn removing_one_required_photo_yields_its_label() {
    let schema = schema();
    for config in schema.modules() {
        let complete = complete_module(config);
        for photo in config.photos().iter().filter(|p| p.required) {
            let mut data = complete.clone();
            data.photos.remove(&photo.name);
            let result = validate_module(config, &data, &ConditionalItems::none());
            assert_eq!(result.errors(), vec![photo.label.clone()], "{}", photo.name);
        }
    }
}

#[test]
fn whitespace_value_counts_as_missing() {
    let schema = schema();
    let config = schema.module("client").unwrap();
    let mut data = complete_module(config);
    data.set_field("nome_cliente", "   ");
    let result = validate_module(config, &data, &ConditionalItems::none());
    assert_eq!(result.errors(), vec!["Nome do Cliente".to_string()]);
}

#[test]
fn other_option_requires_companion_text() {
    let schema = schema();
    let config = schema.module("transformers").unwrap();
    let mut data = complete_module(config);
    data.set_field("tipo_isolamento", "Outro");

    let result = validate_module(config, &data, &ConditionalItems::none());
    assert_eq!(result.errors(), vec!["Tipo de Isolamento (Outro)".to_string()]);

    data.set_field("tipo_isolamento_outro", "Silicone");
    assert!(validate_module(config, &data, &ConditionalItems::none()).is_valid);
}

#[test]
fn measurement_must_be_numeric() {
    let schema = schema();
    let config = schema.module("bt").unwrap();
    let mut data = complete_module(config);
    data.set_field("tensao_fase_b", "n/a");
    let result = validate_module(config, &data, &ConditionalItems::none());
    assert_eq!(result.errors(), vec!["Tensão Fase B (V)".to_string()]);
}

#[test]
fn fachada_photo_round_trip() {
    let schema = schema();
    let config = schema.module("client").unwrap();
    let mut data = complete_module(config);
    let uri = "file:///photos/fachada.jpg";

    assert!(validate_module(config, &data, &ConditionalItems::none()).is_valid);

    assert!(data.remove_photo("fachada", uri));
    let result = validate_module(config, &data, &ConditionalItems::none());
    assert_eq!(result.errors(), vec!["FOTO 1 - Fachada".to_string()]);

    // Same data, same answer.
    assert_eq!(validate_module(config, &data, &ConditionalItems::none()), result);

    data.add_photo("fachada", uri);
    assert!(validate_module(config, &data, &ConditionalItems::none()).is_valid);
}

#[test]
fn errors_follow_declaration_order() {
    let schema = schema();
    let config = schema.module("client").unwrap();
    let mut data = complete_module(config);
    data.remove_field("cidade");
    data.remove_field("nome_cliente");
    data.photos.clear();

    let errors = validate_module(config, &data, &ConditionalItems::none()).errors();
    assert_eq!(errors, vec!["Nome do Cliente", "Cidade", "FOTO 1 - Fachada"]);
}

// =============================================================================
// REPORT LEVEL
// =============================================================================

#[test]
fn complete_inspection_is_valid() {
    for cabin in ["CONVENCIONAL", "ABRIGADA", "BLINDADA", "POSTE"] {
        let result = evaluate(&schema(), &ValidationPolicy::default(), &snapshot(cabin));
        assert!(result.is_valid, "{cabin}: {:?}", result.missing_fields);
        assert!(result.can_generate());
    }
}

#[test]
fn convencional_requires_mt_module() {
    let mut data = snapshot("CONVENCIONAL");
    data.remove("mt");
    let result = evaluate(&schema(), &ValidationPolicy::default(), &data);
    assert!(result.missing_fields.contains(&"Módulo \"Média Tensão (MT)\"".to_string()));
    assert!(result.can_generate());
}

#[test]
fn poste_does_not_require_mt_module() {
    let data = snapshot("POSTE");
    assert!(!data.has_module("mt"));
    let result = evaluate(&schema(), &ValidationPolicy::default(), &data);
    assert!(!result.missing_fields.iter().any(|m| m.contains("Média Tensão")));
}

#[test]
fn unknown_cabin_type_adds_nothing() {
    let mut data = snapshot("POSTE");
    data.module_mut("client").unwrap().set_field("tipo_cabine", "SUBTERRANEA");
    assert!(evaluate(&schema(), &ValidationPolicy::default(), &data).is_valid);
}

#[test]
fn absent_module_is_reported_once() {
    let mut data = snapshot("POSTE");
    data.remove("transformers");
    let result = evaluate(&schema(), &ValidationPolicy::default(), &data);

    assert_eq!(result.missing_fields, vec!["Módulo \"Transformadores\"".to_string()]);
    assert_eq!(
        result.errors_sample,
        vec!["O módulo \"Transformadores\" é obrigatório e não foi preenchido.".to_string()]
    );
}

#[test]
fn cabin_activated_field_is_checked_in_its_module() {
    let mut data = snapshot("BLINDADA");
    data.module_mut("transformers").unwrap().remove_field("nivel_oleo");
    let result = evaluate(&schema(), &ValidationPolicy::default(), &data);
    assert_eq!(result.missing_fields, vec!["Transformadores: Nível de Óleo".to_string()]);
    assert_eq!(
        result.errors_sample,
        vec!["O campo \"Nível de Óleo\" do módulo \"Transformadores\" é obrigatório.".to_string()]
    );
}

#[test]
fn missing_authorization_is_critical() {
    let mut data = snapshot("POSTE");
    data.module_mut("client").unwrap().set_field("autorizacao", "nao");
    let result = evaluate(&schema(), &ValidationPolicy::default(), &data);
    assert!(!result.can_generate());
    assert_eq!(
        result.critical_errors,
        vec!["O campo \"Autorização do Cliente\" é obrigatório para gerar o relatório.".to_string()]
    );
    assert!(result.missing_fields.is_empty());
}

#[test]
fn missing_conclusion_is_critical_and_advisory() {
    let mut data = snapshot("POSTE");
    data.module_mut("general_state").unwrap().remove_field("conclusao");
    let result = evaluate(&schema(), &ValidationPolicy::default(), &data);
    assert_eq!(result.critical_errors.len(), 1);
    assert_eq!(result.missing_fields, vec!["Estado Geral: Conclusão".to_string()]);
}

#[test]
fn critical_checks_are_configurable() {
    let policy = ValidationPolicy {
        critical_checks: vec![],
        ..ValidationPolicy::default()
    };
    let mut data = snapshot("POSTE");
    data.module_mut("client").unwrap().remove_field("autorizacao");
    assert!(evaluate(&schema(), &policy, &data).is_valid);
}

#[test]
fn every_sample_sentence_is_classified() {
    let result = evaluate(&schema(), &ValidationPolicy::default(), &InspectionSnapshot::new());
    assert!(!result.errors_sample.is_empty());
    assert!(result.errors_sample.iter().all(|m| is_classified_message(m)));
}

#[test]
fn report_validator_reads_from_source() {
    let schema = schema();
    let policy = ValidationPolicy::default();
    let source = complete_source("insp-1", "ABRIGADA");
    let validator = ReportValidator::new(&schema, &policy, &source);

    assert!(validator.validate_final_report("insp-1").unwrap().is_valid);

    let unknown = validator.validate_final_report("insp-2").unwrap();
    assert_eq!(unknown.missing_fields.len(), 5);
    assert!(!unknown.can_generate());
}
