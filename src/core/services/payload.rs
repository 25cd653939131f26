//! Destination payload shapes
//!
//! Each external system expects its own field names. Queue items keep the
//! payload as the business operation produced it; this module renames and
//! reshapes it right before delivery.

use serde_json::{Value, json};

use super::events::WorkOrderPriority;

/// Reshape a queued payload for its destination
///
/// Unknown event types pass through unchanged.
#[must_use]
pub fn transform_payload(event_type: &str, payload: &Value) -> Value {
    match event_type {
        "work_order_created" => work_order(payload),
        "corrective_action_high_criticality" => high_criticality(payload),
        "corrective_action_cost_changed" => cost_changed(payload),
        _ => payload.clone(),
    }
}

fn get(payload: &Value, key: &str) -> Value {
    payload.get(key).cloned().unwrap_or(Value::Null)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn work_order(payload: &Value) -> Value {
    let os_number = get_str(payload, "os_number");
    let priority = WorkOrderPriority::from_label(get_str(payload, "priority"));
    json!({
        "external_id": os_number,
        "title": format!("OS {os_number}"),
        "description": get(payload, "description"),
        "priority": priority.as_str(),
        "estimated_cost": get(payload, "estimated_cost"),
        "assignee": get(payload, "assigned_to"),
        "source": "inspection",
        "reference": {
            "inspection_id": get(payload, "inspection_id"),
            "fault_id": get(payload, "fault_id"),
        },
        "created_at": get(payload, "created_at"),
    })
}

fn high_criticality(payload: &Value) -> Value {
    let criticality = get_str(payload, "criticidade");
    json!({
        "type": "alert",
        "severity": criticality,
        "title": format!("Ação corretiva de criticidade {criticality}"),
        "message": get(payload, "descricao"),
        "inspection_id": get(payload, "inspection_id"),
        "fault_id": get(payload, "fault_id"),
        "estimated_cost": get(payload, "custo_estimado"),
        "photos": {
            "before": payload.get("fotos_antes").and_then(Value::as_u64).unwrap_or(0),
            "after": payload.get("fotos_depois").and_then(Value::as_u64).unwrap_or(0),
        },
        "responsible": get(payload, "responsavel"),
        "detected_at": get(payload, "data_deteccao"),
    })
}

fn cost_changed(payload: &Value) -> Value {
    let previous = payload.get("custo_estimado_anterior").and_then(Value::as_f64);
    let new = payload.get("custo_estimado_novo").and_then(Value::as_f64);
    let delta = previous.zip(new).map(|(old, new)| new - old);
    json!({
        "fault_id": get(payload, "fault_id"),
        "inspection_id": get(payload, "inspection_id"),
        "description": get(payload, "descricao"),
        "criticality": get(payload, "criticidade"),
        "previous_cost": previous,
        "new_cost": new,
        "delta": delta,
        "trigger": get(payload, "event_trigger"),
        "responsible": get(payload, "responsavel"),
        "detected_at": get(payload, "data_deteccao"),
        "status": get(payload, "status"),
    })
}
