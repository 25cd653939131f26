//! Domain events
//!
//! Business operations enqueue their webhook events explicitly through
//! [`EventPublisher`] rather than relying on a storage-level trigger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::queue::WebhookQueue;
use crate::core::models::WebhookTarget;

/// Work-order priority as understood by the work-order system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOrderPriority {
    /// `urgent` or `high`
    High,
    /// `normal`, and anything unrecognised
    Medium,
    /// `low`
    Low,
}

impl WorkOrderPriority {
    /// Map an inspection priority label
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "urgent" | "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }

    /// Destination label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Queue priority for the event
    #[must_use]
    pub const fn queue_priority(self) -> i32 {
        match self {
            Self::High => 5,
            Self::Medium => 3,
            Self::Low => 1,
        }
    }
}

/// An event that can be enqueued for webhook delivery
pub trait DomainEvent: Serialize {
    /// Queue event type
    const EVENT_TYPE: &'static str;

    /// Queue priority
    fn priority(&self) -> i32;
}

/// A work order was opened for an inspection fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderCreated {
    /// Work-order number
    pub os_number: String,
    /// Inspection ID
    pub inspection_id: String,
    /// Fault the work order addresses
    #[serde(default)]
    pub fault_id: Option<String>,
    /// What must be done
    pub description: String,
    /// Inspection priority label (`urgent`, `high`, `normal`, `low`)
    pub priority: String,
    /// Estimated cost
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    /// Assignee
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl DomainEvent for WorkOrderCreated {
    const EVENT_TYPE: &'static str = "work_order_created";

    fn priority(&self) -> i32 {
        WorkOrderPriority::from_label(&self.priority).queue_priority()
    }
}

/// A corrective action with high criticality was registered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectiveActionHighCriticality {
    /// Fault ID
    pub fault_id: String,
    /// Inspection ID
    pub inspection_id: String,
    /// Fault description
    pub descricao: String,
    /// Criticality label
    pub criticidade: String,
    /// Estimated cost
    #[serde(default)]
    pub custo_estimado: Option<f64>,
    /// Photos taken before the action
    #[serde(default)]
    pub fotos_antes: u32,
    /// Photos taken after the action
    #[serde(default)]
    pub fotos_depois: u32,
    /// Person responsible
    #[serde(default)]
    pub responsavel: Option<String>,
    /// Detection time
    pub data_deteccao: DateTime<Utc>,
}

impl DomainEvent for CorrectiveActionHighCriticality {
    const EVENT_TYPE: &'static str = "corrective_action_high_criticality";

    fn priority(&self) -> i32 {
        8
    }
}

/// The estimated cost of a corrective action changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectiveActionCostChanged {
    /// Fault ID
    pub fault_id: String,
    /// Inspection ID
    pub inspection_id: String,
    /// Fault description
    pub descricao: String,
    /// Criticality label
    pub criticidade: String,
    /// Cost before the change
    #[serde(default)]
    pub custo_estimado_anterior: Option<f64>,
    /// Cost after the change
    #[serde(default)]
    pub custo_estimado_novo: Option<f64>,
    /// What caused the change (e.g. `update`)
    pub event_trigger: String,
    /// Person responsible
    #[serde(default)]
    pub responsavel: Option<String>,
    /// Detection time
    pub data_deteccao: DateTime<Utc>,
    /// Corrective action status
    pub status: String,
}

impl CorrectiveActionCostChanged {
    /// Whether the estimate actually moved
    #[must_use]
    pub fn cost_changed(&self) -> bool {
        match (self.custo_estimado_anterior, self.custo_estimado_novo) {
            (Some(old), Some(new)) => (old - new).abs() > f64::EPSILON,
            (None, None) => false,
            _ => true,
        }
    }
}

impl DomainEvent for CorrectiveActionCostChanged {
    const EVENT_TYPE: &'static str = "corrective_action_cost_changed";

    fn priority(&self) -> i32 {
        2
    }
}

/// Enqueues domain events on behalf of business operations
#[derive(Debug)]
pub struct EventPublisher<'a> {
    queue: &'a WebhookQueue<'a>,
}

impl<'a> EventPublisher<'a> {
    /// Create a publisher over a queue
    #[must_use]
    pub const fn new(queue: &'a WebhookQueue<'a>) -> Self {
        Self { queue }
    }

    /// Enqueue an event at its default priority
    pub fn publish<E: DomainEvent>(&self, event: &E) -> anyhow::Result<u64> {
        let payload = serde_json::to_value(event)?;
        self.queue.enqueue(E::EVENT_TYPE, payload, event.priority())
    }

    /// Enqueue a cost change, skipping updates that leave the cost unchanged
    pub fn publish_cost_change(
        &self,
        event: &CorrectiveActionCostChanged,
    ) -> anyhow::Result<Option<u64>> {
        if !event.cost_changed() {
            return Ok(None);
        }
        self.publish(event).map(Some)
    }
}

/// Default queue priority for a raw event
///
/// Used when an event arrives as plain JSON rather than a typed event.
#[must_use]
pub fn default_priority(event_type: &str, payload: &serde_json::Value) -> i32 {
    match event_type {
        "work_order_created" => WorkOrderPriority::from_label(
            payload.get("priority").and_then(serde_json::Value::as_str).unwrap_or_default(),
        )
        .queue_priority(),
        "corrective_action_high_criticality" => 8,
        "corrective_action_cost_changed" => 2,
        _ => 0,
    }
}

/// Sample payload for a test delivery to a target
#[must_use]
pub fn sample_payload(target: WebhookTarget) -> serde_json::Value {
    let now = Utc::now();
    let value = match target {
        WebhookTarget::WorkOrder => serde_json::to_value(WorkOrderCreated {
            os_number: "OS-TESTE-001".to_string(),
            inspection_id: "teste".to_string(),
            fault_id: None,
            description: "Ordem de serviço de teste".to_string(),
            priority: "normal".to_string(),
            estimated_cost: None,
            assigned_to: None,
            created_at: now,
        }),
        WebhookTarget::Notification => serde_json::to_value(CorrectiveActionHighCriticality {
            fault_id: "teste".to_string(),
            inspection_id: "teste".to_string(),
            descricao: "Notificação de teste".to_string(),
            criticidade: "alta".to_string(),
            custo_estimado: None,
            fotos_antes: 0,
            fotos_depois: 0,
            responsavel: None,
            data_deteccao: now,
        }),
        WebhookTarget::CostTracking => serde_json::to_value(CorrectiveActionCostChanged {
            fault_id: "teste".to_string(),
            inspection_id: "teste".to_string(),
            descricao: "Alteração de custo de teste".to_string(),
            criticidade: "media".to_string(),
            custo_estimado_anterior: Some(100.0),
            custo_estimado_novo: Some(150.0),
            event_trigger: "test".to_string(),
            responsavel: None,
            data_deteccao: now,
            status: "open".to_string(),
        }),
    };
    value.unwrap_or_default()
}
