//! Webhook targets and their endpoint configuration

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// External system receiving webhooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookTarget {
    /// Work-order management system
    WorkOrder,
    /// Notification / alerting system
    Notification,
    /// Cost-tracking system
    CostTracking,
}

impl WebhookTarget {
    /// All targets
    pub const ALL: [Self; 3] = [Self::WorkOrder, Self::Notification, Self::CostTracking];

    /// Configuration key
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WorkOrder => "work_order",
            Self::Notification => "notification",
            Self::CostTracking => "cost_tracking",
        }
    }

    /// Target for an event type; unknown types go to notifications
    #[must_use]
    pub fn for_event(event_type: &str) -> Self {
        match event_type {
            "work_order_created" => Self::WorkOrder,
            "corrective_action_cost_changed" => Self::CostTracking,
            _ => Self::Notification,
        }
    }

    /// Event type used for test deliveries to this target
    #[must_use]
    pub const fn sample_event_type(self) -> &'static str {
        match self {
            Self::WorkOrder => "work_order_created",
            Self::Notification => "corrective_action_high_criticality",
            Self::CostTracking => "corrective_action_cost_changed",
        }
    }
}

impl fmt::Display for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WebhookTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.name() == key)
            .ok_or_else(|| {
                format!("Unknown webhook: {s}. Use 'work_order', 'notification' or 'cost_tracking'")
            })
    }
}

/// URL and credentials of one endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Target URL
    #[serde(default)]
    pub url: String,
    /// Sent as `Authorization: Bearer <api_key>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Extra headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl EndpointConfig {
    /// Endpoint without credentials
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    /// Set the bearer token
    #[must_use]
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }
}

/// Endpoint configuration per target
///
/// A target with no entry, or with a blank URL, is "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEndpoints {
    /// Work-order system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order: Option<EndpointConfig>,
    /// Notification system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<EndpointConfig>,
    /// Cost-tracking system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_tracking: Option<EndpointConfig>,
}

impl WebhookEndpoints {
    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, target: WebhookTarget, endpoint: EndpointConfig) -> Self {
        *self.slot_mut(target) = Some(endpoint);
        self
    }

    /// Configured endpoint of a target
    #[must_use]
    pub fn get(&self, target: WebhookTarget) -> Option<&EndpointConfig> {
        let slot = match target {
            WebhookTarget::WorkOrder => &self.work_order,
            WebhookTarget::Notification => &self.notification,
            WebhookTarget::CostTracking => &self.cost_tracking,
        };
        slot.as_ref().filter(|e| !e.url.trim().is_empty())
    }

    /// Presence of each target, without exposing secrets
    #[must_use]
    pub fn presence(&self) -> BTreeMap<&'static str, bool> {
        WebhookTarget::ALL.into_iter().map(|t| (t.name(), self.get(t).is_some())).collect()
    }

    fn slot_mut(&mut self, target: WebhookTarget) -> &mut Option<EndpointConfig> {
        match target {
            WebhookTarget::WorkOrder => &mut self.work_order,
            WebhookTarget::Notification => &mut self.notification,
            WebhookTarget::CostTracking => &mut self.cost_tracking,
        }
    }
}
