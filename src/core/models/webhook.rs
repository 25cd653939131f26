//! Webhook queue items and delivery logs
//!
//! Status moves one way: `pending → processing → {done | failed}`, with
//! `failed → processing` when a scheduled retry is claimed and
//! `failed → dead` once attempts are exhausted. `done` and `dead` are terminal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery status of a queued item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    /// Waiting to be claimed
    Pending,
    /// Claimed by a dispatcher run
    Processing,
    /// Delivered
    Done,
    /// Last attempt failed, retry scheduled
    Failed,
    /// Given up
    Dead,
}

impl QueueStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [Self; 5] = [Self::Pending, Self::Processing, Self::Done, Self::Failed, Self::Dead];

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Dead)
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Dead => "dead",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Invalid queue status: {s}"))
    }
}

/// Illegal status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("item {id}: cannot move from {from} to {to}")]
pub struct QueueError {
    /// Item ID
    pub id: u64,
    /// Current status
    pub from: QueueStatus,
    /// Requested status
    pub to: QueueStatus,
}

/// How long a claim holds before another run may take the item over
///
/// A run killed between claiming and delivering leaves items `processing`;
/// once the lease runs out they are claimable again with their attempt
/// count unchanged.
pub const CLAIM_LEASE_MINUTES: i64 = 15;

/// Retry policy applied when a delivery fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before an item is dead-lettered
    pub max_attempts: u32,
    /// Backoff unit; the delay is `attempts * backoff`
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Default attempt limit
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Default backoff unit in minutes
    pub const DEFAULT_BACKOFF_MINUTES: i64 = 5;
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::minutes(Self::DEFAULT_BACKOFF_MINUTES),
        }
    }
}

/// One outbound event waiting for delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookQueueItem {
    /// Store-assigned, monotonically increasing ID
    pub id: u64,
    /// Event type, e.g. `work_order_created`
    pub event_type: String,
    /// Event payload as produced by the business operation
    pub payload: serde_json::Value,
    /// Current status
    pub status: QueueStatus,
    /// Failed delivery attempts so far
    pub attempts: u32,
    /// Higher is dequeued first
    pub priority: i32,
    /// Enqueue time
    pub created_at: DateTime<Utc>,
    /// Earliest time a failed item may be claimed again
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
    /// Last delivery error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl WebhookQueueItem {
    /// A fresh pending item
    #[must_use]
    pub fn new(
        id: u64,
        event_type: &str,
        payload: serde_json::Value,
        priority: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_type: event_type.to_string(),
            payload,
            status: QueueStatus::Pending,
            attempts: 0,
            priority,
            created_at: now,
            next_retry_at: None,
            last_error: None,
            updated_at: now,
        }
    }

    /// Whether a dispatcher may claim this item at `now`
    #[must_use]
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            QueueStatus::Pending => true,
            QueueStatus::Failed => self.next_retry_at.is_none_or(|at| at <= now),
            QueueStatus::Processing => self.claim_expired(now),
            QueueStatus::Done | QueueStatus::Dead => false,
        }
    }

    /// Whether a `processing` claim has outlived [`CLAIM_LEASE_MINUTES`]
    #[must_use]
    pub fn claim_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == QueueStatus::Processing
            && self.updated_at + Duration::minutes(CLAIM_LEASE_MINUTES) <= now
    }

    /// `pending|failed → processing`, or a takeover of an expired claim
    pub fn claim(&mut self, now: DateTime<Utc>) -> Result<(), QueueError> {
        if !self.is_claimable(now) {
            return Err(self.illegal(QueueStatus::Processing));
        }
        self.status = QueueStatus::Processing;
        self.next_retry_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// `processing → done`
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), QueueError> {
        self.require_processing(QueueStatus::Done)?;
        self.status = QueueStatus::Done;
        self.last_error = None;
        self.updated_at = now;
        Ok(())
    }

    /// `processing → failed | dead`, counting one more attempt
    ///
    /// Below the attempt limit the item is rescheduled after
    /// `attempts * backoff`; at the limit it is dead-lettered with no retry time.
    pub fn fail(
        &mut self,
        error: &str,
        policy: RetryPolicy,
        now: DateTime<Utc>,
    ) -> Result<QueueStatus, QueueError> {
        let next = if self.attempts + 1 < policy.max_attempts {
            QueueStatus::Failed
        } else {
            QueueStatus::Dead
        };
        self.require_processing(next)?;

        self.attempts += 1;
        self.last_error = Some(error.to_string());
        self.updated_at = now;
        self.status = next;
        self.next_retry_at = match next {
            QueueStatus::Failed => Some(now + policy.backoff * i32::try_from(self.attempts).unwrap_or(i32::MAX)),
            _ => None,
        };
        Ok(next)
    }

    /// `processing → dead` without counting an attempt
    pub fn bury(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), QueueError> {
        self.require_processing(QueueStatus::Dead)?;
        self.status = QueueStatus::Dead;
        self.last_error = Some(reason.to_string());
        self.next_retry_at = None;
        self.updated_at = now;
        Ok(())
    }

    fn require_processing(&self, to: QueueStatus) -> Result<(), QueueError> {
        if self.status == QueueStatus::Processing {
            Ok(())
        } else {
            Err(self.illegal(to))
        }
    }

    const fn illegal(&self, to: QueueStatus) -> QueueError {
        QueueError {
            id: self.id,
            from: self.status,
            to,
        }
    }
}

/// Append-only audit record of one delivery attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookLogEntry {
    /// Queue item, absent for test deliveries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<u64>,
    /// Event type
    pub event_type: String,
    /// Target endpoint name
    pub target: String,
    /// Attempt number (1-based)
    pub attempt: u32,
    /// Whether the delivery succeeded
    pub success: bool,
    /// Payload as sent
    pub request_payload: serde_json::Value,
    /// HTTP status, if a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<u16>,
    /// Response body, if a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    /// Error description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the attempt was made
    pub created_at: DateTime<Utc>,
}

/// Queue counts grouped by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Waiting items
    pub pending: usize,
    /// Claimed items
    pub processing: usize,
    /// Delivered items
    pub done: usize,
    /// Items awaiting retry
    pub failed: usize,
    /// Dead-lettered items
    pub dead: usize,
    /// All items
    pub total: usize,
}

impl QueueStats {
    /// Count items by status
    #[must_use]
    pub fn from_items(items: &[WebhookQueueItem]) -> Self {
        let mut stats = Self::default();
        for item in items {
            match item.status {
                QueueStatus::Pending => stats.pending += 1,
                QueueStatus::Processing => stats.processing += 1,
                QueueStatus::Done => stats.done += 1,
                QueueStatus::Failed => stats.failed += 1,
                QueueStatus::Dead => stats.dead += 1,
            }
            stats.total += 1;
        }
        stats
    }
}
