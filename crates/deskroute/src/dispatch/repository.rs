use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::domain::{DepartmentLabel, IncomingRequest, OutcomeRecord};

/// Durable append-only log of processed requests.
pub trait OutcomeStore: Send + Sync {
    /// Confirms the backing storage exists and accepts writes.
    fn ensure_ready(&self) -> Result<(), StoreError>;
    fn append(&self, record: OutcomeRecord) -> Result<(), StoreError>;
    /// Records for one requester, newest first, at most `limit` of them.
    fn history(&self, requester_id: &str, limit: usize) -> Result<Vec<OutcomeRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("outcome store unavailable: {0}")]
    Unavailable(String),
    #[error("outcome store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("outcome store encoding failure: {0}")]
    Csv(#[from] csv::Error),
}

/// Outbound notification transport (mail relay, webhook, chat adapter).
pub trait Notifier: Send + Sync {
    /// Sends one notification. Implementations must give up once `timeout` elapses.
    fn send(&self, notification: &Notification, timeout: Duration) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn for_request(
        request: &IncomingRequest,
        department: DepartmentLabel,
        recipient: &str,
    ) -> Self {
        let subject = format!(
            "[{}] New request from {} ({})",
            department, request.requester_name, request.requester_id
        );
        let body = format!(
            "Requester: {}\nID: {}\nDepartment: {}\nYear: {}\n\n{}\n",
            request.requester_name,
            request.requester_id,
            request.claimed_department,
            request.year,
            request.body
        );

        Self {
            recipient: recipient.to_string(),
            subject,
            body,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification timed out after {0:?}")]
    TimedOut(Duration),
    #[error("recipient {recipient} rejected notification: {reason}")]
    Rejected { recipient: String, reason: String },
}
