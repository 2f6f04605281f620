use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::domain::{DeliveryStatus, DepartmentLabel, IncomingRequest, OutcomeRecord};
use super::intake::{validate_request, ValidationError};
use super::profile::{ClassificationPreview, DispatchProfile};
use super::repository::{DeliveryError, Notification, Notifier, OutcomeStore, StoreError};

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-process knobs for the notification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub notify_timeout: Duration,
    /// When off, no notification is attempted and records carry `NotAttempted`.
    pub notifications_enabled: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            notifications_enabled: true,
        }
    }
}

/// Lifecycle of a single request through the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStage {
    Received,
    Validated,
    Classified,
    NotifyAttempted,
    Persisted,
    Success,
    PartialFailure,
    Rejected,
    NotRecorded,
}

impl DispatchStage {
    pub fn label(&self) -> &'static str {
        match self {
            DispatchStage::Received => "received",
            DispatchStage::Validated => "validated",
            DispatchStage::Classified => "classified",
            DispatchStage::NotifyAttempted => "notify_attempted",
            DispatchStage::Persisted => "persisted",
            DispatchStage::Success => "success",
            DispatchStage::PartialFailure => "partial_failure",
            DispatchStage::Rejected => "rejected",
            DispatchStage::NotRecorded => "not_recorded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchStage::Success
                | DispatchStage::PartialFailure
                | DispatchStage::Rejected
                | DispatchStage::NotRecorded
        )
    }
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller-facing summary of how a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    DeliveredAndRecorded,
    RecordedNotDelivered,
    RejectedValidation,
    FatalNotRecorded,
}

impl DispatchStatus {
    pub fn derive(result: &Result<DispatchReceipt, DispatchError>) -> Self {
        match result {
            Ok(receipt) => receipt.status(),
            Err(err) => err.status(),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DispatchStatus::DeliveredAndRecorded => "delivered and recorded",
            DispatchStatus::RecordedNotDelivered => "recorded but not delivered",
            DispatchStatus::RejectedValidation => "rejected: validation",
            DispatchStatus::FatalNotRecorded => "fatal: not recorded",
        }
    }
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// What the caller gets back for a request that was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub record: OutcomeRecord,
    pub recipient: String,
    /// `Success` or `PartialFailure`.
    pub stage: DispatchStage,
}

impl DispatchReceipt {
    pub fn status(&self) -> DispatchStatus {
        match self.record.delivery_status {
            DeliveryStatus::Delivered => DispatchStatus::DeliveredAndRecorded,
            DeliveryStatus::Failed | DeliveryStatus::NotAttempted => {
                DispatchStatus::RecordedNotDelivered
            }
        }
    }

    pub fn view(&self) -> DispatchView {
        let status = self.status();
        DispatchView {
            status,
            message: status.message(),
            predicted_department: self.record.predicted_department,
            recipient: self.recipient.clone(),
            delivery_status: self.record.delivery_status,
            recorded_at: self.record.recorded_at,
        }
    }
}

/// Serializable projection of a receipt for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchView {
    pub status: DispatchStatus,
    pub message: &'static str,
    pub predicted_department: DepartmentLabel,
    pub recipient: String,
    pub delivery_status: DeliveryStatus,
    pub recorded_at: DateTime<Utc>,
}

/// Request-level failures. Delivery problems never show up here.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request was not recorded: {0}")]
    Store(#[from] StoreError),
}

impl DispatchError {
    pub fn status(&self) -> DispatchStatus {
        match self {
            DispatchError::Validation(_) => DispatchStatus::RejectedValidation,
            DispatchError::Store(_) => DispatchStatus::FatalNotRecorded,
        }
    }

    pub fn stage(&self) -> DispatchStage {
        match self {
            DispatchError::Validation(_) => DispatchStage::Rejected,
            DispatchError::Store(_) => DispatchStage::NotRecorded,
        }
    }
}

/// Coordinates classification, notification, and recording for one request at a time.
///
/// Holds no per-request state; the profile is shared read-only across calls.
pub struct DispatchService<S, N> {
    profile: Arc<DispatchProfile>,
    store: Arc<S>,
    notifier: Arc<N>,
    settings: DispatchSettings,
}

impl<S, N> DispatchService<S, N>
where
    S: OutcomeStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(profile: Arc<DispatchProfile>, store: Arc<S>, notifier: Arc<N>) -> Self {
        Self::with_settings(profile, store, notifier, DispatchSettings::default())
    }

    pub fn with_settings(
        profile: Arc<DispatchProfile>,
        store: Arc<S>,
        notifier: Arc<N>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            profile,
            store,
            notifier,
            settings,
        }
    }

    pub fn profile(&self) -> &DispatchProfile {
        &self.profile
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Run one request to a terminal stage.
    ///
    /// Notification happens before persistence so the record reflects a finished attempt.
    /// A failed or timed-out notification is folded into the record. A failed append is
    /// returned as [`DispatchError::Store`].
    pub fn dispatch(&self, request: IncomingRequest) -> Result<DispatchReceipt, DispatchError> {
        debug!(stage = %DispatchStage::Received, requester_id = %request.requester_id, "request received");

        if let Err(err) = validate_request(&request) {
            info!(stage = %DispatchStage::Rejected, error = %err, "request rejected");
            return Err(err.into());
        }
        debug!(stage = %DispatchStage::Validated, "request validated");

        let route = self.profile.route(&request.body);
        let department = route.department;
        let recipient = route.recipient.to_string();
        debug!(stage = %DispatchStage::Classified, %department, %recipient, "request classified");

        let delivery_status = self.notify(&request, department, &recipient);
        debug!(stage = %DispatchStage::NotifyAttempted, %delivery_status, "notification step finished");

        let record = OutcomeRecord::new(request, department, delivery_status, Utc::now());
        if let Err(err) = self.store.append(record.clone()) {
            error!(
                stage = %DispatchStage::NotRecorded,
                requester_id = %record.requester_id,
                %delivery_status,
                error = %err,
                "outcome record could not be persisted"
            );
            return Err(DispatchError::Store(err));
        }
        debug!(stage = %DispatchStage::Persisted, "outcome recorded");

        let stage = match delivery_status {
            DeliveryStatus::Delivered => DispatchStage::Success,
            DeliveryStatus::Failed | DeliveryStatus::NotAttempted => DispatchStage::PartialFailure,
        };
        info!(
            %stage,
            %department,
            %delivery_status,
            requester_id = %record.requester_id,
            "request dispatched"
        );

        Ok(DispatchReceipt {
            record,
            recipient,
            stage,
        })
    }

    /// Classify without notifying or recording anything.
    pub fn classify(&self, text: &str) -> ClassificationPreview {
        self.profile.preview(text)
    }

    pub fn history(
        &self,
        requester_id: &str,
        limit: usize,
    ) -> Result<Vec<OutcomeRecord>, StoreError> {
        self.store.history(requester_id, limit)
    }

    /// One send attempt, bounded by `notify_timeout`.
    ///
    /// The send runs on its own thread. When the bound passes first the attempt counts as
    /// failed and whatever the transport reports later is discarded.
    fn notify(
        &self,
        request: &IncomingRequest,
        department: DepartmentLabel,
        recipient: &str,
    ) -> DeliveryStatus {
        if !self.settings.notifications_enabled {
            return DeliveryStatus::NotAttempted;
        }

        let notification = Notification::for_request(request, department, recipient);
        match self.send_within_timeout(notification) {
            Ok(()) => DeliveryStatus::Delivered,
            Err(err) => {
                warn!(%recipient, error = %err, "notification delivery failed");
                DeliveryStatus::Failed
            }
        }
    }

    fn send_within_timeout(&self, notification: Notification) -> Result<(), DeliveryError> {
        let timeout = self.settings.notify_timeout;
        let notifier = Arc::clone(&self.notifier);
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("dispatch-notify".to_string())
            .spawn(move || {
                // receiver is gone once the timeout fired
                let _ = tx.send(notifier.send(&notification, timeout));
            })
            .map_err(|err| DeliveryError::Transport(format!("could not start send: {err}")))?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(DeliveryError::TimedOut(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(DeliveryError::Transport(
                "notifier stopped without reporting a result".to_string(),
            )),
        }
    }
}
