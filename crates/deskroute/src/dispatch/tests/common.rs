use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::dispatch::classifier::corpus::default_corpus;
use crate::dispatch::domain::{IncomingRequest, OutcomeRecord};
use crate::dispatch::profile::DispatchProfile;
use crate::dispatch::repository::{
    DeliveryError, Notification, Notifier, OutcomeStore, StoreError,
};
use crate::dispatch::routing::RoutingTable;
use crate::dispatch::service::{DispatchService, DispatchSettings};
use crate::dispatch::dispatch_router;

pub(super) fn routing() -> RoutingTable {
    RoutingTable::with_domain("university.example")
}

pub(super) fn profile() -> Arc<DispatchProfile> {
    Arc::new(DispatchProfile::build(&default_corpus(), routing()).expect("profile builds"))
}

pub(super) fn request(body: &str) -> IncomingRequest {
    IncomingRequest {
        requester_name: "Asha Rao".to_string(),
        requester_id: "CS21-044".to_string(),
        claimed_department: "Computer Science".to_string(),
        year: "3".to_string(),
        body: body.to_string(),
    }
}

pub(super) fn leave_request() -> IncomingRequest {
    request("Respected Sir, requesting leave due to health issues. Thanking you")
}

pub(super) fn service_with<S, N>(store: Arc<S>, notifier: Arc<N>) -> DispatchService<S, N>
where
    S: OutcomeStore + 'static,
    N: Notifier + 'static,
{
    DispatchService::with_settings(
        profile(),
        store,
        notifier,
        DispatchSettings {
            notify_timeout: Duration::from_secs(5),
            notifications_enabled: true,
        },
    )
}

pub(super) fn build_service() -> (
    DispatchService<MemoryStore, MemoryNotifier>,
    Arc<MemoryStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = service_with(store.clone(), notifier.clone());
    (service, store, notifier)
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<Vec<OutcomeRecord>>>,
}

impl MemoryStore {
    pub(super) fn records(&self) -> Vec<OutcomeRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl OutcomeStore for MemoryStore {
    fn ensure_ready(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn append(&self, record: OutcomeRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record);
        Ok(())
    }

    fn history(&self, requester_id: &str, limit: usize) -> Result<Vec<OutcomeRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut records: Vec<OutcomeRecord> = guard
            .iter()
            .filter(|record| record.requester_id == requester_id)
            .cloned()
            .collect();
        records.reverse();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records.truncate(limit);
        Ok(records)
    }
}

pub(super) struct UnavailableStore;

impl OutcomeStore for UnavailableStore {
    fn ensure_ready(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn append(&self, _record: OutcomeRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn history(&self, _requester_id: &str, _limit: usize) -> Result<Vec<OutcomeRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    sent: Arc<Mutex<Vec<(Notification, Duration)>>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<(Notification, Duration)> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, notification: &Notification, timeout: Duration) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push((notification.clone(), timeout));
        Ok(())
    }
}

/// Counts attempts and fails every one of them.
#[derive(Default, Clone)]
pub(super) struct FailingNotifier {
    attempts: Arc<Mutex<usize>>,
}

impl FailingNotifier {
    pub(super) fn attempts(&self) -> usize {
        *self.attempts.lock().expect("notifier mutex poisoned")
    }
}

impl Notifier for FailingNotifier {
    fn send(&self, _notification: &Notification, timeout: Duration) -> Result<(), DeliveryError> {
        *self.attempts.lock().expect("notifier mutex poisoned") += 1;
        Err(DeliveryError::TimedOut(timeout))
    }
}

/// Succeeds, but only after `delay`.
#[derive(Clone)]
pub(super) struct SlowNotifier {
    pub(super) delay: Duration,
}

impl Notifier for SlowNotifier {
    fn send(&self, _notification: &Notification, _timeout: Duration) -> Result<(), DeliveryError> {
        std::thread::sleep(self.delay);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service<S, N>(service: DispatchService<S, N>) -> axum::Router
where
    S: OutcomeStore + 'static,
    N: Notifier + 'static,
{
    dispatch_router(Arc::new(service))
}
