use deskroute::config::DispatchConfig;
use deskroute::dispatch::{
    CsvOutcomeStore, DeliveryError, DispatchProfile, Notification, Notifier, OutcomeStore,
};
use deskroute::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Writes each notification to the log instead of a mail transport.
#[derive(Debug, Default, Clone)]
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification, timeout: Duration) -> Result<(), DeliveryError> {
        if !notification.recipient.contains('@') {
            return Err(DeliveryError::Rejected {
                recipient: notification.recipient.clone(),
                reason: "not a mailbox address".to_string(),
            });
        }

        info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            timeout = ?timeout,
            "notification handed to log transport"
        );
        Ok(())
    }
}

/// Trains the classifier and checks it against the configured routes.
pub(crate) fn build_profile(config: &DispatchConfig) -> Result<DispatchProfile, AppError> {
    let corpus = config.training_corpus()?;
    let profile = DispatchProfile::build(&corpus, config.routes.clone())?;
    Ok(profile)
}

pub(crate) fn open_store(config: &DispatchConfig) -> Result<CsvOutcomeStore, AppError> {
    let store = CsvOutcomeStore::new(config.store_path.clone());
    store.ensure_ready()?;
    Ok(store)
}
