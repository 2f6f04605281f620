//! Request classification and dispatch.
//!
//! A request is validated, its body classified into a department, a notification sent to
//! that department's recipient (best effort), and one outcome record appended to the
//! store (mandatory).

pub mod classifier;
pub mod domain;
pub mod intake;
pub mod normalizer;
pub mod profile;
pub mod repository;
pub mod router;
pub mod routing;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use classifier::corpus::{default_corpus, load_corpus, load_corpus_from_path, CorpusError};
pub use classifier::{DepartmentClassifier, LabelScore};
pub use domain::{
    DeliveryStatus, DepartmentLabel, IncomingRequest, OutcomeRecord, TrainingExample,
    UnknownDepartment,
};
pub use intake::{validate_request, ValidationError};
pub use normalizer::normalize;
pub use profile::{ClassificationPreview, ConfigurationError, DispatchProfile, Route};
pub use repository::{DeliveryError, Notification, Notifier, OutcomeStore, StoreError};
pub use router::dispatch_router;
pub use routing::RoutingTable;
pub use service::{
    DispatchError, DispatchReceipt, DispatchService, DispatchSettings, DispatchStage,
    DispatchStatus, DispatchView, DEFAULT_NOTIFY_TIMEOUT,
};
pub use store::CsvOutcomeStore;
