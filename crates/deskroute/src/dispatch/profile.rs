use serde::Serialize;
use tracing::info;

use super::classifier::{DepartmentClassifier, LabelScore};
use super::domain::{DepartmentLabel, TrainingExample};
use super::routing::RoutingTable;

/// Startup-time configuration defects. Any of these stops the process from serving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("training corpus is empty")]
    EmptyCorpus,
    #[error("routing table expects {0} but no training example covers it")]
    UntrainedLabel(DepartmentLabel),
    #[error("classifier can predict {0} but the routing table has no recipient for it")]
    UnroutedLabel(DepartmentLabel),
    #[error("recipient for {0} is blank")]
    BlankRecipient(DepartmentLabel),
}

/// Department chosen for a text together with its recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route<'a> {
    pub department: DepartmentLabel,
    pub recipient: &'a str,
}

/// Side-effect free classification answer.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationPreview {
    pub predicted_department: DepartmentLabel,
    pub recipient: String,
    pub scores: Vec<LabelScore>,
}

/// Trained classifier plus the routing table it was checked against.
///
/// Built once at startup and never mutated; share it behind an `Arc`. It is released with
/// the last handle at shutdown.
#[derive(Debug, Clone)]
pub struct DispatchProfile {
    classifier: DepartmentClassifier,
    routing: RoutingTable,
    /// Aligned with `classifier.labels()`.
    recipients: Vec<String>,
}

impl DispatchProfile {
    pub fn build(
        corpus: &[TrainingExample],
        routing: RoutingTable,
    ) -> Result<Self, ConfigurationError> {
        if let Some((label, _)) = routing
            .entries()
            .find(|(_, recipient)| recipient.trim().is_empty())
        {
            return Err(ConfigurationError::BlankRecipient(label));
        }

        let classifier = DepartmentClassifier::train(corpus)?;

        if let Some(label) = routing.labels().find(|label| !classifier.covers(*label)) {
            return Err(ConfigurationError::UntrainedLabel(label));
        }

        let recipients = classifier
            .labels()
            .iter()
            .map(|&label| {
                routing
                    .resolve(label)
                    .map(|recipient| recipient.trim().to_string())
                    .ok_or(ConfigurationError::UnroutedLabel(label))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            labels = classifier.labels().len(),
            vocabulary = classifier.vocabulary_size(),
            examples = corpus.len(),
            "dispatch profile built"
        );

        Ok(Self {
            classifier,
            routing,
            recipients,
        })
    }

    pub fn classifier(&self) -> &DepartmentClassifier {
        &self.classifier
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    /// Classifies `text` and resolves its recipient. Total once the profile is built.
    pub fn route(&self, text: &str) -> Route<'_> {
        let index = self.classifier.predict_index(text);
        Route {
            department: self.classifier.labels()[index],
            recipient: &self.recipients[index],
        }
    }

    /// Route plus the score of every trained label, in label order.
    pub fn preview(&self, text: &str) -> ClassificationPreview {
        let route = self.route(text);
        ClassificationPreview {
            predicted_department: route.department,
            recipient: route.recipient.to_string(),
            scores: self.classifier.rank(text),
        }
    }
}
