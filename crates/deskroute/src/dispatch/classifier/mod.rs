//! Department classifier: tf-idf features over unigrams and bigrams feeding a multinomial
//! naive Bayes model. Trained once from a fixed corpus and read-only afterwards.

pub mod corpus;
mod features;

use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::{DepartmentLabel, TrainingExample};
use super::normalizer::normalize;
use super::profile::ConfigurationError;
use features::{terms, SparseVector, TfidfVectorizer};

const SMOOTHING_ALPHA: f64 = 1.0;

/// Joint log-likelihood of one label for a given text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelScore {
    pub department: DepartmentLabel,
    pub log_likelihood: f64,
}

#[derive(Debug, Clone)]
pub struct DepartmentClassifier {
    vectorizer: TfidfVectorizer,
    /// Trained labels in declaration order; the classifier's entire output range.
    labels: Vec<DepartmentLabel>,
    class_log_prior: Vec<f64>,
    /// `[label][feature]` smoothed log probabilities.
    feature_log_prob: Vec<Vec<f64>>,
}

impl DepartmentClassifier {
    pub fn train(corpus: &[TrainingExample]) -> Result<Self, ConfigurationError> {
        if corpus.is_empty() {
            return Err(ConfigurationError::EmptyCorpus);
        }

        let documents: Vec<Vec<String>> = corpus
            .iter()
            .map(|example| terms(&normalize(&example.text)))
            .collect();
        let vectorizer = TfidfVectorizer::fit(&documents);
        let labels: Vec<DepartmentLabel> = corpus
            .iter()
            .map(|example| example.department)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let vocabulary_size = vectorizer.len();
        let mut class_counts = vec![0usize; labels.len()];
        let mut feature_weights = vec![vec![0.0f64; vocabulary_size]; labels.len()];

        for (example, document) in corpus.iter().zip(&documents) {
            let Ok(class) = labels.binary_search(&example.department) else {
                continue;
            };
            class_counts[class] += 1;
            for (feature, weight) in vectorizer.transform(document) {
                feature_weights[class][feature] += weight;
            }
        }

        let total = corpus.len() as f64;
        let class_log_prior = class_counts
            .iter()
            .map(|&count| (count as f64 / total).ln())
            .collect();

        let feature_log_prob = feature_weights
            .into_iter()
            .map(|weights| {
                let denominator =
                    weights.iter().sum::<f64>() + SMOOTHING_ALPHA * vocabulary_size as f64;
                weights
                    .into_iter()
                    .map(|weight| ((weight + SMOOTHING_ALPHA) / denominator).ln())
                    .collect()
            })
            .collect();

        Ok(Self {
            vectorizer,
            labels,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn labels(&self) -> &[DepartmentLabel] {
        &self.labels
    }

    pub fn covers(&self, label: DepartmentLabel) -> bool {
        self.labels.binary_search(&label).is_ok()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.len()
    }

    /// Most likely department for `text`.
    ///
    /// Equal scores resolve to the label declared first in [`DepartmentLabel`]. Text with no
    /// known terms (including the empty string) scores on priors alone, so it lands on the
    /// most frequent training label.
    pub fn predict(&self, text: &str) -> DepartmentLabel {
        self.labels[self.predict_index(text)]
    }

    /// Per-label scores in label order.
    pub fn rank(&self, text: &str) -> Vec<LabelScore> {
        let features = self.features(text);
        self.labels
            .iter()
            .enumerate()
            .map(|(class, &department)| LabelScore {
                department,
                log_likelihood: self.joint_log_likelihood(class, &features),
            })
            .collect()
    }

    pub(crate) fn predict_index(&self, text: &str) -> usize {
        let features = self.features(text);
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for class in 0..self.labels.len() {
            let score = self.joint_log_likelihood(class, &features);
            if score > best_score {
                best = class;
                best_score = score;
            }
        }
        best
    }

    fn features(&self, text: &str) -> SparseVector {
        self.vectorizer.transform(&terms(&normalize(text)))
    }

    fn joint_log_likelihood(&self, class: usize, features: &SparseVector) -> f64 {
        let log_prob = &self.feature_log_prob[class];
        features
            .iter()
            .fold(self.class_log_prior[class], |score, &(feature, weight)| {
                score + weight * log_prob[feature]
            })
    }
}
