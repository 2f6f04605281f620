use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Administrative office that can own a routed request.
///
/// Declaration order is significant: it is the order the classifier scores labels in and
/// the order ties are broken by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DepartmentLabel {
    Academic,
    Accounts,
    Examination,
    Scholarship,
    Hostel,
}

impl DepartmentLabel {
    pub const ALL: [DepartmentLabel; 5] = [
        DepartmentLabel::Academic,
        DepartmentLabel::Accounts,
        DepartmentLabel::Examination,
        DepartmentLabel::Scholarship,
        DepartmentLabel::Hostel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DepartmentLabel::Academic => "Academic",
            DepartmentLabel::Accounts => "Accounts",
            DepartmentLabel::Examination => "Examination",
            DepartmentLabel::Scholarship => "Scholarship",
            DepartmentLabel::Hostel => "Hostel",
        }
    }

    /// Lowercase key used for environment variables and default mailboxes.
    pub fn key(&self) -> &'static str {
        match self {
            DepartmentLabel::Academic => "academic",
            DepartmentLabel::Accounts => "accounts",
            DepartmentLabel::Examination => "examination",
            DepartmentLabel::Scholarship => "scholarship",
            DepartmentLabel::Hostel => "hostel",
        }
    }
}

impl fmt::Display for DepartmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown department '{0}'")]
pub struct UnknownDepartment(pub String);

impl FromStr for DepartmentLabel {
    type Err = UnknownDepartment;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        DepartmentLabel::ALL
            .into_iter()
            .find(|label| label.key().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownDepartment(trimmed.to_string()))
    }
}

/// One labeled line of the training corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub department: DepartmentLabel,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, department: DepartmentLabel) -> Self {
        Self {
            text: text.into(),
            department,
        }
    }
}

/// Request exactly as collected by the intake surface.
///
/// Missing JSON fields deserialize to empty strings so that validation, not the
/// extractor, decides what is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomingRequest {
    pub requester_name: String,
    pub requester_id: String,
    /// Department the requester belongs to, as they wrote it.
    pub claimed_department: String,
    pub year: String,
    pub body: String,
}

/// Result of the single notification attempt made for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
    NotAttempted,
}

impl DeliveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::NotAttempted => "not_attempted",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Append-only audit entry written once per accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub requester_name: String,
    pub requester_id: String,
    pub claimed_department: String,
    pub year: String,
    pub body: String,
    pub predicted_department: DepartmentLabel,
    pub delivery_status: DeliveryStatus,
    pub recorded_at: DateTime<Utc>,
}

impl OutcomeRecord {
    pub fn new(
        request: IncomingRequest,
        predicted_department: DepartmentLabel,
        delivery_status: DeliveryStatus,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let IncomingRequest {
            requester_name,
            requester_id,
            claimed_department,
            year,
            body,
        } = request;

        Self {
            requester_name,
            requester_id,
            claimed_department,
            year,
            body,
            predicted_department,
            delivery_status,
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_labels_parse_case_insensitively() {
        assert_eq!(
            " scholarship ".parse::<DepartmentLabel>(),
            Ok(DepartmentLabel::Scholarship)
        );
        assert_eq!(
            "HOSTEL".parse::<DepartmentLabel>(),
            Ok(DepartmentLabel::Hostel)
        );
        assert_eq!(
            "Library".parse::<DepartmentLabel>(),
            Err(UnknownDepartment("Library".to_string()))
        );
    }

    #[test]
    fn declaration_order_drives_label_ordering() {
        let mut labels = DepartmentLabel::ALL.to_vec();
        labels.reverse();
        labels.sort();
        assert_eq!(labels, DepartmentLabel::ALL.to_vec());
    }

    #[test]
    fn incoming_request_defaults_missing_fields_to_blank() {
        let request: IncomingRequest =
            serde_json::from_str(r#"{ "requester_name": "Asha" }"#).expect("json parses");
        assert_eq!(request.requester_name, "Asha");
        assert!(request.body.is_empty());
    }
}
