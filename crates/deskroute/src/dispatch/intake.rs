use super::domain::IncomingRequest;

/// Raised before any classification, notification, or persistence happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("required fields missing or blank: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl ValidationError {
    pub fn fields(&self) -> &[&'static str] {
        match self {
            ValidationError::MissingFields(fields) => fields,
        }
    }
}

/// Checks that every field of the request carries non-whitespace content.
pub fn validate_request(request: &IncomingRequest) -> Result<(), ValidationError> {
    let fields = [
        ("requester_name", &request.requester_name),
        ("requester_id", &request.requester_id),
        ("claimed_department", &request.claimed_department),
        ("year", &request.year),
        ("body", &request.body),
    ];

    let missing: Vec<&'static str> = fields
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}
