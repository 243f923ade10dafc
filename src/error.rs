use reqwest::StatusCode;

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Every way a scenario can fail. Response-derived variants keep the body
/// so the report shows what the target actually sent.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected status {actual} (expected one of {}): {body}", format_statuses(.expected))]
    UnexpectedStatus {
        expected: Vec<StatusCode>,
        actual: StatusCode,
        body: String,
    },
    #[error("Response with status {status} is not valid JSON ({source}): {body}")]
    MalformedBody {
        status: StatusCode,
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Response is missing field '{field}': {body}")]
    MissingField { field: String, body: String },
    #[error("Field '{field}' mismatch: expected {expected}, got {actual}")]
    FieldMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    #[error("Field '{field}' must be a non-empty string: {body}")]
    EmptyField { field: String, body: String },
    #[error("{context}: {source}")]
    Case {
        context: String,
        #[source]
        source: Box<HarnessError>,
    },
    #[error(
        "Rate limit never enforced: {successes} of {attempts} requests succeeded without a 429"
    )]
    RateLimitNotObserved { attempts: u32, successes: u32 },
    #[error("No request in {attempts} attempts succeeded or was rate limited (last status {last_status})")]
    RateLimitProbeInconclusive { attempts: u32, last_status: String },
}

impl HarnessError {
    /// Attaches a label to an error so failures inside a loop name the case.
    pub fn in_case(self, context: impl Into<String>) -> Self {
        HarnessError::Case {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Status code captured from the response, when the failure has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HarnessError::UnexpectedStatus { actual, .. } => Some(*actual),
            HarnessError::MalformedBody { status, .. } => Some(*status),
            HarnessError::Transport(e) => e.status(),
            HarnessError::Case { source, .. } => source.status(),
            _ => None,
        }
    }
}

fn format_statuses(statuses: &[StatusCode]) -> String {
    statuses
        .iter()
        .map(|s| s.as_u16().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
