use snapdelta_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the canonical ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on
/// programmatically, independent of the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Snapshot access
    /// A snapshot pass could not be started or a row could not be fetched
    SourceUnavailable,
    /// A record lacks a readable identity or partition field
    MalformedRecord,

    // Configuration / input
    InvalidConfig,
    InvalidInput,
    NotFound,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::SourceUnavailable => "ERR_SOURCE_UNAVAILABLE",
            ExErrorKind::MalformedRecord => "ERR_MALFORMED_RECORD",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a stable kind plus optional context: the operation that failed,
/// the entity involved (table, file or field name), the position of the
/// offending record within its pass and the run's request id.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    record_index: Option<u64>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            record_index: None,
            request_id: None,
            message: String::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (table, file or field name)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the 0-based position of the record within its snapshot pass
    pub fn with_record_index(mut self, index: u64) -> Self {
        self.record_index = Some(index);
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn record_index(&self) -> Option<u64> {
        self.record_index
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        if let Some(index) = self.record_index {
            write!(f, " (record: {})", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for snapshot comparison
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapDeltaError {
    /// A required key field is absent from a record
    #[error("Record {index} is missing field `{field}`")]
    MissingKeyField { field: String, index: u64 },

    /// A key field is present but not a string, number or bool
    #[error("Record {index} has unreadable field `{field}`: {found}")]
    UnreadableKeyField {
        field: String,
        index: u64,
        found: String,
    },

    /// A line of a record source could not be decoded into a record
    #[error("Record {index} could not be decoded: {reason}")]
    UndecodableRecord { index: u64, reason: String },

    /// Configuration failed validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<SnapDeltaError> for ExError {
    fn from(err: SnapDeltaError) -> Self {
        let message = err.to_string();
        match err {
            SnapDeltaError::MissingKeyField { field, index }
            | SnapDeltaError::UnreadableKeyField { field, index, .. } => {
                ExError::new(ExErrorKind::MalformedRecord)
                    .with_entity_id(field)
                    .with_record_index(index)
                    .with_message(message)
            }
            SnapDeltaError::UndecodableRecord { index, .. } => {
                ExError::new(ExErrorKind::MalformedRecord)
                    .with_record_index(index)
                    .with_message(message)
            }
            SnapDeltaError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(message)
            }
            SnapDeltaError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for SnapDeltaError {
    fn from(err: serde_json::Error) -> Self {
        SnapDeltaError::Serialization {
            message: err.to_string(),
        }
    }
}
