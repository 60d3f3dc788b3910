use backlog_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using PlanningError
pub type Result<T> = std::result::Result<T, PlanningError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error that leaves the engine carries one of these kinds. Each kind
/// maps to a stable code the API layer can translate into a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidTitle,
    InvalidNumber,
    FieldTooLong,
    NotFound,
    ConstraintViolation,

    // Reconciliation
    /// A write hook or the surrounding transaction body vetoed the pass
    Aborted,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidTitle => "ERR_INVALID_TITLE",
            ExErrorKind::InvalidNumber => "ERR_INVALID_NUMBER",
            ExErrorKind::FieldTooLong => "ERR_FIELD_TOO_LONG",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Aborted => "ERR_ABORTED",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Kinds that reject the payload before any write happens
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidInput
                | ExErrorKind::InvalidTitle
                | ExErrorKind::InvalidNumber
                | ExErrorKind::FieldTooLong
        )
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus free-form context
/// for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    session_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            session_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (epic number, story key or surrogate id)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add session context
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
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

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
        if let Some(session_id) = &self.session_id {
            write!(f, " (session_id: {})", session_id)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for planning payloads
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// Title is empty, whitespace-only, or over the length bound
    #[error("Invalid title for {entity}: {reason}")]
    InvalidTitle { entity: String, reason: String },

    /// Numeric field outside its allowed range
    #[error("Invalid {field} for {entity}: {value} (must be >= 1)")]
    InvalidNumber {
        entity: String,
        field: &'static str,
        value: u32,
    },

    /// Text field over its length bound
    #[error("{field} for {entity} is {actual} chars, limit is {max}")]
    FieldTooLong {
        entity: String,
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// Required text field is empty
    #[error("{field} for {entity} must not be empty")]
    MissingField { entity: String, field: &'static str },

    /// Session does not exist
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Invalid enumeration literal read back from storage or payload
    #[error("Unknown {field} value: {value}")]
    UnknownVariant { field: &'static str, value: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Stored timestamp outside the representable range
    #[error("Timestamp out of range: {millis} ms")]
    InvalidTimestamp { millis: i64 },
}

impl From<PlanningError> for ExError {
    fn from(err: PlanningError) -> Self {
        let message = err.to_string();
        match err {
            PlanningError::InvalidTitle { entity, .. } => ExError::new(ExErrorKind::InvalidTitle)
                .with_entity_id(entity)
                .with_message(message),

            PlanningError::InvalidNumber { entity, .. } => {
                ExError::new(ExErrorKind::InvalidNumber)
                    .with_entity_id(entity)
                    .with_message(message)
            }

            PlanningError::FieldTooLong { entity, .. } => ExError::new(ExErrorKind::FieldTooLong)
                .with_entity_id(entity)
                .with_message(message),

            PlanningError::MissingField { entity, .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(entity)
                .with_message(message),

            PlanningError::SessionNotFound { session_id } => ExError::new(ExErrorKind::NotFound)
                .with_session_id(session_id)
                .with_message("Session not found"),

            PlanningError::UnknownVariant { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            PlanningError::Serialization { .. } | PlanningError::InvalidTimestamp { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for PlanningError {
    fn from(err: serde_json::Error) -> Self {
        PlanningError::Serialization {
            message: err.to_string(),
        }
    }
}
