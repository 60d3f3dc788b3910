//! Canonical schema constants for structured logging
//!
//! These constants keep field names identical across every crate that logs.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_SESSION_ID: &str = "session_id";
pub const FIELD_EPIC_NUMBER: &str = "epic_number";
pub const FIELD_STORY_KEY: &str = "story_key";

// Batch sizes
pub const FIELD_EPICS_IN: &str = "epics_in";
pub const FIELD_STORIES_IN: &str = "stories_in";
pub const FIELD_INSERTED: &str = "inserted";
pub const FIELD_UPDATED: &str = "updated";
pub const FIELD_SKIPPED: &str = "skipped";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_ERR_MESSAGE: &str = "err_message";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
