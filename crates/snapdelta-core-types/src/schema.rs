//! Canonical schema constants for structured logging and reports
//!
//! These constants keep field names consistent between log events, error
//! context and the serialized comparison report.

// Canonical field keys for structured logging
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Snapshot label field
pub const FIELD_SNAPSHOT: &str = "snapshot";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Snapshot labels
pub const SNAPSHOT_PREVIOUS: &str = "previous";
pub const SNAPSHOT_CURRENT: &str = "current";
