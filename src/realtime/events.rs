//! Well-known realtime event names.
//!
//! The first three are emitted locally by the manager; the rest are sent
//! by the OpenSLAM backend.

/// Socket opened.
pub const CONNECT: &str = "connect";

/// Socket closed (by either side).
pub const DISCONNECT: &str = "disconnect";

/// Transport error. Payload is the error message string.
pub const ERROR: &str = "error";

/// An evaluation finished successfully.
pub const EVALUATION_COMPLETE: &str = "evaluation_complete";

/// An evaluation failed.
pub const EVALUATION_FAILED: &str = "evaluation_failed";

/// Backend configuration changed.
pub const CONFIG_UPDATE: &str = "config_update";
