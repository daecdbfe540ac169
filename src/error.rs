//! Error types for the policylens library.
//!
//! Three distinct error types reflect three distinct failure domains:
//!
//! * [`IntakeError`] — **Local**: the selected file never became an
//!   [`crate::pipeline::intake::UploadedDocument`]. These are recovered on the
//!   spot — the session state machine never sees them and the user is shown
//!   exactly which constraint was unmet (type list, size limit, unreadable
//!   file).
//!
//! * [`AnalysisError`] — **Remote**: the document was valid but the external
//!   analysis call failed. All kinds collapse to a single generic
//!   user-facing message in [`crate::session::SessionState::Failed`]; the
//!   specific kind survives only in the diagnostic logs.
//!
//! * [`SessionError`] — **Protocol**: the caller violated the dispatch
//!   protocol (a second analysis while one is in flight).
//!
//! The separation keeps the recovery story honest: intake errors leave the
//! session in `Idle`, analysis errors land in `Failed`-with-retry, and nothing
//! here is ever fatal to the process.

use thiserror::Error;

/// Accepted document media types, in the order shown to the user.
pub const ACCEPTED_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
];

/// Inclusive upload ceiling: 10 MiB.
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// A file failed validation or could not be read during intake.
///
/// Intake errors never advance the session state machine — the invalid
/// selection is discarded and the session stays in `Idle`.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The reported media type is outside the accepted set.
    #[error("Unsupported file type '{mime_type}'. Please upload a PDF or an image (JPEG, PNG, WebP).")]
    UnsupportedType { mime_type: String },

    /// The file exceeds the 10 MiB ceiling (the boundary itself is allowed).
    #[error("File size must be less than 10MB (got {size_bytes} bytes, limit {MAX_DOCUMENT_BYTES}).")]
    FileTooLarge { size_bytes: u64 },

    /// The underlying read failed (I/O interruption, unreadable handle).
    #[error("Failed to read file: {source}")]
    ReadFailure {
        #[source]
        source: std::io::Error,
    },
}

/// The external analysis call failed.
///
/// Regardless of kind, the user sees one generic message
/// ([`crate::session::ANALYSIS_FAILED_MESSAGE`]); the kind is preserved here
/// for logging only. None of these are retried by
/// [`crate::pipeline::client::AnalysisClient`] — retry policy, if any,
/// belongs to the caller.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The service responded but returned no textual payload.
    #[error("Analysis service returned an empty response")]
    EmptyResponse,

    /// The payload did not parse against the structured-output schema
    /// (malformed JSON or a missing required field). A response is accepted
    /// as a whole or rejected as a whole — never partially trusted.
    #[error("Analysis response did not match the expected schema: {detail}")]
    MalformedResponse { detail: String },

    /// Transport-level failure: network error, non-success status, or timeout.
    #[error("Analysis request failed in transit: {reason}")]
    TransportFailure { reason: String },

    /// No API key was found in the config or the environment.
    #[error("No API key configured.\nSet GEMINI_API_KEY or provide one via AnalysisConfig::builder().api_key(..).")]
    ApiKeyMissing,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The session dispatch protocol was violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// An analysis is already in flight (or a result is held); a second
    /// dispatch requires an explicit reset first.
    #[error("An analysis is already in progress for this session")]
    Busy,
}
