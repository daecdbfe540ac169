//! # policylens
//!
//! Turn a health-insurance policy document (PDF or image) into a
//! plain-language breakdown of coverage, claim steps, and reimbursement
//! terms, using an external multimodal document-understanding service.
//!
//! ## Why this crate?
//!
//! Policy documents are dense legal text that ordinary people struggle to
//! read. Instead of parsing them locally, this crate hands the raw document
//! to a vision-capable model under a strict structured-output contract and
//! exposes the result through a small, testable session lifecycle. The crate
//! is the orchestration core only — no OCR, no persistence, no rendering.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Intake   validate type/size, base64-encode, optional image preview
//!  ├─ 2. Dispatch session: idle → analyzing (the mutual-exclusion point)
//!  ├─ 3. Analyze  one multimodal call with a declared five-field schema
//!  ├─ 4. Decode   whole-or-nothing parse into AnalysisResult
//!  └─ 5. Land     session: analyzing → success / failed (reset → idle)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use policylens::{analyze_document, intake_path, AnalysisClient, AnalysisConfig, Session};
//! use tokio::sync::Mutex;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from GEMINI_API_KEY
//!     let client = AnalysisClient::new(AnalysisConfig::from_env()?)?;
//!     let session = Mutex::new(Session::new());
//!
//!     let document = intake_path("policy.pdf").await?;
//!     analyze_document(&session, &client, document).await?;
//!
//!     match session.lock().await.state() {
//!         policylens::SessionState::Success(_, result) => {
//!             println!("{}: {}", result.company_name, result.summary)
//!         }
//!         policylens::SessionState::Failed(_, info) => eprintln!("{}", info.message),
//!         _ => unreachable!("analyze_document always lands in a terminal state"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure semantics
//!
//! Intake errors ([`IntakeError`]) are local and recoverable — the session
//! never leaves `Idle` and the message names the unmet constraint. Analysis
//! errors ([`AnalysisError`]) land the session in `Failed` with one generic
//! user message; the specific kind is logged via `tracing` only. Reset is
//! always available and a reset during flight makes the eventual outcome
//! stale (see [`session`]).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::{AnalysisError, IntakeError, SessionError, ACCEPTED_MIME_TYPES, MAX_DOCUMENT_BYTES};
pub use pipeline::client::{AnalysisBackend, AnalysisClient, AnalysisRequest, GeminiBackend};
pub use pipeline::intake::{intake, intake_path, validate, IncomingFile, UploadedDocument};
pub use pipeline::schema::AnalysisResult;
pub use session::{
    analyze_document, AnalysisTicket, ErrorInfo, Session, SessionState, ANALYSIS_FAILED_MESSAGE,
};
