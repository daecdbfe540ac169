//! Pipeline stages for policy-document analysis.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap the backend
//! (e.g. point at a stub server) without touching validation or decoding.
//!
//! ## Data Flow
//!
//! ```text
//! intake ──▶ schema ──▶ client ──▶ schema
//! (validate   (declare   (one HTTP  (decode against
//!  + base64)   contract)  call)      the contract)
//! ```
//!
//! 1. [`intake`] — validate the selected file against the type/size policy
//!    and wrap it as a transport-ready [`intake::UploadedDocument`]
//! 2. [`schema`] — the structured-output contract: the declared response
//!    schema and whole-or-nothing decoding into
//!    [`schema::AnalysisResult`]
//! 3. [`client`] — build the multimodal request and drive the single
//!    network call; the only stage with I/O

pub mod client;
pub mod intake;
pub mod schema;
