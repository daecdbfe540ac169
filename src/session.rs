//! Session lifecycle: the state machine sequencing intake → analysis → result.
//!
//! ## Why an explicit state machine?
//!
//! The user-visible lifecycle (idle → analyzing → success/failed → idle) is a
//! tagged union plus a small set of transitions, decoupled from any rendering
//! mechanism. Keeping it explicit makes the mutual-exclusion rule checkable:
//! `Analyzing` *is* the lock — a transition into it must happen before the
//! request is dispatched, and no second dispatch is possible until the state
//! resolves.
//!
//! ## Staleness on reset
//!
//! There is no cancellation primitive: once dispatched, the in-flight call
//! runs to completion. A reset during `Analyzing` bumps the session epoch, so
//! when the late result arrives its [`AnalysisTicket`] no longer matches and
//! [`Session::complete`] discards it. The session owns nothing shared — the
//! document and result are dropped on reset.

use crate::error::{AnalysisError, SessionError};
use crate::pipeline::client::AnalysisClient;
use crate::pipeline::intake::UploadedDocument;
use crate::pipeline::schema::AnalysisResult;
use tracing::{debug, info, warn};

/// The one message shown to the user for every analysis failure, regardless
/// of kind. The specific [`AnalysisError`] is logged, never displayed.
pub const ANALYSIS_FAILED_MESSAGE: &str = "We couldn't analyze that document. \
Please ensure it's a clear insurance policy document and try again.";

/// User-facing failure details held by [`SessionState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
}

/// The session lifecycle as a tagged union.
///
/// A result exists only alongside the document that produced it; terminal
/// states are exited only via [`Session::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Analyzing(UploadedDocument),
    Success(UploadedDocument, AnalysisResult),
    Failed(UploadedDocument, ErrorInfo),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// The document currently held, in any non-idle state.
    pub fn document(&self) -> Option<&UploadedDocument> {
        match self {
            SessionState::Idle => None,
            SessionState::Analyzing(doc)
            | SessionState::Success(doc, _)
            | SessionState::Failed(doc, _) => Some(doc),
        }
    }
}

/// Proof that an analysis was dispatched under a particular session epoch.
///
/// Opaque to callers; produced by [`Session::begin_analysis`] and consumed by
/// [`Session::complete`]. A ticket from before a reset no longer matches and
/// its outcome is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    epoch: u64,
}

/// One user session: current state plus the epoch counter behind the
/// staleness check. Exactly one instance per active session; transitions are
/// the only mutation path.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    epoch: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            epoch: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Accept a validated document and move `Idle` → `Analyzing`.
    ///
    /// The returned ticket must accompany the eventual outcome. Any state
    /// other than `Idle` refuses with [`SessionError::Busy`] — a held result
    /// or error must be explicitly reset before the next document.
    pub fn begin_analysis(
        &mut self,
        document: UploadedDocument,
    ) -> Result<AnalysisTicket, SessionError> {
        if !self.state.is_idle() {
            return Err(SessionError::Busy);
        }
        info!(file = %document.file_name, "Session: idle → analyzing");
        self.state = SessionState::Analyzing(document);
        Ok(AnalysisTicket { epoch: self.epoch })
    }

    /// Land the outcome of a dispatched analysis.
    ///
    /// Stale tickets (a reset happened while the call was in flight) are
    /// discarded without touching the state. Otherwise `Analyzing` moves to
    /// `Success` with the untouched five-field result, or to `Failed`
    /// holding only the generic user message while the error kind goes to
    /// the logs.
    pub fn complete(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) {
        if ticket.epoch != self.epoch {
            debug!(
                ticket_epoch = ticket.epoch,
                session_epoch = self.epoch,
                "Discarding stale analysis outcome"
            );
            return;
        }

        let document = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Analyzing(doc) => doc,
            other => {
                // Matching epoch but not analyzing: nothing was in flight.
                warn!(state = ?other, "Analysis outcome arrived outside Analyzing; ignored");
                self.state = other;
                return;
            }
        };

        match outcome {
            Ok(result) => {
                info!(file = %document.file_name, insurer = %result.company_name,
                    "Session: analyzing → success");
                self.state = SessionState::Success(document, result);
            }
            Err(error) => {
                warn!(file = %document.file_name, error = %error,
                    "Session: analyzing → failed");
                self.state = SessionState::Failed(
                    document,
                    ErrorInfo {
                        message: ANALYSIS_FAILED_MESSAGE.to_string(),
                    },
                );
            }
        }
    }

    /// Return to `Idle` from any state, discarding the held document, result,
    /// and error. Bumps the epoch so any in-flight outcome becomes stale.
    pub fn reset(&mut self) {
        if !self.state.is_idle() {
            debug!("Session: reset → idle");
        }
        self.state = SessionState::Idle;
        self.epoch += 1;
    }
}

/// Drive one full analysis: dispatch under the session lock, await the sole
/// suspension point with the lock released, then land the outcome.
///
/// The lock is *not* held across the network call — a concurrent `reset`
/// remains possible throughout, which is exactly what makes the staleness
/// check meaningful. Intake failures never reach this function; the caller
/// surfaces the [`crate::error::IntakeError`] directly and the session stays
/// `Idle`.
pub async fn analyze_document(
    session: &tokio::sync::Mutex<Session>,
    client: &AnalysisClient,
    document: UploadedDocument,
) -> Result<(), SessionError> {
    // Transition first: entering Analyzing happens-before dispatch.
    let ticket = session.lock().await.begin_analysis(document.clone())?;

    let outcome = client.analyze(&document).await;
    session.lock().await.complete(ticket, outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::intake::{intake, IncomingFile};

    fn doc() -> UploadedDocument {
        intake(IncomingFile {
            name: "policy.pdf".into(),
            mime_type: "application/pdf".into(),
            bytes: b"%PDF-1.4".to_vec(),
        })
        .unwrap()
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            company_name: "Acme Health".into(),
            summary: "Basic individual plan.".into(),
            coverage: "...".into(),
            action_steps: "...".into(),
            reimbursement: "...".into(),
        }
    }

    #[test]
    fn starts_idle() {
        assert!(Session::new().state().is_idle());
    }

    #[test]
    fn success_path_holds_exact_result() {
        let mut session = Session::new();
        let ticket = session.begin_analysis(doc()).unwrap();
        assert!(matches!(session.state(), SessionState::Analyzing(_)));

        session.complete(ticket, Ok(result()));
        match session.state() {
            SessionState::Success(d, r) => {
                assert_eq!(d.file_name, "policy.pdf");
                assert_eq!(r, &result());
            }
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[test]
    fn failure_stores_generic_message_only() {
        let mut session = Session::new();
        let ticket = session.begin_analysis(doc()).unwrap();
        session.complete(
            ticket,
            Err(AnalysisError::TransportFailure {
                reason: "HTTP 503".into(),
            }),
        );
        match session.state() {
            SessionState::Failed(_, info) => {
                assert_eq!(info.message, ANALYSIS_FAILED_MESSAGE);
                assert!(!info.message.contains("503"), "kind must not leak to the user");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn every_failure_kind_maps_to_same_message() {
        for error in [
            AnalysisError::EmptyResponse,
            AnalysisError::MalformedResponse { detail: "x".into() },
            AnalysisError::TransportFailure { reason: "y".into() },
        ] {
            let mut session = Session::new();
            let ticket = session.begin_analysis(doc()).unwrap();
            session.complete(ticket, Err(error));
            match session.state() {
                SessionState::Failed(_, info) => {
                    assert_eq!(info.message, ANALYSIS_FAILED_MESSAGE)
                }
                other => panic!("expected Failed, got {other:?}"),
            }
        }
    }

    #[test]
    fn second_dispatch_while_analyzing_is_busy() {
        let mut session = Session::new();
        session.begin_analysis(doc()).unwrap();
        assert_eq!(session.begin_analysis(doc()).unwrap_err(), SessionError::Busy);
    }

    #[test]
    fn dispatch_from_terminal_states_is_busy() {
        let mut session = Session::new();
        let ticket = session.begin_analysis(doc()).unwrap();
        session.complete(ticket, Ok(result()));
        assert_eq!(session.begin_analysis(doc()).unwrap_err(), SessionError::Busy);
    }

    #[test]
    fn reset_reaches_idle_from_every_state() {
        // Idle
        let mut session = Session::new();
        session.reset();
        assert!(session.state().is_idle());

        // Analyzing
        let mut session = Session::new();
        session.begin_analysis(doc()).unwrap();
        session.reset();
        assert!(session.state().is_idle());

        // Success
        let mut session = Session::new();
        let ticket = session.begin_analysis(doc()).unwrap();
        session.complete(ticket, Ok(result()));
        session.reset();
        assert!(session.state().is_idle());
        assert!(session.state().document().is_none());

        // Failed
        let mut session = Session::new();
        let ticket = session.begin_analysis(doc()).unwrap();
        session.complete(ticket, Err(AnalysisError::EmptyResponse));
        session.reset();
        assert!(session.state().is_idle());
    }

    #[test]
    fn outcome_after_reset_is_stale_and_discarded() {
        let mut session = Session::new();
        let ticket = session.begin_analysis(doc()).unwrap();

        // User resets while the call is in flight.
        session.reset();
        assert!(session.state().is_idle());

        // The late result must not resurrect the old session.
        session.complete(ticket, Ok(result()));
        assert!(session.state().is_idle());

        // And the next session is unaffected.
        let ticket2 = session.begin_analysis(doc()).unwrap();
        session.complete(ticket2, Ok(result()));
        assert!(matches!(session.state(), SessionState::Success(..)));
    }

    #[test]
    fn stale_failure_is_also_discarded() {
        let mut session = Session::new();
        let ticket = session.begin_analysis(doc()).unwrap();
        session.reset();
        session.complete(ticket, Err(AnalysisError::EmptyResponse));
        assert!(session.state().is_idle());
    }
}
