//! Analysis client: build the multimodal request and drive the single call.
//!
//! This module is intentionally thin — the instruction text lives in
//! [`crate::prompts`] and the output contract in [`crate::pipeline::schema`],
//! so either can change without touching transport or error mapping here.
//!
//! ## One attempt, no retry
//!
//! `analyze` makes exactly one outbound call per invocation: no caching, no
//! deduplication of identical documents, no backoff. A transient failure
//! surfaces as [`AnalysisError::TransportFailure`] and the retry decision
//! belongs to the caller — in practice the user pressing "try again" from
//! the `Failed` state.
//!
//! ## The backend seam
//!
//! [`AnalysisBackend`] isolates the wire protocol behind an object-safe async
//! trait. Production uses [`GeminiBackend`]; tests substitute a mock that
//! returns canned payloads, so the whole session lifecycle is testable
//! without network access.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::intake::UploadedDocument;
use crate::pipeline::schema::{self, AnalysisResult};
use crate::prompts::ANALYSIS_PROMPT;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One analysis request, constructed per attempt from an
/// [`UploadedDocument`] and discarded when the call resolves.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub encoded_payload: String,
    pub mime_type: String,
    pub prompt: &'static str,
    pub schema: Value,
}

impl AnalysisRequest {
    fn for_document(document: &UploadedDocument) -> Self {
        Self {
            encoded_payload: document.encoded_payload.clone(),
            mime_type: document.mime_type.clone(),
            prompt: ANALYSIS_PROMPT,
            schema: schema::response_schema(),
        }
    }
}

/// Transport seam for the external document-understanding service.
///
/// Returns the raw textual payload the service produced; decoding against
/// the contract happens in the caller so every backend gets identical
/// `MalformedResponse` semantics.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn generate(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;
}

/// Client for the analysis service.
///
/// Cheap to clone; holds only an `Arc` to the backend.
#[derive(Clone)]
pub struct AnalysisClient {
    backend: Arc<dyn AnalysisBackend>,
}

impl AnalysisClient {
    /// Production client backed by [`GeminiBackend`].
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        Ok(Self::from_backend(Arc::new(GeminiBackend::new(config)?)))
    }

    /// Client over an arbitrary backend (mock servers, recorded fixtures).
    pub fn from_backend(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    /// Analyse one document: exactly one outbound call, whole-or-nothing
    /// decoding of the response.
    pub async fn analyze(
        &self,
        document: &UploadedDocument,
    ) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();
        let request = AnalysisRequest::for_document(document);
        debug!(
            file = %document.file_name,
            mime = %document.mime_type,
            payload_bytes = request.encoded_payload.len(),
            "Dispatching analysis request"
        );

        let payload = match self.backend.generate(&request).await {
            Ok(p) => p,
            Err(e) => {
                warn!(file = %document.file_name, error = %e, "Analysis call failed");
                return Err(e);
            }
        };

        let result = schema::decode_result(&payload);
        match &result {
            Ok(r) => debug!(
                file = %document.file_name,
                insurer = %r.company_name,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Analysis complete"
            ),
            Err(e) => warn!(
                file = %document.file_name,
                error = %e,
                "Analysis response rejected"
            ),
        }
        result
    }
}

// ── Gemini wire format ───────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<ContentPayload>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct ContentPayload {
    parts: Vec<Part>,
}

/// A content part: either the inline document or the text instruction.
/// Externally tagged, so a part serialises as `{"inlineData": {..}}` or
/// `{"text": ".."}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    InlineData(InlineData),
    Text(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    max_output_tokens: usize,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Pull the first non-empty text part out of the response envelope.
///
/// A well-formed envelope with no usable text is [`AnalysisError::EmptyResponse`]
/// — distinct from a payload that has text which fails the schema.
fn extract_payload(response: GenerateContentResponse) -> Result<String, AnalysisError> {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .find(|t| !t.trim().is_empty())
        .ok_or(AnalysisError::EmptyResponse)
}

/// Backend speaking the Gemini `generateContent` REST protocol.
///
/// The document travels inline (base64 with declared mime type) next to the
/// fixed instruction, and the request declares the structured-output schema
/// via `generationConfig.responseSchema`.
pub struct GeminiBackend {
    http: reqwest::Client,
    config: AnalysisConfig,
}

impl GeminiBackend {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| AnalysisError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url, self.config.model
        )
    }

    fn body(&self, request: &AnalysisRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![ContentPayload {
                // Document first, instruction second — the order the service
                // was tuned against.
                parts: vec![
                    Part::InlineData(InlineData {
                        mime_type: request.mime_type.clone(),
                        data: request.encoded_payload.clone(),
                    }),
                    Part::Text(request.prompt.to_string()),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.schema.clone(),
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl AnalysisBackend for GeminiBackend {
    async fn generate(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::TransportFailure {
                        reason: format!("timed out after {}s", self.config.api_timeout_secs),
                    }
                } else {
                    AnalysisError::TransportFailure {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Keep a body snippet for the logs; the user never sees it.
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(AnalysisError::TransportFailure {
                reason: format!("HTTP {status}: {snippet}"),
            });
        }

        let envelope: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| AnalysisError::TransportFailure {
                    reason: format!("unreadable response body: {e}"),
                })?;

        extract_payload(envelope)
    }
}
