//! The structured-output contract: declared schema and response decoding.
//!
//! The analysis service is instructed to return JSON conforming to an
//! explicit response schema rather than free text. This is the load-bearing
//! contract that makes decoding deterministic: the request *declares* the
//! shape (five required string fields) and the decoder *enforces* it.
//! Both halves live in this module so they cannot drift apart.
//!
//! Decoding is whole-or-nothing. [`AnalysisResult`] has no `Option` fields,
//! so a payload missing any required field fails deserialisation outright —
//! there is no such thing as a partially valid result.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Plain-language breakdown of one policy document.
///
/// All five fields are mandatory; the rich-text fields (`coverage`,
/// `action_steps`, `reimbursement`) may contain Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Insurer name as printed on the document.
    pub company_name: String,
    /// One-sentence policy-type summary.
    pub summary: String,
    /// What is covered: benefits, treatments, conditions.
    pub coverage: String,
    /// Steps to claim, pre-authorise, or find network providers.
    pub action_steps: String,
    /// Limits, percentages, deductibles, co-pays, caps.
    pub reimbursement: String,
}

/// The response schema declared on every request.
///
/// Mirrors [`AnalysisResult`] field-for-field. Kept as a function (not a
/// static) because the service expects it inline in each request body and
/// `serde_json::Value` is cheap to build.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "companyName": {
                "type": "STRING",
                "description": "The name of the insurance company"
            },
            "summary": {
                "type": "STRING",
                "description": "A one sentence summary of the policy"
            },
            "coverage": {
                "type": "STRING",
                "description": "Detailed explanation of what is covered (markdown supported)"
            },
            "actionSteps": {
                "type": "STRING",
                "description": "Steps to take if sick (markdown supported)"
            },
            "reimbursement": {
                "type": "STRING",
                "description": "Financial details about reimbursement limits (markdown supported)"
            }
        },
        "required": ["companyName", "coverage", "actionSteps", "reimbursement", "summary"]
    })
}

/// Decode the service's textual payload against the contract.
///
/// Any deviation — invalid JSON, a missing required field, a wrong type —
/// is [`AnalysisError::MalformedResponse`] with the serde detail preserved
/// for the logs.
pub fn decode_result(payload: &str) -> Result<AnalysisResult, AnalysisError> {
    serde_json::from_str(payload).map_err(|e| AnalysisError::MalformedResponse {
        detail: e.to_string(),
    })
}
