//! The fixed analysis instruction sent with every document.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tweaking how the breakdown is requested
//!    (adding a dimension, changing tone) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the instruction directly
//!    without spinning up a real model, so prompt regressions are easy to
//!    catch.
//!
//! The prompt is deliberately not configurable: the structured-output schema
//! in [`crate::pipeline::schema`] and this instruction form one contract, and
//! letting callers swap half of it would break
//! `MalformedResponse` detection.

/// Instruction accompanying the inline document on every analysis request.
///
/// Asks for exactly three breakdown dimensions (coverage, action plan,
/// reimbursement), the insurer name if visible, and a one-sentence
/// policy-type summary — the five fields the schema requires.
pub const ANALYSIS_PROMPT: &str = r#"You are an expert health insurance policy analyst designed to help ordinary people understand complex insurance documents.

Please analyze the attached insurance document (which might be a policy PDF or an image of a page) and extract specific, easy-to-understand information.

Identify the insurance company name if visible.

Then, provide a detailed but plain-language breakdown for these three specific areas:

1. **Coverage**: What exactly is covered? List key benefits, treatments, hospitalizations, or specific conditions mentioned.
2. **Action Plan**: What should the insured do if they are suffering from a disease? Explain the steps for prior authorization, finding network providers, or starting a claim.
3. **Reimbursement**: How much amount can they get reimbursed? Mention limits, percentages, deductibles, co-pays, or coverage caps.

Also provide a very brief 1-sentence summary of the policy type.

Return the response in JSON format."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_requests_all_three_dimensions() {
        assert!(ANALYSIS_PROMPT.contains("Coverage"));
        assert!(ANALYSIS_PROMPT.contains("Action Plan"));
        assert!(ANALYSIS_PROMPT.contains("Reimbursement"));
    }

    #[test]
    fn prompt_requests_insurer_name_and_summary() {
        assert!(ANALYSIS_PROMPT.contains("company name"));
        assert!(ANALYSIS_PROMPT.contains("1-sentence summary"));
    }
}
