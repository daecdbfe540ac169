//! Configuration for the analysis client.
//!
//! All client behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks and to diff two runs when their
//! outcomes differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about — most users need
//! nothing beyond `GEMINI_API_KEY` in the environment — while tests can point
//! `api_base_url` at a local stub without touching anything else.

use crate::error::AnalysisError;
use std::fmt;

/// Environment variable holding the service credential.
///
/// The value is treated as an opaque secret — never parsed, validated, or
/// logged by this crate.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Default model identifier, matching the document-understanding tier the
/// analysis prompt was tuned against.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default API endpoint root.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for [`crate::pipeline::client::AnalysisClient`].
///
/// # Example
/// ```rust
/// use policylens::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .api_key("secret")
///     .model("gemini-3-flash-preview")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Service credential. If `None`, resolved from [`API_KEY_ENV_VAR`] at
    /// build time.
    pub api_key: String,

    /// Model identifier appended to the `generateContent` path.
    pub model: String,

    /// Endpoint root. Overridable so tests can target a local stub server.
    pub api_base_url: String,

    /// Per-call timeout in seconds. Default: 60.
    ///
    /// Policy documents are dense; the service typically answers in 10–20 s.
    /// A timeout surfaces as `AnalysisError::TransportFailure` — there is no
    /// internal retry.
    pub api_timeout_secs: u64,

    /// Maximum tokens the model may generate. Default: 4096.
    ///
    /// The five-field breakdown of a long policy can run past 2 000 output
    /// tokens; setting this too low truncates the JSON mid-object and turns
    /// an otherwise good response into `MalformedResponse`.
    pub max_output_tokens: usize,
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // api_key deliberately redacted
        f.debug_struct("AnalysisConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Build a config entirely from the environment.
    ///
    /// Equivalent to `AnalysisConfig::builder().build()` — requires
    /// `GEMINI_API_KEY` to be set.
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::builder().build()
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    api_base_url: Option<String>,
    api_timeout_secs: Option<u64>,
    max_output_tokens: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Explicit credential; takes precedence over the environment.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the endpoint root (trailing slash stripped).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.api_timeout_secs = Some(secs);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.max_output_tokens = Some(n);
        self
    }

    /// Build the configuration, validating constraints and resolving the
    /// credential from [`API_KEY_ENV_VAR`] when no explicit key was given.
    pub fn build(self) -> Result<AnalysisConfig, AnalysisError> {
        let api_key = match self.api_key {
            Some(k) if !k.is_empty() => k,
            Some(_) => return Err(AnalysisError::ApiKeyMissing),
            None => match std::env::var(API_KEY_ENV_VAR) {
                Ok(k) if !k.is_empty() => k,
                _ => return Err(AnalysisError::ApiKeyMissing),
            },
        };

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.is_empty() {
            return Err(AnalysisError::InvalidConfig("model must not be empty".into()));
        }

        let api_base_url = self
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if api_base_url.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "api_base_url must not be empty".into(),
            ));
        }

        let api_timeout_secs = self.api_timeout_secs.unwrap_or(60);
        if api_timeout_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }

        Ok(AnalysisConfig {
            api_key,
            model,
            api_base_url,
            api_timeout_secs,
            max_output_tokens: self.max_output_tokens.unwrap_or(4096),
        })
    }
}
