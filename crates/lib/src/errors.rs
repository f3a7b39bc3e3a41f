use thiserror::Error;

/// Custom error types for the insight-generation pipeline.
///
/// The variants mirror the failure taxonomy of the LLM call path:
/// transport and API failures are retryable, a missing response mode is
/// absorbed by the tier ladder, and schema violations are terminal.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    /// The endpoint rejected the structured-output option. This is a
    /// capability mismatch, not an outage; the invoker falls through to
    /// the next tier and never surfaces this variant to a caller.
    #[error("AI provider does not support the requested response mode: {0}")]
    UnsupportedResponseMode(String),
    #[error("No parseable JSON object found in model output: {0}")]
    Extraction(String),
    #[error("Model returned non-JSON output; this provider response is unusable: {0}")]
    NonJsonOutput(serde_json::Error),
    #[error("Missing key in model JSON output: {0}")]
    MissingKey(String),
    #[error("All {attempts} attempts against the AI provider failed; last error: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<InsightError>,
    },
    #[error("API key is missing")]
    MissingApiKey,
}

impl InsightError {
    /// Whether the tier ladder may fall through to a weaker call shape.
    ///
    /// Only a capability mismatch qualifies. Network, auth, rate-limit
    /// and server errors must propagate so real outages are not masked
    /// as missing features.
    pub fn is_capability_mismatch(&self) -> bool {
        matches!(self, InsightError::UnsupportedResponseMode(_))
    }
}
