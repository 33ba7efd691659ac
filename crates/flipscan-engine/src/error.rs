use thiserror::Error;

/// Failures talking to the text-generation service.
///
/// These never cross the public engine operations: expansion, search, and
/// scoring absorb them and degrade to their deterministic fallbacks.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Connection refused, DNS failure, or the request timed out.
    #[error("generative service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generative service returned status {status}")]
    Status { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expansion is not a JSON array: {0}")]
    MalformedExpansion(String),

    #[error("generative service returned an empty response")]
    EmptyResponse,
}
