use thiserror::Error;

/// Errors returned by the OpenRouter rater client.
#[derive(Debug, Error)]
pub enum RaterError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {model}: {body}")]
    UnexpectedStatus {
        model: String,
        status: u16,
        body: String,
    },

    /// The completion envelope carried no choices.
    #[error("empty completion from {model}")]
    EmptyCompletion { model: String },

    /// The completion content was not the JSON object the prompt demanded.
    #[error("malformed opinion JSON from {model}: {source}")]
    MalformedOpinion {
        model: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion envelope itself could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not a valid URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
