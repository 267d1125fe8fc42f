use thiserror::Error;

/// Failures raised by the individual provider clients and by configuration.
///
/// Whether a failure ends the run is decided by the caller: market-data
/// errors halt the pipeline, news errors degrade to an empty article list,
/// and send errors are logged per message.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Transport-level failure (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("Unexpected response status: {status} at {url}")]
    Status { status: u16, url: String },

    /// The provider answered 2xx but reported an error in its payload.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The market-data response had no usable daily series.
    #[error("Time Series (Daily) missing or empty in market-data response")]
    MissingSeries,

    /// Fewer than two trading days were returned, so no change can be derived.
    #[error("need at least two trading days, got {0}")]
    InsufficientHistory(usize),

    /// A field was present but could not be interpreted.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    #[error("environment variable {0} must be set")]
    MissingEnv(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

impl AlertError {
    /// Builds a `Status` error without leaking API keys carried in the query string.
    pub fn status(status: reqwest::StatusCode, url: &reqwest::Url) -> Self {
        let mut url = url.clone();
        url.set_query(None);
        AlertError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;
