// Error taxonomy for the vault client.
// Every workflow returns `Result<T, ClientError>`; the command loop prints
// the error and moves on to the next command.

use thiserror::Error;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection failure or an unreadable response body.
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("server returned {status} for {path}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    /// HTTP 401 on a data call: the session token is missing or stale.
    #[error("authorization required for {path}: log in or register first")]
    Unauthorized { path: String },

    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("response did not set the `{0}` session cookie")]
    MissingCookie(String),

    #[error("invalid value for header {name}: {reason}")]
    Header { name: String, reason: String },

    #[error("input error: {0}")]
    Input(#[from] std::io::Error),

    #[error("input closed before a value was entered")]
    InputClosed,

    /// The prompt was interrupted (Ctrl+C on a terminal).
    #[error("input interrupted")]
    Interrupted,

    #[error("no record with id {0}")]
    RecordNotFound(u64),

    #[error("record {id} has unsupported data type `{data_type}`")]
    UnsupportedKind { id: u64, data_type: String },
}

impl ClientError {
    /// True when the input source itself is gone, so no further command can
    /// be read.
    pub fn is_input_closed(&self) -> bool {
        matches!(self, ClientError::InputClosed)
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, ClientError::Interrupted)
            || matches!(self, ClientError::Input(e) if e.kind() == std::io::ErrorKind::Interrupted)
    }
}
