// Error taxonomy shared by every layer of the client. Orchestration
// operations fail fast and hand one of these back unchanged; the binary
// prints it and turns it into an exit code.

use thiserror::Error;

/// Exit codes (BSD sysexits.h compatible).
pub mod exitcode {
    pub const DATAERR: i32 = 65;
    pub const UNAVAILABLE: i32 = 69;
    pub const SOFTWARE: i32 = 70;
    pub const IOERR: i32 = 74;
    pub const NOPERM: i32 = 77;
    pub const CONFIG: i32 = 78;
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The call never produced an HTTP response (connect, TLS, timeout...).
    #[error("{label} failed: {source}")]
    Transport {
        label: String,
        #[source]
        source: reqwest::Error,
    },

    /// The platform answered with a non-2xx status.
    #[error("{label} failed: {status} - {body}")]
    Status {
        label: String,
        status: u16,
        body: String,
    },

    #[error("could not decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode {what}: {source}")]
    Encode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing or malformed field `{field}`")]
    MissingField { field: String },

    #[error("unknown request status code {0}")]
    UnknownStatus(i64),

    #[error("could not resolve '{input}': {reason}")]
    InputResolution { input: String, reason: String },

    #[error("not authenticated: run `envios login <token>` or set ENVIOS_TOKEN")]
    NotAuthenticated,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn missing(field: impl Into<String>) -> Self {
        ClientError::MissingField {
            field: field.into(),
        }
    }

    /// True for the transport family: no response, or a non-2xx one.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport { .. } | ClientError::Status { .. }
        )
    }

    /// Operation label attached to a transport failure.
    pub fn label(&self) -> Option<&str> {
        match self {
            ClientError::Transport { label, .. } | ClientError::Status { label, .. } => {
                Some(label)
            }
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Transport { .. } | ClientError::Status { .. } => exitcode::UNAVAILABLE,
            ClientError::Decode { .. }
            | ClientError::MissingField { .. }
            | ClientError::UnknownStatus(_)
            | ClientError::InputResolution { .. } => exitcode::DATAERR,
            ClientError::Encode { .. } => exitcode::SOFTWARE,
            ClientError::NotAuthenticated => exitcode::NOPERM,
            ClientError::Config(_) => exitcode::CONFIG,
            ClientError::Io { .. } => exitcode::IOERR,
        }
    }
}
