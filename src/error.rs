use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    /// Non-success status on a read.
    #[error("fetch {what} failed: HTTP {status}{}", detail(.message))]
    Fetch {
        what: String,
        status: u16,
        message: Option<String>,
    },

    /// The version token presented on a write no longer matches the store.
    #[error(
        "write conflict: {path} changed on the remote since it was loaded (reload and reapply){}",
        detail(.message)
    )]
    Conflict {
        path: String,
        message: Option<String>,
    },

    /// Credential missing, invalid, expired or lacking permission.
    #[error("unauthorized (HTTP {status}; token invalid, expired or lacks repo access){}", detail(.message))]
    Unauthorized { status: u16, message: Option<String> },

    /// Any other non-success status on a write.
    #[error("write rejected: HTTP {status}{}", detail(.message))]
    WriteRejected { status: u16, message: Option<String> },

    /// Stored content is not in the expected shape.
    #[error("decode: {0}")]
    Decode(String),

    /// Input failed validation before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The request never produced an HTTP response.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl CmsError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, CmsError::Conflict { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CmsError::Unauthorized { .. })
    }
}

fn detail(message: &Option<String>) -> String {
    match message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => format!(" ({})", m),
        _ => String::new(),
    }
}

pub type CmsResult<T> = std::result::Result<T, CmsError>;
