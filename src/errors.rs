use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error("server rejected the event")]
    Rejected,

    #[error("malformed reply: {0}")]
    Malformed(String),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
}

impl TrackError {
    pub fn transport(err: impl std::error::Error) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn malformed(err: impl std::error::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<reqwest::Error> for TrackError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::malformed(err);
        }
        match err.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::transport(err),
        }
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err)
    }
}
