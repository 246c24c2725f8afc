use thiserror::Error;

/// Client-side errors for the favorites API.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
