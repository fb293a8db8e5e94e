use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("You must be signed in to manage favorites")]
    SignedOut,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("Remote query failed: {0}")]
    Remote(String),

    #[error("Backend unreachable: {0}")]
    Backend(#[from] reqwest::Error),
}
