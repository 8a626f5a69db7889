use escrowfloor_core::error::{EscrowError, IdentityError};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("escrow error: {0}")]
    Escrow(#[from] EscrowError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("clock error: {0}")]
    Clock(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
