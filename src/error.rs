use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No wallet provider found. Please install MetaMask or another Web3 wallet")]
    NoProviderFound,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Request rejected by user")]
    UserRejected,

    #[error("A wallet request is already pending")]
    RequestAlreadyPending,

    #[error("No configuration for chain {0}")]
    ChainNotConfigured(String),

    #[error("No destination chain selected")]
    MissingDestination,

    #[error("Active chain {active} does not match required chain {expected}")]
    WrongNetwork { active: String, expected: String },

    #[error("Token {0} is not owned by the active address")]
    NotOwner(String),

    #[error("No routing token configured for destination chain {0}")]
    UnroutableDestination(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Wallet provider error: {0}")]
    Provider(String),

    #[error("Transaction failed: {0}")]
    OnChain(String),

    #[error("Metadata error: {0}")]
    Metadata(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
