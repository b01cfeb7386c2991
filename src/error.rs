use thiserror::Error;

use crate::domain::trade::TradeState;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors from the REST execution endpoint.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("execution rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("invalid execution request: {0}")]
    InvalidRequest(String),

    #[error("opportunity {opportunity_id} cannot be executed: {reason}")]
    Unavailable {
        opportunity_id: String,
        reason: String,
    },
}

/// Errors raised by the on-chain gateway.
///
/// The Display text is what [`FailureKind::classify`](crate::domain::trade::FailureKind::classify)
/// inspects, so provider messages are carried through verbatim.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("no wallet account configured")]
    NoAccount,

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("timed out waiting for receipt of {tx_hash}")]
    ReceiptTimeout { tx_hash: String },

    #[error("rpc error: {0}")]
    Rpc(String),
}

/// Synchronous preconditions of the trade guard.
///
/// Everything that can go wrong after the preconditions pass is reported as a
/// [`TradeOutcome`](crate::domain::trade::TradeOutcome) instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradeError {
    #[error("no wallet connected")]
    NoWallet,

    #[error("a trade is already in progress ({state})")]
    Busy { state: TradeState },

    #[error("invalid trade amount: {0}")]
    InvalidAmount(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Trade(#[from] TradeError),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    /// An operation ran but did not reach its goal; the detail was already
    /// shown to the user.
    #[error("{0}")]
    Incomplete(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}
