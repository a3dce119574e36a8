//! Error types shared by the transport, the Ethereum client and the bridge.

use crate::jsonrpc::{self, Id};
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// The broad category of an [`Error`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The request did not make it to the node and back: connection failure,
    /// timeout or a non-success HTTP status.
    Transport,
    /// The node answered with a JSON RPC error object.
    Rpc,
    /// The node answered with something that could not be decoded.
    Decode,
    /// The caller provided invalid input.
    InvalidArgument,
    /// The operation was cancelled before it completed.
    Cancelled,
}

/// An error produced by an Ethereum RPC call or a bridged task.
///
/// Foreign error sources are reference counted so that errors can be cloned.
#[derive(Clone, Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] Arc<reqwest::Error>),
    #[error("HTTP {0} error: {1}")]
    Status(StatusCode, String),
    #[error("RPC error: {0}")]
    Rpc(#[from] jsonrpc::Error),
    #[error("JSON error: {0}")]
    Json(#[from] Arc<serde_json::Error>),
    #[error("response ID {actual} does not match request ID {expected}")]
    IdMismatch { expected: Id, actual: Id },
    #[error("block {0} not found")]
    BlockNotFound(u64),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status(..) => ErrorKind::Transport,
            Self::Rpc(_) => ErrorKind::Rpc,
            Self::Json(_) | Self::IdMismatch { .. } | Self::BlockNotFound(_) => ErrorKind::Decode,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::from(Arc::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::from(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let json = serde_json::from_str::<u64>("nope").unwrap_err();
        assert_eq!(Error::from(json).kind(), ErrorKind::Decode);
        assert_eq!(
            Error::from(jsonrpc::Error::custom("boom")).kind(),
            ErrorKind::Rpc
        );
        assert_eq!(
            Error::InvalidArgument("bad".to_owned()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn clones_preserve_details() {
        let err = Error::from(jsonrpc::Error::custom("boom"));
        assert_eq!(err.clone().to_string(), err.to_string());
        assert_eq!(err.to_string(), "RPC error: internal error: boom");
    }
}
