//! The error taxonomy of peer requests and downloads.

use basalt_primitives::{BlockNumber, WithPeerId};
use tokio::sync::{mpsc, oneshot};

/// Result alias for the result of a request.
pub type RequestResult<T> = Result<T, RequestError>;

/// Result alias for a request answered by a peer, carrying the responder's
/// id.
pub type PeerRequestResult<T> = RequestResult<WithPeerId<T>>;

/// Error variants that can happen when sending requests to a session.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Closed channel to the peer.
    #[error("closed channel to the peer")]
    ChannelClosed,
    /// Not connected to the peer.
    #[error("not connected to the peer")]
    NotConnected,
    /// Connection to a peer dropped while handling the request.
    #[error("connection to a peer dropped while handling the request")]
    ConnectionDropped,
    /// Request timed out while awaiting response.
    #[error("request timed out while awaiting response")]
    Timeout,
    /// Received bad response.
    #[error("received bad response")]
    BadResponse,
}

impl<T> From<mpsc::error::SendError<T>> for RequestError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        RequestError::ChannelClosed
    }
}

impl From<oneshot::error::RecvError> for RequestError {
    fn from(_: oneshot::error::RecvError) -> Self {
        RequestError::ChannelClosed
    }
}

/// Result alias for a download attempt.
pub type DownloadResult<T> = Result<T, DownloadError>;

/// Errors a header download can produce.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// No response arrived within the request timeout.
    #[error("download request timed out")]
    Timeout,
    /// The peer answered with fewer headers than the range requires.
    #[error("peer returned {received} headers, expected {expected}")]
    IncompleteResponse {
        /// The number of headers in the response.
        received: usize,
        /// The number of headers the range requires.
        expected: usize,
    },
    /// A parent-hash link between two adjacent headers does not hold.
    #[error("header {number} does not link to its child by parent hash")]
    LinkageViolation {
        /// The block number at which the chain of parent hashes breaks.
        number: BlockNumber,
    },
    /// Every allowed attempt has been used up.
    #[error("header download exhausted all retries")]
    MaxRetriesReached,
    /// The download was cancelled by its owner.
    #[error("header download was cancelled")]
    Cancelled,
    /// The underlying peer request failed.
    #[error(transparent)]
    RequestError(#[from] RequestError),
}

// === impl DownloadError ===

impl DownloadError {
    /// Whether this failure consumes a retry instead of aborting the
    /// download.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DownloadError::Timeout |
                DownloadError::IncompleteResponse { .. } |
                DownloadError::LinkageViolation { .. } |
                DownloadError::RequestError(_)
        )
    }
}
