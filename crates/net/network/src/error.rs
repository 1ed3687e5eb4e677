/// Returned by send operations when the peer's transport is gone.
///
/// Every send site handles this explicitly: the server discards the
/// response, the broadcaster skips the peer, the session moves to
/// `Disconnected(RemoteConnectionReset)`. It never escapes a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("peer is no longer connected")]
pub struct PeerGone;
