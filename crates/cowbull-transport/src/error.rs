/// What went wrong below the message layer.
///
/// The underlying cause is kept as an `io::Error` so tungstenite types do
/// not leak into the public API.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer is gone, or a test double's channel was dropped.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Dialing the server, or the client handshake, failed.
    #[error("could not connect: {0}")]
    ConnectFailed(#[source] std::io::Error),

    #[error("could not send frame: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("could not receive frame: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener, or a server-side handshake, failed.
    #[error("could not accept connection: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
