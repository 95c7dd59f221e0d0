use std::fmt;

#[derive(Debug)]
pub enum ComError {
    Io(std::io::Error),
    WebSocket(tokio_websockets::Error),
    InvalidUri(String),
    Timeout,
    ConnectionClosed,
    MessageTooLarge(usize),
    Json(serde_json::Error),
    Http(String),
}

impl fmt::Display for ComError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComError::Io(err) => write!(f, "io error: {err}"),
            ComError::WebSocket(err) => write!(f, "websocket error: {err}"),
            ComError::InvalidUri(msg) => write!(f, "invalid uri: {msg}"),
            ComError::Timeout => write!(f, "timed out"),
            ComError::ConnectionClosed => write!(f, "connection closed"),
            ComError::MessageTooLarge(len) => write!(f, "message too large: {len} bytes"),
            ComError::Json(err) => write!(f, "json error: {err}"),
            ComError::Http(msg) => write!(f, "http error: {msg}"),
        }
    }
}

impl std::error::Error for ComError {}

impl From<std::io::Error> for ComError {
    fn from(err: std::io::Error) -> Self {
        ComError::Io(err)
    }
}

impl From<tokio_websockets::Error> for ComError {
    fn from(err: tokio_websockets::Error) -> Self {
        ComError::WebSocket(err)
    }
}

impl From<serde_json::Error> for ComError {
    fn from(err: serde_json::Error) -> Self {
        ComError::Json(err)
    }
}

impl From<::http::uri::InvalidUri> for ComError {
    fn from(err: ::http::uri::InvalidUri) -> Self {
        ComError::InvalidUri(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ComError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ComError::Timeout
    }
}
