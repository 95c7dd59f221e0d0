//! Transport for the finder client: JSON over websocket for the detection
//! channel, and one-shot JSON GETs for the service's info endpoints.

pub mod error;
pub mod http;
pub mod ws;

pub use error::ComError;
pub use ws::{WsClient, WsReceiver, WsSender, WsServer};

// largest inbound text message accepted
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;
