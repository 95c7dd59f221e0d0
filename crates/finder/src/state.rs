use std::fmt;

/// Lifecycle of one stream channel instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Errored,
}

/// Everything that can happen to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// `connect` was called.
    Connect,
    /// The websocket handshake completed.
    Opened,
    /// Handshake failure, handshake timeout or a transport error mid-stream.
    Failed,
    /// The service closed the connection.
    RemoteClosed,
    /// The local side closed the channel.
    Close,
}

impl ConnectionState {
    /// The whole transition table. Events that make no sense in the current
    /// state leave it unchanged; `Errored` only leaves through a local close.
    pub fn apply(self, event: ChannelEvent) -> ConnectionState {
        use {ChannelEvent::*, ConnectionState::*};
        match (self, event) {
            (_, Close) => Disconnected,
            (Disconnected, Connect) => Connecting,
            (Connecting, Opened) => Connected,
            (Connecting | Connected, Failed) => Errored,
            (Connecting, RemoteClosed) => Errored,
            (Connected, RemoteClosed) => Disconnected,
            (state, _) => state,
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Errored => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
