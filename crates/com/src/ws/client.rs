use {
    crate::{ComError, MAX_MESSAGE_SIZE},
    futures_util::{
        SinkExt, StreamExt,
        stream::{SplitSink, SplitStream},
    },
    serde::Serialize,
    tokio::net::TcpStream,
    tokio_websockets::{ClientBuilder, MaybeTlsStream, Message, WebSocketStream},
};

type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WsClient {
    stream: ClientStream,
}

impl WsClient {
    /// Connect to a websocket endpoint such as `ws://host:port/path`.
    pub async fn connect(uri: &str) -> Result<Self, ComError> {
        let parsed_uri: ::http::Uri = uri.parse()?;
        match parsed_uri.scheme_str() {
            Some("ws") | Some("wss") => {}
            other => {
                return Err(ComError::InvalidUri(format!(
                    "expected ws:// or wss://, got {:?}",
                    other
                )));
            }
        }
        let (stream, _response) = ClientBuilder::from_uri(parsed_uri).connect().await?;
        Ok(Self { stream })
    }

    pub async fn send_text(&mut self, text: String) -> Result<(), ComError> {
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    pub async fn send_json<T: Serialize>(&mut self, value: &T) -> Result<(), ComError> {
        self.send_text(serde_json::to_string(value)?).await
    }

    pub async fn recv_text(&mut self) -> Result<String, ComError> {
        next_text(&mut self.stream).await
    }

    pub async fn close(mut self) -> Result<(), ComError> {
        self.stream.close().await?;
        Ok(())
    }

    /// Split into independently usable send and receive halves.
    pub fn split(self) -> (WsSender, WsReceiver) {
        let (sink, stream) = self.stream.split();
        (WsSender { sink }, WsReceiver { stream })
    }
}

pub struct WsSender {
    sink: SplitSink<ClientStream, Message>,
}

impl WsSender {
    pub async fn send_text(&mut self, text: String) -> Result<(), ComError> {
        self.sink.send(Message::text(text)).await?;
        Ok(())
    }

    pub async fn send_json<T: Serialize>(&mut self, value: &T) -> Result<(), ComError> {
        self.send_text(serde_json::to_string(value)?).await
    }

    pub async fn close(&mut self) -> Result<(), ComError> {
        self.sink.close().await?;
        Ok(())
    }
}

pub struct WsReceiver {
    stream: SplitStream<ClientStream>,
}

impl WsReceiver {
    /// Receive the next text message.
    ///
    /// Returns `ComError::ConnectionClosed` once the peer has closed the
    /// connection. Binary frames that are valid UTF-8 are treated as text;
    /// other frames are skipped.
    pub async fn recv_text(&mut self) -> Result<String, ComError> {
        next_text(&mut self.stream).await
    }
}

async fn next_text<S>(stream: &mut S) -> Result<String, ComError>
where
    S: futures_core::Stream<Item = Result<Message, tokio_websockets::Error>> + Unpin,
{
    loop {
        match stream.next().await {
            Some(Ok(msg)) => {
                if let Some(text) = msg.as_text() {
                    if text.len() > MAX_MESSAGE_SIZE {
                        return Err(ComError::MessageTooLarge(text.len()));
                    }
                    return Ok(text.to_string());
                }
                if msg.is_binary() {
                    let payload = msg.into_payload();
                    if payload.len() > MAX_MESSAGE_SIZE {
                        return Err(ComError::MessageTooLarge(payload.len()));
                    }
                    if let Ok(text) = std::str::from_utf8(&payload) {
                        return Ok(text.to_string());
                    }
                }
                // ping, pong, close and non-utf8 binary frames
            }
            Some(Err(e)) => return Err(ComError::from(e)),
            None => return Err(ComError::ConnectionClosed),
        }
    }
}
