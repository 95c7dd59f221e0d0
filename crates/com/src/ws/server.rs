use {
    crate::{ComError, MAX_MESSAGE_SIZE},
    base::*,
    futures_util::{SinkExt, StreamExt},
    serde::Serialize,
    std::{collections::HashMap, net::SocketAddr, sync::Arc},
    tokio::{
        net::{TcpListener, ToSocketAddrs},
        sync::{RwLock, mpsc},
        task::JoinHandle,
    },
    tokio_websockets::{Message, ServerBuilder, WebSocketStream},
};

type WsSink = futures_util::stream::SplitSink<WebSocketStream<tokio::net::TcpStream>, Message>;

/// A text-message websocket server.
///
/// Every accepted client gets its own reader task; inbound messages from all
/// clients are multiplexed into one queue tagged with the sender's address.
pub struct WsServer {
    clients: Arc<RwLock<HashMap<SocketAddr, WsSink>>>,
    rx: mpsc::Receiver<(SocketAddr, String)>,
    accept_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl WsServer {
    /// Bind a TCP listener and start accepting websocket connections on any path.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let clients: Arc<RwLock<HashMap<SocketAddr, WsSink>>> =
            Arc::new(RwLock::new(HashMap::new()));
        let clients_clone = clients.clone();

        let (tx, rx) = mpsc::channel(256);

        // Spawn accept loop
        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((tcp_stream, addr)) => {
                        let ws_stream = match ServerBuilder::new().accept(tcp_stream).await {
                            Ok((_request, ws_stream)) => ws_stream,
                            Err(e) => {
                                log_warn!("websocket handshake failed for {}: {}", addr, e);
                                continue;
                            }
                        };

                        let (write_half, read_half) = ws_stream.split();
                        clients_clone.write().await.insert(addr, write_half);

                        let tx = tx.clone();
                        let clients_for_cleanup = clients_clone.clone();
                        tokio::spawn(async move {
                            let mut reader = read_half;
                            loop {
                                match reader.next().await {
                                    Some(Ok(msg)) => {
                                        let Some(text) = msg.as_text() else {
                                            continue; // control and binary frames
                                        };
                                        if text.len() > MAX_MESSAGE_SIZE {
                                            log_warn!(
                                                "message from {} too large: {} bytes",
                                                addr,
                                                text.len()
                                            );
                                            continue;
                                        }
                                        if tx.send((addr, text.to_string())).await.is_err() {
                                            break; // server dropped
                                        }
                                    }
                                    Some(Err(e)) => {
                                        log_warn!("client {} error: {}", addr, e);
                                        clients_for_cleanup.write().await.remove(&addr);
                                        break;
                                    }
                                    None => {
                                        log_debug!("client {} disconnected", addr);
                                        clients_for_cleanup.write().await.remove(&addr);
                                        break;
                                    }
                                }
                            }
                        });
                    }
                    Err(e) => {
                        log_warn!("accept error: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    }
                }
            }
        });

        Ok(Self {
            clients,
            rx,
            accept_task,
            local_addr,
        })
    }

    /// Send a text message to one client.
    pub async fn send_text_to(&self, addr: SocketAddr, text: String) -> Result<(), ComError> {
        let mut lock = self.clients.write().await;
        let Some(writer) = lock.get_mut(&addr) else {
            return Err(ComError::ConnectionClosed);
        };
        if let Err(e) = writer.send(Message::text(text)).await {
            lock.remove(&addr);
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn send_json_to<T: Serialize>(
        &self,
        addr: SocketAddr,
        value: &T,
    ) -> Result<(), ComError> {
        self.send_text_to(addr, serde_json::to_string(value)?).await
    }

    /// Send a text message to every connected client.
    ///
    /// Clients that fail to receive are dropped from the client map.
    pub async fn broadcast_text(&self, text: String) -> Result<(), ComError> {
        let msg = Message::text(text);
        let mut lock = self.clients.write().await;
        let mut failed_addrs = Vec::new();
        for (addr, writer) in lock.iter_mut() {
            if let Err(e) = writer.send(msg.clone()).await {
                log_warn!("failed to send to {}: {}", addr, e);
                failed_addrs.push(*addr);
            }
        }
        for addr in failed_addrs {
            lock.remove(&addr);
        }
        Ok(())
    }

    /// Close every client connection, keep listening.
    pub async fn disconnect_all(&self) {
        let mut lock = self.clients.write().await;
        for (addr, mut writer) in lock.drain() {
            if let Err(e) = writer.close().await {
                log_debug!("closing {} failed: {}", addr, e);
            }
        }
    }

    /// Receive the next message from any client.
    pub async fn recv(&mut self) -> Result<(SocketAddr, String), ComError> {
        self.rx.recv().await.ok_or(ComError::ConnectionClosed)
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for WsServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}
