//! Common test utilities for linkwire integration tests
//!
//! A mock peer speaking the JSON codec over plain TCP, plus event helpers.

#![allow(dead_code)]

use linkwire::codec::{JsonCodec, WireMessage};
use linkwire::{ClientConnection, ConnectionEvent, EventReceiver, FrameReceiver, Protocol};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How long any single wait in a test may take before it fails
pub const WAIT: Duration = Duration::from_secs(5);

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// A listening mock server; each accepted socket becomes a [`MockPeer`]
pub struct MockServer {
    pub addr: SocketAddr,
    listener: TcpListener,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { addr, listener }
    }

    pub fn endpoint(&self) -> String {
        self.addr.to_string()
    }

    pub async fn accept(&self) -> MockPeer {
        let (stream, _) = tokio::time::timeout(WAIT, self.listener.accept())
            .await
            .expect("no client connected")
            .unwrap();
        MockPeer::new(stream)
    }
}

/// Server side of one accepted connection
pub struct MockPeer {
    stream: TcpStream,
    receiver: FrameReceiver,
}

impl MockPeer {
    fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            receiver: FrameReceiver::new(4096, 1024 * 1024),
        }
    }

    pub async fn send(&mut self, message: &WireMessage) {
        let frame = JsonCodec.to_frame(message).unwrap();
        self.send_raw(&frame).await;
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
    }

    /// Next message from the client, `None` once the client closed the socket
    pub async fn recv(&mut self) -> Option<WireMessage> {
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(decoded) = self.receiver.next_message(&JsonCodec).unwrap() {
                return Some(decoded.message);
            }
            let n = tokio::time::timeout(WAIT, self.stream.read(&mut chunk))
                .await
                .expect("client sent nothing")
                .ok()?;
            if n == 0 {
                return None;
            }
            self.receiver.extend(&chunk[..n]);
        }
    }

    /// Read the client's handshake request and return the offered protocols
    pub async fn expect_connect(&mut self) -> Vec<Protocol> {
        match self.recv().await {
            Some(WireMessage::Connect { protocols }) => protocols,
            other => panic!("expected Connect, got {:?}", other),
        }
    }

    /// Complete the handshake, answering with `supported`
    pub async fn handshake(&mut self, supported: &[Protocol]) -> Vec<Protocol> {
        let offered = self.expect_connect().await;
        self.send(&WireMessage::Connected {
            protocols: supported.to_vec(),
        })
        .await;
        offered
    }

    /// Wait until the client closes its side of the socket
    pub async fn expect_closed(&mut self) {
        while self.recv().await.is_some() {}
    }

    pub async fn close(mut self) {
        let _ = self.stream.shutdown().await;
    }
}

/// Poll for the next event without blocking the runtime
pub async fn next_event<M>(events: &EventReceiver<M>) -> ConnectionEvent<M> {
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        if let Some(event) = events.try_recv() {
            return event;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("no event within {:?}", WAIT);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Assert that nothing further is published for `quiet`
pub async fn assert_no_event<M: std::fmt::Debug>(events: &EventReceiver<M>, quiet: Duration) {
    tokio::time::sleep(quiet).await;
    if let Some(event) = events.try_recv() {
        panic!("unexpected event: {:?}", event);
    }
}

/// Wait for in-flight socket work of a torn-down connection to finish
pub async fn wait_idle<C: linkwire::MessageCodec>(connection: &ClientConnection<C>) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while connection.pending_operations() > 0 {
        if tokio::time::Instant::now() >= deadline {
            panic!("{} operations still pending", connection.pending_operations());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// A connection offering `protocols` with default settings
pub fn client(protocols: &[Protocol]) -> ClientConnection<JsonCodec> {
    linkwire::builder()
        .codec(JsonCodec::new())
        .protocols(protocols.iter().copied())
        .connect_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

/// Connect `connection` to `server` and finish the handshake
pub async fn connect_and_handshake(
    connection: &ClientConnection<JsonCodec>,
    server: &MockServer,
    events: &EventReceiver<WireMessage>,
    supported: &[Protocol],
) -> MockPeer {
    connection
        .connect(server.endpoint(), linkwire::MessageTypes::RELIABLE)
        .await
        .unwrap();
    let mut peer = server.accept().await;
    peer.handshake(supported).await;
    match next_event(events).await {
        ConnectionEvent::Connected { .. } => {}
        other => panic!("expected Connected, got {:?}", other),
    }
    peer
}
