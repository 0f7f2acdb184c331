use async_trait::async_trait;
use tokio::net::TcpStream;

/// Trait for opening the reliable socket
///
/// The connection calls this from its connect task. Implement it to route
/// through a proxy, bind a local address, or inject failures in tests.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a stream to `endpoint` (`host:port`)
    async fn connect(&self, endpoint: &str) -> std::io::Result<TcpStream>;
}

/// Plain TCP connector with Nagle disabled
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, endpoint: &str) -> std::io::Result<TcpStream> {
        let stream = TcpStream::connect(endpoint).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}
