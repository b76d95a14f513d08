use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::UdpSocket;

/// Destination for whole datagrams.
#[async_trait]
pub trait DatagramSink: Send + Sync {
    async fn send_to(&self, datagram: &[u8], target: SocketAddr) -> io::Result<usize>;
}

#[async_trait]
impl DatagramSink for UdpSocket {
    async fn send_to(&self, datagram: &[u8], target: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, datagram, target).await
    }
}

#[async_trait]
impl<T: DatagramSink + ?Sized> DatagramSink for Arc<T> {
    async fn send_to(&self, datagram: &[u8], target: SocketAddr) -> io::Result<usize> {
        (**self).send_to(datagram, target).await
    }
}
