//! Connector capability.
//!
//! The dialer is the only I/O boundary of the crate: the checker hands
//! it a canonical `host:port` address, a transport kind and a timeout,
//! and gets back a connection handle or an error. `SystemDialer` is
//! the default blocking implementation; tests and restricted
//! environments substitute their own.

use std::fmt;
use std::io;
use std::net::{
    IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket,
};
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::error::{ReachError, Result};

#[cfg(feature = "async")]
use async_trait::async_trait;
#[cfg(feature = "async")]
use tokio::net::{TcpStream as TokioTcpStream, UdpSocket as TokioUdpSocket};

/// Transport kind used for the connection attempt.
///
/// The `4`/`6` variants restrict the probe to that address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// TCP over either address family (default)
    #[default]
    Tcp,
    /// TCP over IPv4 only
    Tcp4,
    /// TCP over IPv6 only
    Tcp6,
    /// UDP over either address family
    Udp,
    /// UDP over IPv4 only
    Udp4,
    /// UDP over IPv6 only
    Udp6,
}

impl Network {
    /// Whether this kind uses datagram sockets.
    pub fn is_udp(&self) -> bool {
        matches!(self, Network::Udp | Network::Udp4 | Network::Udp6)
    }

    /// The wire name of this kind, e.g. `"tcp6"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Tcp4 => "tcp4",
            Network::Tcp6 => "tcp6",
            Network::Udp => "udp",
            Network::Udp4 => "udp4",
            Network::Udp6 => "udp6",
        }
    }

    /// Whether `addr` belongs to the address family this kind allows.
    fn allows(&self, addr: &SocketAddr) -> bool {
        match self {
            Network::Tcp | Network::Udp => true,
            Network::Tcp4 | Network::Udp4 => addr.is_ipv4(),
            Network::Tcp6 | Network::Udp6 => addr.is_ipv6(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ReachError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tcp" => Ok(Network::Tcp),
            "tcp4" => Ok(Network::Tcp4),
            "tcp6" => Ok(Network::Tcp6),
            "udp" => Ok(Network::Udp),
            "udp4" => Ok(Network::Udp4),
            "udp6" => Ok(Network::Udp6),
            other => Err(ReachError::InvalidNetwork(other.to_string())),
        }
    }
}

/// Connection handle returned by a dialer.
///
/// A probe never reads or writes; the handle only has to be
/// releasable. Closing consumes it.
pub trait Conn: Send + Sync {
    /// Release the connection.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Async connection handle.
#[cfg(feature = "async")]
#[async_trait]
pub trait AsyncConn: Send + Sync {
    /// Release the connection.
    async fn close(self: Box<Self>) -> io::Result<()>;
}

/// Dialer capability interface.
pub trait Dialer: Send + Sync {
    /// Attempt one connection to `address` (canonical `host:port`
    /// form) within `timeout`.
    fn dial(&self, network: Network, address: &str, timeout: Duration) -> Result<Box<dyn Conn>>;
}

/// Async dialer capability interface.
#[cfg(feature = "async")]
#[async_trait]
pub trait AsyncDialer: Send + Sync {
    /// Attempt one connection to `address` (canonical `host:port`
    /// form) within `timeout`.
    async fn dial(
        &self,
        network: Network,
        address: &str,
        timeout: Duration,
    ) -> Result<Box<dyn AsyncConn>>;
}

/// Default dialer using the OS resolver and plain sockets.
///
/// Name resolution failures, connect failures and timeouts all surface
/// as [`ReachError::Dial`], untranslated.
#[derive(Debug, Clone, Copy)]
pub struct SystemDialer;

impl SystemDialer {
    /// Create a new system dialer.
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemDialer {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialer for SystemDialer {
    fn dial(&self, network: Network, address: &str, timeout: Duration) -> Result<Box<dyn Conn>> {
        let addrs: Vec<SocketAddr> = address
            .to_socket_addrs()?
            .filter(|a| network.allows(a))
            .collect();
        let first = match addrs.first() {
            Some(addr) => *addr,
            None => return Err(no_address(network, address)),
        };

        if network.is_udp() {
            // UDP is connectionless; binding and connecting the socket
            // is the closest analogue of a dial.
            let socket = UdpSocket::bind(unspecified_addr(first.is_ipv6()))?;
            socket.connect(first)?;
            return Ok(Box::new(StdUdpConn::new(socket)));
        }

        // Walk the candidates under one shared deadline so the whole
        // dial never outlives the timeout.
        let deadline = Instant::now() + timeout;
        let mut last_err: Option<io::Error> = None;
        for addr in addrs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(stream) => return Ok(Box::new(StdTcpConn::new(stream))),
                Err(e) => last_err = Some(e),
            }
        }
        Err(ReachError::Dial(
            last_err.unwrap_or_else(|| timed_out(address)),
        ))
    }
}

#[cfg(feature = "async")]
#[async_trait]
impl AsyncDialer for SystemDialer {
    async fn dial(
        &self,
        network: Network,
        address: &str,
        timeout: Duration,
    ) -> Result<Box<dyn AsyncConn>> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(address)
            .await?
            .filter(|a| network.allows(a))
            .collect();
        let first = match addrs.first() {
            Some(addr) => *addr,
            None => return Err(no_address(network, address)),
        };

        if network.is_udp() {
            let socket = TokioUdpSocket::bind(unspecified_addr(first.is_ipv6())).await?;
            socket.connect(first).await?;
            return Ok(Box::new(TokioUdpConn::new(socket)));
        }

        let deadline = tokio::time::Instant::now() + timeout;
        let mut last_err: Option<io::Error> = None;
        for addr in addrs {
            match tokio::time::timeout_at(deadline, TokioTcpStream::connect(addr)).await {
                Ok(Ok(stream)) => return Ok(Box::new(TokioTcpConn::new(stream))),
                Ok(Err(e)) => last_err = Some(e),
                Err(_) => {
                    last_err = Some(timed_out(address));
                    break;
                }
            }
        }
        Err(ReachError::Dial(
            last_err.unwrap_or_else(|| timed_out(address)),
        ))
    }
}

/// Standard TcpStream wrapper implementing Conn
pub struct StdTcpConn {
    inner: TcpStream,
}

impl StdTcpConn {
    pub fn new(stream: TcpStream) -> Self {
        Self { inner: stream }
    }
}

impl Conn for StdTcpConn {
    fn close(self: Box<Self>) -> io::Result<()> {
        self.inner.shutdown(Shutdown::Both)
    }
}

/// Standard UdpSocket wrapper implementing Conn
pub struct StdUdpConn {
    inner: UdpSocket,
}

impl StdUdpConn {
    pub fn new(socket: UdpSocket) -> Self {
        Self { inner: socket }
    }
}

impl Conn for StdUdpConn {
    fn close(self: Box<Self>) -> io::Result<()> {
        // UdpSocket has no explicit close, it closes on drop
        Ok(())
    }
}

/// Tokio TcpStream wrapper implementing AsyncConn
#[cfg(feature = "async")]
pub struct TokioTcpConn {
    inner: TokioTcpStream,
}

#[cfg(feature = "async")]
impl TokioTcpConn {
    pub fn new(stream: TokioTcpStream) -> Self {
        Self { inner: stream }
    }
}

#[cfg(feature = "async")]
#[async_trait]
impl AsyncConn for TokioTcpConn {
    async fn close(self: Box<Self>) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;

        let mut stream = self.inner;
        stream.shutdown().await
    }
}

/// Tokio UdpSocket wrapper implementing AsyncConn
#[cfg(feature = "async")]
pub struct TokioUdpConn {
    inner: TokioUdpSocket,
}

#[cfg(feature = "async")]
impl TokioUdpConn {
    pub fn new(socket: TokioUdpSocket) -> Self {
        Self { inner: socket }
    }
}

#[cfg(feature = "async")]
#[async_trait]
impl AsyncConn for TokioUdpConn {
    async fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

/// Local bind address of the same family as the dial target.
fn unspecified_addr(ipv6: bool) -> SocketAddr {
    if ipv6 {
        SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
    } else {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
    }
}

fn no_address(network: Network, address: &str) -> ReachError {
    ReachError::Dial(io::Error::new(
        io::ErrorKind::AddrNotAvailable,
        format!("no {} address found for {}", network, address),
    ))
}

fn timed_out(address: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("connection to {} timed out", address),
    )
}
