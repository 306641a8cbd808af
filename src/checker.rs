//! Reachability checking.
//!
//! A checker owns the probe configuration (dialer, timeout, transport
//! kind) and performs one resolve-dial-close round per call. It holds
//! no per-call state, so one instance can be shared freely across
//! threads.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::addr::resolve;
use crate::dialer::{Dialer, Network, SystemDialer};
use crate::error::Result;

#[cfg(feature = "async")]
use crate::dialer::AsyncDialer;

/// Default timeout for a connection attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default transport kind.
pub const DEFAULT_NETWORK: Network = Network::Tcp;

/// Reachability checker with immutable configuration.
#[derive(Clone)]
pub struct Checker {
    dialer: Arc<dyn Dialer>,
    timeout: Duration,
    network: Network,
}

impl Checker {
    /// Create a checker with the default dialer, timeout and network.
    pub fn new() -> Self {
        Self {
            dialer: Arc::new(SystemDialer::new()),
            timeout: DEFAULT_TIMEOUT,
            network: DEFAULT_NETWORK,
        }
    }

    /// Replace the dialer.
    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = dialer;
        self
    }

    /// Set the connection timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the transport kind.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Check that `raw` resolves and accepts one connection.
    ///
    /// Resolver errors are returned without a dial attempt; dial
    /// errors are returned verbatim. Blocks the calling thread for up
    /// to the configured timeout.
    pub fn check(&self, raw: &str) -> Result<()> {
        let address = resolve(raw)?;
        debug!(raw, address = address.as_str(), network = %self.network, "probing");

        let conn = self.dialer.dial(self.network, &address, self.timeout)?;
        // The probe already succeeded once the dial did; a failed
        // release is logged, not surfaced.
        if let Err(err) = conn.close() {
            debug!(address = address.as_str(), error = %err, "failed to close probe connection");
        }
        Ok(())
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

/// Check `raw` with a default [`Checker`].
pub fn check(raw: &str) -> Result<()> {
    Checker::new().check(raw)
}

/// Async counterpart of [`Checker`].
#[cfg(feature = "async")]
#[derive(Clone)]
pub struct AsyncChecker {
    dialer: Arc<dyn AsyncDialer>,
    timeout: Duration,
    network: Network,
}

#[cfg(feature = "async")]
impl AsyncChecker {
    /// Create a checker with the default dialer, timeout and network.
    pub fn new() -> Self {
        Self {
            dialer: Arc::new(SystemDialer::new()),
            timeout: DEFAULT_TIMEOUT,
            network: DEFAULT_NETWORK,
        }
    }

    /// Replace the dialer.
    pub fn with_dialer(mut self, dialer: Arc<dyn AsyncDialer>) -> Self {
        self.dialer = dialer;
        self
    }

    /// Set the connection timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the transport kind.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Check that `raw` resolves and accepts one connection.
    pub async fn check(&self, raw: &str) -> Result<()> {
        let address = resolve(raw)?;
        debug!(raw, address = address.as_str(), network = %self.network, "probing");

        let conn = self.dialer.dial(self.network, &address, self.timeout).await?;
        if let Err(err) = conn.close().await {
            debug!(address = address.as_str(), error = %err, "failed to close probe connection");
        }
        Ok(())
    }
}

#[cfg(feature = "async")]
impl Default for AsyncChecker {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::*;
    use crate::dialer::AsyncConn;
    use crate::error::ReachError;
    use async_trait::async_trait;
    use std::io;
    use std::sync::Mutex;

    struct FailingCloseConn;

    #[async_trait]
    impl AsyncConn for FailingCloseConn {
        async fn close(self: Box<Self>) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotConnected, "already gone"))
        }
    }

    #[derive(Default)]
    struct RecordingDialer {
        calls: Mutex<Vec<(Network, String, Duration)>>,
    }

    #[async_trait]
    impl AsyncDialer for RecordingDialer {
        async fn dial(
            &self,
            network: Network,
            address: &str,
            timeout: Duration,
        ) -> Result<Box<dyn AsyncConn>> {
            self.calls
                .lock()
                .unwrap()
                .push((network, address.to_string(), timeout));
            Ok(Box::new(FailingCloseConn))
        }
    }

    #[tokio::test]
    async fn test_async_check_resolve_error_skips_dial() {
        let dialer = Arc::new(RecordingDialer::default());
        let checker = AsyncChecker::new().with_dialer(dialer.clone());

        assert!(matches!(
            checker.check("").await,
            Err(ReachError::EmptyAddress)
        ));
        assert!(dialer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_async_check_close_failure_is_swallowed() {
        let dialer = Arc::new(RecordingDialer::default());
        let checker = AsyncChecker::new()
            .with_dialer(dialer.clone())
            .with_timeout(Duration::from_millis(250));

        checker.check("wss://example.com:8443").await.unwrap();

        let calls = dialer.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(
                Network::Tcp,
                "example.com:8443".to_string(),
                Duration::from_millis(250)
            )]
        );
    }

    #[tokio::test]
    async fn test_async_check_live_loopback() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let checker = AsyncChecker::new().with_timeout(Duration::from_secs(1));
        checker.check(&addr).await.unwrap();
    }
}
