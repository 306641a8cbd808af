//! Reachable - address normalization and reachability probing
//!
//! This library answers one question: can a connection be established
//! to the address a user typed? Inputs may be loose:
//! - URLs: `scheme://host[:port][/path]`
//! - `host:port` pairs
//! - bare hostnames and IPv4 literals
//! - IPv6 literals, bracketed or bare
//!
//! The input is first normalized into a canonical `host:port` form
//! (IPv6 hosts bracketed, default port 80 applied when absent), then
//! probed with a single connect-and-close attempt. No retries, no
//! backoff; the outcome of the one attempt is reported verbatim.
//!
//! # Example
//!
//! ```rust
//! use reachable::resolve;
//!
//! assert_eq!(resolve("https://example.com").unwrap(), "example.com:80");
//! assert_eq!(resolve("[1::]:22").unwrap(), "[1::]:22");
//! assert_eq!(resolve("1::").unwrap(), "[1::]:80");
//! ```
//!
//! Probing goes through a [`Checker`], or the top-level [`check`]
//! shortcut:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use reachable::Checker;
//!
//! let checker = Checker::new().with_timeout(Duration::from_secs(1));
//! if checker.check("wss://example.com:8443").is_ok() {
//!     println!("reachable");
//! }
//! ```
//!
//! The network dial sits behind the [`Dialer`] trait, so tests and
//! restricted environments can substitute their own connector. With
//! the `async` feature (on by default), [`AsyncChecker`] and
//! [`AsyncDialer`] mirror the blocking API on tokio.

pub mod addr;
pub mod checker;
pub mod dialer;
pub mod error;

// Re-export commonly used items
pub use addr::{resolve, DEFAULT_PORT};
pub use checker::{check, Checker, DEFAULT_NETWORK, DEFAULT_TIMEOUT};
pub use dialer::{Conn, Dialer, Network, StdTcpConn, StdUdpConn, SystemDialer};
pub use error::{ReachError, Result};

#[cfg(feature = "async")]
pub use checker::AsyncChecker;
#[cfg(feature = "async")]
pub use dialer::{AsyncConn, AsyncDialer, TokioTcpConn, TokioUdpConn};
