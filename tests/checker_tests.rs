//! Integration tests driving the checker against loopback sockets.

use std::net::{TcpListener, UdpSocket};
use std::time::Duration;

use reachable::{check, Checker, Network, ReachError};

#[test]
fn test_check_tcp_loopback() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let checker = Checker::new().with_timeout(Duration::from_secs(1));
    checker.check(&addr).unwrap();

    // The same target through URL form.
    checker.check(&format!("http://{}", addr)).unwrap();
}

#[test]
fn test_check_tcp_connection_refused() {
    // Bind to pick a free port, then drop the listener before dialing.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let checker = Checker::new().with_timeout(Duration::from_secs(1));
    assert!(matches!(checker.check(&addr), Err(ReachError::Dial(_))));
}

#[test]
fn test_check_udp_loopback() {
    let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
    let addr = peer.local_addr().unwrap().to_string();

    let checker = Checker::new()
        .with_network(Network::Udp)
        .with_timeout(Duration::from_secs(1));
    checker.check(&addr).unwrap();
}

#[test]
fn test_top_level_check() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    check(&addr).unwrap();
    assert!(matches!(check(""), Err(ReachError::EmptyAddress)));
}

#[cfg(feature = "async")]
mod async_checks {
    use super::*;
    use reachable::AsyncChecker;

    #[tokio::test]
    async fn test_async_check_tcp_loopback() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let checker = AsyncChecker::new().with_timeout(Duration::from_secs(1));
        checker.check(&addr).await.unwrap();
    }

    #[tokio::test]
    async fn test_async_check_tcp_connection_refused() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().to_string()
        };

        let checker = AsyncChecker::new().with_timeout(Duration::from_secs(1));
        assert!(matches!(
            checker.check(&addr).await,
            Err(ReachError::Dial(_))
        ));
    }
}
