//! Connection factory shared by the streaming phase and every recovery session.
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, warn};

/// Opens a fresh, independent connection to the feed server on each call.
pub trait Connector {
    type Conn: Read + Write;

    fn connect(&self) -> io::Result<Self::Conn>;
}

impl<C: Connector + ?Sized> Connector for &C {
    type Conn = C::Conn;

    fn connect(&self) -> io::Result<Self::Conn> {
        (**self).connect()
    }
}

/// TCP connector with one idle timeout applied to connect, read and write.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addrs: Vec<SocketAddr>,
    timeout: Duration,
}

impl TcpConnector {
    /// Resolve `host:port` once. A zero `timeout` is rejected since sockets
    /// treat it as invalid.
    pub fn resolve(host: &str, port: u16, timeout: Duration) -> io::Result<Self> {
        if timeout.is_zero() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "idle timeout must be non-zero"));
        }
        let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{host}:{port} resolved to no addresses"),
            ));
        }
        Ok(TcpConnector { addrs, timeout })
    }

    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Connector for TcpConnector {
    type Conn = TcpStream;

    fn connect(&self) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in &self.addrs {
            match TcpStream::connect_timeout(addr, self.timeout) {
                Ok(stream) => {
                    // Without a read timeout reads may block forever; still usable.
                    if let Err(e) = stream.set_read_timeout(Some(self.timeout)) {
                        warn!(%addr, error = %e, "could not set read timeout");
                    }
                    if let Err(e) = stream.set_write_timeout(Some(self.timeout)) {
                        warn!(%addr, error = %e, "could not set write timeout");
                    }
                    debug!(%addr, "connected");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no address to connect to")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn rejects_zero_timeout() {
        let err = TcpConnector::resolve("127.0.0.1", 3000, Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn connects_with_timeouts_applied() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let c = TcpConnector::resolve("127.0.0.1", port, Duration::from_millis(750)).unwrap();
        assert_eq!(c.addrs().len(), 1);
        let stream = c.connect().unwrap();
        assert_eq!(stream.read_timeout().unwrap(), Some(Duration::from_millis(750)));
        assert_eq!(stream.write_timeout().unwrap(), Some(Duration::from_millis(750)));
    }

    #[test]
    fn refused_connection_is_an_error() {
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let c = TcpConnector::resolve("127.0.0.1", port, Duration::from_millis(500)).unwrap();
        assert!(c.connect().is_err());
    }
}
