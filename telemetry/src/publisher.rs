//! Co-processor side of the telemetry link.

use std::io::{ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info, warn};
use shared::OffsetVector;

use crate::wire::format_message;

/// Write timeout per client; a stalled reader is dropped rather than
/// stalling the vision loop
const CLIENT_WRITE_TIMEOUT: Duration = Duration::from_millis(200);

/// Serves offset vectors to every connected [`TelemetryChannel`](crate::TelemetryChannel).
///
/// Never blocks on accept: new clients are picked up on each
/// [`publish`](Self::publish). Clients whose write fails are dropped.
pub struct VectorPublisher {
    listener: TcpListener,
    clients: Vec<(SocketAddr, TcpStream)>,
}

impl VectorPublisher {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        info!("Publishing vectors on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            clients: Vec::new(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Accept any clients waiting on the listener.
    ///
    /// Accept failures are logged and never affect connected clients; a
    /// persistent failure is retried on the next call.
    pub fn accept_pending(&mut self) -> usize {
        let mut accepted = 0;
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => match Self::configure_client(&stream) {
                    Ok(()) => {
                        info!("Telemetry client connected from {addr}");
                        self.clients.push((addr, stream));
                        accepted += 1;
                    }
                    Err(e) => warn!("Dropping telemetry client {addr} during setup: {e}"),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => return accepted,
                // The peer gave up between connect and accept
                Err(e) if is_transient_accept_error(&e) => {
                    debug!("Ignoring aborted telemetry connection: {e}");
                }
                Err(e) => {
                    warn!("Failed to accept telemetry client: {e}");
                    return accepted;
                }
            }
        }
    }

    fn configure_client(stream: &TcpStream) -> std::io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(CLIENT_WRITE_TIMEOUT))
    }

    /// Send one frame to every client; returns how many received it.
    pub fn publish(&mut self, vector: Option<&OffsetVector>) -> usize {
        self.accept_pending();
        let frame = format_message(vector);
        debug!("Publishing {:?} to {} client(s)", frame.trim_end(), self.clients.len());
        self.send_raw(frame.as_bytes());
        self.clients.len()
    }

    /// Write raw bytes to every client, dropping the ones that fail.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.clients.retain_mut(|(addr, stream)| {
            match stream.write_all(bytes).and_then(|_| stream.flush()) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Dropping telemetry client {addr}: {e}");
                    false
                }
            }
        });
    }

    /// Close every client connection, keeping the listener open.
    pub fn disconnect_all(&mut self) {
        for (addr, stream) in self.clients.drain(..) {
            debug!("Disconnecting telemetry client {addr}");
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    }
}

fn is_transient_accept_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};

    #[test]
    fn test_transient_accept_errors() {
        for kind in [
            ErrorKind::ConnectionAborted,
            ErrorKind::ConnectionReset,
            ErrorKind::Interrupted,
        ] {
            assert!(is_transient_accept_error(&kind.into()));
        }
        assert!(!is_transient_accept_error(&ErrorKind::PermissionDenied.into()));
    }

    #[test]
    fn test_publish_survives_vanished_client() {
        let mut publisher = VectorPublisher::bind("127.0.0.1:0").unwrap();
        let addr = publisher.local_addr().unwrap();

        // Connects and disappears before the publisher gets to accept it
        drop(TcpStream::connect(addr).unwrap());
        let good = TcpStream::connect(addr).unwrap();
        good.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        let vector = OffsetVector::new(1.0, 2.0, 3.0);
        publisher.publish(Some(&vector));
        publisher.publish(Some(&vector));
        assert!(publisher.client_count() >= 1);

        let mut line = String::new();
        BufReader::new(good).read_line(&mut line).unwrap();
        assert_eq!(line, "1,2,3\n");
    }
}
