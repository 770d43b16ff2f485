//! Self-healing TCP client that keeps the telemetry slot up to date.
//!
//! A background thread walks the state machine
//! `Disconnected -> Connecting -> Streaming -> Connecting -> ...` until it is
//! shut down. Connection attempts are retried without bound, with capped
//! exponential backoff between failures. While streaming, newline-delimited
//! frames are decoded into the [`TelemetrySlot`]; malformed frames are logged
//! and dropped, and the slot keeps its last value across reconnects.

use std::io::{BufRead, BufReader, ErrorKind};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use shared::OffsetVector;
use thiserror::Error;

use crate::slot::TelemetrySlot;
use crate::wire::parse_message;

/// Address of the vision co-processor on the robot network
pub const DEFAULT_ADDRESS: &str = "10.6.94.81:7123";

/// Granularity of cancellation checks while sleeping between attempts
const SLEEP_SLICE: Duration = Duration::from_millis(20);

/// Longest accepted frame including its newline; a `dx,dy,tilt` line is far shorter
pub const MAX_FRAME_LEN: usize = 256;

/// Floor for reconnect delays
pub const MIN_BACKOFF: Duration = Duration::from_millis(1);

/// Errors returned by channel management calls.
///
/// Transport failures never surface here; the background thread recovers
/// from them on its own.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The background thread could not be spawned
    #[error("Failed to spawn telemetry thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The background thread panicked
    #[error("Telemetry thread panicked")]
    ThreadPanicked,
}

/// Where the background thread is in its connection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionStatus {
    Disconnected = 0,
    Connecting = 1,
    Streaming = 2,
}

impl ConnectionStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Streaming,
            _ => Self::Disconnected,
        }
    }
}

/// Connection settings for [`TelemetryChannel`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `host:port` of the vision co-processor
    pub address: String,
    /// Timeout for a single connection attempt (ms)
    pub connect_timeout_ms: u64,
    /// Read timeout; bounds how long shutdown waits on an idle link (ms)
    pub read_timeout_ms: u64,
    /// Delay after the first failed attempt (ms)
    pub initial_backoff_ms: u64,
    /// Upper bound on the delay between attempts (ms)
    pub max_backoff_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            connect_timeout_ms: 1000,
            read_timeout_ms: 100,
            initial_backoff_ms: 50,
            max_backoff_ms: 2000,
        }
    }
}

impl TelemetryConfig {
    /// Default settings pointed at another address
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }
}

/// Capped exponential backoff
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// Delays are at least [`MIN_BACKOFF`] so a refused connect never spins.
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(MIN_BACKOFF);
        let initial = initial.clamp(MIN_BACKOFF, max);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait now; doubles the next one up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// State shared with the background thread
struct Link {
    config: TelemetryConfig,
    slot: TelemetrySlot,
    status: AtomicU8,
    stop: AtomicBool,
}

impl Link {
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.status.store(status as u8, Ordering::Release);
    }

    /// Sleep for `duration`, waking early on shutdown.
    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.stopped() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }

    fn connect(&self) -> std::io::Result<TcpStream> {
        let addrs: Vec<SocketAddr> = self.config.address.to_socket_addrs()?.collect();
        let mut last_err = std::io::Error::new(
            ErrorKind::AddrNotAvailable,
            format!("{} resolved to no addresses", self.config.address),
        );
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout()) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.config.read_timeout()))?;
                    return Ok(stream);
                }
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    fn run(&self) {
        let mut backoff = Backoff::new(
            Duration::from_millis(self.config.initial_backoff_ms),
            Duration::from_millis(self.config.max_backoff_ms),
        );
        let mut attempts: u64 = 0;

        while !self.stopped() {
            self.set_status(ConnectionStatus::Connecting);
            attempts += 1;

            match self.connect() {
                Ok(stream) => {
                    info!(
                        "Connected to vision co-processor at {} after {} attempt(s)",
                        self.config.address, attempts
                    );
                    attempts = 0;
                    backoff.reset();
                    self.set_status(ConnectionStatus::Streaming);
                    self.stream_frames(stream);
                    if !self.stopped() {
                        info!("Lost connection to {}, reconnecting", self.config.address);
                    }
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(
                        "Failed to connect to {} (attempt {}): {}; retrying in {:?}",
                        self.config.address, attempts, e, delay
                    );
                    self.sleep(delay);
                }
            }
        }

        self.set_status(ConnectionStatus::Disconnected);
        debug!("Telemetry thread for {} exiting", self.config.address);
    }

    /// Decode frames until the link drops or shutdown is requested.
    fn stream_frames(&self, stream: TcpStream) {
        let mut reader = BufReader::new(stream);
        // Partial frames survive read timeouts
        let mut buf: Vec<u8> = Vec::new();
        // Inside an oversized frame, dropping bytes up to its newline
        let mut discarding = false;

        while !self.stopped() {
            let (consumed, complete) = match reader.fill_buf() {
                Ok([]) => return,
                Ok(chunk) => {
                    let (consumed, complete) = match chunk.iter().position(|&b| b == b'\n') {
                        Some(end) => (end + 1, true),
                        None => (chunk.len(), false),
                    };
                    if !discarding {
                        buf.extend_from_slice(&chunk[..consumed]);
                    }
                    (consumed, complete)
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    continue
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Telemetry read from {} failed: {}", self.config.address, e);
                    return;
                }
            };
            reader.consume(consumed);

            if !discarding && buf.len() > MAX_FRAME_LEN {
                warn!(
                    "Dropping telemetry frame from {}: longer than {} bytes",
                    self.config.address, MAX_FRAME_LEN
                );
                buf.clear();
                discarding = true;
            }
            if complete {
                if !discarding {
                    self.handle_frame(&buf);
                }
                buf.clear();
                discarding = false;
            }
        }
    }

    fn handle_frame(&self, frame: &[u8]) {
        let text = String::from_utf8_lossy(frame);
        match parse_message(&text) {
            Ok(vector) => {
                debug!("Telemetry frame: {:?}", vector);
                self.slot.publish(vector);
            }
            Err(e) => warn!("Dropping malformed telemetry frame {:?}: {}", text.trim_end(), e),
        }
    }
}

/// Client end of the vision telemetry link.
///
/// Owns a background thread once [`start`](Self::start)ed; shutting down
/// (explicitly or on drop) stops it and closes the connection.
pub struct TelemetryChannel {
    link: Arc<Link>,
    handle: Option<JoinHandle<()>>,
}

impl TelemetryChannel {
    pub fn new(config: TelemetryConfig) -> Self {
        Self::with_slot(config, TelemetrySlot::new())
    }

    /// Channel that writes into an existing slot
    pub fn with_slot(config: TelemetryConfig, slot: TelemetrySlot) -> Self {
        Self {
            link: Arc::new(Link {
                config,
                slot,
                status: AtomicU8::new(ConnectionStatus::Disconnected as u8),
                stop: AtomicBool::new(false),
            }),
            handle: None,
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.link.config
    }

    /// Spawn the background reader and return immediately.
    ///
    /// Calling this while the reader is already running logs a warning and
    /// does nothing.
    pub fn start(&mut self) -> Result<(), TelemetryError> {
        if self.handle.is_some() {
            warn!("Telemetry channel to {} already started", self.link.config.address);
            return Ok(());
        }

        self.link.stop.store(false, Ordering::Release);
        let link = Arc::clone(&self.link);
        let handle = thread::Builder::new()
            .name("telemetry".to_string())
            .spawn(move || link.run())
            .map_err(TelemetryError::Spawn)?;
        self.handle = Some(handle);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Latest vector received, without blocking.
    pub fn latest(&self) -> Option<OffsetVector> {
        self.link.slot.latest()
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.link.status.load(Ordering::Acquire))
    }

    /// Reader handle onto the slot this channel writes
    pub fn slot(&self) -> TelemetrySlot {
        self.link.slot.clone()
    }

    /// Stop the background thread and wait for it to exit.
    pub fn shutdown(&mut self) -> Result<(), TelemetryError> {
        self.link.stop.store(true, Ordering::Release);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| TelemetryError::ThreadPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for TelemetryChannel {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Error shutting down telemetry channel: {}", e);
        }
    }
}
