//! Offset vector telemetry between the vision co-processor and the robot.
//!
//! The co-processor runs a [`VectorPublisher`] that writes one text frame per
//! processed camera image. The robot runs a [`TelemetryChannel`], a
//! background client that reconnects on its own and keeps the newest vector
//! in a lock-free [`TelemetrySlot`] the control loop can read every tick
//! without blocking.

pub mod channel;
pub mod publisher;
pub mod slot;
pub mod wire;

pub use channel::{Backoff, ConnectionStatus, TelemetryChannel, TelemetryConfig, TelemetryError};
pub use publisher::VectorPublisher;
pub use slot::TelemetrySlot;
pub use wire::{format_message, parse_message, WireError};
