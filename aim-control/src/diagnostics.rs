//! One-way operator diagnostics.
//!
//! Values are published for display only; nothing reads them back for
//! control decisions, and consumers must tolerate any publish rate.

use log::debug;

/// Key/value sink for operator display
pub trait Diagnostics {
    fn put_number(&mut self, key: &str, value: f64);

    fn put_bool(&mut self, key: &str, value: bool);

    fn put_string(&mut self, key: &str, value: &str);
}

/// Publishes through the `log` facade at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn put_number(&mut self, key: &str, value: f64) {
        debug!("{key}: {value:.3}");
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        debug!("{key}: {value}");
    }

    fn put_string(&mut self, key: &str, value: &str) {
        debug!("{key}: {value}");
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn put_number(&mut self, _key: &str, _value: f64) {}

    fn put_bool(&mut self, _key: &str, _value: bool) {}

    fn put_string(&mut self, _key: &str, _value: &str) {}
}
