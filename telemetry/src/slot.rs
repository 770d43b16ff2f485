//! Latest-value cell shared between the telemetry reader and the control loop.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use shared::OffsetVector;

/// Single-slot, lock-free holder of the most recent offset vector.
///
/// Writes replace the whole vector atomically, so readers never see a torn
/// tuple and never wait on the writer. Values are overwritten, never queued.
/// Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySlot {
    cell: Arc<ArcSwapOption<OffsetVector>>,
}

impl TelemetrySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current value; `None` records that no target is visible.
    pub fn publish(&self, vector: Option<OffsetVector>) {
        self.cell.store(vector.map(Arc::new));
    }

    /// Most recently published value.
    pub fn latest(&self) -> Option<OffsetVector> {
        self.cell.load().as_deref().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_starts_empty() {
        assert_eq!(TelemetrySlot::new().latest(), None);
    }

    #[test]
    fn test_latest_value_wins() {
        let slot = TelemetrySlot::new();
        slot.publish(Some(OffsetVector::new(1.0, 2.0, 3.0)));
        slot.publish(Some(OffsetVector::new(4.0, 5.0, 6.0)));
        assert_eq!(slot.latest(), Some(OffsetVector::new(4.0, 5.0, 6.0)));

        slot.publish(None);
        assert_eq!(slot.latest(), None);
    }

    #[test]
    fn test_clones_share_cell() {
        let writer = TelemetrySlot::new();
        let reader = writer.clone();
        writer.publish(Some(OffsetVector::new(7.0, 8.0, 9.0)));
        assert_eq!(reader.latest(), Some(OffsetVector::new(7.0, 8.0, 9.0)));
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_vectors() {
        let slot = TelemetrySlot::new();
        let writer = slot.clone();

        let handle = thread::spawn(move || {
            for i in 0..10_000 {
                let v = i as f64;
                writer.publish(Some(OffsetVector::new(v, v, v)));
            }
        });

        for _ in 0..10_000 {
            if let Some(vector) = slot.latest() {
                assert_eq!(vector.dx, vector.dy);
                assert_eq!(vector.dy, vector.tilt);
            }
        }
        handle.join().unwrap();
    }
}
