//! Single-slot store shared between the sensor-arrival and refresh paths.
//!
//! The raster, its capture position, and its capture timestamp form one
//! immutable unit. The ingest path builds a new snapshot and publishes it
//! wholesale; the refresh path reads whatever is currently published. A
//! reader sees either the old unit or the fully-replaced new one, never a
//! partial write.

use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

use crate::raster::Raster;

/// One atomic raster/pose/timestamp unit.
///
/// `capture_position` is where the raster's frame origin was, in the fixed
/// reference frame, at capture time. Orientation at capture is identity by
/// construction: rotation is re-derived from the current drift transform at
/// refresh time, never from the capture-time transform.
#[derive(Debug, Clone)]
pub struct SocialMapSnapshot {
    /// Decoded raster, vertical axis already in grid convention
    pub raster: Raster,
    /// Capture-time position in the fixed reference frame
    pub capture_position: Vec3,
    /// Capture timestamp in microseconds since epoch
    pub stamp_us: u64,
}

/// Single-slot snapshot store, overwritten on each successful arrival.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    slot: RwLock<Option<Arc<SocialMapSnapshot>>>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new snapshot, replacing the previous unit wholesale.
    pub fn publish(&self, snapshot: SocialMapSnapshot) {
        *self.slot.write() = Some(Arc::new(snapshot));
    }

    /// Currently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<SocialMapSnapshot>> {
        self.slot.read().clone()
    }

    /// Drop the published snapshot.
    pub fn clear(&self) {
        *self.slot.write() = None;
    }
}
