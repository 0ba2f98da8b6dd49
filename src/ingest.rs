//! Sensor-arrival path: decode incoming rasters and record capture poses.
//!
//! Each message is processed to completion before the next is accepted:
//! decode, resolve the capture-time transform, publish the new snapshot.
//! Any failure discards the in-progress update and leaves the previously
//! published unit authoritative; the next message is the implicit retry.

use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::config::LayerConfig;
use crate::error::Result;
use crate::raster::{Raster, RasterMsg};
use crate::store::{SnapshotStore, SocialMapSnapshot};
use crate::transform::TransformSource;

/// Pose recorder for the social map stream.
pub struct SocialMapIngest {
    store: Arc<SnapshotStore>,
    tf: Arc<dyn TransformSource>,
    fixed_frame: String,
    topic: String,
}

impl SocialMapIngest {
    /// Create an ingest pipeline publishing into `store`.
    ///
    /// The config supplies the fixed frame capture poses are recorded in and
    /// the name of the inbound stream the host binds to [`run`](Self::run).
    pub fn new(store: Arc<SnapshotStore>, tf: Arc<dyn TransformSource>, config: &LayerConfig) -> Self {
        Self {
            store,
            tf,
            fixed_frame: config.fixed_frame.clone(),
            topic: config.social_map_topic.clone(),
        }
    }

    /// Name of the inbound stream this pipeline consumes.
    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Process one raster message.
    ///
    /// Decodes the raster (flipping the vertical axis), then resolves the
    /// transform from the message's frame to the fixed frame evaluated at
    /// the message's own capture timestamp. Looking the transform up at any
    /// other time would introduce spatial error proportional to velocity
    /// times the time gap. Only the transform's translation is recorded;
    /// orientation is re-derived from the current drift transform at refresh
    /// time.
    ///
    /// On error the store is left untouched.
    pub fn handle_message(&self, msg: &RasterMsg) -> Result<()> {
        let raster = Raster::decode(msg)?;
        let capture = self
            .tf
            .lookup(&self.fixed_frame, &msg.frame_id, msg.stamp_us)?;

        self.store.publish(SocialMapSnapshot {
            raster,
            capture_position: capture.translation,
            stamp_us: msg.stamp_us,
        });
        tracing::debug!(
            frame = %msg.frame_id,
            stamp_us = msg.stamp_us,
            width = msg.width,
            height = msg.height,
            "social map snapshot published"
        );
        Ok(())
    }

    /// Consume the raster stream until the channel closes.
    ///
    /// Messages are handled one at a time; failures are logged and dropped.
    pub fn run(&self, rx: Receiver<RasterMsg>) {
        tracing::info!(topic = %self.topic, fixed_frame = %self.fixed_frame, "social map ingest started");
        for msg in rx.iter() {
            if let Err(e) = self.handle_message(&msg) {
                tracing::debug!(error = %e, "raster message discarded");
            }
        }
        tracing::info!("social map ingest stopped");
    }
}
