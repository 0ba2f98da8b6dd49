//! Social costmap layer: drift correction, reprojection, and grid writes.
//!
//! Invoked by the hosting navigation loop once per cost-grid refresh. The
//! refresh path reads the currently published snapshot, resolves how the
//! fixed frame moved relative to the grid's working frame since capture,
//! re-orients the raster, and scatters its intensities into the grid.
//! Everything computed here is local to one refresh; only the snapshot store
//! survives between cycles.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;

use crate::config::LayerConfig;
use crate::grid::{costs, CostGrid};
use crate::raster::Raster;
use crate::store::SnapshotStore;
use crate::transform::TransformSource;

/// Axis-aligned refresh window in world coordinates, merged across layers
/// with expand-only semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateWindow {
    /// Minimum X in meters
    pub min_x: f32,
    /// Minimum Y in meters
    pub min_y: f32,
    /// Maximum X in meters
    pub max_x: f32,
    /// Maximum Y in meters
    pub max_y: f32,
}

impl UpdateWindow {
    /// An empty window that any expansion will replace.
    pub fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    /// Grow the window to include the given rectangle. Never shrinks.
    pub fn expand(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) {
        self.min_x = self.min_x.min(min_x);
        self.min_y = self.min_y.min(min_y);
        self.max_x = self.max_x.max(max_x);
        self.max_y = self.max_y.max(max_y);
    }

    /// True if the window fully contains the given rectangle.
    pub fn contains(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> bool {
        self.min_x <= min_x && self.min_y <= min_y && self.max_x >= max_x && self.max_y >= max_y
    }
}

impl Default for UpdateWindow {
    fn default() -> Self {
        Self::empty()
    }
}

/// Costmap layer interface consumed by the hosting orchestrator.
///
/// Replaces the dynamically-loaded plugin base class with a plain trait:
/// the orchestrator initializes each layer, asks which region it intends to
/// touch, then lets it write costs.
pub trait CostmapLayer {
    /// Bind the layer to the grid's working frame.
    fn initialize(&mut self, working_frame: &str);

    /// Merge the region this layer intends to update into `window`.
    fn compute_update_window(&self, window: &mut UpdateWindow);

    /// Write this layer's costs into `grid`. `now_us` is the host loop's
    /// current time in microseconds.
    fn update_costs(&mut self, grid: &mut CostGrid, now_us: u64) -> UpdateOutcome;
}

/// Per-pixel classification of one projection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    /// Pixels whose world coordinate fell inside the grid and were written
    pub written: usize,
    /// Pixels outside the grid, skipped without a write
    pub skipped: usize,
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Layer is disabled; the grid was not touched
    Disabled,
    /// No snapshot has been published yet; the grid was not touched
    NoSnapshot,
    /// Drift transform could not be resolved within the bounded wait; the
    /// grid was not touched
    TransformUnavailable,
    /// Costs were written
    Applied(ProjectionStats),
}

/// World-frame footprint painted by the last applied refresh.
#[derive(Debug, Clone, Copy)]
struct Footprint {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

/// Social occupancy costmap layer.
pub struct SocialLayer {
    config: LayerConfig,
    store: Arc<SnapshotStore>,
    tf: Arc<dyn TransformSource>,
    working_frame: String,
    last_footprint: Option<Footprint>,
}

impl SocialLayer {
    /// Create a layer reading snapshots from `store`.
    pub fn new(config: LayerConfig, store: Arc<SnapshotStore>, tf: Arc<dyn TransformSource>) -> Self {
        Self {
            config,
            store,
            tf,
            working_frame: String::new(),
            last_footprint: None,
        }
    }

    /// Walk every pixel of the rotated raster and write its intensity into
    /// the grid cell under its world coordinate.
    ///
    /// Pixel offsets are measured from the raster center in physical units;
    /// out-of-bounds pixels are skipped, which is routine for the portions
    /// of the raster outside the grid's window. Later pixels in scan order
    /// win ties, with no blending. A corrupt computed index aborts the rest
    /// of the scan, keeping cells already written.
    fn project(raster: &Raster, position: Vec3, grid: &mut CostGrid) -> ProjectionStats {
        let resolution = raster.resolution();
        let half_w = (raster.width() as i32) / 2;
        let half_h = (raster.height() as i32) / 2;
        let mut stats = ProjectionStats::default();

        'scan: for y in 0..raster.height() {
            let wy = (y as i32 - half_h) as f32 * resolution + position.y;
            for x in 0..raster.width() {
                let wx = (x as i32 - half_w) as f32 * resolution + position.x;
                match grid.world_to_cell(wx, wy) {
                    Some(coord) => {
                        let index = grid.cell_index(coord);
                        let Some(cell) = grid.cells_mut().get_mut(index) else {
                            tracing::warn!(index, "projection aborted on corrupt cell index");
                            break 'scan;
                        };
                        *cell = raster.get(x, y);
                        stats.written += 1;
                    }
                    None => stats.skipped += 1,
                }
            }
        }
        stats
    }
}

impl CostmapLayer for SocialLayer {
    fn initialize(&mut self, working_frame: &str) {
        self.working_frame = working_frame.to_string();
        tracing::info!(
            working_frame = %self.working_frame,
            fixed_frame = %self.config.fixed_frame,
            enabled = self.config.enabled,
            "social layer initialized"
        );
    }

    fn compute_update_window(&self, window: &mut UpdateWindow) {
        if !self.config.enabled {
            return;
        }
        let mut merged = false;
        if let Some(fp) = self.last_footprint {
            window.expand(fp.min_x, fp.min_y, fp.max_x, fp.max_y);
            merged = true;
        }
        // The pending snapshot also claims a window before it has ever been
        // painted: its capture position plus the raster's half diagonal,
        // which covers any orientation the refresh may rotate it to.
        if let Some(snapshot) = self.store.latest() {
            let raster = &snapshot.raster;
            let w = raster.width() as f32 * raster.resolution();
            let h = raster.height() as f32 * raster.resolution();
            let half_diag = 0.5 * (w * w + h * h).sqrt();
            let p = snapshot.capture_position;
            window.expand(
                p.x - half_diag,
                p.y - half_diag,
                p.x + half_diag,
                p.y + half_diag,
            );
            merged = true;
        }
        if merged {
            tracing::debug!(
                min_x = window.min_x,
                min_y = window.min_y,
                max_x = window.max_x,
                max_y = window.max_y,
                "update window after social footprint merge"
            );
        }
    }

    fn update_costs(&mut self, grid: &mut CostGrid, now_us: u64) -> UpdateOutcome {
        if !self.config.enabled {
            return UpdateOutcome::Disabled;
        }
        let Some(snapshot) = self.store.latest() else {
            return UpdateOutcome::NoSnapshot;
        };

        // Resolve the drift correction before touching the grid: on failure
        // this cycle contributes nothing rather than a mispositioned hazard
        // field. The fixed frame is the interpolation anchor so the working
        // frame may be the fixed frame itself or a drifting odometry frame.
        let timeout = Duration::from_millis(self.config.transform_timeout_ms);
        let drift = match self.tf.lookup_with_anchor(
            &self.working_frame,
            now_us,
            &self.config.fixed_frame,
            snapshot.stamp_us,
            &self.config.fixed_frame,
            timeout,
        ) {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!(error = %e, stamp_us = snapshot.stamp_us, "drift transform unavailable, refresh skipped");
                return UpdateOutcome::TransformUnavailable;
            }
        };

        // Corrected pose: drift applied to the recorded capture position.
        // Orientation at capture is identity, so the corrected orientation
        // is the drift transform's own rotation.
        let position = drift.apply_point(snapshot.capture_position);
        let yaw = drift.yaw();

        // Undo the rotation the raster co-rotated with at capture, aligning
        // it to the grid's fixed axes.
        let rotated = snapshot.raster.rotated(-yaw);

        // Unpainted cells are always no-information for this layer, whatever
        // default the host left on the grid.
        grid.set_default_value(costs::NO_INFORMATION);
        grid.reset_to_default();
        let stats = Self::project(&rotated, position, grid);

        let resolution = rotated.resolution();
        let half_w = rotated.width() as f32 * resolution / 2.0;
        let half_h = rotated.height() as f32 * resolution / 2.0;
        self.last_footprint = Some(Footprint {
            min_x: position.x - half_w,
            min_y: position.y - half_h,
            max_x: position.x + half_w,
            max_y: position.y + half_h,
        });

        tracing::debug!(
            written = stats.written,
            skipped = stats.skipped,
            yaw,
            x = position.x,
            y = position.y,
            "social layer refresh applied"
        );
        UpdateOutcome::Applied(stats)
    }
}
