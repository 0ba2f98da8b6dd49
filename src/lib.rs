//! ManavLayer - Social occupancy costmap layer with temporal drift correction
//!
//! Fuses a time-stamped probability raster (a "social occupancy map" of
//! predicted human-occupied regions) into a navigation cost grid, correcting
//! for the motion that occurred between capture and consumption.
//!
//! # Data flow
//!
//! ```text
//! raster stream ──► ingest (decode + capture-pose record)
//!                        │
//!                        ▼
//!                  SnapshotStore (single slot, atomic swap)
//!                        │
//!   [cost-grid refresh]  ▼
//!                  SocialLayer::update_costs
//!                        │  drift correction (fixed-frame anchor, bounded wait)
//!                        │  orientation normalization (rotate + expand canvas)
//!                        │  projection (per-pixel world → cell writes)
//!                        ▼
//!                     CostGrid
//! ```
//!
//! Two triggers drive the system: raster arrival (event-driven, one message
//! at a time) and the periodic grid refresh from the hosting navigation
//! loop. They share only the single-slot store. Every failure mode —
//! decode, transform lookup, projection — abandons the in-progress update
//! and preserves the last known-good state: staleness is acceptable,
//! incorrectness is not.

pub mod config;
pub mod error;
pub mod grid;
pub mod ingest;
pub mod layer;
pub mod raster;
pub mod store;
pub mod transform;

pub use config::LayerConfig;
pub use error::{LayerError, Result};
pub use grid::{costs, CostGrid, GridCoord, WorldPoint};
pub use ingest::SocialMapIngest;
pub use layer::{
    CostmapLayer, ProjectionStats, SocialLayer, UpdateOutcome, UpdateWindow,
};
pub use raster::{Raster, RasterMsg, MONO8};
pub use store::{SnapshotStore, SocialMapSnapshot};
pub use transform::{StaticTransformSource, Transform3D, TransformError, TransformSource};
