//! Shared fixtures for layer integration tests.

use std::sync::Arc;

use manav_layer::{
    CostGrid, LayerConfig, RasterMsg, SnapshotStore, SocialLayer, SocialMapIngest,
    StaticTransformSource, Transform3D, WorldPoint, MONO8,
};

/// Fixed reference frame used by all scenarios.
pub const FIXED_FRAME: &str = "map";
/// Frame the raster source captures in.
pub const CAMERA_FRAME: &str = "camera";
/// Working frame of the cost grid.
pub const WORKING_FRAME: &str = "odom";

/// 21x21 grid of 5cm cells centered at the origin.
///
/// The half-cell origin offset puts projected pixel coordinates at cell
/// centers rather than on cell boundaries.
pub fn test_grid() -> CostGrid {
    CostGrid::new(21, 21, 0.05, WorldPoint::new(-0.525, -0.525))
}

/// Uniform-intensity raster message captured in the camera frame.
pub fn uniform_msg(width: usize, height: usize, value: u8, stamp_us: u64) -> RasterMsg {
    RasterMsg {
        frame_id: CAMERA_FRAME.to_string(),
        stamp_us,
        width,
        height,
        resolution: 0.05,
        encoding: MONO8.to_string(),
        data: vec![value; width * height],
    }
}

/// Store + transform source + ingest + initialized layer, wired together.
pub struct Fixture {
    pub store: Arc<SnapshotStore>,
    pub tf: Arc<StaticTransformSource>,
    pub ingest: SocialMapIngest,
    pub layer: SocialLayer,
}

impl Fixture {
    /// Build a fixture with identity transforms for both frame pairs.
    pub fn new() -> Self {
        Self::with_config(LayerConfig::default())
    }

    /// Build a fixture with the given layer config.
    pub fn with_config(config: LayerConfig) -> Self {
        let store = Arc::new(SnapshotStore::new());
        let tf = Arc::new(StaticTransformSource::new());
        tf.set(FIXED_FRAME, CAMERA_FRAME, Transform3D::identity());
        tf.set(WORKING_FRAME, FIXED_FRAME, Transform3D::identity());

        let ingest = SocialMapIngest::new(Arc::clone(&store), tf.clone(), &config);
        let mut layer = SocialLayer::new(config, Arc::clone(&store), tf.clone());
        use manav_layer::CostmapLayer;
        layer.initialize(WORKING_FRAME);

        Self {
            store,
            tf,
            ingest,
            layer,
        }
    }
}
