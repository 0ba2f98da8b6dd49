//! End-to-end scenarios for the social costmap layer.
//!
//! Each test drives the full pipeline: raster arrival through ingest, then a
//! cost-grid refresh through the layer, asserting exact per-cell outcomes.

mod common;

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use common::{test_grid, uniform_msg, Fixture, FIXED_FRAME, WORKING_FRAME};
use glam::{Quat, Vec3};
use manav_layer::{
    costs, CostmapLayer, GridCoord, LayerConfig, ProjectionStats, Transform3D, TransformError,
    TransformSource, UpdateOutcome, UpdateWindow,
};

const CAPTURE_US: u64 = 1_000_000;
const NOW_US: u64 = 2_000_000;

#[test]
fn uniform_block_painted_at_origin() {
    let mut f = Fixture::new();
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();

    let mut grid = test_grid();
    let outcome = f.layer.update_costs(&mut grid, NOW_US);
    assert_eq!(
        outcome,
        UpdateOutcome::Applied(ProjectionStats {
            written: 16,
            skipped: 0
        })
    );

    // Pixel offsets (index - 2) * 0.05m land on cells 8..=11 on both axes
    for y in 0..21 {
        for x in 0..21 {
            let expected = if (8..=11).contains(&x) && (8..=11).contains(&y) {
                200
            } else {
                costs::NO_INFORMATION
            };
            assert_eq!(
                grid.cost(GridCoord::new(x, y)),
                expected,
                "cell ({x}, {y})"
            );
        }
    }
}

#[test]
fn quarter_turn_drift_rotates_capture_position() {
    let f0 = Fixture::new();
    // Capture 0.2m ahead of the map origin; since capture, localization has
    // rotated the working frame a quarter turn relative to the map
    f0.tf.set(
        FIXED_FRAME,
        common::CAMERA_FRAME,
        Transform3D::from_translation(Vec3::new(0.2, 0.0, 0.0)),
    );
    f0.tf.set(
        WORKING_FRAME,
        FIXED_FRAME,
        Transform3D::from_rotation(Quat::from_rotation_z(FRAC_PI_2)),
    );
    let mut f = f0;
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();

    let mut grid = test_grid();
    let outcome = f.layer.update_costs(&mut grid, NOW_US);

    // A square raster keeps its 4x4 canvas under a quarter turn, so the
    // count is unchanged; the X offset role moves to Y
    assert_eq!(
        outcome,
        UpdateOutcome::Applied(ProjectionStats {
            written: 16,
            skipped: 0
        })
    );
    for y in 0..21 {
        for x in 0..21 {
            // Corrected center is (0.0, 0.2): cells x 8..=11, y 12..=15
            let expected = if (8..=11).contains(&x) && (12..=15).contains(&y) {
                200
            } else {
                costs::NO_INFORMATION
            };
            assert_eq!(
                grid.cost(GridCoord::new(x, y)),
                expected,
                "cell ({x}, {y})"
            );
        }
    }
}

#[test]
fn out_of_bounds_pixels_skip_without_writing() {
    let f0 = Fixture::new();
    // Capture near the grid corner so part of the raster falls outside
    f0.tf.set(
        FIXED_FRAME,
        common::CAMERA_FRAME,
        Transform3D::from_translation(Vec3::new(0.5, 0.5, 0.0)),
    );
    let mut f = f0;
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();

    let mut grid = test_grid();
    let outcome = f.layer.update_costs(&mut grid, NOW_US);

    // World X: 0.5 + {-0.10, -0.05, 0.0, 0.05}; 0.55 is past the edge.
    // 3 of 4 columns and 3 of 4 rows land inside.
    assert_eq!(
        outcome,
        UpdateOutcome::Applied(ProjectionStats {
            written: 9,
            skipped: 7
        })
    );
    for y in 0..21 {
        for x in 0..21 {
            let expected = if (18..=20).contains(&x) && (18..=20).contains(&y) {
                200
            } else {
                costs::NO_INFORMATION
            };
            assert_eq!(
                grid.cost(GridCoord::new(x, y)),
                expected,
                "cell ({x}, {y})"
            );
        }
    }
}

#[test]
fn missing_drift_transform_leaves_grid_untouched() {
    let mut f = Fixture::new();
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();
    f.tf.remove(WORKING_FRAME, FIXED_FRAME);

    let mut grid = test_grid();
    grid.set_cost(GridCoord::new(5, 5), 42);
    grid.set_cost(GridCoord::new(10, 10), 99);
    let before = grid.cells().to_vec();

    let outcome = f.layer.update_costs(&mut grid, NOW_US);
    assert_eq!(outcome, UpdateOutcome::TransformUnavailable);
    assert_eq!(grid.cells(), before.as_slice());
}

#[test]
fn timed_out_lookup_fails_closed() {
    /// Transform source whose drift lookup always times out.
    struct TimingOut;

    impl TransformSource for TimingOut {
        fn lookup(
            &self,
            _target: &str,
            _source: &str,
            _time_us: u64,
        ) -> Result<Transform3D, TransformError> {
            Ok(Transform3D::identity())
        }

        fn lookup_with_anchor(
            &self,
            _target: &str,
            _target_time_us: u64,
            _source: &str,
            _source_time_us: u64,
            _fixed: &str,
            timeout: Duration,
        ) -> Result<Transform3D, TransformError> {
            Err(TransformError::Timeout(timeout))
        }
    }

    let f = Fixture::new();
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();

    let mut layer = manav_layer::SocialLayer::new(
        LayerConfig::default(),
        std::sync::Arc::clone(&f.store),
        std::sync::Arc::new(TimingOut),
    );
    layer.initialize(WORKING_FRAME);

    let mut grid = test_grid();
    let before = grid.cells().to_vec();
    assert_eq!(
        layer.update_costs(&mut grid, NOW_US),
        UpdateOutcome::TransformUnavailable
    );
    assert_eq!(grid.cells(), before.as_slice());
}

#[test]
fn failed_arrivals_keep_last_good_snapshot() {
    let mut f = Fixture::new();
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();

    // N failed arrivals: bad encoding, bad payload, unknown frame
    let mut bad_encoding = uniform_msg(4, 4, 50, CAPTURE_US + 1);
    bad_encoding.encoding = "rgb8".to_string();
    assert!(f.ingest.handle_message(&bad_encoding).is_err());

    let mut bad_payload = uniform_msg(4, 4, 50, CAPTURE_US + 2);
    bad_payload.data.truncate(3);
    assert!(f.ingest.handle_message(&bad_payload).is_err());

    let mut bad_frame = uniform_msg(4, 4, 50, CAPTURE_US + 3);
    bad_frame.frame_id = "thermal".to_string();
    assert!(f.ingest.handle_message(&bad_frame).is_err());

    // Refresh still paints the first raster's intensities
    let mut grid = test_grid();
    let outcome = f.layer.update_costs(&mut grid, NOW_US);
    assert_eq!(
        outcome,
        UpdateOutcome::Applied(ProjectionStats {
            written: 16,
            skipped: 0
        })
    );
    assert_eq!(grid.cost(GridCoord::new(10, 10)), 200);
}

#[test]
fn disabled_layer_is_a_no_op() {
    let mut config = LayerConfig::default();
    config.enabled = false;
    let mut f = Fixture::with_config(config);
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();

    let mut grid = test_grid();
    grid.set_cost(GridCoord::new(3, 3), 42);
    let before = grid.cells().to_vec();

    assert_eq!(f.layer.update_costs(&mut grid, NOW_US), UpdateOutcome::Disabled);
    assert_eq!(grid.cells(), before.as_slice());

    // A disabled layer claims no window either
    let mut window = UpdateWindow::empty();
    f.layer.compute_update_window(&mut window);
    assert_eq!(window, UpdateWindow::empty());
}

#[test]
fn refresh_without_snapshot_is_a_no_op() {
    let mut f = Fixture::new();
    let mut grid = test_grid();
    let before = grid.cells().to_vec();

    assert_eq!(f.layer.update_costs(&mut grid, NOW_US), UpdateOutcome::NoSnapshot);
    assert_eq!(grid.cells(), before.as_slice());
}

#[test]
fn refresh_forces_no_information_default() {
    let mut f = Fixture::new();
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();

    let mut grid = test_grid();
    grid.set_default_value(costs::FREE);
    f.layer.update_costs(&mut grid, NOW_US);

    // Unpainted cells come out as no-information regardless of the default
    // the host left on the grid
    assert_eq!(grid.cost(GridCoord::new(0, 0)), costs::NO_INFORMATION);
    assert_eq!(grid.cost(GridCoord::new(10, 10)), 200);
}

#[test]
fn update_window_contains_painted_footprint() {
    let mut f = Fixture::new();

    // Nothing to claim before any snapshot arrives
    let mut window = UpdateWindow::empty();
    f.layer.compute_update_window(&mut window);
    assert_eq!(window, UpdateWindow::empty());

    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();

    // An unpainted snapshot already claims its capture surroundings, so the
    // first refresh falls inside the window reported just before it
    let mut window = UpdateWindow::empty();
    f.layer.compute_update_window(&mut window);
    assert!(window.contains(-0.1, -0.1, 0.1, 0.1));

    let mut grid = test_grid();
    f.layer.update_costs(&mut grid, NOW_US);

    let mut window = UpdateWindow::empty();
    f.layer.compute_update_window(&mut window);
    // 4x4 pixels at 0.05 m/px centered at the origin
    assert!(window.contains(-0.1, -0.1, 0.1, 0.1));
}

#[test]
fn update_window_merge_never_shrinks() {
    let mut f = Fixture::new();
    f.ingest.handle_message(&uniform_msg(4, 4, 200, CAPTURE_US)).unwrap();
    let mut grid = test_grid();
    f.layer.update_costs(&mut grid, NOW_US);

    // A pre-existing larger window must survive the merge intact
    let mut window = UpdateWindow::empty();
    window.expand(-2.0, -2.0, 2.0, 2.0);
    f.layer.compute_update_window(&mut window);
    assert_eq!(window.min_x, -2.0);
    assert_eq!(window.min_y, -2.0);
    assert_eq!(window.max_x, 2.0);
    assert_eq!(window.max_y, 2.0);
}
