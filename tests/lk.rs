mod common;

use common::synthetic_image::{blob_centres, blob_texture};
use lk_flow::flow::lk::{estimate_flow, estimate_level_flow, track_feature};
use lk_flow::flow::{LkParams, PyrLkStorage};
use lk_flow::{FeatureStatus, FlowError};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn small_shift_is_recovered_without_pyramid() {
    init_logger();
    let prev = blob_texture(128, 128, 0.0, 0.0);
    let curr = blob_texture(128, 128, 0.9, -1.2);
    let points = blob_centres(128, 128);
    let params = LkParams::default();

    let est = estimate_flow(&prev, &curr, &points, None, &params).expect("valid input");

    for (i, (p, status, _)) in est.iter().enumerate() {
        assert_eq!(status, FeatureStatus::Success, "point {i} status");
        let (ex, ey) = (points[i][0] + 0.9, points[i][1] - 1.2);
        assert!(
            (p[0] - ex).abs() < 0.2 && (p[1] - ey).abs() < 0.2,
            "point {i}: expected ({ex}, {ey}), got {p:?}"
        );
    }
}

#[test]
fn coarse_level_tracking_uses_level_coordinates() {
    init_logger();
    let prev = blob_texture(128, 128, 0.0, 0.0);
    let curr = blob_texture(128, 128, 2.0, 2.0);
    let mut storage = PyrLkStorage::new(1);
    storage.process(&prev, &curr).expect("valid frames");

    let points: Vec<[f32; 2]> = blob_centres(128, 128)
        .into_iter()
        .map(|p| [p[0] / 2.0, p[1] / 2.0])
        .collect();
    let estimates = vec![[0.0, 0.0]; points.len()];
    let tracks = estimate_level_flow(&storage, 1, &points, &estimates, &LkParams::default())
        .expect("level 1 exists");

    for (track, p) in tracks.iter().zip(&points) {
        assert_eq!(track.status, FeatureStatus::Success);
        assert!(
            (track.position[0] - p[0] - 1.0).abs() < 0.3
                && (track.position[1] - p[1] - 1.0).abs() < 0.3,
            "level-1 shift should be about one pixel, got {:?} from {p:?}",
            track.position
        );
        assert!(track.iterations >= 1);
    }

    let err = estimate_level_flow(&storage, 2, &points, &estimates, &LkParams::default())
        .expect_err("storage holds levels 0..=1");
    assert!(matches!(
        err,
        FlowError::LevelOutOfRange {
            level: 2,
            max_level: 1
        }
    ));
}

#[test]
fn large_motion_needs_an_initial_estimate() {
    init_logger();
    let prev = blob_texture(160, 160, 0.0, 0.0);
    let curr = blob_texture(160, 160, 9.0, 0.0);
    let point = blob_centres(160, 160)[2];
    let params = LkParams::default();

    let seeded = estimate_flow(&prev, &curr, &[point], Some(&[[8.5, 0.3]][..]), &params)
        .expect("valid input");
    assert_eq!(seeded.status[0], FeatureStatus::Success);
    assert!(
        (seeded.points[0][0] - point[0] - 9.0).abs() < 0.2,
        "seeded search should land on the shifted blob, got {:?}",
        seeded.points[0]
    );
}

#[test]
fn iteration_budget_caps_work() {
    init_logger();
    let prev = blob_texture(128, 128, 0.0, 0.0);
    let curr = blob_texture(128, 128, 1.5, 0.5);
    let storage = {
        let mut s = PyrLkStorage::new(0);
        s.process(&prev, &curr).expect("valid frames");
        s
    };
    let (p, c) = storage.level_pair(0).expect("level 0");
    let point = blob_centres(128, 128)[0];
    let params = LkParams::default()
        .with_iterations(1)
        .with_min_feature_shift(1e-6);

    let track = track_feature(p, c, point, [0.0, 0.0], &params);

    assert_eq!(track.iterations, 1);
    assert_eq!(track.status, FeatureStatus::Success);
    assert!(track.error > 0.0);
}

#[test]
fn invalid_params_are_reported() {
    let img = blob_texture(64, 64, 0.0, 0.0);
    let params = LkParams::default().with_min_feature_shift(-1.0);
    let err = estimate_flow(&img, &img, &[[32.0, 32.0]], None, &params).expect_err("bad shift");
    assert!(matches!(err, FlowError::InvalidParams(_)), "got {err}");
}
