use super::*;
use crate::foundation::core::splat;

/// Worked example from Jain & Chlamtac (1985), CACM 28(10), table 1.
const JAIN_CHLAMTAC: [f32; 20] = [
    0.02, 0.15, 0.74, 3.39, 0.83, 22.37, 10.15, 15.43, 38.62, 15.92, 34.60, 10.28, 1.47, 0.40,
    0.05, 11.39, 0.27, 0.42, 0.09, 11.37,
];

fn run_scalar(params: P2Params, xs: &[f32]) -> (P2Estimator, Vec<f32>) {
    let first = [
        splat(xs[0]),
        splat(xs[1]),
        splat(xs[2]),
        splat(xs[3]),
        splat(xs[4]),
    ];
    let mut est = P2Estimator::from_first_five(params, first);
    let mut trajectory = vec![est.estimate()[0]];
    for &x in &xs[5..] {
        est.ingest(splat(x));
        trajectory.push(est.estimate()[0]);
    }
    (est, trajectory)
}

fn assert_close(actual: &[f32], expected: &[f32], tol: f32) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= tol, "step {i}: got {a}, expected {e}");
    }
}

#[test]
fn params_reject_out_of_range_percentiles() {
    assert!(P2Params::new(-0.01).is_err());
    assert!(P2Params::new(1.01).is_err());
    assert!(P2Params::new(f32::NAN).is_err());
    assert!(P2Params::new(0.0).is_ok());
    assert!(P2Params::new(1.0).is_ok());
    assert_eq!(P2Params::new(0.5).unwrap(), P2Params::median());
}

#[test]
fn median_tracks_published_worked_example() {
    let (est, trajectory) = run_scalar(P2Params::median(), &JAIN_CHLAMTAC);
    let expected = [
        0.74, 0.74, 0.74, 2.178333, 4.752686, 4.752686, 9.274705, 9.274705, 9.274705, 9.274705,
        6.297302, 6.297302, 6.297302, 6.297302, 4.440635, 4.440635,
    ];
    assert_close(&trajectory, &expected, 1e-3);
    assert_eq!(est.positions().map(|n| n[0]), [0, 5, 9, 15, 19]);
    assert_eq!(est.count(), 20);
}

#[test]
fn low_percentiles_adjust_markers_top_down() {
    // Markers are adjusted 3 -> 2 -> 1 below the median; the bottom-up order ends at 0.4428.
    let (est, trajectory) = run_scalar(P2Params::new(0.3).unwrap(), &JAIN_CHLAMTAC);
    let expected = [
        0.15, 0.15, 0.15, 1.330833, 1.330833, 1.330833, 3.192814, 3.192814, 3.192814, 1.810547,
        1.810547, 1.810547, 1.07282, 1.07282, 0.636424, 0.636424,
    ];
    assert_close(&trajectory, &expected, 1e-4);
    assert_eq!(est.positions().map(|n| n[0]), [0, 3, 6, 12, 19]);

    // Bottom-up would end at 0.0278.
    let (_, trajectory) = run_scalar(P2Params::new(0.1).unwrap(), &JAIN_CHLAMTAC);
    assert!((trajectory[15] - 0.135861).abs() < 1e-4);
    assert!((trajectory[10] - 0.617017).abs() < 1e-4);
}

#[test]
fn center_neighbor_diverges_only_slightly_from_textbook() {
    let params = P2Params::median().with_linear_neighbor(LinearNeighbor::Center);
    let (_, center) = run_scalar(params, &JAIN_CHLAMTAC);
    let (_, textbook) = run_scalar(P2Params::median(), &JAIN_CHLAMTAC);

    assert_close(&center[..14], &textbook[..14], 1e-6);
    assert!((center[15] - 4.466962).abs() < 1e-3);
    assert!((center[15] - textbook[15]).abs() < 0.05);
}

#[test]
fn increasing_integers_track_running_median() {
    let xs: Vec<f32> = (1..=20).map(|i| i as f32).collect();
    for neighbor in [LinearNeighbor::Textbook, LinearNeighbor::Center] {
        let params = P2Params::median().with_linear_neighbor(neighbor);
        let (est, trajectory) = run_scalar(params, &xs);
        let expected = [
            3.0, 3.0, 3.0, 4.0, 5.0, 5.0, 6.0, 6.0, 7.0, 7.0, 8.0, 8.0, 9.0, 9.0, 10.0, 10.0,
        ];
        assert_close(&trajectory, &expected, 1e-5);
        assert_eq!(est.positions().map(|n| n[0]), [0, 4, 9, 14, 19]);
    }
}

#[test]
fn initialization_sorts_each_lane_independently() {
    let first = [
        [5.0, 0.0, 1.0, 3.0],
        [4.0, 1.0, 5.0, 3.0],
        [3.0, 2.0, 2.0, 3.0],
        [2.0, 3.0, 4.0, 3.0],
        [1.0, 4.0, 3.0, 3.0],
    ];
    let est = P2Estimator::from_first_five(P2Params::median(), first);
    let q = est.heights();
    assert_eq!(q[0], [1.0, 0.0, 1.0, 3.0]);
    assert_eq!(q[2], [3.0, 2.0, 3.0, 3.0]);
    assert_eq!(q[4], [5.0, 4.0, 5.0, 3.0]);
    assert_eq!(est.count(), 5);
}

#[test]
fn initialization_gathers_at_rounded_ranks() {
    let first = [[9.0; 4], [7.0; 4], [5.0; 4], [3.0; 4], [1.0; 4]];

    let low = P2Estimator::from_first_five(P2Params::new(0.0).unwrap(), first);
    assert_eq!(low.positions().map(|n| n[0]), [0, 0, 0, 2, 4]);
    assert_eq!(low.estimate(), [1.0; 4]);

    let high = P2Estimator::from_first_five(P2Params::new(1.0).unwrap(), first);
    assert_eq!(high.positions().map(|n| n[0]), [0, 2, 4, 4, 4]);
    assert_eq!(high.estimate(), [9.0; 4]);

    // 2p = 0.5 and 4p = 1.0: ties round to even.
    let quarter = P2Estimator::from_first_five(P2Params::new(0.25).unwrap(), first);
    assert_eq!(quarter.positions().map(|n| n[0]), [0, 0, 1, 2, 4]);
    assert_eq!(quarter.estimate(), [3.0; 4]);
    assert_eq!(quarter.desired_positions().map(|d| d[0]), [0.0, 0.5, 1.0, 2.5, 4.0]);
}

#[test]
fn constant_input_is_reproduced_exactly() {
    for p in [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
        for neighbor in [LinearNeighbor::Textbook, LinearNeighbor::Center] {
            let params = P2Params::new(p).unwrap().with_linear_neighbor(neighbor);
            let v = [0.3, 0.0, 1.0, 0.5];
            let mut est = P2Estimator::from_first_five(params, [v; 5]);
            assert_eq!(est.estimate(), v);
            for _ in 0..200 {
                est.ingest(v);
                assert_eq!(est.estimate(), v, "p={p} {neighbor:?}");
            }
        }
    }
}

#[test]
fn lanes_do_not_share_state() {
    let params = P2Params::new(0.3).unwrap();
    let lane_values = |i: usize| -> Lanes {
        let t = i as f32;
        [
            (t * 0.37).sin(),
            (t * 1.91).cos() * 5.0,
            ((i * 7919) % 101) as f32,
            -t,
        ]
    };

    let first: [Lanes; 5] = std::array::from_fn(lane_values);
    let mut packed = P2Estimator::from_first_five(params, first);
    let mut singles: Vec<P2Estimator> = (0..LANES)
        .map(|lane| P2Estimator::from_first_five(params, first.map(|x| splat(x[lane]))))
        .collect();

    for i in 5..300 {
        let x = lane_values(i);
        packed.ingest(x);
        for (lane, single) in singles.iter_mut().enumerate() {
            single.ingest(splat(x[lane]));
        }
    }

    for (lane, single) in singles.iter().enumerate() {
        assert_eq!(packed.estimate()[lane], single.estimate()[0]);
        assert_eq!(
            packed.positions().map(|n| n[lane]),
            single.positions().map(|n| n[0])
        );
    }
}

#[test]
fn nan_lane_does_not_contaminate_neighbors() {
    let params = P2Params::median();
    let mut est = P2Estimator::from_first_five(
        params,
        [
            [1.0, 1.0, 1.0, 1.0],
            [2.0, 2.0, 2.0, 2.0],
            [3.0, 3.0, 3.0, 3.0],
            [4.0, 4.0, 4.0, 4.0],
            [5.0, 5.0, 5.0, 5.0],
        ],
    );
    let mut reference = est.clone();
    for i in 0..50 {
        let x = (i % 7) as f32;
        est.ingest([x, f32::NAN, x, x]);
        reference.ingest([x, x, x, x]);
    }
    let got = est.estimate();
    let want = reference.estimate();
    assert_eq!(got[0], want[0]);
    assert_eq!(got[2], want[2]);
    assert_eq!(got[3], want[3]);
}

#[test]
fn adjust_leaves_marker_when_it_cannot_move() {
    let w = MarkerWindow {
        n: [1, 2, 3],
        q: [1.0, 2.0, 3.0],
        desired: 5.0,
    };
    // The next marker is adjacent, so moving up would collide with it.
    assert_eq!(adjust_marker(LinearNeighbor::Textbook, w), (2.0, 2));
}

#[test]
fn adjust_falls_back_to_linear_when_parabola_overshoots() {
    // The parabolic prediction (~0.137) lands beyond q_next.
    let w = MarkerWindow {
        n: [0, 1, 3],
        q: [0.0, 0.1, 0.11],
        desired: 2.0,
    };
    let (q, n) = adjust_marker(LinearNeighbor::Textbook, w);
    assert_eq!(n, 2);
    assert!((q - 0.105).abs() < 1e-6);

    // The center rule interpolates toward itself and stays put.
    let (q_center, n_center) = adjust_marker(LinearNeighbor::Center, w);
    assert_eq!(n_center, 2);
    assert_eq!(q_center, 0.1);
}

#[test]
fn adjust_uses_parabola_when_it_stays_inside() {
    let w = MarkerWindow {
        n: [0, 1, 3],
        q: [0.0, 0.1, 0.2],
        desired: 2.0,
    };
    let (q, n) = adjust_marker(LinearNeighbor::Textbook, w);
    assert_eq!(n, 2);
    assert!((q - (0.1 + 0.2 / 3.0)).abs() < 1e-6);
}

#[test]
fn adjust_moves_down_toward_previous_marker() {
    let w = MarkerWindow {
        n: [0, 4, 6],
        q: [0.0, 8.0, 9.0],
        desired: 2.5,
    };
    let (q, n) = adjust_marker(LinearNeighbor::Textbook, w);
    assert_eq!(n, 3);
    assert!(q > 0.0 && q < 8.0);
}

#[test]
fn linear_neighbor_is_selectable_by_name() {
    let center: LinearNeighbor = serde_json::from_str("\"center\"").unwrap();
    assert_eq!(center, LinearNeighbor::Center);
    assert_eq!(LinearNeighbor::default(), LinearNeighbor::Textbook);
    assert_eq!(
        P2Params::median()
            .with_linear_neighbor(center)
            .linear_neighbor(),
        LinearNeighbor::Center
    );
}
