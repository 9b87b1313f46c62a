use super::*;

#[test]
fn defaults_match_the_effect_defaults() {
    let s = MedianSketchSettings::default();
    assert_eq!(s.radius, 15.0);
    assert_eq!(s.percentile, 0.5);
    assert_eq!(s.iterations, 2);
    assert_eq!(s.sample_count_percent, 0.10);
    assert_eq!(s.edge_mode, EdgeMode::Transparent);
    assert_eq!(s.linear_neighbor, LinearNeighbor::Textbook);
}

#[test]
fn sketch_preset_uses_mirrored_sparse_sampling() {
    let s = MedianSketchSettings::sketch();
    assert_eq!(s.radius, 25.0);
    assert_eq!(s.iterations, 3);
    assert_eq!(s.sample_count_percent, 0.01);
    assert_eq!(s.edge_mode, EdgeMode::Mirror);
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let json = r#"{ "radius": 4.5, "edge_mode": "clamp", "linear_neighbor": "center" }"#;
    let s = MedianSketchSettings::from_reader(json.as_bytes()).unwrap();
    assert_eq!(s.radius, 4.5);
    assert_eq!(s.edge_mode, EdgeMode::Clamp);
    assert_eq!(s.linear_neighbor, LinearNeighbor::Center);
    assert_eq!(s.iterations, 2);
    assert_eq!(s.percentile, 0.5);
}

#[test]
fn json_errors_are_serialization_errors() {
    let err = MedianSketchSettings::from_reader("{ \"radius\": \"big\" }".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = MedianSketchSettings::from_path("does/not/exist.json").unwrap_err();
    assert!(err.to_string().contains("does/not/exist.json"));
}

#[test]
fn clamped_limits_every_range() {
    let s = MedianSketchSettings {
        radius: 500.0,
        percentile: 1.5,
        iterations: 0,
        sample_count_percent: 0.0,
        ..MedianSketchSettings::default()
    };
    let r = s.clamped().unwrap();
    assert_eq!(r.radius, MAX_RADIUS);
    assert_eq!(r.percentile, 1.0);
    assert_eq!(r.iterations, 1);
    assert_eq!(r.sample_count_percent, MIN_SAMPLE_COUNT_PERCENT);

    let negative = MedianSketchSettings {
        radius: -2.0,
        percentile: -0.1,
        ..MedianSketchSettings::default()
    };
    let r = negative.clamped().unwrap();
    assert_eq!(r.radius, 0.0);
    assert_eq!(r.percentile, 0.0);
}

#[test]
fn clamped_rejects_non_finite_values() {
    let s = MedianSketchSettings {
        percentile: f32::NAN,
        ..MedianSketchSettings::default()
    };
    assert!(s.clamped().is_err());
    let s = MedianSketchSettings {
        radius: f32::INFINITY,
        ..MedianSketchSettings::default()
    };
    assert!(s.clamped().is_err());
}
