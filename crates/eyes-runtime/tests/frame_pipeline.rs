//! End-to-end checks of the frame pipeline through its JSON boundary.

use std::sync::Arc;

use eyes_runtime::FramePipeline;
use eyes_types::{ClassificationTables, EyesError, FrameInput, PerceptionSettings, SceneLabel};

fn parse(json: &str) -> FrameInput {
    serde_json::from_str(json).expect("valid frame JSON")
}

#[test]
fn json_frame_round_trips_to_json_result() {
    let input = parse(
        r#"{
            "image_height_px": 640,
            "detections": [
                {"label": "person", "confidence": 0.8, "bbox": [300, 100, 360, 300], "bbox_height_px": 200},
                {"label": "car", "confidence": 0.9, "bbox": [0, 0, 400, 900], "bbox_height_px": 900},
                {"label": "truck", "confidence": 0.5, "bbox": [500, 0, 600, 10], "bbox_height_px": 10}
            ]
        }"#,
    );

    let result = FramePipeline::with_defaults().process(&input).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["priority_objects"][0]["label"], "car");
    assert_eq!(value["scene_type"], "Outdoor / Street");
    assert_eq!(value["alerts"][0], "⚠️ Danger: car very close – 1.0m");
    assert_eq!(value["detections"][1]["bbox"], serde_json::json!([0, 0, 400, 900]));
    assert_eq!(value["detections"][1]["band"], "very_close");
    assert!(value["currency"].is_null());
    assert_eq!(value["low_light"], false);
}

#[test]
fn malformed_depth_map_is_rejected_at_the_boundary() {
    let err = serde_json::from_str::<FrameInput>(
        r#"{"image_height_px": 640, "depth_map": {"width": 2, "height": 2, "data": [1.0]}}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("needs 4 values"), "{err}");
}

#[test]
fn zero_image_height_with_detections_is_invalid() {
    let input = parse(
        r#"{"image_height_px": 0, "detections": [
            {"label": "cup", "confidence": 0.6, "bbox": [0, 0, 10, 10], "bbox_height_px": 10}
        ]}"#,
    );
    assert_eq!(
        FramePipeline::with_defaults().process(&input),
        Err(EyesError::InvalidImageHeight)
    );
}

#[test]
fn shortlist_is_bounded_and_unique() {
    let mut dets = Vec::new();
    for (i, label) in ["chair", "chair", "couch", "tv", "book", "vase"].iter().enumerate() {
        let x = i as i32 * 10;
        dets.push(format!(
            r#"{{"label": "{label}", "confidence": 0.7, "bbox": [{x}, 0, {}, 100], "bbox_height_px": 100}}"#,
            x + 5
        ));
    }
    let input = parse(&format!(
        r#"{{"image_height_px": 640, "detections": [{}]}}"#,
        dets.join(",")
    ));

    let result = FramePipeline::with_defaults().process(&input).unwrap();
    assert!(result.priority_objects.len() <= 3);
    let mut labels: Vec<&str> = result.priority_objects.iter().map(|p| p.label.as_str()).collect();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels.len(), result.priority_objects.len());
    assert_eq!(result.scene_type, SceneLabel::LivingRoom);
}

#[test]
fn distances_stay_within_strategy_bounds() {
    // Heights from a few pixels up to the full frame exercise both clamps.
    for h in [1_u32, 5, 40, 200, 640, 5000] {
        let input = parse(&format!(
            r#"{{"image_height_px": 640, "detections": [
                {{"label": "person", "confidence": 0.9, "bbox": [0, 0, 10, {h}], "bbox_height_px": {h}}}
            ]}}"#
        ));
        let result = FramePipeline::with_defaults().process(&input).unwrap();
        let d = result.detections[0].distance;
        assert!((0.2..=20.0).contains(&d), "height {h} gave {d}");
    }
}

#[test]
fn pipeline_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FramePipeline>();

    let pipeline = FramePipeline::new(
        Arc::new(ClassificationTables::default()),
        PerceptionSettings::default(),
    );
    let input = parse(
        r#"{"image_height_px": 640, "detections": [
            {"label": "dog", "confidence": 0.75, "bbox": [0, 0, 100, 120], "bbox_height_px": 120}
        ]}"#,
    );
    let expected = pipeline.process(&input).unwrap().priority_objects;

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..25 {
                    let got = pipeline.process(&input).unwrap();
                    assert_eq!(got.priority_objects, expected);
                }
            });
        }
    });
}

#[test]
fn custom_tables_drive_classification() {
    let mut tables = ClassificationTables::empty();
    tables.critical.insert("forklift".to_string());
    tables.known_heights.insert("forklift".to_string(), 2.0);

    let pipeline = FramePipeline::new(Arc::new(tables), PerceptionSettings::default());
    // 600 × 2.0 / 1200 → 1.0 m
    let input = parse(
        r#"{"image_height_px": 640, "detections": [
            {"label": "forklift", "confidence": 0.9, "bbox": [0, 0, 300, 1200], "bbox_height_px": 1200}
        ]}"#,
    );
    let result = pipeline.process(&input).unwrap();
    assert_eq!(result.alerts, vec!["⚠️ Danger: forklift very close – 1.0m".to_string()]);
    assert_eq!(result.scene_type, SceneLabel::GeneralArea);
}

#[test]
fn oversized_grid_headers_fail_at_the_boundary() {
    let big = 1_u64 << 32;
    for field in ["depth_map", "luma"] {
        let json = format!(
            r#"{{"image_height_px": 640,
                "detections": [{{"label": "car", "confidence": 0.9, "bbox": [0, 0, 10, 10], "bbox_height_px": 10}}],
                "{field}": {{"width": {big}, "height": {big}, "data": []}}}}"#
        );
        assert!(serde_json::from_str::<FrameInput>(&json).is_err(), "{field}");
    }
}

#[test]
fn extreme_bbox_coordinates_do_not_abort_the_frame() {
    let input = parse(&format!(
        r#"{{"image_height_px": 640,
            "detections": [{{"label": "car", "confidence": 0.9, "bbox": [{min}, {min}, {max}, {max}], "bbox_height_px": 4000000000}}],
            "depth_map": {{"width": 2, "height": 2, "data": [1.0, 2.0, 3.0, 4.0]}}}}"#,
        min = i32::MIN,
        max = i32::MAX
    ));
    let result = FramePipeline::with_defaults().process(&input).unwrap();
    assert!(result.detections[0].distance > 0.0);
}
