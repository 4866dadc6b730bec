use std::sync::Arc;
use visionhelper_core::{ConfigSnapshot, SharedConfig};
use visionhelper_eye::{BoxColor, Detection, DetectionSet, FrameAdmissionController, OverlayRenderer, Viewport};
use visionhelper_fb::{
    combo_key, ComboFeedbackEngine, FeedbackOutcome, FeedbackState, FeedbackTable, LoggingHaptics, LoggingTonePlayer,
    Tone, DEFAULT_KEY,
};

fn engine(snapshot: ConfigSnapshot) -> ComboFeedbackEngine {
    ComboFeedbackEngine::with_builtin_table(
        Arc::new(SharedConfig::new(snapshot)),
        Arc::new(LoggingHaptics),
        Arc::new(LoggingTonePlayer),
    )
}

#[test]
fn test_combo_key_examples() {
    assert_eq!(
        combo_key(["Crossing sign", "Pedestrian crossing"]),
        combo_key(["Pedestrian crossing", "Crossing sign"])
    );
    assert_eq!(
        combo_key(["Pedestrian crossing", "Crossing sign"]).as_deref(),
        Some("Crossing sign+Pedestrian crossing")
    );
    assert_eq!(combo_key(Vec::<String>::new()), None);
}

#[test]
fn test_duplicate_classes_collapse_to_single_key() {
    assert_eq!(
        combo_key(["Crossing sign", "Crossing sign", "Crossing sign"]).as_deref(),
        Some("Crossing sign")
    );
}

#[test]
fn test_unsorted_table_entries_fall_back_to_default() {
    let table = FeedbackTable::builtin();
    // Authored as "Pedestrian crossing+Crossing sign", which no detection produces
    let key = combo_key(["Pedestrian crossing", "Crossing sign"]).unwrap();
    assert_eq!(table.resolve(&key), table.resolve(DEFAULT_KEY));
    assert_eq!(table.resolve(&key).tone, Tone::PropBeep);
    assert!(table.contains("Pedestrian crossing+Crossing sign"));
}

#[test]
fn test_sorted_combo_uses_authored_pattern() {
    let table = FeedbackTable::builtin();
    let key = combo_key(["Traffic light (red)", "Crossing sign", "Pedestrian crossing"]).unwrap();
    assert_eq!(table.resolve(&key).tone, Tone::SupError);
}

#[test]
fn test_debounce_window() {
    let mut engine = engine(ConfigSnapshot::default());
    assert!(matches!(engine.evaluate(["Crossing sign"], 0), FeedbackOutcome::Dispatched(_)));
    assert!(matches!(engine.evaluate(["Crossing sign"], 400), FeedbackOutcome::Suppressed { .. }));
    assert!(matches!(engine.evaluate(["Crossing sign"], 600), FeedbackOutcome::Dispatched(_)));
}

#[test]
fn test_different_combo_still_debounced() {
    let mut engine = engine(ConfigSnapshot::default());
    engine.evaluate(["Crossing sign"], 0);
    assert!(matches!(
        engine.evaluate(["Traffic light (red)"], 100),
        FeedbackOutcome::Suppressed { .. }
    ));
}

#[test]
fn test_zero_cooldown_never_cools() {
    let mut engine = engine(ConfigSnapshot {
        feedback_cooldown_ms: 0,
        ..ConfigSnapshot::default()
    });
    for t in [0u64, 0, 1, 1] {
        assert!(matches!(engine.evaluate(["Crossing sign"], t), FeedbackOutcome::Dispatched(_)));
    }
    assert_eq!(engine.state(1), FeedbackState::Idle);
}

#[test]
fn test_engine_never_stuck_cooling_after_clock_reset() {
    let mut engine = engine(ConfigSnapshot::default());
    engine.evaluate(["Crossing sign"], 1_000_000);
    assert_eq!(engine.state(10), FeedbackState::Idle);
    assert!(matches!(engine.evaluate(["Crossing sign"], 10), FeedbackOutcome::Dispatched(_)));
}

#[test]
fn test_admission_with_repeated_timestamps() {
    let mut admission = FrameAdmissionController::new(Arc::new(SharedConfig::default()));
    assert!(admission.admit(1000));
    assert!(!admission.admit(1000));
    assert!(!admission.admit(1000));
}

#[test]
fn test_maximum_rate_admits_every_millisecond_step() {
    let config = ConfigSnapshot {
        analysis_rate_fps: 120,
        ..ConfigSnapshot::default()
    };
    assert_eq!(config.min_analysis_interval_ms(), 8);
    let mut admission = FrameAdmissionController::new(Arc::new(SharedConfig::new(config)));
    assert!(admission.admit(0));
    assert!(!admission.admit(7));
    assert!(admission.admit(8));
}

#[test]
fn test_box_touching_image_edges_is_valid() {
    let set = DetectionSet::from_raw(vec![Detection {
        class_id: 42,
        class_name: "Bus".to_string(),
        confidence: 0.0,
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0,
    }]);
    let overlay = OverlayRenderer::default().render(&set, Some(Viewport::new(1, 1)), None);
    assert_eq!(overlay.len(), 1);
    assert_eq!(overlay.elements[0].color, BoxColor::White);
    assert_eq!(overlay.elements[0].caption, "Bus 0.00");
}

#[test]
fn test_all_malformed_renders_empty_overlay() {
    let set = DetectionSet::from_raw(vec![Detection {
        class_id: 0,
        class_name: "Crossing sign".to_string(),
        confidence: 1.5,
        x1: 0.1,
        y1: 0.1,
        x2: 0.2,
        y2: 0.2,
    }]);
    assert!(set.is_empty());
    let overlay = OverlayRenderer::default().render(&set, Some(Viewport::new(10, 10)), None);
    assert!(overlay.is_empty());
    assert_eq!(overlay.width, 10);
}
