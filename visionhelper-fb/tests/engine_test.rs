//! Integration tests for the combo feedback engine with recording drivers

use parking_lot::Mutex;
use std::sync::Arc;
use visionhelper_core::{ConfigSnapshot, SharedConfig};
use visionhelper_fb::{
    ComboFeedbackEngine, FeedbackError, FeedbackOutcome, FeedbackTable, HapticDriver, Tone, TonePlayer,
};

#[derive(Default)]
struct Recorder {
    vibrations: Mutex<Vec<Vec<u64>>>,
    tones: Mutex<Vec<(Tone, u64)>>,
}

impl HapticDriver for Recorder {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), FeedbackError> {
        self.vibrations.lock().push(pattern.to_vec());
        Ok(())
    }
}

impl TonePlayer for Recorder {
    fn play_tone(&self, tone: Tone, duration_ms: u64) -> Result<(), FeedbackError> {
        self.tones.lock().push((tone, duration_ms));
        Ok(())
    }
}

fn setup(snapshot: ConfigSnapshot) -> (ComboFeedbackEngine, Arc<Recorder>, Arc<SharedConfig>) {
    let recorder = Arc::new(Recorder::default());
    let config = Arc::new(SharedConfig::new(snapshot));
    let engine = ComboFeedbackEngine::with_builtin_table(config.clone(), recorder.clone(), recorder.clone());
    (engine, recorder, config)
}

#[test]
fn test_scenario_tone_only_with_cooldown() {
    let (mut engine, recorder, _) = setup(ConfigSnapshot {
        feedback_cooldown_ms: 500,
        sound_enabled: true,
        vibration_enabled: false,
        ..ConfigSnapshot::default()
    });

    assert!(matches!(engine.evaluate(["Red light for car"], 0), FeedbackOutcome::Dispatched(_)));
    assert!(matches!(engine.evaluate(["Red light for car"], 200), FeedbackOutcome::Suppressed { .. }));
    assert!(matches!(engine.evaluate(["Red light for car"], 550), FeedbackOutcome::Dispatched(_)));

    assert!(recorder.vibrations.lock().is_empty());
    let tones = recorder.tones.lock();
    assert_eq!(tones.len(), 2);
    assert!(tones.iter().all(|(tone, duration)| *tone == Tone::PropNack && *duration == 200));
}

#[test]
fn test_arrival_order_does_not_change_pattern() {
    let (mut first, first_rec, _) = setup(ConfigSnapshot::default());
    let (mut second, second_rec, _) = setup(ConfigSnapshot::default());

    first.evaluate(["Traffic light (red)", "Crossing sign", "Pedestrian crossing"], 0);
    second.evaluate(["Pedestrian crossing", "Traffic light (red)", "Crossing sign"], 0);

    assert_eq!(*first_rec.vibrations.lock(), *second_rec.vibrations.lock());
    assert_eq!(*first_rec.tones.lock(), vec![(Tone::SupError, 200)]);
    assert_eq!(*second_rec.tones.lock(), vec![(Tone::SupError, 200)]);
}

#[test]
fn test_both_outputs_disabled_still_cools_down() {
    let (mut engine, recorder, _) = setup(ConfigSnapshot {
        sound_enabled: false,
        vibration_enabled: false,
        ..ConfigSnapshot::default()
    });

    match engine.evaluate(["Crossing sign"], 0) {
        FeedbackOutcome::Dispatched(dispatch) => {
            assert!(!dispatch.vibrated);
            assert!(!dispatch.toned);
        }
        other => panic!("Expected dispatch, got {:?}", other),
    }
    assert!(matches!(engine.evaluate(["Crossing sign"], 10), FeedbackOutcome::Suppressed { .. }));
    assert!(recorder.vibrations.lock().is_empty());
    assert!(recorder.tones.lock().is_empty());
}

#[test]
fn test_settings_toggle_between_frames() {
    let (mut engine, recorder, config) = setup(ConfigSnapshot {
        feedback_cooldown_ms: 0,
        ..ConfigSnapshot::default()
    });

    engine.evaluate(["Crossing sign"], 0);
    config.update(|s| s.vibration_enabled = false);
    engine.evaluate(["Crossing sign"], 1);

    assert_eq!(recorder.vibrations.lock().len(), 1);
    assert_eq!(recorder.tones.lock().len(), 2);
}

#[test]
fn test_custom_table() {
    let table = FeedbackTable::from_json(
        r#"{
            "version": 2,
            "entries": {
                "default": {"vibration": [0, 40], "tone": "PROP_BEEP"},
                "Crossing sign": {"vibration": [0, 10, 20, 30], "tone": "SUP_RADIO_ACK"}
            }
        }"#,
    )
    .unwrap();

    let recorder = Arc::new(Recorder::default());
    let config = Arc::new(SharedConfig::new(ConfigSnapshot::default()));
    let mut engine = ComboFeedbackEngine::new(config, Arc::new(table), recorder.clone(), recorder.clone());

    engine.evaluate(["Crossing sign", "Crossing sign"], 0);
    assert_eq!(engine.table().version(), 2);
    assert_eq!(*recorder.vibrations.lock(), vec![vec![0, 10, 20, 30]]);
    assert_eq!(*recorder.tones.lock(), vec![(Tone::SupRadioAck, 200)]);
}
