//! Tests against the real default sentiment model.
//!
//! These download `distilbert-base-uncased-finetuned-sst-2-english` from the
//! Hugging Face Hub, so they only run with `SIGNALCLASS_RUN_MODEL_TESTS=1`.

use signalclass_core::{DeviceKind, Error};
use signalclass_engine::{EngineOptions, InferenceEngine, DEFAULT_MODEL_ID};
use std::sync::OnceLock;

const SIGNAL: &str = "Target locked. Enemy resistance expected. Victory imminent.";

fn model_tests_enabled() -> bool {
    std::env::var("SIGNALCLASS_RUN_MODEL_TESTS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn default_engine() -> Option<&'static InferenceEngine> {
    static ENGINE: OnceLock<InferenceEngine> = OnceLock::new();

    if !model_tests_enabled() {
        return None;
    }

    Some(ENGINE.get_or_init(|| {
        let options = EngineOptions::default()
            .with_model(DEFAULT_MODEL_ID)
            .with_device(DeviceKind::Cpu);
        InferenceEngine::load(options).expect("Failed to load default sentiment model")
    }))
}

#[test]
fn test_default_model_labels() {
    let Some(engine) = default_engine() else {
        return;
    };

    assert_eq!(engine.model_id(), DEFAULT_MODEL_ID);
    assert_eq!(engine.labels().as_slice(), &["NEGATIVE", "POSITIVE"]);
}

#[test]
fn test_signal_scenario() {
    let Some(engine) = default_engine() else {
        return;
    };

    let result = engine.predict(SIGNAL).unwrap();

    assert!(
        engine.labels().as_slice().contains(&result.label),
        "Unexpected label {}",
        result.label
    );
    assert!(
        result.confidence > 0.5,
        "Expected a decisive prediction, got {}",
        result.confidence
    );
    assert_eq!(result.logits.len(), 2);
}

#[test]
fn test_default_model_positive_and_negative() {
    let Some(engine) = default_engine() else {
        return;
    };

    let positive = engine
        .predict("I absolutely love this and it exceeded my expectations.")
        .unwrap();
    assert_eq!(positive.label, "POSITIVE");
    assert!(positive.confidence > 0.8, "got {}", positive.confidence);

    let negative = engine
        .predict("This is the worst service I have ever received.")
        .unwrap();
    assert_eq!(negative.label, "NEGATIVE");
    assert!(negative.confidence > 0.8, "got {}", negative.confidence);
}

#[test]
fn test_default_model_is_deterministic() {
    let Some(engine) = default_engine() else {
        return;
    };

    let first = engine.predict(SIGNAL).unwrap();
    let second = engine.predict(SIGNAL).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_default_model_confidence_matches_logits() {
    let Some(engine) = default_engine() else {
        return;
    };

    let result = engine.predict("Neutral test sentence").unwrap();
    let probs = signalclass_engine::scores::softmax(&result.logits).unwrap();
    let sum: f32 = probs.iter().sum();

    assert!((sum - 1.0).abs() < 1e-6);
    let best = probs.iter().cloned().fold(f32::MIN, f32::max);
    assert_eq!(result.confidence, best);
}

#[test]
fn test_long_input_is_truncated() {
    let Some(engine) = default_engine() else {
        return;
    };

    let long = "the enemy advances again and again ".repeat(400);
    let result = engine.predict(&long).unwrap();
    assert_eq!(result.logits.len(), 2);
}

#[test]
fn test_unknown_model_fails_construction() {
    if !model_tests_enabled() {
        return;
    }

    let options = EngineOptions::default()
        .with_model("signalclass/definitely-not-a-real-model")
        .with_device(DeviceKind::Cpu);

    match InferenceEngine::load(options) {
        Ok(_) => panic!("Expected loading an unknown model to fail"),
        Err(err) => assert!(matches!(err, Error::ModelLoad(_)), "got {}", err),
    }
}
