//! Loading real architectures from local checkpoints
//!
//! Builds tiny randomly initialized DistilBERT and BERT checkpoints in a
//! temp dir and runs them through `InferenceEngine::load`, so the weight
//! loading, prefix fallback, attention masks and truncation are exercised
//! without the network.

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use serde_json::{json, Value};
use signalclass_core::DeviceKind;
use signalclass_engine::model::{DenseReluHead, PoolerTanhHead};
use signalclass_engine::testing::TOY_TOKENIZER_JSON;
use signalclass_engine::{EngineOptions, InferenceEngine};
use std::path::Path;
use tempfile::TempDir;

const HIDDEN: usize = 8;
const POSITIONS: usize = 32;
const LONG_TEXT_REPEATS: usize = 100;

fn labels() -> Value {
    json!({ "0": "NEGATIVE", "1": "POSITIVE" })
}

fn distilbert_config() -> Value {
    json!({
        "model_type": "distilbert",
        "vocab_size": 15,
        "dim": HIDDEN,
        "n_layers": 1,
        "n_heads": 2,
        "hidden_dim": 16,
        "activation": "gelu",
        "max_position_embeddings": POSITIONS,
        "initializer_range": 0.02,
        "pad_token_id": 0,
        "id2label": labels(),
    })
}

fn bert_config() -> Value {
    json!({
        "model_type": "bert",
        "vocab_size": 15,
        "hidden_size": HIDDEN,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "intermediate_size": 16,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.0,
        "max_position_embeddings": POSITIONS,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "id2label": labels(),
    })
}

fn write_model_dir(dir: &Path, config: &Value, varmap: &VarMap) {
    std::fs::write(dir.join("config.json"), config.to_string()).unwrap();
    std::fs::write(dir.join("tokenizer.json"), TOY_TOKENIZER_JSON).unwrap();
    varmap.save(dir.join("model.safetensors")).unwrap();
}

/// DistilBERT backbone under `prefix` ("" for root) plus the dense head
fn distilbert_checkpoint(prefix: &str) -> TempDir {
    let config = distilbert_config();
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);

    let model_config: DistilBertConfig = serde_json::from_value(config.clone()).unwrap();
    let backbone_vb = if prefix.is_empty() { vb.clone() } else { vb.pp(prefix) };
    DistilBertModel::load(backbone_vb, &model_config).unwrap();
    DenseReluHead::load(vb, HIDDEN, 2).unwrap();

    let dir = TempDir::new().unwrap();
    write_model_dir(dir.path(), &config, &varmap);
    dir
}

/// BERT backbone and pooler under `prefix` ("" for root) plus the classifier
fn bert_checkpoint(prefix: &str) -> TempDir {
    let config = bert_config();
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);

    let model_config: BertConfig = serde_json::from_value(config.clone()).unwrap();
    let backbone_vb = if prefix.is_empty() { vb.clone() } else { vb.pp(prefix) };
    BertModel::load(backbone_vb.clone(), &model_config).unwrap();
    PoolerTanhHead::load(
        backbone_vb.pp("pooler").pp("dense"),
        vb.pp("classifier"),
        HIDDEN,
        2,
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    write_model_dir(dir.path(), &config, &varmap);
    dir
}

fn load(dir: &TempDir) -> InferenceEngine {
    let options = EngineOptions::default()
        .with_model(dir.path().to_string_lossy())
        .with_device(DeviceKind::Cpu)
        .with_config_path(dir.path().join("no_model_config.json"));
    InferenceEngine::load(options).unwrap()
}

fn assert_well_formed(engine: &InferenceEngine, text: &str) {
    let result = engine.predict(text).unwrap();

    assert_eq!(result.logits.len(), 2);
    assert!(engine.labels().as_slice().contains(&result.label));
    assert!((0.5..=1.0).contains(&result.confidence), "got {}", result.confidence);
    assert_eq!(engine.predict(text).unwrap(), result);
}

#[test]
fn test_distilbert_nested_weights() {
    let dir = distilbert_checkpoint("distilbert");
    let engine = load(&dir);

    assert_eq!(engine.labels().as_slice(), &["NEGATIVE", "POSITIVE"]);
    assert!(format!("{:?}", engine).contains("distilbert"));
    assert_well_formed(&engine, "Target locked. Enemy resistance expected. Victory imminent.");
}

#[test]
fn test_distilbert_root_weights() {
    let dir = distilbert_checkpoint("");
    let engine = load(&dir);

    assert_well_formed(&engine, "good win");
}

#[test]
fn test_bert_nested_weights() {
    let dir = bert_checkpoint("bert");
    let engine = load(&dir);

    assert!(format!("{:?}", engine).contains("bert"));
    assert_well_formed(&engine, "Target locked. Enemy resistance expected. Victory imminent.");
}

#[test]
fn test_bert_root_weights() {
    let dir = bert_checkpoint("");
    let engine = load(&dir);

    assert_well_formed(&engine, "bad defeat");
}

#[test]
fn test_same_checkpoint_loads_identically() {
    let dir = distilbert_checkpoint("distilbert");
    let first = load(&dir).predict("victory imminent").unwrap();
    let second = load(&dir).predict("victory imminent").unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_long_input_truncated_to_model_positions() {
    // Default options ask for 512 tokens; these models embed only 32.
    let text = "good ".repeat(LONG_TEXT_REPEATS);

    let distilbert = distilbert_checkpoint("distilbert");
    assert_well_formed(&load(&distilbert), &text);

    let bert = bert_checkpoint("bert");
    assert_well_formed(&load(&bert), &text);
}

#[test]
fn test_missing_head_fails_construction() {
    let config = distilbert_config();
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let model_config: DistilBertConfig = serde_json::from_value(config.clone()).unwrap();
    DistilBertModel::load(vb.pp("distilbert"), &model_config).unwrap();

    let dir = TempDir::new().unwrap();
    write_model_dir(dir.path(), &config, &varmap);

    let options = EngineOptions::default()
        .with_model(dir.path().to_string_lossy())
        .with_device(DeviceKind::Cpu);
    let err = InferenceEngine::load(options).unwrap_err();
    assert!(err.to_string().contains("classification head"), "got {}", err);
}
