//! Model file resolution and tokenizer loading

use hf_hub::{api::sync::Api, Repo, RepoType};
use signalclass_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer, TruncationParams};

const DEFAULT_REVISION: &str = "main";

/// Where a model's files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Directory on the local file system
    LocalPath(PathBuf),

    /// Repository on the Hugging Face Hub
    HuggingFace { repo_id: String, revision: String },
}

impl ModelSource {
    /// Interpret a model identifier.
    ///
    /// Existing directories are loaded in place. Anything else is a Hub
    /// repository id, optionally pinned with `repo@revision`.
    pub fn from_identifier(identifier: &str) -> Self {
        let path = Path::new(identifier);
        if path.is_dir() {
            return Self::LocalPath(path.to_path_buf());
        }

        match identifier.rsplit_once('@') {
            Some((repo_id, revision)) if !repo_id.is_empty() && !revision.is_empty() => {
                Self::HuggingFace {
                    repo_id: repo_id.to_string(),
                    revision: revision.to_string(),
                }
            }
            _ => Self::HuggingFace {
                repo_id: identifier.to_string(),
                revision: DEFAULT_REVISION.to_string(),
            },
        }
    }
}

/// Tokenizer definition shipped with a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerFile {
    /// Serialized `tokenizers` pipeline
    Json(PathBuf),
    /// Bare WordPiece vocabulary (older BERT-family checkpoints)
    Vocab(PathBuf),
}

/// Local paths of everything needed to build a classifier
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: TokenizerFile,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Locate (downloading if needed) the files for a model source
    pub fn fetch(source: &ModelSource) -> Result<Self> {
        match source {
            ModelSource::LocalPath(dir) => Self::from_dir(dir),
            ModelSource::HuggingFace { repo_id, revision } => Self::download(repo_id, revision),
        }
    }

    fn from_dir(dir: &Path) -> Result<Self> {
        let config = required(dir.join("config.json"))?;
        let weights = required(dir.join("model.safetensors"))?;

        let tokenizer_json = dir.join("tokenizer.json");
        let vocab = dir.join("vocab.txt");
        let tokenizer = if tokenizer_json.exists() {
            TokenizerFile::Json(tokenizer_json)
        } else if vocab.exists() {
            TokenizerFile::Vocab(vocab)
        } else {
            return Err(Error::model_load(format!(
                "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
                dir.display()
            )));
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }

    fn download(repo_id: &str, revision: &str) -> Result<Self> {
        tracing::info!("Fetching model from HuggingFace: {} @ {}", repo_id, revision);

        let api = Api::new()
            .map_err(|e| Error::model_load(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(Repo::with_revision(
            repo_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let get = |file: &str| {
            tracing::debug!("Resolving {}", file);
            repo.get(file).map_err(|e| {
                Error::model_load(format!("Failed to download {} from {}: {}", file, repo_id, e))
            })
        };

        let config = get("config.json")?;
        let tokenizer = match get("tokenizer.json") {
            Ok(path) => TokenizerFile::Json(path),
            Err(json_err) => match get("vocab.txt") {
                Ok(path) => TokenizerFile::Vocab(path),
                Err(_) => return Err(json_err),
            },
        };
        let weights = get("model.safetensors")?;

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }
}

/// Load a tokenizer for single-sequence inference.
///
/// Padding is disabled and inputs longer than `max_length` tokens are
/// truncated with special tokens preserved.
pub fn load_tokenizer(file: &TokenizerFile, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = match file {
        TokenizerFile::Json(path) => {
            tracing::debug!("Loading tokenizer from {}", path.display());
            Tokenizer::from_file(path).map_err(|e| {
                Error::model_load(format!("Failed to load {}: {}", path.display(), e))
            })?
        }
        TokenizerFile::Vocab(path) => {
            tracing::debug!("Building WordPiece tokenizer from {}", path.display());
            wordpiece_tokenizer(path)?
        }
    };

    tokenizer.with_padding(None);
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| Error::model_load(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}

fn wordpiece_tokenizer(vocab_path: &Path) -> Result<Tokenizer> {
    use tokenizers::models::wordpiece::WordPiece;
    use tokenizers::normalizers::BertNormalizer;
    use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
    use tokenizers::processors::bert::BertProcessing;
    use tokenizers::Model;

    let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| Error::model_load(format!("Failed to build WordPiece model: {}", e)))?;

    let vocab = wordpiece.get_vocab();
    let cls_id = vocab.get("[CLS]").copied().unwrap_or(101);
    let sep_id = vocab.get("[SEP]").copied().unwrap_or(102);

    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer.with_normalizer(Some(BertNormalizer::default()));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
    tokenizer.with_post_processor(Some(BertProcessing::new(
        ("[SEP]".to_string(), sep_id),
        ("[CLS]".to_string(), cls_id),
    )));

    Ok(tokenizer)
}

fn required(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(Error::model_load(format!("Model file not found: {}", path.display())))
    }
}
