//! Text-to-vector embedding.
//!
//! [`OnnxEmbedder`] runs a sentence-transformer ONNX export (default
//! all-MiniLM-L6-v2, 384 dimensions) with mean pooling and L2 normalization.
//! The model is fetched through the HuggingFace hub cache and loaded lazily on
//! the first call, or eagerly with [`OnnxEmbedder::ensure_loaded`].

use std::path::PathBuf;

use hf_hub::api::sync::ApiBuilder;
use ort::inputs;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};

use crate::errors::Error;

/// Maximum tokens fed to the model; longer texts are truncated.
const MAX_TOKENS: usize = 512;

/// Turns text into a fixed-length vector.
///
/// Implementations must be deterministic for a fixed model version and
/// always return vectors of the same length.
pub trait Embedder {
    /// Identifier of the model producing the vectors.
    fn model_id(&self) -> &str;

    /// Embed a single text.
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, Error>;
}

/// Loaded ONNX session plus tokenizer.
struct LoadedModel {
    session: Session,
    tokenizer: Tokenizer,
    requires_token_type_ids: bool,
}

/// ONNX embedding engine with lazy model loading.
///
/// # Mutability
///
/// `embed` takes `&mut self`: the session mutates internal state for tensor
/// allocations and the model may be loaded on first use.
pub struct OnnxEmbedder {
    model_id: String,
    cache_dir: Option<PathBuf>,
    model: Option<LoadedModel>,
}

impl OnnxEmbedder {
    /// Create an embedder for `model_id`. Performs no I/O.
    pub fn new(model_id: &str, cache_dir: Option<PathBuf>) -> Self {
        Self {
            model_id: model_id.to_string(),
            cache_dir,
            model: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Fetch and load the model now instead of on the first `embed` call.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelUnavailable` if the files cannot be downloaded or
    /// the ONNX session cannot be built.
    pub fn ensure_loaded(&mut self) -> Result<(), Error> {
        if self.model.is_none() {
            self.model = Some(self.load()?);
        }
        Ok(())
    }

    fn load(&self) -> Result<LoadedModel, Error> {
        tracing::info!(model = %self.model_id, "Loading embedding model");
        let unavailable = |reason: String| Error::ModelUnavailable {
            model: self.model_id.clone(),
            reason,
        };

        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(dir) = &self.cache_dir {
            builder = builder.with_cache_dir(dir.clone());
        }
        let api = builder.build().map_err(|e| unavailable(e.to_string()))?;
        let repo = api.model(self.model_id.clone());

        let model_path = repo
            .get("onnx/model.onnx")
            .or_else(|_| repo.get("model.onnx"))
            .map_err(|e| unavailable(format!("no ONNX export found: {e}")))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| unavailable(format!("no tokenizer.json found: {e}")))?;

        let mut tokenizer =
            Tokenizer::from_file(tokenizer_path).map_err(|e| unavailable(e.to_string()))?;
        tokenizer
            .with_padding(None)
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| unavailable(e.to_string()))?;

        let session = Session::builder()
            .map_err(|e| unavailable(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level1)
            .map_err(|e| unavailable(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e| unavailable(e.to_string()))?;

        // BERT-style exports declare token_type_ids, others do not
        let requires_token_type_ids = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        tracing::debug!(
            model = %self.model_id,
            path = %model_path.display(),
            requires_token_type_ids,
            "Embedding model loaded"
        );

        Ok(LoadedModel {
            session,
            tokenizer,
            requires_token_type_ids,
        })
    }
}

impl Embedder for OnnxEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Generate an L2-normalized embedding.
    ///
    /// Texts exceeding 512 tokens are silently truncated.
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, Error> {
        self.ensure_loaded()?;
        let model = self
            .model
            .as_mut()
            .ok_or_else(|| Error::Inference("model not loaded".to_string()))?;

        let encoding = model.tokenizer.encode(text, true)?;
        let input_ids = encoding.get_ids();
        let attention_mask = encoding.get_attention_mask();

        if input_ids.is_empty() {
            return Err(Error::EmptyInput);
        }

        let seq_len = input_ids.len();

        let input_ids_vec: Vec<i64> = input_ids.iter().map(|&id| id as i64).collect();
        let attention_mask_vec: Vec<i64> = attention_mask.iter().map(|&m| m as i64).collect();

        let input_ids_tensor = Tensor::from_array(([1usize, seq_len], input_ids_vec))?;
        let attention_mask_tensor = Tensor::from_array(([1usize, seq_len], attention_mask_vec))?;

        let outputs = if model.requires_token_type_ids {
            let token_type_ids_vec: Vec<i64> = vec![0i64; seq_len]; // Single sentence, all zeros
            let token_type_ids_tensor =
                Tensor::from_array(([1usize, seq_len], token_type_ids_vec))?;
            model.session.run(inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            ])?
        } else {
            model.session.run(inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor
            ])?
        };

        let (shape, data) = outputs
            .get("last_hidden_state")
            .or_else(|| outputs.get("token_embeddings"))
            .ok_or_else(|| {
                Error::Inference(
                    "Output tensor 'last_hidden_state' or 'token_embeddings' not found".to_string(),
                )
            })?
            .try_extract_tensor::<f32>()?;

        if shape.len() != 3 || shape[0] != 1 {
            return Err(Error::Inference(format!(
                "Expected output shape (1, seq_len, hidden), got {:?}",
                shape
            )));
        }

        let hidden_dim = shape[2] as usize;
        let pooled = mean_pool(data, attention_mask, hidden_dim, seq_len);
        Ok(l2_normalize(&pooled))
    }
}

/// Average token vectors, weighting each by its attention mask value.
fn mean_pool(data: &[f32], attention_mask: &[u32], hidden_dim: usize, seq_len: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden_dim];

    for (token_idx, chunk) in data.chunks(hidden_dim).take(seq_len).enumerate() {
        let mask_value = attention_mask.get(token_idx).copied().unwrap_or(0) as f32;

        for (dim, pooled_value) in pooled.iter_mut().enumerate() {
            *pooled_value += chunk[dim] * mask_value;
        }
    }

    let mask_sum: f32 = attention_mask
        .iter()
        .take(seq_len)
        .map(|&m| m as f32)
        .sum::<f32>()
        .max(1e-9);

    for value in pooled.iter_mut() {
        *value /= mask_sum;
    }

    pooled
}

pub(crate) fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|&x| x * x).sum::<f32>().sqrt();
    let norm = norm.max(1e-9);

    vec.iter().map(|&x| x / norm).collect()
}
