//! Sentence embeddings from an ONNX SentenceTransformers model.
//!
//! Expects `model.onnx` and `tokenizer.json` in one directory. With the
//! `load-dynamic` ort feature, `ORT_DYLIB_PATH` must point to the
//! onnxruntime shared library.

use std::path::Path;

use ndarray::Array1;
use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use tokenizers::Tokenizer;

use crate::error::{Error, Result};

use super::embed::{l2_normalize, Embedder, Embedding};

/// Maximum sequence length fed to the model.
const MAX_SEQ_LEN: usize = 512;

/// ONNX sentence embedder with mean pooling.
pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxEmbedder {
    /// Load the model and tokenizer from `model_dir`.
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(Error::Embedding(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(Error::Embedding(format!(
                "Tokenizer not found: {}",
                tokenizer_path.display()
            )));
        }

        ort::init().commit();

        let session = Session::builder()
            .map_err(|e| Error::Embedding(format!("Failed to create session builder: {}", e)))?
            .with_intra_threads(2)
            .map_err(|e| Error::Embedding(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::Embedding(format!("Failed to load ONNX model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::Embedding(format!("Failed to load tokenizer: {}", e)))?;

        log::info!("ONNX embedder loaded from {}", model_path.display());

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl Embedder for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx"
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::Embedding(format!("Tokenization failed: {}", e)))?;

        let batch = encodings.len();
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len().min(MAX_SEQ_LEN))
            .max()
            .unwrap_or(0)
            .max(1);

        // Right-pad every sequence to the longest one in the batch
        let mut ids = vec![0i64; batch * seq_len];
        let mut mask = vec![0i64; batch * seq_len];
        for (row, encoding) in encodings.iter().enumerate() {
            let len = encoding.get_ids().len().min(seq_len);
            let offset = row * seq_len;
            for i in 0..len {
                ids[offset + i] = encoding.get_ids()[i] as i64;
                mask[offset + i] = encoding.get_attention_mask()[i] as i64;
            }
        }
        let type_ids = vec![0i64; batch * seq_len];

        let ids_tensor = Tensor::from_array(([batch, seq_len], ids))
            .map_err(|e| Error::Embedding(format!("Failed to create ids tensor: {}", e)))?;
        let mask_tensor = Tensor::from_array(([batch, seq_len], mask.clone()))
            .map_err(|e| Error::Embedding(format!("Failed to create mask tensor: {}", e)))?;
        let type_tensor = Tensor::from_array(([batch, seq_len], type_ids))
            .map_err(|e| Error::Embedding(format!("Failed to create type_ids tensor: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
            .map_err(|e| Error::Embedding(format!("ONNX inference failed: {}", e)))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Embedding(format!("Failed to extract output tensor: {}", e)))?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();

        let mut embeddings = Vec::with_capacity(batch);
        match dims.as_slice() {
            // Token embeddings [batch, seq, dim]: mean pooling under the mask
            [b, s, dim] if *b == batch && *s == seq_len => {
                for row in 0..batch {
                    let mut pooled = Array1::<f32>::zeros(*dim);
                    let mut count = 0.0f32;
                    for t in 0..seq_len {
                        if mask[row * seq_len + t] == 0 {
                            continue;
                        }
                        let offset = (row * seq_len + t) * dim;
                        for d in 0..*dim {
                            pooled[d] += data[offset + d];
                        }
                        count += 1.0;
                    }
                    if count > 0.0 {
                        pooled /= count;
                    }
                    l2_normalize(&mut pooled);
                    embeddings.push(pooled);
                }
            }
            // Already pooled [batch, dim]
            [b, dim] if *b == batch => {
                for row in 0..batch {
                    let mut v = Array1::from_vec(data[row * dim..(row + 1) * dim].to_vec());
                    l2_normalize(&mut v);
                    embeddings.push(v);
                }
            }
            other => {
                return Err(Error::Embedding(format!(
                    "Unexpected output shape: {:?}",
                    other
                )))
            }
        }

        Ok(embeddings)
    }
}
