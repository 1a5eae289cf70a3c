// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text line recognition with CTC greedy decoding

use anyhow::{Context, Result};
use image::RgbImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::preprocessing::preprocess_for_recognition;
use crate::vision::providers::lock_session;

/// Recognition model for one language
#[derive(Clone)]
pub struct LineRecognizer {
    session: Arc<Mutex<Session>>,
    input_name: String,
    /// Index 0 is the CTC blank
    dictionary: Arc<Vec<char>>,
}

impl std::fmt::Debug for LineRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineRecognizer")
            .field("input_name", &self.input_name)
            .field("dictionary_size", &self.dictionary.len())
            .finish_non_exhaustive()
    }
}

impl LineRecognizer {
    pub fn new<P: AsRef<Path>>(model_path: P, dict_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();
        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }

        let dictionary = load_dictionary(dict_path)?;

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load OCR recognition model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            dictionary: Arc::new(dictionary),
        })
    }

    pub fn dictionary_size(&self) -> usize {
        self.dictionary.len()
    }

    /// Read a single line crop
    pub fn recognize(&self, crop: &RgbImage) -> Result<String> {
        let input = preprocess_for_recognition(crop);

        let mut session = lock_session(&self.session, "OCR recognition");
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("OCR recognition inference failed")?;
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract recognition output")?;

        let shape = output.shape().to_vec();
        let (seq_len, num_classes) = match shape.as_slice() {
            [1, t, c] | [t, c] => (*t, *c),
            _ => anyhow::bail!("Unexpected recognition output shape: {:?}", shape),
        };
        let probs: Vec<f32> = output.iter().copied().collect();

        let text = ctc_greedy_decode(&probs, seq_len, num_classes, &self.dictionary);
        debug!("Recognized line ({} steps): {:?}", seq_len, text);
        Ok(text)
    }
}

/// One character per line; blank prepended, space appended
pub fn load_dictionary(path: &Path) -> Result<Vec<char>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;

    let mut dictionary = vec!['\0'];
    dictionary.extend(content.lines().filter_map(|l| l.chars().next()));
    if dictionary.len() == 1 {
        anyhow::bail!("Dictionary {} is empty", path.display());
    }
    dictionary.push(' ');
    Ok(dictionary)
}

/// Argmax per timestep, collapse repeats, drop blanks
pub fn ctc_greedy_decode(
    probs: &[f32],
    seq_len: usize,
    num_classes: usize,
    dictionary: &[char],
) -> String {
    let mut text = String::new();
    let mut prev: Option<usize> = None;

    for t in 0..seq_len {
        let row = &probs[t * num_classes..(t + 1) * num_classes];
        let best = row
            .iter()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |acc, (i, &p)| {
                if p > acc.1 {
                    (i, p)
                } else {
                    acc
                }
            })
            .0;

        if best != 0 && Some(best) != prev {
            if let Some(&ch) = dictionary.get(best) {
                text.push(ch);
            }
        }
        prev = Some(best);
    }
    text
}
