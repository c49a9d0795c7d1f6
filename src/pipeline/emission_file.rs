use std::path::Path;

use serde::Deserialize;

use crate::alignment::tokenization::Vocabulary;
use crate::error::AlignmentError;
use crate::types::EmissionMatrix;

/// Emissions dumped by an external acoustic-model run.
#[derive(Debug, Clone, Deserialize)]
pub struct EmissionFile {
    pub log_probs: Vec<Vec<f32>>,
    #[serde(default)]
    pub sample_rate_hz: Option<u32>,
    #[serde(default)]
    pub num_samples: Option<u64>,
    /// Label of every emission column, when the producer recorded them.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl EmissionFile {
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read emission file", e))?;
        serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse emission file", e))
    }

    /// Fails when the recorded column labels disagree with `vocab`.
    pub fn check_labels(&self, vocab: &Vocabulary) -> Result<(), AlignmentError> {
        let Some(labels) = &self.labels else {
            return Ok(());
        };
        if labels.len() != vocab.len() {
            return Err(AlignmentError::invalid_input(format!(
                "emission file lists {} labels, vocabulary has {}",
                labels.len(),
                vocab.len()
            )));
        }
        if let Some((idx, (got, want))) = labels
            .iter()
            .zip(vocab.labels())
            .enumerate()
            .find(|(_, (got, want))| got != want)
        {
            return Err(AlignmentError::invalid_input(format!(
                "emission label {idx} is {got:?}, vocabulary has {want:?}"
            )));
        }
        Ok(())
    }

    pub fn into_matrix(self) -> Result<EmissionMatrix, AlignmentError> {
        EmissionMatrix::from_rows(self.log_probs)
    }
}
