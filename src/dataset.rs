//! Evaluation dataset: feature matrix plus one-hot labels.
//!
//! The dataset is an external collaborator injected into the fitness
//! evaluator at construction. Feature and class dimensions are plain
//! configuration; nothing in the engine assumes the 784/10 shape of the
//! reference use case.

use crate::error::EvolutionError;
use ndarray::{Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const IDX_IMAGES_MAGIC: u32 = 0x0000_0803;
const IDX_LABELS_MAGIC: u32 = 0x0000_0801;

/// A fixed evaluation set: features of shape (N, D) with values in [0, 1]
/// and one-hot labels of shape (N, C).
#[derive(Clone, Debug)]
pub struct Dataset {
    features: Array2<f32>,
    labels: Array2<f32>,
}

impl Dataset {
    /// Wrap feature and label matrices, checking their shapes agree.
    pub fn new(features: Array2<f32>, labels: Array2<f32>) -> Result<Self, EvolutionError> {
        if features.nrows() == 0 {
            return Err(EvolutionError::InvalidFormat(
                "dataset must contain at least one example".to_string(),
            ));
        }
        if features.nrows() != labels.nrows() {
            return Err(EvolutionError::InvalidFormat(format!(
                "feature rows ({}) and label rows ({}) differ",
                features.nrows(),
                labels.nrows()
            )));
        }
        if features.ncols() == 0 || labels.ncols() == 0 {
            return Err(EvolutionError::InvalidFormat(
                "feature and class dimensions must be nonzero".to_string(),
            ));
        }
        Ok(Self { features, labels })
    }

    /// Number of examples.
    #[inline]
    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.nrows() == 0
    }

    /// Feature dimension D.
    #[inline]
    pub fn feature_dim(&self) -> usize {
        self.features.ncols()
    }

    /// Class count C.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.labels.ncols()
    }

    /// Feature row for example `index`.
    #[inline]
    pub fn features_of(&self, index: usize) -> ArrayView1<'_, f32> {
        self.features.row(index)
    }

    /// One-hot label row for example `index`.
    #[inline]
    pub fn label_of(&self, index: usize) -> ArrayView1<'_, f32> {
        self.labels.row(index)
    }

    /// Deterministic synthetic classification data for demos and tests.
    ///
    /// Each class lights up its own block of features (with noise), so a
    /// binary connectivity mask can separate the classes.
    pub fn synthetic(
        n_examples: usize,
        n_features: usize,
        n_classes: usize,
        seed: u64,
    ) -> Result<Self, EvolutionError> {
        if n_features < n_classes {
            return Err(EvolutionError::InvalidFormat(format!(
                "need at least one feature per class ({} features, {} classes)",
                n_features, n_classes
            )));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let block = n_features / n_classes;

        let mut features = Array2::zeros((n_examples, n_features));
        let mut labels = Array2::zeros((n_examples, n_classes));
        for i in 0..n_examples {
            let class = i % n_classes;
            for j in 0..n_features {
                let in_block = j / block.max(1) == class;
                let base: f32 = if in_block { 0.85 } else { 0.1 };
                let noise: f32 = rng.gen_range(0.0..0.1);
                features[[i, j]] = (base + noise).min(1.0);
            }
            labels[[i, class]] = 1.0;
        }
        Self::new(features, labels)
    }

    /// Load an IDX image/label file pair (the MNIST distribution format).
    ///
    /// Pixels are normalized to [0, 1]; labels are one-hot encoded into
    /// `n_classes` columns.
    pub fn from_idx_files<P: AsRef<Path>>(
        images_path: P,
        labels_path: P,
        n_classes: usize,
    ) -> Result<Self, EvolutionError> {
        let images = read_file(images_path)?;
        let labels = read_file(labels_path)?;

        if read_u32_be(&images, 0)? != IDX_IMAGES_MAGIC {
            return Err(EvolutionError::InvalidFormat(
                "bad magic in IDX image file".to_string(),
            ));
        }
        if read_u32_be(&labels, 0)? != IDX_LABELS_MAGIC {
            return Err(EvolutionError::InvalidFormat(
                "bad magic in IDX label file".to_string(),
            ));
        }

        let n = read_u32_be(&images, 4)? as usize;
        let rows = read_u32_be(&images, 8)? as usize;
        let cols = read_u32_be(&images, 12)? as usize;
        let n_labels = read_u32_be(&labels, 4)? as usize;
        if n != n_labels {
            return Err(EvolutionError::InvalidFormat(format!(
                "image count ({}) and label count ({}) differ",
                n, n_labels
            )));
        }

        // header dimensions are untrusted; overflow means a forged file
        let pixels = rows.checked_mul(cols).ok_or_else(|| {
            EvolutionError::InvalidFormat("IDX image dimensions overflow".to_string())
        })?;
        let expected = n.checked_mul(pixels).ok_or_else(|| {
            EvolutionError::InvalidFormat("IDX image dimensions overflow".to_string())
        })?;
        let image_data = &images[16..];
        let label_data = &labels[8..];
        if image_data.len() < expected || label_data.len() < n {
            return Err(EvolutionError::InvalidFormat(
                "IDX file truncated".to_string(),
            ));
        }

        let mut features = Array2::zeros((n, pixels));
        let mut one_hot = Array2::zeros((n, n_classes));
        for i in 0..n {
            for j in 0..pixels {
                features[[i, j]] = image_data[i * pixels + j] as f32 / 255.0;
            }
            let class = label_data[i] as usize;
            if class >= n_classes {
                return Err(EvolutionError::InvalidFormat(format!(
                    "label {} out of range for {} classes",
                    class, n_classes
                )));
            }
            one_hot[[i, class]] = 1.0;
        }
        Self::new(features, one_hot)
    }
}

fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, EvolutionError> {
    let mut buf = Vec::new();
    File::open(path)?.read_to_end(&mut buf)?;
    Ok(buf)
}

fn read_u32_be(buf: &[u8], offset: usize) -> Result<u32, EvolutionError> {
    let bytes: [u8; 4] = buf
        .get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| EvolutionError::InvalidFormat("IDX header truncated".to_string()))?;
    Ok(u32::from_be_bytes(bytes))
}
