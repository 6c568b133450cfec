use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;

use crate::error::{Error, Result};

/// Input and output weight matrices of a skip-gram model, flat and row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Embeddings {
    pub input: Vec<f32>,
    pub output: Vec<f32>,
    vocab_size: usize,
    embedding_dim: usize,
}

#[derive(Debug, Serialize)]
pub struct WordEmbedding<'a> {
    pub word: &'a str,
    pub embedding: &'a [f32],
}

impl Embeddings {
    /// Input rows are drawn from `U(-1, 1)`, output rows from
    /// `N(0, 1/sqrt(embedding_dim))` truncated at two standard deviations.
    pub fn new<R: Rng + ?Sized>(vocab_size: usize, embedding_dim: usize, rng: &mut R) -> Self {
        let uniform = Uniform::new(-1.0f32, 1.0);
        let std_dev = 1.0 / (embedding_dim.max(1) as f32).sqrt();
        let normal = Normal::new(0.0f32, std_dev).expect("std_dev is finite and positive");
        let len = vocab_size * embedding_dim;
        let input = (0..len).map(|_| uniform.sample(rng)).collect();
        let output = (0..len)
            .map(|_| truncated_sample(&normal, 2.0 * std_dev, rng))
            .collect();
        Self {
            input,
            output,
            vocab_size,
            embedding_dim,
        }
    }

    pub fn from_parts(input: Vec<f32>, output: Vec<f32>, embedding_dim: usize) -> Result<Self> {
        if embedding_dim == 0 {
            return Err(Error::Config("embedding_dim must be positive".into()));
        }
        if input.len() != output.len() || input.len() % embedding_dim != 0 {
            return Err(Error::Config(format!(
                "matrices of {} and {} values do not split into rows of {}",
                input.len(),
                output.len(),
                embedding_dim
            )));
        }
        let vocab_size = input.len() / embedding_dim;
        Ok(Self {
            input,
            output,
            vocab_size,
            embedding_dim,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn row(&self, id: u32) -> Option<&[f32]> {
        let start = id as usize * self.embedding_dim;
        self.input.get(start..start + self.embedding_dim)
    }

    /// Copy of the input matrix with every row scaled to unit length.
    pub fn normalized(&self) -> Vec<f32> {
        let mut normalized = self.input.clone();
        if self.embedding_dim == 0 {
            return normalized;
        }
        for row in normalized.chunks_mut(self.embedding_dim) {
            let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|x| *x /= norm);
            }
        }
        normalized
    }

    pub fn cosine_similarity(&self, a: u32, b: u32) -> Option<f32> {
        Some(cosine_similarity(self.row(a)?, self.row(b)?))
    }

    /// The `top_k` ids closest to `id`, most similar first.
    pub fn nearest(&self, id: u32, top_k: usize) -> Option<Vec<(u32, f32)>> {
        let target = self.row(id)?;

        let mut similarities: Vec<(u32, f32)> = (0..self.vocab_size as u32)
            .into_par_iter()
            .filter(|&other| other != id)
            .filter_map(|other| Some((other, cosine_similarity(target, self.row(other)?))))
            .collect();

        similarities.sort_by(|a, b| b.1.total_cmp(&a.1));
        similarities.truncate(top_k);
        Some(similarities)
    }

    /// Pairs every word with its row of `matrix` (e.g. the output of
    /// [`Embeddings::normalized`]).
    pub fn export<'a>(&self, words: &'a [String], matrix: &'a [f32]) -> Vec<WordEmbedding<'a>> {
        if self.embedding_dim == 0 {
            return Vec::new();
        }
        words
            .iter()
            .zip(matrix.chunks(self.embedding_dim))
            .map(|(word, embedding)| WordEmbedding {
                word: word.as_str(),
                embedding,
            })
            .collect()
    }
}

/// Redraws until the sample lands within `bound` of the mean.
fn truncated_sample<R: Rng + ?Sized>(normal: &Normal<f32>, bound: f32, rng: &mut R) -> f32 {
    loop {
        let value = normal.sample(rng);
        if value.abs() <= bound {
            return value;
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
