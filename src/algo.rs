use rand::{seq::SliceRandom, Rng};
use std::ops::Neg;

use crate::{
    batch::{generate_batch, Batch, BatchState, SkipGramParams},
    error::{Error, Result},
    model::Embeddings,
    vocab::Dataset,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainParams {
    embedding_size: usize,
    /// Negative examples drawn per (center, label) pair.
    num_sampled: usize,
    learning_rate: f32,
    steps: usize,
    log_every: usize,
    valid_every: usize,
    valid_size: usize,
    /// Validation words come from the ids below this bound, the most frequent ones.
    valid_window: usize,
    top_k: usize,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            embedding_size: 128,
            num_sampled: 64,
            learning_rate: 0.025,
            steps: 100_001,
            log_every: 2000,
            valid_every: 10_000,
            valid_size: 16,
            valid_window: 100,
            top_k: 8,
        }
    }
}

impl TrainParams {
    pub fn set_embedding_size(mut self, embedding_size: usize) -> Self {
        self.embedding_size = embedding_size;
        self
    }
    pub fn set_num_sampled(mut self, num_sampled: usize) -> Self {
        self.num_sampled = num_sampled;
        self
    }
    pub fn set_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }
    pub fn set_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }
    pub fn set_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }
    pub fn set_valid_every(mut self, valid_every: usize) -> Self {
        self.valid_every = valid_every;
        self
    }
    pub fn set_valid_size(mut self, valid_size: usize) -> Self {
        self.valid_size = valid_size;
        self
    }
    pub fn set_valid_window(mut self, valid_window: usize) -> Self {
        self.valid_window = valid_window;
        self
    }
    pub fn set_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }
    pub fn num_sampled(&self) -> usize {
        self.num_sampled
    }
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_size == 0 {
            return Err(Error::Config("embedding_size must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::Config(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if self.log_every == 0 {
            return Err(Error::Config("log_every must be positive".into()));
        }
        Ok(())
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + x.neg().exp())
}

/// One negative-sampling SGD update for a single `(center, label)` pair.
/// Returns the pair's loss. Both ids must be rows of `embeddings`.
fn pass<R: Rng + ?Sized>(
    center: u32,
    label: u32,
    params: &TrainParams,
    embeddings: &mut Embeddings,
    neu1e: &mut [f32],
    rng: &mut R,
    vocab_indices: &[u32],
) -> f32 {
    let dim = embeddings.embedding_dim();
    let vocab_size = embeddings.vocab_size();
    let center_l1 = center as usize * dim;
    let hidden = &embeddings.input[center_l1..center_l1 + dim];
    let output = &mut embeddings.output;

    // positive sampling
    let label_l2 = label as usize * dim;
    let f = hidden
        .iter()
        .enumerate()
        .map(|(i, v)| v * output[i + label_l2])
        .sum::<f32>();

    let sig = sigmoid(f);
    let mut loss = -sig.max(f32::MIN_POSITIVE).ln();
    let g = (1.0 - sig) * params.learning_rate;

    for c in 0..dim {
        neu1e[c] = g * output[c + label_l2];
        output[c + label_l2] += g * hidden[c];
    }

    let negative_samples = vocab_indices
        .choose_multiple(rng, params.num_sampled + 1)
        .filter(|&&word_idx| word_idx != label && (word_idx as usize) < vocab_size)
        .take(params.num_sampled);

    for &negative_target in negative_samples {
        let l2 = negative_target as usize * dim;
        let f: f32 = hidden
            .iter()
            .enumerate()
            .map(|(i, v)| v * output[i + l2])
            .sum();

        let sig = sigmoid(f);
        loss += -(1.0 - sig).max(f32::MIN_POSITIVE).ln();
        let g = (0.0 - sig) * params.learning_rate;

        for c in 0..dim {
            neu1e[c] += g * output[c + l2];
            output[c + l2] += g * hidden[c];
        }
    }

    // backpropagation into the center word
    for (k, v) in neu1e.iter().enumerate() {
        embeddings.input[k + center_l1] += v;
    }
    loss
}

/// Runs [`pass`] over every pair of `batch` and returns the mean loss.
///
/// Fails before touching `embeddings` if `params` was set up for another
/// embedding size or if the batch holds an id outside the vocabulary.
pub fn train_step<R: Rng + ?Sized>(
    embeddings: &mut Embeddings,
    batch: &Batch,
    params: &TrainParams,
    vocab_indices: &[u32],
    rng: &mut R,
) -> Result<f32> {
    if params.embedding_size != embeddings.embedding_dim() {
        return Err(Error::Config(format!(
            "embedding_size {} does not match embeddings of dimension {}",
            params.embedding_size,
            embeddings.embedding_dim()
        )));
    }
    let vocab_size = embeddings.vocab_size();
    if let Some(id) = batch
        .inputs
        .iter()
        .chain(batch.labels.iter())
        .find(|&&id| id as usize >= vocab_size)
    {
        return Err(Error::Config(format!(
            "id {id} is outside a vocabulary of {vocab_size}"
        )));
    }
    if batch.is_empty() {
        return Ok(0.0);
    }
    let mut neu1e = vec![0.0; embeddings.embedding_dim()];
    let total: f32 = batch
        .pairs()
        .map(|(center, label)| {
            pass(
                center,
                label,
                params,
                embeddings,
                &mut neu1e,
                rng,
                vocab_indices,
            )
        })
        .sum();
    Ok(total / batch.len() as f32)
}

fn log_nearest(dataset: &Dataset, embeddings: &Embeddings, valid_examples: &[u32], top_k: usize) {
    for &valid in valid_examples {
        let Some(nearest) = embeddings.nearest(valid, top_k) else {
            continue;
        };
        let words: Vec<&str> = nearest
            .iter()
            .filter_map(|(id, _)| dataset.token_of(*id))
            .collect();
        tracing::info!(
            "Nearest to {}: {}",
            dataset.token_of(valid).unwrap_or_default(),
            words.join(", ")
        );
    }
}

/// Trains skip-gram embeddings over `dataset`, pulling a fresh batch for
/// every step.
pub fn train<R: Rng>(
    dataset: &Dataset,
    batch_params: &SkipGramParams,
    params: &TrainParams,
    rng: &mut R,
) -> Result<Embeddings> {
    batch_params.validate()?;
    params.validate()?;
    if dataset.corpus_is_empty() {
        return Err(Error::EmptyCorpus);
    }

    let mut embeddings = Embeddings::new(dataset.vocab_len(), params.embedding_size, rng);
    let vocab_indices: Vec<u32> = (0..dataset.vocab_len() as u32).collect();
    let valid_range = params.valid_window.min(dataset.vocab_len());
    let valid_examples: Vec<u32> =
        rand::seq::index::sample(rng, valid_range, params.valid_size.min(valid_range))
            .into_iter()
            .map(|i| i as u32)
            .collect();

    let mut state = BatchState::new();
    let mut average_loss = 0.0;
    for step in 0..params.steps {
        let batch = generate_batch(&dataset.encoded, batch_params, &mut state, rng)?;
        average_loss += train_step(&mut embeddings, &batch, params, &vocab_indices, rng)?;

        if step % params.log_every == 0 {
            if step > 0 {
                average_loss /= params.log_every as f32;
            }
            // estimate over the last `log_every` batches
            tracing::info!(step = step, average_loss = average_loss, "Training step");
            average_loss = 0.0;
        }
        if params.valid_every > 0 && step % params.valid_every == 0 {
            log_nearest(dataset, &embeddings, &valid_examples, params.top_k);
        }
    }

    Ok(embeddings)
}
