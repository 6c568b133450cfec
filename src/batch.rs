use rand::{seq::SliceRandom, Rng};

use crate::error::{Error, Result};

/// Fixed-capacity circular buffer. Once full, every push overwrites the
/// oldest element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingBuffer<T> {
    data: Vec<T>,
    head: usize,
    capacity: usize,
}

impl<T: Copy> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.is_full() {
            self.data[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        } else {
            self.data.push(value);
        }
    }

    /// Element at logical position `index`, 0 being the oldest.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.data.len() {
            return None;
        }
        Some(self.data[(self.head + index) % self.data.len()])
    }

    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipGramParams {
    batch_size: usize,
    /// How many labels are drawn for every center word.
    num_skips: usize,
    /// How many words to consider left and right of the center.
    skip_window: usize,
}

impl Default for SkipGramParams {
    fn default() -> Self {
        Self {
            batch_size: 128,
            num_skips: 2,
            skip_window: 1,
        }
    }
}

impl SkipGramParams {
    pub fn new(batch_size: usize, num_skips: usize, skip_window: usize) -> Self {
        Self {
            batch_size,
            num_skips,
            skip_window,
        }
    }
    pub fn set_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
    pub fn set_num_skips(mut self, num_skips: usize) -> Self {
        self.num_skips = num_skips;
        self
    }
    pub fn set_skip_window(mut self, skip_window: usize) -> Self {
        self.skip_window = skip_window;
        self
    }
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
    pub fn num_skips(&self) -> usize {
        self.num_skips
    }
    pub fn skip_window(&self) -> usize {
        self.skip_window
    }
    /// Window length, `[ skip_window center skip_window ]`.
    pub fn span(&self) -> Result<usize> {
        self.skip_window
            .checked_mul(2)
            .and_then(|w| w.checked_add(1))
            .ok_or_else(|| {
                Error::Config(format!("skip_window {} is too large", self.skip_window))
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.num_skips == 0 || self.skip_window == 0 {
            return Err(Error::Config(format!(
                "batch_size, num_skips and skip_window must be positive, got {}, {}, {}",
                self.batch_size, self.num_skips, self.skip_window
            )));
        }
        if self.batch_size % self.num_skips != 0 {
            return Err(Error::Config(format!(
                "batch_size {} is not a multiple of num_skips {}",
                self.batch_size, self.num_skips
            )));
        }
        let context = self.span()? - 1;
        if self.num_skips > context {
            return Err(Error::Config(format!(
                "num_skips {} exceeds the {} context positions of skip_window {}",
                self.num_skips, context, self.skip_window
            )));
        }
        Ok(())
    }
}

/// Where a stream of batches currently stands in the corpus. Each
/// independent stream owns its own state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchState {
    cursor: usize,
    window: Option<RingBuffer<u32>>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(cursor: usize) -> Self {
        Self {
            cursor,
            window: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn window(&self) -> Option<&RingBuffer<u32>> {
        self.window.as_ref()
    }

    fn next_id(&mut self, corpus: &[u32]) -> u32 {
        let id = corpus[self.cursor % corpus.len()];
        self.cursor = (self.cursor + 1) % corpus.len();
        id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub inputs: Vec<u32>,
    pub labels: Vec<u32>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.inputs.iter().copied().zip(self.labels.iter().copied())
    }
}

/// Picks `amount` distinct entries of `candidates` with a partial shuffle.
pub fn select_context_positions<'a, R: Rng + ?Sized>(
    candidates: &'a mut [usize],
    amount: usize,
    rng: &mut R,
) -> Result<&'a [usize]> {
    if candidates.len() < amount {
        return Err(Error::Exhausted {
            available: candidates.len(),
            required: amount,
        });
    }
    let (chosen, _) = candidates.partial_shuffle(rng, amount);
    Ok(chosen)
}

/// Produces `batch_size` `(center, context)` pairs, sliding the window of
/// `state` one word forward after every `num_skips` pairs.
///
/// The corpus is read cyclically. Parameters are validated before `state` is
/// touched, so a failed call leaves it as it was.
pub fn generate_batch<R: Rng + ?Sized>(
    corpus: &[u32],
    params: &SkipGramParams,
    state: &mut BatchState,
    rng: &mut R,
) -> Result<Batch> {
    params.validate()?;
    if corpus.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    let span = params.span()?;
    let center = params.skip_window;
    let num_skips = params.num_skips;
    let mut candidates: Vec<usize> = (0..span).filter(|&p| p != center).collect();
    if candidates.len() < num_skips {
        return Err(Error::Exhausted {
            available: candidates.len(),
            required: num_skips,
        });
    }

    let mut window = match state.window.take() {
        Some(window) if window.capacity() == span && window.is_full() => window,
        _ => {
            let mut window = RingBuffer::new(span);
            for _ in 0..span {
                window.push(state.next_id(corpus));
            }
            tracing::debug!(cursor = state.cursor, window = ?window.to_vec(), "Filled window");
            window
        }
    };

    let mut inputs = Vec::with_capacity(params.batch_size);
    let mut labels = Vec::with_capacity(params.batch_size);
    for _ in 0..params.batch_size / num_skips {
        // the window is full, positions below span always resolve
        let center_id = window.get(center).unwrap_or_default();
        for &position in select_context_positions(&mut candidates, num_skips, rng)? {
            inputs.push(center_id);
            labels.push(window.get(position).unwrap_or_default());
        }
        window.push(state.next_id(corpus));
    }
    state.window = Some(window);

    Ok(Batch { inputs, labels })
}

/// Owns everything one stream of batches needs.
pub struct SkipGramBatcher<'a, R> {
    corpus: &'a [u32],
    params: SkipGramParams,
    state: BatchState,
    rng: R,
}

impl<'a, R: Rng> SkipGramBatcher<'a, R> {
    pub fn new(corpus: &'a [u32], params: SkipGramParams, rng: R) -> Result<Self> {
        params.validate()?;
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        Ok(Self {
            corpus,
            params,
            state: BatchState::new(),
            rng,
        })
    }

    pub fn params(&self) -> &SkipGramParams {
        &self.params
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn next_batch(&mut self) -> Result<Batch> {
        generate_batch(self.corpus, &self.params, &mut self.state, &mut self.rng)
    }
}
