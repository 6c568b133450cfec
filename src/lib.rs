//! Skip-gram word2vec training pieces: a bounded vocabulary, a sliding-window
//! batch generator and a small negative-sampling trainer.
//!
//! ```no_run
//! use rand::{rngs::StdRng, SeedableRng};
//! use skipgram::{build_vocabulary, read_words, SkipGramBatcher, SkipGramParams};
//!
//! let words = read_words("text8").unwrap();
//! let dataset = build_vocabulary(&words, 50_000).unwrap();
//! let mut batcher = SkipGramBatcher::new(
//!     &dataset.encoded,
//!     SkipGramParams::default(),
//!     StdRng::seed_from_u64(0),
//! )
//! .unwrap();
//! let batch = batcher.next_batch().unwrap();
//! assert_eq!(batch.len(), 128);
//! ```

pub mod algo;
pub mod batch;
pub mod corpus;
pub mod error;
pub mod model;
pub mod vocab;

pub use algo::{train, train_step, TrainParams};
pub use batch::{generate_batch, Batch, BatchState, RingBuffer, SkipGramBatcher, SkipGramParams};
pub use corpus::{clean_words, read_text, read_words, split_words};
pub use error::{Error, Result};
pub use model::{Embeddings, WordEmbedding};
pub use vocab::{build_vocabulary, Dataset, UNKNOWN};
