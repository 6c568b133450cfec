use std::collections::HashMap;

use crate::error::{Error, Result};

/// Label of the catch-all entry that always owns id 0.
pub const UNKNOWN: &str = "UNK";

/// A bounded vocabulary together with the corpus it was built from, encoded
/// as ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// One id per input token, `0` for anything outside the vocabulary.
    pub encoded: Vec<u32>,
    /// `(token, count)` in id order, the unknown entry first.
    pub frequencies: Vec<(String, usize)>,
    pub vocab: HashMap<String, u32>,
    pub reverse_vocab: Vec<String>,
}

impl Dataset {
    /// Number of vocabulary entries, the unknown bucket included.
    pub fn vocab_len(&self) -> usize {
        self.reverse_vocab.len()
    }

    pub fn corpus_is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    pub fn id_of(&self, token: &str) -> u32 {
        self.vocab.get(token).copied().unwrap_or(0)
    }

    pub fn token_of(&self, id: u32) -> Option<&str> {
        self.reverse_vocab.get(id as usize).map(String::as_str)
    }

    pub fn decode(&self, ids: &[u32]) -> Vec<&str> {
        ids.iter()
            .map(|&id| self.token_of(id).unwrap_or(UNKNOWN))
            .collect()
    }
}

/// Counts every distinct token, keeping the order in which each was first seen.
fn count_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<(&str, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for token in tokens {
        let token = token.as_ref();
        match positions.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(token, counts.len());
                counts.push((token, 1));
            }
        }
    }
    counts
}

/// Keeps the `vocabulary_size - 1` most frequent tokens, assigns them ids
/// `1..` by descending count and encodes `tokens` against them.
///
/// Equal counts keep first-seen order. A literal `"UNK"` token is never given
/// its own id, it lands in the unknown bucket with every other miss.
pub fn build_vocabulary<S: AsRef<str>>(tokens: &[S], vocabulary_size: usize) -> Result<Dataset> {
    if vocabulary_size < 1 {
        return Err(Error::Config(format!(
            "vocabulary_size must be at least 1, got {vocabulary_size}"
        )));
    }

    let mut counts = count_tokens(tokens);
    counts.retain(|(token, _)| *token != UNKNOWN);
    // stable sort, ties stay in encounter order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(vocabulary_size - 1);

    let mut frequencies = Vec::with_capacity(counts.len() + 1);
    let mut reverse_vocab = Vec::with_capacity(counts.len() + 1);
    let mut vocab = HashMap::with_capacity(counts.len() + 1);

    frequencies.push((UNKNOWN.to_string(), 0));
    reverse_vocab.push(UNKNOWN.to_string());
    vocab.insert(UNKNOWN.to_string(), 0);
    for (token, count) in counts {
        vocab.insert(token.to_string(), reverse_vocab.len() as u32);
        reverse_vocab.push(token.to_string());
        frequencies.push((token.to_string(), count));
    }

    let mut unknown_count = 0;
    let encoded: Vec<u32> = tokens
        .iter()
        .map(|token| match vocab.get(token.as_ref()) {
            Some(&id) if id != 0 => id,
            _ => {
                unknown_count += 1;
                0
            }
        })
        .collect();
    frequencies[0].1 = unknown_count;

    tracing::debug!(
        tokens = encoded.len(),
        vocabulary = reverse_vocab.len(),
        unknown = unknown_count,
        "Built vocabulary"
    );

    Ok(Dataset {
        encoded,
        frequencies,
        vocab,
        reverse_vocab,
    })
}
