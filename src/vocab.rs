use std::cmp::Reverse;
use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{Error, Result, Tokenizer};

/// Bidirectional mapping between tokens and dense ids.
///
/// Id 0 is the most frequent token. Tokens with equal counts keep the order
/// in which they first appeared in the corpus.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    counts: Vec<u64>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from `(token, count)` pairs given in first-appearance
    /// order.
    fn from_counts(mut entries: Vec<(String, u64)>) -> Self {
        // stable, so ties stay in first-appearance order
        entries.sort_by_key(|&(_, count)| Reverse(count));

        let mut vocab = Vocabulary {
            words: Vec::with_capacity(entries.len()),
            counts: Vec::with_capacity(entries.len()),
            index: HashMap::with_capacity(entries.len()),
        };
        for (word, count) in entries {
            vocab.index.insert(word.clone(), vocab.words.len());
            vocab.words.push(word);
            vocab.counts.push(count);
        }
        vocab
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Exact match only, case-sensitive.
    pub fn id(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Panics if `id` is out of range.
    pub fn token(&self, id: usize) -> &str {
        &self.words[id]
    }

    /// Raw number of occurrences in the corpus. Panics if `id` is out of range.
    pub fn count(&self, id: usize) -> u64 {
        self.counts[id]
    }

    /// All tokens in id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }
}

/// A tokenized, filtered and subsampled corpus, ready for training.
#[derive(Debug, Clone)]
pub struct Corpus {
    vocab: Vocabulary,
    stream: Vec<usize>,
    retained: usize,
}

impl Corpus {
    /// Tokenize `text`, build the vocabulary, drop tokens seen `min_count`
    /// times or fewer, and subsample frequent tokens with threshold `sample`.
    ///
    /// An occurrence of `w` is dropped with probability
    /// `1 - sqrt(sample / f(w))`, where `f(w)` is the share of `w` among the
    /// tokens that passed the min-count filter. Rare words get a negative drop
    /// probability and are always kept. A `sample` of zero keeps everything.
    pub fn build<R>(
        text: &str,
        tokenizer: Tokenizer,
        min_count: u64,
        sample: f64,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let tokens: Vec<String> = tokenizer.tokenize(text).collect();
        if tokens.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let mut entries: Vec<(String, u64)> = vec![];
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for token in &tokens {
            match seen.get(token.as_str()) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    seen.insert(token, entries.len());
                    entries.push((token.clone(), 1));
                }
            }
        }
        let vocab = Vocabulary::from_counts(entries);

        let trimmed: Vec<usize> = tokens
            .iter()
            .filter_map(|token| vocab.id(token))
            .filter(|&id| vocab.count(id) > min_count)
            .collect();
        let retained = (0..vocab.len())
            .filter(|&id| vocab.count(id) > min_count)
            .count();
        info!(
            tokens = tokens.len(),
            vocab_size = vocab.len(),
            retained,
            trimmed = trimmed.len(),
            "built vocabulary"
        );

        let stream = if sample > 0.0 && !trimmed.is_empty() {
            let total = trimmed.len() as f64;
            let p_drop: Vec<f64> = (0..vocab.len())
                .map(|id| {
                    let freq = vocab.count(id) as f64 / total;
                    1.0 - (sample / freq).sqrt()
                })
                .collect();
            let kept: Vec<usize> = trimmed
                .iter()
                .copied()
                .filter(|&id| rng.gen::<f64>() >= p_drop[id])
                .collect();
            if kept.is_empty() {
                warn!(
                    sample,
                    "subsampling dropped every token; training on the unsampled stream"
                );
                trimmed
            } else {
                debug!(before = trimmed.len(), after = kept.len(), "subsampled");
                kept
            }
        } else {
            trimmed
        };

        Ok(Corpus {
            vocab,
            stream,
            retained,
        })
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Token ids in corpus order.
    pub fn stream(&self) -> &[usize] {
        &self.stream
    }

    /// Number of distinct tokens that passed the min-count filter.
    pub fn retained(&self) -> usize {
        self.retained
    }

    pub fn into_parts(self) -> (Vocabulary, Vec<usize>) {
        (self.vocab, self.stream)
    }
}
