use std::collections::BTreeSet;

use ndarray::prelude::*;
use rand::Rng;

use crate::NegativeSampler;

/// Training pairs derived from one slice of the token stream.
///
/// `centers[i]` and `contexts[i]` form the i-th positive pair and
/// `negatives.row(i)` holds its negative samples.
#[derive(Debug, Clone)]
pub struct Batch {
    centers: Vec<usize>,
    contexts: Vec<usize>,
    negatives: Array2<usize>,
}

impl Batch {
    /// Panics if the three parts disagree on the number of pairs.
    pub fn new(centers: Vec<usize>, contexts: Vec<usize>, negatives: Array2<usize>) -> Self {
        assert_eq!(centers.len(), contexts.len());
        assert_eq!(centers.len(), negatives.nrows());
        Batch {
            centers,
            contexts,
            negatives,
        }
    }

    /// Number of (center, context) pairs.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn centers(&self) -> &[usize] {
        &self.centers
    }

    pub fn contexts(&self) -> &[usize] {
        &self.contexts
    }

    /// One row of negative samples per pair.
    pub fn negatives(&self) -> ArrayView2<'_, usize> {
        self.negatives.view()
    }

    /// Iterate over `(center, context, negatives)`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, ArrayView1<'_, usize>)> + '_ {
        self.centers
            .iter()
            .zip(&self.contexts)
            .zip(self.negatives.rows())
            .map(|((&center, &context), negatives)| (center, context, negatives))
    }
}

/// Cuts a token stream into fixed-size batches of training pairs.
#[derive(Debug)]
pub struct Batcher<'a> {
    stream: &'a [usize],
    batch_size: usize,
    window_size: usize,
    sampler: &'a NegativeSampler,
}

impl<'a> Batcher<'a> {
    pub fn new(
        stream: &'a [usize],
        batch_size: usize,
        window_size: usize,
        sampler: &'a NegativeSampler,
    ) -> Self {
        assert!(batch_size > 0 && window_size > 0);
        Batcher {
            stream,
            batch_size,
            window_size,
            sampler,
        }
    }

    /// Number of full batches. A tail shorter than `batch_size` is dropped.
    pub fn num_batches(&self) -> usize {
        self.stream.len() / self.batch_size
    }

    /// The distinct ids within `radius` positions of `words[idx]`, not
    /// counting `idx` itself. Sorted by id.
    pub fn context(words: &[usize], idx: usize, radius: usize) -> Vec<usize> {
        let start = idx.saturating_sub(radius);
        let stop = (idx + radius + 1).min(words.len());
        words[start..idx]
            .iter()
            .chain(&words[idx + 1..stop])
            .copied()
            .collect::<BTreeSet<usize>>()
            .into_iter()
            .collect()
    }

    /// Build the batch from one slice of the stream. Each center gets a
    /// random radius in `1..=window_size`, and each pair gets `window_size`
    /// negative samples.
    pub fn make_batch<R>(&self, words: &[usize], rng: &mut R) -> Batch
    where
        R: Rng + ?Sized,
    {
        let mut centers = vec![];
        let mut contexts = vec![];
        for (idx, &center) in words.iter().enumerate() {
            let radius = rng.gen_range(1..=self.window_size);
            let targets = Self::context(words, idx, radius);
            centers.extend(std::iter::repeat(center).take(targets.len()));
            contexts.extend(targets);
        }

        let mut negatives = Array2::zeros((centers.len(), self.window_size));
        let rows = centers.iter().zip(&contexts).zip(negatives.rows_mut());
        for ((&center, &context), mut row) in rows {
            for slot in row.iter_mut() {
                *slot = self.sampler.sample(center, context, rng);
            }
        }
        Batch::new(centers, contexts, negatives)
    }

    /// All batches of one epoch, in stream order.
    pub fn batches<'r, R>(&'r self, rng: &'r mut R) -> impl Iterator<Item = Batch> + 'r
    where
        R: Rng + ?Sized,
    {
        let this: &'r Batcher<'r> = self;
        this.stream
            .chunks_exact(this.batch_size)
            .map(move |words| this.make_batch(words, rng))
    }
}
