use rand::Rng;

use crate::NegativeSampling;

/// Draws negative samples uniformly over positions of a token stream, so each
/// id is drawn in proportion to how often it occurs there.
///
/// The stream is kept counting-sorted by id: `table[offsets[k]..offsets[k + 1]]`
/// holds every occurrence of id `k`. Excluding an id then just means skipping
/// one contiguous range, with no retry loop.
#[derive(Debug, Clone)]
pub struct NegativeSampler {
    table: Vec<usize>,
    offsets: Vec<usize>,
    mode: NegativeSampling,
}

impl NegativeSampler {
    /// Panics if `stream` contains an id `>= vocab_size`.
    pub fn new(stream: &[usize], vocab_size: usize, mode: NegativeSampling) -> Self {
        let mut offsets = vec![0usize; vocab_size + 1];
        for &id in stream {
            offsets[id + 1] += 1;
        }
        for k in 0..vocab_size {
            offsets[k + 1] += offsets[k];
        }

        let mut table = Vec::with_capacity(stream.len());
        for (id, w) in offsets.windows(2).enumerate() {
            table.extend(std::iter::repeat(id).take(w[1] - w[0]));
        }

        NegativeSampler {
            table,
            offsets,
            mode,
        }
    }

    /// Number of times `id` occurs in the stream.
    pub fn occurrences(&self, id: usize) -> usize {
        self.offsets[id + 1] - self.offsets[id]
    }

    /// Draw one negative sample for the pair `(center, context)`.
    ///
    /// In [`NegativeSampling::ExcludePositives`] mode the result is neither
    /// `center` nor `context`, unless the stream holds no other id.
    pub fn sample<R>(&self, center: usize, context: usize, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let n = self.table.len();
        if self.mode == NegativeSampling::Stream {
            return self.table[rng.gen_range(0..n)];
        }

        let mut excluded = [self.range(center), self.range(context)];
        if center == context {
            excluded[1] = (0, 0);
        }
        excluded.sort_unstable();
        let skipped: usize = excluded.iter().map(|&(start, end)| end - start).sum();
        if skipped == n {
            return self.table[rng.gen_range(0..n)];
        }

        let mut i = rng.gen_range(0..n - skipped);
        for (start, end) in excluded {
            if i >= start {
                i += end - start;
            }
        }
        self.table[i]
    }

    fn range(&self, id: usize) -> (usize, usize) {
        (self.offsets[id], self.offsets[id + 1])
    }
}
