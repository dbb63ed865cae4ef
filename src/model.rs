use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::prelude::*;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::loss::NegativeSamplingLoss;
use crate::{Batch, Error, Result, Vocabulary};

/// Skip-gram model with two embedding tables.
///
/// Row `k` of each table belongs to the word with id `k`. The input table
/// holds the word vectors we are after; the output table is only used to
/// score (center, context) pairs during training.
#[derive(Debug, Clone)]
pub struct SkipGram {
    input: Array2<f32>,
    output: Array2<f32>,
    loss: NegativeSamplingLoss,
}

/// Sparse gradients of the loss for one batch. Only rows that the batch
/// touched are present; a row used several times holds the sum.
#[derive(Debug, Clone, Default)]
pub struct Gradients {
    input: BTreeMap<usize, Array1<f32>>,
    output: BTreeMap<usize, Array1<f32>>,
}

impl Gradients {
    fn row(rows: &mut BTreeMap<usize, Array1<f32>>, dim: usize, id: usize) -> &mut Array1<f32> {
        rows.entry(id).or_insert_with(|| Array1::zeros(dim))
    }

    /// ∂L/∂input[id], or `None` if the batch did not use that row.
    pub fn input_row(&self, id: usize) -> Option<ArrayView1<'_, f32>> {
        self.input.get(&id).map(|g| g.view())
    }

    /// ∂L/∂output[id], or `None` if the batch did not use that row.
    pub fn output_row(&self, id: usize) -> Option<ArrayView1<'_, f32>> {
        self.output.get(&id).map(|g| g.view())
    }
}

impl SkipGram {
    /// Input weights are drawn uniformly from `[-0.5/dim, 0.5/dim]`; output
    /// weights start at zero.
    pub fn new<R>(vocab_size: usize, dim: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let range = 0.5 / dim as f32;
        SkipGram {
            input: Array::random_using(
                (vocab_size, dim),
                Uniform::new_inclusive(-range, range),
                rng,
            ),
            output: Array::zeros((vocab_size, dim)),
            loss: NegativeSamplingLoss,
        }
    }

    /// Build a model from existing tables, which must have the same shape.
    pub fn from_tables(input: Array2<f32>, output: Array2<f32>) -> Result<Self> {
        if input.raw_dim() != output.raw_dim() {
            return Err(Error::InvalidConfiguration(format!(
                "embedding tables differ in shape: {:?} vs {:?}",
                input.shape(),
                output.shape()
            )));
        }
        Ok(SkipGram {
            input,
            output,
            loss: NegativeSamplingLoss,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.input.nrows()
    }

    /// Embedding vector length.
    pub fn dim(&self) -> usize {
        self.input.ncols()
    }

    pub fn input(&self) -> ArrayView2<'_, f32> {
        self.input.view()
    }

    pub fn input_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.input.view_mut()
    }

    pub fn output(&self) -> ArrayView2<'_, f32> {
        self.output.view()
    }

    pub fn output_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.output.view_mut()
    }

    /// The learned vector for a word. Panics if `id` is out of range.
    pub fn embedding(&self, id: usize) -> ArrayView1<'_, f32> {
        self.input.row(id)
    }

    /// Scores of one pair: center·context and center·negative for each negative.
    fn scores(
        &self,
        center: usize,
        context: usize,
        negatives: ArrayView1<'_, usize>,
    ) -> (f32, Array1<f32>) {
        let u = self.input.row(center);
        let positive = u.dot(&self.output.row(context));
        let negative = negatives.mapv(|n| u.dot(&self.output.row(n)));
        (positive, negative)
    }

    /// Total loss of a batch, summed over all pairs.
    pub fn forward(&self, batch: &Batch) -> f32 {
        batch
            .pairs()
            .map(|(center, context, negatives)| {
                let (positive, negative) = self.scores(center, context, negatives);
                self.loss.loss(positive, negative.view())
            })
            .sum()
    }

    /// Total loss of a batch and its gradient with respect to every
    /// embedding row the batch uses.
    pub fn backward(&self, batch: &Batch) -> (f32, Gradients) {
        let dim = self.dim();
        let mut grads = Gradients::default();
        let mut total = 0.0;
        for (center, context, negatives) in batch.pairs() {
            let (positive, negative) = self.scores(center, context, negatives);
            total += self.loss.loss(positive, negative.view());
            let (dpos, dneg) = self.loss.deriv(positive, negative.view());

            let u = self.input.row(center);
            let mut du = Array1::<f32>::zeros(dim);

            du.scaled_add(dpos, &self.output.row(context));
            Gradients::row(&mut grads.output, dim, context).scaled_add(dpos, &u);

            for (&n, &d) in negatives.iter().zip(dneg.iter()) {
                du.scaled_add(d, &self.output.row(n));
                Gradients::row(&mut grads.output, dim, n).scaled_add(d, &u);
            }
            *Gradients::row(&mut grads.input, dim, center) += &du;
        }
        (total, grads)
    }

    /// Take one gradient-descent step.
    pub fn apply(&mut self, grads: &Gradients, learning_rate: f32) {
        for (&id, g) in &grads.input {
            self.input.row_mut(id).scaled_add(-learning_rate, g);
        }
        for (&id, g) in &grads.output {
            self.output.row_mut(id).scaled_add(-learning_rate, g);
        }
    }

    /// Compute the loss of `batch`, then update the weights. Returns the loss
    /// before the update.
    pub fn train_batch(&mut self, batch: &Batch, learning_rate: f32) -> f32 {
        let (loss, grads) = self.backward(batch);
        self.apply(&grads, learning_rate);
        loss
    }

    /// Write the input embeddings as text, one line per word in id order:
    /// the word, a space, then the vector components separated by spaces.
    /// Fails without writing anything if `vocab` has a different size.
    pub fn save<W: Write>(&self, vocab: &Vocabulary, out: &mut W) -> Result<()> {
        if vocab.len() != self.vocab_size() {
            return Err(Error::InvalidConfiguration(format!(
                "vocabulary has {} words but the model has {} rows",
                vocab.len(),
                self.vocab_size()
            )));
        }
        for (word, row) in vocab.iter().zip(self.input.rows()) {
            write!(out, "{word}")?;
            for x in row {
                write!(out, " {x}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn save_to_file(&self, vocab: &Vocabulary, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.save(vocab, &mut out)?;
        out.flush()?;
        Ok(())
    }
}
