use std::path::Path;

use indicatif::ProgressBar;
use rand::Rng;
use tracing::{debug, info};

use crate::{Batcher, Config, Corpus, Error, NegativeSampler, Result, SkipGram, Vocabulary};

/// What happened during [`Trainer::train`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Mean batch loss of each epoch, measured before each batch's update.
    pub epoch_losses: Vec<f32>,
    /// Batches processed per epoch.
    pub batches_per_epoch: usize,
    /// Learning rate in effect when training stopped.
    pub final_learning_rate: f32,
}

/// Drives stochastic gradient descent over a corpus.
pub struct Trainer<R> {
    config: Config,
    vocab: Vocabulary,
    stream: Vec<usize>,
    sampler: NegativeSampler,
    model: SkipGram,
    rng: R,
    progress: ProgressBar,
}

impl<R: Rng> Trainer<R> {
    /// Check `config` against `corpus` and initialize a fresh model.
    pub fn new(corpus: Corpus, config: Config, mut rng: R) -> Result<Self> {
        config.validate()?;
        let required = config.window_size + 1;
        if corpus.retained() < required {
            return Err(Error::VocabularyTooSmall {
                found: corpus.retained(),
                required,
            });
        }
        if corpus.stream().len() < config.batch_size {
            return Err(Error::StreamTooShort {
                len: corpus.stream().len(),
                batch_size: config.batch_size,
            });
        }

        let (vocab, stream) = corpus.into_parts();
        let sampler = NegativeSampler::new(&stream, vocab.len(), config.negative_sampling);
        let model = SkipGram::new(vocab.len(), config.dim, &mut rng);
        Ok(Trainer {
            config,
            vocab,
            stream,
            sampler,
            model,
            rng,
            progress: ProgressBar::hidden(),
        })
    }

    /// Tokenize and preprocess `text` with the settings in `config`, then
    /// build a trainer for it.
    pub fn from_text(text: &str, config: Config, mut rng: R) -> Result<Self> {
        let corpus = Corpus::build(
            text,
            config.tokenizer,
            config.min_count,
            config.sample,
            &mut rng,
        )?;
        Self::new(corpus, config, rng)
    }

    /// Report progress on `bar`. Its length is set to the number of epochs.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = bar;
        self
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn stream(&self) -> &[usize] {
        &self.stream
    }

    pub fn model(&self) -> &SkipGram {
        &self.model
    }

    pub fn into_model(self) -> (Vocabulary, SkipGram) {
        (self.vocab, self.model)
    }

    /// Run every epoch.
    ///
    /// The learning rate starts at `config.learning_rate`. Each batch advances
    /// a counter by `batch_size` tokens; whenever the counter crosses a
    /// multiple of `config.decay_interval`, the rate becomes
    /// `learning_rate * (1 - epoch / epochs)`.
    pub fn train(&mut self) -> Result<TrainingReport> {
        let Config {
            batch_size,
            window_size,
            epochs,
            learning_rate,
            decay_interval,
            ..
        } = self.config;

        let batcher = Batcher::new(&self.stream, batch_size, window_size, &self.sampler);
        let batches_per_epoch = batcher.num_batches();
        info!(
            tokens = self.stream.len(),
            vocab_size = self.vocab.len(),
            batches_per_epoch,
            epochs,
            "starting training"
        );

        self.progress.set_length(epochs as u64);
        self.progress.set_position(0);

        let mut lr = learning_rate;
        let mut processed: u64 = 0;
        let mut epoch_losses = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let mut total = 0.0f64;
            for batch in batcher.batches(&mut self.rng) {
                let loss = self.model.train_batch(&batch, lr);
                total += loss as f64;
                self.progress
                    .set_message(format!("Loss: {loss:.4}, lr: {lr:.6}"));

                let before = processed;
                processed += batch_size as u64;
                if before / decay_interval != processed / decay_interval {
                    lr = learning_rate * (1.0 - epoch as f32 / epochs as f32);
                    debug!(epoch, processed, lr, "learning rate updated");
                }
            }
            let mean = (total / batches_per_epoch as f64) as f32;
            info!(epoch, loss = mean, lr, "epoch finished");
            epoch_losses.push(mean);
            self.progress.inc(1);
        }
        self.progress.finish();

        Ok(TrainingReport {
            epoch_losses,
            batches_per_epoch,
            final_learning_rate: lr,
        })
    }

    /// Write the learned vectors to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.model.save_to_file(&self.vocab, path)?;
        info!(path = %path.display(), words = self.vocab.len(), "saved embeddings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn config() -> Config {
        Config {
            dim: 8,
            batch_size: 4,
            window_size: 2,
            min_count: 0,
            sample: 0.0,
            ..Config::default()
        }
    }

    #[test]
    fn rejects_bad_config() {
        let rng = StdRng::seed_from_u64(0);
        let config = Config {
            batch_size: 0,
            ..config()
        };
        let result = Trainer::from_text("a b c d e f", config, rng);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn rejects_small_vocabulary() {
        let rng = StdRng::seed_from_u64(0);
        // window 2 needs three distinct tokens
        let result = Trainer::from_text("a b a b a b a b", config(), rng);
        assert!(matches!(
            result,
            Err(Error::VocabularyTooSmall { found: 2, required: 3 })
        ));
    }

    #[test]
    fn rejects_short_stream() {
        let rng = StdRng::seed_from_u64(0);
        let config = Config {
            batch_size: 10,
            ..config()
        };
        let result = Trainer::from_text("a b c d e", config, rng);
        assert!(matches!(
            result,
            Err(Error::StreamTooShort { len: 5, batch_size: 10 })
        ));
    }

    #[test]
    fn min_count_counts_toward_vocabulary_size() {
        let rng = StdRng::seed_from_u64(0);
        let config = Config {
            window_size: 1,
            batch_size: 2,
            min_count: 1,
            ..config()
        };
        let trainer = Trainer::from_text("a a b b c", config, rng).unwrap();
        assert_eq!(trainer.vocab().len(), 3);
        assert_eq!(trainer.model().vocab_size(), 3);
        assert_eq!(trainer.stream(), &[0, 0, 1, 1]);
    }

    #[test]
    fn learning_rate_decays_on_interval_crossings() {
        let rng = StdRng::seed_from_u64(3);
        let config = Config {
            epochs: 4,
            decay_interval: 8,
            ..config()
        };
        // 12 tokens: 3 batches of 4 per epoch
        let mut trainer = Trainer::from_text("a b c d e f a b c d e f", config, rng).unwrap();
        let report = trainer.train().unwrap();
        assert_eq!(report.batches_per_epoch, 3);
        assert_eq!(report.epoch_losses.len(), 4);
        // the last crossing happens at 48 tokens, during epoch 3
        assert!((report.final_learning_rate - 0.025 * 0.25).abs() < 1e-7);
    }

    #[test]
    fn learning_rate_constant_below_interval() {
        let rng = StdRng::seed_from_u64(3);
        let config = Config {
            epochs: 3,
            ..config()
        };
        let mut trainer = Trainer::from_text("a b c d e f a b c d e f", config, rng).unwrap();
        let report = trainer.train().unwrap();
        assert_eq!(report.final_learning_rate, 0.025);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let text = "x y z x y z w x y z w v";
        let run = |seed| {
            let mut trainer =
                Trainer::from_text(text, config(), StdRng::seed_from_u64(seed)).unwrap();
            let report = trainer.train().unwrap();
            (report, trainer.model().input().to_owned())
        };
        assert_eq!(run(42), run(42));
    }
}
