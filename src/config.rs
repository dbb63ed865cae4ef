use crate::{Error, Result, Tokenizer};

/// How negative samples are drawn from the token stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NegativeSampling {
    /// Uniform over the whole stream. May return the center word or the
    /// true context word.
    Stream,
    /// Uniform over the stream, never returning the pair's center or context
    /// word (unless the stream contains nothing else).
    #[default]
    ExcludePositives,
}

/// Training parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Embedding vector length.
    pub dim: usize,
    /// Number of center tokens per batch.
    pub batch_size: usize,
    /// Maximum context radius. Also the number of negatives per pair.
    pub window_size: usize,
    pub epochs: usize,
    /// Starting learning rate.
    pub learning_rate: f32,
    /// Tokens occurring `min_count` times or fewer are not trained on.
    pub min_count: u64,
    /// Subsampling threshold; `0.0` disables subsampling.
    pub sample: f64,
    /// The learning rate is recomputed each time the number of processed
    /// tokens crosses a multiple of this.
    pub decay_interval: u64,
    pub negative_sampling: NegativeSampling,
    pub tokenizer: Tokenizer,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dim: 100,
            batch_size: 16,
            window_size: 5,
            epochs: 1,
            learning_rate: 0.025,
            min_count: 5,
            sample: 1e-5,
            decay_interval: 100_000,
            negative_sampling: NegativeSampling::default(),
            tokenizer: Tokenizer::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("dim", self.dim),
            ("batch_size", self.batch_size),
            ("window_size", self.window_size),
            ("epochs", self.epochs),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::InvalidConfiguration(format!(
                    "{name} must be positive"
                )));
            }
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !(self.sample.is_finite() && self.sample >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "sample threshold must be non-negative, got {}",
                self.sample
            )));
        }
        if self.decay_interval == 0 {
            return Err(Error::InvalidConfiguration(
                "decay_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
