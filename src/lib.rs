//! Skip-gram word embeddings trained with negative sampling.
//!
//! The pipeline is: raw text → [`Corpus::build`] → [`Trainer`] → a text file
//! of word vectors, which [`Vectors`] can read back for similarity queries.

mod error;
pub use error::{Error, Result};

mod config;
pub use config::{Config, NegativeSampling};

mod tokenize;
pub use tokenize::{Tokenizer, MAX_TOKEN_LEN};

mod vocab;
pub use vocab::{Corpus, Vocabulary};

pub mod loss;

mod model;
pub use model::{Gradients, SkipGram};

mod sample;
pub use sample::NegativeSampler;

mod batch;
pub use batch::{Batch, Batcher};

mod train;
pub use train::{Trainer, TrainingReport};

mod vectors;
pub use vectors::{cosine, dot, norm, normalize, Vectors};
