use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("corpus contains no tokens")]
    EmptyCorpus,

    #[error("only {found} distinct tokens survive the min-count filter; need at least {required}")]
    VocabularyTooSmall { found: usize, required: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("token stream has {len} tokens, fewer than one batch of {batch_size}")]
    StreamTooShort { len: usize, batch_size: usize },

    #[error("invalid vector file, line {line}: {reason}")]
    InvalidVectors { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
