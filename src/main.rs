use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::Level;

use skipgram::{Config, NegativeSampling, Tokenizer, Trainer};

#[derive(Clone, Copy, ValueEnum)]
enum NegativesArg {
    /// Draw from the whole token stream
    Stream,
    /// Never draw the pair's own center or context word
    ExcludePositives,
}

#[derive(Clone, Copy, ValueEnum)]
enum TokenizerArg {
    /// Split on whitespace
    Whitespace,
    /// Keep only Han characters, one token each
    Han,
}

#[derive(Parser)]
#[command(about = "Skip-gram word vector trainer with negative sampling", long_about = None)]
struct Options {
    /// Use text data from FILE to train the model
    #[arg(long = "train", value_name = "FILE")]
    train_file: PathBuf,

    /// Use FILE to save the resulting word vectors
    #[arg(long = "output", value_name = "FILE")]
    output_file: PathBuf,

    /// Set size of word vectors
    #[arg(long = "size", default_value_t = 100)]
    dim: usize,

    /// Number of center words per gradient step
    #[arg(long, default_value_t = 16)]
    batch_size: usize,

    /// Set max skip length between words; also the number of negative samples
    #[arg(long, default_value_t = 5)]
    window: usize,

    /// Number of training epochs
    #[arg(long, default_value_t = 1)]
    iter: usize,

    /// Set the starting learning rate
    #[arg(long, default_value_t = 0.025)]
    alpha: f32,

    /// Words occurring N times or fewer are not trained on
    #[arg(long = "min-count", value_name = "N", default_value_t = 5)]
    min_count: u64,

    /// Set threshold for occurrence of words. Those that appear with higher
    /// frequency in the training data will be randomly down-sampled; 0 disables
    #[arg(long, default_value_t = 1e-5)]
    sample: f64,

    /// Recompute the learning rate every N processed words
    #[arg(long = "decay-interval", value_name = "N", default_value_t = 100_000)]
    decay_interval: u64,

    /// How to draw negative samples
    #[arg(long, value_enum, default_value_t = NegativesArg::ExcludePositives)]
    negatives: NegativesArg,

    /// How to split the corpus into words
    #[arg(long, value_enum, default_value_t = TokenizerArg::Whitespace)]
    tokenizer: TokenizerArg,

    /// Seed for the random number generator; random if unspecified
    #[arg(long)]
    seed: Option<u64>,

    /// Set the debug mode (default = 2 = more info during training)
    #[arg(long = "debug", default_value_t = 2)]
    debug_mode: usize,
}

impl Options {
    fn config(&self) -> Config {
        Config {
            dim: self.dim,
            batch_size: self.batch_size,
            window_size: self.window,
            epochs: self.iter,
            learning_rate: self.alpha,
            min_count: self.min_count,
            sample: self.sample,
            decay_interval: self.decay_interval,
            negative_sampling: match self.negatives {
                NegativesArg::Stream => NegativeSampling::Stream,
                NegativesArg::ExcludePositives => NegativeSampling::ExcludePositives,
            },
            tokenizer: match self.tokenizer {
                TokenizerArg::Whitespace => Tokenizer::Whitespace,
                TokenizerArg::Han => Tokenizer::Han,
            },
        }
    }
}

fn progress_bar(debug_mode: usize) -> Result<ProgressBar> {
    if debug_mode <= 1 {
        return Ok(ProgressBar::hidden());
    }
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] epoch {pos}/{len} {wide_bar} {msg}")
        .context("invalid progress bar template")?;
    Ok(ProgressBar::new(0).with_style(style))
}

fn run(options: &Options) -> Result<()> {
    let text = fs::read_to_string(&options.train_file)
        .with_context(|| format!("error reading training data file {:?}", options.train_file))?;
    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut trainer = Trainer::from_text(&text, options.config(), rng)
        .context("error preparing training data")?
        .with_progress(progress_bar(options.debug_mode)?);
    if options.debug_mode > 0 {
        println!("Vocab size: {}", trainer.vocab().len());
        println!("Words in train file: {}", trainer.stream().len());
    }

    let report = trainer.train().context("error during training")?;
    if options.debug_mode > 0 {
        if let Some(loss) = report.epoch_losses.last() {
            println!("Final mean loss: {loss:.4}");
        }
    }

    trainer
        .save(&options.output_file)
        .with_context(|| format!("error writing output file {:?}", options.output_file))?;
    Ok(())
}

fn main() {
    let options = Options::parse();

    let level = match options.debug_mode {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&options) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
