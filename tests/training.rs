//! End-to-end training runs on small synthetic corpora.

use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skipgram::{cosine, Config, Tokenizer, Trainer, Vectors};

fn small_config() -> Config {
    Config {
        min_count: 0,
        sample: 0.0,
        ..Config::default()
    }
}

/// Text made of `n` bigrams `a{i} b{i}`, with `i` chosen at random among
/// `kinds` choices. Each `b{i}` always follows its `a{i}`.
fn bigram_corpus(n: usize, kinds: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let i = rng.gen_range(0..kinds);
            format!("a{i} b{i}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("skipgram-{}-{name}", std::process::id()))
}

#[test]
fn partial_batch_is_discarded() {
    let text = (0..37).map(|i| format!("w{}", i % 7)).collect::<Vec<_>>().join(" ");
    let config = Config {
        epochs: 2,
        ..small_config()
    };
    let mut trainer = Trainer::from_text(&text, config, StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(trainer.stream().len(), 37);
    let report = trainer.train().unwrap();
    assert_eq!(report.batches_per_epoch, 2);
    assert_eq!(report.epoch_losses.len(), 2);
}

#[test]
fn loss_decreases_on_cooccurrence_corpus() {
    let text = bigram_corpus(200, 10, 1);
    let config = Config {
        dim: 10,
        window_size: 1,
        epochs: 20,
        learning_rate: 0.1,
        ..small_config()
    };
    let mut trainer = Trainer::from_text(&text, config, StdRng::seed_from_u64(2)).unwrap();
    let report = trainer.train().unwrap();
    let losses = &report.epoch_losses;
    assert!(losses.iter().all(|l| l.is_finite()));

    let first: f32 = losses[..5].iter().sum::<f32>() / 5.0;
    let last: f32 = losses[15..].iter().sum::<f32>() / 5.0;
    assert!(last < 0.8 * first, "losses: {losses:?}");
}

#[test]
fn export_round_trip() {
    let text = bigram_corpus(60, 5, 3);
    let config = Config {
        dim: 12,
        window_size: 2,
        epochs: 3,
        ..small_config()
    };
    let mut trainer = Trainer::from_text(&text, config, StdRng::seed_from_u64(4)).unwrap();
    trainer.train().unwrap();

    let path = temp_path("round-trip.txt");
    trainer.save(&path).unwrap();
    let vectors = Vectors::load(&path).unwrap();
    let saved = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let vocab = trainer.vocab();
    assert_eq!(saved.lines().count(), vocab.len());
    assert_eq!(vectors.num_words(), vocab.len());
    assert_eq!(vectors.size(), 12);
    for (id, token) in vocab.iter().enumerate() {
        assert_eq!(vectors.word(id), token);
        assert_eq!(vectors.lookup_word(token), Some(id));
        let expected = trainer.model().embedding(id);
        assert_eq!(&vectors[id], expected.as_slice().unwrap());
    }
}

#[test]
fn adjacent_words_end_up_similar() {
    let mut text = "alpha beta ".repeat(20);
    text.push_str("gamma");
    let config = Config {
        window_size: 1,
        epochs: 5,
        ..small_config()
    };
    let mut trainer = Trainer::from_text(&text, config, StdRng::seed_from_u64(2024)).unwrap();
    trainer.train().unwrap();

    let vocab = trainer.vocab();
    let model = trainer.model();
    let embedding = |word: &str| model.embedding(vocab.id(word).unwrap()).to_vec();
    let alpha = embedding("alpha");
    let beta = embedding("beta");
    let gamma = embedding("gamma");

    let related = cosine(&alpha, &beta);
    let unrelated = cosine(&alpha, &gamma).max(cosine(&beta, &gamma));
    assert!(
        related > unrelated,
        "alpha~beta = {related}, best similarity to gamma = {unrelated}"
    );
}

#[test]
fn han_corpus_trains() {
    let text = "股票上涨，股票下跌。".repeat(10);
    let config = Config {
        dim: 8,
        window_size: 2,
        tokenizer: Tokenizer::Han,
        ..small_config()
    };
    let mut trainer = Trainer::from_text(&text, config, StdRng::seed_from_u64(6)).unwrap();
    assert_eq!(trainer.vocab().len(), 6);
    assert_eq!(trainer.vocab().token(0), "股");
    assert_eq!(trainer.stream().len(), 80);
    let report = trainer.train().unwrap();
    assert_eq!(report.batches_per_epoch, 5);
}
