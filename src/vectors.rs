use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;

use ordered_float::OrderedFloat;

use crate::{Error, Result};

/// Word vectors read back from a text export.
pub struct Vectors {
    /// Embedding vector length (number of dimensions).
    size: usize,

    /// The vocabulary, in file order.
    vocab: Vec<String>,

    /// `embeddings[k * size..(k+1) * size]` is the vector embedding for word `k`.
    embeddings: Vec<f32>,
}

pub fn norm(v: &[f32]) -> f32 {
    v.iter().copied().map(|e| e * e).sum::<f32>().sqrt()
}

/// Scale `v` to unit length. Zero vectors are left alone.
pub fn normalize(v: &mut [f32]) {
    let len = norm(v);
    if len > 0.0 {
        for e in v {
            *e /= len;
        }
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(&a, &b)| a * b).sum()
}

/// Cosine similarity; 0 if either vector is zero.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let d = norm(a) * norm(b);
    if d == 0.0 {
        0.0
    } else {
        dot(a, b) / d
    }
}

impl Index<usize> for Vectors {
    type Output = [f32];

    fn index(&self, i: usize) -> &[f32] {
        &self.embeddings[i * self.size..][..self.size]
    }
}

impl Vectors {
    pub fn load(file_name: &Path) -> Result<Self> {
        Self::read(BufReader::new(File::open(file_name)?))
    }

    /// Parse lines of the form `word x1 x2 ... xN`. Every line must have the
    /// same N, and N must be at least 1.
    pub fn read<R: BufRead>(input: R) -> Result<Self> {
        let mut size = 0;
        let mut vocab: Vec<String> = vec![];
        let mut embeddings: Vec<f32> = vec![];
        for (i, line) in input.lines().enumerate() {
            let line = line?;
            let line_num = i + 1;
            let invalid = |reason: String| Error::InvalidVectors {
                line: line_num,
                reason,
            };

            let mut fields = line.split(' ');
            let word = match fields.next() {
                Some(w) if !w.is_empty() => w,
                _ => return Err(invalid("missing word".to_string())),
            };
            let start = embeddings.len();
            for field in fields {
                let x: f32 = field
                    .parse()
                    .map_err(|err| invalid(format!("bad number {field:?}: {err}")))?;
                embeddings.push(x);
            }
            let n = embeddings.len() - start;
            if vocab.is_empty() {
                if n == 0 {
                    return Err(invalid("no vector components".to_string()));
                }
                size = n;
            } else if n != size {
                return Err(invalid(format!("expected {size} components, found {n}")));
            }
            vocab.push(word.to_string());
        }

        Ok(Vectors {
            size,
            vocab,
            embeddings,
        })
    }

    pub fn num_words(&self) -> usize {
        self.vocab.len()
    }

    /// Returns the vector size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the index for a word as string. Exact match only, case-sensitive.
    pub fn lookup_word(&self, word: &str) -> Option<usize> {
        self.vocab.iter().position(|v| v == word)
    }

    /// Get the word for a word-index. Panics if `word` is out of range.
    pub fn word(&self, word: usize) -> &str {
        &self.vocab[word]
    }

    /// Cosine similarity of two words' vectors.
    pub fn similarity(&self, a: usize, b: usize) -> f32 {
        cosine(&self[a], &self[b])
    }

    /// The `n` words most similar to `vec`, best first, skipping `exclude`.
    pub fn nearest_to(&self, vec: &[f32], exclude: &[usize], n: usize) -> Vec<(usize, f32)> {
        let mut best: Vec<(usize, f32)> = (0..self.num_words())
            .filter(|c| !exclude.contains(c))
            .map(|c| (c, cosine(vec, &self[c])))
            .collect();
        best.sort_by_key(|&(_, dist)| std::cmp::Reverse(OrderedFloat(dist)));
        best.truncate(n);
        best
    }

    /// The `n` words most similar to `word`, best first.
    pub fn nearest(&self, word: usize, n: usize) -> Vec<(usize, f32)> {
        self.nearest_to(&self[word], &[word], n)
    }
}
