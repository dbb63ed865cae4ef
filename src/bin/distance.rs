use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use skipgram::{normalize, Vectors};

/// number of closest words that will be shown
const N: usize = 40;

#[derive(Parser)]
#[command(about = "Show the words closest to a word or sentence", long_about = None)]
struct Options {
    /// Contains word vectors in the text format written by `skipgram`.
    #[arg(value_name = "FILE")]
    file_name: PathBuf,
}

fn run(options: &Options) -> Result<()> {
    let vectors = Vectors::load(&options.file_name)
        .with_context(|| format!("error loading {:?}", options.file_name))?;

    'outer: loop {
        print!("Enter word or sentence (EXIT to break): ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if io::stdin()
            .read_line(&mut line)
            .context("error reading stdin")?
            == 0
        {
            break;
        }
        let line = line.trim();
        if line == "EXIT" {
            break;
        }

        let mut bi: Vec<usize> = vec![];
        for word in line.split_whitespace() {
            println!();
            match vectors.lookup_word(word) {
                None => {
                    println!("Word: {word}  Out of dictionary word!");
                    continue 'outer;
                }
                Some(i) => {
                    println!("Word: {word}  Position in vocabulary: {i}");
                    bi.push(i);
                }
            }
        }
        if bi.is_empty() {
            continue;
        }

        println!();
        println!("                                              Word       Cosine distance");
        println!("------------------------------------------------------------------------");

        let mut vec = vec![0.0f32; vectors.size()];
        for &i in &bi {
            let mut row = vectors[i].to_vec();
            normalize(&mut row);
            for (v, r) in vec.iter_mut().zip(row) {
                *v += r;
            }
        }
        normalize(&mut vec);

        for (c, dist) in vectors.nearest_to(&vec, &bi, N) {
            println!("{:50}\t\t{}", vectors.word(c), dist);
        }
    }
    Ok(())
}

fn main() {
    let options = Options::parse();
    if let Err(err) = run(&options) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
