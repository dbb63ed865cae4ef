/// Longer tokens are truncated to this many characters.
pub const MAX_TOKEN_LEN: usize = 100;

/// Splits raw text into tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tokenizer {
    /// Tokens are separated by whitespace.
    #[default]
    Whitespace,
    /// Keep only CJK unified ideographs (U+4E00..=U+9FA5) and emit one token
    /// per character. Everything else, including whitespace and punctuation,
    /// is discarded first. No dictionary segmentation is done.
    Han,
}

fn is_han(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

impl Tokenizer {
    pub fn tokenize<'a>(self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        match self {
            Tokenizer::Whitespace => Box::new(
                text.split_whitespace()
                    .map(|word| word.chars().take(MAX_TOKEN_LEN).collect()),
            ),
            Tokenizer::Han => Box::new(text.chars().filter(|&c| is_han(c)).map(String::from)),
        }
    }
}
