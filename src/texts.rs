use std::cell::RefCell;

use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use thiserror::Error;

use crate::mode::PracticeMode;

const KEY_ROWS: &[&str] = &["asdf", "jkl;", "qwer", "uiop", "zxcv", "bnm,"];

const PYTHON_KEYWORDS: &[&str] = &[
    "if", "else", "def", "for", "while", "and", "or", "not", "in", "is", "True", "False", "None",
];

const PYTHON_BUILTINS: &[&str] = &[
    "print()", "input()", "len()", "str()", "int()", "float()", "bool()", "list()", "dict()",
];

const SYMBOLS: &[&str] = &[
    "[]", "{}", "()", "\"\"", "''", ":", ";", ",", ".", "/", "?", "!", "@", "#", "$", "%", "^",
    "&", "*", "-", "+", "=", "_",
];

const WORD_TEXTS: &[&str] = &[
    "print input len str int float bool list dict tuple",
    "def if else elif for while and or not in is",
    "True False None return break continue pass",
    "append remove pop sort index count reverse",
    "range type isinstance hasattr getattr setattr",
];

const SENTENCE_TEXTS: &[&str] = &[
    "print(\"Hello, World!\")",
    "for i in range(10):",
    "if x > 0 and x < 100:",
    "name = input(\"Enter your name: \")",
    "numbers = [1, 2, 3, 4, 5]",
];

const PARAGRAPH_TEXTS: &[&str] = &[
    "def factorial(n):\n    if n <= 1:\n        return 1\n    else:\n        return n * factorial(n - 1)",
    "numbers = [1, 2, 3, 4, 5]\nfor num in numbers:\n    if num % 2 == 0:\n        print(f\"{num} is even\")",
    "class Student:\n    def __init__(self, name, age):\n        self.name = name\n        self.age = age",
];

/// Shown when no provider could supply a text
pub const FALLBACK_TEXT: &str = "def hello_world():\n    print(\"Hello, Python!\")";

const KEY_ITEMS_MIN: usize = 15;
const KEY_ITEMS_MAX: usize = 20;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no practice text available for mode {0}")]
    NoText(PracticeMode),
    #[error("practice text request failed: {0}")]
    Request(String),
}

/// Supplies practice texts for a mode
pub trait PracticeTextProvider {
    fn fetch_practice_text(&self, mode: PracticeMode) -> Result<String, ProviderError>;
}

/// Built-in texts, no network needed
#[derive(Debug)]
pub struct LocalTextProvider {
    rng: RefCell<StdRng>,
}

impl LocalTextProvider {
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Shuffled mix of key rows, keywords, builtins and symbols
    fn key_drill(rng: &mut StdRng) -> String {
        let mut items: Vec<&str> = KEY_ROWS
            .iter()
            .chain(PYTHON_KEYWORDS)
            .chain(PYTHON_BUILTINS)
            .chain(SYMBOLS)
            .copied()
            .collect();
        items.shuffle(rng);

        let count = rng.gen_range(KEY_ITEMS_MIN..=KEY_ITEMS_MAX);
        items.into_iter().take(count).join(" ")
    }
}

impl Default for LocalTextProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PracticeTextProvider for LocalTextProvider {
    fn fetch_practice_text(&self, mode: PracticeMode) -> Result<String, ProviderError> {
        let mut rng = self.rng.borrow_mut();

        let pool = match mode {
            PracticeMode::Keys => return Ok(Self::key_drill(&mut rng)),
            PracticeMode::Words => WORD_TEXTS,
            PracticeMode::Sentences => SENTENCE_TEXTS,
            PracticeMode::Paragraphs => PARAGRAPH_TEXTS,
        };

        pool.choose(&mut *rng)
            .map(|text| text.to_string())
            .ok_or(ProviderError::NoText(mode))
    }
}

/// Always returns the same text; used for custom prompts
#[derive(Debug, Clone)]
pub struct FixedTextProvider {
    text: String,
}

impl FixedTextProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl PracticeTextProvider for FixedTextProvider {
    fn fetch_practice_text(&self, mode: PracticeMode) -> Result<String, ProviderError> {
        if self.text.is_empty() {
            return Err(ProviderError::NoText(mode));
        }
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_drill_item_count() {
        let provider = LocalTextProvider::with_seed(7);

        for _ in 0..20 {
            let text = provider.fetch_practice_text(PracticeMode::Keys).unwrap();
            let count = text.split(' ').count();
            assert!((KEY_ITEMS_MIN..=KEY_ITEMS_MAX).contains(&count), "{text}");
        }
    }

    #[test]
    fn test_key_drill_items_come_from_pools() {
        let provider = LocalTextProvider::with_seed(42);
        let text = provider.fetch_practice_text(PracticeMode::Keys).unwrap();

        for item in text.split(' ') {
            assert!(
                KEY_ROWS.contains(&item)
                    || PYTHON_KEYWORDS.contains(&item)
                    || PYTHON_BUILTINS.contains(&item)
                    || SYMBOLS.contains(&item),
                "unexpected item {item:?}"
            );
        }
    }

    #[test]
    fn test_fixed_pools() {
        let provider = LocalTextProvider::with_seed(1);

        let words = provider.fetch_practice_text(PracticeMode::Words).unwrap();
        assert!(WORD_TEXTS.contains(&words.as_str()));

        let sentence = provider.fetch_practice_text(PracticeMode::Sentences).unwrap();
        assert!(SENTENCE_TEXTS.contains(&sentence.as_str()));

        let paragraph = provider.fetch_practice_text(PracticeMode::Paragraphs).unwrap();
        assert!(paragraph.contains('\n'));
    }

    #[test]
    fn test_same_seed_same_texts() {
        let a = LocalTextProvider::with_seed(99);
        let b = LocalTextProvider::with_seed(99);

        assert_eq!(
            a.fetch_practice_text(PracticeMode::Keys).unwrap(),
            b.fetch_practice_text(PracticeMode::Keys).unwrap()
        );
    }

    #[test]
    fn test_fixed_provider() {
        let provider = FixedTextProvider::new("hello world");
        assert_eq!(
            provider.fetch_practice_text(PracticeMode::Keys).unwrap(),
            "hello world"
        );

        let empty = FixedTextProvider::new("");
        assert!(matches!(
            empty.fetch_practice_text(PracticeMode::Words),
            Err(ProviderError::NoText(PracticeMode::Words))
        ));
    }
}
