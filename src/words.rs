/// A maximal run of non-space characters in the target text.
///
/// `start` and `end` are char offsets into the target, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub index: usize,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Word {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the typed buffer has reached into this word without moving past it.
    pub fn contains_cursor(&self, typed_len: usize) -> bool {
        typed_len > self.start && typed_len <= self.end
    }
}

/// Splits `target` on single spaces, skipping the empty tokens left by runs of spaces.
///
/// Anything other than `' '` (tabs, newlines) stays inside a word, matching how
/// the input box compares characters.
pub fn split_words(target: &[char]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pos = 0;

    for token in target.split(|c| *c == ' ') {
        let start = pos;
        let end = start + token.len();
        pos = end + 1;

        if token.is_empty() {
            continue;
        }

        words.push(Word {
            index: words.len(),
            text: token.iter().collect(),
            start,
            end,
        });
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_split_simple() {
        let words = split_words(&chars("abc def"));

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "abc");
        assert_eq!((words[0].start, words[0].end), (0, 3));
        assert_eq!(words[1].text, "def");
        assert_eq!((words[1].start, words[1].end), (4, 7));
    }

    #[test]
    fn test_split_ignores_runs_of_spaces() {
        let words = split_words(&chars("if  else   for"));

        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["if", "else", "for"]);
        assert_eq!(words[1].start, 4);
        assert_eq!(words[2].start, 11);
        assert_eq!(words[2].index, 2);
    }

    #[test]
    fn test_split_leading_and_trailing_spaces() {
        let words = split_words(&chars(" print "));

        assert_eq!(words.len(), 1);
        assert_eq!((words[0].start, words[0].end), (1, 6));
    }

    #[test]
    fn test_split_hangul_uses_char_offsets() {
        let words = split_words(&chars("안녕 파이썬"));

        assert_eq!(words[0].len(), 2);
        assert_eq!((words[1].start, words[1].end), (3, 6));
    }

    #[test]
    fn test_newlines_stay_inside_words() {
        let words = split_words(&chars("a\nb c"));

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "a\nb");
    }

    #[test]
    fn test_empty_target() {
        assert!(split_words(&[]).is_empty());
        assert!(split_words(&chars("   ")).is_empty());
    }

    #[test]
    fn test_contains_cursor() {
        let word = &split_words(&chars("cat dog"))[1];

        assert!(!word.contains_cursor(4));
        assert!(word.contains_cursor(5));
        assert!(word.contains_cursor(7));
        assert!(!word.contains_cursor(8));
    }
}
