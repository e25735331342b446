/// Which virtual key the presentation layer should light next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    /// The character expected at the cursor
    pub expected: char,
    /// Key cap to highlight (letters are lower-cased)
    pub key: char,
    /// Shift should be highlighted as well
    pub shift: bool,
}

pub fn next_key_hint(target: &[char], typed_len: usize, caps_lock: bool) -> Option<KeyHint> {
    let expected = *target.get(typed_len)?;
    let key = expected.to_lowercase().next().unwrap_or(expected);
    let shift = expected.is_uppercase() && !caps_lock;

    Some(KeyHint {
        expected,
        key,
        shift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_lowercase_hint() {
        let hint = next_key_hint(&chars("print"), 2, false).unwrap();

        assert_eq!(hint.expected, 'i');
        assert_eq!(hint.key, 'i');
        assert!(!hint.shift);
    }

    #[test]
    fn test_uppercase_needs_shift() {
        let hint = next_key_hint(&chars("True"), 0, false).unwrap();

        assert_eq!(hint.key, 't');
        assert!(hint.shift);
    }

    #[test]
    fn test_caps_lock_suppresses_shift() {
        let hint = next_key_hint(&chars("None"), 0, true).unwrap();

        assert_eq!(hint.key, 'n');
        assert!(!hint.shift);
    }

    #[test]
    fn test_symbols_pass_through() {
        let hint = next_key_hint(&chars("()"), 1, false).unwrap();

        assert_eq!(hint.key, ')');
        assert!(!hint.shift);
    }

    #[test]
    fn test_exhausted_text() {
        assert_eq!(next_key_hint(&chars("if"), 2, false), None);
        assert_eq!(next_key_hint(&[], 0, false), None);
    }
}
