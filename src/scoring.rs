/// Points per character of a fully correct word.
pub const POINTS_PER_CHAR: f64 = 3.0;

/// Points per correct character of the word left unfinished when time runs out.
pub const PARTIAL_POINTS_PER_CHAR: f64 = 1.5;

/// Score for a completed word, weighted by the square of its accuracy.
///
/// A completed word always earns at least one point.
pub fn word_score(word_len: usize, correct_chars: usize) -> u32 {
    if word_len == 0 {
        return 1;
    }

    let accuracy = correct_chars.min(word_len) as f64 / word_len as f64;
    let score = (word_len as f64 * POINTS_PER_CHAR * accuracy * accuracy).round() as u32;
    score.max(1)
}

/// Credit for the in-progress word at the end of a session.
pub fn partial_credit(correct_chars: usize) -> u32 {
    (correct_chars as f64 * PARTIAL_POINTS_PER_CHAR).round() as u32
}
