use std::time::Duration;

/// Characters per word in the WPM convention.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Counts positions where `typed` and `target` agree, up to the shorter of the two.
pub fn correct_char_count(typed: &[char], target: &[char]) -> usize {
    typed
        .iter()
        .zip(target.iter())
        .filter(|(t, e)| t == e)
        .count()
}

/// Words per minute from correctly typed characters.
pub fn wpm(correct_chars: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0;
    }

    let wpm = (correct_chars as f64 / CHARS_PER_WORD / minutes).round();
    if wpm.is_finite() && wpm > 0.0 {
        wpm as u32
    } else {
        0
    }
}

/// Accuracy as a whole percentage; 100 when nothing has been typed.
pub fn accuracy_percent(correct_chars: usize, typed_chars: usize) -> u32 {
    if typed_chars == 0 {
        return 100;
    }

    ((correct_chars as f64 / typed_chars as f64) * 100.0).round() as u32
}
