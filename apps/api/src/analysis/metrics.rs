//! Text metrics: pure measurements over raw resume text.
//!
//! Every analysis recomputes these from scratch; nothing here is cached.

use serde::{Deserialize, Serialize};

/// Verbs that signal concrete, accomplishment-framed bullets.
pub const ACTION_VERBS: &[&str] = &[
    "achieved",
    "improved",
    "launched",
    "developed",
    "created",
    "implemented",
    "managed",
    "led",
    "designed",
    "increased",
    "decreased",
    "reduced",
    "negotiated",
    "coordinated",
    "generated",
    "delivered",
    "organized",
    "supervised",
    "trained",
    "analyzed",
];

/// Glyphs counted as bullet markers. Each occurrence counts, so a hyphenated
/// word or a "-" inside a date range adds to the total as well.
const BULLET_GLYPHS: &[char] = &['•', '-', '*'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub word_count: usize,
    pub bullet_count: usize,
    pub action_verb_count: usize,
    /// Flesch Reading Ease. Unclamped: may exceed 100 or go negative.
    pub readability: f64,
    pub digit_count: usize,
}

/// Computes all metrics for `text`.
pub fn compute(text: &str) -> Metrics {
    Metrics {
        word_count: text.split_whitespace().count(),
        bullet_count: text.chars().filter(|c| BULLET_GLYPHS.contains(c)).count(),
        action_verb_count: count_action_verbs(text),
        readability: flesch_reading_ease(text),
        digit_count: text.chars().filter(|c| c.is_ascii_digit()).count(),
    }
}

/// Whitespace tokens whose lowercase form is exactly an action verb.
/// Punctuation is not stripped: "led," does not count.
fn count_action_verbs(text: &str) -> usize {
    text.split_whitespace()
        .filter(|token| ACTION_VERBS.contains(&token.to_lowercase().as_str()))
        .count()
}

/// 206.835 − 1.015 × (words / sentences) − 84.6 × (syllables / words).
///
/// Sentences end at `.`, `!`, `?` or a line break; resume bullets rarely carry
/// terminal punctuation. Returns 0.0 for text without any words.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let words = extract_words(text);
    if words.is_empty() {
        return 0.0;
    }

    let sentences = count_sentences(text).max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word
}

/// Alphabetic runs, lowercased. Apostrophes inside a word are kept.
fn extract_words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphabetic() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn count_sentences(text: &str) -> usize {
    text.split(|c: char| matches!(c, '.' | '!' | '?' | '\n'))
        .filter(|s| s.chars().any(char::is_alphabetic))
        .count()
}

/// Vowel-group syllable estimate with a silent trailing "e" rule. Never below 1.
pub fn count_syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let chars: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    if chars.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &chars {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    let len = chars.len();
    if len > 2 && chars[len - 1] == 'e' && chars[len - 2] != 'l' && !is_vowel(chars[len - 2]) {
        count -= 1;
    }
    // "-ed" is silent unless it follows t or d: "developed" vs "created"
    if len > 3
        && word.ends_with("ed")
        && !matches!(chars[len - 3], 't' | 'd')
        && !is_vowel(chars[len - 3])
    {
        count -= 1;
    }

    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        "Developed and led a team. • Improved efficiency by 20%. • Managed 5 projects.";

    #[test]
    fn test_sample_counts() {
        let m = compute(SAMPLE);
        assert_eq!(m.word_count, 14);
        assert_eq!(m.bullet_count, 2, "two • glyphs");
        assert_eq!(m.action_verb_count, 4, "developed, led, improved, managed");
        assert_eq!(m.digit_count, 3, "2, 0 and 5");
    }

    #[test]
    fn test_every_bullet_glyph_counts() {
        let m = compute("• - * mixed line");
        assert_eq!(m.bullet_count, 3);
    }

    #[test]
    fn test_hyphenated_words_count_as_bullets() {
        assert_eq!(compute("full-stack 2019-2021").bullet_count, 2);
    }

    #[test]
    fn test_action_verbs_require_exact_token() {
        assert_eq!(compute("Led, managed").action_verb_count, 1);
        assert_eq!(compute("LED MANAGED").action_verb_count, 2);
    }

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(compute(SAMPLE), compute(SAMPLE));
    }

    #[test]
    fn test_empty_text() {
        let m = compute("");
        assert_eq!(m.word_count, 0);
        assert_eq!(m.bullet_count, 0);
        assert_eq!(m.readability, 0.0);
    }

    #[test]
    fn test_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("developed"), 3);
        assert_eq!(count_syllables("the"), 1);
    }

    #[test]
    fn test_simple_text_reads_easier_than_dense_text() {
        let simple = flesch_reading_ease("The cat sat on the mat. The dog ran fast.");
        let dense = flesch_reading_ease(
            "Comprehensive organizational methodology implementation necessitated \
             extraordinarily sophisticated infrastructural considerations.",
        );
        assert!(simple > 80.0, "simple text scored {simple}");
        assert!(dense < simple);
    }
}
