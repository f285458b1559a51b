//! Lexicon-based sentiment: VADER-style compound polarity over resume text.
//!
//! Valences are on VADER's −4..+4 scale. The rule set covers the parts of VADER
//! that matter for prose like resumes: boosters/dampeners, negation within three
//! tokens, ALL-CAPS emphasis, the "but" contrast shift and exclamation marks.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const BOOST_INCREMENT: f64 = 0.293;
const BOOST_DECREMENT: f64 = -0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Compound score thresholds for tone classification.
const POSITIVE_THRESHOLD: f64 = 0.05;
const NEGATIVE_THRESHOLD: f64 = -0.05;

static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        // positive
        ("accomplished", 1.9),
        ("achieve", 1.6),
        ("achieved", 1.8),
        ("achievement", 2.0),
        ("admired", 2.1),
        ("amazing", 2.8),
        ("award", 2.5),
        ("awarded", 1.7),
        ("awesome", 3.1),
        ("benefit", 2.0),
        ("best", 3.2),
        ("better", 1.9),
        ("brilliant", 2.8),
        ("confident", 2.2),
        ("creative", 1.9),
        ("dedicated", 2.0),
        ("effective", 2.1),
        ("efficient", 1.8),
        ("enjoy", 2.2),
        ("enthusiastic", 1.9),
        ("excellent", 2.7),
        ("exceeded", 1.5),
        ("excited", 1.4),
        ("fantastic", 2.6),
        ("good", 1.9),
        ("great", 3.1),
        ("growth", 1.6),
        ("happy", 2.7),
        ("help", 1.7),
        ("helped", 1.6),
        ("helpful", 1.8),
        ("honored", 2.2),
        ("impressive", 2.3),
        ("improve", 1.9),
        ("improved", 2.1),
        ("improvement", 2.0),
        ("innovative", 1.9),
        ("love", 3.2),
        ("motivated", 1.5),
        ("outstanding", 3.0),
        ("passionate", 2.4),
        ("positive", 2.6),
        ("praised", 2.4),
        ("proud", 2.1),
        ("recognized", 1.3),
        ("reliable", 1.8),
        ("rewarding", 2.4),
        ("skilled", 1.4),
        ("strong", 2.3),
        ("success", 2.7),
        ("successful", 2.8),
        ("successfully", 2.2),
        ("support", 1.7),
        ("talented", 2.3),
        ("thrive", 2.3),
        ("top", 0.8),
        ("valuable", 2.1),
        ("win", 2.8),
        ("won", 2.7),
        // negative
        ("angry", -2.3),
        ("bad", -2.5),
        ("boring", -1.3),
        ("conflict", -1.3),
        ("crisis", -3.1),
        ("decline", -1.1),
        ("difficult", -1.5),
        ("disappointed", -1.9),
        ("error", -1.7),
        ("errors", -1.4),
        ("fail", -2.5),
        ("failed", -2.3),
        ("failure", -2.3),
        ("fired", -2.6),
        ("hate", -2.7),
        ("hated", -3.2),
        ("lack", -1.3),
        ("lacking", -1.6),
        ("lazy", -1.5),
        ("lost", -1.3),
        ("loss", -1.3),
        ("mistake", -1.5),
        ("mistakes", -1.6),
        ("negative", -2.7),
        ("poor", -2.1),
        ("problem", -1.7),
        ("problems", -1.7),
        ("sad", -2.1),
        ("struggle", -1.9),
        ("struggled", -1.5),
        ("terrible", -2.1),
        ("unemployed", -2.1),
        ("unfortunately", -1.6),
        ("weak", -1.9),
        ("worst", -3.1),
        ("wrong", -2.1),
    ]
    .into_iter()
    .collect()
});

const BOOSTERS: &[&str] = &[
    "absolutely",
    "completely",
    "considerably",
    "deeply",
    "enormously",
    "entirely",
    "especially",
    "exceptionally",
    "extremely",
    "greatly",
    "highly",
    "hugely",
    "incredibly",
    "particularly",
    "really",
    "remarkably",
    "significantly",
    "substantially",
    "thoroughly",
    "totally",
    "tremendously",
    "very",
];

const DAMPENERS: &[&str] = &[
    "almost",
    "barely",
    "hardly",
    "marginally",
    "occasionally",
    "partly",
    "slightly",
    "somewhat",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "without",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl Tone {
    fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            Tone::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Tone::Positive => {
                "Your resume has a positive, confident tone. Keep highlighting your achievements."
            }
            Tone::Neutral => {
                "Your resume reads as neutral. Use stronger, more confident language to showcase your accomplishments."
            }
            Tone::Negative => {
                "Your resume has a negative tone. Reframe challenges as accomplishments and focus on positive outcomes."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub tone: Tone,
    /// Normalized polarity in [-1, 1].
    pub compound: f64,
    pub advice: String,
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let compound = compound_score(text);
        let tone = Tone::from_compound(compound);
        SentimentResult {
            tone,
            compound,
            advice: tone.advice().to_string(),
        }
    }
}

/// Tokens stripped of surrounding punctuation; single characters are dropped.
fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|t| t.chars().count() > 1)
        .collect()
}

fn is_all_caps(token: &str) -> bool {
    token.chars().any(char::is_alphabetic)
        && token
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

fn is_negation(token_lower: &str) -> bool {
    NEGATIONS.contains(&token_lower) || token_lower.ends_with("n't")
}

/// Booster/dampener contribution of `word` toward a sentiment of sign `valence`.
fn booster_scalar(word: &str, valence: f64, caps_differential: bool) -> f64 {
    let lower = word.to_lowercase();
    let mut scalar = if BOOSTERS.contains(&lower.as_str()) {
        BOOST_INCREMENT
    } else if DAMPENERS.contains(&lower.as_str()) {
        BOOST_DECREMENT
    } else {
        return 0.0;
    };
    if valence < 0.0 {
        scalar = -scalar;
    }
    if caps_differential && is_all_caps(word) {
        scalar += if valence > 0.0 {
            CAPS_INCREMENT
        } else {
            -CAPS_INCREMENT
        };
    }
    scalar
}

pub fn compound_score(text: &str) -> f64 {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return 0.0;
    }

    // Caps only add emphasis when the text mixes upper and lower case.
    let caps_count = tokens.iter().filter(|t| is_all_caps(t)).count();
    let caps_differential = caps_count > 0 && caps_count < tokens.len();

    let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let mut sentiments = vec![0.0_f64; tokens.len()];

    for (i, token) in tokens.iter().enumerate() {
        let Some(&base) = LEXICON.get(lowered[i].as_str()) else {
            continue;
        };

        let mut valence = base;
        if caps_differential && is_all_caps(token) {
            valence += if base > 0.0 {
                CAPS_INCREMENT
            } else {
                -CAPS_INCREMENT
            };
        }

        for distance in 1..=3 {
            if i < distance {
                break;
            }
            let prior = tokens[i - distance];
            let damping = match distance {
                1 => 1.0,
                2 => 0.95,
                _ => 0.9,
            };
            valence += booster_scalar(prior, valence, caps_differential) * damping;
        }

        let negated = (1..=3).any(|d| i >= d && is_negation(&lowered[i - d]));
        if negated {
            valence *= NEGATION_SCALAR;
        }

        sentiments[i] = valence;
    }

    // "but" shifts weight toward the clause that follows it.
    if let Some(but_index) = lowered.iter().position(|t| t == "but") {
        for (i, s) in sentiments.iter_mut().enumerate() {
            if i < but_index {
                *s *= 0.5;
            } else if i > but_index {
                *s *= 1.5;
            }
        }
    }

    let mut sum: f64 = sentiments.iter().sum();

    let exclamations = text.matches('!').count().min(4) as f64;
    let emphasis = exclamations * EXCLAMATION_INCREMENT;
    if sum > 0.0 {
        sum += emphasis;
    } else if sum < 0.0 {
        sum -= emphasis;
    }

    normalize(sum)
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> SentimentResult {
        SentimentAnalyzer.analyze(text)
    }

    #[test]
    fn test_achievement_sentence_is_positive() {
        let r = analyze("I achieved great results and exceeded all expectations.");
        assert_eq!(r.tone, Tone::Positive);
        assert!(r.compound >= 0.05);
    }

    #[test]
    fn test_negative_sentence() {
        let r = analyze("The project failed and it was a terrible problem.");
        assert_eq!(r.tone, Tone::Negative);
        assert!(r.compound <= -0.05);
    }

    #[test]
    fn test_keyword_list_is_neutral() {
        let r = analyze("Python SQL Docker Kubernetes Terraform");
        assert_eq!(r.tone, Tone::Neutral);
        assert_eq!(r.compound, 0.0);
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert!(compound_score("good") > 0.0);
        assert!(compound_score("not good") < 0.0);
        assert!(compound_score("wasn't good") < 0.0);
    }

    #[test]
    fn test_booster_increases_intensity() {
        assert!(compound_score("very good") > compound_score("good"));
        assert!(compound_score("slightly good") < compound_score("good"));
    }

    #[test]
    fn test_exclamation_adds_emphasis() {
        assert!(compound_score("great work!!") > compound_score("great work"));
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        let r = analyze("The onboarding was bad but the results were great");
        assert_eq!(r.tone, Tone::Positive);
    }

    #[test]
    fn test_compound_bounded() {
        let gushing = "amazing awesome best great excellent outstanding fantastic love ".repeat(20);
        let c = compound_score(&gushing);
        assert!((-1.0..=1.0).contains(&c));
        assert!(c > 0.9);
    }

    #[test]
    fn test_advice_keyed_by_tone() {
        assert_ne!(Tone::Positive.advice(), Tone::Neutral.advice());
        assert_ne!(Tone::Neutral.advice(), Tone::Negative.advice());
        assert_eq!(analyze("").advice, Tone::Neutral.advice());
    }
}
