//! Heuristic scoring: deterministic 0–100 resume score from text metrics.
//!
//! Policy `continuous-v1`:
//!
//! ```text
//! base            = 50
//! length          = wc < 600 ? clamp(0, 20, (wc - 200) / 20) : clamp(0, 20, 20 - (wc - 600) / 50)
//! readability     = clamp(0, 10, (flesch - 30) / 5)
//! action verbs    = min(10, verbs / 2)
//! bullets         = min(10, bullets / 3)
//! total           = base + length + readability + action verbs + bullets
//! with job title  : total = (total + job_specific_score) / 2
//! score           = round_half_even(clamp(0, 100, total))
//! ```
//!
//! The job-specific score comes from the model (see `AnalysisService::score`);
//! everything in this module is pure.

use serde::{Deserialize, Serialize};

use crate::analysis::metrics::{self, Metrics};

/// Published in every analysis record.
pub const SCORING_POLICY: &str = "continuous-v1";

const BASE_SCORE: f64 = 50.0;
const GOOD_LENGTH_MIN: usize = 300;
const GOOD_LENGTH_MAX: usize = 700;
const EASY_READABILITY: f64 = 50.0;
pub const GOOD_ACTION_VERBS: usize = 10;
pub const GOOD_BULLETS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthVerdict {
    Short,
    Good,
    Long,
}

impl LengthVerdict {
    fn from_word_count(word_count: usize) -> Self {
        if word_count < GOOD_LENGTH_MIN {
            LengthVerdict::Short
        } else if word_count <= GOOD_LENGTH_MAX {
            LengthVerdict::Good
        } else {
            LengthVerdict::Long
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LengthVerdict::Short => "Short",
            LengthVerdict::Good => "Good",
            LengthVerdict::Long => "Long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadabilityVerdict {
    Easy,
    #[serde(rename = "Could be more readable")]
    CouldBeMoreReadable,
}

impl ReadabilityVerdict {
    fn from_flesch(readability: f64) -> Self {
        if readability > EASY_READABILITY {
            ReadabilityVerdict::Easy
        } else {
            ReadabilityVerdict::CouldBeMoreReadable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadabilityVerdict::Easy => "Easy",
            ReadabilityVerdict::CouldBeMoreReadable => "Could be more readable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Always within 0..=100.
    pub score: u8,
    pub length_verdict: LengthVerdict,
    pub readability_verdict: ReadabilityVerdict,
    pub action_verb_note: String,
    pub bullet_note: String,
    /// Model-assisted job fit that was blended in, if a job title was given.
    pub job_specific_score: Option<u32>,
}

/// Scores `text` without a job title. Pure: same text, same breakdown.
pub fn score(text: &str) -> ScoreBreakdown {
    score_breakdown(&metrics::compute(text), None)
}

/// Applies the scoring policy to precomputed metrics, blending in the job fit if present.
pub fn score_breakdown(metrics: &Metrics, job_specific_score: Option<u32>) -> ScoreBreakdown {
    let mut total = base_total(metrics);
    if let Some(job_score) = job_specific_score {
        total = (total + job_score.min(100) as f64) / 2.0;
    }

    ScoreBreakdown {
        score: total.clamp(0.0, 100.0).round_ties_even() as u8,
        length_verdict: LengthVerdict::from_word_count(metrics.word_count),
        readability_verdict: ReadabilityVerdict::from_flesch(metrics.readability),
        action_verb_note: action_verb_note(metrics.action_verb_count),
        bullet_note: bullet_note(metrics.bullet_count),
        job_specific_score,
    }
}

/// Weighted total before any job-fit blending. Ranges over [50, 100].
pub fn base_total(metrics: &Metrics) -> f64 {
    BASE_SCORE
        + length_score(metrics.word_count)
        + readability_bonus(metrics.readability)
        + action_verb_bonus(metrics.action_verb_count)
        + bullet_bonus(metrics.bullet_count)
}

fn length_score(word_count: usize) -> f64 {
    let wc = word_count as f64;
    if word_count < 600 {
        ((wc - 200.0) / 20.0).clamp(0.0, 20.0)
    } else {
        (20.0 - (wc - 600.0) / 50.0).clamp(0.0, 20.0)
    }
}

fn readability_bonus(readability: f64) -> f64 {
    ((readability - 30.0) / 5.0).clamp(0.0, 10.0)
}

fn action_verb_bonus(count: usize) -> f64 {
    (count as f64 / 2.0).min(10.0)
}

fn bullet_bonus(count: usize) -> f64 {
    (count as f64 / 3.0).min(10.0)
}

fn action_verb_note(count: usize) -> String {
    if count >= GOOD_ACTION_VERBS {
        format!("Good use of action verbs ({count} found).")
    } else {
        format!("Use more action verbs: {count} found, aim for at least {GOOD_ACTION_VERBS}.")
    }
}

fn bullet_note(count: usize) -> String {
    if count >= GOOD_BULLETS {
        format!("Good use of bullet points ({count} found).")
    } else {
        format!("Use more bullet points: {count} found, aim for at least {GOOD_BULLETS}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(word_count: usize, readability: f64, verbs: usize, bullets: usize) -> Metrics {
        Metrics {
            word_count,
            bullet_count: bullets,
            action_verb_count: verbs,
            readability,
            digit_count: 0,
        }
    }

    #[test]
    fn test_weighted_total() {
        // 50 + 12.5 + 5 + 4 + 4
        let m = metrics(450, 55.0, 8, 12);
        assert!((base_total(&m) - 75.5).abs() < 1e-9);
        assert_eq!(score_breakdown(&m, None).score, 76);
    }

    #[test]
    fn test_rounds_half_to_even() {
        // 50 + 10 + 0 + 2.5 + 10 = 72.5
        let m = metrics(400, 30.0, 5, 30);
        assert_eq!(score_breakdown(&m, None).score, 72);
    }

    #[test]
    fn test_length_score_curve() {
        assert_eq!(length_score(100), 0.0);
        assert_eq!(length_score(200), 0.0);
        assert!((length_score(599) - 19.95).abs() < 1e-9);
        assert_eq!(length_score(600), 20.0);
        assert_eq!(length_score(1000), 12.0);
        assert_eq!(length_score(2000), 0.0);
    }

    #[test]
    fn test_bonus_caps() {
        assert_eq!(readability_bonus(120.0), 10.0);
        assert_eq!(readability_bonus(-40.0), 0.0);
        assert_eq!(action_verb_bonus(40), 10.0);
        assert_eq!(bullet_bonus(90), 10.0);
    }

    #[test]
    fn test_maximum_is_100() {
        let m = metrics(600, 100.0, 20, 30);
        assert_eq!(score_breakdown(&m, None).score, 100);
        assert_eq!(score_breakdown(&m, Some(100)).score, 100);
    }

    #[test]
    fn test_job_score_blend() {
        // (72.5 + 90) / 2 = 81.25
        let m = metrics(400, 30.0, 5, 30);
        let breakdown = score_breakdown(&m, Some(90));
        assert_eq!(breakdown.score, 81);
        assert_eq!(breakdown.job_specific_score, Some(90));
    }

    #[test]
    fn test_job_score_above_100_is_capped() {
        let m = metrics(600, 100.0, 20, 30);
        assert_eq!(score_breakdown(&m, Some(500)).score, 100);
    }

    #[test]
    fn test_score_always_bounded() {
        let long = "lorem ipsum • ".repeat(2000);
        for text in ["", "word", long.as_str(), "Led. Led. Led."] {
            let s = score(text).score;
            assert!(s <= 100, "score {s} out of range");
            assert!(s >= 50, "no-job score never drops below base");
        }
    }

    #[test]
    fn test_score_is_pure() {
        let text = "Designed and delivered a billing platform.\n• Reduced costs by 30%";
        assert_eq!(score(text), score(text));
    }

    #[test]
    fn test_verdicts() {
        let short = score_breakdown(&metrics(299, 50.0, 0, 0), None);
        assert_eq!(short.length_verdict, LengthVerdict::Short);
        assert_eq!(short.readability_verdict, ReadabilityVerdict::CouldBeMoreReadable);

        let good = score_breakdown(&metrics(700, 50.1, 10, 15), None);
        assert_eq!(good.length_verdict, LengthVerdict::Good);
        assert_eq!(good.readability_verdict, ReadabilityVerdict::Easy);
        assert!(good.action_verb_note.starts_with("Good"));
        assert!(good.bullet_note.starts_with("Good"));

        let long = score_breakdown(&metrics(701, 0.0, 9, 14), None);
        assert_eq!(long.length_verdict, LengthVerdict::Long);
        assert!(long.action_verb_note.starts_with("Use more"));
        assert!(long.bullet_note.starts_with("Use more"));
    }

    #[test]
    fn test_readability_verdict_serializes_as_label() {
        let json = serde_json::to_value(ReadabilityVerdict::CouldBeMoreReadable).unwrap();
        assert_eq!(json, serde_json::json!("Could be more readable"));
        assert_eq!(ReadabilityVerdict::Easy.label(), "Easy");
    }
}
