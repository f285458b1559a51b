//! Analysis pipeline: runs the heuristic and model-assisted steps over one
//! resume and assembles the aggregate `AnalysisRecord`.
//!
//! Steps, in merge order:
//! 1. heuristic score (model-assisted job fit only when a job title is given)
//! 2. sentiment, then a model critique of strengths and weaknesses
//! 3. model grammar/style critique per section
//! 4. model ATS comparison, only when a job description is given
//!
//! Every model call is bounded by a timeout. A failed or timed-out call is
//! logged and replaced by the parser's defaults, so one step never aborts
//! the others.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::keywords::KeywordExtractor;
use crate::analysis::metrics::{self, Metrics};
use crate::analysis::parser::{
    backfill, parse_ats, parse_grammar, parse_job_fit_score, parse_sentiment, without_defaults,
    AtsResult, GrammarFeedback, SectionFeedback, SentimentFeedback, DEFAULT_AREAS,
    DEFAULT_JOB_FIT_SCORE, DEFAULT_RECOMMENDATIONS, DEFAULT_STRENGTHS, MIN_AREAS,
    MIN_RECOMMENDATIONS, MIN_STRENGTHS,
};
use crate::analysis::prompts::{
    fill_template, ATS_PROMPT_TEMPLATE, GRAMMAR_PROMPT_TEMPLATE, JOB_FIT_PROMPT_TEMPLATE,
    TONE_FEEDBACK_PROMPT_TEMPLATE,
};
use crate::analysis::scoring::{
    self, LengthVerdict, ReadabilityVerdict, ScoreBreakdown, GOOD_ACTION_VERBS, GOOD_BULLETS,
    SCORING_POLICY,
};
use crate::analysis::sentiment::{SentimentAnalyzer, SentimentResult, Tone};
use crate::llm_client::{CompletionClient, CompletionError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Request / record types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

/// Human-readable summaries of the metrics, one per heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    pub length: String,
    pub readability: String,
    pub action_verbs: String,
    pub bullet_points: String,
    pub quantification: String,
    pub keywords: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub score: u8,
    pub scoring_policy: String,
    pub metrics: Metrics,
    pub details: AnalysisDetails,
    pub sentiment: SentimentResult,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub section_feedback: BTreeMap<String, SectionFeedback>,
    pub recommendations: Vec<String>,
    /// `None` when no job description was supplied.
    pub ats: Option<AtsResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

pub struct AnalysisService {
    llm: Arc<dyn CompletionClient>,
    keywords: KeywordExtractor,
    sentiment: SentimentAnalyzer,
    model_timeout: Duration,
}

impl AnalysisService {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        keywords: KeywordExtractor,
        model_timeout: Duration,
    ) -> Self {
        Self {
            llm,
            keywords,
            sentiment: SentimentAnalyzer,
            model_timeout,
        }
    }

    /// Full analysis of one resume. Only empty resume text is an error; every
    /// model failure degrades to defaults.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisRecord, AnalysisError> {
        let resume_text = request.resume_text.trim();
        if resume_text.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "resume_text cannot be empty".to_string(),
            ));
        }
        let job_title = non_blank(request.job_title.as_deref());
        let job_description = non_blank(request.job_description.as_deref());

        info!(
            words = resume_text.split_whitespace().count(),
            has_job_title = job_title.is_some(),
            has_job_description = job_description.is_some(),
            "Starting resume analysis"
        );

        let metrics = metrics::compute(resume_text);
        let breakdown = self.score_metrics(resume_text, &metrics, job_title).await;

        let sentiment = self.sentiment.analyze(resume_text);
        let tone = self.tone_feedback(resume_text, &sentiment).await;

        let grammar = self.grammar_feedback(resume_text).await;

        let ats = match job_description {
            Some(jd) => Some(self.ats_feedback(resume_text, jd).await),
            None => None,
        };

        let mut strengths = without_defaults(tone.strengths, DEFAULT_STRENGTHS);
        extend_unique(&mut strengths, heuristic_strengths(&metrics, &breakdown, &sentiment));
        backfill(&mut strengths, DEFAULT_STRENGTHS, MIN_STRENGTHS, "analysis.strengths");

        let mut areas = without_defaults(tone.areas_for_improvement, DEFAULT_AREAS);
        extend_unique(&mut areas, heuristic_areas(&metrics, &breakdown, &sentiment));
        backfill(&mut areas, DEFAULT_AREAS, MIN_AREAS, "analysis.areas_for_improvement");

        let mut recommendations = without_defaults(grammar.recommendations, DEFAULT_RECOMMENDATIONS);
        if let Some(ats) = &ats {
            if recommendations.len() < MIN_RECOMMENDATIONS {
                extend_unique(&mut recommendations, ats.recommendations.iter().cloned());
            }
        }
        backfill(
            &mut recommendations,
            DEFAULT_RECOMMENDATIONS,
            MIN_RECOMMENDATIONS,
            "analysis.recommendations",
        );

        let matched_keywords = self.keywords.extract(resume_text);

        info!(score = breakdown.score, "Resume analysis complete");

        Ok(AnalysisRecord {
            score: breakdown.score,
            scoring_policy: SCORING_POLICY.to_string(),
            details: build_details(&metrics, &breakdown, &matched_keywords),
            metrics,
            sentiment,
            strengths,
            areas_for_improvement: areas,
            section_feedback: grammar.section_feedback,
            recommendations,
            ats,
        })
    }

    /// Heuristic score, blended with the model's job-fit estimate when `job_title` is non-blank.
    pub async fn score(&self, text: &str, job_title: Option<&str>) -> ScoreBreakdown {
        match non_blank(job_title) {
            Some(title) => {
                let metrics = metrics::compute(text);
                self.score_metrics(text, &metrics, Some(title)).await
            }
            None => scoring::score(text),
        }
    }

    /// Per-section writing critique. Never fails; falls back to defaults.
    pub async fn grammar_feedback(&self, text: &str) -> GrammarFeedback {
        let prompt = fill_template(GRAMMAR_PROMPT_TEMPLATE, &[("resume_text", text)]);
        let reply = self.ask("grammar", &prompt).await.unwrap_or_default();
        parse_grammar(&reply)
    }

    /// ATS-style comparison. Missing keywords fall back to vocabulary keywords
    /// from the job description that the resume lacks.
    pub async fn ats_feedback(&self, resume_text: &str, job_description: &str) -> AtsResult {
        let prompt = fill_template(
            ATS_PROMPT_TEMPLATE,
            &[("job_description", job_description), ("resume_text", resume_text)],
        );
        let reply = self.ask("ats", &prompt).await.unwrap_or_default();
        let mut result = parse_ats(&reply);

        let wanted = self.keywords.extract_in_order(job_description);
        debug!(
            wanted = wanted.len(),
            matched = self.keywords.match_count(resume_text, &wanted),
            "Vocabulary keywords in job description"
        );
        if result.missing_keywords.is_empty() {
            result.missing_keywords = self.keywords.missing(resume_text, &wanted);
        }
        result
    }

    async fn tone_feedback(&self, text: &str, sentiment: &SentimentResult) -> SentimentFeedback {
        let tone = match sentiment.tone {
            Tone::Positive => "positive",
            Tone::Neutral => "neutral",
            Tone::Negative => "negative",
        };
        let compound = format!("{:.2}", sentiment.compound);
        let prompt = fill_template(
            TONE_FEEDBACK_PROMPT_TEMPLATE,
            &[("tone", tone), ("compound", &compound), ("resume_text", text)],
        );
        let reply = self.ask("sentiment", &prompt).await.unwrap_or_default();
        parse_sentiment(&reply)
    }

    async fn score_metrics(
        &self,
        text: &str,
        metrics: &Metrics,
        job_title: Option<&str>,
    ) -> ScoreBreakdown {
        let job_specific_score = match job_title {
            Some(title) => Some(self.job_fit_score(text, title).await),
            None => None,
        };
        scoring::score_breakdown(metrics, job_specific_score)
    }

    async fn job_fit_score(&self, text: &str, job_title: &str) -> u32 {
        let prompt = fill_template(
            JOB_FIT_PROMPT_TEMPLATE,
            &[("job_title", job_title), ("resume_text", text)],
        );
        match self.ask("job_fit", &prompt).await {
            Some(reply) => parse_job_fit_score(&reply),
            None => DEFAULT_JOB_FIT_SCORE,
        }
    }

    /// One bounded model call. `None` means the caller should use its fallback.
    async fn ask(&self, step: &'static str, prompt: &str) -> Option<String> {
        let outcome = tokio::time::timeout(self.model_timeout, self.llm.complete(prompt))
            .await
            .unwrap_or(Err(CompletionError::Timeout(self.model_timeout)));

        match outcome {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!(step, "Model call failed, using fallback: {e}");
                None
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Merge helpers
// ────────────────────────────────────────────────────────────────────────────

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn extend_unique(items: &mut Vec<String>, extra: impl IntoIterator<Item = String>) {
    for item in extra {
        if !items.contains(&item) {
            items.push(item);
        }
    }
}

fn heuristic_strengths(
    metrics: &Metrics,
    breakdown: &ScoreBreakdown,
    sentiment: &SentimentResult,
) -> Vec<String> {
    let mut out = Vec::new();
    if breakdown.length_verdict == LengthVerdict::Good {
        out.push(format!(
            "Resume length is in the ideal range ({} words).",
            metrics.word_count
        ));
    }
    if breakdown.readability_verdict == ReadabilityVerdict::Easy {
        out.push("Content is easy to read.".to_string());
    }
    if metrics.action_verb_count >= GOOD_ACTION_VERBS {
        out.push(breakdown.action_verb_note.clone());
    }
    if metrics.bullet_count >= GOOD_BULLETS {
        out.push(breakdown.bullet_note.clone());
    }
    if sentiment.tone == Tone::Positive {
        out.push("Confident, positive tone.".to_string());
    }
    out
}

fn heuristic_areas(
    metrics: &Metrics,
    breakdown: &ScoreBreakdown,
    sentiment: &SentimentResult,
) -> Vec<String> {
    let mut out = Vec::new();
    match breakdown.length_verdict {
        LengthVerdict::Short => out.push(format!(
            "Resume is short ({} words); expand on your experience and achievements.",
            metrics.word_count
        )),
        LengthVerdict::Long => out.push(format!(
            "Resume is long ({} words); trim it toward 300-700 words.",
            metrics.word_count
        )),
        LengthVerdict::Good => {}
    }
    if breakdown.readability_verdict == ReadabilityVerdict::CouldBeMoreReadable {
        out.push(format!(
            "Simplify sentences to improve readability (reading ease {:.1}).",
            metrics.readability
        ));
    }
    if metrics.action_verb_count < GOOD_ACTION_VERBS {
        out.push(breakdown.action_verb_note.clone());
    }
    if metrics.bullet_count < GOOD_BULLETS {
        out.push(breakdown.bullet_note.clone());
    }
    if sentiment.tone != Tone::Positive {
        out.push(sentiment.advice.clone());
    }
    out
}

fn build_details(
    metrics: &Metrics,
    breakdown: &ScoreBreakdown,
    matched_keywords: &BTreeSet<String>,
) -> AnalysisDetails {
    AnalysisDetails {
        length: format!(
            "{} words ({})",
            metrics.word_count,
            breakdown.length_verdict.label()
        ),
        readability: format!(
            "Reading ease {:.1} ({})",
            metrics.readability,
            breakdown.readability_verdict.label()
        ),
        action_verbs: breakdown.action_verb_note.clone(),
        bullet_points: breakdown.bullet_note.clone(),
        quantification: format!(
            "{} digits used to quantify achievements.",
            metrics.digit_count
        ),
        keywords: if matched_keywords.is_empty() {
            "No common industry keywords found.".to_string()
        } else {
            format!(
                "Matched keywords: {}.",
                matched_keywords
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        },
    }
}
