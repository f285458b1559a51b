//! Response parser: best-effort structured extraction from free-form model output.
//!
//! Every parser:
//! 1. passes a JSON object carrying the result's own fields straight through
//!    (other JSON objects are flattened to text first),
//! 2. otherwise pattern-matches labeled blocks and trigger-word clauses,
//! 3. backfills fixed defaults so the result is never short.
//!
//! Nothing in here returns an error. Falling back to defaults is logged at debug level.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::llm_client::strip_code_fences;

pub const MIN_STRENGTHS: usize = 2;
pub const MIN_AREAS: usize = 2;
pub const MIN_RECOMMENDATIONS: usize = 3;

const MAX_FEEDBACK_ITEMS: usize = 4;
const MAX_RECOMMENDATIONS: usize = 5;
const MAX_SECTION_ITEMS: usize = 5;
const MAX_MISSING_KEYWORDS: usize = 15;
/// Extracted clauses must be longer than this many characters.
const MIN_CLAUSE_CHARS: usize = 10;
const MAX_KEYWORD_WORDS: usize = 5;

/// Score used when the model gives no usable job-fit number.
pub const DEFAULT_JOB_FIT_SCORE: u32 = 60;

const NOT_AVAILABLE: &str = "N/A";

pub const DEFAULT_STRENGTHS: &[&str] = &[
    "Resume covers the core sections employers expect to see.",
    "Experience is presented in a readable, structured format.",
];

pub const DEFAULT_AREAS: &[&str] = &[
    "Quantify more achievements with concrete numbers or percentages.",
    "Tailor your summary and skills to the specific role you are targeting.",
];

pub const DEFAULT_RECOMMENDATIONS: &[&str] = &[
    "Start each bullet point with a strong action verb.",
    "Add measurable results such as numbers, percentages or time saved to your accomplishments.",
    "Mirror key terms from the job description in your skills and experience sections.",
];

const GENERAL_SECTION_ID: &str = "general";
const GENERAL_SECTION_TITLE: &str = "General";
const DEFAULT_SECTION_FEEDBACK: &[&str] = &[
    "Keep formatting and verb tense consistent across all sections.",
    "Proofread for spelling, grammar and punctuation before submitting.",
];

/// Canonical resume sections: id, display title, heading aliases.
const SECTIONS: &[(&str, &str, &[&str])] = &[
    (
        "summary",
        "Summary",
        &["summary", "professional summary", "objective", "profile"],
    ),
    (
        "experience",
        "Experience",
        &[
            "experience",
            "work experience",
            "professional experience",
            "employment",
            "work history",
        ],
    ),
    ("education", "Education", &["education"]),
    (
        "skills",
        "Skills",
        &["skills", "technical skills", "core competencies"],
    ),
    ("projects", "Projects", &["projects"]),
    (
        "certifications",
        "Certifications",
        &["certifications", "certificates"],
    ),
    ("awards", "Awards", &["awards", "honors"]),
    (
        "contact",
        "Contact Information",
        &["contact", "contact information"],
    ),
    ("formatting", "Formatting", &["formatting", "format", "layout"]),
    (
        "grammar",
        "Grammar & Spelling",
        &["grammar", "spelling", "grammar and spelling", "grammar & spelling", "punctuation"],
    ),
];

static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*•+]+|\d{1,2}[.)]|#{1,6})\s*").expect("list marker regex is valid")
});

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9 &/'()-]{0,40}):\s*(.*)$").expect("header regex is valid")
});

// Clause openers. "Strengthen ..." is advice, not a strength.
static STRENGTH_TRIGGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^strengths?\b").expect("strength trigger regex is valid"));

static AREA_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:weakness(?:es)?|areas? (?:for|to) improve(?:ment)?|improvements?)\b")
        .expect("area trigger regex is valid")
});

static RECOMMENDATION_TRIGGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:recommend|suggest|consider)").expect("recommendation trigger regex is valid")
});

static STRENGTH_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bstrengths?\b").expect("strength label regex is valid"));

static SCORE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3})\s*(?:/\s*100\b|%)").expect("score token regex is valid")
});

static JOB_FIT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3})(?:\s*/\s*100)?\b").expect("job fit regex is valid")
});

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// ATS keyword-match score: a number, or "N/A" when the model gave none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchScore {
    Score(u8),
    #[default]
    NotAvailable,
}

impl Serialize for MatchScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MatchScore::Score(n) => serializer.serialize_u8(*n),
            MatchScore::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for MatchScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) if n <= 100 => Ok(MatchScore::Score(n as u8)),
            Raw::Float(f) if (0.0..=100.0).contains(&f) => Ok(MatchScore::Score(f.round() as u8)),
            Raw::Int(n) => Err(D::Error::custom(format!("match score {n} exceeds 100"))),
            Raw::Float(f) => Err(D::Error::custom(format!("match score {f} out of range"))),
            Raw::Text(t) => Ok(extract_match_score(&t)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtsResult {
    #[serde(alias = "keyword_match", alias = "match_score")]
    pub keyword_match_score: MatchScore,
    /// Deduplicated, in first-seen order.
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentFeedback {
    pub strengths: Vec<String>,
    #[serde(alias = "weaknesses")]
    pub areas_for_improvement: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionFeedback {
    pub title: String,
    pub feedback: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarFeedback {
    pub section_feedback: BTreeMap<String, SectionFeedback>,
    pub recommendations: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Public parsers
// ────────────────────────────────────────────────────────────────────────────

const ATS_FIELDS: &[&str] = &[
    "keyword_match_score",
    "keyword_match",
    "match_score",
    "missing_keywords",
    "recommendations",
];
const SENTIMENT_FIELDS: &[&str] = &["strengths", "areas_for_improvement", "weaknesses"];
const GRAMMAR_FIELDS: &[&str] = &["section_feedback", "recommendations"];

pub fn parse_ats(text: &str) -> AtsResult {
    let mut result = match read_reply::<AtsResult>(text, ATS_FIELDS) {
        Reply::Structured(result) => result,
        Reply::Text(text) => AtsResult {
            keyword_match_score: extract_match_score(&text),
            missing_keywords: extract_missing_keywords(&text),
            recommendations: extract_recommendations(&text),
        },
    };
    result.missing_keywords = dedup_keywords(result.missing_keywords);
    backfill(
        &mut result.recommendations,
        DEFAULT_RECOMMENDATIONS,
        MIN_RECOMMENDATIONS,
        "ats.recommendations",
    );
    result
}

pub fn parse_sentiment(text: &str) -> SentimentFeedback {
    let mut result = match read_reply::<SentimentFeedback>(text, SENTIMENT_FIELDS) {
        Reply::Structured(result) => result,
        Reply::Text(text) => {
            let strengths = labeled_block_items(&text, |label| STRENGTH_LABEL.is_match(label))
                .into_iter()
                .chain(trigger_clauses(&text, &STRENGTH_TRIGGER))
                .collect();
            let areas = labeled_block_items(&text, |label| {
                label.contains("weakness") || label.contains("improve")
            })
            .into_iter()
            .chain(trigger_clauses(&text, &AREA_TRIGGER))
            .collect();

            SentimentFeedback {
                strengths: finish_clauses(strengths, MAX_FEEDBACK_ITEMS),
                areas_for_improvement: finish_clauses(areas, MAX_FEEDBACK_ITEMS),
            }
        }
    };
    backfill(
        &mut result.strengths,
        DEFAULT_STRENGTHS,
        MIN_STRENGTHS,
        "strengths",
    );
    backfill(
        &mut result.areas_for_improvement,
        DEFAULT_AREAS,
        MIN_AREAS,
        "areas_for_improvement",
    );
    result
}

pub fn parse_grammar(text: &str) -> GrammarFeedback {
    let mut result = match read_reply::<GrammarFeedback>(text, GRAMMAR_FIELDS) {
        Reply::Structured(result) => result,
        Reply::Text(text) => GrammarFeedback {
            section_feedback: extract_section_feedback(&text),
            recommendations: extract_recommendations(&text),
        },
    };
    if result.section_feedback.is_empty() {
        debug!(category = "section_feedback", "response parser applied defaults");
        result
            .section_feedback
            .insert(GENERAL_SECTION_ID.to_string(), default_section_feedback());
    }
    backfill(
        &mut result.recommendations,
        DEFAULT_RECOMMENDATIONS,
        MIN_RECOMMENDATIONS,
        "grammar.recommendations",
    );
    result
}

/// First 1–3 digit integer no greater than 100, optionally written as `N/100`.
/// Falls back to `DEFAULT_JOB_FIT_SCORE`.
pub fn parse_job_fit_score(text: &str) -> u32 {
    JOB_FIT_TOKEN
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .find(|n| *n <= 100)
        .unwrap_or_else(|| {
            debug!(category = "job_fit", "response parser applied defaults");
            DEFAULT_JOB_FIT_SCORE
        })
}

/// Appends defaults (skipping ones already present) until `items` holds `min` entries.
pub fn backfill(items: &mut Vec<String>, defaults: &[&str], min: usize, category: &str) {
    if items.len() >= min {
        return;
    }
    let before = items.len();
    for default in defaults {
        if items.len() >= min {
            break;
        }
        if !items.iter().any(|i| i == default) {
            items.push(default.to_string());
        }
    }
    debug!(
        category,
        added = items.len() - before,
        "response parser applied defaults"
    );
}

/// Removes fixed default entries, leaving only extracted content.
pub fn without_defaults(items: Vec<String>, defaults: &[&str]) -> Vec<String> {
    items
        .into_iter()
        .filter(|i| !defaults.contains(&i.as_str()))
        .collect()
}

pub fn default_section_feedback() -> SectionFeedback {
    SectionFeedback {
        title: GENERAL_SECTION_TITLE.to_string(),
        feedback: DEFAULT_SECTION_FEEDBACK.iter().map(|s| s.to_string()).collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction helpers
// ────────────────────────────────────────────────────────────────────────────

enum Reply<'a, T> {
    Structured(T),
    Text(Cow<'a, str>),
}

/// Classifies a model reply.
///
/// A JSON object (optionally fenced) passes straight through when, after key
/// normalization, it carries at least one of `fields`. Any other object is
/// flattened to labeled text so the extractors can still read it. Everything
/// else is plain text.
fn read_reply<'a, T: DeserializeOwned>(text: &'a str, fields: &[&str]) -> Reply<'a, T> {
    let body = strip_code_fences(text);
    if !body.starts_with('{') {
        return Reply::Text(Cow::Borrowed(text));
    }
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
        return Reply::Text(Cow::Borrowed(text));
    };

    let normalized: Map<String, Value> = object
        .iter()
        .map(|(key, value)| (normalize_key(key), value.clone()))
        .collect();
    if fields.iter().any(|f| normalized.contains_key(*f)) {
        match serde_json::from_value(Value::Object(normalized)) {
            Ok(result) => return Reply::Structured(result),
            Err(e) => debug!(error = %e, "structured reply did not fit, reading as text"),
        }
    }

    let mut flattened = String::new();
    flatten_json(&Value::Object(object), None, &mut flattened);
    Reply::Text(Cow::Owned(flattened))
}

/// "Missing Keywords" and "missing-keywords" both become `missing_keywords`.
fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Renders JSON as heading lines and list items, the layout the extractors expect.
fn flatten_json(value: &Value, key: Option<&str>, out: &mut String) {
    match value {
        Value::Object(object) => {
            if let Some(key) = key {
                out.push_str(&format!("{key}:\n"));
            }
            for (child_key, child) in object {
                flatten_json(child, Some(child_key), out);
            }
        }
        Value::Array(items) => {
            if let Some(key) = key {
                out.push_str(&format!("{key}:\n"));
            }
            for item in items {
                match item {
                    Value::String(s) => out.push_str(&format!("- {s}\n")),
                    Value::Object(_) | Value::Array(_) => flatten_json(item, None, out),
                    other => out.push_str(&format!("- {other}\n")),
                }
            }
            out.push('\n');
        }
        Value::String(s) => {
            if let Some(key) = key {
                out.push_str(&format!("{key}:\n"));
            }
            out.push_str(s);
            out.push_str("\n\n");
        }
        Value::Null => {}
        other => match key {
            Some(key) => out.push_str(&format!("{key}: {other}\n\n")),
            None => out.push_str(&format!("{other}\n")),
        },
    }
}

/// Trimmed, non-empty, case-insensitively unique (first seen wins), capped.
fn dedup_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .take(MAX_MISSING_KEYWORDS)
        .collect()
}

fn extract_match_score(text: &str) -> MatchScore {
    SCORE_TOKEN
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u8>().ok())
        .find(|n| *n <= 100)
        .map(MatchScore::Score)
        .unwrap_or(MatchScore::NotAvailable)
}

fn extract_missing_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    labeled_block_items(text, |label| {
        label.contains("missing") && label.contains("keyword")
    })
    .iter()
    .flat_map(|item| item.split([',', ';']))
    .map(|k| k.trim().trim_start_matches("and ").trim_end_matches('.').trim())
    .filter(|k| !k.is_empty() && k.split_whitespace().count() <= MAX_KEYWORD_WORDS)
    .filter(|k| seen.insert(k.to_lowercase()))
    .take(MAX_MISSING_KEYWORDS)
    .map(String::from)
    .collect()
}

fn extract_recommendations(text: &str) -> Vec<String> {
    let candidates = labeled_block_items(text, |label| {
        label.contains("recommend") || label.contains("suggest")
    })
    .into_iter()
    .chain(trigger_clauses(text, &RECOMMENDATION_TRIGGER))
    .collect();
    finish_clauses(candidates, MAX_RECOMMENDATIONS)
}

fn extract_section_feedback(text: &str) -> BTreeMap<String, SectionFeedback> {
    let mut collected: BTreeMap<&'static str, (&'static str, Vec<String>)> = BTreeMap::new();
    let mut current: Option<(&'static str, &'static str)> = None;

    for raw in text.lines() {
        let line = clean_line(raw);
        if line.is_empty() {
            continue;
        }

        if let Some((label, rest)) = split_header(&line) {
            if let Some((id, title)) = section_for(label) {
                current = Some((id, title));
                let entry = collected.entry(id).or_insert((title, Vec::new()));
                if !rest.is_empty() {
                    entry.1.push(rest.to_string());
                }
                continue;
            }
            if rest.is_empty() {
                // A non-section heading such as "Recommendations:" closes the section.
                current = None;
                continue;
            }
        } else if let Some((id, title)) = section_for(line.trim_end_matches(':')) {
            current = Some((id, title));
            collected.entry(id).or_insert((title, Vec::new()));
            continue;
        }

        if let Some((id, title)) = current {
            collected
                .entry(id)
                .or_insert((title, Vec::new()))
                .1
                .push(line);
        }
    }

    collected
        .into_iter()
        .filter_map(|(id, (title, items))| {
            let feedback = finish_clauses(items, MAX_SECTION_ITEMS);
            (!feedback.is_empty()).then(|| {
                (
                    id.to_string(),
                    SectionFeedback {
                        title: title.to_string(),
                        feedback,
                    },
                )
            })
        })
        .collect()
}

fn section_for(label: &str) -> Option<(&'static str, &'static str)> {
    let normalized = label.trim().to_lowercase();
    let normalized = normalized
        .strip_suffix(" section")
        .unwrap_or(&normalized)
        .trim();
    SECTIONS
        .iter()
        .find(|(_, _, aliases)| aliases.contains(&normalized))
        .map(|(id, title, _)| (*id, *title))
}

/// Items listed under a heading whose lowercase label satisfies `matches_label`.
///
/// The heading's inline remainder counts as an item. When the heading had
/// inline content only list-marker lines continue the block. A blank line ends
/// a block that already holds items; any other heading line ends it too.
fn labeled_block_items(text: &str, matches_label: impl Fn(&str) -> bool) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_block = false;
    let mut inline_header = false;
    let mut block_len = 0;

    for raw in text.lines() {
        let line = clean_line(raw);
        let is_list_item = LIST_MARKER.is_match(raw) && !raw.trim_start().starts_with('#');

        if line.is_empty() {
            if in_block && block_len > 0 {
                in_block = false;
            }
            continue;
        }

        if let Some((label, rest)) = split_header(&line) {
            if matches_label(&label.to_lowercase()) {
                in_block = true;
                inline_header = !rest.is_empty();
                block_len = 0;
                if inline_header {
                    items.push(rest.to_string());
                    block_len += 1;
                }
                continue;
            }
            if in_block && (rest.is_empty() || !is_list_item) {
                in_block = false;
                continue;
            }
        }

        if in_block {
            if inline_header && !is_list_item {
                in_block = false;
                continue;
            }
            items.push(line);
            block_len += 1;
        }
    }

    items
}

/// Sentences that open with `trigger`, with any "label:" prefix removed.
fn trigger_clauses(text: &str, trigger: &Regex) -> Vec<String> {
    text.lines()
        .map(clean_line)
        .flat_map(|line| {
            split_sentences(&line)
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .filter(|clause| trigger.is_match(clause))
        .map(|clause| strip_label(&clause).to_string())
        .collect()
}

/// Trims, drops short clauses, dedupes case-insensitively (first seen wins), caps at `max`.
fn finish_clauses(candidates: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| c.chars().count() > MIN_CLAUSE_CHARS)
        .filter(|c| seen.insert(c.to_lowercase()))
        .take(max)
        .collect()
}

/// Removes list markers and markdown emphasis.
fn clean_line(line: &str) -> String {
    LIST_MARKER
        .replace(line, "")
        .replace("**", "")
        .replace("__", "")
        .trim()
        .to_string()
}

fn split_header(line: &str) -> Option<(&str, &str)> {
    HEADER.captures(line).map(|c| {
        let label = c.get(1).map_or("", |m| m.as_str()).trim();
        let rest = c.get(2).map_or("", |m| m.as_str()).trim();
        (label, rest)
    })
}

fn strip_label(clause: &str) -> &str {
    match split_header(clause) {
        Some((_, rest)) => rest,
        None => clause,
    }
}

/// Splits at `.`, `!` or `?` followed by whitespace; "3.5" stays intact.
fn split_sentences(line: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            let end = i + c.len_utf8();
            let sentence = line[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = line[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}
