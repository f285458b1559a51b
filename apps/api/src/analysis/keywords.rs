//! Keyword extraction: matches free text against a fixed, extensible vocabulary.
//!
//! Matching is substring-based on lowercased text. A vocabulary entry carries
//! one or more stems so that "developer" yields `development`.

use std::collections::BTreeSet;

/// A canonical keyword and the lowercase stems that count as a hit for it.
#[derive(Debug, Clone)]
pub struct VocabularyEntry {
    pub keyword: String,
    pub stems: Vec<String>,
}

impl VocabularyEntry {
    fn new(keyword: &str, stems: &[&str]) -> Self {
        Self {
            keyword: keyword.to_string(),
            stems: stems.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matches(&self, text_lower: &str) -> bool {
        self.stems.iter().any(|stem| text_lower.contains(stem.as_str()))
    }

    /// Byte offset of the earliest stem hit.
    fn first_position(&self, text_lower: &str) -> Option<usize> {
        self.stems
            .iter()
            .filter_map(|stem| text_lower.find(stem.as_str()))
            .min()
    }
}

const DEFAULT_VOCABULARY: &[(&str, &[&str])] = &[
    ("python", &["python"]),
    ("java", &["java"]),
    ("javascript", &["javascript"]),
    ("agile", &["agile"]),
    ("scrum", &["scrum"]),
    ("leadership", &["leadership", "leader"]),
    ("development", &["develop"]),
    ("software", &["software"]),
    ("engineering", &["engineer"]),
    ("team", &["team"]),
    ("project", &["project"]),
    ("sql", &["sql"]),
    ("cloud", &["cloud"]),
    ("communication", &["communicat"]),
    ("management", &["manag"]),
];

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    vocabulary: Vec<VocabularyEntry>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            vocabulary: DEFAULT_VOCABULARY
                .iter()
                .map(|(keyword, stems)| VocabularyEntry::new(keyword, stems))
                .collect(),
        }
    }
}

impl KeywordExtractor {
    /// Default vocabulary plus `extra` keywords, each matched on its own lowercase form.
    /// Blank and duplicate entries are ignored.
    pub fn with_extra_keywords(extra: &[String]) -> Self {
        let mut extractor = Self::default();
        for raw in extra {
            let keyword = raw.trim().to_lowercase();
            if keyword.is_empty() || extractor.vocabulary.iter().any(|e| e.keyword == keyword) {
                continue;
            }
            extractor.vocabulary.push(VocabularyEntry {
                stems: vec![keyword.clone()],
                keyword,
            });
        }
        extractor
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary keywords present in `text`.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let lower = text.to_lowercase();
        self.vocabulary
            .iter()
            .filter(|entry| entry.matches(&lower))
            .map(|entry| entry.keyword.clone())
            .collect()
    }

    /// Vocabulary keywords present in `text`, ordered by first occurrence.
    /// Keywords first seen at the same offset keep vocabulary order.
    pub fn extract_in_order(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut hits: Vec<(usize, &VocabularyEntry)> = self
            .vocabulary
            .iter()
            .filter_map(|entry| entry.first_position(&lower).map(|pos| (pos, entry)))
            .collect();
        hits.sort_by_key(|(pos, _)| *pos);
        hits.into_iter().map(|(_, entry)| entry.keyword.clone()).collect()
    }

    /// How many of `keywords` appear in `resume_text`.
    pub fn match_count(&self, resume_text: &str, keywords: &[String]) -> usize {
        let lower = resume_text.to_lowercase();
        keywords
            .iter()
            .filter(|kw| self.keyword_present(kw, &lower))
            .count()
    }

    /// Keywords of `keywords` that `resume_text` does not mention, in the order given.
    pub fn missing(&self, resume_text: &str, keywords: &[String]) -> Vec<String> {
        let lower = resume_text.to_lowercase();
        keywords
            .iter()
            .filter(|kw| !self.keyword_present(kw, &lower))
            .cloned()
            .collect()
    }

    // Keywords outside the vocabulary fall back to a plain substring test.
    fn keyword_present(&self, keyword: &str, text_lower: &str) -> bool {
        match self.vocabulary.iter().find(|e| e.keyword == keyword) {
            Some(entry) => entry.matches(text_lower),
            None => text_lower.contains(&keyword.to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_job_posting() {
        let kw = KeywordExtractor::default()
            .extract("Looking for a Python developer with Agile experience");
        assert!(kw.contains("python"));
        assert!(kw.contains("agile"));
        assert!(kw.contains("development"));
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        let kw = KeywordExtractor::default().extract("SCRUM master, TEAM lead");
        assert!(kw.contains("scrum"));
        assert!(kw.contains("team"));
    }

    #[test]
    fn test_javascript_also_matches_java() {
        // Substring semantics: "java" is inside "javascript".
        let kw = KeywordExtractor::default().extract("JavaScript");
        assert!(kw.contains("javascript"));
        assert!(kw.contains("java"));
    }

    #[test]
    fn test_no_matches_is_empty() {
        assert!(KeywordExtractor::default().extract("gardening and baking").is_empty());
    }

    #[test]
    fn test_match_count_and_missing() {
        let extractor = KeywordExtractor::default();
        let wanted = extractor.extract_in_order("Senior software engineer, Python, Scrum");
        let resume = "Developed Python services for a software company";

        assert_eq!(extractor.match_count(resume, &wanted), 2);
        let missing = extractor.missing(resume, &wanted);
        assert_eq!(missing, vec!["engineering", "scrum"]);
    }

    #[test]
    fn test_extract_in_order_follows_text() {
        let kw = KeywordExtractor::default()
            .extract_in_order("Scrum master with Python and agile team experience");
        assert_eq!(kw, vec!["scrum", "python", "agile", "team"]);
    }

    #[test]
    fn test_missing_keeps_job_description_order() {
        let extractor = KeywordExtractor::default();
        let wanted =
            extractor.extract_in_order("Scrum master with Python and agile team experience");
        assert_eq!(
            extractor.missing("Gardening", &wanted),
            vec!["scrum", "python", "agile", "team"]
        );
    }

    #[test]
    fn test_extract_in_order_ties_keep_vocabulary_order() {
        let kw = KeywordExtractor::default().extract_in_order("JavaScript and SQL");
        assert_eq!(kw, vec!["java", "javascript", "sql"]);
    }

    #[test]
    fn test_extra_keywords_extend_vocabulary() {
        let extractor =
            KeywordExtractor::with_extra_keywords(&["Kubernetes".to_string(), " ".to_string()]);
        assert_eq!(extractor.vocabulary_len(), DEFAULT_VOCABULARY.len() + 1);
        assert!(extractor.extract("kubernetes clusters").contains("kubernetes"));
    }

    #[test]
    fn test_extra_keyword_duplicates_ignored() {
        let extractor = KeywordExtractor::with_extra_keywords(&["Python".to_string()]);
        assert_eq!(extractor.vocabulary_len(), DEFAULT_VOCABULARY.len());
    }
}
