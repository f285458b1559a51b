// Prompt templates for the analysis pipeline.
// The resume-assistant preamble from llm_client::prompts is prepended by the client.
// Replies are free text; analysis::parser turns them into structured results.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Job-fit prompt. Replace `{job_title}` and `{resume_text}` before sending.
pub const JOB_FIT_PROMPT_TEMPLATE: &str = "\
On a scale of 0 to 100, how well does the following resume fit a {job_title} role?
Start your answer with the score written as N/100, then give one sentence of justification.

RESUME:
{resume_text}";

/// Tone critique prompt. Replace `{tone}`, `{compound}` and `{resume_text}` before sending.
pub const TONE_FEEDBACK_PROMPT_TEMPLATE: &str = "\
The resume below reads with a {tone} tone (compound sentiment {compound}).
List its strengths and weaknesses as a recruiter would see them.

Use exactly this layout:
Strengths:
- ...
Weaknesses:
- ...

RESUME:
{resume_text}";

/// Section-by-section writing critique. Replace `{resume_text}` before sending.
pub const GRAMMAR_PROMPT_TEMPLATE: &str = "\
Check the resume below for grammar, spelling, tense consistency and style.
Group your feedback under the resume section it applies to (Summary, Experience, Education, \
Skills, Projects, Certifications), one bullet per issue, with the section name as a heading.
Finish with a \"Recommendations:\" list of the most important changes.

RESUME:
{resume_text}";

/// ATS comparison prompt. Replace `{job_description}` and `{resume_text}` before sending.
pub const ATS_PROMPT_TEMPLATE: &str = "\
Compare the resume to the job description the way an Applicant Tracking System would.

Reply in exactly this layout:
Keyword match: N/100
Missing keywords: comma-separated list of important job description terms absent from the resume
Recommendations:
- ...

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"));

/// Fills every `{name}` placeholder in one pass, so substituted values are never
/// rescanned. Placeholders without a value are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_all_placeholders() {
        let prompt = fill_template(
            JOB_FIT_PROMPT_TEMPLATE,
            &[("job_title", "Data Engineer"), ("resume_text", "Built ETL pipelines")],
        );
        assert!(prompt.contains("fit a Data Engineer role"));
        assert!(prompt.ends_with("Built ETL pipelines"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let prompt = fill_template(
            JOB_FIT_PROMPT_TEMPLATE,
            &[("job_title", "{resume_text} Lead"), ("resume_text", "Built ETL pipelines")],
        );
        assert!(prompt.contains("fit a {resume_text} Lead role"));
        assert_eq!(prompt.matches("Built ETL pipelines").count(), 1);
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        assert_eq!(fill_template("{tone} and {other}", &[("tone", "neutral")]), "neutral and {other}");
    }
}
