// Prompt templates for the resume assistant.

/// Appended to a chat prompt when the caller references a stored resume.
/// Replace `{resume_text}` before sending.
pub const RESUME_CONTEXT_TEMPLATE: &str = "

For reference, here is my current resume:
{resume_text}";

/// Opening of the export prompt; one `\n{section}:\n{content}\n` block follows per section.
pub const EXPORT_PROMPT_HEADER: &str =
    "Generate a complete, properly formatted resume using the following information:\n";

pub const EXPORT_PROMPT_FOOTER: &str =
    "\nFormat this as a professional resume with proper sections and formatting.";
