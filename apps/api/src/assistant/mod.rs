// Resume assistant: free-form chat and resume export through the model.
// Unlike the analysis pipeline, a failed model call here is surfaced to the caller.

pub mod handlers;
pub mod prompts;
