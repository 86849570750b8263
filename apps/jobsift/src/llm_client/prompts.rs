// Shared prompt fragments and prompt-building utilities.
// Each service that asks the reasoning service questions keeps its own prompts.rs alongside it.
// This file holds the pieces they share.

use crate::text::normalize_whitespace;

/// System prompt for free-form questions whose answer goes straight into a spreadsheet cell.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a helpful no-nonsense assistant. \
    You listen to directions carefully and follow them to the letter. \
    Only return plain text, not markdown or HTML.";

/// Wraps a question with the candidate's resume and the job text in tagged sections.
///
/// Either section is omitted when empty. The result is whitespace-normalised.
pub fn build_context(resume: Option<&str>, job: Option<&str>, question: &str) -> String {
    let mut message = String::new();
    if let Some(resume) = resume.filter(|r| !r.trim().is_empty()) {
        message.push_str(&format!(
            "Here is the candidate's resume: <resume>{resume}</resume> "
        ));
    }
    if let Some(job) = job.filter(|j| !j.trim().is_empty()) {
        message.push_str(&format!(
            "Here is some information about a job. <job>{job}</job> "
        ));
    }
    message.push_str(&format!("Now for my question: {question} "));
    normalize_whitespace(&message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context_tags_both_sections() {
        let msg = build_context(Some("Rust\ndeveloper"), Some("Title: X"), "Summarise.");
        assert_eq!(
            msg,
            "Here is the candidate's resume: <resume>Rust developer</resume> \
             Here is some information about a job. <job>Title: X</job> \
             Now for my question: Summarise. "
        );
    }

    #[test]
    fn test_build_context_skips_empty_sections() {
        let msg = build_context(Some("  "), None, "Q?");
        assert_eq!(msg, "Now for my question: Q? ");
    }
}
