//! Review prompt
//!
//! The reviewer instructions are a fixed template with `title` and
//! `proposal` slots, filled in once per request.

/// An immutable prompt template with named `title` and `proposal` slots
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptTemplate;

impl PromptTemplate {
    /// The proposal review template
    pub const fn review() -> Self {
        Self
    }

    /// Substitute `title` and `proposal` into the template
    ///
    /// Inputs are inserted verbatim; braces inside them are never expanded.
    pub fn render(&self, title: &str, proposal: &str) -> String {
        format!(
            "
You are an expert research proposal reviewer.

TITLE:
{title}

PROPOSAL:
{proposal}

Write the following sections EXACTLY:

SUMMARY (3–5 sentences)

STRENGTHS (5 bullet points)

WEAKNESSES (5 bullet points)

SUGGESTIONS (6 numbered recommendations)

Rules:
- Section titles MUST be in ALL CAPS.
- Use professional academic tone.
- Separate each section with one blank line.
",
            title = title,
            proposal = proposal,
        )
    }
}
