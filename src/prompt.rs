//! Prompt builder: assembles the grounded instruction prompt.
//!
//! Pure and deterministic. Passage bodies are concatenated in the order
//! received, separated by a blank line, inside a fixed template that frames
//! the assistant as a documentation technician, asks for structured
//! markdown, and instructs an explicit insufficient-information fallback.
//! An empty passage list leaves the context section empty but keeps the
//! template and fallback instruction; honoring the fallback is the
//! generator's job, not this module's.

use crate::models::Passage;

/// Builds the generation prompt for one query.
pub fn build_prompt(query_text: &str, passages: &[Passage]) -> String {
    let context = passages
        .iter()
        .map(|p| p.body.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a specialized technician that has access to the documentation and manuals \
         for home appliances as provided in the context. Based on the possible reasons \
         identified for the issue, write some possible solutions organized in different \
         bullet points and sections. Use markdown for formatting, including headings, lists, \
         bold, and italic text. If you have no documents find in the context or the response \
         seems incomplete, say that you do not have the answer as you do not have enough \
         information regarding the request. Here are the found available documents that \
         provide context:\n{}\n\nQuestion: {}",
        context, query_text
    )
}
