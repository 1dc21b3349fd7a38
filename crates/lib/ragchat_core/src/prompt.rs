//! Prompt that restricts answers to the retrieved document context.

use crate::store::ScoredChunk;

/// Reply the model is told to give when the context lacks the answer.
pub const NO_ANSWER: &str = "I don't have information about that in the provided documents.";

const TEMPLATE: &str = "Use the following pieces of context to answer the question at the end.
If you don't know the answer based on the provided context, just say \"{no_answer}\"
Do not make up an answer or use information outside of the provided context.

Context:
{context}

Question: {question}
Answer:";

/// Join chunk contents with a blank line between them.
pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fill the template with `context` and `question`.
///
/// Substitution is single-pass, so braces inside the context or question are
/// left alone.
pub fn render(context: &str, question: &str) -> String {
    let mut out = String::with_capacity(TEMPLATE.len() + context.len() + question.len());
    let mut rest = TEMPLATE;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let (value, len) = if after.starts_with("{context}") {
            (context, "{context}".len())
        } else if after.starts_with("{question}") {
            (question, "{question}".len())
        } else if after.starts_with("{no_answer}") {
            (NO_ANSWER, "{no_answer}".len())
        } else {
            ("{", 1)
        };
        out.push_str(value);
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}
