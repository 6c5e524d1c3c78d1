//! Prompt and transcript rendering.
//!
//! Plain string formatting; the templates are fixed, so no template engine.

use crate::document::SearchResult;
use crate::generation::ChatMessage;

/// Render the grounding prompt from retrieved chunks and the user's query.
///
/// Chunk texts appear in retrieval order, one per line, between a fixed
/// instruction header and the `Question:`/`Answer:` trailer.
pub fn render_prompt(query: &str, results: &[SearchResult]) -> String {
    let mut out = String::from("Given these documents, answer the question.\nDocuments:\n");
    for result in results {
        out.push_str(&result.chunk.text);
        out.push('\n');
    }
    out.push_str("Question: ");
    out.push_str(query);
    out.push_str("\nAnswer:");
    out
}

/// Concatenate retrieved chunk texts, blank-line separated, in retrieval order.
pub fn join_context(results: &[SearchResult]) -> String {
    results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// Flatten a chat history into a completion-style transcript.
///
/// Each message becomes `"{Role}: {content}\n"` with the role's first letter
/// capitalized, followed by a trailing `"Assistant: "` cue for the backend
/// to continue from.
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str(&capitalize(&message.role));
        out.push_str(": ");
        out.push_str(&message.content);
        out.push('\n');
    }
    out.push_str("Assistant: ");
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;
    use std::collections::HashMap;

    fn result(text: &str) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                id: "doc_0".into(),
                text: text.into(),
                embedding: vec![1.0],
                metadata: HashMap::new(),
                document_id: "doc".into(),
            },
            score: 1.0,
        }
    }

    #[test]
    fn prompt_interpolates_chunks_and_query() {
        let prompt = render_prompt("What color is the sky?", &[result("The sky is blue.")]);
        assert_eq!(
            prompt,
            "Given these documents, answer the question.\nDocuments:\nThe sky is blue.\nQuestion: What color is the sky?\nAnswer:"
        );
    }

    #[test]
    fn context_joins_chunks_with_blank_lines() {
        let joined = join_context(&[result("one"), result("two")]);
        assert_eq!(joined, "one\n\ntwo");
    }

    #[test]
    fn transcript_capitalizes_roles_and_appends_cue() {
        let messages = [
            ChatMessage::user("Hi"),
            ChatMessage { role: "assistant".into(), content: "Hello!".into() },
        ];
        assert_eq!(render_transcript(&messages), "User: Hi\nAssistant: Hello!\nAssistant: ");
    }

    #[test]
    fn transcript_of_single_user_message() {
        assert_eq!(render_transcript(&[ChatMessage::user("Hi")]), "User: Hi\nAssistant: ");
    }
}
