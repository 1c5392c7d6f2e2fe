//! Prompt templates

use super::AssessContext;
use crate::note::Note;

/// Characters of the note body sent for assessment
const ASSESS_EXCERPT_CHARS: usize = 2000;

fn excerpt(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

pub(super) fn assessment(note: &Note, context: &AssessContext) -> String {
    format!(
        r#"Analyze this note from a personal markdown knowledge base and assess its relevance.

Title: {title}
Path: {key}
Outgoing links: {links}, tags: {tags}, embeds: {embeds}

Content:
{content}

Give:
1. A relevance score from 0 to 10:
   - 0-2: outdated, redundant or empty
   - 3-4: low value
   - 5-6: moderate value, could be improved
   - 7-8: high value
   - 9-10: essential
2. Brief reasoning for the score.
3. A recommendation: "remove", "enhance" or "keep".

Score higher for notes that link to other notes, act as hubs, hold personal
or unique information, or store credentials. Score lower for content that is
easily found in an encyclopedia or search engine.

Respond with JSON only:
{{"score": <number>, "reasoning": "<text>", "recommendation": "<remove|enhance|keep>"}}"#,
        title = context.title,
        key = context.key,
        links = context.link_count,
        tags = context.tag_count,
        embeds = context.embed_count,
        content = excerpt(&note.body, ASSESS_EXCERPT_CHARS),
    )
}

pub(super) fn enhancement(note: &Note) -> String {
    format!(
        r#"Improve the following markdown note by adding structure, context and missing explanations.

Rules:
- Keep every existing line of the note. Do not delete, shorten or summarize anything.
- Keep every [[wiki link]], #tag and embedded file exactly as written.
- Only add new content around the existing text.
- Return the complete note as markdown, with no commentary before or after it.

Title: {title}

{body}"#,
        title = note.title(),
        body = note.body,
    )
}

pub(super) fn concepts(note: &Note) -> String {
    format!(
        r#"Identify the distinct atomic concepts in the following note. An atomic concept is one
self-contained idea that deserves its own short note.

For each concept give a short title (usable as a file name) and markdown content that
explains it on its own. Return at most 5 concepts. Skip concepts that are too trivial.

Respond with a JSON array only:
[{{"title": "<title>", "content": "<markdown>"}}]

Source note "{title}":

{body}"#,
        title = note.title(),
        body = excerpt(&note.body, ASSESS_EXCERPT_CHARS * 2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("héllo", 2), "hé...");
        assert_eq!(excerpt("hi", 10), "hi");
    }
}
