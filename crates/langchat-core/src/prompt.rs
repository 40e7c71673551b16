//! Prompt templates for single-shot generation endpoints.
//!
//! Templates carry an `{input}` placeholder that [`build`] replaces with the
//! caller's message.

/// Placeholder replaced by the caller's message.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Produces a Markdown outline suitable for rendering as a mind map.
pub const MINDMAP: &str = "\
You are a mind map generator. Organize the topic below into a hierarchical \
outline written in Markdown.

Rules:
- Start with a single level-1 heading that names the central topic.
- Use level-2 and level-3 headings for main branches and sub-branches.
- Use short bullet points for leaf details.
- Reply with the Markdown only, without code fences or commentary.

Topic:
{input}";

/// Expands a short request into a detailed image generation prompt.
pub const IMAGE: &str = "\
Create a detailed, vivid image of the following subject. Describe composition, \
lighting, colors and style precisely, and avoid any text or watermarks in the \
picture.

Subject:
{input}";

/// Render `template` around `message`.
///
/// A template without a placeholder gets the message appended on its own line.
pub fn build(message: &str, template: &str) -> String {
    if template.contains(INPUT_PLACEHOLDER) {
        template.replace(INPUT_PLACEHOLDER, message.trim())
    } else {
        format!("{template}\n{}", message.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_substitutes_placeholder() {
        let rendered = build("  rust ownership ", MINDMAP);
        assert!(rendered.ends_with("Topic:\nrust ownership"));
        assert!(!rendered.contains(INPUT_PLACEHOLDER));
    }

    #[test]
    fn build_appends_without_placeholder() {
        assert_eq!(build("cat", "Draw:"), "Draw:\ncat");
    }

    #[test]
    fn image_template_has_placeholder() {
        assert!(IMAGE.contains(INPUT_PLACEHOLDER));
    }
}
