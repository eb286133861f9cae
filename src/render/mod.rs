//! Markdown rendering for notification bodies.
//!
//! One deterministic pipeline turns markdown into symbol-decorated text;
//! [`RenderMode`] selects the channel-facing encoding of that text. The
//! email channel additionally wraps the result in an HTML envelope, see
//! [`render_email_envelope`].

mod html;
mod pipeline;

pub use html::render_email_envelope;

/// The two canonical render targets. Adapters declare which one they expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Plain text decorated with rule, bullet and quote glyphs.
    SymbolicText,
    /// The same text with line breaks encoded for an HTML body.
    RichHtml,
}

/// Renders a markdown message for the given mode. Pure and total: the same
/// input and mode always produce the same output, and malformed markdown
/// degrades to best-effort text instead of failing.
pub fn render(markdown: &str, mode: RenderMode) -> String {
    let text = pipeline::markdown_to_text(markdown);
    match mode {
        RenderMode::SymbolicText => text,
        RenderMode::RichHtml => text.replace('\n', "<br>\n"),
    }
}

/// Removes HTML tags, for the plain-text alternative part of an email.
pub fn strip_tags(html: &str) -> String {
    static TAG: once_cell::sync::Lazy<regex::Regex> =
        once_cell::sync::Lazy::new(|| regex::Regex::new(r"<[^>]*>").unwrap());
    TAG.replace_all(html, "").to_string()
}
