//! Markup normalization for free-text description cells.
//!
//! Order exports sometimes carry the description as an RTF document. The
//! extractor only understands plain text, so every description cell passes
//! through a [`MarkupNormalizer`] first.

mod rtf;

pub use rtf::RtfStripper;

/// Converts markup-encoded text to plain text.
pub trait MarkupNormalizer {
    /// Whether the text is encoded in this normalizer's markup.
    fn is_markup(&self, text: &str) -> bool;

    /// Convert markup to plain text.
    fn to_plain_text(&self, text: &str) -> String;

    /// Plain text for markup input, the input unchanged otherwise.
    fn normalize(&self, text: &str) -> String {
        if self.is_markup(text) {
            self.to_plain_text(text)
        } else {
            text.to_string()
        }
    }
}
