//! Document text and character-offset helpers.
//!
//! Annotation spans are expressed in **character** offsets into the
//! document's plain text, not byte offsets. Multibyte text ("café costs
//! €50") makes the two disagree, so all span slicing goes through
//! [`slice_chars`] instead of byte indexing.

/// The plain text of an annotated document.
///
/// Retrieval of the text itself is outside this crate; callers construct a
/// `Text` from whatever store holds the document and hand it to
/// [`crate::AnnotationCollection::load`].
#[derive(Debug, Clone)]
pub struct Text {
    /// Human-readable document title.
    pub title: String,
    /// The document's plain text.
    pub body: String,
}

impl Text {
    /// Create a document text.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Length of the body in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.body.chars().count()
    }
}

/// The characters of `text` in `[start, end)`, clamped to the text bounds.
///
/// Offsets are character positions. An inverted or out-of-range window
/// yields an empty string rather than panicking.
#[must_use]
pub fn slice_chars(text: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    text.chars().skip(start).take(end - start).collect()
}
