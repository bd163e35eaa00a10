// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Note text value that remembers the bytes it was last stored as.

/// Decoded note text.
///
/// When the value came from disk (or was just saved) it keeps the encoded
/// bytes so an unmodified note is written back byte-for-byte. Any edit
/// produces a fresh value without retained bytes.
#[derive(Clone, Debug, Default)]
pub struct RichText {
    text: String,
    encoded: Option<Vec<u8>>,
}

impl RichText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            encoded: None,
        }
    }

    /// Pair decoded text with the exact bytes it was decoded from.
    pub(crate) fn with_encoding(text: String, encoded: Vec<u8>) -> Self {
        Self {
            text,
            encoded: Some(encoded),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bytes last read from or written to disk, if the text is unchanged since.
    pub fn encoded(&self) -> Option<&[u8]> {
        self.encoded.as_deref()
    }

    pub(crate) fn retain_encoding(&mut self, encoded: Vec<u8>) {
        self.encoded = Some(encoded);
    }
}

impl PartialEq for RichText {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for RichText {}

impl From<&str> for RichText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RichText {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::RichText;

    // Equality ignores the retained encoding.
    #[test]
    fn equality_compares_text_only() {
        let fresh = RichText::new("Hello");
        let loaded = RichText::with_encoding("Hello".into(), b"{\\rtf1 Hello}".to_vec());

        assert_eq!(fresh, loaded);
        assert!(fresh.encoded().is_none());
        assert_eq!(loaded.encoded(), Some(&b"{\\rtf1 Hello}"[..]));
    }

    #[test]
    fn default_is_empty() {
        assert!(RichText::default().is_empty());
    }
}
