// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! In-memory note package: text, attachments, and change tracking.

use std::path::{Path, PathBuf};

use crate::models::attachment::Attachment;
use crate::models::rich_text::RichText;

/// One note document as held by an editing session.
///
/// Attachment filenames are unique. The list keeps load order followed by
/// insertion order; a replaced attachment moves to the end.
#[derive(Clone, Debug, Default)]
pub struct Package {
    text: RichText,
    attachments: Vec<Attachment>,
    dirty: bool,
    location: Option<PathBuf>,
}

impl Package {
    /// Empty, unsaved package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Package populated from disk; starts clean.
    pub(crate) fn loaded(text: RichText, attachments: Vec<Attachment>, location: PathBuf) -> Self {
        Self {
            text,
            attachments,
            dirty: false,
            location: Some(location),
        }
    }

    pub fn text(&self) -> &RichText {
        &self.text
    }

    /// Replace the note text. Only an actual change marks the package dirty.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text.as_str() != text {
            self.text = RichText::new(text);
            self.dirty = true;
        }
    }

    pub(crate) fn text_mut(&mut self) -> &mut RichText {
        &mut self.text
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn attachment(&self, filename: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.filename == filename)
    }

    pub fn attachment_names(&self) -> impl Iterator<Item = &str> {
        self.attachments.iter().map(|a| a.filename.as_str())
    }

    /// Insert an attachment, replacing any existing one with the same filename.
    ///
    /// Returns the replaced attachment. The new entry is appended, so a
    /// replaced attachment moves to the end of the list. Always marks the
    /// package dirty.
    pub fn insert_attachment(&mut self, attachment: Attachment) -> Option<Attachment> {
        let replaced = self.take_attachment(&attachment.filename);
        self.attachments.push(attachment);
        self.dirty = true;
        replaced
    }

    /// Remove an attachment by filename; absent names are a no-op.
    pub fn remove_attachment(&mut self, filename: &str) -> Option<Attachment> {
        let removed = self.take_attachment(filename);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    fn take_attachment(&mut self, filename: &str) -> Option<Attachment> {
        let index = self.attachments.iter().position(|a| a.filename == filename)?;
        Some(self.attachments.remove(index))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Backing directory; `None` until the package is first saved or when new.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub(crate) fn mark_saved(&mut self, location: PathBuf) {
        self.location = Some(location);
        self.dirty = false;
    }
}
