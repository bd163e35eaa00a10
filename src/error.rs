// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Error taxonomy for package operations.
//!
//! Every store operation fails with exactly one [`PackageError`] variant. The
//! variant names the failed step; the attached [`ErrorContext`] carries the
//! path involved and a free-form detail (usually the underlying I/O or codec
//! message). Presentation is left to the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Optional structured payload attached to every [`PackageError`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub path: Option<PathBuf>,
    pub detail: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            detail: None,
        }
    }

    /// Attach a detail message, typically the `Display` of the underlying error.
    pub fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Failures surfaced by loading, saving, and editing a note package.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The package directory could not be opened.
    #[error("Could not access document{0}")]
    CannotAccessDocument(ErrorContext),

    /// The entries inside the package could not be enumerated or read.
    #[error("Could not load the files inside the document{0}")]
    CannotLoadWrapperFiles(ErrorContext),

    /// The text file is missing, unreadable, or not valid rich text.
    #[error("Could not load the note text{0}")]
    CannotLoadText(ErrorContext),

    /// An attachment could not be read or located.
    #[error("Could not access attachments{0}")]
    CannotAccessAttachments(ErrorContext),

    /// The text could not be encoded or written.
    #[error("Could not save the note text{0}")]
    CannotSaveText(ErrorContext),

    /// An attachment could not be written.
    #[error("Could not save attachments{0}")]
    CannotSaveAttachment(ErrorContext),
}

/// Fieldless mirror of [`PackageError`] for matching and stable codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CannotAccessDocument,
    CannotLoadWrapperFiles,
    CannotLoadText,
    CannotAccessAttachments,
    CannotSaveText,
    CannotSaveAttachment,
}

impl ErrorKind {
    /// Stable numeric code, in declaration order starting at zero.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::CannotAccessDocument => 0,
            ErrorKind::CannotLoadWrapperFiles => 1,
            ErrorKind::CannotLoadText => 2,
            ErrorKind::CannotAccessAttachments => 3,
            ErrorKind::CannotSaveText => 4,
            ErrorKind::CannotSaveAttachment => 5,
        }
    }
}

impl PackageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackageError::CannotAccessDocument(_) => ErrorKind::CannotAccessDocument,
            PackageError::CannotLoadWrapperFiles(_) => ErrorKind::CannotLoadWrapperFiles,
            PackageError::CannotLoadText(_) => ErrorKind::CannotLoadText,
            PackageError::CannotAccessAttachments(_) => ErrorKind::CannotAccessAttachments,
            PackageError::CannotSaveText(_) => ErrorKind::CannotSaveText,
            PackageError::CannotSaveAttachment(_) => ErrorKind::CannotSaveAttachment,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            PackageError::CannotAccessDocument(ctx)
            | PackageError::CannotLoadWrapperFiles(ctx)
            | PackageError::CannotLoadText(ctx)
            | PackageError::CannotAccessAttachments(ctx)
            | PackageError::CannotSaveText(ctx)
            | PackageError::CannotSaveAttachment(ctx) => ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use super::*;

    #[test]
    fn kind_matches_variant_and_codes_are_stable() {
        let err = PackageError::CannotLoadText(ErrorContext::none());
        assert_eq!(err.kind(), ErrorKind::CannotLoadText);
        assert_eq!(err.kind().code(), 2);
        assert_eq!(ErrorKind::CannotAccessDocument.code(), 0);
        assert_eq!(ErrorKind::CannotSaveAttachment.code(), 5);
    }

    #[test]
    fn display_includes_path_and_detail() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err = PackageError::CannotAccessDocument(
            ErrorContext::at("/tmp/missing.note").with_detail(&io_err),
        );

        let text = err.to_string();
        assert!(text.starts_with("Could not access document"));
        assert!(text.contains("/tmp/missing.note"));
        assert!(text.contains("no such file"));
        assert_eq!(
            err.context().path.as_deref(),
            Some(Path::new("/tmp/missing.note"))
        );
    }

    #[test]
    fn empty_context_renders_bare_message() {
        let err = PackageError::CannotSaveText(ErrorContext::none());
        assert_eq!(err.to_string(), "Could not save the note text");
    }
}
