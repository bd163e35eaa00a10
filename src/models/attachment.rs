// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Attachment domain model and display helpers (UI-agnostic).

use std::fs;
use std::io;
use std::path::Path;

use crate::utils::hash_bytes;

/// Stored content of an attachment: a file blob or an opaque folder subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Contents {
    File(Vec<u8>),
    /// Nested folder copied as-is; children keep their enumeration order.
    Directory(Vec<Attachment>),
}

/// Named entry stored under the package's attachments folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub contents: Contents,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            contents: Contents::File(bytes),
        }
    }

    pub fn directory(filename: impl Into<String>, children: Vec<Attachment>) -> Self {
        Self {
            filename: filename.into(),
            contents: Contents::Directory(children),
        }
    }

    /// Read a file, or a folder tree, fully into memory under the given name.
    ///
    /// Symlinks are followed. A child whose name is not valid UTF-8 is an
    /// `InvalidData` error, since names are used as keys.
    pub fn read_from(filename: impl Into<String>, path: &Path) -> io::Result<Self> {
        let filename = filename.into();
        let metadata = fs::metadata(path)?;
        if !metadata.is_dir() {
            return Ok(Self::new(filename, fs::read(path)?));
        }

        let mut children = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name().into_string().map_err(|raw| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("file name {raw:?} is not valid UTF-8"),
                )
            })?;
            children.push(Self::read_from(name, &entry.path())?);
        }
        Ok(Self::directory(filename, children))
    }

    /// File blob bytes; `None` for folders.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::File(bytes) => Some(bytes),
            Contents::Directory(_) => None,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.contents, Contents::Directory(_))
    }

    /// Total size in bytes, summed over nested entries for folders.
    pub fn size(&self) -> u64 {
        match &self.contents {
            Contents::File(bytes) => bytes.len() as u64,
            Contents::Directory(children) => children.iter().map(Attachment::size).sum(),
        }
    }

    /// Lowercase hex SHA-256 of a file blob; folders have no digest.
    pub fn sha256(&self) -> Option<String> {
        self.bytes().map(hash_bytes)
    }

    pub fn extension(&self) -> Option<&str> {
        file_extension(&self.filename)
    }

    /// MIME essence guessed from the filename, `application/octet-stream` when unknown.
    pub fn mime(&self) -> String {
        guess_mime(&self.filename)
    }

    /// Whether the attachment's guessed type matches `type/subtype` or `type/*`.
    ///
    /// Names without an extension never conform.
    pub fn conforms_to(&self, pattern: &str) -> bool {
        let Some(ext) = self.extension() else {
            return false;
        };
        let pattern = pattern.trim().to_ascii_lowercase();
        mime_guess::from_ext(ext).iter().any(|mime| {
            let essence = mime.essence_str().to_ascii_lowercase();
            match pattern.strip_suffix("/*") {
                Some(top) => mime.type_().as_str().eq_ignore_ascii_case(top),
                None => essence == pattern,
            }
        })
    }
}

/// Extension of a filename: everything after the last `.`, `None` when there is no dot.
///
/// `"archive.tar.gz"` yields `"gz"`; `"README"` yields `None`.
pub fn file_extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}

pub(crate) fn guess_mime(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
