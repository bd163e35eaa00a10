// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Directory-backed persistence for note packages.
//!
//! Responsibilities:
//! - Load a package directory into a [`Package`] (text plus attachments).
//! - Write a [`Package`] back, rewriting only the text entry and the
//!   attachments folder; every other root entry is left alone.
//! - Read new attachments from the filesystem and hand saved ones to an opener.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::config::StoreConfig;
use crate::error::{ErrorContext, PackageError};
use crate::logic::opener::AttachmentOpener;
use crate::logic::rtf::{RichTextCodec, RtfCodec};
use crate::models::attachment::{Attachment, Contents};
use crate::models::package::Package;
use crate::models::rich_text::RichText;

/// Loads, saves, and edits packages using a fixed layout and text codec.
pub struct PackageStore {
    config: StoreConfig,
    codec: Box<dyn RichTextCodec>,
}

impl Default for PackageStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl PackageStore {
    /// Store using the built-in RTF codec.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_codec(config, RtfCodec)
    }

    pub fn with_codec(config: StoreConfig, codec: impl RichTextCodec + 'static) -> Self {
        Self {
            config,
            codec: Box::new(codec),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read the package stored in `dir`.
    ///
    /// The returned package is clean and remembers `dir` as its location.
    /// Nested folders inside the attachments folder are loaded as opaque
    /// subtrees.
    ///
    /// # Errors
    ///
    /// - [`PackageError::CannotAccessDocument`] when `dir` is not an accessible directory.
    /// - [`PackageError::CannotLoadWrapperFiles`] when the package or attachment
    ///   entries cannot be enumerated or read.
    /// - [`PackageError::CannotLoadText`] when the text entry is missing,
    ///   unreadable, or not decodable.
    #[instrument(skip(self), fields(path = %dir.display()))]
    pub fn load(&self, dir: &Path) -> Result<Package, PackageError> {
        let metadata = fs::metadata(dir).map_err(|e| {
            PackageError::CannotAccessDocument(ErrorContext::at(dir).with_detail(e))
        })?;
        if !metadata.is_dir() {
            return Err(PackageError::CannotAccessDocument(
                ErrorContext::at(dir).with_detail("not a directory"),
            ));
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            PackageError::CannotLoadWrapperFiles(ErrorContext::at(dir).with_detail(e))
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                PackageError::CannotLoadWrapperFiles(ErrorContext::at(dir).with_detail(e))
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        debug!(count = names.len(), entries = ?names, "Enumerated package entries");

        let text = self.read_text(dir)?;
        let attachments = self.read_attachments(dir)?;

        info!(attachments = attachments.len(), "Package loaded");
        Ok(Package::loaded(text, attachments, dir.to_path_buf()))
    }

    /// Save the package to its current location.
    ///
    /// # Errors
    ///
    /// [`PackageError::CannotAccessDocument`] when the package has never been
    /// saved; otherwise the errors of [`PackageStore::save_to`].
    pub fn save(&self, package: &mut Package) -> Result<(), PackageError> {
        let dir = package.location().map(Path::to_path_buf).ok_or_else(|| {
            PackageError::CannotAccessDocument(
                ErrorContext::none().with_detail("package has not been saved yet"),
            )
        })?;
        self.save_to(package, &dir)
    }

    /// Write the package into `dir`, creating the directory if needed.
    ///
    /// Text is written first, then the attachments folder is made to match the
    /// in-memory list exactly. The folder is only created when there is
    /// something to store or it already exists. On success the package is
    /// clean and located at `dir`. A failure part-way leaves entries written
    /// before the failing step in place.
    ///
    /// # Errors
    ///
    /// - [`PackageError::CannotAccessDocument`] when `dir` cannot be created.
    /// - [`PackageError::CannotSaveText`] when encoding or writing the text fails.
    /// - [`PackageError::CannotSaveAttachment`] when any attachment write fails.
    #[instrument(skip(self, package), fields(path = %dir.display()))]
    pub fn save_to(&self, package: &mut Package, dir: &Path) -> Result<(), PackageError> {
        fs::create_dir_all(dir).map_err(|e| {
            PackageError::CannotAccessDocument(ErrorContext::at(dir).with_detail(e))
        })?;

        let encoded = self.write_text(package.text(), dir)?;
        self.write_attachments(package.attachments(), dir)?;

        package.text_mut().retain_encoding(encoded);
        package.mark_saved(dir.to_path_buf());
        info!(attachments = package.attachments().len(), "Package saved");
        Ok(())
    }

    /// Read the file or folder at `source` and store it under its basename.
    ///
    /// An existing attachment with the same name is replaced. Returns the
    /// attachment's filename.
    ///
    /// # Errors
    ///
    /// [`PackageError::CannotAccessAttachments`] when `source` has no basename
    /// or cannot be read. The package is unchanged on error.
    #[instrument(skip(self, package), fields(source = %source.display()))]
    pub fn add_attachment(
        &self,
        package: &mut Package,
        source: &Path,
    ) -> Result<String, PackageError> {
        let attachment = self.read_attachment(source)?;
        let filename = attachment.filename.clone();
        let size = attachment.size();

        if package.insert_attachment(attachment).is_some() {
            debug!(%filename, "Replaced attachment with the same name");
        }
        info!(%filename, size, "Attachment added");
        Ok(filename)
    }

    /// Read `source` into an attachment named after its basename, without
    /// touching any package.
    pub fn read_attachment(&self, source: &Path) -> Result<Attachment, PackageError> {
        let filename = source
            .file_name()
            .ok_or("path has no file name")
            .and_then(|n| n.to_str().ok_or("file name is not valid UTF-8"))
            .map_err(|detail| {
                PackageError::CannotAccessAttachments(ErrorContext::at(source).with_detail(detail))
            })?
            .to_owned();

        Attachment::read_from(filename, source).map_err(|e| {
            PackageError::CannotAccessAttachments(ErrorContext::at(source).with_detail(e))
        })
    }

    /// Drop an attachment from memory; it disappears from disk on the next save.
    pub fn remove_attachment(&self, package: &mut Package, filename: &str) -> Option<Attachment> {
        let removed = package.remove_attachment(filename);
        if removed.is_some() {
            info!(%filename, "Attachment removed");
        }
        removed
    }

    /// On-disk path of a saved package's attachment.
    ///
    /// # Errors
    ///
    /// [`PackageError::CannotAccessDocument`] for an unsaved package and
    /// [`PackageError::CannotAccessAttachments`] for an unknown filename.
    pub fn attachment_path(
        &self,
        package: &Package,
        filename: &str,
    ) -> Result<PathBuf, PackageError> {
        if package.attachment(filename).is_none() {
            return Err(PackageError::CannotAccessAttachments(
                ErrorContext::none().with_detail(format!("no attachment named {filename:?}")),
            ));
        }
        let location = package.location().ok_or_else(|| {
            PackageError::CannotAccessDocument(
                ErrorContext::none().with_detail("package has not been saved yet"),
            )
        })?;
        Ok(location
            .join(&self.config.attachments_dir_name)
            .join(filename))
    }

    /// Hand an attachment to `opener`, saving a dirty package first when
    /// autosave is enabled so the file on disk is current.
    ///
    /// Returns the path that was opened.
    #[instrument(skip(self, package, opener))]
    pub fn open_attachment(
        &self,
        package: &mut Package,
        filename: &str,
        opener: &dyn AttachmentOpener,
    ) -> Result<PathBuf, PackageError> {
        if package.attachment(filename).is_none() {
            return Err(PackageError::CannotAccessAttachments(
                ErrorContext::none().with_detail(format!("no attachment named {filename:?}")),
            ));
        }
        if self.config.autosave_before_open && package.is_dirty() {
            debug!("Saving before opening attachment");
            self.save(package)?;
        }

        let path = self.attachment_path(package, filename)?;
        opener.open_attachment(&path).map_err(|e| {
            PackageError::CannotAccessAttachments(ErrorContext::at(&path).with_detail(e))
        })?;
        Ok(path)
    }

    fn read_text(&self, dir: &Path) -> Result<RichText, PackageError> {
        let path = dir.join(&self.config.text_file_name);
        let load_err = |detail: String| {
            PackageError::CannotLoadText(ErrorContext::at(&path).with_detail(detail))
        };

        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(load_err("not a regular file".into())),
            Err(e) => return Err(load_err(e.to_string())),
        }
        let bytes = fs::read(&path).map_err(|e| load_err(e.to_string()))?;
        let text = self
            .codec
            .decode(&bytes)
            .map_err(|e| load_err(e.to_string()))?;
        Ok(RichText::with_encoding(text, bytes))
    }

    fn read_attachments(&self, dir: &Path) -> Result<Vec<Attachment>, PackageError> {
        let folder = dir.join(&self.config.attachments_dir_name);
        let wrapper_err = |path: &Path, detail: String| {
            PackageError::CannotLoadWrapperFiles(ErrorContext::at(path).with_detail(detail))
        };

        match fs::metadata(&folder) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(wrapper_err(&folder, "not a directory".into())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No attachments folder");
                return Ok(Vec::new());
            }
            Err(e) => return Err(wrapper_err(&folder, e.to_string())),
        }

        let entries = fs::read_dir(&folder).map_err(|e| wrapper_err(&folder, e.to_string()))?;
        let mut attachments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| wrapper_err(&folder, e.to_string()))?;
            let path = entry.path();
            let name = entry
                .file_name()
                .into_string()
                .map_err(|_| wrapper_err(&path, "file name is not valid UTF-8".into()))?;
            let attachment =
                Attachment::read_from(name, &path).map_err(|e| wrapper_err(&path, e.to_string()))?;
            if attachment.is_directory() {
                debug!(name = %attachment.filename, "Attachment is a folder; keeping as subtree");
            }
            attachments.push(attachment);
        }
        Ok(attachments)
    }

    fn write_text(&self, text: &RichText, dir: &Path) -> Result<Vec<u8>, PackageError> {
        let path = dir.join(&self.config.text_file_name);
        let bytes = match text.encoded() {
            Some(bytes) => bytes.to_vec(),
            None => self.codec.encode(text.as_str()).map_err(|e| {
                PackageError::CannotSaveText(ErrorContext::at(&path).with_detail(e))
            })?,
        };
        fs::write(&path, &bytes).map_err(|e| {
            PackageError::CannotSaveText(ErrorContext::at(&path).with_detail(e))
        })?;
        Ok(bytes)
    }

    fn write_attachments(&self, attachments: &[Attachment], dir: &Path) -> Result<(), PackageError> {
        let folder = dir.join(&self.config.attachments_dir_name);
        let existing = fs::symlink_metadata(&folder).ok();

        if attachments.is_empty() && existing.is_none() {
            return Ok(());
        }
        if existing.is_some_and(|meta| !meta.is_dir()) {
            warn!(path = %folder.display(), "Replacing non-folder entry at attachments location");
            fs::remove_file(&folder).map_err(|e| save_err(&folder, e))?;
        }
        sync_folder(&folder, attachments)
    }
}

fn save_err(path: &Path, detail: impl std::fmt::Display) -> PackageError {
    PackageError::CannotSaveAttachment(ErrorContext::at(path).with_detail(detail))
}

/// A filename usable as a single entry inside the attachments folder.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

/// Make `folder` contain exactly `entries`, removing anything else.
fn sync_folder(folder: &Path, entries: &[Attachment]) -> Result<(), PackageError> {
    for attachment in entries {
        if !is_plain_name(&attachment.filename) {
            return Err(save_err(
                folder,
                format!("invalid attachment name {:?}", attachment.filename),
            ));
        }
    }

    fs::create_dir_all(folder).map_err(|e| save_err(folder, e))?;

    let stale = fs::read_dir(folder).map_err(|e| save_err(folder, e))?;
    for entry in stale {
        let entry = entry.map_err(|e| save_err(folder, e))?;
        let file_name = entry.file_name();
        // Names that are not UTF-8 can never match an attachment key.
        if let Some(name) = file_name.to_str()
            && entries.iter().any(|a| a.filename == name)
        {
            continue;
        }
        let name = file_name.to_string_lossy();
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| save_err(&path, e))?;
        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| save_err(&path, e))?;
        debug!(%name, "Removed stale attachment");
    }

    for attachment in entries {
        write_entry(&folder.join(&attachment.filename), attachment)?;
    }
    Ok(())
}

/// Write one attachment at `path`. Symlinks in the way are replaced, never
/// followed, so nothing outside the package is touched.
fn write_entry(path: &Path, attachment: &Attachment) -> Result<(), PackageError> {
    let existing = fs::symlink_metadata(path).ok().map(|meta| meta.file_type());
    let is_link = existing.is_some_and(|kind| kind.is_symlink());
    let is_dir = existing.is_some_and(|kind| kind.is_dir());
    match &attachment.contents {
        Contents::File(bytes) => {
            if is_dir {
                fs::remove_dir_all(path).map_err(|e| save_err(path, e))?;
            } else if is_link {
                fs::remove_file(path).map_err(|e| save_err(path, e))?;
            }
            fs::write(path, bytes).map_err(|e| save_err(path, e))
        }
        Contents::Directory(children) => {
            if existing.is_some() && !is_dir {
                fs::remove_file(path).map_err(|e| save_err(path, e))?;
            }
            sync_folder(path, children)
        }
    }
}
