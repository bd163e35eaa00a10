// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel for a note editing session.
//!
//! Front ends turn user actions into [`Msg`] values and feed them through
//! [`update`]. Filesystem work is expressed as [`Command`]s and executed by
//! [`run_command`], whose result comes back as another message. [`dispatch`]
//! drives that loop to completion on the calling thread.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::error::PackageError;
use crate::logic::opener::AttachmentOpener;
use crate::logic::store::PackageStore;
use crate::models::attachment::Attachment;
use crate::models::package::Package;

/// Top-level session state.
#[derive(Default)]
pub struct AppModel {
    /// Package being edited, if any.
    pub document: Option<Package>,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to present.
    pub error: Option<String>,
}

/// Session messages routed through the update function.
pub enum Msg {
    NewDocument,
    OpenRequested(PathBuf),
    Opened(Result<Package, PackageError>),
    TextChanged(String),
    /// Source path picked in a file dialog or dropped onto the attachment list.
    AddAttachmentRequested(PathBuf),
    AttachmentRead(Result<Attachment, PackageError>),
    RemoveAttachment(String),
    SaveRequested,
    SaveAsRequested(PathBuf),
    Saved(Result<Package, PackageError>),
    OpenAttachmentRequested(String),
    AttachmentOpened {
        package: Package,
        result: Result<PathBuf, PackageError>,
    },
    DismissError,
}

/// Side effects executed between updates.
pub enum Command {
    Load(PathBuf),
    ReadAttachment(PathBuf),
    /// Save a snapshot of the document, to `target` or its current location.
    Save {
        package: Package,
        target: Option<PathBuf>,
    },
    OpenAttachment {
        package: Package,
        filename: String,
    },
}

/// Update the session model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::NewDocument => {
            model.document = Some(Package::new());
            surface_event(model, "New note.".into(), false);
        }
        Msg::OpenRequested(path) => cmds.push(Command::Load(path)),
        Msg::Opened(result) => match result {
            Ok(package) => {
                let message = format!(
                    "Opened {} ({} attachment(s))",
                    package
                        .location()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                    package.attachments().len()
                );
                model.document = Some(package);
                surface_event(model, message, false);
            }
            Err(err) => surface_event(model, format!("Failed to open note:\n\n{err}"), true),
        },
        Msg::TextChanged(text) => {
            if let Some(document) = document_or_error(model) {
                document.set_text(text);
            }
        }
        Msg::AddAttachmentRequested(path) => {
            if document_or_error(model).is_some() {
                cmds.push(Command::ReadAttachment(path));
            }
        }
        Msg::AttachmentRead(result) => match result {
            Ok(attachment) => {
                let filename = attachment.filename.clone();
                if let Some(document) = document_or_error(model) {
                    let message = match document.insert_attachment(attachment) {
                        Some(_) => format!("Attachment replaced: {filename}"),
                        None => format!("Attachment added: {filename}"),
                    };
                    surface_event(model, message, false);
                }
            }
            Err(err) => surface_event(model, format!("Failed to attach file:\n\n{err}"), true),
        },
        Msg::RemoveAttachment(filename) => {
            if let Some(document) = document_or_error(model) {
                let message = match document.remove_attachment(&filename) {
                    Some(_) => format!("Attachment removed: {filename}"),
                    None => format!("No attachment named {filename}"),
                };
                surface_event(model, message, false);
            }
        }
        Msg::SaveRequested => {
            if let Some(document) = document_or_error(model) {
                if document.location().is_none() {
                    surface_event(model, "Choose a location before saving.".into(), true);
                } else {
                    cmds.push(Command::Save {
                        package: document.clone(),
                        target: None,
                    });
                }
            }
        }
        Msg::SaveAsRequested(target) => {
            if let Some(document) = document_or_error(model) {
                cmds.push(Command::Save {
                    package: document.clone(),
                    target: Some(target),
                });
            }
        }
        Msg::Saved(result) => match result {
            Ok(package) => {
                let message = format!(
                    "Note saved: {}",
                    package
                        .location()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                );
                model.document = Some(package);
                surface_event(model, message, false);
            }
            Err(err) => surface_event(model, format!("Failed to save note:\n\n{err}"), true),
        },
        Msg::OpenAttachmentRequested(filename) => {
            if let Some(document) = document_or_error(model) {
                cmds.push(Command::OpenAttachment {
                    package: document.clone(),
                    filename,
                });
            }
        }
        Msg::AttachmentOpened { package, result } => {
            // The package may have been autosaved before opening.
            model.document = Some(package);
            match result {
                Ok(path) => surface_event(model, format!("Opened {}", path.display()), false),
                Err(err) => {
                    surface_event(model, format!("Failed to open attachment:\n\n{err}"), true)
                }
            }
        }
        Msg::DismissError => model.error = None,
    }
}

/// Execute a command synchronously and return the resulting message.
pub fn run_command(store: &PackageStore, opener: &dyn AttachmentOpener, cmd: Command) -> Msg {
    match cmd {
        Command::Load(path) => Msg::Opened(store.load(&path)),
        Command::ReadAttachment(path) => Msg::AttachmentRead(store.read_attachment(&path)),
        Command::Save {
            mut package,
            target,
        } => {
            let res = match target {
                Some(target) => store.save_to(&mut package, &target),
                None => store.save(&mut package),
            };
            Msg::Saved(res.map(|_| package))
        }
        Command::OpenAttachment {
            mut package,
            filename,
        } => {
            let result = store.open_attachment(&mut package, &filename, opener);
            Msg::AttachmentOpened { package, result }
        }
    }
}

/// Feed `msg` through [`update`] and run every resulting command until the
/// session is idle.
pub fn dispatch(
    model: &mut AppModel,
    store: &PackageStore,
    opener: &dyn AttachmentOpener,
    msg: Msg,
) {
    let mut inbox = VecDeque::from([msg]);
    while let Some(msg) = inbox.pop_front() {
        let mut cmds = Vec::new();
        update(model, msg, &mut cmds);
        for cmd in cmds {
            inbox.push_back(run_command(store, opener, cmd));
        }
    }
}

/// Update status/error fields consistently for user feedback.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}

fn document_or_error(model: &mut AppModel) -> Option<&mut Package> {
    if model.document.is_none() {
        surface_event(model, "No note is open.".into(), true);
    }
    model.document.as_mut()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<PathBuf>>,
    }

    impl AttachmentOpener for RecordingOpener {
        fn open_attachment(&self, path: &Path) -> io::Result<()> {
            self.opened.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn saved_note(dir: &Path, text: &str) {
        let store = PackageStore::default();
        let mut package = Package::new();
        package.set_text(text);
        store.save_to(&mut package, dir).unwrap();
    }

    #[test]
    fn open_request_enqueues_and_completes() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("a.note");
        saved_note(&doc, "Hello");

        let mut model = AppModel::default();
        let mut cmds = Vec::new();
        update(&mut model, Msg::OpenRequested(doc.clone()), &mut cmds);
        assert_eq!(cmds.len(), 1, "open should enqueue a load");

        let msg = run_command(&PackageStore::default(), &RecordingOpener::default(), cmds.pop().unwrap());
        let mut cmds2 = Vec::new();
        update(&mut model, msg, &mut cmds2);

        assert!(cmds2.is_empty());
        assert!(model.error.is_none());
        assert_eq!(
            model.document.as_ref().map(|d| d.text().as_str()),
            Some("Hello")
        );
        assert!(model.status.as_deref().is_some_and(|s| s.starts_with("Opened")));
    }

    // A failed open keeps whatever document was already loaded.
    #[test]
    fn failed_open_leaves_current_document_untouched() {
        let tmp = TempDir::new().unwrap();
        let store = PackageStore::default();
        let opener = RecordingOpener::default();
        let mut model = AppModel::default();

        dispatch(&mut model, &store, &opener, Msg::NewDocument);
        dispatch(&mut model, &store, &opener, Msg::TextChanged("draft".into()));
        dispatch(
            &mut model,
            &store,
            &opener,
            Msg::OpenRequested(tmp.path().join("missing.note")),
        );

        assert!(model.error.as_deref().is_some_and(|e| e.contains("Could not access document")));
        let document = model.document.as_ref().unwrap();
        assert_eq!(document.text().as_str(), "draft");
        assert!(document.is_dirty());
    }

    #[test]
    fn edits_without_document_set_error() {
        let mut model = AppModel::default();
        let mut cmds = Vec::new();

        update(&mut model, Msg::AddAttachmentRequested(PathBuf::from("x.png")), &mut cmds);

        assert!(cmds.is_empty());
        assert_eq!(model.error.as_deref(), Some("No note is open."));

        update(&mut model, Msg::DismissError, &mut cmds);
        assert!(model.error.is_none());
    }

    #[test]
    fn save_without_location_asks_for_one() {
        let mut model = AppModel::default();
        let mut cmds = Vec::new();
        update(&mut model, Msg::NewDocument, &mut cmds);
        update(&mut model, Msg::SaveRequested, &mut cmds);

        assert!(cmds.is_empty());
        assert!(model.error.is_some());
    }

    #[test]
    fn attach_then_save_as_persists_and_cleans_document() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        fs::write(&source, [1u8; 16]).unwrap();
        let doc = tmp.path().join("new.note");

        let store = PackageStore::default();
        let opener = RecordingOpener::default();
        let mut model = AppModel::default();
        dispatch(&mut model, &store, &opener, Msg::NewDocument);
        dispatch(&mut model, &store, &opener, Msg::AddAttachmentRequested(source.clone()));
        assert_eq!(model.status.as_deref(), Some("Attachment added: photo.jpg"));

        dispatch(&mut model, &store, &opener, Msg::AddAttachmentRequested(source));
        assert_eq!(model.status.as_deref(), Some("Attachment replaced: photo.jpg"));
        assert!(model.document.as_ref().is_some_and(Package::is_dirty));

        dispatch(&mut model, &store, &opener, Msg::SaveAsRequested(doc.clone()));

        assert!(model.error.is_none());
        let document = model.document.as_ref().unwrap();
        assert!(!document.is_dirty());
        assert_eq!(document.location(), Some(doc.as_path()));
        assert!(doc.join("Attachments").join("photo.jpg").is_file());
    }

    #[test]
    fn attach_missing_file_reports_error() {
        let tmp = TempDir::new().unwrap();
        let store = PackageStore::default();
        let opener = RecordingOpener::default();
        let mut model = AppModel::default();
        dispatch(&mut model, &store, &opener, Msg::NewDocument);

        dispatch(
            &mut model,
            &store,
            &opener,
            Msg::AddAttachmentRequested(tmp.path().join("nope.pdf")),
        );

        assert!(model.error.as_deref().is_some_and(|e| e.contains("Could not access attachments")));
        assert!(model.document.as_ref().is_some_and(|d| d.attachments().is_empty()));
    }

    #[test]
    fn remove_attachment_reports_outcome() {
        let mut model = AppModel::default();
        let mut cmds = Vec::new();
        update(&mut model, Msg::NewDocument, &mut cmds);
        update(
            &mut model,
            Msg::AttachmentRead(Ok(Attachment::new("a.txt", b"a".to_vec()))),
            &mut cmds,
        );

        update(&mut model, Msg::RemoveAttachment("a.txt".into()), &mut cmds);
        assert_eq!(model.status.as_deref(), Some("Attachment removed: a.txt"));

        update(&mut model, Msg::RemoveAttachment("a.txt".into()), &mut cmds);
        assert_eq!(model.status.as_deref(), Some("No attachment named a.txt"));
        assert!(cmds.is_empty());
    }

    // Opening an attachment of a dirty document autosaves and keeps the saved state.
    #[test]
    fn open_attachment_autosaves_and_updates_document() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("open.note");
        saved_note(&doc, "Hi");
        let source = tmp.path().join("data.csv");
        fs::write(&source, b"a,b\n1,2\n").unwrap();

        let store = PackageStore::default();
        let opener = RecordingOpener::default();
        let mut model = AppModel::default();
        dispatch(&mut model, &store, &opener, Msg::OpenRequested(doc.clone()));
        dispatch(&mut model, &store, &opener, Msg::AddAttachmentRequested(source));
        dispatch(
            &mut model,
            &store,
            &opener,
            Msg::OpenAttachmentRequested("data.csv".into()),
        );

        assert!(model.error.is_none());
        assert_eq!(
            opener.opened.borrow().as_slice(),
            &[doc.join("Attachments").join("data.csv")]
        );
        assert!(model.document.as_ref().is_some_and(|d| !d.is_dirty()));
    }
}
