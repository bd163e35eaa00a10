// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Command-line front end wiring user commands to the session kernel.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::StoreConfig;
use crate::logic::opener::{AttachmentOpener, SystemOpener};
use crate::logic::store::PackageStore;
use crate::models::package::Package;
use crate::mvu::{self, AppModel, Msg};
use crate::utils::{FileIcons, IconRegistry};

#[derive(Debug, Parser)]
#[command(name = "notepack", version, about = "Edit note packages: rich text plus attachments")]
pub struct Cli {
    /// JSON store configuration (reserved names, autosave policy)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new note package
    New {
        /// Package directory to create
        path: PathBuf,
        /// Initial note text
        #[arg(long, default_value = "")]
        text: String,
    },
    /// Print a package's text and attachments
    Show {
        path: PathBuf,
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Replace the note text
    SetText {
        path: PathBuf,
        text: String,
    },
    /// Add files to a package, replacing attachments with the same name
    Attach {
        path: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove attachments by filename
    Detach {
        path: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Open an attachment with the system's default application
    Open {
        path: PathBuf,
        name: String,
    },
}

/// Attachment row for listings.
#[derive(Debug, Serialize)]
struct AttachmentSummary {
    filename: String,
    kind: &'static str,
    mime: String,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
    folder: bool,
}

#[derive(Debug, Serialize)]
struct PackageSummary {
    location: Option<PathBuf>,
    text: String,
    attachments: Vec<AttachmentSummary>,
}

/// Session wrapper turning kernel errors into `anyhow` failures.
struct Session<'a> {
    model: AppModel,
    store: &'a PackageStore,
    opener: &'a dyn AttachmentOpener,
}

impl<'a> Session<'a> {
    fn new(store: &'a PackageStore, opener: &'a dyn AttachmentOpener) -> Self {
        Self {
            model: AppModel::default(),
            store,
            opener,
        }
    }

    fn send(&mut self, msg: Msg) -> Result<()> {
        mvu::dispatch(&mut self.model, self.store, self.opener, msg);
        if let Some(err) = self.model.error.take() {
            bail!(err);
        }
        if let Some(status) = &self.model.status {
            tracing::debug!(%status, "Session status");
        }
        Ok(())
    }

    fn document(&self) -> Result<&Package> {
        self.model.document.as_ref().context("No note is open")
    }
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => StoreConfig::from_json_file(path)?,
        None => StoreConfig::default(),
    };
    let store = PackageStore::new(config);
    run_with(cli.command, &store, &SystemOpener)
}

/// Execute a command against an explicit store and opener.
pub fn run_with(command: Command, store: &PackageStore, opener: &dyn AttachmentOpener) -> Result<()> {
    let mut session = Session::new(store, opener);

    match command {
        Command::New { path, text } => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            session.send(Msg::NewDocument)?;
            session.send(Msg::TextChanged(text))?;
            session.send(Msg::SaveAsRequested(path.clone()))?;
            println!("Created {}", path.display());
        }
        Command::Show { path, json } => {
            session.send(Msg::OpenRequested(path))?;
            let summary = summarize(session.document()?);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
        Command::SetText { path, text } => {
            session.send(Msg::OpenRequested(path))?;
            session.send(Msg::TextChanged(text))?;
            save_if_dirty(&mut session)?;
        }
        Command::Attach { path, files } => {
            session.send(Msg::OpenRequested(path))?;
            for file in files {
                session.send(Msg::AddAttachmentRequested(file))?;
                if let Some(status) = &session.model.status {
                    println!("{status}");
                }
            }
            save_if_dirty(&mut session)?;
        }
        Command::Detach { path, names } => {
            session.send(Msg::OpenRequested(path))?;
            for name in names {
                session.send(Msg::RemoveAttachment(name))?;
                if let Some(status) = &session.model.status {
                    println!("{status}");
                }
            }
            save_if_dirty(&mut session)?;
        }
        Command::Open { path, name } => {
            session.send(Msg::OpenRequested(path))?;
            session.send(Msg::OpenAttachmentRequested(name))?;
            if let Some(status) = &session.model.status {
                println!("{status}");
            }
        }
    }
    Ok(())
}

fn save_if_dirty(session: &mut Session<'_>) -> Result<()> {
    if session.document()?.is_dirty() {
        session.send(Msg::SaveRequested)?;
        if let Some(status) = &session.model.status {
            println!("{status}");
        }
    }
    Ok(())
}

fn summarize(package: &Package) -> PackageSummary {
    let icons = FileIcons;
    PackageSummary {
        location: package.location().map(|p| p.to_path_buf()),
        text: package.text().as_str().to_string(),
        attachments: package
            .attachments()
            .iter()
            .map(|a| AttachmentSummary {
                filename: a.filename.clone(),
                kind: icons.icon_for(a.extension()).label(),
                mime: a.mime(),
                size: a.size(),
                sha256: a.sha256(),
                folder: a.is_directory(),
            })
            .collect(),
    }
}

fn print_summary(summary: &PackageSummary) {
    if let Some(location) = &summary.location {
        println!("{}", location.display());
    }
    println!("{}", summary.text);
    println!();
    if summary.attachments.is_empty() {
        println!("No attachments");
        return;
    }
    for att in &summary.attachments {
        let suffix = if att.folder { "/" } else { "" };
        println!(
            "{:<12} {}{}  {} | {}",
            att.kind,
            att.filename,
            suffix,
            format_bytes(att.size),
            att.mime
        );
    }
}

/// Human-readable formatting for byte sizes with binary units.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use tempfile::TempDir;

    use super::{Cli, Command, format_bytes, run_with, summarize};
    use crate::logic::opener::AttachmentOpener;
    use crate::logic::store::PackageStore;

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

    #[test]
    fn cli_parses_attach_with_global_flags() {
        let cli = Cli::try_parse_from([
            "notepack",
            "attach",
            "doc.note",
            "a.png",
            "b.pdf",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Command::Attach { path, files } => {
                assert_eq!(path, PathBuf::from("doc.note"));
                assert_eq!(files.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_requires_files_for_attach() {
        assert!(Cli::try_parse_from(["notepack", "attach", "doc.note"]).is_err());
    }

    // new -> attach -> detach -> open flows end to end through the kernel.
    #[test]
    fn commands_edit_package_on_disk() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("cli.note");
        let file = tmp.path().join("table.csv");
        fs::write(&file, b"x,y\n").unwrap();
        let extra = tmp.path().join("extra.txt");
        fs::write(&extra, b"extra").unwrap();

        let store = PackageStore::default();
        let opener = RecordingOpener::default();

        run_with(
            Command::New {
                path: doc.clone(),
                text: "First line".into(),
            },
            &store,
            &opener,
        )
        .unwrap();
        run_with(
            Command::Attach {
                path: doc.clone(),
                files: vec![file, extra],
            },
            &store,
            &opener,
        )
        .unwrap();
        run_with(
            Command::Detach {
                path: doc.clone(),
                names: vec!["extra.txt".into()],
            },
            &store,
            &opener,
        )
        .unwrap();
        run_with(
            Command::Open {
                path: doc.clone(),
                name: "table.csv".into(),
            },
            &store,
            &opener,
        )
        .unwrap();

        let package = store.load(&doc).unwrap();
        assert_eq!(package.text().as_str(), "First line");
        let names: Vec<_> = package.attachment_names().collect();
        assert_eq!(names, vec!["table.csv"]);
        assert_eq!(
            opener.opened.borrow().as_slice(),
            &[doc.join("Attachments").join("table.csv")]
        );

        let summary = summarize(&package);
        assert_eq!(summary.attachments[0].kind, "spreadsheet");
        assert_eq!(summary.attachments[0].size, 4);
    }

    #[test]
    fn new_refuses_existing_path_and_show_reports_missing() {
        let tmp = TempDir::new().unwrap();
        let store = PackageStore::default();
        let opener = RecordingOpener::default();

        let existing = run_with(
            Command::New {
                path: tmp.path().to_path_buf(),
                text: String::new(),
            },
            &store,
            &opener,
        );
        assert!(existing.is_err());

        let missing = run_with(
            Command::Show {
                path: tmp.path().join("absent.note"),
                json: true,
            },
            &store,
            &opener,
        );
        let message = missing.unwrap_err().to_string();
        assert!(message.contains("Could not access document"));
    }

    #[test]
    fn format_bytes_uses_binary_units() {
        assert_eq!(format_bytes(50), "50 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
