// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Note packages: a directory holding an RTF note (`Text.rtf`) and an
//! optional `Attachments/` folder.
//!
//! [`PackageStore`] loads and saves packages, [`Package`] is the in-memory
//! document, and [`mvu`] provides the editing-session kernel used by the
//! command-line front end in [`app`].

pub mod app;
pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod mvu;
pub mod utils;

pub use config::StoreConfig;
pub use error::{ErrorKind, PackageError};
pub use logic::{AttachmentOpener, PackageStore, RichTextCodec, RtfCodec, SystemOpener};
pub use models::{Attachment, Contents, Package, RichText};
