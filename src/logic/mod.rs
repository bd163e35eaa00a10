// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Business logic: package persistence, the text codec, and attachment opening.

pub mod opener;
pub mod rtf;
pub mod store;

pub use opener::{AttachmentOpener, SystemOpener};
pub use rtf::{CodecError, RichTextCodec, RtfCodec};
pub use store::PackageStore;
