// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: plain data types for note packages, shared by the store and front ends.

pub mod attachment;
pub mod package;
pub mod rich_text;

pub use attachment::{Attachment, Contents, file_extension};
pub use package::Package;
pub use rich_text::RichText;
