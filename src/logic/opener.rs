// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Capability for handing a saved attachment to another application.

use std::io;
use std::path::Path;

/// Opens an attachment file that exists on disk.
pub trait AttachmentOpener {
    fn open_attachment(&self, path: &Path) -> io::Result<()>;
}

/// Opens attachments with the operating system's default application.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemOpener;

impl AttachmentOpener for SystemOpener {
    fn open_attachment(&self, path: &Path) -> io::Result<()> {
        open::that_detached(path)
    }
}
