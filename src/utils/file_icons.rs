// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges
//! File-type icon lookup for attachment listings.
//!
//! Icons are purely cosmetic: the store never depends on the result. Front
//! ends with a platform icon service implement [`IconRegistry`] themselves;
//! [`FileIcons`] is the built-in fallback. It favors MIME matches and falls
//! back to extension checks.

/// Coarse icon categories understood by the built-in registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileIcon {
    Image,
    Video,
    Audio,
    Pdf,
    Archive,
    Document,
    Spreadsheet,
    Presentation,
    Code,
    Text,
    Generic,
}

impl FileIcon {
    pub fn label(self) -> &'static str {
        match self {
            FileIcon::Image => "image",
            FileIcon::Video => "video",
            FileIcon::Audio => "audio",
            FileIcon::Pdf => "pdf",
            FileIcon::Archive => "archive",
            FileIcon::Document => "document",
            FileIcon::Spreadsheet => "spreadsheet",
            FileIcon::Presentation => "presentation",
            FileIcon::Code => "code",
            FileIcon::Text => "text",
            FileIcon::Generic => "file",
        }
    }
}

/// Maps a file extension (without the dot) to an icon handle.
pub trait IconRegistry {
    type Icon;

    /// `None` means the name had no extension; registries return a generic icon.
    fn icon_for(&self, extension: Option<&str>) -> Self::Icon;
}

/// Built-in registry backed by `mime_guess`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileIcons;

impl IconRegistry for FileIcons {
    type Icon = FileIcon;

    fn icon_for(&self, extension: Option<&str>) -> FileIcon {
        let Some(ext) = extension.map(str::to_ascii_lowercase) else {
            return FileIcon::Generic;
        };
        let mime = mime_guess::from_ext(&ext)
            .first()
            .map(|m| m.essence_str().to_ascii_lowercase())
            .unwrap_or_default();

        if mime.starts_with("image/") {
            return FileIcon::Image;
        }
        if mime.starts_with("video/") {
            return FileIcon::Video;
        }
        if mime.starts_with("audio/") {
            return FileIcon::Audio;
        }
        if mime == "application/pdf" {
            return FileIcon::Pdf;
        }
        if is_archive(&mime, &ext) {
            return FileIcon::Archive;
        }
        if matches!(ext.as_str(), "doc" | "docx" | "odt" | "rtf" | "rtfd" | "pages") {
            return FileIcon::Document;
        }
        if matches!(ext.as_str(), "xls" | "xlsx" | "ods" | "csv" | "numbers") {
            return FileIcon::Spreadsheet;
        }
        if matches!(ext.as_str(), "ppt" | "pptx" | "odp" | "key") {
            return FileIcon::Presentation;
        }
        if mime == "application/json"
            || mime == "application/xml"
            || mime == "text/html"
            || matches!(
                ext.as_str(),
                "json" | "xml" | "html" | "htm" | "css" | "js" | "ts" | "rs" | "py" | "c" | "cpp"
                    | "h" | "swift" | "sql" | "sh"
            )
        {
            return FileIcon::Code;
        }
        if ext == "txt" || ext == "md" || mime.starts_with("text/") {
            return FileIcon::Text;
        }

        FileIcon::Generic
    }
}

fn is_archive(mime: &str, ext: &str) -> bool {
    mime == "application/zip"
        || mime == "application/gzip"
        || mime == "application/x-7z-compressed"
        || mime == "application/x-tar"
        || matches!(ext, "zip" | "gz" | "tgz" | "rar" | "7z" | "xz" | "zst" | "bz2" | "tar")
}

#[cfg(test)]
mod tests {
    use super::{FileIcon, FileIcons, IconRegistry};
    use crate::models::file_extension;

    #[test]
    fn icon_for_uses_mime_families() {
        let icons = FileIcons;
        assert_eq!(icons.icon_for(Some("PNG")), FileIcon::Image);
        assert_eq!(icons.icon_for(Some("mp4")), FileIcon::Video);
        assert_eq!(icons.icon_for(Some("pdf")), FileIcon::Pdf);
        assert_eq!(icons.icon_for(Some("txt")), FileIcon::Text);
    }

    // Multi-part archive names resolve through their last extension.
    #[test]
    fn icon_for_recognizes_archives_by_last_extension() {
        let icons = FileIcons;
        assert_eq!(
            icons.icon_for(file_extension("backup.tar.gz")),
            FileIcon::Archive
        );
    }

    #[test]
    fn icon_for_without_extension_is_generic() {
        let icons = FileIcons;
        assert_eq!(icons.icon_for(None), FileIcon::Generic);
        assert_eq!(icons.icon_for(Some("zzunknown")), FileIcon::Generic);
        assert_eq!(FileIcon::Generic.label(), "file");
    }
}
