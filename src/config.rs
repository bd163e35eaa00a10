// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Store configuration: reserved entry names and save policy.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of the rich-text entry at the package root.
pub const TEXT_FILE_NAME: &str = "Text.rtf";
/// Name of the attachments folder at the package root.
pub const ATTACHMENTS_DIR_NAME: &str = "Attachments";

/// Settings consumed by [`crate::logic::store::PackageStore`].
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Reserved name of the text file inside the package.
    pub text_file_name: String,
    /// Reserved name of the attachments folder inside the package.
    pub attachments_dir_name: String,
    /// Save a dirty package before handing one of its attachments to an opener.
    pub autosave_before_open: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            text_file_name: TEXT_FILE_NAME.to_string(),
            attachments_dir_name: ATTACHMENTS_DIR_NAME.to_string(),
            autosave_before_open: true,
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: StoreConfig =
            serde_json::from_str(content).context("Invalid store configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {:?}", path))?;
        Self::from_json(&content)
    }

    /// Reserved names must be single, distinct path components.
    fn validate(&self) -> Result<()> {
        for name in [&self.text_file_name, &self.attachments_dir_name] {
            let single_component = !name.is_empty()
                && name != "."
                && name != ".."
                && !name.contains('/')
                && !name.contains('\\');
            if !single_component {
                anyhow::bail!("Reserved entry name {:?} is not a plain file name", name);
            }
        }
        if self.text_file_name == self.attachments_dir_name {
            anyhow::bail!(
                "Text file and attachments folder cannot share the name {:?}",
                self.text_file_name
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_use_reserved_names() {
        let config = StoreConfig::default();
        assert_eq!(config.text_file_name, "Text.rtf");
        assert_eq!(config.attachments_dir_name, "Attachments");
        assert!(config.autosave_before_open);
    }

    // Partial JSON keeps defaults for missing keys.
    #[test]
    fn from_json_fills_missing_fields_with_defaults() {
        let config = StoreConfig::from_json(r#"{ "autosave_before_open": false }"#).unwrap();
        assert!(!config.autosave_before_open);
        assert_eq!(config.text_file_name, TEXT_FILE_NAME);
    }

    #[test]
    fn from_json_rejects_unknown_keys() {
        assert!(StoreConfig::from_json(r#"{ "text_file": "x.rtf" }"#).is_err());
    }

    #[test]
    fn from_json_rejects_nested_or_clashing_names() {
        assert!(StoreConfig::from_json(r#"{ "text_file_name": "a/b.rtf" }"#).is_err());
        assert!(
            StoreConfig::from_json(
                r#"{ "text_file_name": "Same", "attachments_dir_name": "Same" }"#
            )
            .is_err()
        );
    }

    #[test]
    fn from_json_file_reads_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notepack.json");
        fs::write(&path, r#"{ "text_file_name": "Note.rtf" }"#).unwrap();

        let config = StoreConfig::from_json_file(&path).unwrap();
        assert_eq!(config.text_file_name, "Note.rtf");

        assert!(StoreConfig::from_json_file(&tmp.path().join("missing.json")).is_err());
    }
}
