//! # Local Template Store
//!
//! A template lives on disk as two files sharing a base name:
//!
//! ```text
//! templates/
//! ├── welcome.html        # content
//! └── receipt.html
//! options/
//! └── welcome.json        # sidecar metadata (optional)
//! ```
//!
//! The [`TemplateStore`] trait keeps the sync engine off the filesystem so
//! flows can be tested against [`memory::InMemoryStore`].
//!
//! Writes are not transactional: the sidecar and the content file are written
//! one after the other and a failure in one does not undo the other.
//! Writing a template with empty metadata removes any older sidecar, so a
//! later push never sends fields the remote no longer has.
//!
//! Names come from the remote catalog as well as the local directory, so
//! both stores reject any name that is not a single plain file name before
//! touching storage.

use crate::error::{Result, SyncError};
use crate::model::{LocalTemplate, Template, TemplateMetadata};
use std::path::{Component, Path, PathBuf};

pub mod fs;
pub mod memory;

/// Extension of template content files.
pub const CONTENT_EXT: &str = "html";

/// Extension of sidecar metadata files.
pub const METADATA_EXT: &str = "json";

/// A template name must be exactly one normal path component: no
/// separators, no `.`/`..`, no root or drive prefix.
pub fn check_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(SyncError::InvalidTemplateName(name.to_string())),
    }
}

pub trait TemplateStore {
    /// Templates with a content file, most recently modified first.
    fn list(&self) -> Result<Vec<LocalTemplate>>;

    /// Whether a content file exists for `name`.
    fn exists(&self, name: &str) -> bool;

    /// Read the HTML content. Fails with `ContentNotFound` if absent.
    fn read(&self, name: &str) -> Result<String>;

    /// Read the sidecar. A missing sidecar is `Ok(None)`.
    fn read_metadata(&self, name: &str) -> Result<Option<TemplateMetadata>>;

    /// Write the sidecar (or drop a stale one when the metadata is empty) and
    /// the content.
    fn write(&self, template: &Template) -> Result<()>;

    /// Path of the content file, for watching.
    fn content_path(&self, name: &str) -> PathBuf;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass() {
        for name in ["welcome", "receipt-v2", "Weekly Digest", "a.b"] {
            assert!(check_name(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn names_that_leave_the_directory_are_rejected() {
        for name in ["", ".", "..", "../escaped", "../../escaped", "nested/name", "/etc/passwd"] {
            assert!(
                matches!(check_name(name), Err(SyncError::InvalidTemplateName(ref n)) if n == name),
                "{}",
                name
            );
        }
    }
}
