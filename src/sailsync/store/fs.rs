use super::{check_name, TemplateStore, CONTENT_EXT, METADATA_EXT};
use crate::error::{Result, SyncError};
use crate::model::{LocalTemplate, Template, TemplateMetadata};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub struct FileStore {
    templates_dir: PathBuf,
    options_dir: PathBuf,
}

impl FileStore {
    pub fn new(templates_dir: PathBuf, options_dir: PathBuf) -> Self {
        Self {
            templates_dir,
            options_dir,
        }
    }

    fn metadata_path(&self, name: &str) -> PathBuf {
        self.options_dir.join(format!("{}.{}", name, METADATA_EXT))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(SyncError::Io)?;
        }
        Ok(())
    }

    /// Write through a temp file so a crash never leaves half a file behind.
    fn write_atomic(&self, dir: &Path, target: &Path, content: &str) -> Result<()> {
        self.ensure_dir(dir)?;
        let tmp = dir.join(format!(".sailsync-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).map_err(SyncError::Io)?;
        if let Err(e) = fs::rename(&tmp, target) {
            let _ = fs::remove_file(&tmp);
            return Err(SyncError::Io(e));
        }
        Ok(())
    }

    fn write_metadata(&self, template: &Template) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&template.metadata).map_err(SyncError::Serialization)?;
        self.write_atomic(
            &self.options_dir,
            &self.metadata_path(&template.name),
            &content,
        )
    }

    fn remove_stale_metadata(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.metadata_path(name)) {
            Ok(()) => {
                debug!("Removed stale sidecar for {}", name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::Io(e)),
        }
    }
}

impl TemplateStore for FileStore {
    fn list(&self) -> Result<Vec<LocalTemplate>> {
        let entries = match fs::read_dir(&self.templates_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SyncError::Io(e)),
        };

        let mut templates = Vec::new();
        for entry in entries {
            let path = entry.map_err(SyncError::Io)?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(CONTENT_EXT)
            {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .map_err(SyncError::Io)?;
            templates.push(LocalTemplate {
                name: name.to_string(),
                modified: DateTime::<Utc>::from(modified),
            });
        }

        templates.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.name.cmp(&b.name)));
        Ok(templates)
    }

    fn exists(&self, name: &str) -> bool {
        check_name(name).is_ok() && self.content_path(name).is_file()
    }

    fn read(&self, name: &str) -> Result<String> {
        check_name(name)?;
        match fs::read_to_string(self.content_path(name)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(SyncError::ContentNotFound(name.to_string()))
            }
            Err(e) => Err(SyncError::Io(e)),
        }
    }

    fn read_metadata(&self, name: &str) -> Result<Option<TemplateMetadata>> {
        check_name(name)?;
        let path = self.metadata_path(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SyncError::Io(e)),
        };
        let meta = serde_json::from_str(&content).map_err(SyncError::Serialization)?;
        Ok(Some(meta))
    }

    fn write(&self, template: &Template) -> Result<()> {
        check_name(&template.name)?;
        let mut failures = Vec::new();

        let sidecar = if template.metadata.is_empty() {
            self.remove_stale_metadata(&template.name)
        } else {
            self.write_metadata(template)
        };
        if let Err(e) = sidecar {
            failures.push(format!("sidecar: {}", e));
        }

        if let Err(e) = self.write_atomic(
            &self.templates_dir,
            &self.content_path(&template.name),
            &template.content_html,
        ) {
            failures.push(format!("content: {}", e));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Write {
                name: template.name.clone(),
                detail: failures.join("; "),
            })
        }
    }

    fn content_path(&self, name: &str) -> PathBuf {
        self.templates_dir.join(format!("{}.{}", name, CONTENT_EXT))
    }
}
