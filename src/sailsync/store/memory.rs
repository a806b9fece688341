use super::{check_name, TemplateStore, CONTENT_EXT};
use crate::error::{Result, SyncError};
use crate::model::{LocalTemplate, Template, TemplateMetadata};
use chrono::{DateTime, Duration, Utc};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

#[derive(Clone)]
struct Entry {
    content: Option<String>,
    metadata: Option<TemplateMetadata>,
    modified: DateTime<Utc>,
}

/// In-memory template store for tests.
///
/// Uses `RefCell` so the trait can take `&self`, matching the filesystem
/// store where writes need no exclusive borrow.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RefCell<BTreeMap<String, Entry>>,
    pending_reads: RefCell<BTreeMap<String, VecDeque<String>>>,
    clock: RefCell<Option<DateTime<Utc>>>,
    fail_writes: RefCell<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each call is one second "later" than the previous so listing order is
    /// deterministic.
    fn tick(&self) -> DateTime<Utc> {
        let mut clock = self.clock.borrow_mut();
        let next = clock
            .map(|t| t + Duration::seconds(1))
            .unwrap_or_else(|| DateTime::<Utc>::from(std::time::UNIX_EPOCH));
        *clock = Some(next);
        next
    }

    pub fn put(&self, name: &str, content: &str) {
        let modified = self.tick();
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(name.to_string()).or_insert(Entry {
            content: None,
            metadata: None,
            modified,
        });
        entry.content = Some(content.to_string());
        entry.modified = modified;
    }

    pub fn put_metadata(&self, name: &str, metadata: TemplateMetadata) {
        let modified = self.tick();
        self.entries
            .borrow_mut()
            .entry(name.to_string())
            .or_insert(Entry {
                content: None,
                metadata: None,
                modified,
            })
            .metadata = Some(metadata);
    }

    pub fn remove(&self, name: &str) {
        self.entries.borrow_mut().remove(name);
    }

    /// Queue values that `read` returns before the stored content, to mimic
    /// an editor whose save is still landing.
    pub fn queue_reads(&self, name: &str, reads: &[&str]) {
        self.pending_reads
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .extend(reads.iter().map(|s| s.to_string()));
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }

    pub fn content(&self, name: &str) -> Option<String> {
        self.entries
            .borrow()
            .get(name)
            .and_then(|e| e.content.clone())
    }

    pub fn metadata(&self, name: &str) -> Option<TemplateMetadata> {
        self.entries
            .borrow()
            .get(name)
            .and_then(|e| e.metadata.clone())
    }
}

impl TemplateStore for InMemoryStore {
    fn list(&self) -> Result<Vec<LocalTemplate>> {
        let mut templates: Vec<_> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, e)| e.content.is_some())
            .map(|(name, e)| LocalTemplate {
                name: name.clone(),
                modified: e.modified,
            })
            .collect();
        templates.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.name.cmp(&b.name)));
        Ok(templates)
    }

    fn exists(&self, name: &str) -> bool {
        self.content(name).is_some()
    }

    fn read(&self, name: &str) -> Result<String> {
        if let Some(queued) = self
            .pending_reads
            .borrow_mut()
            .get_mut(name)
            .and_then(VecDeque::pop_front)
        {
            return Ok(queued);
        }
        self.content(name)
            .ok_or_else(|| SyncError::ContentNotFound(name.to_string()))
    }

    fn read_metadata(&self, name: &str) -> Result<Option<TemplateMetadata>> {
        Ok(self.metadata(name))
    }

    fn write(&self, template: &Template) -> Result<()> {
        check_name(&template.name)?;
        if *self.fail_writes.borrow() {
            return Err(SyncError::Write {
                name: template.name.clone(),
                detail: "simulated write error".to_string(),
            });
        }
        self.put(&template.name, &template.content_html);
        if let Some(entry) = self.entries.borrow_mut().get_mut(&template.name) {
            entry.metadata = Some(template.metadata.clone()).filter(|m| !m.is_empty());
        }
        Ok(())
    }

    fn content_path(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("memory://templates/{}.{}", name, CONTENT_EXT))
    }
}
