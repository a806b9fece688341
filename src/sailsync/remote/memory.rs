use super::TemplateRepository;
use crate::error::{Result, SyncError};
use crate::model::{RemoteTemplate, SaveRequest, Template};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

/// In-process repository for tests.
///
/// Keeps templates in insertion order, records every save and send, and can
/// be told to fail specific fetches.
#[derive(Default)]
pub struct InMemoryRepository {
    templates: RefCell<Vec<Template>>,
    failing_fetches: RefCell<BTreeSet<String>>,
    unreachable: Cell<bool>,
    saves: RefCell<Vec<SaveRequest>>,
    sends: RefCell<Vec<(String, Vec<String>)>>,
    fetches: RefCell<Vec<String>>,
    list_calls: Cell<usize>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(self, template: Template) -> Self {
        self.insert(template);
        self
    }

    pub fn insert(&self, mut template: Template) {
        let mut templates = self.templates.borrow_mut();
        if template.metadata.template_id.is_none() {
            template.metadata.template_id = Some((templates.len() + 1).to_string());
        }
        templates.retain(|t| t.name != template.name);
        templates.push(template);
    }

    /// Make `fetch(name)` fail with a transport error.
    pub fn fail_fetch(&self, name: &str) {
        self.failing_fetches.borrow_mut().insert(name.to_string());
    }

    /// Make every call fail with a transport error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.set(unreachable);
    }

    pub fn saves(&self) -> Vec<SaveRequest> {
        self.saves.borrow().clone()
    }

    pub fn sends(&self) -> Vec<(String, Vec<String>)> {
        self.sends.borrow().clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.borrow().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.get() {
            return Err(SyncError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

impl TemplateRepository for InMemoryRepository {
    fn list_all(&self) -> Result<Vec<RemoteTemplate>> {
        self.check_reachable()?;
        self.list_calls.set(self.list_calls.get() + 1);
        Ok(self
            .templates
            .borrow()
            .iter()
            .map(|t| RemoteTemplate {
                template_id: t.metadata.template_id.clone(),
                ..RemoteTemplate::new(t.name.clone())
            })
            .collect())
    }

    fn fetch(&self, name: &str) -> Result<Template> {
        self.check_reachable()?;
        self.fetches.borrow_mut().push(name.to_string());
        if self.failing_fetches.borrow().contains(name) {
            return Err(SyncError::Transport(format!("fetch of {} timed out", name)));
        }
        self.templates
            .borrow()
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| SyncError::RemoteTemplateNotFound(name.to_string()))
    }

    fn save(&self, request: &SaveRequest) -> Result<()> {
        self.check_reachable()?;
        self.saves.borrow_mut().push(request.clone());

        let mut saved = Template::new(request.template.clone(), request.content_html.clone());
        if let Some(existing) = self
            .templates
            .borrow()
            .iter()
            .find(|t| t.name == request.template)
        {
            saved.metadata = existing.metadata.clone();
        }
        self.insert(saved);
        Ok(())
    }

    fn send_test(&self, template: &str, recipients: &[String]) -> Result<String> {
        self.check_reachable()?;
        if !self.templates.borrow().iter().any(|t| t.name == template) {
            return Err(SyncError::RemoteTemplateNotFound(template.to_string()));
        }
        let mut sends = self.sends.borrow_mut();
        sends.push((template.to_string(), recipients.to_vec()));
        Ok(format!("send-{}", sends.len()))
    }
}
