//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every
//! sailsync operation, whatever the UI.
//!
//! The facade dispatches to the command functions and returns structured
//! results. It does no terminal I/O and holds no business logic.
//!
//! ## Generic Over Both Stores
//!
//! `SyncApi<S: TemplateStore, R: TemplateRepository>`:
//! - Production: `SyncApi<FileStore, SailthruClient>`
//! - Testing: `SyncApi<InMemoryStore, InMemoryRepository>`
//!
//! The remote catalog is cached inside the facade, so it is fetched at most
//! once per process no matter how many flows run.

use crate::commands::{self, CmdResult, SyncContext, SyncSettings, Workflow};
use crate::error::Result;
use crate::model::{LocalTemplate, RemoteTemplate};
use crate::prompt::Prompter;
use crate::remote::TemplateRepository;
use crate::store::TemplateStore;
use crate::watcher::WatchEvent;

pub struct SyncApi<S: TemplateStore, R: TemplateRepository> {
    ctx: SyncContext<S, R>,
}

impl<S: TemplateStore, R: TemplateRepository> SyncApi<S, R> {
    pub fn new(store: S, repo: R, settings: SyncSettings) -> Self {
        Self {
            ctx: SyncContext::new(store, repo, settings),
        }
    }

    /// Ask which workflow to run, then run it. Backing out of the menu is an
    /// aborted result.
    pub fn run(&self, prompter: &mut dyn Prompter) -> Result<CmdResult> {
        match Workflow::choose(prompter)? {
            Some(workflow) => self.run_workflow(workflow, prompter),
            None => Ok(CmdResult::default().abort("Nothing to do.")),
        }
    }

    pub fn run_workflow(
        &self,
        workflow: Workflow,
        prompter: &mut dyn Prompter,
    ) -> Result<CmdResult> {
        match workflow {
            Workflow::Test => self.test_send(prompter),
            Workflow::Push => self.push(prompter),
            Workflow::Pull => self.pull(prompter),
        }
    }

    pub fn test_send(&self, prompter: &mut dyn Prompter) -> Result<CmdResult> {
        commands::test_send::run(&self.ctx, prompter)
    }

    pub fn pull(&self, prompter: &mut dyn Prompter) -> Result<CmdResult> {
        commands::pull::run(&self.ctx, prompter)
    }

    pub fn push(&self, prompter: &mut dyn Prompter) -> Result<CmdResult> {
        commands::push::run(&self.ctx, prompter)
    }

    /// Keep pushing `name` as `events` report changes. Returns
    /// `WatchTerminated` when the file is removed.
    pub fn watch<I, F>(&self, name: &str, events: I, report: F) -> Result<()>
    where
        I: IntoIterator<Item = WatchEvent>,
        F: FnMut(&CmdResult),
    {
        commands::watch::run(&self.ctx, name, events, report)
    }

    pub fn local_templates(&self) -> Result<Vec<LocalTemplate>> {
        self.ctx.store.list()
    }

    pub fn remote_templates(&self) -> Result<&[RemoteTemplate]> {
        self.ctx.catalog.get(&self.ctx.repo)
    }

    pub fn store(&self) -> &S {
        &self.ctx.store
    }

    pub fn repo(&self) -> &R {
        &self.ctx.repo
    }
}
