//! # Command Layer
//!
//! The sync engine. Each workflow lives in its own submodule:
//!
//! - [`test_send`]: send a remote template to a list of recipients
//! - [`pull`]: copy remote templates (one or all) into the local store
//! - [`push`]: save local templates (one or all) to the remote store, and the
//!   push pipeline every push goes through
//! - [`watch`]: re-run the push pipeline whenever the watched file changes
//! - [`helpers`]: template pickers and the cached remote catalog
//!
//! Commands talk to the user only through a [`Prompter`](crate::prompt::Prompter)
//! and report through [`CmdResult`]; they never print or exit. A declined
//! confirmation is an ordinary result with `aborted` set, not an error.

use crate::error::Result;
use crate::model::TemplateMetadata;
use crate::prompt::{Choice, Prompter};
use crate::recipients::AliasTable;
use crate::remote::TemplateRepository;
use crate::store::TemplateStore;

pub mod helpers;
pub mod pull;
pub mod push;
pub mod test_send;
pub mod watch;

pub use helpers::{Catalog, Selection, ALL_TEMPLATES};
pub use push::{Guards, PushOutcome, Readiness, TINY_CONTENT_THRESHOLD};

/// Settings that do not change for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct SyncSettings {
    pub aliases: AliasTable,
    pub default_options: TemplateMetadata,
    pub readiness: Readiness,
}

/// Everything a flow needs: both stores, the catalog cache and settings.
pub struct SyncContext<S: TemplateStore, R: TemplateRepository> {
    pub store: S,
    pub repo: R,
    pub catalog: Catalog,
    pub settings: SyncSettings,
}

impl<S: TemplateStore, R: TemplateRepository> SyncContext<S, R> {
    pub fn new(store: S, repo: R, settings: SyncSettings) -> Self {
        Self {
            store,
            repo,
            catalog: Catalog::default(),
            settings,
        }
    }
}

/// The three top-level workflows, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Test,
    Push,
    Pull,
}

impl Workflow {
    pub const ALL: [Workflow; 3] = [Workflow::Test, Workflow::Push, Workflow::Pull];

    pub fn title(&self) -> &'static str {
        match self {
            Workflow::Test => "Send email test",
            Workflow::Push => "Push local code",
            Workflow::Pull => "Pull Sailthru code",
        }
    }

    /// Ask which workflow to run. `None` if the user backed out.
    pub fn choose(prompter: &mut dyn Prompter) -> Result<Option<Workflow>> {
        let choices: Vec<Choice> = Self::ALL.iter().map(|w| Choice::new(w.title())).collect();
        Ok(prompter
            .select("Pick a section", &choices)?
            .map(|idx| Self::ALL[idx]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Templates written locally.
    pub pulled: Vec<String>,
    /// Templates saved remotely.
    pub pushed: Vec<String>,
    /// Templates whose pull or push failed in a batch.
    pub failed: Vec<String>,
    /// Provider send id of a test send.
    pub send_id: Option<String>,
    /// Template the user asked to keep watching.
    pub watch: Option<String>,
    /// The user declined a confirmation or backed out of a menu.
    pub aborted: bool,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    /// Mark the flow as stopped by the user.
    pub fn abort(mut self, reason: impl Into<String>) -> Self {
        self.aborted = true;
        self.add_message(CmdMessage::info(reason));
        self
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
