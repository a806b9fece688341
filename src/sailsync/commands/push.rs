use super::helpers::{local_choices, select_template, Selection};
use super::{CmdMessage, CmdResult, SyncContext};
use crate::error::{Result, SyncError};
use crate::model::SaveRequest;
use crate::prompt::Prompter;
use crate::remote::TemplateRepository;
use crate::store::TemplateStore;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Content shorter than this many characters needs an explicit confirmation.
pub const TINY_CONTENT_THRESHOLD: usize = 100;

/// How long to wait for an editor's save to land before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            interval: Duration::from_millis(100),
        }
    }
}

impl Readiness {
    /// Check once, never wait.
    pub fn immediate() -> Self {
        Self {
            timeout: Duration::ZERO,
            interval: Duration::ZERO,
        }
    }
}

/// Which confirmations the push pipeline may ask for.
pub enum Guards<'p> {
    /// Manual push: confirm tiny content.
    Confirm(&'p mut dyn Prompter),
    /// Watch-triggered push: intent was established by the manual push.
    Relaxed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    Declined,
}

pub fn run<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    prompter: &mut dyn Prompter,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let local = ctx.store.list()?;

    if local.is_empty() {
        result.add_message(CmdMessage::info("No local templates to push."));
        return Ok(result);
    }

    let picked = select_template(
        prompter,
        "Pick a template to push",
        local_choices(&local),
        true,
    )?;

    match picked {
        None => Ok(result.abort("Push cancelled.")),
        Some(Selection::One(name)) => push_one(ctx, prompter, &name, result),
        Some(Selection::All) => {
            let mut names: Vec<String> = local.into_iter().map(|t| t.name).collect();
            names.sort();
            push_all(ctx, prompter, &names, result)
        }
    }
}

fn push_one<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    prompter: &mut dyn Prompter,
    name: &str,
    mut result: CmdResult,
) -> Result<CmdResult> {
    if !confirm_overwrite(ctx, prompter, name)? {
        return Ok(result.abort(format!("Push of {} cancelled.", name)));
    }

    match push_template(ctx, name, Guards::Confirm(&mut *prompter))? {
        PushOutcome::Declined => Ok(result.abort(format!("Push of {} cancelled.", name))),
        PushOutcome::Pushed => {
            result.add_message(CmdMessage::success(format!("Pushed {}", name)));
            result.pushed.push(name.to_string());
            if prompter.confirm(&format!("Watch {} and push on every save?", name), false)? {
                result.watch = Some(name.to_string());
            }
            Ok(result)
        }
    }
}

fn push_all<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    prompter: &mut dyn Prompter,
    names: &[String],
    mut result: CmdResult,
) -> Result<CmdResult> {
    for name in names {
        if !confirm_overwrite(ctx, prompter, name)? {
            result.add_message(CmdMessage::info(format!("Skipped {}", name)));
            continue;
        }

        match push_template(ctx, name, Guards::Confirm(&mut *prompter)) {
            Ok(PushOutcome::Pushed) => {
                result.add_message(CmdMessage::success(format!("Pushed {}", name)));
                result.pushed.push(name.clone());
            }
            Ok(PushOutcome::Declined) => {
                result.add_message(CmdMessage::info(format!("Skipped {}", name)));
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(template = %name, error = %e, "push failed");
                result.add_message(CmdMessage::error(format!("Failed to push {}: {}", name, e)));
                result.failed.push(name.clone());
            }
        }
    }

    result.add_message(CmdMessage::info(format!(
        "Pushed {} of {} templates.",
        result.pushed.len(),
        names.len()
    )));
    Ok(result)
}

/// Overwriting an existing remote template needs a yes. Creating one does not.
fn confirm_overwrite<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    prompter: &mut dyn Prompter,
    name: &str,
) -> Result<bool> {
    if !ctx.catalog.contains(&ctx.repo, name)? {
        debug!(template = %name, "not in remote catalog, will create");
        return Ok(true);
    }
    prompter.confirm(
        &format!("{} already exists in Sailthru. Overwrite it?", name),
        false,
    )
}

/// The push pipeline: read settled content, guard tiny content, merge the
/// sidecar and save.
pub fn push_template<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    name: &str,
    guards: Guards<'_>,
) -> Result<PushOutcome> {
    let content = read_ready(&ctx.store, name, &ctx.settings.readiness)?;

    let length = content.chars().count();
    if length < TINY_CONTENT_THRESHOLD {
        if let Guards::Confirm(prompter) = guards {
            let question = format!(
                "{} is only {} characters long. Push it anyway?",
                name, length
            );
            if !prompter.confirm(&question, false)? {
                return Ok(PushOutcome::Declined);
            }
        }
    }

    let metadata = ctx.store.read_metadata(name)?;
    let request =
        SaveRequest::from_local(name, content, metadata, &ctx.settings.default_options);
    debug!(
        template = %name,
        visual = request.visual.is_some(),
        "saving template"
    );
    ctx.repo.save(&request)?;
    info!(template = %name, "pushed");
    Ok(PushOutcome::Pushed)
}

/// Read content, retrying while it is empty or missing, until the deadline.
fn read_ready<S: TemplateStore>(store: &S, name: &str, readiness: &Readiness) -> Result<String> {
    let deadline = Instant::now() + readiness.timeout;
    loop {
        let missing = match store.read(name) {
            Ok(content) if !content.is_empty() => return Ok(content),
            Ok(_) => false,
            Err(SyncError::ContentNotFound(_)) => true,
            Err(e) => return Err(e),
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(if missing {
                SyncError::ContentNotFound(name.to_string())
            } else {
                SyncError::ContentNotReady(name.to_string())
            });
        }
        debug!(template = %name, missing, "content not ready, waiting");
        thread::sleep(readiness.interval.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{SyncSettings, ALL_TEMPLATES};
    use crate::model::{Template, TemplateMetadata, VISUAL_MODE};
    use crate::prompt::{Answer, ScriptedPrompter};
    use crate::remote::memory::InMemoryRepository;
    use crate::store::memory::InMemoryStore;

    fn ctx(
        store: InMemoryStore,
        repo: InMemoryRepository,
    ) -> SyncContext<InMemoryStore, InMemoryRepository> {
        let settings = SyncSettings {
            readiness: Readiness {
                timeout: Duration::from_millis(30),
                interval: Duration::from_millis(5),
            },
            ..SyncSettings::default()
        };
        SyncContext::new(store, repo, settings)
    }

    fn chars(n: usize) -> String {
        "x".repeat(n)
    }

    #[test]
    fn content_at_threshold_is_pushed_without_asking() {
        let store = InMemoryStore::new();
        store.put("a", &chars(100));
        let ctx = ctx(store, InMemoryRepository::new());
        let mut prompter = ScriptedPrompter::silent();

        let outcome = push_template(&ctx, "a", Guards::Confirm(&mut prompter)).unwrap();

        assert_eq!(outcome, PushOutcome::Pushed);
        assert!(prompter.asked().is_empty());
        assert_eq!(ctx.repo.saves().len(), 1);
    }

    #[test]
    fn content_below_threshold_asks_first() {
        let store = InMemoryStore::new();
        store.put("a", &chars(99));
        let ctx = ctx(store, InMemoryRepository::new());
        let mut prompter = ScriptedPrompter::new([Answer::No]);

        let outcome = push_template(&ctx, "a", Guards::Confirm(&mut prompter)).unwrap();

        assert_eq!(outcome, PushOutcome::Declined);
        assert_eq!(prompter.asked().len(), 1);
        assert!(ctx.repo.saves().is_empty());
    }

    #[test]
    fn threshold_counts_characters_not_bytes() {
        let store = InMemoryStore::new();
        store.put("a", &"é".repeat(99));
        let ctx = ctx(store, InMemoryRepository::new());
        let mut prompter = ScriptedPrompter::new([Answer::Yes]);

        let outcome = push_template(&ctx, "a", Guards::Confirm(&mut prompter)).unwrap();

        assert_eq!(outcome, PushOutcome::Pushed);
        assert_eq!(prompter.asked().len(), 1);
    }

    #[test]
    fn relaxed_guards_never_ask() {
        let store = InMemoryStore::new();
        store.put("a", "tiny");
        let ctx = ctx(store, InMemoryRepository::new());

        let outcome = push_template(&ctx, "a", Guards::Relaxed).unwrap();

        assert_eq!(outcome, PushOutcome::Pushed);
        assert_eq!(ctx.repo.saves()[0].content_html, "tiny");
    }

    #[test]
    fn pushing_unchanged_content_twice_succeeds() {
        let store = InMemoryStore::new();
        store.put("a", &chars(150));
        let ctx = ctx(store, InMemoryRepository::new());

        push_template(&ctx, "a", Guards::Relaxed).unwrap();
        push_template(&ctx, "a", Guards::Relaxed).unwrap();

        let saves = ctx.repo.saves();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0], saves[1]);
    }

    #[test]
    fn plain_template_sends_only_html() {
        let store = InMemoryStore::new();
        store.put("a", &chars(150));
        store.put_metadata(
            "a",
            TemplateMetadata {
                subject: Some("ignored".into()),
                ..TemplateMetadata::default()
            },
        );
        let ctx = ctx(store, InMemoryRepository::new());

        push_template(&ctx, "a", Guards::Relaxed).unwrap();

        assert_eq!(ctx.repo.saves()[0].visual, None);
    }

    #[test]
    fn visual_template_sends_labels_as_a_set() {
        let store = InMemoryStore::new();
        store.put("a", &chars(150));
        store.put_metadata(
            "a",
            TemplateMetadata {
                mode: Some(VISUAL_MODE.to_string()),
                labels: vec!["x".into(), "y".into(), "x".into()],
                ..TemplateMetadata::default()
            },
        );
        let ctx = ctx(store, InMemoryRepository::new());

        push_template(&ctx, "a", Guards::Relaxed).unwrap();

        let payload = serde_json::to_value(&ctx.repo.saves()[0]).unwrap();
        assert_eq!(payload["labels"], serde_json::json!({"x": 1, "y": 1}));
        assert_eq!(payload["mode"], VISUAL_MODE);
    }

    #[test]
    fn waits_for_content_to_land() {
        let store = InMemoryStore::new();
        store.put("a", &chars(150));
        store.queue_reads("a", &["", ""]);
        let ctx = ctx(store, InMemoryRepository::new());

        push_template(&ctx, "a", Guards::Relaxed).unwrap();

        assert_eq!(ctx.repo.saves()[0].content_html, chars(150));
    }

    #[test]
    fn empty_content_times_out() {
        let store = InMemoryStore::new();
        store.put("a", "");
        let ctx = ctx(store, InMemoryRepository::new());

        let err = push_template(&ctx, "a", Guards::Relaxed).unwrap_err();

        assert!(matches!(err, SyncError::ContentNotReady(name) if name == "a"));
        assert!(ctx.repo.saves().is_empty());
    }

    #[test]
    fn missing_content_is_not_found() {
        let ctx = ctx(InMemoryStore::new(), InMemoryRepository::new());
        let err = push_template(&ctx, "ghost", Guards::Relaxed).unwrap_err();
        assert!(matches!(err, SyncError::ContentNotFound(_)));
    }

    #[test]
    fn declining_overwrite_aborts_single_push() {
        let store = InMemoryStore::new();
        store.put("a", &chars(150));
        let repo = InMemoryRepository::new().with_template(Template::new("a", "old"));
        let ctx = ctx(store, repo);
        let mut prompter = ScriptedPrompter::new([Answer::Pick("a".into()), Answer::No]);

        let result = run(&ctx, &mut prompter).unwrap();

        assert!(result.aborted);
        assert!(ctx.repo.saves().is_empty());
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn new_template_is_created_without_overwrite_prompt() {
        let store = InMemoryStore::new();
        store.put("fresh", &chars(150));
        let ctx = ctx(store, InMemoryRepository::new());
        let mut prompter = ScriptedPrompter::new([Answer::Pick("fresh".into()), Answer::Yes]);

        let result = run(&ctx, &mut prompter).unwrap();

        assert_eq!(result.pushed, vec!["fresh"]);
        assert_eq!(result.watch.as_deref(), Some("fresh"));
        assert_eq!(prompter.asked().len(), 2);
    }

    #[test]
    fn push_all_confirms_each_existing_template() {
        let store = InMemoryStore::new();
        store.put("b", &chars(150));
        store.put("a", &chars(150));
        store.put("c", &chars(150));
        let repo = InMemoryRepository::new()
            .with_template(Template::new("a", "old"))
            .with_template(Template::new("b", "old"));
        let ctx = ctx(store, repo);
        let mut prompter = ScriptedPrompter::new([
            Answer::Pick(ALL_TEMPLATES.into()),
            Answer::No,
            Answer::Yes,
        ]);

        let result = run(&ctx, &mut prompter).unwrap();

        assert_eq!(result.pushed, vec!["b", "c"]);
        assert!(!result.aborted);
        assert!(result.watch.is_none());
        let saved: Vec<_> = ctx.repo.saves().into_iter().map(|s| s.template).collect();
        assert_eq!(saved, vec!["b", "c"]);
    }

    #[test]
    fn push_all_continues_past_failures() {
        let store = InMemoryStore::new();
        store.put("a", "");
        store.put("b", &chars(150));
        let ctx = ctx(store, InMemoryRepository::new());
        let mut prompter = ScriptedPrompter::new([Answer::Pick(ALL_TEMPLATES.into())]);

        let result = run(&ctx, &mut prompter).unwrap();

        assert_eq!(result.failed, vec!["a"]);
        assert_eq!(result.pushed, vec!["b"]);
        assert!(result.has_failures());
    }

    #[test]
    fn no_local_templates_is_reported() {
        let ctx = ctx(InMemoryStore::new(), InMemoryRepository::new());
        let result = run(&ctx, &mut ScriptedPrompter::silent()).unwrap();
        assert!(result.pushed.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
