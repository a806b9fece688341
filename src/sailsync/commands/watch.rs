use super::helpers::ALL_TEMPLATES;
use super::push::{push_template, Guards};
use super::{CmdMessage, CmdResult, SyncContext};
use crate::error::{Result, SyncError};
use crate::remote::TemplateRepository;
use crate::store::TemplateStore;
use crate::watcher::WatchEvent;
use tracing::{info, warn};

/// Push `name` on every modification event until its file is removed.
///
/// Events are handled one at a time on the calling thread, so a push always
/// finishes before the next event is looked at; a burst of saves during a
/// push is picked up as the next event. Push failures are reported through
/// `report` and the loop keeps going. Removal ends the loop with
/// [`SyncError::WatchTerminated`].
pub fn run<S, R, I, F>(
    ctx: &SyncContext<S, R>,
    name: &str,
    events: I,
    mut report: F,
) -> Result<()>
where
    S: TemplateStore,
    R: TemplateRepository,
    I: IntoIterator<Item = WatchEvent>,
    F: FnMut(&CmdResult),
{
    if name == ALL_TEMPLATES {
        return Err(SyncError::Usage(
            "Watching needs a single template, not ALL TEMPLATES".to_string(),
        ));
    }

    let path = ctx.store.content_path(name);
    info!(template = %name, "watching {}", path.display());

    for event in events {
        match event {
            WatchEvent::Modified => {
                let mut result = CmdResult::default();
                match push_template(ctx, name, Guards::Relaxed) {
                    Ok(_) => {
                        result.add_message(CmdMessage::success(format!("Pushed {}", name)));
                        result.pushed.push(name.to_string());
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(template = %name, error = %e, "auto-push failed");
                        result.add_message(CmdMessage::error(format!(
                            "Auto-push of {} failed: {}",
                            name, e
                        )));
                        result.failed.push(name.to_string());
                    }
                }
                report(&result);
            }
            WatchEvent::Removed => {
                info!(template = %name, "watched file removed");
                return Err(SyncError::WatchTerminated(path));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Readiness, SyncSettings};
    use crate::model::Template;
    use crate::remote::memory::InMemoryRepository;
    use crate::store::memory::InMemoryStore;

    fn ctx() -> SyncContext<InMemoryStore, InMemoryRepository> {
        let store = InMemoryStore::new();
        store.put("welcome", "short");
        let repo = InMemoryRepository::new().with_template(Template::new("welcome", "old"));
        SyncContext::new(
            store,
            repo,
            SyncSettings {
                readiness: Readiness::immediate(),
                ..SyncSettings::default()
            },
        )
    }

    #[test]
    fn each_modification_pushes_without_guards() {
        let ctx = ctx();
        let mut reports = Vec::new();

        let outcome = run(
            &ctx,
            "welcome",
            [WatchEvent::Modified, WatchEvent::Modified],
            |r| reports.push(r.pushed.clone()),
        );

        assert!(outcome.is_ok());
        assert_eq!(ctx.repo.saves().len(), 2);
        assert_eq!(reports, vec![vec!["welcome"], vec!["welcome"]]);
    }

    #[test]
    fn removal_terminates_the_watch() {
        let ctx = ctx();
        let mut count = 0;

        let err = run(
            &ctx,
            "welcome",
            [WatchEvent::Modified, WatchEvent::Removed, WatchEvent::Modified],
            |_| count += 1,
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::WatchTerminated(_)));
        assert!(err.is_fatal());
        assert_eq!(count, 1);
        assert_eq!(ctx.repo.saves().len(), 1);
    }

    #[test]
    fn failed_push_keeps_watching() {
        let ctx = ctx();
        ctx.store.put("welcome", "");
        let mut failures = 0;

        run(&ctx, "welcome", [WatchEvent::Modified], |r| {
            failures += r.failed.len()
        })
        .unwrap();

        assert_eq!(failures, 1);
        assert!(ctx.repo.saves().is_empty());
    }

    #[test]
    fn watching_all_is_rejected() {
        let ctx = ctx();
        let err = run(&ctx, ALL_TEMPLATES, [WatchEvent::Modified], |_| {}).unwrap_err();
        assert!(matches!(err, SyncError::Usage(_)));
        assert!(ctx.repo.saves().is_empty());
    }
}
