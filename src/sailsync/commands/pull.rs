use super::helpers::{remote_choices, select_template, Selection};
use super::{CmdMessage, CmdResult, SyncContext};
use crate::error::Result;
use crate::prompt::Prompter;
use crate::remote::TemplateRepository;
use crate::store::TemplateStore;
use tracing::{info, warn};

pub fn run<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    prompter: &mut dyn Prompter,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let catalog = ctx.catalog.get(&ctx.repo)?;

    if catalog.is_empty() {
        result.add_message(CmdMessage::info("No templates found in Sailthru."));
        return Ok(result);
    }

    let picked = select_template(
        prompter,
        "Pick a template to pull",
        remote_choices(catalog),
        true,
    )?;

    match picked {
        None => Ok(result.abort("Pull cancelled.")),
        Some(Selection::One(name)) => pull_one(ctx, prompter, &name, result),
        Some(Selection::All) => {
            let names = ctx.catalog.names(&ctx.repo)?;
            pull_all(ctx, prompter, &names, result)
        }
    }
}

fn pull_one<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    prompter: &mut dyn Prompter,
    name: &str,
    mut result: CmdResult,
) -> Result<CmdResult> {
    if ctx.store.exists(name) {
        let question = format!("{} already exists locally. Overwrite it?", name);
        if !prompter.confirm(&question, false)? {
            return Ok(result.abort(format!("Pull of {} cancelled.", name)));
        }
    }

    fetch_and_write(ctx, name)?;
    result.add_message(CmdMessage::success(format!(
        "Saved {}",
        ctx.store.content_path(name).display()
    )));
    result.pulled.push(name.to_string());

    if prompter.confirm(&format!("Watch {} and push on every save?", name), false)? {
        result.watch = Some(name.to_string());
    }
    Ok(result)
}

fn pull_all<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    prompter: &mut dyn Prompter,
    names: &[String],
    mut result: CmdResult,
) -> Result<CmdResult> {
    let question = format!(
        "This overwrites local copies of all {} templates. Continue?",
        names.len()
    );
    if !prompter.confirm(&question, false)? {
        return Ok(result.abort("Pull cancelled."));
    }

    for name in names {
        match fetch_and_write(ctx, name) {
            Ok(()) => {
                result.add_message(CmdMessage::success(format!("Pulled {}", name)));
                result.pulled.push(name.clone());
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(template = %name, error = %e, "pull failed");
                result.add_message(CmdMessage::error(format!("Failed to pull {}: {}", name, e)));
                result.failed.push(name.clone());
            }
        }
    }

    result.add_message(CmdMessage::info(format!(
        "Pulled {} of {} templates.",
        result.pulled.len(),
        names.len()
    )));
    Ok(result)
}

fn fetch_and_write<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    name: &str,
) -> Result<()> {
    let template = ctx.repo.fetch(name)?;
    ctx.store.write(&template)?;
    info!(template = %name, "pulled");
    Ok(())
}
