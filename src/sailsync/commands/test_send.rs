use super::helpers::{remote_choices, select_template, Selection};
use super::{CmdMessage, CmdResult, SyncContext};
use crate::error::Result;
use crate::prompt::Prompter;
use crate::recipients;
use crate::remote::TemplateRepository;
use crate::store::TemplateStore;
use tracing::info;

/// Resolve recipients, pick a remote template and send it to them.
pub fn run<S: TemplateStore, R: TemplateRepository>(
    ctx: &SyncContext<S, R>,
    prompter: &mut dyn Prompter,
) -> Result<CmdResult> {
    let raw = prompter.text("Send to (comma separated addresses or aliases)")?;
    let recipients = recipients::resolve(&raw, &ctx.settings.aliases)?;

    let mut result = CmdResult::default();
    let catalog = ctx.catalog.get(&ctx.repo)?;
    if catalog.is_empty() {
        result.add_message(CmdMessage::info("No templates found in Sailthru."));
        return Ok(result);
    }

    let name = match select_template(
        prompter,
        "Pick a template to send",
        remote_choices(catalog),
        false,
    )? {
        Some(Selection::One(name)) => name,
        _ => return Ok(result.abort("Test send cancelled.")),
    };

    let send_id = ctx.repo.send_test(&name, &recipients)?;
    info!(template = %name, send_id = %send_id, recipients = recipients.len(), "test sent");

    result.add_message(CmdMessage::success(format!(
        "Sent {} to {}",
        name,
        recipients.join(", ")
    )));
    result.add_message(CmdMessage::info(format!("Send id: {}", send_id)));
    result.send_id = Some(send_id);
    Ok(result)
}
