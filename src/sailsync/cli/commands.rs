use super::prompt::DialoguerPrompter;
use super::render::{print_messages, print_watch_banner};
use super::setup::Cli;
use clap::Parser;
use sailsync::api::SyncApi;
use sailsync::commands::{CmdMessage, SyncSettings};
use sailsync::config::{self, Credentials, SailsyncConfig, DEBUG_ENV};
use sailsync::error::{Result, SyncError};
use sailsync::remote::sailthru::SailthruClient;
use sailsync::store::fs::FileStore;
use sailsync::store::TemplateStore;
use sailsync::watcher::FileSubscription;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

type AppApi = SyncApi<FileStore, SailthruClient>;

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let api = init_api(&cli)?;
    let mut prompter = DialoguerPrompter::new();

    let result = api.run(&mut prompter)?;
    print_messages(&result.messages);
    if result.has_failures() {
        return Ok(ExitCode::FAILURE);
    }

    match result.watch {
        Some(name) => handle_watch(&api, &name),
        None => Ok(ExitCode::SUCCESS),
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose || cli.env.as_deref() == Some(DEBUG_ENV) {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sailsync={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn init_api(cli: &Cli) -> Result<AppApi> {
    let cwd = std::env::current_dir()?;

    if let Some(path) = config::load_env_file(&cwd, cli.env.as_deref())? {
        debug!("Loaded environment from {}", path.display());
    }
    let credentials = Credentials::from_env()?;

    let config = SailsyncConfig::load(&cwd)?;
    let (templates_dir, options_dir) = config.resolve_dirs(&cwd);
    debug!(
        "Templates in {}, options in {}",
        templates_dir.display(),
        options_dir.display()
    );

    let store = FileStore::new(templates_dir, options_dir);
    let client = SailthruClient::new(credentials, config::api_url())?;
    let settings = SyncSettings {
        aliases: config.alias_table(),
        default_options: config.default_options,
        ..SyncSettings::default()
    };

    Ok(SyncApi::new(store, client, settings))
}

fn handle_watch(api: &AppApi, name: &str) -> Result<ExitCode> {
    let events = FileSubscription::new(api.store().content_path(name))?;
    print_watch_banner(name);

    let outcome = api.watch(name, events, |result| print_messages(&result.messages));
    if let Some(message) = watch_stopped(outcome)? {
        print_messages(&[message]);
    }
    Ok(ExitCode::SUCCESS)
}

/// Removing the watched file ends the session normally, with a warning.
/// Any other error is passed on.
fn watch_stopped(outcome: Result<()>) -> Result<Option<CmdMessage>> {
    match outcome {
        Ok(()) => Ok(None),
        Err(SyncError::WatchTerminated(path)) => Ok(Some(CmdMessage::warning(format!(
            "{} was removed, stopped watching.",
            path.display()
        )))),
        Err(e) => Err(e),
    }
}
