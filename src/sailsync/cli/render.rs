use colored::Colorize;
use sailsync::commands::{CmdMessage, MessageLevel};

pub(super) fn render_message(message: &CmdMessage) -> String {
    match message.level {
        MessageLevel::Info => message.content.dimmed().to_string(),
        MessageLevel::Success => message.content.green().to_string(),
        MessageLevel::Warning => message.content.yellow().to_string(),
        MessageLevel::Error => message.content.red().to_string(),
    }
}

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        println!("{}", render_message(message));
    }
}

pub(super) fn print_watch_banner(name: &str) {
    println!(
        "{} {} {}",
        "Watching".bold(),
        name.cyan(),
        "(delete the file or press Ctrl-C to stop)".dimmed()
    );
}
