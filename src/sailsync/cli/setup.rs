use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sailsync", bin_name = "sailsync", version)]
#[command(
    about = "Sync Sailthru email templates with local files",
    long_about = "Sync Sailthru email templates with local files.\n\n\
        Pick a workflow from the menu: send a test email, push local templates \
        to Sailthru, or pull Sailthru templates into the templates directory. \
        After a single push or pull you can keep watching the file and push on \
        every save."
)]
pub struct Cli {
    /// Load credentials from .env.<ENV> instead of .env ("debug" also turns on debug logging)
    #[arg(short, long, value_name = "ENV")]
    pub env: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["sailsync"]).unwrap();
        assert_eq!(cli.env, None);
        assert!(!cli.verbose);
    }

    #[test]
    fn env_selects_a_named_file() {
        let cli = Cli::try_parse_from(["sailsync", "--env", "prod", "-v"]).unwrap();
        assert_eq!(cli.env.as_deref(), Some("prod"));
        assert!(cli.verbose);
    }

    #[test]
    fn rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["sailsync", "push"]).is_err());
    }
}
