use console::{style, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input, Select};
use sailsync::error::{Result, SyncError};
use sailsync::prompt::{Choice, Prompter};

/// Terminal prompts.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        let theme = ColorfulTheme {
            prompt_style: Style::new().bold(),
            active_item_style: Style::new().cyan().bold(),
            ..ColorfulTheme::default()
        };
        Self { theme }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn items(choices: &[Choice]) -> Vec<String> {
    choices
        .iter()
        .map(|choice| match &choice.detail {
            Some(detail) => format!("{}  {}", choice.label, style(detail).dim().italic()),
            None => choice.label.clone(),
        })
        .collect()
}

fn prompt_error(err: dialoguer::Error) -> SyncError {
    SyncError::Prompt(err.to_string())
}

impl Prompter for DialoguerPrompter {
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<Option<usize>> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(&items(choices))
            .default(0)
            .interact_opt()
            .map_err(prompt_error)
    }

    fn fuzzy_select(&mut self, message: &str, choices: &[Choice]) -> Result<Option<usize>> {
        FuzzySelect::with_theme(&self.theme)
            .with_prompt(message)
            .items(&items(choices))
            .default(0)
            .interact_opt()
            .map_err(prompt_error)
    }

    fn text(&mut self, message: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_without_detail_are_plain_labels() {
        let rendered = items(&[Choice::new("welcome")]);
        assert_eq!(rendered, vec!["welcome"]);
    }

    #[test]
    fn items_with_detail_keep_the_label_first() {
        let rendered = items(&[Choice::new("welcome").with_detail("3 minutes ago")]);
        assert!(rendered[0].starts_with("welcome  "));
        assert!(rendered[0].contains("3 minutes ago"));
    }
}
