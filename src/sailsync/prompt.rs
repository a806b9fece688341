//! The "ask the user" seam.
//!
//! Flows need answers mid-way (which template, overwrite or not), so they take
//! a [`Prompter`] instead of returning early to the UI. The terminal
//! implementation lives in the CLI layer; tests use [`ScriptedPrompter`].

use crate::error::Result;

/// A selectable item: what it is called, plus optional secondary text the
/// UI may show next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub detail: Option<String>,
}

impl Choice {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

pub trait Prompter {
    /// Pick one of `choices`. `None` means the user backed out.
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<Option<usize>>;

    /// Like `select`, with type-to-filter.
    fn fuzzy_select(&mut self, message: &str, choices: &[Choice]) -> Result<Option<usize>> {
        self.select(message, choices)
    }

    fn text(&mut self, message: &str) -> Result<String>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
}

/// One scripted answer.
#[cfg(any(test, feature = "test_utils"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Select the item with this label.
    Pick(String),
    /// Back out of a selection.
    Cancel,
    Text(String),
    Yes,
    No,
}

/// Answers prompts from a queue and panics on anything unexpected, so a test
/// fails loudly when a flow asks a question it should not.
#[cfg(any(test, feature = "test_utils"))]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<Answer>,
    asked: Vec<String>,
}

#[cfg(any(test, feature = "test_utils"))]
impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// A prompter that must never be asked anything.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Every prompt message seen so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Answer {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {message}"))
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl Prompter for ScriptedPrompter {
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<Option<usize>> {
        match self.next(message) {
            Answer::Pick(label) => {
                let idx = choices
                    .iter()
                    .position(|choice| choice.label == label)
                    .unwrap_or_else(|| panic!("{label:?} not offered in {choices:?}"));
                Ok(Some(idx))
            }
            Answer::Cancel => Ok(None),
            other => panic!("expected a selection for {message:?}, scripted {other:?}"),
        }
    }

    fn text(&mut self, message: &str) -> Result<String> {
        match self.next(message) {
            Answer::Text(text) => Ok(text),
            other => panic!("expected text for {message:?}, scripted {other:?}"),
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
        match self.next(message) {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            other => panic!("expected a confirmation for {message:?}, scripted {other:?}"),
        }
    }
}
