use crate::error::Result;
use crate::model::{LocalTemplate, RemoteTemplate};
use crate::prompt::{Choice, Prompter};
use crate::remote::TemplateRepository;
use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use timeago::Formatter;
use tracing::debug;

/// Label of the synthetic "every template" menu entry.
pub const ALL_TEMPLATES: &str = "ALL TEMPLATES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    One(String),
    All,
}

/// The remote catalog, fetched on first use and kept for the rest of the run.
#[derive(Debug, Default)]
pub struct Catalog {
    templates: OnceCell<Vec<RemoteTemplate>>,
}

impl Catalog {
    pub fn get<R: TemplateRepository>(&self, repo: &R) -> Result<&[RemoteTemplate]> {
        self.templates
            .get_or_try_init(|| {
                debug!("Fetching remote template catalog");
                repo.list_all()
            })
            .map(Vec::as_slice)
    }

    pub fn contains<R: TemplateRepository>(&self, repo: &R, name: &str) -> Result<bool> {
        Ok(self.get(repo)?.iter().any(|t| t.name == name))
    }

    pub fn names<R: TemplateRepository>(&self, repo: &R) -> Result<Vec<String>> {
        Ok(self.get(repo)?.iter().map(|t| t.name.clone()).collect())
    }
}

pub fn remote_choices(catalog: &[RemoteTemplate]) -> Vec<Choice> {
    catalog.iter().map(|t| Choice::new(t.name.clone())).collect()
}

pub fn local_choices(templates: &[LocalTemplate]) -> Vec<Choice> {
    let now = Utc::now();
    templates
        .iter()
        .map(|t| Choice::new(t.name.clone()).with_detail(format_time_ago(t.modified, now)))
        .collect()
}

/// Ask for one template out of `choices`, optionally offering ALL as the last
/// entry. `None` if the user backed out.
pub fn select_template(
    prompter: &mut dyn Prompter,
    message: &str,
    mut choices: Vec<Choice>,
    offer_all: bool,
) -> Result<Option<Selection>> {
    let count = choices.len();
    if offer_all {
        choices.push(Choice::new(ALL_TEMPLATES));
    }
    Ok(prompter
        .fuzzy_select(message, &choices)?
        .map(|idx| {
            if idx >= count {
                Selection::All
            } else {
                Selection::One(choices[idx].label.clone())
            }
        }))
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use crate::remote::memory::InMemoryRepository;
    use crate::model::Template;
    use chrono::Duration;

    #[test]
    fn catalog_is_fetched_once() {
        let repo = InMemoryRepository::new().with_template(Template::new("a", "<p/>"));
        let catalog = Catalog::default();

        assert!(catalog.contains(&repo, "a").unwrap());
        assert!(!catalog.contains(&repo, "b").unwrap());
        assert_eq!(catalog.names(&repo).unwrap(), vec!["a"]);
        assert_eq!(repo.list_calls(), 1);
    }

    #[test]
    fn catalog_does_not_refresh_mid_session() {
        let repo = InMemoryRepository::new().with_template(Template::new("a", "<p/>"));
        let catalog = Catalog::default();
        catalog.get(&repo).unwrap();

        repo.insert(Template::new("b", "<p/>"));
        assert!(!catalog.contains(&repo, "b").unwrap());
    }

    #[test]
    fn all_entry_maps_to_selection_all() {
        let mut prompter = ScriptedPrompter::new([Answer::Pick(ALL_TEMPLATES.into())]);
        let choices = vec![Choice::new("a"), Choice::new("b")];
        let picked = select_template(&mut prompter, "Pick", choices, true).unwrap();
        assert_eq!(picked, Some(Selection::All));
    }

    #[test]
    fn named_entry_maps_to_selection_one() {
        let mut prompter = ScriptedPrompter::new([Answer::Pick("b".into())]);
        let choices = vec![Choice::new("a"), Choice::new("b")];
        let picked = select_template(&mut prompter, "Pick", choices, true).unwrap();
        assert_eq!(picked, Some(Selection::One("b".into())));
    }

    #[test]
    fn cancel_maps_to_none() {
        let mut prompter = ScriptedPrompter::new([Answer::Cancel]);
        let picked = select_template(&mut prompter, "Pick", vec![Choice::new("a")], false).unwrap();
        assert_eq!(picked, None);
    }

    #[test]
    fn local_choices_carry_edit_age() {
        let modified = Utc::now() - Duration::minutes(3);
        let choices = local_choices(&[LocalTemplate {
            name: "welcome".into(),
            modified,
        }]);
        assert_eq!(choices[0].label, "welcome");
        assert!(choices[0].detail.as_deref().unwrap().contains("minute"));
    }
}
