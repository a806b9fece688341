use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// `mode` value Sailthru uses for templates built with the visual editor.
pub const VISUAL_MODE: &str = "visual_email";

/// Labels as Sailthru expects them on save: `{"label": 1}`.
pub type LabelSet = BTreeMap<String, u8>;

pub fn label_set(labels: &[String]) -> LabelSet {
    labels.iter().map(|label| (label.clone(), 1)).collect()
}

/// Sidecar metadata stored next to a template's HTML.
///
/// Only the fields the sync engine reads are typed; everything else Sailthru
/// returns is kept in `extra` so a pull/push cycle does not drop it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replyto_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preheader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(
        default,
        rename = "linkParams",
        alias = "link_params",
        deserialize_with = "lenient_string_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub link_params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_basic: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_link_tracking: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub template_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemplateMetadata {
    pub fn is_visual(&self) -> bool {
        self.mode.as_deref() == Some(VISUAL_MODE)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fills every unset field from `defaults`; values already present win.
    pub fn with_defaults(mut self, defaults: &TemplateMetadata) -> Self {
        fn fill(slot: &mut Option<String>, fallback: &Option<String>) {
            if slot.is_none() {
                slot.clone_from(fallback);
            }
        }
        fill(&mut self.subject, &defaults.subject);
        fill(&mut self.from_name, &defaults.from_name);
        fill(&mut self.from_email, &defaults.from_email);
        fill(&mut self.replyto_email, &defaults.replyto_email);
        fill(&mut self.preheader, &defaults.preheader);
        fill(&mut self.setup, &defaults.setup);
        if self.labels.is_empty() {
            self.labels.clone_from(&defaults.labels);
        }
        if self.tags.is_empty() {
            self.tags.clone_from(&defaults.tags);
        }
        if self.link_params.is_empty() {
            self.link_params.clone_from(&defaults.link_params);
        }
        self
    }
}

/// A template with its content, as fetched from or written to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub content_html: String,
    pub metadata: TemplateMetadata,
}

impl Template {
    pub fn new(name: impl Into<String>, content_html: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_html: content_html.into(),
            metadata: TemplateMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One entry of the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTemplate {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub template_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template_id: None,
            extra: Map::new(),
        }
    }
}

/// A template content file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTemplate {
    pub name: String,
    pub modified: DateTime<Utc>,
}

/// Body of a template save call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub template: String,
    pub content_html: String,
    #[serde(flatten)]
    pub visual: Option<VisualFields>,
}

/// The extra fields a visual template carries on save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replyto_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preheader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    pub labels: LabelSet,
    pub tags: Vec<String>,
    pub link_params: BTreeMap<String, String>,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_json: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_basic: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_link_tracking: Option<Value>,
}

impl SaveRequest {
    /// Builds the save payload for a local template.
    ///
    /// Plain templates only carry their HTML. Visual templates carry the full
    /// sidecar, with unset fields taken from `defaults`.
    pub fn from_local(
        name: &str,
        content_html: String,
        metadata: Option<TemplateMetadata>,
        defaults: &TemplateMetadata,
    ) -> Self {
        let visual = metadata
            .filter(TemplateMetadata::is_visual)
            .map(|meta| meta.with_defaults(defaults))
            .map(|meta| VisualFields {
                labels: label_set(&meta.labels),
                subject: meta.subject,
                from_name: meta.from_name,
                from_email: meta.from_email,
                replyto_email: meta.replyto_email,
                preheader: meta.preheader,
                setup: meta.setup,
                tags: meta.tags,
                link_params: meta.link_params,
                mode: VISUAL_MODE.to_string(),
                content_json: meta.content_json,
                is_basic: meta.is_basic,
                is_link_tracking: meta.is_link_tracking,
            });

        Self {
            template: name.to_string(),
            content_html,
            visual,
        }
    }
}

// Sailthru returns ids as numbers, sidecars written by hand may use strings.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// An empty map comes back from the API as `[]`.
fn lenient_string_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect(),
        _ => BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn visual_meta() -> TemplateMetadata {
        TemplateMetadata {
            subject: Some("Hello".into()),
            labels: vec!["x".into(), "y".into(), "x".into()],
            mode: Some(VISUAL_MODE.into()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_sidecar_with_camel_case_link_params() {
        let meta: TemplateMetadata = serde_json::from_value(json!({
            "subject": "S",
            "linkParams": {"utm_source": "mail"},
            "template_id": 1234,
            "revision_id": 7
        }))
        .unwrap();

        assert_eq!(meta.subject.as_deref(), Some("S"));
        assert_eq!(meta.link_params["utm_source"], "mail");
        assert_eq!(meta.template_id.as_deref(), Some("1234"));
        assert_eq!(meta.extra["revision_id"], json!(7));
    }

    #[test]
    fn accepts_api_link_params_spelling_and_empty_array() {
        let meta: TemplateMetadata =
            serde_json::from_value(json!({"link_params": []})).unwrap();
        assert!(meta.link_params.is_empty());

        let meta: TemplateMetadata =
            serde_json::from_value(json!({"link_params": {"a": "b"}})).unwrap();
        assert_eq!(meta.link_params["a"], "b");
    }

    #[test]
    fn sidecar_serializes_link_params_as_camel_case() {
        let mut meta = TemplateMetadata::default();
        meta.link_params.insert("k".into(), "v".into());
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value, json!({"linkParams": {"k": "v"}}));
    }

    #[test]
    fn empty_metadata_is_empty() {
        assert!(TemplateMetadata::default().is_empty());
        assert!(!visual_meta().is_empty());
    }

    #[test]
    fn plain_template_payload_carries_only_html() {
        let meta = TemplateMetadata {
            subject: Some("ignored".into()),
            ..Default::default()
        };
        let req = SaveRequest::from_local(
            "welcome",
            "<p>hi</p>".into(),
            Some(meta),
            &TemplateMetadata::default(),
        );
        assert!(req.visual.is_none());
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"template": "welcome", "content_html": "<p>hi</p>"})
        );
    }

    #[test]
    fn visual_payload_sends_labels_as_keyed_set() {
        let req = SaveRequest::from_local(
            "promo",
            "<p>x</p>".into(),
            Some(visual_meta()),
            &TemplateMetadata::default(),
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["labels"], json!({"x": 1, "y": 1}));
        assert_eq!(value["mode"], json!(VISUAL_MODE));
        assert_eq!(value["subject"], json!("Hello"));
    }

    #[test]
    fn visual_payload_fills_unset_fields_from_defaults() {
        let defaults = TemplateMetadata {
            subject: Some("Default Subject".into()),
            from_name: Some("Brand".into()),
            ..Default::default()
        };
        let req =
            SaveRequest::from_local("promo", String::new(), Some(visual_meta()), &defaults);
        let visual = req.visual.unwrap();
        assert_eq!(visual.subject.as_deref(), Some("Hello"));
        assert_eq!(visual.from_name.as_deref(), Some("Brand"));
    }
}
