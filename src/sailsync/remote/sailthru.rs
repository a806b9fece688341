use super::TemplateRepository;
use crate::config::Credentials;
use crate::error::{Result, SyncError};
use crate::model::{RemoteTemplate, SaveRequest, Template, TemplateMetadata};
use md5::{Digest, Md5};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.sailthru.com";
pub const HTTP_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("sailsync/", env!("CARGO_PKG_VERSION"));

/// Sailthru error code for a template name it does not know.
const UNKNOWN_TEMPLATE: i64 = 14;

#[derive(Deserialize)]
struct TemplateList {
    #[serde(default)]
    templates: Vec<RemoteTemplate>,
}

pub struct SailthruClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl SailthruClient {
    pub fn new(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// `md5(secret + sorted parameter values)`, hex encoded.
    fn signature(&self, values: &[&str]) -> String {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let mut hasher = Md5::new();
        hasher.update(self.credentials.api_secret.as_bytes());
        for value in sorted {
            hasher.update(value.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    fn call(&self, method: Method, action: &str, payload: &Value) -> Result<Value> {
        let json = payload.to_string();
        let sig = self.signature(&[&self.credentials.api_key, "json", &json]);
        let params = [
            ("api_key", self.credentials.api_key.as_str()),
            ("format", "json"),
            ("json", json.as_str()),
            ("sig", sig.as_str()),
        ];

        let url = format!("{}/{}", self.base_url, action);
        debug!("{} {} {}", method, url, json);
        let request: RequestBuilder = if method == Method::GET {
            self.http.get(&url).query(&params)
        } else {
            self.http.request(method, &url).form(&params)
        };

        let resp = request.send()?;
        let status = resp.status();
        let body = resp.text()?;
        let value: Value = serde_json::from_str(&body).map_err(|_| {
            SyncError::Provider(format!("unexpected response ({}): {}", status, body))
        })?;

        if let Some(code) = value.get("error").and_then(Value::as_i64) {
            let message = value
                .get("errormsg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(if code == UNKNOWN_TEMPLATE {
                SyncError::RemoteTemplateNotFound(
                    payload["template"].as_str().unwrap_or_default().to_string(),
                )
            } else {
                SyncError::Provider(message)
            });
        }
        if !status.is_success() {
            return Err(SyncError::Provider(format!("{}: {}", status, body)));
        }
        Ok(value)
    }
}

impl TemplateRepository for SailthruClient {
    fn list_all(&self) -> Result<Vec<RemoteTemplate>> {
        let value = self.call(Method::GET, "template", &json!({}))?;
        let list: TemplateList = serde_json::from_value(value)?;
        Ok(list.templates)
    }

    fn fetch(&self, name: &str) -> Result<Template> {
        let value = self.call(Method::GET, "template", &json!({ "template": name }))?;
        let Value::Object(mut fields) = value else {
            return Err(SyncError::Provider(format!(
                "template {} came back in an unexpected shape",
                name
            )));
        };

        let content_html = match fields.remove("content_html") {
            Some(Value::String(html)) => html,
            _ => String::new(),
        };
        let name = match fields.remove("name") {
            Some(Value::String(remote_name)) => remote_name,
            _ => name.to_string(),
        };
        let metadata: TemplateMetadata = serde_json::from_value(Value::Object(fields))?;

        Ok(Template {
            name,
            content_html,
            metadata,
        })
    }

    fn save(&self, request: &SaveRequest) -> Result<()> {
        let payload = serde_json::to_value(request)?;
        self.call(Method::POST, "template", &payload)?;
        Ok(())
    }

    fn send_test(&self, template: &str, recipients: &[String]) -> Result<String> {
        let payload = json!({
            "template": template,
            "email": recipients.join(","),
        });
        let value = self.call(Method::POST, "send", &payload)?;

        if let Some(id) = value.get("send_id").and_then(Value::as_str) {
            return Ok(id.to_string());
        }
        let ids: Vec<&str> = value
            .get("send_ids")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if ids.is_empty() {
            return Err(SyncError::Provider(format!(
                "send accepted without a send id: {}",
                value
            )));
        }
        Ok(ids.join(","))
    }
}
