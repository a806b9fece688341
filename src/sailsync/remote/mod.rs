//! # Template Repository
//!
//! The remote side of a sync. [`TemplateRepository`] is the four calls the
//! engine needs from the email provider; every call is a single round trip
//! with no retry, so a failure reaches the flow that made it.
//!
//! - [`sailthru::SailthruClient`]: the production client
//! - [`memory::InMemoryRepository`]: an in-process fake for tests

use crate::error::Result;
use crate::model::{RemoteTemplate, SaveRequest, Template};

pub mod memory;
pub mod sailthru;

pub trait TemplateRepository {
    /// Full remote catalog.
    fn list_all(&self) -> Result<Vec<RemoteTemplate>>;

    /// Content and metadata of one template. Fails with
    /// `RemoteTemplateNotFound` if the provider has no such name.
    fn fetch(&self, name: &str) -> Result<Template>;

    /// Create or overwrite a template.
    fn save(&self, request: &SaveRequest) -> Result<()>;

    /// Send `template` to every recipient. Returns the provider's send id.
    fn send_test(&self, template: &str, recipients: &[String]) -> Result<String>;
}
