//! Turns the free-text recipient prompt into a list of addresses.
//!
//! Input is split on commas and trimmed, short aliases from the
//! [`AliasTable`] are expanded, and every resulting address must pass an
//! email syntax check. Validation stops at the first bad entry.

use crate::error::{Result, SyncError};
use email_address::EmailAddress;
use std::collections::BTreeMap;

/// Read-only mapping of short tokens (`me`, `work`) to full addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    pub fn expand<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases.get(token).map(String::as_str).unwrap_or(token)
    }
}

pub fn resolve(raw: &str, aliases: &AliasTable) -> Result<Vec<String>> {
    let recipients: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| aliases.expand(token).to_string())
        .collect();

    if recipients.is_empty() {
        return Err(SyncError::EmptyRecipientList);
    }

    if let Some(bad) = recipients.iter().find(|r| !EmailAddress::is_valid(r)) {
        return Err(SyncError::InvalidAddress(bad.clone()));
    }

    Ok(recipients)
}
