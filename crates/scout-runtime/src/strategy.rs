//! Dictionary key derivation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};
use crate::export::Export;

pub const STRATEGY_MODULE_NAME: &str = "module_name";
pub const STRATEGY_STRIP_PREFIX: &str = "strip_prefix";
pub const STRATEGY_PROPERTY: &str = "property";
pub const STRATEGY_METHOD: &str = "method";
pub const STRATEGY_CUSTOM: &str = "custom";

/// How a discovered plugin is keyed in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Raw candidate name
    ModuleName,
    /// Candidate name without the leading `<prefix>-`
    StripPrefix,
    /// `imported[key_property]`
    Property,
    /// `imported[key_property]()`
    Method,
    /// The configure hook stores entries itself
    Custom,
}

impl KeyStrategy {
    pub const ALL: [KeyStrategy; 5] = [
        KeyStrategy::ModuleName,
        KeyStrategy::StripPrefix,
        KeyStrategy::Property,
        KeyStrategy::Method,
        KeyStrategy::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStrategy::ModuleName => STRATEGY_MODULE_NAME,
            KeyStrategy::StripPrefix => STRATEGY_STRIP_PREFIX,
            KeyStrategy::Property => STRATEGY_PROPERTY,
            KeyStrategy::Method => STRATEGY_METHOD,
            KeyStrategy::Custom => STRATEGY_CUSTOM,
        }
    }

    /// Derive the dictionary key for one plugin. `None` means "do not store".
    pub fn derive_key(
        &self,
        module_name: &str,
        imported: &Export,
        prefix: &str,
        key_property: Option<&str>,
    ) -> Result<Option<String>> {
        let key = match self {
            KeyStrategy::Custom => return Ok(None),
            KeyStrategy::ModuleName => module_name.to_string(),
            KeyStrategy::StripPrefix => strip_prefix(module_name, prefix).to_string(),
            KeyStrategy::Property => {
                let property = self.require_property(key_property)?;
                let value = read_property(module_name, imported, property)?;
                value.as_key().ok_or_else(|| DiscoveryError::KeyNotString {
                    plugin: module_name.to_string(),
                    property: property.to_string(),
                })?
            }
            KeyStrategy::Method => {
                let property = self.require_property(key_property)?;
                let method = read_property(module_name, imported, property)?
                    .as_function()
                    .ok_or_else(|| DiscoveryError::KeyNotCallable {
                        plugin: module_name.to_string(),
                        property: property.to_string(),
                    })?;
                let returned = method.call().map_err(|source| DiscoveryError::KeyMethodFailed {
                    plugin: module_name.to_string(),
                    property: property.to_string(),
                    source,
                })?;
                returned.as_key().ok_or_else(|| DiscoveryError::KeyNotString {
                    plugin: module_name.to_string(),
                    property: property.to_string(),
                })?
            }
        };

        Ok(Some(key))
    }

    fn require_property<'a>(&self, key_property: Option<&'a str>) -> Result<&'a str> {
        key_property.ok_or_else(|| DiscoveryError::KeyPropertyUnset {
            strategy: self.as_str().to_string(),
        })
    }
}

impl fmt::Display for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStrategy {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        KeyStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| DiscoveryError::InvalidStrategy(s.to_string()))
    }
}

/// Remove a leading `<prefix>-`; names without it come back unchanged.
pub fn strip_prefix<'a>(module_name: &'a str, prefix: &str) -> &'a str {
    module_name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(module_name)
}

fn read_property<'a>(
    module_name: &str,
    imported: &'a Export,
    property: &str,
) -> Result<&'a Export> {
    imported
        .get(property)
        .ok_or_else(|| DiscoveryError::KeyPropertyMissing {
            plugin: module_name.to_string(),
            property: property.to_string(),
        })
}
