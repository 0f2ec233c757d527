use std::{
    fs::{read_to_string, write},
    path::PathBuf,
    time::Duration,
};

use enumset::EnumSet;
use serde::{Deserialize, Serialize};

use crate::{error::BuildonomyError, properties::RelationKind};

/// Table name the association settings live under in a TOML config file.
pub const CONFIG_TABLE: &str = "associations";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationConfig {
    /// Relation kinds considered during discovery and mutation.
    pub relations: EnumSet<RelationKind>,
    pub query_timeout_ms: u64,
    /// Query every federated source, not just the local catalog.
    pub federated: bool,
    /// When set, batch resolution only returns records carrying this tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_tag: Option<String>,
    /// Send each record's seed version with the update so the store can reject stale writes.
    pub check_versions: bool,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        AssociationConfig {
            relations: EnumSet::all(),
            query_timeout_ms: 30_000,
            federated: true,
            resolve_tag: None,
            check_versions: false,
        }
    }
}

impl AssociationConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn from_toml_str(content: &str) -> Result<AssociationConfig, BuildonomyError> {
        let mut table: toml::Table = toml::from_str(content)?;
        match table.remove(CONFIG_TABLE) {
            Some(value) => Ok(value.try_into::<AssociationConfig>()?),
            None => {
                tracing::debug!("No [{CONFIG_TABLE}] table in config, using defaults.");
                Ok(AssociationConfig::default())
            }
        }
    }
}

pub trait AssociationConfigProvider: Send + Sync {
    fn get_config(&self) -> Result<AssociationConfig, BuildonomyError>;
    fn set_config(&self, config: &AssociationConfig) -> Result<(), BuildonomyError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }
}

impl AssociationConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<AssociationConfig, BuildonomyError> {
        tracing::debug!("Attempting to read association config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, returning default association config.");
            return Ok(AssociationConfig::default());
        }
        let content = read_to_string(&self.path)?;
        AssociationConfig::from_toml_str(&content)
    }

    /// Writes the `[associations]` table, keeping any other tables already in the file.
    fn set_config(&self, config: &AssociationConfig) -> Result<(), BuildonomyError> {
        tracing::debug!("Attempting to write association config to: {:?}", &self.path);
        let mut table: toml::Table = if self.path.exists() {
            toml::from_str(&read_to_string(&self.path)?)?
        } else {
            toml::Table::new()
        };
        table.insert(CONFIG_TABLE.to_string(), toml::Value::try_from(config)?);
        let toml_string = toml::to_string(&table)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}
