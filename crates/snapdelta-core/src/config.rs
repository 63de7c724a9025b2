//! Comparison configuration loaded from TOML
//!
//! ```toml
//! [keys]
//! partition = "chrom"
//! identity = ["chrom", "pos", "ref", "alt"]
//! normalize_partition = true
//!
//! [novelty]
//! exclusions = ["X", "Y"]
//!
//! [report]
//! order = "diff_descending"
//! ```
//!
//! Every section and field is optional; missing values take the defaults of
//! [`DiffConfig::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ExError, ExErrorKind, SnapDeltaError};
use crate::model::{DeltaOrder, ExclusionSet, KeySpec};

/// Settings for one snapshot comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    pub keys: KeysSection,
    pub novelty: NoveltySection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysSection {
    pub partition: String,
    pub identity: Vec<String>,
    pub normalize_partition: bool,
}

impl Default for KeysSection {
    fn default() -> Self {
        let spec = KeySpec::default();
        Self {
            partition: spec.partition_field,
            identity: spec.identity_fields,
            normalize_partition: spec.normalize_partition,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoveltySection {
    /// Partition keys never reported as novel
    pub exclusions: ExclusionSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub order: DeltaOrder,
}

impl DiffConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the document does not parse or fails [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self, ExError> {
        let config: DiffConfig = toml::from_str(text).map_err(|e| {
            ExError::from(SnapDeltaError::InvalidConfig {
                reason: e.to_string(),
            })
            .with_op("load_config")
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// - `Io` if the file cannot be read
    /// - `InvalidConfig` as for [`from_toml_str`](Self::from_toml_str)
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_entity_id(path.display().to_string())
                .with_message(format!("cannot read config file: {}", e))
        })?;
        Self::from_toml_str(&text).map_err(|e| e.with_entity_id(path.display().to_string()))
    }

    /// # Errors
    ///
    /// `InvalidConfig` if the key fields are unusable.
    pub fn validate(&self) -> Result<(), ExError> {
        self.key_spec().validate().map_err(|e| e.with_op("validate_config"))
    }

    pub fn key_spec(&self) -> KeySpec {
        KeySpec::new(self.keys.partition.clone(), self.keys.identity.iter().cloned())
            .with_normalized_partition(self.keys.normalize_partition)
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.novelty.exclusions
    }

    pub fn order(&self) -> DeltaOrder {
        self.report.order
    }

    pub fn with_keys(mut self, keys: &KeySpec) -> Self {
        self.keys = KeysSection {
            partition: keys.partition_field.clone(),
            identity: keys.identity_fields.clone(),
            normalize_partition: keys.normalize_partition,
        };
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.novelty.exclusions = exclusions;
        self
    }

    pub fn with_order(mut self, order: DeltaOrder) -> Self {
        self.report.order = order;
        self
    }
}
