use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::record::Record;
use crate::errors::{ExError, SnapDeltaError};

/// Low-cardinality grouping value (e.g. a chromosome label)
pub type PartitionKey = String;

/// Value identifying one logical record across snapshots
pub type IdentityKey = String;

/// Separator between the parts of a composite identity key
const IDENTITY_SEPARATOR: &str = "-";

/// KeySpec - which record fields carry the partition and identity keys
///
/// The identity key is the rendered value of each identity field joined
/// with `-`, so a variant keyed on `chrom`, `pos`, `ref`, `alt` gets an
/// identity such as `1-12345-A-G`. In a composite key, `\` and `-` inside
/// a value are backslash-escaped, so distinct field tuples never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpec {
    /// Field holding the partition key
    pub partition_field: String,

    /// Fields making up the identity key, in order
    pub identity_fields: Vec<String>,

    /// Canonicalise partition values chromosome-style (`chr1` → `1`, `x` → `X`)
    #[serde(default)]
    pub normalize_partition: bool,
}

impl Default for KeySpec {
    fn default() -> Self {
        Self {
            partition_field: "partition_key".to_string(),
            identity_fields: vec!["identity_key".to_string()],
            normalize_partition: false,
        }
    }
}

impl KeySpec {
    pub fn new<I, S>(partition_field: impl Into<String>, identity_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            partition_field: partition_field.into(),
            identity_fields: identity_fields.into_iter().map(Into::into).collect(),
            normalize_partition: false,
        }
    }

    pub fn with_normalized_partition(mut self, normalize: bool) -> Self {
        self.normalize_partition = normalize;
        self
    }

    /// Check that field names are usable
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a field name is empty, no identity field is
    /// given, or an identity field is listed twice.
    pub fn validate(&self) -> Result<(), ExError> {
        let invalid = |reason: String| -> ExError { SnapDeltaError::InvalidConfig { reason }.into() };

        if self.partition_field.trim().is_empty() {
            return Err(invalid("partition field name is empty".to_string()));
        }
        if self.identity_fields.is_empty() {
            return Err(invalid("at least one identity field is required".to_string()));
        }
        let mut seen = BTreeSet::new();
        for field in &self.identity_fields {
            if field.trim().is_empty() {
                return Err(invalid("identity field name is empty".to_string()));
            }
            if !seen.insert(field.as_str()) {
                return Err(invalid(format!("identity field `{}` is listed twice", field)));
            }
        }
        Ok(())
    }

    /// Apply this spec's partition normalisation to a raw value
    pub fn normalize_partition_value(&self, raw: &str) -> PartitionKey {
        if self.normalize_partition {
            normalize_chromosome(raw)
        } else {
            raw.to_string()
        }
    }

    /// Extract the partition key of the record at `index` in its pass
    ///
    /// # Errors
    ///
    /// `MalformedRecord` if the partition field is missing or unreadable.
    pub fn partition_key(&self, record: &Record, index: u64) -> Result<PartitionKey, ExError> {
        let raw = read_field(record, &self.partition_field, index)?;
        Ok(self.normalize_partition_value(&raw))
    }

    /// Extract the identity key of the record at `index` in its pass
    ///
    /// # Errors
    ///
    /// `MalformedRecord` if any identity field is missing or unreadable.
    pub fn identity_key(&self, record: &Record, index: u64) -> Result<IdentityKey, ExError> {
        let composite = self.identity_fields.len() > 1;
        let mut parts = Vec::with_capacity(self.identity_fields.len());
        for field in &self.identity_fields {
            let raw = read_field(record, field, index)?;
            let part = if *field == self.partition_field {
                self.normalize_partition_value(&raw)
            } else {
                raw
            };
            parts.push(if composite { escape_part(&part) } else { part });
        }
        Ok(parts.join(IDENTITY_SEPARATOR))
    }
}

/// Canonicalise a chromosome label: strip a leading `chr` (any case) and upper-case the rest
///
/// ```
/// use snapdelta_core::model::normalize_chromosome;
///
/// assert_eq!(normalize_chromosome("chrX"), "X");
/// assert_eq!(normalize_chromosome("mt"), "MT");
/// assert_eq!(normalize_chromosome("17"), "17");
/// ```
pub fn normalize_chromosome(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &trimmed[3..],
        _ => trimmed,
    };
    stripped.to_ascii_uppercase()
}

fn escape_part(part: &str) -> String {
    if !part.contains(['\\', '-']) {
        return part.to_string();
    }
    let mut escaped = String::with_capacity(part.len() + 2);
    for c in part.chars() {
        if c == '\\' || c == '-' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn read_field(record: &Record, field: &str, index: u64) -> Result<String, ExError> {
    let value = record.get(field).ok_or_else(|| SnapDeltaError::MissingKeyField {
        field: field.to_string(),
        index,
    })?;

    let rendered = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            return Err(SnapDeltaError::UnreadableKeyField {
                field: field.to_string(),
                index,
                found: value_kind(value).to_string(),
            }
            .into())
        }
    };
    Ok(rendered)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// ExclusionSet - partition keys skipped during novelty detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeSet<PartitionKey>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, partition_key: &str) -> bool {
        self.0.contains(partition_key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The same set with `keys`' partition normalisation applied to each member
    pub fn normalized(&self, keys: &KeySpec) -> ExclusionSet {
        self.0
            .iter()
            .map(|k| keys.normalize_partition_value(k))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
