//! Label sets and their content-hashed identifiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::MetricsError;

/// A label set: string keys to string values.
///
/// A `BTreeMap` keeps the keys sorted, which makes the serialized form
/// independent of insertion order.
pub type Labels = BTreeMap<String, String>;

/// Build a label set from `(key, value)` pairs.
pub fn labels<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Labels
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Content hash of a label set.
///
/// Equal label sets always produce the same id, in any process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSetId(String);

impl LabelSetId {
    /// Hash a label set.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Encoding`] if the label set cannot be
    /// serialized.
    pub fn of(labels: &Labels) -> Result<Self, MetricsError> {
        let canonical = serde_json::to_vec(labels)?;
        Ok(Self(blake3::hash(&canonical).to_hex().to_string()))
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for LabelSetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
