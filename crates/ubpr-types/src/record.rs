//! Per-institution UBPR records.

use std::collections::BTreeMap;

use crate::{FieldValue, InstitutionMasterRecord, MetricCode, Rssd};

/// One institution's view of the requested UBPR metrics.
///
/// A code is present only if its schedule reported a non-empty value for
/// this institution. Callers must not assume every requested code is set.
///
/// # Examples
///
/// ```
/// use ubpr_types::{FieldValue, InstitutionRecord, MetricCode};
///
/// let mut record = InstitutionRecord::new(480228);
/// assert!(record.is_empty());
///
/// record.insert(MetricCode::new("UBPRE569"), FieldValue::Float(-59.95));
/// assert_eq!(record.len(), 1);
/// assert_eq!(record.get("UBPRE569").and_then(FieldValue::as_f64), Some(-59.95));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstitutionRecord {
    /// RSSD of the reporting institution.
    pub rssd: Rssd,
    /// Converted values keyed by metric code.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: BTreeMap<MetricCode, FieldValue>,
}

impl InstitutionRecord {
    /// Creates a record with no fields.
    pub fn new(rssd: Rssd) -> Self {
        Self {
            rssd,
            fields: BTreeMap::new(),
        }
    }

    /// Returns the value reported for `code`.
    pub fn get(&self, code: &str) -> Option<&FieldValue> {
        self.fields.get(&*MetricCode::normalize(code))
    }

    /// Sets a value, returning the previous one if the code was already present.
    pub fn insert(&mut self, code: MetricCode, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(code, value)
    }

    /// Returns true if a value was reported for `code`.
    pub fn contains(&self, code: &str) -> bool {
        self.fields.contains_key(&*MetricCode::normalize(code))
    }

    /// Returns the codes present in this record, in order.
    pub fn codes(&self) -> impl Iterator<Item = &MetricCode> {
        self.fields.keys()
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields were reported.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A UBPR record paired with the institution's directory entry.
///
/// Serializes as a single flat map holding the directory columns followed by
/// the metric codes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CombinedRecord {
    /// Directory entry, if the institution is listed.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub master: Option<InstitutionMasterRecord>,
    /// UBPR metrics.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub ubpr: InstitutionRecord,
}

impl CombinedRecord {
    /// RSSD of the institution.
    pub fn rssd(&self) -> Rssd {
        self.ubpr.rssd
    }

    /// Institution name from the directory, if listed.
    pub fn name(&self) -> Option<&str> {
        self.master.as_ref().map(|m| m.name.as_str())
    }

    /// Returns the UBPR value reported for `code`.
    pub fn get(&self, code: &str) -> Option<&FieldValue> {
        self.ubpr.get(code)
    }
}
