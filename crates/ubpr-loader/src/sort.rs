//! Sorting of institution and UBPR records.

use std::cmp::Ordering;

use ubpr_types::{CombinedRecord, FieldValue, InstitutionMasterRecord, InstitutionRecord, SortDirection};

/// A directory field usable as a sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterField {
    /// Total assets.
    Asset,
    /// Total deposits.
    Deposit,
    /// Institution name.
    Name,
    /// RSSD identifier.
    Rssd,
    /// Any other directory column. Numbers sort before text.
    Column(String),
}

/// One sort key: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field to compare.
    pub field: MasterField,
    /// Direction for this key.
    pub direction: SortDirection,
}

impl SortKey {
    /// Ascending key.
    pub fn asc(field: MasterField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Descending key.
    pub fn desc(field: MasterField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    fn compare(&self, a: &InstitutionMasterRecord, b: &InstitutionMasterRecord) -> Ordering {
        let ordering = match &self.field {
            // Missing amounts count as zero.
            MasterField::Asset => a.asset.unwrap_or(0).cmp(&b.asset.unwrap_or(0)),
            MasterField::Deposit => a.deposit.unwrap_or(0).cmp(&b.deposit.unwrap_or(0)),
            MasterField::Name => a.name.cmp(&b.name),
            MasterField::Rssd => a.rssd.cmp(&b.rssd),
            MasterField::Column(name) => compare_columns(a.column(name), b.column(name)),
        };
        self.direction.apply(ordering)
    }
}

/// Orders column cells: empty or missing (as zero) and numbers first, compared
/// numerically, then text compared as strings.
fn compare_columns(a: Option<&str>, b: Option<&str>) -> Ordering {
    fn rank(v: Option<&str>) -> Result<f64, &str> {
        match v.map(str::trim) {
            None | Some("") => Ok(0.0),
            Some(s) => s.parse::<f64>().map_err(|_| s),
        }
    }
    match (rank(a), rank(b)) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(x), Err(y)) => x.cmp(y),
    }
}

/// Sort keys used when none are given: assets, then deposits, both descending.
pub fn default_sort_keys() -> Vec<SortKey> {
    vec![
        SortKey::desc(MasterField::Asset),
        SortKey::desc(MasterField::Deposit),
    ]
}

/// Stable sort of institutions by `keys`, first key most significant.
pub fn sort_institutions(institutions: &mut [InstitutionMasterRecord], keys: &[SortKey]) {
    institutions.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Records that carry UBPR metric values.
pub trait MetricSource {
    /// Value reported for `code`.
    fn metric(&self, code: &str) -> Option<&FieldValue>;
}

impl MetricSource for InstitutionRecord {
    fn metric(&self, code: &str) -> Option<&FieldValue> {
        self.get(code)
    }
}

impl MetricSource for CombinedRecord {
    fn metric(&self, code: &str) -> Option<&FieldValue> {
        self.get(code)
    }
}

/// Stable sort of records by one metric.
///
/// Records without a value for `code` go last in either direction.
pub fn sort_by_code<T: MetricSource>(records: &mut [T], code: &str, direction: SortDirection) {
    records.sort_by(|a, b| match (a.metric(code), b.metric(code)) {
        (Some(x), Some(y)) => direction.apply(x.total_cmp(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
