//! FDIC institution master record.

use std::collections::BTreeMap;

use crate::Rssd;

/// One row of the FDIC institution directory.
///
/// Asset and deposit totals are reported in thousands of dollars. Columns
/// the directory carries beyond the named fields are kept verbatim in
/// `extra` so callers can sort or display them.
///
/// # Examples
///
/// ```
/// use ubpr_types::InstitutionMasterRecord;
///
/// let bank = InstitutionMasterRecord::new(852218, "JPMorgan Chase Bank, National Association")
///     .with_asset(3201942000)
///     .with_deposit(2440722000);
///
/// assert_eq!(bank.asset, Some(3201942000));
/// assert!(!bank.inactive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstitutionMasterRecord {
    /// Federal Reserve RSSD identifier.
    #[cfg_attr(feature = "serde", serde(rename = "FED_RSSD"))]
    pub rssd: Rssd,
    /// Legal name of the institution.
    #[cfg_attr(feature = "serde", serde(rename = "NAME"))]
    pub name: String,
    /// Total assets in thousands of dollars.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "ASSET", skip_serializing_if = "Option::is_none", default)
    )]
    pub asset: Option<i64>,
    /// Total deposits in thousands of dollars.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "DEP", skip_serializing_if = "Option::is_none", default)
    )]
    pub deposit: Option<i64>,
    /// FDIC certificate number.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "CERT", skip_serializing_if = "Option::is_none", default)
    )]
    pub cert: Option<String>,
    /// Whether the FDIC lists the institution as inactive.
    #[cfg_attr(feature = "serde", serde(rename = "INACTIVE", default))]
    pub inactive: bool,
    /// Remaining directory columns.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub extra: BTreeMap<String, String>,
}

impl InstitutionMasterRecord {
    /// Creates an active record with no amounts.
    pub fn new(rssd: Rssd, name: impl Into<String>) -> Self {
        Self {
            rssd,
            name: name.into(),
            asset: None,
            deposit: None,
            cert: None,
            inactive: false,
            extra: BTreeMap::new(),
        }
    }

    /// Sets total assets.
    pub fn with_asset(mut self, asset: i64) -> Self {
        self.asset = Some(asset);
        self
    }

    /// Sets total deposits.
    pub fn with_deposit(mut self, deposit: i64) -> Self {
        self.deposit = Some(deposit);
        self
    }

    /// Returns an extra directory column by name.
    pub fn column(&self, name: &str) -> Option<&str> {
        self.extra.get(name).map(String::as_str)
    }
}
