//! UBPR metric code type.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// A regulator-defined UBPR metric code such as `UBPRE569`.
///
/// Codes are opaque identifiers. Construction trims surrounding whitespace
/// and upper-cases ASCII letters so `ubpre569` and `UBPRE569` name the same
/// line item.
///
/// # Examples
///
/// ```
/// use ubpr_types::MetricCode;
///
/// let code = MetricCode::new(" ubpre569 ");
/// assert_eq!(code.as_str(), "UBPRE569");
/// assert_eq!(code, MetricCode::from("UBPRE569"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MetricCode(String);

impl MetricCode {
    /// Creates a normalized metric code.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Normalizes `code` for lookups against [`MetricCode`] keys,
    /// borrowing when it is already in normal form.
    ///
    /// ```
    /// use ubpr_types::MetricCode;
    ///
    /// assert_eq!(MetricCode::normalize(" ubpre569"), "UBPRE569");
    /// ```
    pub fn normalize(code: &str) -> Cow<'_, str> {
        let code = code.trim();
        if code.bytes().any(|b| b.is_ascii_lowercase()) {
            Cow::Owned(code.to_ascii_uppercase())
        } else {
            Cow::Borrowed(code)
        }
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MetricCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MetricCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MetricCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for MetricCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}
