//! Converted UBPR field values.

use std::cmp::Ordering;
use std::fmt;

/// A single converted value from a UBPR schedule cell.
///
/// Percentages and ratios are reported as signed decimals and stored as
/// `Float`. Dollar amounts (in thousands) are `Integer`. Anything left
/// unconverted stays `Text`.
///
/// # Examples
///
/// ```
/// use ubpr_types::FieldValue;
///
/// let ratio = FieldValue::Float(-89.2);
/// assert_eq!(ratio.as_f64(), Some(-89.2));
/// assert_eq!(ratio.to_string(), "-89.2");
///
/// let text = FieldValue::Text("12/31/2022".to_string());
/// assert_eq!(text.as_f64(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// Whole number, typically a dollar amount in thousands.
    Integer(i64),
    /// Signed decimal, typically a percentage or ratio.
    Float(f64),
    /// Raw text.
    Text(String),
}

impl FieldValue {
    /// Returns the numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this value is numeric.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    /// Total ordering used for sorting records by a metric.
    ///
    /// Numbers compare numerically (integers and floats are comparable),
    /// numbers sort before text, and text compares lexicographically.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .as_str()
                .unwrap_or_default()
                .cmp(other.as_str().unwrap_or_default()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cmp_mixed_numbers() {
        let a = FieldValue::Integer(-60);
        let b = FieldValue::Float(-59.95);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(b.total_cmp(&a), Ordering::Greater);
    }

    #[test]
    fn test_total_cmp_numbers_before_text() {
        let number = FieldValue::Float(1.0);
        let text = FieldValue::Text("n/a".to_string());
        assert_eq!(number.total_cmp(&text), Ordering::Less);
        assert_eq!(text.total_cmp(&number), Ordering::Greater);
    }

    #[test]
    fn test_display_keeps_reported_precision() {
        assert_eq!(FieldValue::Float(-8.86).to_string(), "-8.86");
        assert_eq!(FieldValue::Float(-2.0).to_string(), "-2");
        assert_eq!(FieldValue::Integer(3201942000).to_string(), "3201942000");
    }
}
