//! Value converters for schedule cells.
//!
//! Every registered metric code carries a default [`Converter`]. A query may
//! swap it for another converter through [`CodeOptions`] without touching the
//! registry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ubpr_types::{FieldValue, MetricCode};

type ConvertFn = dyn Fn(&str) -> Result<FieldValue, String> + Send + Sync;

/// Converts raw cell text into a [`FieldValue`].
#[derive(Clone, Default)]
pub enum Converter {
    /// Keep the text as reported.
    #[default]
    Text,
    /// Parse a signed decimal.
    Float,
    /// Parse a signed whole number.
    Integer,
    /// Caller-supplied conversion.
    Custom {
        /// Label used in diagnostics.
        name: String,
        /// The conversion function.
        func: Arc<ConvertFn>,
    },
}

impl Converter {
    /// Wraps a closure as a named custom converter.
    ///
    /// # Examples
    ///
    /// ```
    /// use ubpr_loader::Converter;
    /// use ubpr_types::FieldValue;
    ///
    /// let basis_points = Converter::custom("basis_points", |raw| {
    ///     raw.parse::<f64>()
    ///         .map(|v| FieldValue::Float(v * 100.0))
    ///         .map_err(|e| e.to_string())
    /// });
    /// assert_eq!(basis_points.convert("1.5"), Ok(FieldValue::Float(150.0)));
    /// assert!(basis_points.convert("n/a").is_err());
    /// ```
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<FieldValue, String> + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Converts one raw cell.
    pub fn convert(&self, raw: &str) -> Result<FieldValue, String> {
        match self {
            Self::Text => Ok(FieldValue::Text(raw.to_string())),
            Self::Float => parse::float(raw).map(FieldValue::Float),
            Self::Integer => parse::integer(raw).map(FieldValue::Integer),
            Self::Custom { func, .. } => func(raw),
        }
    }

    /// Returns the converter's name.
    pub fn name(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Float => "float",
            Self::Integer => "integer",
            Self::Custom { name, .. } => name,
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
            _ => f.write_str(self.name()),
        }
    }
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom { func: a, .. }, Self::Custom { func: b, .. }) => Arc::ptr_eq(a, b),
            (Self::Custom { .. }, _) | (_, Self::Custom { .. }) => false,
            _ => self.name() == other.name(),
        }
    }
}

impl FromStr for Converter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "str" => Ok(Self::Text),
            "float" | "decimal" => Ok(Self::Float),
            "integer" | "int" => Ok(Self::Integer),
            other => Err(format!(
                "unknown converter '{other}' (expected text, float or integer)"
            )),
        }
    }
}

/// Per-query choice of converter for one code.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConvertOverride {
    /// Use the registry's converter.
    #[default]
    Default,
    /// Use this converter for the current query only.
    Custom(Converter),
}

/// Per-query options for one requested metric code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeOptions {
    /// Converter selection.
    pub convert: ConvertOverride,
}

impl CodeOptions {
    /// Options that replace the default converter.
    pub fn with_converter(converter: Converter) -> Self {
        Self {
            convert: ConvertOverride::Custom(converter),
        }
    }
}

/// The codes a query asks for, with their options.
pub type CodeRequest = BTreeMap<MetricCode, CodeOptions>;

/// Builds a request for `codes` using each code's default converter.
///
/// # Examples
///
/// ```
/// use ubpr_loader::request_codes;
///
/// let request = request_codes(["UBPRE569", "ubprm037"]);
/// assert!(request.contains_key("UBPRM037"));
/// ```
pub fn request_codes<I, C>(codes: I) -> CodeRequest
where
    I: IntoIterator<Item = C>,
    C: Into<MetricCode>,
{
    codes
        .into_iter()
        .map(|code| (code.into(), CodeOptions::default()))
        .collect()
}

/// Helper functions for parsing cell values.
pub mod parse {
    use ubpr_types::Rssd;

    /// Parses an RSSD identifier.
    pub fn rssd(value: &str) -> Option<Rssd> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        value.parse::<Rssd>().ok()
    }

    /// Parses a signed decimal, keeping the reported digits.
    pub fn float(value: &str) -> Result<f64, String> {
        let parsed = value
            .trim()
            .parse::<f64>()
            .map_err(|_| "expected a decimal number".to_string())?;
        if parsed.is_finite() {
            Ok(parsed)
        } else {
            Err("expected a finite decimal number".to_string())
        }
    }

    /// Parses a signed whole number.
    pub fn integer(value: &str) -> Result<i64, String> {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| "expected a whole number".to_string())
    }
}
