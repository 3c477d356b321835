//! Metric code to schedule column mapping.
//!
//! The [`SchemaRegistry`] is built once and shared read-only by every query.
//! It answers one question: which schedule file, which column, and which
//! default converter serve a given metric code.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use ubpr_types::{well_known, MetricCode};

use crate::convert::{CodeRequest, ConvertOverride, Converter};
use crate::types::{UbprError, UbprResult};

/// Column mapping file header.
const REGISTRY_COLUMNS: &[&str] = &["code", "schedule", "column", "convert"];

/// How a code's column is located inside its schedule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// Zero-based column position.
    Index(usize),
    /// Header name (matched ignoring case and whitespace).
    Header(String),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Header(name) => write!(f, "'{name}'"),
        }
    }
}

/// Where one metric code lives and how its cells are converted.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCodeSpec {
    /// The metric code.
    pub code: MetricCode,
    /// Schedule (file) name.
    pub schedule: String,
    /// Column within the schedule.
    pub column: ColumnRef,
    /// Cell converter.
    pub convert: Converter,
}

impl FieldCodeSpec {
    /// Creates a spec whose column header is the code itself.
    pub fn new(code: impl Into<MetricCode>, schedule: impl Into<String>, convert: Converter) -> Self {
        let code = code.into();
        let column = ColumnRef::Header(code.as_str().to_string());
        Self {
            code,
            schedule: schedule.into(),
            column,
            convert,
        }
    }

    /// Locates the column by position instead of by header.
    pub fn at_index(mut self, index: usize) -> Self {
        self.column = ColumnRef::Index(index);
        self
    }
}

/// Resolved specs grouped by the schedule that must be opened.
pub type ResolvedSchedules = BTreeMap<String, Vec<FieldCodeSpec>>;

/// Immutable lookup from metric code to [`FieldCodeSpec`].
///
/// # Example
///
/// ```
/// use ubpr_loader::{request_codes, SchemaRegistry};
///
/// let registry = SchemaRegistry::ubpr_default();
/// let resolved = registry.resolve(&request_codes(["UBPRE569", "UBPRM037"])).unwrap();
///
/// assert_eq!(resolved.len(), 2);
/// assert!(resolved.contains_key("Summary Ratios"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    specs: HashMap<MetricCode, FieldCodeSpec>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in mapping for the bulk UBPR ratio download.
    pub fn ubpr_default() -> Self {
        Self::new()
            .with_spec(FieldCodeSpec::new(
                well_known::UBPRE567,
                well_known::SUMMARY_RATIOS,
                Converter::Float,
            ))
            .with_spec(FieldCodeSpec::new(
                well_known::UBPRE568,
                well_known::SUMMARY_RATIOS,
                Converter::Float,
            ))
            .with_spec(FieldCodeSpec::new(
                well_known::UBPRE569,
                well_known::SUMMARY_RATIOS,
                Converter::Float,
            ))
            .with_spec(FieldCodeSpec::new(
                well_known::UBPRM037,
                well_known::INTEREST_RATE_RISK,
                Converter::Float,
            ))
    }

    /// Adds a spec, replacing any earlier spec for the same code.
    pub fn with_spec(mut self, spec: FieldCodeSpec) -> Self {
        self.specs.insert(spec.code.clone(), spec);
        self
    }

    /// Returns the spec for `code`, matched case-insensitively.
    pub fn get(&self, code: &str) -> Option<&FieldCodeSpec> {
        self.specs.get(&*MetricCode::normalize(code))
    }

    /// Returns the number of registered codes.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if no codes are registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Returns all registered codes in sorted order.
    pub fn codes(&self) -> Vec<&MetricCode> {
        let mut codes: Vec<_> = self.specs.keys().collect();
        codes.sort();
        codes
    }

    /// Resolves a request into specs grouped by schedule.
    ///
    /// Per-code converter overrides apply to the returned specs only; the
    /// registry itself is never modified.
    ///
    /// # Errors
    /// Returns [`UbprError::UnknownCode`] for the first code with no mapping.
    pub fn resolve(&self, codes: &CodeRequest) -> UbprResult<ResolvedSchedules> {
        let mut grouped = ResolvedSchedules::new();
        for (code, options) in codes {
            let spec = self.specs.get(code).ok_or_else(|| UbprError::UnknownCode {
                code: code.to_string(),
            })?;
            let mut spec = spec.clone();
            if let ConvertOverride::Custom(converter) = &options.convert {
                spec.convert = converter.clone();
            }
            grouped.entry(spec.schedule.clone()).or_default().push(spec);
        }
        Ok(grouped)
    }

    /// Loads a registry from a tab-delimited mapping file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> UbprResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Loads a registry from tab-delimited text with the header
    /// `code  schedule  column  convert`.
    ///
    /// `column` is a zero-based index or a header name; an empty column means
    /// the header equals the code. `convert` is `text`, `float` or `integer`.
    pub fn from_reader<R: Read>(reader: R) -> UbprResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for (i, expected) in REGISTRY_COLUMNS.iter().enumerate() {
            let found = headers.get(i).unwrap_or("").trim_start_matches('\u{feff}').trim();
            if !found.eq_ignore_ascii_case(expected) {
                return Err(UbprError::InvalidRegistryEntry {
                    line: 1,
                    message: format!("expected column '{expected}' at position {i}, found '{found}'"),
                });
            }
        }

        let mut registry = Self::new();
        let mut record = StringRecord::new();
        while csv_reader.read_record(&mut record)? {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let spec = spec_from_record(&record, line)?;
            if registry.specs.contains_key(&spec.code) {
                return Err(UbprError::InvalidRegistryEntry {
                    line,
                    message: format!("duplicate code {}", spec.code),
                });
            }
            registry.specs.insert(spec.code.clone(), spec);
        }
        Ok(registry)
    }
}

fn spec_from_record(record: &StringRecord, line: u64) -> UbprResult<FieldCodeSpec> {
    let invalid = |message: String| UbprError::InvalidRegistryEntry { line, message };

    let code = record.get(0).unwrap_or("").trim();
    if code.is_empty() {
        return Err(invalid("empty code".to_string()));
    }
    let schedule = record.get(1).unwrap_or("").trim();
    if schedule.is_empty() {
        return Err(invalid(format!("no schedule for {code}")));
    }
    let convert = record
        .get(3)
        .unwrap_or("")
        .parse::<Converter>()
        .map_err(invalid)?;

    let spec = FieldCodeSpec::new(code, schedule, convert);
    let column = record.get(2).unwrap_or("").trim();
    Ok(if column.is_empty() {
        spec
    } else if let Ok(index) = column.parse::<usize>() {
        spec.at_index(index)
    } else {
        FieldCodeSpec {
            column: ColumnRef::Header(column.to_string()),
            ..spec
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{request_codes, CodeOptions};
    use ubpr_types::FieldValue;

    #[test]
    fn test_default_registry_contents() {
        let registry = SchemaRegistry::ubpr_default();
        assert_eq!(registry.len(), 4);
        let spec = registry.get("UBPRE569").unwrap();
        assert_eq!(spec.schedule, well_known::SUMMARY_RATIOS);
        assert_eq!(spec.column, ColumnRef::Header("UBPRE569".to_string()));
        assert_eq!(spec.convert, Converter::Float);
    }

    #[test]
    fn test_resolve_groups_by_schedule() {
        let registry = SchemaRegistry::ubpr_default();
        let resolved = registry
            .resolve(&request_codes(["UBPRE567", "UBPRE569", "UBPRM037"]))
            .unwrap();

        let summary: Vec<_> = resolved[well_known::SUMMARY_RATIOS]
            .iter()
            .map(|s| s.code.as_str())
            .collect();
        assert_eq!(summary, vec!["UBPRE567", "UBPRE569"]);
        assert_eq!(resolved[well_known::INTEREST_RATE_RISK].len(), 1);
    }

    #[test]
    fn test_get_matches_any_case() {
        let registry = SchemaRegistry::ubpr_default();
        let spec = registry.get("ubpre569").unwrap();
        assert_eq!(spec.code.as_str(), "UBPRE569");
        assert_eq!(spec.schedule, well_known::SUMMARY_RATIOS);
        assert!(registry.get(" UBPRM037 ").is_some());
        assert!(registry.get("ubpre999").is_none());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = SchemaRegistry::ubpr_default();
        for code in registry.codes() {
            let request = request_codes([code.clone()]);
            let first = registry.resolve(&request).unwrap();
            let second = registry.resolve(&request).unwrap();
            assert_eq!(first.len(), 1);
            assert_eq!(first.values().next().unwrap().len(), 1);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_unknown_code_fails() {
        let registry = SchemaRegistry::ubpr_default();
        let err = registry
            .resolve(&request_codes(["UBPRE569", "UBPRX999"]))
            .unwrap_err();
        match err {
            UbprError::UnknownCode { code } => assert_eq!(code, "UBPRX999"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_override_does_not_mutate_registry() {
        let registry = SchemaRegistry::ubpr_default();
        let mut request = request_codes(["UBPRE569"]);
        request.insert(
            MetricCode::new("UBPRE569"),
            CodeOptions::with_converter(Converter::Text),
        );

        let resolved = registry.resolve(&request).unwrap();
        assert_eq!(resolved[well_known::SUMMARY_RATIOS][0].convert, Converter::Text);
        assert_eq!(registry.get("UBPRE569").unwrap().convert, Converter::Float);
    }

    #[test]
    fn test_from_reader() {
        let mapping = "code\tschedule\tcolumn\tconvert\n\
                       # dollar amounts\n\
                       UBPR2170\tBalance Sheet $\t\tinteger\n\
                       UBPRE001\tBalance Sheet $\t4\tfloat\n\
                       UBPRD999\tNotes\tComment Text\t\n";
        let registry = SchemaRegistry::from_reader(mapping.as_bytes()).unwrap();

        assert_eq!(registry.len(), 3);
        let assets = registry.get("UBPR2170").unwrap();
        assert_eq!(assets.column, ColumnRef::Header("UBPR2170".to_string()));
        assert_eq!(assets.convert.convert("12"), Ok(FieldValue::Integer(12)));
        assert_eq!(registry.get("UBPRE001").unwrap().column, ColumnRef::Index(4));
        let notes = registry.get("UBPRD999").unwrap();
        assert_eq!(notes.column, ColumnRef::Header("Comment Text".to_string()));
        assert_eq!(notes.convert, Converter::Text);
    }

    #[test]
    fn test_from_reader_rejects_bad_entries() {
        let bad_header = "name\tschedule\tcolumn\tconvert\n";
        assert!(matches!(
            SchemaRegistry::from_reader(bad_header.as_bytes()),
            Err(UbprError::InvalidRegistryEntry { line: 1, .. })
        ));

        let bad_convert = "code\tschedule\tcolumn\tconvert\nUBPRE569\tSummary Ratios\t\tmoney\n";
        assert!(matches!(
            SchemaRegistry::from_reader(bad_convert.as_bytes()),
            Err(UbprError::InvalidRegistryEntry { line: 2, .. })
        ));

        let duplicate = "code\tschedule\tcolumn\tconvert\n\
                         UBPRE569\tSummary Ratios\t\tfloat\n\
                         UBPRE569\tOther\t\tfloat\n";
        assert!(matches!(
            SchemaRegistry::from_reader(duplicate.as_bytes()),
            Err(UbprError::InvalidRegistryEntry { line: 3, .. })
        ));
    }
}
