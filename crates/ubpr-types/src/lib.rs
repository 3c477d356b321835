//! # ubpr-types
//!
//! Type definitions for Uniform Bank Performance Report (UBPR) metrics and
//! FDIC institution directory records.
//!
//! This crate provides the plain data structures shared by the UBPR loader:
//! identifiers, metric codes, converted field values, per-institution UBPR
//! records and institution master records.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Serialized records are flat maps from field or metric code to value.
//!
//! ## Usage
//!
//! ```rust
//! use ubpr_types::{FieldValue, InstitutionRecord, MetricCode, Rssd};
//! use ubpr_types::well_known;
//!
//! let rssd: Rssd = 802866;
//! let mut record = InstitutionRecord::new(rssd);
//! record.insert(MetricCode::new(well_known::UBPRE569), FieldValue::Float(-89.2));
//!
//! assert_eq!(record.get(well_known::UBPRE569), Some(&FieldValue::Float(-89.2)));
//! assert!(record.get(well_known::UBPRE567).is_none());
//! ```

#![warn(missing_docs)]

mod enums;
mod institution;
mod metric_code;
mod record;
mod rssd;
mod value;
pub mod well_known;

// Re-export all public types at crate root
pub use enums::SortDirection;
pub use institution::InstitutionMasterRecord;
pub use metric_code::MetricCode;
pub use record::{CombinedRecord, InstitutionRecord};
pub use rssd::Rssd;
pub use value::FieldValue;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        let _rssd: Rssd = 480228;
        let _code = MetricCode::new("UBPRE569");
        let _value = FieldValue::Integer(1);
        let _direction = SortDirection::Descending;
        let _record = InstitutionRecord::new(480228);
    }

    #[test]
    fn test_well_known_accessible() {
        assert_eq!(well_known::UBPRE569, "UBPRE569");
        assert_eq!(well_known::SUMMARY_RATIOS, "Summary Ratios");
    }
}
