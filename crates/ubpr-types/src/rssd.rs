//! Federal Reserve RSSD identifier type.

/// A Federal Reserve RSSD identifier.
///
/// RSSD IDs are numeric identifiers assigned by the Federal Reserve to every
/// regulated financial institution. They are the join key between UBPR
/// schedule rows and FDIC institution records.
///
/// # Examples
///
/// ```
/// use ubpr_types::Rssd;
///
/// let jpmorgan: Rssd = 852218;
/// let bank_of_america: Rssd = 480228;
/// ```
pub type Rssd = u64;
