//! Small enumerations shared across the workspace.

use std::cmp::Ordering;

/// Direction for sorting institutions or UBPR records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirection {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    #[default]
    Descending,
}

impl SortDirection {
    /// Applies this direction to an ascending ordering.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use ubpr_types::SortDirection;
    ///
    /// assert_eq!(SortDirection::Ascending.apply(Ordering::Less), Ordering::Less);
    /// assert_eq!(SortDirection::Descending.apply(Ordering::Less), Ordering::Greater);
    /// ```
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_descending() {
        assert_eq!(SortDirection::default(), SortDirection::Descending);
    }

    #[test]
    fn test_apply_equal_is_stable() {
        assert_eq!(SortDirection::Descending.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(SortDirection::Ascending.apply(Ordering::Equal), Ordering::Equal);
    }
}
