//! Collection scoping for list reads.

use schoolbook_core::StudentId;
use std::collections::BTreeSet;

/// Restricts a collection query to the students a principal may see.
///
/// Callers push [`ScopeFilter::student_ids`] into the query instead of
/// fetching everything and filtering, so unrelated rows never leave storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Every student is visible.
    Unrestricted,
    /// Only these students are visible.
    Students(BTreeSet<StudentId>),
}

impl ScopeFilter {
    /// Returns true if `student` is visible.
    #[must_use]
    pub fn permits(&self, student: StudentId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Students(ids) => ids.contains(&student),
        }
    }

    /// Returns true if nothing is filtered out.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Returns the visible student keys, or `None` when unrestricted.
    ///
    /// Suitable for binding to `WHERE student_id = ANY($1)`.
    #[must_use]
    pub fn student_ids(&self) -> Option<Vec<i64>> {
        match self {
            Self::Unrestricted => None,
            Self::Students(ids) => Some(ids.iter().map(StudentId::get).collect()),
        }
    }

    /// Keeps the items whose student key is visible, preserving order.
    ///
    /// Applying the same filter to its own output changes nothing.
    pub fn apply<I, T, F>(&self, items: I, key: F) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> StudentId,
    {
        items
            .into_iter()
            .filter(|item| self.permits(key(item)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<StudentId> {
        raw.iter().copied().map(StudentId::new).collect()
    }

    #[test]
    fn unrestricted_keeps_everything() {
        let all = ids(&[1, 2, 3]);
        let kept = ScopeFilter::Unrestricted.apply(all.clone(), |s| *s);
        assert_eq!(kept, all);
        assert_eq!(ScopeFilter::Unrestricted.student_ids(), None);
    }

    #[test]
    fn students_filter_yields_exact_subset() {
        let filter = ScopeFilter::Students(ids(&[2, 4]).into_iter().collect());
        let kept = filter.apply(ids(&[1, 2, 3, 4, 5]), |s| *s);
        assert_eq!(kept, ids(&[2, 4]));
    }

    #[test]
    fn filter_is_idempotent() {
        let filter = ScopeFilter::Students(ids(&[12, 40]).into_iter().collect());
        let once = filter.apply(ids(&[40, 7, 12, 99, 12]), |s| *s);
        let twice = filter.apply(once.clone(), |s| *s);
        assert_eq!(once, twice);
        assert_eq!(once, ids(&[40, 12, 12]));
    }

    #[test]
    fn empty_link_set_sees_nothing() {
        let filter = ScopeFilter::Students(BTreeSet::new());
        assert!(filter.apply(ids(&[1, 2]), |s| *s).is_empty());
        assert_eq!(filter.student_ids(), Some(Vec::new()));
    }

    #[test]
    fn apply_uses_key_projection() {
        let filter = ScopeFilter::Students(ids(&[12]).into_iter().collect());
        let rows = vec![("a", 12), ("b", 13)];
        let kept = filter.apply(rows, |(_, sid)| StudentId::new(*sid));
        assert_eq!(kept, vec![("a", 12)]);
    }
}
