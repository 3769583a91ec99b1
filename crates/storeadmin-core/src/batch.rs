//! Size limit for export and print selections.

use serde::{Deserialize, Serialize};

use crate::config::BatchConfig;

/// A selection after the batch limit was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSelection<T> {
    pub items: Vec<T>,
    /// Number of items originally requested.
    pub requested: usize,
    /// Set when the selection was truncated.
    pub warning: Option<String>,
}

impl<T> BatchSelection<T> {
    pub fn is_truncated(&self) -> bool {
        self.items.len() < self.requested
    }
}

/// Keep at most `config.max_items` items. A limit of 0 disables the check.
pub fn limit_batch<T>(mut items: Vec<T>, config: &BatchConfig) -> BatchSelection<T> {
    let requested = items.len();
    let max = config.max_items;
    if max == 0 || requested <= max {
        return BatchSelection {
            items,
            requested,
            warning: None,
        };
    }

    items.truncate(max);
    tracing::warn!(requested, max, "batch selection truncated");
    BatchSelection {
        items,
        requested,
        warning: Some(format!(
            "Only the first {} of {} selected items were processed",
            max, requested
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_limit_is_untouched() {
        let selection = limit_batch(vec![1, 2, 3], &BatchConfig::default());
        assert_eq!(selection.items, vec![1, 2, 3]);
        assert!(selection.warning.is_none());
        assert!(!selection.is_truncated());
    }

    #[test]
    fn test_default_limit_truncates_at_500() {
        let selection = limit_batch((0..501).collect(), &BatchConfig::default());
        assert_eq!(selection.items.len(), 500);
        assert_eq!(selection.requested, 501);
        assert!(selection.warning.unwrap().contains("500 of 501"));
    }

    #[test]
    fn test_zero_disables_limit() {
        let selection = limit_batch((0..1000).collect(), &BatchConfig { max_items: 0 });
        assert_eq!(selection.items.len(), 1000);
    }
}
