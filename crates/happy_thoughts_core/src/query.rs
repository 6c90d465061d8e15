//! crates/happy_thoughts_core/src/query.rs
//!
//! The list query: category filter, optional date sort and page window, all
//! applied in memory over the full set fetched from storage.

use crate::domain::Thought;
use crate::ports::{PortError, PortResult};
use std::ops::Range;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Whatever order the store returned.
    #[default]
    Storage,
    /// Descending by `created_at`.
    NewestFirst,
}

impl SortOrder {
    /// Only `"date"` is recognised; anything else keeps storage order.
    pub fn from_sort_by(sort_by: Option<&str>) -> Self {
        match sort_by {
            Some("date") => SortOrder::NewestFirst,
            _ => SortOrder::Storage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub category: Option<String>,
    pub sort: SortOrder,
    pub page: u64,
    pub limit: u64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            category: None,
            sort: SortOrder::Storage,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One window of a filtered, sorted sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    /// Size of the filtered set, before the window was taken.
    pub total: usize,
}

impl ListQuery {
    /// Builds a query from raw query-string values.
    pub fn from_params(
        category: Option<&str>,
        sort_by: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> PortResult<Self> {
        let category = category
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self {
            category,
            sort: SortOrder::from_sort_by(sort_by),
            page: parse_count("page", page, DEFAULT_PAGE)?,
            limit: parse_count("limit", limit, DEFAULT_LIMIT)?,
        })
    }

    /// Half-open index range `[(page-1)*limit, (page-1)*limit + limit)`,
    /// clamped to `len`. Page 0 and overflowing windows are empty.
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = self
            .page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(self.limit))
            .and_then(|s| usize::try_from(s).ok());

        let Some(start) = start else {
            return 0..0;
        };
        let end = start.saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX));

        start.min(len)..end.min(len)
    }

    fn matches(&self, thought: &Thought) -> bool {
        match &self.category {
            Some(category) => thought.category.to_lowercase() == category.to_lowercase(),
            None => true,
        }
    }

    /// Filters, sorts and windows `thoughts`.
    pub fn apply(&self, thoughts: Vec<Thought>) -> Page<Thought> {
        let mut filtered: Vec<Thought> = thoughts.into_iter().filter(|t| self.matches(t)).collect();

        if self.sort == SortOrder::NewestFirst {
            filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        let total = filtered.len();
        let window = self.window(total);
        let items = filtered.drain(window).collect();

        Page {
            items,
            page: self.page,
            limit: self.limit,
            total,
        }
    }
}

fn parse_count(name: &str, raw: Option<&str>, default: u64) -> PortResult<u64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<u64>().map_err(|_| {
            PortError::Validation(format!(
                "'{}' must be a non-negative integer, got '{}'",
                name, value
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn thought(message: &str, category: &str, minutes: i64) -> Thought {
        Thought {
            id: Uuid::new_v4(),
            message: message.to_string(),
            hearts: 0,
            liked_by: Vec::new(),
            category: category.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    fn sample() -> Vec<Thought> {
        vec![
            thought("first", "Fun", 5),
            thought("second", "General", 30),
            thought("third", "fun", 1),
            thought("fourth", "Work", 20),
            thought("fifth", "FUN", 10),
        ]
    }

    #[test]
    fn defaults_apply_when_params_are_absent() {
        let query = ListQuery::from_params(None, None, None, None).unwrap();
        assert_eq!(query, ListQuery::default());
    }

    #[test]
    fn non_numeric_page_is_a_validation_error() {
        let err = ListQuery::from_params(None, None, Some("abc"), None).unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
        assert!(ListQuery::from_params(None, None, None, Some("-1")).is_err());
    }

    #[test]
    fn empty_category_means_no_filter() {
        let query = ListQuery::from_params(Some(""), None, None, None).unwrap();
        assert_eq!(query.category, None);
    }

    #[test]
    fn unknown_sort_keeps_storage_order() {
        assert_eq!(SortOrder::from_sort_by(Some("hearts")), SortOrder::Storage);
        assert_eq!(SortOrder::from_sort_by(Some("date")), SortOrder::NewestFirst);
    }

    #[test]
    fn category_filter_is_case_insensitive_exact_match() {
        let query = ListQuery {
            category: Some("fUn".to_string()),
            ..ListQuery::default()
        };
        let page = query.apply(sample());

        assert_eq!(page.total, 3);
        let messages: Vec<_> = page.items.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "third", "fifth"]);
    }

    #[test]
    fn unknown_category_yields_empty_set() {
        let query = ListQuery {
            category: Some("Fu".to_string()),
            ..ListQuery::default()
        };
        let page = query.apply(sample());
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn date_sort_orders_the_whole_filtered_set_before_paging() {
        let query = ListQuery {
            sort: SortOrder::NewestFirst,
            page: 2,
            limit: 2,
            ..ListQuery::default()
        };
        let page = query.apply(sample());

        assert_eq!(page.total, 5);
        let messages: Vec<_> = page.items.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["fifth", "first"]);
    }

    #[test]
    fn sorted_output_is_non_increasing() {
        let query = ListQuery {
            sort: SortOrder::NewestFirst,
            limit: 100,
            ..ListQuery::default()
        };
        let page = query.apply(sample());
        assert!(page
            .items
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[test]
    fn slice_never_exceeds_limit_and_total_counts_filtered_set() {
        for limit in 0..7 {
            for page_no in 0..5 {
                let query = ListQuery {
                    page: page_no,
                    limit,
                    ..ListQuery::default()
                };
                let page = query.apply(sample());
                assert!((page.items.len() as u64) <= limit);
                assert_eq!(page.total, 5);
            }
        }
    }

    #[test]
    fn last_page_is_partial_and_past_the_end_is_empty() {
        let query = ListQuery {
            page: 2,
            limit: 3,
            ..ListQuery::default()
        };
        assert_eq!(query.apply(sample()).items.len(), 2);

        let query = ListQuery {
            page: 3,
            limit: 3,
            ..ListQuery::default()
        };
        assert!(query.apply(sample()).items.is_empty());
    }

    #[test]
    fn page_zero_and_huge_pages_are_empty_windows() {
        let zero = ListQuery {
            page: 0,
            ..ListQuery::default()
        };
        assert_eq!(zero.window(10), 0..0);

        let huge = ListQuery {
            page: u64::MAX,
            limit: u64::MAX,
            ..ListQuery::default()
        };
        assert!(huge.window(10).is_empty());
    }
}
