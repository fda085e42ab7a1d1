//! `?page=&limit=` handling shared by every list endpoint.
//!
//! Pages are 1-indexed. Out-of-range values are clamped rather than
//! rejected: a page below 1 becomes 1 and the limit is held to
//! `1..=MAX_PAGE_SIZE`. Responses pair their rows with a [`PaginationMeta`]
//! whose `totalPages` is `ceil(total / limit)`.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_optional_from_str;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// `{ "total": 12, "page": 2, "limit": 5, "totalPages": 3 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Matching rows across all pages
    pub total: i64,
    pub page: i64,
    /// The limit actually applied
    pub limit: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        Self {
            total,
            page: params.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// Query parameters for pagination.
///
/// Values arrive as strings from the query string; empty strings are treated
/// as absent so `?page=&limit=` falls back to the defaults.
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows skipped before the current page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// `ILIKE` pattern matching `term` anywhere, with `%`, `_` and `\` taken
/// literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PaginationParams {
        PaginationParams { page, limit }
    }

    #[test]
    fn test_defaults_start_at_first_page() {
        let params = PaginationParams::default();
        assert_eq!((params.page(), params.limit(), params.offset()), (1, 10, 0));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        assert_eq!(params(Some(-3), None).page(), 1);
        assert_eq!(params(None, Some(0)).limit(), 1);
        assert_eq!(params(None, Some(500)).limit(), MAX_PAGE_SIZE);
        assert_eq!(params(Some(0), Some(20)).offset(), 0);
    }

    #[test]
    fn test_huge_page_does_not_overflow_offset() {
        let params = params(Some(i64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(params.page(), MAX_PAGE);
        assert_eq!(params.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);
        assert!(params.offset() > 0);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("TKJ"), "%TKJ%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }

    #[test]
    fn test_meta_for_twelve_majors_in_pages_of_five() {
        let meta = PaginationMeta::new(12, &PaginationParams::new(2, 5));
        assert_eq!(
            meta,
            PaginationMeta {
                total: 12,
                page: 2,
                limit: 5,
                total_pages: 3
            }
        );
        assert!(serde_json::to_string(&meta).unwrap().contains(r#""totalPages":3"#));
    }

    #[test]
    fn test_empty_listing_has_no_pages() {
        assert_eq!(PaginationMeta::new(0, &PaginationParams::default()).total_pages, 0);
    }

    #[test]
    fn test_query_strings_parse_and_blank_means_default() {
        let params: PaginationParams = serde_json::from_str(r#"{"page":"3","limit":"25"}"#).unwrap();
        assert_eq!(params.offset(), 50);

        let blank: PaginationParams = serde_json::from_str(r#"{"page":"","limit":""}"#).unwrap();
        assert_eq!((blank.page(), blank.limit()), (1, DEFAULT_PAGE_SIZE));
    }
}
