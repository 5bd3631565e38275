use crate::error::AppError;
use crate::query::QueryBuilder;
use serde::Serialize;

/// Page request as received from the caller. `total_count` is the number of entities (before any
/// join), counted once per request before the window is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationRequest {
    pub page_size: i64,
    pub page_no: i64,
    pub total_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    pub page_size: u64,
    pub page_no: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Half-open range `[offset, offset + limit)` over entity identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Largest OFFSET PostgreSQL accepts (a signed bigint).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

#[cfg(test)]
impl PageWindow {
    fn end(&self) -> u64 {
        self.offset.saturating_add(self.limit)
    }

    fn contains(&self, index: u64) -> bool {
        index >= self.offset && index < self.end()
    }
}

impl PaginationRequest {
    pub fn new(page_size: i64, page_no: i64, total_count: u64) -> Self {
        PaginationRequest {
            page_size,
            page_no,
            total_count,
        }
    }

    fn checked(&self) -> Result<(u64, u64), AppError> {
        if self.page_size <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "pageSize must be >= 1, got {}",
                self.page_size
            )));
        }
        if self.page_no <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "pageNo must be >= 1, got {}",
                self.page_no
            )));
        }
        Ok((self.page_size as u64, self.page_no as u64))
    }

    /// Offsets past the last representable row clamp to `MAX_OFFSET`: the window is empty
    /// either way, and the database rejects anything larger.
    pub fn window(&self) -> Result<PageWindow, AppError> {
        let (page_size, page_no) = self.checked()?;
        let offset = (page_no - 1)
            .checked_mul(page_size)
            .map_or(MAX_OFFSET, |offset| offset.min(MAX_OFFSET));
        Ok(PageWindow {
            offset,
            limit: page_size,
        })
    }

    pub fn metadata(&self) -> Result<PaginationMetadata, AppError> {
        let (page_size, page_no) = self.checked()?;
        let total_pages = self.total_count.div_ceil(page_size);
        Ok(PaginationMetadata {
            page_size,
            page_no,
            total_count: self.total_count,
            total_pages,
            has_next: page_no < total_pages,
            has_prev: page_no > 1,
        })
    }
}

/// Compute the page window and a function producing the page metadata.
///
/// The window is meant for primary-key selection; the caller fetches and joins only the entities
/// inside it, then hands those records to the returned function. Page arithmetic comes from
/// `total_count`, so join fan-out in the fetched rows never shifts `totalPages` or `hasNext`.
/// A `page_no` past the last page is not an error: the window is simply empty.
pub fn paginate<T>(
    request: PaginationRequest,
) -> Result<(PageWindow, impl Fn(&[T]) -> PaginationMetadata), AppError> {
    let window = request.window()?;
    let metadata = request.metadata()?;
    tracing::debug!(
        offset = window.offset,
        limit = window.limit,
        total_count = metadata.total_count,
        total_pages = metadata.total_pages,
        "page window"
    );
    let finish = move |records: &[T]| {
        if records.len() as u64 > window.limit {
            tracing::warn!(
                records = records.len(),
                limit = window.limit,
                "page holds more records than its window; rows were not collapsed per entity"
            );
        }
        metadata
    };
    Ok((window, finish))
}

/// Apply the page window of `request` to `qb` and return the metadata function.
pub fn deferred_join_pagination<Q: QueryBuilder, T>(
    qb: &mut Q,
    request: PaginationRequest,
) -> Result<impl Fn(&[T]) -> PaginationMetadata, AppError> {
    let (window, finish) = paginate(request)?;
    qb.window(window);
    Ok(finish)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_support::RecordingBuilder;

    fn meta(page_size: i64, page_no: i64, total_count: u64) -> PaginationMetadata {
        let (_, finish) = paginate::<()>(PaginationRequest::new(page_size, page_no, total_count)).unwrap();
        finish(&[])
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(meta(100, 1, 101).total_pages, 2);
        assert_eq!(meta(100, 1, 100).total_pages, 1);
        assert_eq!(meta(100, 1, 1).total_pages, 1);
        for total in 0..50u64 {
            for size in 1..12i64 {
                let expected = (total + size as u64 - 1) / size as u64;
                assert_eq!(meta(size, 1, total).total_pages, expected);
            }
        }
    }

    #[test]
    fn single_page_has_no_neighbours() {
        let m = meta(10, 1, 10);
        assert_eq!(m.total_pages, 1);
        assert!(!m.has_next);
        assert!(!m.has_prev);
    }

    #[test]
    fn middle_page_has_both_neighbours() {
        let m = meta(10, 2, 30);
        assert!(m.has_next);
        assert!(m.has_prev);
    }

    #[test]
    fn offset_is_exact() {
        let (window, _) = paginate::<()>(PaginationRequest::new(20, 3, 1000)).unwrap();
        assert_eq!(window, PageWindow { offset: 40, limit: 20 });
        assert!(window.contains(40));
        assert!(window.contains(59));
        assert!(!window.contains(60));
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let (window, finish) = paginate::<()>(PaginationRequest::new(10, 2, 5)).unwrap();
        assert_eq!(window.offset, 10);
        assert!(!window.contains(4));
        let m = finish(&[]);
        assert_eq!(m.total_pages, 1);
        assert!(!m.has_next);
        assert!(m.has_prev);
    }

    #[test]
    fn empty_table() {
        let m = meta(10, 1, 0);
        assert_eq!(m.total_pages, 0);
        assert!(!m.has_next);
        assert!(!m.has_prev);
        assert!(meta(10, 3, 0).has_prev);
    }

    #[test]
    fn non_positive_inputs_are_invalid_arguments() {
        for (size, no) in [(0, 1), (1, 0), (-5, 1), (1, -1)] {
            let result = paginate::<()>(PaginationRequest::new(size, no, 10));
            assert!(matches!(result, Err(AppError::InvalidArgument(_))), "{size}/{no}");
        }
    }

    #[test]
    fn huge_page_numbers_clamp_to_an_empty_window() {
        let (window, finish) =
            paginate::<()>(PaginationRequest::new(100, 100_000_000_000_000_000, 5)).unwrap();
        assert_eq!(window.offset, MAX_OFFSET);
        assert!(window.offset <= i64::MAX as u64);
        assert!(!window.contains(4));
        let m = finish(&[]);
        assert!(!m.has_next);
        assert!(m.has_prev);

        let (window, _) = paginate::<()>(PaginationRequest::new(i64::MAX, i64::MAX, 10)).unwrap();
        assert_eq!(window.offset, MAX_OFFSET);
    }

    #[test]
    fn metadata_ignores_joined_row_count() {
        let (_, finish) = paginate::<u32>(PaginationRequest::new(2, 1, 3)).unwrap();
        // three joined rows for a two-entity window must not change the arithmetic
        let m = finish(&[1, 1, 2]);
        assert_eq!(m, meta(2, 1, 3));
        assert!(m.has_next);
    }

    #[test]
    fn deferred_join_applies_window_to_builder() {
        let mut qb = RecordingBuilder::accepting(&[]);
        let finish = deferred_join_pagination::<_, serde_json::Value>(&mut qb, PaginationRequest::new(25, 4, 80)).unwrap();
        assert_eq!(qb.offset, Some(75));
        assert_eq!(qb.limit, Some(25));
        let m = finish(&[]);
        assert_eq!(m.total_pages, 4);
        assert!(!m.has_next);
    }

    #[test]
    fn deferred_join_leaves_builder_untouched_on_error() {
        let mut qb = RecordingBuilder::accepting(&[]);
        let result = deferred_join_pagination::<_, serde_json::Value>(&mut qb, PaginationRequest::new(0, 1, 0));
        assert!(result.is_err());
        assert_eq!(qb.limit, None);
        assert_eq!(qb.offset, None);
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let v = serde_json::to_value(meta(100, 1, 101)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "pageSize": 100,
                "pageNo": 1,
                "totalCount": 101,
                "totalPages": 2,
                "hasNext": true,
                "hasPrev": false
            })
        );
    }
}
