/// Page metadata derived from `limit`, `offset` and the total row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
    /// 1-based page that `offset` falls on
    pub current_page: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// `limit` must be at least 1; validation guarantees it upstream.
    pub fn new(total: u64, limit: u64, offset: u64) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            offset,
            current_page: (offset / limit).saturating_add(1),
            total_pages: total.div_ceil(limit),
        }
    }
}

/// Paginated result wrapper
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResult<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub pagination: Pagination,
}

impl<T> PaginatedResult<T> {
    pub fn new(rows: Vec<T>, total: u64, limit: u64, offset: u64) -> Self {
        Self {
            rows,
            total,
            pagination: Pagination::new(total, limit, offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_rows_two_per_page() {
        let p = Pagination::new(5, 2, 0);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.current_page, 1);
    }

    #[test]
    fn total_pages_is_ceiling() {
        for limit in 1..=100u64 {
            for total in [0u64, 1, 99, 100, 101, 1_000, 12_345] {
                let expected = (total as f64 / limit as f64).ceil() as u64;
                assert_eq!(Pagination::new(total, limit, 0).total_pages, expected);
            }
        }
    }

    #[test]
    fn current_page_floors_offset() {
        assert_eq!(Pagination::new(100, 25, 0).current_page, 1);
        assert_eq!(Pagination::new(100, 25, 24).current_page, 1);
        assert_eq!(Pagination::new(100, 25, 25).current_page, 2);
        assert_eq!(Pagination::new(100, 25, 99).current_page, 4);
    }

    #[test]
    fn offset_past_the_end_keeps_metadata() {
        let p = Pagination::new(5, 2, 40);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.current_page, 21);
        assert_eq!(p.offset, 40);
    }

    #[test]
    fn largest_offset_does_not_overflow() {
        let p = Pagination::new(5, 1, u64::MAX);
        assert_eq!(p.current_page, u64::MAX);
        assert_eq!(p.total_pages, 5);
    }

    #[test]
    fn empty_table_has_zero_pages() {
        let p = Pagination::new(0, 25, 0);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.current_page, 1);
    }
}
