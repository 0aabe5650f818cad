//! Pagination value object.

use crate::error::DomainError;

/// Upper bound on a single page, so one request cannot pull the whole table.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated 1-based page request.
///
/// Equality is by value; two requests for the same page and size are the same request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, DomainError> {
        if page == 0 {
            return Err(DomainError::validation("page must be 1 or greater"));
        }
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        let first = PageRequest::new(1, 20).unwrap();
        assert_eq!(first.offset(), 0);

        let third = PageRequest::new(3, 20).unwrap();
        assert_eq!(third.offset(), 40);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE).is_ok());
    }
}
