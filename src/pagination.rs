// Pagination math for listings
// Raw query values come in as strings; anything unusable falls back to defaults.

/// Page used when the requested one is absent or unusable
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the requested one is absent or unusable
pub const DEFAULT_SIZE: i64 = 12;

/// The `(size, offset)` slice for a requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub size: i64,
    pub offset: i64,
}

/// A page window together with the page count for a known total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
    pub offset: i64,
    pub total_pages: i64,
}

impl PageWindow {
    /// Window for raw `page`/`size` query values.
    /// Known before the total count so both queries can run together.
    pub fn from_query(page: Option<&str>, size: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let size = parse_positive(size).unwrap_or(DEFAULT_SIZE);

        Self {
            page,
            size,
            offset: size.saturating_mul(page - 1),
        }
    }

    /// Completes the window with the page count for `total` items
    pub fn with_total(self, total: i64) -> Pagination {
        let total = total.max(0);
        // size >= 1 always holds here
        let total_pages = total / self.size + i64::from(total % self.size != 0);

        Pagination {
            page: self.page,
            size: self.size,
            offset: self.offset,
            total_pages,
        }
    }
}

/// `paginate(page?, size?, total)` in one step
pub fn paginate(page: Option<&str>, size: Option<&str>, total: i64) -> Pagination {
    PageWindow::from_query(page, size).with_total(total)
}

/// Numeric value truncated toward zero, or None when missing, non-numeric or <= 0
fn parse_positive(raw: Option<&str>) -> Option<i64> {
    let value: f64 = raw?.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    // `as` saturates at the i64 bounds
    let value = value.trunc() as i64;
    (value > 0).then_some(value)
}
