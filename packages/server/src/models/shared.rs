/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Upper bound on a single listing page.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Resolve requested paging into a `(limit, offset)` pair the fetch
/// layer accepts.
pub fn page_window(limit: Option<u64>, offset: Option<u64>) -> (u64, u64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0);
    (limit, offset)
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
