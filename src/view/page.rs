//! Page window stage

use crate::core::query::PageWindow;

/// The records of page `page` (1-based) of size `page_size`
///
/// Pages past the end are empty and never wrap. Page 0 is read as page 1
/// and a page size of 0 as 1.
pub fn paginate<T>(records: &[T], page: usize, page_size: usize) -> &[T] {
    let window = PageWindow::new(page, page_size, records.len());
    let start = window.offset().min(records.len());
    let end = start.saturating_add(window.page_size).min(records.len());
    &records[start..end]
}
