//! Pagination over the sorted match set.
//!
//! `page_size <= 0` means a single unlimited page. The requested page
//! number is clamped into the valid range before slicing, so a stale
//! `pageNumber` in a saved config (the corpus shrank since the last save)
//! still renders the last page instead of an empty table.

/// Total number of pages for `total_items` at `page_size` per page.
/// Always at least 1: an empty match set still has one (empty) page.
pub fn total_pages(total_items: usize, page_size: i64) -> u32 {
    if page_size <= 0 {
        return 1;
    }
    let size = page_size as usize;
    let pages = total_items.div_ceil(size);
    pages.max(1) as u32
}

/// Clamp a 1-based requested page into `[1, total_pages]`.
pub fn clamp_page(requested: u32, total_items: usize, page_size: i64) -> u32 {
    requested.clamp(1, total_pages(total_items, page_size))
}

/// Slice out the requested page. `page` is assumed already clamped;
/// out-of-range values degrade to an empty slice rather than panicking.
pub fn paginate<T>(items: &[T], page: u32, page_size: i64) -> &[T] {
    if page_size <= 0 {
        return items;
    }
    let size = page_size as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(size);
    let end = start.saturating_add(size).min(items.len());
    if start >= items.len() {
        return &[];
    }
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_page_returns_everything() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(&items, 1, 0), items.as_slice());
        assert_eq!(paginate(&items, 1, -3), items.as_slice());
        assert_eq!(total_pages(7, 0), 1);
    }

    #[test]
    fn pages_partition_the_items() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(&items, 1, 3), &[1, 2, 3]);
        assert_eq!(paginate(&items, 2, 3), &[4, 5, 6]);
        assert_eq!(paginate(&items, 3, 3), &[7]);
        assert_eq!(total_pages(7, 3), 3);
    }

    #[test]
    fn concatenating_all_pages_reconstructs_the_items() {
        let items: Vec<u32> = (1..=23).collect();
        let size = 5;
        let mut rebuilt = Vec::new();
        for page in 1..=total_pages(items.len(), size) {
            rebuilt.extend_from_slice(paginate(&items, page, size));
        }
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn stale_page_number_clamps_to_last_page() {
        assert_eq!(clamp_page(9, 7, 3), 3);
        assert_eq!(clamp_page(0, 7, 3), 1);
        assert_eq!(clamp_page(2, 7, 3), 2);
    }

    #[test]
    fn empty_match_set_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        assert_eq!(total_pages(0, 5), 1);
        assert_eq!(clamp_page(4, 0, 5), 1);
        assert!(paginate(&items, 1, 5).is_empty());
    }

    #[test]
    fn out_of_range_page_is_empty_not_a_panic() {
        let items: Vec<u32> = (1..=4).collect();
        assert!(paginate(&items, 10, 3).is_empty());
    }
}
