//! Page slicing with silent clamping.

/// Page sizes offered to users. Any positive size is accepted.
pub const PER_PAGE_OPTIONS: [usize; 4] = [10, 20, 50, 90];

/// Number of pages needed for `count` items, never less than one.
///
/// A `per_page` of zero is treated as one.
pub fn total_pages(count: usize, per_page: usize) -> usize {
    count.div_ceil(per_page.max(1)).max(1)
}

/// Clamps a 1-based page number into `1..=total_pages(count, per_page)`.
pub fn clamp_page(page: usize, count: usize, per_page: usize) -> usize {
    page.clamp(1, total_pages(count, per_page))
}

/// Returns the items on the given 1-based page.
///
/// Out-of-range pages are clamped rather than rejected, so an empty collection yields
/// one empty page and `page = 999` on a short list returns its last page.
///
/// # Examples
///
/// ```
/// use paperlens::paginate::paginate;
///
/// let items: Vec<u32> = (1..=5).collect();
/// assert_eq!(paginate(&items, 2, 2), &[3, 4]);
/// assert_eq!(paginate(&items, 999, 2), &[5]);
/// assert_eq!(paginate(&items, 0, 2), &[1, 2]);
/// ```
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let per_page = per_page.max(1);
    let page = clamp_page(page, items.len(), per_page);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    &items[start.min(end)..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0, 20, 1)]
    #[case(5, 20, 1)]
    #[case(20, 20, 1)]
    #[case(21, 20, 2)]
    #[case(90, 10, 9)]
    #[case(3, 0, 3)]
    fn test_total_pages(#[case] count: usize, #[case] per_page: usize, #[case] expected: usize) {
        assert_eq!(total_pages(count, per_page), expected);
    }

    #[test]
    fn test_empty_collection_has_one_empty_page() {
        let items: Vec<u8> = Vec::new();
        assert!(paginate(&items, 1, 20).is_empty());
        assert!(paginate(&items, 7, 20).is_empty());
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let items: Vec<u8> = (0..5).collect();
        assert_eq!(paginate(&items, 999, 20), paginate(&items, 1, 20));
        assert_eq!(paginate(&items, 999, 20), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_pages_reconstruct_collection() {
        let items: Vec<u32> = (0..47).collect();
        for per_page in PER_PAGE_OPTIONS.into_iter().chain([1, 7, 47, 100]) {
            let pages = total_pages(items.len(), per_page);
            let rebuilt: Vec<u32> = (1..=pages)
                .flat_map(|page| paginate(&items, page, per_page).iter().copied())
                .collect();
            assert_eq!(rebuilt, items, "per_page = {per_page}");
        }
    }

    #[test]
    fn test_clamping_is_idempotent() {
        let once = clamp_page(12, 30, 10);
        assert_eq!(once, 3);
        assert_eq!(clamp_page(once, 30, 10), once);
    }
}
