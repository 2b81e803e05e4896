//! Page windows for long listings.

use serde::Serialize;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }
    let current_page = current_page.min(last_page);

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current + 1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// One page of items with the page links to render around it.
///
/// `pages` lists page numbers with `None` marking an elided gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        Self {
            items,
            pages,
            page: current_page,
            total_pages,
        }
    }

    /// Cuts page `page` (1-based) of `per_page` items out of `all`.
    pub fn from_all(all: Vec<T>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = all.len().div_ceil(per_page);
        let page = page.max(1);
        let items = all
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        Self::new(items, page, total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_listings_show_every_page() {
        assert_eq!(get_pages(3, 2, 2, 2, 4, 2), vec![Some(1), Some(2), Some(3)]);
        assert!(get_pages(0, 1, 2, 2, 4, 2).is_empty());
    }

    #[test]
    fn long_listings_elide_the_middle() {
        let pages = get_pages(20, 10, 2, 2, 4, 2);
        assert_eq!(pages.first(), Some(&Some(1)));
        assert_eq!(pages[2], None);
        assert!(pages.contains(&Some(10)));
        assert_eq!(pages.last(), Some(&Some(20)));
    }

    #[test]
    fn from_all_slices_the_requested_page() {
        let page = Paginated::from_all((1..=7).collect::<Vec<_>>(), 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);

        let past_the_end = Paginated::from_all(vec![1, 2], 5, 3);
        assert!(past_the_end.items.is_empty());
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let page = Paginated::from_all((1..=7).collect::<Vec<_>>(), usize::MAX, 3);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.pages.first(), Some(&Some(1)));
        assert_eq!(page.pages.last(), Some(&Some(3)));
    }
}
