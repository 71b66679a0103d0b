//! Windowing a list into one-based pages.

/// One page of a larger list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// One-based page number that was requested.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T: Clone> Page<T> {
    /// Cut page `number` (one-based) of `per_page` items out of `items`.
    ///
    /// A `per_page` of zero is treated as one and a `number` of zero as the
    /// first page. Pages past the end are empty.
    #[must_use]
    pub fn of(items: &[T], number: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let number = number.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let start = (number - 1).saturating_mul(per_page);

        let window = items
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();

        Self {
            items: window,
            number,
            total_pages,
            total_items,
        }
    }
}

impl<T> Page<T> {
    /// Whether a later page has items.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.number < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_last_page() {
        let items: Vec<u32> = (1..=7).collect();
        let first = Page::of(&items, 1, 3);
        assert_eq!(first.items, vec![1, 2, 3]);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_more());

        let last = Page::of(&items, 3, 3);
        assert_eq!(last.items, vec![7]);
        assert!(!last.has_more());
    }

    #[test]
    fn test_out_of_range_and_degenerate_inputs() {
        let items: Vec<u32> = (1..=4).collect();
        assert!(Page::of(&items, 9, 2).items.is_empty());
        assert_eq!(Page::of(&items, 0, 0).items, vec![1]);

        let empty: Vec<u32> = Vec::new();
        let page = Page::of(&empty, 1, 10);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_more());
    }
}
