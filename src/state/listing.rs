//! Cursor-paginated listing kept per session.

use crate::dao::doc_store::PageCursor;

/// Accumulated pages of one ordered collection.
///
/// Every reload bumps `generation`; a page fetched under an older generation is
/// dropped instead of being merged into the newer listing.
#[derive(Debug, Clone)]
pub struct PagedListing<T> {
    scope: Option<String>,
    items: Vec<T>,
    cursor: Option<PageCursor>,
    exhausted: bool,
    generation: u64,
}

/// Continuation of a listing, captured before the store is queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPage {
    pub generation: u64,
    pub after: PageCursor,
}

impl<T> Default for PagedListing<T> {
    fn default() -> Self {
        Self {
            scope: None,
            items: Vec::new(),
            cursor: None,
            exhausted: false,
            generation: 0,
        }
    }
}

impl<T: Clone> PagedListing<T> {
    /// Start loading a first page; returns the generation to apply it under.
    pub fn begin_reload(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Continuation point for the next page, or `None` when there is nothing more to load.
    pub fn begin_next(&self, scope: Option<&str>) -> Option<NextPage> {
        if self.exhausted || self.scope.as_deref() != scope {
            return None;
        }
        self.cursor.clone().map(|after| NextPage {
            generation: self.generation,
            after,
        })
    }

    /// Replace the listing with a freshly loaded first page.
    ///
    /// Returns `false` when a newer reload started in the meantime.
    pub fn apply_first(
        &mut self,
        generation: u64,
        scope: Option<String>,
        page: Vec<T>,
        last: Option<PageCursor>,
        page_size: usize,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.scope = scope;
        self.exhausted = page.len() < page_size;
        self.items = page;
        self.cursor = last;
        true
    }

    /// Append a page loaded from [`Self::begin_next`].
    ///
    /// Returns `false` when the listing was reloaded or extended since.
    pub fn apply_next(
        &mut self,
        next: &NextPage,
        page: Vec<T>,
        last: Option<PageCursor>,
        page_size: usize,
    ) -> bool {
        if next.generation != self.generation || self.cursor.as_ref() != Some(&next.after) {
            return false;
        }
        self.exhausted = page.len() < page_size;
        self.items.extend(page);
        if last.is_some() {
            self.cursor = last;
        }
        true
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Whether the last loaded page came back short.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(key: &str) -> Option<PageCursor> {
        Some(PageCursor {
            key: key.into(),
            id: key.to_lowercase(),
        })
    }

    #[test]
    fn short_page_exhausts_listing() {
        let mut listing = PagedListing::default();
        let generation = listing.begin_reload();
        assert!(listing.apply_first(generation, None, vec!["A", "B"], cursor("B"), 2));
        assert!(!listing.is_exhausted());

        let next = listing.begin_next(None).unwrap();
        assert!(listing.apply_next(&next, vec!["C"], cursor("C"), 2));
        assert!(listing.is_exhausted());
        assert_eq!(listing.items(), ["A", "B", "C"]);
        assert!(listing.begin_next(None).is_none());
    }

    #[test]
    fn next_before_first_page_is_noop() {
        let listing = PagedListing::<&str>::default();
        assert!(listing.begin_next(None).is_none());
    }

    #[test]
    fn reload_discards_in_flight_next_page() {
        let mut listing = PagedListing::default();
        let generation = listing.begin_reload();
        listing.apply_first(generation, None, vec!["A"], cursor("A"), 1);

        let next = listing.begin_next(None).unwrap();
        let reload = listing.begin_reload();
        assert!(!listing.apply_next(&next, vec!["B"], cursor("B"), 1));
        assert!(listing.apply_first(reload, None, vec!["A"], cursor("A"), 1));
        assert_eq!(listing.items(), ["A"]);
    }

    #[test]
    fn same_continuation_applies_once() {
        let mut listing = PagedListing::default();
        let generation = listing.begin_reload();
        listing.apply_first(generation, None, vec!["A"], cursor("A"), 1);

        let next = listing.begin_next(None).unwrap();
        let twin = next.clone();
        assert!(listing.apply_next(&next, vec!["B"], cursor("B"), 1));
        assert!(!listing.apply_next(&twin, vec!["B"], cursor("B"), 1));
        assert_eq!(listing.items(), ["A", "B"]);
    }

    #[test]
    fn next_page_is_scoped() {
        let mut listing = PagedListing::default();
        let generation = listing.begin_reload();
        listing.apply_first(generation, Some("t1".into()), vec!["A"], cursor("A"), 1);
        assert!(listing.begin_next(Some("t2")).is_none());
        assert!(listing.begin_next(Some("t1")).is_some());
    }
}
