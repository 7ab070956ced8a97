//! Sequential iteration over a paginated collection.
//!
//! [`PageIterator`] is an explicit state machine:
//!
//! | phase       | `next()` does                                              |
//! |-------------|------------------------------------------------------------|
//! | `Ready`     | fetch the page at the current offset                       |
//! | `HasPage`   | fetch the following page unless `offset >= total_count`    |
//! | `Exhausted` | nothing, returns `false`                                   |
//! | `Errored`   | nothing, returns `false`                                   |
//!
//! A successful fetch moves to `HasPage` and advances the offset by the page
//! limit. A failed fetch moves to `Errored`; [`PageIterator::close`] is the
//! only way to tell that apart from `Exhausted`.

use std::num::NonZeroU32;

use ipam_core::FetchError;
use log::debug;

use super::page::{Page, PageFetcher};

static EMPTY_PAGE: Page = Page::empty();

/// Observable iterator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorPhase {
    /// No page has been requested yet.
    Ready,
    /// The last `next()` produced a page.
    HasPage,
    /// Every page has been produced.
    Exhausted,
    /// A fetch failed; no further pages will be requested.
    Errored,
}

#[derive(Debug)]
enum State {
    Ready,
    HasPage(Page),
    Exhausted,
    Errored(FetchError),
}

/// Drains a collection one page at a time.
///
/// # Examples
///
/// ```no_run
/// use std::num::NonZeroU32;
///
/// use ipam_data::device42::{PageFetcher, PageIterator};
///
/// async fn count_pages(fetcher: impl PageFetcher) -> Result<usize, ipam_core::FetchError> {
///     let mut pages = PageIterator::new(fetcher, NonZeroU32::MIN);
///     let mut seen = 0;
///     while pages.next().await {
///         seen += 1;
///     }
///     pages.close()?;
///     Ok(seen)
/// }
/// ```
#[derive(Debug)]
pub struct PageIterator<F> {
    fetcher: F,
    limit: NonZeroU32,
    offset: u64,
    total_count: Option<u64>,
    state: State,
}

impl<F: PageFetcher> PageIterator<F> {
    /// Start at offset zero, requesting `limit` items per page.
    #[must_use]
    pub const fn new(fetcher: F, limit: NonZeroU32) -> Self {
        Self {
            fetcher,
            limit,
            offset: 0,
            total_count: None,
            state: State::Ready,
        }
    }

    /// Fetch the next page, returning `false` once exhausted or failed.
    pub async fn next(&mut self) -> bool {
        match self.state {
            State::Exhausted | State::Errored(_) => return false,
            State::Ready | State::HasPage(_) => {}
        }
        if self.total_count.is_some_and(|total| self.offset >= total) {
            self.state = State::Exhausted;
            return false;
        }

        let limit = self.limit.get();
        match self.fetcher.fetch_page(limit, self.offset).await {
            Ok(page) => {
                let total = page.envelope().total_count;
                debug!(
                    "fetched page at offset {} of {total} (limit {limit})",
                    self.offset
                );
                self.total_count = Some(total);
                self.offset = self.offset.saturating_add(u64::from(limit));
                self.state = State::HasPage(page);
                true
            }
            Err(err) => {
                self.state = State::Errored(err);
                false
            }
        }
    }

    /// The page produced by the last successful `next()`.
    ///
    /// Returns an empty page in any other phase; check `next()` first.
    #[must_use]
    pub fn current(&self) -> &Page {
        match &self.state {
            State::HasPage(page) => page,
            State::Ready | State::Exhausted | State::Errored(_) => &EMPTY_PAGE,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> IteratorPhase {
        match self.state {
            State::Ready => IteratorPhase::Ready,
            State::HasPage(_) => IteratorPhase::HasPage,
            State::Exhausted => IteratorPhase::Exhausted,
            State::Errored(_) => IteratorPhase::Errored,
        }
    }

    /// Finish iterating and report the fetch error, if one occurred.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the iterator.
    pub fn close(self) -> Result<(), FetchError> {
        match self.state {
            State::Errored(err) => Err(err),
            State::Ready | State::HasPage(_) | State::Exhausted => Ok(()),
        }
    }
}
