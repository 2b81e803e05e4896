//! Listing pipeline turning access-layer results into page listings.
//!
//! Every public page runs the same steps: coerce the payload to a list,
//! decode each document into its record type, drop inactive records, sort
//! and cut a window. A document that fails to decode is logged and skipped
//! so one malformed entry never blanks a page.

use std::cmp::Ordering;

use crate::client::{FetchOutcome, ResourceData};
use crate::domain::document::ResourceDocument;
use crate::domain::records::{DecodeError, Listed};
use crate::pagination::Paginated;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSort {
    /// Newest first; undated records last.
    PublishedDesc,
    /// By `order`, then title.
    OrderAsc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingWindow {
    All,
    Top(usize),
    Page { page: usize, per_page: usize },
}

/// What a page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Ready(T),
    /// Nothing is published.
    Empty,
    /// The API could not be reached.
    Unavailable,
}

fn by_order<T: Listed>(a: &T, b: &T) -> Ordering {
    a.flags()
        .order
        .cmp(&b.flags().order)
        .then_with(|| a.title().cmp(b.title()))
}

fn compare<T: Listed>(sort: ListingSort, a: &T, b: &T) -> Ordering {
    match sort {
        ListingSort::OrderAsc => by_order(a, b),
        ListingSort::PublishedDesc => match (a.published_at(), b.published_at()) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| by_order(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => by_order(a, b),
        },
    }
}

/// Decodes documents, logging and dropping the ones that do not fit `T`.
pub fn decode_all<T, F>(docs: &[ResourceDocument], decode: F) -> Vec<T>
where
    F: Fn(&ResourceDocument) -> Result<T, DecodeError>,
{
    docs.iter()
        .filter_map(|doc| match decode(doc) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("Skipping document {:?}: {err}", doc.id);
                None
            }
        })
        .collect()
}

/// Runs the full pipeline over an access-layer result.
pub fn build_listing<T, F>(
    data: ResourceData,
    decode: F,
    sort: ListingSort,
    window: ListingWindow,
) -> Paginated<T>
where
    T: Listed,
    F: Fn(&ResourceDocument) -> Result<T, DecodeError>,
{
    let docs = data.into_documents();
    let mut records: Vec<T> = decode_all(&docs, decode)
        .into_iter()
        .filter(|record| record.flags().is_active)
        .collect();
    records.sort_by(|a, b| compare(sort, a, b));

    match window {
        ListingWindow::All => Paginated::new(records, 1, 1),
        ListingWindow::Top(n) => {
            records.truncate(n);
            Paginated::new(records, 1, 1)
        }
        ListingWindow::Page { page, per_page } => Paginated::from_all(records, page, per_page),
    }
}

/// The record a singleton page renders, if it is published.
pub fn single_record<T, F>(data: ResourceData, decode: F) -> Option<T>
where
    T: Listed,
    F: Fn(&ResourceDocument) -> Result<T, DecodeError>,
{
    let doc = data.into_first()?;
    decode_all(std::slice::from_ref(&doc), decode)
        .into_iter()
        .find(|record| record.flags().is_active)
}

/// Pipeline over an always-array read, keeping "unavailable" distinct.
pub fn page_state<T, F>(
    outcome: FetchOutcome,
    decode: F,
    sort: ListingSort,
    window: ListingWindow,
) -> PageState<Paginated<T>>
where
    T: Listed,
    F: Fn(&ResourceDocument) -> Result<T, DecodeError>,
{
    match outcome {
        FetchOutcome::Unavailable => PageState::Unavailable,
        FetchOutcome::Loaded(docs) => {
            let listing = build_listing(ResourceData::Documents(docs), decode, sort, window);
            if listing.items.is_empty() && listing.page <= 1 {
                PageState::Empty
            } else {
                PageState::Ready(listing)
            }
        }
    }
}
