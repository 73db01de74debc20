//! First/next page loading shared by the team and roster listings.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    dao::{
        doc_store::{DocumentStore, PageQuery},
        paths::CollectionPath,
        repository::{self, Record},
    },
    error::ServiceError,
    state::{PagedListing, Session, Workspace},
};

/// Listings are ordered by this field, ties broken by document id.
pub const ORDER_FIELD: &str = "name";

/// Selects one listing of the session workspace.
pub type ListingSlot<T> = fn(&mut Workspace) -> &mut PagedListing<Record<T>>;

/// Copy of a listing taken while the workspace lock is held.
#[derive(Debug, Clone)]
pub struct ListingSnapshot<T> {
    pub items: Vec<Record<T>>,
    pub exhausted: bool,
}

fn snapshot<T: Clone>(listing: &PagedListing<Record<T>>) -> ListingSnapshot<T> {
    ListingSnapshot {
        items: listing.items().to_vec(),
        exhausted: listing.is_exhausted(),
    }
}

/// Load the first page of `collection` and replace the listing with it.
pub async fn load_first<T>(
    store: &dyn DocumentStore,
    session: &Session,
    slot: ListingSlot<T>,
    collection: CollectionPath,
    scope: Option<String>,
    page_size: usize,
) -> Result<ListingSnapshot<T>, ServiceError>
where
    T: DeserializeOwned + Clone,
{
    let generation = {
        let mut workspace = session.workspace().lock().await;
        slot(&mut workspace).begin_reload()
    };

    let page = repository::page::<T>(
        store,
        collection.clone(),
        PageQuery {
            order_by: ORDER_FIELD,
            after: None,
            limit: page_size,
        },
    )
    .await?;

    let mut workspace = session.workspace().lock().await;
    let listing = slot(&mut workspace);
    if !listing.apply_first(generation, scope, page.records, page.last, page_size) {
        debug!(%collection, generation, "discarding superseded first page");
    }
    Ok(snapshot(listing))
}

/// Append the page following the last loaded document. No-op once exhausted.
pub async fn load_next<T>(
    store: &dyn DocumentStore,
    session: &Session,
    slot: ListingSlot<T>,
    collection: CollectionPath,
    scope: Option<&str>,
    page_size: usize,
) -> Result<ListingSnapshot<T>, ServiceError>
where
    T: DeserializeOwned + Clone,
{
    let next = {
        let mut workspace = session.workspace().lock().await;
        let listing = slot(&mut workspace);
        match listing.begin_next(scope) {
            Some(next) => next,
            None => return Ok(snapshot(listing)),
        }
    };

    let page = repository::page::<T>(
        store,
        collection.clone(),
        PageQuery {
            order_by: ORDER_FIELD,
            after: Some(next.after.clone()),
            limit: page_size,
        },
    )
    .await?;

    let mut workspace = session.workspace().lock().await;
    let listing = slot(&mut workspace);
    if !listing.apply_next(&next, page.records, page.last, page_size) {
        debug!(%collection, generation = next.generation, "discarding stale next page");
    }
    Ok(snapshot(listing))
}
