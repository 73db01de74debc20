use tracing::info;

use crate::{
    dao::{
        doc_store::DocumentStore,
        models::TeamEntity,
        paths::{CollectionPath, DocPath},
        repository::{self, Record},
    },
    dto::team::{TeamInput, TeamListing, TeamSummary},
    error::ServiceError,
    services::{
        paging::{self, ListingSnapshot},
        require_store,
    },
    state::{PagedListing, Session, SharedState, Workspace},
};

fn teams(workspace: &mut Workspace) -> &mut PagedListing<Record<TeamEntity>> {
    &mut workspace.teams
}

fn listing(snapshot: ListingSnapshot<TeamEntity>, created_id: Option<String>) -> TeamListing {
    TeamListing {
        teams: snapshot.items.into_iter().map(TeamSummary::from).collect(),
        exhausted: snapshot.exhausted,
        created_id,
    }
}

/// Load the first page of teams, replacing the session listing.
pub async fn load_first_page(
    state: &SharedState,
    session: &Session,
) -> Result<TeamListing, ServiceError> {
    let store = require_store(state).await?;
    let snapshot = paging::load_first(
        store.as_ref(),
        session,
        teams,
        CollectionPath::teams(),
        None,
        state.config().page_size,
    )
    .await?;
    Ok(listing(snapshot, None))
}

/// Append the next page of teams to the session listing.
pub async fn load_next_page(
    state: &SharedState,
    session: &Session,
) -> Result<TeamListing, ServiceError> {
    let store = require_store(state).await?;
    let snapshot = paging::load_next(
        store.as_ref(),
        session,
        teams,
        CollectionPath::teams(),
        None,
        state.config().page_size,
    )
    .await?;
    Ok(listing(snapshot, None))
}

pub async fn add_team(
    state: &SharedState,
    session: &Session,
    input: TeamInput,
) -> Result<TeamListing, ServiceError> {
    let store = require_store(state).await?;
    let id = repository::insert(
        store.as_ref(),
        &CollectionPath::teams(),
        &TeamEntity::from(input),
    )
    .await?;
    info!(team_id = %id, "team created");

    let mut refreshed = load_first_page(state, session).await?;
    refreshed.created_id = Some(id);
    Ok(refreshed)
}

pub async fn update_team(
    state: &SharedState,
    session: &Session,
    team_id: &str,
    input: TeamInput,
) -> Result<TeamListing, ServiceError> {
    let store = require_store(state).await?;
    let updated =
        repository::merge(store.as_ref(), DocPath::team(team_id), &TeamEntity::from(input))
            .await?;
    if !updated {
        return Err(ServiceError::NotFound(format!("team `{team_id}` not found")));
    }
    info!(team_id, "team updated");
    load_first_page(state, session).await
}

/// Delete the team document. Roster, games and stats underneath are left in place.
pub async fn delete_team(
    state: &SharedState,
    session: &Session,
    team_id: &str,
) -> Result<TeamListing, ServiceError> {
    let store = require_store(state).await?;
    if !store.delete(DocPath::team(team_id)).await? {
        return Err(ServiceError::NotFound(format!("team `{team_id}` not found")));
    }
    info!(team_id, "team deleted");
    load_first_page(state, session).await
}

/// Fetch one team, failing with `NotFound` when it does not exist.
pub(crate) async fn require_team(
    store: &dyn DocumentStore,
    team_id: &str,
) -> Result<Record<TeamEntity>, ServiceError> {
    repository::fetch::<TeamEntity>(store, DocPath::team(team_id))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("team `{team_id}` not found")))
}
