use tracing::info;

use crate::{
    dao::{
        doc_store::DocumentStore,
        models::PlayerEntity,
        paths::{CollectionPath, DocPath},
        repository::{self, Record},
    },
    dto::roster::{PlayerInput, PlayerSummary, RosterListing},
    error::ServiceError,
    services::{
        paging::{self, ListingSnapshot},
        require_store,
        team_service::require_team,
    },
    state::{PagedListing, Session, SharedState, Workspace},
};

fn roster(workspace: &mut Workspace) -> &mut PagedListing<Record<PlayerEntity>> {
    &mut workspace.roster
}

fn listing(
    team_id: &str,
    snapshot: ListingSnapshot<PlayerEntity>,
    created_id: Option<String>,
) -> RosterListing {
    RosterListing {
        team_id: team_id.to_owned(),
        players: snapshot.items.into_iter().map(PlayerSummary::from).collect(),
        exhausted: snapshot.exhausted,
        created_id,
    }
}

/// Load the first roster page of `team_id`, replacing any previously listed roster.
pub async fn load_first_page(
    state: &SharedState,
    session: &Session,
    team_id: &str,
) -> Result<RosterListing, ServiceError> {
    let store = require_store(state).await?;
    let snapshot = paging::load_first(
        store.as_ref(),
        session,
        roster,
        CollectionPath::roster(team_id),
        Some(team_id.to_owned()),
        state.config().page_size,
    )
    .await?;
    Ok(listing(team_id, snapshot, None))
}

pub async fn load_next_page(
    state: &SharedState,
    session: &Session,
    team_id: &str,
) -> Result<RosterListing, ServiceError> {
    {
        let workspace = session.workspace().lock().await;
        match workspace.roster.scope() {
            // Nothing loaded yet: nothing to continue from.
            None => {
                return Ok(RosterListing {
                    team_id: team_id.to_owned(),
                    players: Vec::new(),
                    exhausted: workspace.roster.is_exhausted(),
                    created_id: None,
                });
            }
            Some(loaded) if loaded != team_id => {
                return Err(ServiceError::InvalidState(format!(
                    "roster of team `{loaded}` is loaded, not `{team_id}`"
                )));
            }
            Some(_) => {}
        }
    }

    let store = require_store(state).await?;
    let snapshot = paging::load_next(
        store.as_ref(),
        session,
        roster,
        CollectionPath::roster(team_id),
        Some(team_id),
        state.config().page_size,
    )
    .await?;
    Ok(listing(team_id, snapshot, None))
}

pub async fn add_player(
    state: &SharedState,
    session: &Session,
    team_id: &str,
    input: PlayerInput,
) -> Result<RosterListing, ServiceError> {
    let store = require_store(state).await?;
    require_team(store.as_ref(), team_id).await?;
    let id = repository::insert(
        store.as_ref(),
        &CollectionPath::roster(team_id),
        &PlayerEntity::from(input),
    )
    .await?;
    info!(team_id, player_id = %id, "player added to roster");

    let mut refreshed = load_first_page(state, session, team_id).await?;
    refreshed.created_id = Some(id);
    Ok(refreshed)
}

pub async fn update_player(
    state: &SharedState,
    session: &Session,
    team_id: &str,
    player_id: &str,
    input: PlayerInput,
) -> Result<RosterListing, ServiceError> {
    let store = require_store(state).await?;
    let updated = repository::merge(
        store.as_ref(),
        DocPath::player(team_id, player_id),
        &PlayerEntity::from(input),
    )
    .await?;
    if !updated {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` not found in team `{team_id}`"
        )));
    }
    info!(team_id, player_id, "player updated");
    load_first_page(state, session, team_id).await
}

pub async fn delete_player(
    state: &SharedState,
    session: &Session,
    team_id: &str,
    player_id: &str,
) -> Result<RosterListing, ServiceError> {
    let store = require_store(state).await?;
    if !store.delete(DocPath::player(team_id, player_id)).await? {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` not found in team `{team_id}`"
        )));
    }
    info!(team_id, player_id, "player removed from roster");
    load_first_page(state, session, team_id).await
}

/// Full roster of a team ordered by name, then id.
pub(crate) async fn full_roster(
    store: &dyn DocumentStore,
    team_id: &str,
) -> Result<Vec<Record<PlayerEntity>>, ServiceError> {
    let mut players =
        repository::list::<PlayerEntity>(store, CollectionPath::roster(team_id)).await?;
    players.sort_by(|a, b| (&a.data.name, &a.id).cmp(&(&b.data.name, &b.id)));
    Ok(players)
}
