use std::sync::Arc;

use stat_tracker_back::{
    config::AppConfig,
    dao::{
        doc_store::{DocumentStore, memory::MemoryDocumentStore},
        models::{GameEntity, MirroredGameEntity},
        paths::{CollectionPath, DocPath},
        repository,
    },
    dto::{
        auth::RegisterRequest,
        game::CreateGameRequest,
        roster::PlayerInput,
        stats::StatLineInput,
        team::TeamInput,
    },
    error::ServiceError,
    identity::memory::MemoryIdentityProvider,
    services::{
        analytics_service, dashboard_service, game_service, index_service, report_service,
        roster_service, session_service, stat_service, team_service,
    },
    state::{AppState, Session, SharedState},
};

struct Fixture {
    state: SharedState,
    store: MemoryDocumentStore,
    session: Arc<Session>,
}

async fn fixture() -> Fixture {
    let state = AppState::new(
        AppConfig::default(),
        Arc::new(MemoryIdentityProvider::new()),
    );
    let store = MemoryDocumentStore::new();
    state.install_store(Arc::new(store.clone())).await;

    let signed_in = session_service::register(
        &state,
        None,
        RegisterRequest {
            first_name: "Casey".into(),
            last_name: "Jones".into(),
            email: "casey@example.com".into(),
            password: "secret-pass".into(),
        },
    )
    .await
    .unwrap();
    let session = state.sessions().get(&signed_in.token).unwrap();

    Fixture {
        state,
        store,
        session,
    }
}

fn stat(points: u32, assists: u32, rebounds: u32) -> StatLineInput {
    StatLineInput {
        points,
        assists,
        rebounds,
    }
}

/// Team "Hawks" with player "Alice" and one game against the "Lions".
async fn hawks(fx: &Fixture) -> (String, String, String) {
    let teams = team_service::add_team(
        &fx.state,
        &fx.session,
        TeamInput {
            name: "Hawks".into(),
            sport: "Basketball".into(),
            city: "Atlanta".into(),
        },
    )
    .await
    .unwrap();
    let team_id = teams.created_id.unwrap();

    let roster = roster_service::add_player(
        &fx.state,
        &fx.session,
        &team_id,
        PlayerInput {
            name: "Alice".into(),
            position: "Guard".into(),
            number: 5,
        },
    )
    .await
    .unwrap();
    let player_id = roster.created_id.unwrap();

    let created = game_service::create_game(
        &fx.state,
        &team_id,
        CreateGameRequest {
            opponent: "Lions".into(),
            date: "2024-03-01".into(),
        },
    )
    .await
    .unwrap();
    assert!(created.mirror_synced);

    (team_id, created.game.id, player_id)
}

#[tokio::test]
async fn hawks_game_scores_and_exports() {
    let fx = fixture().await;
    let (team_id, game_id, player_id) = hawks(&fx).await;

    let saved = stat_service::save_stats(
        &fx.state,
        &fx.session,
        &team_id,
        &game_id,
        &player_id,
        stat(12, 3, 2),
    )
    .await
    .unwrap();
    assert_eq!(saved.score, "12-32");
    assert!(saved.mirror_synced);

    let nested = repository::fetch::<GameEntity>(&fx.store, DocPath::team_game(&team_id, &game_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(nested.data.score, "12-32");
    assert_eq!(nested.data.location, "TBD");

    let mirror =
        repository::fetch::<MirroredGameEntity>(&fx.store, DocPath::mirrored_game(&game_id))
            .await
            .unwrap()
            .unwrap();
    assert_eq!(mirror.data.game.score, "12-32");
    assert_eq!(mirror.data.total_points(), 12);

    let report = report_service::game_report(&fx.state, &team_id, &game_id)
        .await
        .unwrap();
    assert_eq!(report.filename, format!("game_{game_id}_players.csv"));
    let rows: Vec<&str> = report.body.lines().collect();
    assert_eq!(
        rows,
        vec![
            "Team,Game Date,Opponent,Player Name,Number,Position,Points,Assists,Rebounds,Score",
            r#""Hawks","2024-03-01","Lions","Alice",5,"Guard",12,3,2,"12-??""#,
        ]
    );
}

#[tokio::test]
async fn stat_line_reads_back_and_defaults_to_zero() {
    let fx = fixture().await;
    let (team_id, game_id, player_id) = hawks(&fx).await;

    let empty = stat_service::get_stats(&fx.state, &team_id, &game_id, &player_id)
        .await
        .unwrap();
    assert_eq!((empty.points, empty.assists, empty.rebounds), (0, 0, 0));

    stat_service::save_stats(
        &fx.state,
        &fx.session,
        &team_id,
        &game_id,
        &player_id,
        stat(7, 4, 9),
    )
    .await
    .unwrap();
    let line = stat_service::get_stats(&fx.state, &team_id, &game_id, &player_id)
        .await
        .unwrap();
    assert_eq!((line.points, line.assists, line.rebounds), (7, 4, 9));
}

#[tokio::test]
async fn selecting_twice_clears_the_selection() {
    let fx = fixture().await;
    let (team_id, game_id, player_id) = hawks(&fx).await;

    let selected = stat_service::select_game(&fx.state, &fx.session, &team_id, &game_id)
        .await
        .unwrap();
    assert!(selected.selected);
    assert_eq!(selected.stats.len(), 1);
    assert_eq!(selected.stats[0].player_id, player_id);
    assert_eq!(selected.stats[0].points, 0);

    let toggled = stat_service::select_game(&fx.state, &fx.session, &team_id, &game_id)
        .await
        .unwrap();
    assert!(!toggled.selected);
    assert!(fx.session.workspace().lock().await.game.current().is_none());
}

#[tokio::test]
async fn deleting_a_game_removes_stats_and_keeps_the_mirror() {
    let fx = fixture().await;
    let (team_id, game_id, player_id) = hawks(&fx).await;
    stat_service::select_game(&fx.state, &fx.session, &team_id, &game_id)
        .await
        .unwrap();
    stat_service::save_stats(
        &fx.state,
        &fx.session,
        &team_id,
        &game_id,
        &player_id,
        stat(12, 3, 2),
    )
    .await
    .unwrap();

    let deleted = game_service::delete_game(&fx.state, &fx.session, &team_id, &game_id)
        .await
        .unwrap();
    assert_eq!(deleted.stats_deleted, 1);

    let stats = fx
        .store
        .list(CollectionPath::stats(&team_id, &game_id))
        .await
        .unwrap();
    assert!(stats.is_empty());
    assert!(
        fx.store
            .get(DocPath::team_game(&team_id, &game_id))
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        fx.store
            .get(DocPath::mirrored_game(&game_id))
            .await
            .unwrap()
            .is_some()
    );
    assert!(fx.session.workspace().lock().await.game.current().is_none());

    let missing = game_service::delete_game(&fx.state, &fx.session, &team_id, &game_id).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn analytics_rounds_per_game_averages() {
    let fx = fixture().await;
    let (team_id, first_game, player_id) = hawks(&fx).await;
    let second_game = game_service::create_game(
        &fx.state,
        &team_id,
        CreateGameRequest {
            opponent: "Bulls".into(),
            date: "2024-03-08".into(),
        },
    )
    .await
    .unwrap()
    .game
    .id;

    for (game_id, line) in [(&first_game, stat(12, 3, 2)), (&second_game, stat(7, 2, 5))] {
        stat_service::save_stats(&fx.state, &fx.session, &team_id, game_id, &player_id, line)
            .await
            .unwrap();
    }

    let summary = analytics_service::team_analytics(&fx.state, &fx.session, &team_id)
        .await
        .unwrap();
    assert_eq!(summary.team_name, "Hawks");
    assert_eq!(summary.total_games, 2);
    assert_eq!(summary.total_points, 19);
    assert_eq!(summary.avg_points, 10);
    assert_eq!(summary.total_assists, 5);
    assert_eq!(summary.avg_assists, 3);
    assert_eq!(summary.total_rebounds, 7);
    assert_eq!(summary.avg_rebounds, 4);
    assert!(summary.failures.is_empty());

    fx.store
        .fail_collection(CollectionPath::stats(&team_id, &second_game));
    let partial = analytics_service::team_analytics(&fx.state, &fx.session, &team_id)
        .await
        .unwrap();
    assert_eq!(partial.total_games, 2);
    assert_eq!(partial.total_points, 12);
    assert_eq!(partial.avg_points, 6);
    assert_eq!(partial.failures.len(), 1);
    assert_eq!(partial.failures[0].game_id, second_game);
}

#[tokio::test]
async fn analytics_of_a_team_without_games_is_zero() {
    let fx = fixture().await;
    let team_id = team_service::add_team(
        &fx.state,
        &fx.session,
        TeamInput {
            name: "Owls".into(),
            sport: "Hockey".into(),
            city: "Boston".into(),
        },
    )
    .await
    .unwrap()
    .created_id
    .unwrap();

    let summary = analytics_service::team_analytics(&fx.state, &fx.session, &team_id)
        .await
        .unwrap();
    assert_eq!(summary.total_games, 0);
    assert_eq!(summary.avg_points, 0);
}

#[tokio::test]
async fn dashboard_lists_mirrored_games_with_points() {
    let fx = fixture().await;
    let (team_id, game_id, player_id) = hawks(&fx).await;
    stat_service::save_stats(
        &fx.state,
        &fx.session,
        &team_id,
        &game_id,
        &player_id,
        stat(12, 3, 2),
    )
    .await
    .unwrap();

    let user = fx.session.current_user().unwrap();
    let dashboard = dashboard_service::dashboard(&fx.state, &user).await.unwrap();
    assert_eq!(dashboard.display_name.as_deref(), Some("Casey Jones"));
    assert_eq!(dashboard.games.len(), 1);
    assert_eq!(dashboard.games[0].id, game_id);
    assert_eq!(dashboard.games[0].total_points, 12);
    assert_eq!(dashboard.games[0].score, "12-32");
}

#[tokio::test]
async fn rebuilding_the_index_restores_mirrors_and_drops_orphans() {
    let fx = fixture().await;
    let (team_id, game_id, _) = hawks(&fx).await;
    let doomed = game_service::create_game(
        &fx.state,
        &team_id,
        CreateGameRequest {
            opponent: "Bulls".into(),
            date: "2024-03-08".into(),
        },
    )
    .await
    .unwrap()
    .game
    .id;
    game_service::delete_game(&fx.state, &fx.session, &team_id, &doomed)
        .await
        .unwrap();
    fx.store
        .delete(DocPath::mirrored_game(&game_id))
        .await
        .unwrap();

    let report = index_service::rebuild_game_index(&fx.state).await.unwrap();
    assert_eq!(report.mirrored, 1);
    assert_eq!(report.orphans_removed, 1);
    assert!(report.failures.is_empty());

    let mirrors = fx.store.list(CollectionPath::mirrored_games()).await.unwrap();
    assert_eq!(mirrors.len(), 1);
    assert_eq!(mirrors[0].id(), game_id);
}

#[tokio::test]
async fn creating_a_game_for_an_unknown_team_fails() {
    let fx = fixture().await;
    let result = game_service::create_game(
        &fx.state,
        "missing",
        CreateGameRequest {
            opponent: "Lions".into(),
            date: "2024-03-01".into(),
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn data_operations_fail_while_degraded() {
    let fx = fixture().await;
    fx.state.clear_store().await;

    let result = team_service::load_first_page(&fx.state, &fx.session).await;
    assert!(matches!(result, Err(ServiceError::Degraded)));
}
