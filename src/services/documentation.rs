use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Stat Tracker Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::oauth,
        crate::routes::auth::password_reset,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::sse::session_stream,
        crate::routes::teams::first_page,
        crate::routes::teams::next_page,
        crate::routes::teams::add_team,
        crate::routes::teams::update_team,
        crate::routes::teams::delete_team,
        crate::routes::roster::first_page,
        crate::routes::roster::next_page,
        crate::routes::roster::add_player,
        crate::routes::roster::update_player,
        crate::routes::roster::delete_player,
        crate::routes::games::load_games,
        crate::routes::games::create_game,
        crate::routes::games::delete_game,
        crate::routes::games::rebuild_index,
        crate::routes::stats::select_game,
        crate::routes::stats::get_stats,
        crate::routes::stats::save_stats,
        crate::routes::analytics::team_analytics,
        crate::routes::reports::game_report,
        crate::routes::dashboard::dashboard,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::auth::RegisterRequest,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::OAuthRequest,
            crate::dto::auth::PasswordResetRequest,
            crate::dto::auth::SessionResponse,
            crate::dto::auth::UserSummary,
            crate::dto::team::TeamInput,
            crate::dto::team::TeamSummary,
            crate::dto::team::TeamListing,
            crate::dto::roster::PlayerInput,
            crate::dto::roster::PlayerSummary,
            crate::dto::roster::RosterListing,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::GameSummary,
            crate::dto::game::GameList,
            crate::dto::game::GameCreated,
            crate::dto::game::GameDeleted,
            crate::dto::game::IndexFailure,
            crate::dto::game::IndexRebuildReport,
            crate::dto::stats::StatLineInput,
            crate::dto::stats::PlayerStatLine,
            crate::dto::stats::GameSelection,
            crate::dto::stats::StatsSaved,
            crate::dto::analytics::AnalyticsSummary,
            crate::dto::analytics::GameFailureDto,
            crate::dto::dashboard::DashboardGame,
            crate::dto::dashboard::DashboardResponse,
        )
    ),
    modifiers(&SessionTokenAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Sign-up, sign-in and session lifecycle"),
        (name = "teams", description = "Paginated team registry"),
        (name = "roster", description = "Paginated roster of a team"),
        (name = "games", description = "Games of a team and the flat game index"),
        (name = "stats", description = "Per-player stat entry"),
        (name = "reports", description = "Analytics, CSV export and dashboard"),
    )
)]
pub struct ApiDoc;

/// Declares the `x-session-token` header used by every guarded route.
struct SessionTokenAddon;

impl Modify for SessionTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-session-token"))),
            );
        }
    }
}
