//! Sign-up, sign-in and sign-out on top of the identity provider.
//!
//! Each successful sign-in publishes the user on the session's current-user
//! stream; logging out publishes `None` and tears the session down.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::watch;
use tracing::info;

use crate::{
    dto::auth::{
        LoginRequest, OAuthRequest, PasswordResetRequest, RegisterRequest, SessionResponse,
        UserSummary,
    },
    error::ServiceError,
    identity::{AuthUser, DEFAULT_OAUTH_PROVIDER, OAuthCredential},
    state::{Session, SharedState},
};

const SESSION_EVENT: &str = "session";

/// Reuse the caller's session when it presented a live token, otherwise open one.
fn session_for(state: &SharedState, token: Option<&str>) -> Arc<Session> {
    token
        .and_then(|token| state.sessions().get(token))
        .unwrap_or_else(|| state.sessions().open())
}

fn signed_in(session: &Session, user: AuthUser) -> SessionResponse {
    session.publish(Some(user.clone()));
    SessionResponse {
        token: session.token().to_owned(),
        user: user.into(),
    }
}

/// Create the account, then set its display name to `"{first} {last}"`.
pub async fn register(
    state: &SharedState,
    token: Option<&str>,
    request: RegisterRequest,
) -> Result<SessionResponse, ServiceError> {
    let identity = state.identity();
    let user = identity.sign_up(request.email, request.password).await?;
    let display_name = format!("{} {}", request.first_name, request.last_name);
    let user = identity.update_display_name(user, display_name).await?;
    info!(uid = %user.uid, "account registered");

    Ok(signed_in(&session_for(state, token), user))
}

pub async fn login(
    state: &SharedState,
    token: Option<&str>,
    request: LoginRequest,
) -> Result<SessionResponse, ServiceError> {
    let user = state
        .identity()
        .sign_in(request.email, request.password)
        .await?;
    info!(uid = %user.uid, "signed in with password");
    Ok(signed_in(&session_for(state, token), user))
}

/// Sign in with an OAuth credential the client obtained from the provider.
pub async fn sign_in_with_oauth(
    state: &SharedState,
    token: Option<&str>,
    request: OAuthRequest,
) -> Result<SessionResponse, ServiceError> {
    let credential = OAuthCredential {
        provider_id: request
            .provider_id
            .filter(|provider| !provider.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OAUTH_PROVIDER.to_owned()),
        id_token: request.id_token,
    };
    let provider_id = credential.provider_id.clone();
    let user = state.identity().sign_in_with_idp(credential).await?;
    info!(uid = %user.uid, provider_id, "signed in with OAuth provider");
    Ok(signed_in(&session_for(state, token), user))
}

pub async fn forgot_password(
    state: &SharedState,
    request: PasswordResetRequest,
) -> Result<(), ServiceError> {
    state.identity().send_password_reset(request.email).await?;
    info!("password reset email requested");
    Ok(())
}

/// Publish `None` to the session's subscribers and forget the session.
pub fn logout(state: &SharedState, token: &str) -> Result<(), ServiceError> {
    state
        .sessions()
        .close(token)
        .map(|_| info!("signed out"))
        .ok_or_else(|| ServiceError::Unauthorized("unknown session".into()))
}

/// Session owning `token`, provided someone is signed in on it.
pub fn authenticated(
    state: &SharedState,
    token: Option<&str>,
) -> Result<(Arc<Session>, AuthUser), ServiceError> {
    let token =
        token.ok_or_else(|| ServiceError::Unauthorized("missing session token".into()))?;
    let session = state
        .sessions()
        .get(token)
        .ok_or_else(|| ServiceError::Unauthorized("unknown session".into()))?;
    let user = session
        .current_user()
        .ok_or_else(|| ServiceError::Unauthorized("signed out".into()))?;
    Ok((session, user))
}

/// Periodically sign out sessions idle past the configured timeout.
pub async fn run_session_sweeper(state: SharedState) {
    let max_idle = state.config().session_idle_timeout;
    if max_idle.is_zero() {
        info!("session idle expiry disabled");
        return;
    }
    let mut ticker = tokio::time::interval(sweep_interval(max_idle));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let closed = state.sessions().sweep_idle(max_idle);
        if closed > 0 {
            info!(closed, "signed out idle sessions");
        }
    }
}

fn sweep_interval(max_idle: Duration) -> Duration {
    (max_idle / 4).clamp(Duration::from_secs(1), Duration::from_secs(60))
}

fn user_event(user: Option<AuthUser>) -> Event {
    let summary = user.map(UserSummary::from);
    let data = serde_json::to_string(&summary).unwrap_or_else(|_| "null".into());
    Event::default().event(SESSION_EVENT).data(data)
}

/// Stream the current user, then every change, ending after sign-out.
pub fn to_sse_stream(
    mut receiver: watch::Receiver<Option<AuthUser>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        loop {
            let user = receiver.borrow_and_update().clone();
            let signed_out = user.is_none();
            yield Ok(user_event(user));
            if signed_out || receiver.changed().await.is_err() {
                break;
            }
        }
        tracing::info!("session SSE stream closed");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig, identity::memory::MemoryIdentityProvider, state::AppState,
    };

    fn state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryIdentityProvider::new()))
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn register_sets_display_name_and_publishes_user() {
        let state = state();
        let response = register(&state, None, register_request()).await.unwrap();
        assert_eq!(response.user.display_name.as_deref(), Some("Ada Lovelace"));

        let (session, user) = authenticated(&state, Some(&response.token)).unwrap();
        assert_eq!(user.uid, response.user.uid);
        assert_eq!(session.token(), response.token);
    }

    #[tokio::test]
    async fn login_reuses_presented_session() {
        let state = state();
        let registered = register(&state, None, register_request()).await.unwrap();
        let logged_in = login(
            &state,
            Some(&registered.token),
            LoginRequest {
                email: "ada@example.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(logged_in.token, registered.token);
        assert_eq!(state.sessions().len(), 1);
    }

    #[tokio::test]
    async fn failed_login_reports_provider_message() {
        let state = state();
        let err = login(
            &state,
            None,
            LoginRequest {
                email: "nobody@example.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "EMAIL_NOT_FOUND");
        assert!(state.sessions().is_empty());
    }

    #[tokio::test]
    async fn oauth_defaults_to_google_provider() {
        let state = state();
        let response = sign_in_with_oauth(
            &state,
            None,
            OAuthRequest {
                provider_id: None,
                id_token: "coach@example.com".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.user.email.as_deref(), Some("coach@example.com"));
    }

    #[test]
    fn sweep_interval_tracks_the_timeout() {
        assert_eq!(sweep_interval(Duration::from_secs(1800)), Duration::from_secs(60));
        assert_eq!(sweep_interval(Duration::from_secs(20)), Duration::from_secs(5));
        assert_eq!(sweep_interval(Duration::from_millis(100)), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn sweeper_signs_out_idle_sessions() {
        let config = AppConfig {
            session_idle_timeout: Duration::from_millis(50),
            ..AppConfig::default()
        };
        let state = AppState::new(config, Arc::new(MemoryIdentityProvider::new()));
        let response = register(&state, None, register_request()).await.unwrap();

        let sweeper = tokio::spawn(run_session_sweeper(state.clone()));
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        sweeper.abort();

        assert!(state.sessions().is_empty());
        assert!(matches!(
            authenticated(&state, Some(&response.token)),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn zero_timeout_disables_the_sweeper() {
        let config = AppConfig {
            session_idle_timeout: Duration::ZERO,
            ..AppConfig::default()
        };
        let state = AppState::new(config, Arc::new(MemoryIdentityProvider::new()));
        state.sessions().open();

        run_session_sweeper(state.clone()).await;
        assert_eq!(state.sessions().len(), 1);
    }

    #[tokio::test]
    async fn logout_publishes_none_and_revokes_token() {
        let state = state();
        let response = register(&state, None, register_request()).await.unwrap();
        let (session, _) = authenticated(&state, Some(&response.token)).unwrap();
        let rx = session.subscribe();

        logout(&state, &response.token).unwrap();
        assert!(rx.borrow().is_none());
        assert!(matches!(
            authenticated(&state, Some(&response.token)),
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
