//! Hosted identity provider used by the session manager.

mod error;
pub mod memory;
pub mod toolkit;

use futures::future::BoxFuture;
use serde::Serialize;

pub use self::error::{IdentityError, IdentityResult};

/// Provider id used when an OAuth credential does not name one.
pub const DEFAULT_OAUTH_PROVIDER: &str = "google.com";

/// Authenticated account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Provider token, needed for profile updates. Never sent to clients.
    #[serde(skip)]
    pub id_token: String,
}

/// Credential obtained by the client from an OAuth popup or redirect.
#[derive(Debug, Clone)]
pub struct OAuthCredential {
    pub provider_id: String,
    pub id_token: String,
}

pub trait IdentityProvider: Send + Sync {
    /// Create an email/password account and sign it in.
    fn sign_up(&self, email: String, password: String) -> BoxFuture<'static, IdentityResult<AuthUser>>;
    fn sign_in(&self, email: String, password: String) -> BoxFuture<'static, IdentityResult<AuthUser>>;
    /// Exchange an OAuth credential for a signed-in account.
    fn sign_in_with_idp(&self, credential: OAuthCredential) -> BoxFuture<'static, IdentityResult<AuthUser>>;
    /// Ask the provider to email a password reset link.
    fn send_password_reset(&self, email: String) -> BoxFuture<'static, IdentityResult<()>>;
    /// Set the display name of a signed-in account and return the refreshed user.
    fn update_display_name(
        &self,
        user: AuthUser,
        display_name: String,
    ) -> BoxFuture<'static, IdentityResult<AuthUser>>;
}
