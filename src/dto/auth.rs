use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::{dto::validation::validate_not_blank, identity::AuthUser};

/// Account creation form.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub password: String,
}

/// OAuth credential obtained by the client (e.g. from a Google sign-in popup).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct OAuthRequest {
    /// Defaults to `google.com`.
    #[serde(default)]
    pub provider_id: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub id_token: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

/// Public projection of the signed-in user.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserSummary {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl From<AuthUser> for UserSummary {
    fn from(user: AuthUser) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

/// Returned after a successful sign-in; `token` goes in the `x-session-token` header.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserSummary,
}
