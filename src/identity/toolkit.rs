//! Google Identity Toolkit REST client.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use url::form_urlencoded;

use super::{AuthUser, IdentityError, IdentityProvider, IdentityResult, OAuthCredential};

pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
/// Redirect URI reported to `signInWithIdp`; the token is already in hand.
const IDP_REQUEST_URI: &str = "http://localhost";

#[derive(Debug, Clone)]
pub struct ToolkitConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ToolkitConfig {
    /// Read `IDENTITY_API_KEY` and the optional `IDENTITY_BASE_URL`.
    ///
    /// Returns `None` when no API key is configured.
    pub fn from_env(timeout: Duration) -> Option<Self> {
        let api_key = std::env::var("IDENTITY_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())?;
        let base_url = std::env::var("IDENTITY_BASE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Some(Self {
            api_key,
            base_url,
            timeout,
        })
    }
}

#[derive(Clone)]
pub struct ToolkitIdentityProvider {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

/// Account fields shared by the sign-in style responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Ignored {}

impl AccountResponse {
    fn into_user(self, fallback_token: &str) -> AuthUser {
        AuthUser {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name.filter(|name| !name.is_empty()),
            id_token: self.id_token.unwrap_or_else(|| fallback_token.to_owned()),
        }
    }
}

impl ToolkitIdentityProvider {
    pub fn new(config: ToolkitConfig) -> IdentityResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| IdentityError::ClientBuilder { source })?;
        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::from(config.api_key),
        })
    }

    async fn call<B, T>(&self, endpoint: &'static str, body: &B) -> IdentityResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/accounts:{endpoint}", self.base_url);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_ref())])
            .json(body)
            .send()
            .await
            .map_err(|source| IdentityError::Transport { endpoint, source })?;

        if !response.status().is_success() {
            let status = response.status();
            let envelope = response
                .json::<ErrorEnvelope>()
                .await
                .map_err(|source| IdentityError::Decode { endpoint, source })?;
            debug!(endpoint, %status, message = %envelope.error.message, "identity provider rejected request");
            return Err(IdentityError::rejected(envelope.error.message));
        }

        response
            .json::<T>()
            .await
            .map_err(|source| IdentityError::Decode { endpoint, source })
    }

    async fn password_call(
        &self,
        endpoint: &'static str,
        email: &str,
        password: &str,
    ) -> IdentityResult<AuthUser> {
        let account: AccountResponse = self
            .call(
                endpoint,
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(account.into_user(""))
    }

    async fn idp_call(&self, credential: OAuthCredential) -> IdentityResult<AuthUser> {
        let post_body = idp_post_body(&credential);
        let account: AccountResponse = self
            .call(
                "signInWithIdp",
                &IdpRequest {
                    post_body,
                    request_uri: IDP_REQUEST_URI,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(account.into_user(""))
    }

    async fn oob_call(&self, email: String) -> IdentityResult<()> {
        let _: Ignored = self
            .call(
                "sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email: &email,
                },
            )
            .await?;
        Ok(())
    }

    async fn update_call(&self, user: AuthUser, display_name: String) -> IdentityResult<AuthUser> {
        let account: AccountResponse = self
            .call(
                "update",
                &UpdateRequest {
                    id_token: &user.id_token,
                    display_name: &display_name,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(account.into_user(&user.id_token))
    }
}

/// Form-encoded `postBody` carrying the federated token to `signInWithIdp`.
fn idp_post_body(credential: &OAuthCredential) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("id_token", &credential.id_token)
        .append_pair("providerId", &credential.provider_id)
        .finish()
}

impl IdentityProvider for ToolkitIdentityProvider {
    fn sign_up(&self, email: String, password: String) -> BoxFuture<'static, IdentityResult<AuthUser>> {
        let provider = self.clone();
        Box::pin(async move { provider.password_call("signUp", &email, &password).await })
    }

    fn sign_in(&self, email: String, password: String) -> BoxFuture<'static, IdentityResult<AuthUser>> {
        let provider = self.clone();
        Box::pin(async move {
            provider
                .password_call("signInWithPassword", &email, &password)
                .await
        })
    }

    fn sign_in_with_idp(&self, credential: OAuthCredential) -> BoxFuture<'static, IdentityResult<AuthUser>> {
        let provider = self.clone();
        Box::pin(async move { provider.idp_call(credential).await })
    }

    fn send_password_reset(&self, email: String) -> BoxFuture<'static, IdentityResult<()>> {
        let provider = self.clone();
        Box::pin(async move { provider.oob_call(email).await })
    }

    fn update_display_name(
        &self,
        user: AuthUser,
        display_name: String,
    ) -> BoxFuture<'static, IdentityResult<AuthUser>> {
        let provider = self.clone();
        Box::pin(async move { provider.update_call(user, display_name).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idp_post_body_escapes_reserved_characters() {
        let body = idp_post_body(&OAuthCredential {
            provider_id: "oidc.club&role=admin".into(),
            id_token: "a+b=c".into(),
        });
        assert_eq!(body, "id_token=a%2Bb%3Dc&providerId=oidc.club%26role%3Dadmin");

        let pairs: Vec<(String, String)> = form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("id_token".to_owned(), "a+b=c".to_owned()),
                ("providerId".to_owned(), "oidc.club&role=admin".to_owned()),
            ]
        );
    }

    #[test]
    fn account_response_reads_camel_case_fields() {
        let account: AccountResponse = serde_json::from_str(
            r#"{"localId":"u1","email":"a@b.c","displayName":"","idToken":"tok","expiresIn":"3600"}"#,
        )
        .unwrap();
        let user = account.into_user("old");
        assert_eq!(user.uid, "u1");
        assert_eq!(user.display_name, None);
        assert_eq!(user.id_token, "tok");
    }

    #[test]
    fn update_response_keeps_previous_token() {
        let account: AccountResponse =
            serde_json::from_str(r#"{"localId":"u1","displayName":"Ada Lovelace"}"#).unwrap();
        let user = account.into_user("old");
        assert_eq!(user.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(user.id_token, "old");
    }

    #[test]
    fn error_envelope_exposes_raw_message() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[]}}"#,
        )
        .unwrap();
        assert_eq!(envelope.error.message, "EMAIL_NOT_FOUND");
    }
}
