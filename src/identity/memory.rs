//! In-process identity provider used for local runs and tests.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use uuid::Uuid;

use super::{AuthUser, IdentityError, IdentityProvider, IdentityResult, OAuthCredential};

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: Option<String>,
    display_name: Option<String>,
}

#[derive(Clone, Default)]
pub struct MemoryIdentityProvider {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    /// Accounts keyed by email.
    accounts: DashMap<String, Account>,
    /// Password reset emails sent, per address.
    resets: DashMap<String, u32>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of password reset emails sent to `email`.
    pub fn resets_sent(&self, email: &str) -> u32 {
        self.inner.resets.get(email).map_or(0, |count| *count)
    }

    fn user(email: &str, account: &Account) -> AuthUser {
        AuthUser {
            uid: account.uid.clone(),
            email: Some(email.to_owned()),
            display_name: account.display_name.clone(),
            id_token: format!("memory-{}", account.uid),
        }
    }

    fn check_email(email: &str) -> IdentityResult<()> {
        if email.contains('@') {
            Ok(())
        } else {
            Err(IdentityError::rejected("INVALID_EMAIL"))
        }
    }

    fn register(&self, email: String, password: String) -> IdentityResult<AuthUser> {
        Self::check_email(&email)?;
        if password.is_empty() {
            return Err(IdentityError::rejected("MISSING_PASSWORD"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(IdentityError::rejected(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }

        match self.inner.accounts.entry(email.clone()) {
            Entry::Occupied(_) => Err(IdentityError::rejected("EMAIL_EXISTS")),
            Entry::Vacant(slot) => {
                let account = slot.insert(Account {
                    uid: Uuid::new_v4().simple().to_string(),
                    password: Some(password),
                    display_name: None,
                });
                Ok(Self::user(&email, &account))
            }
        }
    }

    fn authenticate(&self, email: &str, password: &str) -> IdentityResult<AuthUser> {
        let account = self
            .inner
            .accounts
            .get(email)
            .ok_or_else(|| IdentityError::rejected("EMAIL_NOT_FOUND"))?;
        if account.password.as_deref() != Some(password) {
            return Err(IdentityError::rejected("INVALID_PASSWORD"));
        }
        Ok(Self::user(email, &account))
    }

    /// The token stands in for the email address the provider would have verified.
    fn federate(&self, credential: OAuthCredential) -> IdentityResult<AuthUser> {
        let email = credential.id_token.trim().to_owned();
        if email.is_empty() || Self::check_email(&email).is_err() {
            return Err(IdentityError::rejected("INVALID_IDP_RESPONSE"));
        }
        let account = self
            .inner
            .accounts
            .entry(email.clone())
            .or_insert_with(|| Account {
                uid: Uuid::new_v4().simple().to_string(),
                password: None,
                display_name: None,
            });
        Ok(Self::user(&email, &account))
    }

    fn reset(&self, email: String) -> IdentityResult<()> {
        Self::check_email(&email)?;
        if !self.inner.accounts.contains_key(&email) {
            return Err(IdentityError::rejected("EMAIL_NOT_FOUND"));
        }
        *self.inner.resets.entry(email).or_default() += 1;
        Ok(())
    }

    fn rename(&self, user: AuthUser, display_name: String) -> IdentityResult<AuthUser> {
        let email = user
            .email
            .clone()
            .ok_or_else(|| IdentityError::rejected("INVALID_ID_TOKEN"))?;
        let mut account = self
            .inner
            .accounts
            .get_mut(&email)
            .filter(|account| account.uid == user.uid)
            .ok_or_else(|| IdentityError::rejected("USER_NOT_FOUND"))?;
        account.display_name = Some(display_name);
        Ok(Self::user(&email, &account))
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn sign_up(&self, email: String, password: String) -> BoxFuture<'static, IdentityResult<AuthUser>> {
        let result = self.register(email, password);
        Box::pin(async move { result })
    }

    fn sign_in(&self, email: String, password: String) -> BoxFuture<'static, IdentityResult<AuthUser>> {
        let result = self.authenticate(&email, &password);
        Box::pin(async move { result })
    }

    fn sign_in_with_idp(&self, credential: OAuthCredential) -> BoxFuture<'static, IdentityResult<AuthUser>> {
        let result = self.federate(credential);
        Box::pin(async move { result })
    }

    fn send_password_reset(&self, email: String) -> BoxFuture<'static, IdentityResult<()>> {
        let result = self.reset(email);
        Box::pin(async move { result })
    }

    fn update_display_name(
        &self,
        user: AuthUser,
        display_name: String,
    ) -> BoxFuture<'static, IdentityResult<AuthUser>> {
        let result = self.rename(user, display_name);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let provider = MemoryIdentityProvider::new();
        let created = provider
            .sign_up("coach@example.com".into(), "secret1".into())
            .await
            .unwrap();
        let signed_in = provider
            .sign_in("coach@example.com".into(), "secret1".into())
            .await
            .unwrap();
        assert_eq!(created.uid, signed_in.uid);
    }

    #[tokio::test]
    async fn duplicate_and_unknown_accounts_use_provider_codes() {
        let provider = MemoryIdentityProvider::new();
        provider
            .sign_up("coach@example.com".into(), "secret1".into())
            .await
            .unwrap();

        let duplicate = provider
            .sign_up("coach@example.com".into(), "secret1".into())
            .await
            .unwrap_err();
        assert_eq!(duplicate.to_string(), "EMAIL_EXISTS");

        let unknown = provider
            .sign_in("nobody@example.com".into(), "secret1".into())
            .await
            .unwrap_err();
        assert_eq!(unknown.to_string(), "EMAIL_NOT_FOUND");

        let wrong = provider
            .sign_in("coach@example.com".into(), "nope123".into())
            .await
            .unwrap_err();
        assert!(wrong.is_credential_error());
    }

    #[tokio::test]
    async fn rename_updates_display_name() {
        let provider = MemoryIdentityProvider::new();
        let user = provider
            .sign_up("coach@example.com".into(), "secret1".into())
            .await
            .unwrap();
        let renamed = provider
            .update_display_name(user, "Ada Lovelace".into())
            .await
            .unwrap();
        assert_eq!(renamed.display_name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn password_reset_requires_known_account() {
        let provider = MemoryIdentityProvider::new();
        assert!(
            provider
                .send_password_reset("coach@example.com".into())
                .await
                .is_err()
        );
        provider
            .sign_up("coach@example.com".into(), "secret1".into())
            .await
            .unwrap();
        provider
            .send_password_reset("coach@example.com".into())
            .await
            .unwrap();
        assert_eq!(provider.resets_sent("coach@example.com"), 1);
    }
}
