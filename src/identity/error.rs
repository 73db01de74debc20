use thiserror::Error;

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Provider codes that mean the submitted credentials were refused.
const CREDENTIAL_CODES: &[&str] = &[
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "INVALID_LOGIN_CREDENTIALS",
    "USER_DISABLED",
    "INVALID_IDP_RESPONSE",
    "INVALID_ID_TOKEN",
    "TOKEN_EXPIRED",
];

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider answered with an error; `message` is its raw message.
    #[error("{message}")]
    Rejected { message: String },
    #[error("failed to build identity provider client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    #[error("identity provider request `{endpoint}` failed")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("identity provider returned an unreadable response for `{endpoint}`")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl IdentityError {
    pub fn rejected(message: impl Into<String>) -> Self {
        IdentityError::Rejected {
            message: message.into(),
        }
    }

    /// Leading error code of a provider message (`"WEAK_PASSWORD : ..."` → `WEAK_PASSWORD`).
    pub fn code(&self) -> Option<&str> {
        match self {
            IdentityError::Rejected { message } => {
                message.split(" : ").next().map(str::trim)
            }
            _ => None,
        }
    }

    /// Whether the provider refused the credentials rather than the request shape.
    pub fn is_credential_error(&self) -> bool {
        self.code()
            .is_some_and(|code| CREDENTIAL_CODES.contains(&code))
    }
}
