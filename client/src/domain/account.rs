//! Sign-in and account types.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::UserFacingError;
use super::ports::{AccountApi, SharedSessionToken};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;

/// Validation errors for sign-in and registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email is blank or lacks an `@`.
    InvalidEmail,
    /// Password is shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Display name is blank.
    EmptyName,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "メールアドレスの形式が正しくありません"),
            Self::PasswordTooShort { min } => {
                write!(f, "パスワードは{min}文字以上で入力してください")
            }
            Self::EmptyName => write!(f, "名前を入力してください"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

fn check_email(email: &str) -> Result<(), CredentialsValidationError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CredentialsValidationError::InvalidEmail),
    }
}

/// Email and password used to sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email, sent as the OAuth2 `username` form field.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    /// Validate and build sign-in credentials.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsValidationError> {
        let email = email.into();
        check_email(&email)?;
        Ok(Self {
            email: email.trim().to_owned(),
            password: password.into(),
        })
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    email: String,
    password: String,
    name: String,
}

impl Registration {
    /// Validate and build a registration request.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, CredentialsValidationError> {
        let email = email.into();
        let password = password.into();
        let name = name.into();
        check_email(&email)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if name.trim().is_empty() {
            return Err(CredentialsValidationError::EmptyName);
        }
        Ok(Self {
            email: email.trim().to_owned(),
            password,
            name,
        })
    }

    /// Registered email.
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Token issued on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Bearer token value.
    pub access_token: String,
    /// Token scheme, normally `bearer`.
    pub token_type: String,
}

/// Signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: Uuid,
    /// Account email.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// Sign in and load the account behind the new token.
///
/// The token is stored in `session` before the account lookup so the lookup
/// is authenticated; it is removed again when the lookup fails.
pub async fn sign_in(
    api: &dyn AccountApi,
    session: &SharedSessionToken,
    credentials: &Credentials,
) -> Result<Account, UserFacingError> {
    let token = api
        .login(credentials)
        .await
        .map_err(|error| UserFacingError::report_api("sign in", &error))?;
    session.sign_in(token.access_token);

    match api.me().await {
        Ok(account) => {
            info!(account_id = %account.id, "signed in");
            Ok(account)
        }
        Err(error) => {
            session.sign_out();
            Err(UserFacingError::report_api("load account", &error))
        }
    }
}
