//! Credential check → user token.
//!
//! User storage and password hashing stay outside this crate; they are
//! consumed through [`UserDirectory`] and [`PasswordVerifier`].

use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use securefile_core::UserId;

use crate::token::{TokenIssueError, TokenService};

/// What the core needs to know about a stored user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub user_name: String,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub groups: Vec<String>,
}

/// User lookup capability.
pub trait UserDirectory: Send + Sync {
    fn find_by_user_name(&self, user_name: &str) -> Option<UserRecord>;
}

/// Password verification capability (hash format is the implementor's concern).
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, hashed_password: &str, provided_password: &str) -> bool;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Unknown user, wrong password or blank input; deliberately one variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error(transparent)]
    Issue(#[from] TokenIssueError),
}

pub struct Authenticator {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserDirectory>,
    passwords: Arc<dyn PasswordVerifier>,
}

impl Authenticator {
    pub fn new(
        tokens: Arc<TokenService>,
        users: Arc<dyn UserDirectory>,
        passwords: Arc<dyn PasswordVerifier>,
    ) -> Self {
        Self {
            tokens,
            users,
            passwords,
        }
    }

    /// Check credentials and issue a user token.
    ///
    /// The active flag is only consulted after the password matched, so an
    /// unauthenticated caller cannot learn account state.
    pub fn login(
        &self,
        user_name: &str,
        password: &str,
        lifetime: Option<Duration>,
    ) -> Result<String, LoginError> {
        if user_name.trim().is_empty() || password.trim().is_empty() {
            return Err(LoginError::InvalidCredentials);
        }

        let Some(user) = self.users.find_by_user_name(user_name) else {
            tracing::warn!(user_name, "login failed");
            return Err(LoginError::InvalidCredentials);
        };

        if !self.passwords.verify(&user.password_hash, password) {
            tracing::warn!(user_name, "login failed");
            return Err(LoginError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "login refused for inactive account");
            return Err(LoginError::AccountInactive);
        }

        let token = self.tokens.issue_user_token(
            user.id,
            &user.display_name,
            &user.email,
            &user.groups,
            lifetime,
        )?;

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use securefile_core::FixedClock;

    use super::*;
    use crate::claims::names;
    use crate::settings::TokenSettings;
    use crate::token::RandomTokenIds;

    struct InMemoryUsers(HashMap<String, UserRecord>);

    impl UserDirectory for InMemoryUsers {
        fn find_by_user_name(&self, user_name: &str) -> Option<UserRecord> {
            self.0.get(user_name).cloned()
        }
    }

    /// Stores passwords as `plain:<password>`.
    struct PlainVerifier;

    impl PasswordVerifier for PlainVerifier {
        fn verify(&self, hashed_password: &str, provided_password: &str) -> bool {
            hashed_password.strip_prefix("plain:") == Some(provided_password)
        }
    }

    fn record(user_name: &str, active: bool) -> UserRecord {
        UserRecord {
            id: UserId::new(),
            user_name: user_name.to_string(),
            display_name: format!("{user_name} Example"),
            email: format!("{user_name}@example.com"),
            password_hash: "plain:hunter2".to_string(),
            is_active: active,
            groups: vec!["team:rw".to_string()],
        }
    }

    fn setup() -> (Authenticator, Arc<TokenService>, UserRecord) {
        let tokens = Arc::new(
            TokenService::new(
                TokenSettings::new("login-secret-login-secret-login-secret", "securefile", "clients", 15),
                Arc::new(FixedClock::at_timestamp(1_700_000_000)),
                Arc::new(RandomTokenIds),
            )
            .unwrap(),
        );

        let alice = record("alice", true);
        let users = InMemoryUsers(HashMap::from([
            ("alice".to_string(), alice.clone()),
            ("bob".to_string(), record("bob", false)),
        ]));

        let authenticator = Authenticator::new(tokens.clone(), Arc::new(users), Arc::new(PlainVerifier));
        (authenticator, tokens, alice)
    }

    #[test]
    fn successful_login_issues_a_user_token() {
        let (auth, tokens, alice) = setup();
        let token = auth.login("alice", "hunter2", None).unwrap();

        let principal = tokens.verify(&token).unwrap().into_principal();
        assert_eq!(principal.id(), Some(alice.id));
        assert_eq!(principal.email(), Some("alice@example.com"));
        assert_eq!(principal.groups().collect::<Vec<_>>(), vec!["team:rw"]);
        assert!(principal.claims().first(names::TOKEN_ID).is_some());
    }

    #[test]
    fn unknown_user_and_wrong_password_look_the_same() {
        let (auth, _, _) = setup();
        assert_eq!(auth.login("mallory", "hunter2", None), Err(LoginError::InvalidCredentials));
        assert_eq!(auth.login("alice", "wrong", None), Err(LoginError::InvalidCredentials));
    }

    #[test]
    fn blank_credentials_are_rejected() {
        let (auth, _, _) = setup();
        assert_eq!(auth.login("  ", "hunter2", None), Err(LoginError::InvalidCredentials));
        assert_eq!(auth.login("alice", "", None), Err(LoginError::InvalidCredentials));
    }

    #[test]
    fn whitespace_password_never_reaches_the_verifier() {
        let (_, tokens, _) = setup();
        let mut spaces = record("walt", true);
        spaces.password_hash = "plain:   ".to_string();
        let users = InMemoryUsers(HashMap::from([("walt".to_string(), spaces)]));
        let auth = Authenticator::new(tokens, Arc::new(users), Arc::new(PlainVerifier));

        assert_eq!(auth.login("walt", "   ", None), Err(LoginError::InvalidCredentials));
        assert_eq!(auth.login("walt", "\t\n", None), Err(LoginError::InvalidCredentials));
    }

    #[test]
    fn inactive_account_is_refused_only_after_password_check() {
        let (auth, _, _) = setup();
        assert_eq!(auth.login("bob", "hunter2", None), Err(LoginError::AccountInactive));
        assert_eq!(auth.login("bob", "nope", None), Err(LoginError::InvalidCredentials));
    }

    #[test]
    fn issuance_errors_surface() {
        let (auth, _, _) = setup();
        assert_eq!(
            auth.login("alice", "hunter2", Some(Duration::zero())),
            Err(LoginError::Issue(TokenIssueError::InvalidLifetime))
        );
    }
}
