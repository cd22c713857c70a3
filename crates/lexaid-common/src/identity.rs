//! Identity capability
//!
//! Authentication is delegated entirely to an external identity service.
//! This module only names the capability and keeps track of who is signed in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;
use tracing::info;

/// Minimum password length accepted before calling the provider
pub const MIN_PASSWORD_LEN: usize = 6;

/// A signed-in user as reported by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Failure with a message that can be shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct IdentityError(pub String);

/// External identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<UserIdentity, IdentityError>;

    async fn authenticate(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError>;

    /// Federated sign-in through the provider's popup flow
    async fn authenticate_federated(&self) -> Result<UserIdentity, IdentityError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Tracks the current user of one client over an [`IdentityProvider`]
pub struct AuthSession<P: IdentityProvider> {
    provider: P,
    current: RwLock<Option<UserIdentity>>,
}

impl<P: IdentityProvider> AuthSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
        }
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The signed-in user, or an error telling the user to sign in
    pub fn require_user(&self) -> Result<UserIdentity, IdentityError> {
        self.current_user()
            .ok_or_else(|| IdentityError("Please sign in to continue.".to_string()))
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<UserIdentity, IdentityError> {
        if email.trim().is_empty() {
            return Err(IdentityError("Email is required.".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        let user = self
            .provider
            .create_account(email.trim(), password, display_name)
            .await?;
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError> {
        let user = self.provider.authenticate(email.trim(), password).await?;
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_in_federated(&self) -> Result<UserIdentity, IdentityError> {
        let user = self.provider.authenticate_federated().await?;
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), IdentityError> {
        self.provider.send_password_reset(email.trim()).await
    }

    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        self.provider.sign_out().await?;
        self.set_current(None);
        Ok(())
    }

    fn set_current(&self, user: Option<UserIdentity>) {
        match &user {
            Some(u) => info!("Signed in as {}", u.uid),
            None => info!("Signed out"),
        }
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = user;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeIdentity {
        calls: Mutex<Vec<String>>,
    }

    impl FakeIdentity {
        fn user(email: &str) -> UserIdentity {
            UserIdentity {
                uid: format!("uid-{}", email),
                email: email.to_string(),
                display_name: None,
            }
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn create_account(
            &self,
            email: &str,
            _password: &str,
            display_name: Option<&str>,
        ) -> Result<UserIdentity, IdentityError> {
            self.record("create");
            let mut user = Self::user(email);
            user.display_name = display_name.map(str::to_string);
            Ok(user)
        }

        async fn authenticate(&self, email: &str, password: &str) -> Result<UserIdentity, IdentityError> {
            self.record("auth");
            if password == "correct-horse" {
                Ok(Self::user(email))
            } else {
                Err(IdentityError("Invalid email or password.".to_string()))
            }
        }

        async fn authenticate_federated(&self) -> Result<UserIdentity, IdentityError> {
            self.record("federated");
            Ok(Self::user("popup@example.com"))
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), IdentityError> {
            self.record("reset");
            Ok(())
        }

        async fn sign_out(&self) -> Result<(), IdentityError> {
            self.record("signout");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sign_in_and_out_tracks_current_user() {
        let session = AuthSession::new(FakeIdentity::default());
        assert!(session.require_user().is_err());

        let user = session.sign_in("a@example.com", "correct-horse").await.unwrap();
        assert_eq!(session.require_user().unwrap(), user);

        session.sign_out().await.unwrap();
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_message() {
        let session = AuthSession::new(FakeIdentity::default());
        let err = session.sign_in("a@example.com", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_validates_before_calling_provider() {
        let session = AuthSession::new(FakeIdentity::default());
        assert!(session.sign_up("a@example.com", "123", None).await.is_err());
        assert!(session.sign_up("  ", "long-enough", None).await.is_err());
        assert!(session.provider.calls.lock().unwrap().is_empty());

        let user = session
            .sign_up("a@example.com", "long-enough", Some("Asha"))
            .await
            .unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Asha"));
    }

    #[tokio::test]
    async fn test_federated_sign_in() {
        let session = AuthSession::new(FakeIdentity::default());
        let user = session.sign_in_federated().await.unwrap();
        assert_eq!(user.email, "popup@example.com");
        session.reset_password("a@example.com").await.unwrap();
        assert_eq!(*session.provider.calls.lock().unwrap(), vec!["federated", "reset"]);
    }

    #[tokio::test]
    async fn test_sign_in_survives_poisoned_lock() {
        let session = AuthSession::new(FakeIdentity::default());
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = session.current.write().unwrap();
            panic!("writer died");
        }));
        assert!(session.current.is_poisoned());

        let user = session.sign_in("a@example.com", "correct-horse").await.unwrap();
        assert_eq!(session.current_user(), Some(user));
    }
}
