//! User service
//!
//! Registration, login, logout and session validation on top of the user and
//! session repositories.
//!
//! A failed login is not an error: `login` returns `Ok(None)` and the caller
//! answers with the unauthenticated shape.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The username is taken; the existing account is left untouched
    #[error("Already Registered: {0}")]
    AlreadyRegistered(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    /// Register a new user and log them in.
    ///
    /// # Errors
    ///
    /// - `Validation` if username or password is empty
    /// - `AlreadyRegistered` if the username is taken
    /// - `Internal` for database or hashing errors
    pub async fn register(
        &self,
        input: CreateUserInput,
    ) -> Result<(User, Session), UserServiceError> {
        validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::AlreadyRegistered(input.username));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let mut user = User::new(input.username, password_hash);
        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.email = input.email;

        let created = match self.user_repo.create(&user).await {
            Ok(created) => created,
            Err(err) => {
                // Lost a race against a concurrent registration of the same name
                if self
                    .user_repo
                    .get_by_username(&user.username)
                    .await
                    .context("Failed to check username")?
                    .is_some()
                {
                    return Err(UserServiceError::AlreadyRegistered(user.username));
                }
                return Err(err.context("Failed to create user").into());
            }
        };
        tracing::debug!("{} is a new user", created.username);

        let session = self.create_session(created.id).await?;
        Ok((created, session))
    }

    /// Check credentials and open a session.
    ///
    /// Returns `Ok(None)` for an unknown user or a wrong password.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<(User, Session)>, UserServiceError> {
        let user = match self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?
        {
            Some(user) => user,
            None => return Ok(None),
        };

        let password_valid =
            verify_password(password, &user.password_hash).context("Failed to verify password")?;
        if !password_valid {
            tracing::debug!("Rejected login for {}", username);
            return Ok(None);
        }

        let session = self.create_session(user.id).await?;
        Ok(Some((user, session)))
    }

    /// Invalidate a session. Unknown or absent tokens are ignored.
    pub async fn logout(&self, session_id: Option<&str>) -> Result<(), UserServiceError> {
        if let Some(session_id) = session_id {
            self.session_repo
                .delete(session_id)
                .await
                .context("Failed to delete session")?;
        }
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted and resolve to `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to remove expired session: {:#}", e);
            }
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;
        Ok(count)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let created = self
            .session_repo
            .create(&Session::new(user_id))
            .await
            .context("Failed to create session")?;
        Ok(created)
    }
}

fn validate_register_input(input: &CreateUserInput) -> Result<(), UserServiceError> {
    if input.username.trim().is_empty() {
        return Err(UserServiceError::Validation(
            "Username cannot be empty".to_string(),
        ));
    }
    if input.password.is_empty() {
        return Err(UserServiceError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use chrono::{Duration, Utc};

    async fn setup_test_service() -> (DynDatabasePool, UserService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        (pool, UserService::new(user_repo, session_repo))
    }

    fn register_input(username: &str, password: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            password: password.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_and_session() {
        let (_pool, service) = setup_test_service().await;

        let (user, session) = service
            .register(register_input("jdoe", "secret"))
            .await
            .expect("Failed to register");

        assert_eq!(user.username, "jdoe");
        assert_eq!(user.first_name, "Jane");
        assert_ne!(user.password_hash, "secret");
        assert_eq!(session.user_id, user.id);

        let resolved = service.validate_session(&session.id).await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_register_duplicate_does_not_overwrite() {
        let (_pool, service) = setup_test_service().await;

        service
            .register(register_input("jdoe", "first-password"))
            .await
            .unwrap();

        let result = service
            .register(register_input("jdoe", "second-password"))
            .await;
        assert!(matches!(result, Err(UserServiceError::AlreadyRegistered(name)) if name == "jdoe"));

        // The first password still works, the new one does not
        assert!(service.login("jdoe", "first-password").await.unwrap().is_some());
        assert!(service.login("jdoe", "second-password").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (_pool, service) = setup_test_service().await;

        let result = service.register(register_input("  ", "secret")).await;
        assert!(matches!(result, Err(UserServiceError::Validation(_))));

        let result = service.register(register_input("jdoe", "")).await;
        assert!(matches!(result, Err(UserServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_allows_empty_profile_fields() {
        let (_pool, service) = setup_test_service().await;

        let input = CreateUserInput {
            username: "minimal".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        let (user, _) = service.register(input).await.unwrap();
        assert!(user.email.is_empty());
    }

    #[tokio::test]
    async fn test_login() {
        let (_pool, service) = setup_test_service().await;
        service.register(register_input("jdoe", "secret")).await.unwrap();

        let (user, session) = service
            .login("jdoe", "secret")
            .await
            .unwrap()
            .expect("valid credentials");
        assert_eq!(user.username, "jdoe");
        assert_eq!(session.user_id, user.id);

        assert!(service.login("jdoe", "wrong").await.unwrap().is_none());
        assert!(service.login("nobody", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (_pool, service) = setup_test_service().await;
        let (_, session) = service.register(register_input("jdoe", "secret")).await.unwrap();

        service.logout(Some(&session.id)).await.unwrap();
        service.logout(Some(&session.id)).await.unwrap();
        service.logout(None).await.unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let (pool, service) = setup_test_service().await;
        let (user, _) = service.register(register_input("jdoe", "secret")).await.unwrap();

        let session_repo = SqlxSessionRepository::new(pool.clone());
        let mut stale = Session::new(user.id);
        stale.expires_at = Utc::now() - Duration::minutes(5);
        session_repo.create(&stale).await.unwrap();

        assert!(service.validate_session(&stale.id).await.unwrap().is_none());
        assert!(session_repo.get_by_id(&stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let (pool, service) = setup_test_service().await;
        let (user, live) = service.register(register_input("jdoe", "secret")).await.unwrap();

        let session_repo = SqlxSessionRepository::new(pool.clone());
        let mut stale = Session::new(user.id);
        stale.expires_at = Utc::now() - Duration::days(1);
        session_repo.create(&stale).await.unwrap();

        assert_eq!(service.cleanup_expired_sessions().await.unwrap(), 1);
        assert!(service.validate_session(&live.id).await.unwrap().is_some());
    }
}
