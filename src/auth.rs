// ABOUTME: Session-token authentication: register, login, logout, verification
// ABOUTME: Stores bcrypt password hashes and one live uuid session per user

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::auth::MAX_REGISTERED_USERS;
use crate::database::{self as db, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{CredentialsPayload, Session, SessionResponse};

/// Registration, login, logout, and token verification over stored sessions
///
/// The token handed to clients is the session row's uuid; logging in or out
/// discards every previous session of that user.
#[derive(Clone)]
pub struct SessionManager {
    db: Arc<Database>,
}

impl SessionManager {
    /// Create a manager backed by the given database
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a new account and immediately open a session for it
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank credentials or a taken login, and
    /// an invalid-state error once the registration limit is reached
    pub async fn register(&self, credentials: CredentialsPayload) -> AppResult<SessionResponse> {
        if credentials.login.is_empty() || credentials.password.is_empty() {
            return Err(AppError::validation("login and password must not be empty"));
        }

        // Hashing is CPU-bound; keep it outside the transaction
        let password_hash = bcrypt::hash(&credentials.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))?;

        let mut guard = self.db.begin().await?;

        let registered = db::users::count_users(guard.executor()?).await?;
        if registered >= MAX_REGISTERED_USERS {
            return Err(AppError::invalid_state("no more users can register"));
        }

        let user_id =
            db::users::insert_user(guard.executor()?, &credentials.login, &password_hash).await?;
        let token = Uuid::new_v4();
        db::users::insert_session(guard.executor()?, token, user_id).await?;
        guard.commit().await?;

        info!(user_id, login = %credentials.login, "user registered");
        Ok(SessionResponse { token })
    }

    /// Exchange credentials for a fresh session token
    ///
    /// Every earlier session of the user is discarded, so at most one token
    /// is live per user.
    ///
    /// # Errors
    ///
    /// Returns an auth-invalid error for an unknown login or a wrong
    /// password; the message does not reveal which of the two it was
    pub async fn login(&self, credentials: CredentialsPayload) -> AppResult<SessionResponse> {
        let Some(user) = self.db.user_by_login(&credentials.login).await? else {
            return Err(AppError::auth_invalid("invalid login or password"));
        };

        let verified = bcrypt::verify(&credentials.password, &user.password_hash)
            .map_err(|e| AppError::internal(format!("password verification failed: {e}")))?;
        if !verified {
            return Err(AppError::auth_invalid("invalid login or password"));
        }

        let mut guard = self.db.begin().await?;

        let discarded = db::users::delete_sessions_for_user(guard.executor()?, user.id).await?;
        let token = Uuid::new_v4();
        db::users::insert_session(guard.executor()?, token, user.id).await?;
        guard.commit().await?;

        info!(user_id = user.id, discarded, "user logged in");
        Ok(SessionResponse { token })
    }

    /// Close every session of the user owning this token
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the token matches no session
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let mut guard = self.db.begin().await?;

        let Some(session) = db::users::find_session(guard.executor()?, token).await? else {
            return Err(AppError::not_found("session"));
        };

        db::users::delete_sessions_for_user(guard.executor()?, session.user_id).await?;
        guard.commit().await?;

        info!(user_id = session.user_id, "user logged out");
        Ok(())
    }

    /// Resolve a bearer token to its session
    ///
    /// # Errors
    ///
    /// Returns an auth-invalid error when the token matches no session
    pub async fn verify(&self, token: &str) -> AppResult<Session> {
        let session = self.db.session_by_token(token).await?;
        match session {
            Some(session) => {
                debug!(user_id = session.user_id, "session token verified");
                Ok(session)
            }
            None => Err(AppError::auth_invalid("session token is not valid")),
        }
    }
}
