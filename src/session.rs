//! Auth session store
//!
//! Holds the logged-in user and the two opaque tokens issued by the API.
//! The persisted part of the state is written as one JSON blob under
//! [`STORE_KEY`] and mirrored under the fixed [`ACCESS_TOKEN_KEY`],
//! [`REFRESH_TOKEN_KEY`] and [`USER_KEY`] keys, which older sessions only
//! have.
//!
//! The store is cheap to clone; clones share the same state. The state
//! lock is only held for reads and writes of the state itself, never while
//! a request is in flight.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::{AuthResponse, LoginCredentials, User, UserCreate};
use crate::storage::{Storage, StorageResult};

/// Storage key of the persisted session blob
pub const STORE_KEY: &str = "auth-storage";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// The persisted half of the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
}

/// Session state as seen by pages and forms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Whether persisted state has been read back yet
    pub hydrated: bool,
}

impl AuthState {
    fn logged_out(&mut self) {
        self.user = None;
        self.access_token = None;
        self.refresh_token = None;
        self.is_authenticated = false;
        self.is_loading = false;
        self.error = None;
    }
}

/// Shared auth session store
#[derive(Clone)]
pub struct AuthStore {
    state: Arc<RwLock<AuthState>>,
    storage: Arc<dyn Storage>,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            state: Arc::new(RwLock::new(AuthState::default())),
            storage,
        }
    }

    pub async fn snapshot(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn is_hydrated(&self) -> bool {
        self.state.read().await.hydrated
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Read the persisted session back
    ///
    /// Unreadable storage is logged and treated as logged out; the store is
    /// hydrated either way.
    pub async fn hydrate(&self) -> AuthState {
        let restored = match self.read_persisted().await {
            Ok(restored) => restored,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted session");
                None
            }
        };

        let mut state = self.state.write().await;
        match restored {
            Some(session) => {
                tracing::debug!(
                    user = %session.user.as_ref().map(|u| u.email.as_str()).unwrap_or("-"),
                    "Session restored"
                );
                state.user = session.user;
                state.access_token = session.access_token;
                state.refresh_token = session.refresh_token;
                state.is_authenticated = true;
            }
            None => state.logged_out(),
        }
        state.hydrated = true;
        state.clone()
    }

    async fn read_persisted(&self) -> StorageResult<Option<PersistedSession>> {
        if let Some(blob) = self.storage.get_item(STORE_KEY).await? {
            match serde_json::from_str::<PersistedSession>(&blob) {
                Ok(session) if is_complete(&session) => return Ok(Some(session)),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Ignoring malformed session blob"),
            }
        }

        let access = self.storage.get_item(ACCESS_TOKEN_KEY).await?;
        let refresh = self.storage.get_item(REFRESH_TOKEN_KEY).await?;
        let user = self.storage.get_item(USER_KEY).await?;

        let (Some(access), Some(refresh), Some(user)) = (access, refresh, user) else {
            return Ok(None);
        };

        let user = match serde_json::from_str::<User>(&user) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed stored user");
                return Ok(None);
            }
        };

        Ok(Some(PersistedSession {
            user: Some(user),
            access_token: Some(access),
            refresh_token: Some(refresh),
            is_authenticated: true,
        }))
    }

    /// Log in and persist the returned tokens and user
    pub async fn login(&self, client: &ApiClient, credentials: &LoginCredentials) -> ApiResult<User> {
        self.begin().await;
        let result = client.login(credentials).await;
        self.finish(result, "Login failed").await
    }

    /// Create an account and log straight into it
    pub async fn register(&self, client: &ApiClient, user: &UserCreate) -> ApiResult<User> {
        self.begin().await;
        let result = client.register(user).await;
        self.finish(result, "Registration failed").await
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn finish(&self, result: ApiResult<AuthResponse>, fallback: &str) -> ApiResult<User> {
        let auth = match result {
            Ok(auth) => auth,
            Err(e) => return Err(self.fail(e, fallback).await),
        };

        let user = auth.user.clone();
        let session = PersistedSession {
            user: Some(auth.user),
            access_token: Some(auth.access_token),
            refresh_token: Some(auth.refresh_token),
            is_authenticated: true,
        };
        // state only turns authenticated once the session is stored
        if let Err(e) = self.persist(&session).await {
            tracing::error!(error = %e, "Failed to persist session");
            return Err(self.fail(e, fallback).await);
        }

        let mut state = self.state.write().await;
        state.user = session.user;
        state.access_token = session.access_token;
        state.refresh_token = session.refresh_token;
        state.is_authenticated = true;
        state.is_loading = false;
        state.error = None;
        state.hydrated = true;

        tracing::info!(user = %user.email, role = %user.role, "Logged in");
        Ok(user)
    }

    async fn fail(&self, e: ApiError, fallback: &str) -> ApiError {
        let mut state = self.state.write().await;
        state.user = None;
        state.access_token = None;
        state.refresh_token = None;
        state.is_authenticated = false;
        state.is_loading = false;
        state.error = Some(e.user_message(fallback));
        e
    }

    async fn persist(&self, session: &PersistedSession) -> ApiResult<()> {
        let blob = serde_json::to_string(session).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.storage.set_item(STORE_KEY, &blob).await?;

        if let (Some(access), Some(refresh), Some(user)) =
            (&session.access_token, &session.refresh_token, &session.user)
        {
            let user = serde_json::to_string(user).map_err(|e| ApiError::Decode(e.to_string()))?;
            self.storage.set_item(ACCESS_TOKEN_KEY, access).await?;
            self.storage.set_item(REFRESH_TOKEN_KEY, refresh).await?;
            self.storage.set_item(USER_KEY, &user).await?;
        }
        Ok(())
    }

    /// Clear the session and every persisted key
    pub async fn logout(&self) -> StorageResult<()> {
        self.state.write().await.logged_out();

        for key in [STORE_KEY, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            self.storage.remove_item(key).await?;
        }
        Ok(())
    }

    /// End the session after the API rejected its token
    pub async fn expire(&self) {
        tracing::warn!("Session expired, logging out");
        if let Err(e) = self.logout().await {
            tracing::error!(error = %e, "Failed to clear persisted session");
        }
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }
}

fn is_complete(session: &PersistedSession) -> bool {
    session.is_authenticated && session.user.is_some() && session.access_token.is_some()
}
