//! # Auth Store
//!
//! Who is signed in, with which tokens and permissions.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  start()                                                                │
//! │    is_loading = true                                                    │
//! │        │                                                                │
//! │        ├── rehydrate "auth-storage" (blocking read) ─► apply snapshot   │
//! │        │                                              is_loading=false  │
//! │        │                                                                │
//! │        └── fallback timer (1 s) fires first ─────────► is_loading=false │
//! │                 (a late snapshot is still applied if nothing            │
//! │                  changed the session in the meantime)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use rental_core::{LoginResponse, User, UserType};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use super::storage::{load_versioned, save_versioned_blocking, Storage};
use super::{ack, call, COMMAND_BUFFER};
use crate::error::{StoreError, StoreResult};
use crate::http::SessionProvider;

/// Storage key of the persisted session.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";

/// Bumped when [`PersistedAuth`] changes shape.
pub const AUTH_STORAGE_VERSION: u32 = 1;

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    /// True until the persisted session has been read (or the fallback
    /// timer gave up on it).
    pub is_loading: bool,
    pub permissions: Vec<String>,
    pub session_id: Option<String>,
    pub device_id: Option<String>,
}

impl AuthState {
    fn loading() -> Self {
        AuthState {
            is_loading: true,
            ..Default::default()
        }
    }

    fn user_type(&self) -> Option<UserType> {
        self.user.as_ref().map(|u| u.user_type)
    }

    /// Superusers and SUPERADMIN pass every check.
    pub fn is_superuser(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_unrestricted)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.has_any_permission(&[permission])
    }

    /// Any one of `required` is enough.
    pub fn has_any_permission(&self, required: &[&str]) -> bool {
        if self.user.is_none() {
            return false;
        }
        if self.is_superuser() {
            return true;
        }
        required
            .iter()
            .any(|needed| self.permissions.iter().any(|held| held == needed))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.has_role(role))
    }

    pub fn has_user_type(&self, user_type: UserType) -> bool {
        self.user_type() == Some(user_type)
    }

    pub fn can_manage_user(&self, target: UserType) -> bool {
        self.user_type().is_some_and(|t| t.can_manage(target))
    }

    /// ADMIN or SUPERADMIN.
    pub fn is_admin(&self) -> bool {
        matches!(self.user_type(), Some(UserType::Admin | UserType::Superadmin))
    }

    pub fn is_customer(&self) -> bool {
        self.has_user_type(UserType::Customer)
    }
}

/// The persisted subset of [`AuthState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAuth {
    user: Option<User>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    is_authenticated: bool,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    device_id: Option<String>,
}

impl From<&AuthState> for PersistedAuth {
    fn from(state: &AuthState) -> Self {
        PersistedAuth {
            user: state.user.clone(),
            access_token: state.access_token.clone(),
            refresh_token: state.refresh_token.clone(),
            is_authenticated: state.is_authenticated,
            permissions: state.permissions.clone(),
            session_id: state.session_id.clone(),
            device_id: state.device_id.clone(),
        }
    }
}

impl PersistedAuth {
    fn into_state(self) -> AuthState {
        let is_authenticated = self.is_authenticated && self.access_token.is_some();
        AuthState {
            user: self.user,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            is_authenticated,
            is_loading: false,
            permissions: self.permissions,
            session_id: self.session_id,
            device_id: self.device_id,
        }
    }
}

// =============================================================================
// Commands and Handle
// =============================================================================

#[derive(Debug)]
pub enum AuthCommand {
    Login {
        response: Box<LoginResponse>,
        reply: oneshot::Sender<()>,
    },
    Logout {
        reply: oneshot::Sender<()>,
    },
    SetTokens {
        access_token: String,
        refresh_token: Option<String>,
        reply: oneshot::Sender<()>,
    },
    SetSessionInfo {
        session_id: Option<String>,
        device_id: Option<String>,
        reply: oneshot::Sender<()>,
    },
    UpdateUser {
        user: Box<User>,
        reply: oneshot::Sender<()>,
    },
    /// Sent by the HTTP layer on a 401; nobody waits for it.
    ClearSession,
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle for reading and changing the session.
#[derive(Clone)]
pub struct AuthHandle {
    state_rx: watch::Receiver<AuthState>,
    cmd_tx: mpsc::Sender<AuthCommand>,
}

impl std::fmt::Debug for AuthHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state_rx.borrow();
        f.debug_struct("AuthHandle")
            .field("is_authenticated", &state.is_authenticated)
            .field("is_loading", &state.is_loading)
            .finish()
    }
}

impl AuthHandle {
    pub fn state(&self) -> AuthState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_rx.clone()
    }

    /// Resolves once rehydration finished or the fallback timer fired.
    pub async fn wait_until_loaded(&self) -> AuthState {
        let mut rx = self.state_rx.clone();
        let loaded = match rx.wait_for(|s| !s.is_loading).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        let state = loaded.unwrap_or_else(|| rx.borrow().clone());
        state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state_rx.borrow().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state_rx.borrow().is_loading
    }

    pub fn user(&self) -> Option<User> {
        self.state_rx.borrow().user.clone()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.state_rx.borrow().has_permission(permission)
    }

    pub fn has_any_permission(&self, required: &[&str]) -> bool {
        self.state_rx.borrow().has_any_permission(required)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.state_rx.borrow().has_role(role)
    }

    pub fn has_user_type(&self, user_type: UserType) -> bool {
        self.state_rx.borrow().has_user_type(user_type)
    }

    pub fn can_manage_user(&self, target: UserType) -> bool {
        self.state_rx.borrow().can_manage_user(target)
    }

    pub fn is_superuser(&self) -> bool {
        self.state_rx.borrow().is_superuser()
    }

    pub fn is_admin(&self) -> bool {
        self.state_rx.borrow().is_admin()
    }

    pub fn is_customer(&self) -> bool {
        self.state_rx.borrow().is_customer()
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Stores the session returned by `POST /auth/login`.
    pub async fn login(&self, response: LoginResponse) -> StoreResult<()> {
        call(&self.cmd_tx, "Auth", |reply| AuthCommand::Login {
            response: Box::new(response),
            reply,
        })
        .await
    }

    /// Clears the session locally. The server-side logout call is the
    /// caller's business.
    pub async fn logout(&self) -> StoreResult<()> {
        call(&self.cmd_tx, "Auth", |reply| AuthCommand::Logout { reply }).await
    }

    pub async fn set_tokens(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> StoreResult<()> {
        let access_token = access_token.into();
        call(&self.cmd_tx, "Auth", |reply| AuthCommand::SetTokens {
            access_token,
            refresh_token,
            reply,
        })
        .await
    }

    pub async fn set_session_info(
        &self,
        session_id: Option<String>,
        device_id: Option<String>,
    ) -> StoreResult<()> {
        call(&self.cmd_tx, "Auth", |reply| AuthCommand::SetSessionInfo {
            session_id,
            device_id,
            reply,
        })
        .await
    }

    pub async fn update_user(&self, user: User) -> StoreResult<()> {
        call(&self.cmd_tx, "Auth", |reply| AuthCommand::UpdateUser {
            user: Box::new(user),
            reply,
        })
        .await
    }

    pub async fn shutdown(&self) -> StoreResult<()> {
        call(&self.cmd_tx, "Auth", |reply| AuthCommand::Shutdown { reply }).await
    }
}

impl SessionProvider for AuthHandle {
    fn access_token(&self) -> Option<String> {
        let state = self.state_rx.borrow();
        if state.is_authenticated {
            state.access_token.clone()
        } else {
            None
        }
    }

    fn on_unauthorized(&self) {
        if let Err(e) = self.cmd_tx.try_send(AuthCommand::ClearSession) {
            warn!(error = %e, "Could not queue session clear");
        }
    }
}

// =============================================================================
// Auth Store Service
// =============================================================================

/// Owns the auth state. Consumed by [`AuthStore::start`].
pub struct AuthStore {
    storage: Arc<dyn Storage>,
    rehydrate_timeout: Duration,
    state: AuthState,
    state_tx: watch::Sender<AuthState>,
    /// Set once any command touched the session; a late snapshot must not
    /// overwrite it.
    touched: bool,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn Storage>, rehydrate_timeout: Duration) -> Self {
        let state = AuthState::loading();
        let (state_tx, _) = watch::channel(state.clone());
        AuthStore {
            storage,
            rehydrate_timeout,
            state,
            state_tx,
            touched: false,
        }
    }

    /// Spawns the store task and returns a handle.
    pub fn start(self) -> AuthHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = AuthHandle {
            state_rx: self.state_tx.subscribe(),
            cmd_tx,
        };

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        handle
    }

    async fn run(mut self, mut cmd_rx: mpsc::Receiver<AuthCommand>) {
        info!("Auth store started");

        let storage = self.storage.clone();
        let mut rehydrate = tokio::task::spawn_blocking(move || {
            load_versioned::<PersistedAuth>(storage.as_ref(), AUTH_STORAGE_KEY, AUTH_STORAGE_VERSION)
        });
        let fallback = tokio::time::sleep(self.rehydrate_timeout);
        tokio::pin!(fallback);
        let mut rehydrating = true;
        let mut fallback_armed = true;

        loop {
            tokio::select! {
                result = &mut rehydrate, if rehydrating => {
                    rehydrating = false;
                    self.apply_rehydrated(result);
                }
                _ = &mut fallback, if fallback_armed => {
                    fallback_armed = false;
                    if self.state.is_loading {
                        warn!(
                            timeout_ms = self.rehydrate_timeout.as_millis() as u64,
                            "Session rehydration stalled, continuing without it"
                        );
                        self.state.is_loading = false;
                        self.publish();
                    }
                }
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(AuthCommand::Shutdown { reply }) => {
                            info!("Auth store shutting down");
                            ack(reply);
                            break;
                        }
                        Some(cmd) => self.handle(cmd).await,
                        None => {
                            debug!("All auth handles dropped");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn apply_rehydrated(&mut self, result: Result<StoreResult<Option<PersistedAuth>>, JoinError>) {
        let snapshot = match result {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read persisted session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Session rehydration task failed");
                None
            }
        };

        if self.touched {
            debug!("Session changed before rehydration finished, keeping it");
        } else if let Some(snapshot) = snapshot {
            self.state = snapshot.into_state();
            info!(
                is_authenticated = self.state.is_authenticated,
                "Session rehydrated"
            );
        }
        self.state.is_loading = false;
        self.publish();
    }

    async fn handle(&mut self, cmd: AuthCommand) {
        self.touched = true;
        match cmd {
            AuthCommand::Login { response, reply } => {
                let LoginResponse {
                    user,
                    access_token,
                    refresh_token,
                    ..
                } = *response;
                info!(user_id = %user.id, user_type = ?user.user_type, "Signed in");
                self.state.permissions = user.permissions().to_vec();
                self.state.user = Some(user);
                self.state.access_token = Some(access_token);
                self.state.refresh_token = Some(refresh_token);
                self.state.is_authenticated = true;
                self.state.is_loading = false;
                self.commit().await;
                ack(reply);
            }
            AuthCommand::Logout { reply } => {
                info!("Signed out");
                self.clear().await;
                ack(reply);
            }
            AuthCommand::ClearSession => {
                if self.state.is_authenticated {
                    warn!("Session rejected by server, signing out");
                }
                self.clear().await;
            }
            AuthCommand::SetTokens {
                access_token,
                refresh_token,
                reply,
            } => {
                self.state.access_token = Some(access_token);
                if refresh_token.is_some() {
                    self.state.refresh_token = refresh_token;
                }
                self.state.is_authenticated = self.state.user.is_some();
                self.commit().await;
                ack(reply);
            }
            AuthCommand::SetSessionInfo {
                session_id,
                device_id,
                reply,
            } => {
                self.state.session_id = session_id;
                self.state.device_id = device_id;
                self.commit().await;
                ack(reply);
            }
            AuthCommand::UpdateUser { user, reply } => {
                self.state.permissions = user.permissions().to_vec();
                self.state.user = Some(*user);
                self.commit().await;
                ack(reply);
            }
            AuthCommand::Shutdown { reply } => ack(reply),
        }
    }

    async fn clear(&mut self) {
        let device_id = self.state.device_id.take();
        self.state = AuthState {
            device_id,
            ..Default::default()
        };
        self.commit().await;
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    /// Publishes, then persists. A failed write is logged; the in-memory
    /// session stays authoritative.
    async fn commit(&self) {
        self.publish();
        if let Err(e) = self.persist().await {
            warn!(error = %e, "Failed to persist session");
        }
    }

    async fn persist(&self) -> Result<(), StoreError> {
        save_versioned_blocking(
            self.storage.clone(),
            AUTH_STORAGE_KEY,
            AUTH_STORAGE_VERSION,
            PersistedAuth::from(&self.state),
        )
        .await
    }
}
