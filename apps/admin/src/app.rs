//! Application lifecycle: everything a running admin session needs, built
//! in one place and torn down in one place.

use std::sync::Arc;

use rental_client::{
    Api, AppHandle, AppStore, AuthHandle, AuthStore, ClientConfig, FileStorage, Hooks,
    HttpClient, QueryCache, Storage,
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::navigation::{guard, Navigator, Route};
use crate::pages::PageContext;

/// A mounted admin session.
///
/// ## Mount Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                         AdminApp::mount                                 │
/// │                                                                         │
/// │  1. Validate Config ──────────────────────────────────────────────────► │
/// │     • base URL is http(s), timeout > 0                                  │
/// │                                                                         │
/// │  2. Start Stores ─────────────────────────────────────────────────────► │
/// │     • AuthStore: rehydrates "auth-storage" in the background            │
/// │     • AppStore: applies "app-storage" preferences                       │
/// │                                                                         │
/// │  3. Build Client ─────────────────────────────────────────────────────► │
/// │     • HttpClient reads the bearer token from the AuthHandle             │
/// │     • Api + QueryCache ──► Hooks                                        │
/// │                                                                         │
/// │  4. Wait for Rehydration ─────────────────────────────────────────────► │
/// │     • returns once is_loading is false (or the fallback timer fired)    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub struct AdminApp {
    config: ClientConfig,
    hooks: Hooks,
    auth: AuthHandle,
    app: AppHandle,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for AdminApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApp")
            .field("base_url", &self.config.base_url())
            .field("auth", &self.auth)
            .finish()
    }
}

impl AdminApp {
    pub async fn mount(
        config: ClientConfig,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        config.validate()?;

        let auth = AuthStore::new(storage.clone(), config.rehydrate_timeout()).start();
        let app = AppStore::new(storage).start();

        let http = HttpClient::with_session(&config, Arc::new(auth.clone()))?;
        let hooks = Hooks::new(Api::new(http), QueryCache::from_config(&config));

        let session = auth.wait_until_loaded().await;
        info!(
            base_url = %config.base_url(),
            authenticated = session.is_authenticated,
            "Admin app mounted"
        );

        Ok(AdminApp {
            config,
            hooks,
            auth,
            app,
            navigator,
        })
    }

    /// Mounts with JSON file storage in the configured data dir.
    pub async fn mount_default(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let dir = config.data_dir().ok_or_else(|| {
            AppError::new(ErrorCode::ConfigError, "Could not determine a data directory")
        })?;
        info!(?dir, "Using file storage");
        Self::mount(config, Arc::new(FileStorage::new(dir)), navigator).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn auth(&self) -> &AuthHandle {
        &self.auth
    }

    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Everything a page controller needs.
    pub fn context(&self) -> PageContext {
        PageContext::new(
            self.hooks.clone(),
            self.auth.clone(),
            self.app.clone(),
            self.navigator.clone(),
        )
    }

    /// Navigates to `path`, applying the auth guard. Returns where the user
    /// actually landed.
    pub fn open(&self, path: &str) -> AppResult<Route> {
        let requested = Route::parse(path).ok_or_else(|| AppError::not_found("Page", path))?;
        let landed = guard(requested, &self.auth.state());
        self.navigator.navigate(landed.clone());
        Ok(landed)
    }

    /// Ends the session on the server (best effort) and locally.
    pub async fn logout(&self) -> AppResult<()> {
        if self.auth.is_authenticated() {
            if let Err(e) = self.hooks.api().auth.logout().await {
                warn!(error = %e, "Server logout failed, clearing session locally");
            }
        }
        self.auth.logout().await?;
        self.hooks.cache().clear().await;
        self.navigator.navigate(Route::Login { redirect: None });
        info!("Logged out");
        Ok(())
    }

    /// Stops both stores and drops every cached query.
    pub async fn unmount(self) -> AppResult<()> {
        self.hooks.cache().clear().await;
        self.auth.shutdown().await?;
        self.app.shutdown().await?;
        info!("Admin app unmounted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::HistoryNavigator;
    use rental_client::MemoryStorage;

    async fn mount() -> (AdminApp, HistoryNavigator) {
        let nav = HistoryNavigator::new();
        let config = ClientConfig::for_base_url("http://127.0.0.1:9/api/v1");
        let app = AdminApp::mount(config, Arc::new(MemoryStorage::new()), Arc::new(nav.clone()))
            .await
            .unwrap();
        (app, nav)
    }

    #[tokio::test]
    async fn test_mount_waits_for_rehydration() {
        let (app, _) = mount().await;
        assert!(!app.auth().is_loading());
        assert!(!app.auth().is_authenticated());
        app.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_mount_rejects_bad_config() {
        let config = ClientConfig::for_base_url("ftp://example.com");
        let result = AdminApp::mount(
            config,
            Arc::new(MemoryStorage::new()),
            Arc::new(HistoryNavigator::new()),
        )
        .await;
        assert_eq!(result.unwrap_err().code, ErrorCode::ConfigError);
    }

    #[tokio::test]
    async fn test_open_guards_protected_routes() {
        let (app, nav) = mount().await;
        let landed = app.open("/products/categories/new").unwrap();
        assert_eq!(landed, Route::login_redirecting_to(&Route::CategoryNew));
        assert_eq!(nav.current(), Some(landed));

        let err = app.open("/does-not-exist").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        app.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_unmount_stops_stores() {
        let (app, _) = mount().await;
        let auth = app.auth().clone();
        app.unmount().await.unwrap();
        assert!(auth.logout().await.is_err());
    }
}
