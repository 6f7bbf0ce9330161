//! # App Store
//!
//! Toast notifications, user settings, sidebar and the current location.
//! Notifications are newest first and capped; only sidebar, settings and
//! current location are persisted.

use std::sync::Arc;

use rental_core::{AppSettings, Notification, SettingsPatch, MAX_NOTIFICATIONS};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::storage::{load_versioned, save_versioned_blocking, Storage};
use super::{ack, call, COMMAND_BUFFER};
use crate::error::StoreResult;

pub const APP_STORAGE_KEY: &str = "app-storage";
pub const APP_STORAGE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub notifications: Vec<Notification>,
    pub settings: AppSettings,
    pub sidebar_collapsed: bool,
    pub current_location: Option<String>,
}

impl AppState {
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Newest notification, if any.
    pub fn latest(&self) -> Option<&Notification> {
        self.notifications.first()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedApp {
    #[serde(default)]
    sidebar_collapsed: bool,
    #[serde(default)]
    settings: AppSettings,
    #[serde(default)]
    current_location: Option<String>,
}

#[derive(Debug)]
pub enum AppCommand {
    Notify(Box<Notification>, oneshot::Sender<()>),
    MarkRead(String, oneshot::Sender<()>),
    MarkAllRead(oneshot::Sender<()>),
    Remove(String, oneshot::Sender<()>),
    ClearNotifications(oneshot::Sender<()>),
    UpdateSettings(SettingsPatch, oneshot::Sender<()>),
    SetSidebarCollapsed(bool, oneshot::Sender<()>),
    ToggleSidebar(oneshot::Sender<()>),
    SetCurrentLocation(Option<String>, oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

// =============================================================================
// Handle
// =============================================================================

#[derive(Clone)]
pub struct AppHandle {
    state_rx: watch::Receiver<AppState>,
    cmd_tx: mpsc::Sender<AppCommand>,
}

impl std::fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppHandle")
            .field("unread", &self.state_rx.borrow().unread_count())
            .finish()
    }
}

impl AppHandle {
    pub fn state(&self) -> AppState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state_rx.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state_rx.borrow().notifications.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.state_rx.borrow().unread_count()
    }

    pub fn settings(&self) -> AppSettings {
        self.state_rx.borrow().settings.clone()
    }

    pub async fn notify(&self, notification: Notification) -> StoreResult<()> {
        call(&self.cmd_tx, "App", |reply| {
            AppCommand::Notify(Box::new(notification), reply)
        })
        .await
    }

    pub async fn success(&self, title: &str, message: Option<String>) -> StoreResult<()> {
        let mut notification = Notification::success(title);
        notification.message = message;
        self.notify(notification).await
    }

    pub async fn error(&self, title: &str, message: Option<String>) -> StoreResult<()> {
        let mut notification = Notification::error(title);
        notification.message = message;
        self.notify(notification).await
    }

    pub async fn mark_read(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        call(&self.cmd_tx, "App", |reply| AppCommand::MarkRead(id, reply)).await
    }

    pub async fn mark_all_read(&self) -> StoreResult<()> {
        call(&self.cmd_tx, "App", AppCommand::MarkAllRead).await
    }

    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        call(&self.cmd_tx, "App", |reply| AppCommand::Remove(id, reply)).await
    }

    pub async fn clear_notifications(&self) -> StoreResult<()> {
        call(&self.cmd_tx, "App", AppCommand::ClearNotifications).await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> StoreResult<()> {
        call(&self.cmd_tx, "App", |reply| AppCommand::UpdateSettings(patch, reply)).await
    }

    pub async fn set_sidebar_collapsed(&self, collapsed: bool) -> StoreResult<()> {
        call(&self.cmd_tx, "App", |reply| {
            AppCommand::SetSidebarCollapsed(collapsed, reply)
        })
        .await
    }

    pub async fn toggle_sidebar(&self) -> StoreResult<()> {
        call(&self.cmd_tx, "App", AppCommand::ToggleSidebar).await
    }

    pub async fn set_current_location(&self, location_id: Option<String>) -> StoreResult<()> {
        call(&self.cmd_tx, "App", |reply| {
            AppCommand::SetCurrentLocation(location_id, reply)
        })
        .await
    }

    pub async fn shutdown(&self) -> StoreResult<()> {
        call(&self.cmd_tx, "App", AppCommand::Shutdown).await
    }
}

// =============================================================================
// App Store Service
// =============================================================================

pub struct AppStore {
    storage: Arc<dyn Storage>,
    state: AppState,
    state_tx: watch::Sender<AppState>,
}

impl AppStore {
    /// Reads the persisted preferences synchronously; the store starts
    /// with them already applied.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let mut state = AppState::default();
        match load_versioned::<PersistedApp>(storage.as_ref(), APP_STORAGE_KEY, APP_STORAGE_VERSION) {
            Ok(Some(persisted)) => {
                state.sidebar_collapsed = persisted.sidebar_collapsed;
                state.settings = persisted.settings;
                state.current_location = persisted.current_location;
                debug!("App preferences rehydrated");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read app preferences"),
        }

        let (state_tx, _) = watch::channel(state.clone());
        AppStore {
            storage,
            state,
            state_tx,
        }
    }

    pub fn start(self) -> AppHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = AppHandle {
            state_rx: self.state_tx.subscribe(),
            cmd_tx,
        };

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        handle
    }

    async fn run(mut self, mut cmd_rx: mpsc::Receiver<AppCommand>) {
        info!("App store started");
        while let Some(cmd) = cmd_rx.recv().await {
            if let AppCommand::Shutdown(reply) = cmd {
                info!("App store shutting down");
                ack(reply);
                return;
            }
            self.handle(cmd).await;
        }
        debug!("All app handles dropped");
    }

    async fn handle(&mut self, cmd: AppCommand) {
        let state = &mut self.state;
        let (reply, persist) = match cmd {
            AppCommand::Notify(notification, reply) => {
                debug!(kind = ?notification.kind, title = %notification.title, "Notification");
                state.notifications.insert(0, *notification);
                state.notifications.truncate(MAX_NOTIFICATIONS);
                (reply, false)
            }
            AppCommand::MarkRead(id, reply) => {
                if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
                    n.read = true;
                }
                (reply, false)
            }
            AppCommand::MarkAllRead(reply) => {
                for n in state.notifications.iter_mut() {
                    n.read = true;
                }
                (reply, false)
            }
            AppCommand::Remove(id, reply) => {
                state.notifications.retain(|n| n.id != id);
                (reply, false)
            }
            AppCommand::ClearNotifications(reply) => {
                state.notifications.clear();
                (reply, false)
            }
            AppCommand::UpdateSettings(patch, reply) => {
                state.settings.apply(patch);
                (reply, true)
            }
            AppCommand::SetSidebarCollapsed(collapsed, reply) => {
                state.sidebar_collapsed = collapsed;
                (reply, true)
            }
            AppCommand::ToggleSidebar(reply) => {
                state.sidebar_collapsed = !state.sidebar_collapsed;
                (reply, true)
            }
            AppCommand::SetCurrentLocation(location, reply) => {
                state.current_location = location;
                (reply, true)
            }
            AppCommand::Shutdown(reply) => (reply, false),
        };

        self.state_tx.send_replace(self.state.clone());
        if persist {
            self.persist().await;
        }
        ack(reply);
    }

    async fn persist(&self) {
        let snapshot = PersistedApp {
            sidebar_collapsed: self.state.sidebar_collapsed,
            settings: self.state.settings.clone(),
            current_location: self.state.current_location.clone(),
        };
        if let Err(e) = save_versioned_blocking(
            self.storage.clone(),
            APP_STORAGE_KEY,
            APP_STORAGE_VERSION,
            snapshot,
        )
        .await
        {
            warn!(error = %e, "Failed to persist app preferences");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use rental_core::Theme;

    fn start() -> (AppHandle, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (AppStore::new(storage.clone()).start(), storage)
    }

    #[tokio::test]
    async fn test_notifications_newest_first_and_capped() {
        let (app, _) = start();
        for i in 0..(MAX_NOTIFICATIONS + 5) {
            app.notify(Notification::info(format!("n{}", i))).await.unwrap();
        }
        let notifications = app.notifications();
        assert_eq!(notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(notifications[0].title, format!("n{}", MAX_NOTIFICATIONS + 4));
        assert_eq!(app.unread_count(), MAX_NOTIFICATIONS);
    }

    #[tokio::test]
    async fn test_mark_read_and_remove() {
        let (app, _) = start();
        app.success("Category Created", Some("Electronics".into())).await.unwrap();
        app.error("Failed", None).await.unwrap();
        assert_eq!(app.unread_count(), 2);

        let newest = app.state().latest().unwrap().clone();
        assert_eq!(newest.title, "Failed");
        app.mark_read(&newest.id).await.unwrap();
        assert_eq!(app.unread_count(), 1);

        app.mark_all_read().await.unwrap();
        assert_eq!(app.unread_count(), 0);

        app.remove(&newest.id).await.unwrap();
        assert_eq!(app.notifications().len(), 1);
        app.clear_notifications().await.unwrap();
        assert!(app.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_preferences_persist_but_notifications_do_not() {
        let (app, storage) = start();
        app.toggle_sidebar().await.unwrap();
        app.update_settings(SettingsPatch {
            theme: Some(Theme::Dark),
            ..Default::default()
        })
        .await
        .unwrap();
        app.set_current_location(Some("loc-1".into())).await.unwrap();
        app.notify(Notification::warning("Low stock")).await.unwrap();
        app.shutdown().await.unwrap();

        let restored = AppStore::new(storage).start();
        let state = restored.state();
        assert!(state.sidebar_collapsed);
        assert_eq!(state.settings.theme, Theme::Dark);
        assert_eq!(state.current_location.as_deref(), Some("loc-1"));
        assert!(state.notifications.is_empty());
    }
}
