//! Toast notifications and user-facing app settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Keep at most this many notifications; older ones fall off the end.
pub const MAX_NOTIFICATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub action_url: Option<String>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Notification {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: None,
            timestamp: Utc::now(),
            read: false,
            action_url: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Notification::new(NotificationKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Notification::new(NotificationKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Notification::new(NotificationKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Notification::new(NotificationKind::Info, title)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_action(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppSettings {
    pub theme: Theme,
    pub language: String,
    pub timezone: String,
    pub currency: String,
    pub date_format: String,
    pub time_format: TimeFormat,
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            theme: Theme::System,
            language: "en".to_string(),
            timezone: "UTC".to_string(),
            currency: "USD".to_string(),
            date_format: "MM/dd/yyyy".to_string(),
            time_format: TimeFormat::TwelveHour,
            notifications_enabled: true,
            sound_enabled: true,
        }
    }
}

/// Partial settings update; unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
    pub date_format: Option<String>,
    pub time_format: Option<TimeFormat>,
    pub notifications_enabled: Option<bool>,
    pub sound_enabled: Option<bool>,
}

impl AppSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.theme {
            self.theme = v;
        }
        if let Some(v) = patch.language {
            self.language = v;
        }
        if let Some(v) = patch.timezone {
            self.timezone = v;
        }
        if let Some(v) = patch.currency {
            self.currency = v;
        }
        if let Some(v) = patch.date_format {
            self.date_format = v;
        }
        if let Some(v) = patch.time_format {
            self.time_format = v;
        }
        if let Some(v) = patch.notifications_enabled {
            self.notifications_enabled = v;
        }
        if let Some(v) = patch.sound_enabled {
            self.sound_enabled = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_wire_shape() {
        let n = Notification::success("Category Created").with_message("Electronics");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["title"], "Category Created");
        assert_eq!(json["read"], false);
    }

    #[test]
    fn test_settings_defaults_and_patch() {
        let mut settings = AppSettings::default();
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.time_format, TimeFormat::TwelveHour);

        settings.apply(SettingsPatch {
            theme: Some(Theme::Dark),
            currency: Some("EUR".into()),
            ..Default::default()
        });
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.language, "en");
    }
}
