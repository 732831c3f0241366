use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use serde::Serialize;
use tokio::sync::mpsc;

use super::console;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Locale;
use crate::domain::models::Notification;
use crate::domain::models::NotificationLevel;
use crate::domain::services::Credentials;
use crate::domain::services::EventBus;
use crate::domain::services::Notifier;
use crate::infrastructure::api::ApiClient;

/// Everything a command needs once the configuration is loaded.
pub struct Context {
    pub client: Arc<ApiClient>,
    pub bus: EventBus,
    pub notifier: Notifier,
    pub notifications: mpsc::UnboundedReceiver<Notification>,
    pub locale: Locale,
}

impl Context {
    pub async fn load() -> Result<Context> {
        let credentials_path = path::PathBuf::from(Config::get(ConfigKey::CredentialsFile));
        let credentials = Credentials::load(credentials_path).await?;
        let (notifier, notifications) = Notifier::new();
        let client = ApiClient::from_config(credentials, notifier.clone())?;

        return Ok(Context {
            client: Arc::new(client),
            bus: EventBus::default(),
            notifier,
            notifications,
            locale: Locale::parse(&Config::get(ConfigKey::Locale)),
        });
    }

    /// Prints queued notifications. Failed commands report their own error,
    /// so error notifications can be skipped.
    pub fn flush(&mut self, include_errors: bool) {
        while let Ok(notification) = self.notifications.try_recv() {
            if notification.level == NotificationLevel::Error && !include_errors {
                continue;
            }
            console::print_notification(&notification);
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    return Ok(());
}

/// The application selected with `--application` or the config file.
pub fn require_application() -> Result<String> {
    let application = Config::get(ConfigKey::Application);
    if application.is_empty() {
        bail!("No application selected. Pass --application or set it in config.toml.");
    }

    return Ok(application);
}
