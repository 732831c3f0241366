#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

use std::path;
use std::sync::Arc;
use std::sync::RwLock;

use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::UserInfo;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub user_info: UserInfo,
    #[serde(default)]
    pub app_user_id: String,
}

/// Authentication state shared by every API call, persisted between runs.
#[derive(Clone)]
pub struct Credentials {
    pub file_path: path::PathBuf,
    state: Arc<RwLock<AuthState>>,
}

impl Credentials {
    pub fn new(file_path: path::PathBuf) -> Credentials {
        return Credentials {
            file_path,
            state: Arc::new(RwLock::new(AuthState::default())),
        };
    }

    /// Reads the persisted state if there is one. A missing file leaves
    /// everything empty.
    pub async fn load(file_path: path::PathBuf) -> Result<Credentials> {
        let credentials = Credentials::new(file_path);
        if !credentials.file_path.exists() {
            return Ok(credentials);
        }

        let payload = fs::read_to_string(&credentials.file_path).await?;
        let state: AuthState = serde_json::from_str(&payload)?;
        *credentials.write() = state;

        return Ok(credentials);
    }

    pub async fn save(&self) -> Result<()> {
        let payload = serde_json::to_string_pretty(&self.snapshot())?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(&self.file_path).await?;
        file.write_all(payload.as_bytes()).await?;

        return Ok(());
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, AuthState> {
        return self.state.read().unwrap_or_else(|err| return err.into_inner());
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, AuthState> {
        return self.state.write().unwrap_or_else(|err| return err.into_inner());
    }

    pub fn snapshot(&self) -> AuthState {
        return self.read().clone();
    }

    pub fn token(&self) -> String {
        return self.read().token.to_string();
    }

    pub fn set_token(&self, token: &str) {
        self.write().token = token.to_string();
    }

    pub fn user_info(&self) -> UserInfo {
        return self.read().user_info.clone();
    }

    pub fn set_user_info(&self, user_info: UserInfo) {
        self.write().user_info = user_info;
    }

    pub fn app_user_id(&self) -> String {
        return self.read().app_user_id.to_string();
    }

    pub fn set_app_user_id(&self, app_user_id: &str) {
        self.write().app_user_id = app_user_id.to_string();
    }

    pub fn is_authenticated(&self) -> bool {
        return !self.read().token.is_empty();
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.token = "".to_string();
        state.user_info = UserInfo::default();
    }
}
