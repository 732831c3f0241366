#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::bearer;
use crate::domain::models::UserInfo;
use crate::infrastructure::api::ApiClient;

/// Domain used to build the email of anonymous widget users.
pub const APP_USER_EMAIL_DOMAIN: &str = "lingx.ai";

pub struct AuthService {
    client: Arc<ApiClient>,
    configured_app_user_id: String,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> AuthService {
        return AuthService {
            client,
            configured_app_user_id: Config::get(ConfigKey::AppUserId),
        };
    }

    /// Admin login. The token and user are persisted, and the email is
    /// remembered as the default username for next time.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserInfo> {
        let res = self.client.login(email, password).await?;

        let credentials = self.client.credentials();
        let user_info = UserInfo {
            id: res.id,
            username: res.username,
            email: res.email,
        };
        credentials.set_token(&bearer(&res.access));
        credentials.set_user_info(user_info.clone());
        credentials.save().await?;
        Config::set(ConfigKey::Username, email);

        tracing::debug!(user_id = %user_info.id, "Logged in");
        return Ok(user_info);
    }

    /// Widget flow: exchange the application's client credentials for a
    /// token, then authenticate the app user against it.
    pub async fn auth(&self, application_id: &str) -> Result<UserInfo> {
        let credentials = self.client.credentials();
        credentials.set_token("");

        let client_token = self.client.client_token(application_id).await?;
        credentials.set_token(&bearer(&client_token.access_token));

        let app_user_id = self.app_user_id().await?;
        let email = format!("{app_user_id}@{APP_USER_EMAIL_DOMAIN}");
        let chat_token = self.client.chat_auth(&app_user_id, &email).await?;

        let user_info = UserInfo {
            id: chat_token.id.unwrap_or_default(),
            username: None,
            email: None,
        };
        credentials.set_user_info(user_info.clone());
        credentials.set_token(&bearer(&chat_token.access_token));
        credentials.save().await?;

        tracing::debug!(application_id, app_user_id = %app_user_id, "Authenticated app user");
        return Ok(user_info);
    }

    pub async fn logout(&self) -> Result<()> {
        let credentials = self.client.credentials();
        credentials.clear();
        credentials.save().await?;

        return Ok(());
    }

    /// The configured app user id wins. Otherwise the persisted one is
    /// reused, or a new one is generated and persisted.
    pub async fn app_user_id(&self) -> Result<String> {
        let credentials = self.client.credentials();

        if !self.configured_app_user_id.is_empty() {
            credentials.set_app_user_id(&self.configured_app_user_id);
            return Ok(self.configured_app_user_id.to_string());
        }

        let persisted = credentials.app_user_id();
        if !persisted.is_empty() {
            return Ok(persisted);
        }

        let generated = Uuid::new_v4().simple().to_string();
        credentials.set_app_user_id(&generated);
        credentials.save().await?;

        return Ok(generated);
    }
}
