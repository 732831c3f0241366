use anyhow::Result;
use serde_json::json;

use super::ApiClient;
use crate::domain::models::AccessTokenResponse;
use crate::domain::models::LoginResponse;

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        return self
            .post(
                "/admin/login/",
                &json!({ "email": email, "password": password }),
            )
            .await;
    }

    pub async fn client_token(&self, application_id: &str) -> Result<AccessTokenResponse> {
        return self
            .post(
                "/auth/client_token/",
                &json!({ "applicationId": application_id }),
            )
            .await;
    }

    pub async fn chat_auth(&self, app_user_id: &str, email: &str) -> Result<AccessTokenResponse> {
        return self
            .post(
                "/auth/chat_auth/",
                &json!({ "appUserId": app_user_id, "email": email }),
            )
            .await;
    }
}
