#[cfg(test)]
#[path = "apps_test.rs"]
mod tests;

use anyhow::Result;
use serde_derive::Serialize;
use serde_json::json;
use serde_json::Value;

use super::ApiClient;
use super::NO_QUERY;
use crate::domain::models::AppPrompt;
use crate::domain::models::AppTable;
use crate::domain::models::Application;
use crate::domain::models::ColumnUpdate;
use crate::domain::models::DatabaseDocument;
use crate::domain::models::DeployedModel;
use crate::domain::models::ExampleFileType;
use crate::domain::models::FineTuningExample;
use crate::domain::models::Page;
use crate::domain::models::SchemaFormat;
use crate::domain::models::StandardFineTuningExample;
use crate::domain::models::SuggestedQuestion;
use crate::domain::models::TableColumn;
use crate::domain::models::TableUpdate;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleQuery {
    pub application: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlExample {
    pub application: String,
    pub question: String,
    pub sql: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub application_id: String,
    pub model_name: String,
    pub command: String,
}

/// Application administration endpoints.
impl ApiClient {
    pub async fn list_applications(&self, search: Option<&str>) -> Result<Vec<Application>> {
        let mut query = vec![];
        if let Some(search) = search {
            query.push(("search", search));
        }

        return self.get("/app", &query).await;
    }

    pub async fn create_application(&self, payload: &Value) -> Result<Application> {
        return self.post("/app", payload).await;
    }

    pub async fn update_application(&self, id: &str, payload: &Value) -> Result<Application> {
        return self.patch(&format!("/app/{id}"), payload).await;
    }

    pub async fn get_application(&self, id: &str) -> Result<Application> {
        return self.get(&format!("/app/{id}"), NO_QUERY).await;
    }

    pub async fn delete_application(&self, id: &str) -> Result<Value> {
        return self.delete(&format!("/app/{id}")).await;
    }

    pub async fn create_database_tables(&self, id: &str) -> Result<Value> {
        return self
            .post(&format!("/app/{id}/create_database_tables"), &json!({}))
            .await;
    }

    pub async fn export_schema(&self, id: &str, format: SchemaFormat) -> Result<Value> {
        let format = format.to_string();
        return self
            .get(
                &format!("/app/{id}/export_database_schema"),
                &[("type", format.as_str())],
            )
            .await;
    }

    pub async fn enable_disable_rag(&self, id: &str, is_enabled: bool) -> Result<Value> {
        return self
            .put(
                &format!("/app/{id}/enable_disable_rag"),
                &json!({ "isEnabled": is_enabled }),
            )
            .await;
    }

    pub async fn list_tables(&self, application_id: &str) -> Result<Vec<AppTable>> {
        return self
            .get("/app_table", &[("application", application_id)])
            .await;
    }

    pub async fn list_table_columns(&self, table_id: &str) -> Result<Vec<TableColumn>> {
        return self
            .get("/app_table_column", &[("table", table_id)])
            .await;
    }

    pub async fn update_table(&self, table_id: &str, update: &TableUpdate) -> Result<AppTable> {
        return self.patch(&format!("/app_table/{table_id}"), update).await;
    }

    /// Asks the backend model to draft comments for a table and its columns.
    pub async fn table_ai_comment(&self, table_id: &str) -> Result<Value> {
        return self
            .get(&format!("/app_table/{table_id}/get_ai_comment"), NO_QUERY)
            .await;
    }

    pub async fn update_column(&self, column_id: &str, update: &ColumnUpdate) -> Result<TableColumn> {
        return self
            .patch(&format!("/app_table_column/{column_id}"), update)
            .await;
    }

    pub async fn batch_update_columns(&self, updates: &[ColumnUpdate]) -> Result<Value> {
        return self.put("/app_table_column/batch_update", updates).await;
    }

    pub async fn list_documents(&self, application_id: &str) -> Result<Vec<DatabaseDocument>> {
        return self
            .get("/app_document", &[("application", application_id)])
            .await;
    }

    pub async fn create_documents(&self, application_id: &str) -> Result<Vec<DatabaseDocument>> {
        return self
            .post(
                "/app_document/create_embed",
                &json!({ "applicationId": application_id }),
            )
            .await;
    }

    pub async fn retrieve_documents(&self, application_id: &str, text: &str) -> Result<Value> {
        return self
            .post(
                "/app_document/retrieval_embed",
                &json!({ "applicationId": application_id, "text": text }),
            )
            .await;
    }

    pub async fn list_examples(&self, query: &ExampleQuery) -> Result<Page<FineTuningExample>> {
        return self.get("/fine_tuning_example", query).await;
    }

    pub async fn create_example_questions(
        &self,
        application_id: &str,
        question_count: u32,
    ) -> Result<Value> {
        return self
            .post(
                "/fine_tuning_example/create_questions",
                &json!({ "applicationId": application_id, "questionCount": question_count }),
            )
            .await;
    }

    pub async fn batch_delete_examples(&self, ids: &[String]) -> Result<Value> {
        return self
            .post("/fine_tuning_example/batch_delete", &json!({ "ids": ids }))
            .await;
    }

    /// Raw export file, JSON or CSV as requested.
    pub async fn export_examples(
        &self,
        application_id: &str,
        file_type: ExampleFileType,
    ) -> Result<Vec<u8>> {
        let file_type = file_type.to_string();
        return self
            .get_bytes(
                "/fine_tuning_example/export_example",
                &[
                    ("applicationId", application_id),
                    ("fileType", file_type.as_str()),
                ],
            )
            .await;
    }

    pub async fn standard_examples(
        &self,
        application_id: &str,
    ) -> Result<Vec<StandardFineTuningExample>> {
        return self
            .get(
                "/fine_tuning_example/get_standard_fine_tuning_example",
                &[("applicationId", application_id)],
            )
            .await;
    }

    pub async fn fine_tuning_config(&self, application_id: &str) -> Result<Value> {
        return self
            .get(
                "/fine_tuning_example/get_fine_tuning_config",
                &[("applicationId", application_id)],
            )
            .await;
    }

    pub async fn train_webui_url(&self) -> Result<Value> {
        return self
            .get("/fine_tuning_example/get_train_webui_url", NO_QUERY)
            .await;
    }

    pub async fn get_prompt(&self, application_id: &str) -> Result<AppPrompt> {
        return self
            .get("/app_prompt/get_prompt", &[("applicationId", application_id)])
            .await;
    }

    pub async fn update_prompt(&self, prompt: &AppPrompt) -> Result<AppPrompt> {
        return self.put("/app_prompt/update_prompt", prompt).await;
    }

    pub async fn create_sql(&self, application_id: &str, question: &str) -> Result<Value> {
        return self
            .post(
                "/fine_tuning_example/create_sql",
                &json!({ "applicationId": application_id, "question": question }),
            )
            .await;
    }

    pub async fn execute_sql(&self, application_id: &str, question: &str, sql: &str) -> Result<Value> {
        return self
            .post(
                "/fine_tuning_example/execute_sql",
                &json!({ "applicationId": application_id, "question": question, "sql": sql }),
            )
            .await;
    }

    pub async fn save_sql(&self, example: &SqlExample) -> Result<FineTuningExample> {
        return self.post("/fine_tuning_example", example).await;
    }

    pub async fn list_models(&self, application_id: &str) -> Result<Vec<DeployedModel>> {
        return self
            .get("/fine_tuning_model", &[("application", application_id)])
            .await;
    }

    pub async fn convert_model(&self, command: &str) -> Result<Value> {
        return self
            .post("/convert_model", &json!({ "command": command }))
            .await;
    }

    pub async fn deploy_model(&self, deployment: &Deployment) -> Result<Value> {
        return self.post("/deployment_model", deployment).await;
    }

    pub async fn update_model(&self, id: &str, payload: &Value) -> Result<DeployedModel> {
        return self
            .patch(&format!("/fine_tuning_model/{id}"), payload)
            .await;
    }

    /// Enabling a model disables every other model of its application.
    pub async fn enable_disable_model(&self, id: &str, is_enabled: bool) -> Result<Value> {
        return self
            .put(
                &format!("/fine_tuning_model/{id}/enable_disable_model"),
                &json!({ "isEnabled": is_enabled }),
            )
            .await;
    }

    pub async fn delete_model(&self, id: &str) -> Result<Value> {
        return self.delete(&format!("/fine_tuning_model/{id}")).await;
    }

    pub async fn list_suggested_questions(
        &self,
        application_id: &str,
    ) -> Result<Vec<SuggestedQuestion>> {
        return self
            .get(
                "/application-suggested-questions",
                &[("application", application_id)],
            )
            .await;
    }

    /// Replaces the application's suggested questions with `questions`.
    pub async fn batch_update_suggested_questions(
        &self,
        application_id: &str,
        questions: &[String],
    ) -> Result<Value> {
        return self
            .post(
                "/application-suggested-questions/batch_update",
                &json!({ "applicationId": application_id, "questions": questions }),
            )
            .await;
    }
}
