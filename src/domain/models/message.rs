#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::id;
use super::Step;
use super::StepName;

pub const DEFAULT_CHART_LANGUAGE: &str = "English";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayMode {
    Text,
    Table,
    Chart,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<DisplayMode>,
}

impl Answer {
    pub fn has_chart_option(&self) -> bool {
        return self
            .chart_option
            .as_ref()
            .map(|option| return !option.is_empty())
            .unwrap_or(false);
    }
}

/// One question and answer exchange. `is_pending_response` and
/// `is_chart_generating` only exist client side and are never serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, deserialize_with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(
        default,
        alias = "application",
        deserialize_with = "id::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub application_id: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub is_cancelled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    #[serde(skip)]
    pub is_pending_response: bool,
    #[serde(skip)]
    pub is_chart_generating: bool,
}

impl Message {
    pub fn new_pending(application_id: &str, question: &str) -> Message {
        return Message {
            task_id: Some(Uuid::new_v4().to_string()),
            application_id: Some(application_id.to_string()),
            question: question.to_string(),
            is_pending_response: true,
            ..Message::default()
        };
    }

    pub fn latest_step(&self) -> Option<&Step> {
        return self.steps.last();
    }

    pub fn display_mode(&self) -> Option<DisplayMode> {
        return self.answer.as_ref().and_then(|answer| return answer.display_mode);
    }

    pub fn needs_chart(&self) -> bool {
        return self.display_mode() == Some(DisplayMode::Chart);
    }

    /// Language detected by the question analysis step, used as the chart
    /// language hint.
    pub fn language(&self) -> String {
        return self
            .steps
            .iter()
            .find(|step| return step.step == StepName::QuestionAgent)
            .and_then(|step| return step.question_analysis())
            .and_then(|analysis| return analysis.language)
            .unwrap_or_else(|| return DEFAULT_CHART_LANGUAGE.to_string());
    }

    /// Shallow merge of a server payload onto the message. Top level keys
    /// present in the patch replace the message's own, everything else is
    /// kept.
    pub fn merge(&mut self, patch: &Value) -> Result<()> {
        let patch_obj = match patch {
            Value::Object(obj) => obj,
            Value::Null => return Ok(()),
            _ => bail!("Message patch must be a JSON object"),
        };

        let mut current = serde_json::to_value(&*self)?;
        if let Value::Object(current_obj) = &mut current {
            // Both spellings at once is a duplicate field for serde.
            if patch_obj.contains_key("application") {
                current_obj.remove("applicationId");
            }
            for (key, value) in patch_obj {
                current_obj.insert(key.to_string(), value.clone());
            }
        }

        let mut merged: Message = serde_json::from_value(current)?;
        merged.is_pending_response = self.is_pending_response;
        merged.is_chart_generating = self.is_chart_generating;
        *self = merged;

        return Ok(());
    }

    pub fn summary(&self) -> &str {
        if let Some(answer) = &self.answer {
            return &answer.summary;
        }

        return "";
    }
}
