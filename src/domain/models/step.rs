#[cfg(test)]
#[path = "step_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

use super::id;
use super::Answer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepName {
    QuestionAgent,
    SqlGeneratorAgent,
    DbQueryAgent,
    AnswerGeneratorAgent,
}

impl StepName {
    pub fn label(&self) -> &'static str {
        match self {
            StepName::QuestionAgent => return "Question analysis",
            StepName::SqlGeneratorAgent => return "SQL generation",
            StepName::DbQueryAgent => return "Database query",
            StepName::AnswerGeneratorAgent => return "Answer generation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Completed,
    Error,
    Cancelled,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    #[serde(default)]
    pub is_compliant: Option<bool>,
    #[serde(default)]
    pub new_question: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Typed view of `Step::result`, which changes shape with the step tag.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    QuestionAnalysis(QuestionAnalysis),
    SqlGeneration(Vec<String>),
    DbQuery(Value),
    AnswerGeneration(Answer),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default, deserialize_with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub step: StepName,
    pub status: StepStatus,
    #[serde(default)]
    pub latency: f64,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(default)]
    pub is_final_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_times: Option<HashMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl Step {
    pub fn new(step: StepName, status: StepStatus, result: Value) -> Step {
        return Step {
            id: None,
            task_id: None,
            step,
            status,
            latency: 0.0,
            result,
            answer: None,
            is_final_completed: false,
            sql_list: None,
            valid_sql: None,
            query_result: None,
            step_times: None,
            error_msg: None,
        };
    }

    pub fn typed_result(&self) -> Result<StepResult> {
        let result = self.result.clone();
        let res = match self.step {
            StepName::QuestionAgent => {
                if result.is_null() {
                    StepResult::QuestionAnalysis(QuestionAnalysis::default())
                } else {
                    StepResult::QuestionAnalysis(serde_json::from_value(result)?)
                }
            }
            StepName::SqlGeneratorAgent => {
                if result.is_null() {
                    StepResult::SqlGeneration(vec![])
                } else {
                    StepResult::SqlGeneration(serde_json::from_value(result)?)
                }
            }
            StepName::DbQueryAgent => StepResult::DbQuery(result),
            StepName::AnswerGeneratorAgent => {
                if result.is_null() {
                    StepResult::AnswerGeneration(Answer::default())
                } else {
                    StepResult::AnswerGeneration(serde_json::from_value(result)?)
                }
            }
        };

        return Ok(res);
    }

    pub fn question_analysis(&self) -> Option<QuestionAnalysis> {
        if let Ok(StepResult::QuestionAnalysis(analysis)) = self.typed_result() {
            return Some(analysis);
        }

        return None;
    }

    pub fn answer_result(&self) -> Option<Answer> {
        if let Ok(StepResult::AnswerGeneration(answer)) = self.typed_result() {
            return Some(answer);
        }

        return None;
    }
}
