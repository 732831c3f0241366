use anyhow::Result;
use serde_json::json;
use test_utils::db_query_step_fixture;
use test_utils::question_step_fixture;

use super::query_records;
use crate::domain::models::Message;
use crate::domain::models::Step;

#[test]
fn it_prefers_the_message_query_result() {
    let message = Message {
        query_result: Some(json!([{ "total": 3 }])),
        ..Message::default()
    };

    assert_eq!(query_records(&message), Some(json!([{ "total": 3 }])));
}

#[test]
fn it_falls_back_to_the_db_query_step() -> Result<()> {
    let mut db_step = db_query_step_fixture();
    db_step["result"] = json!([{ "month": "2024-01", "total": 12 }]);

    let message = Message {
        steps: vec![
            serde_json::from_value::<Step>(question_step_fixture(None))?,
            serde_json::from_value::<Step>(db_step)?,
        ],
        ..Message::default()
    };

    assert_eq!(
        query_records(&message),
        Some(json!([{ "month": "2024-01", "total": 12 }]))
    );
    return Ok(());
}

#[test]
fn it_returns_none_without_a_result() -> Result<()> {
    let message = Message {
        query_result: Some(serde_json::Value::Null),
        steps: vec![serde_json::from_value::<Step>(question_step_fixture(None))?],
        ..Message::default()
    };

    assert_eq!(query_records(&message), None);
    return Ok(());
}
