use serde_json::json;
use serde_json::Value;

/// Wraps JSON payloads into server-sent event frames the way the chat stream
/// endpoint writes them.
pub fn sse_body(frames: &[Value]) -> String {
    return frames
        .iter()
        .map(|frame| {
            return format!("data: {frame}\n\n");
        })
        .collect::<Vec<String>>()
        .join("");
}

pub fn question_step_fixture(language: Option<&str>) -> Value {
    let mut result = json!({
        "isCompliant": true,
        "newQuestion": "How many orders were placed last month?",
    });
    if let Some(lang) = language {
        result["language"] = json!(lang);
    }

    return json!({
        "id": "42",
        "taskId": "task-1",
        "step": "question_agent",
        "status": "completed",
        "latency": 0.8,
        "result": result,
    });
}

pub fn sql_step_fixture() -> Value {
    return json!({
        "id": "42",
        "taskId": "task-1",
        "step": "sql_generator_agent",
        "status": "completed",
        "latency": 1.2,
        "result": ["SELECT COUNT(*) AS total FROM orders"],
    });
}

pub fn db_query_step_fixture() -> Value {
    return json!({
        "id": "42",
        "taskId": "task-1",
        "step": "db_query_agent",
        "status": "completed",
        "latency": 0.1,
        "result": [],
    });
}

pub fn answer_step_fixture(summary: &str, display_mode: &str, final_completed: bool) -> Value {
    let answer = json!({
        "summary": summary,
        "chartOption": "",
        "displayMode": display_mode,
    });

    let mut step = json!({
        "id": "42",
        "taskId": "task-1",
        "step": "answer_generator_agent",
        "status": if final_completed { "completed" } else { "in_progress" },
        "latency": 2.4,
        "result": answer,
    });
    if final_completed {
        step["isFinalCompleted"] = json!(true);
        step["answer"] = answer;
        step["sqlList"] = json!(["SELECT COUNT(*) AS total FROM orders"]);
        step["validSql"] = json!("SELECT COUNT(*) AS total FROM orders");
    }

    return step;
}

pub fn envelope(data: Value) -> String {
    return json!({
        "code": 0,
        "msg": "success",
        "data": data,
    })
    .to_string();
}
