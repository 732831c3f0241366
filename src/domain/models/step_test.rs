use anyhow::bail;
use anyhow::Result;
use serde_json::json;
use test_utils::answer_step_fixture;
use test_utils::db_query_step_fixture;
use test_utils::question_step_fixture;
use test_utils::sql_step_fixture;

use super::Step;
use super::StepName;
use super::StepResult;
use super::StepStatus;
use crate::domain::models::DisplayMode;

#[test]
fn it_parses_a_full_step_history() -> Result<()> {
    let steps: Vec<Step> = serde_json::from_value(json!([
        question_step_fixture(Some("Chinese")),
        sql_step_fixture(),
        db_query_step_fixture(),
        answer_step_fixture("There were 42 orders.", "table", true),
    ]))?;

    assert_eq!(steps.len(), 4);
    assert_eq!(steps[0].step, StepName::QuestionAgent);
    assert_eq!(steps[1].step, StepName::SqlGeneratorAgent);
    assert_eq!(steps[2].step, StepName::DbQueryAgent);
    assert_eq!(steps[3].status, StepStatus::Completed);
    assert!(steps[3].is_final_completed);
    assert!(!steps[2].is_final_completed);
    assert_eq!(steps[3].id, Some("42".to_string()));

    return Ok(());
}

#[test]
fn it_reads_question_analysis() -> Result<()> {
    let step: Step = serde_json::from_value(question_step_fixture(Some("Japanese")))?;

    let analysis = step.question_analysis().unwrap();
    assert_eq!(analysis.is_compliant, Some(true));
    assert_eq!(analysis.language, Some("Japanese".to_string()));

    return Ok(());
}

#[test]
fn it_reads_sql_generation() -> Result<()> {
    let step: Step = serde_json::from_value(sql_step_fixture())?;

    match step.typed_result()? {
        StepResult::SqlGeneration(sql_list) => {
            assert_eq!(sql_list, vec!["SELECT COUNT(*) AS total FROM orders".to_string()]);
        }
        _ => bail!("Wrong result variant"),
    }

    return Ok(());
}

#[test]
fn it_reads_answer_generation() -> Result<()> {
    let step: Step = serde_json::from_value(answer_step_fixture("Growing.", "chart", false))?;

    let answer = step.answer_result().unwrap();
    assert_eq!(answer.summary, "Growing.");
    assert_eq!(answer.display_mode, Some(DisplayMode::Chart));
    assert!(step.answer.is_none());

    return Ok(());
}

#[test]
fn it_tolerates_in_progress_placeholders() -> Result<()> {
    let step: Step = serde_json::from_value(json!({
        "step": "question_agent",
        "status": "in_progress",
        "result": {"isCompliant": null},
        "latency": 0,
    }))?;

    let analysis = step.question_analysis().unwrap();
    assert_eq!(analysis.is_compliant, None);
    assert_eq!(analysis.language, None);
    assert!(step.id.is_none());

    return Ok(());
}

#[test]
fn it_rejects_unknown_step_tags() {
    let res = serde_json::from_value::<Step>(json!({
        "step": "vector_search_agent",
        "status": "completed",
    }));

    assert!(res.is_err());
}

#[test]
fn it_keeps_db_query_results_raw() -> Result<()> {
    let step = Step::new(
        StepName::DbQueryAgent,
        StepStatus::Error,
        json!("column \"totl\" does not exist"),
    );

    assert_eq!(
        step.typed_result()?,
        StepResult::DbQuery(json!("column \"totl\" does not exist"))
    );
    assert_eq!(step.status.to_string(), "error");

    return Ok(());
}
