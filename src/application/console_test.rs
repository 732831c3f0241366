use anyhow::Result;
use test_utils::answer_step_fixture;
use test_utils::question_step_fixture;
use test_utils::sql_step_fixture;

use super::format_message_row;
use super::format_notification;
use super::Renderer;
use crate::domain::models::Answer;
use crate::domain::models::DisplayMode;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Notification;
use crate::domain::models::NotificationLevel;
use crate::domain::models::Step;

fn with_steps(message: &Message, values: Vec<serde_json::Value>) -> Result<Message> {
    let mut message = message.clone();
    message.steps = values
        .into_iter()
        .map(serde_json::from_value::<Step>)
        .collect::<Result<Vec<Step>, _>>()?;

    return Ok(message);
}

#[test]
fn it_prints_each_step_once() -> Result<()> {
    let mut renderer = Renderer::default();
    let pending = Message::new_pending("3", "How many orders?");

    let header = renderer.render(&Event::NewMessage(pending.clone()));
    assert_eq!(header.len(), 1);
    assert!(header[0].contains("How many orders?"));

    let first = with_steps(&pending, vec![question_step_fixture(Some("English"))])?;
    let lines = renderer.render(&Event::NewMessage(first));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Question analysis"));

    let second = with_steps(
        &pending,
        vec![question_step_fixture(Some("English")), sql_step_fixture()],
    )?;
    let lines = renderer.render(&Event::NewMessage(second.clone()));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("SQL generation"));
    assert!(lines[0].contains("SELECT COUNT(*) AS total FROM orders"));

    assert!(renderer.render(&Event::NewMessage(second)).is_empty());
    return Ok(());
}

#[test]
fn it_prints_the_answer_and_chart_progress() -> Result<()> {
    let mut renderer = Renderer::default();
    let pending = Message::new_pending("3", "Show monthly orders");
    renderer.render(&Event::NewMessage(pending.clone()));

    let mut finished = with_steps(
        &pending,
        vec![answer_step_fixture("Orders grew every month.", "chart", true)],
    )?;
    finished.is_pending_response = false;
    finished.is_chart_generating = true;
    finished.answer = Some(Answer {
        summary: "Orders grew every month.".to_string(),
        chart_option: None,
        display_mode: Some(DisplayMode::Chart),
    });

    let lines = renderer.render(&Event::NewMessage(finished.clone()));
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("Answer generation"));
    assert_eq!(lines[1], "\nOrders grew every month.\n");
    assert!(lines[2].contains("Generating chart..."));

    finished.is_chart_generating = false;
    finished.answer.as_mut().unwrap().chart_option = Some("{}".to_string());
    assert_eq!(
        renderer.render(&Event::NewMessage(finished)),
        vec!["Chart ready.".to_string()]
    );

    return Ok(());
}

#[test]
fn it_starts_over_for_the_next_question() {
    let mut renderer = Renderer::default();
    renderer.render(&Event::NewMessage(Message::new_pending("3", "First")));
    renderer.render(&Event::MessageCancelled());

    let lines = renderer.render(&Event::NewMessage(Message::new_pending("3", "Second")));

    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Second"));
}

#[test]
fn it_formats_history_rows() {
    let message = Message {
        id: Some("9".to_string()),
        question: format!("{}\nsecond line", "a".repeat(80)),
        created_at: Some("2024-05-01 10:00:00".to_string()),
        is_cancelled: true,
        ..Message::default()
    };

    insta::assert_snapshot!(format_message_row(&message), @"- (ID: 9) 2024-05-01 10:00:00, aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa... [cancelled]");
}

#[test]
fn it_prefixes_notifications_by_level() {
    let text = format_notification(&Notification::new(
        NotificationLevel::Warning,
        "No items selected",
    ));

    assert!(text.ends_with(" No items selected"));
}
