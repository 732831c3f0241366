#[cfg(test)]
#[path = "console_test.rs"]
mod tests;

use owo_colors::OwoColorize;
use owo_colors::Stream;

use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Notification;
use crate::domain::models::NotificationLevel;
use crate::domain::models::StepName;
use crate::domain::models::StepResult;
use crate::domain::models::StepStatus;

pub fn format_notification(notification: &Notification) -> String {
    let prefix = match notification.level {
        NotificationLevel::Success => "✔"
            .if_supports_color(Stream::Stderr, |text| return text.green())
            .to_string(),
        NotificationLevel::Warning => "!"
            .if_supports_color(Stream::Stderr, |text| return text.yellow())
            .to_string(),
        NotificationLevel::Error => "✖"
            .if_supports_color(Stream::Stderr, |text| return text.red())
            .to_string(),
    };

    return format!("{prefix} {}", notification.text);
}

pub fn print_notification(notification: &Notification) {
    eprintln!("{}", format_notification(notification));
}

fn step_line(message: &Message, idx: usize) -> Option<String> {
    let step = &message.steps[idx];
    let status = match step.status {
        StepStatus::InProgress => return None,
        StepStatus::Completed => "done"
            .if_supports_color(Stream::Stdout, |text| return text.green())
            .to_string(),
        StepStatus::Error => "failed"
            .if_supports_color(Stream::Stdout, |text| return text.red())
            .to_string(),
        StepStatus::Cancelled => "cancelled"
            .if_supports_color(Stream::Stdout, |text| return text.yellow())
            .to_string(),
    };

    let mut line = format!("  {} {status} ({:.1}s)", step.step.label(), step.latency);
    if let Some(err) = &step.error_msg {
        line = format!("{line}: {err}");
    }

    if step.step == StepName::SqlGeneratorAgent && step.status == StepStatus::Completed {
        if let Ok(StepResult::SqlGeneration(sql)) = step.typed_result() {
            for statement in sql {
                let statement = format!("    {statement}");
                line = format!(
                    "{line}\n{}",
                    statement.if_supports_color(Stream::Stdout, |text| return text.dimmed())
                );
            }
        }
    }

    return Some(line);
}

/// Turns the snapshots published for one question into terminal lines,
/// printing each piece of progress once.
#[derive(Default)]
pub struct Renderer {
    steps: Vec<(StepName, StepStatus)>,
    answered: bool,
    charting: bool,
}

impl Renderer {
    pub fn render(&mut self, event: &Event) -> Vec<String> {
        let mut lines = vec![];

        match event {
            Event::NewMessage(message) => {
                // The first snapshot of every question.
                if message.is_pending_response && message.steps.is_empty() {
                    *self = Renderer::default();
                    lines.push(format!(
                        "{} {}",
                        "?".if_supports_color(Stream::Stdout, |text| return text.cyan()),
                        message
                            .question
                            .if_supports_color(Stream::Stdout, |text| return text.bold())
                    ));
                }

                for idx in 0..message.steps.len() {
                    let key = (message.steps[idx].step, message.steps[idx].status);
                    if self.steps.get(idx) == Some(&key) {
                        continue;
                    }
                    if let Some(line) = step_line(message, idx) {
                        lines.push(line);
                    }
                    if idx < self.steps.len() {
                        self.steps[idx] = key;
                    } else {
                        self.steps.push(key);
                    }
                }

                if !message.is_pending_response && !self.answered && !message.summary().is_empty() {
                    self.answered = true;
                    lines.push(format!("\n{}\n", message.summary()));
                }

                if message.is_chart_generating && !self.charting {
                    self.charting = true;
                    lines.push(
                        "Generating chart..."
                            .if_supports_color(Stream::Stdout, |text| return text.dimmed())
                            .to_string(),
                    );
                }
                if self.charting && !message.is_chart_generating {
                    self.charting = false;
                    let done = match &message.answer {
                        Some(answer) if answer.has_chart_option() => "Chart ready.",
                        _ => "Chart unavailable.",
                    };
                    lines.push(done.to_string());
                }
            }
            Event::MessageCancelled() => {
                lines.push(
                    "Cancelled."
                        .if_supports_color(Stream::Stdout, |text| return text.yellow())
                        .to_string(),
                );
            }
            Event::MessageDeleted(ids) => {
                lines.push(format!("Deleted {}", ids.join(", ")));
            }
        }

        return lines;
    }
}

/// One line per message for history listings.
pub fn format_message_row(message: &Message) -> String {
    let id = message.id.clone().unwrap_or_else(|| return "-".to_string());
    let created_at = message.created_at.clone().unwrap_or_default();

    let mut question = message.question.split('\n').next().unwrap_or_default().to_string();
    if question.chars().count() >= 70 {
        question = format!("{}...", question.chars().take(67).collect::<String>());
    }

    let mut row = format!("- (ID: {id}) {created_at}, {question}");
    if message.is_cancelled {
        row = format!("{row} [cancelled]");
    }

    return row;
}

pub fn format_message(message: &Message) -> String {
    let mut lines = vec![format!(
        "{} {}",
        "?".if_supports_color(Stream::Stdout, |text| return text.cyan()),
        message.question
    )];

    for idx in 0..message.steps.len() {
        if let Some(line) = step_line(message, idx) {
            lines.push(line);
        }
    }

    if !message.summary().is_empty() {
        lines.push(format!("\n{}", message.summary()));
    }
    if let Some(mode) = message.display_mode() {
        lines.push(format!("[display: {mode}]"));
    }

    return lines.join("\n");
}
