#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use owo_colors::OwoColorize;
use owo_colors::Stream;

use super::console;
use super::console::Renderer;
use super::context::Context;
use super::prompts::TerminalConfirm;
use crate::domain::models::Event;
use crate::domain::services::ChatSession;
use crate::domain::services::MessageList;
use crate::domain::services::Subscription;

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

/// What the terminal shows for one chat session. Bus events go through the
/// transcript first so `/history` reflects finished and cancelled answers.
struct View {
    renderer: Renderer,
    transcript: MessageList,
}

impl View {
    fn show(&mut self, event: &Event) {
        self.transcript.apply(event);
        print_lines(self.renderer.render(event));
    }

    fn print_history(&self) {
        if self.transcript.messages.is_empty() {
            println!("No questions asked yet.");
            return;
        }

        let rows = self
            .transcript
            .messages
            .iter()
            .map(console::format_message_row)
            .collect::<Vec<String>>();
        println!("{}", rows.join("\n"));
    }
}

/// Answers one question, or keeps prompting for questions until `/exit`
/// when none is given. Ctrl-C cancels the answer in flight.
pub async fn start(
    ctx: &mut Context,
    application_id: &str,
    stream: bool,
    question: Option<String>,
) -> Result<()> {
    ctx.client.ensure_authenticated()?;

    let session = ChatSession::new(ctx.client.clone(), ctx.bus.clone(), ctx.notifier.clone());
    let mut subscription = ctx.bus.subscribe();
    let mut view = View {
        renderer: Renderer::default(),
        transcript: MessageList::new(
            ctx.client.clone(),
            ctx.bus.clone(),
            ctx.notifier.clone(),
            Box::new(TerminalConfirm {}),
            ctx.locale,
        ),
    };

    if let Some(question) = question {
        ask(ctx, &session, &mut subscription, &mut view, application_id, &question, stream).await;
        ctx.bus.unsubscribe(subscription.id);
        return Ok(());
    }

    println!(
        "{}",
        "Ask a question about your data. Ctrl-C cancels a pending answer, /history lists this session's questions, /exit quits."
            .if_supports_color(Stream::Stdout, |text| return text.dimmed())
    );

    loop {
        let question: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()?;

        match question.trim() {
            "/exit" | "/quit" => break,
            "/history" => {
                view.print_history();
                continue;
            }
            "" => continue,
            _ => {}
        }

        ask(ctx, &session, &mut subscription, &mut view, application_id, &question, stream).await;
    }

    ctx.bus.unsubscribe(subscription.id);
    return Ok(());
}

async fn ask(
    ctx: &mut Context,
    session: &ChatSession,
    subscription: &mut Subscription,
    view: &mut View,
    application_id: &str,
    question: &str,
    stream: bool,
) {
    let task_id = match session.submit(application_id, question, stream) {
        Some(task_id) => task_id,
        None => return,
    };
    tracing::debug!(task_id = %task_id, "Waiting for answer");

    let wait = session.wait();
    tokio::pin!(wait);

    loop {
        tokio::select! {
            _ = &mut wait => break,
            Some(event) = subscription.rx.recv() => view.show(&event),
            Some(notification) = ctx.notifications.recv() => console::print_notification(&notification),
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    tracing::error!(error = ?err, "Failed to listen for Ctrl-C");
                    continue;
                }
                if let Err(err) = session.cancel().await {
                    tracing::warn!(error = ?err, task_id = %task_id, "Cancel failed");
                }
            }
        }
    }

    while let Ok(event) = subscription.rx.try_recv() {
        view.show(&event);
    }
    ctx.flush(true);
}
