#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use serde_json::Value;
use strum::VariantNames;

use super::console;
use super::context::Context;
use super::prompts::AssumeYes;
use super::prompts::TerminalConfirm;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ConfirmBox;
use crate::domain::models::Message;
use crate::domain::models::StepResult;
use crate::domain::services::clipboard::ClipboardService;
use crate::domain::services::Export;
use crate::domain::services::ExportFormat;
use crate::domain::services::MessageList;
use crate::infrastructure::api::chat::MessageQuery;

/// Query result rows of an answered message, taken from the message itself
/// or from its database query step.
pub fn query_records(message: &Message) -> Option<Value> {
    if let Some(result) = &message.query_result {
        if !result.is_null() {
            return Some(result.clone());
        }
    }

    return message
        .steps
        .iter()
        .rev()
        .find_map(|step| match step.typed_result() {
            Ok(StepResult::DbQuery(records)) if !records.is_null() => return Some(records),
            _ => return None,
        });
}

fn arg_message_id() -> Arg {
    return Arg::new("id").help("Message ID").required(true).num_args(1);
}

pub fn subcommand_messages() -> Command {
    return Command::new("messages")
        .about("Browse and manage past questions and answers.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List messages, newest first. Filtered by --application when set.")
                .arg(
                    Arg::new("page")
                        .short('p')
                        .long("page")
                        .help("Page to fetch, starting at 1.")
                        .value_parser(value_parser!(u64))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("page-size")
                        .long("page-size")
                        .help("Messages per page.")
                        .value_parser(value_parser!(u64))
                        .default_value("20"),
                )
                .arg(
                    Arg::new("search")
                        .short('s')
                        .long("search")
                        .help("Only list messages whose question contains this text.")
                        .num_args(1),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print a message with its steps and answer.")
                .arg(arg_message_id())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the raw message as JSON.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete one or more messages.")
                .arg(
                    Arg::new("ids")
                        .help("Message IDs")
                        .required(true)
                        .num_args(1..),
                )
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation prompt.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("copy")
                .about("Copy the answer summary of a message to the clipboard.")
                .arg(arg_message_id()),
        )
        .subcommand(
            Command::new("export")
                .about("Export the query result of a message.")
                .arg(arg_message_id())
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .help("File format.")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            ExportFormat::VARIANTS,
                        ))
                        .default_value("csv"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("File to write. Defaults to a timestamped file in the current directory.")
                        .num_args(1),
                ),
        );
}

fn message_list(ctx: &Context, assume_yes: bool) -> MessageList {
    let confirm: ConfirmBox = if assume_yes {
        Box::new(AssumeYes {})
    } else {
        Box::new(TerminalConfirm {})
    };

    return MessageList::new(
        ctx.client.clone(),
        ctx.bus.clone(),
        ctx.notifier.clone(),
        confirm,
        ctx.locale,
    );
}

async fn list(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let application = Config::get(ConfigKey::Application);
    let query = MessageQuery {
        application: if application.is_empty() {
            None
        } else {
            Some(application)
        },
        page: matches.get_one::<u64>("page").copied(),
        page_size: matches.get_one::<u64>("page-size").copied(),
        search: matches.get_one::<String>("search").cloned(),
    };

    let mut history = message_list(ctx, false);
    history.load(&query, false).await?;

    if history.messages.is_empty() {
        println!("There are no messages yet. Ask your first question with `lingx chat`.");
        return Ok(());
    }

    let rows = history
        .messages
        .iter()
        .map(console::format_message_row)
        .collect::<Vec<String>>();
    println!("{}", rows.join("\n"));
    println!("\nShowing {} of {}", history.messages.len(), history.total);
    if history.has_more {
        println!(
            "More messages available, use --page {}",
            query.page.unwrap_or(1) + 1
        );
    }

    return Ok(());
}

async fn export(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let id = matches.get_one::<String>("id").cloned().unwrap_or_default();
    let format = matches
        .get_one::<String>("format")
        .map(|e| return e.parse::<ExportFormat>())
        .transpose()?
        .unwrap_or(ExportFormat::Csv);

    let message = message_list(ctx, false).get(&id).await?;
    let records = match query_records(&message) {
        Some(records) => records,
        None => bail!(format!("Message {id} has no query result to export")),
    };

    let output = match matches.get_one::<String>("output") {
        Some(output) => path::PathBuf::from(output),
        None => path::PathBuf::from(Export::default_file_name(
            "query-result",
            &format.to_string(),
        )),
    };

    let contents = Export::render(&records, format)?;
    Export::write(&output, contents.as_bytes()).await?;
    println!("Exported to {}", output.to_string_lossy());

    return Ok(());
}

pub async fn run(ctx: &mut Context, matches: &ArgMatches) -> Result<()> {
    ctx.client.ensure_authenticated()?;

    match matches.subcommand() {
        Some(("list", list_matches)) => {
            list(ctx, list_matches).await?;
        }
        Some(("show", show_matches)) => {
            let id = show_matches.get_one::<String>("id").cloned().unwrap_or_default();
            let message = message_list(ctx, false).get(&id).await?;
            if show_matches.get_flag("json") {
                super::context::print_json(&message)?;
            } else {
                println!("{}", console::format_message(&message));
            }
        }
        Some(("delete", delete_matches)) => {
            let ids = delete_matches
                .get_many::<String>("ids")
                .unwrap_or_default()
                .cloned()
                .collect::<Vec<String>>();
            let history = message_list(ctx, delete_matches.get_flag("yes"));

            if ids.len() == 1 {
                history.delete(&ids[0]).await?;
            } else {
                history.batch_delete(&ids).await?;
            }
        }
        Some(("copy", copy_matches)) => {
            let id = copy_matches.get_one::<String>("id").cloned().unwrap_or_default();
            ClipboardService::healthcheck()?;
            let message = message_list(ctx, false).get(&id).await?;
            if !ClipboardService::copy_summary(&message, &ctx.notifier, ctx.locale)? {
                println!("Message {id} has no answer to copy.");
            }
        }
        Some(("export", export_matches)) => {
            export(ctx, export_matches).await?;
        }
        _ => {
            subcommand_messages().print_long_help()?;
        }
    }

    return Ok(());
}
