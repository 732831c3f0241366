use std::path;

use anyhow::anyhow;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use serde_json::Value;

use super::context::print_json;
use super::context::require_application;
use super::context::Context;
use super::prompts::AssumeYes;
use super::prompts::TerminalConfirm;
use crate::domain::models::AppPrompt;
use crate::domain::models::ColumnUpdate;
use crate::domain::models::Confirm;
use crate::domain::models::ExampleFileType;
use crate::domain::models::SchemaFormat;
use crate::domain::models::TableUpdate;
use crate::domain::models::Text;
use crate::domain::services::Export;
use crate::infrastructure::api::apps::Deployment;
use crate::infrastructure::api::apps::ExampleQuery;
use crate::infrastructure::api::apps::SqlExample;

fn arg_id(name: &'static str, help: &'static str) -> Arg {
    return Arg::new(name).help(help).required(true).num_args(1);
}

fn arg_data() -> Arg {
    return Arg::new("data")
        .short('d')
        .long("data")
        .help("JSON payload.")
        .required(true)
        .num_args(1);
}

fn arg_yes() -> Arg {
    return Arg::new("yes")
        .short('y')
        .long("yes")
        .help("Skip the confirmation prompt.")
        .action(ArgAction::SetTrue);
}

fn arg_update_fields() -> [Arg; 3] {
    return [
        Arg::new("comment")
            .long("comment")
            .help("Comment written by a person.")
            .num_args(1),
        Arg::new("ai-comment")
            .long("ai-comment")
            .help("Comment used in prompts instead of the database comment.")
            .num_args(1),
        Arg::new("enabled")
            .long("enabled")
            .help("Whether the model may use it.")
            .value_parser(value_parser!(bool))
            .num_args(1),
    ];
}

fn arg_toggle() -> Arg {
    return Arg::new("enabled")
        .help("true to enable, false to disable.")
        .value_parser(value_parser!(bool))
        .required(true)
        .num_args(1);
}

fn subcommand_tables() -> Command {
    return Command::new("tables")
        .about("Inspect and annotate the tables of the selected application.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List tables."))
        .subcommand(Command::new("sync").about("Read the tables of the application's database."))
        .subcommand(
            Command::new("columns")
                .about("List the columns of a table.")
                .arg(arg_id("table-id", "Table ID")),
        )
        .subcommand(
            Command::new("update")
                .about("Update a table.")
                .arg(arg_id("table-id", "Table ID"))
                .args(arg_update_fields()),
        )
        .subcommand(
            Command::new("ai-comment")
                .about("Generate AI comments for a table and its columns.")
                .arg(arg_id("table-id", "Table ID")),
        )
        .subcommand(
            Command::new("update-column")
                .about("Update a column.")
                .arg(arg_id("column-id", "Column ID"))
                .args(arg_update_fields()),
        )
        .subcommand(
            Command::new("update-columns")
                .about("Update many columns at once from a JSON array of column updates.")
                .arg(arg_data()),
        );
}

fn subcommand_examples() -> Command {
    return Command::new("examples")
        .about("Manage fine-tuning examples of the selected application.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List examples.")
                .arg(
                    Arg::new("page")
                        .short('p')
                        .long("page")
                        .value_parser(value_parser!(u64))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("page-size")
                        .long("page-size")
                        .value_parser(value_parser!(u64))
                        .default_value("20"),
                )
                .arg(Arg::new("search").short('s').long("search").num_args(1)),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate example questions from the application's schema.")
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_parser(value_parser!(u32))
                        .default_value("10"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete examples.")
                .arg(
                    Arg::new("ids")
                        .help("Example IDs")
                        .required(true)
                        .num_args(1..),
                )
                .arg(arg_yes()),
        )
        .subcommand(
            Command::new("export")
                .about("Download all examples.")
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_parser(PossibleValuesParser::new(["json", "csv"]))
                        .default_value("json"),
                )
                .arg(Arg::new("output").short('o').long("output").num_args(1)),
        )
        .subcommand(
            Command::new("standard")
                .about("Print examples in the instruction/input/output training format."),
        )
        .subcommand(Command::new("config").about("Print the fine-tuning configuration."))
        .subcommand(Command::new("train-url").about("Print the training web UI address."));
}

fn subcommand_sql() -> Command {
    return Command::new("sql")
        .about("Write and check SQL examples for the selected application.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("create")
                .about("Generate SQL for a question.")
                .arg(arg_id("question", "Question")),
        )
        .subcommand(
            Command::new("execute")
                .about("Run SQL against the application's database.")
                .arg(arg_id("question", "Question"))
                .arg(arg_id("sql", "SQL")),
        )
        .subcommand(
            Command::new("save")
                .about("Save a question and its SQL as a fine-tuning example.")
                .arg(arg_id("question", "Question"))
                .arg(arg_id("sql", "SQL")),
        );
}

fn subcommand_models() -> Command {
    return Command::new("models")
        .about("Manage fine-tuned models.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List models of the selected application."))
        .subcommand(
            Command::new("convert")
                .about("Convert a trained model.")
                .arg(arg_id("command", "Conversion command")),
        )
        .subcommand(
            Command::new("deploy")
                .about("Deploy a model for the selected application.")
                .arg(arg_id("model-name", "Model name"))
                .arg(arg_id("command", "Deployment command")),
        )
        .subcommand(
            Command::new("update")
                .about("Update a model.")
                .arg(arg_id("id", "Model ID"))
                .arg(arg_data()),
        )
        .subcommand(
            Command::new("toggle")
                .about("Enable or disable a model. Enabling disables the application's other models.")
                .arg(arg_id("id", "Model ID"))
                .arg(arg_toggle()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a model.")
                .arg(arg_id("id", "Model ID"))
                .arg(arg_yes()),
        );
}

pub fn subcommand_apps() -> Command {
    return Command::new("apps")
        .about("Administer applications. Most commands act on the application selected with --application.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List applications.")
                .arg(Arg::new("search").short('s').long("search").num_args(1)),
        )
        .subcommand(Command::new("show").about("Print the selected application."))
        .subcommand(
            Command::new("create")
                .about("Create an application.")
                .arg(arg_data()),
        )
        .subcommand(
            Command::new("update")
                .about("Update the selected application.")
                .arg(arg_data()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete the selected application.")
                .arg(arg_yes()),
        )
        .subcommand(
            Command::new("schema")
                .about("Export the database schema of the selected application.")
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_parser(PossibleValuesParser::new(["json", "ddl"]))
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("rag")
                .about("Enable or disable retrieval over uploaded documents.")
                .arg(arg_toggle()),
        )
        .subcommand(
            Command::new("documents")
                .about("List documents of the selected application.")
                .arg(
                    Arg::new("create")
                        .long("create")
                        .help("Index the application's documents first.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("retrieve")
                .about("Search the selected application's documents.")
                .arg(arg_id("text", "Search text")),
        )
        .subcommand(
            Command::new("prompt")
                .about("Print or replace the prompts of the selected application.")
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help("JSON prompts to save. Prints the current prompts when omitted.")
                        .num_args(1),
                ),
        )
        .subcommand(
            Command::new("questions")
                .about("Print or replace the suggested questions of the selected application.")
                .arg(
                    Arg::new("set")
                        .long("set")
                        .help("Questions replacing the current ones.")
                        .num_args(1..),
                ),
        )
        .subcommand(subcommand_tables())
        .subcommand(subcommand_examples())
        .subcommand(subcommand_sql())
        .subcommand(subcommand_models());
}

fn string_arg(matches: &ArgMatches, name: &str) -> String {
    return matches.get_one::<String>(name).cloned().unwrap_or_default();
}

fn json_arg(matches: &ArgMatches) -> Result<Value> {
    let data = string_arg(matches, "data");
    return serde_json::from_str::<Value>(&data)
        .map_err(|err| return anyhow!(format!("--data is not valid JSON: {err}")));
}

fn confirmed(ctx: &Context, matches: &ArgMatches) -> Result<bool> {
    let title = ctx.locale.text(Text::DeleteConfirm);
    let content = ctx.locale.text(Text::DeleteTip);
    if matches.get_flag("yes") {
        return AssumeYes {}.confirm(title, content);
    }

    return TerminalConfirm {}.confirm(title, content);
}

fn update_fields(matches: &ArgMatches) -> (Option<String>, Option<String>, Option<bool>) {
    return (
        matches.get_one::<String>("comment").cloned(),
        matches.get_one::<String>("ai-comment").cloned(),
        matches.get_one::<bool>("enabled").copied(),
    );
}

async fn run_tables(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let client = &ctx.client;

    match matches.subcommand() {
        Some(("list", _)) => print_json(&client.list_tables(&require_application()?).await?)?,
        Some(("sync", _)) => {
            print_json(&client.create_database_tables(&require_application()?).await?)?
        }
        Some(("columns", sub)) => {
            print_json(&client.list_table_columns(&string_arg(sub, "table-id")).await?)?
        }
        Some(("update", sub)) => {
            let (comment, ai_comment, is_enabled) = update_fields(sub);
            let update = TableUpdate {
                comment,
                ai_comment,
                is_enabled,
            };
            print_json(&client.update_table(&string_arg(sub, "table-id"), &update).await?)?;
        }
        Some(("ai-comment", sub)) => {
            print_json(&client.table_ai_comment(&string_arg(sub, "table-id")).await?)?
        }
        Some(("update-column", sub)) => {
            let (comment, ai_comment, is_enabled) = update_fields(sub);
            let column_id = string_arg(sub, "column-id");
            let update = ColumnUpdate {
                id: Some(column_id.to_string()),
                comment,
                ai_comment,
                is_enabled,
            };
            print_json(&client.update_column(&column_id, &update).await?)?;
        }
        Some(("update-columns", sub)) => {
            let updates = serde_json::from_value::<Vec<ColumnUpdate>>(json_arg(sub)?)?;
            print_json(&client.batch_update_columns(&updates).await?)?;
        }
        _ => subcommand_tables().print_long_help()?,
    }

    return Ok(());
}

async fn run_examples(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let client = &ctx.client;

    match matches.subcommand() {
        Some(("list", sub)) => {
            let query = ExampleQuery {
                application: require_application()?,
                page: sub.get_one::<u64>("page").copied(),
                page_size: sub.get_one::<u64>("page-size").copied(),
                search: sub.get_one::<String>("search").cloned(),
            };
            print_json(&client.list_examples(&query).await?)?;
        }
        Some(("generate", sub)) => {
            let count = sub.get_one::<u32>("count").copied().unwrap_or(10);
            print_json(
                &client
                    .create_example_questions(&require_application()?, count)
                    .await?,
            )?;
        }
        Some(("delete", sub)) => {
            let ids = sub
                .get_many::<String>("ids")
                .unwrap_or_default()
                .cloned()
                .collect::<Vec<String>>();
            if confirmed(ctx, sub)? {
                client.batch_delete_examples(&ids).await?;
                ctx.notifier.success(ctx.locale.text(Text::DeleteSuccess));
            }
        }
        Some(("export", sub)) => {
            let file_type = string_arg(sub, "format").parse::<ExampleFileType>()?;
            let contents = client
                .export_examples(&require_application()?, file_type)
                .await?;
            let output = match sub.get_one::<String>("output") {
                Some(output) => path::PathBuf::from(output),
                None => path::PathBuf::from(Export::default_file_name(
                    "fine-tuning-examples",
                    &file_type.to_string(),
                )),
            };
            Export::write(&output, &contents).await?;
            println!("Exported to {}", output.to_string_lossy());
        }
        Some(("standard", _)) => {
            print_json(&client.standard_examples(&require_application()?).await?)?
        }
        Some(("config", _)) => {
            print_json(&client.fine_tuning_config(&require_application()?).await?)?
        }
        Some(("train-url", _)) => print_json(&client.train_webui_url().await?)?,
        _ => subcommand_examples().print_long_help()?,
    }

    return Ok(());
}

async fn run_sql(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let client = &ctx.client;
    let application = require_application()?;

    match matches.subcommand() {
        Some(("create", sub)) => {
            print_json(&client.create_sql(&application, &string_arg(sub, "question")).await?)?
        }
        Some(("execute", sub)) => print_json(
            &client
                .execute_sql(
                    &application,
                    &string_arg(sub, "question"),
                    &string_arg(sub, "sql"),
                )
                .await?,
        )?,
        Some(("save", sub)) => {
            let example = SqlExample {
                application,
                question: string_arg(sub, "question"),
                sql: string_arg(sub, "sql"),
            };
            print_json(&client.save_sql(&example).await?)?;
        }
        _ => subcommand_sql().print_long_help()?,
    }

    return Ok(());
}

async fn run_models(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let client = &ctx.client;

    match matches.subcommand() {
        Some(("list", _)) => print_json(&client.list_models(&require_application()?).await?)?,
        Some(("convert", sub)) => {
            print_json(&client.convert_model(&string_arg(sub, "command")).await?)?
        }
        Some(("deploy", sub)) => {
            let deployment = Deployment {
                application_id: require_application()?,
                model_name: string_arg(sub, "model-name"),
                command: string_arg(sub, "command"),
            };
            print_json(&client.deploy_model(&deployment).await?)?;
        }
        Some(("update", sub)) => {
            print_json(&client.update_model(&string_arg(sub, "id"), &json_arg(sub)?).await?)?
        }
        Some(("toggle", sub)) => {
            let is_enabled = sub.get_one::<bool>("enabled").copied().unwrap_or(false);
            print_json(
                &client
                    .enable_disable_model(&string_arg(sub, "id"), is_enabled)
                    .await?,
            )?;
        }
        Some(("delete", sub)) => {
            if confirmed(ctx, sub)? {
                client.delete_model(&string_arg(sub, "id")).await?;
                ctx.notifier.success(ctx.locale.text(Text::DeleteSuccess));
            }
        }
        _ => subcommand_models().print_long_help()?,
    }

    return Ok(());
}

pub async fn run(ctx: &mut Context, matches: &ArgMatches) -> Result<()> {
    ctx.client.ensure_authenticated()?;
    let client = ctx.client.clone();

    match matches.subcommand() {
        Some(("list", sub)) => {
            let search = sub.get_one::<String>("search").map(|e| return e.as_str());
            print_json(&client.list_applications(search).await?)?;
        }
        Some(("show", _)) => print_json(&client.get_application(&require_application()?).await?)?,
        Some(("create", sub)) => print_json(&client.create_application(&json_arg(sub)?).await?)?,
        Some(("update", sub)) => print_json(
            &client
                .update_application(&require_application()?, &json_arg(sub)?)
                .await?,
        )?,
        Some(("delete", sub)) => {
            let application = require_application()?;
            if confirmed(ctx, sub)? {
                client.delete_application(&application).await?;
                ctx.notifier.success(ctx.locale.text(Text::DeleteSuccess));
            }
        }
        Some(("schema", sub)) => {
            let format = string_arg(sub, "format").parse::<SchemaFormat>()?;
            let schema = client.export_schema(&require_application()?, format).await?;
            match schema {
                Value::String(ddl) => println!("{ddl}"),
                other => print_json(&other)?,
            }
        }
        Some(("rag", sub)) => {
            let is_enabled = sub.get_one::<bool>("enabled").copied().unwrap_or(false);
            print_json(
                &client
                    .enable_disable_rag(&require_application()?, is_enabled)
                    .await?,
            )?;
        }
        Some(("documents", sub)) => {
            let application = require_application()?;
            if sub.get_flag("create") {
                print_json(&client.create_documents(&application).await?)?;
            } else {
                print_json(&client.list_documents(&application).await?)?;
            }
        }
        Some(("retrieve", sub)) => print_json(
            &client
                .retrieve_documents(&require_application()?, &string_arg(sub, "text"))
                .await?,
        )?,
        Some(("prompt", sub)) => {
            let application = require_application()?;
            if sub.get_one::<String>("data").is_some() {
                let mut prompt = serde_json::from_value::<AppPrompt>(json_arg(sub)?)?;
                prompt.application_id = application;
                print_json(&client.update_prompt(&prompt).await?)?;
            } else {
                print_json(&client.get_prompt(&application).await?)?;
            }
        }
        Some(("questions", sub)) => {
            let application = require_application()?;
            match sub.get_many::<String>("set") {
                Some(questions) => {
                    let questions = questions.cloned().collect::<Vec<String>>();
                    print_json(
                        &client
                            .batch_update_suggested_questions(&application, &questions)
                            .await?,
                    )?;
                }
                None => print_json(&client.list_suggested_questions(&application).await?)?,
            }
        }
        Some(("tables", sub)) => run_tables(ctx, sub).await?,
        Some(("examples", sub)) => run_examples(ctx, sub).await?,
        Some(("sql", sub)) => run_sql(ctx, sub).await?,
        Some(("models", sub)) => run_models(ctx, sub).await?,
        _ => subcommand_apps().print_long_help()?,
    }

    return Ok(());
}
