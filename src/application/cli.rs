use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use dialoguer::Password;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::admin;
use super::chat;
use super::context::require_application;
use super::context::Context;
use super::history;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Locale;
use crate::domain::services::AuthService;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("LINGX_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return Config::cache_dir();
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for lingx")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running lingx with environment variable RUST_LOG=lingx")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_login() -> Command {
    return Command::new("login")
        .about("Log in as an administrator. Prompts for anything not passed as an argument.")
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .help("Account email. Defaults to the username from the last login.")
                .num_args(1),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .env("LINGX_PASSWORD")
                .hide_env_values(true)
                .help("Account password.")
                .num_args(1),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Ask questions about the selected application's data.")
        .arg(
            Arg::new("question")
                .short('q')
                .long("question")
                .help("Ask a single question and exit instead of starting an interactive session.")
                .num_args(1),
        )
        .arg(
            Arg::new("no-stream")
                .long("no-stream")
                .help("Wait for the whole answer instead of streaming each step.")
                .action(ArgAction::SetTrue),
        );
}

fn arg_api_url() -> Arg {
    return Arg::new(ConfigKey::ApiURL.to_string())
        .long(ConfigKey::ApiURL.to_string())
        .env("LINGX_API_URL")
        .num_args(1)
        .help(format!(
            "Base URL of the lingx API. [default: {}]",
            Config::default(ConfigKey::ApiURL)
        ))
        .global(true);
}

fn arg_locale() -> Arg {
    return Arg::new(ConfigKey::Locale.to_string())
        .long(ConfigKey::Locale.to_string())
        .env("LINGX_LOCALE")
        .num_args(1)
        .help(format!(
            "Language of messages and prompts. [default: {}]",
            Config::default(ConfigKey::Locale)
        ))
        .value_parser(PossibleValuesParser::new(Locale::VARIANTS))
        .global(true);
}

fn arg_request_timeout() -> Arg {
    return Arg::new(ConfigKey::RequestTimeout.to_string())
        .long(ConfigKey::RequestTimeout.to_string())
        .env("LINGX_REQUEST_TIMEOUT")
        .num_args(1)
        .help(format!(
            "Time to wait in milliseconds before a request times out. Streamed answers are not limited. [default: {}]",
            Config::default(ConfigKey::RequestTimeout)
        ))
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("lingx")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_login())
        .subcommand(Command::new("logout").about("Forget the stored credentials."))
        .subcommand(Command::new("auth").about("Authenticate as an anonymous user of the selected application, the way the embedded chat widget does."))
        .subcommand(history::subcommand_messages())
        .subcommand(admin::subcommand_apps())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_api_url())
        .arg(arg_locale())
        .arg(arg_request_timeout())
        .arg(
            Arg::new(ConfigKey::Application.to_string())
                .short('a')
                .long(ConfigKey::Application.to_string())
                .env("LINGX_APPLICATION")
                .num_args(1)
                .help("ID of the application to chat with or administer.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::AppUserId.to_string())
                .long(ConfigKey::AppUserId.to_string())
                .env("LINGX_APP_USER_ID")
                .num_args(1)
                .help("Identity used by `lingx auth`. A random one is generated and stored when unset.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .short('u')
                .long(ConfigKey::Username.to_string())
                .env("LINGX_USERNAME")
                .num_args(1)
                .help("Email offered by `lingx login`.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("LINGX_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::CredentialsFile.to_string())
                .long(ConfigKey::CredentialsFile.to_string())
                .env("LINGX_CREDENTIALS_FILE")
                .num_args(1)
                .help(format!("Path to the stored login token. [default: {}]", Config::default(ConfigKey::CredentialsFile)))
                .global(true)
        );
}

async fn login(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let email = match matches.get_one::<String>("email") {
        Some(email) => email.to_string(),
        None => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Email")
            .with_initial_text(Config::get(ConfigKey::Username))
            .interact_text()?,
    };

    let password = match matches.get_one::<String>("password") {
        Some(password) => password.to_string(),
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?,
    };

    let user = AuthService::new(ctx.client.clone())
        .login(&email, &password)
        .await?;
    let name = user.username.or(user.email).unwrap_or(email);
    println!("Logged in as {name}");

    return Ok(());
}

async fn run_command(ctx: &mut Context, name: &str, matches: &ArgMatches) -> Result<()> {
    match name {
        "chat" => {
            let application = require_application()?;
            let question = matches.get_one::<String>("question").cloned();
            let stream = !matches.get_flag("no-stream");
            chat::start(ctx, &application, stream, question).await?;
        }
        "login" => {
            login(ctx, matches).await?;
        }
        "logout" => {
            AuthService::new(ctx.client.clone()).logout().await?;
            println!("Logged out");
        }
        "auth" => {
            let application = require_application()?;
            let user = AuthService::new(ctx.client.clone())
                .auth(&application)
                .await?;
            println!("Authenticated for application {application} (user ID: {})", user.id);
        }
        "messages" => {
            history::run(ctx, matches).await?;
        }
        "apps" => {
            admin::run(ctx, matches).await?;
        }
        _ => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}

pub async fn parse() -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_dir().join("debug.log").to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        Some((name, subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let mut ctx = Context::load().await?;

            let res = run_command(&mut ctx, name, subcmd_matches).await;
            ctx.flush(res.is_ok());
            return res;
        }
        None => {
            Config::load(build(), vec![&matches]).await?;
            let mut ctx = Context::load().await?;

            let res = match require_application() {
                Ok(application) => chat::start(&mut ctx, &application, true, None).await,
                Err(err) => Err(err),
            };
            ctx.flush(res.is_ok());
            return res;
        }
    }

    return Ok(());
}
