#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use owo_colors::OwoColorize;
use owo_colors::Stream;

use crate::application::cli;

fn handle_error(err: Error) {
    let text = format!(
        "lingx has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE"),
        err
    );
    eprintln!(
        "{}",
        text.if_supports_color(Stream::Stderr, |text| return text.red())
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 RUST_LOG=lingx {args}");
        eprintln!("\nThe debug log is written to {}", cli::log_dir().join("debug.log").to_string_lossy());
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

#[tokio::main]
async fn main() {
    better_panic::Settings::auto().install();

    let file_appender = tracing_appender::rolling::never(cli::log_dir(), "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("lingx")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let res = cli::parse().await;
    drop(guard);

    if let Err(err) = res {
        handle_error(err);
    }
}
