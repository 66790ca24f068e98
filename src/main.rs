use account_book::args::{Args, Command};
use account_book::{commands, Config, ErrorType, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.listen()).await?.print(),

        Command::Serve(serve_args) => commands::serve(load(home).await?, serve_args.listen())
            .await?
            .print(),

        Command::Insert(insert_args) => commands::insert(load(home).await?, insert_args.clone())
            .await?
            .print(),

        Command::List(list_args) => commands::list(load(home).await?, list_args.clone())
            .await?
            .print(),

        Command::Summary(summary_args) => {
            commands::summary(load(home).await?, summary_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

async fn load(home: &std::path::Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| account_book::Error::new(ErrorType::Config, e))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
