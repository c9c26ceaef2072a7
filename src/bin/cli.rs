use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::debug;

use ticklog::config::DEFAULT_ADDR;
use ticklog::{Client, Command, Config, Error};

#[derive(Parser, Debug)]
struct Args {
    /// Address of the store
    #[arg(short, long, env = "TICKLOG_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Check the store is alive
    Ping,
    /// Show server information
    Info,
    /// Show the store's command help
    Help,
    /// Print the first N records of the table in use as JSON
    Get { n: u64 },
    /// Print every record of the table in use as JSON
    Getall,
    /// Create a table
    Create { name: String },
    /// Switch to a table
    Use { name: String },
    /// Drop the in-memory records of the table in use
    Clear,
    /// Write the table in use to disk
    Flush,
    /// Send a line as-is
    Raw { line: String },
}

impl From<Cmd> for Command {
    fn from(cmd: Cmd) -> Self {
        match cmd {
            Cmd::Ping => Command::Ping,
            Cmd::Info => Command::Info,
            Cmd::Help => Command::Help,
            Cmd::Get { n } => Command::Get(ticklog::commands::Get { limit: Some(n) }),
            Cmd::Getall => Command::Get(ticklog::commands::Get { limit: None }),
            Cmd::Create { name } => Command::Create(name),
            Cmd::Use { name } => Command::Use(name),
            Cmd::Clear => Command::Clear(ticklog::commands::Scope::Current),
            Cmd::Flush => Command::Flush(ticklog::commands::Scope::Current),
            Cmd::Raw { line } => Command::Raw(line),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Error> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let args = Args::parse();
    let config = Config {
        addr: args.addr,
        ..Config::from_env()?
    };

    let client = Client::connect(config).await?;
    let frame = client.cmd(args.command.into()).await?;

    println!("{}", frame.text()?);

    if frame.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
