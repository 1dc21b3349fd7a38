// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};

mod cli;
mod commands;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = Cli::parse();

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            println!("ragchat_core {}", ragchat_core::version());
        }
        command => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(dispatch(command))?;
        }
    }

    Ok(())
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Version => Ok(()),
        Commands::Ingest { data_dir, reset } => commands::ingest(&data_dir, reset).await,
        Commands::Search { query, k } => commands::search(&query, k).await,
        Commands::Ask { question, server } => commands::ask(&server, &question).await,
        Commands::Health { server } => commands::health(&server).await,
    }
}
