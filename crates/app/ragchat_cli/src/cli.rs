use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

#[derive(Parser, Debug)]
#[command(name = "ragchat", version, about = "Ingest documents and query the ragchat server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information.
    Version,

    /// Load, split, embed and store every file under a folder.
    Ingest {
        #[arg(long, env = "DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,

        /// Clear the collection before ingesting.
        #[arg(long)]
        reset: bool,
    },

    /// Show the chunks closest to a query.
    Search {
        query: String,

        #[arg(short, long, default_value_t = 3)]
        k: usize,
    },

    /// Ask a running server a question.
    Ask {
        question: String,

        #[arg(long, env = "RAGCHAT_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
    },

    /// Check that a server is up.
    Health {
        #[arg(long, env = "RAGCHAT_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
    },
}
