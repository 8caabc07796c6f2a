//! Command-line entry points
//!
//! - `serve`: run the HTTP API
//! - `index`: embed text files into the document store

pub mod index;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// RAG cache gateway - cached retrieval-augmented answers over HTTP
#[derive(Parser)]
#[command(name = "rag-cache-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Index text files, one document per file
    Index(index::IndexArgs),
}

/// Load `.env`, layered configuration and the log subscriber
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["rag-cache-gateway", "serve"]).unwrap();

        assert!(matches!(cli.command, Command::Serve));
    }

    #[test]
    fn test_parse_index_files() {
        let cli = Cli::try_parse_from(["rag-cache-gateway", "index", "a.txt", "docs/b.md"]).unwrap();

        let Command::Index(args) = cli.command else {
            panic!("expected index command");
        };
        assert_eq!(args.files, vec![PathBuf::from("a.txt"), PathBuf::from("docs/b.md")]);
    }

    #[test]
    fn test_index_requires_files() {
        assert!(Cli::try_parse_from(["rag-cache-gateway", "index"]).is_err());
    }
}
