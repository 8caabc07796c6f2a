//! Index command - embeds local text files into the document store

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};
use tracing::info;

use crate::api::state::IndexingServiceTrait;

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Text files to index; each file becomes one document
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub async fn run(args: IndexArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = crate::create_app_state(&config).await?;

    let indexed = index_files(state.indexer.as_ref(), &args.files).await?;

    info!(indexed = indexed, files = args.files.len(), "Indexing complete");

    Ok(())
}

/// Read every file up front so a bad path aborts before any embedding call
pub async fn index_files(
    indexer: &dyn IndexingServiceTrait,
    files: &[PathBuf],
) -> anyhow::Result<usize> {
    let mut documents = Vec::with_capacity(files.len());
    let mut metadata = Vec::with_capacity(files.len());

    for path in files {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        documents.push(content);
        metadata.push(source_metadata(path));
    }

    Ok(indexer.index_documents(documents, Some(metadata)).await?)
}

fn source_metadata(path: &Path) -> Value {
    json!({ "source": path.display().to_string() })
}
