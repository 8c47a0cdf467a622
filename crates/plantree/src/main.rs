//! plantree - live tree of hierarchical planning documents.
//!
//! `plantree tree` prints the tree once; `plantree watch` keeps it in
//! sync with the file system and reprints on each refresh signal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use plantree::{
    Config, DocumentEnumerator, FrontmatterCache, ProgressCache, SyncController,
    TreeSnapshotBuilder, WalkEnumerator, watcher::DocWatcher,
};

#[derive(Debug, Parser)]
#[command(name = "plantree", about = "Live tree of hierarchical planning documents")]
struct Cli {
    /// Path to the config file (default: plantree.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current document tree once
    Tree {
        /// Documents root (overrides config)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Watch the documents root and reprint the tree on every refresh
    Watch {
        /// Documents root (overrides config)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tree { root } => tree(cli.config, root).await,
        Command::Watch { root } => watch(cli.config, root).await,
    }
}

fn setup(config: Option<PathBuf>, root: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let config_path = config.unwrap_or_else(|| PathBuf::from("plantree.yaml"));
    let config = Config::load(&config_path)?;
    let root = root.unwrap_or_else(|| config.root.clone());
    Ok((config, root))
}

async fn tree(config: Option<PathBuf>, root: Option<PathBuf>) -> Result<()> {
    let (config, root) = setup(config, root)?;
    let frontmatter = Arc::new(FrontmatterCache::new());
    let progress = Arc::new(ProgressCache::new(config.policy()));
    let builder = TreeSnapshotBuilder::new(Arc::clone(&frontmatter), Arc::clone(&progress));

    let documents = WalkEnumerator::new(&root).enumerate()?;
    for node in builder.build(&documents).await {
        println!("{}", node.summary());
    }
    Ok(())
}

async fn watch(config: Option<PathBuf>, root: Option<PathBuf>) -> Result<()> {
    let (config, root) = setup(config, root)?;
    let frontmatter = Arc::new(FrontmatterCache::new());
    let progress = Arc::new(ProgressCache::new(config.policy()));
    let builder = TreeSnapshotBuilder::new(Arc::clone(&frontmatter), Arc::clone(&progress));
    let enumerator = WalkEnumerator::new(&root);

    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel();
    let controller = Arc::new(SyncController::new(
        Arc::clone(&frontmatter),
        Arc::clone(&progress),
        Arc::new(refresh_tx),
    ));

    let (event_tx, event_rx) = mpsc::channel(16);
    let _watcher = DocWatcher::spawn(&root, event_tx)?;
    let runner = tokio::spawn(Arc::clone(&controller).run(event_rx));

    // Initial draw.
    controller.refresh_now();

    // Redraw on each refresh signal until the pipeline goes away.
    while let Some(signal) = refresh_rx.recv().await {
        debug!("refresh signal: {:?}", signal);
        let documents = enumerator.enumerate()?;
        let nodes = builder.build(&documents).await;
        println!();
        for node in &nodes {
            println!("{}", node.summary());
        }
    }

    runner.abort();
    Ok(())
}
