mod channel;
mod cli;
mod config;
mod demo;
mod render;

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::Parser;
use graphview::{APPEAR_DURATION, LayoutEngine, ProofGraph, SessionState};
use tracing_subscriber::EnvFilter;

use crate::channel::{EventChannel, Source};
use crate::cli::{Cli, Command, RenderArgs};
use crate::config::ViewerConfig;
use crate::demo::DemoConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        Command::Replay { input, render } => {
            let source = if input == Path::new("-") {
                Source::Stdin
            } else {
                Source::File(input)
            };
            smol::block_on(run(config, source, render))
        }
        Command::Demo {
            seed,
            depth,
            max_nodes,
            delay_ms,
            emit,
            render,
        } => {
            let demo = DemoConfig {
                seed,
                max_level: depth,
                max_nodes,
                delay: Duration::from_millis(delay_ms),
                ..DemoConfig::default()
            };
            if let Some(path) = emit {
                let count = demo::write_jsonl(&demo, &path)?;
                tracing::info!(path = %path.display(), count, "demo messages written");
            }
            smol::block_on(run(config, Source::Demo(demo), render))
        }
    }
}

async fn run(config: ViewerConfig, source: Source, args: RenderArgs) -> Result<()> {
    let mut container = config.container;
    if let Some(width) = args.width {
        container.width = width;
    }
    if let Some(height) = args.height {
        container.height = height;
    }

    let mut graph = ProofGraph::new(LayoutEngine::new(config.layout)?, config.zoom, container);
    graph.start_session();
    let channel = EventChannel::open(source).await?;
    graph.channel_ready();

    while let Some(event) = channel.next().await {
        if let Ok(applied) = graph.ingest(event) {
            tracing::trace!(?applied, "event applied");
        }
        if !graph.session().is_active() {
            break;
        }
    }
    // after complete/error nothing more is expected, but the source may stay open
    let delivered = if graph.session().is_active() {
        tracing::warn!("stream ended before the analysis completed");
        Some(channel.finish().await?)
    } else {
        channel.cancel().await?
    };
    tracing::info!(
        delivered = ?delivered,
        nodes = graph.model().size(),
        rejected = graph.rejected(),
        "stream closed"
    );

    // snapshot shows the settled view
    graph.tick(Instant::now() + APPEAR_DURATION);
    if let Some(id) = &args.select {
        if !graph.select_node(id) {
            tracing::warn!(id = id.as_str(), "no node to select");
        }
    }
    render::save(&graph, &args.output)?;

    println!("{}", graph.status().text);
    if let SessionState::Failed(message) = graph.session() {
        bail!("analysis failed: {message}");
    }
    Ok(())
}
