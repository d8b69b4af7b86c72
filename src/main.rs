mod app;
mod config;
mod network;
mod util;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use config::{RelayoutPolicy, ViewConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON view configuration (camelCase keys).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of hosts in the generated network.
    #[arg(long)]
    nodes: Option<usize>,

    /// Initial infection stage, 0 to 5.
    #[arg(long)]
    stage: Option<u8>,

    /// Seed for the topology generator; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    relayout: Option<RelayoutPolicy>,
}

impl Args {
    fn view_config(&self) -> anyhow::Result<ViewConfig> {
        let mut config = match &self.config {
            Some(path) => ViewConfig::load(path)?,
            None => ViewConfig::default(),
        };

        if let Some(nodes) = self.nodes {
            config.node_count = nodes;
        }
        if let Some(stage) = self.stage {
            config.stage = stage;
        }
        if let Some(relayout) = self.relayout {
            config.relayout = relayout;
        }
        Ok(config.clamped())
    }
}

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let args = Args::parse();
    let config = args.view_config().context("invalid view configuration")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "topology seed (pass --seed to reproduce)");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1560.0, 780.0]),
        ..Default::default()
    };

    eframe::run_native(
        "netspread",
        options,
        Box::new(move |cc| Ok(Box::new(app::NetworkApp::new(cc, config, seed)))),
    )
    .map_err(|error| anyhow::anyhow!("failed to run the viewer: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_and_clamp() {
        let args = Args::try_parse_from([
            "netspread",
            "--nodes",
            "12",
            "--stage",
            "8",
            "--relayout",
            "incremental",
        ])
        .expect("parse args");
        let config = args.view_config().expect("config");

        assert_eq!(config.node_count, 12);
        assert_eq!(config.stage, 5);
        assert_eq!(config.relayout, RelayoutPolicy::Incremental);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let args = Args::try_parse_from(["netspread", "--config", "/nonexistent/view.json"])
            .expect("parse args");
        assert!(args.view_config().is_err());
    }
}
