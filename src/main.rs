use anyhow::Context;
use clap::Parser;
use emmett::{commit_tracks, design_heater, init_logging, Config, Layer, MemoryBoard};
use std::path::PathBuf;

/// Design a serpentine PCB heater and write the board as JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML or JSON); the platform config file when omitted
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Board with its heater tracks, written as JSON
    #[arg(value_name = "OUTPUT", default_value = "heater.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config_path = match cli.config {
        Some(path) => path,
        None => emmett_settings::default_config_path()?,
    };

    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let design = design_heater(&config)?;

    let router_config = design.result.apply_to(&config.router_config());
    let planner = config.planner()?;
    let mut board = MemoryBoard::from_features(&router_config, planner.features());
    commit_tracks(&mut board, &design.layout.segments, Layer::FrontCopper)?;
    std::fs::write(&cli.output, board.to_json()?)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    tracing::info!(
        output = %cli.output.display(),
        summary = %serde_json::to_string(&design.summary)?,
        "wrote heater board"
    );
    Ok(())
}
