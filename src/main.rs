use anyhow::{Context, Result};
use forest_trade_equilibrium::domain::WorldInput;
use forest_trade_equilibrium::{telemetry, Config, Simulation};
use std::path::{Path, PathBuf};
use telemetry::init_tracing;
use tracing::{info, warn};

fn read_input(path: &Path) -> Result<WorldInput> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading input {}", path.display()))?;
    let input = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&raw).context("parsing YAML input")?,
        _ => serde_json::from_str(&raw).context("parsing JSON input")?,
    };
    Ok(input)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::load()?;
    init_tracing(cfg.model.verbose);

    let mut args = std::env::args().skip(1);
    let input_path: PathBuf = args
        .next()
        .or_else(|| std::env::var("FTE_INPUT").ok())
        .context("input file required: pass a path or set FTE_INPUT")?
        .into();
    let output_path: PathBuf = args
        .next()
        .or_else(|| std::env::var("FTE_OUTPUT").ok())
        .unwrap_or_else(|| "output.json".to_string())
        .into();

    let input = read_input(&input_path)?;
    info!(input = %input_path.display(), "starting forest trade equilibrium run");

    let mut simulation = Simulation::new(cfg, &input)?;
    let output = simulation.run();
    if let Some(failure) = &output.failure {
        warn!(period = failure.period, message = %failure.message, "run stopped early");
    }

    let json = serde_json::to_string_pretty(&output)?;
    std::fs::write(&output_path, json).with_context(|| format!("writing output {}", output_path.display()))?;
    info!(output = %output_path.display(), periods = output.periods_completed, "run complete");
    Ok(())
}
