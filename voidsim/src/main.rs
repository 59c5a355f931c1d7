use voidsim::{ScenarioConfig, Scenario};
use voidsim::{bench_collisions, bench_progress_curve};

use clap::Parser;
use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "head_on.yaml")]
    file_name: String,

    /// Run the timing benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.bench {
        bench_collisions();
        bench_progress_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    let report = scenario.run()?;
    info!(
        slices = report.slices,
        impacts = report.impacts,
        elapsed = report.elapsed,
        "run finished"
    );

    let space = scenario.spacetime.space();
    for (handle, body) in scenario.spacetime.bodies() {
        let frame = body.frame();
        let polar = frame.position_polar(space);
        info!(
            %handle,
            position = ?frame.position(space),
            velocity = ?frame.velocity(space),
            rho = polar.rho,
            bearing = polar.theta,
            declination = polar.phi,
            "final state"
        );
    }

    Ok(())
}
