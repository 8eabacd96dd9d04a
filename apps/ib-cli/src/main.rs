use clap::{Parser, Subcommand};
use ib_app::{AppResult, RunConfig, load_config};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ibflow")]
#[command(about = "Immersed-boundary flow solver", long_about = None)]
struct Cli {
    /// Raise log verbosity to debug (per-step output)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Integrate the flow described by a run file
    Run {
        /// Path to the run YAML file
        config: PathBuf,
        /// Override the number of steps
        #[arg(long)]
        steps: Option<u64>,
        /// Override the output directory
        #[arg(long)]
        outdir: Option<PathBuf>,
    },
    /// Validate a run file and build its model without stepping
    Check {
        /// Path to the run YAML file
        config: PathBuf,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    execute(cli.command)
}

fn execute(command: Commands) -> AppResult<()> {
    let result = match command {
        Commands::Run {
            config,
            steps,
            outdir,
        } => cmd_run(&config, steps, outdir),
        Commands::Check { config } => cmd_check(&config),
    };
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result
}

fn load_with_overrides(path: &Path, steps: Option<u64>, outdir: Option<PathBuf>) -> AppResult<RunConfig> {
    let mut config = load_config(path)?;
    if let Some(steps) = steps {
        config.steps = steps;
    }
    if let Some(dir) = outdir {
        config.output.dir = dir;
    }
    Ok(config)
}

fn cmd_run(path: &Path, steps: Option<u64>, outdir: Option<PathBuf>) -> AppResult<()> {
    let config = load_with_overrides(path, steps, outdir)?;
    println!("Running {} ({} steps)", config.name, config.steps);

    let summary = ib_app::run(&config)?;
    if summary.history_loaded {
        println!("✓ Resumed timestepper history");
    }
    println!("✓ Run completed in {:.2}s", summary.wall_time_s);
    println!("  Final step: {}", summary.final_timestep);
    println!("  Final time: {:.6}", summary.final_time);
    println!(
        "  Net force:  fx = {:.6e}, fy = {:.6e}",
        summary.net_force.0, summary.net_force.1
    );
    println!("  Outputs in: {}", config.output.dir.display());
    Ok(())
}

fn cmd_check(path: &Path) -> AppResult<()> {
    println!("Checking run file: {}", path.display());
    let config = load_config(path)?;
    let summary = ib_app::check(&config)?;
    println!("✓ Run file is valid");
    println!("  Model:  {}", summary.model);
    println!("  Scheme: {}", summary.scheme);
    println!("  Grid:   {} x {}", summary.nx, summary.ny);
    println!(
        "  Bodies: {} points ({})",
        summary.num_points,
        if summary.stationary { "stationary" } else { "moving" }
    );
    Ok(())
}
