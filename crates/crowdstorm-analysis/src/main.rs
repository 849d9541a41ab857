//! Crowdstorm analysis CLI
//!
//! Runs the full pipeline: load, explore, test, plot, report.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crowdstorm_analysis::{data::Dataset, explore, inference, plots, report, Result};

#[derive(Parser)]
#[command(name = "crowdstorm")]
#[command(about = "Red-card / skin-tone analysis over the crowdstorming dataset", long_about = None)]
struct Cli {
    /// Input CSV path
    #[arg(long, default_value = "data/CrowdstormingDataJuly1st.csv")]
    data: PathBuf,

    /// Output path for the chart panel PNG
    #[arg(long, default_value = "redcard-analysis.png")]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> Result<()> {
    let dataset = Dataset::load(&cli.data)?;

    let exploration = explore::explore(&dataset)?;
    print!("{}", explore::render(&exploration));
    println!();

    let inference = inference::run(&dataset)?;
    print!("{}", inference::render(&inference));
    println!();

    plots::render_panel(&dataset, &exploration, &cli.output)?;
    info!("Chart panel saved to {}", cli.output.display());

    print!("{}", report::generate(&exploration, &inference));

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
