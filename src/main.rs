use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::error;

use tractmerge::config::{
    log_filter, DEFAULT_CSV, DEFAULT_DISTRICTS, DEFAULT_MISSING_LIST, DEFAULT_OUTPUT,
    TIGER_2020_NY_TRACTS,
};
use tractmerge::tiger::TigerTracts;
use tractmerge::{report, tasks, Paths};

#[derive(Parser)]
#[command(name = "tractmerge", version, about = "NYC census tract data preparation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare the ACS extract with the tract geometry dataset
    Validate {
        #[command(flatten)]
        inputs: Inputs,
        /// Also write every mismatch to this CSV file
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },
    /// Add placeholder features for tracts missing from the geometry dataset
    Update {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, env = "TRACTMERGE_MISSING_LIST", default_value = DEFAULT_MISSING_LIST)]
        missing_list: PathBuf,
    },
    /// Backfill geometry for the tracts on the missing list from TIGER/Line
    FetchGeometry {
        #[arg(long, env = "TRACTMERGE_DISTRICTS", default_value = DEFAULT_DISTRICTS)]
        districts: PathBuf,
        #[arg(long, env = "TRACTMERGE_MISSING_LIST", default_value = DEFAULT_MISSING_LIST)]
        missing_list: PathBuf,
        /// Zipped shapefile to download
        #[arg(long, env = "TRACTMERGE_TIGER_URL", default_value = TIGER_2020_NY_TRACTS)]
        url: String,
    },
    /// Merge demographics into the geometry and write the TypeScript module
    Merge {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, env = "TRACTMERGE_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct Inputs {
    /// ACS S0101 extract
    #[arg(long, env = "TRACTMERGE_CSV", default_value = DEFAULT_CSV)]
    csv: PathBuf,
    /// Tract geometry feature collection
    #[arg(long, env = "TRACTMERGE_DISTRICTS", default_value = DEFAULT_DISTRICTS)]
    districts: PathBuf,
}

impl Inputs {
    fn paths(self) -> Paths {
        Paths {
            csv: self.csv,
            districts: self.districts,
            ..Paths::default()
        }
    }
}

async fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Validate {
            inputs,
            report: mismatch_csv,
        } => {
            let paths = inputs.paths();
            let validation = tasks::validate(&paths)?;
            report::validation(&validation);
            if let Some(path) = mismatch_csv {
                report::write_mismatches(&path, &validation)?;
                println!("\nMismatches written to {}", path.display());
            }
            Ok(ExitCode::from(validation.exit_status()))
        }
        Command::Update {
            inputs,
            missing_list,
        } => {
            let paths = Paths {
                missing_list,
                ..inputs.paths()
            };
            report::banner("Census Districts Updater");
            let outcome = tasks::update(&paths)?;
            report::update(&outcome, &paths.districts, &paths.missing_list);
            Ok(ExitCode::SUCCESS)
        }
        Command::FetchGeometry {
            districts,
            missing_list,
            url,
        } => {
            let paths = Paths {
                districts,
                missing_list,
                ..Paths::default()
            };
            report::banner("Census Geometry Data Fetcher");
            let outcome = tasks::fetch_geometry(&paths, &TigerTracts { url }).await?;
            report::fetch(&outcome, &paths.districts);
            Ok(ExitCode::SUCCESS)
        }
        Command::Merge { inputs, output } => {
            let paths = Paths {
                output,
                ..inputs.paths()
            };
            report::banner("Census Tracts TypeScript Generator");
            let summary = tasks::merge(&paths)?;
            report::merge(&summary, &paths.output);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
