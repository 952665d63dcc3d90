use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use geoone_cli::commands::{self, PlanOverrides};
use geoone_cli::io::{read_json, write_report, ParcelsInput, ShapeInput};
use geoone_cli::Config;
use geoone_core::CancelFlag;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "geoone", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a back-and-forth survey flight over a terrain polygon
    Plan {
        /// Terrain polygon JSON file
        #[arg(long)]
        terrain: PathBuf,

        /// Flight altitude in meters
        #[arg(long)]
        altitude: Option<f64>,

        /// Focal length in meters
        #[arg(long)]
        focal: Option<f64>,

        /// Sensor width in meters
        #[arg(long)]
        sensor_width: Option<f64>,

        /// Sensor height in meters
        #[arg(long)]
        sensor_height: Option<f64>,

        /// Lateral overlap fraction in [0.60, 1.0)
        #[arg(long)]
        lateral_overlap: Option<f64>,

        /// Frontal overlap fraction in [0.60, 1.0)
        #[arg(long)]
        frontal_overlap: Option<f64>,

        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Draw interior-angle arcs at each polygon vertex
    Angles {
        #[arg(long)]
        polygon: PathBuf,

        /// Arc radius in meters
        #[arg(long)]
        distance: Option<f64>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Split parcels along a buffered river line
    Split {
        #[arg(long)]
        parcels: PathBuf,

        #[arg(long)]
        river: PathBuf,

        /// Buffer half width in meters
        #[arg(long)]
        distance: Option<f64>,

        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.log_json)?;

    let cancel = CancelFlag::new();
    match cli.command {
        Command::Plan {
            terrain,
            altitude,
            focal,
            sensor_width,
            sensor_height,
            lateral_overlap,
            frontal_overlap,
            output,
        } => {
            let terrain: ShapeInput = read_json(&terrain)?;
            let overrides = PlanOverrides {
                altitude_m: altitude,
                focal_length_m: focal,
                sensor_width_m: sensor_width,
                sensor_height_m: sensor_height,
                lateral_overlap,
                frontal_overlap,
            };
            let report = commands::plan(&terrain, &config.planner, &overrides, &cancel)?;
            write_report(&report, output.as_deref(), config.pretty)
        }
        Command::Angles {
            polygon,
            distance,
            output,
        } => {
            let polygon: ShapeInput = read_json(&polygon)?;
            let report = commands::angles(&polygon, &config.planner, distance, &cancel)?;
            write_report(&report, output.as_deref(), config.pretty)
        }
        Command::Split {
            parcels,
            river,
            distance,
            output,
        } => {
            let parcels: ParcelsInput = read_json(&parcels)?;
            let river: ShapeInput = read_json(&river)?;
            let report = commands::split(&parcels, &river, &config.planner, distance, &cancel)?;
            write_report(&report, output.as_deref(), config.pretty)
        }
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("geoone=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}
