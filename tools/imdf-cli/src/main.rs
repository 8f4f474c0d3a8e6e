//! IMDF Builder CLI: save, inspect, and export indoor-map projects.
//!
//! Usage:
//!   imdf save <DATA_JSON> --name <NAME>   Store a project payload
//!   imdf list                             List stored projects
//!   imdf show <ID>                        Show a project summary
//!   imdf validate <ID>                    Check a project for dangling references
//!   imdf export <ID>                      Write an IMDF archive
//!   imdf upload <FILE>                    Store a floor-plan image

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use imdf_common::config::AppConfig;
use imdf_export_engine::ARCHIVE_FILE_NAME;

mod commands;

#[derive(Parser)]
#[command(
    name = "imdf",
    about = "Draw indoor maps and export them as IMDF archives",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding project records (overrides config)
    #[arg(long, global = true)]
    projects_dir: Option<PathBuf>,

    /// Directory holding uploaded floor plans (overrides config)
    #[arg(long, global = true)]
    uploads_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a project payload, creating or overwriting a record
    Save {
        /// JSON file holding the entity payload
        data: PathBuf,

        /// Project name
        #[arg(short, long)]
        name: String,

        /// Existing project id to overwrite
        #[arg(long)]
        id: Option<String>,
    },

    /// List stored projects, most recently updated first
    List,

    /// Show a project's summary and entity counts
    Show {
        /// Project id
        id: String,
    },

    /// Report dangling references and malformed geometry
    Validate {
        /// Project id
        id: String,
    },

    /// Export a stored project or a payload file as an IMDF archive
    Export {
        /// Project id
        #[arg(required_unless_present = "data", conflicts_with = "data")]
        id: Option<String>,

        /// JSON payload file to export instead of a stored project
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output archive path
        #[arg(short, long, default_value = ARCHIVE_FILE_NAME)]
        output: PathBuf,
    },

    /// Store a floor-plan image (PNG, JPEG, or PDF)
    Upload {
        /// File to upload
        file: PathBuf,

        /// Record the upload as this project's floor plan
        #[arg(long)]
        project: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    imdf_common::logging::init_logging(&config.logging);

    if let Some(dir) = cli.projects_dir {
        config.projects_dir = dir;
    }
    if let Some(dir) = cli.uploads_dir {
        config.uploads_dir = dir;
    }
    tracing::debug!(
        projects = %config.projects_dir.display(),
        uploads = %config.uploads_dir.display(),
        "Resolved data directories"
    );

    match cli.command {
        Commands::Save { data, name, id } => commands::save::run(&config, data, name, id),
        Commands::List => commands::list::run(&config),
        Commands::Show { id } => commands::show::run(&config, id),
        Commands::Validate { id } => commands::validate::run(&config, id),
        Commands::Export { id, data, output } => commands::export::run(&config, id, data, output),
        Commands::Upload { file, project } => commands::upload::run(&config, file, project),
    }
}
