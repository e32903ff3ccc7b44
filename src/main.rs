use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use pgrev::commands::{self, OutputFormat};
use pgrev::config::{self, ConfigInput};
use pgrev::constants::CONFIG_FILENAME;
use pgrev::procedure::ProcedureRegistry;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config_file: String,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Declare the version the schema is currently at, discarding ledger history
    Baseline {
        /// Version to record, e.g. 1.0 or v2_1
        #[arg(value_name = "VERSION")]
        baseline_version: String,

        /// Description stored with the baseline record
        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        database_args: config::DatabaseArgs,
    },

    /// Show the current version and its recorded migrations
    Info {
        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,

        #[command(flatten)]
        database_args: config::DatabaseArgs,
    },

    /// Apply pending migrations
    ///
    /// This binary registers no procedures, so `.rs` migrations are recorded as failed.
    /// Run them from a binary that builds its registry and calls `cmd_migrate`.
    Migrate {
        /// Only apply migrations at exactly this version
        #[arg(value_name = "VERSION")]
        target_version: Option<String>,

        #[command(flatten)]
        database_args: config::DatabaseArgs,

        #[command(flatten)]
        directory_args: config::DirectoryArgs,
    },

    /// Re-run failed migrations
    Repair {
        #[command(flatten)]
        database_args: config::DatabaseArgs,

        #[command(flatten)]
        directory_args: config::DirectoryArgs,
    },

    /// Drop the revision ledger
    Clean {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        database_args: config::DatabaseArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);
    run_main(cli).await
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn resolve_config(file_config: ConfigInput, cli_config: ConfigInput) -> Result<config::Config> {
    config::ConfigBuilder::new()
        .with_file(file_config)
        .with_cli_args(cli_config)
        .resolve()
}

async fn run_main(cli: Cli) -> Result<()> {
    let (file_config, root_dir) = config::load_config(&cli.config_file)?;
    let root_dir: &Path = &root_dir;

    match cli.command {
        Commands::Baseline {
            baseline_version,
            description,
            database_args,
        } => {
            let config = resolve_config(file_config, database_args.into())?;

            info!("Baselining target database at version {}", baseline_version);
            commands::cmd_baseline(&config, &baseline_version, description.as_deref()).await
        }
        Commands::Info {
            format,
            database_args,
        } => {
            let config = resolve_config(file_config, database_args.into())?;

            info!("Reading revision ledger");
            commands::cmd_info(&config, format).await
        }
        Commands::Migrate {
            target_version,
            database_args,
            directory_args,
        } => {
            let cli_config = ConfigInput {
                directories: Some(directory_args.into()),
                ..ConfigInput::from(database_args)
            };
            let config = resolve_config(file_config, cli_config)?;

            commands::cmd_migrate(
                &config,
                root_dir,
                target_version.as_deref(),
                &ProcedureRegistry::default(),
            )
            .await
        }
        Commands::Repair {
            database_args,
            directory_args,
        } => {
            let cli_config = ConfigInput {
                directories: Some(directory_args.into()),
                ..ConfigInput::from(database_args)
            };
            let config = resolve_config(file_config, cli_config)?;

            info!("Repairing failed migrations");
            commands::cmd_repair(&config, root_dir, &ProcedureRegistry::default()).await
        }
        Commands::Clean {
            force,
            database_args,
        } => {
            let config = resolve_config(file_config, database_args.into())?;

            commands::cmd_clean(&config, force).await
        }
    }
}
