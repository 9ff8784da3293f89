mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hoard_core::kernel::bootstrap::Application;
use hoard_core::persistence::UnitId;
use log::{error, info};

/// Hoard: offline maintenance for storage unit records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Data directory holding `config/` and the record directory
    #[arg(long, short = 'd', default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every storage unit with its fill metrics
    Inspect,
    /// Print one display page of a unit
    Page {
        /// Unit id (the record file stem)
        id: String,
        /// Zero-based page index
        #[arg(long, short = 'p', default_value_t = 0)]
        page: u32,
    },
    /// Reload every record and save it back in the current format
    Migrate,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn load(data_dir: &Path) -> hoard_core::kernel::Result<Application> {
    if !data_dir.is_dir() {
        return Err(format!("Data directory '{}' does not exist", data_dir.display()).into());
    }
    let mut app = Application::new(data_dir).await?;
    app.initialize().await?;
    Ok(app)
}

async fn run(args: CliArgs) -> hoard_core::kernel::Result<ExitCode> {
    match args.command {
        Commands::Inspect => {
            let app = load(&args.data_dir).await?;
            let registry = app.registry();
            println!("{} storage units", registry.len());
            for id in registry.ids() {
                if let Some(unit) = registry.get(&id) {
                    println!("{}", cli::unit_line(&unit.lock()));
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Page { id, page } => {
            let id: UnitId = id.parse()?;
            let app = load(&args.data_dir).await?;
            let registry = app.registry();
            let pages = registry.page_count(&id)?;
            let slots = registry.display_page(&id, page)?;
            println!("Unit {} page {}/{}", id, page.saturating_add(1), pages.max(1));
            for line in cli::page_lines(&slots) {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Migrate => {
            let mut app = load(&args.data_dir).await?;
            let loaded = app.registry().len();
            let report = app.shutdown().await?;
            info!("Migration finished");
            println!(
                "Migrated {} storage units ({} written, {} failed)",
                loaded,
                report.attempted - report.failed,
                report.failed
            );
            if report.is_clean() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
