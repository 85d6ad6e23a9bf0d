use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use property_etl::config::Config;
use property_etl::explore;
use property_etl::metrics;
use property_etl::pipeline::{Pipeline, PipelineResult};

#[derive(Parser)]
#[command(name = "property_etl")]
#[command(about = "Clean scraped real-estate listings into an analysis-ready table")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathOverrides {
    /// JSON Lines file with raw listings
    #[arg(long)]
    source: Option<PathBuf>,
    /// SQLite database file to write
    #[arg(long)]
    database: Option<PathBuf>,
    /// Output table name (replaced on every run)
    #[arg(long)]
    table: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, transform and load into the output table
    Run {
        #[command(flatten)]
        paths: PathOverrides,
    },
    /// Extract and transform only; print clean rows as JSON Lines
    Transform {
        #[command(flatten)]
        paths: PathOverrides,
    },
    /// List tables, schemas and sample rows of the database
    Explore {
        #[arg(long)]
        database: Option<PathBuf>,
        /// Skip writing <table>.csv with the distinct rows of each table
        #[arg(long)]
        no_export_csv: bool,
    },
    /// Remove previous outputs, run the pipeline, export the CSV
    Reset {
        #[command(flatten)]
        paths: PathOverrides,
    },
}

impl PathOverrides {
    fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.pipeline.source_file = source.clone();
        }
        if let Some(database) = &self.database {
            config.pipeline.database_file = database.clone();
        }
        if let Some(table) = &self.table {
            config.pipeline.table_name = table.clone();
        }
    }
}

fn print_result(result: &PipelineResult) {
    println!("\n📊 Pipeline Results for {}:", result.source);
    println!("   Total records: {}", result.total_records);
    println!("   Retained: {}", result.retained_records);
    println!("   Rejected: {}", result.rejected_records);
    println!("   Duplicates dropped: {}", result.duplicate_records);
    println!("   Unparseable prices: {}", result.unparseable_prices);
    println!("   Table: {} ({})", result.table, result.location);
}

fn run_pipeline(config: &Config) -> anyhow::Result<PipelineResult> {
    let mut pipeline = Pipeline::from_config(config);
    let result = pipeline
        .run()
        .with_context(|| format!("pipeline run for {}", config.pipeline.source_file.display()))?;
    print_result(&result);
    Ok(result)
}

fn explore_database(db_path: &Path, export_csv: bool) -> anyhow::Result<Vec<explore::TableSummary>> {
    let export_dir = export_csv.then_some(Path::new("."));
    let summaries = explore::explore(db_path, export_dir)
        .with_context(|| format!("exploring {}", db_path.display()))?;
    println!("Connected to database.\n");
    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    println!("Tables in the database: {:?}\n", names);
    for summary in &summaries {
        println!("{}", explore::render_summary(summary));
        if let Some((path, rows)) = &summary.export {
            println!("Exported {} rows to: {}", rows, path.display());
        }
    }
    Ok(summaries)
}

fn remove_if_exists(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        std::fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
        println!("Removed existing {}", path.display());
    } else {
        println!("No existing {} to remove.", path.display());
    }
    Ok(())
}

fn reset(config: &Config) -> anyhow::Result<()> {
    let csv_path = PathBuf::from(format!("{}.csv", config.pipeline.table_name));
    remove_if_exists(&config.pipeline.database_file)?;
    remove_if_exists(&csv_path)?;

    println!("Running ETL pipeline...");
    run_pipeline(config)?;

    println!("Exporting CSV...");
    explore_database(&config.pipeline.database_file, true)?;

    match std::fs::metadata(&csv_path) {
        Ok(meta) => println!("Export complete: {} ({} bytes)", csv_path.display(), meta.len()),
        Err(_) => warn!("CSV file was not created: {}", csv_path.display()),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let _guard = property_etl::logging::init_logging(&config.pipeline.log_dir);
    if config.pipeline.metrics_textfile.is_some() {
        metrics::init_metrics();
    }

    match &cli.command {
        Commands::Run { paths } => {
            paths.apply(&mut config);
            config.validate()?;
            run_pipeline(&config)?;
        }
        Commands::Transform { paths } => {
            paths.apply(&mut config);
            config.validate()?;
            let output = Pipeline::from_config(&config).preview()?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for record in &output.records {
                serde_json::to_writer(&mut out, record)?;
                writeln!(out)?;
            }
            info!("Dry run complete, nothing persisted");
        }
        Commands::Explore { database, no_export_csv } => {
            let db_path = database.clone().unwrap_or_else(|| config.pipeline.database_file.clone());
            explore_database(&db_path, config.pipeline.export_csv && !*no_export_csv)?;
            println!("Done.");
        }
        Commands::Reset { paths } => {
            paths.apply(&mut config);
            config.validate()?;
            println!("Starting full reset and ETL run...\n");
            reset(&config)?;
            println!("\nDone.");
        }
    }

    if let Some(path) = &config.pipeline.metrics_textfile {
        metrics::write_textfile(path)?;
    }
    Ok(())
}
