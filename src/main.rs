use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod allocator;
mod config;
mod db;
mod error;
mod logging;
mod models;
mod pipeline;
mod progression;
mod report;
mod source;
mod workbook;

use allocator::Paging;
use config::{RunConfig, RunSettings};
use error::PipelineError;
use models::Day;
use source::RosterSource;

#[derive(Parser)]
#[command(name = "prereg-report")]
#[command(about = "Next level pre-registration report for swim lessons", long_about = None)]
struct Cli {
    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the roster database schema
    InitDb,
    /// Load a sample roster
    Seed,
    /// Import a roster CSV export into the database
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        sheet: String,
        #[arg(long, value_enum)]
        day: Day,
    },
    /// List roster sheets stored in the database
    Sheets,
    /// Show the next level for a single student
    Resolve {
        #[arg(long)]
        level: String,
        #[arg(long)]
        pass_fail: i64,
        #[arg(long, default_value_t = 0)]
        age: i64,
    },
    /// Resolve a roster and write the templated workbook
    Report(ReportArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// TOML file with defaults for the options below
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    sheet: Option<String>,
    #[arg(long, value_enum)]
    day: Option<Day>,
    /// Read the roster from a CSV export instead of the database
    #[arg(long)]
    csv: Option<PathBuf>,
    #[arg(long)]
    template: Option<PathBuf>,
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also write a markdown summary here
    #[arg(long)]
    summary: Option<PathBuf>,
    #[arg(long, value_enum)]
    paging: Option<Paging>,
}

impl ReportArgs {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        let base = match &self.config {
            Some(path) => RunSettings::load(path)?,
            None => RunSettings::default(),
        };
        let cli = RunSettings {
            sheet: self.sheet,
            day: self.day,
            csv: self.csv,
            template: self.template,
            output: self.out,
            summary: self.summary,
            paging: self.paging,
        };
        RunConfig::try_from(cli.over(base))
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = config::database_url()?;
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            let inserted = db::seed(&pool).await?;
            println!("Seeded {inserted} roster rows.");
        }
        Commands::Import { csv, sheet, day } => {
            let pool = connect().await?;
            let imported = db::import_csv(&pool, &csv, &sheet, day).await?;
            println!("Imported {imported} rows from {} into {sheet} ({day}).", csv.display());
        }
        Commands::Sheets => {
            let pool = connect().await?;
            let sheets = db::list_sheets(&pool).await?;
            if sheets.is_empty() {
                println!("No roster sheets stored yet.");
                return Ok(());
            }
            for sheet in sheets {
                println!("- {sheet}");
            }
        }
        Commands::Resolve {
            level,
            pass_fail,
            age,
        } => {
            let next = progression::resolve(&level, pass_fail, age)
                .with_context(|| format!("cannot resolve {level:?}"))?;
            println!("{next}");
        }
        Commands::Report(args) => {
            let config = args.into_config()?;
            run_report(&config).await?;
        }
    }

    Ok(())
}

async fn run_report(config: &RunConfig) -> anyhow::Result<()> {
    let source = match &config.csv {
        Some(path) => RosterSource::Csv(path.clone()),
        None => RosterSource::Database(connect().await?),
    };

    println!("Importing roster for {} ({})...", config.sheet_name, config.day);
    let rows = source
        .fetch_rows(&config.sheet_name, config.day)
        .await
        .context("could not load the roster; nothing was written")?;

    println!("Resolving next levels for {} students...", rows.len());
    let records = match pipeline::resolve_rows(&rows) {
        Ok(records) => records,
        Err(PipelineError::InvalidRecords(failures)) => {
            for failure in &failures {
                eprintln!("- row {} ({}): {}", failure.row, failure.name, failure.error);
            }
            anyhow::bail!(PipelineError::InvalidRecords(failures));
        }
    };

    let pages = allocator::allocate(&records, config.paging);
    println!("Exporting {} pages to {}...", pages.len(), config.output.display());
    workbook::write_report(&pages, &config.template, &config.output)?;

    if let Some(summary_path) = &config.summary {
        let summary = report::build_report(
            &config.sheet_name,
            config.day,
            chrono::Local::now().date_naive(),
            &records,
            &pages,
        );
        std::fs::write(summary_path, summary)
            .with_context(|| format!("failed to write summary {}", summary_path.display()))?;
        println!("Summary written to {}.", summary_path.display());
    }

    println!("Report written to {}.", config.output.display());
    Ok(())
}
