use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod db;
mod importer;
mod insights;
mod kpis;
mod loader;
mod models;
mod report;

use insights::InsightConfig;
use models::{DashboardFilter, Insight, SellerChanges, SellerRecord};

#[derive(Parser)]
#[command(name = "sales-insights")]
#[command(about = "Automated insights for daily sales datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScopeArgs {
    /// Dataset id; defaults to the most recent import
    #[arg(long)]
    dataset: Option<Uuid>,
    #[arg(long)]
    start: Option<NaiveDate>,
    #[arg(long)]
    end: Option<NaiveDate>,
    #[arg(long)]
    seller: Option<Uuid>,
}

#[derive(Args)]
struct ThresholdArgs {
    /// Percentage below the period average that flags a 7-day drop
    #[arg(long)]
    drop_threshold: Option<f64>,
    /// Percentage difference that makes month-end seasonality notable
    #[arg(long)]
    seasonality_threshold: Option<f64>,
}

impl ThresholdArgs {
    fn config(&self) -> InsightConfig {
        InsightConfig::with_overrides(self.drop_threshold, self.seasonality_threshold)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Import sales records from a CSV file as a new dataset
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Import the bundled demo dataset when the database has no datasets
    Seed,
    /// List imported datasets
    Datasets,
    /// Rename a dataset or change its status
    UpdateDataset {
        #[arg(long)]
        dataset: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a dataset and all of its records
    DeleteDataset {
        #[arg(long)]
        dataset: Uuid,
    },
    /// Manage sellers
    Sellers {
        #[command(subcommand)]
        command: SellerCommands,
    },
    /// Link a record to a seller, or unlink it
    #[command(group(
        ArgGroup::new("target")
            .args(["seller", "unassign"])
            .required(true)
            .multiple(false)
    ))]
    AssignRecord {
        #[arg(long)]
        record: i64,
        #[arg(long)]
        seller: Option<Uuid>,
        #[arg(long)]
        unassign: bool,
    },
    /// Print insights for a dataset
    Insights {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        thresholds: ThresholdArgs,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        thresholds: ThresholdArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Run the insight engine on local files, without a database
    #[command(group(
        ArgGroup::new("source")
            .args(["input", "series"])
            .required(true)
            .multiple(false)
    ))]
    Analyze {
        /// Dashboard JSON with `series` and `seller_ranking`
        #[arg(long)]
        input: Option<PathBuf>,
        /// CSV with `date,value` columns
        #[arg(long)]
        series: Option<PathBuf>,
        /// CSV with seller ranking rows
        #[arg(long, requires = "series")]
        sellers: Option<PathBuf>,
        #[command(flatten)]
        thresholds: ThresholdArgs,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SellerCommands {
    List {
        /// Case-insensitive name search
        #[arg(long)]
        query: Option<String>,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        inactive: bool,
    },
    Update {
        #[arg(long)]
        seller: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_region")]
        region: Option<String>,
        #[arg(long)]
        clear_region: bool,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        #[arg(long)]
        seller: Uuid,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn scoped_filter(pool: &PgPool, scope: &ScopeArgs) -> anyhow::Result<(DashboardFilter, String)> {
    let dataset = db::resolve_dataset(pool, scope.dataset).await?;
    info!(dataset_id = %dataset.id, name = %dataset.name, "using dataset");

    let filter = DashboardFilter {
        dataset_id: dataset.id,
        start: scope.start,
        end: scope.end,
        seller_id: scope.seller,
    };
    filter.validate()?;
    Ok((filter, dataset.name))
}

fn print_seller(seller: &SellerRecord) {
    println!(
        "- {} {} ({}){}",
        seller.id,
        seller.name,
        seller.region.as_deref().unwrap_or("no region"),
        if seller.is_active { "" } else { " inactive" }
    );
}

async fn run_seller_command(pool: &PgPool, command: SellerCommands) -> anyhow::Result<()> {
    match command {
        SellerCommands::List { query } => {
            let sellers = db::list_sellers(pool, query.as_deref()).await?;
            if sellers.is_empty() {
                println!("No sellers found.");
            }
            for seller in &sellers {
                print_seller(seller);
            }
        }
        SellerCommands::Create {
            name,
            region,
            inactive,
        } => {
            let name = models::clean_seller_name(&name)?;
            let region = models::clean_region(region.as_deref());
            let seller = db::create_seller(pool, &name, region.as_deref(), !inactive).await?;
            info!(seller_id = %seller.id, "seller created");
            print_seller(&seller);
        }
        SellerCommands::Update {
            seller,
            name,
            region,
            clear_region,
            active,
        } => {
            let changes = SellerChanges {
                name: name.as_deref().map(models::clean_seller_name).transpose()?,
                region: if clear_region {
                    Some(None)
                } else {
                    region.as_deref().map(|r| models::clean_region(Some(r)))
                },
                is_active: active,
            };
            let seller = db::update_seller(pool, seller, &changes).await?;
            info!(seller_id = %seller.id, "seller updated");
            print_seller(&seller);
        }
        SellerCommands::Delete { seller } => {
            db::delete_seller(pool, seller).await?;
            info!(seller_id = %seller, "seller deleted");
            println!("Seller {seller} deleted.");
        }
    }
    Ok(())
}

fn print_insights(insights: &[Insight], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(insights)?);
    } else {
        print!("{}", report::render_insights(insights));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Import { csv, name } => {
            let reader = csv::Reader::from_path(&csv)
                .with_context(|| format!("failed to open {}", csv.display()))?;
            let rows = importer::parse_sales_csv(reader)
                .with_context(|| format!("failed to import {}", csv.display()))?;

            let file_name = csv.file_name().map(|f| f.to_string_lossy().into_owned());
            let name = name.unwrap_or_else(|| {
                format!("Upload - {}", file_name.as_deref().unwrap_or("dataset"))
            });

            let pool = connect().await?;
            let dataset_id = db::import_rows(&pool, &name, file_name.as_deref(), &rows).await?;
            println!("Imported {} rows into dataset {dataset_id}.", rows.len());
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            match db::seed_if_empty(&pool).await? {
                Some(dataset_id) => println!("Seeded demo dataset {dataset_id}."),
                None => println!("Datasets already exist; nothing seeded."),
            }
        }
        Commands::UpdateDataset {
            dataset,
            name,
            status,
        } => {
            anyhow::ensure!(
                name.is_some() || status.is_some(),
                "nothing to update: pass --name or --status"
            );
            let name = name.as_deref().map(str::trim);
            anyhow::ensure!(name != Some(""), "dataset name must not be empty");
            let status = status.as_deref().map(models::clean_dataset_status).transpose()?;

            let pool = connect().await?;
            let updated = db::update_dataset(&pool, dataset, name, status.as_deref()).await?;
            info!(dataset_id = %updated.id, "dataset updated");
            println!("Dataset {} is now {} [{}].", updated.id, updated.name, updated.status);
        }
        Commands::DeleteDataset { dataset } => {
            let pool = connect().await?;
            db::delete_dataset(&pool, dataset).await?;
            info!(dataset_id = %dataset, "dataset deleted");
            println!("Dataset {dataset} deleted.");
        }
        Commands::Sellers { command } => {
            let pool = connect().await?;
            run_seller_command(&pool, command).await?;
        }
        Commands::AssignRecord {
            record,
            seller,
            unassign,
        } => {
            let seller = if unassign { None } else { seller };
            let pool = connect().await?;
            db::assign_record_seller(&pool, record, seller).await?;
            match seller {
                Some(seller) => println!("Record {record} assigned to seller {seller}."),
                None => println!("Record {record} no longer has a seller."),
            }
        }
        Commands::Datasets => {
            let pool = connect().await?;
            let datasets = db::list_datasets(&pool).await?;
            if datasets.is_empty() {
                println!("No datasets imported yet.");
                return Ok(());
            }

            for dataset in datasets {
                let range = match (dataset.date_min, dataset.date_max) {
                    (Some(min), Some(max)) => format!("{min} to {max}"),
                    _ => "no dates".to_string(),
                };
                println!(
                    "- {} {} [{}] {} rows, {} (source: {})",
                    dataset.id,
                    dataset.name,
                    dataset.status,
                    dataset.row_count,
                    range,
                    dataset.source_filename.as_deref().unwrap_or("n/a")
                );
            }
        }
        Commands::Insights {
            scope,
            thresholds,
            json,
        } => {
            let pool = connect().await?;
            let (filter, _) = scoped_filter(&pool, &scope).await?;
            let series = db::fetch_series(&pool, &filter).await?;
            let sellers = db::fetch_seller_ranking(&pool, &filter, 100).await?;

            let insights = insights::build_insights_with(&series, &sellers, &thresholds.config());
            print_insights(&insights, json)?;
        }
        Commands::Report {
            scope,
            thresholds,
            out,
            limit,
        } => {
            let pool = connect().await?;
            let (filter, dataset_name) = scoped_filter(&pool, &scope).await?;
            let series = db::fetch_series(&pool, &filter).await?;
            let sellers = db::fetch_seller_ranking(&pool, &filter, limit).await?;
            let categories = db::fetch_top_categories(&pool, &filter, 5).await?;

            let insights = insights::build_insights_with(&series, &sellers, &thresholds.config());
            let kpis = kpis::compute_kpis(&insights::normalize_series(&series));
            let period = match (filter.start, filter.end) {
                (None, None) => None,
                (start, end) => Some((
                    start.map(|d| d.to_string()).unwrap_or_else(|| "start".to_string()),
                    end.map(|d| d.to_string()).unwrap_or_else(|| "latest".to_string()),
                )),
            };

            let report = report::build_report(&report::ReportInput {
                dataset_name: &dataset_name,
                period,
                kpis: &kpis,
                sellers: &sellers,
                categories: &categories,
                insights: &insights,
            });
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "report written");
            println!("Report written to {}.", out.display());
        }
        Commands::Analyze {
            input,
            series,
            sellers,
            thresholds,
            json,
        } => {
            let (series, sellers) = match (input, series) {
                (Some(path), _) => {
                    let payload = loader::load_dashboard_json(&path)?;
                    (payload.series, payload.seller_ranking)
                }
                (None, Some(path)) => {
                    let sellers = match sellers {
                        Some(sellers_path) => loader::load_sellers_csv(&sellers_path)?,
                        None => Vec::new(),
                    };
                    (loader::load_series_csv(&path)?, sellers)
                }
                (None, None) => anyhow::bail!("either --input or --series is required"),
            };
            info!(points = series.len(), sellers = sellers.len(), "loaded analysis input");

            let insights = insights::build_insights_with(&series, &sellers, &thresholds.config());
            print_insights(&insights, json)?;
        }
    }

    Ok(())
}
