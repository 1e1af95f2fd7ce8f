//! # Directory Engine CLI Driver
//!
//! ## Purpose
//! Command-line front end for the directory engine: one-shot category
//! listings with optional city/query narrowing, facet dumps for the
//! navigation hierarchy, and catalog health checks.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments, environment variables
//! - **Output**: Listing results, facet maps or health reports on stdout
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Build the catalog client
//! 4. Run the requested operation (listing, facets, health check)

use clap::{Arg, Command};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edu_directory_engine::{
    catalog::CatalogSource,
    config::Config,
    errors::{DirectoryError, Result},
    filter::{Criterion, FilterField, FilterState},
    orchestrator::{Presentation, QueryOrchestrator},
    search::validate_query,
    CatalogClient, CategoryKind,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("edu-directory")
        .version("0.1.0")
        .author("Directory Platform Team")
        .about("Faceted search over the educational-institution catalog")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .value_name("NAME")
                .help("Category to list (schools, colleges, pu-colleges, coaching, teachers)"),
        )
        .arg(
            Arg::new("query")
                .short('q')
                .long("query")
                .value_name("TEXT")
                .help("Free-text search over name and city"),
        )
        .arg(
            Arg::new("city")
                .long("city")
                .value_name("CITY")
                .help("Restrict the listing to one city"),
        )
        .arg(
            Arg::new("max-fee")
                .long("max-fee")
                .value_name("AMOUNT")
                .help("Upper fee bound, applied server-side")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("facets")
                .long("facets")
                .help("Print the type -> cities facet hierarchy across all categories")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check-health")
                .long("check-health")
                .help("Check catalog service health and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = Config::from_file(config_path)?;

    init_logging(&config)?;
    info!("Directory engine starting, catalog at {}", config.catalog.base_url);

    let client = Arc::new(CatalogClient::new(&config)?);

    if matches.get_flag("check-health") {
        return run_health_check(&client).await;
    }

    if matches.get_flag("facets") {
        return run_facet_dump(&client).await;
    }

    let category = matches
        .get_one::<String>("category")
        .ok_or_else(|| DirectoryError::Config {
            message: "One of --category, --facets or --check-health is required".to_string(),
        })?;
    let category = CategoryKind::from_endpoint(category)?;

    run_listing(client, category, &config, &matches).await
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }

    Ok(())
}

/// Check the catalog service and report
async fn run_health_check(client: &CatalogClient) -> Result<()> {
    let health = client.health_check().await?;
    if health.is_healthy {
        println!("Catalog is healthy ({} ms)", health.response_time_ms);
    } else {
        println!(
            "Catalog is unhealthy: {}",
            health.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Print the full navigation facet hierarchy
async fn run_facet_dump(client: &CatalogClient) -> Result<()> {
    let load = client.load_facets().await;

    for (category_type, cities) in &load.facets {
        println!("{}: {}", category_type, cities.join(", "));
    }

    for category in &load.failed {
        println!("(facets unavailable for {}, browse all instead)", category);
    }

    Ok(())
}

/// Run a one-shot listing with the requested narrowing
async fn run_listing(
    client: Arc<CatalogClient>,
    category: CategoryKind,
    config: &Config,
    matches: &clap::ArgMatches,
) -> Result<()> {
    // Reject out-of-bounds queries before any network round trip
    if let Some(query) = matches.get_one::<String>("query") {
        validate_query(query, &config.search)?;
    }

    let mut orchestrator = QueryOrchestrator::new(client, category);

    // Server-understood filters go through the search endpoint
    let mut server_filters = FilterState::new();
    if let Some(max_fee) = matches.get_one::<f64>("max-fee") {
        server_filters.set(FilterField::Fee, Criterion::Range { min: 0.0, max: *max_fee });
    }
    if let Some(city) = matches.get_one::<String>("city") {
        server_filters.set(FilterField::City, Criterion::Select(Some(city.clone())));
    }

    if server_filters.is_empty() {
        orchestrator.initial_load().await?;
    } else {
        orchestrator.apply_server_filters(server_filters).await?;
    }

    if let Some(query) = matches.get_one::<String>("query") {
        orchestrator.set_query(query.clone());
    }

    if let Some(notice) = orchestrator.notice() {
        println!("note: {}", notice);
    }

    match orchestrator.presentation() {
        Presentation::Loading => unreachable!("one-shot run cannot end mid-load"),
        Presentation::Error(message) => println!("failed to load {}: {}", category, message),
        Presentation::Empty => println!("No institutions matched your filters."),
        Presentation::Results(records) => {
            println!("{} result(s) for {}:", records.len(), category);
            for record in records {
                let fee = record
                    .fee
                    .map(|f| format!("{:.0}/{}", f, fee_unit(category)))
                    .unwrap_or_else(|| "fee n/a".to_string());
                println!(
                    "  {} [{}] {} - {:.1}* ({})",
                    record.name, record.category_type, record.city, record.rating, fee
                );
            }
        }
    }

    Ok(())
}

fn fee_unit(category: CategoryKind) -> &'static str {
    match category {
        CategoryKind::Teacher => "hr",
        _ => "yr",
    }
}
