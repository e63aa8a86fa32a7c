use stock_dashboard_api::api::{build_router, AppState};
use stock_dashboard_api::catalog::open_catalog;
use stock_dashboard_api::config::{CatalogBackend, Config, DEFAULT_UPSTREAM_BASE_URL};
use stock_dashboard_api::gateway::YahooGateway;
use stock_dashboard_api::generator;
use stock_dashboard_api::services::stock_service::StockService;

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger, default to info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("companies", sub)) => list_companies(sub).await,
        Some(("serve", sub)) => serve(build_config(sub)?).await,
        _ => {
            info!("No command specified, serving. Use --help for usage information.");
            serve(build_config(&matches)?).await
        }
    }
}

fn database_arg() -> Arg<'static> {
    Arg::with_name("database")
        .long("database")
        .value_name("PATH")
        .help("SQLite file or URL backing the ticker catalog (in-memory list if omitted)")
        .env("STOCK_API_DATABASE")
        .takes_value(true)
}

/// 服务参数；顶层命令与 serve 子命令共用，环境变量在两处都生效
fn serve_args() -> Vec<Arg<'static>> {
    vec![
        Arg::with_name("host")
            .long("host")
            .value_name("HOST")
            .help("Address to listen on")
            .env("STOCK_API_HOST")
            .takes_value(true)
            .default_value("0.0.0.0"),
        Arg::with_name("port")
            .short('p')
            .long("port")
            .value_name("PORT")
            .help("Port to listen on")
            .env("STOCK_API_PORT")
            .takes_value(true)
            .default_value("5000"),
        Arg::with_name("period")
            .long("period")
            .value_name("PERIOD")
            .help("Default lookback period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)")
            .env("STOCK_API_DEFAULT_PERIOD")
            .takes_value(true)
            .default_value("1mo"),
        Arg::with_name("timeout")
            .long("timeout")
            .value_name("SECONDS")
            .help("Upstream request timeout in seconds")
            .env("STOCK_API_REQUEST_TIMEOUT")
            .takes_value(true)
            .default_value("10"),
        Arg::with_name("synthetic-days")
            .long("synthetic-days")
            .value_name("DAYS")
            .help("Length of the synthetic fallback series")
            .env("STOCK_API_SYNTHETIC_DAYS")
            .takes_value(true),
        Arg::with_name("upstream")
            .long("upstream")
            .value_name("URL")
            .help("Base URL of the market data provider")
            .env("STOCK_API_UPSTREAM")
            .takes_value(true)
            .default_value(DEFAULT_UPSTREAM_BASE_URL),
        database_arg(),
    ]
}

fn cli() -> App<'static> {
    App::new("Stock Dashboard API")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stock market dashboard HTTP API with synthetic fallback data")
        .args(serve_args())
        .subcommand(
            SubCommand::with_name("serve")
                .about("Run the HTTP API (default)")
                .args(serve_args()),
        )
        .subcommand(
            SubCommand::with_name("companies")
                .about("Print the ticker catalog")
                .arg(database_arg()),
        )
}

fn catalog_backend(matches: &ArgMatches) -> CatalogBackend {
    match matches.value_of("database") {
        Some(db) if db.starts_with("sqlite:") => CatalogBackend::Sqlite { url: db.to_string() },
        Some(db) => CatalogBackend::Sqlite { url: format!("sqlite://{}", db) },
        None => CatalogBackend::Memory,
    }
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let port = matches.value_of("port")
        .unwrap_or("5000")
        .parse::<u16>()
        .context("invalid --port")?;
    let timeout = matches.value_of("timeout")
        .unwrap_or("10")
        .parse::<u64>()
        .context("invalid --timeout")?;
    let synthetic_days = match matches.value_of("synthetic-days") {
        Some(days) => days.parse::<u32>().context("invalid --synthetic-days")?,
        None => generator::DEFAULT_DAYS,
    };

    let config = Config::new()
        .with_host(matches.value_of("host").unwrap_or("0.0.0.0"))
        .with_port(port)
        .with_default_period(matches.value_of("period").unwrap_or("1mo"))
        .with_request_timeout(Duration::from_secs(timeout))
        .with_synthetic_days(synthetic_days)
        .with_upstream_base_url(matches.value_of("upstream").unwrap_or(DEFAULT_UPSTREAM_BASE_URL))
        .with_catalog(catalog_backend(matches));

    Ok(config)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.validate()?;
    let addr = config.socket_addr()?;

    let catalog = open_catalog(&config.catalog).await
        .context("ticker catalog unavailable at startup")?;
    let gateway = YahooGateway::from_config(&config)?;
    let stocks = StockService::new(&config, Arc::new(gateway))?;

    info!("Catalog backend: {}", catalog.backend_name());
    info!("Upstream: {} (timeout {:?})", config.upstream_base_url, config.request_timeout);
    info!("Default period: {}, synthetic fallback length: {} days", stocks.default_period(), config.synthetic_days);

    let router = build_router(AppState::new(catalog, stocks));
    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Stock Market Dashboard API is listening on http://{}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn list_companies(matches: &ArgMatches) -> anyhow::Result<()> {
    let catalog = open_catalog(&catalog_backend(matches)).await?;
    let companies = catalog.list_companies().await?;

    info!("Found {} companies in {} catalog", companies.len(), catalog.backend_name());
    info!("{:-<70}", "");
    info!("{:<16} {:<36} {:<15}", "Symbol", "Name", "Sector");
    info!("{:-<70}", "");
    for company in &companies {
        info!("{:<16} {:<36} {:<15}", company.symbol, company.name, company.sector);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
