use std::io::Write;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use vacancydb::config::{Command, Config};
use vacancydb::models::company::CompanyStats;
use vacancydb::models::vacancy::VacancyListing;
use vacancydb::{HeadHunter, Store, menu, routes};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vacancydb=info,tower_http=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load vacancies; report and return false if nothing could be stored.
async fn load(config: &Config, store: &Store) -> bool {
    let source = HeadHunter::new(&config.listing_url);
    match vacancydb::ingest(store, &source, &config.employer_ids, config.per_page).await {
        Ok(Some(report)) => {
            tracing::info!(
                "Ingestion finished: {} postings, {} vacancies, {} companies",
                report.postings,
                report.vacancies,
                report.companies
            );
            true
        }
        Ok(None) => {
            tracing::error!("No vacancies were received from the listing source");
            false
        }
        Err(e) => {
            tracing::error!(kind = ?e.kind(), "Ingestion failed: {e}");
            false
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_json);

    let store = Store::new(&config.database_url, &config.database_name)?;
    let mut stdout = std::io::stdout();

    match config.resolved_command() {
        Command::Run => {
            if load(&config, &store).await {
                menu::run(&store, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
            } else {
                writeln!(stdout, "Could not load vacancies; the menu is not available.")?;
            }
        }
        Command::Ingest => {
            if !load(&config, &store).await {
                anyhow::bail!("Ingestion stored no vacancies");
            }
            let (vacancies, companies) = store.counts().await?;
            writeln!(
                stdout,
                "Database '{}' holds {vacancies} vacancies from {companies} companies.",
                store.database()
            )?;
        }
        Command::Companies => {
            let companies = CompanyStats::list(&store).await?;
            menu::print_companies(&mut stdout, &companies)?;
        }
        Command::Vacancies => {
            let vacancies = VacancyListing::all(&store).await?;
            menu::print_vacancies(&mut stdout, &vacancies)?;
        }
        Command::AboveAverage => menu::print_above_average(&mut stdout, &store).await?,
        Command::Search { keyword } => {
            menu::print_keyword_matches(&mut stdout, &store, &keyword).await?
        }
        Command::Menu => {
            menu::run(&store, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
        }
        Command::Serve { listen_addr } => {
            let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
            tracing::info!("Listening on {listen_addr}");
            axum::serve(listener, routes::app(store)).await?;
        }
    }

    Ok(())
}
