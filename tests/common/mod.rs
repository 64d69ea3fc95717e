//! Shared Postgres container for storage tests.
//!
//! The container starts on first use and is reused by every test; each test
//! works in its own database so they can run in parallel.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use vacancydb::Store;
use vacancydb::models::vacancy::Vacancy;

struct SharedPostgres {
    server_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();
static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

impl SharedPostgres {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --ignored --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;
        Ok(Self {
            server_url: format!("postgresql://postgres:postgres@{host}:{port}"),
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_POSTGRES
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared Postgres container")
            })
            .await
    }
}

/// A store pointing at a database name no other test uses. The database
/// itself is not created yet.
pub async fn fresh_store(label: &str) -> Store {
    let infra = SharedPostgres::get().await;
    let n = NEXT_DATABASE.fetch_add(1, Ordering::SeqCst);
    Store::new(&infra.server_url, &format!("{label}_{n}")).expect("valid store settings")
}

/// A store whose database exists and holds empty tables.
pub async fn empty_schema(label: &str) -> Store {
    let store = fresh_store(label).await;
    store.ensure_database().await.expect("create database");
    store.create_tables().await.expect("create tables");
    store
}

pub fn vacancy(id: i32, company_id: i32, company: &str, title: &str) -> Vacancy {
    Vacancy {
        hh_vacancy_id: id,
        hh_company_id: company_id,
        company_name: company.to_string(),
        title: title.to_string(),
        salary_from: Some(0),
        salary_to: Some(0),
        currency: Some(String::new()),
        url: format!("https://hh.ru/vacancy/{id}"),
        description: String::new(),
    }
}

pub fn with_salary(mut vacancy: Vacancy, from: Option<i32>, to: Option<i32>) -> Vacancy {
    vacancy.salary_from = from;
    vacancy.salary_to = to;
    vacancy.currency = Some("RUR".to_string());
    vacancy
}
