use serde::Serialize;

use crate::collectors::{ListingSource, normalize};
use crate::db::{Store, release};
use crate::error::AppError;
use crate::models::company::Company;
use crate::models::vacancy::Vacancy;

/// Outcome of one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub postings: usize,
    pub vacancies: u64,
    pub companies: u64,
    pub database_created: bool,
}

/// Fetch postings for `employer_ids`, normalize them and load them into a
/// freshly recreated schema.
///
/// Returns `Ok(None)` when the source had nothing to offer; storage is left
/// untouched in that case.
pub async fn ingest(
    store: &Store,
    source: &dyn ListingSource,
    employer_ids: &[String],
    page_size: u32,
) -> Result<Option<IngestReport>, AppError> {
    tracing::info!(
        "Fetching vacancies for {} employers from '{}'",
        employer_ids.len(),
        source.name()
    );
    let postings = source.fetch(employer_ids, page_size).await?;
    if postings.is_empty() {
        tracing::warn!("'{}' returned no postings, nothing to load", source.name());
        return Ok(None);
    }

    let vacancies = postings
        .iter()
        .map(normalize)
        .collect::<Result<Vec<_>, _>>()?;

    let database_created = store.ensure_database().await?;
    store.reset_tables().await?;
    store.create_tables().await?;

    let (inserted, companies) = write(store, &vacancies).await?;
    tracing::info!(
        "Loaded {inserted} vacancies and {companies} companies into '{}'",
        store.database()
    );

    Ok(Some(IngestReport {
        postings: postings.len(),
        vacancies: inserted,
        companies,
        database_created,
    }))
}

/// Write vacancies, derive companies from them, then add the foreign key.
///
/// The phases run in that order on one connection without a surrounding
/// transaction; a failure part-way leaves the earlier phases in place.
/// Returns `(vacancies, companies)` inserted.
pub async fn write(store: &Store, vacancies: &[Vacancy]) -> Result<(u64, u64), AppError> {
    let mut conn = store.connect().await?;
    let result = async {
        let inserted = Vacancy::insert_all(&mut conn, vacancies).await?;
        tracing::debug!("Inserted {inserted} vacancy rows");

        let companies = Company::derive_from_vacancies(&mut conn).await?;
        tracing::debug!("Derived {companies} company rows");

        Company::attach_vacancy_key(&mut conn).await?;
        Ok::<_, sqlx::Error>((inserted, companies))
    }
    .await;
    release(conn).await;
    Ok(result?)
}
