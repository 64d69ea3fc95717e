use serde::Serialize;
use sqlx::PgConnection;

use crate::db::{Store, release};
use crate::error::AppError;

/// A normalized posting, as written to the `vacancy` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vacancy {
    pub hh_vacancy_id: i32,
    pub hh_company_id: i32,
    pub company_name: String,
    pub title: String,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub currency: Option<String>,
    pub url: String,
    pub description: String,
}

/// A vacancy as the read queries return it.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct VacancyListing {
    pub company_name: String,
    pub title: String,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub currency: Option<String>,
    pub url: Option<String>,
}

const LISTING_COLUMNS: &str =
    "SELECT company_name, title, salary_from, salary_to, currency, vacancy_url AS url FROM vacancy";

const SALARY_ORDER: &str = "ORDER BY salary_from DESC NULLS LAST, id";

/// Per-row salary: the midpoint when both bounds are set, otherwise whichever
/// bound is set, otherwise 0. Zero bounds count as unset. Rows without any
/// salary stay in the mean as 0. The sum is widened to BIGINT so two large
/// INT bounds cannot overflow, and the midpoint keeps its fraction until the
/// final rounding.
const AVERAGE_SALARY: &str = "SELECT COALESCE(ROUND(AVG(COALESCE(
        (NULLIF(salary_from, 0)::BIGINT + NULLIF(salary_to, 0)) / 2.0,
        NULLIF(salary_from, 0),
        NULLIF(salary_to, 0),
        0
    ))), 0)::BIGINT
    FROM vacancy";

impl Vacancy {
    /// Insert every vacancy in one statement. Any duplicate `hh_vacancy_id`
    /// fails the whole batch.
    pub async fn insert_all(
        conn: &mut PgConnection,
        vacancies: &[Vacancy],
    ) -> Result<u64, sqlx::Error> {
        if vacancies.is_empty() {
            return Ok(0);
        }

        let mut vacancy_ids = Vec::with_capacity(vacancies.len());
        let mut company_ids = Vec::with_capacity(vacancies.len());
        let mut company_names = Vec::with_capacity(vacancies.len());
        let mut titles = Vec::with_capacity(vacancies.len());
        let mut salaries_from = Vec::with_capacity(vacancies.len());
        let mut salaries_to = Vec::with_capacity(vacancies.len());
        let mut currencies = Vec::with_capacity(vacancies.len());
        let mut urls = Vec::with_capacity(vacancies.len());
        let mut descriptions = Vec::with_capacity(vacancies.len());

        for v in vacancies {
            vacancy_ids.push(v.hh_vacancy_id);
            company_ids.push(v.hh_company_id);
            company_names.push(v.company_name.as_str());
            titles.push(v.title.as_str());
            salaries_from.push(v.salary_from);
            salaries_to.push(v.salary_to);
            currencies.push(v.currency.as_deref());
            urls.push(v.url.as_str());
            descriptions.push(v.description.as_str());
        }

        let result = sqlx::query(
            "INSERT INTO vacancy (hh_vacancy_id, hh_company_id, company_name, title, salary_from, salary_to, currency, vacancy_url, description)
             SELECT * FROM UNNEST($1::int4[], $2::int4[], $3::text[], $4::text[], $5::int4[], $6::int4[], $7::text[], $8::text[], $9::text[])",
        )
        .bind(&vacancy_ids)
        .bind(&company_ids)
        .bind(&company_names)
        .bind(&titles)
        .bind(&salaries_from)
        .bind(&salaries_to)
        .bind(&currencies)
        .bind(&urls)
        .bind(&descriptions)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}

impl VacancyListing {
    /// Every vacancy, highest `salary_from` first.
    pub async fn all(store: &Store) -> Result<Vec<VacancyListing>, AppError> {
        let mut conn = store.connect().await?;
        let result = sqlx::query_as::<_, VacancyListing>(&format!("{LISTING_COLUMNS} {SALARY_ORDER}"))
            .fetch_all(&mut conn)
            .await;
        release(conn).await;
        Ok(result?)
    }

    /// Vacancies whose either bound exceeds [`average_salary`].
    pub async fn above_average(store: &Store) -> Result<Vec<VacancyListing>, AppError> {
        let mut conn = store.connect().await?;
        let result = async {
            let average = fetch_average_salary(&mut conn).await?;
            sqlx::query_as::<_, VacancyListing>(&format!(
                "{LISTING_COLUMNS} WHERE salary_from > $1 OR salary_to > $1 {SALARY_ORDER}"
            ))
            .bind(average)
            .fetch_all(&mut conn)
            .await
        }
        .await;
        release(conn).await;
        Ok(result?)
    }

    /// Vacancies whose title or description contain `keyword`, ignoring case.
    pub async fn by_keyword(store: &Store, keyword: &str) -> Result<Vec<VacancyListing>, AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::Validation("Keyword must not be empty".to_string()));
        }

        let mut conn = store.connect().await?;
        let result = sqlx::query_as::<_, VacancyListing>(&format!(
            "{LISTING_COLUMNS} WHERE title ILIKE $1 OR description ILIKE $1 {SALARY_ORDER}"
        ))
        .bind(contains_pattern(keyword))
        .fetch_all(&mut conn)
        .await;
        release(conn).await;
        Ok(result?)
    }
}

/// Mean coalesced salary over all vacancies, rounded; 0 for an empty table.
pub async fn average_salary(store: &Store) -> Result<i64, AppError> {
    let mut conn = store.connect().await?;
    let result = fetch_average_salary(&mut conn).await;
    release(conn).await;
    Ok(result?)
}

async fn fetch_average_salary(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
    let (average,): (i64,) = sqlx::query_as(AVERAGE_SALARY).fetch_one(conn).await?;
    Ok(average)
}

/// `ILIKE` pattern matching `keyword` anywhere, with its wildcards taken literally.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
