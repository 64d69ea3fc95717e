use serde::Serialize;
use sqlx::PgConnection;

use crate::db::{Store, release};
use crate::error::AppError;

/// A company with the number of vacancies it has on file.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CompanyStats {
    pub hh_company_id: i32,
    pub company_name: String,
    pub vacancy_count: i64,
}

/// The `company` table is derived data: it is rebuilt from `vacancy` on every load.
pub struct Company;

impl Company {
    /// Insert one company per distinct employer id/name pair seen in `vacancy`.
    pub async fn derive_from_vacancies(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO company (hh_company_id, company_name)
             SELECT hh_company_id, company_name
             FROM vacancy
             GROUP BY hh_company_id, company_name",
        )
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Tie `vacancy.hh_company_id` to `company`. Only valid once companies are derived.
    pub async fn attach_vacancy_key(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            "ALTER TABLE vacancy
             ADD CONSTRAINT fk_hh_company_id
             FOREIGN KEY (hh_company_id)
             REFERENCES company(hh_company_id)",
        )
        .execute(conn)
        .await?;
        Ok(())
    }
}

impl CompanyStats {
    /// Every company with its vacancy count, largest first. Companies without
    /// vacancies are listed with a count of 0.
    pub async fn list(store: &Store) -> Result<Vec<CompanyStats>, AppError> {
        let mut conn = store.connect().await?;
        let result = sqlx::query_as::<_, CompanyStats>(
            "SELECT company.hh_company_id, company.company_name, COUNT(vacancy.hh_vacancy_id) AS vacancy_count
             FROM company
             LEFT JOIN vacancy ON company.hh_company_id = vacancy.hh_company_id
             GROUP BY company.hh_company_id, company.company_name
             ORDER BY vacancy_count DESC, company.company_name",
        )
        .fetch_all(&mut conn)
        .await;
        release(conn).await;
        Ok(result?)
    }
}
