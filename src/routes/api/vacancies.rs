use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::db::Store;
use crate::error::AppError;
use crate::models::vacancy::{self, VacancyListing};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AverageSalary {
    pub average_salary: i64,
}

pub async fn list(State(store): State<Store>) -> Result<Json<Vec<VacancyListing>>, AppError> {
    let vacancies = VacancyListing::all(&store).await?;
    Ok(Json(vacancies))
}

pub async fn above_average(
    State(store): State<Store>,
) -> Result<Json<Vec<VacancyListing>>, AppError> {
    let vacancies = VacancyListing::above_average(&store).await?;
    Ok(Json(vacancies))
}

/// GET /api/v1/vacancies/search?keyword=python
pub async fn search(
    State(store): State<Store>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<VacancyListing>>, AppError> {
    let keyword = params
        .keyword
        .ok_or_else(|| AppError::Validation("Missing 'keyword' parameter".to_string()))?;
    let vacancies = VacancyListing::by_keyword(&store, &keyword).await?;
    Ok(Json(vacancies))
}

pub async fn average_salary(State(store): State<Store>) -> Result<Json<AverageSalary>, AppError> {
    let average_salary = vacancy::average_salary(&store).await?;
    Ok(Json(AverageSalary { average_salary }))
}
