use axum::Json;
use axum::extract::State;

use crate::db::Store;
use crate::error::AppError;
use crate::models::company::CompanyStats;

pub async fn list(State(store): State<Store>) -> Result<Json<Vec<CompanyStats>>, AppError> {
    let companies = CompanyStats::list(&store).await?;
    Ok(Json(companies))
}
