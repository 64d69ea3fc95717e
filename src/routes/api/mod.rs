pub mod companies;
pub mod vacancies;

use axum::Router;
use axum::routing::get;

use crate::db::Store;

pub fn router(store: Store) -> Router {
    let queries = Router::new()
        .route("/companies", get(companies::list))
        .route("/vacancies", get(vacancies::list))
        .route("/vacancies/above-average", get(vacancies::above_average))
        .route("/vacancies/search", get(vacancies::search))
        .route("/salary/average", get(vacancies::average_salary))
        .with_state(store);

    Router::new().nest("/api/v1", queries)
}
