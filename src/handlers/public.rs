use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::handlers::AppQuery;
use crate::utils::pricing::{compute_deposit, Deposit};

pub async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct DepositQuery {
    pub total: f64,
    pub percent: Option<i64>,
}

/// Deposit quote shown on the booking form before anything is stored.
pub async fn deposit_quote(AppQuery(query): AppQuery<DepositQuery>) -> AppResult<Json<Deposit>> {
    if !query.total.is_finite() || query.total < 0.0 {
        return Err(AppError::BadRequest(
            "total must be a non-negative amount".to_string(),
        ));
    }
    if query.percent.is_some_and(|p| !(0..=100).contains(&p)) {
        return Err(AppError::BadRequest(
            "percent must be between 0 and 100".to_string(),
        ));
    }

    Ok(Json(compute_deposit(query.total, query.percent)))
}
