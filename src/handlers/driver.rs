use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::handlers::AppJson;
use crate::handlers::admin::TripStatusRequest;
use crate::models::trip::StoredTrip;
use crate::services::trips;
use crate::utils::jwt::Claims;
use crate::AppState;

/// Trips where the logged-in driver drives either leg
pub async fn my_trips(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<StoredTrip>>> {
    Ok(Json(trips::list_driver_trips(state.store.as_ref(), &claims.sub).await?))
}

pub async fn update_trip_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<TripStatusRequest>,
) -> AppResult<Json<Value>> {
    let trip =
        trips::advance_driver_trip(state.store.as_ref(), &claims.sub, &id, payload.status).await?;
    Ok(Json(json!({ "success": true, "viagem": trip })))
}
