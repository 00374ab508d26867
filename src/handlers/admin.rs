use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::conversion::ConversionOverrides;
use crate::error::AppResult;
use crate::handlers::AppJson;
use crate::models::booking::{Booking, BookingStatus, Responsavel, ServiceType};
use crate::models::settings::TripSettings;
use crate::models::trip::{PaymentStatus, StoredTrip, Trip, TripStatus};
use crate::normalize::{normalize_booking, NormalizedBooking};
use crate::services::{bookings, trips};
use crate::store::Fields;
use crate::AppState;

// ============ Bookings ============

/// Booking as the admin panel reads it: the raw document plus the
/// normalized view every screen renders from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<ServiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    pub responsavel: Responsavel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criada_em: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atualizada_em: Option<DateTime<Utc>>,
    pub normalizado: NormalizedBooking,
    pub dados: Fields,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        let normalizado = normalize_booking(&booking);
        Self {
            id: booking.id,
            tipo: booking.tipo,
            status: booking.status,
            responsavel: booking.responsavel,
            criada_em: booking.criada_em,
            atualizada_em: booking.atualizada_em,
            normalizado,
            dados: booking.data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingStatusRequest {
    pub status: BookingStatus,
}

pub async fn list_bookings(State(state): State<AppState>) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = bookings::list_bookings(state.store.as_ref()).await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookingResponse>> {
    let booking = bookings::get_booking(state.store.as_ref(), &id).await?;
    Ok(Json(booking.into()))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<BookingStatusRequest>,
) -> AppResult<Json<Value>> {
    let booking = bookings::update_booking_status(state.store.as_ref(), &id, payload.status).await?;
    Ok(Json(json!({
        "success": true,
        "reserva": BookingResponse::from(booking),
    })))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    bookings::delete_booking(state.store.as_ref(), &id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn convert_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(overrides): AppJson<ConversionOverrides>,
) -> AppResult<Json<Value>> {
    let created = bookings::convert_booking(state.store.as_ref(), &id, &overrides).await?;
    Ok(Json(json!({
        "success": true,
        "viagemId": &created.id,
        "viagem": created,
    })))
}

// ============ Trips ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriversRequest {
    pub motorista_ida_id: Option<String>,
    pub motorista_volta_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TripStatusRequest {
    pub status: TripStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub status_pagamento: PaymentStatus,
}

pub async fn list_trips(State(state): State<AppState>) -> AppResult<Json<Vec<StoredTrip>>> {
    Ok(Json(trips::list_trips(state.store.as_ref()).await?))
}

pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<StoredTrip>> {
    Ok(Json(trips::get_trip(state.store.as_ref(), &id).await?))
}

pub async fn create_trip(
    State(state): State<AppState>,
    AppJson(trip): AppJson<Trip>,
) -> AppResult<Json<Value>> {
    let created = trips::create_trip(state.store.as_ref(), trip).await?;
    Ok(Json(json!({
        "success": true,
        "viagemId": &created.id,
        "viagem": created,
    })))
}

pub async fn assign_drivers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AssignDriversRequest>,
) -> AppResult<Json<Value>> {
    let trip = trips::assign_drivers(
        state.store.as_ref(),
        &id,
        payload.motorista_ida_id,
        payload.motorista_volta_id,
    )
    .await?;
    Ok(Json(json!({ "success": true, "viagem": trip })))
}

pub async fn update_trip_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<TripStatusRequest>,
) -> AppResult<Json<Value>> {
    let trip = trips::update_trip_status(state.store.as_ref(), &id, payload.status).await?;
    Ok(Json(json!({ "success": true, "viagem": trip })))
}

pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<PaymentStatusRequest>,
) -> AppResult<Json<Value>> {
    let trip =
        trips::update_payment_status(state.store.as_ref(), &id, payload.status_pagamento).await?;
    Ok(Json(json!({ "success": true, "viagem": trip })))
}

pub async fn trip_settings(State(state): State<AppState>) -> AppResult<Json<TripSettings>> {
    Ok(Json(trips::load_settings(state.store.as_ref()).await?))
}
