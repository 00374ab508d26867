use chrono::Utc;
use serde_json::json;

use crate::conversion::{map_booking_to_trip, paths, ConversionOverrides};
use crate::error::{AppError, AppResult};
use crate::models::booking::{is_template_id, Booking, BookingStatus};
use crate::models::collections::{BOOKINGS, PACKAGES, TRIPS};
use crate::models::package::Package;
use crate::models::trip::StoredTrip;
use crate::services::trips::{load_settings, validate_amounts};
use crate::store::{DocumentStore, Fields};
use crate::utils::fields::first_text;

/// Real bookings, newest first. The schema template is never included.
pub async fn list_bookings(store: &dyn DocumentStore) -> AppResult<Vec<Booking>> {
    let mut bookings: Vec<Booking> = store
        .list(BOOKINGS)
        .await?
        .into_iter()
        .filter(|doc| !is_template_id(&doc.id))
        .map(Booking::from_document)
        .collect();

    bookings.sort_by(|a, b| b.criada_em.cmp(&a.criada_em));
    Ok(bookings)
}

pub async fn get_booking(store: &dyn DocumentStore, id: &str) -> AppResult<Booking> {
    if is_template_id(id) {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }

    store
        .get(BOOKINGS, id)
        .await?
        .map(Booking::from_document)
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

pub async fn update_booking_status(
    store: &dyn DocumentStore,
    id: &str,
    status: BookingStatus,
) -> AppResult<Booking> {
    get_booking(store, id).await?;

    let mut fields = Fields::new();
    fields.insert("status".to_string(), json!(status));
    fields.insert("atualizadaEm".to_string(), json!(Utc::now().to_rfc3339()));
    store.update(BOOKINGS, id, fields).await?;

    get_booking(store, id).await
}

/// Delete a booking. The template and the last remaining real booking are
/// refused before the store is asked to delete anything.
pub async fn delete_booking(store: &dyn DocumentStore, id: &str) -> AppResult<()> {
    if is_template_id(id) {
        return Err(AppError::Forbidden(
            "The booking template cannot be deleted".to_string(),
        ));
    }

    let remaining: Vec<String> = store
        .list(BOOKINGS)
        .await?
        .into_iter()
        .map(|doc| doc.id)
        .filter(|doc_id| !is_template_id(doc_id))
        .collect();

    if !remaining.iter().any(|doc_id| doc_id == id) {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }
    if remaining.len() <= 1 {
        return Err(AppError::BadRequest(
            "Cannot delete the last remaining booking".to_string(),
        ));
    }

    if !store.delete(BOOKINGS, id).await? {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }

    tracing::info!(booking_id = %id, "Booking deleted");
    Ok(())
}

/// Create a trip from a booking. The booking itself is left untouched, and
/// converting the same booking again creates another trip.
pub async fn convert_booking(
    store: &dyn DocumentStore,
    id: &str,
    overrides: &ConversionOverrides,
) -> AppResult<StoredTrip> {
    overrides.validate()?;

    let booking = get_booking(store, id).await?;

    let package_id = overrides
        .pacote_id
        .clone()
        .filter(|p| !p.trim().is_empty())
        .or_else(|| first_text(&booking.data, paths::PACOTE_ID));

    let (package, settings) = tokio::join!(
        load_package(store, package_id.as_deref()),
        load_settings(store)
    );
    let package = package?;
    let settings = settings?;

    if package_id.is_some() && package.is_none() {
        tracing::debug!(booking_id = %id, package_id = ?package_id, "Linked package not found");
    }

    let mut trip = map_booking_to_trip(
        &booking,
        package.as_ref(),
        overrides,
        settings.porcentagem_sinal_padrao,
    );
    validate_amounts(&trip)?;

    let now = Utc::now().to_rfc3339();
    trip.created_at = Some(now.clone());
    trip.updated_at = Some(now);

    let trip_id = store.add(TRIPS, trip.to_fields()?).await?;

    tracing::info!(
        booking_id = %id,
        trip_id = %trip_id,
        valor_total = trip.valor_total,
        valor_sinal = trip.valor_sinal,
        "Booking converted to trip"
    );

    Ok(StoredTrip { id: trip_id, trip })
}

async fn load_package(store: &dyn DocumentStore, id: Option<&str>) -> AppResult<Option<Package>> {
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(store.get(PACKAGES, id).await?.map(Package::from))
}
