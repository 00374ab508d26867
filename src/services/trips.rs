use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::collections::{SETTINGS, TRIPS};
use crate::models::settings::{TripSettings, TRIP_SETTINGS_ID};
use crate::models::trip::{PaymentStatus, StoredTrip, Trip, TripStatus};
use crate::seed::is_real_document;
use crate::store::{Document, DocumentStore, Fields};

/// Trip settings singleton, falling back to built-in defaults when the
/// document is missing or unreadable.
pub async fn load_settings(store: &dyn DocumentStore) -> AppResult<TripSettings> {
    let Some(doc) = store.get(SETTINGS, TRIP_SETTINGS_ID).await? else {
        return Ok(TripSettings::default());
    };

    match serde_json::from_value(Value::Object(doc.data)) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            tracing::warn!(error = %e, "Trip settings unreadable, using defaults");
            Ok(TripSettings::default())
        }
    }
}

fn read_trip(doc: Document) -> Option<StoredTrip> {
    let id = doc.id.clone();
    match StoredTrip::try_from(doc) {
        Ok(trip) => Some(trip),
        Err(e) => {
            tracing::warn!(trip_id = %id, error = %e, "Skipping malformed trip");
            None
        }
    }
}

/// Real trips only; the seeded example is left out.
pub async fn list_trips(store: &dyn DocumentStore) -> AppResult<Vec<StoredTrip>> {
    Ok(store
        .list(TRIPS)
        .await?
        .into_iter()
        .filter(is_real_document)
        .filter_map(read_trip)
        .collect())
}

pub async fn get_trip(store: &dyn DocumentStore, id: &str) -> AppResult<StoredTrip> {
    let doc = store
        .get(TRIPS, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
    Ok(StoredTrip::try_from(doc)?)
}

/// Checked before any trip is written, whatever the amounts came from.
pub(crate) fn validate_amounts(trip: &Trip) -> AppResult<()> {
    if !(0..=100).contains(&trip.porcentagem_sinal) {
        return Err(AppError::BadRequest(format!(
            "porcentagemSinal must be between 0 and 100, got {}",
            trip.porcentagem_sinal
        )));
    }
    if !trip.valor_total.is_finite() || trip.valor_total < 0.0 {
        return Err(AppError::BadRequest(
            "valorTotal must be a non-negative amount".to_string(),
        ));
    }
    Ok(())
}

/// Manual trip creation from the admin panel.
pub async fn create_trip(store: &dyn DocumentStore, mut trip: Trip) -> AppResult<StoredTrip> {
    validate_amounts(&trip)?;

    trip.status = TripStatus::Reservado;
    trip.reserva_original_id = None;
    trip.is_exemplo = None;
    trip.apply_deposit();

    let now = Utc::now().to_rfc3339();
    trip.created_at = Some(now.clone());
    trip.updated_at = Some(now);

    let id = store.add(TRIPS, trip.to_fields()?).await?;
    tracing::info!(trip_id = %id, "Trip created");

    Ok(StoredTrip { id, trip })
}

async fn patch_trip(store: &dyn DocumentStore, id: &str, mut fields: Fields) -> AppResult<StoredTrip> {
    fields.insert("updatedAt".to_string(), json!(Utc::now().to_rfc3339()));
    store.update(TRIPS, id, fields).await?;
    get_trip(store, id).await
}

/// Set either or both leg drivers. An empty string unassigns the leg.
pub async fn assign_drivers(
    store: &dyn DocumentStore,
    id: &str,
    outbound: Option<String>,
    inbound: Option<String>,
) -> AppResult<StoredTrip> {
    let current = get_trip(store, id).await?;

    if outbound.is_none() && inbound.is_none() {
        return Err(AppError::BadRequest("No driver given".to_string()));
    }
    if inbound.as_deref().is_some_and(|d| !d.is_empty()) && !current.trip.is_ida_e_volta {
        return Err(AppError::BadRequest(
            "Trip has no return leg to assign".to_string(),
        ));
    }

    let mut fields = Fields::new();
    if let Some(driver) = outbound {
        fields.insert("motoristaIdaId".to_string(), json!(driver));
    }
    if let Some(driver) = inbound {
        fields.insert("motoristaVoltaId".to_string(), json!(driver));
    }

    let updated = patch_trip(store, id, fields).await?;
    tracing::info!(
        trip_id = %id,
        motorista_ida = %updated.trip.motorista_ida_id,
        motorista_volta = %updated.trip.motorista_volta_id,
        "Drivers assigned"
    );
    Ok(updated)
}

pub async fn update_trip_status(
    store: &dyn DocumentStore,
    id: &str,
    status: TripStatus,
) -> AppResult<StoredTrip> {
    get_trip(store, id).await?;

    let mut fields = Fields::new();
    fields.insert("status".to_string(), json!(status));
    patch_trip(store, id, fields).await
}

pub async fn update_payment_status(
    store: &dyn DocumentStore,
    id: &str,
    status: PaymentStatus,
) -> AppResult<StoredTrip> {
    get_trip(store, id).await?;

    let mut fields = Fields::new();
    fields.insert("statusPagamento".to_string(), json!(status));
    patch_trip(store, id, fields).await
}

pub async fn list_driver_trips(
    store: &dyn DocumentStore,
    driver_id: &str,
) -> AppResult<Vec<StoredTrip>> {
    Ok(list_trips(store)
        .await?
        .into_iter()
        .filter(|t| t.trip.motorista_ida_id == driver_id || t.trip.motorista_volta_id == driver_id)
        .collect())
}

/// Driver progress update. A driver moves only the leg they are assigned to.
pub async fn advance_driver_trip(
    store: &dyn DocumentStore,
    driver_id: &str,
    id: &str,
    status: TripStatus,
) -> AppResult<StoredTrip> {
    let current = get_trip(store, id).await?;
    let trip = &current.trip;

    let drives_outbound = !driver_id.is_empty() && trip.motorista_ida_id == driver_id;
    let drives_return = !driver_id.is_empty() && trip.motorista_volta_id == driver_id;

    if !drives_outbound && !drives_return {
        return Err(AppError::Forbidden(
            "You are not assigned to this trip".to_string(),
        ));
    }

    let allowed = (status.is_outbound_leg() && drives_outbound)
        || (status.is_return_leg() && drives_return && trip.is_ida_e_volta);
    if !allowed {
        return Err(AppError::Forbidden(format!(
            "Drivers cannot set status {:?} on this trip",
            status
        )));
    }

    let mut fields = Fields::new();
    fields.insert("status".to_string(), json!(status));
    let updated = patch_trip(store, id, fields).await?;

    tracing::info!(trip_id = %id, driver_id = %driver_id, status = ?status, "Driver updated trip");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::EXAMPLE_TRIP_ID;
    use crate::store::MemoryStore;

    async fn insert(store: &MemoryStore, id: &str, trip: Trip) {
        store.set(TRIPS, id, trip.to_fields().unwrap()).await.unwrap();
    }

    fn round_trip(ida: &str, volta: &str) -> Trip {
        Trip {
            is_ida_e_volta: true,
            motorista_ida_id: ida.to_string(),
            motorista_volta_id: volta.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_excludes_example() {
        let store = MemoryStore::new();
        insert(
            &store,
            EXAMPLE_TRIP_ID,
            Trip {
                is_exemplo: Some(true),
                ..Default::default()
            },
        )
        .await;
        insert(&store, "v1", Trip::default()).await;

        let ids: Vec<String> = list_trips(&store).await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["v1"]);
    }

    #[tokio::test]
    async fn test_create_trip_computes_deposit() {
        let store = MemoryStore::new();
        let created = create_trip(
            &store,
            Trip {
                valor_total: 1000.0,
                status: TripStatus::Cancelado,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(created.trip.valor_sinal, 400.0);
        assert_eq!(created.trip.valor_restante, 600.0);
        assert_eq!(created.trip.status, TripStatus::Reservado);

        let stored = get_trip(&store, &created.id).await.unwrap();
        assert_eq!(stored.trip, created.trip);
    }

    #[tokio::test]
    async fn test_create_trip_rejects_bad_percent() {
        let store = MemoryStore::new();
        let result = create_trip(
            &store,
            Trip {
                porcentagem_sinal: 150,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(store.count(TRIPS).await, 0);
    }

    #[tokio::test]
    async fn test_assign_return_driver_needs_round_trip() {
        let store = MemoryStore::new();
        insert(&store, "v1", Trip::default()).await;

        let result = assign_drivers(&store, "v1", None, Some("m2".to_string())).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let updated = assign_drivers(&store, "v1", Some("m1".to_string()), None)
            .await
            .unwrap();
        assert_eq!(updated.trip.motorista_ida_id, "m1");
        assert!(updated.trip.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_driver_moves_only_own_leg() {
        let store = MemoryStore::new();
        insert(&store, "v1", round_trip("m1", "m2")).await;

        let ok = advance_driver_trip(&store, "m1", "v1", TripStatus::IdaIniciada)
            .await
            .unwrap();
        assert_eq!(ok.trip.status, TripStatus::IdaIniciada);

        let wrong_leg = advance_driver_trip(&store, "m1", "v1", TripStatus::VoltaIniciada).await;
        assert!(matches!(wrong_leg, Err(AppError::Forbidden(_))));

        let ok = advance_driver_trip(&store, "m2", "v1", TripStatus::VoltaFinalizada)
            .await
            .unwrap();
        assert_eq!(ok.trip.status, TripStatus::VoltaFinalizada);

        let cancel = advance_driver_trip(&store, "m2", "v1", TripStatus::Cancelado).await;
        assert!(matches!(cancel, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_unassigned_driver_is_forbidden() {
        let store = MemoryStore::new();
        insert(&store, "v1", round_trip("m1", "")).await;

        let result = advance_driver_trip(&store, "m9", "v1", TripStatus::IdaIniciada).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let blank = advance_driver_trip(&store, "", "v1", TripStatus::VoltaIniciada).await;
        assert!(matches!(blank, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_driver_trip_list() {
        let store = MemoryStore::new();
        insert(&store, "v1", round_trip("m1", "m2")).await;
        insert(&store, "v2", round_trip("m3", "m1")).await;
        insert(&store, "v3", round_trip("m3", "m3")).await;

        let mut ids: Vec<String> = list_driver_trips(&store, "m1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_payment_status_update() {
        let store = MemoryStore::new();
        insert(&store, "v1", Trip::default()).await;

        let updated = update_payment_status(&store, "v1", PaymentStatus::SinalPago)
            .await
            .unwrap();
        assert_eq!(updated.trip.status_pagamento, PaymentStatus::SinalPago);

        let missing = update_trip_status(&store, "nope", TripStatus::Cancelado).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_settings_default_when_missing() {
        let store = MemoryStore::new();
        let settings = load_settings(&store).await.unwrap();
        assert_eq!(settings.porcentagem_sinal_padrao, 40);
        assert_eq!(settings.status_viagem.len(), 6);
    }
}
