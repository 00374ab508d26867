use serde::{Deserialize, Serialize};

use super::booking::BookingStatus;
use super::trip::{PaymentStatus, TripStatus};
use crate::utils::pricing::DEFAULT_DEPOSIT_PERCENT;

/// Document id of the trip settings singleton inside `settings`.
pub const TRIP_SETTINGS_ID: &str = "viagens";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripSettings {
    pub status_viagem: Vec<TripStatus>,
    pub status_pagamento: Vec<PaymentStatus>,
    pub status_reserva: Vec<BookingStatus>,
    pub porcentagem_sinal_padrao: i64,
}

impl Default for TripSettings {
    fn default() -> Self {
        Self {
            status_viagem: TripStatus::ALL.to_vec(),
            status_pagamento: PaymentStatus::ALL.to_vec(),
            status_reserva: BookingStatus::ALL.to_vec(),
            porcentagem_sinal_padrao: DEFAULT_DEPOSIT_PERCENT,
        }
    }
}
