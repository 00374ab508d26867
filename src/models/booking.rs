//! Booking (reserva) documents.
//!
//! Several historical document shapes live side by side in `reservas`.
//! [`BookingShape`] tells them apart and [`Booking::from_document`] always
//! hands the rest of the crate the current shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::{Document, Fields};
use crate::utils::fields::{as_text, is_present};
use crate::utils::timestamp::parse_timestamp;

/// Schema template kept in the collection. Never a real booking.
pub const TEMPLATE_BOOKING_ID: &str = "_modelo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Passeio,
    TransferChegada,
    TransferSaida,
    TransferChegadaSaida,
    TransferEntreHoteis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pendente,
    Confirmada,
    Cancelada,
    Concluida,
    AguardandoAprovacao,
    Aprovada,
    Delegada,
    PendenteCorrecao,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 8] = [
        BookingStatus::Pendente,
        BookingStatus::Confirmada,
        BookingStatus::Cancelada,
        BookingStatus::Concluida,
        BookingStatus::AguardandoAprovacao,
        BookingStatus::Aprovada,
        BookingStatus::Delegada,
        BookingStatus::PendenteCorrecao,
    ];
}

/// Person responsible for the booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Responsavel {
    pub nome: String,
    pub email: String,
    pub ddi: String,
    pub telefone: String,
    pub cpf: String,
}

const CLIENT_FIELDS: [&str; 5] = ["nome", "email", "ddi", "telefone", "cpf"];
const COUNT_FIELDS: [&str; 3] = ["adultos", "criancas", "malas"];

#[derive(Debug, Clone, PartialEq)]
pub enum BookingShape {
    /// Flat client fields, flat passenger counts or `dataCriacao`.
    Legacy(Document),
    Current(Document),
}

impl BookingShape {
    pub fn classify(doc: Document) -> Self {
        if is_legacy(&doc.data) {
            BookingShape::Legacy(doc)
        } else {
            BookingShape::Current(doc)
        }
    }

    pub fn into_current(self) -> Document {
        match self {
            BookingShape::Current(doc) => doc,
            BookingShape::Legacy(doc) => migrate_legacy(doc),
        }
    }
}

fn has_object(data: &Fields, key: &str) -> bool {
    data.get(key).is_some_and(Value::is_object)
}

/// Counts already nested, at the top level or under `detalhes`.
fn has_quantities(data: &Fields) -> bool {
    has_object(data, "quantidades")
        || data
            .get("detalhes")
            .and_then(Value::as_object)
            .is_some_and(|d| d.get("quantidades").is_some_and(Value::is_object))
}

fn lift(data: &Fields, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|k| {
            data.get(*k)
                .filter(|v| is_present(v))
                .map(|v| (k.to_string(), v.clone()))
        })
        .collect()
}

fn is_legacy(data: &Fields) -> bool {
    let flat_client = !has_object(data, "responsavel")
        && CLIENT_FIELDS
            .iter()
            .any(|k| data.get(*k).is_some_and(is_present));
    let flat_counts =
        !has_quantities(data) && COUNT_FIELDS.iter().any(|k| data.get(*k).is_some_and(is_present));
    let old_created = !data.contains_key("criadaEm") && data.contains_key("dataCriacao");

    flat_client || flat_counts || old_created
}

/// Lift legacy flat fields into their current nested homes. Flat keys are
/// left in place; nothing that already has a current-shape value is touched.
fn migrate_legacy(mut doc: Document) -> Document {
    let data = &mut doc.data;

    if !has_object(data, "responsavel") {
        let responsavel = lift(data, &CLIENT_FIELDS);
        if !responsavel.is_empty() {
            data.insert("responsavel".to_string(), Value::Object(responsavel));
        }
    }

    if !has_quantities(data) {
        let quantidades = lift(data, &COUNT_FIELDS);
        if !quantidades.is_empty() {
            data.insert("quantidades".to_string(), Value::Object(quantidades));
        }
    }

    if !data.contains_key("criadaEm") {
        if let Some(created) = data.get("dataCriacao").cloned() {
            data.insert("criadaEm".to_string(), created);
        }
    }

    doc
}

/// A booking in the current shape, with the few typed fields the crate
/// reasons about lifted out of the raw document.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub tipo: Option<ServiceType>,
    pub status: Option<BookingStatus>,
    pub responsavel: Responsavel,
    pub criada_em: Option<DateTime<Utc>>,
    pub atualizada_em: Option<DateTime<Utc>>,
    pub data: Fields,
}

impl Booking {
    pub fn from_document(doc: Document) -> Self {
        let Document { id, data } = BookingShape::classify(doc).into_current();

        let tipo = data.get("tipo").and_then(parse_enum);
        let status = data.get("status").and_then(parse_enum);
        if status.is_none() && data.get("status").is_some_and(is_present) {
            tracing::warn!(booking_id = %id, status = ?data.get("status"), "Unknown booking status");
        }

        let responsavel = data
            .get("responsavel")
            .and_then(Value::as_object)
            .map(read_responsavel)
            .unwrap_or_default();

        Self {
            id,
            tipo,
            status,
            responsavel,
            criada_em: data.get("criadaEm").and_then(parse_timestamp),
            atualizada_em: data.get("atualizadaEm").and_then(parse_timestamp),
            data,
        }
    }

    pub fn is_template(&self) -> bool {
        is_template_id(&self.id)
    }
}

pub fn is_template_id(id: &str) -> bool {
    id == TEMPLATE_BOOKING_ID
}

fn parse_enum<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

fn read_responsavel(map: &Map<String, Value>) -> Responsavel {
    let text = |key: &str| map.get(key).and_then(as_text).unwrap_or_default();
    Responsavel {
        nome: text("nome"),
        email: text("email"),
        ddi: text("ddi"),
        telefone: text("telefone"),
        cpf: text("cpf"),
    }
}
