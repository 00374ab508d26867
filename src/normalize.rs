//! Canonical flat view over a booking of any historical shape.
//!
//! Every output field has a fixed, ordered list of candidate locations in
//! [`paths`]; the first one holding a usable value wins. Nothing here
//! fails: a field with no candidate resolves to its empty default.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::models::booking::Booking;
use crate::models::trip::Passenger;
use crate::utils::fields::{as_int, as_text, first_match, first_text, FieldPath};

/// Candidate locations per normalized field, highest priority first.
pub mod paths {
    use crate::utils::fields::FieldPath;

    pub const PASSEIO_NOME: &[FieldPath] = &[
        FieldPath(&["passeio", "nome"]),
        FieldPath(&["nomePasseio"]),
        FieldPath(&["detalhes", "nomePasseio"]),
    ];
    pub const DATA_PASSEIO: &[FieldPath] = &[
        FieldPath(&["dataPasseio"]),
        FieldPath(&["detalhes", "dataPasseio"]),
        FieldPath(&["detalhes", "data"]),
        FieldPath(&["data"]),
    ];
    pub const HORA_PASSEIO: &[FieldPath] = &[
        FieldPath(&["horaPasseio"]),
        FieldPath(&["detalhes", "horaPasseio"]),
        FieldPath(&["detalhes", "hora"]),
        FieldPath(&["hora"]),
    ];
    pub const HORA_SAIDA: &[FieldPath] = &[
        FieldPath(&["horaSaida"]),
        FieldPath(&["detalhes", "horaSaida"]),
        FieldPath(&["detalhes", "horarioSaida"]),
    ];
    pub const HORA_RETORNO: &[FieldPath] = &[
        FieldPath(&["horaRetorno"]),
        FieldPath(&["detalhes", "horaRetorno"]),
        FieldPath(&["detalhes", "horarioRetorno"]),
    ];
    pub const LOCAL_SAIDA: &[FieldPath] = &[
        FieldPath(&["localSaida"]),
        FieldPath(&["detalhes", "localSaida"]),
        FieldPath(&["detalhes", "localEmbarque"]),
        FieldPath(&["hotel"]),
    ];
    pub const TIPO_VEICULO: &[FieldPath] = &[
        FieldPath(&["tipoVeiculo"]),
        FieldPath(&["veiculo", "tipo"]),
        FieldPath(&["detalhes", "tipoVeiculo"]),
    ];
    pub const PASSAGEIROS_LISTA: &[FieldPath] = &[
        FieldPath(&["passageirosLista"]),
        FieldPath(&["detalhes", "passageirosLista"]),
    ];
    pub const PASSAGEIROS_TEXTO: &[FieldPath] = &[
        FieldPath(&["passageirosTexto"]),
        FieldPath(&["passageiros"]),
        FieldPath(&["detalhes", "passageiros"]),
    ];
    pub const TOTAL_PASSAGEIROS: &[FieldPath] = &[
        FieldPath(&["totalPassageiros"]),
        FieldPath(&["passageiros"]),
        FieldPath(&["detalhes", "totalPassageiros"]),
        FieldPath(&["detalhes", "passageiros"]),
    ];
    pub const OBSERVACOES: &[FieldPath] = &[
        FieldPath(&["observacoes"]),
        FieldPath(&["detalhes", "observacoes"]),
        FieldPath(&["obs"]),
    ];
    pub const PAGAMENTO: &[FieldPath] = &[
        FieldPath(&["pagamento"]),
        FieldPath(&["detalhes", "pagamento"]),
    ];
    pub const QUANTIDADES: &[FieldPath] = &[
        FieldPath(&["quantidades"]),
        FieldPath(&["detalhes", "quantidades"]),
    ];
    pub const VOO: &[FieldPath] = &[FieldPath(&["voo"]), FieldPath(&["detalhes", "voo"])];
    pub const DETALHES: &[FieldPath] = &[FieldPath(&["detalhes"])];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBooking {
    pub passeio_nome: String,
    pub data_passeio: String,
    pub hora_passeio: String,
    pub hora_saida: String,
    pub hora_retorno: String,
    pub local_saida: String,
    pub tipo_veiculo: String,
    pub passageiros_lista: Vec<Passenger>,
    pub passageiros_texto: String,
    pub total_passageiros: i64,
    pub observacoes: String,
    pub pagamento: Map<String, Value>,
    pub quantidades: Map<String, Value>,
    pub voo: Map<String, Value>,
    pub detalhes: Map<String, Value>,
}

pub fn normalize_booking(booking: &Booking) -> NormalizedBooking {
    let data = &booking.data;
    let text = |candidates: &[FieldPath]| first_text(data, candidates).unwrap_or_default();
    let object = |candidates: &[FieldPath]| {
        first_match(data, candidates, |v| v.as_object().cloned()).unwrap_or_default()
    };

    let quantidades = object(paths::QUANTIDADES);
    let total_passageiros = first_match(data, paths::TOTAL_PASSAGEIROS, as_int)
        .unwrap_or_else(|| count_from_quantities(&quantidades));

    NormalizedBooking {
        passeio_nome: text(paths::PASSEIO_NOME),
        data_passeio: text(paths::DATA_PASSEIO),
        hora_passeio: text(paths::HORA_PASSEIO),
        hora_saida: text(paths::HORA_SAIDA),
        hora_retorno: text(paths::HORA_RETORNO),
        local_saida: text(paths::LOCAL_SAIDA),
        tipo_veiculo: text(paths::TIPO_VEICULO),
        passageiros_lista: first_match(data, paths::PASSAGEIROS_LISTA, passenger_list)
            .unwrap_or_default(),
        // A numeric `passageiros` is a head count, not a description
        passageiros_texto: first_match(data, paths::PASSAGEIROS_TEXTO, |v| {
            v.as_str().map(|s| s.trim().to_string())
        })
        .unwrap_or_default(),
        total_passageiros,
        observacoes: text(paths::OBSERVACOES),
        pagamento: object(paths::PAGAMENTO),
        quantidades,
        voo: first_match(data, paths::VOO, flight).unwrap_or_default(),
        detalhes: object(paths::DETALHES),
    }
}

fn passenger_list(value: &Value) -> Option<Vec<Passenger>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .map(|p| Passenger {
                nome: p.get("nome").and_then(as_text).unwrap_or_default(),
                documento: p.get("documento").and_then(as_text).unwrap_or_default(),
                idade: p.get("idade").and_then(as_int),
            })
            .collect(),
    )
}

/// Older bookings store only the flight number as a string.
fn flight(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::String(number) => json!({ "numero": number.trim() }).as_object().cloned(),
        _ => None,
    }
}

fn count_from_quantities(quantidades: &Map<String, Value>) -> i64 {
    ["adultos", "criancas"]
        .iter()
        .filter_map(|k| quantidades.get(*k).and_then(as_int))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Document;

    fn booking(value: Value) -> Booking {
        Booking::from_document(Document::new("r1", value.as_object().cloned().unwrap()))
    }

    #[test]
    fn test_trip_name_priority() {
        let all = booking(json!({
            "passeio": { "nome": "Buggy Genipabu" },
            "nomePasseio": "Litoral Sul",
            "detalhes": { "nomePasseio": "Pipa" },
        }));
        assert_eq!(normalize_booking(&all).passeio_nome, "Buggy Genipabu");

        let flat = booking(json!({
            "passeio": { "nome": "" },
            "nomePasseio": "Litoral Sul",
            "detalhes": { "nomePasseio": "Pipa" },
        }));
        assert_eq!(normalize_booking(&flat).passeio_nome, "Litoral Sul");

        let nested = booking(json!({ "detalhes": { "nomePasseio": "Pipa" } }));
        assert_eq!(normalize_booking(&nested).passeio_nome, "Pipa");
    }

    #[test]
    fn test_missing_fields_resolve_to_empty_defaults() {
        let normalized = normalize_booking(&booking(json!({ "tipo": "passeio" })));
        assert_eq!(normalized, NormalizedBooking::default());
        assert_eq!(normalized.passeio_nome, "");
    }

    #[test]
    fn test_objects_are_not_merged() {
        let normalized = normalize_booking(&booking(json!({
            "pagamento": { "metodo": "pix" },
            "detalhes": { "pagamento": { "valorTotal": 300 } },
        })));
        assert_eq!(normalized.pagamento, json!({ "metodo": "pix" }).as_object().cloned().unwrap());
    }

    #[test]
    fn test_empty_object_falls_through() {
        let normalized = normalize_booking(&booking(json!({
            "quantidades": {},
            "detalhes": { "quantidades": { "adultos": 2, "criancas": 1 } },
        })));
        assert_eq!(normalized.quantidades["adultos"], json!(2));
        assert_eq!(normalized.total_passageiros, 3);
    }

    #[test]
    fn test_passenger_fields() {
        let normalized = normalize_booking(&booking(json!({
            "passageiros": 4,
            "detalhes": { "passageiros": "2 adultos e 2 criancas" },
            "passageirosLista": [
                { "nome": "Ana", "documento": "123", "idade": 34 },
                { "nome": "Leo", "idade": "7" },
                "lixo",
            ],
        })));

        assert_eq!(normalized.total_passageiros, 4);
        assert_eq!(normalized.passageiros_texto, "2 adultos e 2 criancas");
        assert_eq!(normalized.passageiros_lista.len(), 2);
        assert_eq!(normalized.passageiros_lista[1].idade, Some(7));
        assert_eq!(normalized.passageiros_lista[1].documento, "");
    }

    #[test]
    fn test_flight_number_string() {
        let normalized = normalize_booking(&booking(json!({ "voo": "AD 4521" })));
        assert_eq!(normalized.voo["numero"], json!("AD 4521"));
    }

    #[test]
    fn test_numeric_hour_is_rendered_as_text() {
        let normalized = normalize_booking(&booking(json!({ "detalhes": { "hora": 8 } })));
        assert_eq!(normalized.hora_passeio, "8");
    }
}
