//! Booking → trip mapping.
//!
//! [`map_booking_to_trip`] is pure: it borrows the booking, the linked
//! package and the caller's overrides and returns a fresh [`Trip`]. Every
//! field group follows a fixed precedence, first non-empty wins.

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::booking::{Booking, ServiceType};
use crate::models::package::Package;
use crate::models::trip::{PaymentStatus, Trip, TripStatus};
use crate::normalize::normalize_booking;
use crate::utils::fields::{as_amount, as_bool, as_int, first_match, first_text, FieldPath};

/// Values the admin sets on the conversion form; each one beats anything
/// found on the booking or package.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOverrides {
    pub pacote_id: Option<String>,
    pub pacote_titulo: Option<String>,
    pub cliente_id: Option<String>,
    pub is_ida_e_volta: Option<bool>,
    pub data_ida: Option<String>,
    pub data_volta: Option<String>,
    pub hora_ida: Option<String>,
    pub hora_volta: Option<String>,
    pub valor_total: Option<f64>,
    pub porcentagem_sinal: Option<i64>,
    pub ponto_partida: Option<String>,
    pub ponto_destino: Option<String>,
    pub observacoes: Option<String>,
}

impl ConversionOverrides {
    /// Reject financial input the calculator would pass through blindly.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(percent) = self.porcentagem_sinal {
            if !(0..=100).contains(&percent) {
                return Err(AppError::BadRequest(format!(
                    "porcentagemSinal must be between 0 and 100, got {}",
                    percent
                )));
            }
        }
        if let Some(total) = self.valor_total {
            if !total.is_finite() || total < 0.0 {
                return Err(AppError::BadRequest(
                    "valorTotal must be a non-negative amount".to_string(),
                ));
            }
        }
        Ok(())
    }
}

pub(crate) mod paths {
    use crate::utils::fields::FieldPath;

    pub const PACOTE_ID: &[FieldPath] = &[FieldPath(&["pacoteId"]), FieldPath(&["passeio", "id"])];
    pub const PACOTE_TITULO: &[FieldPath] = &[FieldPath(&["pacoteTitulo"])];
    pub const CLIENTE_ID: &[FieldPath] = &[FieldPath(&["clienteId"]), FieldPath(&["userId"])];
    pub const VALOR_TOTAL: &[FieldPath] = &[
        FieldPath(&["valorTotal"]),
        FieldPath(&["valor"]),
        FieldPath(&["preco"]),
        FieldPath(&["pagamento", "valorTotal"]),
    ];
    pub const PORCENTAGEM_SINAL: &[FieldPath] = &[FieldPath(&["porcentagemSinal"])];
    pub const IS_IDA_E_VOLTA: &[FieldPath] = &[FieldPath(&["isIdaEVolta"])];
    pub const PONTO_PARTIDA: &[FieldPath] = &[
        FieldPath(&["pontoPartida"]),
        FieldPath(&["enderecoOrigem"]),
        FieldPath(&["origem"]),
    ];
    pub const PONTO_DESTINO: &[FieldPath] = &[
        FieldPath(&["pontoDestino"]),
        FieldPath(&["enderecoDestino"]),
        FieldPath(&["destino"]),
    ];
    pub const DATA_IDA: &[FieldPath] = &[FieldPath(&["dataIda"])];
    pub const HORA_IDA: &[FieldPath] = &[FieldPath(&["horaIda"])];
    pub const DATA_VOLTA: &[FieldPath] = &[FieldPath(&["dataVolta"])];
    pub const HORA_VOLTA: &[FieldPath] = &[FieldPath(&["horaVolta"])];
    pub const CLIENTE_NOME: &[FieldPath] = &[
        FieldPath(&["clienteNome"]),
        FieldPath(&["responsavel", "nome"]),
        FieldPath(&["nome"]),
    ];
    pub const CLIENTE_EMAIL: &[FieldPath] = &[
        FieldPath(&["clienteEmail"]),
        FieldPath(&["responsavel", "email"]),
        FieldPath(&["email"]),
    ];
    pub const CLIENTE_TELEFONE: &[FieldPath] = &[FieldPath(&["clienteTelefone"])];
    pub const TELEFONE: &[FieldPath] = &[FieldPath(&["telefone"])];
    pub const CLIENTE_CPF: &[FieldPath] = &[
        FieldPath(&["clienteCpf"]),
        FieldPath(&["responsavel", "cpf"]),
        FieldPath(&["cpf"]),
    ];
    pub const STATUS_PAGAMENTO: &[FieldPath] = &[FieldPath(&["statusPagamento"])];
}

/// Take the override when it holds text, else walk the fallbacks.
fn pick_text(override_value: Option<&String>, fallbacks: &[Option<String>]) -> String {
    override_value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| fallbacks.iter().flatten().find(|s| !s.is_empty()).cloned())
        .unwrap_or_default()
}

pub fn map_booking_to_trip(
    booking: &Booking,
    package: Option<&Package>,
    overrides: &ConversionOverrides,
    default_percent: i64,
) -> Trip {
    let data = &booking.data;
    let normalized = normalize_booking(booking);
    let text = |candidates: &[FieldPath]| first_text(data, candidates);
    let package_titulo = package.map(|p| p.titulo.clone());

    let valor_total = overrides
        .valor_total
        .or_else(|| first_match(data, paths::VALOR_TOTAL, as_amount))
        .or_else(|| package.and_then(|p| p.preco))
        .unwrap_or(0.0);

    let porcentagem_sinal = overrides
        .porcentagem_sinal
        .or_else(|| first_match(data, paths::PORCENTAGEM_SINAL, as_int))
        .or_else(|| package.and_then(|p| p.porcentagem_sinal))
        .unwrap_or(default_percent);

    let is_ida_e_volta = overrides
        .is_ida_e_volta
        .or_else(|| first_match(data, paths::IS_IDA_E_VOLTA, as_bool))
        .or_else(|| (booking.tipo == Some(ServiceType::TransferChegadaSaida)).then_some(true))
        .or_else(|| package.and_then(|p| p.is_ida_e_volta))
        .unwrap_or(false);

    // A bare country code is not a phone number
    let responsavel_telefone = {
        let r = &booking.responsavel;
        (!r.telefone.trim().is_empty())
            .then(|| format!("{} {}", r.ddi.trim(), r.telefone.trim()).trim().to_string())
    };

    let status_pagamento = first_match(data, paths::STATUS_PAGAMENTO, |v| {
        serde_json::from_value::<PaymentStatus>(v.clone()).ok()
    })
    .unwrap_or_default();

    let mut trip = Trip {
        pacote_id: pick_text(
            overrides.pacote_id.as_ref(),
            &[text(paths::PACOTE_ID), package.map(|p| p.id.clone())],
        ),
        pacote_titulo: pick_text(
            overrides.pacote_titulo.as_ref(),
            &[
                text(paths::PACOTE_TITULO),
                Some(normalized.passeio_nome.clone()),
                package_titulo.clone(),
            ],
        ),
        cliente_id: pick_text(overrides.cliente_id.as_ref(), &[text(paths::CLIENTE_ID)]),
        reserva_original_id: Some(booking.id.clone()),

        is_ida_e_volta,
        data_ida: pick_text(
            overrides.data_ida.as_ref(),
            &[text(paths::DATA_IDA), Some(normalized.data_passeio.clone())],
        ),
        hora_ida: pick_text(
            overrides.hora_ida.as_ref(),
            &[
                text(paths::HORA_IDA),
                Some(normalized.hora_passeio.clone()),
                Some(normalized.hora_saida.clone()),
            ],
        ),
        data_volta: pick_text(overrides.data_volta.as_ref(), &[text(paths::DATA_VOLTA)]),
        hora_volta: pick_text(
            overrides.hora_volta.as_ref(),
            &[text(paths::HORA_VOLTA), Some(normalized.hora_retorno.clone())],
        ),

        motorista_ida_id: String::new(),
        motorista_volta_id: String::new(),
        status: TripStatus::Reservado,

        valor_total,
        porcentagem_sinal,
        valor_sinal: 0.0,
        valor_restante: 0.0,
        status_pagamento,

        ponto_partida: pick_text(
            overrides.ponto_partida.as_ref(),
            &[
                text(paths::PONTO_PARTIDA),
                Some(normalized.local_saida.clone()),
            ],
        ),
        ponto_destino: pick_text(
            overrides.ponto_destino.as_ref(),
            &[text(paths::PONTO_DESTINO), package_titulo],
        ),

        cliente_nome: text(paths::CLIENTE_NOME).unwrap_or_default(),
        cliente_email: text(paths::CLIENTE_EMAIL).unwrap_or_default(),
        cliente_telefone: pick_text(
            None,
            &[
                text(paths::CLIENTE_TELEFONE),
                responsavel_telefone,
                text(paths::TELEFONE),
            ],
        ),
        cliente_cpf: text(paths::CLIENTE_CPF).unwrap_or_default(),

        total_passageiros: normalized.total_passageiros,
        passageiros_lista: normalized.passageiros_lista,
        passageiros_texto: normalized.passageiros_texto,
        tipo_veiculo: normalized.tipo_veiculo,
        tipo_servico: booking.tipo,
        observacoes: pick_text(
            overrides.observacoes.as_ref(),
            &[Some(normalized.observacoes)],
        ),

        is_exemplo: None,
        created_at: None,
        updated_at: None,
    };
    trip.apply_deposit();
    trip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Document;
    use serde_json::{json, Value};

    fn booking(id: &str, value: Value) -> Booking {
        Booking::from_document(Document::new(id, value.as_object().cloned().unwrap()))
    }

    fn package() -> Package {
        Package {
            id: "p1".to_string(),
            titulo: "Praia de Pipa".to_string(),
            preco: Some(180.0),
            is_ida_e_volta: Some(true),
            porcentagem_sinal: Some(30),
        }
    }

    #[test]
    fn test_total_falls_back_to_valor() {
        let b = booking("r1", json!({ "valorTotal": null, "valor": 250 }));
        let trip = map_booking_to_trip(&b, None, &ConversionOverrides::default(), 40);

        assert_eq!(trip.valor_total, 250.0);
        assert_eq!(trip.valor_sinal, 100.0);
        assert_eq!(trip.valor_restante, 150.0);
    }

    #[test]
    fn test_total_precedence() {
        let b = booking(
            "r1",
            json!({ "valor": "R$ 300,00", "preco": 200, "pagamento": { "valorTotal": 150 } }),
        );
        let pkg = package();

        let trip = map_booking_to_trip(&b, Some(&pkg), &ConversionOverrides::default(), 40);
        assert_eq!(trip.valor_total, 300.0);

        let overrides = ConversionOverrides {
            valor_total: Some(999.0),
            ..Default::default()
        };
        let trip = map_booking_to_trip(&b, Some(&pkg), &overrides, 40);
        assert_eq!(trip.valor_total, 999.0);

        let bare = booking("r2", json!({}));
        let trip = map_booking_to_trip(&bare, Some(&pkg), &ConversionOverrides::default(), 40);
        assert_eq!(trip.valor_total, 180.0);

        let trip = map_booking_to_trip(&bare, None, &ConversionOverrides::default(), 40);
        assert_eq!(trip.valor_total, 0.0);
    }

    #[test]
    fn test_package_fallbacks() {
        let b = booking("r1", json!({ "tipo": "passeio" }));
        let pkg = package();
        let trip = map_booking_to_trip(&b, Some(&pkg), &ConversionOverrides::default(), 40);

        assert_eq!(trip.pacote_id, "p1");
        assert_eq!(trip.pacote_titulo, "Praia de Pipa");
        assert_eq!(trip.ponto_destino, "Praia de Pipa");
        assert_eq!(trip.porcentagem_sinal, 30);
        assert!(trip.is_ida_e_volta);
        assert_eq!(trip.valor_sinal, 54.0);
        assert_eq!(trip.valor_restante, 126.0);
    }

    #[test]
    fn test_location_cascade() {
        let b = booking(
            "r1",
            json!({ "enderecoOrigem": "Hotel Ponta Negra", "origem": "Natal", "destino": "Aeroporto" }),
        );
        let trip = map_booking_to_trip(&b, None, &ConversionOverrides::default(), 40);
        assert_eq!(trip.ponto_partida, "Hotel Ponta Negra");
        assert_eq!(trip.ponto_destino, "Aeroporto");

        let overrides = ConversionOverrides {
            ponto_partida: Some("Rodoviaria".to_string()),
            ponto_destino: Some("   ".to_string()),
            ..Default::default()
        };
        let trip = map_booking_to_trip(&b, None, &overrides, 40);
        assert_eq!(trip.ponto_partida, "Rodoviaria");
        assert_eq!(trip.ponto_destino, "Aeroporto");
    }

    #[test]
    fn test_client_fields_from_legacy_and_current_shapes() {
        let legacy = booking(
            "r1",
            json!({ "nome": "Bruno", "email": "b@x.com", "telefone": "9999", "cpf": "111" }),
        );
        let trip = map_booking_to_trip(&legacy, None, &ConversionOverrides::default(), 40);
        assert_eq!(trip.cliente_nome, "Bruno");
        assert_eq!(trip.cliente_email, "b@x.com");
        assert_eq!(trip.cliente_telefone, "9999");
        assert_eq!(trip.cliente_cpf, "111");

        let current = booking(
            "r2",
            json!({
                "clienteNome": "Dona Maria",
                "responsavel": { "nome": "Maria", "ddi": "+55", "telefone": "84 98888-1111" },
            }),
        );
        let trip = map_booking_to_trip(&current, None, &ConversionOverrides::default(), 40);
        assert_eq!(trip.cliente_nome, "Dona Maria");
        assert_eq!(trip.cliente_telefone, "+55 84 98888-1111");
    }

    #[test]
    fn test_country_code_alone_falls_through_to_flat_phone() {
        let b = booking(
            "r1",
            json!({
                "responsavel": { "nome": "Ana", "ddi": "+55", "telefone": "" },
                "telefone": "84 9999-0000",
            }),
        );
        let trip = map_booking_to_trip(&b, None, &ConversionOverrides::default(), 40);
        assert_eq!(trip.cliente_telefone, "84 9999-0000");

        let empty = booking("r2", json!({ "responsavel": { "ddi": "+55" } }));
        let trip = map_booking_to_trip(&empty, None, &ConversionOverrides::default(), 40);
        assert_eq!(trip.cliente_telefone, "");
    }

    #[test]
    fn test_round_trip_transfer_and_schedule() {
        let b = booking(
            "r1",
            json!({
                "tipo": "transfer_chegada_saida",
                "dataPasseio": "2025-01-10",
                "horaSaida": "14:00",
                "horaRetorno": "09:30",
                "dataVolta": "2025-01-15",
            }),
        );
        let trip = map_booking_to_trip(&b, None, &ConversionOverrides::default(), 40);

        assert!(trip.is_ida_e_volta);
        assert_eq!(trip.data_ida, "2025-01-10");
        assert_eq!(trip.hora_ida, "14:00");
        assert_eq!(trip.data_volta, "2025-01-15");
        assert_eq!(trip.hora_volta, "09:30");
        assert_eq!(trip.tipo_servico, Some(ServiceType::TransferChegadaSaida));
    }

    #[test]
    fn test_output_never_holds_null() {
        let bookings = [
            booking("r1", json!({})),
            booking("r2", json!({ "valor": null, "responsavel": null, "detalhes": null })),
            booking(
                "r3",
                json!({ "passeio": { "nome": "Buggy" }, "passageirosLista": [{ "nome": "Ana" }] }),
            ),
        ];

        for b in &bookings {
            let fields = map_booking_to_trip(b, None, &ConversionOverrides::default(), 40)
                .to_fields()
                .unwrap();
            assert!(fields.values().all(|v| !v.is_null()), "null in {:?}", fields);
            assert_eq!(fields["reservaOriginalId"], json!(b.id));
            assert_eq!(fields["status"], json!("reservado"));
            assert_eq!(fields["motoristaIdaId"], json!(""));
        }
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let b = booking("r1", json!({ "valor": 100, "origem": "Natal" }));
        let before = b.clone();
        let overrides = ConversionOverrides::default();

        let _ = map_booking_to_trip(&b, None, &overrides, 40);
        assert_eq!(b, before);
    }

    #[test]
    fn test_override_validation() {
        let bad_percent = ConversionOverrides {
            porcentagem_sinal: Some(120),
            ..Default::default()
        };
        assert!(matches!(bad_percent.validate(), Err(AppError::BadRequest(_))));

        let negative = ConversionOverrides {
            valor_total: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        assert!(ConversionOverrides::default().validate().is_ok());
    }
}
