use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::booking::ServiceType;
use crate::store::{sanitize, Document, Fields, StoreError, StoreResult};
use crate::utils::pricing::{compute_deposit, DEFAULT_DEPOSIT_PERCENT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    #[default]
    Reservado,
    IdaIniciada,
    IdaFinalizada,
    VoltaIniciada,
    VoltaFinalizada,
    Cancelado,
}

impl TripStatus {
    pub const ALL: [TripStatus; 6] = [
        TripStatus::Reservado,
        TripStatus::IdaIniciada,
        TripStatus::IdaFinalizada,
        TripStatus::VoltaIniciada,
        TripStatus::VoltaFinalizada,
        TripStatus::Cancelado,
    ];

    pub fn is_outbound_leg(self) -> bool {
        matches!(self, TripStatus::IdaIniciada | TripStatus::IdaFinalizada)
    }

    pub fn is_return_leg(self) -> bool {
        matches!(self, TripStatus::VoltaIniciada | TripStatus::VoltaFinalizada)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pendente,
    SinalPago,
    PagoCompleto,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pendente,
        PaymentStatus::SinalPago,
        PaymentStatus::PagoCompleto,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Passenger {
    pub nome: String,
    pub documento: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idade: Option<i64>,
}

/// Canonical trip (viagem) document body. The document id lives outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trip {
    pub pacote_id: String,
    pub pacote_titulo: String,
    pub cliente_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserva_original_id: Option<String>,

    pub is_ida_e_volta: bool,
    pub data_ida: String,
    pub data_volta: String,
    pub hora_ida: String,
    pub hora_volta: String,

    pub motorista_ida_id: String,
    pub motorista_volta_id: String,

    pub status: TripStatus,

    pub valor_total: f64,
    pub porcentagem_sinal: i64,
    pub valor_sinal: f64,
    pub valor_restante: f64,
    pub status_pagamento: PaymentStatus,

    pub ponto_partida: String,
    pub ponto_destino: String,

    pub cliente_nome: String,
    pub cliente_email: String,
    pub cliente_telefone: String,
    pub cliente_cpf: String,

    pub total_passageiros: i64,
    pub passageiros_lista: Vec<Passenger>,
    pub passageiros_texto: String,
    pub tipo_veiculo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_servico: Option<ServiceType>,
    pub observacoes: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exemplo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for Trip {
    fn default() -> Self {
        Self {
            pacote_id: String::new(),
            pacote_titulo: String::new(),
            cliente_id: String::new(),
            reserva_original_id: None,
            is_ida_e_volta: false,
            data_ida: String::new(),
            data_volta: String::new(),
            hora_ida: String::new(),
            hora_volta: String::new(),
            motorista_ida_id: String::new(),
            motorista_volta_id: String::new(),
            status: TripStatus::default(),
            valor_total: 0.0,
            porcentagem_sinal: DEFAULT_DEPOSIT_PERCENT,
            valor_sinal: 0.0,
            valor_restante: 0.0,
            status_pagamento: PaymentStatus::default(),
            ponto_partida: String::new(),
            ponto_destino: String::new(),
            cliente_nome: String::new(),
            cliente_email: String::new(),
            cliente_telefone: String::new(),
            cliente_cpf: String::new(),
            total_passageiros: 0,
            passageiros_lista: Vec::new(),
            passageiros_texto: String::new(),
            tipo_veiculo: String::new(),
            tipo_servico: None,
            observacoes: String::new(),
            is_exemplo: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Trip {
    /// Recompute `valorSinal` / `valorRestante` from total and percentage.
    pub fn apply_deposit(&mut self) {
        let split = compute_deposit(self.valor_total, Some(self.porcentagem_sinal));
        self.valor_sinal = split.deposit;
        self.valor_restante = split.remainder;
    }

    pub fn is_example(&self) -> bool {
        self.is_exemplo == Some(true)
    }

    pub fn to_fields(&self) -> StoreResult<Fields> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(sanitize(map)),
            _ => unreachable!("Trip serializes to a JSON object"),
        }
    }
}

/// A trip as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredTrip {
    pub id: String,
    #[serde(flatten)]
    pub trip: Trip,
}

impl TryFrom<Document> for StoredTrip {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let trip = serde_json::from_value(Value::Object(doc.data))?;
        Ok(Self { id: doc.id, trip })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names() {
        let trip = Trip {
            is_ida_e_volta: true,
            reserva_original_id: Some("r1".to_string()),
            status_pagamento: PaymentStatus::SinalPago,
            ..Default::default()
        };
        let fields = trip.to_fields().unwrap();

        assert_eq!(fields["isIdaEVolta"], json!(true));
        assert_eq!(fields["reservaOriginalId"], json!("r1"));
        assert_eq!(fields["statusPagamento"], json!("sinal_pago"));
        assert_eq!(fields["status"], json!("reservado"));
        assert!(!fields.contains_key("isExemplo"));
        assert!(!fields.contains_key("createdAt"));
    }

    #[test]
    fn test_sparse_document_reads_with_defaults() {
        let doc = Document::new(
            "v1",
            json!({ "valorTotal": 500.0, "status": "ida_iniciada" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let stored = StoredTrip::try_from(doc).unwrap();

        assert_eq!(stored.id, "v1");
        assert_eq!(stored.trip.status, TripStatus::IdaIniciada);
        assert_eq!(stored.trip.porcentagem_sinal, 40);
        assert_eq!(stored.trip.motorista_ida_id, "");
    }

    #[test]
    fn test_apply_deposit() {
        let mut trip = Trip {
            valor_total: 1000.0,
            porcentagem_sinal: 30,
            ..Default::default()
        };
        trip.apply_deposit();
        assert_eq!(trip.valor_sinal, 300.0);
        assert_eq!(trip.valor_restante, 700.0);
    }
}
