//! First-start population of the document store.
//!
//! Each step checks for existing data and writes its defaults only when
//! nothing real is there. Seed documents carry fixed ids and are written
//! with `set`, so repeated or concurrent runs never add documents.
//! Failures are logged and never abort startup.

use std::future::Future;

use chrono::Utc;
use serde_json::{json, Value};

use crate::models::booking::{is_template_id, TEMPLATE_BOOKING_ID};
use crate::models::collections::{BANNERS, BLOG_POSTS, BOOKINGS, SETTINGS, TRIPS};
use crate::models::settings::{TripSettings, TRIP_SETTINGS_ID};
use crate::models::trip::Trip;
use crate::store::{Document, DocumentStore, Fields, StoreResult};

pub const EXAMPLE_TRIP_ID: &str = "_exemplo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Skipped,
    Seeded(usize),
    Failed,
}

/// Run `seed` unless `check` reports data already present.
pub async fn ensure_seeded<C, CF, S, SF>(name: &str, check: C, seed: S) -> SeedOutcome
where
    C: FnOnce() -> CF,
    CF: Future<Output = StoreResult<bool>>,
    S: FnOnce() -> SF,
    SF: Future<Output = StoreResult<usize>>,
{
    match check().await {
        Ok(true) => {
            tracing::debug!(target_name = name, "Seed skipped, data present");
            SeedOutcome::Skipped
        }
        Ok(false) => match seed().await {
            Ok(written) => {
                tracing::info!(target_name = name, written, "Seeded defaults");
                SeedOutcome::Seeded(written)
            }
            Err(e) => {
                tracing::error!(target_name = name, error = %e, "Seeding failed");
                SeedOutcome::Failed
            }
        },
        Err(e) => {
            tracing::error!(target_name = name, error = %e, "Seed check failed");
            SeedOutcome::Failed
        }
    }
}

/// Templates and example documents do not count as data.
pub fn is_real_document(doc: &Document) -> bool {
    !is_template_id(&doc.id) && doc.data.get("isExemplo") != Some(&Value::Bool(true))
}

pub async fn has_real_documents(store: &dyn DocumentStore, collection: &str) -> StoreResult<bool> {
    Ok(store.list(collection).await?.iter().any(is_real_document))
}

/// True when the collection holds anything at all, template included.
pub async fn has_any_documents(store: &dyn DocumentStore, collection: &str) -> StoreResult<bool> {
    Ok(!store.list(collection).await?.is_empty())
}

pub async fn document_exists(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> StoreResult<bool> {
    Ok(store.get(collection, id).await?.is_some())
}

async fn write_all(
    store: &dyn DocumentStore,
    collection: &str,
    docs: Vec<(&'static str, Fields)>,
) -> StoreResult<usize> {
    let count = docs.len();
    for (id, data) in docs {
        store.set(collection, id, data).await?;
    }
    Ok(count)
}

/// Seed every collection and singleton the application expects. Steps are
/// independent: one failing does not stop the others.
pub async fn seed_all(store: &dyn DocumentStore) -> Vec<(&'static str, SeedOutcome)> {
    let mut report = Vec::new();

    report.push((
        BANNERS,
        ensure_seeded(
            BANNERS,
            || has_real_documents(store, BANNERS),
            || write_all(store, BANNERS, default_banners()),
        )
        .await,
    ));

    report.push((
        BLOG_POSTS,
        ensure_seeded(
            BLOG_POSTS,
            || has_real_documents(store, BLOG_POSTS),
            || write_all(store, BLOG_POSTS, default_blog_posts()),
        )
        .await,
    ));

    report.push((
        TRIPS,
        ensure_seeded(
            TRIPS,
            || has_real_documents(store, TRIPS),
            move || async move {
                let example = example_trip()?;
                write_all(store, TRIPS, vec![(EXAMPLE_TRIP_ID, example)]).await
            },
        )
        .await,
    ));

    report.push((
        BOOKINGS,
        ensure_seeded(
            BOOKINGS,
            || has_any_documents(store, BOOKINGS),
            || write_all(store, BOOKINGS, vec![(TEMPLATE_BOOKING_ID, booking_template())]),
        )
        .await,
    ));

    report.push((
        SETTINGS,
        ensure_seeded(
            SETTINGS,
            || document_exists(store, SETTINGS, TRIP_SETTINGS_ID),
            move || async move {
                let settings = to_fields(serde_json::to_value(TripSettings::default())?);
                write_all(store, SETTINGS, vec![(TRIP_SETTINGS_ID, settings)]).await
            },
        )
        .await,
    ));

    report
}

fn to_fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn default_banners() -> Vec<(&'static str, Fields)> {
    vec![
        (
            "banner-boas-vindas",
            to_fields(json!({
                "titulo": "Conheça o litoral potiguar",
                "subtitulo": "Passeios e transfers com conforto e segurança",
                "imagemUrl": "",
                "link": "/pacotes",
                "ativo": true,
                "ordem": 1,
            })),
        ),
        (
            "banner-transfer",
            to_fields(json!({
                "titulo": "Transfer aeroporto ↔ hotel",
                "subtitulo": "Reserve com antecedência e pague só o sinal",
                "imagemUrl": "",
                "link": "/transfer",
                "ativo": true,
                "ordem": 2,
            })),
        ),
    ]
}

fn default_blog_posts() -> Vec<(&'static str, Fields)> {
    vec![(
        "post-primeira-viagem",
        to_fields(json!({
            "titulo": "Dicas para sua primeira viagem a Natal",
            "slug": "dicas-primeira-viagem-natal",
            "resumo": "O que levar, quando ir e quais passeios não perder.",
            "conteudo": "Protetor solar, roupas leves e disposição para as dunas.",
            "autor": "Equipe",
            "publicado": true,
            "criadoEm": Utc::now().to_rfc3339(),
        })),
    )]
}

fn example_trip() -> StoreResult<Fields> {
    let now = Utc::now().to_rfc3339();
    let mut trip = Trip {
        pacote_titulo: "Passeio de exemplo".to_string(),
        cliente_nome: "Cliente Exemplo".to_string(),
        data_ida: "2025-01-01".to_string(),
        hora_ida: "08:00".to_string(),
        ponto_partida: "Hotel".to_string(),
        ponto_destino: "Praia".to_string(),
        valor_total: 500.0,
        total_passageiros: 2,
        is_exemplo: Some(true),
        created_at: Some(now.clone()),
        updated_at: Some(now),
        ..Default::default()
    };
    trip.apply_deposit();
    trip.to_fields()
}

fn booking_template() -> Fields {
    to_fields(json!({
        "tipo": "passeio",
        "status": "pendente",
        "responsavel": { "nome": "", "email": "", "ddi": "+55", "telefone": "", "cpf": "" },
        "passeio": { "id": "", "nome": "" },
        "detalhes": {},
        "quantidades": { "adultos": 0, "criancas": 0, "malas": 0 },
        "passageirosLista": [],
        "pagamento": { "valorTotal": 0 },
        "observacoes": "",
    }))
}
