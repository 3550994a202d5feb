// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/server/routes.rs
// Version: 1.0.0
//
// This file implements the request handlers of the local HTTP API. Each
// handler extracts its input, runs the offline client call on tokio's
// blocking pool and wraps the result as JSON.
//
// Tree Location:
// - src/server/routes.rs (API handlers)
// - Depends on: axum, store, mining

use super::error::{ApiError, ApiResult};
use crate::core::{EntityKind, Record};
use crate::mining::{ProfitabilityReport, profitability_report};
use crate::store::{
    Ack, Deleted, LlmResponse, OfflineClient, StoreError, StoreResult, User, into_record,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

const LOG_TARGET: &str = "cmo::server";

pub type AppState = Arc<OfflineClient>;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PageVisit {
    pub page_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

fn entity_kind(name: &str) -> ApiResult<EntityKind> {
    name.parse::<EntityKind>()
        .map_err(|e| ApiError::from(StoreError::from(e)))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Run a store call on the blocking pool; file storage does synchronous I/O.
async fn blocking<T, F>(client: AppState, work: F) -> ApiResult<T>
where
    F: FnOnce(&OfflineClient) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&client))
        .await
        .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?
        .map_err(ApiError::from)
}

pub async fn list_entities(
    State(client): State<AppState>,
    Path(entity): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Record>>> {
    let Query(query) = query?;
    let kind = entity_kind(&entity)?;
    debug!(target: LOG_TARGET, "📄 GET {} sort={:?} limit={:?}", kind, query.sort, query.limit);
    let records = blocking(client, move |client| {
        client.entities(kind).list(query.sort.as_deref(), query.limit)
    })
    .await?;
    Ok(Json(records))
}

pub async fn create_entity(
    State(client): State<AppState>,
    Path(entity): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let kind = entity_kind(&entity)?;
    let Json(value) = body?;
    let data = into_record(value)?;
    let record = blocking(client, move |client| client.entities(kind).create(data)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_entity(
    State(client): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let kind = entity_kind(&entity)?;
    let record = blocking(client, move |client| {
        client
            .entities(kind)
            .get(&id)?
            .ok_or(StoreError::RecordNotFound { entity: kind, id })
    })
    .await?;
    Ok(Json(record))
}

pub async fn update_entity(
    State(client): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Record>> {
    let kind = entity_kind(&entity)?;
    let Json(value) = body?;
    let data = into_record(value)?;
    let record = blocking(client, move |client| client.entities(kind).update(&id, data)).await?;
    Ok(Json(record))
}

pub async fn delete_entity(
    State(client): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<Json<Deleted>> {
    let kind = entity_kind(&entity)?;
    Ok(Json(blocking(client, move |client| client.entities(kind).delete(&id)).await?))
}

pub async fn me(State(client): State<AppState>) -> ApiResult<Json<User>> {
    Ok(Json(blocking(client, |client| client.me()).await?))
}

pub async fn logout(State(client): State<AppState>) -> ApiResult<Json<Ack>> {
    blocking(client, |client| client.logout()).await?;
    Ok(Json(Ack::OK))
}

pub async fn log_app_visit(
    State(client): State<AppState>,
    body: Result<Json<PageVisit>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(visit) = body?;
    Ok(Json(
        blocking(client, move |client| client.log_user_in_app(&visit.page_name)).await?,
    ))
}

pub async fn invoke_llm(
    State(client): State<AppState>,
    body: Result<Json<LlmRequest>, JsonRejection>,
) -> ApiResult<Json<LlmResponse>> {
    let Json(request) = body?;
    Ok(Json(
        blocking(client, move |client| {
            let mut rng = StdRng::from_entropy();
            client.invoke_llm(&request.prompt, &mut rng)
        })
        .await?,
    ))
}

pub async fn send_email(
    State(client): State<AppState>,
    body: Result<Json<EmailRequest>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let Json(email) = body?;
    Ok(Json(
        blocking(client, move |client| {
            client.send_email(&email.to, &email.subject, &email.body)
        })
        .await?,
    ))
}

pub async fn profitability(State(client): State<AppState>) -> ApiResult<Json<ProfitabilityReport>> {
    Ok(Json(blocking(client, |client| profitability_report(client)).await?))
}
