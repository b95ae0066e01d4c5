//! Handlers for `/documents`, `/documents/stats` and `/search`.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use detax_core::{
  EntityKind,
  document::{Document, DocumentId, DocumentStats, SearchHit},
  store::{AggregateStore, DocumentQuery, EventLog, SearchQuery},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::{ApiError, PathParam, QueryParams},
};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub category: Option<String>,
  pub limit:    Option<usize>,
}

/// `GET /documents[?category=...][&limit=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: QueryParams<ListParams>,
) -> Result<Json<Vec<Document>>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Query(params) = params?;
  let documents = state
    .store
    .list_documents(DocumentQuery {
      category: params.category,
      limit: params.limit,
      ..Default::default()
    })
    .await
    .map_err(detax_core::Error::store)?;
  Ok(Json(documents))
}

/// `GET /documents/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  id: PathParam<DocumentId>,
) -> Result<Json<Document>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Path(id) = id?;
  let document = state
    .store
    .get_document(id)
    .await
    .map_err(detax_core::Error::store)?
    .ok_or(detax_core::Error::not_found(EntityKind::Document, id))?;
  Ok(Json(document))
}

/// `GET /documents/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<DocumentStats>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let stats = state
    .store
    .document_stats()
    .await
    .map_err(detax_core::Error::store)?;
  Ok(Json(stats))
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Plain-text query; every term must match.
  #[serde(default)]
  pub q:        String,
  pub category: Option<String>,
  pub limit:    Option<usize>,
}

/// `GET /search?q=...[&category=...][&limit=...]`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  params: QueryParams<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Query(params) = params?;
  let hits = state
    .store
    .search_documents(SearchQuery {
      text:     params.q,
      category: params.category,
      limit:    params.limit,
    })
    .await
    .map_err(detax_core::Error::store)?;
  Ok(Json(hits))
}
