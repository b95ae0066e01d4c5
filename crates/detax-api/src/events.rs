//! Handlers for `/events`: the audit history of one aggregate.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use detax_core::{
  event::{AggregateRef, DomainEvent},
  store::{AggregateStore, DEFAULT_EVENT_LIMIT, EventLog},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::{ApiError, PathParam, QueryParams},
};

#[derive(Debug, Deserialize, Default)]
pub struct HistoryParams {
  pub limit: Option<usize>,
}

/// `GET /events/documents/{id}[?limit=...]`
pub async fn document_history<S>(
  state: State<AppState<S>>,
  id: PathParam<i64>,
  params: QueryParams<HistoryParams>,
) -> Result<Json<Vec<DomainEvent>>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Path(id) = id?;
  history(state, AggregateRef::document(id), params?).await
}

/// `GET /events/projects/{id}[?limit=...]`
pub async fn project_history<S>(
  state: State<AppState<S>>,
  id: PathParam<i64>,
  params: QueryParams<HistoryParams>,
) -> Result<Json<Vec<DomainEvent>>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Path(id) = id?;
  history(state, AggregateRef::project(id), params?).await
}

/// Oldest first. An aggregate that never existed has an empty history, not a
/// 404: the log is queried by reference, not by live row.
async fn history<S>(
  State(state): State<AppState<S>>,
  aggregate: AggregateRef,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<DomainEvent>>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let limit = params.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
  let events = EventLog::read(state.store.as_ref(), aggregate, limit)
    .await
    .map_err(detax_core::Error::store)?;
  Ok(Json(events))
}
