//! Handlers for `/context`: the contact hierarchy and channel
//! recommendation.

use axum::{
  Json,
  extract::{Query, State},
};
use detax_core::{
  context::{ChannelRecommendation, ContextHierarchy},
  project::{FileId, ProjectId},
  store::{AggregateStore, EventLog},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::{ApiError, QueryParams},
};

/// `GET /context/hierarchy`
pub async fn hierarchy<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<ContextHierarchy>, ApiError>
where
  S: AggregateStore + EventLog,
{
  Ok(Json(state.projector.get_hierarchy().await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct ChannelParams {
  pub contact:    Option<String>,
  pub project_id: Option<ProjectId>,
  pub file_id:    Option<FileId>,
}

/// `GET /context/channels[?contact=...][&project_id=...][&file_id=...]`
pub async fn channels<S>(
  State(state): State<AppState<S>>,
  params: QueryParams<ChannelParams>,
) -> Result<Json<ChannelRecommendation>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Query(params) = params?;
  let recommendation = state
    .projector
    .recommend_channels(params.contact, params.project_id, params.file_id)
    .await?;
  Ok(Json(recommendation))
}
