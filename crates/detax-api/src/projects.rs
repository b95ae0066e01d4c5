//! Handlers for `/projects`.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use detax_core::{
  EntityKind,
  project::{Project, ProjectFile, ProjectId},
  store::{AggregateStore, EventLog, ProjectQuery},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::{ApiError, PathParam, QueryParams},
};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub contact: Option<String>,
  pub limit:   Option<usize>,
}

/// `GET /projects[?contact=...][&limit=...]`, newest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: QueryParams<ListParams>,
) -> Result<Json<Vec<Project>>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Query(params) = params?;
  let projects = state
    .store
    .list_projects(ProjectQuery { contact: params.contact, limit: params.limit })
    .await
    .map_err(detax_core::Error::store)?;
  Ok(Json(projects))
}

/// `GET /projects/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  id: PathParam<ProjectId>,
) -> Result<Json<Project>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Path(id) = id?;
  let project = state
    .projector
    .get_project(id)
    .await?
    .ok_or(detax_core::Error::not_found(EntityKind::Project, id))?;
  Ok(Json(project))
}

/// `GET /projects/{id}/files`
///
/// Lists whatever files reference `id`, so files left behind by a deleted
/// project are still reachable here.
pub async fn files<S>(
  State(state): State<AppState<S>>,
  id: PathParam<ProjectId>,
) -> Result<Json<Vec<ProjectFile>>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Path(id) = id?;
  let files = state
    .store
    .list_project_files(id)
    .await
    .map_err(detax_core::Error::store)?;
  Ok(Json(files))
}
