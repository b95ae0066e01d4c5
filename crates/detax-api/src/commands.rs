//! Handlers for `POST /commands/...`.
//!
//! Each route deserialises one command body and hands it to
//! [`detax_core::command::CommandHandlers`]. Creates answer `201 Created`,
//! everything else `200 OK`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use detax_core::{
  command::{
    AddProjectFile, CreateDocument, CreateProject, DeleteDocument,
    DeleteProject, RemoveProjectFile, UpdateDocument, UpdateProject,
  },
  document::Document,
  event::Deleted,
  project::Project,
  store::{AggregateStore, EventLog},
};

use crate::{AppState, error::ApiError};

type Body<T> = Result<Json<T>, JsonRejection>;

// ─── Documents ────────────────────────────────────────────────────────────────

/// `POST /commands/documents/create`
pub async fn create_document<S>(
  State(state): State<AppState<S>>,
  body: Body<CreateDocument>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Json(cmd) = body?;
  let document = state.commands.create_document(cmd).await?;
  Ok((StatusCode::CREATED, Json(document)))
}

/// `POST /commands/documents/update`
pub async fn update_document<S>(
  State(state): State<AppState<S>>,
  body: Body<UpdateDocument>,
) -> Result<Json<Document>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Json(cmd) = body?;
  Ok(Json(state.commands.update_document(cmd).await?))
}

/// `POST /commands/documents/delete`
pub async fn delete_document<S>(
  State(state): State<AppState<S>>,
  body: Body<DeleteDocument>,
) -> Result<Json<Deleted>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Json(cmd) = body?;
  Ok(Json(state.commands.delete_document(cmd).await?))
}

// ─── Projects ─────────────────────────────────────────────────────────────────

/// `POST /commands/projects/create`
pub async fn create_project<S>(
  State(state): State<AppState<S>>,
  body: Body<CreateProject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Json(cmd) = body?;
  let project = state.commands.create_project(cmd).await?;
  Ok((StatusCode::CREATED, Json(project)))
}

/// `POST /commands/projects/update`
pub async fn update_project<S>(
  State(state): State<AppState<S>>,
  body: Body<UpdateProject>,
) -> Result<Json<Project>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Json(cmd) = body?;
  Ok(Json(state.commands.update_project(cmd).await?))
}

/// `POST /commands/projects/delete`
pub async fn delete_project<S>(
  State(state): State<AppState<S>>,
  body: Body<DeleteProject>,
) -> Result<Json<Deleted>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Json(cmd) = body?;
  Ok(Json(state.commands.delete_project(cmd).await?))
}

/// `POST /commands/projects/add-file`
pub async fn add_project_file<S>(
  State(state): State<AppState<S>>,
  body: Body<AddProjectFile>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Json(cmd) = body?;
  let file = state.commands.add_project_file(cmd).await?;
  Ok((StatusCode::CREATED, Json(file)))
}

/// `POST /commands/projects/remove-file`
pub async fn remove_project_file<S>(
  State(state): State<AppState<S>>,
  body: Body<RemoveProjectFile>,
) -> Result<Json<Deleted>, ApiError>
where
  S: AggregateStore + EventLog,
{
  let Json(cmd) = body?;
  Ok(Json(state.commands.remove_project_file(cmd).await?))
}
