//! The write side: one handler per command.
//!
//! Every handler validates its input, performs exactly one
//! [`AggregateStore`] mutation and, only if that succeeded, appends one
//! domain event describing the resulting state. The append is best-effort
//! (see [`EventLog::append`]): a failed append leaves committed state without
//! an audit entry and is only logged. [`crate::audit`] can find such gaps
//! afterwards.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
  EntityKind, Error, Result,
  document::{Document, DocumentId, NewDocument, normalize_category},
  event::{Deleted, EventPayload, FileChange, NewEvent},
  project::{
    FileId, NewProject, NewProjectFile, Project, ProjectFile, ProjectId,
  },
  store::{AggregateStore, EventLog},
};

// ─── Commands ────────────────────────────────────────────────────────────────

// Command bodies use camelCase field names on the wire.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
  pub title:    String,
  #[serde(default)]
  pub source:   Option<String>,
  pub category: String,
  pub content:  String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocument {
  pub id:       DocumentId,
  pub title:    String,
  #[serde(default)]
  pub source:   Option<String>,
  pub category: String,
  pub content:  String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocument {
  pub id: DocumentId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub contact:     Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
  pub id:          ProjectId,
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub contact:     Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProject {
  pub id: ProjectId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProjectFile {
  pub project_id: ProjectId,
  pub filename:   String,
  #[serde(default)]
  pub path:       Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveProjectFile {
  pub file_id: FileId,
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn required(field: &str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation(format!("{field} must not be blank")));
  }
  Ok(trimmed.to_owned())
}

fn optional(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn document_input(
  title: &str,
  source: Option<String>,
  category: &str,
  content: String,
) -> Result<NewDocument> {
  Ok(NewDocument {
    title: required("title", title)?,
    source: optional(source),
    category: normalize_category(&required("category", category)?),
    content,
  })
}

impl CreateDocument {
  pub fn validate(self) -> Result<NewDocument> {
    document_input(&self.title, self.source, &self.category, self.content)
  }
}

impl UpdateDocument {
  pub fn validate(self) -> Result<(DocumentId, NewDocument)> {
    let input =
      document_input(&self.title, self.source, &self.category, self.content)?;
    Ok((self.id, input))
  }
}

impl CreateProject {
  pub fn validate(self) -> Result<NewProject> {
    Ok(NewProject {
      name:        required("name", &self.name)?,
      description: optional(self.description),
      contact:     optional(self.contact),
    })
  }
}

impl UpdateProject {
  pub fn validate(self) -> Result<(ProjectId, NewProject)> {
    let input = NewProject {
      name:        required("name", &self.name)?,
      description: optional(self.description),
      contact:     optional(self.contact),
    };
    Ok((self.id, input))
  }
}

impl AddProjectFile {
  pub fn validate(self) -> Result<NewProjectFile> {
    Ok(NewProjectFile {
      project_id: self.project_id,
      filename:   required("filename", &self.filename)?,
      path:       optional(self.path),
    })
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// Executes commands against an [`AggregateStore`] and records the outcome in
/// an [`EventLog`]. Both are injected, so tests can substitute fakes.
pub struct CommandHandlers<S, L> {
  store: Arc<S>,
  log:   Arc<L>,
}

impl<S, L> Clone for CommandHandlers<S, L> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), log: Arc::clone(&self.log) }
  }
}

impl<S, L> CommandHandlers<S, L>
where
  S: AggregateStore,
  L: EventLog,
{
  pub fn new(store: Arc<S>, log: Arc<L>) -> Self { Self { store, log } }

  // ── Documents ─────────────────────────────────────────────────────────

  pub async fn create_document(&self, cmd: CreateDocument) -> Result<Document> {
    let input = cmd.validate()?;
    let document = self
      .store
      .create_document(input)
      .await
      .map_err(Error::store)?;
    tracing::info!(document_id = document.id, "CreateDocument");

    self
      .record("CreateDocument", EventPayload::DocumentCreated(document.clone()))
      .await;
    Ok(document)
  }

  pub async fn update_document(&self, cmd: UpdateDocument) -> Result<Document> {
    let (id, input) = cmd.validate()?;
    let document = self
      .store
      .update_document(id, input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(EntityKind::Document, id))?;
    tracing::info!(document_id = id, "UpdateDocument");

    self
      .record("UpdateDocument", EventPayload::DocumentUpdated(document.clone()))
      .await;
    Ok(document)
  }

  pub async fn delete_document(&self, cmd: DeleteDocument) -> Result<Deleted> {
    let id = cmd.id;
    let deleted = self.store.delete_document(id).await.map_err(Error::store)?;
    if !deleted {
      return Err(Error::not_found(EntityKind::Document, id));
    }
    tracing::info!(document_id = id, "DeleteDocument");

    let result = Deleted { id };
    self
      .record("DeleteDocument", EventPayload::DocumentDeleted(result))
      .await;
    Ok(result)
  }

  // ── Projects ──────────────────────────────────────────────────────────

  pub async fn create_project(&self, cmd: CreateProject) -> Result<Project> {
    let input = cmd.validate()?;
    let project = self
      .store
      .create_project(input)
      .await
      .map_err(Error::store)?;
    tracing::info!(project_id = project.id, "CreateProject");

    self
      .record("CreateProject", EventPayload::ProjectCreated(project.clone()))
      .await;
    Ok(project)
  }

  pub async fn update_project(&self, cmd: UpdateProject) -> Result<Project> {
    let (id, input) = cmd.validate()?;
    let project = self
      .store
      .update_project(id, input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(EntityKind::Project, id))?;
    tracing::info!(project_id = id, "UpdateProject");

    self
      .record("UpdateProject", EventPayload::ProjectUpdated(project.clone()))
      .await;
    Ok(project)
  }

  pub async fn delete_project(&self, cmd: DeleteProject) -> Result<Deleted> {
    let id = cmd.id;
    let deleted = self.store.delete_project(id).await.map_err(Error::store)?;
    if !deleted {
      return Err(Error::not_found(EntityKind::Project, id));
    }
    tracing::info!(project_id = id, "DeleteProject");

    let result = Deleted { id };
    self
      .record("DeleteProject", EventPayload::ProjectDeleted(result))
      .await;
    Ok(result)
  }

  // ── Project files ─────────────────────────────────────────────────────

  pub async fn add_project_file(
    &self,
    cmd: AddProjectFile,
  ) -> Result<ProjectFile> {
    let input = cmd.validate()?;
    let project_id = input.project_id;
    let file = self
      .store
      .add_project_file(input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(EntityKind::Project, project_id))?;
    tracing::info!(project_id, file_id = file.id, "AddProjectFile");

    self
      .record(
        "AddProjectFile",
        EventPayload::ProjectFileAdded(FileChange::from(&file)),
      )
      .await;
    Ok(file)
  }

  pub async fn remove_project_file(
    &self,
    cmd: RemoveProjectFile,
  ) -> Result<Deleted> {
    let id = cmd.file_id;
    let removed = self
      .store
      .remove_project_file(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(EntityKind::ProjectFile, id))?;
    tracing::info!(
      project_id = removed.project_id,
      file_id = id,
      "RemoveProjectFile"
    );

    self
      .record(
        "RemoveProjectFile",
        EventPayload::ProjectFileRemoved(FileChange::from(&removed)),
      )
      .await;
    Ok(Deleted { id })
  }

  async fn record(&self, command: &str, payload: EventPayload) {
    self.log.append(NewEvent::new(payload).with_command(command)).await;
  }
}
