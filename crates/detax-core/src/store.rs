//! The `AggregateStore` and `EventLog` traits and their query types.
//!
//! Both traits are implemented by storage backends (e.g.
//! `detax-store-sqlite`). Command handlers, the context projector and the
//! HTTP layer depend on these abstractions, not on any concrete backend.
//!
//! The aggregate write and the event append are separate calls:
//! there is no transaction spanning both.

use std::future::Future;

use crate::{
  document::{
    Document, DocumentId, DocumentStats, NewDocument, SearchHit,
    normalize_category,
  },
  event::{AggregateRef, DomainEvent, NewEvent},
  project::{FileId, NewProject, NewProjectFile, Project, ProjectFile, ProjectId},
};

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const DEFAULT_EVENT_LIMIT: usize = 50;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`AggregateStore::list_documents`].
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
  pub category:     Option<String>,
  pub limit:        Option<usize>,
  /// Order by id descending instead of ascending.
  pub newest_first: bool,
}

impl DocumentQuery {
  pub fn limit(&self) -> usize { self.limit.unwrap_or(DEFAULT_LIST_LIMIT) }

  /// The category filter in stored form; a blank filter matches everything.
  pub fn category(&self) -> Option<String> { category_filter(self.category.as_deref()) }
}

/// Parameters for [`AggregateStore::search_documents`].
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// Plain text; every whitespace-separated term must match.
  pub text:     String,
  pub category: Option<String>,
  pub limit:    Option<usize>,
}

impl SearchQuery {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into(), ..Self::default() }
  }

  pub fn limit(&self) -> usize { self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT) }

  /// The category filter in stored form; a blank filter matches everything.
  pub fn category(&self) -> Option<String> { category_filter(self.category.as_deref()) }
}

fn category_filter(raw: Option<&str>) -> Option<String> {
  raw.map(normalize_category).filter(|c| !c.is_empty())
}

/// Parameters for [`AggregateStore::list_projects`].
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
  /// Exact match on the project's contact.
  pub contact: Option<String>,
  pub limit:   Option<usize>,
}

impl ProjectQuery {
  pub fn limit(&self) -> usize { self.limit.unwrap_or(DEFAULT_LIST_LIMIT) }
}

// ─── AggregateStore ──────────────────────────────────────────────────────────

/// Transactional access to the document, project and project-file tables.
///
/// Every method runs in its own transaction. Absence is reported through
/// `Option` / `bool` rather than an error so callers can map it onto their
/// own not-found handling; a missing row is never partially mutated.
pub trait AggregateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Round-trip to the backend without touching any table.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Documents ─────────────────────────────────────────────────────────

  fn create_document(
    &self,
    input: NewDocument,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  fn get_document(
    &self,
    id: DocumentId,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Overwrite a document. Returns `None` if `id` does not exist.
  fn update_document(
    &self,
    id: DocumentId,
    input: NewDocument,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Returns `false` if `id` does not exist.
  fn delete_document(
    &self,
    id: DocumentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_documents(
    &self,
    query: DocumentQuery,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + '_;

  /// Total document count and per-category counts.
  fn document_stats(
    &self,
  ) -> impl Future<Output = Result<DocumentStats, Self::Error>> + Send + '_;

  /// Relevance-ranked full-text search, best match first.
  fn search_documents(
    &self,
    query: SearchQuery,
  ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send + '_;

  // ── Projects ──────────────────────────────────────────────────────────

  fn create_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    id: ProjectId,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Overwrite a project. Returns `None` if `id` does not exist.
  fn update_project(
    &self,
    id: ProjectId,
    input: NewProject,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Returns `false` if `id` does not exist. Files are not cascaded.
  fn delete_project(
    &self,
    id: ProjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_projects(
    &self,
    query: ProjectQuery,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  /// Every project, unpaginated.
  fn all_projects(
    &self,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  // ── Project files ─────────────────────────────────────────────────────

  /// Attach a file. Returns `None` if the owning project does not exist.
  fn add_project_file(
    &self,
    input: NewProjectFile,
  ) -> impl Future<Output = Result<Option<ProjectFile>, Self::Error>> + Send + '_;

  fn get_project_file(
    &self,
    id: FileId,
  ) -> impl Future<Output = Result<Option<ProjectFile>, Self::Error>> + Send + '_;

  /// Detach a file and return the removed row, or `None` if it did not
  /// exist.
  fn remove_project_file(
    &self,
    id: FileId,
  ) -> impl Future<Output = Result<Option<ProjectFile>, Self::Error>> + Send + '_;

  fn list_project_files(
    &self,
    project_id: ProjectId,
  ) -> impl Future<Output = Result<Vec<ProjectFile>, Self::Error>> + Send + '_;

  /// Every project file, unpaginated.
  fn all_project_files(
    &self,
  ) -> impl Future<Output = Result<Vec<ProjectFile>, Self::Error>> + Send + '_;
}

// ─── EventLog ────────────────────────────────────────────────────────────────

/// Append-only storage of [`DomainEvent`]s, keyed per aggregate.
pub trait EventLog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert one event stamped with the current time.
  fn try_append(
    &self,
    event: NewEvent,
  ) -> impl Future<Output = Result<DomainEvent, Self::Error>> + Send + '_;

  /// Events of one aggregate in ascending `created_at` order, at most
  /// `limit` of them. An aggregate with no history yields an empty vector.
  fn read(
    &self,
    aggregate: AggregateRef,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<DomainEvent>, Self::Error>> + Send + '_;

  /// Best-effort append: a failure is logged and swallowed, never surfaced
  /// to the command that triggered it.
  fn append(
    &self,
    event: NewEvent,
  ) -> impl Future<Output = Option<DomainEvent>> + Send + '_ {
    async move {
      let aggregate = event.aggregate();
      let event_type = event.payload.discriminant();
      match self.try_append(event).await {
        Ok(stored) => Some(stored),
        Err(err) => {
          tracing::error!(
            aggregate_type = %aggregate.aggregate_type,
            aggregate_id = aggregate.aggregate_id,
            event_type,
            error = %err,
            "domain event append failed; committed state has no audit entry"
          );
          None
        }
      }
    }
  }
}
