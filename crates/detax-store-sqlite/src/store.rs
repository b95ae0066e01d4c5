//! [`SqliteStore`]: the SQLite implementation of [`AggregateStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use detax_core::{
  document::{
    CategoryCount, Document, DocumentId, DocumentStats, NewDocument, SearchHit,
  },
  project::{FileId, NewProject, NewProjectFile, Project, ProjectFile, ProjectId},
  store::{AggregateStore, DocumentQuery, ProjectQuery, SearchQuery},
};

use crate::{
  Result,
  encode::{document_from_row, encode_dt, encode_limit, file_from_row, project_from_row},
  schema::SCHEMA,
  search::build_match_expression,
};

const DOCUMENT_COLUMNS: &str = "id, title, source, category, content";
const PROJECT_COLUMNS: &str = "id, name, description, contact";
const FILE_COLUMNS: &str = "id, project_id, filename, path";

// ─── Store ───────────────────────────────────────────────────────────────────

/// The detax knowledge base backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted and every
/// call is serialised onto its worker thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── AggregateStore impl ─────────────────────────────────────────────────────

impl AggregateStore for SqliteStore {
  type Error = crate::Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn create_document(&self, input: NewDocument) -> Result<Document> {
    let now = encode_dt(Utc::now());

    let document = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents
             (title, source, category, content, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![
            input.title,
            input.source,
            input.category,
            input.content,
            now,
          ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(input.into_document(id))
      })
      .await?;

    tracing::debug!(document_id = document.id, "document inserted");
    Ok(document)
  }

  async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
    let document = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], document_from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(document)
  }

  async fn update_document(
    &self,
    id: DocumentId,
    input: NewDocument,
  ) -> Result<Option<Document>> {
    let now = encode_dt(Utc::now());

    let document = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "UPDATE documents
              SET title = ?2, source = ?3, category = ?4, content = ?5,
                  updated_at = ?6
            WHERE id = ?1
           RETURNING {DOCUMENT_COLUMNS}"
        );
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![
                id,
                input.title,
                input.source,
                input.category,
                input.content,
                now,
              ],
              document_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(document)
  }

  async fn delete_document(&self, id: DocumentId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM documents WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn list_documents(&self, query: DocumentQuery) -> Result<Vec<Document>> {
    let limit = encode_limit(query.limit());
    let category = query.category();
    let direction = if query.newest_first { "DESC" } else { "ASC" };

    let documents = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE (?1 IS NULL OR category = ?1)
            ORDER BY id {direction}
            LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![category, limit], document_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(documents)
  }

  async fn document_stats(&self) -> Result<DocumentStats> {
    let stats = self
      .conn
      .call(|conn| {
        let total: i64 =
          conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;

        let mut stmt = conn.prepare(
          "SELECT category, COUNT(*) AS count
             FROM documents
            GROUP BY category
            ORDER BY count DESC, category",
        )?;
        let categories = stmt
          .query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok(CategoryCount { category: row.get(0)?, count: count.unsigned_abs() })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(DocumentStats { total_documents: total.unsigned_abs(), categories })
      })
      .await?;
    Ok(stats)
  }

  async fn search_documents(&self, query: SearchQuery) -> Result<Vec<SearchHit>> {
    let limit = query.limit();
    let Some(expression) = build_match_expression(&query.text) else {
      return Ok(Vec::new());
    };
    if limit == 0 {
      return Ok(Vec::new());
    }
    let limit = encode_limit(limit);
    let category = query.category();
    tracing::debug!(%expression, ?category, limit, "searching documents");

    let hits = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT d.id, d.title, d.source, d.category,
                  snippet(documents_fts, 0, '**', '**', ' … ', 32),
                  -bm25(documents_fts)
             FROM documents_fts
             JOIN documents d ON d.id = documents_fts.rowid
            WHERE documents_fts MATCH ?1
              AND (?2 IS NULL OR d.category = ?2)
            ORDER BY bm25(documents_fts), d.id
            LIMIT ?3",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![expression, category, limit], |row| {
            Ok(SearchHit {
              id:       row.get(0)?,
              title:    row.get(1)?,
              source:   row.get(2)?,
              category: row.get(3)?,
              snippet:  row.get(4)?,
              rank:     row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(hits)
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn create_project(&self, input: NewProject) -> Result<Project> {
    let now = encode_dt(Utc::now());

    let project = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO projects (name, description, contact, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![input.name, input.description, input.contact, now],
        )?;
        let id = conn.last_insert_rowid();
        Ok(input.into_project(id))
      })
      .await?;

    tracing::debug!(project_id = project.id, "project inserted");
    Ok(project)
  }

  async fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
    let project = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], project_from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(project)
  }

  async fn update_project(
    &self,
    id: ProjectId,
    input: NewProject,
  ) -> Result<Option<Project>> {
    let now = encode_dt(Utc::now());

    let project = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "UPDATE projects
              SET name = ?2, description = ?3, contact = ?4, updated_at = ?5
            WHERE id = ?1
           RETURNING {PROJECT_COLUMNS}"
        );
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![
                id,
                input.name,
                input.description,
                input.contact,
                now,
              ],
              project_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(project)
  }

  async fn delete_project(&self, id: ProjectId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM projects WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn list_projects(&self, query: ProjectQuery) -> Result<Vec<Project>> {
    let limit = encode_limit(query.limit());
    let contact = query.contact;

    let projects = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PROJECT_COLUMNS} FROM projects
            WHERE (?1 IS NULL OR contact = ?1)
            ORDER BY id DESC
            LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![contact, limit], project_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(projects)
  }

  async fn all_projects(&self) -> Result<Vec<Project>> {
    let projects = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], project_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(projects)
  }

  // ── Project files ─────────────────────────────────────────────────────────

  async fn add_project_file(
    &self,
    input: NewProjectFile,
  ) -> Result<Option<ProjectFile>> {
    let now = encode_dt(Utc::now());

    let file = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let owner_exists = tx
          .query_row(
            "SELECT 1 FROM projects WHERE id = ?1",
            rusqlite::params![input.project_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !owner_exists {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO project_files (project_id, filename, path, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![input.project_id, input.filename, input.path, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(input.into_file(id)))
      })
      .await?;

    if let Some(file) = &file {
      tracing::debug!(
        project_id = file.project_id,
        file_id = file.id,
        "project file inserted"
      );
    }
    Ok(file)
  }

  async fn get_project_file(&self, id: FileId) -> Result<Option<ProjectFile>> {
    let file = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {FILE_COLUMNS} FROM project_files WHERE id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], file_from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(file)
  }

  async fn remove_project_file(&self, id: FileId) -> Result<Option<ProjectFile>> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let sql = format!("SELECT {FILE_COLUMNS} FROM project_files WHERE id = ?1");
        let Some(file) = tx
          .query_row(&sql, rusqlite::params![id], file_from_row)
          .optional()?
        else {
          return Ok(None);
        };
        tx.execute("DELETE FROM project_files WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(Some(file))
      })
      .await?;
    Ok(removed)
  }

  async fn list_project_files(&self, project_id: ProjectId) -> Result<Vec<ProjectFile>> {
    let files = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {FILE_COLUMNS} FROM project_files WHERE project_id = ?1 ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![project_id], file_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(files)
  }

  async fn all_project_files(&self) -> Result<Vec<ProjectFile>> {
    let files = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {FILE_COLUMNS} FROM project_files ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], file_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(files)
  }
}
