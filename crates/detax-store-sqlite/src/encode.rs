//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that text order equals time order. Event
//! payloads and metadata are stored as compact JSON. Event ids are stored as
//! hyphenated lowercase UUIDs.

use chrono::{DateTime, SecondsFormat, Utc};
use detax_core::{
  document::Document,
  event::{AggregateType, DomainEvent, EventMetadata, EventPayload},
  project::{Project, ProjectFile},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── AggregateType ───────────────────────────────────────────────────────────

pub fn decode_aggregate_type(s: &str) -> Result<AggregateType> {
  s.parse()
    .map_err(|_| Error::UnknownAggregateType(s.to_owned()))
}

// ─── LIMIT ───────────────────────────────────────────────────────────────────

pub fn encode_limit(limit: usize) -> i64 {
  i64::try_from(limit).unwrap_or(i64::MAX)
}

// ─── Aggregate rows ──────────────────────────────────────────────────────────

/// Expects columns `id, title, source, category, content`.
pub fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
  Ok(Document {
    id:       row.get(0)?,
    title:    row.get(1)?,
    source:   row.get(2)?,
    category: row.get(3)?,
    content:  row.get(4)?,
  })
}

/// Expects columns `id, name, description, contact`.
pub fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
  Ok(Project {
    id:          row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    contact:     row.get(3)?,
  })
}

/// Expects columns `id, project_id, filename, path`.
pub fn file_from_row(row: &Row<'_>) -> rusqlite::Result<ProjectFile> {
  Ok(ProjectFile {
    id:         row.get(0)?,
    project_id: row.get(1)?,
    filename:   row.get(2)?,
    path:       row.get(3)?,
  })
}

// ─── Event rows ──────────────────────────────────────────────────────────────

/// Raw strings read directly from a `domain_events` row.
pub struct RawEvent {
  pub event_id:       String,
  pub aggregate_type: String,
  pub aggregate_id:   i64,
  pub event_type:     String,
  pub payload:        String,
  pub metadata:       String,
  pub created_at:     String,
}

impl RawEvent {
  /// Expects columns `event_id, aggregate_type, aggregate_id, event_type,
  /// payload, metadata, created_at`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:       row.get(0)?,
      aggregate_type: row.get(1)?,
      aggregate_id:   row.get(2)?,
      event_type:     row.get(3)?,
      payload:        row.get(4)?,
      metadata:       row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_event(self) -> Result<DomainEvent> {
    let data: serde_json::Value = serde_json::from_str(&self.payload)?;
    let metadata: EventMetadata = serde_json::from_str(&self.metadata)?;

    Ok(DomainEvent {
      id: Uuid::parse_str(&self.event_id)?,
      aggregate_type: decode_aggregate_type(&self.aggregate_type)?,
      aggregate_id: self.aggregate_id,
      payload: EventPayload::from_parts(&self.event_type, data)?,
      metadata,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
