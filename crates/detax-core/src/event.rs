//! Domain events: the append-only audit trail of every committed command.
//!
//! Events are never updated or deleted. They are an audit record, not the
//! source of truth: current state always comes from the aggregate tables.
//! Each event carries a statically shaped payload discriminated by its
//! `event_type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  document::Document,
  project::{FileId, Project, ProjectFile, ProjectId},
};

// ─── Aggregate identity ──────────────────────────────────────────────────────

/// The aggregate family an event stream belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AggregateType {
  Document,
  Project,
}

/// Identifies one event stream.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AggregateRef {
  pub aggregate_type: AggregateType,
  pub aggregate_id:   i64,
}

impl AggregateRef {
  pub fn document(id: i64) -> Self {
    Self { aggregate_type: AggregateType::Document, aggregate_id: id }
  }

  pub fn project(id: i64) -> Self {
    Self { aggregate_type: AggregateType::Project, aggregate_id: id }
  }
}

/// The unqualified transition an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum EventType {
  Created,
  Updated,
  Deleted,
  FileAdded,
  FileRemoved,
}

// ─── Payloads ────────────────────────────────────────────────────────────────

/// Result of a delete command and payload of the `*Deleted` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
  pub id: i64,
}

/// Payload of the project file events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
  pub file_id:    FileId,
  pub project_id: ProjectId,
  pub filename:   String,
  pub path:       Option<String>,
}

impl From<&ProjectFile> for FileChange {
  fn from(file: &ProjectFile) -> Self {
    Self {
      file_id:    file.id,
      project_id: file.project_id,
      filename:   file.filename.clone(),
      path:       file.path.clone(),
    }
  }
}

/// The typed payload of a domain event. The variant name is the
/// `event_type` discriminant stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload")]
pub enum EventPayload {
  DocumentCreated(Document),
  DocumentUpdated(Document),
  DocumentDeleted(Deleted),
  ProjectCreated(Project),
  ProjectUpdated(Project),
  ProjectDeleted(Deleted),
  ProjectFileAdded(FileChange),
  ProjectFileRemoved(FileChange),
}

impl EventPayload {
  /// The discriminant string stored in the `event_type` column.
  /// Must match the serde variant names above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::DocumentCreated(_) => "DocumentCreated",
      Self::DocumentUpdated(_) => "DocumentUpdated",
      Self::DocumentDeleted(_) => "DocumentDeleted",
      Self::ProjectCreated(_) => "ProjectCreated",
      Self::ProjectUpdated(_) => "ProjectUpdated",
      Self::ProjectDeleted(_) => "ProjectDeleted",
      Self::ProjectFileAdded(_) => "ProjectFileAdded",
      Self::ProjectFileRemoved(_) => "ProjectFileRemoved",
    }
  }

  pub fn event_type(&self) -> EventType {
    match self {
      Self::DocumentCreated(_) | Self::ProjectCreated(_) => EventType::Created,
      Self::DocumentUpdated(_) | Self::ProjectUpdated(_) => EventType::Updated,
      Self::DocumentDeleted(_) | Self::ProjectDeleted(_) => EventType::Deleted,
      Self::ProjectFileAdded(_) => EventType::FileAdded,
      Self::ProjectFileRemoved(_) => EventType::FileRemoved,
    }
  }

  /// The stream this payload belongs to. File events go to the owning
  /// project's stream.
  pub fn aggregate(&self) -> AggregateRef {
    match self {
      Self::DocumentCreated(d) | Self::DocumentUpdated(d) => {
        AggregateRef::document(d.id)
      }
      Self::DocumentDeleted(d) => AggregateRef::document(d.id),
      Self::ProjectCreated(p) | Self::ProjectUpdated(p) => {
        AggregateRef::project(p.id)
      }
      Self::ProjectDeleted(d) => AggregateRef::project(d.id),
      Self::ProjectFileAdded(f) | Self::ProjectFileRemoved(f) => {
        AggregateRef::project(f.project_id)
      }
    }
  }

  /// Serialise the inner payload (without the type tag) for the `payload`
  /// column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("payload").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Rebuild a payload from the stored discriminant and JSON body.
  pub fn from_parts(
    discriminant: &str,
    data: serde_json::Value,
  ) -> Result<Self> {
    if !Self::DISCRIMINANTS.iter().any(|d| *d == discriminant) {
      return Err(Error::UnknownEventType(discriminant.to_owned()));
    }
    let wrapped =
      serde_json::json!({ "event_type": discriminant, "payload": data });
    Ok(serde_json::from_value(wrapped)?)
  }

  const DISCRIMINANTS: [&'static str; 8] = [
    "DocumentCreated",
    "DocumentUpdated",
    "DocumentDeleted",
    "ProjectCreated",
    "ProjectUpdated",
    "ProjectDeleted",
    "ProjectFileAdded",
    "ProjectFileRemoved",
  ];
}

// ─── Metadata ────────────────────────────────────────────────────────────────

/// Context recorded alongside the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
  /// Name of the command that produced the event, e.g. `"CreateDocument"`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub command: Option<String>,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// An event ready to be appended. The stream is derived from the payload so
/// the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
  pub payload:  EventPayload,
  pub metadata: EventMetadata,
}

impl NewEvent {
  pub fn new(payload: EventPayload) -> Self {
    Self { payload, metadata: EventMetadata::default() }
  }

  pub fn with_command(mut self, command: &str) -> Self {
    self.metadata.command = Some(command.to_owned());
    self
  }

  pub fn aggregate(&self) -> AggregateRef { self.payload.aggregate() }
}

/// An immutable, persisted domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
  pub id:             Uuid,
  pub aggregate_type: AggregateType,
  pub aggregate_id:   i64,
  #[serde(flatten)]
  pub payload:        EventPayload,
  pub metadata:       EventMetadata,
  /// Store-assigned; non-decreasing within one aggregate's stream.
  pub created_at:     DateTime<Utc>,
}

impl DomainEvent {
  pub fn aggregate(&self) -> AggregateRef {
    AggregateRef {
      aggregate_type: self.aggregate_type,
      aggregate_id:   self.aggregate_id,
    }
  }

  pub fn event_type(&self) -> EventType { self.payload.event_type() }
}
