//! Projects and the files attached to them.

use serde::{Deserialize, Serialize};

pub type ProjectId = i64;
pub type FileId = i64;

/// A unit of client work, optionally owned by a contact (counterparty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub id:          ProjectId,
  pub name:        String,
  pub description: Option<String>,
  /// Free-text owner or counterparty name.
  pub contact:     Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
  pub name:        String,
  pub description: Option<String>,
  pub contact:     Option<String>,
}

impl NewProject {
  pub fn into_project(self, id: ProjectId) -> Project {
    Project {
      id,
      name: self.name,
      description: self.description,
      contact: self.contact,
    }
  }
}

/// A file reference attached to a project. Files are part of the project
/// aggregate; their events land in the owning project's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
  pub id:         FileId,
  pub project_id: ProjectId,
  pub filename:   String,
  pub path:       Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProjectFile {
  pub project_id: ProjectId,
  pub filename:   String,
  pub path:       Option<String>,
}

impl NewProjectFile {
  pub fn into_file(self, id: FileId) -> ProjectFile {
    ProjectFile {
      id,
      project_id: self.project_id,
      filename: self.filename,
      path: self.path,
    }
  }
}
