//! Context projector: the Contact → Project → File read model.
//!
//! Everything here is derived on read from the aggregate tables; nothing is
//! stored and the event log is never consulted.

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;

use crate::{
  Error, Result,
  channel::{Channel, ChannelCatalog},
  project::{FileId, Project, ProjectFile, ProjectId},
  store::AggregateStore,
};

/// Group name for projects without a contact.
pub const OTHER_CONTACT: &str = "Other";

// ─── Read models ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextHierarchy {
  pub contacts: Vec<ContactGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactGroup {
  pub name:     String,
  pub projects: Vec<ProjectNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectNode {
  pub id:          ProjectId,
  pub name:        String,
  pub description: Option<String>,
  pub files:       Vec<FileNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNode {
  pub id:       FileId,
  pub filename: String,
  pub path:     Option<String>,
}

/// The resolved context together with the channels recommended for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelRecommendation {
  pub contact:  Option<String>,
  pub project:  Option<Project>,
  pub file:     Option<ProjectFile>,
  pub channels: Vec<Channel>,
}

// ─── Projector ───────────────────────────────────────────────────────────────

pub struct ContextProjector<S> {
  store:   Arc<S>,
  catalog: ChannelCatalog,
}

impl<S> Clone for ContextProjector<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), catalog: self.catalog.clone() }
  }
}

impl<S: AggregateStore> ContextProjector<S> {
  pub fn new(store: Arc<S>, catalog: ChannelCatalog) -> Self {
    Self { store, catalog }
  }

  pub fn catalog(&self) -> &ChannelCatalog { &self.catalog }

  pub async fn get_project(&self, id: ProjectId) -> Result<Option<Project>> {
    self.store.get_project(id).await.map_err(Error::store)
  }

  pub async fn get_project_file(&self, id: FileId) -> Result<Option<ProjectFile>> {
    self.store.get_project_file(id).await.map_err(Error::store)
  }

  /// Resolve the optional ids and recommend channels for the resulting
  /// context. Unknown ids simply contribute nothing.
  pub async fn recommend_channels(
    &self,
    contact: Option<String>,
    project_id: Option<ProjectId>,
    file_id: Option<FileId>,
  ) -> Result<ChannelRecommendation> {
    let project = match project_id {
      Some(id) => self.get_project(id).await?,
      None => None,
    };
    let file = match file_id {
      Some(id) => self.get_project_file(id).await?,
      None => None,
    };

    let channels = self.catalog.recommend(
      contact.as_deref(),
      project.as_ref(),
      file.as_ref(),
    );
    Ok(ChannelRecommendation { contact, project, file, channels })
  }

  /// The full hierarchy from two bulk reads. Not paginated.
  pub async fn get_hierarchy(&self) -> Result<ContextHierarchy> {
    let projects = self.store.all_projects().await.map_err(Error::store)?;
    let files = self.store.all_project_files().await.map_err(Error::store)?;
    Ok(build_hierarchy(projects, files))
  }
}

/// Group files under their project and projects under their contact.
///
/// Named contacts come first in name order, followed by [`OTHER_CONTACT`].
/// Projects are listed newest first, files in id order. Files whose project
/// no longer exists are left out.
pub fn build_hierarchy(
  mut projects: Vec<Project>,
  mut files: Vec<ProjectFile>,
) -> ContextHierarchy {
  files.sort_by_key(|f| f.id);
  let mut files_by_project: BTreeMap<ProjectId, Vec<FileNode>> = BTreeMap::new();
  for file in files {
    files_by_project.entry(file.project_id).or_default().push(FileNode {
      id:       file.id,
      filename: file.filename,
      path:     file.path,
    });
  }

  projects.sort_by(|a, b| b.id.cmp(&a.id));
  let mut named: BTreeMap<String, Vec<ProjectNode>> = BTreeMap::new();
  let mut other: Vec<ProjectNode> = Vec::new();
  for project in projects {
    let node = ProjectNode {
      id:          project.id,
      files:       files_by_project.remove(&project.id).unwrap_or_default(),
      name:        project.name,
      description: project.description,
    };
    match project
      .contact
      .map(|c| c.trim().to_owned())
      .filter(|c| !c.is_empty() && c != OTHER_CONTACT)
    {
      Some(contact) => named.entry(contact).or_default().push(node),
      None => other.push(node),
    }
  }

  let mut contacts: Vec<ContactGroup> = named
    .into_iter()
    .map(|(name, projects)| ContactGroup { name, projects })
    .collect();
  if !other.is_empty() {
    contacts.push(ContactGroup { name: OTHER_CONTACT.to_owned(), projects: other });
  }
  ContextHierarchy { contacts }
}
