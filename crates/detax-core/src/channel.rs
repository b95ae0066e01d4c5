//! Channel catalog and keyword classification.
//!
//! A channel is a topical routing tag for the assistant. Recommendation is a
//! case-insensitive substring scan of a context blob against each channel's
//! trigger keywords; `default` is always recommended.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  project::{Project, ProjectFile},
};

pub const DEFAULT_CHANNEL: &str = "default";

/// One entry of the channel catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
  pub id:       String,
  pub name:     String,
  /// Trigger keywords. Not part of the serialised response.
  #[serde(default, skip_serializing)]
  pub keywords: Vec<String>,
}

impl Channel {
  pub fn new(id: &str, name: &str, keywords: &[&str]) -> Self {
    Self {
      id:       id.to_owned(),
      name:     name.to_owned(),
      keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
    }
  }
}

/// The ordered set of known channels and their keyword table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCatalog {
  channels: Vec<Channel>,
}

impl Default for ChannelCatalog {
  fn default() -> Self {
    Self {
      channels: vec![
        Channel::new(DEFAULT_CHANNEL, "Ogólne", &[]),
        Channel::new("ksef", "KSeF", &["ksef", "e-fakt", "faktura"]),
        Channel::new("b2b", "B2B", &["umowa", "b2b", "kontrakt", "sprzeda"]),
        Channel::new("zus", "ZUS", &["zus", "składk", "ubezpiecze"]),
        Channel::new("vat", "VAT", &["vat", "jpk", "oss"]),
      ],
    }
  }
}

impl ChannelCatalog {
  /// Build a catalog from configuration. Keywords are case-folded and blank
  /// ones dropped. The catalog must contain the `default` channel.
  pub fn new(channels: Vec<Channel>) -> Result<Self> {
    if !channels.iter().any(|c| c.id == DEFAULT_CHANNEL) {
      return Err(Error::MissingDefaultChannel(DEFAULT_CHANNEL));
    }
    let channels = channels
      .into_iter()
      .map(|c| Channel {
        keywords: c
          .keywords
          .iter()
          .map(|k| k.trim().to_lowercase())
          .filter(|k| !k.is_empty())
          .collect(),
        ..c
      })
      .collect();
    Ok(Self { channels })
  }

  pub fn channels(&self) -> &[Channel] { &self.channels }

  /// The ids of every channel whose keywords occur in `blob`, plus
  /// `default`.
  pub fn classify(&self, blob: &str) -> BTreeSet<String> {
    let folded = blob.to_lowercase();
    let mut ids = BTreeSet::from([DEFAULT_CHANNEL.to_owned()]);
    for channel in &self.channels {
      if channel.keywords.iter().any(|k| folded.contains(k.as_str())) {
        ids.insert(channel.id.clone());
      }
    }
    ids
  }

  /// Recommended channels for a context, in catalog order.
  pub fn recommend(
    &self,
    contact: Option<&str>,
    project: Option<&Project>,
    file: Option<&ProjectFile>,
  ) -> Vec<Channel> {
    let ids = self.classify(&context_blob(contact, project, file));
    self
      .channels
      .iter()
      .filter(|c| ids.contains(&c.id))
      .cloned()
      .collect()
  }
}

/// Contact name, project name and description, file name and path joined by
/// spaces; missing parts contribute empty strings.
pub fn context_blob(
  contact: Option<&str>,
  project: Option<&Project>,
  file: Option<&ProjectFile>,
) -> String {
  [
    contact.unwrap_or_default(),
    project.map(|p| p.name.as_str()).unwrap_or_default(),
    project.and_then(|p| p.description.as_deref()).unwrap_or_default(),
    file.map(|f| f.filename.as_str()).unwrap_or_default(),
    file.and_then(|f| f.path.as_deref()).unwrap_or_default(),
  ]
  .join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(catalog: &ChannelCatalog, blob: &str) -> Vec<String> {
    catalog.classify(blob).into_iter().collect()
  }

  #[test]
  fn default_is_always_recommended() {
    let catalog = ChannelCatalog::default();
    assert_eq!(ids(&catalog, ""), ["default"]);
    assert_eq!(ids(&catalog, "nothing relevant here"), ["default"]);
  }

  #[test]
  fn keywords_match_case_insensitively() {
    let catalog = ChannelCatalog::default();
    assert!(catalog.classify("Wdrożenie KSeF").contains("ksef"));
    assert!(catalog.classify("SKŁADKI społeczne").contains("zus"));
    assert!(catalog.classify("Raport JPK_V7").contains("vat"));
  }

  #[test]
  fn recommendation_preserves_catalog_order() {
    let catalog = ChannelCatalog::default();
    let project = Project {
      id:          1,
      name:        "Umowa sprzedaży".into(),
      description: Some("faktura VAT".into()),
      contact:     None,
    };
    let got: Vec<String> = catalog
      .recommend(Some("Acme"), Some(&project), None)
      .into_iter()
      .map(|c| c.id)
      .collect();
    assert_eq!(got, ["default", "ksef", "b2b", "vat"]);
  }

  #[test]
  fn blob_joins_all_parts() {
    let file = ProjectFile {
      id:         3,
      project_id: 1,
      filename:   "zus.pdf".into(),
      path:       Some("/docs".into()),
    };
    assert_eq!(
      context_blob(Some("Acme"), None, Some(&file)),
      "Acme   zus.pdf /docs"
    );
  }

  #[test]
  fn catalog_without_default_is_rejected() {
    let err =
      ChannelCatalog::new(vec![Channel::new("vat", "VAT", &["vat"])]).unwrap_err();
    assert!(matches!(err, Error::MissingDefaultChannel("default")));
  }

  #[test]
  fn configured_keywords_are_folded_and_blanks_dropped() {
    let catalog = ChannelCatalog::new(vec![
      Channel::new("default", "General", &[]),
      Channel::new("cit", "CIT", &["  CIT ", ""]),
    ])
    .unwrap();
    assert_eq!(ids(&catalog, "zaliczka cit-8"), ["cit", "default"]);
    assert_eq!(ids(&catalog, "anything"), ["default"]);
  }
}
