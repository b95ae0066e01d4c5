//! Documents: the knowledge-base articles searched by the assistant.

use serde::{Deserialize, Serialize};

pub type DocumentId = i64;

/// A knowledge-base document. `id` is assigned by the store and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub id:       DocumentId,
  pub title:    String,
  pub source:   Option<String>,
  /// Topical tag; one of the channel ids (`ksef`, `b2b`, `zus`, `vat`,
  /// `default`) in practice, but the set is open.
  pub category: String,
  pub content:  String,
}

/// Validated input to [`crate::store::AggregateStore::create_document`] and
/// [`crate::store::AggregateStore::update_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
  pub title:    String,
  pub source:   Option<String>,
  pub category: String,
  pub content:  String,
}

/// Canonical form of a category tag: trimmed and lower-cased. Applied to
/// stored categories and to category filters alike.
pub fn normalize_category(raw: &str) -> String { raw.trim().to_lowercase() }

impl NewDocument {
  pub fn into_document(self, id: DocumentId) -> Document {
    Document {
      id,
      title: self.title,
      source: self.source,
      category: self.category,
      content: self.content,
    }
  }
}

/// One full-text search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
  pub id:       DocumentId,
  pub title:    String,
  pub source:   Option<String>,
  pub category: String,
  /// Excerpt around the matched terms; matches are wrapped in `**`.
  pub snippet:  String,
  /// Higher is more relevant.
  pub rank:     f64,
}

/// Number of documents carrying one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
  pub category: String,
  pub count:    u64,
}

/// Knowledge-base totals. `categories` is ordered by count descending,
/// then by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
  pub total_documents: u64,
  pub categories:      Vec<CategoryCount>,
}
