//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use detax_core::{
  EntityKind, Error as CoreError,
  channel::ChannelCatalog,
  command::{
    AddProjectFile, CommandHandlers, CreateDocument, CreateProject,
    DeleteDocument, DeleteProject, RemoveProjectFile, UpdateDocument,
  },
  context::{ContextProjector, OTHER_CONTACT},
  document::NewDocument,
  event::{AggregateRef, EventPayload, EventType},
  project::NewProjectFile,
  store::{AggregateStore, DocumentQuery, EventLog, ProjectQuery, SearchQuery},
};

use crate::SqliteStore;

async fn store() -> Arc<SqliteStore> {
  Arc::new(
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store"),
  )
}

fn handlers(s: &Arc<SqliteStore>) -> CommandHandlers<SqliteStore, SqliteStore> {
  CommandHandlers::new(Arc::clone(s), Arc::clone(s))
}

fn new_document(title: &str, category: &str, content: &str) -> NewDocument {
  NewDocument {
    title:    title.into(),
    source:   None,
    category: category.into(),
    content:  content.into(),
  }
}

fn create_document(title: &str, category: &str, content: &str) -> CreateDocument {
  CreateDocument {
    title:    title.into(),
    source:   None,
    category: category.into(),
    content:  content.into(),
  }
}

fn create_project(name: &str, contact: Option<&str>) -> CreateProject {
  CreateProject {
    name:        name.into(),
    description: None,
    contact:     contact.map(Into::into),
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_document() {
  let s = store().await;
  let doc = s
    .create_document(new_document("Stawki VAT", "vat", "23% podstawowa"))
    .await
    .unwrap();

  let fetched = s.get_document(doc.id).await.unwrap().unwrap();
  assert_eq!(fetched, doc);
  assert!(s.get_document(doc.id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn update_returns_new_state_and_missing_id_is_none() {
  let s = store().await;
  let doc = s
    .create_document(new_document("Old", "vat", "old"))
    .await
    .unwrap();

  let updated = s
    .update_document(doc.id, new_document("New", "ksef", "new"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.id, doc.id);
  assert_eq!(updated.title, "New");
  assert_eq!(updated.category, "ksef");
  assert_eq!(s.get_document(doc.id).await.unwrap().unwrap(), updated);

  let missing = s
    .update_document(999, new_document("x", "vat", "x"))
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn list_documents_filters_by_category_in_id_order() {
  let s = store().await;
  let a = s.create_document(new_document("A", "vat", "a")).await.unwrap();
  s.create_document(new_document("B", "zus", "b")).await.unwrap();
  let c = s.create_document(new_document("C", "vat", "c")).await.unwrap();

  let vat = s
    .list_documents(DocumentQuery { category: Some("vat".into()), ..Default::default() })
    .await
    .unwrap();
  let ids: Vec<i64> = vat.iter().map(|d| d.id).collect();
  assert_eq!(ids, [a.id, c.id]);

  let limited = s
    .list_documents(DocumentQuery { limit: Some(2), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(limited.len(), 2);

  let empty = s
    .list_documents(DocumentQuery { category: Some("cit".into()), ..Default::default() })
    .await
    .unwrap();
  assert!(empty.is_empty());
}

#[tokio::test]
async fn category_filters_match_normalised_categories() {
  let s = store().await;
  let h = handlers(&s);
  let doc = h
    .create_document(create_document("Stawki", "VAT", "stawka 23%"))
    .await
    .unwrap();
  assert_eq!(doc.category, "vat");

  let listed = s
    .list_documents(DocumentQuery { category: Some("VAT".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(listed, [doc.clone()]);

  let hits = s
    .search_documents(SearchQuery {
      text:     "23%".into(),
      category: Some("VAT".into()),
      limit:    None,
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, doc.id);
}

#[tokio::test]
async fn newest_first_lists_by_descending_id() {
  let s = store().await;
  let a = s.create_document(new_document("A", "vat", "a")).await.unwrap();
  let b = s.create_document(new_document("B", "vat", "b")).await.unwrap();

  let newest = s
    .list_documents(DocumentQuery {
      limit: Some(1),
      newest_first: true,
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(newest, [b]);
  assert!(newest.iter().all(|d| d.id != a.id));
}

#[tokio::test]
async fn stats_count_documents_per_category() {
  let s = store().await;
  let empty = s.document_stats().await.unwrap();
  assert_eq!(empty.total_documents, 0);
  assert!(empty.categories.is_empty());

  for (title, category) in [("A", "zus"), ("B", "vat"), ("C", "vat"), ("D", "ksef")] {
    s.create_document(new_document(title, category, "x")).await.unwrap();
  }

  let stats = s.document_stats().await.unwrap();
  assert_eq!(stats.total_documents, 4);
  let counts: Vec<(&str, u64)> = stats
    .categories
    .iter()
    .map(|c| (c.category.as_str(), c.count))
    .collect();
  assert_eq!(counts, [("vat", 2), ("ksef", 1), ("zus", 1)]);
}

#[tokio::test]
async fn ping_reaches_the_database() {
  let s = store().await;
  s.ping().await.unwrap();
}

#[tokio::test]
async fn ids_are_never_reused_after_delete() {
  let s = store().await;
  let first = s.create_document(new_document("A", "vat", "a")).await.unwrap();
  assert!(s.delete_document(first.id).await.unwrap());
  assert!(!s.delete_document(first.id).await.unwrap());

  let second = s.create_document(new_document("B", "vat", "b")).await.unwrap();
  assert!(second.id > first.id);
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_percent_query_within_category() {
  let s = store().await;
  let vat = s
    .create_document(new_document(
      "Stawki VAT",
      "vat",
      "Podstawowa stawka podatku wynosi 23% i dotyczy większości towarów.",
    ))
    .await
    .unwrap();
  s.create_document(new_document(
    "Składki",
    "zus",
    "Składka zdrowotna to 9% podstawy, nie 23% jak VAT.",
  ))
  .await
  .unwrap();

  let hits = s
    .search_documents(SearchQuery {
      text:     "23%".into(),
      category: Some("vat".into()),
      limit:    None,
    })
    .await
    .unwrap();

  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, vat.id);
  assert!(!hits[0].snippet.is_empty());
  assert!(hits[0].snippet.contains("**23**"));
}

#[tokio::test]
async fn search_ranks_denser_matches_first() {
  let s = store().await;
  let sparse = s
    .create_document(new_document(
      "Ogólne",
      "default",
      "Długi tekst o wielu sprawach firmowych, w którym raz pojawia się ksef \
       oraz sporo innych słów niezwiązanych z tematem wyszukiwania.",
    ))
    .await
    .unwrap();
  let dense = s
    .create_document(new_document("KSeF", "ksef", "ksef ksef ksef"))
    .await
    .unwrap();

  let hits = s.search_documents(SearchQuery::new("KSeF")).await.unwrap();
  let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
  assert_eq!(ids, [dense.id, sparse.id]);
  assert!(hits[0].rank >= hits[1].rank);
}

#[tokio::test]
async fn search_index_follows_updates_and_deletes() {
  let s = store().await;
  let doc = s
    .create_document(new_document("JPK", "vat", "plik jpk miesięczny"))
    .await
    .unwrap();

  s.update_document(doc.id, new_document("JPK", "vat", "deklaracja kwartalna"))
    .await
    .unwrap();
  assert!(s.search_documents(SearchQuery::new("jpk")).await.unwrap().is_empty());
  assert_eq!(
    s.search_documents(SearchQuery::new("kwartalna")).await.unwrap().len(),
    1
  );

  s.delete_document(doc.id).await.unwrap();
  assert!(
    s.search_documents(SearchQuery::new("kwartalna"))
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn blank_or_zero_limit_search_is_empty() {
  let s = store().await;
  s.create_document(new_document("A", "vat", "vat")).await.unwrap();

  assert!(s.search_documents(SearchQuery::new("   ")).await.unwrap().is_empty());
  let zero = SearchQuery { limit: Some(0), ..SearchQuery::new("vat") };
  assert!(s.search_documents(zero).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_input_is_never_parsed_as_fts_syntax() {
  let s = store().await;
  s.create_document(new_document("A", "vat", "vat OR zus")).await.unwrap();

  // Unbalanced quotes and operators would be FTS5 syntax errors if passed
  // through verbatim.
  let hits = s
    .search_documents(SearchQuery::new("\"vat NEAR( zus*"))
    .await
    .unwrap();
  assert!(hits.is_empty());
  assert_eq!(s.search_documents(SearchQuery::new("OR")).await.unwrap().len(), 1);
}

// ─── Projects & files ────────────────────────────────────────────────────────

#[tokio::test]
async fn list_projects_newest_first_with_contact_filter() {
  let s = store().await;
  let h = handlers(&s);
  let a = h.create_project(create_project("A", Some("Acme Co"))).await.unwrap();
  h.create_project(create_project("B", None)).await.unwrap();
  let c = h.create_project(create_project("C", Some("Acme Co"))).await.unwrap();

  let acme = s
    .list_projects(ProjectQuery { contact: Some("Acme Co".into()), limit: None })
    .await
    .unwrap();
  let ids: Vec<i64> = acme.iter().map(|p| p.id).collect();
  assert_eq!(ids, [c.id, a.id]);
  assert_eq!(s.all_projects().await.unwrap().len(), 3);
}

#[tokio::test]
async fn file_added_to_missing_project_is_none() {
  let s = store().await;
  let file = s
    .add_project_file(NewProjectFile {
      project_id: 42,
      filename:   "umowa.pdf".into(),
      path:       None,
    })
    .await
    .unwrap();
  assert!(file.is_none());
  assert!(s.all_project_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn add_then_remove_file_restores_listing() {
  let s = store().await;
  let h = handlers(&s);
  let project = h.create_project(create_project("Wdrożenie", None)).await.unwrap();
  let existing = h
    .add_project_file(AddProjectFile {
      project_id: project.id,
      filename:   "a.pdf".into(),
      path:       None,
    })
    .await
    .unwrap();
  let before = s.list_project_files(project.id).await.unwrap();
  assert_eq!(before, [existing.clone()]);

  let added = h
    .add_project_file(AddProjectFile {
      project_id: project.id,
      filename:   "b.pdf".into(),
      path:       Some("/umowy".into()),
    })
    .await
    .unwrap();
  assert_eq!(s.list_project_files(project.id).await.unwrap().len(), 2);
  assert_eq!(s.get_project_file(added.id).await.unwrap(), Some(added.clone()));

  h.remove_project_file(RemoveProjectFile { file_id: added.id })
    .await
    .unwrap();
  assert_eq!(s.list_project_files(project.id).await.unwrap(), before);

  let again = h
    .remove_project_file(RemoveProjectFile { file_id: added.id })
    .await
    .unwrap_err();
  assert!(matches!(
    again,
    CoreError::NotFound { kind: EntityKind::ProjectFile, .. }
  ));
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_appends_exactly_one_created_event() {
  let s = store().await;
  let h = handlers(&s);
  let doc = h
    .create_document(create_document("KSeF", "KSEF", "e-faktura"))
    .await
    .unwrap();
  assert_eq!(doc.category, "ksef");

  let events = s.read(AggregateRef::document(doc.id), 50).await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].event_type(), EventType::Created);
  assert_eq!(events[0].payload, EventPayload::DocumentCreated(doc));
  assert_eq!(events[0].metadata.command.as_deref(), Some("CreateDocument"));
}

#[tokio::test]
async fn updates_append_in_order_with_monotonic_timestamps() {
  let s = store().await;
  let h = handlers(&s);
  let doc = h
    .create_document(create_document("v0", "vat", "0"))
    .await
    .unwrap();
  for n in 1..=3 {
    h.update_document(UpdateDocument {
      id:       doc.id,
      title:    format!("v{n}"),
      source:   None,
      category: "vat".into(),
      content:  n.to_string(),
    })
    .await
    .unwrap();
  }

  let events = s.read(AggregateRef::document(doc.id), 50).await.unwrap();
  let titles: Vec<String> = events
    .iter()
    .map(|e| match &e.payload {
      EventPayload::DocumentCreated(d) | EventPayload::DocumentUpdated(d) => {
        d.title.clone()
      }
      other => panic!("unexpected payload {other:?}"),
    })
    .collect();
  assert_eq!(titles, ["v0", "v1", "v2", "v3"]);
  assert!(events.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn not_found_commands_append_nothing() {
  let s = store().await;
  let h = handlers(&s);

  let err = h.delete_document(DeleteDocument { id: 7 }).await.unwrap_err();
  assert!(err.is_not_found());
  let err = h
    .update_document(UpdateDocument {
      id:       7,
      title:    "t".into(),
      source:   None,
      category: "vat".into(),
      content:  String::new(),
    })
    .await
    .unwrap_err();
  assert!(err.is_not_found());

  assert!(s.read(AggregateRef::document(7), 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn read_truncates_to_the_oldest_events() {
  let s = store().await;
  let h = handlers(&s);
  let doc = h
    .create_document(create_document("t", "vat", "c"))
    .await
    .unwrap();
  for _ in 0..4 {
    h.update_document(UpdateDocument {
      id:       doc.id,
      title:    "t".into(),
      source:   None,
      category: "vat".into(),
      content:  "c".into(),
    })
    .await
    .unwrap();
  }

  let first_two = s.read(AggregateRef::document(doc.id), 2).await.unwrap();
  let all = s.read(AggregateRef::document(doc.id), 50).await.unwrap();
  assert_eq!(all.len(), 5);
  assert_eq!(first_two, all[..2]);
  assert_eq!(first_two[0].event_type(), EventType::Created);
}

#[tokio::test]
async fn streams_are_isolated_by_aggregate_type() {
  let s = store().await;
  let h = handlers(&s);
  let doc = h
    .create_document(create_document("t", "vat", "c"))
    .await
    .unwrap();
  let project = h.create_project(create_project("P", None)).await.unwrap();
  assert_eq!(doc.id, project.id);

  let doc_events = s.read(AggregateRef::document(doc.id), 50).await.unwrap();
  let project_events = s.read(AggregateRef::project(project.id), 50).await.unwrap();
  assert_eq!(doc_events.len(), 1);
  assert_eq!(project_events.len(), 1);
  assert_ne!(doc_events[0].id, project_events[0].id);
}

#[tokio::test]
async fn deleted_project_keeps_its_history() {
  let s = store().await;
  let h = handlers(&s);
  let project = h
    .create_project(create_project("Acme onboarding", Some("Acme Co")))
    .await
    .unwrap();
  assert_eq!(
    s.get_project(project.id).await.unwrap().unwrap().contact.as_deref(),
    Some("Acme Co")
  );

  h.delete_project(DeleteProject { id: project.id }).await.unwrap();
  assert!(s.get_project(project.id).await.unwrap().is_none());

  let types: Vec<EventType> = s
    .read(AggregateRef::project(project.id), 50)
    .await
    .unwrap()
    .iter()
    .map(|e| e.event_type())
    .collect();
  assert_eq!(types, [EventType::Created, EventType::Deleted]);
}

#[tokio::test]
async fn file_events_are_recorded_on_the_project_stream() {
  let s = store().await;
  let h = handlers(&s);
  let project = h.create_project(create_project("P", None)).await.unwrap();
  let file = h
    .add_project_file(AddProjectFile {
      project_id: project.id,
      filename:   "jpk.xml".into(),
      path:       None,
    })
    .await
    .unwrap();
  h.remove_project_file(RemoveProjectFile { file_id: file.id })
    .await
    .unwrap();

  let types: Vec<EventType> = s
    .read(AggregateRef::project(project.id), 50)
    .await
    .unwrap()
    .iter()
    .map(|e| e.event_type())
    .collect();
  assert_eq!(
    types,
    [EventType::Created, EventType::FileAdded, EventType::FileRemoved]
  );
}

// ─── Context ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn hierarchy_groups_by_contact_with_other_last() {
  let s = store().await;
  let h = handlers(&s);
  let loose = h.create_project(create_project("Loose", None)).await.unwrap();
  let acme = h
    .create_project(create_project("Acme VAT", Some("Acme Co")))
    .await
    .unwrap();
  h.add_project_file(AddProjectFile {
    project_id: acme.id,
    filename:   "jpk.xml".into(),
    path:       None,
  })
  .await
  .unwrap();

  let projector = ContextProjector::new(Arc::clone(&s), ChannelCatalog::default());
  let hierarchy = projector.get_hierarchy().await.unwrap();
  let names: Vec<&str> = hierarchy.contacts.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(names, ["Acme Co", OTHER_CONTACT]);
  assert_eq!(hierarchy.contacts[0].projects[0].files.len(), 1);
  assert_eq!(hierarchy.contacts[1].projects[0].id, loose.id);
}

#[tokio::test]
async fn channel_recommendation_reads_through_the_store() {
  let s = store().await;
  let h = handlers(&s);
  let project = h
    .create_project(CreateProject {
      name:        "Składki".into(),
      description: Some("rozliczenie ZUS".into()),
      contact:     None,
    })
    .await
    .unwrap();

  let projector = ContextProjector::new(Arc::clone(&s), ChannelCatalog::default());
  let rec = projector
    .recommend_channels(None, Some(project.id), Some(404))
    .await
    .unwrap();
  assert_eq!(rec.project, Some(project));
  assert!(rec.file.is_none());
  let ids: Vec<&str> = rec.channels.iter().map(|c| c.id.as_str()).collect();
  assert_eq!(ids, ["default", "zus"]);
}

#[tokio::test]
async fn audit_reports_aggregates_written_without_an_event() {
  let s = store().await;
  let h = handlers(&s);
  h.create_document(create_document("t", "vat", "c")).await.unwrap();
  h.create_project(create_project("P", None)).await.unwrap();
  s.create_document(new_document("silent", "vat", "no event")).await.unwrap();

  let gaps = detax_core::audit::find_audit_gaps(s.as_ref(), s.as_ref(), 50)
    .await
    .unwrap();
  assert_eq!(gaps, [AggregateRef::document(2)]);
}
