//! Consistency check between the aggregate tables and the event log.
//!
//! The aggregate write and its event append are separate transactions, so a
//! failed append leaves committed state with no audit entry. This check finds
//! aggregates whose event stream is empty. It cannot see a missing `Updated`
//! event on an aggregate that already has history.

use crate::{
  Error, Result,
  event::AggregateRef,
  store::{AggregateStore, DocumentQuery, EventLog, ProjectQuery},
};

/// Every live document and project that has no event at all in its stream.
/// Only the newest `limit` of each family are inspected, since that is where
/// fresh gaps appear.
pub async fn find_audit_gaps<S, L>(
  store: &S,
  log: &L,
  limit: usize,
) -> Result<Vec<AggregateRef>>
where
  S: AggregateStore,
  L: EventLog,
{
  let documents = store
    .list_documents(DocumentQuery {
      category:     None,
      limit:        Some(limit),
      newest_first: true,
    })
    .await
    .map_err(Error::store)?;
  let projects = store
    .list_projects(ProjectQuery { contact: None, limit: Some(limit) })
    .await
    .map_err(Error::store)?;

  let candidates = documents
    .iter()
    .map(|d| AggregateRef::document(d.id))
    .chain(projects.iter().map(|p| AggregateRef::project(p.id)));

  let mut gaps = Vec::new();
  for aggregate in candidates {
    let history = log.read(aggregate, 1).await.map_err(Error::store)?;
    if history.is_empty() {
      tracing::warn!(
        aggregate_type = %aggregate.aggregate_type,
        aggregate_id = aggregate.aggregate_id,
        "aggregate has no audit history"
      );
      gaps.push(aggregate);
    }
  }
  Ok(gaps)
}
