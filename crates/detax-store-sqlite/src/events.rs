//! [`EventLog`] for [`SqliteStore`]: the append-only `domain_events` table.

use chrono::Utc;
use uuid::Uuid;

use detax_core::{
  event::{AggregateRef, DomainEvent, NewEvent},
  store::EventLog,
};

use crate::{
  Result,
  encode::{RawEvent, decode_dt, encode_dt, encode_limit},
  store::SqliteStore,
};

impl EventLog for SqliteStore {
  type Error = crate::Error;

  /// The timestamp is clamped to the newest event already in the stream, so
  /// reading in `created_at` order never reorders a stream when the wall
  /// clock steps backwards. `seq` breaks ties.
  async fn try_append(&self, event: NewEvent) -> Result<DomainEvent> {
    let aggregate = event.aggregate();
    let event_id = Uuid::new_v4();

    let event_id_str = event_id.to_string();
    let type_str = aggregate.aggregate_type.as_ref().to_owned();
    let aggregate_id = aggregate.aggregate_id;
    let event_type = event.payload.discriminant();
    let payload_str = event.payload.to_json()?.to_string();
    let metadata_str = serde_json::to_string(&event.metadata)?;
    let now = encode_dt(Utc::now());

    let created_at_str = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let latest: Option<String> = tx.query_row(
          "SELECT MAX(created_at) FROM domain_events
            WHERE aggregate_type = ?1 AND aggregate_id = ?2",
          rusqlite::params![type_str, aggregate_id],
          |r| r.get(0),
        )?;
        let created_at = match latest {
          Some(latest) if latest > now => latest,
          _ => now,
        };

        tx.execute(
          "INSERT INTO domain_events (
             event_id, aggregate_type, aggregate_id, event_type,
             payload, metadata, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            event_id_str,
            type_str,
            aggregate_id,
            event_type,
            payload_str,
            metadata_str,
            created_at,
          ],
        )?;
        tx.commit()?;
        Ok(created_at)
      })
      .await?;

    tracing::debug!(
      %event_id,
      aggregate_type = %aggregate.aggregate_type,
      aggregate_id,
      event_type,
      "domain event appended"
    );

    Ok(DomainEvent {
      id: event_id,
      aggregate_type: aggregate.aggregate_type,
      aggregate_id,
      payload: event.payload,
      metadata: event.metadata,
      created_at: decode_dt(&created_at_str)?,
    })
  }

  async fn read(
    &self,
    aggregate: AggregateRef,
    limit: usize,
  ) -> Result<Vec<DomainEvent>> {
    let type_str = aggregate.aggregate_type.as_ref().to_owned();
    let aggregate_id = aggregate.aggregate_id;
    let limit = encode_limit(limit);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, aggregate_type, aggregate_id, event_type,
                  payload, metadata, created_at
             FROM domain_events
            WHERE aggregate_type = ?1 AND aggregate_id = ?2
            ORDER BY created_at ASC, seq ASC
            LIMIT ?3",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![type_str, aggregate_id, limit],
            RawEvent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
