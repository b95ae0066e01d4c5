//! Handler for `GET /health`.

use axum::{Json, extract::State, http::StatusCode};
use detax_core::store::{AggregateStore, EventLog};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
  Healthy,
  Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct Services {
  pub database: HealthStatus,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
  pub status:   HealthStatus,
  pub services: Services,
}

/// `GET /health`: `200` when the database answers, `503` otherwise. The body
/// is a [`HealthReport`] either way.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
) -> (StatusCode, Json<HealthReport>)
where
  S: AggregateStore + EventLog,
{
  let database = match state.store.ping().await {
    Ok(()) => HealthStatus::Healthy,
    Err(err) => {
      tracing::error!(error = %err, "database health check failed");
      HealthStatus::Unhealthy
    }
  };
  let (code, report) = report(database);
  (code, Json(report))
}

fn report(database: HealthStatus) -> (StatusCode, HealthReport) {
  let code = match database {
    HealthStatus::Healthy => StatusCode::OK,
    HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
  };
  (code, HealthReport { status: database, services: Services { database } })
}
