//! JSON HTTP surface for the detax knowledge base.
//!
//! Exposes an axum [`Router`] that maps the command and query surface onto
//! JSON routes. Commands go through [`CommandHandlers`]; queries read the
//! [`AggregateStore`], the [`EventLog`] or the [`ContextProjector`]. No
//! domain behaviour lives here.
//!
//! | Method | Path |
//! |--------|------|
//! | `POST` | `/commands/documents/{create,update,delete}` |
//! | `POST` | `/commands/projects/{create,update,delete,add-file,remove-file}` |
//! | `GET`  | `/documents`, `/documents/stats`, `/documents/{id}`, `/search` |
//! | `GET`  | `/projects`, `/projects/{id}`, `/projects/{id}/files` |
//! | `GET`  | `/events/documents/{id}`, `/events/projects/{id}` |
//! | `GET`  | `/context/hierarchy`, `/context/channels` |
//! | `GET`  | `/health` |

pub mod commands;
pub mod context;
pub mod documents;
pub mod error;
pub mod events;
pub mod health;
pub mod projects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use detax_core::{
  channel::ChannelCatalog,
  command::CommandHandlers,
  context::ContextProjector,
  store::{AggregateStore, EventLog},
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers. One backend serves as both
/// the aggregate store and the event log.
pub struct AppState<S> {
  pub store:     Arc<S>,
  pub commands:  CommandHandlers<S, S>,
  pub projector: ContextProjector<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      commands:  self.commands.clone(),
      projector: self.projector.clone(),
    }
  }
}

impl<S> AppState<S>
where
  S: AggregateStore + EventLog,
{
  pub fn new(store: Arc<S>, catalog: ChannelCatalog) -> Self {
    Self {
      commands:  CommandHandlers::new(Arc::clone(&store), Arc::clone(&store)),
      projector: ContextProjector::new(Arc::clone(&store), catalog),
      store,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`, with request tracing.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AggregateStore + EventLog + 'static,
{
  Router::new()
    // Document commands
    .route("/commands/documents/create", post(commands::create_document::<S>))
    .route("/commands/documents/update", post(commands::update_document::<S>))
    .route("/commands/documents/delete", post(commands::delete_document::<S>))
    // Project commands
    .route("/commands/projects/create",      post(commands::create_project::<S>))
    .route("/commands/projects/update",      post(commands::update_project::<S>))
    .route("/commands/projects/delete",      post(commands::delete_project::<S>))
    .route("/commands/projects/add-file",    post(commands::add_project_file::<S>))
    .route("/commands/projects/remove-file", post(commands::remove_project_file::<S>))
    // Documents
    .route("/documents",       get(documents::list::<S>))
    .route("/documents/stats", get(documents::stats::<S>))
    .route("/documents/{id}",  get(documents::get_one::<S>))
    .route("/search",          get(documents::search::<S>))
    // Projects
    .route("/projects",            get(projects::list::<S>))
    .route("/projects/{id}",       get(projects::get_one::<S>))
    .route("/projects/{id}/files", get(projects::files::<S>))
    // Events
    .route("/events/documents/{id}", get(events::document_history::<S>))
    .route("/events/projects/{id}",  get(events::project_history::<S>))
    // Context
    .route("/context/hierarchy", get(context::hierarchy::<S>))
    .route("/context/channels",  get(context::channels::<S>))
    // Health
    .route("/health", get(health::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
