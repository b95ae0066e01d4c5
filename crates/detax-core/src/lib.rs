//! Core types and trait definitions for the detax knowledge base.
//!
//! This crate has no HTTP or database dependencies. It owns
//! the two aggregate families (documents; projects and their files), the
//! append-only domain-event vocabulary, the command handlers that tie a state
//! change to its audit entry, and the read-only context projector.

// Native `async fn` in traits; the store traits spell out their `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod audit;
pub mod channel;
pub mod command;
pub mod context;
pub mod document;
pub mod error;
pub mod event;
pub mod project;
pub mod store;

pub use error::{EntityKind, Error, Result};
