//! # docgate-docservice
//!
//! Talks to the external document server: synchronous and asynchronous
//! conversions, command-service calls (force-save), and downloads of saved
//! documents and change packages. Also derives the revision keys the server
//! uses to identify editing sessions and cache conversions.

pub mod client;
pub mod revision;
pub mod wire;

pub use client::DocumentServerClient;
pub use revision::{document_key, generate_revision_id};
