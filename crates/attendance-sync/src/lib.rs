//! attendance-sync: read-modify-write client for attendance and school
//! records stored as JSON documents in a GitHub repository.
//!
//! This crate provides:
//! - [`DocumentStore`]: fetch/store of whole documents with optimistic
//!   revision tokens
//! - Composite upserts for attendance percentages and school data
//! - [`ContentsApi`] transport abstraction with GitHub and in-memory
//!   backends

pub mod config;
pub mod contents;
pub mod document;
pub mod store;

pub use config::{AccessToken, Config, ConfigError};
pub use contents::{ContentsApi, FileUpdate, GitHubContents, InMemoryContents, RemoteFile, StoreError};
pub use document::{
    composite_key, format_percentage, AttendanceRecord, Document, DocumentId, RevisionToken,
};
pub use store::DocumentStore;
