//! Hexmask document store
//!
//! The [`DocumentStore`](db::DocumentStore) trait is the only way the pipeline touches
//! asset and hex image records. Two implementations are provided: Postgres via sqlx and
//! an in-process map used when no database is configured and in tests.

pub mod db;

pub use db::{
    AssetRepository, DocumentStore, HexImageRepository, InMemoryDocumentStore, PgDocumentStore,
};
