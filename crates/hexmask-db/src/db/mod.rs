//! Document store implementations
//
// Trait shared by every backend
pub mod store;
//
// Postgres repositories and the store that combines them
pub mod asset;
pub mod hex_image;
pub mod postgres;
//
// In-process store
pub mod memory;

pub use asset::AssetRepository;
pub use hex_image::HexImageRepository;
pub use memory::InMemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use store::DocumentStore;
