pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
pub use store::{CredentialStore, StoreError};
